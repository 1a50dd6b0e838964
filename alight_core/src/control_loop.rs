// alight_core/src/control_loop.rs

use crate::clock::Clock;
use crate::interfaces::{CommandSink, PoseProvider, TargetProvider};
use crate::mission::{Mission, MissionOutput, TickInput};
use crate::types::Timestamp;
use tracing::warn;

/// Binds a [`Mission`] to a clock and the outside-world capabilities.
///
/// Each call to [`ControlLoop::step`] is one full tick: read the clock, pull
/// the latest pose and observation, run the mission, push the command.
#[derive(Debug)]
pub struct ControlLoop<C: Clock> {
    mission: Mission,
    clock: C,
    last_step: Option<Timestamp>,
    /// Used as `dt` for the very first tick.
    nominal_dt: f64,
}

impl<C: Clock> ControlLoop<C> {
    pub fn new(mission: Mission, clock: C, nominal_dt: f64) -> Self {
        Self {
            mission,
            clock,
            last_step: None,
            nominal_dt,
        }
    }

    pub fn step<P, T, S>(&mut self, poses: &P, targets: &T, sink: &mut S) -> MissionOutput
    where
        P: PoseProvider + ?Sized,
        T: TargetProvider + ?Sized,
        S: CommandSink + ?Sized,
    {
        let now = self.clock.now();
        let dt = match self.last_step {
            Some(last) => now - last,
            None => self.nominal_dt,
        };
        self.last_step = Some(now);

        let output = match poses.latest_pose() {
            Some(pose) => self.mission.tick(&TickInput {
                pose,
                observation: targets.latest_observation(),
                dt,
                now,
            }),
            None => {
                warn!(now, "No pose available, holding level");
                self.mission.hold_level()
            }
        };

        sink.send(&output);
        output
    }

    pub fn mission(&self) -> &Mission {
        &self.mission
    }

    pub fn mission_mut(&mut self) -> &mut Mission {
        &mut self.mission
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}
