// alight_core/src/interfaces.rs

//! The capabilities the control loop needs from the outside world. Adapters
//! for a message bus, a simulator or a flight-controller bridge implement
//! these; the core never talks to a transport directly.

use crate::mission::MissionOutput;
use crate::types::{Pose, TargetObservation};

/// Provides the latest vehicle pose from the localization system.
pub trait PoseProvider {
    /// `None` until the first pose has arrived.
    fn latest_pose(&self) -> Option<Pose>;
}

/// Provides the latest output of the target detector.
pub trait TargetProvider {
    fn latest_observation(&self) -> TargetObservation;
}

/// Consumes the command produced by each tick.
pub trait CommandSink {
    fn send(&mut self, output: &MissionOutput);
}

impl PoseProvider for Option<Pose> {
    fn latest_pose(&self) -> Option<Pose> {
        *self
    }
}

impl TargetProvider for TargetObservation {
    fn latest_observation(&self) -> TargetObservation {
        *self
    }
}

/// Collects every output, mostly for tests and offline runs.
impl CommandSink for Vec<MissionOutput> {
    fn send(&mut self, output: &MissionOutput) {
        self.push(*output);
    }
}
