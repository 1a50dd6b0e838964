// alight_core/src/guidance/mod.rs

//! The Hover/Carrot Setpoint Generator. Produces world-frame position
//! setpoints whenever the mission is not chasing a target.

pub mod carrot;
pub mod hover;

use crate::config::CarrotConfig;
use crate::error::GuidanceError;
use crate::types::Pose;
use carrot::{CarrotController, CarrotUpdate};
use hover::HoverPoint;
use nalgebra::Vector3;
use tracing::info;

/// A setpoint together with whether the carrot path just ran out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Setpoint {
    pub position: Vector3<f64>,
    pub path_finished: bool,
}

#[derive(Debug, Clone)]
pub struct SetpointGenerator {
    hover_point: HoverPoint,
    carrot: CarrotController,
    hover_height: f64,
    loop_size: f64,
}

impl SetpointGenerator {
    pub fn new(hover_height: f64, config: &CarrotConfig) -> Self {
        Self {
            hover_point: HoverPoint::default(),
            carrot: CarrotController::new(config),
            hover_height,
            loop_size: config.loop_size,
        }
    }

    /// The stored hover point, initialized to `pose` plus the hover height
    /// on first use.
    pub fn hover_setpoint(&mut self, pose: &Pose) -> Vector3<f64> {
        if !self.hover_point.initialized {
            self.hover_point
                .set(pose.position + Vector3::new(0.0, 0.0, self.hover_height));
        }
        self.hover_point.position
    }

    /// Builds the rectangular search loop around the vehicle at the hover
    /// height.
    pub fn initialize_carrot(&mut self, pose: &Pose) -> Result<(), GuidanceError> {
        let height = self.hover_setpoint(pose).z;
        let origin = Vector3::new(pose.position.x, pose.position.y, height);
        self.carrot
            .load_waypoints(CarrotController::rectangular_loop(origin, self.loop_size))?;
        info!(origin = ?origin, size = self.loop_size, "Carrot path initialized");
        Ok(())
    }

    /// Follows a caller-supplied path instead of the search loop.
    pub fn load_path(&mut self, waypoints: Vec<Vector3<f64>>) -> Result<(), GuidanceError> {
        self.carrot.load_waypoints(waypoints)
    }

    /// The next carrot. Once the path is exhausted, the hover point moves to
    /// the final waypoint and is returned instead.
    pub fn carrot_setpoint(&mut self, pose: &Pose) -> Setpoint {
        if !self.carrot.is_initialized() {
            return Setpoint {
                position: self.hover_setpoint(pose),
                path_finished: true,
            };
        }

        match self.carrot.update(&pose.position) {
            CarrotUpdate::Carrot(position) => Setpoint {
                position,
                path_finished: false,
            },
            CarrotUpdate::Finished { final_waypoint } => {
                info!(waypoint = ?final_waypoint, "No more waypoints");
                self.hover_point.set(final_waypoint);
                Setpoint {
                    position: final_waypoint,
                    path_finished: true,
                }
            }
        }
    }

    pub fn hover_point(&self) -> &HoverPoint {
        &self.hover_point
    }

    pub fn hover_point_mut(&mut self) -> &mut HoverPoint {
        &mut self.hover_point
    }

    pub fn carrot(&self) -> &CarrotController {
        &self.carrot
    }

    pub fn hover_height(&self) -> f64 {
        self.hover_height
    }

    pub fn reset(&mut self) {
        self.hover_point.clear();
        self.carrot.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hover_defaults_to_pose_plus_height() {
        let mut gen = SetpointGenerator::new(5.0, &CarrotConfig::default());
        let sp = gen.hover_setpoint(&Pose::new(1.0, 2.0, 0.5));
        assert_eq!(sp, Vector3::new(1.0, 2.0, 5.5));

        // Already initialized: the vehicle moving does not move the point.
        let sp = gen.hover_setpoint(&Pose::new(9.0, 9.0, 9.0));
        assert_eq!(sp, Vector3::new(1.0, 2.0, 5.5));
    }

    #[test]
    fn test_carrot_loop_flies_at_hover_height() {
        let mut gen = SetpointGenerator::new(4.0, &CarrotConfig::default());
        let pose = Pose::new(0.0, 0.0, 0.0);
        gen.initialize_carrot(&pose).unwrap();

        let sp = gen.carrot_setpoint(&Pose::new(0.0, 0.0, 4.0));
        assert!(!sp.path_finished);
        assert_eq!(sp.position, Vector3::new(1.0, 0.0, 4.0));
    }

    #[test]
    fn test_finished_path_moves_hover_point() {
        let mut gen = SetpointGenerator::new(4.0, &CarrotConfig::default());
        gen.load_path(vec![Vector3::new(0.0, 0.0, 4.0), Vector3::new(2.0, 0.0, 4.0)])
            .unwrap();

        let sp = gen.carrot_setpoint(&Pose::new(2.0, 0.0, 4.0));
        assert!(sp.path_finished);
        assert_eq!(gen.hover_point().position, Vector3::new(2.0, 0.0, 4.0));
        assert!(gen.hover_point().initialized);
    }
}
