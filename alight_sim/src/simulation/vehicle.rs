// alight_sim/src/simulation/vehicle.rs

use crate::simulation::config::VehicleConfig;
use alight_core::interfaces::PoseProvider;
use alight_core::types::{AttitudeCommand, Pose};
use nalgebra::{DVector, Vector3};

/// A point-mass multirotor. The attitude loop of the flight controller is
/// assumed perfect: commanded roll, pitch and yaw are reached instantly and
/// tilt the thrust vector.
///
/// State layout: `[px, py, pz, vx, vy, vz]` in the world frame, z up.
#[derive(Debug, Clone)]
pub struct SimVehicle {
    state: DVector<f64>,
    attitude: AttitudeCommand,
    config: VehicleConfig,
    time: f64,
}

impl SimVehicle {
    pub fn new(config: &VehicleConfig) -> Self {
        let [x, y, z] = config.start;
        Self {
            state: DVector::from_vec(vec![x, y, z, 0.0, 0.0, 0.0]),
            attitude: AttitudeCommand::level(config.yaw, 0.0),
            config: config.clone(),
            time: 0.0,
        }
    }

    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.state[0], self.state[1], self.state[2])
    }

    pub fn velocity(&self) -> Vector3<f64> {
        Vector3::new(self.state[3], self.state[4], self.state[5])
    }

    pub fn pose(&self) -> Pose {
        let p = self.position();
        Pose::new(p.x, p.y, p.z).with_attitude(
            self.attitude.roll,
            self.attitude.pitch,
            self.attitude.yaw,
        )
    }

    pub fn on_ground(&self) -> bool {
        self.state[2] <= 0.0
    }

    /// `x_dot = f(x)` for a fixed attitude command.
    fn derivatives(&self, command: &AttitudeCommand, x: &DVector<f64>) -> DVector<f64> {
        let g = self.config.gravity;
        let drag = self.config.drag;

        // Horizontal acceleration from the tilted thrust, in the heading frame.
        let forward = -g * command.pitch.tan();
        let left = g * command.roll.tan();
        let (sin_yaw, cos_yaw) = command.yaw.sin_cos();
        let ax = cos_yaw * forward - sin_yaw * left - drag * x[3];
        let ay = sin_yaw * forward + cos_yaw * left - drag * x[4];
        let az = g * (command.throttle / self.config.hover_throttle - 1.0) - drag * x[5];

        DVector::from_vec(vec![x[3], x[4], x[5], ax, ay, az])
    }

    /// Holds `command` for `dt` seconds.
    pub fn apply(&mut self, command: &AttitudeCommand, dt: f64) {
        self.attitude = *command;
        let dynamics = |x: &DVector<f64>, _t: f64| self.derivatives(command, x);
        let mut next = self
            .config
            .integrator
            .step(&dynamics, &self.state, self.time, self.time + dt);

        // The ground stops everything.
        if next[2] <= 0.0 {
            next[2] = 0.0;
            next[3] = 0.0;
            next[4] = 0.0;
            next[5] = next[5].max(0.0);
        }

        self.state = next;
        self.time += dt;
    }
}

impl PoseProvider for SimVehicle {
    fn latest_pose(&self) -> Option<Pose> {
        Some(self.pose())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::integrators::IntegratorKind;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_hover_throttle_holds_altitude() {
        let mut config = VehicleConfig::default();
        config.start = [0.0, 0.0, 5.0];
        let mut vehicle = SimVehicle::new(&config);
        let hover = AttitudeCommand::level(0.0, config.hover_throttle);
        for _ in 0..100 {
            vehicle.apply(&hover, 0.05);
        }
        assert_abs_diff_eq!(vehicle.position().z, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_nose_down_accelerates_along_heading() {
        let mut config = VehicleConfig::default();
        config.start = [0.0, 0.0, 5.0];
        config.yaw = std::f64::consts::FRAC_PI_2;
        let mut vehicle = SimVehicle::new(&config);
        let cmd = AttitudeCommand {
            roll: 0.0,
            pitch: -0.1,
            yaw: std::f64::consts::FRAC_PI_2,
            throttle: config.hover_throttle,
        };
        vehicle.apply(&cmd, 0.5);
        let v = vehicle.velocity();
        assert!(v.y > 0.1);
        assert_abs_diff_eq!(v.x, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_ground_clamps_descent() {
        let mut config = VehicleConfig::default();
        config.start = [0.0, 0.0, 0.1];
        let mut vehicle = SimVehicle::new(&config);
        vehicle.apply(&AttitudeCommand::level(0.0, 0.0), 1.0);
        assert_eq!(vehicle.position().z, 0.0);
        assert!(vehicle.on_ground());
    }

    #[test]
    fn test_euler_and_rk4_agree_on_short_steps() {
        let mut config = VehicleConfig::default();
        config.start = [0.0, 0.0, 5.0];
        let cmd = AttitudeCommand {
            roll: 0.1,
            pitch: -0.1,
            yaw: 0.0,
            throttle: 0.6,
        };

        let mut rk4 = SimVehicle::new(&config);
        config.integrator = IntegratorKind::Rk1;
        let mut euler = SimVehicle::new(&config);
        for _ in 0..20 {
            rk4.apply(&cmd, 0.01);
            euler.apply(&cmd, 0.01);
        }
        assert!((rk4.position() - euler.position()).norm() < 1e-2);
        assert_ne!(rk4.position(), euler.position());
    }
}
