// alight_core/src/control/pid.rs

use crate::config::PidGains;
use crate::error::ControlError;
use num_traits::Float;

/// A single-axis PID loop with no integral clamp.
///
/// The individual terms of the last update are kept for telemetry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pid<T: Float> {
    pub k_p: T,
    pub k_i: T,
    pub k_d: T,
    sum_error: T,
    prev_error: T,
    output: T,
    error_p: T,
    error_i: T,
    error_d: T,
}

impl<T: Float> Pid<T> {
    pub fn new(k_p: T, k_i: T, k_d: T) -> Self {
        Self {
            k_p,
            k_i,
            k_d,
            sum_error: T::zero(),
            prev_error: T::zero(),
            output: T::zero(),
            error_p: T::zero(),
            error_i: T::zero(),
            error_d: T::zero(),
        }
    }

    /// Runs one step of the loop and returns the new output.
    pub fn update(&mut self, setpoint: T, input: T, dt: T) -> Result<T, ControlError> {
        self.update_error(setpoint - input, dt)
    }

    /// Same as [`Pid::update`] for callers that already hold the error.
    pub fn update_error(&mut self, error: T, dt: T) -> Result<T, ControlError> {
        if !(dt.is_finite() && dt > T::zero()) {
            return Err(ControlError::DegenerateTiming(dt.to_f64().unwrap_or(f64::NAN)));
        }

        self.sum_error = self.sum_error + error * dt;
        let derivative = (error - self.prev_error) / dt;

        self.error_p = self.k_p * error;
        self.error_i = self.k_i * self.sum_error;
        self.error_d = self.k_d * derivative;

        self.output = self.error_p + self.error_i + self.error_d;
        self.prev_error = error;
        Ok(self.output)
    }

    pub fn output(&self) -> T {
        self.output
    }

    pub fn sum_error(&self) -> T {
        self.sum_error
    }

    pub fn prev_error(&self) -> T {
        self.prev_error
    }

    /// The (P, I, D) contributions of the last update.
    pub fn terms(&self) -> (T, T, T) {
        (self.error_p, self.error_i, self.error_d)
    }

    /// Zeroes integral, previous error and output. Gains are kept.
    pub fn reset(&mut self) {
        *self = Self::new(self.k_p, self.k_i, self.k_d);
    }
}

impl From<PidGains> for Pid<f64> {
    fn from(gains: PidGains) -> Self {
        Self::new(gains.k_p, gains.k_i, gains.k_d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_update_follows_textbook_terms() {
        let mut pid = Pid::new(2.0, 0.5, 0.1);

        // error 1.0 over 0.1 s: P = 2, I = 0.5 * 0.1, D = 0.1 * 10
        let out = pid.update(1.0, 0.0, 0.1).unwrap();
        assert_abs_diff_eq!(out, 2.0 + 0.05 + 1.0, epsilon = 1e-12);

        // Same error again: derivative vanishes, integral doubles.
        let out = pid.update(1.0, 0.0, 0.1).unwrap();
        assert_abs_diff_eq!(out, 2.0 + 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(pid.sum_error(), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_non_positive_dt_leaves_state_untouched() {
        let mut pid = Pid::new(1.0f32, 1.0, 1.0);
        pid.update(1.0, 0.0, 0.1).unwrap();
        let before = pid;

        assert!(pid.update(5.0, 0.0, 0.0).is_err());
        assert!(pid.update(5.0, 0.0, -0.1).is_err());
        assert_eq!(pid, before);
    }

    #[test]
    fn test_reset_zeroes_state_and_keeps_gains() {
        let mut pid = Pid::new(1.0, 2.0, 3.0);
        pid.update(4.0, 1.0, 0.05).unwrap();
        pid.reset();

        assert_eq!(pid.sum_error(), 0.0);
        assert_eq!(pid.prev_error(), 0.0);
        assert_eq!(pid.output(), 0.0);
        assert_eq!(pid.terms(), (0.0, 0.0, 0.0));
        assert_eq!((pid.k_p, pid.k_i, pid.k_d), (1.0, 2.0, 3.0));
    }
}
