// alight_sim/src/simulation/integrators.rs

use nalgebra::DVector;
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// One step of a fixed-step ODE solver for `x_dot = f(x, t)`.
pub trait Integrator<T> {
    fn step(
        &self,
        func: &dyn Fn(&DVector<T>, T) -> DVector<T>,
        x0: &DVector<T>,
        t0: T,
        tf: T,
    ) -> DVector<T>;
}

// Runge-Kutta methods
#[derive(Debug, Default, Clone, Copy)]
pub struct RK1;

impl<T> Integrator<T> for RK1
where
    T: Float + nalgebra::Scalar + std::ops::Mul<DVector<T>, Output = DVector<T>>,
    DVector<T>: std::ops::Add<Output = DVector<T>>,
{
    fn step(
        &self,
        func: &dyn Fn(&DVector<T>, T) -> DVector<T>,
        x0: &DVector<T>,
        t0: T,
        tf: T,
    ) -> DVector<T> {
        let dt: T = tf - t0;
        x0.clone() + dt * func(x0, t0) // Euler's method
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RK4;

impl<T> Integrator<T> for RK4
where
    T: Float + nalgebra::Scalar + std::ops::Mul<DVector<T>, Output = DVector<T>>,
    DVector<T>: std::ops::Add<Output = DVector<T>>,
{
    fn step(
        &self,
        func: &dyn Fn(&DVector<T>, T) -> DVector<T>,
        x0: &DVector<T>,
        t0: T,
        tf: T,
    ) -> DVector<T> {
        let dt = tf - t0;
        let two = T::one() + T::one();
        let half = T::one() / two;
        let sixth = T::one() / (two + two + two);

        let k1 = func(x0, t0);
        let k2 = func(&(x0.clone() + half * dt * k1.clone()), t0 + half * dt);
        let k3 = func(&(x0.clone() + half * dt * k2.clone()), t0 + half * dt);
        let k4 = func(&(x0.clone() + dt * k3.clone()), tf);

        x0.clone() + sixth * dt * (k1 + two * k2 + two * k3 + k4)
    }
}

/// The solver a simulated body is stepped with, as named in scenario files.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegratorKind {
    /// Forward Euler.
    Rk1,
    #[default]
    Rk4,
}

impl IntegratorKind {
    pub fn step(
        &self,
        func: &dyn Fn(&DVector<f64>, f64) -> DVector<f64>,
        x0: &DVector<f64>,
        t0: f64,
        tf: f64,
    ) -> DVector<f64> {
        match self {
            Self::Rk1 => RK1.step(func, x0, t0, tf),
            Self::Rk4 => RK4.step(func, x0, t0, tf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // x_dot = -x, so x(t) = exp(-t)
    fn decay(x: &DVector<f64>, _t: f64) -> DVector<f64> {
        -x.clone()
    }

    #[test]
    fn test_rk4_matches_exponential_decay() {
        let mut x = DVector::from_vec(vec![1.0]);
        let dt = 0.1;
        for k in 0..10 {
            let t0 = k as f64 * dt;
            x = RK4.step(&decay, &x, t0, t0 + dt);
        }
        assert_relative_eq!(x[0], (-1.0f64).exp(), epsilon = 1e-6);
    }

    #[test]
    fn test_rk1_is_first_order() {
        let x = RK1.step(&decay, &DVector::from_vec(vec![1.0]), 0.0, 0.1);
        assert_relative_eq!(x[0], 0.9, epsilon = 1e-12);
    }

    #[test]
    fn test_kind_dispatches_to_solver() {
        let x0 = DVector::from_vec(vec![1.0]);
        let euler = IntegratorKind::Rk1.step(&decay, &x0, 0.0, 0.1);
        assert_relative_eq!(euler[0], 0.9, epsilon = 1e-12);
        let rk4 = IntegratorKind::Rk4.step(&decay, &x0, 0.0, 0.1);
        assert_relative_eq!(rk4[0], (-0.1f64).exp(), epsilon = 1e-6);
        assert_eq!(IntegratorKind::default(), IntegratorKind::Rk4);
    }
}
