// alight_sim/src/simulation/mod.rs

//! Closed-loop software-in-the-loop simulation: a point-mass vehicle, a
//! moving landing pad and a noisy detector around the real mission core.

pub mod config;
pub mod detector;
pub mod integrators;
pub mod prng;
pub mod runner;
pub mod target;
pub mod vehicle;
