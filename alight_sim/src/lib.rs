// alight_sim/src/lib.rs

// This prelude is for convenience for other files WITHIN the alight_sim crate.
pub mod prelude;

pub mod cli;
pub mod planning;
pub mod simulation;
