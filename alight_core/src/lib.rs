// alight_core/src/lib.rs

// This file defines the public modules of the library.
pub mod clock;
pub mod config;
pub mod control;
pub mod control_loop;
pub mod error;
pub mod estimation;
pub mod frames;
pub mod guidance;
pub mod interfaces;
pub mod mission;
pub mod models;
pub mod prelude;
pub mod tracking;
pub mod types;
