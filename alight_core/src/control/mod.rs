// alight_core/src/control/mod.rs

pub mod cascaded;
pub mod pid;
