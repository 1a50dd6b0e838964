// alight_core/src/guidance/hover.rs

use nalgebra::Vector3;

/// The world-frame point the vehicle holds when nothing else is steering it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HoverPoint {
    pub initialized: bool,
    pub position: Vector3<f64>,
}

impl HoverPoint {
    pub fn set(&mut self, position: Vector3<f64>) {
        self.initialized = true;
        self.position = position;
    }

    /// Sets only x and y, keeping the current height.
    pub fn set_xy(&mut self, x: f64, y: f64) {
        self.initialized = true;
        self.position.x = x;
        self.position.y = y;
    }

    /// The hover height is the z of the hover point.
    pub fn height(&self) -> f64 {
        self.position.z
    }

    pub fn set_height(&mut self, height: f64) {
        self.position.z = height;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
