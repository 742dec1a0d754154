use serde::{Deserialize, Serialize};

/// Cartesian velocity and acceleration bounds of an end effector. `None`
/// means unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EndEffectorLimits {
    pub max_xyz_velocity: Option<f64>,
    pub max_xyz_acceleration: Option<f64>,
    pub max_angular_velocity: Option<f64>,
    pub max_angular_acceleration: Option<f64>,
}

impl EndEffectorLimits {
    pub fn new(
        max_xyz_velocity: f64,
        max_xyz_acceleration: f64,
        max_angular_velocity: f64,
        max_angular_acceleration: f64,
    ) -> Self {
        Self {
            max_xyz_velocity: Some(max_xyz_velocity),
            max_xyz_acceleration: Some(max_xyz_acceleration),
            max_angular_velocity: Some(max_angular_velocity),
            max_angular_acceleration: Some(max_angular_acceleration),
        }
    }

    pub fn scaled(&self, velocity_scaling: f64, acceleration_scaling: f64) -> Self {
        Self {
            max_xyz_velocity: self.max_xyz_velocity.map(|v| v * velocity_scaling),
            max_xyz_acceleration: self.max_xyz_acceleration.map(|a| a * acceleration_scaling),
            max_angular_velocity: self.max_angular_velocity.map(|v| v * velocity_scaling),
            max_angular_acceleration: self
                .max_angular_acceleration
                .map(|a| a * acceleration_scaling),
        }
    }
}
