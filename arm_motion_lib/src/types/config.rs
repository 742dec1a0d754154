use eyre::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;

use super::plan_parameters::{
    DEFAULT_IK_JUMP_THRESHOLD, DEFAULT_MAX_DEVIATION, DEFAULT_SAMPLE_RESOLUTION,
};
use super::{EndEffectorLimits, JointLimits, JointSet};

/// Static description of a move group, loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveGroupConfig {
    pub name: String,
    pub joints: Vec<JointConfig>,
    #[serde(default)]
    pub planning: PlanningDefaults,
    #[serde(default)]
    pub end_effectors: Vec<EndEffectorConfig>,
}

/// Limits of one joint. Missing values mean unconstrained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointConfig {
    pub name: String,
    pub min_position: Option<f64>,
    pub max_position: Option<f64>,
    pub max_velocity: Option<f64>,
    pub max_acceleration: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningDefaults {
    pub velocity_scaling: f64,
    pub acceleration_scaling: f64,
    pub collision_check: bool,
    pub sample_resolution: f64,
    pub max_deviation: f64,
    pub ik_jump_threshold: f64,
}

impl Default for PlanningDefaults {
    fn default() -> Self {
        Self {
            velocity_scaling: 1.0,
            acceleration_scaling: 1.0,
            collision_check: true,
            sample_resolution: DEFAULT_SAMPLE_RESOLUTION,
            max_deviation: DEFAULT_MAX_DEVIATION,
            ik_jump_threshold: DEFAULT_IK_JUMP_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndEffectorConfig {
    pub name: String,
    pub link_name: String,
    #[serde(flatten)]
    pub limits: EndEffectorLimits,
}

impl MoveGroupConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: MoveGroupConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.joints.is_empty() {
            return Err(eyre::eyre!("Move group '{}' has no joints", self.name));
        }

        let mut names = HashSet::new();
        for joint in &self.joints {
            if !names.insert(joint.name.as_str()) {
                return Err(eyre::eyre!("Joint '{}' is configured twice", joint.name));
            }
            if let (Some(min), Some(max)) = (joint.min_position, joint.max_position) {
                if min > max {
                    return Err(eyre::eyre!(
                        "Joint '{}' min_position ({}) exceeds max_position ({})",
                        joint.name,
                        min,
                        max
                    ));
                }
            }
        }

        let mut end_effectors = HashSet::new();
        for end_effector in &self.end_effectors {
            if !end_effectors.insert(end_effector.name.as_str()) {
                return Err(eyre::eyre!(
                    "End effector '{}' is configured twice",
                    end_effector.name
                ));
            }
        }

        let planning = &self.planning;
        for (name, value) in [
            ("velocity_scaling", planning.velocity_scaling),
            ("acceleration_scaling", planning.acceleration_scaling),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(eyre::eyre!("{} ({}) must be between 0.0 and 1.0", name, value));
            }
        }
        if !(planning.sample_resolution.is_finite() && planning.sample_resolution > 0.0) {
            return Err(eyre::eyre!(
                "sample_resolution ({}) must be positive",
                planning.sample_resolution
            ));
        }
        if !(planning.ik_jump_threshold.is_finite() && planning.ik_jump_threshold > 0.0) {
            return Err(eyre::eyre!(
                "ik_jump_threshold ({}) must be positive",
                planning.ik_jump_threshold
            ));
        }
        if !(planning.max_deviation.is_finite() && planning.max_deviation >= 0.0) {
            return Err(eyre::eyre!(
                "max_deviation ({}) must not be negative",
                planning.max_deviation
            ));
        }

        Ok(())
    }

    pub fn joint_set(&self) -> Result<JointSet> {
        Ok(JointSet::new(self.joints.iter().map(|j| j.name.clone()))?)
    }

    pub fn joint_limits(&self) -> Result<JointLimits> {
        let column = |f: fn(&JointConfig) -> Option<f64>| -> Vec<f64> {
            self.joints.iter().map(|j| f(j).unwrap_or(f64::NAN)).collect()
        };
        Ok(JointLimits::new(
            self.joint_set()?,
            column(|j| j.max_velocity),
            column(|j| j.max_acceleration),
            column(|j| j.min_position),
            column(|j| j.max_position),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
name = "arm"

[[joints]]
name = "joint1"
min_position = -3.0
max_position = 3.0
max_velocity = 1.5
max_acceleration = 2.0

[[joints]]
name = "joint2"
max_velocity = 1.0

[planning]
velocity_scaling = 0.5
ik_jump_threshold = 0.8

[[end_effectors]]
name = "tool"
link_name = "tool0"
max_xyz_velocity = 0.5
max_angular_velocity = 1.0
"#;

    #[test]
    fn test_parse_config() {
        let config = MoveGroupConfig::from_toml_str(CONFIG).unwrap();
        assert_eq!(config.name, "arm");
        assert_eq!(config.planning.velocity_scaling, 0.5);
        assert_eq!(config.planning.sample_resolution, 0.08);
        assert_eq!(config.end_effectors[0].limits.max_xyz_velocity, Some(0.5));
        assert_eq!(config.end_effectors[0].limits.max_xyz_acceleration, None);

        let limits = config.joint_limits().unwrap();
        assert_eq!(limits.max_velocity(), &[1.5, 1.0]);
        assert!(limits.min_position()[1].is_nan());
    }

    #[test]
    fn test_validate_rejects_duplicate_joints() {
        let mut config = MoveGroupConfig::from_toml_str(CONFIG).unwrap();
        config.joints[1].name = "joint1".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_scaling() {
        let mut config = MoveGroupConfig::from_toml_str(CONFIG).unwrap();
        config.planning.acceleration_scaling = 1.2;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("acceleration_scaling"));
    }

    #[test]
    fn test_missing_file() {
        assert!(MoveGroupConfig::load_from_file("/nonexistent/arm.toml").is_err());
    }
}
