use super::{EndEffectorLimits, JointLimits};
use crate::error::{MotionError, MotionResult};

pub const DEFAULT_SAMPLE_RESOLUTION: f64 = 0.08;
pub const DEFAULT_MAX_DEVIATION: f64 = 0.2;
pub const DEFAULT_IK_JUMP_THRESHOLD: f64 = 1.2;

pub(crate) fn check_scaling(name: &'static str, value: f64) -> MotionResult<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(MotionError::ScalingOutOfRange { name, value })
    }
}

pub(crate) fn check_positive(name: &str, value: f64) -> MotionResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(MotionError::OutOfRange(format!(
            "{name} {value} must be finite and positive"
        )))
    }
}

pub(crate) fn check_non_negative(name: &str, value: f64) -> MotionResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(MotionError::OutOfRange(format!(
            "{name} {value} must be finite and non-negative"
        )))
    }
}

/// Joint space planning request parameters.
///
/// `joint_limits` are the unscaled limits of the move group, the scaling
/// factors are applied by [`PlanParameters::scaled_joint_limits`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlanParameters {
    move_group_name: String,
    joint_limits: JointLimits,
    velocity_scaling: f64,
    acceleration_scaling: f64,
    sample_resolution: f64,
    collision_check: bool,
    max_deviation: f64,
}

impl PlanParameters {
    pub fn new(move_group_name: impl Into<String>, joint_limits: JointLimits) -> Self {
        Self {
            move_group_name: move_group_name.into(),
            joint_limits,
            velocity_scaling: 1.0,
            acceleration_scaling: 1.0,
            sample_resolution: DEFAULT_SAMPLE_RESOLUTION,
            collision_check: true,
            max_deviation: DEFAULT_MAX_DEVIATION,
        }
    }

    pub fn move_group_name(&self) -> &str {
        &self.move_group_name
    }

    pub fn joint_limits(&self) -> &JointLimits {
        &self.joint_limits
    }

    pub fn velocity_scaling(&self) -> f64 {
        self.velocity_scaling
    }

    pub fn acceleration_scaling(&self) -> f64 {
        self.acceleration_scaling
    }

    pub fn sample_resolution(&self) -> f64 {
        self.sample_resolution
    }

    pub fn collision_check(&self) -> bool {
        self.collision_check
    }

    pub fn max_deviation(&self) -> f64 {
        self.max_deviation
    }

    pub fn scaled_joint_limits(&self) -> JointLimits {
        self.joint_limits
            .scaled(self.velocity_scaling, self.acceleration_scaling)
    }

    pub fn with_joint_limits(&self, joint_limits: JointLimits) -> Self {
        Self {
            joint_limits,
            ..self.clone()
        }
    }

    pub fn with_velocity_scaling(&self, value: f64) -> MotionResult<Self> {
        Ok(Self {
            velocity_scaling: check_scaling("velocity_scaling", value)?,
            ..self.clone()
        })
    }

    pub fn with_acceleration_scaling(&self, value: f64) -> MotionResult<Self> {
        Ok(Self {
            acceleration_scaling: check_scaling("acceleration_scaling", value)?,
            ..self.clone()
        })
    }

    pub fn with_sample_resolution(&self, value: f64) -> MotionResult<Self> {
        Ok(Self {
            sample_resolution: check_positive("sample_resolution", value)?,
            ..self.clone()
        })
    }

    pub fn with_collision_check(&self, value: bool) -> Self {
        Self {
            collision_check: value,
            ..self.clone()
        }
    }

    pub fn with_max_deviation(&self, value: f64) -> MotionResult<Self> {
        Ok(Self {
            max_deviation: check_non_negative("max_deviation", value)?,
            ..self.clone()
        })
    }
}

/// Cartesian planning request parameters for one end effector.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSpacePlanParameters {
    end_effector_name: String,
    end_effector_limits: EndEffectorLimits,
    velocity_scaling: f64,
    acceleration_scaling: f64,
    sample_resolution: f64,
    collision_check: bool,
    max_deviation: f64,
    ik_jump_threshold: f64,
}

impl TaskSpacePlanParameters {
    pub fn new(end_effector_name: impl Into<String>, end_effector_limits: EndEffectorLimits) -> Self {
        Self {
            end_effector_name: end_effector_name.into(),
            end_effector_limits,
            velocity_scaling: 1.0,
            acceleration_scaling: 1.0,
            sample_resolution: DEFAULT_SAMPLE_RESOLUTION,
            collision_check: true,
            max_deviation: DEFAULT_MAX_DEVIATION,
            ik_jump_threshold: DEFAULT_IK_JUMP_THRESHOLD,
        }
    }

    /// Take scaling, sampling and collision settings from joint space parameters.
    pub fn from_plan_parameters(
        end_effector_name: impl Into<String>,
        end_effector_limits: EndEffectorLimits,
        parameters: &PlanParameters,
        ik_jump_threshold: f64,
    ) -> MotionResult<Self> {
        Ok(Self {
            end_effector_name: end_effector_name.into(),
            end_effector_limits,
            velocity_scaling: parameters.velocity_scaling,
            acceleration_scaling: parameters.acceleration_scaling,
            sample_resolution: parameters.sample_resolution,
            collision_check: parameters.collision_check,
            max_deviation: parameters.max_deviation,
            ik_jump_threshold: check_positive("ik_jump_threshold", ik_jump_threshold)?,
        })
    }

    pub fn end_effector_name(&self) -> &str {
        &self.end_effector_name
    }

    pub fn end_effector_limits(&self) -> &EndEffectorLimits {
        &self.end_effector_limits
    }

    pub fn scaled_end_effector_limits(&self) -> EndEffectorLimits {
        self.end_effector_limits
            .scaled(self.velocity_scaling, self.acceleration_scaling)
    }

    pub fn velocity_scaling(&self) -> f64 {
        self.velocity_scaling
    }

    pub fn acceleration_scaling(&self) -> f64 {
        self.acceleration_scaling
    }

    pub fn sample_resolution(&self) -> f64 {
        self.sample_resolution
    }

    pub fn collision_check(&self) -> bool {
        self.collision_check
    }

    pub fn max_deviation(&self) -> f64 {
        self.max_deviation
    }

    pub fn ik_jump_threshold(&self) -> f64 {
        self.ik_jump_threshold
    }

    pub fn with_ik_jump_threshold(&self, value: f64) -> MotionResult<Self> {
        Ok(Self {
            ik_jump_threshold: check_positive("ik_jump_threshold", value)?,
            ..self.clone()
        })
    }

    pub fn with_collision_check(&self, value: bool) -> Self {
        Self {
            collision_check: value,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::JointSet;

    fn limits() -> JointLimits {
        JointLimits::new(JointSet::parse("a,b").unwrap(), 2.0, 4.0, -3.0, 3.0).unwrap()
    }

    #[test]
    fn test_defaults() {
        let params = PlanParameters::new("arm", limits());
        assert_eq!(params.sample_resolution(), 0.08);
        assert_eq!(params.max_deviation(), 0.2);
        assert!(params.collision_check());
        assert_eq!(params.velocity_scaling(), 1.0);
    }

    #[test]
    fn test_with_velocity_scaling_returns_new_instance() {
        let params = PlanParameters::new("arm", limits());
        let slow = params.with_velocity_scaling(0.5).unwrap();
        assert_eq!(slow.velocity_scaling(), 0.5);
        assert_eq!(params.velocity_scaling(), 1.0);
        assert_eq!(slow.scaled_joint_limits().max_velocity(), &[1.0, 1.0]);
    }

    #[test]
    fn test_scaling_out_of_range() {
        let params = PlanParameters::new("arm", limits());
        assert_eq!(
            params.with_acceleration_scaling(1.5).unwrap_err(),
            MotionError::ScalingOutOfRange {
                name: "acceleration_scaling",
                value: 1.5
            }
        );
        assert!(params.with_velocity_scaling(f64::NAN).is_err());
    }

    #[test]
    fn test_numeric_knobs_validated() {
        let params = PlanParameters::new("arm", limits());
        assert!(params.with_sample_resolution(0.0).is_err());
        assert!(params.with_sample_resolution(f64::INFINITY).is_err());
        assert!(params.with_max_deviation(-0.1).is_err());
        assert_eq!(params.with_max_deviation(0.0).unwrap().max_deviation(), 0.0);
    }

    #[test]
    fn test_task_space_from_plan_parameters() {
        let params = PlanParameters::new("arm", limits())
            .with_velocity_scaling(0.5)
            .unwrap()
            .with_collision_check(false);
        let task = TaskSpacePlanParameters::from_plan_parameters(
            "tool",
            EndEffectorLimits::new(1.0, 1.0, 2.0, 2.0),
            &params,
            DEFAULT_IK_JUMP_THRESHOLD,
        )
        .unwrap();
        assert!(!task.collision_check());
        assert_eq!(task.ik_jump_threshold(), 1.2);
        assert_eq!(task.scaled_end_effector_limits().max_angular_velocity, Some(1.0));
    }
}
