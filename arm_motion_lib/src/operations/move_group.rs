use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::strategies::{
    CartesianMove, CartesianMoveCollisionFree, CartesianMoveLinear, CartesianSettings,
    JointMove, JointMoveCollisionFree, MoveCartesianCollisionFreeOperation,
    MoveCartesianLinearOperation, MoveCartesianOperation, MoveJointsCollisionFreeOperation,
    MoveJointsOperation,
};
use super::{MoveConfig, MoveOperation, MoveTarget};
use crate::error::{MotionError, MotionResult};
use crate::services::MotionServices;
use crate::types::{
    EndEffectorLimits, JointLimits, JointSet, JointValues, MoveGroupConfig, PlanParameters,
    PlanningDefaults, Pose,
};

/// Named end effector link of a move group together with its Cartesian limits.
#[derive(Debug, Clone, PartialEq)]
pub struct EndEffectorDescription {
    pub name: String,
    pub link_name: String,
    pub limits: EndEffectorLimits,
}

/// A set of joints planned and executed together.
#[derive(Clone)]
pub struct MoveGroup {
    name: String,
    joint_limits: JointLimits,
    defaults: PlanningDefaults,
    end_effectors: Arc<[EndEffectorDescription]>,
    services: MotionServices,
}

impl MoveGroup {
    pub fn new(name: impl Into<String>, joint_limits: JointLimits, services: MotionServices) -> Self {
        Self {
            name: name.into(),
            joint_limits,
            defaults: PlanningDefaults::default(),
            end_effectors: Arc::from(Vec::new()),
            services,
        }
    }

    pub fn from_config(config: &MoveGroupConfig, services: MotionServices) -> eyre::Result<Self> {
        config.validate()?;
        let end_effectors: Vec<EndEffectorDescription> = config
            .end_effectors
            .iter()
            .map(|e| EndEffectorDescription {
                name: e.name.clone(),
                link_name: e.link_name.clone(),
                limits: e.limits,
            })
            .collect();
        debug!(
            "Move group {} with {} joints and {} end effectors",
            config.name,
            config.joints.len(),
            end_effectors.len()
        );
        Ok(Self {
            name: config.name.clone(),
            joint_limits: config.joint_limits()?,
            defaults: config.planning.clone(),
            end_effectors: end_effectors.into(),
            services,
        })
    }

    pub fn with_end_effector(&self, end_effector: EndEffectorDescription) -> MotionResult<Self> {
        if self.end_effectors.iter().any(|e| e.name == end_effector.name) {
            return Err(MotionError::DuplicateName(end_effector.name));
        }
        let mut end_effectors = self.end_effectors.to_vec();
        end_effectors.push(end_effector);
        Ok(Self {
            end_effectors: end_effectors.into(),
            ..self.clone()
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn joint_set(&self) -> &JointSet {
        self.joint_limits.joint_set()
    }

    pub fn joint_limits(&self) -> &JointLimits {
        &self.joint_limits
    }

    pub fn defaults(&self) -> &PlanningDefaults {
        &self.defaults
    }

    pub fn services(&self) -> &MotionServices {
        &self.services
    }

    pub fn end_effector_names(&self) -> Vec<&str> {
        self.end_effectors.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn end_effector(&self, name: &str) -> MotionResult<EndEffector> {
        self.end_effectors
            .iter()
            .find(|e| e.name == name)
            .map(|description| EndEffector {
                description: description.clone(),
                move_group: self.clone(),
            })
            .ok_or_else(|| MotionError::NameNotFound(name.to_string()))
    }

    /// The first configured end effector.
    pub fn default_end_effector(&self) -> MotionResult<EndEffector> {
        let description = self.end_effectors.first().ok_or_else(|| {
            MotionError::NameNotFound(format!("end effector of move group {}", self.name))
        })?;
        Ok(EndEffector {
            description: description.clone(),
            move_group: self.clone(),
        })
    }

    pub fn default_plan_parameters(&self) -> MotionResult<PlanParameters> {
        let d = &self.defaults;
        self.plan_parameters(
            d.velocity_scaling,
            d.acceleration_scaling,
            d.collision_check,
            d.sample_resolution,
            d.max_deviation,
        )
    }

    pub(crate) fn build_plan_parameters(&self, config: &MoveConfig) -> MotionResult<PlanParameters> {
        self.plan_parameters(
            config.velocity_scaling,
            config.acceleration_scaling,
            config.collision_check,
            config.sample_resolution,
            config.max_deviation,
        )
    }

    fn plan_parameters(
        &self,
        velocity_scaling: f64,
        acceleration_scaling: f64,
        collision_check: bool,
        sample_resolution: f64,
        max_deviation: f64,
    ) -> MotionResult<PlanParameters> {
        Ok(PlanParameters::new(self.name.clone(), self.joint_limits.clone())
            .with_velocity_scaling(velocity_scaling)?
            .with_acceleration_scaling(acceleration_scaling)?
            .with_sample_resolution(sample_resolution)?
            .with_max_deviation(max_deviation)?
            .with_collision_check(collision_check))
    }

    fn default_config(&self, target: MoveTarget) -> MoveConfig {
        MoveConfig {
            target,
            start: None,
            velocity_scaling: self.defaults.velocity_scaling,
            acceleration_scaling: self.defaults.acceleration_scaling,
            collision_check: self.defaults.collision_check,
            sample_resolution: self.defaults.sample_resolution,
            max_deviation: self.defaults.max_deviation,
        }
    }

    pub async fn get_current_joint_positions(&self) -> MotionResult<JointValues> {
        Ok(self
            .services
            .robot_state
            .get_current_joint_positions(self.joint_set())
            .await?)
    }

    pub fn move_joints(&self, target: impl Into<MoveTarget>) -> MotionResult<MoveJointsOperation> {
        MoveOperation::new(self.clone(), self.default_config(target.into()), JointMove)
    }

    pub fn move_joints_collision_free(
        &self,
        target: impl Into<MoveTarget>,
    ) -> MotionResult<MoveJointsCollisionFreeOperation> {
        MoveOperation::new(
            self.clone(),
            self.default_config(target.into()),
            JointMoveCollisionFree,
        )
    }
}

impl fmt::Debug for MoveGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoveGroup")
            .field("name", &self.name)
            .field("joint_set", self.joint_set())
            .field("end_effectors", &self.end_effector_names())
            .finish()
    }
}

/// Handle for planning Cartesian moves of one end effector.
#[derive(Debug, Clone)]
pub struct EndEffector {
    description: EndEffectorDescription,
    move_group: MoveGroup,
}

impl EndEffector {
    pub fn name(&self) -> &str {
        &self.description.name
    }

    pub fn link_name(&self) -> &str {
        &self.description.link_name
    }

    pub fn limits(&self) -> &EndEffectorLimits {
        &self.description.limits
    }

    pub fn move_group(&self) -> &MoveGroup {
        &self.move_group
    }

    pub async fn get_current_pose(&self) -> MotionResult<Pose> {
        Ok(self
            .move_group
            .services()
            .robot_state
            .get_current_pose(self.link_name())
            .await?)
    }

    /// Joint configuration reaching `pose`, seeded with `seed` or the
    /// current joint positions.
    pub async fn inverse_kinematics(
        &self,
        pose: &Pose,
        collision_check: bool,
        seed: Option<&JointValues>,
    ) -> MotionResult<JointValues> {
        let seed = match seed {
            Some(seed) => seed.clone(),
            None => self.move_group.get_current_joint_positions().await?,
        };
        Ok(self
            .move_group
            .services()
            .kinematics
            .inverse_kinematics(self.link_name(), pose, collision_check, &seed)
            .await?)
    }

    fn settings(&self) -> CartesianSettings {
        CartesianSettings::new(
            self.description.clone(),
            self.move_group.defaults().ik_jump_threshold,
        )
    }

    pub fn move_poses(&self, target: impl Into<MoveTarget>) -> MotionResult<MoveCartesianOperation> {
        MoveOperation::new(
            self.move_group.clone(),
            self.move_group.default_config(target.into()),
            CartesianMove::new(self.settings()),
        )
    }

    pub fn move_poses_collision_free(
        &self,
        target: impl Into<MoveTarget>,
    ) -> MotionResult<MoveCartesianCollisionFreeOperation> {
        MoveOperation::new(
            self.move_group.clone(),
            self.move_group.default_config(target.into()),
            CartesianMoveCollisionFree::new(self.settings()),
        )
    }

    pub fn move_poses_linear(
        &self,
        target: impl Into<MoveTarget>,
    ) -> MotionResult<MoveCartesianLinearOperation> {
        MoveOperation::new(
            self.move_group.clone(),
            self.move_group.default_config(target.into()),
            CartesianMoveLinear::new(self.settings()),
        )
    }
}
