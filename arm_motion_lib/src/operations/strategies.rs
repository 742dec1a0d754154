//! Planning strategies for the five kinds of move operations.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{EndEffectorDescription, MoveArgs, MoveOperation, MoveTarget, PlanningStrategy};
use crate::error::{MotionError, MotionResult, ServiceError};
use crate::types::{
    CartesianPath, JointPath, JointTrajectory, JointValues, PlanParameters, Pose,
    TaskSpacePlanParameters,
};

pub type MoveJointsOperation = MoveOperation<JointMove>;
pub type MoveJointsCollisionFreeOperation = MoveOperation<JointMoveCollisionFree>;
pub type MoveCartesianOperation = MoveOperation<CartesianMove>;
pub type MoveCartesianCollisionFreeOperation = MoveOperation<CartesianMoveCollisionFree>;
pub type MoveCartesianLinearOperation = MoveOperation<CartesianMoveLinear>;

fn expect_joint_target(target: &MoveTarget) -> MotionResult<()> {
    match target {
        MoveTarget::JointConfiguration(_) | MoveTarget::JointPath(_) => Ok(()),
        other => Err(MotionError::TypeKindMismatch {
            expected: "joint configuration or joint path",
            found: other.kind(),
        }),
    }
}

fn expect_cartesian_target(target: &MoveTarget) -> MotionResult<()> {
    match target {
        MoveTarget::CartesianPose(_) | MoveTarget::CartesianPath(_) => Ok(()),
        other => Err(MotionError::TypeKindMismatch {
            expected: "cartesian pose or cartesian path",
            found: other.kind(),
        }),
    }
}

fn expect_joint_start(start: &MoveTarget) -> MotionResult<()> {
    match start {
        MoveTarget::JointConfiguration(_) => Ok(()),
        other => Err(MotionError::TypeKindMismatch {
            expected: "joint configuration",
            found: other.kind(),
        }),
    }
}

fn reject_cartesian_args(args: &MoveArgs) -> MotionResult<()> {
    if args.seed.is_some() || args.ik_jump_threshold.is_some() {
        return Err(MotionError::InvalidArgument(
            "seed and ik_jump_threshold only apply to cartesian moves".to_string(),
        ));
    }
    Ok(())
}

async fn current_or_given_joints<S: PlanningStrategy>(
    operation: &MoveOperation<S>,
    given: Option<&JointValues>,
) -> MotionResult<JointValues> {
    match given {
        Some(values) => Ok(values.clone()),
        None => {
            debug!("Using current joint positions of {}", operation.move_group().name());
            operation.move_group().get_current_joint_positions().await
        }
    }
}

/// Start joints plus joint target, aligned to the move group and checked
/// against its position limits.
async fn joint_space_path<S: PlanningStrategy>(
    operation: &MoveOperation<S>,
) -> MotionResult<JointPath> {
    let given = match operation.start() {
        Some(MoveTarget::JointConfiguration(values)) => Some(values),
        Some(other) => {
            return Err(MotionError::TypeKindMismatch {
                expected: "joint configuration",
                found: other.kind(),
            })
        }
        None => None,
    };
    let start = current_or_given_joints(operation, given).await?;

    let path = match operation.target() {
        MoveTarget::JointConfiguration(target) => {
            JointPath::from_start_stop_point(start, target.clone())?
        }
        MoveTarget::JointPath(target) => target.prepend(start)?,
        other => {
            return Err(MotionError::TypeKindMismatch {
                expected: "joint configuration or joint path",
                found: other.kind(),
            })
        }
    };

    let move_group = operation.move_group();
    let path = JointPath::new(move_group.joint_set().clone(), path.points().to_vec())?;
    for point in path.iter() {
        move_group.joint_limits().validate_positions(point)?;
    }
    Ok(path)
}

/// Fails on the first pair of consecutive configurations whose largest
/// per-joint difference exceeds `threshold`. The reported index is the one
/// of the later configuration.
pub fn check_ik_jumps(path: &JointPath, threshold: f64) -> MotionResult<()> {
    for (index, pair) in path.points().windows(2).enumerate() {
        let delta = pair[1].max_abs_diff(&pair[0])?;
        if delta > threshold {
            warn!(
                "IK jump of {:.4} at index {} exceeds threshold {:.4}",
                delta,
                index + 1,
                threshold
            );
            return Err(MotionError::IkJumpThreshold {
                index: index + 1,
                delta,
                threshold,
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JointMove;

#[async_trait]
impl PlanningStrategy for JointMove {
    const NAME: &'static str = "move joints";

    fn validate_target(target: &MoveTarget) -> MotionResult<()> {
        expect_joint_target(target)
    }

    fn validate_start(start: &MoveTarget) -> MotionResult<()> {
        expect_joint_start(start)
    }

    fn configure(&self, _: &PlanParameters) -> MotionResult<Self> {
        Ok(*self)
    }

    fn apply_args(&self, args: &MoveArgs) -> MotionResult<Self> {
        reject_cartesian_args(args)?;
        Ok(*self)
    }

    fn fill_args(&self, _: &mut MoveArgs) {}

    async fn plan(&self, operation: &MoveOperation<Self>) -> MotionResult<JointTrajectory> {
        let path = joint_space_path(operation).await?;
        let planning = &operation.move_group().services().planning;
        Ok(planning
            .plan_move_joints(&path, operation.plan_parameters())
            .await?)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JointMoveCollisionFree;

#[async_trait]
impl PlanningStrategy for JointMoveCollisionFree {
    const NAME: &'static str = "move joints collision free";

    fn validate_target(target: &MoveTarget) -> MotionResult<()> {
        expect_joint_target(target)
    }

    fn validate_start(start: &MoveTarget) -> MotionResult<()> {
        expect_joint_start(start)
    }

    fn configure(&self, _: &PlanParameters) -> MotionResult<Self> {
        Ok(*self)
    }

    fn apply_args(&self, args: &MoveArgs) -> MotionResult<Self> {
        reject_cartesian_args(args)?;
        Ok(*self)
    }

    fn fill_args(&self, _: &mut MoveArgs) {}

    async fn plan(&self, operation: &MoveOperation<Self>) -> MotionResult<JointTrajectory> {
        let path = joint_space_path(operation).await?;
        let planning = &operation.move_group().services().planning;
        let free_path = planning
            .plan_collision_free_joint_path(&path, operation.plan_parameters())
            .await?;
        Ok(planning
            .plan_move_joints(&free_path, operation.plan_parameters())
            .await?)
    }
}

/// End effector, seed and IK jump threshold of a cartesian move.
#[derive(Debug, Clone, PartialEq)]
pub struct CartesianSettings {
    end_effector: EndEffectorDescription,
    seed: Option<JointValues>,
    ik_jump_threshold: f64,
    task_space_parameters: TaskSpacePlanParameters,
}

impl CartesianSettings {
    pub(crate) fn new(end_effector: EndEffectorDescription, ik_jump_threshold: f64) -> Self {
        let task_space_parameters =
            TaskSpacePlanParameters::new(end_effector.name.clone(), end_effector.limits);
        Self {
            end_effector,
            seed: None,
            ik_jump_threshold,
            task_space_parameters,
        }
    }

    pub fn end_effector(&self) -> &EndEffectorDescription {
        &self.end_effector
    }

    pub fn seed(&self) -> Option<&JointValues> {
        self.seed.as_ref()
    }

    pub fn ik_jump_threshold(&self) -> f64 {
        self.ik_jump_threshold
    }

    pub fn task_space_parameters(&self) -> &TaskSpacePlanParameters {
        &self.task_space_parameters
    }

    fn configure(&self, parameters: &PlanParameters) -> MotionResult<Self> {
        Ok(Self {
            task_space_parameters: TaskSpacePlanParameters::from_plan_parameters(
                self.end_effector.name.clone(),
                self.end_effector.limits,
                parameters,
                self.ik_jump_threshold,
            )?,
            ..self.clone()
        })
    }

    fn apply_args(&self, args: &MoveArgs) -> Self {
        Self {
            seed: args.seed.clone().or_else(|| self.seed.clone()),
            ik_jump_threshold: args.ik_jump_threshold.unwrap_or(self.ik_jump_threshold),
            ..self.clone()
        }
    }

    fn fill_args(&self, args: &mut MoveArgs) {
        args.seed = self.seed.clone();
        args.ik_jump_threshold = Some(self.ik_jump_threshold);
    }
}

/// Access to the cartesian settings of a strategy.
pub trait CartesianStrategy: PlanningStrategy {
    fn settings(&self) -> &CartesianSettings;

    fn with_settings(&self, settings: CartesianSettings) -> Self;
}

impl<S: CartesianStrategy> MoveOperation<S> {
    pub fn end_effector(&self) -> &EndEffectorDescription {
        self.strategy().settings().end_effector()
    }

    pub fn seed(&self) -> Option<&JointValues> {
        self.strategy().settings().seed()
    }

    pub fn ik_jump_threshold(&self) -> f64 {
        self.strategy().settings().ik_jump_threshold()
    }

    pub fn task_space_plan_parameters(&self) -> &TaskSpacePlanParameters {
        self.strategy().settings().task_space_parameters()
    }

    pub fn with_seed(&self, seed: JointValues) -> MotionResult<Self> {
        let settings = CartesianSettings {
            seed: Some(seed),
            ..self.strategy().settings().clone()
        };
        self.with_strategy(self.strategy().with_settings(settings))
    }

    /// Seed the solver with the current joint positions when planning.
    pub fn with_current_seed(&self) -> MotionResult<Self> {
        let settings = CartesianSettings {
            seed: None,
            ..self.strategy().settings().clone()
        };
        self.with_strategy(self.strategy().with_settings(settings))
    }

    pub fn with_ik_jump_threshold(&self, value: f64) -> MotionResult<Self> {
        let settings = CartesianSettings {
            ik_jump_threshold: value,
            ..self.strategy().settings().clone()
        };
        self.with_strategy(self.strategy().with_settings(settings))
    }
}

/// Joint path through the IK solutions of the cartesian target, prefixed
/// with the start configuration.
async fn ik_joint_path<S: CartesianStrategy>(
    operation: &MoveOperation<S>,
) -> MotionResult<JointPath> {
    let settings = operation.strategy().settings();
    let link = settings.end_effector().link_name.as_str();
    let collision_check = operation.collision_check();
    let kinematics = &operation.move_group().services().kinematics;

    let seed = current_or_given_joints(operation, settings.seed()).await?;

    let start = match operation.start() {
        Some(MoveTarget::JointConfiguration(values)) => values.clone(),
        Some(MoveTarget::CartesianPose(pose)) => {
            debug!("Solving IK for start pose of {}", link);
            kinematics
                .inverse_kinematics(link, pose, collision_check, &seed)
                .await?
        }
        Some(other) => {
            return Err(MotionError::TypeKindMismatch {
                expected: "joint configuration or cartesian pose",
                found: other.kind(),
            })
        }
        None => match settings.seed() {
            Some(_) => current_or_given_joints(operation, None).await?,
            None => seed.clone(),
        },
    };

    let waypoints = cartesian_waypoints(operation.target())?;
    let results = kinematics
        .inverse_kinematics_many(link, &waypoints, collision_check, &seed)
        .await?;
    if let Some((index, code)) = results.first_failure() {
        return Err(ServiceError::failed(
            "inverse_kinematics_many",
            format!("no IK solution for waypoint {index}: {code}"),
        )
        .into());
    }
    debug!("Solved IK for {} waypoints", results.path.len());

    let path = results.path.prepend(start)?;
    check_ik_jumps(&path, settings.ik_jump_threshold())?;
    Ok(path)
}

fn cartesian_waypoints(target: &MoveTarget) -> MotionResult<CartesianPath> {
    match target {
        MoveTarget::CartesianPose(pose) => Ok(CartesianPath::from_one_point(pose.clone())),
        MoveTarget::CartesianPath(path) => Ok(path.clone()),
        other => Err(MotionError::TypeKindMismatch {
            expected: "cartesian pose or cartesian path",
            found: other.kind(),
        }),
    }
}

macro_rules! cartesian_strategy {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name(CartesianSettings);

        impl $name {
            pub(crate) fn new(settings: CartesianSettings) -> Self {
                Self(settings)
            }
        }

        impl CartesianStrategy for $name {
            fn settings(&self) -> &CartesianSettings {
                &self.0
            }

            fn with_settings(&self, settings: CartesianSettings) -> Self {
                Self(settings)
            }
        }
    };
}

cartesian_strategy!(CartesianMove);
cartesian_strategy!(CartesianMoveCollisionFree);
cartesian_strategy!(CartesianMoveLinear);

#[async_trait]
impl PlanningStrategy for CartesianMove {
    const NAME: &'static str = "move cartesian";

    fn validate_target(target: &MoveTarget) -> MotionResult<()> {
        expect_cartesian_target(target)
    }

    fn validate_start(start: &MoveTarget) -> MotionResult<()> {
        match start {
            MoveTarget::JointConfiguration(_) | MoveTarget::CartesianPose(_) => Ok(()),
            other => Err(MotionError::TypeKindMismatch {
                expected: "joint configuration or cartesian pose",
                found: other.kind(),
            }),
        }
    }

    fn configure(&self, parameters: &PlanParameters) -> MotionResult<Self> {
        Ok(Self(self.0.configure(parameters)?))
    }

    fn apply_args(&self, args: &MoveArgs) -> MotionResult<Self> {
        Ok(Self(self.0.apply_args(args)))
    }

    fn fill_args(&self, args: &mut MoveArgs) {
        self.0.fill_args(args)
    }

    async fn plan(&self, operation: &MoveOperation<Self>) -> MotionResult<JointTrajectory> {
        let path = ik_joint_path(operation).await?;
        let planning = &operation.move_group().services().planning;
        Ok(planning
            .plan_move_joints(&path, operation.plan_parameters())
            .await?)
    }
}

#[async_trait]
impl PlanningStrategy for CartesianMoveCollisionFree {
    const NAME: &'static str = "move cartesian collision free";

    fn validate_target(target: &MoveTarget) -> MotionResult<()> {
        CartesianMove::validate_target(target)
    }

    fn validate_start(start: &MoveTarget) -> MotionResult<()> {
        CartesianMove::validate_start(start)
    }

    fn configure(&self, parameters: &PlanParameters) -> MotionResult<Self> {
        Ok(Self(self.0.configure(parameters)?))
    }

    fn apply_args(&self, args: &MoveArgs) -> MotionResult<Self> {
        Ok(Self(self.0.apply_args(args)))
    }

    fn fill_args(&self, args: &mut MoveArgs) {
        self.0.fill_args(args)
    }

    async fn plan(&self, operation: &MoveOperation<Self>) -> MotionResult<JointTrajectory> {
        let path = ik_joint_path(operation).await?;
        let planning = &operation.move_group().services().planning;
        let free_path = planning
            .plan_collision_free_joint_path(&path, operation.plan_parameters())
            .await?;
        Ok(planning
            .plan_move_joints(&free_path, operation.plan_parameters())
            .await?)
    }
}

#[async_trait]
impl PlanningStrategy for CartesianMoveLinear {
    const NAME: &'static str = "move cartesian linear";

    fn validate_target(target: &MoveTarget) -> MotionResult<()> {
        expect_cartesian_target(target)
    }

    fn validate_start(start: &MoveTarget) -> MotionResult<()> {
        match start {
            MoveTarget::CartesianPose(_) => Ok(()),
            other => Err(MotionError::TypeKindMismatch {
                expected: "cartesian pose",
                found: other.kind(),
            }),
        }
    }

    fn configure(&self, parameters: &PlanParameters) -> MotionResult<Self> {
        Ok(Self(self.0.configure(parameters)?))
    }

    fn apply_args(&self, args: &MoveArgs) -> MotionResult<Self> {
        Ok(Self(self.0.apply_args(args)))
    }

    fn fill_args(&self, args: &mut MoveArgs) {
        self.0.fill_args(args)
    }

    async fn plan(&self, operation: &MoveOperation<Self>) -> MotionResult<JointTrajectory> {
        let settings = &self.0;
        let services = operation.move_group().services();
        let seed = current_or_given_joints(operation, settings.seed()).await?;

        let start: Pose = match operation.start() {
            Some(MoveTarget::CartesianPose(pose)) => pose.clone(),
            Some(other) => {
                return Err(MotionError::TypeKindMismatch {
                    expected: "cartesian pose",
                    found: other.kind(),
                })
            }
            None => {
                let link = &settings.end_effector().link_name;
                debug!("Using current pose of {}", link);
                services.robot_state.get_current_pose(link).await?
            }
        };

        let path = cartesian_waypoints(operation.target())?.prepend(start);
        Ok(services
            .planning
            .plan_move_pose_linear(&path, &seed, settings.task_space_parameters())
            .await?)
    }
}
