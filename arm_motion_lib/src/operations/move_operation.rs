use async_trait::async_trait;
use tracing::{debug, info};

use super::{MoveGroup, Plan};
use crate::error::MotionResult;
use crate::types::{CartesianPath, JointPath, JointTrajectory, JointValues, PlanParameters, Pose};

/// What a move operation moves to, or starts from.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveTarget {
    JointConfiguration(JointValues),
    CartesianPose(Pose),
    JointPath(JointPath),
    CartesianPath(CartesianPath),
}

impl MoveTarget {
    pub fn kind(&self) -> &'static str {
        match self {
            MoveTarget::JointConfiguration(_) => "joint configuration",
            MoveTarget::CartesianPose(_) => "cartesian pose",
            MoveTarget::JointPath(_) => "joint path",
            MoveTarget::CartesianPath(_) => "cartesian path",
        }
    }
}

impl From<JointValues> for MoveTarget {
    fn from(values: JointValues) -> Self {
        MoveTarget::JointConfiguration(values)
    }
}

impl From<Pose> for MoveTarget {
    fn from(pose: Pose) -> Self {
        MoveTarget::CartesianPose(pose)
    }
}

impl From<JointPath> for MoveTarget {
    fn from(path: JointPath) -> Self {
        MoveTarget::JointPath(path)
    }
}

impl From<CartesianPath> for MoveTarget {
    fn from(path: CartesianPath) -> Self {
        MoveTarget::CartesianPath(path)
    }
}

/// Settings shared by every kind of move operation.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveConfig {
    pub target: MoveTarget,
    /// `None` starts at the current state of the robot.
    pub start: Option<MoveTarget>,
    pub velocity_scaling: f64,
    pub acceleration_scaling: f64,
    pub collision_check: bool,
    pub sample_resolution: f64,
    pub max_deviation: f64,
}

/// Partial update of a move operation. Unset fields keep their value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoveArgs {
    pub target: Option<MoveTarget>,
    pub start: Option<MoveTarget>,
    pub velocity_scaling: Option<f64>,
    pub acceleration_scaling: Option<f64>,
    pub collision_check: Option<bool>,
    pub sample_resolution: Option<f64>,
    pub max_deviation: Option<f64>,
    /// Cartesian moves only.
    pub seed: Option<JointValues>,
    /// Cartesian moves only.
    pub ik_jump_threshold: Option<f64>,
}

impl MoveConfig {
    fn apply(&self, args: &MoveArgs) -> MoveConfig {
        MoveConfig {
            target: args.target.clone().unwrap_or_else(|| self.target.clone()),
            start: args.start.clone().or_else(|| self.start.clone()),
            velocity_scaling: args.velocity_scaling.unwrap_or(self.velocity_scaling),
            acceleration_scaling: args.acceleration_scaling.unwrap_or(self.acceleration_scaling),
            collision_check: args.collision_check.unwrap_or(self.collision_check),
            sample_resolution: args.sample_resolution.unwrap_or(self.sample_resolution),
            max_deviation: args.max_deviation.unwrap_or(self.max_deviation),
        }
    }
}

/// How a move operation turns its configuration into a trajectory.
#[async_trait]
pub trait PlanningStrategy: Clone + Send + Sync + Sized + 'static {
    const NAME: &'static str;

    fn validate_target(target: &MoveTarget) -> MotionResult<()>;

    fn validate_start(start: &MoveTarget) -> MotionResult<()>;

    /// Re-derive strategy state after the shared settings changed.
    fn configure(&self, parameters: &PlanParameters) -> MotionResult<Self>;

    /// Apply the strategy specific fields of `args`.
    fn apply_args(&self, args: &MoveArgs) -> MotionResult<Self>;

    fn fill_args(&self, args: &mut MoveArgs);

    async fn plan(&self, operation: &MoveOperation<Self>) -> MotionResult<JointTrajectory>;
}

/// Immutable move request. Every `with_*` validates and returns a new
/// operation, [`MoveOperation::plan`] is terminal.
#[derive(Debug, Clone)]
pub struct MoveOperation<S: PlanningStrategy> {
    move_group: MoveGroup,
    config: MoveConfig,
    plan_parameters: PlanParameters,
    strategy: S,
}

impl<S: PlanningStrategy> MoveOperation<S> {
    pub(crate) fn new(move_group: MoveGroup, config: MoveConfig, strategy: S) -> MotionResult<Self> {
        S::validate_target(&config.target)?;
        if let Some(start) = &config.start {
            S::validate_start(start)?;
        }
        let plan_parameters = move_group.build_plan_parameters(&config)?;
        let strategy = strategy.configure(&plan_parameters)?;
        Ok(Self {
            move_group,
            config,
            plan_parameters,
            strategy,
        })
    }

    fn rebuild(&self, config: MoveConfig, strategy: S) -> MotionResult<Self> {
        Self::new(self.move_group.clone(), config, strategy)
    }

    fn with_config<F>(&self, update: F) -> MotionResult<Self>
    where
        F: FnOnce(&mut MoveConfig),
    {
        let mut config = self.config.clone();
        update(&mut config);
        self.rebuild(config, self.strategy.clone())
    }

    pub(crate) fn with_strategy(&self, strategy: S) -> MotionResult<Self> {
        self.rebuild(self.config.clone(), strategy)
    }

    pub fn move_group(&self) -> &MoveGroup {
        &self.move_group
    }

    pub fn config(&self) -> &MoveConfig {
        &self.config
    }

    pub fn target(&self) -> &MoveTarget {
        &self.config.target
    }

    pub fn start(&self) -> Option<&MoveTarget> {
        self.config.start.as_ref()
    }

    pub fn velocity_scaling(&self) -> f64 {
        self.config.velocity_scaling
    }

    pub fn acceleration_scaling(&self) -> f64 {
        self.config.acceleration_scaling
    }

    pub fn collision_check(&self) -> bool {
        self.config.collision_check
    }

    pub fn sample_resolution(&self) -> f64 {
        self.config.sample_resolution
    }

    pub fn max_deviation(&self) -> f64 {
        self.config.max_deviation
    }

    pub fn plan_parameters(&self) -> &PlanParameters {
        &self.plan_parameters
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn with_target(&self, target: impl Into<MoveTarget>) -> MotionResult<Self> {
        let target = target.into();
        self.with_config(|c| c.target = target)
    }

    pub fn with_start(&self, start: impl Into<MoveTarget>) -> MotionResult<Self> {
        let start = start.into();
        self.with_config(|c| c.start = Some(start))
    }

    /// Start at the state of the robot when planning.
    pub fn with_current_start(&self) -> MotionResult<Self> {
        self.with_config(|c| c.start = None)
    }

    pub fn with_velocity_scaling(&self, value: f64) -> MotionResult<Self> {
        self.with_config(|c| c.velocity_scaling = value)
    }

    pub fn with_acceleration_scaling(&self, value: f64) -> MotionResult<Self> {
        self.with_config(|c| c.acceleration_scaling = value)
    }

    pub fn with_collision_check(&self, value: bool) -> MotionResult<Self> {
        self.with_config(|c| c.collision_check = value)
    }

    pub fn with_sample_resolution(&self, value: f64) -> MotionResult<Self> {
        self.with_config(|c| c.sample_resolution = value)
    }

    pub fn with_max_deviation(&self, value: f64) -> MotionResult<Self> {
        self.with_config(|c| c.max_deviation = value)
    }

    pub fn with_args(&self, args: &MoveArgs) -> MotionResult<Self> {
        let strategy = self.strategy.apply_args(args)?;
        self.rebuild(self.config.apply(args), strategy)
    }

    /// Snapshot of every setting as a fully populated [`MoveArgs`].
    pub fn to_args(&self) -> MoveArgs {
        let mut args = MoveArgs {
            target: Some(self.config.target.clone()),
            start: self.config.start.clone(),
            velocity_scaling: Some(self.config.velocity_scaling),
            acceleration_scaling: Some(self.config.acceleration_scaling),
            collision_check: Some(self.config.collision_check),
            sample_resolution: Some(self.config.sample_resolution),
            max_deviation: Some(self.config.max_deviation),
            seed: None,
            ik_jump_threshold: None,
        };
        self.strategy.fill_args(&mut args);
        args
    }

    pub async fn plan(&self) -> MotionResult<Plan> {
        info!(
            "Planning {} for move group {} (target: {})",
            S::NAME,
            self.move_group.name(),
            self.config.target.kind()
        );
        let trajectory = self.strategy.plan(self).await?;
        debug!(
            "Planned trajectory with {} points over {:.3}s",
            trajectory.len(),
            trajectory.duration().as_secs_f64()
        );
        Ok(Plan::new(
            self.move_group.clone(),
            trajectory,
            self.plan_parameters.clone(),
        ))
    }
}
