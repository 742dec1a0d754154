//! Interfaces of the remote collaborators: planner, kinematics solver,
//! trajectory executor and robot state.
//!
//! Implementations own the transport. Every call is async so other tasks
//! keep running while a request is in flight.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::ServiceError;
use crate::types::{
    CartesianPath, ErrorCode, IkResults, JointPath, JointSet, JointTrajectory, JointValues,
    PlanParameters, Pose, SteppedMotionState, TaskSpacePlanParameters,
};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[async_trait]
pub trait PlanningService: Send + Sync {
    async fn plan_move_joints(
        &self,
        path: &JointPath,
        parameters: &PlanParameters,
    ) -> ServiceResult<JointTrajectory>;

    async fn plan_collision_free_joint_path(
        &self,
        path: &JointPath,
        parameters: &PlanParameters,
    ) -> ServiceResult<JointPath>;

    async fn plan_move_pose_linear(
        &self,
        path: &CartesianPath,
        seed: &JointValues,
        parameters: &TaskSpacePlanParameters,
    ) -> ServiceResult<JointTrajectory>;
}

#[async_trait]
pub trait KinematicsService: Send + Sync {
    /// Joint configuration placing `end_effector_link` at `pose`. The seed
    /// selects the joints and the starting point of the solver.
    async fn inverse_kinematics(
        &self,
        end_effector_link: &str,
        pose: &Pose,
        collision_check: bool,
        seed: &JointValues,
    ) -> ServiceResult<JointValues>;

    /// One solution per pose, each seeded with the previous solution.
    async fn inverse_kinematics_many(
        &self,
        end_effector_link: &str,
        poses: &CartesianPath,
        collision_check: bool,
        seed: &JointValues,
    ) -> ServiceResult<IkResults>;
}

/// Final report of a trajectory execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub error_code: ErrorCode,
    pub message: String,
}

impl ExecutionResult {
    pub fn success() -> Self {
        Self {
            error_code: ErrorCode::Success,
            message: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error_code.is_success()
    }
}

/// Handle of a supervised execution the caller advances step by step.
#[async_trait]
pub trait SteppedMotion: Send + Sync {
    fn goal_id(&self) -> &str;

    async fn state(&self) -> ServiceResult<SteppedMotionState>;

    async fn next(&self) -> ServiceResult<()>;

    async fn previous(&self) -> ServiceResult<()>;

    async fn pause(&self) -> ServiceResult<()>;

    async fn resume(&self) -> ServiceResult<()>;

    async fn cancel(&self) -> ServiceResult<()>;

    /// Wait until the motion reached its goal or was aborted.
    async fn finished(&self) -> ServiceResult<ExecutionResult>;
}

#[async_trait]
pub trait ExecutionService: Send + Sync {
    /// Run `trajectory` to completion. Implementations must stop the motion
    /// and answer with [`ServiceError::Cancelled`] once `cancel` fires.
    async fn execute_joint_trajectory(
        &self,
        trajectory: &JointTrajectory,
        collision_check: bool,
        cancel: CancelSignal,
    ) -> ServiceResult<ExecutionResult>;

    async fn execute_joint_trajectory_supervised(
        &self,
        trajectory: &JointTrajectory,
        velocity_scaling: f64,
        collision_check: bool,
    ) -> ServiceResult<Box<dyn SteppedMotion>>;
}

#[async_trait]
pub trait RobotStateProvider: Send + Sync {
    async fn get_current_joint_positions(&self, joint_set: &JointSet) -> ServiceResult<JointValues>;

    async fn get_current_pose(&self, end_effector_link: &str) -> ServiceResult<Pose>;
}

/// The collaborators a move group talks to.
#[derive(Clone)]
pub struct MotionServices {
    pub planning: Arc<dyn PlanningService>,
    pub kinematics: Arc<dyn KinematicsService>,
    pub execution: Arc<dyn ExecutionService>,
    pub robot_state: Arc<dyn RobotStateProvider>,
}

/// Sending side of a cooperative cancellation request.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Receiving side handed to the executor.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    pub fn pair() -> (CancelHandle, CancelSignal) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle { tx }, CancelSignal { rx })
    }

    /// A signal that never fires.
    pub fn never() -> CancelSignal {
        let (_, signal) = Self::pair();
        signal
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation was requested. Pends forever if the handle
    /// is dropped without cancelling.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}
