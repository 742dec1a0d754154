use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use super::MoveGroup;
use crate::error::{MotionError, MotionResult, ServiceError};
use crate::services::{CancelHandle, CancelSignal, ExecutionResult, SteppedMotion};
use crate::types::{ErrorCode, JointTrajectory, PlanParameters};

const EXECUTE_OPERATION: &str = "execute_joint_trajectory";

/// A planned trajectory together with the parameters it was planned with.
#[derive(Debug, Clone)]
pub struct Plan {
    id: Uuid,
    move_group: MoveGroup,
    trajectory: JointTrajectory,
    parameters: PlanParameters,
}

impl Plan {
    pub fn new(move_group: MoveGroup, trajectory: JointTrajectory, parameters: PlanParameters) -> Self {
        Self {
            id: Uuid::new_v4(),
            move_group,
            trajectory,
            parameters,
        }
    }

    /// Identifier used to correlate log lines of planning and execution.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn move_group(&self) -> &MoveGroup {
        &self.move_group
    }

    pub fn trajectory(&self) -> &JointTrajectory {
        &self.trajectory
    }

    pub fn parameters(&self) -> &PlanParameters {
        &self.parameters
    }

    /// Start executing on the tokio runtime. Must be called from within a
    /// runtime. Dropping the returned task detaches the execution.
    pub fn execute_async(&self) -> ExecutionTask {
        let (cancel, signal) = CancelSignal::pair();
        let execution = self.move_group.services().execution.clone();
        let trajectory = self.trajectory.clone();
        let collision_check = self.parameters.collision_check();
        let id = self.id;

        info!(
            "Executing plan {} on {} ({} points, {:.3}s)",
            id,
            self.move_group.name(),
            trajectory.len(),
            trajectory.duration().as_secs_f64()
        );

        let handle = tokio::spawn(async move {
            let result = execution
                .execute_joint_trajectory(&trajectory, collision_check, signal.clone())
                .await;
            match result {
                Ok(result) if result.is_success() => {
                    info!("Plan {} executed", id);
                    Ok(result)
                }
                Ok(result) if result.error_code == ErrorCode::Preempted && signal.is_cancelled() => {
                    warn!("Execution of plan {} cancelled", id);
                    Err(MotionError::Cancelled)
                }
                Ok(result) => {
                    warn!(
                        "Execution of plan {} failed with {}: {}",
                        id, result.error_code, result.message
                    );
                    Err(ServiceError::ErrorCode {
                        operation: EXECUTE_OPERATION.to_string(),
                        code: result.error_code,
                    }
                    .into())
                }
                Err(ServiceError::Cancelled) => {
                    warn!("Execution of plan {} cancelled", id);
                    Err(MotionError::Cancelled)
                }
                Err(e) => {
                    warn!("Execution of plan {} failed: {}", id, e);
                    Err(e.into())
                }
            }
        });

        ExecutionTask { id, cancel, handle }
    }

    /// Hand the trajectory to the executor for stepwise supervised execution.
    pub async fn execute_supervised(&self) -> MotionResult<Box<dyn SteppedMotion>> {
        info!("Supervised execution of plan {} on {}", self.id, self.move_group.name());
        Ok(self
            .move_group
            .services()
            .execution
            .execute_joint_trajectory_supervised(
                &self.trajectory,
                1.0,
                self.parameters.collision_check(),
            )
            .await?)
    }
}

/// Running execution started by [`Plan::execute_async`]. Await it for the
/// outcome.
#[derive(Debug)]
pub struct ExecutionTask {
    id: Uuid,
    cancel: CancelHandle,
    handle: JoinHandle<MotionResult<ExecutionResult>>,
}

impl ExecutionTask {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Ask the executor to stop. The task then resolves to
    /// [`MotionError::Cancelled`].
    pub fn cancel(&self) {
        info!("Cancelling execution of plan {}", self.id);
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn join(self) -> MotionResult<ExecutionResult> {
        self.await
    }
}

impl Future for ExecutionTask {
    type Output = MotionResult<ExecutionResult>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle).poll(cx).map(|joined| {
            joined.unwrap_or_else(|e| {
                Err(ServiceError::failed(EXECUTE_OPERATION, format!("execution task failed: {e}")).into())
            })
        })
    }
}
