mod common;

use arm_motion_lib::{init_tracing_with, ErrorCode, ExecutionResult, MotionError, ServiceError};
use common::{fixture, fixture_with, values};
use std::time::Duration;

#[tokio::test]
async fn test_execute_async_reports_success() {
    let f = fixture();
    let plan = f
        .move_group
        .move_joints(values([1.0, 0.0, 0.0]))
        .unwrap()
        .plan()
        .await
        .unwrap();

    let result = plan.execute_async().await.unwrap();
    assert!(result.is_success());
    assert!(f
        .recorder
        .calls()
        .contains(&"execute_joint_trajectory".to_string()));
}

#[tokio::test]
async fn test_execute_async_cancel() {
    let _guard = init_tracing_with("arm_motion_lib=debug");
    let f = fixture_with(true, ExecutionResult::success());
    let plan = f
        .move_group
        .move_joints(values([1.0, 0.0, 0.0]))
        .unwrap()
        .plan()
        .await
        .unwrap();

    let task = plan.execute_async();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!task.is_finished());
    assert_eq!(task.id(), plan.id());

    task.cancel();
    let err = tokio::time::timeout(Duration::from_secs(1), task.join())
        .await
        .unwrap()
        .unwrap_err();
    assert_eq!(err, MotionError::Cancelled);
    assert!(err.is_cancelled());
}

#[tokio::test]
async fn test_execute_async_failure_code() {
    let f = fixture_with(
        false,
        ExecutionResult {
            error_code: ErrorCode::ControlFailed,
            message: "controller fault".to_string(),
        },
    );
    let plan = f
        .move_group
        .move_joints(values([1.0, 0.0, 0.0]))
        .unwrap()
        .plan()
        .await
        .unwrap();

    let err = plan.execute_async().join().await.unwrap_err();
    assert_eq!(
        err,
        MotionError::ServiceFailure(ServiceError::ErrorCode {
            operation: "execute_joint_trajectory".to_string(),
            code: ErrorCode::ControlFailed,
        })
    );
}

#[tokio::test]
async fn test_execute_supervised_steps() {
    let f = fixture();
    let plan = f
        .move_group
        .move_joints(values([1.0, 0.0, 0.0]))
        .unwrap()
        .plan()
        .await
        .unwrap();

    let motion = plan.execute_supervised().await.unwrap();
    assert_eq!(motion.goal_id(), "goal-1");
    assert_eq!(motion.state().await.unwrap().error_code, ErrorCode::Progress);

    motion.next().await.unwrap();
    let state = motion.state().await.unwrap();
    assert!(state.is_finished());
    assert_eq!(state.progress, 1.0);

    motion.previous().await.unwrap();
    motion.pause().await.unwrap();
    motion.resume().await.unwrap();
    motion.cancel().await.unwrap();
    let result = motion.finished().await.unwrap();
    assert_eq!(result.error_code, ErrorCode::Preempted);
}
