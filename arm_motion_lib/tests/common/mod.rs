//! In-memory collaborators for exercising move operations without a robot.

#![allow(dead_code)]

use arm_motion_lib::{
    CancelSignal, CartesianPath, ErrorCode, ExecutionResult,
    ExecutionService, IkResults, JointLimits, JointPath, JointSet, JointTrajectory,
    JointTrajectoryPoint, JointValues, KinematicsService, MotionServices, MoveGroup,
    PlanParameters, PlanningService, Pose, RobotStateProvider, ServiceError, ServiceResult,
    SteppedMotion, SteppedMotionState, TaskSpacePlanParameters,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn joints() -> JointSet {
    JointSet::parse("j1,j2,j3").unwrap()
}

pub fn values(v: [f64; 3]) -> JointValues {
    JointValues::new(joints(), v.to_vec()).unwrap()
}

pub fn pose_at(x: f64, y: f64, z: f64) -> Pose {
    Pose::identity().translate(&nalgebra::Vector3::new(x, y, z))
}

/// Trajectory with one point per path point, one second apart, at rest.
fn trajectory_from(path: &JointPath) -> JointTrajectory {
    let points = path
        .iter()
        .enumerate()
        .map(|(i, p)| {
            JointTrajectoryPoint::new(
                Duration::from_secs(i as u64),
                p.clone(),
                Some(JointValues::zero(p.joint_set().clone())),
                None,
                None,
            )
            .unwrap()
        })
        .collect();
    JointTrajectory::new(path.joint_set().clone(), points).unwrap()
}

#[derive(Default)]
pub struct Recorder {
    calls: Mutex<Vec<String>>,
    joint_paths: Mutex<Vec<JointPath>>,
    cartesian_paths: Mutex<Vec<CartesianPath>>,
    parameters: Mutex<Vec<PlanParameters>>,
    joint_state_requests: AtomicUsize,
}

impl Recorder {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_joint_path(&self) -> JointPath {
        self.joint_paths.lock().unwrap().last().cloned().unwrap()
    }

    pub fn last_cartesian_path(&self) -> CartesianPath {
        self.cartesian_paths.lock().unwrap().last().cloned().unwrap()
    }

    pub fn last_parameters(&self) -> PlanParameters {
        self.parameters.lock().unwrap().last().cloned().unwrap()
    }

    /// Number of current joint position requests, kept apart from `calls`.
    pub fn joint_state_requests(&self) -> usize {
        self.joint_state_requests.load(Ordering::SeqCst)
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

pub struct FakePlanner {
    pub recorder: Arc<Recorder>,
}

#[async_trait]
impl PlanningService for FakePlanner {
    async fn plan_move_joints(
        &self,
        path: &JointPath,
        parameters: &PlanParameters,
    ) -> ServiceResult<JointTrajectory> {
        self.recorder.record("plan_move_joints");
        self.recorder.joint_paths.lock().unwrap().push(path.clone());
        self.recorder.parameters.lock().unwrap().push(parameters.clone());
        Ok(trajectory_from(path))
    }

    async fn plan_collision_free_joint_path(
        &self,
        path: &JointPath,
        _parameters: &PlanParameters,
    ) -> ServiceResult<JointPath> {
        self.recorder.record("plan_collision_free_joint_path");
        Ok(path.clone())
    }

    async fn plan_move_pose_linear(
        &self,
        path: &CartesianPath,
        seed: &JointValues,
        _parameters: &TaskSpacePlanParameters,
    ) -> ServiceResult<JointTrajectory> {
        self.recorder.record("plan_move_pose_linear");
        self.recorder.cartesian_paths.lock().unwrap().push(path.clone());
        let joint_path = JointPath::new(seed.joint_set().clone(), vec![seed.clone(); path.len()])
            .map_err(|e| ServiceError::failed("plan_move_pose_linear", e.to_string()))?;
        Ok(trajectory_from(&joint_path))
    }
}

/// Solves a pose by using its translation as joint values. Poses below
/// z = 0 are unreachable.
pub struct FakeKinematics {
    pub recorder: Arc<Recorder>,
}

fn solve(pose: &Pose, seed: &JointValues) -> Option<JointValues> {
    let t = pose.translation();
    if t.z < 0.0 {
        return None;
    }
    JointValues::new(seed.joint_set().clone(), vec![t.x, t.y, t.z]).ok()
}

#[async_trait]
impl KinematicsService for FakeKinematics {
    async fn inverse_kinematics(
        &self,
        _end_effector_link: &str,
        pose: &Pose,
        _collision_check: bool,
        seed: &JointValues,
    ) -> ServiceResult<JointValues> {
        self.recorder.record("inverse_kinematics");
        solve(pose, seed).ok_or(ServiceError::ErrorCode {
            operation: "inverse_kinematics".to_string(),
            code: ErrorCode::NoIkSolution,
        })
    }

    async fn inverse_kinematics_many(
        &self,
        _end_effector_link: &str,
        poses: &CartesianPath,
        _collision_check: bool,
        seed: &JointValues,
    ) -> ServiceResult<IkResults> {
        self.recorder.record("inverse_kinematics_many");
        let mut points = Vec::new();
        let mut codes = Vec::new();
        for pose in poses.iter() {
            match solve(pose, seed) {
                Some(solution) => {
                    points.push(solution);
                    codes.push(ErrorCode::Success);
                }
                None => {
                    points.push(seed.clone());
                    codes.push(ErrorCode::NoIkSolution);
                }
            }
        }
        let path = JointPath::new(seed.joint_set().clone(), points)
            .map_err(|e| ServiceError::failed("inverse_kinematics_many", e.to_string()))?;
        Ok(IkResults::new(path, codes))
    }
}

/// Executes instantly, or waits for cancellation when `hold` is set.
pub struct FakeExecutor {
    pub recorder: Arc<Recorder>,
    pub hold: bool,
    pub result: ExecutionResult,
}

#[async_trait]
impl ExecutionService for FakeExecutor {
    async fn execute_joint_trajectory(
        &self,
        _trajectory: &JointTrajectory,
        _collision_check: bool,
        mut cancel: CancelSignal,
    ) -> ServiceResult<ExecutionResult> {
        self.recorder.record("execute_joint_trajectory");
        if self.hold {
            cancel.cancelled().await;
            return Err(ServiceError::Cancelled);
        }
        Ok(self.result.clone())
    }

    async fn execute_joint_trajectory_supervised(
        &self,
        trajectory: &JointTrajectory,
        velocity_scaling: f64,
        _collision_check: bool,
    ) -> ServiceResult<Box<dyn SteppedMotion>> {
        self.recorder.record("execute_joint_trajectory_supervised");
        assert_eq!(velocity_scaling, 1.0);
        Ok(Box::new(FakeSteppedMotion {
            steps: trajectory.len(),
            position: Mutex::new(0),
            cancelled: Mutex::new(false),
        }))
    }
}

pub struct FakeSteppedMotion {
    steps: usize,
    position: Mutex<usize>,
    cancelled: Mutex<bool>,
}

impl FakeSteppedMotion {
    fn snapshot(&self) -> SteppedMotionState {
        let position = *self.position.lock().unwrap();
        let last = self.steps.saturating_sub(1).max(1);
        let error_code = if *self.cancelled.lock().unwrap() {
            ErrorCode::Preempted
        } else if position >= last {
            ErrorCode::Success
        } else {
            ErrorCode::Progress
        };
        SteppedMotionState {
            goal_id: "goal-1".to_string(),
            error_message: String::new(),
            error_code,
            progress: position as f64 / last as f64,
        }
    }
}

#[async_trait]
impl SteppedMotion for FakeSteppedMotion {
    fn goal_id(&self) -> &str {
        "goal-1"
    }

    async fn state(&self) -> ServiceResult<SteppedMotionState> {
        Ok(self.snapshot())
    }

    async fn next(&self) -> ServiceResult<()> {
        let mut position = self.position.lock().unwrap();
        *position = (*position + 1).min(self.steps.saturating_sub(1));
        Ok(())
    }

    async fn previous(&self) -> ServiceResult<()> {
        let mut position = self.position.lock().unwrap();
        *position = position.saturating_sub(1);
        Ok(())
    }

    async fn pause(&self) -> ServiceResult<()> {
        Ok(())
    }

    async fn resume(&self) -> ServiceResult<()> {
        Ok(())
    }

    async fn cancel(&self) -> ServiceResult<()> {
        *self.cancelled.lock().unwrap() = true;
        Ok(())
    }

    async fn finished(&self) -> ServiceResult<ExecutionResult> {
        let state = self.snapshot();
        Ok(ExecutionResult {
            error_code: state.error_code,
            message: state.error_message,
        })
    }
}

pub struct FakeRobot {
    pub recorder: Arc<Recorder>,
    pub joints: JointValues,
    pub pose: Pose,
}

#[async_trait]
impl RobotStateProvider for FakeRobot {
    async fn get_current_joint_positions(&self, joint_set: &JointSet) -> ServiceResult<JointValues> {
        self.recorder.joint_state_requests.fetch_add(1, Ordering::SeqCst);
        self.joints
            .reorder(joint_set)
            .map_err(|e| ServiceError::failed("get_current_joint_positions", e.to_string()))
    }

    async fn get_current_pose(&self, _end_effector_link: &str) -> ServiceResult<Pose> {
        Ok(self.pose.clone())
    }
}

pub struct Fixture {
    pub move_group: MoveGroup,
    pub recorder: Arc<Recorder>,
}

pub fn fixture_with(hold: bool, result: ExecutionResult) -> Fixture {
    let recorder = Arc::new(Recorder::default());
    let services = MotionServices {
        planning: Arc::new(FakePlanner {
            recorder: recorder.clone(),
        }),
        kinematics: Arc::new(FakeKinematics {
            recorder: recorder.clone(),
        }),
        execution: Arc::new(FakeExecutor {
            recorder: recorder.clone(),
            hold,
            result,
        }),
        robot_state: Arc::new(FakeRobot {
            recorder: recorder.clone(),
            joints: values([0.0, 0.0, 0.0]),
            pose: pose_at(0.0, 0.0, 0.5),
        }),
    };
    let limits = JointLimits::new(joints(), 2.0, 4.0, -3.0, 3.0).unwrap();
    let move_group = MoveGroup::new("arm", limits, services)
        .with_end_effector(arm_motion_lib::EndEffectorDescription {
            name: "tool".to_string(),
            link_name: "tool0".to_string(),
            limits: arm_motion_lib::EndEffectorLimits::new(1.0, 1.0, 1.0, 1.0),
        })
        .unwrap();
    Fixture {
        move_group,
        recorder,
    }
}

pub fn fixture() -> Fixture {
    fixture_with(false, ExecutionResult::success())
}
