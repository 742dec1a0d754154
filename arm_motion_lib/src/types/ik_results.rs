use serde::{Deserialize, Serialize};
use std::fmt;

use super::JointPath;
use crate::error::MotionError;

/// Result codes reported by the motion server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum ErrorCode {
    Progress,
    Success,
    Failure,
    SignalLost,
    PlanningFailed,
    InvalidMotionPlan,
    MotionPlanInvalidatedByEnvironmentChange,
    ControlFailed,
    UnableToAcquireSensorData,
    TimedOut,
    Preempted,
    StartStateInCollision,
    StartStateViolatesPathConstraints,
    GoalInCollision,
    GoalViolatesPathConstraints,
    GoalConstraintsViolated,
    InvalidGroupName,
    InvalidGoalConstraints,
    InvalidRobotState,
    InvalidLinkName,
    InvalidObjectName,
    FrameTransformFailure,
    CollisionCheckingUnavailable,
    RobotStateStale,
    SensorInfoStale,
    NoIkSolution,
}

impl ErrorCode {
    pub fn code(self) -> i32 {
        match self {
            ErrorCode::Progress => 0,
            ErrorCode::Success => 1,
            ErrorCode::Failure => 99999,
            ErrorCode::SignalLost => -9999,
            ErrorCode::PlanningFailed => -1,
            ErrorCode::InvalidMotionPlan => -2,
            ErrorCode::MotionPlanInvalidatedByEnvironmentChange => -3,
            ErrorCode::ControlFailed => -4,
            ErrorCode::UnableToAcquireSensorData => -5,
            ErrorCode::TimedOut => -6,
            ErrorCode::Preempted => -7,
            ErrorCode::StartStateInCollision => -10,
            ErrorCode::StartStateViolatesPathConstraints => -11,
            ErrorCode::GoalInCollision => -12,
            ErrorCode::GoalViolatesPathConstraints => -13,
            ErrorCode::GoalConstraintsViolated => -14,
            ErrorCode::InvalidGroupName => -15,
            ErrorCode::InvalidGoalConstraints => -16,
            ErrorCode::InvalidRobotState => -17,
            ErrorCode::InvalidLinkName => -18,
            ErrorCode::InvalidObjectName => -19,
            ErrorCode::FrameTransformFailure => -21,
            ErrorCode::CollisionCheckingUnavailable => -22,
            ErrorCode::RobotStateStale => -23,
            ErrorCode::SensorInfoStale => -24,
            ErrorCode::NoIkSolution => -31,
        }
    }

    pub fn is_success(self) -> bool {
        self == ErrorCode::Success
    }
}

impl TryFrom<i32> for ErrorCode {
    type Error = MotionError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        let error_code = match code {
            0 => ErrorCode::Progress,
            1 => ErrorCode::Success,
            99999 => ErrorCode::Failure,
            -9999 => ErrorCode::SignalLost,
            -1 => ErrorCode::PlanningFailed,
            -2 => ErrorCode::InvalidMotionPlan,
            -3 => ErrorCode::MotionPlanInvalidatedByEnvironmentChange,
            -4 => ErrorCode::ControlFailed,
            -5 => ErrorCode::UnableToAcquireSensorData,
            -6 => ErrorCode::TimedOut,
            -7 => ErrorCode::Preempted,
            -10 => ErrorCode::StartStateInCollision,
            -11 => ErrorCode::StartStateViolatesPathConstraints,
            -12 => ErrorCode::GoalInCollision,
            -13 => ErrorCode::GoalViolatesPathConstraints,
            -14 => ErrorCode::GoalConstraintsViolated,
            -15 => ErrorCode::InvalidGroupName,
            -16 => ErrorCode::InvalidGoalConstraints,
            -17 => ErrorCode::InvalidRobotState,
            -18 => ErrorCode::InvalidLinkName,
            -19 => ErrorCode::InvalidObjectName,
            -21 => ErrorCode::FrameTransformFailure,
            -22 => ErrorCode::CollisionCheckingUnavailable,
            -23 => ErrorCode::RobotStateStale,
            -24 => ErrorCode::SensorInfoStale,
            -31 => ErrorCode::NoIkSolution,
            other => {
                return Err(MotionError::InvalidArgument(format!(
                    "unknown error code {other}"
                )))
            }
        };
        Ok(error_code)
    }
}

impl From<ErrorCode> for i32 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}

/// Batched inverse kinematics answer: one solution and one code per pose.
#[derive(Debug, Clone, PartialEq)]
pub struct IkResults {
    pub path: JointPath,
    pub error_codes: Vec<ErrorCode>,
}

impl IkResults {
    pub fn new(path: JointPath, error_codes: Vec<ErrorCode>) -> Self {
        Self { path, error_codes }
    }

    pub fn succeeded(&self) -> bool {
        self.error_codes.iter().all(|code| code.is_success())
    }

    /// Index and code of the first pose without a solution.
    pub fn first_failure(&self) -> Option<(usize, ErrorCode)> {
        self.error_codes
            .iter()
            .enumerate()
            .find(|(_, code)| !code.is_success())
            .map(|(i, code)| (i, *code))
    }
}
