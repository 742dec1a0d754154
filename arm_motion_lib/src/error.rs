//! Error types shared by the data model, the operation builders and the
//! service boundary.

use thiserror::Error;

use crate::types::ErrorCode;

/// Failure reported by one of the external collaborators (planner,
/// kinematics, executor, robot state). Passed through to the caller as is,
/// never retried here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    /// The remote service could not be reached
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// The remote call completed but reported a failure
    #[error("{operation} failed: {message}")]
    Failed { operation: String, message: String },

    /// The remote call answered with a non-success motion error code
    #[error("{operation} returned error code {code:?}")]
    ErrorCode { operation: String, code: ErrorCode },

    /// The request was cancelled before it completed
    #[error("Request cancelled")]
    Cancelled,
}

impl ServiceError {
    pub fn failed(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Error type for all motion description operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MotionError {
    /// A value of the wrong kind was supplied (e.g. a joint path where a pose is required)
    #[error("Expected {expected}, got {found}")]
    TypeKindMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Two operands are defined over incompatible joint sets
    #[error("Joint set mismatch: {0}")]
    JointSetMismatch(String),

    /// Inconsistent optional fields or differing values during a merge
    #[error("Merge conflict: {0}")]
    MergeConflict(String),

    /// Merge operands are stamped with different times
    #[error("Time mismatch: {0}")]
    TimeMismatch(String),

    /// A scaling factor is outside of [0.0, 1.0]
    #[error("{name} {value} is not between 0.0 and 1.0")]
    ScalingOutOfRange { name: &'static str, value: f64 },

    /// Two consecutive inverse kinematics solutions are too far apart
    #[error(
        "The difference {delta:.6} of two consecutive IK solutions at index {index} \
         exceeds the ik jump threshold {threshold:.6}"
    )]
    IkJumpThreshold {
        index: usize,
        delta: f64,
        threshold: f64,
    },

    /// A numeric value violates its permitted range
    #[error("Out of range: {0}")]
    OutOfRange(String),

    /// A per-joint sequence does not match the joint count
    #[error("{what}: expected {expected} values, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Duplicate joint name: {0}")]
    DuplicateName(String),

    #[error("Joint name not found: {0}")]
    NameNotFound(String),

    /// Interpolation or trajectory ordering violated
    #[error("Non-monotonic time: {0}")]
    NonMonotonicTime(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Service failure: {0}")]
    ServiceFailure(#[from] ServiceError),

    /// Execution was cancelled on request of the caller
    #[error("Execution cancelled")]
    Cancelled,
}

impl MotionError {
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            MotionError::Cancelled | MotionError::ServiceFailure(ServiceError::Cancelled)
        )
    }
}

pub type MotionResult<T> = Result<T, MotionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ik_jump_message_names_index_and_delta() {
        let err = MotionError::IkJumpThreshold {
            index: 3,
            delta: 1.5,
            threshold: 1.2,
        };
        let msg = err.to_string();
        assert!(msg.contains("index 3"));
        assert!(msg.contains("1.500000"));
        assert!(msg.contains("1.200000"));
    }

    #[test]
    fn test_service_error_converts() {
        let err: MotionError = ServiceError::failed("plan_move_joints", "no solution").into();
        assert_eq!(
            err.to_string(),
            "Service failure: plan_move_joints failed: no solution"
        );
        assert!(!err.is_cancelled());
        assert!(MotionError::from(ServiceError::Cancelled).is_cancelled());
    }
}
