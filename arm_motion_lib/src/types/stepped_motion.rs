use serde::{Deserialize, Serialize};

use super::ErrorCode;

/// Progress report of a supervised, stepwise executed trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteppedMotionState {
    pub goal_id: String,
    pub error_message: String,
    pub error_code: ErrorCode,
    /// Fraction of the trajectory executed so far, in [0, 1].
    pub progress: f64,
}

impl SteppedMotionState {
    pub fn is_finished(&self) -> bool {
        self.error_code != ErrorCode::Progress
    }
}
