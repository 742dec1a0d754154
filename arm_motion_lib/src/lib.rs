//! # Arm Motion Library
//!
//! Motion description layer for robotic arms: joint and Cartesian data
//! types, trajectory algorithms and immutable move operation builders that
//! assemble requests for remote planning, kinematics and execution services.

pub mod error;
pub mod operations;
pub mod services;
pub mod types;
pub mod utils;

// Re-export everything for convenience
pub use error::*;
pub use operations::*;
pub use services::*;
pub use types::*;
pub use utils::{init_tracing, init_tracing_with};
