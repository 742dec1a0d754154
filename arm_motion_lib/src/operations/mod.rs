//! Move groups and the immutable move operation builders.

pub mod move_group;
pub mod move_operation;
pub mod plan;
pub mod strategies;

pub use move_group::*;
pub use move_operation::*;
pub use plan::*;
pub use strategies::*;
