pub mod cartesian_path;
pub mod config;
pub mod end_effector_limits;
pub mod ik_results;
pub mod joint_limits;
pub mod joint_path;
pub mod joint_set;
pub mod joint_trajectory;
pub mod joint_trajectory_point;
pub mod joint_values;
pub mod msgs;
pub mod plan_parameters;
pub mod pose;
pub mod stepped_motion;

pub use cartesian_path::*;
pub use config::*;
pub use end_effector_limits::*;
pub use ik_results::*;
pub use joint_limits::*;
pub use joint_path::*;
pub use joint_set::*;
pub use joint_trajectory::*;
pub use joint_trajectory_point::*;
pub use joint_values::*;
pub use msgs::*;
pub use plan_parameters::*;
pub use pose::*;
pub use stepped_motion::*;
