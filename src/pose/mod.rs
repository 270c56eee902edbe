pub mod keypoint;
pub mod skeleton;

pub use keypoint::{resolve, Keypoint, Pose, MIN_KEYPOINT_SCORE};
pub use skeleton::{visible_connections, BLAZEPOSE_CONNECTIONS};
