use thiserror::Error;

/// Malformed pose input. A tick that fails validation is rejected before any
/// session state is touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PoseError {
    #[error("keypoint '{name}' has a non-finite coordinate")]
    NonFiniteCoordinate { name: String },

    #[error("keypoint '{name}' has score {score}, expected a value in [0, 1]")]
    ScoreOutOfRange { name: String, score: f32 },

    #[error("keypoint at index {index} has an empty name")]
    EmptyName { index: usize },
}
