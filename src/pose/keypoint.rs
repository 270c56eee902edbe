use serde::{Deserialize, Serialize};

use crate::error::PoseError;

/// Minimum detection score for a keypoint to count as evidence.
///
/// Every consumer (rule evaluation, scoring, skeleton drawing) goes through
/// [`resolve`], so this is the only place the cutoff lives.
pub const MIN_KEYPOINT_SCORE: f32 = 0.3;

/// A named body landmark reported by the pose source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub name: String,
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
    /// Detection confidence in [0, 1]
    pub score: f32,
}

impl Keypoint {
    pub fn new(name: impl Into<String>, x: f32, y: f32, score: f32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            z: None,
            score,
        }
    }

    pub fn with_depth(mut self, z: f32) -> Self {
        self.z = Some(z);
        self
    }

    pub fn is_confident(&self) -> bool {
        self.score >= MIN_KEYPOINT_SCORE
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// All keypoints detected in a single frame, in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub keypoints: Vec<Keypoint>,
}

impl Pose {
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self { keypoints }
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    /// Rejects input that would feed nonsense into the geometry kernel.
    pub fn validate(&self) -> Result<(), PoseError> {
        for (index, keypoint) in self.keypoints.iter().enumerate() {
            if keypoint.name.is_empty() {
                return Err(PoseError::EmptyName { index });
            }

            let depth_ok = keypoint.z.map_or(true, f32::is_finite);
            if !keypoint.x.is_finite() || !keypoint.y.is_finite() || !depth_ok {
                return Err(PoseError::NonFiniteCoordinate {
                    name: keypoint.name.clone(),
                });
            }

            if !(0.0..=1.0).contains(&keypoint.score) {
                return Err(PoseError::ScoreOutOfRange {
                    name: keypoint.name.clone(),
                    score: keypoint.score,
                });
            }
        }
        Ok(())
    }
}

/// Looks up a keypoint by exact name. Low-confidence keypoints resolve to
/// `None`, same as missing ones. If a name repeats, the first confident entry wins.
pub fn resolve<'a>(pose: &'a Pose, name: &str) -> Option<&'a Keypoint> {
    pose.keypoints
        .iter()
        .find(|kp| kp.name == name && kp.is_confident())
}
