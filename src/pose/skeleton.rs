//! Skeleton connections for overlay drawing.
//!
//! Uses the same cutoff as rule evaluation: a bone is only drawn when both
//! endpoints resolve.

use super::keypoint::{resolve, Keypoint, Pose};

/// BlazePose adjacency pairs, by landmark name.
pub const BLAZEPOSE_CONNECTIONS: [(&str, &str); 35] = [
    ("nose", "left_eye_inner"),
    ("nose", "right_eye_inner"),
    ("left_eye_inner", "left_eye"),
    ("left_eye", "left_eye_outer"),
    ("left_eye_outer", "left_ear"),
    ("right_eye_inner", "right_eye"),
    ("right_eye", "right_eye_outer"),
    ("right_eye_outer", "right_ear"),
    ("mouth_left", "mouth_right"),
    ("left_shoulder", "right_shoulder"),
    ("left_shoulder", "left_elbow"),
    ("left_shoulder", "left_hip"),
    ("right_shoulder", "right_elbow"),
    ("right_elbow", "right_wrist"),
    ("right_shoulder", "right_hip"),
    ("left_elbow", "left_wrist"),
    ("left_wrist", "left_pinky"),
    ("right_wrist", "right_pinky"),
    ("right_wrist", "right_index"),
    ("left_wrist", "left_index"),
    ("left_wrist", "left_thumb"),
    ("right_wrist", "right_thumb"),
    ("left_pinky", "left_index"),
    ("right_pinky", "right_index"),
    ("left_hip", "left_knee"),
    ("left_hip", "right_hip"),
    ("right_hip", "right_knee"),
    ("left_knee", "left_ankle"),
    ("right_knee", "right_ankle"),
    ("left_ankle", "left_heel"),
    ("right_ankle", "right_heel"),
    ("left_ankle", "left_foot_index"),
    ("right_ankle", "right_foot_index"),
    ("left_heel", "left_foot_index"),
    ("right_heel", "right_foot_index"),
];

/// Bones whose endpoints are both confidently detected.
pub fn visible_connections(pose: &Pose) -> Vec<(&Keypoint, &Keypoint)> {
    BLAZEPOSE_CONNECTIONS
        .iter()
        .filter_map(|(from, to)| Some((resolve(pose, from)?, resolve(pose, to)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_confidence_endpoint_hides_bone() {
        let pose = Pose::new(vec![
            Keypoint::new("left_hip", 0.0, 100.0, 0.9),
            Keypoint::new("left_knee", 0.0, 200.0, 0.9),
            Keypoint::new("left_ankle", 0.0, 300.0, 0.29),
        ]);

        let bones = visible_connections(&pose);
        assert_eq!(bones.len(), 1);
        assert_eq!(bones[0].0.name, "left_hip");
        assert_eq!(bones[0].1.name, "left_knee");
    }

    #[test]
    fn test_empty_pose_has_no_bones() {
        assert!(visible_connections(&Pose::default()).is_empty());
    }
}
