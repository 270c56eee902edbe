use crate::pose::Pose;

use super::rules::split_angle;

/// Clamp a raw percentage into [0, 100] and round to the nearest integer.
pub fn finalize_score(raw: f32) -> u8 {
    if !raw.is_finite() {
        return 0;
    }
    raw.clamp(0.0, 100.0).round() as u8
}

/// Jade split: fraction of a full 180° split.
pub fn jade_split_score(pose: &Pose) -> Option<f32> {
    split_angle(pose).map(|split| (split / 180.0) * 100.0)
}
