use serde::{Deserialize, Serialize};

/// Tunable thresholds for the built-in movement rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleThresholds {
    /// Jade split: hip angle at or above this counts as a full split (degrees)
    pub split_angle_deg: f32,

    /// Allegra: shoulder/hip twist above this triggers a warning (degrees)
    pub hip_square_max_deg: f32,

    /// Spatchcock: ankles must be this far above the hip (pixels)
    pub legs_behind_head_px: f32,

    /// Twerk: hip gap is divided by this scale, then compared to the minimum ratio
    pub hip_movement_scale_px: f32,
    pub hip_movement_min_ratio: f32,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            split_angle_deg: 160.0,
            hip_square_max_deg: 20.0,
            legs_behind_head_px: 100.0,
            hip_movement_scale_px: 100.0,
            hip_movement_min_ratio: 0.3,
        }
    }
}
