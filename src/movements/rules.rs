//! Built-in movement rules.
//!
//! Each rule resolves the keypoints it needs, silently skips when any of them
//! is missing, and emits one item per satisfied or violated check, in the
//! order the checks are written.

use serde::{Deserialize, Serialize};

use crate::geometry::{alignment, angle, normalized_vertical_gap, vertical_separation};
use crate::pose::{resolve, Pose};

use super::config::RuleThresholds;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Error,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackItem {
    pub message: String,
    pub severity: Severity,
}

impl FeedbackItem {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Success,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Warning,
        }
    }
}

pub const SPLIT_GOOD: &str = "Great split position!";
pub const SPLIT_EXTEND: &str = "Try to extend your split further";
pub const HIPS_SQUARE: &str = "Keep your hips square to the pole";
pub const LEGS_BEHIND_HEAD: &str = "Work on getting your legs behind your head";
pub const HIP_RANGE: &str = "Increase hip movement range";

/// Hip split angle, measured at the right hip between the left hip and left knee.
pub(crate) fn split_angle(pose: &Pose) -> Option<f32> {
    let left_hip = resolve(pose, "left_hip")?;
    let right_hip = resolve(pose, "right_hip")?;
    let left_knee = resolve(pose, "left_knee")?;

    Some(angle(
        left_hip.position(),
        right_hip.position(),
        left_knee.position(),
    ))
}

pub fn jade_split(pose: &Pose, thresholds: &RuleThresholds) -> Vec<FeedbackItem> {
    let mut feedback = Vec::new();

    if let Some(split) = split_angle(pose) {
        if split < thresholds.split_angle_deg {
            feedback.push(FeedbackItem::warning(SPLIT_EXTEND));
        } else {
            feedback.push(FeedbackItem::success(SPLIT_GOOD));
        }
    }

    feedback
}

pub fn allegra(pose: &Pose, thresholds: &RuleThresholds) -> Vec<FeedbackItem> {
    let mut feedback = Vec::new();

    let keypoints = (
        resolve(pose, "left_shoulder"),
        resolve(pose, "right_shoulder"),
        resolve(pose, "left_hip"),
        resolve(pose, "right_hip"),
    );
    if let (Some(ls), Some(rs), Some(lh), Some(rh)) = keypoints {
        let twist = alignment(ls.position(), rs.position(), lh.position(), rh.position());
        if twist > thresholds.hip_square_max_deg {
            feedback.push(FeedbackItem::warning(HIPS_SQUARE));
        }
    }

    feedback
}

pub fn spatchcock(pose: &Pose, thresholds: &RuleThresholds) -> Vec<FeedbackItem> {
    let mut feedback = Vec::new();

    let keypoints = (
        resolve(pose, "left_ankle"),
        resolve(pose, "right_ankle"),
        resolve(pose, "left_hip"),
    );
    if let (Some(la), Some(ra), Some(lh)) = keypoints {
        let raised = vertical_separation(
            la.position(),
            ra.position(),
            lh.position(),
            thresholds.legs_behind_head_px,
        );
        if !raised {
            feedback.push(FeedbackItem::warning(LEGS_BEHIND_HEAD));
        }
    }

    feedback
}

pub fn twerk(pose: &Pose, thresholds: &RuleThresholds) -> Vec<FeedbackItem> {
    let mut feedback = Vec::new();

    if let (Some(lh), Some(rh)) = (resolve(pose, "left_hip"), resolve(pose, "right_hip")) {
        let range = normalized_vertical_gap(
            lh.position(),
            rh.position(),
            thresholds.hip_movement_scale_px,
        );
        if range < thresholds.hip_movement_min_ratio {
            feedback.push(FeedbackItem::warning(HIP_RANGE));
        }
    }

    feedback
}

/// Catalog movements that have no form check yet.
pub fn no_checks(_pose: &Pose, _thresholds: &RuleThresholds) -> Vec<FeedbackItem> {
    Vec::new()
}
