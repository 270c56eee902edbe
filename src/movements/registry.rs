use std::collections::HashMap;

use crate::pose::Pose;

use super::config::RuleThresholds;
use super::rules::{self, FeedbackItem};
use super::scoring::{finalize_score, jade_split_score};

pub type RuleFn = fn(&Pose, &RuleThresholds) -> Vec<FeedbackItem>;

/// Returns a raw percentage, or `None` when the evidence is missing.
pub type ScoreFn = fn(&Pose) -> Option<f32>;

#[derive(Clone, Copy)]
pub struct MovementRules {
    pub evaluate: RuleFn,
    pub score: Option<ScoreFn>,
}

impl MovementRules {
    pub fn new(evaluate: RuleFn) -> Self {
        Self {
            evaluate,
            score: None,
        }
    }

    pub fn with_score(mut self, score: ScoreFn) -> Self {
        self.score = Some(score);
        self
    }
}

/// Movement id → rule set. Unknown ids evaluate to no feedback and score 0.
#[derive(Clone)]
pub struct MovementRegistry {
    rules: HashMap<String, MovementRules>,
    thresholds: RuleThresholds,
}

impl MovementRegistry {
    pub fn new(thresholds: RuleThresholds) -> Self {
        Self {
            rules: HashMap::new(),
            thresholds,
        }
    }

    /// Registry preloaded with every movement in the built-in catalog.
    pub fn with_builtin(thresholds: RuleThresholds) -> Self {
        let mut registry = Self::new(thresholds);
        registry.register(
            "jade-split",
            MovementRules::new(rules::jade_split).with_score(jade_split_score),
        );
        registry.register("allegra", MovementRules::new(rules::allegra));
        registry.register("spatchcock", MovementRules::new(rules::spatchcock));
        registry.register("twerk", MovementRules::new(rules::twerk));
        registry.register("fireman-spin", MovementRules::new(rules::no_checks));
        registry
    }

    /// Adds or replaces the rules for `id`.
    pub fn register(&mut self, id: impl Into<String>, rules: MovementRules) {
        self.rules.insert(id.into(), rules);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rules.contains_key(id)
    }

    pub fn movement_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn thresholds(&self) -> &RuleThresholds {
        &self.thresholds
    }

    pub fn set_thresholds(&mut self, thresholds: RuleThresholds) {
        self.thresholds = thresholds;
    }

    pub fn evaluate(&self, id: &str, pose: &Pose) -> Vec<FeedbackItem> {
        match self.rules.get(id) {
            Some(rules) => (rules.evaluate)(pose, &self.thresholds),
            None => Vec::new(),
        }
    }

    pub fn score(&self, id: &str, pose: &Pose) -> u8 {
        self.rules
            .get(id)
            .and_then(|rules| rules.score)
            .and_then(|score| score(pose))
            .map(finalize_score)
            .unwrap_or(0)
    }
}

impl Default for MovementRegistry {
    fn default() -> Self {
        Self::with_builtin(RuleThresholds::default())
    }
}
