pub mod catalog;
pub mod config;
pub mod registry;
pub mod rules;
pub mod scoring;

pub use catalog::{Difficulty, Movement, MovementCatalog, StaticCatalog};
pub use config::RuleThresholds;
pub use registry::{MovementRegistry, MovementRules, RuleFn, ScoreFn};
pub use rules::{FeedbackItem, Severity};
