pub mod guidance;
pub mod progress;

pub use guidance::{generate, GuidanceState, GuidanceStatus};
pub use progress::{best_score, ProgressRecord, ProgressTracker, SessionSummary};
