pub mod controller;
pub mod loop_worker;
pub mod motion;

pub use controller::{AnalysisController, TickOutcome, REPORT_BUFFER};
pub use motion::{MotionEngine, TickReport};
