use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PoseError;
use crate::movements::{FeedbackItem, MovementRegistry};
use crate::pose::Pose;
use crate::session::{generate, GuidanceState, ProgressRecord, ProgressTracker};
use crate::settings::EngineSettings;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Everything the presentation layer needs after one tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    pub session_id: String,
    pub movement_id: String,
    pub feedback_items: Vec<FeedbackItem>,
    pub score: u8,
    pub best_score: u8,
    pub progress_log: Vec<ProgressRecord>,
    pub guidance_text: String,
}

/// One practice session's worth of evaluation state.
///
/// `tick` is the whole resolve → evaluate → score → record → guidance step; it
/// takes `&mut self`, so overlapping ticks are impossible without an outer lock.
pub struct MotionEngine {
    registry: MovementRegistry,
    settings: EngineSettings,
    tracker: ProgressTracker,
    guidance: GuidanceState,
    active_movement: Option<String>,
    recording: bool,
}

impl MotionEngine {
    pub fn new(settings: EngineSettings) -> Self {
        let registry = MovementRegistry::with_builtin(settings.thresholds.clone());
        Self::with_registry(registry, settings)
    }

    pub fn with_registry(mut registry: MovementRegistry, settings: EngineSettings) -> Self {
        let settings = settings.sanitized();
        registry.set_thresholds(settings.thresholds.clone());
        Self {
            registry,
            settings,
            tracker: ProgressTracker::new(),
            guidance: GuidanceState::new(),
            active_movement: None,
            recording: true,
        }
    }

    pub fn registry(&self) -> &MovementRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut MovementRegistry {
        &mut self.registry
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn apply_settings(&mut self, settings: EngineSettings) {
        let settings = settings.sanitized();
        self.registry.set_thresholds(settings.thresholds.clone());
        if !settings.voice_enabled {
            self.guidance.cancel_playback();
        }
        self.settings = settings;
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Gates evaluation. Stopping keeps every record already taken.
    pub fn set_recording(&mut self, recording: bool) {
        if self.recording != recording {
            log_info!(
                "analysis {} for session {}",
                if recording { "started" } else { "stopped" },
                self.tracker.session_id()
            );
        }
        self.recording = recording;
    }

    pub fn active_movement(&self) -> Option<&str> {
        self.active_movement.as_deref()
    }

    /// Switches the evaluated movement, opening a new session if configured to.
    pub fn select_movement(&mut self, movement_id: &str) {
        if self.active_movement.as_deref() == Some(movement_id) {
            return;
        }

        if !self.registry.contains(movement_id) {
            log_warn!("movement '{}' has no registered rules", movement_id);
        }

        let switching = self.active_movement.is_some();
        self.active_movement = Some(movement_id.to_string());
        if switching && self.settings.reset_on_movement_change {
            self.start_session();
        }
    }

    /// Discards the current log and guidance memory. Returns the new session id.
    pub fn start_session(&mut self) -> &str {
        self.tracker = ProgressTracker::new();
        self.guidance.reset();
        log_info!("started progress session {}", self.tracker.session_id());
        self.tracker.session_id()
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.tracker
    }

    pub fn best_score(&self) -> u8 {
        self.tracker.best_score()
    }

    pub fn guidance(&self) -> &GuidanceState {
        &self.guidance
    }

    pub fn guidance_mut(&mut self) -> &mut GuidanceState {
        &mut self.guidance
    }

    /// Evaluates `pose` against `movement_id`. `Ok(None)` while not recording.
    pub fn tick(
        &mut self,
        movement_id: &str,
        pose: &Pose,
    ) -> Result<Option<TickReport>, PoseError> {
        self.tick_at(movement_id, pose, Utc::now())
    }

    pub fn tick_at(
        &mut self,
        movement_id: &str,
        pose: &Pose,
        now: DateTime<Utc>,
    ) -> Result<Option<TickReport>, PoseError> {
        // an idle or rejected tick must not switch movement (and reset the session)
        if !self.recording {
            return Ok(None);
        }
        if let Err(err) = pose.validate() {
            log_warn!("rejected pose for '{}': {}", movement_id, err);
            return Err(err);
        }

        self.select_movement(movement_id);
        Ok(Some(self.evaluate_validated(movement_id.to_string(), pose, now)))
    }

    /// Evaluates `pose` against the selected movement.
    pub fn tick_active(&mut self, pose: &Pose) -> Result<Option<TickReport>, PoseError> {
        self.tick_active_at(pose, Utc::now())
    }

    pub fn tick_active_at(
        &mut self,
        pose: &Pose,
        now: DateTime<Utc>,
    ) -> Result<Option<TickReport>, PoseError> {
        if !self.recording {
            return Ok(None);
        }
        let Some(movement_id) = self.active_movement.clone() else {
            return Ok(None);
        };

        if let Err(err) = pose.validate() {
            log_warn!("rejected pose for '{}': {}", movement_id, err);
            return Err(err);
        }

        Ok(Some(self.evaluate_validated(movement_id, pose, now)))
    }

    fn evaluate_validated(
        &mut self,
        movement_id: String,
        pose: &Pose,
        now: DateTime<Utc>,
    ) -> TickReport {
        let feedback_items = self.registry.evaluate(&movement_id, pose);
        let score = self.registry.score(&movement_id, pose);

        let progress_log = self
            .tracker
            .record(ProgressRecord {
                timestamp: now,
                movement_id: movement_id.clone(),
                score,
                feedback: feedback_items.iter().map(|f| f.message.clone()).collect(),
            })
            .to_vec();

        let guidance_text = if self.settings.voice_enabled {
            generate(&feedback_items)
        } else {
            String::new()
        };
        self.guidance.offer(&guidance_text);

        log_debug!(
            "tick {} '{}': score {} best {} ({} feedback)",
            progress_log.len(),
            movement_id,
            score,
            self.tracker.best_score(),
            feedback_items.len()
        );

        TickReport {
            session_id: self.tracker.session_id().to_string(),
            movement_id,
            feedback_items,
            score,
            best_score: self.tracker.best_score(),
            progress_log,
            guidance_text,
        }
    }
}

impl Default for MotionEngine {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}
