//! Spoken guidance.
//!
//! `generate` turns a feedback set into one utterance. `GuidanceState` is the
//! presenter-side debounce: it decides when that utterance should actually be
//! spoken, so an unchanged feedback set is never repeated tick after tick.

use serde::{Deserialize, Serialize};

use crate::movements::FeedbackItem;

/// Joins feedback messages with ". " in emission order. No items, no utterance.
pub fn generate(items: &[FeedbackItem]) -> String {
    items
        .iter()
        .map(|item| item.message.as_str())
        .collect::<Vec<_>>()
        .join(". ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "text", rename_all = "camelCase")]
pub enum GuidanceStatus {
    Idle,
    Pending(String),
    Speaking(String),
}

impl Default for GuidanceStatus {
    fn default() -> Self {
        GuidanceStatus::Idle
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceState {
    pub status: GuidanceStatus,
    /// Text of the last utterance that finished playing
    pub last_spoken: Option<String>,
}

impl GuidanceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers the latest guidance text. Returns true when it became pending.
    ///
    /// Empty text and text equal to the last spoken utterance are ignored.
    /// While speaking, offers are ignored until playback ends. A pending text
    /// that has not started playing is replaced by a newer one.
    pub fn offer(&mut self, text: &str) -> bool {
        if text.is_empty() || self.is_speaking() || self.pending_text() == Some(text) {
            return false;
        }

        if self.last_spoken.as_deref() == Some(text) {
            // feedback went back to what was already said
            self.status = GuidanceStatus::Idle;
            return false;
        }

        self.status = GuidanceStatus::Pending(text.to_string());
        true
    }

    /// Pending → Speaking. Returns the text to hand to the speech engine.
    pub fn begin_playback(&mut self) -> Option<String> {
        match std::mem::take(&mut self.status) {
            GuidanceStatus::Pending(text) => {
                self.status = GuidanceStatus::Speaking(text.clone());
                Some(text)
            }
            other => {
                self.status = other;
                None
            }
        }
    }

    /// Speaking → Idle, marking the utterance consumed.
    pub fn finish_playback(&mut self) {
        if let GuidanceStatus::Speaking(text) = std::mem::take(&mut self.status) {
            self.last_spoken = Some(text);
        }
    }

    /// Drops whatever is pending or playing without marking it consumed.
    pub fn cancel_playback(&mut self) {
        self.status = GuidanceStatus::Idle;
    }

    /// Forgets the last spoken text so the same guidance may be spoken again.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn pending_text(&self) -> Option<&str> {
        match &self.status {
            GuidanceStatus::Pending(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_speaking(&self) -> bool {
        matches!(self.status, GuidanceStatus::Speaking(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate() {
        assert_eq!(generate(&[]), "");

        let items = vec![FeedbackItem::warning("A"), FeedbackItem::success("B")];
        assert_eq!(generate(&items), "A. B");
    }

    #[test]
    fn test_full_cycle() {
        let mut state = GuidanceState::new();
        assert!(state.offer("Increase hip movement range"));
        assert_eq!(state.pending_text(), Some("Increase hip movement range"));

        assert_eq!(
            state.begin_playback().as_deref(),
            Some("Increase hip movement range")
        );
        assert!(state.is_speaking());

        state.finish_playback();
        assert_eq!(state.status, GuidanceStatus::Idle);
        assert_eq!(
            state.last_spoken.as_deref(),
            Some("Increase hip movement range")
        );
    }

    #[test]
    fn test_identical_feedback_is_not_respoken() {
        let mut state = GuidanceState::new();
        assert!(state.offer("A. B"));
        state.begin_playback();
        state.finish_playback();

        assert!(!state.offer("A. B"));
        assert!(!state.offer("A. B"));
        assert_eq!(state.begin_playback(), None);
    }

    #[test]
    fn test_repeated_offer_while_pending_keeps_one_utterance() {
        let mut state = GuidanceState::new();
        assert!(state.offer("A"));
        assert!(!state.offer("A"));
        assert_eq!(state.begin_playback().as_deref(), Some("A"));
        assert_eq!(state.begin_playback(), None);
    }

    #[test]
    fn test_offers_ignored_while_speaking() {
        let mut state = GuidanceState::new();
        state.offer("A");
        state.begin_playback();

        assert!(!state.offer("B"));
        assert_eq!(state.status, GuidanceStatus::Speaking("A".into()));

        state.finish_playback();
        assert!(state.offer("B"));
    }

    #[test]
    fn test_empty_text_is_no_utterance() {
        let mut state = GuidanceState::new();
        assert!(!state.offer(""));
        assert_eq!(state.status, GuidanceStatus::Idle);
    }

    #[test]
    fn test_cancel_does_not_consume() {
        let mut state = GuidanceState::new();
        state.offer("A");
        state.begin_playback();
        state.cancel_playback();

        assert_eq!(state.status, GuidanceStatus::Idle);
        assert!(state.last_spoken.is_none());
        assert!(state.offer("A"));
    }

    #[test]
    fn test_newer_text_replaces_pending() {
        let mut state = GuidanceState::new();
        state.offer("A");
        assert!(state.offer("B"));
        assert_eq!(state.pending_text(), Some("B"));
    }

    #[test]
    fn test_reset_allows_repeat() {
        let mut state = GuidanceState::new();
        state.offer("A");
        state.begin_playback();
        state.finish_playback();
        state.reset();
        assert!(state.offer("A"));
    }
}
