use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub timestamp: DateTime<Utc>,
    pub movement_id: String,
    pub score: u8,
    pub feedback: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub tick_count: usize,
    pub best_score: u8,
    pub mean_score: f32,
    pub first_at: Option<DateTime<Utc>>,
    pub last_at: Option<DateTime<Utc>>,
}

/// Append-only log of one practice session.
///
/// Records are never edited or removed; a new session means a new tracker.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    session_id: String,
    started_at: DateTime<Utc>,
    records: Vec<ProgressRecord>,
    best_score: u8,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    pub fn starting_at(started_at: DateTime<Utc>) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            started_at,
            records: Vec::new(),
            best_score: 0,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Appends a record and returns the full log.
    ///
    /// A timestamp earlier than the previous record is clamped to it, so the
    /// log stays ordered even if the wall clock steps backwards.
    pub fn record(&mut self, mut entry: ProgressRecord) -> &[ProgressRecord] {
        if let Some(last) = self.records.last() {
            if entry.timestamp < last.timestamp {
                entry.timestamp = last.timestamp;
            }
        }

        self.best_score = self.best_score.max(entry.score);
        self.records.push(entry);
        &self.records
    }

    pub fn records(&self) -> &[ProgressRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn best_score(&self) -> u8 {
        self.best_score
    }

    pub fn summary(&self) -> SessionSummary {
        let mean_score = if self.records.is_empty() {
            0.0
        } else {
            let total: u32 = self.records.iter().map(|r| r.score as u32).sum();
            total as f32 / self.records.len() as f32
        };

        SessionSummary {
            session_id: self.session_id.clone(),
            started_at: self.started_at,
            tick_count: self.records.len(),
            best_score: self.best_score,
            mean_score,
            first_at: self.records.first().map(|r| r.timestamp),
            last_at: self.records.last().map(|r| r.timestamp),
        }
    }

    /// Writes the log as line-delimited JSON, one record per line.
    pub fn write_jsonl<W: Write>(&self, mut writer: W) -> Result<()> {
        for record in &self.records {
            serde_json::to_writer(&mut writer, record)
                .context("failed to serialize progress record")?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Best score over a log, seeded at 0.
pub fn best_score(records: &[ProgressRecord]) -> u8 {
    records.iter().map(|r| r.score).max().unwrap_or(0)
}
