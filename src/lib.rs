pub mod engine;
pub mod error;
pub mod geometry;
pub mod movements;
pub mod pose;
pub mod session;
pub mod settings;
mod utils;

use std::{
    fs::File,
    io::{self, BufRead, BufWriter, Write},
    path::PathBuf,
};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;

pub use engine::{AnalysisController, MotionEngine, TickOutcome, TickReport};
pub use error::PoseError;
pub use movements::{
    Difficulty, FeedbackItem, Movement, MovementCatalog, MovementRegistry, MovementRules,
    RuleThresholds, Severity, StaticCatalog,
};
pub use pose::{resolve, Keypoint, Pose, MIN_KEYPOINT_SCORE};
pub use session::{generate, GuidanceState, GuidanceStatus, ProgressRecord, ProgressTracker};
pub use settings::{EngineSettings, SettingsStore};

/// Per-tick line written by the runner. The full progress log is left out;
/// use `--export` to get it.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TickLine<'a> {
    timestamp: DateTime<Utc>,
    movement_id: &'a str,
    score: u8,
    best_score: u8,
    feedback_items: &'a [FeedbackItem],
    guidance_text: &'a str,
}

struct RunArgs {
    movement_id: String,
    settings_path: Option<PathBuf>,
    catalog_path: Option<PathBuf>,
    export_path: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<RunArgs> {
    let mut movement_id = None;
    let mut settings_path = None;
    let mut catalog_path = None;
    let mut export_path = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--settings" => settings_path = args.next().map(PathBuf::from),
            "--catalog" => catalog_path = args.next().map(PathBuf::from),
            "--export" => export_path = args.next().map(PathBuf::from),
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            _ if movement_id.is_none() => movement_id = Some(arg.clone()),
            _ => bail!("unexpected argument {arg}"),
        }
    }

    let Some(movement_id) = movement_id else {
        bail!("usage: movecoach <movement-id> [--settings PATH] [--catalog PATH] [--export PATH]");
    };

    Ok(RunArgs {
        movement_id,
        settings_path,
        catalog_path,
        export_path,
    })
}

/// Reads one JSON pose per stdin line and writes one JSON tick per stdout line.
pub fn run() -> Result<()> {
    let debug_mode = std::env::var("MOVECOACH_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    // RUST_LOG still wins over the default level
    env_logger::Builder::new()
        .filter_level(if debug_mode {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .parse_default_env()
        .init();

    let args = parse_args(std::env::args().skip(1))?;

    let settings = match &args.settings_path {
        Some(path) => SettingsStore::new(path.clone())?.engine(),
        None => EngineSettings::default(),
    };

    let catalog = match &args.catalog_path {
        Some(path) => StaticCatalog::load(path)?,
        None => StaticCatalog::builtin(),
    };
    match catalog.lookup(&args.movement_id) {
        Some(movement) => info!(
            "practicing {} ({})",
            movement.name,
            movement.difficulty.as_str()
        ),
        None => warn!("'{}' is not in the movement catalog", args.movement_id),
    }

    let mut engine = MotionEngine::new(settings);
    engine.select_movement(&args.movement_id);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    for (line_no, line) in stdin.lock().lines().enumerate() {
        let line = line.context("failed to read pose input")?;
        if line.trim().is_empty() {
            continue;
        }

        let pose: Pose = match serde_json::from_str(&line) {
            Ok(pose) => pose,
            Err(err) => {
                warn!("line {}: skipping unparseable pose: {err}", line_no + 1);
                continue;
            }
        };

        let report = match engine.tick_active(&pose) {
            Ok(Some(report)) => report,
            Ok(None) => continue,
            Err(err) => {
                warn!("line {}: {err}", line_no + 1);
                continue;
            }
        };

        let timestamp = engine
            .progress()
            .records()
            .last()
            .map(|record| record.timestamp)
            .unwrap_or_else(Utc::now);
        let tick = TickLine {
            timestamp,
            movement_id: &report.movement_id,
            score: report.score,
            best_score: report.best_score,
            feedback_items: &report.feedback_items,
            guidance_text: &report.guidance_text,
        };
        serde_json::to_writer(&mut out, &tick)?;
        out.write_all(b"\n")?;

        // the runner has no speech engine; treat each utterance as spoken
        if let Some(text) = engine.guidance_mut().begin_playback() {
            info!("guidance: {text}");
            engine.guidance_mut().finish_playback();
        }
    }
    out.flush()?;

    let summary = engine.progress().summary();
    info!(
        "session {}: {} ticks, best {}, mean {:.1}",
        summary.session_id, summary.tick_count, summary.best_score, summary.mean_score
    );

    if let Some(path) = &args.export_path {
        let file = File::create(path)
            .with_context(|| format!("Failed to create export file {}", path.display()))?;
        engine.progress().write_jsonl(BufWriter::new(file))?;
        info!("progress log written to {}", path.display());
    }

    Ok(())
}
