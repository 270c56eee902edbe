use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use anyhow::{anyhow, bail, Context, Result};
use log::info;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::PoseError;
use crate::pose::Pose;
use crate::session::ProgressRecord;
use crate::settings::EngineSettings;

use super::loop_worker::analysis_loop;
use super::motion::{MotionEngine, TickReport};

#[derive(Debug, Clone)]
pub enum TickOutcome {
    Report(TickReport),
    /// Recording is off or no movement is selected
    Idle,
    Rejected(PoseError),
    /// Another tick was in flight; the pose was discarded
    Dropped,
}

/// Capacity hosts can use for the outcome channel passed to `start`.
pub const REPORT_BUFFER: usize = 8;

impl From<Result<Option<TickReport>, PoseError>> for TickOutcome {
    fn from(result: Result<Option<TickReport>, PoseError>) -> Self {
        match result {
            Ok(Some(report)) => TickOutcome::Report(report),
            Ok(None) => TickOutcome::Idle,
            Err(err) => TickOutcome::Rejected(err),
        }
    }
}

/// Serializes ticks for hosts that deliver poses from more than one place.
///
/// The engine sits behind a single lock covering the whole tick. Poses that
/// arrive while it is held are dropped rather than queued.
#[derive(Clone)]
pub struct AnalysisController {
    engine: Arc<Mutex<MotionEngine>>,
    dropped: Arc<AtomicU64>,
    worker: Arc<Mutex<Option<Worker>>>,
}

struct Worker {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
    pose_tx: watch::Sender<Option<Pose>>,
}

impl AnalysisController {
    pub fn new(engine: MotionEngine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            dropped: Arc::new(AtomicU64::new(0)),
            worker: Arc::new(Mutex::new(None)),
        }
    }

    pub fn engine(&self) -> Arc<Mutex<MotionEngine>> {
        Arc::clone(&self.engine)
    }

    /// Runs one tick right away unless another is in flight.
    pub fn submit(&self, pose: &Pose) -> TickOutcome {
        match self.engine.try_lock() {
            Ok(mut engine) => TickOutcome::from(engine.tick_active(pose)),
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                TickOutcome::Dropped
            }
        }
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub async fn select_movement(&self, movement_id: &str) {
        self.engine.lock().await.select_movement(movement_id);
    }

    pub async fn set_recording(&self, recording: bool) {
        self.engine.lock().await.set_recording(recording);
    }

    pub async fn apply_settings(&self, settings: EngineSettings) {
        self.engine.lock().await.apply_settings(settings);
    }

    pub async fn progress(&self) -> Vec<ProgressRecord> {
        self.engine.lock().await.progress().records().to_vec()
    }

    pub async fn best_score(&self) -> u8 {
        self.engine.lock().await.best_score()
    }

    /// Spawns the analysis loop. Outcomes are delivered on `report_tx`;
    /// when it is full they are dropped and counted in `dropped_count`.
    pub async fn start(&self, report_tx: mpsc::Sender<TickOutcome>) -> Result<()> {
        let mut worker = self.worker.lock().await;
        if worker.as_ref().is_some_and(|w| !w.handle.is_finished()) {
            bail!("analysis already running");
        }

        let cancel_token = CancellationToken::new();
        let (pose_tx, pose_rx) = watch::channel(None);
        let handle = tokio::spawn(analysis_loop(
            self.engine(),
            pose_rx,
            report_tx,
            Arc::clone(&self.dropped),
            cancel_token.clone(),
        ));

        *worker = Some(Worker {
            handle,
            cancel_token,
            pose_tx,
        });
        info!("analysis loop started");
        Ok(())
    }

    /// False once the loop has been stopped or has exited on its own.
    pub async fn is_running(&self) -> bool {
        self.worker
            .lock()
            .await
            .as_ref()
            .is_some_and(|w| !w.handle.is_finished())
    }

    /// Hands the newest pose to the running loop, replacing any pose it has
    /// not picked up yet.
    pub async fn push_pose(&self, pose: Pose) -> Result<()> {
        let worker = self.worker.lock().await;
        let worker = worker
            .as_ref()
            .ok_or_else(|| anyhow!("analysis loop is not running"))?;
        worker
            .pose_tx
            .send(Some(pose))
            .map_err(|_| anyhow!("analysis loop has exited"))
    }

    /// Cancels the loop. Progress recorded so far stays in the engine.
    pub async fn stop(&self) -> Result<()> {
        let Some(worker) = self.worker.lock().await.take() else {
            return Ok(());
        };

        worker.cancel_token.cancel();
        worker
            .handle
            .await
            .context("analysis loop task failed to join")?;
        info!("analysis loop stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Keypoint;
    use std::time::Duration;

    fn split_pose(knee_x: f32) -> Pose {
        Pose::new(vec![
            Keypoint::new("left_hip", 0.0, 100.0, 1.0),
            Keypoint::new("right_hip", 100.0, 100.0, 1.0),
            Keypoint::new("left_knee", knee_x, 200.0, 1.0),
        ])
    }

    async fn wait_until<F, Fut>(mut condition: F)
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = bool>,
    {
        tokio::time::timeout(Duration::from_secs(1), async {
            while !condition().await {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    fn controller() -> AnalysisController {
        let mut engine = MotionEngine::default();
        engine.select_movement("jade-split");
        AnalysisController::new(engine)
    }

    #[tokio::test]
    async fn test_submit_runs_tick() {
        let controller = controller();
        match controller.submit(&split_pose(0.0)) {
            TickOutcome::Report(report) => assert_eq!(report.score, 25),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(controller.progress().await.len(), 1);
    }

    #[tokio::test]
    async fn test_submit_drops_while_tick_in_flight() {
        let controller = controller();
        let engine = controller.engine();
        let guard = engine.lock().await;

        assert!(matches!(
            controller.submit(&split_pose(0.0)),
            TickOutcome::Dropped
        ));
        assert_eq!(controller.dropped_count(), 1);
        drop(guard);

        assert!(matches!(
            controller.submit(&split_pose(0.0)),
            TickOutcome::Report(_)
        ));
        assert_eq!(controller.progress().await.len(), 1);
    }

    #[tokio::test]
    async fn test_submit_rejects_malformed_pose() {
        let controller = controller();
        assert!(matches!(
            controller.submit(&split_pose(f32::INFINITY)),
            TickOutcome::Rejected(PoseError::NonFiniteCoordinate { .. })
        ));
        assert!(controller.progress().await.is_empty());
    }

    #[tokio::test]
    async fn test_loop_reports_and_stop_keeps_progress() {
        let controller = controller();
        let (tx, mut rx) = mpsc::channel(REPORT_BUFFER);
        controller.start(tx).await.unwrap();
        assert!(controller.is_running().await);

        controller.push_pose(split_pose(0.0)).await.unwrap();
        let outcome = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        match outcome {
            TickOutcome::Report(report) => {
                assert_eq!(report.score, 25);
                assert_eq!(report.progress_log.len(), 1);
            }
            other => panic!("unexpected outcome {other:?}"),
        }

        controller.stop().await.unwrap();
        assert!(!controller.is_running().await);
        assert!(controller.push_pose(split_pose(0.0)).await.is_err());
        assert_eq!(controller.progress().await.len(), 1);
        assert_eq!(controller.best_score().await, 25);
    }

    #[tokio::test]
    async fn test_start_twice_fails() {
        let controller = controller();
        let (tx, _rx) = mpsc::channel(REPORT_BUFFER);
        controller.start(tx.clone()).await.unwrap();
        assert!(controller.start(tx).await.is_err());
        controller.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_loop_uses_latest_pose() {
        let controller = controller();
        let (tx, mut rx) = mpsc::channel(REPORT_BUFFER);
        controller.start(tx).await.unwrap();

        let engine = controller.engine();
        let guard = engine.lock().await;
        controller.push_pose(split_pose(0.0)).await.unwrap();
        controller.push_pose(split_pose(100.0)).await.unwrap();
        drop(guard);

        let outcome = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        match outcome {
            TickOutcome::Report(report) => {
                assert_eq!(report.score, 50);
                assert_eq!(report.progress_log.len(), 1);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(
            tokio::time::timeout(Duration::from_millis(100), rx.recv())
                .await
                .is_err()
        );
        assert_eq!(controller.progress().await.len(), 1);

        controller.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_full_report_channel_drops_and_counts() {
        let controller = controller();
        let (tx, mut rx) = mpsc::channel(1);
        controller.start(tx).await.unwrap();
        let c = &controller;

        for (i, knee_x) in [0.0, 100.0, 0.0].into_iter().enumerate() {
            controller.push_pose(split_pose(knee_x)).await.unwrap();
            wait_until(|| async move { c.progress().await.len() == i + 1 }).await;
        }
        wait_until(|| async move { c.dropped_count() == 2 }).await;

        // only the first outcome was buffered
        match rx.try_recv().unwrap() {
            TickOutcome::Report(report) => assert_eq!(report.score, 25),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(rx.try_recv().is_err());
        assert!(controller.is_running().await);

        controller.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_not_running_after_receiver_dropped() {
        let controller = controller();
        let (tx, rx) = mpsc::channel(REPORT_BUFFER);
        controller.start(tx).await.unwrap();
        drop(rx);

        controller.push_pose(split_pose(0.0)).await.unwrap();
        let c = &controller;
        wait_until(|| async move { !c.is_running().await }).await;

        // a finished loop can be replaced
        let (tx, _rx) = mpsc::channel(REPORT_BUFFER);
        controller.start(tx).await.unwrap();
        assert!(controller.is_running().await);
        controller.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_recording_off_is_idle() {
        let controller = controller();
        controller.set_recording(false).await;
        assert!(matches!(
            controller.submit(&split_pose(0.0)),
            TickOutcome::Idle
        ));
        assert!(controller.progress().await.is_empty());
    }
}
