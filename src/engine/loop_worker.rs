use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use tokio::sync::{
    mpsc::{self, error::TrySendError},
    watch, Mutex,
};
use tokio_util::sync::CancellationToken;

use crate::pose::Pose;

use super::controller::TickOutcome;
use super::motion::MotionEngine;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Runs one tick per received pose until cancelled.
///
/// The watch channel only holds the newest pose, and it is read once the
/// engine lock is held, so poses that arrive during a tick overwrite each
/// other. Outcomes go out on a bounded channel; when the consumer falls
/// behind they are dropped and counted in `dropped`.
pub async fn analysis_loop(
    engine: Arc<Mutex<MotionEngine>>,
    mut pose_rx: watch::Receiver<Option<Pose>>,
    report_tx: mpsc::Sender<TickOutcome>,
    dropped: Arc<AtomicU64>,
    cancel_token: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;

            _ = cancel_token.cancelled() => {
                log_info!("analysis loop shutting down");
                break;
            }
            changed = pose_rx.changed() => {
                if changed.is_err() {
                    log_info!("pose source closed, analysis loop exiting");
                    break;
                }

                let outcome = {
                    let mut engine = engine.lock().await;
                    let pose = pose_rx.borrow_and_update().clone();
                    let Some(pose) = pose else { continue };
                    TickOutcome::from(engine.tick_active(&pose))
                };

                match report_tx.try_send(outcome) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        let total = dropped.fetch_add(1, Ordering::Relaxed) + 1;
                        log_debug!("report consumer is behind, dropped outcome ({} total)", total);
                    }
                    Err(TrySendError::Closed(_)) => {
                        log_warn!("report receiver dropped, analysis loop exiting");
                        break;
                    }
                }
            }
        }
    }
}
