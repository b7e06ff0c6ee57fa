use std::time::{Duration, Instant};

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use super::orchestrator::RunEvent;
use crate::utils::format_elapsed;

/// Background ticker reporting wall-clock time since the run started.
///
/// It only emits `RunEvent::Elapsed` and never touches run state.
pub struct ElapsedTracker {
    started_at: Instant,
    handle: Option<JoinHandle<()>>,
}

impl ElapsedTracker {
    /// Must be called from within a tokio runtime when `events` is set.
    pub fn start(
        started_at: Instant,
        tick: Duration,
        events: Option<UnboundedSender<RunEvent>>,
    ) -> Self {
        let handle = events.map(|tx| {
            tokio::spawn(async move {
                let first = tokio::time::Instant::from_std(started_at) + tick;
                let mut interval = tokio::time::interval_at(first, tick);
                interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

                loop {
                    interval.tick().await;
                    if tx.send(RunEvent::Elapsed(format_elapsed(started_at.elapsed()))).is_err() {
                        break;
                    }
                }
            })
        });

        Self { started_at, handle }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Stops ticking and returns the final elapsed time.
    pub fn stop(&mut self) -> Duration {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.elapsed()
    }
}

impl Drop for ElapsedTracker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
