use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use futures::StreamExt;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::elapsed::ElapsedTracker;
use super::transfer::{TransferEvent, TransferExecutor};
use crate::{
    config::RunConfig,
    domain::{AppError, DownloadJob, JobOutcome, RunPhase, RunState, RunSummary, ValidationError},
    utils::{split_batch, strip_line_breaks},
};

/// Notifications delivered to the caller while a batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    Started {
        total: usize,
    },
    JobStarted {
        index: u32,
        total: usize,
        url: String,
        file_name: String,
    },
    Progress {
        index: u32,
        percent: u8,
    },
    JobFinished {
        index: u32,
        outcome: JobOutcome,
    },
    /// `HH:MM:SS` since the run started.
    Elapsed(String),
    Completed(RunSummary),
}

/// Cancels whichever transfer is in flight when invoked.
///
/// Each job gets a fresh token, so cancelling never leaks into the next job.
#[derive(Clone, Default)]
pub struct CancelHandle {
    current: Arc<Mutex<CancellationToken>>,
}

impl CancelHandle {
    pub fn cancel_current(&self) {
        let token = self.current.lock().unwrap_or_else(|e| e.into_inner());
        token.cancel();
    }

    fn arm(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = token.clone();
        token
    }
}

pub fn validate(destination: &Path, urls: &[String]) -> Result<(), ValidationError> {
    if destination.as_os_str().is_empty() {
        return Err(ValidationError::EmptyDestination);
    }
    if urls.iter().all(|url| strip_line_breaks(url).is_empty()) {
        return Err(ValidationError::EmptyBatch);
    }
    Ok(())
}

/// Sequential batch downloader.
///
/// Drives `Idle -> Running -> Finalizing -> Completed`. Exactly one transfer
/// is in flight at any time; the next job is dispatched only after the
/// previous one reported its terminal event.
pub struct DownloadOrchestrator<E> {
    executor: E,
    config: RunConfig,
    events: Option<UnboundedSender<RunEvent>>,
    phase: RunPhase,
    run: Option<RunState>,
    tracker: Option<ElapsedTracker>,
    cancel: CancelHandle,
}

impl<E: TransferExecutor> DownloadOrchestrator<E> {
    pub fn new(executor: E, config: RunConfig) -> Self {
        Self {
            executor,
            config,
            events: None,
            phase: RunPhase::Idle,
            run: None,
            tracker: None,
            cancel: CancelHandle::default(),
        }
    }

    pub fn with_events(mut self, events: UnboundedSender<RunEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// State of the current run, or of the last finished one.
    pub fn run_state(&self) -> Option<&RunState> {
        self.run.as_ref()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Splits a raw `;`-separated batch and runs it.
    pub async fn start_batch(
        &mut self,
        destination: impl Into<PathBuf>,
        raw_urls: &str,
    ) -> Result<RunSummary, AppError> {
        self.start(destination, split_batch(raw_urls)).await
    }

    /// Downloads every URL in order into `destination` and writes LOG.txt.
    ///
    /// Only validation problems are returned as errors; per-job failures are
    /// reflected in the summary and the log.
    pub async fn start(
        &mut self,
        destination: impl Into<PathBuf>,
        urls: Vec<String>,
    ) -> Result<RunSummary, AppError> {
        let destination = destination.into();
        self.ensure_startable()?;
        validate(&destination, &urls)?;

        tokio::fs::create_dir_all(&destination)
            .await
            .map_err(|e| AppError::Io(format!("Failed to create {}: {}", destination.display(), e)))?;

        self.begin(destination, urls)?;

        while let Some(job) = self.dispatch_next() {
            let outcome = self.execute(&job).await;
            self.record_outcome(&job, outcome).await;
        }

        self.finalize()
            .await
            .ok_or_else(|| AppError::Io("run did not reach finalization".to_string()))
    }

    /// `Idle`/`Completed` -> `Running`. Nothing is mutated on error.
    pub fn begin(&mut self, destination: PathBuf, urls: Vec<String>) -> Result<(), AppError> {
        self.ensure_startable()?;
        validate(&destination, &urls)?;

        let urls: Vec<String> = urls
            .into_iter()
            .filter(|url| !strip_line_breaks(url).is_empty())
            .collect();
        let run = RunState::new(destination, urls);
        info!(
            total = run.total,
            destination = %run.destination.display(),
            "Starting batch"
        );

        self.tracker = Some(ElapsedTracker::start(
            run.started_at,
            self.config.tick_interval(),
            self.events.clone(),
        ));
        self.emit(RunEvent::Started { total: run.total });
        self.run = Some(run);
        self.phase = RunPhase::Running;
        Ok(())
    }

    /// Dequeues the next job and records it in the log before its transfer.
    ///
    /// Returns `None` once the queue is drained, moving the run to
    /// `Finalizing`.
    pub fn dispatch_next(&mut self) -> Option<DownloadJob> {
        if self.phase != RunPhase::Running {
            return None;
        }
        let run = self.run.as_mut()?;

        let Some(job) = run.next_job() else {
            debug!("Queue drained");
            self.phase = RunPhase::Finalizing;
            return None;
        };

        run.log.job(&job.url, &job.file_name);
        let total = run.total;
        info!(index = job.index, total, url = %job.url, file = %job.file_name, "Dispatching job");

        self.emit(RunEvent::JobStarted {
            index: job.index,
            total,
            url: job.url.clone(),
            file_name: job.file_name.clone(),
        });
        Some(job)
    }

    /// Runs the transfer for `job` to its terminal event.
    pub async fn execute(&self, job: &DownloadJob) -> JobOutcome {
        let token = self.cancel.arm();
        let mut stream =
            self.executor
                .transfer(job.url.clone(), job.target_path.clone(), token);

        while let Some(event) = stream.next().await {
            match event {
                TransferEvent::Progress(percent) => self.emit(RunEvent::Progress {
                    index: job.index,
                    percent,
                }),
                TransferEvent::Completed => return JobOutcome::Ok,
                TransferEvent::Cancelled | TransferEvent::Failed(AppError::Cancelled) => {
                    return JobOutcome::Cancelled
                }
                TransferEvent::Failed(e) => return JobOutcome::Failed(e.to_string()),
            }
        }

        JobOutcome::Failed("transfer ended without a result".to_string())
    }

    /// Logs the outcome, updates counters and removes leftovers of a failed
    /// transfer.
    pub async fn record_outcome(&mut self, job: &DownloadJob, outcome: JobOutcome) {
        let Some(run) = self.run.as_mut() else {
            return;
        };

        run.log.outcome(&outcome);
        run.record(&outcome);

        match &outcome {
            JobOutcome::Ok => info!(index = job.index, file = %job.file_name, "Job succeeded"),
            JobOutcome::Failed(reason) => {
                warn!(index = job.index, url = %job.url, %reason, "Job failed");
                remove_partial(&job.target_path).await;
            }
            JobOutcome::Cancelled => {
                warn!(index = job.index, url = %job.url, "Job cancelled");
                if self.config.delete_partial_on_cancel {
                    remove_partial(&job.target_path).await;
                }
            }
        }

        self.emit(RunEvent::JobFinished {
            index: job.index,
            outcome,
        });
    }

    /// `Finalizing` -> `Completed`: stops the ticker and writes LOG.txt.
    ///
    /// Returns `None` when the run is not finalizing.
    pub async fn finalize(&mut self) -> Option<RunSummary> {
        if self.phase != RunPhase::Finalizing {
            return None;
        }
        let run = self.run.as_mut()?;

        let elapsed = match self.tracker.take() {
            Some(mut tracker) => tracker.stop(),
            None => run.elapsed(),
        };

        run.terminal = true;
        run.log.finish();

        let log_path = match run.log.write_to(&run.destination).await {
            Ok(path) => path,
            Err(e) => {
                error!(destination = %run.destination.display(), error = %e, "Failed to write run log");
                None
            }
        };

        let summary = RunSummary {
            total: run.total,
            succeeded: run.succeeded,
            failed: run.failed,
            log_path,
            elapsed,
        };
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Batch completed"
        );

        self.phase = RunPhase::Completed;
        self.emit(RunEvent::Completed(summary.clone()));
        Some(summary)
    }

    fn ensure_startable(&self) -> Result<(), ValidationError> {
        match self.phase {
            RunPhase::Idle | RunPhase::Completed => Ok(()),
            RunPhase::Running | RunPhase::Finalizing => Err(ValidationError::RunInProgress),
        }
    }

    fn emit(&self, event: RunEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}

async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "Removed partial file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove partial file"),
    }
}
