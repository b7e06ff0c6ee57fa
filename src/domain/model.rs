use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::naming::{extension_of, name_for};
use super::run_log::RunLog;
use crate::utils::strip_line_breaks;

/// Orchestrator lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Running,
    Finalizing,
    Completed,
}

/// Terminal result of a single job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Ok,
    Failed(String),
    Cancelled,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Ok)
    }
}

/// The file currently being downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    pub url: String,
    pub index: u32,
    pub extension: String,
    pub file_name: String,
    pub target_path: PathBuf,
}

/// Final report handed back to the caller once the queue is drained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// `None` when LOG.txt could not be written.
    pub log_path: Option<PathBuf>,
    pub elapsed: Duration,
}

/// Aggregate state of one batch run.
///
/// Owns the pending queue, the sequence counter and the run log so that every
/// mutation goes through a single value held by the orchestrator.
#[derive(Debug)]
pub struct RunState {
    pub destination: PathBuf,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub started_at: Instant,
    pub log: RunLog,
    pub terminal: bool,
    queue: VecDeque<String>,
    next_index: u32,
}

impl RunState {
    pub fn new(destination: PathBuf, urls: Vec<String>) -> Self {
        Self {
            destination,
            total: urls.len(),
            succeeded: 0,
            failed: 0,
            started_at: Instant::now(),
            log: RunLog::begin(),
            terminal: false,
            queue: urls.into(),
            next_index: 1,
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn dequeued(&self) -> usize {
        self.total - self.queue.len()
    }

    /// Index the next dequeued job will receive.
    pub fn next_index(&self) -> u32 {
        self.next_index
    }

    /// Pops the head URL and assigns it the current sequence index.
    pub fn next_job(&mut self) -> Option<DownloadJob> {
        let raw = self.queue.pop_front()?;
        let url = strip_line_breaks(&raw);
        let extension = extension_of(&url);

        let index = self.next_index;
        self.next_index += 1;

        let file_name = name_for(index, &extension);
        let target_path = self.destination.join(&file_name);

        Some(DownloadJob {
            url,
            index,
            extension,
            file_name,
            target_path,
        })
    }

    pub fn record(&mut self, outcome: &JobOutcome) {
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}
