use crate::application::RunEvent;
use crate::domain::JobOutcome;

/// Terminal rendering of a batch run.
///
/// Keeps a one-line transient status (elapsed time, current job, progress)
/// and turns milestones into permanent lines.
pub struct ConsoleView {
    pub elapsed: String,
    pub status_message: String,
    pub progress: u8,
    pub finished: bool,
}

impl Default for ConsoleView {
    fn default() -> Self {
        Self {
            elapsed: "00:00:00".to_string(),
            status_message: "Waiting for URLs".to_string(),
            progress: 0,
            finished: false,
        }
    }
}

impl ConsoleView {
    /// Applies an event; returns a line to print permanently, if any.
    pub fn update(&mut self, event: RunEvent) -> Option<String> {
        match event {
            RunEvent::Started { total } => {
                self.status_message = "Downloading...".to_string();
                Some(format!("Downloading {} file(s)", total))
            }
            RunEvent::JobStarted {
                index,
                total,
                url,
                file_name,
            } => {
                self.progress = 0;
                self.status_message = format!("File {} of {}...", index, total);
                Some(format!("[{}/{}] {} -> {}", index, total, url, file_name))
            }
            RunEvent::Progress { percent, .. } => {
                self.progress = percent;
                None
            }
            RunEvent::JobFinished { index, outcome } => Some(match outcome {
                JobOutcome::Ok => format!("  #{} OK", index),
                JobOutcome::Failed(reason) => format!("  #{} FAILED: {}", index, reason),
                JobOutcome::Cancelled => format!("  #{} CANCELLED", index),
            }),
            RunEvent::Elapsed(elapsed) => {
                self.elapsed = elapsed;
                None
            }
            RunEvent::Completed(summary) => {
                self.finished = true;
                self.status_message = format!("Finished. {}", self.status_message);
                let log = match &summary.log_path {
                    Some(path) => format!("Log: {}", path.display()),
                    None => "Log could not be written".to_string(),
                };
                Some(format!(
                    "{} file(s) OK, {} file(s) failed. {}",
                    summary.succeeded, summary.failed, log
                ))
            }
        }
    }

    pub fn status_line(&self) -> String {
        if self.finished {
            format!("Elapsed time: {} | {}", self.elapsed, self.status_message)
        } else {
            format!(
                "Elapsed time: {} | {} {:>3}%",
                self.elapsed, self.status_message, self.progress
            )
        }
    }
}
