use std::io::Write;
use std::path::PathBuf;

use tokio::sync::mpsc;
use tracing::info;

use crate::api::TransferClient;
use crate::application::{DownloadOrchestrator, HttpTransfer, RunEvent};
use crate::config::Config;
use crate::domain::{AppError, RunSummary};
use crate::ui::ConsoleView;

/// Wires the HTTP executor, the orchestrator and the console view together.
pub struct DownloadApp {
    orchestrator: DownloadOrchestrator<HttpTransfer>,
    // Taken by `run` to feed the view task
    events: Option<mpsc::UnboundedReceiver<RunEvent>>,
}

impl DownloadApp {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let client =
            TransferClient::new(config.client).map_err(|e| AppError::Config(e.to_string()))?;
        let (tx, rx) = mpsc::unbounded_channel();
        let orchestrator =
            DownloadOrchestrator::new(HttpTransfer::new(client), config.run).with_events(tx);

        Ok(Self {
            orchestrator,
            events: Some(rx),
        })
    }

    /// Runs one batch. Ctrl-C cancels the file currently downloading.
    pub async fn run(
        mut self,
        destination: PathBuf,
        raw_urls: &str,
    ) -> Result<RunSummary, AppError> {
        let view = self.events.take().map(|rx| tokio::spawn(render(rx)));

        let cancel = self.orchestrator.cancel_handle();
        let interrupt = tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, cancelling current transfer");
                cancel.cancel_current();
            }
        });

        let result = self.orchestrator.start_batch(destination, raw_urls).await;
        interrupt.abort();

        // Dropping the orchestrator closes the event channel and ends the view.
        drop(self.orchestrator);
        if let Some(view) = view {
            let _ = view.await;
        }
        result
    }
}

async fn render(mut rx: mpsc::UnboundedReceiver<RunEvent>) {
    let mut view = ConsoleView::default();
    let mut stdout = std::io::stdout();

    while let Some(event) = rx.recv().await {
        if let Some(line) = view.update(event) {
            let _ = write!(stdout, "\r{:<80}\r", "");
            let _ = writeln!(stdout, "{}", line);
        }
        let _ = write!(stdout, "\r{:<80}", view.status_line());
        let _ = stdout.flush();
    }
    let _ = writeln!(stdout);
}
