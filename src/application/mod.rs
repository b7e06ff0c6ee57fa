pub mod elapsed;
pub mod orchestrator;
pub mod transfer;

pub use elapsed::ElapsedTracker;
pub use orchestrator::{validate, CancelHandle, DownloadOrchestrator, RunEvent};
pub use transfer::{HttpTransfer, TransferEvent, TransferExecutor};
