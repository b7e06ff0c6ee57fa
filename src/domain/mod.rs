pub mod error;
pub mod model;
pub mod naming;
pub mod run_log;

pub use error::{AppError, ValidationError};
pub use model::{DownloadJob, JobOutcome, RunPhase, RunState, RunSummary};
pub use naming::{extension_of, name_for};
pub use run_log::{RunLog, LOG_FILE_NAME};
