//! Sequential batch downloader.
//!
//! Takes a destination directory and a `;`-separated list of URLs, fetches
//! each URL in order into `0001.ext`, `0002.ext`, ... and writes a `LOG.txt`
//! summarizing every job once the batch is done.

pub mod api;
pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod ui;
pub mod utils;

pub use application::{DownloadOrchestrator, HttpTransfer, RunEvent, TransferExecutor};
pub use config::{Config, RunConfig};
pub use domain::{AppError, JobOutcome, RunPhase, RunSummary, ValidationError};
