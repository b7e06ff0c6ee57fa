pub mod client;
pub mod models;

pub use client::{Result, TransferClient, TransferError};
pub use models::ClientConfig;
