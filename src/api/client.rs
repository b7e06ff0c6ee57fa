use std::time::Duration;

use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use reqwest::Client;
use thiserror::Error;
use url::Url;

use super::models::ClientConfig;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server responded with status {0}")]
    Status(u16),

    #[error("No data received for {0:?}")]
    Stalled(Duration),
}

pub type Result<T> = std::result::Result<T, TransferError>;

/// Single-connection HTTP client used to fetch one file at a time.
#[derive(Clone)]
pub struct TransferClient {
    http: Client,
    config: ClientConfig,
}

impl TransferClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(Self { http, config })
    }

    pub fn stall_timeout(&self) -> Duration {
        self.config.stall_timeout()
    }

    /// Opens a GET request and returns (content_length, body stream).
    ///
    /// Non-2xx responses are errors; the body is not read in that case.
    pub async fn download_file_stream(
        &self,
        url: &str,
    ) -> Result<(Option<u64>, BoxStream<'static, Result<bytes::Bytes>>)> {
        let parsed = Url::parse(url).map_err(|e| TransferError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let response = self.http.get(parsed).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::Status(status.as_u16()));
        }

        let total_size = response.content_length();
        let stream = response
            .bytes_stream()
            .map_err(TransferError::Request)
            .boxed();

        Ok((total_size, stream))
    }
}
