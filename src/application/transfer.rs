use std::path::PathBuf;
use std::time::Duration;

use futures::{stream::BoxStream, StreamExt};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use crate::{
    api::{TransferClient, TransferError},
    domain::AppError,
};

#[derive(Debug, Clone)]
pub enum TransferEvent {
    /// Integer percentage, truncated. Only sent when the size is known.
    Progress(u8),
    Completed,
    Failed(AppError),
    Cancelled,
}

impl TransferEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransferEvent::Progress(_))
    }
}

/// Performs the byte-level fetch of one URL into one local file.
///
/// The returned stream yields any number of `Progress` events followed by
/// exactly one terminal event, after which it ends.
pub trait TransferExecutor: Send + Sync {
    fn transfer(
        &self,
        url: String,
        path: PathBuf,
        cancel: CancellationToken,
    ) -> BoxStream<'static, TransferEvent>;
}

pub fn percent(downloaded: u64, total: Option<u64>) -> Option<u8> {
    match total {
        Some(total) if total > 0 => Some((downloaded.saturating_mul(100) / total).min(100) as u8),
        _ => None,
    }
}

/// HTTP implementation backed by [`TransferClient`].
#[derive(Clone)]
pub struct HttpTransfer {
    client: TransferClient,
}

impl HttpTransfer {
    pub fn new(client: TransferClient) -> Self {
        Self { client }
    }
}

impl TransferExecutor for HttpTransfer {
    fn transfer(
        &self,
        url: String,
        path: PathBuf,
        cancel: CancellationToken,
    ) -> BoxStream<'static, TransferEvent> {
        futures::stream::unfold(
            TransferState::Start {
                client: self.client.clone(),
                url,
                path,
                cancel,
            },
            |mut state| async move {
                loop {
                    match state {
                        TransferState::Start {
                            client,
                            url,
                            path,
                            cancel,
                        } => {
                            let file = match tokio::fs::File::create(&path).await {
                                Ok(file) => file,
                                Err(e) => {
                                    return Some((
                                        TransferEvent::Failed(AppError::Io(format!(
                                            "Failed to create file: {}",
                                            e
                                        ))),
                                        TransferState::Finished,
                                    ));
                                }
                            };

                            let stall_timeout = client.stall_timeout();
                            let opened = tokio::select! {
                                biased;
                                _ = cancel.cancelled() => {
                                    return Some((TransferEvent::Cancelled, TransferState::Finished));
                                }
                                opened = tokio::time::timeout(
                                    stall_timeout,
                                    client.download_file_stream(&url),
                                ) => opened.unwrap_or(Err(TransferError::Stalled(stall_timeout))),
                            };

                            let (total, stream) = match opened {
                                Ok(opened) => opened,
                                Err(e) => {
                                    return Some((
                                        TransferEvent::Failed(AppError::Transfer(e.to_string())),
                                        TransferState::Finished,
                                    ));
                                }
                            };

                            let downloading = TransferState::Downloading {
                                file,
                                stream,
                                downloaded: 0,
                                total,
                                last_percent: 0,
                                stall_timeout,
                                cancel,
                            };
                            match percent(0, total) {
                                Some(p) => return Some((TransferEvent::Progress(p), downloading)),
                                None => state = downloading,
                            }
                        }
                        TransferState::Downloading {
                            mut file,
                            mut stream,
                            mut downloaded,
                            total,
                            last_percent,
                            stall_timeout,
                            cancel,
                        } => loop {
                            let next = tokio::select! {
                                biased;
                                _ = cancel.cancelled() => {
                                    return Some((TransferEvent::Cancelled, TransferState::Finished));
                                }
                                next = tokio::time::timeout(stall_timeout, stream.next()) => next,
                            };

                            match next {
                                Err(_) => {
                                    let e = TransferError::Stalled(stall_timeout);
                                    return Some((
                                        TransferEvent::Failed(AppError::Transfer(e.to_string())),
                                        TransferState::Finished,
                                    ));
                                }
                                Ok(Some(Ok(chunk))) => {
                                    if let Err(e) = file.write_all(&chunk).await {
                                        return Some((
                                            TransferEvent::Failed(AppError::Io(format!(
                                                "Write error: {}",
                                                e
                                            ))),
                                            TransferState::Finished,
                                        ));
                                    }

                                    downloaded += chunk.len() as u64;

                                    // Only report when the truncated percentage moves.
                                    match percent(downloaded, total) {
                                        Some(p) if p != last_percent => {
                                            return Some((
                                                TransferEvent::Progress(p),
                                                TransferState::Downloading {
                                                    file,
                                                    stream,
                                                    downloaded,
                                                    total,
                                                    last_percent: p,
                                                    stall_timeout,
                                                    cancel,
                                                },
                                            ));
                                        }
                                        _ => continue,
                                    }
                                }
                                Ok(Some(Err(e))) => {
                                    return Some((
                                        TransferEvent::Failed(AppError::Transfer(e.to_string())),
                                        TransferState::Finished,
                                    ));
                                }
                                Ok(None) => {
                                    if let Err(e) = file.sync_all().await {
                                        return Some((
                                            TransferEvent::Failed(AppError::Io(format!(
                                                "Failed to sync file: {}",
                                                e
                                            ))),
                                            TransferState::Finished,
                                        ));
                                    }

                                    return Some((TransferEvent::Completed, TransferState::Finished));
                                }
                            }
                        },
                        TransferState::Finished => return None,
                    }
                }
            },
        )
        .boxed()
    }
}

enum TransferState {
    Start {
        client: TransferClient,
        url: String,
        path: PathBuf,
        cancel: CancellationToken,
    },
    Downloading {
        file: tokio::fs::File,
        stream: BoxStream<'static, crate::api::Result<bytes::Bytes>>,
        downloaded: u64,
        total: Option<u64>,
        last_percent: u8,
        stall_timeout: Duration,
        cancel: CancellationToken,
    },
    Finished,
}
