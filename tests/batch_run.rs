//! End-to-end batch runs against a local mock HTTP server.

use batch_downloader::api::{ClientConfig, TransferClient};
use batch_downloader::domain::LOG_FILE_NAME;
use batch_downloader::{
    AppError, DownloadOrchestrator, HttpTransfer, RunConfig, RunEvent, RunPhase, ValidationError,
};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::mpsc;

fn orchestrator() -> DownloadOrchestrator<HttpTransfer> {
    let client = TransferClient::new(ClientConfig::default()).unwrap();
    DownloadOrchestrator::new(HttpTransfer::new(client), RunConfig::default())
}

#[tokio::test]
async fn test_downloads_batch_in_order_and_writes_log() {
    let mut server = mockito::Server::new_async().await;
    let first = server
        .mock("GET", "/img/1.jpg")
        .with_status(200)
        .with_body("first")
        .create_async()
        .await;
    let second = server
        .mock("GET", "/img/2.png")
        .with_status(200)
        .with_body("second")
        .create_async()
        .await;
    let dir = tempfile::tempdir().unwrap();
    let batch = format!("{0}/img/1.jpg;\r\n{0}/img/2.png;", server.url());

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut orchestrator = orchestrator().with_events(tx);
    let summary = orchestrator.start_batch(dir.path(), &batch).await.unwrap();

    first.assert_async().await;
    second.assert_async().await;
    assert_eq!((summary.succeeded, summary.failed), (2, 0));
    assert_eq!(std::fs::read(dir.path().join("0001.jpg")).unwrap(), b"first");
    assert_eq!(std::fs::read(dir.path().join("0002.png")).unwrap(), b"second");
    assert_eq!(orchestrator.phase(), RunPhase::Completed);

    let log = std::fs::read_to_string(dir.path().join(LOG_FILE_NAME)).unwrap();
    assert!(log.contains(&format!("URL: {}/img/1.jpg\nImagem: 0001.jpg\nStatus: OK\n", server.url())));
    assert!(log.contains(&format!("URL: {}/img/2.png\nImagem: 0002.png\nStatus: OK\n", server.url())));

    let mut saw_full_progress = false;
    while let Ok(event) = rx.try_recv() {
        if let RunEvent::Progress { percent: 100, .. } = event {
            saw_full_progress = true;
        }
    }
    assert!(saw_full_progress);
}

#[tokio::test]
async fn test_failing_job_does_not_stop_the_batch() {
    let mut server = mockito::Server::new_async().await;
    let _ok = server
        .mock("GET", "/a.jpg")
        .with_status(200)
        .with_body("a")
        .create_async()
        .await;
    let _missing = server
        .mock("GET", "/b.jpg")
        .with_status(404)
        .create_async()
        .await;
    let _last = server
        .mock("GET", "/c.gif")
        .with_status(200)
        .with_body("c")
        .create_async()
        .await;
    let dir = tempfile::tempdir().unwrap();
    let urls = vec![
        format!("{}/a.jpg", server.url()),
        format!("{}/b.jpg", server.url()),
        format!("{}/c.gif", server.url()),
        "not-a-url.png".to_string(),
    ];

    let summary = orchestrator().start(dir.path(), urls).await.unwrap();

    assert_eq!(summary.total, 4);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 2);
    assert!(dir.path().join("0001.jpg").exists());
    assert!(!dir.path().join("0002.jpg").exists());
    assert!(dir.path().join("0003.gif").exists());
    assert!(!dir.path().join("0004.png").exists());

    let log = std::fs::read_to_string(dir.path().join(LOG_FILE_NAME)).unwrap();
    assert_eq!(log.matches("Status: FALHA").count(), 2);
    assert_eq!(log.matches("Status: OK").count(), 2);
    assert!(log.trim_end().ends_with("=================================="));
}

#[tokio::test]
async fn test_validation_errors_leave_no_trace() {
    let dir = tempfile::tempdir().unwrap();
    let mut orchestrator = orchestrator();

    let empty = orchestrator.start_batch(dir.path(), "").await;
    assert!(matches!(
        empty,
        Err(AppError::Validation(ValidationError::EmptyBatch))
    ));

    let no_dest = orchestrator.start_batch("", "http://a.com/1.jpg").await;
    assert!(matches!(
        no_dest,
        Err(AppError::Validation(ValidationError::EmptyDestination))
    ));

    assert_eq!(orchestrator.phase(), RunPhase::Idle);
    assert!(!dir.path().join(LOG_FILE_NAME).exists());
}

#[tokio::test]
async fn test_stalled_body_is_failed_and_removed() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        let _ = socket.read(&mut buf).await;
        let _ = socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\n\r\npartial")
            .await;
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let config = ClientConfig {
        stall_timeout_secs: 1,
        ..ClientConfig::default()
    };
    let client = TransferClient::new(config).unwrap();
    let mut orchestrator =
        DownloadOrchestrator::new(HttpTransfer::new(client), RunConfig::default());
    let dir = tempfile::tempdir().unwrap();

    let summary = tokio::time::timeout(
        Duration::from_secs(10),
        orchestrator.start(dir.path(), vec![format!("http://{}/big.bin", addr)]),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!((summary.succeeded, summary.failed), (0, 1));
    assert!(!dir.path().join("0001.bin").exists());
    let log = std::fs::read_to_string(dir.path().join(LOG_FILE_NAME)).unwrap();
    assert!(log.contains("Imagem: 0001.bin\nStatus: FALHA\n"));
}
