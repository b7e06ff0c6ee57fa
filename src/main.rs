use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use batch_downloader::app::DownloadApp;
use batch_downloader::config::Config;
use batch_downloader::utils::BATCH_DELIMITER;

/// Downloads a list of URLs one after another into numbered files.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory receiving the files and LOG.txt.
    #[arg(short, long)]
    dest: Option<PathBuf>,

    /// URLs separated by ';'.
    #[arg(short, long)]
    urls: Option<String>,

    /// File whose content is a ';'-separated URL batch.
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match args.config.as_deref().map(Config::load).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut raw_urls = args.urls.unwrap_or_default();
    if let Some(path) = &args.file {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                raw_urls.push(BATCH_DELIMITER);
                raw_urls.push_str(&content);
            }
            Err(e) => {
                eprintln!("Failed to read {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        }
    }

    let app = match DownloadApp::new(config) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match app.run(args.dest.unwrap_or_default(), &raw_urls).await {
        Ok(summary) if summary.failed == 0 => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(2),
        Err(e) if e.is_validation() => {
            eprintln!("Cannot start: {}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
