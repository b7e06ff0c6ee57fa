use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use super::model::JobOutcome;

pub const LOG_FILE_NAME: &str = "LOG.txt";

const BANNER: &str = "==================================";
const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Append-only text record of a batch run, persisted once as LOG.txt.
#[derive(Debug, Default)]
pub struct RunLog {
    buf: String,
    closed: bool,
    written: bool,
}

impl RunLog {
    pub fn begin() -> Self {
        Self::begin_at(Local::now())
    }

    pub fn begin_at(at: DateTime<Local>) -> Self {
        let mut log = Self::default();
        log.banner("Início", at);
        log
    }

    /// Records the job before its transfer starts.
    pub fn job(&mut self, url: &str, file_name: &str) {
        let _ = writeln!(self.buf, "URL: {}", url);
        let _ = writeln!(self.buf, "Imagem: {}", file_name);
    }

    pub fn outcome(&mut self, outcome: &JobOutcome) {
        let status = match outcome {
            JobOutcome::Ok => "OK",
            JobOutcome::Failed(_) => "FALHA",
            JobOutcome::Cancelled => "CANCELADA",
        };
        let _ = writeln!(self.buf, "Status: {}", status);
        self.buf.push('\n');
    }

    pub fn finish(&mut self) {
        self.finish_at(Local::now());
    }

    pub fn finish_at(&mut self, at: DateTime<Local>) {
        if self.closed {
            return;
        }
        self.banner("Fim", at);
        self.closed = true;
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Writes the log into `dir`. Only the first call after `finish` touches
    /// the disk; any other call is a no-op returning `Ok(None)`.
    pub async fn write_to(&mut self, dir: &Path) -> std::io::Result<Option<PathBuf>> {
        if !self.closed || self.written {
            return Ok(None);
        }
        self.written = true;

        let path = dir.join(LOG_FILE_NAME);
        tokio::fs::write(&path, self.buf.as_bytes()).await?;
        Ok(Some(path))
    }

    fn banner(&mut self, label: &str, at: DateTime<Local>) {
        let _ = writeln!(self.buf, "{}", BANNER);
        let _ = writeln!(self.buf, "{}: {}.", label, at.format(TIMESTAMP_FORMAT));
        let _ = writeln!(self.buf, "{}", BANNER);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 7, h, m, s).unwrap()
    }

    #[test]
    fn test_full_log_layout() {
        let mut log = RunLog::begin_at(at(9, 5, 1));
        log.job("http://a.com/1.jpg", "0001.jpg");
        log.outcome(&JobOutcome::Ok);
        log.job("http://a.com/2.png", "0002.png");
        log.outcome(&JobOutcome::Failed("404".into()));
        log.job("http://a.com/3.gif", "0003.gif");
        log.outcome(&JobOutcome::Cancelled);
        log.finish_at(at(9, 6, 30));

        let expected = "\
==================================
Início: 07/03/2024 09:05:01.
==================================
URL: http://a.com/1.jpg
Imagem: 0001.jpg
Status: OK

URL: http://a.com/2.png
Imagem: 0002.png
Status: FALHA

URL: http://a.com/3.gif
Imagem: 0003.gif
Status: CANCELADA

==================================
Fim: 07/03/2024 09:06:30.
==================================
";
        assert_eq!(log.as_str(), expected);
    }

    #[test]
    fn test_footer_is_appended_once() {
        let mut log = RunLog::begin_at(at(1, 0, 0));
        log.finish_at(at(2, 0, 0));
        log.finish_at(at(3, 0, 0));

        assert_eq!(log.as_str().matches("Fim:").count(), 1);
    }

    #[tokio::test]
    async fn test_write_requires_finish_and_happens_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = RunLog::begin();

        assert_eq!(log.write_to(dir.path()).await.unwrap(), None);
        assert!(!dir.path().join(LOG_FILE_NAME).exists());

        log.finish();
        let path = log.write_to(dir.path()).await.unwrap();
        assert_eq!(path, Some(dir.path().join(LOG_FILE_NAME)));

        let content = std::fs::read_to_string(dir.path().join(LOG_FILE_NAME)).unwrap();
        assert_eq!(content, log.as_str());
        assert_eq!(log.write_to(dir.path()).await.unwrap(), None);
    }
}
