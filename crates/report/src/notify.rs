//! Where reports go.

use crate::Message;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use docwatch_storage::BackendHandle;
use exn::ResultExt;
use rslug::slugify;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use time::OffsetDateTime;
use time::macros::format_description;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::instrument;

/// A sink for rendered reports.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Name of the sink, used for logging only.
    fn name(&self) -> &str;

    async fn notify(&self, message: &Message) -> Result<()>;
}

/// Hands messages to the local mail transfer agent.
///
/// Runs `sendmail -t -oi`: recipients are read from the message headers and a
/// line with a single dot does not end the message early.
#[derive(Debug, Clone)]
pub struct Sendmail {
    binary: PathBuf,
    args: Vec<String>,
}
impl Sendmail {
    const CANDIDATES: [&str; 3] = ["sendmail", "/usr/sbin/sendmail", "/usr/lib/sendmail"];

    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            args: vec!["-t".to_string(), "-oi".to_string()],
        }
    }

    /// Use `binary` if configured, otherwise the first `sendmail` found.
    pub fn discover(binary: Option<&Path>) -> Result<Self> {
        if let Some(binary) = binary {
            return match which::which(binary) {
                Ok(path) => Ok(Self::new(path)),
                Err(_) => exn::bail!(ErrorKind::SendmailNotFound),
            };
        }
        for candidate in Self::CANDIDATES {
            if let Ok(path) = which::which(candidate) {
                tracing::debug!(path = %path.display(), "Discovered sendmail");
                return Ok(Self::new(path));
            }
        }
        exn::bail!(ErrorKind::SendmailNotFound);
    }

    /// Replace the default `-t -oi` arguments, for transfer agents that
    /// expect something else.
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}
#[async_trait]
impl Notifier for Sendmail {
    fn name(&self) -> &str {
        "sendmail"
    }

    #[instrument(skip_all, fields(binary = %self.binary.display(), recipients = message.recipients.len()))]
    async fn notify(&self, message: &Message) -> Result<()> {
        let text = message.to_rfc5322()?;
        let mut child = Command::new(&self.binary)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .or_raise(|| ErrorKind::Io)?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await.or_raise(|| ErrorKind::Io)?;
            // Closing stdin is what tells sendmail the message is complete.
            drop(stdin);
        }
        let output = child.wait_with_output().await.or_raise(|| ErrorKind::Io)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(status = %output.status, stderr = %stderr.trim(), "Sendmail failed");
            exn::bail!(ErrorKind::SendmailFailed(output.status.code()));
        }
        tracing::debug!(bytes = text.len(), "Message handed to sendmail");
        Ok(())
    }
}

/// Keeps a copy of every report on a storage backend.
///
/// Files are named `YYYYMMDD-HHMMSS-<subject-slug>.html`; an existing file is
/// never overwritten, a numeric suffix is added instead.
pub struct Archive {
    backend: BackendHandle,
}
impl Archive {
    pub fn new(backend: BackendHandle) -> Self {
        Self { backend }
    }

    async fn free_path(&self, stem: &str) -> Result<PathBuf> {
        let mut path = PathBuf::from(format!("{stem}.html"));
        let mut attempt = 1;
        while self.backend.exists(&path).await.or_raise(|| ErrorKind::Archive)? {
            attempt += 1;
            path = PathBuf::from(format!("{stem}-{attempt}.html"));
        }
        Ok(path)
    }

    fn stem(subject: &str, at: OffsetDateTime) -> Result<String> {
        let format = format_description!("[year][month][day]-[hour][minute][second]");
        let timestamp = at.format(&format).or_raise(|| ErrorKind::Archive)?;
        let slug = slugify!(subject);
        if slug.is_empty() {
            return Ok(timestamp);
        }
        Ok(format!("{timestamp}-{slug}"))
    }
}
#[async_trait]
impl Notifier for Archive {
    fn name(&self) -> &str {
        "archive"
    }

    #[instrument(skip_all, fields(backend = self.backend.name()))]
    async fn notify(&self, message: &Message) -> Result<()> {
        let stem = Self::stem(&message.subject, OffsetDateTime::now_utc())?;
        let path = self.free_path(&stem).await?;
        self.backend.write(&path, message.body.as_bytes()).await.or_raise(|| ErrorKind::Archive)?;
        tracing::info!(path = %path.display(), "Report archived");
        Ok(())
    }
}

/// Logs messages instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRun;
#[async_trait]
impl Notifier for DryRun {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn notify(&self, message: &Message) -> Result<()> {
        tracing::info!(
            subject = %message.subject,
            recipients = %message.recipients.join(", "),
            bytes = message.body.len(),
            "Dry run; not sending report"
        );
        tracing::debug!(body = %message.body, "Report body");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docwatch_storage::StorageBackend;
    use docwatch_storage::backend::MockBackend;
    use std::sync::Arc;
    use time::macros::datetime;

    fn message() -> Message {
        Message::new("Nowe dokumenty w repozytorium", "docwatch@example.com", ["qa@example.com"], "<p>Report</p>")
    }

    #[test]
    fn test_archive_stem() {
        let at = datetime!(2024-03-01 09:05:07 UTC);
        assert_eq!(Archive::stem("Nowe dokumenty w repozytorium", at).unwrap(), "20240301-090507-nowe-dokumenty-w-repozytorium");
        assert_eq!(Archive::stem("", at).unwrap(), "20240301-090507");
    }

    #[tokio::test]
    async fn test_archive_never_overwrites() {
        let backend = Arc::new(MockBackend::default());
        let archive = Archive::new(backend.clone());
        archive.notify(&message()).await.unwrap();
        archive.notify(&message()).await.unwrap();
        archive.notify(&message()).await.unwrap();
        let files = backend.list(None).await.unwrap();
        assert_eq!(files.len(), 3);
        for file in &files {
            assert_eq!(backend.read(&file.path).await.unwrap(), b"<p>Report</p>");
            assert!(file.filename().ends_with(".html"));
        }
    }

    #[tokio::test]
    async fn test_archive_backend_failure() {
        let archive = Archive::new(Arc::new(MockBackend::default().failing()));
        let err = archive.notify(&message()).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Archive));
    }

    #[tokio::test]
    async fn test_dry_run() {
        DryRun.notify(&message()).await.unwrap();
    }

    #[test]
    fn test_discover_missing_binary() {
        let err = Sendmail::discover(Some(Path::new("/nonexistent/sendmail"))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::SendmailNotFound));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_sendmail_pipes_message() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("message.eml");
        let sendmail = Sendmail::new("/bin/sh").with_args(["-c", "cat > \"$0\"", out.to_str().unwrap()]);
        sendmail.notify(&message()).await.unwrap();
        let written = std::fs::read_to_string(&out).unwrap();
        assert!(written.starts_with("From: docwatch@example.com\nTo: qa@example.com\n"));
        assert!(written.ends_with("\n\n<p>Report</p>\n"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_sendmail_failure() {
        let sendmail = Sendmail::new("/bin/sh").with_args(["-c", "cat > /dev/null; exit 75"]);
        let err = sendmail.notify(&message()).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::SendmailFailed(Some(75))));
        assert!(err.is_retryable());
    }
}
