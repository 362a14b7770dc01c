//! HTML to PDF export.
//!
//! Two interchangeable backends sit behind [`PdfExporter`]: a headless Chromium
//! (`chromium`) and the `wkhtmltopdf` converter. Both run as a child process per
//! request inside a scratch directory that is removed on every exit path.

mod chromium;
mod wkhtmltopdf;

use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use thiserror::Error;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

pub use chromium::ChromiumExporter;
pub use wkhtmltopdf::WkhtmltopdfExporter;

/// Leading bytes of every PDF file.
pub const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF rendering did not finish within {0:?}")]
    RenderTimeout(Duration),
    #[error("PDF exporter not configured: {0}")]
    NotConfigured(String),
    #[error("PDF exporter failed: {0}")]
    Failure(String),
    #[error("PDF exporter I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait PdfExporter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Checks that the backend can run, without spawning anything.
    fn ensure_available(&self) -> Result<(), ExportError>;

    async fn export(&self, html: &str) -> Result<Vec<u8>, ExportError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExporterKind {
    Chromium,
    Wkhtmltopdf,
}

impl FromStr for ExporterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chromium" | "chrome" | "browser" => Ok(Self::Chromium),
            "wkhtmltopdf" | "converter" => Ok(Self::Wkhtmltopdf),
            other => Err(format!("unknown PDF exporter '{other}' (expected chromium or wkhtmltopdf)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub kind: ExporterKind,
    pub chrome_path: Option<PathBuf>,
    pub wkhtmltopdf_path: Option<PathBuf>,
    pub timeout: Duration,
}

pub fn build_exporter(config: &ExportConfig) -> Arc<dyn PdfExporter> {
    match config.kind {
        ExporterKind::Chromium => {
            Arc::new(ChromiumExporter::new(config.chrome_path.clone(), config.timeout))
        }
        ExporterKind::Wkhtmltopdf => {
            Arc::new(WkhtmltopdfExporter::new(config.wkhtmltopdf_path.clone(), config.timeout))
        }
    }
}

/// Finds the backend binary: an explicit override must point at an existing file,
/// otherwise the first candidate name found on `PATH` wins.
pub(crate) fn resolve_binary(
    explicit: Option<&Path>,
    candidates: &[&str],
) -> Result<PathBuf, ExportError> {
    if let Some(path) = explicit {
        return if path.is_file() {
            Ok(path.to_path_buf())
        } else {
            Err(ExportError::NotConfigured(format!(
                "{} does not exist or is not a file",
                path.display()
            )))
        };
    }

    let search_path = std::env::var_os("PATH").unwrap_or_default();
    for dir in std::env::split_paths(&search_path) {
        for name in candidates {
            let path = dir.join(name);
            if path.is_file() {
                return Ok(path);
            }
        }
    }
    Err(ExportError::NotConfigured(format!(
        "none of [{}] found on PATH",
        candidates.join(", ")
    )))
}

/// A converter child process and the scratch directory it works in.
///
/// The child is spawned with `kill_on_drop`, so an abandoned request still tears it
/// down; [`ConverterProcess::close`] kills and reaps it explicitly. On unix the child
/// leads its own process group, and a kill signals the whole group so helper
/// processes (browser renderers, zygotes) go with it.
pub(crate) struct ConverterProcess {
    child: Child,
    workdir: TempDir,
}

impl ConverterProcess {
    pub(crate) fn spawn(mut command: std::process::Command, workdir: TempDir) -> Result<Self, ExportError> {
        #[cfg(unix)]
        std::os::unix::process::CommandExt::process_group(&mut command, 0);
        let mut command = Command::from(command);
        command.kill_on_drop(true);
        let child = command
            .spawn()
            .map_err(|e| ExportError::Failure(format!("failed to launch converter: {e}")))?;
        debug!(pid = ?child.id(), "Converter process launched");
        Ok(Self { child, workdir })
    }

    pub(crate) fn workdir(&self) -> &Path {
        self.workdir.path()
    }

    /// Waits for the process to exit, bounded by `timeout`. On timeout the process
    /// is killed before the error is returned.
    pub(crate) async fn wait(&mut self, timeout: Duration) -> Result<ExitStatus, ExportError> {
        match tokio::time::timeout(timeout, self.child.wait()).await {
            Ok(status) => Ok(status?),
            Err(_) => {
                warn!("⏱️ Converter exceeded {:?}, killing it", timeout);
                self.kill().await;
                Err(ExportError::RenderTimeout(timeout))
            }
        }
    }

    async fn kill(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            #[cfg(unix)]
            self.kill_group();
            if let Err(e) = self.child.kill().await {
                warn!("Failed to kill converter process: {}", e);
            }
        }
    }

    #[cfg(unix)]
    fn kill_group(&self) {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        let Some(pid) = self.child.id() else {
            return;
        };
        let Ok(pgid) = i32::try_from(pid) else {
            return;
        };
        if let Err(e) = killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
            debug!("Process group {} already gone: {}", pgid, e);
        }
    }

    /// Kills the process if still running and removes the scratch directory.
    pub(crate) async fn close(mut self) {
        self.kill().await;
        if let Err(e) = self.workdir.close() {
            warn!("Failed to remove export scratch directory: {}", e);
        }
    }
}

pub(crate) fn scratch_dir() -> Result<TempDir, ExportError> {
    Ok(tempfile::Builder::new().prefix("resume-export-").tempdir()?)
}

/// Last few lines of a converter log, for error messages.
pub(crate) async fn log_tail(path: &Path) -> String {
    let log = tokio::fs::read_to_string(path).await.unwrap_or_default();
    let lines: Vec<&str> = log.lines().filter(|l| !l.trim().is_empty()).collect();
    lines[lines.len().saturating_sub(5)..].join(" | ")
}

/// Accepts converter output only if it is a non-empty PDF.
pub(crate) fn ensure_pdf(bytes: Vec<u8>) -> Result<Vec<u8>, ExportError> {
    if bytes.is_empty() {
        return Err(ExportError::Failure("converter produced an empty file".into()));
    }
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(ExportError::Failure("converter output is not a PDF".into()));
    }
    Ok(bytes)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::{Path, PathBuf};

    /// Writes an executable shell script and returns its path.
    #[cfg(unix)]
    pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }
}
