use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info};

use super::{ensure_pdf, log_tail, resolve_binary, scratch_dir, ConverterProcess, ExportError, PdfExporter};

const CANDIDATES: &[&str] = &["wkhtmltopdf"];

/// Converts pages with the external `wkhtmltopdf` binary.
pub struct WkhtmltopdfExporter {
    binary: Option<PathBuf>,
    timeout: Duration,
}

impl WkhtmltopdfExporter {
    pub fn new(binary: Option<PathBuf>, timeout: Duration) -> Self {
        Self { binary, timeout }
    }
}

fn converter_args(page: &Path, output: &Path) -> Vec<String> {
    vec![
        "--page-size".into(),
        "A4".into(),
        "--encoding".into(),
        "UTF-8".into(),
        "--enable-local-file-access".into(),
        "--disable-smart-shrinking".into(),
        "--quiet".into(),
        page.display().to_string(),
        output.display().to_string(),
    ]
}

#[async_trait]
impl PdfExporter for WkhtmltopdfExporter {
    fn name(&self) -> &'static str {
        "wkhtmltopdf"
    }

    fn ensure_available(&self) -> Result<(), ExportError> {
        resolve_binary(self.binary.as_deref(), CANDIDATES).map(|_| ())
    }

    async fn export(&self, html: &str) -> Result<Vec<u8>, ExportError> {
        // Resolve before touching the filesystem or spawning anything.
        let binary = resolve_binary(self.binary.as_deref(), CANDIDATES)?;

        let workdir = scratch_dir()?;
        let page = workdir.path().join("page.html");
        let output = workdir.path().join("out.pdf");
        let log = workdir.path().join("converter.log");
        tokio::fs::write(&page, html).await?;
        let stderr = tokio::fs::File::create(&log).await?.into_std().await;

        let mut command = Command::new(&binary);
        command
            .args(converter_args(&page, &output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr));

        let mut converter = ConverterProcess::spawn(command, workdir)?;
        info!("🖨️ Running {}", binary.display());

        let outcome = match converter.wait(self.timeout).await {
            Ok(status) if status.success() => match tokio::fs::read(&output).await {
                Ok(bytes) => ensure_pdf(bytes),
                Err(e) => Err(ExportError::Failure(format!("converter wrote no PDF: {e}"))),
            },
            Ok(status) => {
                let tail = log_tail(&log).await;
                Err(ExportError::Failure(format!("wkhtmltopdf exited with {status}: {tail}")))
            }
            Err(e) => Err(e),
        };
        converter.close().await;

        match &outcome {
            Ok(bytes) => info!("✅ wkhtmltopdf produced PDF ({} bytes)", bytes.len()),
            Err(e) => error!("❌ wkhtmltopdf export failed: {}", e),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn args_carry_the_fixed_options() {
        let args = converter_args(Path::new("/tmp/in.html"), Path::new("/tmp/out.pdf"));
        assert_eq!(
            args,
            vec![
                "--page-size",
                "A4",
                "--encoding",
                "UTF-8",
                "--enable-local-file-access",
                "--disable-smart-shrinking",
                "--quiet",
                "/tmp/in.html",
                "/tmp/out.pdf",
            ]
        );
    }

    #[tokio::test]
    async fn missing_binary_fails_before_spawning() {
        let exporter = WkhtmltopdfExporter::new(
            Some(PathBuf::from("/nonexistent/wkhtmltopdf")),
            Duration::from_secs(1),
        );
        let err = exporter.export("<p>hello</p>").await.unwrap_err();
        assert!(matches!(err, ExportError::NotConfigured(ref msg) if msg.contains("/nonexistent/wkhtmltopdf")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn fake_converter_output_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        // Writes a PDF to its last argument, like wkhtmltopdf does.
        let converter = crate::pdf::test_support::write_script(
            dir.path(),
            "fake-wkhtmltopdf",
            r#"for out; do :; done
printf '%%PDF-1.4\n%%%%EOF\n' > "$out""#,
        );

        let exporter = WkhtmltopdfExporter::new(Some(converter), Duration::from_secs(10));
        let pdf = exporter.export("<h1>Résumé</h1>").await.unwrap();
        assert!(pdf.starts_with(b"%PDF-1.4"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_pdf_output_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let converter = crate::pdf::test_support::write_script(
            dir.path(),
            "broken-wkhtmltopdf",
            r#"for out; do :; done
echo "not a pdf" > "$out""#,
        );

        let exporter = WkhtmltopdfExporter::new(Some(converter), Duration::from_secs(10));
        let err = exporter.export("<p>x</p>").await.unwrap_err();
        assert!(matches!(err, ExportError::Failure(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_converter_reports_its_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let converter = crate::pdf::test_support::write_script(
            dir.path(),
            "crashing-wkhtmltopdf",
            "echo 'QXcbConnection: could not connect to display' >&2\nexit 1",
        );

        let exporter = WkhtmltopdfExporter::new(Some(converter), Duration::from_secs(10));
        let err = exporter.export("<p>x</p>").await.unwrap_err();
        assert!(matches!(err, ExportError::Failure(ref msg) if msg.contains("could not connect to display")));
    }
}
