use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tracing::{error, info};

use super::{ensure_pdf, log_tail, resolve_binary, scratch_dir, ConverterProcess, ExportError, PdfExporter};

const CANDIDATES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "headless_shell",
];

/// Virtual time the page gets to load fonts and images before printing.
const SETTLE_BUDGET_MS: u64 = 5_000;

/// A4 with 10mm top and bottom margins, backgrounds printed.
const PRINT_CSS: &str = "<style>@page { size: A4; margin: 10mm 0; } \
html { -webkit-print-color-adjust: exact; print-color-adjust: exact; }</style>";

/// Prints pages with a throwaway headless Chromium instance per export.
pub struct ChromiumExporter {
    binary: Option<PathBuf>,
    timeout: Duration,
}

impl ChromiumExporter {
    pub fn new(binary: Option<PathBuf>, timeout: Duration) -> Self {
        Self { binary, timeout }
    }

    async fn command(&self, binary: PathBuf, process_dir: &Path) -> Result<Command, ExportError> {
        let page = page_url(&process_dir.join("page.html"))?;
        let output = process_dir.join("out.pdf");
        let profile = process_dir.join("profile");
        let log = tokio::fs::File::create(process_dir.join("browser.log"))
            .await?
            .into_std()
            .await;

        let mut cmd = Command::new(binary);
        cmd.arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-extensions")
            .arg("--hide-scrollbars")
            .arg(format!("--user-data-dir={}", profile.display()))
            .arg("--run-all-compositor-stages-before-draw")
            .arg(format!("--virtual-time-budget={SETTLE_BUDGET_MS}"))
            .arg("--no-pdf-header-footer")
            .arg(format!("--print-to-pdf={}", output.display()))
            .arg(page.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(log));
        Ok(cmd)
    }
}

fn page_url(page: &Path) -> Result<Url, ExportError> {
    Url::from_file_path(page)
        .map_err(|()| ExportError::Failure(format!("{} is not an absolute path", page.display())))
}

/// Puts the print stylesheet last in `<head>` so it wins over template rules.
fn with_print_css(html: &str) -> String {
    match html.find("</head>") {
        Some(pos) => format!("{}{}{}", &html[..pos], PRINT_CSS, &html[pos..]),
        None => format!("{PRINT_CSS}{html}"),
    }
}

#[async_trait]
impl PdfExporter for ChromiumExporter {
    fn name(&self) -> &'static str {
        "chromium"
    }

    fn ensure_available(&self) -> Result<(), ExportError> {
        resolve_binary(self.binary.as_deref(), CANDIDATES).map(|_| ())
    }

    async fn export(&self, html: &str) -> Result<Vec<u8>, ExportError> {
        let binary = resolve_binary(self.binary.as_deref(), CANDIDATES)?;

        let workdir = scratch_dir()?;
        tokio::fs::write(workdir.path().join("page.html"), with_print_css(html)).await?;
        let command = self.command(binary, workdir.path()).await?;

        let mut browser = ConverterProcess::spawn(command, workdir)?;
        info!("🖨️ Headless browser launched, printing page");

        let outcome = match browser.wait(self.timeout).await {
            Ok(status) if status.success() => {
                match tokio::fs::read(browser.workdir().join("out.pdf")).await {
                    Ok(bytes) => ensure_pdf(bytes),
                    Err(e) => Err(ExportError::Failure(format!("browser wrote no PDF: {e}"))),
                }
            }
            Ok(status) => {
                let tail = log_tail(&browser.workdir().join("browser.log")).await;
                Err(ExportError::Failure(format!("browser exited with {status}: {tail}")))
            }
            Err(e) => Err(e),
        };
        browser.close().await;

        match &outcome {
            Ok(bytes) => info!("✅ Browser produced PDF ({} bytes)", bytes.len()),
            Err(e) => error!("❌ Browser export failed: {}", e),
        }
        outcome
    }
}
