use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::pdf::{ExportConfig, ExporterKind};

const DEFAULT_AI_BASE: &str = "https://api.deepseek.com";
const DEFAULT_AI_MODEL: &str = "deepseek-chat";

/// Application configuration loaded from environment variables.
/// A missing AI key aborts startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub ai_api_key: String,
    pub ai_api_base: String,
    pub ai_model: String,
    pub ai_timeout: Duration,
    pub export: ExportConfig,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let ai_api_key = get("DEEPSEEK_API_KEY")
            .context("Required environment variable 'DEEPSEEK_API_KEY' is not set")?;

        let ai_api_base = get("DEEPSEEK_API_BASE").unwrap_or_else(|| DEFAULT_AI_BASE.to_string());
        if !(ai_api_base.starts_with("http://") || ai_api_base.starts_with("https://")) {
            bail!("DEEPSEEK_API_BASE must be an http(s) URL, got '{ai_api_base}'");
        }

        let kind = match get("PDF_EXPORTER") {
            Some(raw) => raw.parse::<ExporterKind>().map_err(anyhow::Error::msg)?,
            None => ExporterKind::Chromium,
        };

        Ok(Config {
            ai_api_key,
            ai_api_base,
            ai_model: get("AI_MODEL").unwrap_or_else(|| DEFAULT_AI_MODEL.to_string()),
            ai_timeout: seconds(get("AI_TIMEOUT_SECS"), 30).context("AI_TIMEOUT_SECS")?,
            export: ExportConfig {
                kind,
                chrome_path: get("CHROME_PATH").map(PathBuf::from),
                wkhtmltopdf_path: get("WKHTMLTOPDF_PATH").map(PathBuf::from),
                timeout: seconds(get("EXPORT_TIMEOUT_SECS"), 30).context("EXPORT_TIMEOUT_SECS")?,
            },
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn seconds(raw: Option<String>, default: u64) -> Result<Duration> {
    let secs = match raw {
        Some(raw) => raw.parse::<u64>().context("must be a whole number of seconds")?,
        None => default,
    };
    if secs == 0 {
        bail!("must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let err = config(&[]).unwrap_err();
        assert!(err.to_string().contains("DEEPSEEK_API_KEY"));
        assert!(config(&[("DEEPSEEK_API_KEY", "   ")]).is_err());
    }

    #[test]
    fn defaults_apply() {
        let cfg = config(&[("DEEPSEEK_API_KEY", "sk-test")]).unwrap();
        assert_eq!(cfg.ai_api_base, DEFAULT_AI_BASE);
        assert_eq!(cfg.ai_model, DEFAULT_AI_MODEL);
        assert_eq!(cfg.export.kind, ExporterKind::Chromium);
        assert_eq!(cfg.export.timeout, Duration::from_secs(30));
        assert_eq!(cfg.export.wkhtmltopdf_path, None);
        assert_eq!(cfg.port, 8080);
    }

    #[test]
    fn exporter_overrides_are_read() {
        let cfg = config(&[
            ("DEEPSEEK_API_KEY", "sk-test"),
            ("PDF_EXPORTER", "wkhtmltopdf"),
            ("WKHTMLTOPDF_PATH", "/opt/wk/bin/wkhtmltopdf"),
            ("EXPORT_TIMEOUT_SECS", "5"),
        ])
        .unwrap();
        assert_eq!(cfg.export.kind, ExporterKind::Wkhtmltopdf);
        assert_eq!(cfg.export.wkhtmltopdf_path, Some(PathBuf::from("/opt/wk/bin/wkhtmltopdf")));
        assert_eq!(cfg.export.timeout, Duration::from_secs(5));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(config(&[("DEEPSEEK_API_KEY", "k"), ("PDF_EXPORTER", "prince")]).is_err());
        assert!(config(&[("DEEPSEEK_API_KEY", "k"), ("EXPORT_TIMEOUT_SECS", "0")]).is_err());
        assert!(config(&[("DEEPSEEK_API_KEY", "k"), ("PORT", "http")]).is_err());
        assert!(config(&[("DEEPSEEK_API_KEY", "k"), ("DEEPSEEK_API_BASE", "ftp://x")]).is_err());
    }
}
