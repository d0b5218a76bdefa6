use crate::error::{AnalysisError, Result};
use restoscan_model::DEFAULT_GEMINI_MODEL;
use restoscan_scanner::WebscanConfig;
use restoscan_scanner::webscan::DEFAULT_SERVER_PATH;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Runtime configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub model_timeout: Duration,
    pub webscan: WebscanConfig,
}

impl AppConfig {
    /// Load `.env` from the working directory if present, then read the process environment.
    pub fn from_env() -> Result<Self> {
        match dotenv_outcome(dotenvy::dotenv()) {
            Ok(Some(path)) => debug!("Loaded {}", path.display()),
            Ok(None) => {}
            Err(msg) => warn!("{}", msg),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read variables from `path`, falling back to the process environment.
    pub fn from_env_file(path: &Path) -> Result<Self> {
        let iter = dotenvy::from_path_iter(path).map_err(|e| {
            AnalysisError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mut vars = HashMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| {
                AnalysisError::Config(format!("Invalid entry in {}: {}", path.display(), e))
            })?;
            vars.insert(key, value);
        }

        Self::from_lookup(|key| vars.get(key).cloned().or_else(|| std::env::var(key).ok()))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let gemini_api_key = var("GEMINI_API_KEY").ok_or_else(|| {
            AnalysisError::Config("GEMINI_API_KEY environment variable is required".to_string())
        })?;

        let server_path = var("WEBSCAN_SERVER_PATH")
            .map(|p| shellexpand::tilde(&p).into_owned())
            .unwrap_or_else(|| DEFAULT_SERVER_PATH.to_string());

        let mut webscan = WebscanConfig {
            server_path,
            ..WebscanConfig::default()
        };
        if let Some(command) = var("WEBSCAN_COMMAND") {
            webscan.command = command;
        }
        if let Some(flag) = var("WEBSCAN_INSECURE_TLS") {
            webscan.insecure_tls = parse_bool("WEBSCAN_INSECURE_TLS", &flag)?;
        }
        if let Some(secs) = var("RESTOSCAN_SCAN_TIMEOUT_SECS") {
            webscan.call_timeout = parse_secs("RESTOSCAN_SCAN_TIMEOUT_SECS", &secs)?;
        }

        let model_timeout = match var("RESTOSCAN_MODEL_TIMEOUT_SECS") {
            Some(secs) => parse_secs("RESTOSCAN_MODEL_TIMEOUT_SECS", &secs)?,
            None => Duration::from_secs(120),
        };

        Ok(Self {
            gemini_api_key,
            gemini_model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: var("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            model_timeout,
            webscan,
        })
    }

    /// The API key as it may appear in logs.
    pub fn redacted_key(&self) -> String {
        format!("*** ({} chars)", self.gemini_api_key.chars().count())
    }

    pub fn log_redacted(&self) {
        info!(
            "Config: model={} base_url={} api_key={} webscan={} {} (timeouts: scan {:?}, model {:?})",
            self.gemini_model,
            self.gemini_base_url,
            self.redacted_key(),
            self.webscan.command,
            self.webscan.server_path,
            self.webscan.call_timeout,
            self.model_timeout
        );
    }
}

/// A missing `.env` is fine; anything else wrong with it is reported.
fn dotenv_outcome(
    result: dotenvy::Result<PathBuf>,
) -> std::result::Result<Option<PathBuf>, String> {
    match result {
        Ok(path) => Ok(Some(path)),
        Err(dotenvy::Error::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(format!("Ignoring .env file: {}", e)),
    }
}

fn parse_secs(key: &str, value: &str) -> Result<Duration> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(AnalysisError::Config(format!(
            "{} must be a positive number of seconds, got '{}'",
            key, value
        ))),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AnalysisError::Config(format!(
            "{} must be true or false, got '{}'",
            key, value
        ))),
    }
}
