// Tests for loading configuration from an env file

use restoscan_core::{AnalysisError, AppConfig};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

#[test]
fn test_from_env_file_reads_values() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "GEMINI_API_KEY=file-secret").unwrap();
    writeln!(file, "GEMINI_MODEL=gemini-1.5-flash").unwrap();
    writeln!(file, "WEBSCAN_SERVER_PATH=/srv/webscan/build/index.js").unwrap();
    writeln!(file, "RESTOSCAN_MODEL_TIMEOUT_SECS=45").unwrap();

    let config = AppConfig::from_env_file(file.path()).unwrap();

    assert_eq!(config.gemini_api_key, "file-secret");
    assert_eq!(config.gemini_model, "gemini-1.5-flash");
    assert_eq!(config.webscan.server_path, "/srv/webscan/build/index.js");
    assert_eq!(config.model_timeout, Duration::from_secs(45));
}

#[test]
fn test_from_env_file_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.env");

    let err = AppConfig::from_env_file(&path).unwrap_err();

    assert!(matches!(err, AnalysisError::Config(_)));
    assert!(err.to_string().contains("absent.env"));
}
