use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Text content of a single fetched page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub content: String,
    pub url: String,
    pub timestamp: DateTime<Utc>,
}

impl ScanResult {
    pub fn new(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            url: url.into(),
            timestamp: Utc::now(),
        }
    }
}
