use crate::error::Result;
use crate::result::ScanResult;
use async_trait::async_trait;

/// Upper bound on candidate links requested from the scanner.
pub const LINK_LIMIT: usize = 20;

/// A source of page text and outgoing links.
#[async_trait]
pub trait PageScanner: Send + Sync {
    /// Fetch the text content of a page.
    async fn scan(&self, url: &str) -> Result<ScanResult>;

    /// Candidate links found on a page, at most [`LINK_LIMIT`].
    async fn extract_links(&self, url: &str) -> Result<Vec<String>>;

    /// Release any resources held by the scanner.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
