use crate::aggregate::gather_content;
use crate::error::Result;
use crate::extract::request_extraction;
use crate::model::AnalysisResult;
use restoscan_model::TextGenerator;
use restoscan_scanner::PageScanner;
use std::sync::Arc;
use tracing::info;

/// Callback for reporting which stage the analysis is in
pub type AnalysisProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Runs content gathering and extraction for one URL at a time.
pub struct Analyzer<S, M> {
    scanner: S,
    model: M,
    progress_callback: Option<AnalysisProgressCallback>,
}

impl<S, M> Analyzer<S, M>
where
    S: PageScanner,
    M: TextGenerator,
{
    pub fn new(scanner: S, model: M) -> Self {
        Self {
            scanner,
            model,
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: AnalysisProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn scanner(&self) -> &S {
        &self.scanner
    }

    fn report(&self, msg: String) {
        if let Some(ref callback) = self.progress_callback {
            callback(msg);
        }
    }

    pub async fn analyze(&self, url: &str) -> Result<AnalysisResult> {
        self.report(format!("Scanning website: {}", url));
        let page = gather_content(&self.scanner, url).await?;

        self.report("Analyzing content with language model...".to_string());
        let result = request_extraction(&self.model, &page).await?;

        info!(
            "Analysis of {} complete, overall confidence {}%",
            url,
            result.overall()
        );
        Ok(result)
    }

    /// Release the scanner. Call exactly once, after the last analysis.
    pub async fn close(&self) -> Result<()> {
        self.scanner.close().await?;
        Ok(())
    }
}
