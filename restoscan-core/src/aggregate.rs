// Content gathering: root page plus a few relevant sub-pages

use crate::error::Result;
use restoscan_scanner::{PageScanner, ScanResult};
use tracing::{info, warn};

/// Sub-pages whose URL contains one of these are likely to describe the business.
pub const RELEVANT_KEYWORDS: [&str; 7] = [
    "about", "menu", "contact", "location", "story", "chef", "owner",
];

pub const MAX_SUBPAGES: usize = 3;

/// First [`MAX_SUBPAGES`] candidates mentioning a relevant keyword, in the
/// order given.
pub fn select_relevant_links(candidates: &[String]) -> Vec<String> {
    candidates
        .iter()
        .filter(|link| {
            let lower = link.to_lowercase();
            RELEVANT_KEYWORDS.iter().any(|kw| lower.contains(kw))
        })
        .take(MAX_SUBPAGES)
        .cloned()
        .collect()
}

/// Fetch relevant sub-pages one at a time and render them as labelled
/// sections. Pages that fail are logged and left out.
pub async fn gather_additional_content<S>(scanner: &S, url: &str) -> String
where
    S: PageScanner + ?Sized,
{
    let candidates = match scanner.extract_links(url).await {
        Ok(links) => links,
        Err(e) => {
            warn!("Failed to gather additional content: {}", e);
            return String::new();
        }
    };

    let relevant = select_relevant_links(&candidates);
    info!("Found {} relevant additional pages to scan", relevant.len());

    let mut additional = String::new();
    for link in relevant {
        info!("Scanning additional page: {}", link);
        match scanner.scan(&link).await {
            Ok(page) => {
                additional.push_str(&format!(
                    "\n--- Content from {} ---\n{}\n",
                    link, page.content
                ));
            }
            Err(e) => warn!("Failed to scan additional page {}: {}", link, e),
        }
    }
    additional
}

/// Scan the root page and append the relevant sub-pages to its content.
///
/// Only a failure on the root page is an error.
pub async fn gather_content<S>(scanner: &S, url: &str) -> Result<ScanResult>
where
    S: PageScanner + ?Sized,
{
    info!("Scanning website: {}", url);
    let mut root = scanner.scan(url).await?;

    let additional = gather_additional_content(scanner, url).await;
    if !additional.is_empty() {
        root.content.push_str("\n\nAdditional Content:\n");
        root.content.push_str(&additional);
    }
    Ok(root)
}
