// Link extraction from the webscan extract-links tool output

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s"',;]+"#).expect("valid URL pattern"));

/// Pull absolute http(s) URLs out of free-form tool output, in order of appearance.
pub fn parse_links(text: &str) -> Vec<String> {
    URL_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['"', ',', ';']))
        .filter(|candidate| Url::parse(candidate).is_ok())
        .map(str::to_string)
        .collect()
}
