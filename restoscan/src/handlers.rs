use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use restoscan_core::report::{ReportFormat, generate_report};
use restoscan_core::{AnalysisResult, Analyzer, AppConfig};
use restoscan_model::{GeminiClient, TextGenerator};
use restoscan_scanner::{PageScanner, WebscanClient};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

const USAGE: &str = "Usage: restoscan <restaurant-url>";

/// Trim the input and assume https when no scheme was given.
pub fn sanitize_url(input: &str) -> String {
    let trimmed = input.trim();
    if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Whether `input` starts with `scheme://`. A `://` later on, in a query
/// or fragment, does not count.
fn has_scheme(input: &str) -> bool {
    input.split_once("://").is_some_and(|(scheme, _)| {
        scheme.starts_with(|c: char| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

/// An absolute http(s) URL with a host.
pub fn is_valid_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https")
                && parsed.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}

/// Turn the positional argument into a sanitized, validated URL.
pub fn parse_target(input: Option<&str>) -> Result<String, String> {
    let input = match input {
        Some(s) if !s.trim().is_empty() => s,
        _ => return Err(USAGE.to_string()),
    };

    let url = sanitize_url(input);
    if !is_valid_url(&url) {
        return Err("Invalid URL provided".to_string());
    }
    Ok(url)
}

pub fn load_config(env_file: Option<&PathBuf>) -> restoscan_core::Result<AppConfig> {
    match env_file {
        Some(path) => AppConfig::from_env_file(path),
        None => AppConfig::from_env(),
    }
}

/// Logs go to stderr so stdout carries only the report.
pub fn init_tracing(quiet: bool) {
    let default = if quiet {
        "warn"
    } else {
        "restoscan=info,restoscan_core=info,restoscan_scanner=info,restoscan_model=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn stage_spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Run one analysis, then release the scanner whether or not it succeeded.
pub async fn analyze_then_close<S, M>(
    analyzer: &Analyzer<S, M>,
    url: &str,
) -> restoscan_core::Result<AnalysisResult>
where
    S: PageScanner,
    M: TextGenerator,
{
    let result = analyzer.analyze(url).await;
    if let Err(e) = analyzer.close().await {
        warn!("Failed to close scanner: {}", e);
    }
    result
}

fn fail(message: impl std::fmt::Display) -> i32 {
    eprintln!("{} {}", "✗".red().bold(), message);
    1
}

/// Entry point for the CLI. Returns the process exit code.
pub async fn handle_analyze(args: &ArgMatches) -> i32 {
    let quiet = args.get_flag("quiet");
    let format = args
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);

    let url = match parse_target(args.get_one::<String>("URL").map(String::as_str)) {
        Ok(url) => url,
        Err(msg) => return fail(msg),
    };

    let config = match load_config(args.get_one::<PathBuf>("env-file")) {
        Ok(config) => config,
        Err(e) => return fail(e),
    };
    config.log_redacted();

    let model = GeminiClient::new(&config.gemini_api_key)
        .with_base_url(&config.gemini_base_url)
        .with_model(&config.gemini_model)
        .with_timeout(config.model_timeout);
    let scanner = WebscanClient::new(config.webscan.clone());

    let spinner = stage_spinner(quiet);
    let progress = spinner.clone();
    let analyzer = Analyzer::new(scanner, model)
        .with_progress_callback(Arc::new(move |msg: String| progress.set_message(msg)));

    spinner.set_message("Starting webscan server...");
    let outcome = match analyzer.scanner().connect().await {
        Ok(()) => {
            match format {
                ReportFormat::Text => spinner.suspend(|| println!("Analyzing restaurant: {}\n", url)),
                ReportFormat::Json => info!("Analyzing restaurant: {}", url),
            }
            analyze_then_close(&analyzer, &url).await
        }
        Err(e) => {
            if let Err(close_err) = analyzer.close().await {
                warn!("Failed to close scanner: {}", close_err);
            }
            Err(e.into())
        }
    };
    spinner.finish_and_clear();

    let result = match outcome {
        Ok(result) => result,
        Err(e) => return fail(format!("Error analyzing restaurant: {}", e)),
    };

    match generate_report(&result, format) {
        Ok(report) => {
            print!("{}", report);
            if format == ReportFormat::Json {
                println!();
            }
            0
        }
        Err(e) => fail(format!("Failed to render report: {}", e)),
    }
}
