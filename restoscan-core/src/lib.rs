pub mod aggregate;
pub mod analyze;
pub mod confidence;
pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod report;

pub use analyze::{AnalysisProgressCallback, Analyzer};
pub use config::AppConfig;
pub use error::{AnalysisError, Result};
pub use model::{AnalysisResult, Confidence, Field, FieldReport, NOT_FOUND};

use colored::Colorize;

pub fn print_banner() {
    let banner = r#"
                 _
  _ __ ___  ___| |_ ___  ___  ___ __ _ _ __
 | '__/ _ \/ __| __/ _ \/ __|/ __/ _` | '_ \
 | | |  __/\__ \ || (_) \__ \ (_| (_| | | | |
 |_|  \___||___/\__\___/|___/\___\__,_|_| |_|
"#;
    eprintln!("{}", banner.bright_cyan().bold());
    eprintln!(
        "  {} {}\n",
        "restaurant website analysis".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
