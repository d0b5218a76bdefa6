use crate::CLAP_STYLING;
use clap::arg;

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("restoscan")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("restoscan")
        .about("Extract business details from a restaurant website, with confidence scores")
        .styles(CLAP_STYLING)
        .arg(
            arg!([URL])
                .required(false)
                .help("The restaurant website to analyze (https:// is assumed when no scheme is given)"),
        )
        .arg(arg!(-q --"quiet" "Suppress banner, spinner and informational logs").required(false))
        .arg(
            arg!(-f --"format" <FORMAT>)
                .required(false)
                .help("Report format: text, json")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .arg(
            arg!(--"env-file" <PATH>)
                .required(false)
                .help("Read configuration from this file instead of ./.env")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
}
