use restoscan::commands::command_argument_builder;
use restoscan::handlers::{handle_analyze, init_tracing};
use restoscan_core::print_banner;

#[tokio::main]
async fn main() {
    let matches = command_argument_builder().get_matches();
    let quiet = matches.get_flag("quiet");

    init_tracing(quiet);
    if !quiet {
        print_banner();
    }

    // An interrupt exits straight away; in-flight calls are abandoned.
    tokio::select! {
        code = handle_analyze(&matches) => std::process::exit(code),
        _ = tokio::signal::ctrl_c() => {
            println!("\nGracefully shutting down...");
            std::process::exit(0);
        }
    }
}
