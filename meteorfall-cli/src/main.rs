//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use env_logger::Env;
use meteorfall_cli::CliError;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    match meteorfall_cli::run() {
        Ok(()) => {}
        // Clap prints help and version to stdout and exits 0; usage errors
        // go to stderr with its own exit code.
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("meteorfall: {err}");
            std::process::exit(err.exit_code());
        }
    }
}
