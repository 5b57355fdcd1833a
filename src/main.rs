#![forbid(unsafe_code)]

//! hardsecnet: audit/harden script launcher entry point.

use clap::Parser;

mod cli_app;

fn main() {
    let args = cli_app::Cli::parse();
    if let Err(e) = cli_app::run(&args) {
        eprintln!("hardsecnet: {e}");
        std::process::exit(e.exit_code());
    }
}
