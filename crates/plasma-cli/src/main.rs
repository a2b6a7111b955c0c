#![forbid(unsafe_code)]

//! `plasma` binary entry point.

use std::process;

use plasma_cli::{app, cli, logging};

fn main() {
    let opts = cli::Opts::parse();
    logging::init();

    if let Err(e) = app::run(&opts) {
        eprintln!("plasma: {e}");
        if e.is_usage() {
            eprintln!("{}", cli::usage_line());
        }
        process::exit(1);
    }
}
