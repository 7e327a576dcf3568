use std::process::ExitCode;

use clap::Parser;
use strata::cli::{Arguments, ExitStatus, init_logging};

fn main() -> ExitCode {
    let args = Arguments::parse();
    init_logging(args.verbose());

    match strata::cli::run_cli(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitStatus::Error.into()
        }
    }
}
