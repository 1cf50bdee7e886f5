mod app;
mod catalog;
mod cli;
mod config;
mod http;
mod logging;
mod notify;
mod paths;
mod store;

use std::process::ExitCode;

use clap::Parser;

use crate::config::ConfigError;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    logging::init_logging(cli.verbose);

    match app::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_status_for(&err))
        }
    }
}

fn exit_status_for(err: &anyhow::Error) -> u8 {
    if err.chain().any(|cause| cause.is::<ConfigError>()) {
        2
    } else {
        1
    }
}
