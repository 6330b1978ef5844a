// Main CLI entrypoint
// (c) 2024 Ross Younger

use std::process::ExitCode;

use super::args::CliArgs;

use crate::{
    config::{Configuration, Manager},
    pipeline,
    util::{setup_tracing, Verbosity},
};
use anstream::{eprintln, println};
use clap::Parser;
use indicatif::MultiProgress;
use tracing::{error, info};

/// Main CLI entrypoint
pub fn cli() -> anyhow::Result<ExitCode> {
    let args = CliArgs::parse();
    if args.config_files {
        for file in Manager::config_files() {
            println!("{file}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let progress = MultiProgress::new(); // This writes to stderr
    setup_tracing(
        Verbosity::from_flags(args.debug, args.quiet),
        &progress,
        args.log_file.as_deref(),
    )
    .inspect_err(|e| eprintln!("{e:?}"))?;

    let mut manager = Manager::new(args.config.as_deref());
    manager.merge_provider(args.overrides.clone());
    manager.warn_unrecognised::<Configuration>();
    if args.show_config {
        println!("{manager}");
        return Ok(ExitCode::SUCCESS);
    }

    let config: Configuration = match manager.get() {
        Ok(c) => c,
        Err(e) => {
            error!("configuration: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    match pipeline::run(&config) {
        Ok(outcome) => {
            if args.print {
                println!("{}", outcome.report.render());
            }
            if outcome.skipped > 0 {
                info!("{} results file(s) could not be read", outcome.skipped);
            }
            if args.profile {
                println!("Profile:\n{}", outcome.timings);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("{e:#}");
            Ok(ExitCode::FAILURE)
        }
    }
}
