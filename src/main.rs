//! FHEVM example catalog - command-line pipeline for annotated example
//! contracts.
//!
//! This binary turns a repository of annotated FHEVM example contracts into
//! browsable documentation and standalone, installable project scaffolds.
//! Everything derives from a registry rebuilt on each invocation by
//! statically scanning the contract tree.
//!
//! # Usage
//!
//! ```bash
//! fhevm-catalog [OPTIONS] <COMMAND>
//! ```
//!
//! # Examples
//!
//! Generate the full documentation tree:
//! ```bash
//! fhevm-catalog --root ./fhevm-examples docs
//! ```
//!
//! Scaffold one example into a standalone project:
//! ```bash
//! fhevm-catalog --root ./fhevm-examples create-example blind-auction -o ./out/blind-auction
//! ```
//!
//! Check annotations across the corpus:
//! ```bash
//! fhevm-catalog --root ./fhevm-examples check-tags
//! ```

mod catalog;
mod cli;
mod deploy_plan;
mod docgen;
mod error;
mod imports;
mod registry;
mod scaffold;
mod scanner;
mod serializer;
mod summary;
mod tags;
mod template;
mod validate;

use anyhow::Result;
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    // We need to parse args twice: once to get verbose flag, then again after logger init
    // First, do a quick parse just to check for verbose flag
    let args_for_verbose = cli::CliArgs::parse();

    // Initialize logger based on verbose flag
    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("FHEVM example catalog starting...");

    // Now do the full parse with validation
    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    // Run the selected subcommand
    cli::run(args)?;

    Ok(())
}
