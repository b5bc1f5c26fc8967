//! `quill` entry point: parse arguments, set up logging, run.

use clap::Parser;
use miette::Result;
use quill_cli::{cli, commands, error, logger, ui};

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(!args.no_color && logger::should_use_colors());

    commands::execute(args).map_err(error::cli_error_to_miette)
}
