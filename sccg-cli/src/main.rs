#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::process::exit;
use std::sync::Arc;

use anyhow::Context;
use clap::{ErrorKind, Parser};
use cli::{Cli, Commands};
use cmd::compress::CompressOptions;
use cmd::{compress, decompress, stats};
use human_panic::setup_panic;
use lazy_static::lazy_static;

use crate::logging::init_logging;
use crate::progress_bar::SccgProgressBar;

mod cli;
mod cmd;
mod csv_stat;
mod logging;
mod opts;
mod progress_bar;

/// Exit code used when a required argument is missing.
const MISSING_ARGUMENT_EXIT_CODE: i32 = -1;

lazy_static! {
    pub(crate) static ref PROGRESS_BAR: SccgProgressBar = SccgProgressBar::new();
}

fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::MissingRequiredArgument
            | ErrorKind::MissingSubcommand
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                eprintln!("Missing argument.");
                let _ = e.print();
                exit(MISSING_ARGUMENT_EXIT_CODE);
            }
            _ => e.exit(),
        },
    }
}

fn main() -> anyhow::Result<()> {
    setup_panic!();

    let cli = parse_cli();

    if !cli.no_progress {
        PROGRESS_BAR.show();
    }

    init_logging(cli.verbose.log_level_filter()).expect("Could not initialize logging");

    match &cli.command {
        Commands::Compress {
            target,
            reference,
            output_dir,
            archive,
            kmer_length,
            fallback_kmer_length,
            global_search_limit,
            csv,
        } => {
            let options = CompressOptions {
                archive: archive.into(),
                kmer_length: *kmer_length as usize,
                fallback_kmer_length: *fallback_kmer_length as usize,
                global_search_limit: *global_search_limit,
            };

            compress::compress(
                target.as_path()?,
                reference.as_path()?,
                &output_dir.as_path_buf()?,
                options,
                *csv,
                Arc::new(PROGRESS_BAR.clone()),
            )
            .context("Failed to compress given file")?;
        }
        Commands::Decompress {
            reference,
            archive,
            output_dir,
        } => {
            decompress::decompress(
                reference.as_path()?,
                archive.as_path()?,
                &output_dir.as_path_buf()?,
                Arc::new(PROGRESS_BAR.clone()),
            )
            .context("Failed to decompress given file")?;
        }
        Commands::Stats { archive, csv } => {
            stats::stats(archive.as_path()?, *csv)
                .context("Failed to compute transcript statistics")?;
        }
    }

    PROGRESS_BAR.finish();
    Ok(())
}
