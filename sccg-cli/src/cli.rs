use clap::{Parser, PossibleValue, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use lazy_static::lazy_static;
use sccg::archive::ArchiveFormat;
use sccg::kmer::MAX_KMER_LENGTH;
use sccg::matching::{DEFAULT_FALLBACK_KMER_LENGTH, DEFAULT_GLOBAL_SEARCH_LIMIT, DEFAULT_KMER_LENGTH};

use crate::opts::{directory, input_file, Directory, InputFile};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
pub struct Cli {
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,

    /// Don't display a progress bar/spinner
    #[clap(long, global = true, value_parser)]
    pub no_progress: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Copy, Clone, Debug)]
pub struct ArchiveFormatCli {
    pub inner: ArchiveFormat,
}

impl ArchiveFormatCli {
    #[must_use]
    pub fn new(inner: ArchiveFormat) -> Self {
        Self { inner }
    }

    #[must_use]
    pub fn variants() -> Vec<Self> {
        ArchiveFormat::VALUES
            .iter()
            .map(|&inner| ArchiveFormatCli::new(inner))
            .collect()
    }
}

lazy_static! {
    static ref ARCHIVE_FORMAT_CLI_VARIANTS: Vec<ArchiveFormatCli> = ArchiveFormatCli::variants();
}

impl ValueEnum for ArchiveFormatCli {
    fn value_variants<'a>() -> &'a [Self] {
        &ARCHIVE_FORMAT_CLI_VARIANTS
    }

    fn to_possible_value<'a>(&self) -> Option<PossibleValue<'a>> {
        let value = PossibleValue::new(self.inner.name());
        Some(value)
    }
}

impl From<&ArchiveFormatCli> for ArchiveFormat {
    fn from(format: &ArchiveFormatCli) -> Self {
        format.inner
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compress a target FASTA file against a reference FASTA file
    Compress {
        /// Target FASTA file path (may be gzipped)
        #[clap(value_parser = input_file)]
        target: InputFile,

        /// Reference FASTA file path (may be gzipped)
        #[clap(value_parser = input_file)]
        reference: InputFile,

        /// Directory to write the transcript to
        #[clap(value_parser = directory)]
        output_dir: Directory,

        /// How to pack the transcript; `plain` keeps it as text
        #[clap(long, arg_enum, default_value = "brotli")]
        archive: ArchiveFormatCli,

        /// k-mer length used for matching
        #[clap(default_value_t = DEFAULT_KMER_LENGTH as u8, long, value_parser = clap::value_parser!(u8).range(2..=MAX_KMER_LENGTH as i64))]
        kmer_length: u8,

        /// k-mer length used to retry local segments without any match
        #[clap(default_value_t = DEFAULT_FALLBACK_KMER_LENGTH as u8, long, value_parser = clap::value_parser!(u8).range(2..=MAX_KMER_LENGTH as i64))]
        fallback_kmer_length: u8,

        /// Distance from the expected reference position global matching
        /// looks for candidates at first
        #[clap(default_value_t = DEFAULT_GLOBAL_SEARCH_LIMIT, long, value_parser)]
        global_search_limit: usize,

        /// Output compression statistics as a CSV file to the standard output
        #[clap(long, value_parser)]
        csv: bool,
    },

    /// Rebuild a target FASTA file from its transcript and the reference
    Decompress {
        /// Reference FASTA file path (may be gzipped)
        #[clap(value_parser = input_file)]
        reference: InputFile,

        /// Transcript or transcript archive path
        #[clap(value_parser = input_file)]
        archive: InputFile,

        /// Directory to write the FASTA file to
        #[clap(value_parser = directory)]
        output_dir: Directory,
    },

    /// Print statistics about a transcript or a transcript archive
    Stats {
        /// Transcript or transcript archive path
        #[clap(value_parser = input_file)]
        archive: InputFile,

        /// Output the statistics as a CSV file to the standard output
        #[clap(long, value_parser)]
        csv: bool,
    },
}
