use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use log::info;
use sccg::archive::{transcript_path, ArchiveFormat};
use sccg::compressor::{Compressor, CompressorParams};
use sccg::fasta::load_fasta;
use sccg::progress::ProgressNotifier;
use sccg::summary::CompressionSummary;

use crate::csv_stat::CsvStatOutput;

#[derive(Debug, Clone, Copy)]
pub struct CompressOptions {
    pub archive: ArchiveFormat,
    pub kmer_length: usize,
    pub fallback_kmer_length: usize,
    pub global_search_limit: usize,
}

pub fn compress(
    target_path: &Path,
    reference_path: &Path,
    output_dir: &Path,
    options: CompressOptions,
    csv: bool,
    progress_notifier: Arc<dyn ProgressNotifier>,
) -> anyhow::Result<PathBuf> {
    let target = load_fasta(target_path).context("Could not read the target FASTA file")?;
    let reference =
        load_fasta(reference_path).context("Could not read the reference FASTA file")?;

    let params = CompressorParams::builder()
        .kmer_length(options.kmer_length)
        .fallback_kmer_length(options.fallback_kmer_length)
        .global_search_limit(options.global_search_limit)
        .progress_notifier(progress_notifier)
        .build();

    let output = transcript_path(output_dir, target_path);
    info!("Output file: {}", output.display());
    let file = File::create(&output).context("Could not create the transcript file")?;
    let summary = Compressor::with_params(params)
        .compress(&target, &reference, BufWriter::new(file))
        .context("Failed to write the transcript")?;

    let archive = options
        .archive
        .archiver()
        .archive(&output)
        .context("Could not archive the transcript")?;
    if archive != output {
        info!("Archived transcript: {}", archive.display());
    }

    let csv_output = CsvStatOutput::new(csv);
    csv_output.add_summary(target_path, &archive, &summary)?;
    csv_output.flush()?;

    Ok(archive)
}

impl CsvStatOutput {
    fn add_summary(
        &self,
        target_path: &Path,
        archive: &Path,
        summary: &CompressionSummary,
    ) -> anyhow::Result<()> {
        let archive_bytes = std::fs::metadata(archive)
            .context("Could not read the archive size")?
            .len();
        let switch_point = summary
            .switch_point
            .map(|point| point.to_string())
            .unwrap_or_default();

        self.add_row(&[
            ("target", target_path.display().to_string()),
            ("archive", archive.display().to_string()),
            ("target bases", summary.target_bases.to_string()),
            ("reference bases", summary.reference_bases.to_string()),
            ("transcript bytes", summary.transcript_bytes.to_string()),
            ("archive bytes", archive_bytes.to_string()),
            ("matches", summary.matches.to_string()),
            ("copied bases", summary.copied_bases.to_string()),
            ("literal bases", summary.literal_bases.to_string()),
            ("local segments", summary.local_segments.to_string()),
            ("switch point", switch_point),
            ("final mode", summary.final_mode.to_string()),
            ("seconds", format!("{:.3}", summary.elapsed.as_secs_f64())),
        ])?;

        anyhow::Ok(())
    }
}
