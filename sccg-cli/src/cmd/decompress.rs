use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use log::info;
use sccg::archive::{open_transcript, restored_path};
use sccg::decompressor::{Decompressor, DecompressorParams};
use sccg::fasta::load_fasta;
use sccg::progress::ProgressNotifier;

pub fn decompress(
    reference_path: &Path,
    archive_path: &Path,
    output_dir: &Path,
    progress_notifier: Arc<dyn ProgressNotifier>,
) -> anyhow::Result<PathBuf> {
    let reference =
        load_fasta(reference_path).context("Could not read the reference FASTA file")?;
    let transcript = open_transcript(archive_path).context("Could not open the transcript")?;

    let output = restored_path(output_dir, archive_path);
    info!("Output file: {}", output.display());
    let file = File::create(&output).context("Could not create the FASTA file")?;

    let params = DecompressorParams::builder()
        .progress_notifier(progress_notifier)
        .build();
    let record = Decompressor::with_params(params)
        .decompress_to(transcript, &reference, BufWriter::new(file))
        .context("Failed to rebuild the target from the transcript")?;
    info!(
        "Rebuilt `{}`: {} bases",
        record.header(),
        record.len()
    );

    Ok(output)
}
