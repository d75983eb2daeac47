use std::path::Path;

use anyhow::Context;
use sccg::archive::open_transcript;
use sccg::progress::ByteNum;
use sccg::summary::format_bytes;
use sccg::transcript::reader::{TranscriptReader, TranscriptStats};

use crate::csv_stat::CsvStatOutput;
use crate::PROGRESS_BAR;

pub(crate) fn stats(archive_path: &Path, csv: bool) -> anyhow::Result<()> {
    let archive_bytes = std::fs::metadata(archive_path)
        .context("Could not read the transcript size")?
        .len();
    let transcript = open_transcript(archive_path).context("Could not open the transcript")?;
    let transcript = TranscriptReader::new(transcript)
        .read_transcript()
        .context("Could not parse the transcript")?;
    let stats = transcript.stats();

    PROGRESS_BAR.finish();

    let header = transcript.header();
    eprintln!("Target: {}", header.header());
    eprintln!("  Line width: {}", header.line_width());
    eprintln!("  Length: {} bases", stats.target_len());
    eprintln!(
        "  Stored in: {}",
        format_bytes(ByteNum::new(archive_bytes as usize))
    );
    eprintln!();
    print_entry_stats(&stats);

    let csv_output = CsvStatOutput::new(csv);
    csv_output.add_transcript_stats(archive_path, archive_bytes, &stats)?;
    csv_output.flush()?;

    Ok(())
}

fn print_entry_stats(stats: &TranscriptStats) {
    let target_len = stats.target_len().max(1) as f64;

    eprintln!("Entries:");
    eprintln!(
        "  Copies: {} ({} bases, {:.4}%)",
        stats.copies,
        stats.copied_bases,
        stats.copied_bases as f64 / target_len * 100.0
    );
    eprintln!(
        "  Literal lines: {} ({} bases, {:.4}%)",
        stats.literal_lines,
        stats.literal_bases,
        stats.literal_bases as f64 / target_len * 100.0
    );
    eprintln!("  Lowercase runs: {}", stats.lowercase_runs);
    eprintln!(
        "  Ambiguous runs: {} ({} bases)",
        stats.ambiguous_runs, stats.ambiguous_bases
    );
}

impl CsvStatOutput {
    fn add_transcript_stats(
        &self,
        archive_path: &Path,
        archive_bytes: u64,
        stats: &TranscriptStats,
    ) -> anyhow::Result<()> {
        self.add_row(&[
            ("archive", archive_path.display().to_string()),
            ("archive bytes", archive_bytes.to_string()),
            ("target bases", stats.target_len().to_string()),
            ("copies", stats.copies.to_string()),
            ("copied bases", stats.copied_bases.to_string()),
            ("literal lines", stats.literal_lines.to_string()),
            ("literal bases", stats.literal_bases.to_string()),
            ("lowercase runs", stats.lowercase_runs.to_string()),
            ("ambiguous runs", stats.ambiguous_runs.to_string()),
            ("ambiguous bases", stats.ambiguous_bases.to_string()),
        ])?;

        anyhow::Ok(())
    }
}
