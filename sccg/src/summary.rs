use std::time::{Duration, Instant};

use log::info;
use number_prefix::NumberPrefix;

use crate::matching::Mode;
use crate::progress::ByteNum;

/// Statistics gathered while compressing a single target.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionSummary {
    /// Length of the raw target sequence.
    pub target_bases: usize,
    /// Length of the raw reference sequence.
    pub reference_bases: usize,
    /// Size of the written transcript.
    pub transcript_bytes: usize,
    pub matches: usize,
    pub copied_bases: usize,
    pub literal_bases: usize,
    pub lowercase_runs: usize,
    pub ambiguous_runs: usize,
    /// Number of segments kept from local matching.
    pub local_segments: usize,
    /// Target offset (in N-free bases) global matching started at.
    pub switch_point: Option<usize>,
    pub final_mode: Mode,
    pub elapsed: Duration,
}

impl CompressionSummary {
    /// Transcript size relative to the target size.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.target_bases == 0 {
            return 0.0;
        }

        self.transcript_bytes as f64 / self.target_bases as f64
    }

    pub(crate) fn log(&self, start_time: Instant) {
        info!(
            "Compressed {}",
            format_stats(start_time, ByteNum::new(self.target_bases))
        );
        info!(
            "Transcript: {} -> {} ({:.3}%)",
            format_bytes(ByteNum::new(self.target_bases)),
            format_bytes(ByteNum::new(self.transcript_bytes)),
            self.ratio() * 100.0
        );
        info!(
            "{} matches covering {} bases, {} literal bases",
            self.matches, self.copied_bases, self.literal_bases
        );
        match self.switch_point {
            Some(switch_point) => info!(
                "Finished in {} mode after {} local segments (switched at {})",
                self.final_mode, self.local_segments, switch_point
            ),
            None => info!(
                "Finished in {} mode after {} local segments",
                self.final_mode, self.local_segments
            ),
        }
    }
}

#[must_use]
pub(crate) fn format_stats(start_time: Instant, bytes_processed: ByteNum) -> String {
    let elapsed = start_time.elapsed();

    let size_human = format_bytes(bytes_processed);

    let rate = bytes_processed.get() as f32 / elapsed.as_secs_f32();
    let rate_human = match NumberPrefix::decimal(rate) {
        NumberPrefix::Standalone(bytes) => {
            format!("{} B/s", bytes)
        }
        NumberPrefix::Prefixed(prefix, n) => {
            format!("{:.3} {}B/s", n, prefix)
        }
    };

    format!(
        "{} in {:.2}s ({})",
        size_human,
        elapsed.as_secs_f32(),
        rate_human,
    )
}

#[must_use]
pub fn format_bytes(bytes: ByteNum) -> String {
    match NumberPrefix::decimal(bytes.get() as f32) {
        NumberPrefix::Standalone(bytes) => {
            format!("{} bytes", bytes)
        }
        NumberPrefix::Prefixed(prefix, n) => {
            format!("{:.2} {}B", n, prefix)
        }
    }
}
