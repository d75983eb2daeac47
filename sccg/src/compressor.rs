use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use log::debug;

use crate::fasta::FastaRecord;
use crate::kmer::MAX_KMER_LENGTH;
use crate::matching::mode::SegmentPolicy;
use crate::matching::{run_matching, MatchingParams};
use crate::progress::{DummyProgressNotifier, ProgressNotifier};
use crate::sequence::{normalize, normalize_reference};
use crate::summary::CompressionSummary;
use crate::transcript::entry::MIN_MATCH_LENGTH;
use crate::transcript::writer::TranscriptWriter;
use crate::transcript::TranscriptHeader;

/// Error occurring during compression of a target sequence.
#[derive(Debug)]
pub enum CompressorError {
    /// I/O error occurred when writing the transcript.
    IoError(std::io::Error),
    /// A transcript entry describes target bases that are already described.
    OverlappingEntry { target_offset: usize, covered: usize },
}

impl CompressorError {
    pub(crate) fn overlapping_entry(target_offset: usize, covered: usize) -> Self {
        Self::OverlappingEntry {
            target_offset,
            covered,
        }
    }
}

impl From<std::io::Error> for CompressorError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl Display for CompressorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CompressorError::IoError(e) => write!(f, "IO error: {}", e),
            CompressorError::OverlappingEntry {
                target_offset,
                covered,
            } => write!(
                f,
                "Entry at target offset {} overlaps already described bases (described: {})",
                target_offset, covered
            ),
        }
    }
}

impl Error for CompressorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CompressorError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

/// The result of compressing a target sequence.
pub type CompressResult<T> = Result<T, CompressorError>;

#[derive(Debug, Clone)]
pub struct CompressorParams {
    matching: MatchingParams,
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl CompressorParams {
    #[must_use]
    pub fn builder() -> CompressorParamsBuilder {
        CompressorParamsBuilder::new()
    }

    #[must_use]
    pub fn matching(&self) -> &MatchingParams {
        &self.matching
    }
}

impl Default for CompressorParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone)]
pub struct CompressorParamsBuilder {
    matching: MatchingParams,
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl CompressorParamsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            matching: MatchingParams::default(),
            progress_notifier: Arc::new(DummyProgressNotifier),
        }
    }

    /// Sets the k-mer length used by both local and global matching.
    ///
    /// # Panics
    /// This function panics if `kmer_length` is not in
    /// `MIN_MATCH_LENGTH..=MAX_KMER_LENGTH`.
    pub fn kmer_length(&mut self, kmer_length: usize) -> &mut Self {
        check_kmer_length(kmer_length);

        let new = self;
        new.matching.kmer_length = kmer_length;
        new
    }

    /// Sets the k-mer length local matching retries a segment with when the
    /// regular one finds no match in it.
    ///
    /// # Panics
    /// This function panics if `fallback_kmer_length` is not in
    /// `MIN_MATCH_LENGTH..=MAX_KMER_LENGTH`.
    pub fn fallback_kmer_length(&mut self, fallback_kmer_length: usize) -> &mut Self {
        check_kmer_length(fallback_kmer_length);

        let new = self;
        new.matching.fallback_kmer_length = fallback_kmer_length;
        new
    }

    pub fn global_search_limit(&mut self, global_search_limit: usize) -> &mut Self {
        let new = self;
        new.matching.global_search_limit = global_search_limit;
        new
    }

    pub fn small_input_len(&mut self, small_input_len: usize) -> &mut Self {
        let new = self;
        new.matching.regimes.small_input_len = small_input_len;
        new
    }

    pub fn medium_input_len(&mut self, medium_input_len: usize) -> &mut Self {
        let new = self;
        new.matching.regimes.medium_input_len = medium_input_len;
        new
    }

    pub fn medium_policy(&mut self, medium_policy: SegmentPolicy) -> &mut Self {
        let new = self;
        new.matching.regimes.medium = medium_policy;
        new
    }

    pub fn large_policy(&mut self, large_policy: SegmentPolicy) -> &mut Self {
        let new = self;
        new.matching.regimes.large = large_policy;
        new
    }

    pub fn progress_notifier(&mut self, progress_notifier: Arc<dyn ProgressNotifier>) -> &mut Self {
        let new = self;
        new.progress_notifier = progress_notifier;
        new
    }

    #[must_use]
    pub fn build(&mut self) -> CompressorParams {
        CompressorParams {
            matching: self.matching,
            progress_notifier: self.progress_notifier.clone(),
        }
    }
}

impl Default for CompressorParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn check_kmer_length(kmer_length: usize) {
    assert!(
        (MIN_MATCH_LENGTH..=MAX_KMER_LENGTH).contains(&kmer_length),
        "Invalid k-mer length: {}",
        kmer_length
    );
}

/// Compresses a target FASTA record into a transcript against a reference
/// FASTA record.
#[derive(Debug, Clone, Default)]
pub struct Compressor {
    params: CompressorParams,
}

impl Compressor {
    #[must_use]
    pub fn new() -> Self {
        Self::with_params(CompressorParams::default())
    }

    #[must_use]
    pub fn with_params(params: CompressorParams) -> Self {
        Self { params }
    }

    /// Writes the transcript of `target` to `writer`.
    pub fn compress<W: Write>(
        &self,
        target: &FastaRecord,
        reference: &FastaRecord,
        writer: W,
    ) -> CompressResult<CompressionSummary> {
        let start_time = Instant::now();

        let (bases, lowercase, ambiguous) = normalize(target.body()).into_parts();
        let reference_bases = normalize_reference(reference.body());
        debug!(
            "Normalized target: {} bases, {} lowercase runs, {} ambiguous runs",
            bases.len(),
            lowercase.len(),
            ambiguous.len()
        );

        let outcome = run_matching(
            &bases,
            &reference_bases,
            &self.params.matching,
            self.params.progress_notifier.as_ref(),
        );

        let header = TranscriptHeader::new(
            target.header().clone(),
            target.line_width(),
            lowercase,
            ambiguous,
        );
        let mut writer = TranscriptWriter::new(writer);
        writer.write_header(&header)?;
        writer.write_entries(&outcome.transcript, &bases)?;
        writer.flush()?;

        let copied_bases: usize = outcome.transcript.matches().map(|m| m.len()).sum();
        let summary = CompressionSummary {
            target_bases: target.len(),
            reference_bases: reference.len(),
            transcript_bytes: writer.bytes_written(),
            matches: outcome.transcript.matches().count(),
            copied_bases,
            literal_bases: bases.len() - copied_bases,
            lowercase_runs: header.lowercase().len(),
            ambiguous_runs: header.ambiguous().len(),
            local_segments: outcome.local_segments,
            switch_point: outcome.switch_point,
            final_mode: outcome.final_mode,
            elapsed: start_time.elapsed(),
        };
        summary.log(start_time);

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::io::ErrorKind::NotFound;

    use crate::_internal_test_data::random_sequence;
    use crate::compressor::{CompressorError, CompressorParams, Compressor};
    use crate::fasta::FastaRecord;
    use crate::matching::mode::SegmentPolicy;
    use crate::matching::Mode;

    fn compress(target: &FastaRecord, reference: &FastaRecord) -> String {
        let mut data = Vec::new();
        Compressor::new().compress(target, reference, &mut data).unwrap();

        String::from_utf8(data).unwrap()
    }

    #[test]
    fn test_identical_input_is_single_copy() {
        let record = FastaRecord::new("seq", 60, b"AAAACCCCGGGGTTTTAAAACCCCGGGGTTTT".to_vec());

        assert_eq!(compress(&record, &record), ">seq\n60\n\n\n\n0,31\n");
    }

    #[test]
    fn test_short_input_is_literal() {
        let target = FastaRecord::new("seq", 16, b"AAAACCCCGGGGTTTT".to_vec());

        assert_eq!(compress(&target, &target), ">seq\n16\n\n\n\nAAAACCCCGGGGTTTT\n");
    }

    #[test]
    fn test_header_block() {
        let reference = FastaRecord::new("ref", 60, b"ACGT".to_vec());
        let target = FastaRecord::new("target x", 4, b"ACGTacgtNNNNACGTnn".to_vec());

        assert_eq!(
            compress(&target, &reference),
            ">target x\n4\n4 4;8 2;\n8 4;4 2;\n\nACGTACGTACGT\n"
        );
    }

    #[test_log::test]
    fn test_summary() {
        let reference = random_sequence(5000, 1);
        let mut target = reference.clone();
        target[2500] = if target[2500] == b'A' { b'C' } else { b'A' };
        let target = FastaRecord::new("target", 60, target);
        let reference = FastaRecord::new("reference", 60, reference);

        let mut data = Vec::new();
        let summary = Compressor::new()
            .compress(&target, &reference, &mut data)
            .unwrap();

        assert_eq!(summary.target_bases, 5000);
        assert_eq!(summary.transcript_bytes, data.len());
        assert_eq!(summary.matches, 2);
        assert_eq!(summary.copied_bases + summary.literal_bases, 5000);
        assert_eq!(summary.final_mode, Mode::Global);
        assert_eq!(summary.switch_point, Some(0));
    }

    #[test]
    fn test_builder() {
        let params = CompressorParams::builder()
            .kmer_length(15)
            .fallback_kmer_length(9)
            .global_search_limit(50)
            .small_input_len(10)
            .medium_input_len(20)
            .medium_policy(SegmentPolicy::new(100, 0.2, 1))
            .large_policy(SegmentPolicy::new(200, 0.3, 2))
            .build();
        let matching = params.matching();

        assert_eq!(matching.kmer_length, 15);
        assert_eq!(matching.fallback_kmer_length, 9);
        assert_eq!(matching.global_search_limit, 50);
        assert_eq!(matching.regimes.small_input_len, 10);
        assert_eq!(matching.regimes.medium_input_len, 20);
        assert_eq!(matching.regimes.medium, SegmentPolicy::new(100, 0.2, 1));
        assert_eq!(matching.regimes.large, SegmentPolicy::new(200, 0.3, 2));
    }

    #[test]
    #[should_panic]
    fn test_builder_rejects_long_kmer() {
        let _ = CompressorParams::builder().kmer_length(33);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            format!("{}", CompressorError::from(std::io::Error::from(NotFound))),
            "IO error: entity not found"
        );
        assert_eq!(
            format!("{}", CompressorError::overlapping_entry(3, 5)),
            "Entry at target offset 3 overlaps already described bases (described: 5)"
        );
    }

    #[test]
    fn test_error_source() {
        assert!(CompressorError::from(std::io::Error::from(NotFound))
            .source()
            .is_some());
        assert!(CompressorError::overlapping_entry(3, 5).source().is_none());
    }
}
