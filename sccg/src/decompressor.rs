use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{Read, Write};
use std::string::FromUtf8Error;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};

use crate::fasta::writer::{FastaWriter, FastaWriterError};
use crate::fasta::FastaRecord;
use crate::progress::{ByteNum, DummyProgressNotifier, ProgressNotifier};
use crate::sequence::normalize_reference;
use crate::summary::format_stats;
use crate::transcript::reader::TranscriptReader;
use crate::transcript::FormatError;

#[derive(Debug)]
pub enum DecompressorError {
    IoError(std::io::Error),
    Utf8Error(FromUtf8Error),
    FormatError(FormatError),
}

impl From<std::io::Error> for DecompressorError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl From<FromUtf8Error> for DecompressorError {
    fn from(e: FromUtf8Error) -> Self {
        Self::Utf8Error(e)
    }
}

impl From<FormatError> for DecompressorError {
    fn from(e: FormatError) -> Self {
        Self::FormatError(e)
    }
}

impl From<FastaWriterError> for DecompressorError {
    fn from(e: FastaWriterError) -> Self {
        match e {
            FastaWriterError::IoError(e) => Self::IoError(e),
        }
    }
}

impl Display for DecompressorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DecompressorError::IoError(e) => write!(f, "IO error: {}", e),
            DecompressorError::Utf8Error(e) => write!(f, "UTF-8 error: {}", e),
            DecompressorError::FormatError(e) => write!(f, "Malformed transcript: {}", e),
        }
    }
}

impl Error for DecompressorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DecompressorError::IoError(e) => Some(e),
            DecompressorError::Utf8Error(e) => Some(e),
            DecompressorError::FormatError(e) => Some(e),
        }
    }
}

/// The result of decompressing a transcript.
pub type DecompressResult<T> = Result<T, DecompressorError>;

#[derive(Debug, Clone)]
pub struct DecompressorParams {
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl DecompressorParams {
    #[must_use]
    pub fn builder() -> DecompressorParamsBuilder {
        DecompressorParamsBuilder::new()
    }
}

impl Default for DecompressorParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone)]
pub struct DecompressorParamsBuilder {
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl DecompressorParamsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            progress_notifier: Arc::new(DummyProgressNotifier),
        }
    }

    pub fn progress_notifier(&mut self, progress_notifier: Arc<dyn ProgressNotifier>) -> &mut Self {
        let new = self;
        new.progress_notifier = progress_notifier;
        new
    }

    #[must_use]
    pub fn build(&mut self) -> DecompressorParams {
        DecompressorParams {
            progress_notifier: self.progress_notifier.clone(),
        }
    }
}

impl Default for DecompressorParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Rebuilds target FASTA records from their transcripts and the reference
/// they were compressed against.
#[derive(Debug, Clone, Default)]
pub struct Decompressor {
    params: DecompressorParams,
}

impl Decompressor {
    #[must_use]
    pub fn new() -> Self {
        Self::with_params(DecompressorParams::default())
    }

    #[must_use]
    pub fn with_params(params: DecompressorParams) -> Self {
        Self { params }
    }

    /// Reads a transcript and returns the record it describes.
    pub fn decompress<R: Read>(
        &self,
        transcript: R,
        reference: &FastaRecord,
    ) -> DecompressResult<FastaRecord> {
        let start_time = Instant::now();
        let progress = self.params.progress_notifier.as_ref();

        let transcript = TranscriptReader::new(transcript).read_transcript()?;
        let stats = transcript.stats();
        progress.set_total_bases(ByteNum::new(stats.target_len()));
        debug!(
            "Transcript: {} copies, {} literal lines, {} lowercase runs, {} ambiguous runs",
            stats.copies, stats.literal_lines, stats.lowercase_runs, stats.ambiguous_runs
        );

        let reference_bases = normalize_reference(reference.body());
        let body = transcript.reconstruct(&reference_bases)?;
        progress.processed_bases(ByteNum::new(body.len()));
        info!(
            "Decompressed {}",
            format_stats(start_time, ByteNum::new(body.len()))
        );

        let header = transcript.into_header();
        Ok(FastaRecord::new(
            header.header().clone(),
            header.line_width(),
            body,
        ))
    }

    /// Reads a transcript and writes the record it describes as FASTA.
    pub fn decompress_to<R: Read, W: Write>(
        &self,
        transcript: R,
        reference: &FastaRecord,
        writer: W,
    ) -> DecompressResult<FastaRecord> {
        let record = self.decompress(transcript, reference)?;

        let mut writer = FastaWriter::new(writer);
        writer.write_record(&record)?;
        writer.flush()?;

        Ok(record)
    }
}
