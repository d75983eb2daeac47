use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use log::debug;

use crate::fasta::reader::{FastaReader, FastaResult};
use crate::sequence::SequenceHeader;

pub mod reader;
pub mod writer;

pub(crate) const FASTA_HEADER_PREFIX: u8 = b'>';

const GZIP_EXTENSION: &str = "gz";

/// Single FASTA record.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FastaRecord {
    header: SequenceHeader,
    line_width: usize,
    body: Vec<u8>,
}

impl FastaRecord {
    /// Creates a new record.
    ///
    /// `line_width` is the number of bases per body line; `0` means the body
    /// is written as a single line.
    #[must_use]
    pub fn new<T: Into<SequenceHeader>>(header: T, line_width: usize, body: Vec<u8>) -> Self {
        Self {
            header: header.into(),
            line_width,
            body,
        }
    }

    #[must_use]
    pub fn header(&self) -> &SequenceHeader {
        &self.header
    }

    #[must_use]
    pub fn line_width(&self) -> usize {
        self.line_width
    }

    /// Sequence symbols, with line breaks removed.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    #[must_use]
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}

/// Loads the first record of a FASTA file, transparently decompressing it if
/// its name ends with `.gz`.
pub fn load_fasta<P: AsRef<Path>>(path: P) -> FastaResult<FastaRecord> {
    let path = path.as_ref();
    let file = File::open(path)?;

    let is_gzipped = path.extension() == Some(OsStr::new(GZIP_EXTENSION));
    let reader: Box<dyn Read> = if is_gzipped {
        Box::new(MultiGzDecoder::new(file))
    } else {
        Box::new(file)
    };

    let record = FastaReader::new(BufReader::new(reader)).read_record()?;
    debug!(
        "Loaded `{}` from {}: {} bases, line width {}",
        record.header(),
        path.display(),
        record.len(),
        record.line_width()
    );

    Ok(record)
}
