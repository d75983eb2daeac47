use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::io::BufRead;

use log::warn;

use crate::fasta::{FastaRecord, FASTA_HEADER_PREFIX};
use crate::progress::ByteNum;
use crate::sequence::SequenceHeader;

/// Error occurring during parsing a FASTA file.
#[derive(Debug)]
pub enum FastaReaderError {
    /// I/O error occurred when reading the FASTA file.
    IoError(std::io::Error),
    /// End-Of-File reached before any record.
    EofReached,
    /// Not a valid FASTA file.
    InvalidFormat,
    /// Invalid sequence symbol.
    InvalidBase(char),
}

impl From<std::io::Error> for FastaReaderError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl Display for FastaReaderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FastaReaderError::IoError(e) => write!(f, "IO error: {}", e),
            FastaReaderError::EofReached => write!(f, "Reached the end of file"),
            FastaReaderError::InvalidFormat => write!(f, "Invalid format"),
            FastaReaderError::InvalidBase(ch) => write!(f, "Invalid base: `{}`", ch),
        }
    }
}

impl Error for FastaReaderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FastaReaderError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

/// The result of a FASTA reading operation.
pub type FastaResult<T> = Result<T, FastaReaderError>;

#[inline]
fn is_valid_base(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'-' || byte == b'*'
}

/// FASTA format reader returning the first record of a file.
#[derive(Debug)]
pub struct FastaReader<R> {
    reader: R,
    bytes_read: ByteNum,
    buffer: Vec<u8>,
}

impl<R: BufRead> FastaReader<R> {
    /// Creates new `FastaReader` instance.
    ///
    /// # Examples
    /// ```
    /// use sccg::fasta::reader::FastaReader;
    ///
    /// let record = FastaReader::new(">seq\nACGT\nAC\n".as_bytes())
    ///     .read_record()
    ///     .unwrap();
    /// assert_eq!(record.body(), b"ACGTAC");
    /// assert_eq!(record.line_width(), 4);
    /// ```
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            bytes_read: ByteNum::ZERO,
            buffer: Vec::with_capacity(4096),
        }
    }

    /// Number of bytes consumed so far.
    #[must_use]
    pub fn bytes_read(&self) -> ByteNum {
        self.bytes_read
    }

    /// Reads the first record. If the input holds more records, they are
    /// ignored.
    pub fn read_record(&mut self) -> FastaResult<FastaRecord> {
        let header = self.parse_header()?;

        let mut body = Vec::new();
        let mut line_width = None;
        while let Some(line) = self.next_body_line()? {
            if line.is_empty() {
                continue;
            }

            if let Some(&ch) = line.iter().find(|&&ch| !is_valid_base(ch)) {
                return Err(FastaReaderError::InvalidBase(ch as char));
            }
            line_width.get_or_insert(line.len());
            body.extend_from_slice(line);
        }

        Ok(FastaRecord::new(header, line_width.unwrap_or(0), body))
    }

    fn parse_header(&mut self) -> FastaResult<SequenceHeader> {
        let line = loop {
            let line = self.read_line()?.ok_or(FastaReaderError::EofReached)?;
            if !line.iter().all(u8::is_ascii_whitespace) {
                break line;
            }
        };

        if line.first() != Some(&FASTA_HEADER_PREFIX) {
            return Err(FastaReaderError::InvalidFormat);
        }

        let header = String::from_utf8_lossy(&line[1..]).into_owned();
        Ok(SequenceHeader::from(header))
    }

    /// Returns the next line of the current record, or `None` at the end of
    /// the input or at the start of another record.
    fn next_body_line(&mut self) -> FastaResult<Option<&[u8]>> {
        let next = self.reader.fill_buf()?;
        if next.first() == Some(&FASTA_HEADER_PREFIX) {
            warn!("Input contains more than one record, reading only the first one");
            return Ok(None);
        }

        self.read_line()
    }

    fn read_line(&mut self) -> FastaResult<Option<&[u8]>> {
        self.buffer.clear();
        let bytes_read = self.reader.read_until(b'\n', &mut self.buffer)?;
        if bytes_read == 0 {
            return Ok(None);
        }
        self.bytes_read += ByteNum::new(bytes_read);

        let mut line = self.buffer.as_slice();
        while let Some((&last, rest)) = line.split_last() {
            if last != b'\n' && last != b'\r' {
                break;
            }
            line = rest;
        }

        Ok(Some(line))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::io::ErrorKind::NotFound;

    use crate::_internal_test_data::{SIMPLE_FASTA, SIMPLE_FASTA_STR};
    use crate::fasta::reader::{FastaReader, FastaReaderError};

    #[test]
    fn read_returns_simple_record() {
        let mut reader = FastaReader::new(SIMPLE_FASTA_STR.as_bytes());
        let record = reader.read_record().unwrap();

        assert_eq!(record, *SIMPLE_FASTA);
        assert_eq!(reader.bytes_read().get(), SIMPLE_FASTA_STR.len());
    }

    #[test]
    fn should_keep_header_verbatim() {
        let record = FastaReader::new(">  chr1  some description \r\nAC\r\nG\r\n".as_bytes())
            .read_record()
            .unwrap();

        assert_eq!(record.header().str(), "  chr1  some description ");
        assert_eq!(record.body(), b"ACG");
        assert_eq!(record.line_width(), 2);
    }

    #[test]
    fn should_skip_leading_and_inner_blank_lines() {
        let record = FastaReader::new("\n\n>seq\nACGT\n\nNNac\n\n".as_bytes())
            .read_record()
            .unwrap();

        assert_eq!(record.body(), b"ACGTNNac");
        assert_eq!(record.line_width(), 4);
    }

    #[test]
    fn should_return_empty_body() {
        let record = FastaReader::new(">seq\n".as_bytes()).read_record().unwrap();

        assert!(record.is_empty());
        assert_eq!(record.line_width(), 0);
    }

    #[test]
    fn should_stop_at_second_record() {
        let record = FastaReader::new(">first\nACGT\n>second\nTTTT\n".as_bytes())
            .read_record()
            .unwrap();

        assert_eq!(record.header().str(), "first");
        assert_eq!(record.body(), b"ACGT");
    }

    #[test]
    fn should_return_invalid_base_error() {
        let error = FastaReader::new(">seq\nAC#T\n".as_bytes())
            .read_record()
            .unwrap_err();

        assert!(matches!(error, FastaReaderError::InvalidBase('#')));
    }

    #[test]
    fn should_return_invalid_format_error() {
        let error = FastaReader::new("ACGT\n".as_bytes())
            .read_record()
            .unwrap_err();

        assert!(matches!(error, FastaReaderError::InvalidFormat));
    }

    #[test]
    fn should_return_eof_for_empty_input() {
        for input in ["", "\n", " \n\n"] {
            let error = FastaReader::new(input.as_bytes()).read_record().unwrap_err();
            assert!(matches!(error, FastaReaderError::EofReached));
        }
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            format!("{}", FastaReaderError::from(std::io::Error::from(NotFound))),
            "IO error: entity not found"
        );
        assert_eq!(
            format!("{}", FastaReaderError::EofReached),
            "Reached the end of file"
        );
        assert_eq!(
            format!("{}", FastaReaderError::InvalidFormat),
            "Invalid format"
        );
        assert_eq!(
            format!("{}", FastaReaderError::InvalidBase('#')),
            "Invalid base: `#`"
        );
    }

    #[test]
    fn test_error_source() {
        assert!(FastaReaderError::from(std::io::Error::from(NotFound))
            .source()
            .is_some());
        assert!(FastaReaderError::EofReached.source().is_none());
        assert!(FastaReaderError::InvalidFormat.source().is_none());
        assert!(FastaReaderError::InvalidBase('#').source().is_none());
    }
}
