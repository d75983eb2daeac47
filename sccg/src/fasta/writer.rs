use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;

use crate::fasta::{FastaRecord, FASTA_HEADER_PREFIX};

#[derive(Debug)]
pub enum FastaWriterError {
    IoError(std::io::Error),
}

impl From<std::io::Error> for FastaWriterError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl Display for FastaWriterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FastaWriterError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl Error for FastaWriterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FastaWriterError::IoError(e) => Some(e),
        }
    }
}

pub type FastaWriteResult<T> = Result<T, FastaWriterError>;

/// Writes FASTA records, wrapping the body at the record's line width.
#[derive(Debug)]
pub struct FastaWriter<W> {
    writer: W,
}

impl<W: Write> FastaWriter<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_record(&mut self, record: &FastaRecord) -> FastaWriteResult<()> {
        self.writer.write_all(&[FASTA_HEADER_PREFIX])?;
        self.writer.write_all(record.header().str().as_bytes())?;
        self.writer.write_all(b"\n")?;

        if record.is_empty() {
            return Ok(());
        }

        let line_width = match record.line_width() {
            0 => record.len(),
            width => width,
        };
        for line in record.body().chunks(line_width) {
            self.writer.write_all(line)?;
            self.writer.write_all(b"\n")?;
        }

        Ok(())
    }

    pub fn flush(&mut self) -> FastaWriteResult<()> {
        self.writer.flush()?;

        Ok(())
    }

    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::io::ErrorKind::NotFound;

    use crate::_internal_test_data::{SIMPLE_FASTA, SIMPLE_FASTA_STR};
    use crate::fasta::reader::FastaReader;
    use crate::fasta::writer::{FastaWriter, FastaWriterError};
    use crate::fasta::FastaRecord;

    fn write(record: &FastaRecord) -> String {
        let mut data = Vec::new();
        FastaWriter::new(&mut data).write_record(record).unwrap();

        String::from_utf8(data).unwrap()
    }

    #[test]
    fn test_write_simple_record() {
        assert_eq!(write(&SIMPLE_FASTA), SIMPLE_FASTA_STR);
    }

    #[test]
    fn test_wraps_at_line_width() {
        let record = FastaRecord::new("seq", 3, b"ACGTACGT".to_vec());

        assert_eq!(write(&record), ">seq\nACG\nTAC\nGT\n");
    }

    #[test]
    fn test_zero_width_writes_single_line() {
        let record = FastaRecord::new("seq", 0, b"ACGTACGT".to_vec());

        assert_eq!(write(&record), ">seq\nACGTACGT\n");
    }

    #[test]
    fn test_empty_body() {
        let record = FastaRecord::new("empty", 60, Vec::new());

        assert_eq!(write(&record), ">empty\n");
    }

    #[test]
    fn test_read_written_record() {
        let record = FastaRecord::new(" x y ", 7, b"acgtNNNNNNACGTRYacgta".to_vec());
        let written = write(&record);
        let read = FastaReader::new(written.as_bytes()).read_record().unwrap();

        assert_eq!(read, record);
    }

    #[test]
    fn test_error() {
        let error = FastaWriterError::from(std::io::Error::from(NotFound));

        assert_eq!(format!("{}", error), "IO error: entity not found");
        assert!(error.source().is_some());
    }
}
