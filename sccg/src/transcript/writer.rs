use std::io::Write;

use log::trace;

use crate::compressor::{CompressResult, CompressorError};
use crate::transcript::entry::line_length;
use crate::transcript::{Entry, Transcript, TranscriptHeader, COPY_SEPARATOR, HEADER_PREFIX};

/// Serializes a [`Transcript`] to its textual, line-based form.
#[derive(Debug)]
pub struct TranscriptWriter<W> {
    writer: W,
    bytes_written: usize,
}

impl<W: Write> TranscriptWriter<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            bytes_written: 0,
        }
    }

    /// Writes the header block: FASTA header, line width, both run lists and
    /// the blank separator line.
    pub fn write_header(&mut self, header: &TranscriptHeader) -> CompressResult<()> {
        self.write_line(format!("{}{}", HEADER_PREFIX, header.header()).as_bytes())?;
        self.write_line(header.line_width().to_string().as_bytes())?;
        self.write_line(header.lowercase().to_delta_line().as_bytes())?;
        self.write_line(header.ambiguous().to_delta_line().as_bytes())?;
        self.write_line(b"")?;

        Ok(())
    }

    /// Writes the entry lines.
    ///
    /// `target` is the normalized target the transcript was built from; target
    /// bases not covered by any entry are written as literal text.
    pub fn write_entries(&mut self, transcript: &Transcript, target: &[u8]) -> CompressResult<()> {
        let mut literal = Vec::new();
        let mut covered = 0;
        let mut reference_cursor = 0usize;

        for entry in transcript.entries() {
            match entry {
                Entry::Literal(text) => {
                    literal.extend_from_slice(text);
                    covered += text.len();
                }
                Entry::Match(m) => {
                    if m.target_offset() < covered || m.target_end() > target.len() {
                        return Err(CompressorError::overlapping_entry(
                            m.target_offset(),
                            covered,
                        ));
                    }
                    if m.target_offset() > covered {
                        trace!(
                            "Recovering {} literal bases at {}",
                            m.target_offset() - covered,
                            covered
                        );
                        literal.extend_from_slice(&target[covered..m.target_offset()]);
                    }
                    self.flush_literal(&mut literal)?;

                    let begin = m.reference_offset() as i64 - reference_cursor as i64;
                    let length = line_length(m.len());
                    self.write_line(format!("{}{}{}", begin, COPY_SEPARATOR, length).as_bytes())?;

                    reference_cursor = m.reference_offset() + length;
                    covered = m.target_end();
                }
            }
        }

        if covered > target.len() {
            return Err(CompressorError::overlapping_entry(target.len(), covered));
        }
        literal.extend_from_slice(&target[covered..]);
        self.flush_literal(&mut literal)?;

        Ok(())
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    pub fn flush(&mut self) -> CompressResult<()> {
        self.writer.flush()?;

        Ok(())
    }

    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn flush_literal(&mut self, literal: &mut Vec<u8>) -> CompressResult<()> {
        if !literal.is_empty() {
            self.write_line(literal)?;
            literal.clear();
        }

        Ok(())
    }

    fn write_line(&mut self, line: &[u8]) -> CompressResult<()> {
        self.writer.write_all(line)?;
        self.writer.write_all(b"\n")?;
        self.bytes_written += line.len() + 1;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::compressor::CompressorError;
    use crate::sequence::{RunList, SequenceHeader};
    use crate::transcript::writer::TranscriptWriter;
    use crate::transcript::{Match, Transcript, TranscriptHeader};

    fn write(transcript: &Transcript, target: &[u8]) -> String {
        let mut data = Vec::new();
        let mut writer = TranscriptWriter::new(&mut data);
        writer.write_entries(transcript, target).unwrap();
        let written = writer.bytes_written();

        assert_eq!(written, data.len());
        String::from_utf8(data).unwrap()
    }

    #[test]
    fn test_write_header() {
        let header = TranscriptHeader::new(
            SequenceHeader::from("chr21 test"),
            60,
            RunList::parse_delta("10 4;", 2).unwrap(),
            RunList::new(),
        );

        let mut data = Vec::new();
        TranscriptWriter::new(&mut data)
            .write_header(&header)
            .unwrap();

        assert_eq!(String::from_utf8(data).unwrap(), ">chr21 test\n60\n10 4;\n\n\n");
    }

    #[test]
    fn test_write_single_match() {
        let mut transcript = Transcript::new();
        transcript.push_match(Match::new(0, 16, 0));

        assert_eq!(write(&transcript, b"AAAACCCCGGGGTTTT"), "0,15\n");
    }

    #[test]
    fn test_write_delta_encoded_matches() {
        let target = b"ACGTACGTACGTACGTACGTA";
        let mut transcript = Transcript::new();
        transcript.push_literal(b"AC");
        transcript.push_match(Match::new(2, 5, 100));
        transcript.push_literal(b"T");
        transcript.push_match(Match::new(8, 6, 106));

        // second begin: 106 - (100 + 5) + 1
        assert_eq!(write(&transcript, target), "AC\n100,4\nT\n2,5\nGTACGTA\n");
    }

    #[test]
    fn test_write_recovers_gaps_from_target() {
        let target = b"GGGGACGTACGTCCCCACGTACGTTT";
        let mut transcript = Transcript::new();
        transcript.push_match(Match::new(4, 8, 0));
        transcript.push_match(Match::new(16, 8, 8));

        assert_eq!(write(&transcript, target), "GGGG\n0,7\nCCCC\n1,7\nTT\n");
    }

    #[test]
    fn test_write_negative_begin() {
        let target = b"AAAAAAAACCCCCCCC";
        let mut transcript = Transcript::new();
        transcript.push_match(Match::new(0, 8, 50));
        transcript.push_match(Match::new(8, 8, 10));

        assert_eq!(write(&transcript, target), "50,7\n-47,7\n");
    }

    #[test]
    fn test_write_empty() {
        assert_eq!(write(&Transcript::new(), b""), "");
        assert_eq!(write(&Transcript::new(), b"ACGT"), "ACGT\n");
    }

    #[test]
    fn test_write_rejects_overlap() {
        let mut transcript = Transcript::new();
        transcript.push_literal(b"ACGTA");
        transcript.push_match(Match::new(3, 4, 0));

        let mut data = Vec::new();
        let error = TranscriptWriter::new(&mut data)
            .write_entries(&transcript, b"ACGTACGT")
            .unwrap_err();

        assert!(matches!(
            error,
            CompressorError::OverlappingEntry {
                target_offset: 3,
                covered: 5
            }
        ));
    }
}
