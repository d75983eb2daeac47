use std::io::Read;
use std::str::Lines;

use log::debug;

use crate::decompressor::DecompressResult;
use crate::sequence::{restore, RunList, SequenceHeader};
use crate::transcript::entry::length_from_line;
use crate::transcript::{
    FormatError, TranscriptHeader, AMBIGUOUS_LINE, COPY_SEPARATOR, FIRST_ENTRY_LINE, HEADER_LINE,
    HEADER_PREFIX, LINE_WIDTH_LINE, LOWERCASE_LINE, SEPARATOR_LINE,
};

/// A single decoded transcript line.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Instruction {
    /// Bases appended verbatim.
    Literal(Vec<u8>),
    /// Bases copied from the reference, `begin` being relative to the copy
    /// cursor and `length` in its on-line form.
    Copy {
        line: usize,
        begin: i64,
        length: usize,
    },
}

/// Summary of a transcript that does not require the reference.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct TranscriptStats {
    pub copies: usize,
    pub copied_bases: usize,
    pub literal_lines: usize,
    pub literal_bases: usize,
    pub lowercase_runs: usize,
    pub ambiguous_runs: usize,
    pub ambiguous_bases: usize,
}

impl TranscriptStats {
    /// Length of the original target sequence.
    #[must_use]
    pub fn target_len(&self) -> usize {
        self.copied_bases
            .saturating_add(self.literal_bases)
            .saturating_add(self.ambiguous_bases)
    }
}

/// Transcript parsed into its header and instruction list.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ParsedTranscript {
    header: TranscriptHeader,
    instructions: Vec<Instruction>,
}

impl ParsedTranscript {
    /// Parses the textual form of a transcript.
    ///
    /// # Examples
    /// ```
    /// use sccg::transcript::reader::ParsedTranscript;
    ///
    /// let transcript = ParsedTranscript::parse(">seq\n4\n\n\n\n0,3\n").unwrap();
    /// assert_eq!(transcript.replay(b"ACGT").unwrap(), b"ACGT");
    /// ```
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        let mut lines = text.lines();

        let header_line = expect_line(&mut lines, HEADER_LINE)?;
        let header = header_line
            .strip_prefix(HEADER_PREFIX)
            .ok_or(FormatError::InvalidHeader)?;

        let width_line = expect_line(&mut lines, LINE_WIDTH_LINE)?;
        let line_width = width_line
            .trim()
            .parse()
            .map_err(|_| FormatError::InvalidLineWidth(width_line.to_owned()))?;

        let lowercase =
            RunList::parse_delta(expect_line(&mut lines, LOWERCASE_LINE)?, LOWERCASE_LINE)?;
        let ambiguous =
            RunList::parse_delta(expect_line(&mut lines, AMBIGUOUS_LINE)?, AMBIGUOUS_LINE)?;

        let separator = expect_line(&mut lines, SEPARATOR_LINE)?;
        if !separator.trim().is_empty() {
            return Err(FormatError::MissingSeparator(separator.to_owned()));
        }

        let mut instructions = Vec::new();
        for (offset, line) in lines.enumerate() {
            if line.is_empty() {
                continue;
            }
            instructions.push(parse_instruction(line, FIRST_ENTRY_LINE + offset)?);
        }

        let header = TranscriptHeader::new(
            SequenceHeader::from(header),
            line_width,
            lowercase,
            ambiguous,
        );
        Ok(Self {
            header,
            instructions,
        })
    }

    #[must_use]
    pub fn header(&self) -> &TranscriptHeader {
        &self.header
    }

    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Replays the instructions against the normalized reference, producing
    /// the normalized (uppercase, N-free) target.
    pub fn replay(&self, reference: &[u8]) -> Result<Vec<u8>, FormatError> {
        let mut bases = Vec::new();
        let mut cursor = 0i64;

        for instruction in &self.instructions {
            match *instruction {
                Instruction::Literal(ref text) => bases.extend_from_slice(text),
                Instruction::Copy {
                    line,
                    begin,
                    length,
                } => {
                    let copied_len = length_from_line(length);
                    let out_of_range = || FormatError::CopyOutOfRange {
                        line,
                        start: cursor.saturating_add(begin),
                        length: copied_len.unwrap_or(usize::MAX),
                        reference_len: reference.len(),
                    };

                    let copied_len = copied_len.ok_or_else(out_of_range)?;
                    let start = cursor.checked_add(begin).ok_or_else(out_of_range)?;
                    if start < 0 {
                        return Err(out_of_range());
                    }
                    let start = start as usize;
                    let end = start.checked_add(copied_len).ok_or_else(out_of_range)?;
                    if end > reference.len() {
                        return Err(out_of_range());
                    }

                    bases.extend_from_slice(&reference[start..end]);
                    cursor = (start + length) as i64;
                }
            }
        }

        Ok(bases)
    }

    /// Replays the instructions and restores the ambiguous and lowercase runs.
    pub fn reconstruct(&self, reference: &[u8]) -> Result<Vec<u8>, FormatError> {
        let bases = self.replay(reference)?;
        debug!(
            "Replayed {} instructions into {} bases",
            self.instructions.len(),
            bases.len()
        );

        restore(&bases, self.header.lowercase(), self.header.ambiguous())
    }

    #[must_use]
    pub fn stats(&self) -> TranscriptStats {
        let mut stats = TranscriptStats {
            lowercase_runs: self.header.lowercase().len(),
            ambiguous_runs: self.header.ambiguous().len(),
            ambiguous_bases: self.header.ambiguous().covered(),
            ..TranscriptStats::default()
        };

        for instruction in &self.instructions {
            match instruction {
                Instruction::Literal(text) => {
                    stats.literal_lines += 1;
                    stats.literal_bases = stats.literal_bases.saturating_add(text.len());
                }
                Instruction::Copy { length, .. } => {
                    stats.copies += 1;
                    let copied_len = length_from_line(*length).unwrap_or(usize::MAX);
                    stats.copied_bases = stats.copied_bases.saturating_add(copied_len);
                }
            }
        }

        stats
    }

    #[must_use]
    pub fn into_header(self) -> TranscriptHeader {
        self.header
    }
}

/// Reads a whole transcript from a byte stream.
#[derive(Debug)]
pub struct TranscriptReader<R> {
    reader: R,
}

impl<R: Read> TranscriptReader<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn read_transcript(mut self) -> DecompressResult<ParsedTranscript> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        let text = String::from_utf8(data)?;

        Ok(ParsedTranscript::parse(&text)?)
    }
}

fn expect_line<'a>(lines: &mut Lines<'a>, index: usize) -> Result<&'a str, FormatError> {
    lines.next().ok_or(FormatError::MissingLine(index))
}

fn parse_instruction(line: &str, index: usize) -> Result<Instruction, FormatError> {
    match line.split_once(COPY_SEPARATOR) {
        Some((begin, length)) => {
            let invalid = || FormatError::invalid_copy(index, line);
            let begin = begin.trim().parse().map_err(|_| invalid())?;
            let length: usize = length.trim().parse().map_err(|_| invalid())?;
            if length_from_line(length).is_none() {
                return Err(invalid());
            }

            Ok(Instruction::Copy {
                line: index,
                begin,
                length,
            })
        }
        None => {
            let is_valid = line
                .bytes()
                .all(|symbol| symbol.is_ascii_uppercase() || symbol == b'-' || symbol == b'*');
            if !is_valid {
                return Err(FormatError::invalid_literal(index, line));
            }

            Ok(Instruction::Literal(line.as_bytes().to_vec()))
        }
    }
}
