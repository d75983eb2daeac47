use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::sequence::{Run, RunList, SequenceHeader};

pub mod entry;
pub mod reader;
pub mod writer;

pub use entry::{Entry, Match};

/// Index of the header line of a transcript.
pub(crate) const HEADER_LINE: usize = 0;
/// Index of the line width line of a transcript.
pub(crate) const LINE_WIDTH_LINE: usize = 1;
/// Index of the lowercase runs line of a transcript.
pub(crate) const LOWERCASE_LINE: usize = 2;
/// Index of the ambiguous base runs line of a transcript.
pub(crate) const AMBIGUOUS_LINE: usize = 3;
/// Index of the blank line separating the header block from the entries.
pub(crate) const SEPARATOR_LINE: usize = 4;
/// Index of the first entry line.
pub(crate) const FIRST_ENTRY_LINE: usize = 5;

pub(crate) const HEADER_PREFIX: char = '>';
pub(crate) const COPY_SEPARATOR: char = ',';

/// Error occurring when a transcript does not follow its line grammar.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FormatError {
    /// The transcript ends before the given line.
    MissingLine(usize),
    /// The first line is not a FASTA header.
    InvalidHeader,
    /// The line width line is not an integer.
    InvalidLineWidth(String),
    /// The header block is not terminated by a blank line.
    MissingSeparator(String),
    /// A run list item cannot be parsed or breaks the run invariants.
    InvalidRun { line: usize, token: String },
    /// A literal line contains symbols that are not sequence symbols.
    InvalidLiteral { line: usize, text: String },
    /// A `"<begin>,<length>"` line cannot be parsed.
    InvalidCopy { line: usize, text: String },
    /// A copy instruction points outside of the reference.
    CopyOutOfRange {
        line: usize,
        start: i64,
        length: usize,
        reference_len: usize,
    },
    /// A run points outside of the reconstructed sequence.
    RunOutOfRange { start: usize, count: usize, len: usize },
}

impl FormatError {
    pub(crate) fn invalid_run(line: usize, token: &str) -> Self {
        Self::InvalidRun {
            line,
            token: token.to_owned(),
        }
    }

    pub(crate) fn invalid_literal(line: usize, text: &str) -> Self {
        Self::InvalidLiteral {
            line,
            text: text.to_owned(),
        }
    }

    pub(crate) fn invalid_copy(line: usize, text: &str) -> Self {
        Self::InvalidCopy {
            line,
            text: text.to_owned(),
        }
    }

    pub(crate) fn run_out_of_range(run: Run, len: usize) -> Self {
        Self::RunOutOfRange {
            start: run.start(),
            count: run.count(),
            len,
        }
    }
}

impl Display for FormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::MissingLine(line) => {
                write!(f, "Transcript ends before line {}", line + 1)
            }
            FormatError::InvalidHeader => write!(f, "Transcript does not start with a header"),
            FormatError::InvalidLineWidth(text) => write!(f, "Invalid line width: `{}`", text),
            FormatError::MissingSeparator(text) => {
                write!(f, "Expected a blank separator line, found: `{}`", text)
            }
            FormatError::InvalidRun { line, token } => {
                write!(f, "Invalid run `{}` on line {}", token, line + 1)
            }
            FormatError::InvalidLiteral { line, text } => {
                write!(f, "Invalid literal `{}` on line {}", text, line + 1)
            }
            FormatError::InvalidCopy { line, text } => {
                write!(f, "Invalid copy instruction `{}` on line {}", text, line + 1)
            }
            FormatError::CopyOutOfRange {
                line,
                start,
                length,
                reference_len,
            } => write!(
                f,
                "Copy instruction on line {} out of range (start: {}, length: {}, reference length: {})",
                line + 1,
                start,
                length,
                reference_len
            ),
            FormatError::RunOutOfRange { start, count, len } => write!(
                f,
                "Run out of range (start: {}, count: {}, sequence length: {})",
                start, count, len
            ),
        }
    }
}

impl Error for FormatError {}

/// Data preceding the entries of a transcript.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TranscriptHeader {
    header: SequenceHeader,
    line_width: usize,
    lowercase: RunList,
    ambiguous: RunList,
}

impl TranscriptHeader {
    #[must_use]
    pub fn new(
        header: SequenceHeader,
        line_width: usize,
        lowercase: RunList,
        ambiguous: RunList,
    ) -> Self {
        Self {
            header,
            line_width,
            lowercase,
            ambiguous,
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

    #[must_use]
    pub fn lowercase(&self) -> &RunList {
        &self.lowercase
    }

    #[must_use]
    pub fn ambiguous(&self) -> &RunList {
        &self.ambiguous
    }
}

/// Ordered list of entries describing a target in terms of a reference.
///
/// Consecutive literal text is always merged into a single entry.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Transcript {
    entries: Vec<Entry>,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push_literal(&mut self, text: &[u8]) {
        if text.is_empty() {
            return;
        }

        if let Some(Entry::Literal(last)) = self.entries.last_mut() {
            last.extend_from_slice(text);
        } else {
            self.entries.push(Entry::Literal(text.to_vec()));
        }
    }

    pub fn push_match(&mut self, m: Match) {
        self.entries.push(Entry::Match(m));
    }

    /// Appends all entries of `other`, merging literal text at the seam.
    pub fn append(&mut self, other: Transcript) {
        for entry in other.entries {
            match entry {
                Entry::Literal(text) => self.push_literal(&text),
                Entry::Match(m) => self.push_match(m),
            }
        }
    }

    pub fn matches(&self) -> impl Iterator<Item = &Match> + '_ {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Match(m) => Some(m),
            Entry::Literal(_) => None,
        })
    }

    #[must_use]
    pub fn last_match(&self) -> Option<Match> {
        self.entries.iter().rev().find_map(|entry| match entry {
            Entry::Match(m) => Some(*m),
            Entry::Literal(_) => None,
        })
    }

    /// Number of bases carried as literal text.
    #[must_use]
    pub fn literal_bases(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| match entry {
                Entry::Literal(text) => text.len(),
                Entry::Match(_) => 0,
            })
            .sum()
    }

    /// Drops every entry after the last match. Returns `false` (and leaves the
    /// transcript untouched) if there is no match at all.
    pub fn truncate_after_last_match(&mut self) -> bool {
        let last_match = self
            .entries
            .iter()
            .rposition(|entry| matches!(entry, Entry::Match(_)));

        match last_match {
            Some(index) => {
                self.entries.truncate(index + 1);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::transcript::{Entry, FormatError, Match, Transcript};

    #[test]
    fn test_push_literal_merges() {
        let mut transcript = Transcript::new();
        transcript.push_literal(b"A");
        transcript.push_literal(b"");
        transcript.push_literal(b"CG");
        transcript.push_match(Match::new(3, 10, 0));
        transcript.push_literal(b"T");

        assert_eq!(
            transcript.entries(),
            &[
                Entry::Literal(b"ACG".to_vec()),
                Entry::Match(Match::new(3, 10, 0)),
                Entry::Literal(b"T".to_vec()),
            ]
        );
        assert_eq!(transcript.literal_bases(), 4);
    }

    #[test]
    fn test_append_merges_seam() {
        let mut first = Transcript::new();
        first.push_match(Match::new(0, 5, 0));
        first.push_literal(b"AC");
        let mut second = Transcript::new();
        second.push_literal(b"GT");
        second.push_match(Match::new(9, 5, 9));

        first.append(second);

        assert_eq!(first.len(), 3);
        assert_eq!(first.entries()[1], Entry::Literal(b"ACGT".to_vec()));
        assert_eq!(first.last_match(), Some(Match::new(9, 5, 9)));
    }

    #[test]
    fn test_truncate_after_last_match() {
        let mut transcript = Transcript::new();
        transcript.push_literal(b"A");
        transcript.push_match(Match::new(1, 4, 0));
        transcript.push_literal(b"CCC");

        assert!(transcript.truncate_after_last_match());
        assert_eq!(transcript.len(), 2);

        let mut literal_only = Transcript::new();
        literal_only.push_literal(b"ACGT");
        assert!(!literal_only.truncate_after_last_match());
        assert_eq!(literal_only.len(), 1);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            format!("{}", FormatError::MissingLine(4)),
            "Transcript ends before line 5"
        );
        assert_eq!(
            format!("{}", FormatError::invalid_run(2, "1 x")),
            "Invalid run `1 x` on line 3"
        );
        assert_eq!(
            format!("{}", FormatError::invalid_copy(7, "3,")),
            "Invalid copy instruction `3,` on line 8"
        );
        assert_eq!(
            format!(
                "{}",
                FormatError::CopyOutOfRange {
                    line: 5,
                    start: -2,
                    length: 10,
                    reference_len: 100
                }
            ),
            "Copy instruction on line 6 out of range (start: -2, length: 10, reference length: 100)"
        );
    }
}
