use std::fmt::{Display, Formatter, Write};

use derive_more::Deref;

use crate::transcript::FormatError;

/// Ambiguous base symbol. Never used as a matching anchor.
pub const AMBIGUOUS_BASE: u8 = b'N';

/// Header text (title) of a FASTA record, without the leading `>`.
#[derive(Debug, Eq, PartialEq, Hash, Clone, Default)]
pub struct SequenceHeader(pub String);

impl SequenceHeader {
    /// Empty header.
    pub const EMPTY: SequenceHeader = SequenceHeader(String::new());

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns this header as string.
    #[inline]
    #[must_use]
    pub fn str(&self) -> &str {
        &self.0
    }
}

impl Display for SequenceHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SequenceHeader {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for SequenceHeader {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// `count` consecutive positions starting at `start` sharing a property
/// (lowercase or ambiguous).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Run {
    start: usize,
    count: usize,
}

impl Run {
    #[must_use]
    pub fn new(start: usize, count: usize) -> Self {
        assert!(count >= 1, "Run must cover at least one position");

        Self { start, count }
    }

    #[inline]
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Position right after the last position of the run.
    #[inline]
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.count
    }
}

/// Ordered list of runs.
///
/// Runs are non-overlapping, strictly increasing and never adjacent: two runs
/// that touch are always merged into one. The only ways to build a list are
/// [`RunList::from_flags`] and [`RunList::parse_delta`], both of which keep
/// these invariants.
#[derive(Debug, Clone, Default, Eq, PartialEq, Deref)]
pub struct RunList(Vec<Run>);

impl RunList {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Builds a run list out of per-position flags.
    ///
    /// # Examples
    /// ```
    /// use sccg::sequence::{Run, RunList};
    ///
    /// let runs = RunList::from_flags([false, true, true, false, true]);
    /// assert_eq!(runs.as_slice(), &[Run::new(1, 2), Run::new(4, 1)]);
    /// ```
    pub fn from_flags<I>(flags: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let mut runs: Vec<Run> = Vec::new();
        for (position, flag) in flags.into_iter().enumerate() {
            if !flag {
                continue;
            }

            match runs.last_mut() {
                Some(run) if run.end() == position => run.count += 1,
                _ => runs.push(Run::new(position, 1)),
            }
        }

        Self(runs)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Run] {
        &self.0
    }

    /// Total number of positions covered by all runs.
    #[must_use]
    pub fn covered(&self) -> usize {
        self.0.iter().map(Run::count).sum()
    }

    /// Serializes the runs as `"<relStart> <count>;"` items, where `relStart`
    /// is measured from the end of the previous run.
    ///
    /// # Examples
    /// ```
    /// use sccg::sequence::RunList;
    ///
    /// let runs = RunList::from_flags([false, true, true, false, false, true]);
    /// assert_eq!(runs.to_delta_line(), "1 2;2 1;");
    /// ```
    #[must_use]
    pub fn to_delta_line(&self) -> String {
        let mut line = String::new();
        let mut previous_end = 0;
        for run in &self.0 {
            write!(line, "{} {};", run.start - previous_end, run.count)
                .expect("Writing to a String cannot fail");
            previous_end = run.end();
        }

        line
    }

    /// Parses a line produced by [`RunList::to_delta_line`]. `line_index` is
    /// only used for error reporting.
    pub fn parse_delta(line: &str, line_index: usize) -> Result<Self, FormatError> {
        let body = line.strip_suffix(';').unwrap_or(line);
        if body.is_empty() {
            return Ok(Self::new());
        }

        let mut runs: Vec<Run> = Vec::new();
        let mut previous_end = 0usize;
        for token in body.split(';') {
            let invalid = || FormatError::invalid_run(line_index, token);

            let (relative_start, count) = token.split_once(' ').ok_or_else(invalid)?;
            let relative_start: usize = relative_start.parse().map_err(|_| invalid())?;
            let count: usize = count.parse().map_err(|_| invalid())?;
            if count == 0 || (relative_start == 0 && !runs.is_empty()) {
                return Err(invalid());
            }

            let start = previous_end
                .checked_add(relative_start)
                .ok_or_else(invalid)?;
            previous_end = start.checked_add(count).ok_or_else(invalid)?;
            runs.push(Run::new(start, count));
        }

        Ok(Self(runs))
    }
}

/// Target sequence prepared for matching: uppercase, without ambiguous bases,
/// plus what is needed to undo both transformations.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NormalizedSequence {
    bases: Vec<u8>,
    lowercase: RunList,
    ambiguous: RunList,
}

impl NormalizedSequence {
    #[must_use]
    pub fn bases(&self) -> &[u8] {
        &self.bases
    }

    #[must_use]
    pub fn lowercase(&self) -> &RunList {
        &self.lowercase
    }

    #[must_use]
    pub fn ambiguous(&self) -> &RunList {
        &self.ambiguous
    }

    #[must_use]
    pub fn into_parts(self) -> (Vec<u8>, RunList, RunList) {
        (self.bases, self.lowercase, self.ambiguous)
    }
}

/// Normalizes a raw target sequence.
///
/// Both run lists are expressed in positions of `raw`.
///
/// # Examples
/// ```
/// use sccg::sequence::{normalize, Run};
///
/// let normalized = normalize(b"ACgtNNA");
/// assert_eq!(normalized.bases(), b"ACGTA");
/// assert_eq!(normalized.lowercase().as_slice(), &[Run::new(2, 2)]);
/// assert_eq!(normalized.ambiguous().as_slice(), &[Run::new(4, 2)]);
/// ```
#[must_use]
pub fn normalize(raw: &[u8]) -> NormalizedSequence {
    let lowercase = RunList::from_flags(raw.iter().map(u8::is_ascii_lowercase));
    let ambiguous = RunList::from_flags(
        raw.iter()
            .map(|base| base.to_ascii_uppercase() == AMBIGUOUS_BASE),
    );

    NormalizedSequence {
        bases: normalize_reference(raw),
        lowercase,
        ambiguous,
    }
}

/// Uppercases a sequence and drops its ambiguous bases.
#[must_use]
pub fn normalize_reference(raw: &[u8]) -> Vec<u8> {
    raw.iter()
        .map(u8::to_ascii_uppercase)
        .filter(|&base| base != AMBIGUOUS_BASE)
        .collect()
}

/// Inverse of [`normalize`]: re-inserts the ambiguous runs, then lowercases
/// the lowercase runs.
pub fn restore(
    bases: &[u8],
    lowercase: &RunList,
    ambiguous: &RunList,
) -> Result<Vec<u8>, FormatError> {
    let mut restored = insert_ambiguous(bases, ambiguous)?;
    apply_lowercase(&mut restored, lowercase)?;

    Ok(restored)
}

fn insert_ambiguous(bases: &[u8], ambiguous: &RunList) -> Result<Vec<u8>, FormatError> {
    let too_long = || match ambiguous.last() {
        Some(run) => FormatError::run_out_of_range(*run, bases.len()),
        None => FormatError::RunOutOfRange {
            start: 0,
            count: 0,
            len: bases.len(),
        },
    };
    let total_len = bases
        .len()
        .checked_add(ambiguous.covered())
        .ok_or_else(too_long)?;
    let mut restored = Vec::new();
    restored
        .try_reserve_exact(total_len)
        .map_err(|_| too_long())?;

    let mut consumed = 0;
    for run in ambiguous.iter() {
        let copied_end = consumed + run.start().saturating_sub(restored.len());
        if copied_end > bases.len() {
            return Err(FormatError::run_out_of_range(*run, total_len));
        }

        restored.extend_from_slice(&bases[consumed..copied_end]);
        consumed = copied_end;
        restored.resize(restored.len() + run.count(), AMBIGUOUS_BASE);
    }
    restored.extend_from_slice(&bases[consumed..]);

    Ok(restored)
}

fn apply_lowercase(sequence: &mut [u8], lowercase: &RunList) -> Result<(), FormatError> {
    for run in lowercase.iter() {
        if run.end() > sequence.len() {
            return Err(FormatError::run_out_of_range(*run, sequence.len()));
        }

        sequence[run.start()..run.end()].make_ascii_lowercase();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::sequence::{normalize, normalize_reference, restore, Run, RunList, SequenceHeader};
    use crate::transcript::FormatError;

    #[test]
    fn test_header() {
        let header = SequenceHeader::from("chr1 test");

        assert_eq!(header.str(), "chr1 test");
        assert_eq!(header.len(), 9);
        assert_eq!(format!("{}", header), "chr1 test");
        assert!(SequenceHeader::EMPTY.is_empty());
    }

    #[test]
    fn test_from_flags_merges_adjacent_positions() {
        let runs = RunList::from_flags([true, true, false, true, true, true, false]);

        assert_eq!(runs.as_slice(), &[Run::new(0, 2), Run::new(3, 3)]);
        assert_eq!(runs.covered(), 5);
    }

    #[test]
    fn test_from_flags_empty() {
        assert!(RunList::from_flags([false; 10]).is_empty());
        assert!(RunList::from_flags(std::iter::empty()).is_empty());
    }

    #[test]
    fn test_lowercase_run_at_offset_10() {
        let raw = b"ACGTACGTACaaaaGTACGT";
        let normalized = normalize(raw);

        assert_eq!(normalized.lowercase().as_slice(), &[Run::new(10, 4)]);
        assert_eq!(normalized.lowercase().to_delta_line(), "10 4;");
        assert!(normalized.ambiguous().is_empty());
        assert_eq!(normalized.bases(), b"ACGTACGTACAAAAGTACGT");
    }

    #[test]
    fn test_normalize_lowercase_ambiguous() {
        let normalized = normalize(b"nnACGTNNacN");

        assert_eq!(normalized.bases(), b"ACGTAC");
        assert_eq!(
            normalized.ambiguous().as_slice(),
            &[Run::new(0, 2), Run::new(6, 2), Run::new(10, 1)]
        );
        assert_eq!(
            normalized.lowercase().as_slice(),
            &[Run::new(0, 2), Run::new(8, 2)]
        );
    }

    #[test]
    fn test_normalize_reference() {
        assert_eq!(normalize_reference(b"acNgtNN"), b"ACGT");
        assert!(normalize_reference(b"").is_empty());
    }

    #[test]
    fn test_restore_round_trip() {
        let inputs: [&[u8]; 6] = [
            b"",
            b"NNNN",
            b"nnnn",
            b"ACGTnnnnACGTNNNNacgt",
            b"NacgtNNNNNNNNNNACGTRYacgtn",
            b"aaaaCCCCggggTTTTNNNNnnnnAAAA",
        ];

        for raw in inputs {
            let normalized = normalize(raw);
            let restored = restore(
                normalized.bases(),
                normalized.lowercase(),
                normalized.ambiguous(),
            )
            .unwrap();

            assert_eq!(restored, raw);
        }
    }

    #[test]
    fn test_delta_line_round_trip() {
        let runs = RunList::from_flags(
            b"xxAAxxxxAxAAAAAAx"
                .iter()
                .map(|&base| base == b'A'),
        );
        let line = runs.to_delta_line();

        assert_eq!(line, "2 2;4 1;1 6;");
        assert_eq!(RunList::parse_delta(&line, 2).unwrap(), runs);
    }

    #[test]
    fn test_parse_delta_without_trailing_separator() {
        let runs = RunList::parse_delta("3 1;1 2", 3).unwrap();

        assert_eq!(runs.as_slice(), &[Run::new(3, 1), Run::new(5, 2)]);
    }

    #[test]
    fn test_parse_delta_empty() {
        assert!(RunList::parse_delta("", 2).unwrap().is_empty());
    }

    #[test]
    fn test_parse_delta_rejects_malformed() {
        for line in ["1", "a 1;", "1 b;", "1 0;", "1 1;0 1;", "1 1;;2 2;", "-1 2;"] {
            let error = RunList::parse_delta(line, 3).unwrap_err();

            assert!(
                matches!(error, FormatError::InvalidRun { line: 3, .. }),
                "unexpected result for {:?}: {:?}",
                line,
                error
            );
        }
    }

    #[test]
    fn test_restore_rejects_runs_out_of_range() {
        let ambiguous = RunList::parse_delta("10 2;", 3).unwrap();
        let error = restore(b"ACGT", &RunList::new(), &ambiguous).unwrap_err();
        assert!(matches!(error, FormatError::RunOutOfRange { .. }));

        let ambiguous = RunList::parse_delta(&format!("0 {};", usize::MAX), 3).unwrap();
        let error = restore(b"ACGT", &RunList::new(), &ambiguous).unwrap_err();
        assert!(matches!(error, FormatError::RunOutOfRange { .. }));
        let error = restore(b"", &RunList::new(), &ambiguous).unwrap_err();
        assert!(matches!(error, FormatError::RunOutOfRange { .. }));

        let lowercase = RunList::parse_delta("2 5;", 2).unwrap();
        let error = restore(b"ACGT", &lowercase, &RunList::new()).unwrap_err();
        assert!(matches!(error, FormatError::RunOutOfRange { .. }));
    }
}
