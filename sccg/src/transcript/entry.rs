//! Transcript entries and every length-bias conversion used by the codec.
//!
//! A match of `n` bases is kept in memory as `n - MATCH_LENGTH_BIAS` and is
//! written to transcript lines as `n - 1` (the offset of its last base).
//! Nothing outside this module converts between these representations.

/// Bias subtracted from the true length of a [`Match`] when it is stored.
pub const MATCH_LENGTH_BIAS: usize = 2;

/// Minimum true length of a match.
pub const MIN_MATCH_LENGTH: usize = MATCH_LENGTH_BIAS;

#[inline]
#[must_use]
pub const fn stored_length(true_length: usize) -> usize {
    true_length - MATCH_LENGTH_BIAS
}

#[inline]
#[must_use]
pub const fn true_length(stored_length: usize) -> usize {
    stored_length + MATCH_LENGTH_BIAS
}

/// Length as written on a `"<begin>,<length>"` transcript line.
#[inline]
#[must_use]
pub(crate) const fn line_length(true_length: usize) -> usize {
    true_length - 1
}

/// Inverse of [`line_length`]; `None` if the line length is `usize::MAX`.
#[inline]
#[must_use]
pub(crate) const fn length_from_line(line_length: usize) -> Option<usize> {
    line_length.checked_add(1)
}

/// `len` bases of the target starting at `target_offset` equal the reference
/// bases starting at `reference_offset`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Match {
    target_offset: usize,
    stored_length: usize,
    reference_offset: usize,
}

impl Match {
    /// Creates a new match spanning `length` bases.
    ///
    /// # Panics
    /// This function panics if `length` is less than [`MIN_MATCH_LENGTH`].
    #[must_use]
    pub fn new(target_offset: usize, length: usize, reference_offset: usize) -> Self {
        assert!(
            length >= MIN_MATCH_LENGTH,
            "Match too short: {} bases",
            length
        );

        Self {
            target_offset,
            stored_length: stored_length(length),
            reference_offset,
        }
    }

    #[inline]
    #[must_use]
    pub fn target_offset(&self) -> usize {
        self.target_offset
    }

    #[inline]
    #[must_use]
    pub fn reference_offset(&self) -> usize {
        self.reference_offset
    }

    /// Number of bases covered by this match.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        true_length(self.stored_length)
    }

    /// Always `false`; a match covers at least [`MIN_MATCH_LENGTH`] bases.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Length in its biased, stored form.
    #[inline]
    #[must_use]
    pub fn stored_length(&self) -> usize {
        self.stored_length
    }

    #[inline]
    #[must_use]
    pub fn target_end(&self) -> usize {
        self.target_offset + self.len()
    }

    #[inline]
    #[must_use]
    pub fn reference_end(&self) -> usize {
        self.reference_offset + self.len()
    }
}

/// A single transcript instruction.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Entry {
    /// Bases copied verbatim into the target.
    Literal(Vec<u8>),
    /// Bases copied from the reference.
    Match(Match),
}

impl Entry {
    /// Number of target bases described by this entry.
    #[must_use]
    pub fn target_len(&self) -> usize {
        match self {
            Entry::Literal(text) => text.len(),
            Entry::Match(m) => m.len(),
        }
    }
}
