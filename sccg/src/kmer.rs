//! K-mer indexes over reference sequences.
//!
//! K-mers are packed two bits per base into a `u64`, so two windows share a
//! code only if they are equal. Windows touching a symbol other than
//! `A`/`C`/`G`/`T` are never indexed; when the scan meets a run of ambiguous
//! bases it jumps over the whole run at once.

use rustc_hash::FxHashMap;

use crate::sequence::AMBIGUOUS_BASE;

/// Longest k-mer that fits in a packed code.
pub const MAX_KMER_LENGTH: usize = 32;

const NO_OCCURRENCE: usize = usize::MAX;

#[inline]
fn base_code(base: u8) -> Option<u64> {
    match base {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' => Some(3),
        _ => None,
    }
}

#[inline]
fn kmer_mask(k: usize) -> u64 {
    if k >= MAX_KMER_LENGTH {
        u64::MAX
    } else {
        (1 << (2 * k)) - 1
    }
}

fn check_kmer_length(k: usize) {
    assert!(
        (1..=MAX_KMER_LENGTH).contains(&k),
        "Invalid k-mer length: {}",
        k
    );
}

/// Returns the packed code of `window`, or `None` if it contains a symbol
/// other than `A`/`C`/`G`/`T`.
///
/// # Examples
/// ```
/// use sccg::kmer::kmer_code;
///
/// assert_eq!(kmer_code(b"ACGT"), Some(0b00_01_10_11));
/// assert_eq!(kmer_code(b"ACNT"), None);
/// ```
#[must_use]
pub fn kmer_code(window: &[u8]) -> Option<u64> {
    debug_assert!(window.len() <= MAX_KMER_LENGTH);

    window
        .iter()
        .try_fold(0u64, |code, &base| Some((code << 2) | base_code(base)?))
}

/// Rolling iterator over `(position, code)` of every indexable window.
#[derive(Debug, Clone)]
pub(crate) struct KmerIter<'a> {
    sequence: &'a [u8],
    k: usize,
    mask: u64,
    position: usize,
    code: u64,
    valid: usize,
}

impl<'a> KmerIter<'a> {
    pub fn new(sequence: &'a [u8], k: usize) -> Self {
        check_kmer_length(k);

        Self {
            sequence,
            k,
            mask: kmer_mask(k),
            position: 0,
            code: 0,
            valid: 0,
        }
    }
}

impl<'a> Iterator for KmerIter<'a> {
    type Item = (usize, u64);

    fn next(&mut self) -> Option<Self::Item> {
        while self.position < self.sequence.len() {
            let base = self.sequence[self.position];
            self.position += 1;

            match base_code(base) {
                Some(code) => {
                    self.code = ((self.code << 2) | code) & self.mask;
                    self.valid += 1;
                    if self.valid >= self.k {
                        return Some((self.position - self.k, self.code));
                    }
                }
                None => {
                    self.valid = 0;
                    if base == AMBIGUOUS_BASE {
                        while self.sequence.get(self.position) == Some(&AMBIGUOUS_BASE) {
                            self.position += 1;
                        }
                    }
                }
            }
        }

        None
    }
}

/// Index of a reference segment: k-mer code to the list of its start
/// positions, in increasing order.
#[derive(Debug, Clone)]
pub struct SegmentIndex {
    k: usize,
    positions: FxHashMap<u64, Vec<usize>>,
}

impl SegmentIndex {
    /// Indexes every k-mer of `sequence`.
    ///
    /// # Panics
    /// This function panics if `k` is not in `1..=MAX_KMER_LENGTH`.
    #[must_use]
    pub fn build(sequence: &[u8], k: usize) -> Self {
        let mut positions: FxHashMap<u64, Vec<usize>> = FxHashMap::default();
        for (position, code) in KmerIter::new(sequence, k) {
            positions.entry(code).or_default().push(position);
        }

        Self { k, positions }
    }

    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of distinct k-mers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Start positions of the k-mer with given code; empty if it does not
    /// occur.
    #[must_use]
    pub fn occurrences(&self, code: u64) -> &[usize] {
        self.positions
            .get(&code)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Index of a whole reference: k-mer code to its most recent start position,
/// plus a link from every position to the previous occurrence of the same
/// k-mer.
#[derive(Debug, Clone)]
pub struct ChainedIndex {
    k: usize,
    heads: FxHashMap<u64, usize>,
    previous: Vec<usize>,
}

impl ChainedIndex {
    /// Indexes every k-mer of `sequence`.
    ///
    /// # Panics
    /// This function panics if `k` is not in `1..=MAX_KMER_LENGTH`.
    #[must_use]
    pub fn build(sequence: &[u8], k: usize) -> Self {
        let mut heads: FxHashMap<u64, usize> = FxHashMap::default();
        let mut previous = vec![NO_OCCURRENCE; sequence.len()];

        for (position, code) in KmerIter::new(sequence, k) {
            if let Some(head) = heads.insert(code, position) {
                previous[position] = head;
            }
        }

        Self { k, heads, previous }
    }

    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of distinct k-mers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heads.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heads.is_empty()
    }

    #[must_use]
    pub fn contains(&self, code: u64) -> bool {
        self.heads.contains_key(&code)
    }

    /// Start positions of the k-mer with given code, newest (largest) first.
    #[must_use]
    pub fn occurrences(&self, code: u64) -> ChainIter<'_> {
        ChainIter {
            previous: &self.previous,
            next: self.heads.get(&code).copied().unwrap_or(NO_OCCURRENCE),
        }
    }
}

/// Iterator over a chain of [`ChainedIndex`] occurrences.
#[derive(Debug, Clone)]
pub struct ChainIter<'a> {
    previous: &'a [usize],
    next: usize,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == NO_OCCURRENCE {
            return None;
        }

        let position = self.next;
        self.next = self.previous[position];
        Some(position)
    }
}
