use log::{debug, trace};

use crate::kmer::{kmer_code, ChainedIndex};
use crate::matching::extension_length;
use crate::progress::{ByteNum, ProgressNotifier};
use crate::transcript::{Match, Transcript};

/// Number of target bases between two progress notifications.
const PROGRESS_STEP: usize = 1 << 20;

/// Matches the whole reference against a target.
///
/// Candidates for every target k-mer are first looked up close to the
/// diagonal predicted by the previous match, and only if there are none
/// there, in the whole reference.
#[derive(Debug)]
pub struct GlobalMatcher<'a> {
    reference: &'a [u8],
    index: ChainedIndex,
    search_limit: usize,
}

impl<'a> GlobalMatcher<'a> {
    /// Indexes `reference` with `k`-mers.
    #[must_use]
    pub fn new(reference: &'a [u8], k: usize, search_limit: usize) -> Self {
        let index = ChainedIndex::build(reference, k);
        debug!(
            "Indexed {} distinct {}-mers of the reference",
            index.len(),
            k
        );

        Self {
            reference,
            index,
            search_limit,
        }
    }

    /// Finds matches for `target[start..]`.
    ///
    /// `previous` is the last match already accepted for `target[..start]`,
    /// if any. The returned transcript holds matches only; the bases between
    /// them are left for the transcript writer to recover.
    pub fn match_target(
        &self,
        target: &[u8],
        start: usize,
        previous: Option<Match>,
        progress: &dyn ProgressNotifier,
    ) -> Transcript {
        let k = self.index.k();
        let mut transcript = Transcript::new();
        let mut previous = previous;
        let mut reported = start;

        let mut i = start;
        while i + k <= target.len() {
            let code = match kmer_code(&target[i..i + k]) {
                Some(code) if self.index.contains(code) => code,
                _ => {
                    i += 1;
                    continue;
                }
            };

            let windowed = previous.and_then(|m| self.search_window(target, i, code, m));
            let best = windowed.or_else(|| {
                trace!("No candidate near the diagonal at {}", i);
                self.search_all(target, i, code)
            });

            match best {
                Some((position, extension)) => {
                    let m = Match::new(i, k + extension, position);
                    transcript.push_match(m);
                    previous = Some(m);
                    i = m.target_end();
                }
                None => i += 1,
            }

            if i - reported >= PROGRESS_STEP {
                progress.processed_bases(ByteNum::new(i - reported));
                reported = i;
            }
        }

        progress.processed_bases(ByteNum::new(target.len().saturating_sub(reported)));
        transcript
    }

    /// Candidates within `search_limit` of the reference end of `previous`.
    fn search_window(
        &self,
        target: &[u8],
        i: usize,
        code: u64,
        previous: Match,
    ) -> Option<(usize, usize)> {
        let predicted = previous.reference_end();
        let low = predicted.saturating_sub(self.search_limit);
        let high = predicted.saturating_add(self.search_limit);

        let candidates = self
            .index
            .occurrences(code)
            .skip_while(|&position| position > high)
            .take_while(|&position| position >= low);
        self.longest_extension(target, i, candidates)
    }

    fn search_all(&self, target: &[u8], i: usize, code: u64) -> Option<(usize, usize)> {
        self.longest_extension(target, i, self.index.occurrences(code))
    }

    /// Returns the candidate with the longest extension past the seed. The
    /// candidates come in decreasing order, so on ties the later (smaller)
    /// position replaces the earlier one.
    fn longest_extension<I>(&self, target: &[u8], i: usize, candidates: I) -> Option<(usize, usize)>
    where
        I: Iterator<Item = usize>,
    {
        let k = self.index.k();
        let mut best: Option<(usize, usize)> = None;

        for position in candidates {
            let extension = extension_length(&target[i + k..], &self.reference[position + k..]);
            if best.map_or(true, |(_, best_extension)| extension >= best_extension) {
                best = Some((position, extension));
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use crate::matching::global::GlobalMatcher;
    use crate::progress::DummyProgressNotifier;
    use crate::transcript::{Entry, Match};

    fn matches(reference: &[u8], target: &[u8], k: usize, limit: usize) -> Vec<Match> {
        GlobalMatcher::new(reference, k, limit)
            .match_target(target, 0, None, &DummyProgressNotifier)
            .matches()
            .copied()
            .collect()
    }

    #[test]
    fn test_identical_sequence() {
        let sequence = b"ACGGTCATTGACCATGCAGTTACGGATCAGT";

        assert_eq!(
            matches(sequence, sequence, 5, 100),
            vec![Match::new(0, sequence.len(), 0)]
        );
    }

    #[test]
    fn test_no_literals_emitted() {
        let reference = b"ACGGTCATTGACCATG";
        let target = b"TTTTTACGGTCATTGACCATGTTTTT";
        let transcript = GlobalMatcher::new(reference, 5, 100).match_target(
            target,
            0,
            None,
            &DummyProgressNotifier,
        );

        assert_eq!(
            transcript.entries(),
            &[Entry::Match(Match::new(5, 16, 0))]
        );
    }

    #[test]
    fn test_ties_prefer_smallest_position() {
        let reference = b"GATTACAGGGGATTACAGGGGATTACA";
        let target = b"GATTACA";

        assert_eq!(matches(reference, target, 4, 100), vec![Match::new(0, 7, 0)]);
    }

    #[test]
    fn test_window_preferred_over_longer_distant_match() {
        let mut reference = b"TGCATGCAAGTCCGTACAG".to_vec();
        reference.extend_from_slice(&[b'G'; 300]);
        reference.extend_from_slice(b"CCGTACATTTAG");
        let target = b"TGCATGCAAGTACCGTACATTTAG";

        let found = matches(&reference, target, 5, 100);
        assert_eq!(found[0], Match::new(0, 11, 0));
        assert_eq!(found[1], Match::new(12, 7, 11));

        let unrestricted: Vec<Match> = GlobalMatcher::new(&reference, 5, 100)
            .match_target(target, 12, None, &DummyProgressNotifier)
            .matches()
            .copied()
            .collect();
        assert_eq!(unrestricted[0], Match::new(12, 12, 319));
    }

    #[test]
    fn test_falls_back_to_unrestricted_search() {
        let mut reference = b"CCGTACATTTAG".to_vec();
        reference.extend_from_slice(&[b'G'; 300]);
        reference.extend_from_slice(b"TGCATGCAAGT");
        let target = b"TGCATGCAAGTCCGTACATTTAG";

        assert_eq!(
            matches(&reference, target, 5, 100),
            vec![Match::new(0, 11, 312), Match::new(11, 12, 0)]
        );
    }

    #[test]
    fn test_starts_at_cursor() {
        let sequence = b"ACGGTCATTGACCATGCAGTTACGGATCAGT";
        let transcript = GlobalMatcher::new(sequence, 5, 100).match_target(
            sequence,
            10,
            Some(Match::new(0, 10, 0)),
            &DummyProgressNotifier,
        );

        assert_eq!(
            transcript.entries(),
            &[Entry::Match(Match::new(10, sequence.len() - 10, 10))]
        );
    }
}
