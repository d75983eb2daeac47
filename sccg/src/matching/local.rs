use log::trace;

use crate::kmer::{kmer_code, SegmentIndex};
use crate::matching::extension_length;
use crate::transcript::{Match, Transcript};

/// Greedily describes `target` in terms of `reference`, both being windows
/// of larger sequences starting at `target_start` and `reference_start`.
///
/// Positions whose k-mer does not occur in the reference window become
/// single-base literals. Returned matches carry absolute offsets.
#[must_use]
pub fn match_segment(
    target: &[u8],
    reference: &[u8],
    target_start: usize,
    reference_start: usize,
    k: usize,
) -> Transcript {
    let index = SegmentIndex::build(reference, k);
    let mut transcript = Transcript::new();

    let mut i = 0;
    while i + k <= target.len() {
        let candidates = match kmer_code(&target[i..i + k]) {
            Some(code) => index.occurrences(code),
            None => &[],
        };

        match longest_candidate(target, reference, i, k, candidates) {
            Some((position, extension)) => {
                let length = k + extension;
                transcript.push_match(Match::new(
                    target_start + i,
                    length,
                    reference_start + position,
                ));
                i += length;
            }
            None => {
                transcript.push_literal(&target[i..=i]);
                i += 1;
            }
        }
    }

    transcript.push_literal(&target[i..]);
    transcript
}

/// Runs [`match_segment`] with `k`, and if that finds no match at all, again
/// with `fallback_k`.
#[must_use]
pub fn match_segment_with_fallback(
    target: &[u8],
    reference: &[u8],
    target_start: usize,
    reference_start: usize,
    k: usize,
    fallback_k: usize,
) -> Transcript {
    let transcript = match_segment(target, reference, target_start, reference_start, k);
    if transcript.last_match().is_some() || fallback_k == k {
        return transcript;
    }

    trace!(
        "No {}-mer match in segment at {}, retrying with k = {}",
        k,
        target_start,
        fallback_k
    );
    match_segment(target, reference, target_start, reference_start, fallback_k)
}

/// Returns the candidate with the longest extension past the seed; the first
/// one wins ties.
fn longest_candidate(
    target: &[u8],
    reference: &[u8],
    i: usize,
    k: usize,
    candidates: &[usize],
) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;

    for &position in candidates {
        let extension = extension_length(&target[i + k..], &reference[position + k..]);
        if best.map_or(true, |(_, best_extension)| extension > best_extension) {
            best = Some((position, extension));
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use crate::matching::local::{match_segment, match_segment_with_fallback};
    use crate::transcript::{Entry, Match};

    #[test]
    fn test_identical_segment() {
        let sequence = b"ACGTTGCAAGCTTAGCCGATAGGCTAACGT";
        let transcript = match_segment(sequence, sequence, 0, 0, 21);

        assert_eq!(
            transcript.entries(),
            &[Entry::Match(Match::new(0, sequence.len(), 0))]
        );
    }

    #[test]
    fn test_absolute_offsets() {
        let reference = b"TTTTTGATTACAGATTACA";
        let target = b"CCGATTACAGA";
        let transcript = match_segment(target, reference, 1000, 500, 5);

        assert_eq!(
            transcript.entries(),
            &[
                Entry::Literal(b"CC".to_vec()),
                Entry::Match(Match::new(1002, 9, 505)),
            ]
        );
    }

    #[test]
    fn test_first_candidate_wins_ties() {
        let reference = b"ACGTAGGACGTACC";
        let target = b"ACGTA";
        let transcript = match_segment(target, reference, 0, 0, 4);

        assert_eq!(transcript.entries(), &[Entry::Match(Match::new(0, 5, 0))]);
    }

    #[test]
    fn test_longest_candidate_wins() {
        let reference = b"ACGTTTTTACGTAAAA";
        let target = b"ACGTAAAA";
        let transcript = match_segment(target, reference, 0, 0, 4);

        assert_eq!(transcript.entries(), &[Entry::Match(Match::new(0, 8, 8))]);
    }

    #[test]
    fn test_short_tail_is_literal() {
        let reference = b"ACGTACGTAC";
        let target = b"GGGGGGG";
        let transcript = match_segment(target, reference, 0, 0, 5);

        assert_eq!(transcript.entries(), &[Entry::Literal(target.to_vec())]);
        assert_eq!(transcript.literal_bases(), target.len());
    }

    #[test]
    fn test_target_shorter_than_k() {
        let transcript = match_segment(b"ACG", b"ACGACG", 0, 0, 21);

        assert_eq!(transcript.entries(), &[Entry::Literal(b"ACG".to_vec())]);
        assert!(match_segment(b"", b"ACGT", 0, 0, 21).is_empty());
    }

    #[test]
    fn test_fallback_to_shorter_kmer() {
        let reference = b"GATTACAGATTACTTTTTTTTTTTTTTTTTTTTT";
        let target = b"CCCCCCCCGATTACAGATTACCCCCCCCCCCCCCC";

        assert_eq!(match_segment(target, reference, 0, 0, 21).last_match(), None);

        let transcript = match_segment_with_fallback(target, reference, 0, 0, 21, 11);
        assert_eq!(transcript.last_match(), Some(Match::new(8, 13, 0)));
        assert_eq!(transcript.literal_bases(), target.len() - 13);
    }
}
