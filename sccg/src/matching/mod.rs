//! Describing a target sequence as a list of matches against a reference.
//!
//! Matching starts in [`Mode::Local`], where the target and the reference are
//! walked in lockstep, segment by segment, each segment pair getting its own
//! small index. When too many segments in a row are mostly literal text, the
//! rest of the target is handed over to [`Mode::Global`], which indexes the
//! whole reference once.

use std::fmt::{Display, Formatter};

use log::{debug, info};

use crate::matching::global::GlobalMatcher;
use crate::matching::local::match_segment_with_fallback;
use crate::matching::mode::{ModeController, ModeSettings, Regimes};
use crate::progress::{ByteNum, ProgressNotifier};
use crate::transcript::Transcript;

pub mod global;
pub mod local;
pub mod mode;

/// Length of the k-mers indexed in the reference. Targets shorter than this
/// never produce a match and are written as a single literal.
pub const DEFAULT_KMER_LENGTH: usize = 21;
pub const DEFAULT_FALLBACK_KMER_LENGTH: usize = 11;
pub const DEFAULT_GLOBAL_SEARCH_LIMIT: usize = 100;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Mode {
    Local,
    Global,
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Local => write!(f, "local"),
            Mode::Global => write!(f, "global"),
        }
    }
}

/// Number of leading bytes `a` and `b` have in common.
#[inline]
#[must_use]
pub(crate) fn extension_length(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MatchingParams {
    pub kmer_length: usize,
    pub fallback_kmer_length: usize,
    pub global_search_limit: usize,
    pub regimes: Regimes,
}

impl Default for MatchingParams {
    fn default() -> Self {
        Self {
            kmer_length: DEFAULT_KMER_LENGTH,
            fallback_kmer_length: DEFAULT_FALLBACK_KMER_LENGTH,
            global_search_limit: DEFAULT_GLOBAL_SEARCH_LIMIT,
            regimes: Regimes::default(),
        }
    }
}

/// Result of [`run_matching`].
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub transcript: Transcript,
    /// Mode the matching finished in.
    pub final_mode: Mode,
    /// Target offset global matching started at, if it ran at all.
    pub switch_point: Option<usize>,
    /// Number of segments kept from local mode.
    pub local_segments: usize,
}

/// Matches the N-free `target` against the N-free `reference`.
pub fn run_matching(
    target: &[u8],
    reference: &[u8],
    params: &MatchingParams,
    progress: &dyn ProgressNotifier,
) -> MatchOutcome {
    let settings = ModeSettings::for_target_length(target.len(), &params.regimes);
    let mut controller = ModeController::new(settings);
    progress.set_total_bases(ByteNum::new(target.len()));
    progress.mode_changed(controller.mode());
    info!(
        "Matching {} target bases against {} reference bases, starting in {} mode",
        target.len(),
        reference.len(),
        controller.mode()
    );

    let mut transcript = Transcript::new();
    let mut local_segments = 0;
    let mut target_pos = 0;
    let mut reference_pos = 0;

    if let Some(policy) = settings.policy() {
        while target_pos < target.len() {
            let target_end = target.len().min(target_pos + policy.segment_len);
            let reference_end = reference.len().min(reference_pos + policy.segment_len);
            let is_last = target_end == target.len() || reference_end == reference.len();

            let mut segment = match_segment_with_fallback(
                &target[target_pos..target_end],
                &reference[reference_pos..reference_end],
                target_pos,
                reference_pos,
                params.kmer_length,
                params.fallback_kmer_length,
            );
            let window_len = target_end - target_pos;
            let literal_ratio = segment.literal_bases() as f64 / window_len as f64;
            debug!(
                "Segment {}..{} against {}..{}: {} entries, literal ratio {:.3}",
                target_pos,
                target_end,
                reference_pos,
                reference_end,
                segment.len(),
                literal_ratio
            );

            if controller.observe(literal_ratio) == Mode::Global {
                break;
            }

            let (next_target, next_reference) = if is_last {
                (target_end, reference_end)
            } else if segment.truncate_after_last_match() {
                let last = segment
                    .last_match()
                    .map(|m| (m.target_end(), m.reference_end()));
                last.unwrap_or((target_end, reference_end))
            } else {
                (target_end, reference_end)
            };

            transcript.append(segment);
            local_segments += 1;
            progress.processed_bases(ByteNum::new(next_target - target_pos));
            target_pos = next_target;
            reference_pos = next_reference;

            if is_last {
                break;
            }
        }
    }

    let mut switch_point = None;
    if controller.mode() == Mode::Global {
        if settings.initial_mode() == Mode::Local {
            progress.mode_changed(Mode::Global);
        }
        info!(
            "Global matching from target offset {} ({} local segments kept)",
            target_pos, local_segments
        );

        let matcher = GlobalMatcher::new(reference, params.kmer_length, params.global_search_limit);
        let global = matcher.match_target(target, target_pos, transcript.last_match(), progress);
        transcript.append(global);
        switch_point = Some(target_pos);
    } else if target_pos < target.len() {
        debug!(
            "Reference exhausted, {} target bases left as literal",
            target.len() - target_pos
        );
        transcript.push_literal(&target[target_pos..]);
        progress.processed_bases(ByteNum::new(target.len() - target_pos));
    }

    MatchOutcome {
        transcript,
        final_mode: controller.mode(),
        switch_point,
        local_segments,
    }
}
