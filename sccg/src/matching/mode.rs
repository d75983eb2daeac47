use log::debug;

use crate::matching::Mode;

/// How the target is cut into segments in local mode and when local mode
/// gives up.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SegmentPolicy {
    /// Number of target (and reference) bases per segment window.
    pub segment_len: usize,
    /// Literal ratio at or above which a segment counts as a mismatch.
    pub mismatch_ratio: f64,
    /// Number of consecutive mismatching segments tolerated; one more
    /// switches to global mode.
    pub mismatch_streak: usize,
}

impl SegmentPolicy {
    #[must_use]
    pub const fn new(segment_len: usize, mismatch_ratio: f64, mismatch_streak: usize) -> Self {
        Self {
            segment_len,
            mismatch_ratio,
            mismatch_streak,
        }
    }

    pub const MEDIUM: SegmentPolicy = SegmentPolicy::new(10_000, 0.1, 0);
    pub const LARGE: SegmentPolicy = SegmentPolicy::new(30_000, 0.5, 4);
}

/// Target length thresholds selecting a [`SegmentPolicy`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Regimes {
    /// Targets shorter than this go straight to global mode.
    pub small_input_len: usize,
    /// Targets shorter than this (and not small) use `medium`.
    pub medium_input_len: usize,
    pub medium: SegmentPolicy,
    pub large: SegmentPolicy,
}

impl Default for Regimes {
    fn default() -> Self {
        Self {
            small_input_len: 50_000,
            medium_input_len: 5_000_000,
            medium: SegmentPolicy::MEDIUM,
            large: SegmentPolicy::LARGE,
        }
    }
}

/// Starting mode and segmenting policy chosen for a target.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ModeSettings {
    initial_mode: Mode,
    policy: Option<SegmentPolicy>,
}

impl ModeSettings {
    /// Picks the settings for a target of `len` bases.
    #[must_use]
    pub fn for_target_length(len: usize, regimes: &Regimes) -> Self {
        if len < regimes.small_input_len {
            Self::global()
        } else if len < regimes.medium_input_len {
            Self::local(regimes.medium)
        } else {
            Self::local(regimes.large)
        }
    }

    #[must_use]
    pub fn local(policy: SegmentPolicy) -> Self {
        assert!(policy.segment_len > 0, "Segment length must be positive");

        Self {
            initial_mode: Mode::Local,
            policy: Some(policy),
        }
    }

    #[must_use]
    pub fn global() -> Self {
        Self {
            initial_mode: Mode::Global,
            policy: None,
        }
    }

    #[must_use]
    pub fn initial_mode(&self) -> Mode {
        self.initial_mode
    }

    /// Segmenting policy; `None` when matching starts in global mode.
    #[must_use]
    pub fn policy(&self) -> Option<&SegmentPolicy> {
        self.policy.as_ref()
    }
}

/// Local/global state machine fed with the literal ratio of every segment.
///
/// Once in [`Mode::Global`], the controller never leaves it.
#[derive(Debug, Clone)]
pub struct ModeController {
    settings: ModeSettings,
    mode: Mode,
    streak: usize,
}

impl ModeController {
    #[must_use]
    pub fn new(settings: ModeSettings) -> Self {
        Self {
            settings,
            mode: settings.initial_mode(),
            streak: 0,
        }
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Current number of consecutive mismatching segments.
    #[must_use]
    pub fn streak(&self) -> usize {
        self.streak
    }

    /// Records the literal ratio of the segment just matched and returns the
    /// mode to continue in.
    pub fn observe(&mut self, literal_ratio: f64) -> Mode {
        let policy = match (self.mode, self.settings.policy()) {
            (Mode::Local, Some(policy)) => *policy,
            _ => {
                self.mode = Mode::Global;
                return self.mode;
            }
        };

        if literal_ratio >= policy.mismatch_ratio {
            self.streak += 1;
        } else {
            self.streak = 0;
        }

        if self.streak > policy.mismatch_streak {
            debug!(
                "{} mismatching segments in a row (ratio {:.3}), switching to global mode",
                self.streak, literal_ratio
            );
            self.mode = Mode::Global;
        }

        self.mode
    }
}
