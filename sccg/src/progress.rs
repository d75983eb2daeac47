use std::fmt::Debug;

use derive_more::{Add, AddAssign};

use crate::matching::Mode;

/// Number of bytes, used to report how much of the target has been described.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Add, AddAssign)]
#[repr(transparent)]
pub struct ByteNum(usize);

impl ByteNum {
    pub const ZERO: ByteNum = ByteNum(0);

    #[inline]
    #[must_use]
    pub const fn new(bytes: usize) -> Self {
        Self(bytes)
    }

    #[inline]
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }
}

/// Receives progress updates while a target is being matched against its
/// reference.
pub trait ProgressNotifier: Debug + Send + Sync {
    /// Called once before matching starts with the number of target bases.
    fn set_total_bases(&self, total: ByteNum);

    /// Called every time another stretch of the target has been described.
    fn processed_bases(&self, bases: ByteNum);

    /// Called when the matcher enters a new mode.
    fn mode_changed(&self, mode: Mode);
}

impl<T: ProgressNotifier> ProgressNotifier for &T {
    fn set_total_bases(&self, total: ByteNum) {
        T::set_total_bases(self, total)
    }

    fn processed_bases(&self, bases: ByteNum) {
        T::processed_bases(self, bases)
    }

    fn mode_changed(&self, mode: Mode) {
        T::mode_changed(self, mode)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct DummyProgressNotifier;

impl ProgressNotifier for DummyProgressNotifier {
    fn set_total_bases(&self, _total: ByteNum) {
        // do nothing
    }

    fn processed_bases(&self, _bases: ByteNum) {
        // do nothing
    }

    fn mode_changed(&self, _mode: Mode) {
        // do nothing
    }
}

#[cfg(test)]
mod tests {
    use crate::matching::Mode;
    use crate::progress::{ByteNum, DummyProgressNotifier, ProgressNotifier};

    #[test]
    fn test_byte_num_arithmetic() {
        let mut bytes = ByteNum::new(10) + ByteNum::new(5);
        bytes += ByteNum::new(1);

        assert_eq!(bytes.get(), 16);
        assert!(ByteNum::ZERO < bytes);
    }

    #[test]
    fn test_dummy_progress_notifier() {
        let notifier = DummyProgressNotifier;
        notifier.set_total_bases(ByteNum::new(1337));
        notifier.processed_bases(ByteNum::new(666));
        (&notifier).mode_changed(Mode::Global);
    }
}
