//! Frame-stamped memoization cell
//!
//! Holds a value derived from mutable upstream state, recomputed at most once
//! per stamp. The stamp pairs the scenario frame with the orchestrator's
//! invalidation epoch, so a tick or subscription change inside one frame
//! still forces a recompute.

use crate::core::types::Frame;

/// Logical clock a memoized value is valid for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Stamp {
    pub frame: Frame,
    pub epoch: u64,
}

impl Stamp {
    pub fn new(frame: Frame, epoch: u64) -> Self {
        Self { frame, epoch }
    }
}

/// `{stamp, value}` cell
#[derive(Debug, Clone, Default)]
pub struct FrameMemo<T> {
    stamp: Option<Stamp>,
    value: T,
}

impl<T> FrameMemo<T> {
    /// Cached value if it was computed for `stamp`
    #[inline]
    pub fn get(&self, stamp: Stamp) -> Option<&T> {
        match self.stamp {
            Some(s) if s == stamp => Some(&self.value),
            _ => None,
        }
    }

    #[inline]
    pub fn is_fresh(&self, stamp: Stamp) -> bool {
        self.stamp == Some(stamp)
    }

    pub fn store(&mut self, stamp: Stamp, value: T) -> &T {
        self.stamp = Some(stamp);
        self.value = value;
        &self.value
    }

    /// Return the cached value, computing it first when stale
    pub fn get_or_compute(&mut self, stamp: Stamp, compute: impl FnOnce() -> T) -> &T {
        if !self.is_fresh(stamp) {
            self.value = compute();
            self.stamp = Some(stamp);
        }
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_computes_once_per_stamp() {
        let mut memo: FrameMemo<u32> = FrameMemo::default();
        let mut calls = 0;
        let stamp = Stamp::new(3, 0);

        for _ in 0..3 {
            let v = *memo.get_or_compute(stamp, || {
                calls += 1;
                42
            });
            assert_eq!(v, 42);
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_new_frame_or_epoch_is_stale() {
        let mut memo: FrameMemo<u32> = FrameMemo::default();
        memo.store(Stamp::new(1, 0), 5);

        assert_eq!(memo.get(Stamp::new(1, 0)), Some(&5));
        assert_eq!(memo.get(Stamp::new(2, 0)), None);
        assert_eq!(memo.get(Stamp::new(1, 1)), None);

        // Recomputed for the new stamp, then cached again
        assert_eq!(*memo.get_or_compute(Stamp::new(1, 1), || 9), 9);
        assert_eq!(memo.get(Stamp::new(1, 1)), Some(&9));
        assert_eq!(memo.get(Stamp::new(1, 0)), None);
    }
}
