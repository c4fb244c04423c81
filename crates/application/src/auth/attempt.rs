//! Single-flight guard and sign-out epoch.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// RAII marker for the one login attempt allowed at a time.
///
/// The flag is cleared when the guard drops, including on early return.
#[derive(Debug)]
pub struct AttemptGuard {
    flag: Arc<AtomicBool>,
}

impl AttemptGuard {
    /// Tries to claim the flag. Returns `None` if an attempt is pending.
    #[must_use]
    pub fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for AttemptGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Counter bumped on every sign-out.
///
/// A login attempt snapshots the epoch once the provider step completes;
/// if it differs when the attempt resolves, a sign-out raced the attempt
/// and its result is stale.
#[derive(Debug, Clone, Default)]
pub struct SessionEpoch(Arc<AtomicU64>);

impl SessionEpoch {
    /// Creates a new epoch at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current epoch value.
    #[must_use]
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Advances the epoch, returning the new value.
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_is_exclusive() {
        let flag = Arc::new(AtomicBool::new(false));

        let guard = AttemptGuard::acquire(&flag);
        assert!(guard.is_some());
        assert!(AttemptGuard::acquire(&flag).is_none());

        drop(guard);
        assert!(AttemptGuard::acquire(&flag).is_some());
    }

    #[test]
    fn test_epoch_shared_between_clones() {
        let epoch = SessionEpoch::new();
        let other = epoch.clone();
        assert_eq!(epoch.current(), 0);

        assert_eq!(other.advance(), 1);
        assert_eq!(epoch.current(), 1);
    }
}
