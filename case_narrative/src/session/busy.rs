//! The run-wide busy flag.

use std::sync::atomic::{AtomicBool, Ordering};

/// Holds the busy flag for the duration of one command. Clears it on drop.
#[derive(Debug)]
pub(crate) struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    /// Set the flag, or return `None` if it is already set.
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusive_until_dropped() {
        let flag = AtomicBool::new(false);

        let guard = BusyGuard::acquire(&flag);
        assert!(guard.is_some());
        assert!(BusyGuard::acquire(&flag).is_none());

        drop(guard);
        assert!(!flag.load(Ordering::Acquire));
        assert!(BusyGuard::acquire(&flag).is_some());
    }
}
