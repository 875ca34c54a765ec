//! One-way and toggling boolean latches.

use std::sync::atomic::{AtomicBool, Ordering};

/// An atomic flag whose transitions report whether the caller won them.
///
/// Only the caller that observes `true` from [`Latch::set`] may perform the
/// side effect guarded by the latch.
#[derive(Debug, Default)]
pub struct Latch(AtomicBool);

impl Latch {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Flip false -> true. Returns `true` for the single caller that did it.
    #[inline]
    pub fn set(&self) -> bool {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Flip true -> false. Returns `true` if the latch was set.
    #[inline]
    pub fn clear(&self) -> bool {
        self.0
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn set_wins_once() {
        let latch = Latch::new();
        assert!(latch.set());
        assert!(!latch.set());
        assert!(latch.is_set());
    }

    #[test]
    fn clear_then_set_again() {
        let latch = Latch::new();
        assert!(!latch.clear());
        latch.set();
        assert!(latch.clear());
        assert!(!latch.is_set());
        assert!(latch.set());
    }

    #[test]
    fn exactly_one_winner_across_threads() {
        let latch = Arc::new(Latch::new());
        let winners: usize = (0..8)
            .map(|_| {
                let latch = Arc::clone(&latch);
                std::thread::spawn(move || latch.set())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap() as usize)
            .sum();
        assert_eq!(winners, 1);
    }
}
