//! Winning-number sources

use crate::games::wheel::POCKET_COUNT;
use rand::Rng;
use rand_core::OsRng;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Source of winning numbers
pub trait SpinSource: Send + Sync {
    /// Draw a pocket in `0..=36`
    fn draw(&self) -> u8;
}

/// Draws from the operating system CSPRNG.
///
/// `gen_range` uses rejection sampling so each of the 37 pockets is equally
/// likely.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRngSource;

impl SpinSource for OsRngSource {
    fn draw(&self) -> u8 {
        OsRng.gen_range(0..POCKET_COUNT as u8)
    }
}

/// Replays a fixed sequence of pockets, cycling when exhausted
#[derive(Debug)]
pub struct FixedSource {
    sequence: Vec<u8>,
    cursor: AtomicUsize,
}

impl FixedSource {
    pub fn new(sequence: Vec<u8>) -> Self {
        assert!(!sequence.is_empty(), "FixedSource needs at least one pocket");
        Self {
            sequence,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn always(number: u8) -> Self {
        Self::new(vec![number])
    }

    /// Number of draws made so far
    pub fn draws(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }
}

impl SpinSource for FixedSource {
    fn draw(&self) -> u8 {
        let i = self.cursor.fetch_add(1, Ordering::SeqCst);
        self.sequence[i % self.sequence.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::wheel::MAX_NUMBER;

    #[test]
    fn test_os_rng_stays_in_range() {
        let source = OsRngSource;
        for _ in 0..10_000 {
            assert!(source.draw() <= MAX_NUMBER);
        }
    }

    #[test]
    fn test_os_rng_hits_every_pocket() {
        let source = OsRngSource;
        let mut seen = [false; POCKET_COUNT];
        for _ in 0..20_000 {
            seen[source.draw() as usize] = true;
        }
        assert!(seen.iter().all(|hit| *hit));
    }

    #[test]
    fn test_fixed_source_cycles() {
        let source = FixedSource::new(vec![7, 0]);
        assert_eq!(source.draw(), 7);
        assert_eq!(source.draw(), 0);
        assert_eq!(source.draw(), 7);
        assert_eq!(source.draws(), 3);
    }
}
