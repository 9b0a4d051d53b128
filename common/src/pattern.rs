//! Blink pattern generation.
//!
//! The producer task calls [`PatternGenerator::next`] once per step:
//! SLOW and FAST alternate two line values at mode-dependent cadence,
//! RANDOM draws from a small fixed range.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::arbiter::BlinkMode;

/// The two alternating line values.
pub const LED_A: u32 = 0x1;
pub const LED_B: u32 = 0x2;
/// RANDOM draws from 0..RANDOM_SPAN.
pub const RANDOM_SPAN: u32 = 4;

pub const SLOW_PERIOD_MS: u32 = 1000;
pub const FAST_PERIOD_MS: u32 = 200;
pub const RANDOM_PERIOD_MS: u32 = 200;

/// One computed pattern step: the value to drive onto the output lines
/// and how long to hold it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternStep {
    pub value: u32,
    pub hold_ms: u32,
}

pub struct PatternGenerator {
    rng: SmallRng,
    last: u32,
}

impl PatternGenerator {
    pub fn new(seed: u64) -> PatternGenerator {
        PatternGenerator {
            rng: SmallRng::seed_from_u64(seed),
            last: LED_A,
        }
    }

    pub fn next(&mut self, mode: BlinkMode) -> PatternStep {
        match mode {
            BlinkMode::Slow => PatternStep {
                value: self.toggle(),
                hold_ms: SLOW_PERIOD_MS,
            },
            BlinkMode::Fast => PatternStep {
                value: self.toggle(),
                hold_ms: FAST_PERIOD_MS,
            },
            BlinkMode::Random => PatternStep {
                value: self.rng.random_range(0..RANDOM_SPAN),
                hold_ms: RANDOM_PERIOD_MS,
            },
        }
    }

    fn toggle(&mut self) -> u32 {
        self.last = if self.last == LED_A { LED_B } else { LED_A };
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slow_and_fast_alternate_two_values() {
        let mut gen = PatternGenerator::new(7);
        let a = gen.next(BlinkMode::Slow);
        let b = gen.next(BlinkMode::Fast);
        let c = gen.next(BlinkMode::Slow);
        assert_ne!(a.value, b.value);
        assert_eq!(a.value, c.value);
        assert!(a.value == LED_A || a.value == LED_B);
    }

    #[test]
    fn cadence_depends_on_mode() {
        let mut gen = PatternGenerator::new(7);
        assert_eq!(gen.next(BlinkMode::Slow).hold_ms, SLOW_PERIOD_MS);
        assert_eq!(gen.next(BlinkMode::Fast).hold_ms, FAST_PERIOD_MS);
        assert_eq!(gen.next(BlinkMode::Random).hold_ms, RANDOM_PERIOD_MS);
    }

    #[test]
    fn random_stays_in_range() {
        let mut gen = PatternGenerator::new(42);
        for _ in 0..256 {
            let step = gen.next(BlinkMode::Random);
            assert!(step.value < RANDOM_SPAN);
        }
    }

    #[test]
    fn seeded_generators_agree() {
        let mut a = PatternGenerator::new(3);
        let mut b = PatternGenerator::new(3);
        for _ in 0..32 {
            assert_eq!(a.next(BlinkMode::Random), b.next(BlinkMode::Random));
        }
    }
}
