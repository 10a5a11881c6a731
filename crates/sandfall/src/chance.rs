//! Weighted coin flips.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of independent weighted coin flips.
pub trait Chance {
    /// `true` with the given probability. Anything above 1 always succeeds,
    /// anything at or below 0 always fails.
    fn coin_flip(&mut self, probability: f64) -> bool;
}

/// Draws a uniform value in `[0, 1)` per flip.
#[derive(Debug, Clone)]
pub struct RandomChance<R = ChaCha8Rng> {
    rng: R,
}

impl RandomChance {
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomChance<R> {
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Chance for RandomChance<R> {
    fn coin_flip(&mut self, probability: f64) -> bool {
        self.rng.gen::<f64>() < probability
    }
}

impl<C: Chance + ?Sized> Chance for &mut C {
    fn coin_flip(&mut self, probability: f64) -> bool {
        (**self).coin_flip(probability)
    }
}

/// Replays a fixed list of outcomes and records the probabilities asked for.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct ScriptedChance {
    script: std::collections::VecDeque<bool>,
    asked: Vec<f64>,
}

#[cfg(test)]
impl ScriptedChance {
    pub(crate) fn new(script: impl IntoIterator<Item = bool>) -> Self {
        Self {
            script: script.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.script.len()
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.script.is_empty()
    }

    pub(crate) fn probabilities(&self) -> &[f64] {
        &self.asked
    }
}

#[cfg(test)]
impl Chance for ScriptedChance {
    fn coin_flip(&mut self, probability: f64) -> bool {
        self.asked.push(probability);
        self.script.pop_front().expect("scripted chance ran out of flips")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn certain_and_impossible() {
        let mut chance = RandomChance::seeded(7);
        for _ in 0..1000 {
            assert!(chance.coin_flip(1.0));
            assert!(chance.coin_flip(3.5));
            assert!(!chance.coin_flip(0.0));
            assert!(!chance.coin_flip(-2.0));
        }
    }

    #[test]
    fn same_seed_same_flips() {
        let mut a = RandomChance::seeded(42);
        let mut b = RandomChance::seeded(42);
        let flips_a: Vec<bool> = (0..256).map(|_| a.coin_flip(0.5)).collect();
        let flips_b: Vec<bool> = (0..256).map(|_| b.coin_flip(0.5)).collect();
        assert_eq!(flips_a, flips_b);
    }

    #[test]
    fn forwards_through_mut_ref() {
        fn flip_twice(mut chance: impl Chance) -> (bool, bool) {
            (chance.coin_flip(0.3), chance.coin_flip(0.3))
        }
        let mut inner = ScriptedChance::new([true, false]);
        assert_eq!(flip_twice(&mut inner), (true, false));
        assert!(inner.is_exhausted());
    }

    // Property: the observed success rate tracks the requested probability.
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]
        #[test]
        fn prop_success_rate_tracks_probability(seed in any::<u64>(), p in 0.05f64..0.95) {
            let mut chance = RandomChance::seeded(seed);
            let n = 20_000u32;
            let hits = (0..n).fold(0u32, |hits, _| hits + u32::from(chance.coin_flip(p)));
            let rate = f64::from(hits) / f64::from(n);
            prop_assert!((rate - p).abs() < 0.03, "rate {} for p {}", rate, p);
        }
    }
}
