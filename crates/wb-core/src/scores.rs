//! Pluggable numeric source for every randomized score.
//!
//! Any `rand::Rng` is a `ScoreSource`, so production code passes a
//! `SmallRng` and tests either seed one or supply a fixed sequence.

use rand::Rng;

/// Uniform draws over a closed interval.
pub trait ScoreSource {
    /// Sample a value in `[low, high]`. Callers guarantee `low <= high`.
    fn uniform(&mut self, low: f64, high: f64) -> f64;
}

impl<R: Rng> ScoreSource for R {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        self.random_range(low..=high)
    }
}

/// Replays a fixed list of unit-interval fractions, cycling when exhausted.
/// Each fraction `t` maps to `low + t * (high - low)`.
#[derive(Clone, Debug)]
pub struct SequenceSource {
    fractions: Vec<f64>,
    cursor: usize,
}

impl SequenceSource {
    pub fn new(fractions: Vec<f64>) -> Self {
        Self {
            fractions,
            cursor: 0,
        }
    }

    /// Always yields the midpoint of the requested range.
    pub fn midpoint() -> Self {
        Self::new(vec![0.5])
    }
}

impl ScoreSource for SequenceSource {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        let t = if self.fractions.is_empty() {
            0.5
        } else {
            let t = self.fractions[self.cursor % self.fractions.len()];
            self.cursor += 1;
            t.clamp(0.0, 1.0)
        };
        low + t * (high - low)
    }
}
