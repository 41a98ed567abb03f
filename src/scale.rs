//! Scale sequences: the input lengths (or value ranges) a benchmark steps through.
//!
//! A [`ScaleSequence`] spaces `samples` integer values between a lower and an upper
//! bound, either linearly or geometrically:
//!
//! ```text
//! linear:    step  = max(1, floor((hi - lo) / samples))   value_i = lo + i * step
//! geometric: ratio = exp(ln(hi / lo) / samples)           value_i = floor(lo * ratio^i)
//! ```
//!
//! The upper bound itself is never emitted (the last value is one step short of it).
//! When a geometric step would not advance past the previous value (tiny ranges, or
//! `hi == lo`) the value is bumped by one instead, so the sequence never stalls.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How consecutive scale values are spaced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Scaling {
    /// Constant additive step.
    Linear,
    /// Constant multiplicative step.
    #[default]
    Geometric,
}

impl Scaling {
    /// Tag used in result file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scaling::Linear => "linear",
            Scaling::Geometric => "exponential",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "linear" => Some(Scaling::Linear),
            "exponential" | "geometric" => Some(Scaling::Geometric),
            _ => None,
        }
    }
}

/// A finite, restartable sequence of `samples` values in `[lo, hi)`.
///
/// Preconditions (`samples >= 1`, `0 < lo <= hi`) are checked by callers; see
/// [`crate::harness::RunConfig::validate`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleSequence {
    samples: usize,
    lo: u64,
    hi: u64,
    scaling: Scaling,
}

impl ScaleSequence {
    pub fn new(samples: usize, lo: u64, hi: u64, scaling: Scaling) -> Self {
        debug_assert!(lo > 0, "scale lower bound must be positive");
        debug_assert!(hi >= lo, "scale upper bound below lower bound");
        Self {
            samples,
            lo,
            hi,
            scaling,
        }
    }

    pub fn linear(samples: usize, lo: u64, hi: u64) -> Self {
        Self::new(samples, lo, hi, Scaling::Linear)
    }

    pub fn geometric(samples: usize, lo: u64, hi: u64) -> Self {
        Self::new(samples, lo, hi, Scaling::Geometric)
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn scaling(&self) -> Scaling {
        self.scaling
    }

    pub fn bounds(&self) -> (u64, u64) {
        (self.lo, self.hi)
    }

    /// Additive step for linear sequences (always at least 1).
    pub fn step(&self) -> u64 {
        let denom = self.samples.max(1) as u64;
        (self.hi.saturating_sub(self.lo) / denom).max(1)
    }

    /// Multiplicative step for geometric sequences.
    pub fn ratio(&self) -> f64 {
        let denom = self.samples.max(1) as f64;
        ((self.hi as f64 / self.lo as f64).ln() / denom).exp()
    }

    /// Start a fresh pass over the sequence.
    pub fn iter(&self) -> ScaleIter {
        let increment = match self.scaling {
            Scaling::Linear => Increment::Step(self.step()),
            Scaling::Geometric => Increment::Ratio(self.ratio()),
        };
        ScaleIter {
            lo: self.lo,
            increment,
            index: 0,
            len: self.samples,
            prev: None,
        }
    }

    /// Collect just the values (without indices).
    pub fn values(&self) -> Vec<u64> {
        self.iter().map(|(_, v)| v).collect()
    }
}

impl<'a> IntoIterator for &'a ScaleSequence {
    type Item = (usize, u64);
    type IntoIter = ScaleIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Clone, Copy, Debug)]
enum Increment {
    Step(u64),
    Ratio(f64),
}

/// Iterator over `(index, value)` pairs of a [`ScaleSequence`].
#[derive(Clone, Debug)]
pub struct ScaleIter {
    lo: u64,
    increment: Increment,
    index: usize,
    len: usize,
    prev: Option<u64>,
}

impl Iterator for ScaleIter {
    type Item = (usize, u64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.len {
            return None;
        }
        let i = self.index;

        let raw = match self.increment {
            Increment::Step(step) => self.lo.saturating_add((i as u64).saturating_mul(step)),
            Increment::Ratio(ratio) => (self.lo as f64 * ratio.powf(i as f64)).floor() as u64,
        };
        let value = match self.prev {
            Some(prev) if raw <= prev => prev.saturating_add(1),
            _ => raw,
        };

        self.prev = Some(value);
        self.index += 1;
        Some((i, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ScaleIter {}
