use std::hint::black_box;
use std::time::{Duration, Instant};

use clap::ValueEnum;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{BenchError, BenchResult};
use crate::scale::{ScaleSequence, Scaling};
use crate::sort::{check_sorted, SortAlgorithm, SortContext, SortError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Profile {
    #[default]
    Quick,
    Full,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Quick => "quick",
            Profile::Full => "full",
        }
    }
}

#[derive(Clone, Debug)]
pub struct BenchConfig {
    pub profile: Profile,
    pub seed: u64,
}

impl BenchConfig {
    pub fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed)
    }

    /// Sorts of a small input run before the first measurement.
    pub fn warmup_iters(&self) -> u64 {
        5
    }

    pub fn samples(&self) -> usize {
        match self.profile {
            Profile::Quick => 20,
            Profile::Full => 100,
        }
    }

    pub fn repetitions(&self) -> usize {
        match self.profile {
            Profile::Quick => 3,
            Profile::Full => 5,
        }
    }
}

/// How one repetition is timed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Timing {
    /// Time a single sort of a fresh copy of the input.
    #[default]
    Single,
    /// Repeat copy + sort until the elapsed time dwarfs the clock resolution,
    /// then report the per-iteration average.
    Amortized,
}

/// Which parameter the scale sequence varies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Vary the input length, value range fixed.
    #[default]
    Length,
    /// Vary the maximum value, length fixed.
    Max,
}

impl RunMode {
    /// Tag used in result file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Length => "length",
            RunMode::Max => "max",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "length" => Some(RunMode::Length),
            "max" => Some(RunMode::Max),
            _ => None,
        }
    }
}

/// Everything a single benchmark run over one algorithm needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub mode: RunMode,
    pub scaling: Scaling,
    pub samples: usize,
    pub repetitions: usize,
    pub timing: Timing,
    pub verify: bool,

    /// Length bounds when varying length.
    pub min_length: u64,
    pub max_length: u64,
    /// Fixed length when varying the maximum value.
    pub length: u64,

    /// Value bounds; `max_val` is only used when varying length.
    pub min_val: i32,
    pub max_val: i32,
    /// Bounds of the maximum value when varying it.
    pub min_max: u64,
    pub max_max: u64,
    /// Place the step's maximum value in every input when varying it.
    #[serde(default)]
    pub plant_max: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::Length,
            scaling: Scaling::Geometric,
            samples: 100,
            repetitions: 5,
            timing: Timing::Single,
            verify: false,
            min_length: 100,
            max_length: 100_000,
            length: 10_000,
            min_val: 1,
            max_val: 100_000,
            min_max: 10,
            max_max: 1_000_000,
            plant_max: false,
        }
    }
}

impl RunConfig {
    /// Defaults for `mode`, with sample counts taken from the profile.
    pub fn for_mode(cfg: &BenchConfig, mode: RunMode) -> Self {
        let mut run = Self {
            mode,
            samples: cfg.samples(),
            repetitions: cfg.repetitions(),
            ..Self::default()
        };
        if mode == RunMode::Max {
            run.min_val = 10;
        }
        run
    }

    pub fn validate(&self) -> BenchResult<()> {
        let invalid = |msg: String| Err(BenchError::InvalidConfig(msg));

        if self.samples == 0 {
            return invalid("samples must be at least 1".into());
        }
        if self.repetitions == 0 {
            return invalid("repetitions must be at least 1".into());
        }
        match self.mode {
            RunMode::Length => {
                if self.min_length == 0 || self.max_length < self.min_length {
                    return invalid(format!(
                        "length bounds must satisfy 0 < min <= max (got {}..{})",
                        self.min_length, self.max_length
                    ));
                }
                if self.max_val < self.min_val {
                    return invalid(format!(
                        "value bounds must satisfy min <= max (got {}..{})",
                        self.min_val, self.max_val
                    ));
                }
            }
            RunMode::Max => {
                if self.min_max == 0 || self.max_max < self.min_max {
                    return invalid(format!(
                        "max-value bounds must satisfy 0 < min <= max (got {}..{})",
                        self.min_max, self.max_max
                    ));
                }
                if self.max_max > i32::MAX as u64 {
                    return invalid(format!("max-value bound {} exceeds i32", self.max_max));
                }
                if i64::from(self.min_val) > self.min_max as i64 {
                    return invalid(format!(
                        "min value {} above the smallest max value {}",
                        self.min_val, self.min_max
                    ));
                }
                if self.length == 0 {
                    return invalid("length must be at least 1".into());
                }
            }
        }
        Ok(())
    }

    /// The sequence of lengths (or maximum values) this run steps through.
    pub fn scale_sequence(&self) -> ScaleSequence {
        match self.mode {
            RunMode::Length => {
                ScaleSequence::new(self.samples, self.min_length, self.max_length, self.scaling)
            }
            RunMode::Max => {
                ScaleSequence::new(self.samples, self.min_max, self.max_max, self.scaling)
            }
        }
    }
}

/// One timed repetition.
#[derive(Clone, Debug, PartialEq)]
pub struct Measured {
    pub iterations: u64,
    /// Nanoseconds per sort.
    pub elapsed_ns: f64,
    /// Clock resolution observed right before timing, in nanoseconds.
    pub resolution_ns: f64,
}

/// Smallest observable step of the monotonic clock: the largest of three
/// back-to-back `Instant::now()` deltas.
pub fn clock_resolution() -> Duration {
    (0..3)
        .map(|_| {
            let start = Instant::now();
            let end = Instant::now();
            end - start
        })
        .max()
        .unwrap_or_default()
}

/// Minimum measured span for [`Timing::Amortized`].
pub fn amortized_min_time(resolution: Duration) -> Duration {
    (resolution * 1_000).max(Duration::from_micros(1))
}

/// Time `algorithm` on a copy of `input`, leaving the sorted copy in `work`.
pub fn time_sort(
    algorithm: &dyn SortAlgorithm,
    input: &[i32],
    work: &mut Vec<i32>,
    ctx: &mut SortContext,
    timing: Timing,
    verify: bool,
) -> Result<Measured, SortError> {
    let resolution = clock_resolution();
    algorithm.prepare(input, ctx);
    work.reserve(input.len().saturating_sub(work.len()));

    let (iterations, elapsed) = match timing {
        Timing::Single => {
            work.clear();
            work.extend_from_slice(input);
            let start = Instant::now();
            algorithm.sort(black_box(work.as_mut_slice()), ctx)?;
            (1u64, start.elapsed())
        }
        Timing::Amortized => {
            let min_time = amortized_min_time(resolution);
            let mut iterations = 0u64;
            let start = Instant::now();
            loop {
                iterations += 1;
                work.clear();
                work.extend_from_slice(input);
                algorithm.sort(black_box(work.as_mut_slice()), ctx)?;
                let elapsed = start.elapsed();
                if elapsed >= min_time {
                    break (iterations, elapsed);
                }
            }
        }
    };

    if verify {
        check_sorted(work)?;
    }

    Ok(Measured {
        iterations,
        elapsed_ns: elapsed.as_nanos() as f64 / iterations as f64,
        resolution_ns: resolution.as_nanos() as f64,
    })
}

/// Sort `input` a few times so caches and clocks are warm before measuring.
pub fn warm_up(
    algorithm: &dyn SortAlgorithm,
    input: &[i32],
    rounds: u64,
    ctx: &mut SortContext,
) -> Result<(), SortError> {
    let mut work = Vec::with_capacity(input.len());
    algorithm.prepare(input, ctx);
    for _ in 0..rounds {
        work.clear();
        work.extend_from_slice(input);
        algorithm.sort(black_box(work.as_mut_slice()), ctx)?;
    }
    Ok(())
}

/// Round to three decimals.
pub fn round3(x: f64) -> f64 {
    (x * 1_000.0).round() / 1_000.0
}

/// Median of `values` (mean of the middle pair for even counts); 0.0 when empty.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator); 0.0 below two values.
pub fn sample_stdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}
