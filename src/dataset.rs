//! Deterministic input generation for scaled sort benchmarks.
//!
//! Every input array is drawn from its own `ChaCha8Rng`, seeded from the master
//! seed plus the scale step and repetition it belongs to. A batch of repetitions
//! can therefore be generated in parallel and still come out identical for the
//! same seed, regardless of thread count.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// Length of the arrays used to warm up the CPU before measuring.
pub const WARMUP_LEN: usize = 100;

/// Shape of one generated input array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSpec {
    /// Number of elements.
    pub length: usize,
    /// Smallest value that may appear (inclusive).
    pub min_val: i32,
    /// Largest value that may appear (inclusive).
    pub max_val: i32,
    /// Overwrite one random position with `max_val`, so the value range of the
    /// array is exactly what the benchmark row claims.
    pub ensure_max_presence: bool,
}

impl InputSpec {
    pub fn new(length: usize, min_val: i32, max_val: i32) -> Self {
        Self {
            length,
            min_val,
            max_val,
            ensure_max_presence: false,
        }
    }

    pub fn with_max_presence(mut self) -> Self {
        self.ensure_max_presence = true;
        self
    }

    /// Small input used for warm-up runs.
    pub fn warmup() -> Self {
        Self::new(WARMUP_LEN, 0, WARMUP_LEN as i32)
    }
}

/// Fill a fresh array according to `spec`.
pub fn generate_input<R: Rng + ?Sized>(rng: &mut R, spec: &InputSpec) -> Vec<i32> {
    let (lo, hi) = if spec.min_val <= spec.max_val {
        (spec.min_val, spec.max_val)
    } else {
        (spec.max_val, spec.min_val)
    };

    let mut data: Vec<i32> = (0..spec.length).map(|_| rng.gen_range(lo..=hi)).collect();
    if spec.ensure_max_presence && !data.is_empty() {
        let idx = rng.gen_range(0..data.len());
        data[idx] = hi;
    }
    data
}

fn per_input_seed(master_seed: u64, step: usize, repetition: usize) -> u64 {
    master_seed
        .wrapping_add((step as u64) << 20)
        .wrapping_add(repetition as u64)
        .wrapping_mul(0x517cc1b727220a95)
}

/// Generate the inputs for every repetition of one scale step.
///
/// Uses parallel generation with per-input RNGs derived from the master seed;
/// `collect` preserves repetition order.
pub fn generate_batch(
    master_seed: u64,
    step: usize,
    repetitions: usize,
    spec: &InputSpec,
) -> Vec<Vec<i32>> {
    (0..repetitions)
        .into_par_iter()
        .map(|r| {
            let mut rng = ChaCha8Rng::seed_from_u64(per_input_seed(master_seed, step, r));
            generate_input(&mut rng, spec)
        })
        .collect()
}

/// Parse whitespace-separated integers, as fed to `sort-bench sort` on stdin.
pub fn parse_values(text: &str) -> Result<Vec<i32>, std::num::ParseIntError> {
    text.split_whitespace().map(str::parse).collect()
}
