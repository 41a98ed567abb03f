use serde::{Deserialize, Serialize};

use crate::harness::RunConfig;

/// One row of a result table: the reduced measurements for one scale step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchSample {
    pub size: u64,
    pub min_val: i64,
    pub max_val: i64,
    /// Median nanoseconds per sort over the repetitions.
    pub time: f64,
    /// Mean clock resolution in nanoseconds, three decimals.
    pub resolution: f64,
    /// Sample standard deviation of the repetition times, three decimals.
    pub stdev: f64,
}

/// Append-only table of samples for one algorithm under one configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    pub algorithm: String,
    pub config: RunConfig,
    pub samples: Vec<BenchSample>,
    /// Set when the run stopped before the scale sequence was exhausted.
    pub interrupted: bool,
}

impl ResultTable {
    pub fn new(algorithm: impl Into<String>, config: RunConfig) -> Self {
        let capacity = config.samples;
        Self {
            algorithm: algorithm.into(),
            config,
            samples: Vec::with_capacity(capacity),
            interrupted: false,
        }
    }

    pub fn push(&mut self, sample: BenchSample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub schema_version: u32,
    pub bench_version: String,
    pub profile: String,
    pub seed: u64,
    pub timestamp_utc: String,
    pub git_sha: Option<String>,
}

/// Outcome of benchmarking one algorithm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmRun {
    pub algorithm: String,
    pub rows: usize,
    pub interrupted: bool,
    /// Never started because the run was aborted.
    #[serde(default)]
    pub skipped: bool,
    pub csv_path: Option<String>,
    pub error: Option<String>,
}

impl AlgorithmRun {
    pub fn skipped(algorithm: &str) -> Self {
        Self {
            algorithm: algorithm.to_string(),
            rows: 0,
            interrupted: false,
            skipped: true,
            csv_path: None,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run: RunMeta,
    pub config: RunConfig,
    pub algorithms: Vec<AlgorithmRun>,
}

impl RunReport {
    pub fn failed(&self) -> bool {
        self.algorithms.iter().any(|a| a.error.is_some())
    }
}
