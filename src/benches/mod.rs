//! Scaled benchmark runs: step through a scale sequence, time an algorithm on
//! fresh random inputs at every step, and collect the reduced rows.


use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::dataset::{self, InputSpec};
use crate::error::{BenchError, BenchResult};
use crate::harness::{self, BenchConfig, RunConfig, RunMode, Timing};
use crate::report;
use crate::schema::{AlgorithmRun, BenchSample, ResultTable};
use crate::sort::{SortAlgorithm, SortContext, SortError};

#[derive(Debug, Default)]
struct InterruptState {
    stop: AtomicBool,
    abort: AtomicBool,
}

/// Shared stop flag, set from the Ctrl-C handler and polled between scale steps.
///
/// The first trigger stops the algorithm being measured; the suite moves on to
/// the next one after [`Interrupt::reset`]. A second trigger before the reset
/// aborts the whole suite.
#[derive(Clone, Debug, Default)]
pub struct Interrupt(Arc<InterruptState>);

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        if self.0.stop.swap(true, Ordering::SeqCst) {
            self.0.abort.store(true, Ordering::SeqCst);
        }
    }

    pub fn is_set(&self) -> bool {
        self.0.stop.load(Ordering::SeqCst)
    }

    pub fn is_aborted(&self) -> bool {
        self.0.abort.load(Ordering::SeqCst)
    }

    /// Clear a stop request so the next algorithm can run.
    pub fn reset(&self) {
        self.0.stop.store(false, Ordering::SeqCst);
    }
}

/// Median time, mean resolution and spread over the repetitions of one step.
#[derive(Clone, Debug, PartialEq)]
pub struct Collected {
    pub time: f64,
    pub resolution: f64,
    pub stdev: f64,
}

/// Time `algorithm` once per input and reduce the repetitions.
pub fn collect_results(
    algorithm: &dyn SortAlgorithm,
    inputs: &[Vec<i32>],
    ctx: &mut SortContext,
    timing: Timing,
    verify: bool,
) -> Result<Collected, SortError> {
    let mut times = Vec::with_capacity(inputs.len());
    let mut resolutions = Vec::with_capacity(inputs.len());
    let mut work = Vec::new();

    for input in inputs {
        let m = harness::time_sort(algorithm, input, &mut work, ctx, timing, verify)?;
        times.push(m.elapsed_ns);
        resolutions.push(m.resolution_ns);
    }

    Ok(Collected {
        time: harness::median(&times),
        resolution: harness::round3(harness::mean(&resolutions)),
        stdev: harness::round3(harness::sample_stdev(&times)),
    })
}

/// One scale step resolved into the input to generate and the row to record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    pub spec: InputSpec,
    pub size: u64,
    pub min_val: i64,
    pub max_val: i64,
}

/// Benchmark one algorithm over the scale sequence of `run`.
///
/// Returns the (possibly truncated) table when `interrupt` fires. A sort failure,
/// including a failed correctness check, aborts the run with an error.
pub fn run_algorithm(
    cfg: &BenchConfig,
    run: &RunConfig,
    algorithm: &dyn SortAlgorithm,
    interrupt: &Interrupt,
) -> BenchResult<ResultTable> {
    run.validate()?;
    let name = algorithm.name();
    let sort_err = |source: SortError| BenchError::Sort {
        algorithm: name.to_string(),
        source,
    };

    info!(
        algorithm = name,
        mode = run.mode.as_str(),
        scaling = run.scaling.as_str(),
        samples = run.samples,
        repetitions = run.repetitions,
        "benchmarking"
    );

    let mut table = ResultTable::new(name, run.clone());
    let mut ctx = SortContext::new(cfg.seed);

    // Warm up the CPU clock to avoid a cold start.
    let warmup = dataset::generate_input(&mut cfg.rng(), &InputSpec::warmup());
    harness::warm_up(algorithm, &warmup, cfg.warmup_iters(), &mut ctx).map_err(sort_err)?;

    for (i, value) in &run.scale_sequence() {
        if interrupt.is_set() {
            warn!(algorithm = name, rows = table.len(), "benchmark interrupted");
            table.interrupted = true;
            break;
        }

        let step = match run.mode {
            RunMode::Length => length::step(run, value),
            RunMode::Max => max::step(run, value),
        };
        ctx.reserve(step.spec.length);

        let inputs = dataset::generate_batch(cfg.seed, i, run.repetitions, &step.spec);
        let collected =
            collect_results(algorithm, &inputs, &mut ctx, run.timing, run.verify).map_err(sort_err)?;

        debug!(
            algorithm = name,
            step = i,
            size = step.size,
            max_val = step.max_val,
            time_ns = collected.time,
            stdev = collected.stdev,
            "sample"
        );

        table.push(BenchSample {
            size: step.size,
            min_val: step.min_val,
            max_val: step.max_val,
            time: collected.time,
            resolution: collected.resolution,
            stdev: collected.stdev,
        });
    }

    info!(
        algorithm = name,
        rows = table.len(),
        interrupted = table.interrupted,
        "finished"
    );
    Ok(table)
}

/// Benchmark `algorithms` one after another, writing each table under `output`.
///
/// A sort failure is logged and recorded on that algorithm's outcome; the rest
/// still run. An interrupted algorithm keeps its partial table and the suite
/// continues with the next one, unless the interrupt escalated to an abort, in
/// which case the remaining algorithms are recorded as skipped.
pub fn run_suite(
    cfg: &BenchConfig,
    run: &RunConfig,
    algorithms: &[&dyn SortAlgorithm],
    interrupt: &Interrupt,
    output: &Path,
) -> BenchResult<Vec<AlgorithmRun>> {
    run.validate()?;

    let mut outcomes = Vec::with_capacity(algorithms.len());
    for &algorithm in algorithms {
        let name = algorithm.name();
        if interrupt.is_aborted() {
            warn!(algorithm = name, "run aborted; skipping");
            outcomes.push(AlgorithmRun::skipped(name));
            continue;
        }

        let outcome = match run_algorithm(cfg, run, algorithm, interrupt) {
            Ok(table) => {
                let path = report::write_table(output, &table)?;
                info!(
                    algorithm = name,
                    rows = table.len(),
                    path = %path.display(),
                    "saved results"
                );
                if table.interrupted {
                    interrupt.reset();
                }
                AlgorithmRun {
                    algorithm: table.algorithm.clone(),
                    rows: table.len(),
                    interrupted: table.interrupted,
                    skipped: false,
                    csv_path: Some(path.display().to_string()),
                    error: None,
                }
            }
            Err(e) => {
                error!(algorithm = name, "{e}");
                AlgorithmRun {
                    algorithm: name.to_string(),
                    rows: 0,
                    interrupted: false,
                    skipped: false,
                    csv_path: None,
                    error: Some(e.to_string()),
                }
            }
        };
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::Profile;
    use crate::scale::Scaling;
    use crate::sort;
    use std::sync::atomic::AtomicUsize;
    use tempfile::tempdir;

    /// Sorts descending, so every output fails the ascending check.
    struct Descending;

    impl SortAlgorithm for Descending {
        fn name(&self) -> &'static str {
            "descending"
        }
        fn description(&self) -> &'static str {
            "sorts the wrong way round"
        }
        fn sort(&self, data: &mut [i32], _ctx: &mut SortContext) -> Result<(), SortError> {
            data.sort_unstable_by(|a, b| b.cmp(a));
            Ok(())
        }
    }

    /// Sorts correctly and presses Ctrl-C `presses` times on sort call number `after`.
    struct StopAfter {
        interrupt: Interrupt,
        after: usize,
        presses: usize,
        calls: AtomicUsize,
    }

    impl StopAfter {
        fn new(interrupt: &Interrupt, after: usize, presses: usize) -> Self {
            Self {
                interrupt: interrupt.clone(),
                after,
                presses,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl SortAlgorithm for StopAfter {
        fn name(&self) -> &'static str {
            "stop_after"
        }
        fn description(&self) -> &'static str {
            "std sort that interrupts the run"
        }
        fn sort(&self, data: &mut [i32], _ctx: &mut SortContext) -> Result<(), SortError> {
            data.sort_unstable();
            if self.calls.fetch_add(1, Ordering::SeqCst) + 1 == self.after {
                for _ in 0..self.presses {
                    self.interrupt.trigger();
                }
            }
            Ok(())
        }
    }

    // 5 warm-up sorts, then 2 repetitions per step: the 9th call ends step 1.
    const AFTER_TWO_ROWS: usize = 9;

    fn cfg() -> BenchConfig {
        BenchConfig {
            profile: Profile::Quick,
            seed: 42,
        }
    }

    fn small_run(mode: RunMode) -> RunConfig {
        RunConfig {
            samples: 4,
            repetitions: 2,
            verify: true,
            min_length: 10,
            max_length: 1_000,
            length: 200,
            min_max: 10,
            max_max: 10_000,
            ..RunConfig::for_mode(&cfg(), mode)
        }
    }

    #[test]
    fn by_length_rows_follow_scale_sequence() {
        let run = small_run(RunMode::Length);
        let alg = sort::find("tim_sort_adaptive").unwrap();
        let table = run_algorithm(&cfg(), &run, alg, &Interrupt::new()).unwrap();

        let sizes: Vec<u64> = table.samples.iter().map(|s| s.size).collect();
        assert_eq!(sizes, run.scale_sequence().values());
        assert!(table
            .samples
            .iter()
            .all(|s| s.min_val == 1 && s.max_val == 100_000));
        assert!(!table.interrupted);
    }

    #[test]
    fn by_max_rows_vary_max() {
        let mut run = small_run(RunMode::Max);
        run.scaling = Scaling::Linear;
        let alg = sort::find("counting_sort").unwrap();
        let table = run_algorithm(&cfg(), &run, alg, &Interrupt::new()).unwrap();

        assert_eq!(table.len(), 4);
        let maxes: Vec<i64> = table.samples.iter().map(|s| s.max_val).collect();
        assert_eq!(maxes, vec![10, 2_507, 5_004, 7_501]);
        assert!(table.samples.iter().all(|s| s.size == 200));
    }

    #[test]
    fn interrupt_truncates() {
        let run = small_run(RunMode::Length);
        let interrupt = Interrupt::new();
        interrupt.trigger();
        let alg = sort::find("quick_sort").unwrap();
        let table = run_algorithm(&cfg(), &run, alg, &interrupt).unwrap();
        assert!(table.is_empty());
        assert!(table.interrupted);
    }

    #[test]
    fn invalid_config_fails_before_measuring() {
        let mut run = small_run(RunMode::Length);
        run.repetitions = 0;
        let alg = sort::find("quick_sort").unwrap();
        let err = run_algorithm(&cfg(), &run, alg, &Interrupt::new()).unwrap_err();
        assert!(matches!(err, BenchError::InvalidConfig(_)));
    }

    #[test]
    fn sort_failure_aborts_run() {
        let mut run = small_run(RunMode::Length);
        run.min_val = i32::MIN;
        run.max_val = i32::MAX;
        let alg = sort::find("counting_sort").unwrap();
        let err = run_algorithm(&cfg(), &run, alg, &Interrupt::new()).unwrap_err();
        match err {
            BenchError::Sort { algorithm, source } => {
                assert_eq!(algorithm, "counting_sort");
                assert!(matches!(source, SortError::RangeTooLarge { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn failed_verification_aborts_run() {
        let run = small_run(RunMode::Length);
        let err = run_algorithm(&cfg(), &run, &Descending, &Interrupt::new()).unwrap_err();
        match err {
            BenchError::Sort { algorithm, source } => {
                assert_eq!(algorithm, "descending");
                assert!(matches!(source, SortError::NotSorted { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unverified_run_does_not_check_output() {
        let mut run = small_run(RunMode::Length);
        run.verify = false;
        let table = run_algorithm(&cfg(), &run, &Descending, &Interrupt::new()).unwrap();
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn interrupt_mid_run_keeps_collected_rows() {
        let run = small_run(RunMode::Length);
        let interrupt = Interrupt::new();
        let alg = StopAfter::new(&interrupt, AFTER_TWO_ROWS, 1);
        let table = run_algorithm(&cfg(), &run, &alg, &interrupt).unwrap();

        assert!(table.interrupted);
        assert_eq!(table.len(), 2);
        let expected: Vec<u64> = run.scale_sequence().values()[..2].to_vec();
        let sizes: Vec<u64> = table.samples.iter().map(|s| s.size).collect();
        assert_eq!(sizes, expected);

        let dir = tempdir().unwrap();
        let path = report::write_table(dir.path(), &table).unwrap();
        assert_eq!(report::read_csv(&path).unwrap(), table.samples);
    }

    #[test]
    fn interrupt_escalates_to_abort() {
        let interrupt = Interrupt::new();
        interrupt.trigger();
        assert!(interrupt.is_set() && !interrupt.is_aborted());
        interrupt.reset();
        assert!(!interrupt.is_set());

        interrupt.trigger();
        interrupt.trigger();
        assert!(interrupt.is_aborted());
        interrupt.reset();
        assert!(interrupt.is_aborted());
    }

    #[test]
    fn suite_continues_after_failure() {
        let dir = tempdir().unwrap();
        let run = small_run(RunMode::Length);
        let algorithms: [&dyn SortAlgorithm; 2] =
            [&Descending, sort::find("std_unstable").unwrap()];

        let outcomes =
            run_suite(&cfg(), &run, &algorithms, &Interrupt::new(), dir.path()).unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].algorithm, "descending");
        assert!(outcomes[0].error.is_some());
        assert!(outcomes[0].csv_path.is_none());

        assert!(outcomes[1].error.is_none());
        assert_eq!(outcomes[1].rows, 4);
        let path = outcomes[1].csv_path.as_deref().unwrap();
        assert_eq!(report::read_csv(Path::new(path)).unwrap().len(), 4);

        let report = crate::schema::RunReport {
            run: crate::schema::RunMeta {
                schema_version: 1,
                bench_version: "test".into(),
                profile: "quick".into(),
                seed: 42,
                timestamp_utc: "unix:0".into(),
                git_sha: None,
            },
            config: run,
            algorithms: outcomes,
        };
        assert!(report.failed());
    }

    #[test]
    fn suite_moves_on_after_interrupt() {
        let dir = tempdir().unwrap();
        let run = small_run(RunMode::Length);
        let interrupt = Interrupt::new();
        let stopper = StopAfter::new(&interrupt, AFTER_TWO_ROWS, 1);
        let algorithms: [&dyn SortAlgorithm; 2] = [&stopper, sort::find("tim_sort").unwrap()];

        let outcomes = run_suite(&cfg(), &run, &algorithms, &interrupt, dir.path()).unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].interrupted);
        assert_eq!(outcomes[0].rows, 2);
        assert!(outcomes[0].csv_path.is_some());
        assert!(!outcomes[1].interrupted && !outcomes[1].skipped);
        assert_eq!(outcomes[1].rows, 4);
        assert!(!interrupt.is_set());
    }

    #[test]
    fn second_interrupt_skips_remaining_algorithms() {
        let dir = tempdir().unwrap();
        let run = small_run(RunMode::Length);
        let interrupt = Interrupt::new();
        let stopper = StopAfter::new(&interrupt, AFTER_TWO_ROWS, 2);
        let algorithms: [&dyn SortAlgorithm; 3] = [
            &stopper,
            sort::find("tim_sort").unwrap(),
            sort::find("quick_sort").unwrap(),
        ];

        let outcomes = run_suite(&cfg(), &run, &algorithms, &interrupt, dir.path()).unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].interrupted);
        assert_eq!(outcomes[0].rows, 2);
        for skipped in &outcomes[1..] {
            assert!(skipped.skipped);
            assert_eq!(skipped.rows, 0);
            assert!(skipped.csv_path.is_none() && skipped.error.is_none());
        }
        let names: Vec<_> = outcomes.iter().map(|o| o.algorithm.as_str()).collect();
        assert_eq!(names, vec!["stop_after", "tim_sort", "quick_sort"]);
    }

    #[test]
    fn collect_results_reduces_repetitions() {
        let alg = sort::find("std_unstable").unwrap();
        let inputs = dataset::generate_batch(1, 0, 3, &InputSpec::new(500, 0, 1_000));
        let c = collect_results(alg, &inputs, &mut SortContext::new(0), Timing::Single, true)
            .unwrap();
        assert!(c.time >= 0.0);
        assert!(c.stdev >= 0.0);
        assert!(c.resolution >= 0.0);
    }
}
