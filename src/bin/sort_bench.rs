use clap::{Parser, Subcommand};
use sort_bench::benches::{self, Interrupt};
use sort_bench::dataset;
use sort_bench::harness::{BenchConfig, Profile, RunConfig, RunMode, Timing};
use sort_bench::report;
use sort_bench::scale::{ScaleSequence, Scaling};
use sort_bench::schema::{RunMeta, RunReport};
use sort_bench::sort::{self, SortContext};
use sort_bench::{select_algorithms, BenchError, BenchResult};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Subcommand, Debug)]
enum Command {
    /// Benchmark algorithms over a scale sequence and write one CSV per algorithm.
    Run {
        /// Algorithms to run (comma separated), or `all`.
        #[arg(short, long, value_delimiter = ',', default_value = "all")]
        algorithms: Vec<String>,

        /// Output directory for the CSV tables.
        #[arg(short, long, value_name = "DIR", default_value = ".results")]
        output: PathBuf,

        /// Number of scale steps (defaults to the profile's value).
        #[arg(short, long)]
        samples: Option<usize>,

        /// Repetitions per scale step (defaults to the profile's value).
        #[arg(short, long)]
        repetitions: Option<usize>,

        /// Use linear scaling instead of exponential.
        #[arg(long, default_value_t = false)]
        linear: bool,

        /// Vary the maximum value of the input instead of its length.
        #[arg(long, default_value_t = false)]
        by_max: bool,

        #[arg(long, value_enum, default_value_t = Timing::Single)]
        timing: Timing,

        /// Check every sorted output; a failure aborts that algorithm's run.
        #[arg(long, default_value_t = false)]
        verify: bool,

        /// Smallest input length (length mode).
        #[arg(long)]
        min_length: Option<u64>,

        /// Largest input length (length mode).
        #[arg(long)]
        max_length: Option<u64>,

        /// Fixed input length (max mode).
        #[arg(long)]
        length: Option<u64>,

        /// Smallest value in the inputs.
        #[arg(long, allow_negative_numbers = true)]
        min_val: Option<i32>,

        /// Largest value in the inputs (length mode).
        #[arg(long, allow_negative_numbers = true)]
        max_val: Option<i32>,

        /// Smallest maximum value (max mode).
        #[arg(long)]
        min_max: Option<u64>,

        /// Largest maximum value (max mode).
        #[arg(long)]
        max_max: Option<u64>,

        /// Place each step's maximum value in every input (max mode).
        #[arg(long, default_value_t = false)]
        plant_max: bool,

        /// Where to write the JSON run report.
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// List the available algorithms.
    List,

    /// Sort whitespace-separated integers from stdin and print them.
    Sort {
        #[arg(short, long)]
        algorithm: String,
    },

    /// Print a scale sequence.
    Scale {
        #[arg(short, long, default_value_t = 100)]
        samples: usize,

        #[arg(long, default_value_t = 100)]
        min: u64,

        #[arg(long, default_value_t = 100_000)]
        max: u64,

        #[arg(long, default_value_t = false)]
        linear: bool,
    },

    /// Summarize the CSV tables in a results directory.
    Summarize {
        #[arg(short, long, value_name = "DIR", default_value = ".results")]
        input: PathBuf,
    },
}

#[derive(Parser, Debug)]
#[command(name = "sort-bench")]
#[command(about = "Scaled sorting algorithm benchmarks (CSV output)")]
struct Args {
    #[arg(long, value_enum, default_value_t = Profile::Quick, global = true)]
    profile: Profile,

    #[arg(long, default_value_t = 0, global = true)]
    seed: u64,

    /// Log per-sample details.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn now_utc_timestamp() -> String {
    // Seconds since the epoch; the report only needs an ordering key.
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("unix:{secs}")
}

fn git_sha_short() -> Option<String> {
    // Best-effort: read from environment set by CI/build scripts.
    std::env::var("GIT_SHA")
        .ok()
        .or_else(|| std::env::var("GITHUB_SHA").ok())
        .map(|s| s.chars().take(12).collect())
}

struct RunArgs {
    algorithms: Vec<String>,
    output: PathBuf,
    report: Option<PathBuf>,
    run: RunConfig,
}

/// Benchmark every selected algorithm. Returns `true` if any of them failed.
fn run_benchmarks(cfg: &BenchConfig, args: RunArgs) -> BenchResult<bool> {
    args.run.validate()?;
    let algorithms = select_algorithms(&args.algorithms)?;

    let interrupt = Interrupt::new();
    {
        let interrupt = interrupt.clone();
        if let Err(e) = ctrlc::set_handler(move || interrupt.trigger()) {
            warn!("could not install Ctrl-C handler: {e}");
        }
    }

    let outcomes =
        benches::run_suite(cfg, &args.run, &algorithms, &interrupt, &args.output)?;

    let report = RunReport {
        run: RunMeta {
            schema_version: 1,
            bench_version: env!("CARGO_PKG_VERSION").to_string(),
            profile: cfg.profile.as_str().to_string(),
            seed: cfg.seed,
            timestamp_utc: now_utc_timestamp(),
            git_sha: git_sha_short(),
        },
        config: args.run,
        algorithms: outcomes,
    };
    if let Some(path) = &args.report {
        report::write_report(path, &report)?;
        info!(path = %path.display(), "wrote run report");
    }

    if interrupt.is_aborted() {
        warn!("benchmarking was aborted; partial results were saved");
    } else if report.algorithms.iter().any(|a| a.interrupted) {
        warn!("benchmarking was interrupted; partial results were saved");
    } else {
        info!("benchmarking completed");
    }
    Ok(report.failed())
}

fn sort_stdin(cfg: &BenchConfig, name: &str) -> BenchResult<()> {
    let algorithm = sort::find(name).ok_or_else(|| BenchError::UnknownAlgorithm {
        name: name.to_string(),
    })?;

    let mut text = String::new();
    io::stdin().read_to_string(&mut text)?;
    let mut data = dataset::parse_values(&text)
        .map_err(|e| BenchError::InvalidConfig(format!("invalid input: {e}")))?;

    let mut ctx = SortContext::new(cfg.seed);
    algorithm
        .sort(&mut data, &mut ctx)
        .map_err(|source| BenchError::Sort {
            algorithm: name.to_string(),
            source,
        })?;

    let line = data
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{line}")?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let cfg = BenchConfig {
        profile: args.profile,
        seed: args.seed,
    };

    let result = match args.cmd {
        Command::Run {
            algorithms,
            output,
            samples,
            repetitions,
            linear,
            by_max,
            timing,
            verify,
            min_length,
            max_length,
            length,
            min_val,
            max_val,
            min_max,
            max_max,
            plant_max,
            report,
        } => {
            let mode = if by_max { RunMode::Max } else { RunMode::Length };
            let mut run = RunConfig::for_mode(&cfg, mode);
            run.scaling = if linear {
                Scaling::Linear
            } else {
                Scaling::Geometric
            };
            run.timing = timing;
            run.verify = verify;
            run.samples = samples.unwrap_or(run.samples);
            run.repetitions = repetitions.unwrap_or(run.repetitions);
            run.min_length = min_length.unwrap_or(run.min_length);
            run.max_length = max_length.unwrap_or(run.max_length);
            run.length = length.unwrap_or(run.length);
            run.min_val = min_val.unwrap_or(run.min_val);
            run.max_val = max_val.unwrap_or(run.max_val);
            run.min_max = min_max.unwrap_or(run.min_max);
            run.max_max = max_max.unwrap_or(run.max_max);
            run.plant_max = plant_max;

            let run_args = RunArgs {
                algorithms,
                output,
                report,
                run,
            };
            run_benchmarks(&cfg, run_args).map(|failed| {
                if failed {
                    ExitCode::FAILURE
                } else {
                    ExitCode::SUCCESS
                }
            })
        }
        Command::List => {
            for alg in sort::registry() {
                println!("{:<24} {}", alg.name(), alg.description());
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Sort { algorithm } => sort_stdin(&cfg, &algorithm).map(|()| ExitCode::SUCCESS),
        Command::Scale {
            samples,
            min,
            max,
            linear,
        } => {
            if samples == 0 || min == 0 || max < min {
                Err(BenchError::InvalidConfig(format!(
                    "scale needs samples >= 1 and 0 < min <= max (got {samples}, {min}..{max})"
                )))
            } else {
                let scaling = if linear {
                    Scaling::Linear
                } else {
                    Scaling::Geometric
                };
                for (i, value) in &ScaleSequence::new(samples, min, max, scaling) {
                    println!("{i}\t{value}");
                }
                Ok(ExitCode::SUCCESS)
            }
        }
        Command::Summarize { input } => report::summarize_dir(&input).map(|summaries| {
            for s in &summaries {
                println!(
                    "{:<24} x={:<8} scale={:<6} rows={:<5} time_ms=[{:.3}, {:.3}]  {}",
                    s.algorithm,
                    s.x_axis,
                    s.scale,
                    s.rows,
                    s.min_time_ms,
                    s.max_time_ms,
                    s.path.display()
                );
            }
            ExitCode::SUCCESS
        }),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
