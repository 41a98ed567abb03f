//! CSV persistence for result tables, plus read-back and per-file summaries.
//!
//! File names encode the run parameters so a results directory can be summarized
//! without any side metadata:
//!
//! ```text
//! {algorithm}_{samples}_{repetitions}_{linear|exponential}_{length|max}_{os}.csv
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{BenchError, BenchResult};
use crate::harness::{RunConfig, RunMode};
use crate::scale::Scaling;
use crate::schema::{BenchSample, ResultTable, RunReport};

const CSV_HEADER: [&str; 6] = ["size", "min_val", "max_val", "time", "resolution", "stdev"];

pub fn os_tag() -> &'static str {
    if cfg!(windows) {
        "windows"
    } else {
        "linux"
    }
}

pub fn result_filename(algorithm: &str, run: &RunConfig) -> String {
    format!(
        "{}_{}_{}_{}_{}_{}.csv",
        algorithm,
        run.samples,
        run.repetitions,
        run.scaling.as_str(),
        run.mode.as_str(),
        os_tag()
    )
}

/// Write `samples` to `path`, header first (also for an empty table).
pub fn write_csv(path: &Path, samples: &[BenchSample]) -> BenchResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| BenchError::csv(path, e))?;

    wtr.write_record(CSV_HEADER)
        .map_err(|e| BenchError::csv(path, e))?;
    for s in samples {
        wtr.serialize(s).map_err(|e| BenchError::csv(path, e))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Persist a table under `dir`, returning the file written.
pub fn write_table(dir: &Path, table: &ResultTable) -> BenchResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(result_filename(&table.algorithm, &table.config));
    write_csv(&path, &table.samples)?;
    debug!(path = %path.display(), rows = table.len(), "wrote results");
    Ok(path)
}

pub fn read_csv(path: &Path) -> BenchResult<Vec<BenchSample>> {
    let mut rdr = csv::Reader::from_path(path).map_err(|e| BenchError::csv(path, e))?;
    rdr.deserialize::<BenchSample>()
        .map(|row| row.map_err(|e| BenchError::csv(path, e)))
        .collect()
}

/// Run parameters recovered from a result file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTags {
    pub algorithm: String,
    pub samples: usize,
    pub repetitions: usize,
    pub scaling: Scaling,
    pub mode: RunMode,
    pub os: String,
}

/// Parse a file stem produced by [`result_filename`]. Algorithm names may
/// themselves contain underscores; the last five tags are fixed.
pub fn parse_file_tags(stem: &str) -> Option<FileTags> {
    let tags: Vec<&str> = stem.split('_').collect();
    if tags.len() < 6 {
        return None;
    }
    let n = tags.len();
    Some(FileTags {
        algorithm: tags[..n - 5].join("_"),
        samples: tags[n - 5].parse().ok()?,
        repetitions: tags[n - 4].parse().ok()?,
        scaling: Scaling::from_tag(tags[n - 3])?,
        mode: RunMode::from_tag(tags[n - 2])?,
        os: tags[n - 1].to_string(),
    })
}

/// What a plot of one result file would show.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub path: PathBuf,
    pub algorithm: String,
    /// Column on the x axis: `size` or `max_val`.
    pub x_axis: &'static str,
    /// Axis scale: `log` for geometric runs, `linear` otherwise.
    pub scale: &'static str,
    pub rows: usize,
    pub min_time_ms: f64,
    pub max_time_ms: f64,
}

fn summarize_file(path: &Path, tags: FileTags) -> BenchResult<SeriesSummary> {
    let samples = read_csv(path)?;
    let times_ms: Vec<f64> = samples.iter().map(|s| s.time / 1_000_000.0).collect();
    let min_time_ms = times_ms.iter().copied().fold(f64::INFINITY, f64::min);
    let max_time_ms = times_ms.iter().copied().fold(0.0, f64::max);

    Ok(SeriesSummary {
        path: path.to_path_buf(),
        algorithm: tags.algorithm,
        x_axis: match tags.mode {
            RunMode::Length => "size",
            RunMode::Max => "max_val",
        },
        scale: match tags.scaling {
            Scaling::Geometric => "log",
            Scaling::Linear => "linear",
        },
        rows: samples.len(),
        min_time_ms: if samples.is_empty() { 0.0 } else { min_time_ms },
        max_time_ms,
    })
}

/// Summarize every `*.csv` result file below `dir`, ordered by path. Files whose
/// names do not follow the result naming scheme are skipped.
pub fn summarize_dir(dir: &Path) -> BenchResult<Vec<SeriesSummary>> {
    if !dir.is_dir() {
        return Err(BenchError::InvalidConfig(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let mut out = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| BenchError::Io(e.into()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("csv")
        {
            continue;
        }
        let Some(tags) = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(parse_file_tags)
        else {
            warn!(path = %path.display(), "skipping file with unrecognised name");
            continue;
        };
        out.push(summarize_file(path, tags)?);
    }
    Ok(out)
}

pub fn write_report(path: &Path, report: &RunReport) -> BenchResult<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    Ok(())
}
