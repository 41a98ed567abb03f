pub mod benches;
pub mod dataset;
pub mod error;
pub mod harness;
pub mod report;
pub mod scale;
pub mod schema;
pub mod sort;

pub use error::{BenchError, BenchResult};

use sort::SortAlgorithm;

/// Resolve algorithm names from the command line. An empty list or `all`
/// selects the whole registry; duplicates are dropped, order is kept.
pub fn select_algorithms(names: &[String]) -> BenchResult<Vec<&'static dyn SortAlgorithm>> {
    if names.is_empty() || names.iter().any(|n| n == "all") {
        return Ok(sort::registry().to_vec());
    }

    let mut selected: Vec<&'static dyn SortAlgorithm> = Vec::with_capacity(names.len());
    for name in names {
        let alg = sort::find(name).ok_or_else(|| BenchError::UnknownAlgorithm {
            name: name.clone(),
        })?;
        if !selected.iter().any(|a| a.name() == alg.name()) {
            selected.push(alg);
        }
    }
    Ok(selected)
}
