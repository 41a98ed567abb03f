//! In-place integer sorting algorithms and the registry the harness measures.
//!
//! Every algorithm sorts a `&mut [i32]` ascending. Scratch memory (merge buffer,
//! run stack, counting table) and the pivot RNG live in a [`SortContext`] that the
//! caller keeps across calls, so repeated sorts of same-sized inputs do not allocate.
//!
//! | name                    | strategy                                             |
//! |-------------------------|------------------------------------------------------|
//! | `quick_sort`            | Lomuto partition, last element as pivot              |
//! | `randomized_quick_sort` | Lomuto partition, uniformly random pivot             |
//! | `quick_3way_sort`       | three-way (`<`, `==`, `>`) partition                 |
//! | `counting_sort`         | stable counting sort over the input's value range    |
//! | `tim_sort`              | fixed 32-element runs + bottom-up merging            |
//! | `tim_sort_adaptive`     | natural runs, minrun extension, run-stack merging    |
//! | `std_unstable`          | `slice::sort_unstable` baseline                      |

mod counting;
mod quick;
mod tim;

pub use counting::{counting_range, counting_sort, COUNTING_SORT_MAX_RANGE};
pub use quick::{quick_3way_sort, quick_sort, randomized_quick_sort};
pub use tim::{calculate_minrun, tim_sort, tim_sort_adaptive, MIN_MERGE, RUN};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Failures reported by a sort call or by the post-sort check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SortError {
    #[error("output not sorted at index {index} ({left} > {right}), length {len}")]
    NotSorted {
        index: usize,
        left: i32,
        right: i32,
        len: usize,
    },

    #[error("value range {range} exceeds the counting sort limit of {limit}")]
    RangeTooLarge { range: u64, limit: u64 },
}

/// A pending run on the adaptive tim sort stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Run {
    pub start: usize,
    pub len: usize,
}

/// Reusable scratch state shared by all algorithms.
#[derive(Clone, Debug)]
pub struct SortContext {
    pub(crate) rng: ChaCha8Rng,
    pub(crate) buf: Vec<i32>,
    pub(crate) counts: Vec<usize>,
    pub(crate) runs: Vec<Run>,
}

impl SortContext {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            buf: Vec::new(),
            counts: Vec::new(),
            runs: Vec::new(),
        }
    }

    /// Pre-size the buffers for inputs of `len` elements.
    pub fn reserve(&mut self, len: usize) {
        self.buf.reserve(len.saturating_sub(self.buf.len()));
        // Enough pending runs for any input that fits in memory.
        self.runs.reserve(85usize.saturating_sub(self.runs.len()));
    }
}

impl Default for SortContext {
    fn default() -> Self {
        Self::new(0)
    }
}

/// A sorting algorithm the harness can measure.
pub trait SortAlgorithm: Send + Sync {
    /// Stable identifier, used on the command line and in result file names.
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn sort(&self, data: &mut [i32], ctx: &mut SortContext) -> Result<(), SortError>;

    /// Size the scratch buffers in `ctx` for sorting `data`. Called before the
    /// clock starts, so `sort` itself does not allocate.
    fn prepare(&self, data: &[i32], ctx: &mut SortContext) {
        ctx.reserve(data.len());
    }
}

struct QuickSort;
struct RandomizedQuickSort;
struct Quick3WaySort;
struct CountingSort;
struct TimSort;
struct TimSortAdaptive;
struct StdUnstable;

impl SortAlgorithm for QuickSort {
    fn name(&self) -> &'static str {
        "quick_sort"
    }
    fn description(&self) -> &'static str {
        "Quick sort, Lomuto partition with the last element as pivot"
    }
    fn sort(&self, data: &mut [i32], _ctx: &mut SortContext) -> Result<(), SortError> {
        quick_sort(data);
        Ok(())
    }
}

impl SortAlgorithm for RandomizedQuickSort {
    fn name(&self) -> &'static str {
        "randomized_quick_sort"
    }
    fn description(&self) -> &'static str {
        "Quick sort, Lomuto partition with a uniformly random pivot"
    }
    fn sort(&self, data: &mut [i32], ctx: &mut SortContext) -> Result<(), SortError> {
        randomized_quick_sort(data, &mut ctx.rng);
        Ok(())
    }
}

impl SortAlgorithm for Quick3WaySort {
    fn name(&self) -> &'static str {
        "quick_3way_sort"
    }
    fn description(&self) -> &'static str {
        "Quick sort with three-way partitioning around the last element"
    }
    fn sort(&self, data: &mut [i32], _ctx: &mut SortContext) -> Result<(), SortError> {
        quick_3way_sort(data);
        Ok(())
    }
}

impl SortAlgorithm for CountingSort {
    fn name(&self) -> &'static str {
        "counting_sort"
    }
    fn description(&self) -> &'static str {
        "Stable counting sort over the input's [min, max] range"
    }
    fn sort(&self, data: &mut [i32], ctx: &mut SortContext) -> Result<(), SortError> {
        counting_sort(data, &mut ctx.counts, &mut ctx.buf)
    }
    fn prepare(&self, data: &[i32], ctx: &mut SortContext) {
        ctx.reserve(data.len());
        // An oversized range is reported by `sort`; nothing to reserve for it.
        if let Some(range) = counting_range(data).filter(|&r| r <= COUNTING_SORT_MAX_RANGE) {
            let range = range as usize;
            ctx.counts.reserve(range.saturating_sub(ctx.counts.len()));
        }
    }
}

impl SortAlgorithm for TimSort {
    fn name(&self) -> &'static str {
        "tim_sort"
    }
    fn description(&self) -> &'static str {
        "Tim sort, fixed runs of 32 merged bottom-up"
    }
    fn sort(&self, data: &mut [i32], ctx: &mut SortContext) -> Result<(), SortError> {
        tim_sort(data, &mut ctx.buf);
        Ok(())
    }
}

impl SortAlgorithm for TimSortAdaptive {
    fn name(&self) -> &'static str {
        "tim_sort_adaptive"
    }
    fn description(&self) -> &'static str {
        "Tim sort with natural runs, minrun extension and a merge stack"
    }
    fn sort(&self, data: &mut [i32], ctx: &mut SortContext) -> Result<(), SortError> {
        tim_sort_adaptive(data, &mut ctx.buf, &mut ctx.runs);
        Ok(())
    }
}

impl SortAlgorithm for StdUnstable {
    fn name(&self) -> &'static str {
        "std_unstable"
    }
    fn description(&self) -> &'static str {
        "Baseline: the standard library's unstable sort"
    }
    fn sort(&self, data: &mut [i32], _ctx: &mut SortContext) -> Result<(), SortError> {
        data.sort_unstable();
        Ok(())
    }
}

static REGISTRY: &[&dyn SortAlgorithm] = &[
    &QuickSort,
    &RandomizedQuickSort,
    &Quick3WaySort,
    &CountingSort,
    &TimSort,
    &TimSortAdaptive,
    &StdUnstable,
];

/// Every registered algorithm, in a fixed order.
pub fn registry() -> &'static [&'static dyn SortAlgorithm] {
    REGISTRY
}

/// Look an algorithm up by name.
pub fn find(name: &str) -> Option<&'static dyn SortAlgorithm> {
    REGISTRY.iter().copied().find(|a| a.name() == name)
}

/// Check if a slice is sorted in ascending order.
#[inline]
pub fn is_sorted(data: &[i32]) -> bool {
    data.windows(2).all(|w| w[0] <= w[1])
}

/// Like [`is_sorted`], but reports the first out-of-order pair.
pub fn check_sorted(data: &[i32]) -> Result<(), SortError> {
    match data.windows(2).position(|w| w[0] > w[1]) {
        None => Ok(()),
        Some(index) => Err(SortError::NotSorted {
            index,
            left: data[index],
            right: data[index + 1],
            len: data.len(),
        }),
    }
}
