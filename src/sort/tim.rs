use super::Run;

/// Run length used by the fixed-run variant.
pub const RUN: usize = 32;

/// Inputs shorter than this are insertion sorted outright by the adaptive variant.
pub const MIN_MERGE: usize = 32;

/// minrun is reduced until it drops below this threshold.
const MINRUN_THRESHOLD: usize = 64;

fn insertion_sort(a: &mut [i32]) {
    for i in 1..a.len() {
        let temp = a[i];
        let mut j = i;
        while j > 0 && a[j - 1] > temp {
            a[j] = a[j - 1];
            j -= 1;
        }
        a[j] = temp;
    }
}

/// Merge the sorted halves `a[..mid]` and `a[mid..]` in place, using `buf` for the
/// left half. Ties take the left element first, which keeps the merge stable.
fn merge(a: &mut [i32], mid: usize, buf: &mut Vec<i32>) {
    buf.clear();
    buf.extend_from_slice(&a[..mid]);

    let (mut i, mut j, mut k) = (0, mid, 0);
    while i < buf.len() && j < a.len() {
        if buf[i] <= a[j] {
            a[k] = buf[i];
            i += 1;
        } else {
            a[k] = a[j];
            j += 1;
        }
        k += 1;
    }

    // Whatever is left of the right half is already in place.
    let rest = buf.len() - i;
    a[k..k + rest].copy_from_slice(&buf[i..]);
}

/// Tim sort with fixed runs: insertion sort every `RUN` elements, then merge
/// neighbouring blocks bottom-up with doubling width.
pub fn tim_sort(a: &mut [i32], buf: &mut Vec<i32>) {
    let n = a.len();
    for chunk in a.chunks_mut(RUN) {
        insertion_sort(chunk);
    }

    let mut size = RUN;
    while size < n {
        for left in (0..n).step_by(2 * size) {
            let mid = left + size;
            let right = (left + 2 * size).min(n);
            if mid < right {
                merge(&mut a[left..right], size, buf);
            }
        }
        size *= 2;
    }
}

/// Minimum run length for an input of `n` elements.
///
/// Takes the top bits of `n` while it is at least 64 and adds one if any of the
/// shifted-off bits were set, so `n / minrun` is at or just below a power of two.
pub fn calculate_minrun(mut n: usize) -> usize {
    let mut r = 0;
    while n >= MINRUN_THRESHOLD {
        r |= n & 1;
        n >>= 1;
    }
    n + r
}

/// Length of the natural run at the start of `a`. A strictly descending run is
/// reversed in place so every returned run is ascending.
fn find_run(a: &mut [i32]) -> usize {
    if a.len() < 2 {
        return a.len();
    }

    let mut end = 2;
    if a[1] >= a[0] {
        while end < a.len() && a[end] >= a[end - 1] {
            end += 1;
        }
    } else {
        while end < a.len() && a[end] < a[end - 1] {
            end += 1;
        }
        a[..end].reverse();
    }
    end
}

/// Merge stack entries `n` and `n + 1`.
fn merge_at(a: &mut [i32], runs: &mut Vec<Run>, n: usize, buf: &mut Vec<i32>) {
    let Run { start, len: left } = runs[n];
    let right = runs[n + 1].len;
    debug_assert_eq!(start + left, runs[n + 1].start);

    merge(&mut a[start..start + left + right], left, buf);
    runs[n].len += right;
    runs.remove(n + 1);
}

/// Restore the stack invariants, for the top three runs A, B, C:
/// `A > B + C` and `B > C`.
fn merge_collapse(a: &mut [i32], runs: &mut Vec<Run>, buf: &mut Vec<i32>) {
    while runs.len() > 1 {
        let mut n = runs.len() - 2;
        if (n > 0 && runs[n - 1].len <= runs[n].len + runs[n + 1].len)
            || (n > 1 && runs[n - 2].len <= runs[n - 1].len + runs[n].len)
        {
            if runs[n - 1].len < runs[n + 1].len {
                n -= 1;
            }
        } else if runs[n].len > runs[n + 1].len {
            break;
        }
        merge_at(a, runs, n, buf);
    }
}

fn merge_force_collapse(a: &mut [i32], runs: &mut Vec<Run>, buf: &mut Vec<i32>) {
    while runs.len() > 1 {
        let mut n = runs.len() - 2;
        if n > 0 && runs[n - 1].len < runs[n + 1].len {
            n -= 1;
        }
        merge_at(a, runs, n, buf);
    }
}

/// Tim sort over natural runs.
///
/// Runs shorter than minrun are extended by insertion sort, pushed on `runs`, and
/// merged whenever the stack invariants break; whatever is pending at the end is
/// merged down to a single run.
pub fn tim_sort_adaptive(a: &mut [i32], buf: &mut Vec<i32>, runs: &mut Vec<Run>) {
    let n = a.len();
    if n < MIN_MERGE {
        insertion_sort(a);
        return;
    }

    let minrun = calculate_minrun(n);
    runs.clear();

    let mut start = 0;
    while start < n {
        let mut len = find_run(&mut a[start..]);
        if len < minrun {
            let end = (start + minrun).min(n);
            insertion_sort(&mut a[start..end]);
            len = end - start;
        }

        runs.push(Run { start, len });
        merge_collapse(a, runs, buf);
        start += len;
    }

    merge_force_collapse(a, runs, buf);
    debug_assert!(runs.len() == 1 && runs[0].len == n);
}
