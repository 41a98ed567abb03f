use super::SortError;

/// Largest `max - min + 1` the counting table may span (64 Mi slots).
pub const COUNTING_SORT_MAX_RANGE: u64 = 1 << 26;

fn bounds(data: &[i32]) -> Option<(i32, i32)> {
    data.iter().copied().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Number of counting table slots `data` needs (`max - min + 1`); `None` when empty.
pub fn counting_range(data: &[i32]) -> Option<u64> {
    bounds(data).map(|(min, max)| (i64::from(max) - i64::from(min) + 1) as u64)
}

/// Stable counting sort over the value range of `data`.
///
/// Values are offset by the input minimum, so negative keys are fine. `counts`
/// and `out` are scratch buffers; they are resized as needed and may be reused.
pub fn counting_sort(
    data: &mut [i32],
    counts: &mut Vec<usize>,
    out: &mut Vec<i32>,
) -> Result<(), SortError> {
    let Some((min, max)) = bounds(data) else {
        return Ok(());
    };

    let range = (i64::from(max) - i64::from(min) + 1) as u64;
    if range > COUNTING_SORT_MAX_RANGE {
        return Err(SortError::RangeTooLarge {
            range,
            limit: COUNTING_SORT_MAX_RANGE,
        });
    }
    let slot = |v: i32| (i64::from(v) - i64::from(min)) as usize;

    counts.clear();
    counts.resize(range as usize, 0);
    for &v in data.iter() {
        counts[slot(v)] += 1;
    }
    for i in 1..counts.len() {
        counts[i] += counts[i - 1];
    }

    out.clear();
    out.resize(data.len(), 0);
    for &v in data.iter().rev() {
        let c = &mut counts[slot(v)];
        *c -= 1;
        out[*c] = v;
    }

    data.copy_from_slice(out);
    Ok(())
}
