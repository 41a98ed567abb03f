use rand::Rng;

/// Lomuto partition around the last element.
///
/// Elements `<= pivot` end up left of the returned index, greater elements right
/// of it; the pivot itself lands on the returned index.
fn partition(a: &mut [i32]) -> usize {
    let pivot = a[a.len() - 1];
    let mut k = 0;
    for l in 0..a.len() {
        if a[l] <= pivot {
            a.swap(k, l);
            k += 1;
        }
    }
    // The pivot always satisfies `<= pivot`, so k >= 1.
    k - 1
}

/// Three-way partition around the last element.
///
/// Returns `(lt, gt)`: `a[..lt] < pivot`, `a[lt..gt] == pivot`, `a[gt..] > pivot`.
fn partition_3way(a: &mut [i32]) -> (usize, usize) {
    let pivot = a[a.len() - 1];
    let (mut p1, mut p2) = (0, 0);

    for p3 in 0..a.len() {
        if a[p3] < pivot {
            a.swap(p3, p2);
            a.swap(p2, p1);
            p1 += 1;
            p2 += 1;
        } else if a[p3] == pivot {
            a.swap(p3, p2);
            p2 += 1;
        }
    }

    (p1, p2)
}

// Recurse into the shorter side, iterate on the longer one: stack depth stays
// O(log n) even when the pivot choice degrades.

/// Quick sort with the last element as pivot.
pub fn quick_sort(mut a: &mut [i32]) {
    while a.len() > 1 {
        let k = partition(a);
        let (left, rest) = std::mem::take(&mut a).split_at_mut(k);
        let right = &mut rest[1..];

        if left.len() < right.len() {
            quick_sort(left);
            a = right;
        } else {
            quick_sort(right);
            a = left;
        }
    }
}

/// Quick sort with a uniformly random pivot drawn from `rng`.
pub fn randomized_quick_sort<R: Rng + ?Sized>(mut a: &mut [i32], rng: &mut R) {
    while a.len() > 1 {
        let last = a.len() - 1;
        let x = rng.gen_range(0..a.len());
        a.swap(x, last);

        let k = partition(a);
        let (left, rest) = std::mem::take(&mut a).split_at_mut(k);
        let right = &mut rest[1..];

        if left.len() < right.len() {
            randomized_quick_sort(left, rng);
            a = right;
        } else {
            randomized_quick_sort(right, rng);
            a = left;
        }
    }
}

/// Quick sort with three-way partitioning; runs of equal keys are never revisited.
pub fn quick_3way_sort(mut a: &mut [i32]) {
    while a.len() > 1 {
        let (lt, gt) = partition_3way(a);
        let (left, rest) = std::mem::take(&mut a).split_at_mut(lt);
        let right = &mut rest[gt - lt..];

        if left.len() < right.len() {
            quick_3way_sort(left);
            a = right;
        } else {
            quick_3way_sort(right);
            a = left;
        }
    }
}
