//! Sorting and searching helpers
//!
//! Formation assignment sorts slot costs and characters with `quicksort_by`,
//! and bookkeeping tables are kept ordered so lookups can binary search.
//! Both are deterministic for a given input order.

use std::cmp::Ordering;

/// Below this length partitions fall back to insertion sort
const INSERTION_THRESHOLD: usize = 12;

/// In-place quicksort with a caller-supplied comparator
///
/// Not stable. Uses median-of-three pivots and recurses into the smaller
/// partition first so stack depth stays logarithmic.
pub fn quicksort_by<T, F>(items: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    quicksort_inner(items, &mut compare);
}

/// Quicksort keyed by an `f32`, ascending. NaN sorts last.
pub fn quicksort_by_cost<T, F>(items: &mut [T], mut cost: F)
where
    F: FnMut(&T) -> f32,
{
    quicksort_by(items, |a, b| cost(a).total_cmp(&cost(b)));
}

fn quicksort_inner<T, F>(mut items: &mut [T], compare: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    loop {
        let len = items.len();
        if len <= INSERTION_THRESHOLD {
            insertion_sort(items, compare);
            return;
        }

        let pivot = partition(items, compare);
        let (left, right) = std::mem::take(&mut items).split_at_mut(pivot);
        // right[0] is the pivot, already in its final place
        let right = &mut right[1..];
        if left.len() < right.len() {
            quicksort_inner(left, compare);
            items = right;
        } else {
            quicksort_inner(right, compare);
            items = left;
        }
    }
}

/// Lomuto partition around a median-of-three pivot; returns the pivot index
fn partition<T, F>(items: &mut [T], compare: &mut F) -> usize
where
    F: FnMut(&T, &T) -> Ordering,
{
    let last = items.len() - 1;
    let mid = last / 2;

    if compare(&items[mid], &items[0]) == Ordering::Less {
        items.swap(mid, 0);
    }
    if compare(&items[last], &items[0]) == Ordering::Less {
        items.swap(last, 0);
    }
    if compare(&items[mid], &items[last]) == Ordering::Less {
        items.swap(mid, last);
    }
    // Median now sits at `last`

    let mut store = 0;
    for i in 0..last {
        if compare(&items[i], &items[last]) == Ordering::Less {
            items.swap(i, store);
            store += 1;
        }
    }
    items.swap(store, last);
    store
}

fn insertion_sort<T, F>(items: &mut [T], compare: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && compare(&items[j], &items[j - 1]) == Ordering::Less {
            items.swap(j, j - 1);
            j -= 1;
        }
    }
}

/// Binary search a slice sorted ascending by `key`
///
/// Returns the index of a matching element, or `None`.
pub fn binary_search_by_key<T, K, F>(items: &[T], key: &K, mut extract: F) -> Option<usize>
where
    K: Ord,
    F: FnMut(&T) -> K,
{
    let (mut low, mut high) = (0usize, items.len());
    while low < high {
        let mid = low + (high - low) / 2;
        match extract(&items[mid]).cmp(key) {
            Ordering::Less => low = mid + 1,
            Ordering::Greater => high = mid,
            Ordering::Equal => return Some(mid),
        }
    }
    None
}

/// Index where `key` would be inserted to keep `items` sorted
pub fn insertion_point_by_key<T, K, F>(items: &[T], key: &K, mut extract: F) -> usize
where
    K: Ord,
    F: FnMut(&T) -> K,
{
    items.partition_point(|item| extract(item) < *key)
}

/// Binary search by an `f32` cost; returns the first index with cost >= `cost`
pub fn lower_bound_by_cost<T, F>(items: &[T], cost: f32, mut extract: F) -> usize
where
    F: FnMut(&T) -> f32,
{
    items.partition_point(|item| extract(item).total_cmp(&cost) == Ordering::Less)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_quicksort_small_and_large() {
        let mut small = [3, 1, 2];
        quicksort_by(&mut small, |a, b| a.cmp(b));
        assert_eq!(small, [1, 2, 3]);

        let mut large: Vec<i32> = (0..100).rev().collect();
        quicksort_by(&mut large, |a, b| a.cmp(b));
        assert_eq!(large, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_quicksort_by_cost_handles_infinity() {
        let mut costs = vec![5.0, f32::INFINITY, 0.5, 2.0];
        quicksort_by_cost(&mut costs, |c| *c);
        assert_eq!(costs, vec![0.5, 2.0, 5.0, f32::INFINITY]);
    }

    #[test]
    fn test_binary_search_by_key() {
        let items = [(1, 'a'), (4, 'b'), (9, 'c')];
        assert_eq!(binary_search_by_key(&items, &4, |i| i.0), Some(1));
        assert_eq!(binary_search_by_key(&items, &5, |i| i.0), None);
        assert_eq!(binary_search_by_key::<(i32, char), i32, _>(&[], &5, |i| i.0), None);
        assert_eq!(insertion_point_by_key(&items, &5, |i| i.0), 2);
    }

    #[test]
    fn test_lower_bound_by_cost() {
        let costs = [0.0, 1.0, 1.0, 3.0];
        assert_eq!(lower_bound_by_cost(&costs, 1.0, |c| *c), 1);
        assert_eq!(lower_bound_by_cost(&costs, 10.0, |c| *c), 4);
    }

    proptest! {
        #[test]
        fn prop_quicksort_matches_std(mut values in proptest::collection::vec(-1000i32..1000, 0..200)) {
            let mut expected = values.clone();
            expected.sort();
            quicksort_by(&mut values, |a, b| a.cmp(b));
            prop_assert_eq!(values, expected);
        }

        #[test]
        fn prop_binary_search_finds_present(values in proptest::collection::btree_set(0u32..10_000, 1..100)) {
            let sorted: Vec<u32> = values.into_iter().collect();
            for (i, v) in sorted.iter().enumerate() {
                prop_assert_eq!(binary_search_by_key(&sorted, v, |x| *x), Some(i));
            }
        }
    }
}
