// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use super::partition::{assemble, partition, Partition};
use std::borrow::Cow;

/// Sorts the input on the current thread, returning a new sorted vector.
///
/// The pivot of each partitioning step is the first element of the
/// sub-sequence. Only the smaller side of each step is sorted recursively and
/// the larger side is sorted in a loop, so the recursion depth stays
/// logarithmic in the input length, even for already sorted inputs.
///
/// ```
/// # use fanout_sort::sort_sequential;
/// assert_eq!(sort_sequential(&[5, 3, 5, 1, 5]), [1, 3, 5, 5, 5]);
/// ```
pub fn sort_sequential(input: &[i32]) -> Vec<i32> {
    // Sorted prefix of the output.
    let mut sorted = Vec::with_capacity(input.len());
    // Pivot runs and sorted right sides that follow the current sub-sequence,
    // innermost last.
    let mut suffixes: Vec<(i32, usize, Vec<i32>)> = Vec::new();
    let mut current = Cow::Borrowed(input);

    while current.len() > 1 {
        let Partition {
            pivot,
            less,
            equal,
            more,
        } = partition(&current);
        drop(current);

        if less.len() <= more.len() {
            sorted.extend_from_slice(&sort_sequential(&less));
            sorted = assemble(sorted, pivot, equal, Vec::new());
            current = Cow::Owned(more);
        } else {
            suffixes.push((pivot, equal, sort_sequential(&more)));
            current = Cow::Owned(less);
        }
    }

    sorted.extend_from_slice(&current);
    for (pivot, equal, sorted_more) in suffixes.into_iter().rev() {
        sorted = assemble(sorted, pivot, equal, sorted_more);
    }
    sorted
}
