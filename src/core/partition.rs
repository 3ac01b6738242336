// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Three-way partitioning around the first element, and the matching merge.

/// The result of splitting a sequence around its first element.
///
/// Every item of `less` is smaller than `pivot`, every item of `more` is
/// greater than `pivot`, and `less.len() + equal + more.len()` is the length of
/// the partitioned input. Both buffers keep the relative order of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// The first element of the partitioned input.
    pub pivot: i32,
    /// Items strictly smaller than the pivot.
    pub less: Vec<i32>,
    /// Number of items equal to the pivot, the pivot itself included.
    pub equal: usize,
    /// Items strictly greater than the pivot.
    pub more: Vec<i32>,
}

/// Splits the input around its first element into freshly allocated buffers.
///
/// The input is read twice: once to size the buffers and once to fill them.
///
/// ```
/// # use fanout_sort::{partition, Partition};
/// assert_eq!(
///     partition(&[5, 3, 5, 1, 5]),
///     Partition {
///         pivot: 5,
///         less: vec![3, 1],
///         equal: 3,
///         more: vec![],
///     }
/// );
/// ```
///
/// # Panics
///
/// Panics if the input is empty, as there is no pivot to split around.
pub fn partition(input: &[i32]) -> Partition {
    let Some(&pivot) = input.first() else {
        panic!("Cannot partition an empty sequence");
    };

    let (less_len, more_len) =
        input
            .iter()
            .fold((0, 0), |(less_len, more_len), &x| match x.cmp(&pivot) {
                std::cmp::Ordering::Less => (less_len + 1, more_len),
                std::cmp::Ordering::Greater => (less_len, more_len + 1),
                std::cmp::Ordering::Equal => (less_len, more_len),
            });

    let mut less = Vec::with_capacity(less_len);
    let mut more = Vec::with_capacity(more_len);
    for &x in input {
        if x < pivot {
            less.push(x);
        } else if x > pivot {
            more.push(x);
        }
    }

    // The pivot itself is always counted as equal.
    let equal = input.len() - less_len - more_len;
    assert!(equal >= 1);

    Partition {
        pivot,
        less,
        equal,
        more,
    }
}

/// Concatenates a sorted prefix, `equal` copies of the pivot and a sorted
/// suffix.
///
/// The `sorted_less` buffer is reused as the output buffer.
pub fn assemble(
    mut sorted_less: Vec<i32>,
    pivot: i32,
    equal: usize,
    sorted_more: Vec<i32>,
) -> Vec<i32> {
    sorted_less.reserve_exact(equal + sorted_more.len());
    sorted_less.extend(std::iter::repeat(pivot).take(equal));
    sorted_less.extend_from_slice(&sorted_more);
    sorted_less
}
