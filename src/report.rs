// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Human-readable rendering of lists and timings.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

/// Displays a list of integers separated by commas.
///
/// ```
/// # use fanout_sort::report::CommaSeparated;
/// assert_eq!(CommaSeparated(&[1, 3, 5]).to_string(), "1, 3, 5");
/// ```
#[derive(Clone, Copy, Debug)]
pub struct CommaSeparated<'a>(pub &'a [i32]);

impl Display for CommaSeparated<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut iter = self.0.iter();
        if let Some(first) = iter.next() {
            write!(f, "{first}")?;
            for x in iter {
                write!(f, ", {x}")?;
            }
        }
        Ok(())
    }
}

/// Timing of one sort, displayed as a single diagnostic line.
#[derive(Clone, Copy, Debug)]
pub struct SortTiming<'a> {
    /// Name of the sorting mode.
    pub label: &'a str,
    /// Wall-clock time spent sorting.
    pub elapsed: Duration,
    /// Number of threads that took part in the sort, if known.
    pub spawned_threads: Option<usize>,
}

impl Display for SortTiming<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} quicksort took {:?}", self.label, self.elapsed)?;
        if let Some(spawned_threads) = self.spawned_threads {
            write!(f, ", spawning {spawned_threads} thread(s)")?;
        }
        Ok(())
    }
}
