// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Number of threads taking part in a concurrent sort, the initiating thread
/// included.
///
/// All the threads of a sort increment the same counter, so it lives on its
/// own cache line.
#[derive(Debug)]
pub struct SpawnCounter {
    count: CachePadded<AtomicUsize>,
}

impl SpawnCounter {
    /// Creates a counter accounting for the initiating thread only.
    pub fn new() -> Self {
        Self {
            count: CachePadded::new(AtomicUsize::new(1)),
        }
    }

    /// Records one more successfully launched thread, returning the updated
    /// count.
    pub fn increment(&self) -> usize {
        let previous = self.count.fetch_add(1, Ordering::SeqCst);
        assert!(previous != usize::MAX, "Spawn counter overflowed");
        previous + 1
    }

    /// Returns the current count.
    ///
    /// The count is only final once every thread that may increment it has
    /// been joined.
    pub fn get(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Default for SpawnCounter {
    fn default() -> Self {
        Self::new()
    }
}
