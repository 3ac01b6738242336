// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Core engine: partitioning, sequential and concurrent sorters.

mod concurrent;
mod counter;
mod partition;
mod sequential;

pub use concurrent::{
    sort_concurrent, ConcurrentSorter, ConcurrentSorterBuilder, LaunchPolicy, StackSize,
};
pub use counter::SpawnCounter;
pub use partition::{assemble, partition, Partition};
pub use sequential::sort_sequential;
