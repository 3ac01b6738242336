// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#![doc = include_str!("../README.md")]
#![forbid(missing_docs, unsafe_code)]

mod core;
pub mod input;
mod macros;
pub mod report;

pub use crate::core::{
    assemble, partition, sort_concurrent, sort_sequential, ConcurrentSorter,
    ConcurrentSorterBuilder, LaunchPolicy, Partition, SpawnCounter, StackSize,
};
