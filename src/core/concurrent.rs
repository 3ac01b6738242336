// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A quicksort spawning one thread per non-empty partition.

use super::counter::SpawnCounter;
use super::partition::{assemble, partition, Partition};
use super::sequential::sort_sequential;
use crate::macros::{log_debug, log_error, log_warn};
#[cfg(feature = "log_parallelism")]
use crate::macros::{log_info, log_trace};
use crossbeam_utils::CachePadded;
use std::borrow::Cow;
use std::io;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvError, SendError};
use std::thread::{Builder, Scope, ScopedJoinHandle};

/// Stack size of the threads spawned by a [`ConcurrentSorter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StackSize {
    /// Use the default stack size of [`std::thread::Builder`].
    Default,
    /// Use the given number of bytes.
    Bytes(NonZeroUsize),
}

impl TryFrom<usize> for StackSize {
    type Error = <NonZeroUsize as TryFrom<usize>>::Error;

    fn try_from(bytes: usize) -> Result<Self, Self::Error> {
        let bytes = NonZeroUsize::try_from(bytes)?;
        Ok(StackSize::Bytes(bytes))
    }
}

/// Policy applied to each attempt at launching a thread for a partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LaunchPolicy {
    /// Attempt to spawn a thread for every non-empty partition, without any
    /// depth limit. Only the operating system refusing to create a thread
    /// makes a partition fall back to inline sorting.
    Unbounded,
    /// Let the first `n` launch attempts of a sort reach the operating system,
    /// and fail every later attempt as if thread creation was exhausted.
    FailAfter(usize),
}

/// A builder for [`ConcurrentSorter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConcurrentSorterBuilder {
    /// Stack size of the spawned threads.
    pub stack_size: StackSize,
    /// Policy applied to each launch attempt.
    pub launch_policy: LaunchPolicy,
}

impl Default for ConcurrentSorterBuilder {
    fn default() -> Self {
        Self {
            stack_size: StackSize::Default,
            launch_policy: LaunchPolicy::Unbounded,
        }
    }
}

impl ConcurrentSorterBuilder {
    /// Creates a sorter with the configured parameters.
    ///
    /// ```
    /// # use fanout_sort::{ConcurrentSorterBuilder, LaunchPolicy, StackSize};
    /// let sorter = ConcurrentSorterBuilder {
    ///     stack_size: StackSize::try_from(256 * 1024).unwrap(),
    ///     launch_policy: LaunchPolicy::Unbounded,
    /// }
    /// .build();
    ///
    /// let (sorted, num_threads) = sorter.sort(&[9, 3, 7, 1, 8, 2, 5]);
    /// assert_eq!(sorted, [1, 2, 3, 5, 7, 8, 9]);
    /// assert!(num_threads >= 1);
    /// ```
    pub fn build(&self) -> ConcurrentSorter {
        ConcurrentSorter {
            stack_size: self.stack_size,
            launch_policy: self.launch_policy,
        }
    }
}

/// A quicksort that sorts each non-empty partition on its own thread.
///
/// Threads are spawned without any bound: each spawned thread owns a distinct
/// pivot, so sorting `n` items may launch up to `n - 1` threads. Whenever a
/// thread cannot be spawned, the corresponding partition is sorted inline with
/// [`sort_sequential()`] instead, without reporting any error.
#[derive(Clone, Copy, Debug)]
pub struct ConcurrentSorter {
    stack_size: StackSize,
    launch_policy: LaunchPolicy,
}

impl ConcurrentSorter {
    /// Sorts the input, returning a new sorted vector and the number of
    /// threads that took part in the sort, the calling thread included.
    pub fn sort(&self, input: &[i32]) -> (Vec<i32>, usize) {
        log_debug!("[main thread] Sorting {} items concurrently", input.len());

        let context = SortContext::new(self);
        // All the spawned threads are joined by the time the scope returns.
        let sorted = std::thread::scope(|scope| context.sort(scope, Cow::Borrowed(input), 0));
        let num_threads = context.counter.get();

        #[cfg(feature = "log_parallelism")]
        context.print_statistics();
        log_debug!(
            "[main thread] Sorted {} items with {num_threads} thread(s)",
            input.len()
        );

        (sorted, num_threads)
    }
}

/// Sorts the input with a default [`ConcurrentSorter`], returning a new sorted
/// vector and the number of threads that took part in the sort.
///
/// ```
/// # use fanout_sort::sort_concurrent;
/// let (sorted, num_threads) = sort_concurrent(&[]);
/// assert!(sorted.is_empty());
/// assert_eq!(num_threads, 1);
/// ```
pub fn sort_concurrent(input: &[i32]) -> (Vec<i32>, usize) {
    ConcurrentSorterBuilder::default().build().sort(input)
}

/// State shared by all the threads of one call to [`ConcurrentSorter::sort()`].
struct SortContext<'a> {
    sorter: &'a ConcurrentSorter,
    counter: SpawnCounter,
    /// Number of launch attempts so far.
    attempts: CachePadded<AtomicUsize>,
    #[cfg(feature = "log_parallelism")]
    failed_launches: CachePadded<AtomicUsize>,
}

/// A sorted partition, either already available or being computed by a
/// spawned thread.
enum Subtree<'scope> {
    Sorted(Vec<i32>),
    Pending(ScopedJoinHandle<'scope, Vec<i32>>),
}

impl Subtree<'_> {
    /// Waits for the sorted partition.
    fn join(self) -> Vec<i32> {
        match self {
            Subtree::Sorted(sorted) => sorted,
            Subtree::Pending(handle) => match handle.join() {
                Ok(sorted) => sorted,
                Err(payload) => {
                    log_error!("A sorting thread panicked, propagating the panic");
                    std::panic::resume_unwind(payload)
                }
            },
        }
    }
}

impl<'a> SortContext<'a> {
    fn new(sorter: &'a ConcurrentSorter) -> Self {
        Self {
            sorter,
            counter: SpawnCounter::new(),
            attempts: CachePadded::new(AtomicUsize::new(0)),
            #[cfg(feature = "log_parallelism")]
            failed_launches: CachePadded::new(AtomicUsize::new(0)),
        }
    }

    /// Partitions the input and sorts both sides, each on a new thread if
    /// possible.
    ///
    /// An owned input is released as soon as it is partitioned, so that a
    /// thread waiting on its subtree holds no copy of its items.
    fn sort<'scope, 'env>(
        &'scope self,
        scope: &'scope Scope<'scope, 'env>,
        input: Cow<'_, [i32]>,
        depth: usize,
    ) -> Vec<i32> {
        if input.len() <= 1 {
            return input.into_owned();
        }

        let Partition {
            pivot,
            less,
            equal,
            more,
        } = partition(&input);
        drop(input);

        let less = self.launch(scope, less, depth + 1);
        let more = self.launch(scope, more, depth + 1);
        // The output order doesn't depend on which thread finishes first.
        assemble(less.join(), pivot, equal, more.join())
    }

    /// Hands the partition over to a new thread, or sorts it inline if no
    /// thread could be spawned.
    fn launch<'scope, 'env>(
        &'scope self,
        scope: &'scope Scope<'scope, 'env>,
        data: Vec<i32>,
        depth: usize,
    ) -> Subtree<'scope> {
        if data.is_empty() {
            return Subtree::Sorted(data);
        }

        // The buffer is only sent once the thread exists, so that a failed
        // launch leaves it with the caller.
        let (sender, receiver) = mpsc::sync_channel::<Vec<i32>>(1);
        let spawned = self.spawn(scope, move || match receiver.recv() {
            Ok(data) => self.sort(scope, Cow::Owned(data), depth),
            // The sender sends right after a successful spawn, before anything
            // else can drop it.
            Err(RecvError) => unreachable!("a spawned thread always receives its partition"),
        });

        match spawned {
            Ok(handle) => {
                let sent = sender.send(data);
                let _num_threads = self.counter.increment();
                match sent {
                    Ok(()) => {
                        #[cfg(feature = "log_parallelism")]
                        log_trace!("[depth {depth}] Spawned thread #{_num_threads}");
                        Subtree::Pending(handle)
                    }
                    // The receiving thread is gone, its panic is reported when
                    // the scope ends.
                    Err(SendError(data)) => Subtree::Sorted(sort_sequential(&data)),
                }
            }
            Err(_e) => {
                #[cfg(feature = "log_parallelism")]
                self.failed_launches.fetch_add(1, Ordering::Relaxed);
                log_warn!(
                    "[depth {depth}] Failed to spawn a thread, sorting {} items inline: {_e}",
                    data.len()
                );
                Subtree::Sorted(sort_sequential(&data))
            }
        }
    }

    /// Attempts to spawn a thread in the scope, subject to the launch policy.
    fn spawn<'scope, 'env>(
        &self,
        scope: &'scope Scope<'scope, 'env>,
        f: impl FnOnce() -> Vec<i32> + Send + 'scope,
    ) -> io::Result<ScopedJoinHandle<'scope, Vec<i32>>> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        match self.sorter.launch_policy {
            LaunchPolicy::Unbounded => (),
            LaunchPolicy::FailAfter(budget) => {
                if attempt >= budget {
                    return Err(io::Error::other(format!(
                        "launch budget of {budget} thread(s) exhausted"
                    )));
                }
            }
        }

        let mut builder = Builder::new();
        if let StackSize::Bytes(bytes) = self.sorter.stack_size {
            builder = builder.stack_size(bytes.get());
        }
        builder.spawn_scoped(scope, f)
    }

    #[cfg(feature = "log_parallelism")]
    fn print_statistics(&self) {
        log_info!(
            "Concurrent sort statistics: {} launch attempt(s), {} thread(s) spawned, {} failed launch(es)",
            self.attempts.load(Ordering::SeqCst),
            self.counter.get() - 1,
            self.failed_launches.load(Ordering::SeqCst),
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha12Rng;

    fn sorter(launch_policy: LaunchPolicy) -> ConcurrentSorter {
        ConcurrentSorterBuilder {
            stack_size: StackSize::Default,
            launch_policy,
        }
        .build()
    }

    #[test]
    fn test_stack_size_try_from_usize() {
        assert!(StackSize::try_from(0).is_err());
        assert_eq!(
            StackSize::try_from(1),
            Ok(StackSize::Bytes(NonZeroUsize::try_from(1).unwrap()))
        );
    }

    #[test]
    fn test_default_builder() {
        assert_eq!(
            ConcurrentSorterBuilder::default(),
            ConcurrentSorterBuilder {
                stack_size: StackSize::Default,
                launch_policy: LaunchPolicy::Unbounded,
            }
        );
    }

    #[test]
    fn test_trivial_inputs_spawn_nothing() {
        assert_eq!(sort_concurrent(&[]), (vec![], 1));
        assert_eq!(sort_concurrent(&[42]), (vec![42], 1));
    }

    #[test]
    fn test_all_equal_spawns_nothing() {
        assert_eq!(sort_concurrent(&[7; 50]), (vec![7; 50], 1));
    }

    #[test]
    fn test_spawn_count_concrete_scenario() {
        // Spawns: [3, 7, 1, 8, 2, 5], then [1, 2] and [7, 8, 5], then [2], [5]
        // and [8].
        let (sorted, num_threads) = sort_concurrent(&[9, 3, 7, 1, 8, 2, 5]);
        assert_eq!(sorted, [1, 2, 3, 5, 7, 8, 9]);
        assert_eq!(num_threads, 7);
    }

    #[test]
    fn test_fail_after_zero_spawns_nothing() {
        let (sorted, num_threads) =
            sorter(LaunchPolicy::FailAfter(0)).sort(&[9, 3, 7, 1, 8, 2, 5]);
        assert_eq!(sorted, [1, 2, 3, 5, 7, 8, 9]);
        assert_eq!(num_threads, 1);
    }

    #[test]
    fn test_fail_after_two() {
        // The first two attempts spawn [3, 7, 1, 8, 2, 5] and [1, 2], all the
        // other attempts fail.
        let (sorted, num_threads) =
            sorter(LaunchPolicy::FailAfter(2)).sort(&[9, 3, 7, 1, 8, 2, 5]);
        assert_eq!(sorted, [1, 2, 3, 5, 7, 8, 9]);
        assert_eq!(num_threads, 3);
    }

    #[test]
    fn test_fail_after_bounds_spawn_count() {
        let mut rng = ChaCha12Rng::seed_from_u64(42);
        let input = (0..500)
            .map(|_| rng.random_range(-1000..1000))
            .collect::<Vec<i32>>();
        let mut expected = input.clone();
        expected.sort_unstable();

        for budget in [1, 5, 20, 100] {
            let (sorted, num_threads) = sorter(LaunchPolicy::FailAfter(budget)).sort(&input);
            assert_eq!(sorted, expected);
            assert!(num_threads <= budget + 1);
        }
    }

    #[test]
    fn test_spawn_count_upper_bound() {
        let mut rng = ChaCha12Rng::seed_from_u64(42);
        let input = (0..1_000)
            .map(|_| rng.random_range(-100..100))
            .collect::<Vec<i32>>();
        let (_, num_threads) = sort_concurrent(&input);
        assert!(num_threads >= 1);
        assert!(num_threads <= 2 * input.len() - 1);
    }

    #[test]
    fn test_increasing_input() {
        // Every partitioning step leaves a single non-empty side.
        let input = (0..1_000).collect::<Vec<i32>>();
        let (sorted, num_threads) = sort_concurrent(&input);
        assert_eq!(sorted, input);
        assert!(num_threads <= input.len());
    }

    #[test]
    fn test_large_increasing_input() {
        // Each thread waits on a single nested subtree, and the thread limit of
        // the platform may be reached before the innermost one.
        let input = (0..10_000).collect::<Vec<i32>>();
        let (sorted, num_threads) = sort_concurrent(&input);
        assert_eq!(sorted, input);
        assert!(num_threads <= input.len());
    }

    #[test]
    fn test_fallback_in_spawned_thread_on_increasing_input() {
        // The only spawned thread sorts 19 999 items inline, one partitioning
        // step per item, on a default-sized stack.
        let input = (0..20_000).collect::<Vec<i32>>();
        let (sorted, num_threads) = sorter(LaunchPolicy::FailAfter(1)).sort(&input);
        assert_eq!(sorted, input);
        assert_eq!(num_threads, 2);
    }

    #[test]
    fn test_fallback_in_spawned_thread_on_decreasing_input() {
        let input = (0..20_000).rev().collect::<Vec<i32>>();
        let (sorted, num_threads) = sorter(LaunchPolicy::FailAfter(1)).sort(&input);
        assert_eq!(sorted, (0..20_000).collect::<Vec<i32>>());
        assert_eq!(num_threads, 2);
    }

    #[test]
    fn test_custom_stack_size() {
        let sorter = ConcurrentSorterBuilder {
            stack_size: StackSize::try_from(256 * 1024).unwrap(),
            launch_policy: LaunchPolicy::Unbounded,
        }
        .build();
        let input = (0..300).rev().collect::<Vec<i32>>();
        let (sorted, _) = sorter.sort(&input);
        assert_eq!(sorted, (0..300).collect::<Vec<i32>>());
    }

    #[test]
    fn test_sorter_is_reusable() {
        let sorter = sorter(LaunchPolicy::FailAfter(3));
        for _ in 0..3 {
            let (sorted, num_threads) = sorter.sort(&[9, 3, 7, 1, 8, 2, 5]);
            assert_eq!(sorted, [1, 2, 3, 5, 7, 8, 9]);
            // The launch budget applies to each sort separately.
            assert_eq!(num_threads, 4);
        }
    }
}
