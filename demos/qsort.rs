// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! CLI tool to sort a file of integers, sequentially and with one thread per
//! partition.

use clap::{Parser, ValueEnum};
use fanout_sort::input::load_integers;
use fanout_sort::report::{CommaSeparated, SortTiming};
use fanout_sort::{sort_sequential, ConcurrentSorterBuilder, LaunchPolicy, StackSize};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

fn main() -> ExitCode {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match usage_error_status(&e) {
            None => e.exit(),
            Some(status) => {
                // Like `clap::Error::exit()`, a failure to write the message is
                // ignored: stderr is where it would be reported, and the exit
                // status still signals the usage error.
                let _ = e.print();
                return ExitCode::from(status);
            }
        },
    };

    let input = match load_integers(&cli.file) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if matches!(cli.mode, Mode::Sequential | Mode::Both) {
        if cli.print {
            println!(
                "Unsorted list before non-threaded quicksort:  {}",
                CommaSeparated(&input)
            );
        }

        let start = Instant::now();
        let sorted = sort_sequential(&input);
        let elapsed = start.elapsed();

        if cli.print {
            println!("Resulting list:  {}", CommaSeparated(&sorted));
        }
        println!(
            "{}",
            SortTiming {
                label: "Non-threaded",
                elapsed,
                spawned_threads: None,
            }
        );
    }

    if matches!(cli.mode, Mode::Concurrent | Mode::Both) {
        let sorter = ConcurrentSorterBuilder {
            stack_size: match cli.stack_size {
                Some(bytes) => StackSize::Bytes(bytes),
                None => StackSize::Default,
            },
            launch_policy: match cli.fail_after {
                Some(budget) => LaunchPolicy::FailAfter(budget),
                None => LaunchPolicy::Unbounded,
            },
        }
        .build();

        if cli.print {
            println!(
                "Unsorted list before threaded quicksort:  {}",
                CommaSeparated(&input)
            );
        }

        let start = Instant::now();
        let (sorted, num_threads) = sorter.sort(&input);
        let elapsed = start.elapsed();

        if cli.print {
            println!("Resulting list:  {}", CommaSeparated(&sorted));
        }
        println!(
            "{}",
            SortTiming {
                label: "Threaded",
                elapsed,
                spawned_threads: Some(num_threads),
            }
        );
    }

    ExitCode::SUCCESS
}

/// Exit status for a command line that couldn't be parsed. Help and version
/// requests aren't errors, and yield `None`.
fn usage_error_status(error: &clap::Error) -> Option<u8> {
    error.use_stderr().then_some(1)
}

/// CLI tool to sort a file of integers.
#[derive(Parser, Debug, PartialEq, Eq)]
#[command(version)]
struct Cli {
    /// Print the list before and after each sort.
    #[arg(short = 'p')]
    print: bool,

    /// File of whitespace-separated integers.
    file: PathBuf,

    /// Sorting mode(s) to run.
    #[arg(long, value_enum, default_value_t = Mode::Both)]
    mode: Mode,

    /// Stack size of the spawned threads, in bytes. Default to the platform's
    /// default.
    #[arg(long)]
    stack_size: Option<NonZeroUsize>,

    /// Number of launch attempts allowed to spawn a thread, later attempts
    /// sort inline. Default to no limit.
    #[arg(long)]
    fail_after: Option<usize>,
}

/// Sorting mode(s) to run.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// Sort on the calling thread only.
    Sequential,
    /// Sort with one thread per partition.
    Concurrent,
    /// Run both sorts one after the other.
    Both,
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("qsort").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_file_only() {
        assert_eq!(
            parse(&["numbers.txt"]).unwrap(),
            Cli {
                print: false,
                file: PathBuf::from("numbers.txt"),
                mode: Mode::Both,
                stack_size: None,
                fail_after: None,
            }
        );
    }

    #[test]
    fn test_parse_all_options() {
        assert_eq!(
            parse(&[
                "-p",
                "--mode",
                "concurrent",
                "--stack-size",
                "65536",
                "--fail-after",
                "3",
                "numbers.txt",
            ])
            .unwrap(),
            Cli {
                print: true,
                file: PathBuf::from("numbers.txt"),
                mode: Mode::Concurrent,
                stack_size: NonZeroUsize::new(65536),
                fail_after: Some(3),
            }
        );
    }

    #[test]
    fn test_usage_errors_exit_with_status_one() {
        let cases: [&[&str]; 5] = [
            &[],
            &["a.txt", "b.txt"],
            &["-x", "numbers.txt"],
            &["--stack-size", "0", "numbers.txt"],
            &["--mode", "parallel", "numbers.txt"],
        ];
        for args in cases {
            let error = parse(args).unwrap_err();
            assert_eq!(usage_error_status(&error), Some(1), "{args:?}");
        }
    }

    #[test]
    fn test_help_and_version_are_not_errors() {
        for args in [&["--help"], &["-h"], &["--version"]] {
            let error = parse(args).unwrap_err();
            assert_eq!(usage_error_status(&error), None, "{args:?}");
        }
    }
}
