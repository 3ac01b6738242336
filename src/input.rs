// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Loading whitespace-separated integers.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Error returned when loading integers fails.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The input file couldn't be opened.
    #[error("cannot open {}", path.display())]
    Open {
        /// Path of the input file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Reading from the input failed.
    #[error("failed to read input")]
    Read(#[from] io::Error),
}

/// Reads base-10 integers separated by ASCII whitespace.
///
/// Reading stops at the first token that isn't a valid [`i32`], and the
/// integers read so far are returned.
///
/// ```
/// # use fanout_sort::input::read_integers;
/// let integers = read_integers("3 -1\n+4 1 five 9".as_bytes()).unwrap();
/// assert_eq!(integers, [3, -1, 4, 1]);
/// ```
pub fn read_integers(mut reader: impl Read) -> Result<Vec<i32>, LoadError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let integers = bytes
        .split(u8::is_ascii_whitespace)
        .filter(|token| !token.is_empty())
        .map_while(|token| std::str::from_utf8(token).ok()?.parse::<i32>().ok())
        .collect();
    Ok(integers)
}

/// Opens the file at the given path and reads integers from it, as
/// [`read_integers()`] does.
pub fn load_integers(path: impl AsRef<Path>) -> Result<Vec<i32>, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_owned(),
        source,
    })?;
    read_integers(io::BufReader::new(file))
}
