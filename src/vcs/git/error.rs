// This file is part of radicle-surf
// <https://github.com/radicle-dev/radicle-surf>
//
// Copyright (C) 2019-2020 The Radicle Team <dev@radicle.xyz>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License version 3 or
// later as published by the Free Software Foundation.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Collection of errors that can occur when performing operations from
//! [`crate::vcs::git`].

use std::{io, path::PathBuf, str};

use thiserror::Error;

/// Enumeration of errors that can occur in operations from [`crate::vcs::git`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The repository has no working directory, so neither status nor
    /// working-copy diffs can be computed.
    #[error("the repository has no working directory")]
    BareRepository,
    /// A comparison was requested without any history rows.
    #[error("no history entry is selected")]
    EmptySelection,
    /// More than two history rows were selected for a comparison.
    #[error("at most two history entries can be compared, {0} were selected")]
    TooManySelected(usize),
    /// The working copy was selected as the older side of a comparison.
    #[error("the working copy can only be the newer side of a comparison")]
    WorkingNotNewest,
    /// A row was requested that the history or file listing does not have.
    #[error("row {row} is out of range, there are {len} rows")]
    RowOutOfRange {
        /// The requested row.
        row: usize,
        /// The number of rows available.
        len: usize,
    },
    /// A diff delta did not carry a file path.
    #[error("couldn't retrieve file path")]
    PathUnavailable,
    /// The selected file has no older side to hand to a diff tool.
    #[error("nothing to compare `{0}` to")]
    NothingToCompare(String),
    /// Reading a working-copy file failed.
    #[error("failed to read `{path}`")]
    Io {
        /// The file that was read.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: io::Error,
    },
    /// A [`str::Utf8Error`] error, which usually occurs when a git object's
    /// name is not in UTF-8 form and parsing of it as such fails.
    #[error(transparent)]
    Utf8(#[from] str::Utf8Error),
    /// A wrapper around the generic [`git2::Error`].
    #[error(transparent)]
    Git(#[from] git2::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
