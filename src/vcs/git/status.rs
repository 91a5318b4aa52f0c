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

use std::fmt;

#[cfg(feature = "serialize")]
use serde::Serialize;

/// How a path differs between the two sides of a comparison.
#[cfg_attr(feature = "serialize", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    Unmodified,
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    Ignored,
    Untracked,
    Typechange,
    Unreadable,
    Conflicted,
    /// Staged as a new file, unchanged in the working tree since.
    IndexAdded,
    /// Staged modification, unchanged in the working tree since.
    IndexModified,
    /// Staged deletion.
    IndexDeleted,
}

impl Status {
    /// The code shown in the file listing.
    pub fn code(&self) -> &'static str {
        match self {
            Status::Unmodified => " ",
            Status::Added => "A",
            Status::Modified => "M",
            Status::Deleted => "D",
            Status::Renamed => "R",
            Status::Copied => "C",
            Status::Ignored => "I",
            Status::Untracked => "?",
            Status::Typechange => "T",
            Status::Unreadable => "X",
            Status::Conflicted => "C",
            Status::IndexAdded => "iA",
            Status::IndexModified => "iM",
            Status::IndexDeleted => "iD",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<git2::Delta> for Status {
    fn from(delta: git2::Delta) -> Self {
        match delta {
            git2::Delta::Unmodified => Status::Unmodified,
            git2::Delta::Added => Status::Added,
            git2::Delta::Deleted => Status::Deleted,
            git2::Delta::Modified => Status::Modified,
            git2::Delta::Renamed => Status::Renamed,
            git2::Delta::Copied => Status::Copied,
            git2::Delta::Ignored => Status::Ignored,
            git2::Delta::Untracked => Status::Untracked,
            git2::Delta::Typechange => Status::Typechange,
            git2::Delta::Unreadable => Status::Unreadable,
            git2::Delta::Conflicted => Status::Conflicted,
        }
    }
}

impl From<git2::Status> for Status {
    fn from(flags: git2::Status) -> Self {
        use git2::Status as S;

        // Ordered by priority, the first match wins.
        const TABLE: [(S, Status); 8] = [
            (S::CONFLICTED, Status::Conflicted),
            (S::IGNORED, Status::Ignored),
            (S::WT_NEW, Status::Added),
            (S::WT_MODIFIED, Status::Modified),
            (S::WT_DELETED, Status::Deleted),
            (S::INDEX_NEW, Status::IndexAdded),
            (S::INDEX_MODIFIED, Status::IndexModified),
            (S::INDEX_DELETED, Status::IndexDeleted),
        ];

        TABLE
            .iter()
            .find(|(flag, _)| flags.intersects(*flag))
            .map(|(_, status)| *status)
            .unwrap_or(Status::Modified)
    }
}
