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

//! Table models backing the three panes of the browser: branches, history
//! and the files of the current comparison.
//!
//! A front-end asks a [`Table`] for the content of each cell under a
//! [`Role`], mirroring how item views query their models.

use chrono::DateTime;

use crate::vcs::git::{Branch, Oid, Patch, Revision, Status};

/// What a cell is queried for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Display,
    ToolTip,
    Font,
    Foreground,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Gray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Monospace,
}

/// The content of a cell for a given [`Role`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Data {
    Text(String),
    Color(Color),
    Font(Font),
}

impl Data {
    /// The text of the cell, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Data::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// A read-only table of rows and columns.
pub trait Table {
    fn row_count(&self) -> usize;

    fn column_count(&self) -> usize;

    /// The title of column `section`.
    fn header(&self, section: usize) -> Option<&'static str>;

    /// The content of a cell, `None` for an empty cell or an unknown
    /// position.
    fn data(&self, row: usize, column: usize, role: Role) -> Option<Data>;
}

fn text(s: impl Into<String>) -> Option<Data> {
    Some(Data::Text(s.into()))
}

/// Format a git time as `YYYY-MM-DD HH:MM` in its own offset.
pub fn format_time(time: &git2::Time) -> String {
    let local = time.seconds() + i64::from(time.offset_minutes()) * 60;
    DateTime::from_timestamp(local, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// Local branches and tags.
#[derive(Debug, Default)]
pub struct BranchesModel {
    branches: Vec<Branch>,
}

impl BranchesModel {
    const HEADERS: [&'static str; 2] = ["", "name"];

    pub fn update(&mut self, branches: Vec<Branch>) {
        self.branches = branches;
    }

    pub fn get(&self, row: usize) -> Option<&Branch> {
        self.branches.get(row)
    }

    /// The row of the branch or tag called `name`, branches first.
    pub fn row_of(&self, name: &str) -> Option<usize> {
        self.branches.iter().position(|branch| branch.name == name)
    }
}

impl Table for BranchesModel {
    fn row_count(&self) -> usize {
        self.branches.len()
    }

    fn column_count(&self) -> usize {
        Self::HEADERS.len()
    }

    fn header(&self, section: usize) -> Option<&'static str> {
        Self::HEADERS.get(section).copied()
    }

    fn data(&self, row: usize, column: usize, role: Role) -> Option<Data> {
        let branch = self.branches.get(row)?;
        match (column, role) {
            (0, Role::Display) if branch.is_tag() => text("tag"),
            (1, Role::Display) => text(branch.name.as_str()),
            (1, Role::ToolTip) => text(branch.reference.as_str()),
            _ => None,
        }
    }
}

/// The history of the checked out branch, newest first, led by the working
/// copy when it has changes.
#[derive(Debug, Default)]
pub struct HistoryModel {
    entries: Vec<Revision>,
}

impl HistoryModel {
    const HEADERS: [&'static str; 4] = ["id", "message", "", "date"];

    pub fn update(&mut self, entries: Vec<Revision>) {
        self.entries = entries;
    }

    pub fn entries(&self) -> &[Revision] {
        &self.entries
    }

    pub fn get(&self, row: usize) -> Option<&Revision> {
        self.entries.get(row)
    }

    /// The row of the entry with `id`, `None` meaning the working copy.
    pub fn row_of(&self, id: Option<Oid>) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id() == id)
    }
}

impl Table for HistoryModel {
    fn row_count(&self) -> usize {
        self.entries.len()
    }

    fn column_count(&self) -> usize {
        Self::HEADERS.len()
    }

    fn header(&self, section: usize) -> Option<&'static str> {
        Self::HEADERS.get(section).copied()
    }

    fn data(&self, row: usize, column: usize, role: Role) -> Option<Data> {
        let commit = match self.entries.get(row)? {
            Revision::Working => {
                return match (column, role) {
                    (0, Role::Display) => text("working"),
                    (0, Role::Font) => Some(Data::Font(Font::Monospace)),
                    _ => None,
                }
            },
            Revision::Commit(commit) => commit,
        };

        match (column, role) {
            (0, Role::Display) => text(commit.short_id()),
            (0, Role::ToolTip) => text(commit.id.to_string()),
            (0, Role::Font) => Some(Data::Font(Font::Monospace)),
            (1, Role::Display) => text(commit.summary()),
            (1, Role::ToolTip) => text(commit.message.as_str()),
            (2, Role::Display) => text(commit.author.initials()),
            (2, Role::ToolTip) => text(commit.author.to_string()),
            (3, Role::Display) => text(format_time(&commit.committer.time)),
            _ => None,
        }
    }
}

/// The files of the current comparison.
#[derive(Debug, Default)]
pub struct FilesModel {
    patches: Vec<Patch>,
}

impl FilesModel {
    const HEADERS: [&'static str; 2] = ["", "file"];

    pub fn update(&mut self, patches: Vec<Patch>) {
        self.patches = patches;
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    pub fn get(&self, row: usize) -> Option<&Patch> {
        self.patches.get(row)
    }

    pub fn row_of(&self, path: &str) -> Option<usize> {
        self.patches.iter().position(|patch| patch.path == path)
    }
}

impl Table for FilesModel {
    fn row_count(&self) -> usize {
        self.patches.len()
    }

    fn column_count(&self) -> usize {
        Self::HEADERS.len()
    }

    fn header(&self, section: usize) -> Option<&'static str> {
        Self::HEADERS.get(section).copied()
    }

    fn data(&self, row: usize, column: usize, role: Role) -> Option<Data> {
        let patch = self.patches.get(row)?;
        match (column, role) {
            (0, Role::Display) => text(patch.status.code()),
            (1, Role::Display) => text(patch.path.as_str()),
            (_, Role::Foreground) if column < 2 => match patch.status {
                Status::Deleted => Some(Data::Color(Color::Red)),
                Status::Added => Some(Data::Color(Color::Green)),
                Status::Ignored => Some(Data::Color(Color::Gray)),
                _ => None,
            },
            _ => None,
        }
    }
}
