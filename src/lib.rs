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

#![deny(unused_import_braces)]
#![warn(unused_qualifications)]

//! Welcome to `radicle-browser`!
//!
//! `radicle-browser` lets you browse a git repository the way a history
//! viewer does: pick a branch or tag, pick one or two entries of its
//! history, and look at what changed between them file by file. The
//! uncommitted state of the working copy shows up as the newest entry of
//! the history whenever it differs from `HEAD`.
//!
//! The [`browser::Browser`] ties the pieces together and keeps three
//! [`model::Table`]s up to date, one per pane of a front-end:
//!
//! ```no_run
//! use radicle_browser::{
//!     browser::Browser,
//!     model::{Role, Table},
//!     settings::Settings,
//! };
//! # use std::error::Error;
//!
//! # fn main() -> Result<(), Box<dyn Error>> {
//! let mut browser = Browser::open(".", Settings::default())?;
//!
//! // Compare the newest entry of the history with its parent.
//! browser.select_history(&[0])?;
//!
//! for row in 0..browser.files().row_count() {
//!     let status = browser.files().data(row, 0, Role::Display);
//!     let path = browser.files().data(row, 1, Role::Display);
//!     println!("{:?} {:?}", status, path);
//! }
//!
//! // Render the first file as a side-by-side HTML diff.
//! let view = browser.select_file(0)?;
//! let html = view.html();
//! # let _ = html;
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod diff;
pub mod difftool;
pub mod model;
pub mod settings;
pub mod vcs;

#[cfg(test)]
mod fixture;

pub use crate::vcs::git;
