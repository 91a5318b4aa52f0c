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

//! ```no_run
//! use radicle_browser::vcs::git::{compare, Repository};
//! # use std::error::Error;
//!
//! # fn main() -> Result<(), Box<dyn Error>> {
//! let repo = Repository::discover(".")?;
//! let repo = repo.as_ref();
//!
//! // The entries of the history view, newest first.
//! let history = repo.history(false)?;
//!
//! // Compare the newest entry with its predecessor.
//! if !history.is_empty() {
//!     let comparison = compare(&repo, &history, &[0], false)?;
//!     for patch in comparison.patches {
//!         println!("{} {}", patch.status, patch.path);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod branch;
pub use branch::Branch;

pub mod compare;
pub use compare::{compare, Comparison, Patch};

pub mod error;
pub use error::Error;

pub mod ext;

mod object;
pub use object::{short, Author, Commit, Oid, Revision, SHORT_ID_LEN};

mod repo;
pub use repo::{Blob, Branches, History, Repository, RepositoryRef};

mod status;
pub use status::Status;
