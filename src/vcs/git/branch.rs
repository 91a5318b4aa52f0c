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

use std::{cmp::Ordering, convert::TryFrom, str};

#[cfg(feature = "serialize")]
use serde::Serialize;

use crate::vcs::git::{error::Error, ext};

/// The static information of a branch or tag listed by the browser.
///
/// **Note**: The `PartialOrd` and `Ord` implementations compare on the
/// reference only.
#[cfg_attr(feature = "serialize", derive(Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    /// Short name of the `Branch`, e.g. `main` or `v1.0`.
    pub name: String,
    /// The full reference, e.g. `refs/heads/main` or `refs/tags/v1.0`.
    pub reference: String,
    /// Whether `HEAD` points at this `Branch`.
    pub checked_out: bool,
}

impl PartialOrd for Branch {
    fn partial_cmp(&self, other: &Branch) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Branch {
    fn cmp(&self, other: &Branch) -> Ordering {
        self.reference.cmp(&other.reference)
    }
}

impl Branch {
    /// Helper to create a local `Branch` with a name.
    pub fn local(name: impl Into<String>, checked_out: bool) -> Self {
        let name = name.into();
        Self {
            reference: format!("refs/heads/{}", name),
            name,
            checked_out,
        }
    }

    /// Helper to create a tag entry with a name.
    pub fn tag(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            reference: format!("refs/tags/{}", name),
            name,
            checked_out: false,
        }
    }

    /// Whether the entry refers to a tag rather than a branch.
    pub fn is_tag(&self) -> bool {
        ext::is_tag(&self.reference)
    }
}

impl<'repo> TryFrom<git2::Branch<'repo>> for Branch {
    type Error = Error;

    fn try_from(branch: git2::Branch) -> Result<Self, Self::Error> {
        let checked_out = branch.is_head();
        let name = str::from_utf8(branch.name_bytes()?)?.to_owned();
        let reference = str::from_utf8(branch.get().name_bytes())?.to_owned();

        Ok(Self {
            name,
            reference,
            checked_out,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn helpers_qualify_references() {
        let main = Branch::local("main", true);
        assert_eq!(main.reference, "refs/heads/main");
        assert!(!main.is_tag());

        let tag = Branch::tag("v0.1");
        assert_eq!(tag.reference, "refs/tags/v0.1");
        assert!(tag.is_tag());
        assert!(!tag.checked_out);
    }

    #[test]
    fn ordering_is_by_reference() {
        let mut branches = vec![Branch::tag("a"), Branch::local("z", false)];
        branches.sort();
        assert_eq!(branches[0].name, "z");
    }
}
