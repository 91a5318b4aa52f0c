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

use std::{convert::TryFrom, fmt, str};

pub use git2::Oid;

#[cfg(feature = "serialize")]
use serde::{Serialize, Serializer};

use crate::vcs::git::error::Error;

/// Length of the abbreviated object ids shown in listings.
pub const SHORT_ID_LEN: usize = 7;

/// `Author` is the static information of a [`git2::Signature`].
#[cfg_attr(feature = "serialize", derive(Serialize))]
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Author {
    /// Name of the author.
    pub name: String,
    /// Email of the author.
    pub email: String,
    /// Time the action was taken, e.g. time of commit.
    #[cfg_attr(feature = "serialize", serde(serialize_with = "serialize_time"))]
    pub time: git2::Time,
}

impl Author {
    /// The initials of the author, one per space separated part of the name.
    pub fn initials(&self) -> String {
        self.name
            .split(' ')
            .filter_map(|part| part.chars().next())
            .collect()
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

impl fmt::Debug for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use std::cmp::Ordering;
        let time = match self.time.offset_minutes().cmp(&0) {
            Ordering::Equal => format!("{}", self.time.seconds()),
            Ordering::Greater => format!("{}+{}", self.time.seconds(), self.time.offset_minutes()),
            Ordering::Less => format!("{}{}", self.time.seconds(), self.time.offset_minutes()),
        };
        f.debug_struct("Author")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("time", &time)
            .finish()
    }
}

impl<'repo> TryFrom<git2::Signature<'repo>> for Author {
    type Error = str::Utf8Error;

    fn try_from(signature: git2::Signature) -> Result<Self, Self::Error> {
        let name = str::from_utf8(signature.name_bytes())?.into();
        let email = str::from_utf8(signature.email_bytes())?.into();
        let time = signature.when();

        Ok(Author { name, email, time })
    }
}

/// `Commit` is the static information of a [`git2::Commit`]. To get back the
/// original `Commit` in the repository we can use the [`Oid`] to retrieve
/// it.
#[cfg_attr(feature = "serialize", derive(Serialize))]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Commit {
    /// Object ID of the Commit, i.e. the SHA1 digest.
    #[cfg_attr(feature = "serialize", serde(serialize_with = "serialize_oid"))]
    pub id: Oid,
    /// Object ID of the tree the commit snapshots.
    #[cfg_attr(feature = "serialize", serde(serialize_with = "serialize_oid"))]
    pub tree_id: Oid,
    /// The author of the commit.
    pub author: Author,
    /// The actor who committed this commit.
    pub committer: Author,
    /// The message of the commit, stripped of surrounding whitespace.
    pub message: String,
    /// The parents of this commit.
    #[cfg_attr(feature = "serialize", serde(skip))]
    pub parents: Vec<Oid>,
}

impl Commit {
    /// The abbreviated id of the commit.
    pub fn short_id(&self) -> String {
        short(&self.id)
    }

    /// The first line of the message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }
}

impl<'repo> TryFrom<git2::Commit<'repo>> for Commit {
    type Error = Error;

    fn try_from(commit: git2::Commit) -> Result<Self, Self::Error> {
        let id = commit.id();
        let tree_id = commit.tree_id();
        let author = Author::try_from(commit.author())?;
        let committer = Author::try_from(commit.committer())?;
        let message = str::from_utf8(commit.message_bytes())?.trim().to_owned();
        let parents = commit.parent_ids().collect();

        Ok(Commit {
            id,
            tree_id,
            author,
            committer,
            message,
            parents,
        })
    }
}

/// One entry of the browsed history: either a commit of the repository or
/// the uncommitted state of the working copy.
#[cfg_attr(feature = "serialize", derive(Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    /// The working copy. It is not an object of the repository.
    Working,
    /// A commit of the repository.
    Commit(Commit),
}

impl Revision {
    /// The commit, unless this is the working copy.
    pub fn commit(&self) -> Option<&Commit> {
        match self {
            Revision::Working => None,
            Revision::Commit(commit) => Some(commit),
        }
    }

    /// The commit id, unless this is the working copy.
    pub fn id(&self) -> Option<Oid> {
        self.commit().map(|commit| commit.id)
    }

    pub fn is_working(&self) -> bool {
        matches!(self, Revision::Working)
    }

    /// The abbreviated id, or `working` for the working copy.
    pub fn short_id(&self) -> String {
        match self {
            Revision::Working => "working".to_owned(),
            Revision::Commit(commit) => commit.short_id(),
        }
    }
}

impl From<Commit> for Revision {
    fn from(commit: Commit) -> Self {
        Revision::Commit(commit)
    }
}

/// Abbreviate an object id to [`SHORT_ID_LEN`] hex characters.
pub fn short(oid: &Oid) -> String {
    let mut hex = oid.to_string();
    hex.truncate(SHORT_ID_LEN);
    hex
}

#[cfg(feature = "serialize")]
fn serialize_time<S>(t: &git2::Time, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_i64(t.seconds())
}

#[cfg(feature = "serialize")]
pub(crate) fn serialize_oid<S>(oid: &Oid, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&oid.to_string())
}

#[cfg(feature = "serialize")]
pub(crate) fn serialize_opt_oid<S>(oid: &Option<Oid>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match oid {
        Some(oid) => serializer.serialize_some(&oid.to_string()),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
pub mod tests {
    use proptest::prelude::*;

    use super::*;

    fn author(name: &str) -> Author {
        Author {
            name: name.to_owned(),
            email: "someone@example.com".to_owned(),
            time: git2::Time::new(0, 0),
        }
    }

    #[test]
    fn initials_take_one_letter_per_name() {
        assert_eq!(author("Ada Lovelace").initials(), "AL");
        assert_eq!(author("Grace  Hopper").initials(), "GH");
        assert_eq!(author("").initials(), "");
    }

    #[test]
    fn working_has_no_id() {
        assert_eq!(Revision::Working.id(), None);
        assert_eq!(Revision::Working.short_id(), "working");
    }

    #[cfg(feature = "serialize")]
    #[test]
    fn ids_serialize_as_hex() {
        let hex = "1e0f3a2b".repeat(5);
        let id = Oid::from_str(&hex).unwrap();
        let commit = Commit {
            id,
            tree_id: id,
            author: author("Ada Lovelace"),
            committer: author("Ada Lovelace"),
            message: "Add the engine".to_owned(),
            parents: vec![id],
        };

        let json = serde_json::to_value(Revision::Commit(commit)).unwrap();
        assert_eq!(json["Commit"]["id"], hex.as_str());
        assert_eq!(json["Commit"]["author"]["time"], 0);
        assert!(json["Commit"].get("parents").is_none());
        assert_eq!(serde_json::to_value(Revision::Working).unwrap(), "Working");
    }

    proptest! {
        #[test]
        fn prop_short_ids_prefix_the_id(id in "[a-f0-9]{40}") {
            let oid = Oid::from_str(&id).unwrap();
            let short = short(&oid);
            prop_assert_eq!(short.len(), SHORT_ID_LEN);
            prop_assert!(id.starts_with(&short));
        }

        #[test]
        fn prop_initials_never_exceed_parts(name in "[a-zA-Z ]{0,40}") {
            let initials = author(&name).initials();
            prop_assert!(initials.chars().count() <= name.split(' ').count());
            prop_assert!(!initials.contains(' '));
        }
    }
}
