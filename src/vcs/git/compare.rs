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

//! Comparison of one or two entries of the history view.
//!
//! Selecting a single entry compares it with the entry right below it, the
//! root commit is listed as a set of additions, and two selected entries are
//! compared with each other. The working copy is only ever the newer side.

use std::{collections::HashSet, str};

use log::debug;

#[cfg(feature = "serialize")]
use serde::Serialize;

use crate::vcs::git::{
    error::Error,
    object::{Commit, Oid, Revision},
    repo::RepositoryRef,
    status::Status,
};

/// The change of a single file between the two sides of a [`Comparison`].
#[cfg_attr(feature = "serialize", derive(Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Path of the file relative to the repository root.
    pub path: String,
    pub status: Status,
    /// The blob on the newer side. `None` when the file does not exist there,
    /// or when the newer side is the working copy.
    #[cfg_attr(
        feature = "serialize",
        serde(serialize_with = "crate::vcs::git::object::serialize_opt_oid")
    )]
    pub new_id: Option<Oid>,
    /// The blob on the older side. `None` when the file does not exist there.
    #[cfg_attr(
        feature = "serialize",
        serde(serialize_with = "crate::vcs::git::object::serialize_opt_oid")
    )]
    pub old_id: Option<Oid>,
}

/// The result of comparing the selected entries of the history view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    /// The newer side.
    pub new: Revision,
    /// The older side, `None` for the root commit or a lone working copy.
    pub old: Option<Revision>,
    /// The changed files, sorted by path.
    pub patches: Vec<Patch>,
    /// A description of the commit when a single commit is selected.
    pub details: Option<String>,
}

impl Comparison {
    /// Label of the older side, e.g. `old (1e0f3a2)`.
    pub fn old_label(&self) -> String {
        let id = self
            .old
            .as_ref()
            .map(Revision::short_id)
            .unwrap_or_default();
        format!("old ({})", id)
    }

    /// Label of the newer side, e.g. `new (working)`.
    pub fn new_label(&self) -> String {
        format!("new ({})", self.new.short_id())
    }
}

/// Compare the entries at `rows` of `history`. `include_ignored` decides
/// whether ignored files are listed for the working copy.
///
/// # Errors
///
/// * [`Error::EmptySelection`]
/// * [`Error::TooManySelected`]
/// * [`Error::RowOutOfRange`]
/// * [`Error::WorkingNotNewest`]
/// * [`Error::Git`]
pub fn compare(
    repo: &RepositoryRef,
    history: &[Revision],
    rows: &[usize],
    include_ignored: bool,
) -> Result<Comparison, Error> {
    let mut rows = rows.to_vec();
    rows.sort_unstable();
    rows.dedup();

    if rows.len() > 2 {
        return Err(Error::TooManySelected(rows.len()));
    }
    if let Some(row) = rows.iter().find(|row| **row >= history.len()) {
        return Err(Error::RowOutOfRange {
            row: *row,
            len: history.len(),
        });
    }

    let (new, old, details) = match rows.as_slice() {
        [] => return Err(Error::EmptySelection),
        [row] => {
            let new = &history[*row];
            let details = new.commit().map(describe);
            (new, history.get(row + 1), details)
        },
        [newer, older] => (&history[*newer], Some(&history[*older]), None),
        _ => return Err(Error::TooManySelected(rows.len())),
    };

    let mut patches = match (new, old) {
        (_, Some(Revision::Working)) => return Err(Error::WorkingNotNewest),
        (Revision::Working, old) => {
            working_patches(repo, old.and_then(Revision::commit), include_ignored)?
        },
        (Revision::Commit(new), Some(Revision::Commit(old))) => tree_patches(repo, old, new)?,
        (Revision::Commit(root), None) => root_patches(repo, root)?,
    };
    patches.sort_by(|a, b| a.path.cmp(&b.path));

    debug!(
        "compared {} with {}: {} files",
        new.short_id(),
        old.map(Revision::short_id).unwrap_or_default(),
        patches.len()
    );

    Ok(Comparison {
        new: new.clone(),
        old: old.cloned(),
        patches,
        details,
    })
}

/// The text shown for a single selected commit.
pub fn describe(commit: &Commit) -> String {
    format!(
        "Commit: {}\n\nAuthor: {}\n\n{}\n",
        commit.id, commit.author, commit.message
    )
}

/// libgit2 reports absent sides with the zero id.
fn present(oid: Oid) -> Option<Oid> {
    if oid.is_zero() {
        None
    } else {
        Some(oid)
    }
}

fn delta_path(delta: &git2::DiffDelta) -> Result<String, Error> {
    let bytes = delta
        .new_file()
        .path_bytes()
        .or_else(|| delta.old_file().path_bytes())
        .ok_or(Error::PathUnavailable)?;
    Ok(str::from_utf8(bytes)?.to_owned())
}

/// The working copy (with the index) against `old`, or against the index
/// when there is no older side. Paths the diff does not report (untracked
/// and ignored files, conflicts) are filled in from the status.
fn working_patches(
    repo: &RepositoryRef,
    old: Option<&Commit>,
    include_ignored: bool,
) -> Result<Vec<Patch>, Error> {
    let git_repo = repo.repo_ref;
    let diff = match old {
        Some(old) => {
            let tree = git_repo.find_tree(old.tree_id)?;
            git_repo.diff_tree_to_workdir_with_index(Some(&tree), None)?
        },
        None => git_repo.diff_index_to_workdir(None, None)?,
    };

    let mut patches = diff
        .deltas()
        .map(|delta| -> Result<Patch, Error> {
            Ok(Patch {
                path: delta_path(&delta)?,
                status: Status::from(delta.status()),
                new_id: None,
                old_id: present(delta.old_file().id()),
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let reported = patches
        .iter()
        .map(|patch| patch.path.clone())
        .collect::<HashSet<_>>();

    for (path, status) in repo.status(include_ignored)? {
        if !reported.contains(&path) {
            patches.push(Patch {
                path,
                status,
                new_id: None,
                old_id: None,
            });
        }
    }

    Ok(patches)
}

fn tree_patches(repo: &RepositoryRef, old: &Commit, new: &Commit) -> Result<Vec<Patch>, Error> {
    let git_repo = repo.repo_ref;
    let old_tree = git_repo.find_tree(old.tree_id)?;
    let new_tree = git_repo.find_tree(new.tree_id)?;
    let diff = git_repo.diff_tree_to_tree(Some(&old_tree), Some(&new_tree), None)?;

    diff.deltas()
        .map(|delta| -> Result<Patch, Error> {
            Ok(Patch {
                path: delta_path(&delta)?,
                status: Status::from(delta.status()),
                new_id: present(delta.new_file().id()),
                old_id: present(delta.old_file().id()),
            })
        })
        .collect()
}

fn root_patches(repo: &RepositoryRef, root: &Commit) -> Result<Vec<Patch>, Error> {
    Ok(repo
        .tree_entries(root.tree_id, false)?
        .into_iter()
        .map(|(path, id)| Patch {
            path,
            status: Status::Added,
            new_id: Some(id),
            old_id: None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{fixture::Fixture, vcs::git::Repository};

    fn summary(comparison: &Comparison) -> Vec<(String, &'static str)> {
        comparison
            .patches
            .iter()
            .map(|patch| (patch.path.clone(), patch.status.code()))
            .collect()
    }

    #[test]
    fn single_commit_compares_with_its_parent() {
        let fixture = Fixture::new();
        fixture.commit("first", &[("a.txt", "one\n"), ("gone.txt", "bye\n")]);
        fixture.remove("gone.txt");
        fixture.commit("second", &[("a.txt", "two\n"), ("b.txt", "new\n")]);

        let repo = Repository::from(fixture.repository());
        let repo = repo.as_ref();
        let history = repo.history(false).unwrap();
        let comparison = compare(&repo, &history, &[0], true).unwrap();

        assert_eq!(
            summary(&comparison),
            vec![
                ("a.txt".to_owned(), "M"),
                ("b.txt".to_owned(), "A"),
                ("gone.txt".to_owned(), "D"),
            ]
        );

        let modified = &comparison.patches[0];
        assert!(modified.new_id.is_some() && modified.old_id.is_some());
        let added = &comparison.patches[1];
        assert!(added.new_id.is_some() && added.old_id.is_none());
        let deleted = &comparison.patches[2];
        assert!(deleted.new_id.is_none() && deleted.old_id.is_some());

        assert_eq!(comparison.old, Some(history[1].clone()));
        assert_eq!(comparison.new_label(), format!("new ({})", history[0].short_id()));
    }

    #[test]
    fn root_commit_lists_every_file_as_added() {
        let fixture = Fixture::new();
        fixture.commit("root", &[("src/main.rs", "fn main() {}\n"), ("README", "hi\n")]);

        let repo = Repository::from(fixture.repository());
        let repo = repo.as_ref();
        let history = repo.history(false).unwrap();
        let comparison = compare(&repo, &history, &[0], true).unwrap();

        assert_eq!(
            summary(&comparison),
            vec![("README".to_owned(), "A"), ("src/main.rs".to_owned(), "A")]
        );
        assert!(comparison.patches.iter().all(|p| p.new_id.is_some()));
        assert_eq!(comparison.old, None);
        assert_eq!(comparison.old_label(), "old ()");

        let details = comparison.details.unwrap();
        assert!(details.starts_with(&format!("Commit: {}\n\nAuthor: ", history[0].id().unwrap())));
        assert!(details.ends_with("\n\nroot\n"));
    }

    #[test]
    fn two_selected_rows_compare_newer_against_older() {
        let fixture = Fixture::new();
        fixture.commit("first", &[("a.txt", "1\n")]);
        fixture.commit("second", &[("b.txt", "2\n")]);
        fixture.commit("third", &[("c.txt", "3\n")]);

        let repo = Repository::from(fixture.repository());
        let repo = repo.as_ref();
        let history = repo.history(false).unwrap();
        let comparison = compare(&repo, &history, &[2, 0], true).unwrap();

        assert_eq!(comparison.new, history[0]);
        assert_eq!(comparison.old, Some(history[2].clone()));
        assert_eq!(comparison.details, None);
        assert_eq!(
            summary(&comparison),
            vec![("b.txt".to_owned(), "A"), ("c.txt".to_owned(), "A")]
        );
    }

    #[test]
    fn working_copy_merges_status_with_diff() {
        let fixture = Fixture::new();
        fixture.commit("first", &[(".gitignore", "*.log\n"), ("a.txt", "one\n")]);
        fixture.write("a.txt", "changed\n");
        fixture.write("new.txt", "untracked\n");
        fixture.write("build.log", "ignored\n");

        let repo = Repository::from(fixture.repository());
        let repo = repo.as_ref();
        let history = repo.history(false).unwrap();
        assert!(history[0].is_working());

        let comparison = compare(&repo, &history, &[0], true).unwrap();
        assert_eq!(
            summary(&comparison),
            vec![
                ("a.txt".to_owned(), "M"),
                ("build.log".to_owned(), "I"),
                ("new.txt".to_owned(), "A"),
            ]
        );

        let modified = &comparison.patches[0];
        assert_eq!(modified.new_id, None);
        assert!(modified.old_id.is_some());
        assert!(comparison.patches[1..]
            .iter()
            .all(|p| p.new_id.is_none() && p.old_id.is_none()));
        assert_eq!(comparison.details, None);
    }

    #[test]
    fn working_copy_against_an_older_commit() {
        let fixture = Fixture::new();
        fixture.commit("first", &[("a.txt", "one\n")]);
        fixture.commit("second", &[("b.txt", "two\n")]);
        fixture.write("a.txt", "changed\n");

        let repo = Repository::from(fixture.repository());
        let repo = repo.as_ref();
        let history = repo.history(false).unwrap();
        let comparison = compare(&repo, &history, &[0, 2], true).unwrap();

        assert_eq!(
            summary(&comparison),
            vec![("a.txt".to_owned(), "M"), ("b.txt".to_owned(), "A")]
        );
    }

    #[test]
    fn selection_bounds_are_checked() {
        let fixture = Fixture::new();
        fixture.commit("first", &[("a.txt", "1\n")]);
        fixture.commit("second", &[("a.txt", "2\n")]);

        let repo = Repository::from(fixture.repository());
        let repo = repo.as_ref();
        let history = repo.history(false).unwrap();

        assert!(matches!(
            compare(&repo, &history, &[], true),
            Err(Error::EmptySelection)
        ));
        assert!(matches!(
            compare(&repo, &history, &[0, 1, 2], true),
            Err(Error::TooManySelected(3))
        ));
        assert!(matches!(
            compare(&repo, &history, &[5], true),
            Err(Error::RowOutOfRange { row: 5, len: 2 })
        ));
    }

    #[test]
    fn repeated_rows_count_once() {
        let fixture = Fixture::new();
        fixture.commit("first", &[("a.txt", "1\n")]);
        fixture.commit("second", &[("a.txt", "2\n")]);
        fixture.commit("third", &[("a.txt", "3\n")]);

        let repo = Repository::from(fixture.repository());
        let repo = repo.as_ref();
        let history = repo.history(false).unwrap();

        let single = compare(&repo, &history, &[1, 1], true).unwrap();
        assert_eq!(single.new, history[1]);
        assert_eq!(single.old, Some(history[2].clone()));
        assert!(single.details.is_some());

        let pair = compare(&repo, &history, &[0, 0, 1], true).unwrap();
        assert_eq!(pair.new, history[0]);
        assert_eq!(pair.old, Some(history[1].clone()));
        assert_eq!(pair.details, None);
    }

    #[test]
    fn unborn_head_compares_the_index_with_the_working_copy() {
        let fixture = Fixture::new();
        fixture.stage("staged.txt", "s\n");
        fixture.write("untracked.txt", "u\n");

        let repo = Repository::from(fixture.repository());
        let repo = repo.as_ref();
        let history = repo.history(false).unwrap();
        assert_eq!(history, vec![Revision::Working]);

        let comparison = compare(&repo, &history, &[0], false).unwrap();
        assert_eq!(comparison.old, None);
        assert_eq!(
            summary(&comparison),
            vec![
                ("staged.txt".to_owned(), "iA"),
                ("untracked.txt".to_owned(), "A"),
            ]
        );
        assert!(comparison
            .patches
            .iter()
            .all(|p| p.new_id.is_none() && p.old_id.is_none()));

        let view = crate::diff::view(&repo, &comparison, &comparison.patches[0]).unwrap();
        assert_eq!(
            view,
            crate::diff::View::File {
                text: "s\n".to_owned()
            }
        );
    }

    #[test]
    fn working_copy_cannot_be_the_older_side() {
        let history = vec![Revision::Working, Revision::Working];
        let fixture = Fixture::new();
        let repo = Repository::from(fixture.repository());
        let repo = repo.as_ref();

        assert!(matches!(
            compare(&repo, &history, &[0, 1], true),
            Err(Error::WorkingNotNewest)
        ));
    }
}
