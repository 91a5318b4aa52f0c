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

use std::{
    collections::BTreeSet,
    convert::TryFrom,
    fs,
    path::{Path, PathBuf},
    str,
};

use git2::{BranchType, Oid};
use log::{debug, info};
use nonempty::NonEmpty;

use crate::{
    vcs,
    vcs::git::{
        error::Error,
        ext,
        object::{Commit, Revision},
        status::Status,
        Branch,
    },
};

/// A `History` that uses [`Commit`] as the underlying artifact.
pub type History = vcs::History<Commit>;

/// How many leading bytes are checked for a NUL byte when deciding whether
/// working-copy content is binary.
const BINARY_CHECK_LEN: usize = 8000;

/// Wrapper around the `git2`'s `git2::Repository` type.
/// This is to to limit the functionality that we can do
/// on the underlying object.
pub struct Repository(pub(super) git2::Repository);

/// A reference-only `Repository`. The only mutation it performs is
/// [`RepositoryRef::checkout`].
pub struct RepositoryRef<'a> {
    pub(super) repo_ref: &'a git2::Repository,
}

/// The branches and tags of a repository, as listed by the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branches {
    /// Local branches in name order followed by tags in name order.
    pub entries: Vec<Branch>,
    /// The row of the checked out branch, `0` when `HEAD` is detached.
    pub checked_out: usize,
}

/// The content of a blob or of a working-copy file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub content: Vec<u8>,
    pub is_binary: bool,
}

impl Blob {
    /// The content decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

impl<'a> RepositoryRef<'a> {
    /// The working directory of the repository.
    ///
    /// # Errors
    ///
    /// * [`Error::BareRepository`]
    pub fn workdir(&self) -> Result<&'a Path, Error> {
        self.repo_ref.workdir().ok_or(Error::BareRepository)
    }

    /// List the local branches followed by the tags of the repository.
    ///
    /// # Errors
    ///
    /// * [`Error::Git`]
    /// * [`Error::Utf8`]
    pub fn list_branches(&self) -> Result<Branches, Error> {
        let mut entries = self
            .repo_ref
            .branches(Some(BranchType::Local))?
            .try_fold(vec![], |mut acc, branch| {
                let (branch, _) = branch?;
                acc.push(Branch::try_from(branch)?);
                Ok::<_, Error>(acc)
            })?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        let checked_out = entries
            .iter()
            .position(|branch| branch.checked_out)
            .unwrap_or(0);

        let mut tags = self
            .repo_ref
            .references()?
            .try_fold(vec![], |mut acc, reference| {
                let reference = reference?;
                let name = str::from_utf8(reference.name_bytes())?;
                if let Some(tag) = ext::tag_name(name) {
                    acc.push(Branch {
                        name: tag.to_owned(),
                        reference: name.to_owned(),
                        checked_out: false,
                    });
                }
                Ok::<_, Error>(acc)
            })?;
        tags.sort_by(|a, b| a.reference.cmp(&b.reference));
        entries.append(&mut tags);

        debug!("listed {} branches and tags", entries.len());
        Ok(Branches {
            entries,
            checked_out,
        })
    }

    /// The status of every path in the working copy that differs from the
    /// index or `HEAD`. Untracked directories are recursed.
    ///
    /// # Errors
    ///
    /// * [`Error::BareRepository`]
    /// * [`Error::Git`]
    /// * [`Error::Utf8`]
    pub fn status(&self, include_ignored: bool) -> Result<Vec<(String, Status)>, Error> {
        self.workdir()?;
        let mut options = git2::StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(include_ignored);

        let statuses = self.repo_ref.statuses(Some(&mut options))?;
        statuses
            .iter()
            .filter(|entry| entry.status() != git2::Status::CURRENT)
            .map(|entry| -> Result<(String, Status), Error> {
                let path = str::from_utf8(entry.path_bytes())?.to_owned();
                Ok((path, Status::from(entry.status())))
            })
            .collect()
    }

    /// Build the entries of the history view: the working copy when it has
    /// any changes, followed by the commits reachable from `HEAD` in
    /// topological order.
    ///
    /// # Errors
    ///
    /// * [`Error::Git`]
    /// * [`Error::Utf8`]
    pub fn history(&self, include_ignored: bool) -> Result<Vec<Revision>, Error> {
        let mut entries = vec![];

        if self.repo_ref.workdir().is_some() && !self.status(include_ignored)?.is_empty() {
            entries.push(Revision::Working);
        }

        if let Some(history) = self.head()? {
            let commits: Vec<Commit> = history.0.into();
            entries.extend(commits.into_iter().map(Revision::Commit));
        }

        Ok(entries)
    }

    /// Build a [`History`] using the `head` reference, `None` when `HEAD`
    /// has no commit yet.
    pub(super) fn head(&self) -> Result<Option<History>, Error> {
        match self.repo_ref.head() {
            Ok(head) => {
                let commit = head.peel_to_commit()?;
                self.commit_to_history(commit).map(Some)
            },
            Err(err)
                if err.code() == git2::ErrorCode::UnbornBranch
                    || err.code() == git2::ErrorCode::NotFound =>
            {
                Ok(None)
            },
            Err(err) => Err(err.into()),
        }
    }

    /// Turn a commit into a [`History`] by completing a topological revwalk
    /// from it.
    pub(super) fn commit_to_history(&self, head: git2::Commit) -> Result<History, Error> {
        let head_id = head.id();
        let mut commits = NonEmpty::new(Commit::try_from(head)?);
        let mut revwalk = self.repo_ref.revwalk()?;
        revwalk.set_sorting(git2::Sort::TOPOLOGICAL)?;

        // Set the revwalk to the head commit
        revwalk.push(head_id)?;

        for commit_result_id in revwalk {
            // The revwalk iter returns results so
            // we unpack these and push them to the history
            let commit_id: Oid = commit_result_id?;

            // Skip the head commit since we have processed it
            if commit_id == head_id {
                continue;
            }

            let commit = Commit::try_from(self.repo_ref.find_commit(commit_id)?)?;
            commits.push(commit);
        }

        Ok(vcs::History(commits))
    }

    /// Check out `reference` with the safe strategy and point `HEAD` at it.
    /// Branches are attached, anything else leaves `HEAD` detached.
    ///
    /// # Errors
    ///
    /// * [`Error::Git`]
    pub fn checkout(&self, reference: &str) -> Result<(), Error> {
        let object = self.repo_ref.revparse_single(reference)?;
        let mut builder = git2::build::CheckoutBuilder::new();
        builder.safe();
        self.repo_ref.checkout_tree(&object, Some(&mut builder))?;

        if reference.starts_with("refs/heads/") {
            self.repo_ref.set_head(reference)?;
        } else {
            let commit = object.peel_to_commit()?;
            self.repo_ref.set_head_detached(commit.id())?;
        }

        info!("checked out {}", reference);
        Ok(())
    }

    /// Get a particular [`Commit`].
    pub fn commit(&self, oid: Oid) -> Result<Commit, Error> {
        Commit::try_from(self.repo_ref.find_commit(oid)?)
    }

    /// Read the content of a blob.
    ///
    /// # Errors
    ///
    /// * [`Error::Git`]
    pub fn blob(&self, oid: Oid) -> Result<Blob, Error> {
        let blob = self.repo_ref.find_blob(oid)?;
        Ok(Blob {
            content: blob.content().to_vec(),
            is_binary: blob.is_binary(),
        })
    }

    /// Absolute path of a working-copy file given its repository path.
    pub fn workdir_path(&self, path: &str) -> Result<PathBuf, Error> {
        Ok(self.workdir()?.join(path))
    }

    /// Read a working-copy file given its repository path.
    ///
    /// # Errors
    ///
    /// * [`Error::BareRepository`]
    /// * [`Error::Io`]
    pub fn workdir_file(&self, path: &str) -> Result<Blob, Error> {
        let path = self.workdir_path(path)?;
        let content = fs::read(&path).map_err(|err| Error::io(&path, err))?;
        let sample = &content[..content.len().min(BINARY_CHECK_LEN)];
        let is_binary = sample.contains(&0);
        Ok(Blob { content, is_binary })
    }

    /// Recursively list the `(path, id)` pairs of a tree. Directories are
    /// only listed when `include_dirs` is set; submodules are skipped.
    ///
    /// # Errors
    ///
    /// * [`Error::Git`]
    pub fn tree_entries(
        &self,
        tree_id: Oid,
        include_dirs: bool,
    ) -> Result<Vec<(String, Oid)>, Error> {
        let tree = self.repo_ref.find_tree(tree_id)?;
        let mut entries = vec![];
        tree.walk(git2::TreeWalkMode::PreOrder, |root, entry| {
            let name = match entry.name() {
                Some(name) => name,
                None => return git2::TreeWalkResult::Skip,
            };
            match entry.kind() {
                Some(git2::ObjectType::Blob) => {
                    entries.push((format!("{}{}", root, name), entry.id()))
                },
                Some(git2::ObjectType::Tree) if include_dirs => {
                    entries.push((format!("{}{}", root, name), entry.id()))
                },
                _ => {},
            }
            git2::TreeWalkResult::Ok
        })?;
        Ok(entries)
    }

    /// The paths a front-end should watch for changes: the working
    /// directory, every path of the `HEAD` tree and every path reported by
    /// the status. Ignored files are never watched.
    ///
    /// # Errors
    ///
    /// * [`Error::BareRepository`]
    /// * [`Error::Git`]
    pub fn watch_paths(&self) -> Result<Vec<PathBuf>, Error> {
        let workdir = self.workdir()?;
        let mut paths = BTreeSet::new();
        paths.insert(workdir.to_path_buf());

        if let Some(history) = self.head()? {
            for (path, _) in self.tree_entries(history.first().tree_id, true)? {
                paths.insert(workdir.join(path));
            }
        }

        for (path, _) in self.status(false)? {
            paths.insert(workdir.join(path));
        }

        Ok(paths.into_iter().collect())
    }
}

impl<'a> std::fmt::Debug for RepositoryRef<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, ".git")
    }
}

impl Repository {
    /// Open a git repository given its path.
    ///
    /// # Errors
    ///
    /// * [`Error::Git`]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        debug!("opening repository at {}", path.display());
        git2::Repository::open(path)
            .map(Repository)
            .map_err(Error::from)
    }

    /// Open the git repository containing `path`, looking through its
    /// parents.
    ///
    /// # Errors
    ///
    /// * [`Error::Git`]
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, Error> {
        git2::Repository::discover(path)
            .map(Repository)
            .map_err(Error::from)
    }

    /// The location of the repository, its working directory if it has one.
    pub fn path(&self) -> &Path {
        self.0.workdir().unwrap_or_else(|| self.0.path())
    }

    /// Browsing goes through [`RepositoryRef`]. This turns an owned
    /// [`Repository`] into one.
    pub fn as_ref(&'_ self) -> RepositoryRef<'_> {
        RepositoryRef { repo_ref: &self.0 }
    }
}

impl<'a> From<&'a Repository> for RepositoryRef<'a> {
    fn from(repo: &'a Repository) -> Self {
        repo.as_ref()
    }
}

impl From<git2::Repository> for Repository {
    fn from(repo: git2::Repository) -> Self {
        Repository(repo)
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, ".git")
    }
}
