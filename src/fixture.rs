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

//! Throwaway repositories for tests.

use std::{
    cell::Cell,
    fs,
    path::{Path, PathBuf},
};

use tempfile::TempDir;

pub struct Fixture {
    dir: TempDir,
    repo: git2::Repository,
    clock: Cell<i64>,
}

impl Fixture {
    /// An empty repository whose unborn branch is `main`.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temporary directory");
        let mut options = git2::RepositoryInitOptions::new();
        options.initial_head("main");
        let repo = git2::Repository::init_opts(dir.path(), &options)
            .expect("failed to initialise repository");
        Self {
            dir,
            repo,
            clock: Cell::new(1_600_000_000),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// A fresh handle on the repository.
    pub fn repository(&self) -> git2::Repository {
        git2::Repository::open(self.path()).expect("failed to open fixture repository")
    }

    pub fn file(&self, path: &str) -> PathBuf {
        self.path().join(path)
    }

    pub fn write(&self, path: &str, content: &str) {
        self.write_bytes(path, content.as_bytes())
    }

    pub fn write_bytes(&self, path: &str, content: &[u8]) {
        let path = self.file(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create directories");
        }
        fs::write(path, content).expect("failed to write file");
    }

    pub fn read(&self, path: &str) -> String {
        fs::read_to_string(self.file(path)).expect("failed to read file")
    }

    pub fn remove(&self, path: &str) {
        fs::remove_file(self.file(path)).expect("failed to remove file")
    }

    /// Write `path` and add it to the index without committing.
    pub fn stage(&self, path: &str, content: &str) {
        self.write(path, content);
        let mut index = self.repo.index().expect("failed to get index");
        index
            .add_path(Path::new(path))
            .expect("failed to add path");
        index.write().expect("failed to write index");
    }

    /// Write `files`, stage everything and commit on `HEAD`. Commits are a
    /// minute apart, authored in UTC+2.
    pub fn commit(&self, message: &str, files: &[(&str, &str)]) -> git2::Oid {
        for (path, content) in files {
            self.write(path, content);
        }

        let mut index = self.repo.index().expect("failed to get index");
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .expect("add all files failed");
        index
            .update_all(["*"].iter(), None)
            .expect("update all files failed");
        index.write().expect("failed to write index");
        let tree_id = index.write_tree().expect("failed to write tree object");
        let tree = self.repo.find_tree(tree_id).expect("failed to find tree");

        let time = self.clock.get() + 60;
        self.clock.set(time);
        let signature = git2::Signature::new(
            "Ada Lovelace",
            "ada@example.com",
            &git2::Time::new(time, 120),
        )
        .expect("failed to create signature");

        let parent = self
            .repo
            .head()
            .ok()
            .and_then(|head| head.peel_to_commit().ok());
        let parents = parent.iter().collect::<Vec<_>>();

        self.repo
            .commit(
                Some("HEAD"),
                &signature,
                &signature,
                message,
                &tree,
                &parents,
            )
            .expect("failed to commit")
    }

    /// Create a branch at `HEAD` without checking it out.
    pub fn branch(&self, name: &str) {
        let head = self
            .repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .expect("HEAD has no commit");
        self.repo
            .branch(name, &head, false)
            .expect("failed to create branch");
    }

    /// Create a lightweight tag at `HEAD`.
    pub fn tag(&self, name: &str) {
        let head = self
            .repo
            .head()
            .and_then(|head| head.peel(git2::ObjectType::Commit))
            .expect("HEAD has no commit");
        self.repo
            .tag_lightweight(name, &head, false)
            .expect("failed to create tag");
    }
}
