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

//! Launching an external diff tool on the two sides of a [`Patch`].
//!
//! Blob content is written to temporary files that live as long as the tool
//! runs. [`Launcher::poll`] reaps tools that exited and removes their files.

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    process::{Child, Command},
    time::Duration,
};

use either::Either;
use log::{debug, info, warn};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::vcs::git::{self, Comparison, Oid, Patch, RepositoryRef, Revision};

/// How often a front-end should call [`Launcher::poll`].
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// An error occurred launching a diff tool.
#[derive(Debug, Error)]
pub enum Error {
    /// Resolving the content of either side failed.
    #[error(transparent)]
    Git(#[from] git::Error),
    /// The configured tool is an empty command.
    #[error("no diff tool is configured")]
    NoTool,
    /// Writing a side to a temporary file failed.
    #[error("failed to write temporary file")]
    Temp(#[source] io::Error),
    /// The tool could not be started.
    #[error("failed to launch `{tool}`")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },
}

/// A diff tool that was started, with the files it was handed.
struct Running {
    child: Child,
    old: NamedTempFile,
    /// A temporary file for a blob, or the working-copy file itself.
    new: Either<NamedTempFile, PathBuf>,
}

impl Running {
    fn new_path(&self) -> &Path {
        match &self.new {
            Either::Left(file) => file.path(),
            Either::Right(path) => path,
        }
    }
}

/// Keeps track of the diff tools started by the browser.
///
/// Dropping the launcher removes the temporary files even if a tool is
/// still running.
#[derive(Default)]
pub struct Launcher {
    running: Vec<Running>,
}

impl Launcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `tool` on the old and new side of `patch`. The new side is the
    /// working-copy file when `patch` has no new blob.
    ///
    /// # Errors
    ///
    /// * [`git::Error::NothingToCompare`] when `patch` has no old blob
    /// * [`Error::Temp`]
    /// * [`Error::Spawn`]
    pub fn open(
        &mut self,
        repo: &RepositoryRef,
        comparison: &Comparison,
        patch: &Patch,
        tool: &str,
    ) -> Result<(), Error> {
        let mut command = tool.split_whitespace();
        let program = command.next().ok_or(Error::NoTool)?;

        let old_id = patch
            .old_id
            .ok_or_else(|| git::Error::NothingToCompare(patch.path.clone()))?;
        let old_side = comparison.old.as_ref().map(Revision::short_id);
        let old = write_side(repo, "old", old_side.as_deref(), &patch.path, old_id)?;

        let new = match patch.new_id {
            Some(new_id) => {
                let new_side = comparison.new.short_id();
                Either::Left(write_side(repo, "new", Some(&new_side), &patch.path, new_id)?)
            },
            None => Either::Right(repo.workdir_path(&patch.path)?),
        };

        let running = Running {
            child: Command::new(program)
                .args(command)
                .arg(old.path())
                .arg(match &new {
                    Either::Left(file) => file.path(),
                    Either::Right(path) => path.as_path(),
                })
                .spawn()
                .map_err(|source| Error::Spawn {
                    tool: tool.to_owned(),
                    source,
                })?,
            old,
            new,
        };

        info!(
            "started {} on {} and {}",
            program,
            running.old.path().display(),
            running.new_path().display()
        );
        self.running.push(running);
        Ok(())
    }

    /// Reap the tools that exited, removing their temporary files. Returns
    /// how many are still running.
    pub fn poll(&mut self) -> usize {
        self.running = std::mem::take(&mut self.running)
            .into_iter()
            .filter_map(|mut running| match running.child.try_wait() {
                Ok(None) => Some(running),
                Ok(Some(status)) => {
                    debug!("diff tool {} exited with {}", running.child.id(), status);
                    None
                },
                Err(err) => {
                    warn!("failed to query diff tool {}: {}", running.child.id(), err);
                    None
                },
            })
            .collect();
        self.running.len()
    }

    /// How many tools are running as of the last [`Launcher::poll`].
    pub fn running(&self) -> usize {
        self.running.len()
    }

    /// The files handed to the tools that are still tracked.
    pub fn paths(&self) -> Vec<(PathBuf, PathBuf)> {
        self.running
            .iter()
            .map(|running| (running.old.path().to_path_buf(), running.new_path().to_path_buf()))
            .collect()
    }
}

/// Write blob `id` to a temporary file named after the side, the short id
/// of the revision and the file name, e.g. `old_1e0f3a2__XXXX_main.rs`.
fn write_side(
    repo: &RepositoryRef,
    side: &str,
    revision: Option<&str>,
    path: &str,
    id: Oid,
) -> Result<NamedTempFile, Error> {
    let blob = repo.blob(id)?;
    let file_name = Path::new(path)
        .file_name()
        .map(|name| format!("_{}", name.to_string_lossy()))
        .unwrap_or_default();
    let mut file = tempfile::Builder::new()
        .prefix(&format!("{}_{}__", side, revision.unwrap_or_default()))
        .suffix(&file_name)
        .tempfile()
        .map_err(Error::Temp)?;
    file.write_all(&blob.content).map_err(Error::Temp)?;
    file.flush().map_err(Error::Temp)?;
    Ok(file)
}
