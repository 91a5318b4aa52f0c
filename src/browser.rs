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

//! The controller tying the repository to the three table models: selecting
//! a branch checks it out, selecting history entries compares them,
//! selecting a file renders it.

use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;

use crate::{
    diff::{self, View},
    difftool::{self, Launcher},
    model::{BranchesModel, FilesModel, HistoryModel, Table as _},
    settings::Settings,
    vcs::git::{self, compare, Comparison, Patch, Repository, RepositoryRef},
};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Git(#[from] git::Error),
    #[error(transparent)]
    DiffTool(#[from] difftool::Error),
}

pub struct Browser {
    repo: Repository,
    settings: Settings,
    branches: BranchesModel,
    history: HistoryModel,
    files: FilesModel,
    selected_branch: Option<usize>,
    selected_history: Vec<usize>,
    selected_file: Option<usize>,
    comparison: Option<Comparison>,
    launcher: Launcher,
}

impl Browser {
    /// Open the repository at `path` and record it in `settings`. The
    /// checked out branch is selected; with a detached `HEAD` nothing is
    /// checked out and the history of `HEAD` is shown.
    ///
    /// # Errors
    ///
    /// * [`git::Error::Git`] when `path` is not a repository
    pub fn open(path: impl AsRef<Path>, mut settings: Settings) -> Result<Self, Error> {
        let repo = Repository::open(path)?;
        info!("opened {}", repo.path().display());
        settings.remember_repo(repo.path());

        let mut browser = Self {
            repo,
            settings,
            branches: BranchesModel::default(),
            history: HistoryModel::default(),
            files: FilesModel::default(),
            selected_branch: None,
            selected_history: vec![],
            selected_file: None,
            comparison: None,
            launcher: Launcher::new(),
        };

        let checked_out = browser.load_branches()?;
        match checked_out {
            Some(row) => browser.select_branch(row)?,
            None => browser.load_history()?,
        }
        Ok(browser)
    }

    pub fn repository(&self) -> RepositoryRef<'_> {
        self.repo.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn branches(&self) -> &BranchesModel {
        &self.branches
    }

    pub fn history(&self) -> &HistoryModel {
        &self.history
    }

    pub fn files(&self) -> &FilesModel {
        &self.files
    }

    pub fn comparison(&self) -> Option<&Comparison> {
        self.comparison.as_ref()
    }

    pub fn selected_branch(&self) -> Option<usize> {
        self.selected_branch
    }

    pub fn selected_history(&self) -> &[usize] {
        &self.selected_history
    }

    pub fn selected_file(&self) -> Option<usize> {
        self.selected_file
    }

    /// Check out the branch or tag at `row` and reload the history.
    ///
    /// # Errors
    ///
    /// * [`git::Error::RowOutOfRange`]
    /// * [`git::Error::Git`] when the checkout conflicts with local changes
    pub fn select_branch(&mut self, row: usize) -> Result<(), Error> {
        let reference = self
            .branches
            .get(row)
            .map(|branch| branch.reference.clone())
            .ok_or_else(|| out_of_range(row, self.branches.row_count()))?;

        self.repo.as_ref().checkout(&reference)?;
        self.load_branches()?;
        self.selected_branch = Some(row);
        self.load_history()
    }

    /// Compare the history entries at `rows` and list their files. The
    /// previous selection is kept when the comparison fails.
    ///
    /// # Errors
    ///
    /// See [`compare`].
    pub fn select_history(&mut self, rows: &[usize]) -> Result<&Comparison, Error> {
        let comparison = compare(
            &self.repo.as_ref(),
            self.history.entries(),
            rows,
            self.settings.show_ignored,
        )?;

        let mut rows = rows.to_vec();
        rows.sort_unstable();
        rows.dedup();
        self.selected_history = rows;
        self.selected_file = None;
        self.files.update(comparison.patches.clone());
        Ok(&*self.comparison.insert(comparison))
    }

    /// Render the file at `row` of the current comparison.
    ///
    /// # Errors
    ///
    /// * [`git::Error::EmptySelection`] when no history entry is selected
    /// * [`git::Error::RowOutOfRange`]
    /// * [`git::Error::Io`] when the working-copy file cannot be read
    pub fn select_file(&mut self, row: usize) -> Result<View, Error> {
        let view = {
            let (comparison, patch) = selected_patch(self.comparison.as_ref(), row)?;
            diff::view(&self.repo.as_ref(), comparison, patch)?
        };
        self.selected_file = Some(row);
        Ok(view)
    }

    /// Start the configured diff tool on the file at `row`.
    ///
    /// # Errors
    ///
    /// * [`git::Error::EmptySelection`]
    /// * [`git::Error::RowOutOfRange`]
    /// * [`difftool::Error`]
    pub fn open_difftool(&mut self, row: usize) -> Result<(), Error> {
        let (comparison, patch) = selected_patch(self.comparison.as_ref(), row)?;
        self.launcher.open(
            &self.repo.as_ref(),
            comparison,
            patch,
            &self.settings.diff_tool,
        )?;
        Ok(())
    }

    /// Reload the history after the working copy changed, keeping the
    /// selected entries (by id) and file (by path) that still exist.
    ///
    /// # Errors
    ///
    /// See [`Browser::select_history`].
    pub fn refresh(&mut self) -> Result<(), Error> {
        let ids = self
            .selected_history
            .iter()
            .filter_map(|row| self.history.get(*row).map(|entry| entry.id()))
            .collect::<Vec<_>>();
        let path = self
            .selected_file
            .and_then(|row| self.files.get(row))
            .map(|patch| patch.path.clone());

        self.load_history()?;

        let rows = ids
            .into_iter()
            .filter_map(|id| self.history.row_of(id))
            .collect::<Vec<_>>();
        if rows.is_empty() {
            debug!("previous history selection is gone");
            return Ok(());
        }
        self.select_history(&rows)?;
        self.selected_file = path.and_then(|path| self.files.row_of(&path));
        Ok(())
    }

    /// Re-render the selected file if `path` is its working-copy file.
    ///
    /// # Errors
    ///
    /// See [`Browser::select_file`].
    pub fn file_changed(&mut self, path: &Path) -> Result<Option<View>, Error> {
        let row = match self.selected_file {
            Some(row) => row,
            None => return Ok(None),
        };
        let selected = match self.files.get(row) {
            Some(patch) => self.repo.as_ref().workdir_path(&patch.path)?,
            None => return Ok(None),
        };
        if selected != path {
            return Ok(None);
        }
        self.select_file(row).map(Some)
    }

    /// The paths to watch for changes of the working copy.
    ///
    /// # Errors
    ///
    /// See [`RepositoryRef::watch_paths`].
    pub fn watch_paths(&self) -> Result<Vec<PathBuf>, Error> {
        Ok(self.repo.as_ref().watch_paths()?)
    }

    /// Reap finished diff tools, returning how many are still running.
    pub fn poll(&mut self) -> usize {
        self.launcher.poll()
    }

    /// Reload the branches, returning the row of the checked out one.
    fn load_branches(&mut self) -> Result<Option<usize>, Error> {
        let branches = self.repo.as_ref().list_branches()?;
        let checked_out = branches
            .entries
            .get(branches.checked_out)
            .filter(|branch| branch.checked_out)
            .map(|_| branches.checked_out);
        self.branches.update(branches.entries);
        Ok(checked_out)
    }

    fn load_history(&mut self) -> Result<(), Error> {
        let entries = self.repo.as_ref().history(self.settings.show_ignored)?;
        debug!("history has {} entries", entries.len());
        self.history.update(entries);
        self.selected_history.clear();
        self.selected_file = None;
        self.comparison = None;
        self.files.update(vec![]);
        Ok(())
    }
}

fn selected_patch(comparison: Option<&Comparison>, row: usize) -> Result<(&Comparison, &Patch), Error> {
    let comparison = comparison.ok_or(Error::Git(git::Error::EmptySelection))?;
    let patch = comparison
        .patches
        .get(row)
        .ok_or_else(|| out_of_range(row, comparison.patches.len()))?;
    Ok((comparison, patch))
}

fn out_of_range(row: usize, len: usize) -> Error {
    Error::Git(git::Error::RowOutOfRange { row, len })
}
