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

//! Persistent settings of the browser, stored as TOML.
//!
//! ```toml
//! last_opened_repo = "/home/ada/src/engine"
//! last_fileopen_dir = "/home/ada/src"
//! diff_tool = "meld"
//! show_ignored = true
//!
//! [window]
//! pos = [200, 200]
//! size = [1000, 1000]
//! hist_splitter = [720, 360]
//! cinf_splitter = [360, 360]
//! diff_splitter = [150, 1200, 230]
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Directory below the user's configuration directory holding the settings.
pub const APP_DIR: &str = "radicle-browser";

/// Name of the settings file.
pub const CONFIG_FILE: &str = "config.toml";

/// The diff tool used when none is configured.
pub const DEFAULT_DIFF_TOOL: &str = "meld";

/// An error occurred loading or saving settings.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to access settings at `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed settings in `{path}`")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_opened_repo: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_fileopen_dir: Option<PathBuf>,
    /// The command started by [`crate::difftool::Launcher`].
    pub diff_tool: String,
    /// Whether ignored files are part of the working copy status.
    pub show_ignored: bool,
    pub window: Window,
}

/// Geometry of the main window and its splitters, in pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Window {
    pub pos: (i32, i32),
    pub size: (u32, u32),
    pub hist_splitter: Vec<u32>,
    pub cinf_splitter: Vec<u32>,
    pub diff_splitter: Vec<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            last_opened_repo: None,
            last_fileopen_dir: None,
            diff_tool: DEFAULT_DIFF_TOOL.to_owned(),
            show_ignored: true,
            window: Window::default(),
        }
    }
}

impl Default for Window {
    fn default() -> Self {
        Self {
            pos: (200, 200),
            size: (1000, 1000),
            hist_splitter: vec![720, 360],
            cinf_splitter: vec![360, 360],
            diff_splitter: vec![150, 1200, 230],
        }
    }
}

impl Settings {
    /// `<config dir>/radicle-browser/config.toml`, `None` when the platform
    /// has no configuration directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load the settings at `path`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// * [`Error::Io`]
    /// * [`Error::Parse`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no settings at {}, using defaults", path.display());
                return Ok(Self::default());
            },
            Err(source) => {
                return Err(Error::Io {
                    path: path.to_path_buf(),
                    source,
                })
            },
        };
        toml::from_str(&text).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [`Settings::load`], but an unreadable or malformed file is
    /// logged and replaced by the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|err| {
            match std::error::Error::source(&err) {
                Some(source) => warn!("{}: {}, using defaults", err, source),
                None => warn!("{}, using defaults", err),
            }
            Self::default()
        })
    }

    /// Write the settings to `path`, creating its directory.
    ///
    /// # Errors
    ///
    /// * [`Error::Io`]
    /// * [`Error::Serialize`]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let io_err = |source| Error::Io {
            path: path.to_path_buf(),
            source,
        };
        let text = toml::to_string(self)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        fs::write(path, text).map_err(io_err)?;
        debug!("saved settings to {}", path.display());
        Ok(())
    }

    /// Record `path` as the last opened repository, and its parent as the
    /// directory to start browsing from.
    pub fn remember_repo(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.last_fileopen_dir = path.parent().map(Path::to_path_buf);
        self.last_opened_repo = Some(path.to_path_buf());
    }
}
