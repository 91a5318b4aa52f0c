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
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    thread,
    time::{Duration, SystemTime},
};

use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand};
use log::{debug, warn};
use tracing_subscriber::EnvFilter;

use radicle_browser::{
    browser::Browser,
    difftool::POLL_INTERVAL,
    model::{HistoryModel, Role, Table},
    settings::Settings,
    vcs::git::Repository,
};

#[derive(Parser, Debug)]
#[command(
    name = "rad-browse",
    version,
    about = "Browse the branches, history and changes of a git repository"
)]
struct Args {
    /// Repository to open, defaults to the last opened one
    #[arg(long, global = true, value_name = "PATH")]
    repo: Option<PathBuf>,

    /// Settings file to use instead of the one in the config directory
    #[arg(long, global = true, value_name = "FILE")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show or change the settings
    Config {
        #[arg(long)]
        diff_tool: Option<String>,
        #[arg(long)]
        show_ignored: Option<bool>,
    },
    #[command(flatten)]
    Browse(Browse),
}

/// Subcommands working on an opened repository.
#[derive(Subcommand, Debug)]
enum Browse {
    /// List local branches and tags
    Branches,
    /// Check out a branch or tag
    Checkout { name: String },
    /// Show the history of the checked out branch
    Log,
    /// List the files changed by one history entry, or between two
    Files {
        /// History row, `working` or a commit id prefix
        #[arg(required = true, num_args = 1..=2)]
        selectors: Vec<String>,
    },
    /// Show the changes of a file
    Show {
        #[arg(required = true, num_args = 1..=2)]
        selectors: Vec<String>,
        #[arg(long)]
        path: String,
        /// Write a side-by-side HTML diff to FILE instead
        #[arg(long, value_name = "FILE")]
        html: Option<PathBuf>,
    },
    /// Open a file in the configured diff tool and wait for it to exit
    Difftool {
        #[arg(required = true, num_args = 1..=2)]
        selectors: Vec<String>,
        #[arg(long)]
        path: String,
    },
    /// List the changed files again whenever the working copy changes
    Watch {
        #[arg(required = true, num_args = 1..=2)]
        selectors: Vec<String>,
        /// Seconds between checks of the working copy
        #[arg(long, default_value_t = 2)]
        interval: u64,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings_path = args.settings.clone().or_else(Settings::default_path);

    match args.command {
        Command::Config {
            diff_tool,
            show_ignored,
        } => {
            let settings = settings_path
                .as_deref()
                .map(Settings::load_or_default)
                .unwrap_or_default();
            config(settings, settings_path.as_deref(), diff_tool, show_ignored)
        },
        Command::Browse(command) => {
            let settings = match &settings_path {
                Some(path) => Settings::load(path)?,
                None => Settings::default(),
            };
            browse(command, args.repo.as_deref(), settings, settings_path.as_deref())
        },
    }
}

fn browse(
    command: Browse,
    repo: Option<&Path>,
    settings: Settings,
    settings_path: Option<&Path>,
) -> anyhow::Result<()> {
    let repo = repo_path(repo, &settings)?;
    let mut browser = Browser::open(&repo, settings)
        .with_context(|| format!("failed to open repository at {}", repo.display()))?;
    save(browser.settings(), settings_path);

    match command {
        Browse::Branches => branches(&browser),
        Browse::Checkout { name } => {
            let row = browser
                .branches()
                .row_of(&name)
                .with_context(|| format!("no branch or tag named `{}`", name))?;
            browser
                .select_branch(row)
                .with_context(|| format!("failed to check out `{}`", name))?;
            branches(&browser);
        },
        Browse::Log => log(browser.history()),
        Browse::Files { selectors } => {
            select(&mut browser, &selectors)?;
            files(&browser);
        },
        Browse::Show {
            selectors,
            path,
            html,
        } => {
            select(&mut browser, &selectors)?;
            let row = file_row(&browser, &path)?;
            let view = browser.select_file(row)?;
            match html {
                Some(out) => fs::write(&out, view.html())
                    .with_context(|| format!("failed to write {}", out.display()))?,
                None => print!("{}", view.text()),
            }
        },
        Browse::Difftool { selectors, path } => {
            select(&mut browser, &selectors)?;
            let row = file_row(&browser, &path)?;
            browser
                .open_difftool(row)
                .with_context(|| format!("failed to open `{}`", path))?;
            while browser.poll() > 0 {
                thread::sleep(POLL_INTERVAL);
            }
        },
        Browse::Watch {
            selectors,
            interval,
        } => watch(&mut browser, &selectors, Duration::from_secs(interval))?,
    }

    Ok(())
}

/// `--repo`, then the last opened repository, then the repository around
/// the current directory.
fn repo_path(repo: Option<&Path>, settings: &Settings) -> anyhow::Result<PathBuf> {
    if let Some(repo) = repo {
        return Ok(repo.to_path_buf());
    }
    if let Some(last) = &settings.last_opened_repo {
        if last.exists() {
            return Ok(last.clone());
        }
        debug!("last opened repository {} is gone", last.display());
    }
    let repo = Repository::discover(".").context("not inside a git repository")?;
    Ok(repo.path().to_path_buf())
}

fn save(settings: &Settings, path: Option<&Path>) {
    match path {
        Some(path) => {
            if let Err(err) = settings.save(path) {
                warn!("failed to save settings: {}", err);
            }
        },
        None => warn!("no configuration directory, settings are not saved"),
    }
}

fn config(
    mut settings: Settings,
    path: Option<&Path>,
    diff_tool: Option<String>,
    show_ignored: Option<bool>,
) -> anyhow::Result<()> {
    if diff_tool.is_some() || show_ignored.is_some() {
        if let Some(tool) = diff_tool {
            settings.diff_tool = tool;
        }
        if let Some(show) = show_ignored {
            settings.show_ignored = show;
        }
        let path = path.context("no configuration directory to save settings to")?;
        settings.save(path)?;
    }
    print!("{}", toml::to_string(&settings)?);
    Ok(())
}

/// Resolve a history row number, `working` or a commit id prefix.
fn resolve(history: &HistoryModel, selector: &str) -> anyhow::Result<usize> {
    if selector == "working" {
        return history
            .row_of(None)
            .context("the working copy has no changes");
    }
    if let Ok(row) = selector.parse::<usize>() {
        if row < history.row_count() {
            return Ok(row);
        }
    }

    let matches = history
        .entries()
        .iter()
        .enumerate()
        .filter(|(_, entry)| {
            entry
                .id()
                .map_or(false, |id| id.to_string().starts_with(selector))
        })
        .map(|(row, _)| row)
        .collect::<Vec<_>>();
    match matches.as_slice() {
        [row] => Ok(*row),
        [] => bail!("no history entry matches `{}`", selector),
        _ => bail!("`{}` matches {} commits", selector, matches.len()),
    }
}

fn select(browser: &mut Browser, selectors: &[String]) -> anyhow::Result<()> {
    let rows = selectors
        .iter()
        .map(|selector| resolve(browser.history(), selector))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let comparison = browser.select_history(&rows)?;
    if let Some(details) = &comparison.details {
        println!("{}", details);
    }
    Ok(())
}

fn file_row(browser: &Browser, path: &str) -> anyhow::Result<usize> {
    browser
        .files()
        .row_of(path)
        .with_context(|| format!("`{}` did not change", path))
}

fn cell<T: Table>(table: &T, row: usize, column: usize) -> String {
    table
        .data(row, column, Role::Display)
        .and_then(|data| data.as_text().map(str::to_owned))
        .unwrap_or_default()
}

fn branches(browser: &Browser) {
    let table = browser.branches();
    for row in 0..table.row_count() {
        let marker = if browser.selected_branch() == Some(row) {
            '*'
        } else {
            ' '
        };
        println!("{} {:3} {}", marker, cell(table, row, 0), cell(table, row, 1));
    }
}

fn log(history: &HistoryModel) {
    for row in 0..history.row_count() {
        println!(
            "{:>3} {:7}  {:16}  {:3} {}",
            row,
            cell(history, row, 0),
            cell(history, row, 3),
            cell(history, row, 2),
            cell(history, row, 1)
        );
    }
}

fn files(browser: &Browser) {
    let table = browser.files();
    for row in 0..table.row_count() {
        println!("{:>2} {}", cell(table, row, 0), cell(table, row, 1));
    }
}

/// Modification times of the watched paths, `None` for a path that is gone.
fn fingerprint(browser: &Browser) -> anyhow::Result<BTreeMap<PathBuf, Option<SystemTime>>> {
    Ok(browser
        .watch_paths()?
        .into_iter()
        .map(|path| {
            let modified = fs::metadata(&path).and_then(|meta| meta.modified()).ok();
            (path, modified)
        })
        .collect())
}

fn watch(browser: &mut Browser, selectors: &[String], interval: Duration) -> anyhow::Result<()> {
    select(browser, selectors)?;
    files(browser);

    let mut last = fingerprint(browser)?;
    loop {
        thread::sleep(interval);

        let current = fingerprint(browser)?;
        if current == last {
            continue;
        }
        last = current;

        browser.refresh()?;
        if browser.selected_history().is_empty() {
            bail!("the selected history entries are gone");
        }
        println!();
        files(browser);
    }
}
