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

//! Rendering of a selected [`Patch`]: a diff of its two sides, or the
//! content of the one side that exists.

use similar::TextDiff;

use crate::vcs::git::{Blob, Comparison, Error, Patch, RepositoryRef, Status};

pub mod html;

/// Lines of context around each change.
pub const CONTEXT_LINES: usize = 5;

/// What is shown for a selected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// Both sides exist and are text.
    Diff {
        old_label: String,
        new_label: String,
        old: String,
        new: String,
    },
    /// Only one side exists, or neither side was written as a blob yet and
    /// the working-copy file is shown.
    File { text: String },
    /// One of the sides is binary content.
    Binary { path: String },
}

impl View {
    /// The title of the pane showing the view.
    pub fn title(&self) -> &'static str {
        match self {
            View::Diff { .. } => "Diff",
            View::File { .. } | View::Binary { .. } => "File",
        }
    }

    /// The view as a side-by-side HTML document.
    pub fn html(&self) -> String {
        match self {
            View::Diff {
                old_label,
                new_label,
                old,
                new,
            } => html::make_file(old, new, old_label, new_label, CONTEXT_LINES),
            View::File { text } => html::make_text(text),
            View::Binary { path } => html::make_text(&binary_notice(path)),
        }
    }

    /// The view as plain text: a unified diff, or the file content.
    pub fn text(&self) -> String {
        match self {
            View::Diff {
                old_label,
                new_label,
                old,
                new,
            } => unified(old, new, old_label, new_label),
            View::File { text } => text.clone(),
            View::Binary { path } => binary_notice(path),
        }
    }
}

fn binary_notice(path: &str) -> String {
    format!("Binary file {}\n", path)
}

/// A unified diff of `old` and `new` with [`CONTEXT_LINES`] of context.
pub fn unified(old: &str, new: &str, old_label: &str, new_label: &str) -> String {
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(CONTEXT_LINES)
        .header(old_label, new_label)
        .to_string()
}

/// Resolve what to show for `patch`, a file of `comparison`.
///
/// * both blobs known: their diff.
/// * only the new blob: its content.
/// * only the old blob: a diff against the working-copy file when it was
///   modified there, the old content otherwise.
/// * no blob: the working-copy file.
///
/// # Errors
///
/// * [`Error::Git`] when a blob cannot be found
/// * [`Error::Io`] when the working-copy file cannot be read
pub fn view(repo: &RepositoryRef, comparison: &Comparison, patch: &Patch) -> Result<View, Error> {
    let new = patch.new_id.map(|id| repo.blob(id)).transpose()?;
    let old = patch.old_id.map(|id| repo.blob(id)).transpose()?;

    let view = match (old, new) {
        (Some(old), Some(new)) => diff(comparison, patch, old, new),
        (None, Some(new)) => file(patch, new),
        (Some(old), None) if patch.status == Status::Modified => {
            let new = repo.workdir_file(&patch.path)?;
            diff(comparison, patch, old, new)
        },
        (Some(old), None) => file(patch, old),
        (None, None) => file(patch, repo.workdir_file(&patch.path)?),
    };
    Ok(view)
}

fn diff(comparison: &Comparison, patch: &Patch, old: Blob, new: Blob) -> View {
    if old.is_binary || new.is_binary {
        return View::Binary {
            path: patch.path.clone(),
        };
    }
    View::Diff {
        old_label: comparison.old_label(),
        new_label: comparison.new_label(),
        old: old.text(),
        new: new.text(),
    }
}

fn file(patch: &Patch, blob: Blob) -> View {
    if blob.is_binary {
        View::Binary {
            path: patch.path.clone(),
        }
    } else {
        View::File { text: blob.text() }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        fixture::Fixture,
        vcs::git::{compare, Repository},
    };

    fn patch<'a>(comparison: &'a Comparison, path: &str) -> &'a Patch {
        comparison
            .patches
            .iter()
            .find(|p| p.path == path)
            .expect("path is listed")
    }

    #[test]
    fn modified_file_between_commits_is_a_diff() {
        let fixture = Fixture::new();
        fixture.commit("first", &[("a.txt", "one\ntwo\n")]);
        fixture.commit("second", &[("a.txt", "one\nthree\n")]);

        let repo = Repository::from(fixture.repository());
        let repo = repo.as_ref();
        let history = repo.history(false).unwrap();
        let comparison = compare(&repo, &history, &[0], false).unwrap();
        let view = view(&repo, &comparison, patch(&comparison, "a.txt")).unwrap();

        assert_eq!(view.title(), "Diff");
        match &view {
            View::Diff {
                old_label,
                new_label,
                old,
                new,
            } => {
                assert_eq!(old_label, &format!("old ({})", history[1].short_id()));
                assert_eq!(new_label, &format!("new ({})", history[0].short_id()));
                assert_eq!(old, "one\ntwo\n");
                assert_eq!(new, "one\nthree\n");
            },
            other => panic!("expected a diff, got {:?}", other),
        }

        let text = view.text();
        assert!(text.contains("-two\n"));
        assert!(text.contains("+three\n"));
    }

    #[test]
    fn added_file_shows_its_content() {
        let fixture = Fixture::new();
        fixture.commit("first", &[("a.txt", "a\n")]);
        fixture.commit("second", &[("b.txt", "brand new\n")]);

        let repo = Repository::from(fixture.repository());
        let repo = repo.as_ref();
        let history = repo.history(false).unwrap();
        let comparison = compare(&repo, &history, &[0], false).unwrap();
        let view = view(&repo, &comparison, patch(&comparison, "b.txt")).unwrap();

        assert_eq!(
            view,
            View::File {
                text: "brand new\n".to_owned()
            }
        );
        assert_eq!(view.title(), "File");
    }

    #[test]
    fn deleted_file_shows_its_old_content() {
        let fixture = Fixture::new();
        fixture.commit("first", &[("a.txt", "a\n"), ("old.txt", "was here\n")]);
        fixture.remove("old.txt");
        fixture.commit("second", &[]);

        let repo = Repository::from(fixture.repository());
        let repo = repo.as_ref();
        let history = repo.history(false).unwrap();
        let comparison = compare(&repo, &history, &[0], false).unwrap();
        let view = view(&repo, &comparison, patch(&comparison, "old.txt")).unwrap();

        assert_eq!(view.text(), "was here\n");
    }

    #[test]
    fn working_copy_modification_diffs_against_the_file() {
        let fixture = Fixture::new();
        fixture.commit("first", &[("a.txt", "committed\n")]);
        fixture.write("a.txt", "edited\n");
        fixture.write("untracked.txt", "fresh\n");

        let repo = Repository::from(fixture.repository());
        let repo = repo.as_ref();
        let history = repo.history(false).unwrap();
        let comparison = compare(&repo, &history, &[0], false).unwrap();

        let modified = view(&repo, &comparison, patch(&comparison, "a.txt")).unwrap();
        match modified {
            View::Diff {
                new_label, old, new, ..
            } => {
                assert_eq!(new_label, "new (working)");
                assert_eq!(old, "committed\n");
                assert_eq!(new, "edited\n");
            },
            other => panic!("expected a diff, got {:?}", other),
        }

        let untracked = view(&repo, &comparison, patch(&comparison, "untracked.txt")).unwrap();
        assert_eq!(untracked.text(), "fresh\n");
    }

    #[test]
    fn binary_content_is_not_rendered() {
        let fixture = Fixture::new();
        fixture.write_bytes("blob.bin", &[0, 1, 2, 3]);
        fixture.commit("first", &[]);

        let repo = Repository::from(fixture.repository());
        let repo = repo.as_ref();
        let history = repo.history(false).unwrap();
        let comparison = compare(&repo, &history, &[0], false).unwrap();
        let view = view(&repo, &comparison, patch(&comparison, "blob.bin")).unwrap();

        assert_eq!(
            view,
            View::Binary {
                path: "blob.bin".to_owned()
            }
        );
        assert_eq!(view.text(), "Binary file blob.bin\n");
    }

    #[test]
    fn unified_diff_carries_labels() {
        let text = unified("a\nb\n", "a\nc\n", "old (1234567)", "new (working)");
        assert!(text.starts_with("--- old (1234567)\n+++ new (working)\n"));
        assert!(text.contains("-b\n+c\n"));
    }
}
