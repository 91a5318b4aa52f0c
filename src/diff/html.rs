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

//! Side-by-side HTML tables of a line diff, with changed characters
//! highlighted inside replaced lines.

use similar::{capture_diff_slices, Algorithm, DiffOp, DiffTag, TextDiff};

/// Columns a tab expands to.
pub const TAB_SIZE: usize = 4;

/// The stylesheet embedded in every document.
pub const STYLES: &str = r#"
        table.diff {font-family:Monospace; border:medium;}
        .diff_header{font-weight: bold; padding-right:10}
        td.diff_header {text-align:right}
        .diff_next {background-color:#c0c0c0}
        .diff_add {background-color:#0daa0d}
        .diff_chg {background-color:#888800}
        .diff_sub {background-color:#c00000}"#;

/// One side of a table row: the line number and the already escaped markup.
type Cell = Option<(usize, String)>;

/// A complete HTML document with the side-by-side diff of `old` and `new`,
/// showing `context` lines around each change.
pub fn make_file(old: &str, new: &str, old_label: &str, new_label: &str, context: usize) -> String {
    document(&make_table(old, new, old_label, new_label, context))
}

/// A complete HTML document showing `text` verbatim.
pub fn make_text(text: &str) -> String {
    document(&format!(
        "<pre style=\"font-family:Monospace\">{}</pre>",
        escape(text)
    ))
}

fn document(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta http-equiv=\"Content-Type\" content=\"text/html; charset=utf-8\" />\n\
         <title></title>\n\
         <style type=\"text/css\">{}\n</style>\n\
         </head>\n\
         <body>\n{}\n</body>\n\
         </html>\n",
        STYLES, body
    )
}

/// The `<table>` of the side-by-side diff, without the surrounding document.
pub fn make_table(old: &str, new: &str, old_label: &str, new_label: &str, context: usize) -> String {
    let diff = TextDiff::from_lines(old, new);
    let old_lines = diff.old_slices();
    let new_lines = diff.new_slices();

    let mut table = String::new();
    table.push_str("<table class=\"diff\" cellspacing=\"0\" cellpadding=\"0\" rules=\"groups\">\n");
    table.push_str(&"<colgroup></colgroup>".repeat(6));
    table.push_str(&format!(
        "\n<thead><tr><th class=\"diff_next\"><br /></th>\
         <th colspan=\"2\" class=\"diff_header\">{}</th>\
         <th class=\"diff_next\"><br /></th>\
         <th colspan=\"2\" class=\"diff_header\">{}</th></tr></thead>\n",
        escape(old_label),
        escape(new_label)
    ));

    let groups = diff.grouped_ops(context);
    if groups.is_empty() {
        table.push_str(
            "<tbody>\n<tr><td class=\"diff_next\"></td><td></td>\
             <td>&nbsp;No Differences Found&nbsp;</td>\
             <td class=\"diff_next\"></td><td></td>\
             <td>&nbsp;No Differences Found&nbsp;</td></tr>\n</tbody>\n",
        );
    }

    for group in groups {
        table.push_str("<tbody>\n");
        for op in group {
            for (left, right) in rows(&op, old_lines, new_lines) {
                push_row(&mut table, left, right);
            }
        }
        table.push_str("</tbody>\n");
    }

    table.push_str("</table>");
    table
}

fn rows(op: &DiffOp, old_lines: &[&str], new_lines: &[&str]) -> Vec<(Cell, Cell)> {
    let (tag, old_range, new_range) = op.as_tag_tuple();
    match tag {
        DiffTag::Equal => old_range
            .zip(new_range)
            .map(|(o, n)| {
                (
                    Some((o + 1, escape(&expand(old_lines[o])))),
                    Some((n + 1, escape(&expand(new_lines[n])))),
                )
            })
            .collect(),
        DiffTag::Delete => old_range
            .map(|o| (Some((o + 1, whole(old_lines[o], "diff_sub"))), None))
            .collect(),
        DiffTag::Insert => new_range
            .map(|n| (None, Some((n + 1, whole(new_lines[n], "diff_add")))))
            .collect(),
        DiffTag::Replace => {
            let paired = old_range.len().min(new_range.len());
            let mut rows = Vec::with_capacity(old_range.len().max(new_range.len()));
            for i in 0..paired {
                let (o, n) = (old_range.start + i, new_range.start + i);
                let (left, right) = inline(old_lines[o], new_lines[n]);
                rows.push((Some((o + 1, left)), Some((n + 1, right))));
            }
            for o in old_range.clone().skip(paired) {
                rows.push((Some((o + 1, whole(old_lines[o], "diff_sub"))), None));
            }
            for n in new_range.clone().skip(paired) {
                rows.push((None, Some((n + 1, whole(new_lines[n], "diff_add")))));
            }
            rows
        },
    }
}

fn push_row(table: &mut String, left: Cell, right: Cell) {
    table.push_str("<tr>");
    for cell in [left, right].iter() {
        match cell {
            Some((number, markup)) => {
                table.push_str(&format!(
                    "<td class=\"diff_next\"></td><td class=\"diff_header\">{}</td>\
                     <td nowrap=\"nowrap\">{}</td>",
                    number, markup
                ));
            },
            None => table.push_str(
                "<td class=\"diff_next\"></td><td class=\"diff_header\"></td>\
                 <td nowrap=\"nowrap\"></td>",
            ),
        }
    }
    table.push_str("</tr>\n");
}

fn whole(line: &str, class: &str) -> String {
    span(class, &expand(line))
}

fn span(class: &str, text: &str) -> String {
    format!("<span class=\"{}\">{}</span>", class, escape(text))
}

/// Highlight the characters that differ between a pair of replaced lines.
fn inline(old: &str, new: &str) -> (String, String) {
    let old = expand(old).chars().collect::<Vec<_>>();
    let new = expand(new).chars().collect::<Vec<_>>();
    let mut left = String::new();
    let mut right = String::new();

    for op in capture_diff_slices(Algorithm::Myers, &old[..], &new[..]) {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        let old_text = old[old_range].iter().collect::<String>();
        let new_text = new[new_range].iter().collect::<String>();
        match tag {
            DiffTag::Equal => {
                left.push_str(&escape(&old_text));
                right.push_str(&escape(&new_text));
            },
            DiffTag::Delete => left.push_str(&span("diff_sub", &old_text)),
            DiffTag::Insert => right.push_str(&span("diff_add", &new_text)),
            DiffTag::Replace => {
                left.push_str(&span("diff_chg", &old_text));
                right.push_str(&span("diff_chg", &new_text));
            },
        }
    }

    (left, right)
}

/// Strip the line ending and expand tabs to [`TAB_SIZE`] columns.
pub fn expand(line: &str) -> String {
    let line = line.trim_end_matches(|c| c == '\n' || c == '\r');
    let mut expanded = String::with_capacity(line.len());
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let width = TAB_SIZE - column % TAB_SIZE;
            expanded.extend(std::iter::repeat(' ').take(width));
            column += width;
        } else {
            expanded.push(c);
            column += 1;
        }
    }
    expanded
}

/// Escape `text` for HTML, keeping runs of spaces visible.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            ' ' => escaped.push_str("&nbsp;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn identical_texts_have_no_differences() {
        let table = make_table("a\nb\n", "a\nb\n", "old (a)", "new (b)", 5);
        assert!(table.contains("No Differences Found"));
        assert!(table.contains("old&nbsp;(a)"));
    }

    #[test]
    fn headers_and_line_numbers_are_written() {
        let table = make_table("a\n", "b\n", "old (a)", "new (b)", 5);
        assert!(table.contains("<th colspan=\"2\" class=\"diff_header\">old&nbsp;(a)</th>"));
        assert!(table.contains("<th colspan=\"2\" class=\"diff_header\">new&nbsp;(b)</th>"));
        assert_eq!(
            table
                .matches("<td class=\"diff_header\">1</td><td nowrap=\"nowrap\">")
                .count(),
            2
        );
    }

    #[test]
    fn changes_are_classified() {
        let table = make_table("keep\ndrop\nsame\n", "keep\nsame\nadd\n", "old", "new", 5);
        assert!(table.contains("<span class=\"diff_sub\">drop</span>"));
        assert!(table.contains("<span class=\"diff_add\">add</span>"));
        assert!(!table.contains("No Differences Found"));
    }

    #[test]
    fn replaced_lines_highlight_changed_characters() {
        let table = make_table("let x = 1;\n", "let x = 2;\n", "old", "new", 5);
        assert!(table.contains("<span class=\"diff_chg\">1</span>"));
        assert!(table.contains("<span class=\"diff_chg\">2</span>"));
    }

    #[test]
    fn context_is_limited_around_changes() {
        let old = (1..=30).map(|i| format!("line {}\n", i)).collect::<String>();
        let new = old.replace("line 15\n", "line fifteen\n");
        let table = make_table(&old, &new, "old", "new", 5);

        assert!(table.contains(">10</td>"));
        assert!(table.contains(">20</td>"));
        assert!(!table.contains(">9</td>"));
        assert!(!table.contains(">21</td>"));
    }

    #[test]
    fn separate_hunks_get_separate_bodies() {
        let old = (1..=40).map(|i| format!("{}\n", i)).collect::<String>();
        let new = old.replace("\n5\n", "\nfive\n").replace("\n35\n", "\nthirty-five\n");
        let table = make_table(&old, &new, "old", "new", 5);
        assert_eq!(table.matches("<tbody>").count(), 2);
    }

    #[test]
    fn tabs_expand_to_the_next_stop() {
        assert_eq!(expand("\tx\n"), "    x");
        assert_eq!(expand("ab\tc"), "ab  c");
    }

    #[test]
    fn documents_embed_the_stylesheet() {
        let html = make_file("a\n", "b\n", "old", "new", 5);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(".diff_chg {background-color:#888800}"));
        assert!(make_text("<b>").contains("&lt;b&gt;"));
    }

    proptest! {
        #[test]
        fn prop_escaped_text_has_no_markup(text in any::<String>()) {
            let escaped = escape(&text);
            prop_assert!(!escaped.contains('<'));
            prop_assert!(!escaped.contains('>'));
            prop_assert!(!escaped.contains('"'));
            prop_assert!(!escaped.contains(' '));
        }
    }
}
