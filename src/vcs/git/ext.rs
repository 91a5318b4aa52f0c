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

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TAG: Regex = Regex::new(r"refs/tags/(.*)").expect("tag pattern is valid");
}

/// [`git2::Reference::is_tag`] just does a check for the prefix of `tags/`.
/// The issue with that is, as soon as we're in 'namespaces' ref that
/// is a tag it will say that it's not a tag. Instead we do a regex check on
/// `refs/tags/.*`.
pub fn is_tag(name: &str) -> bool {
    TAG.is_match(name)
}

/// The part of a tag reference after `refs/tags/`, or `None` if the
/// reference is not a tag.
pub fn tag_name(name: &str) -> Option<&str> {
    TAG.captures(name)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_in_namespaces_are_tags() {
        assert!(is_tag("refs/tags/v1.0"));
        assert!(is_tag("refs/namespaces/moi/refs/tags/v1.0"));
        assert!(!is_tag("refs/heads/main"));
    }

    #[test]
    fn tag_names_are_stripped() {
        assert_eq!(tag_name("refs/tags/v1.0"), Some("v1.0"));
        assert_eq!(tag_name("refs/tags/release/2"), Some("release/2"));
        assert_eq!(tag_name("refs/heads/main"), None);
    }
}
