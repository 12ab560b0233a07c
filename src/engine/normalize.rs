// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Series name cleanup

use once_cell::sync::Lazy;
use regex::Regex;

/// Release quality tokens dropped from series names
pub const QUALITY_TAGS: &[&str] = &["720p", "1080p", "480p", "BD", "BluRay", "WEB", "HDTV"];

static SEPARATOR_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.\-_]+").unwrap());

static QUALITY_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b(?:{})\b", QUALITY_TAGS.join("|"))).unwrap()
});

/// Turn a raw captured name into a display series name.
///
/// Separator runs (`.`, `-`, `_`) become single spaces, standalone quality
/// tags are removed and the result is trimmed with internal whitespace
/// collapsed.
pub fn normalize_series_name(raw: &str) -> String {
    let spaced = SEPARATOR_RUN.replace_all(raw, " ");
    let collapsed = collapse_whitespace(&spaced);
    let untagged = QUALITY_TAG.replace_all(&collapsed, "");

    // Removing a tag mid-name leaves a double space behind
    collapse_whitespace(&untagged)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separators_become_spaces() {
        assert_eq!(normalize_series_name("Great.Anime"), "Great Anime");
        assert_eq!(normalize_series_name("Great__Anime--Two"), "Great Anime Two");
        assert_eq!(normalize_series_name(" ._Great  Anime_. "), "Great Anime");
    }

    #[test]
    fn test_quality_tags_removed() {
        assert_eq!(normalize_series_name("Anime 720p"), "Anime");
        assert_eq!(normalize_series_name("Anime.1080P.BluRay"), "Anime");
        assert_eq!(normalize_series_name("Anime web HDTV Name"), "Anime Name");
    }

    #[test]
    fn test_tags_only_removed_at_word_boundaries() {
        assert_eq!(normalize_series_name("Webster BDay"), "Webster BDay");
        assert_eq!(normalize_series_name("Show 720px"), "Show 720px");
    }

    #[test]
    fn test_name_of_only_tags_is_empty() {
        assert_eq!(normalize_series_name("720p BD"), "");
    }
}
