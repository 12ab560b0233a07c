// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Ordered pattern rules for series name / episode extraction

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// A single extraction rule: a regex plus which groups hold what
#[derive(Debug)]
pub struct PatternRule {
    name: &'static str,
    regex: Regex,
    name_group: usize,
    episode_groups: &'static [usize],
}

/// Raw captures from the first rule that matched a stem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch<'a> {
    /// Name of the rule that produced this match
    pub rule: &'static str,
    /// Series name exactly as captured, not yet normalized
    pub raw_name: &'a str,
    /// First non-empty episode alternative
    pub raw_episode: Option<&'a str>,
}

// Priority order matters: the first rule that finds a match anywhere in the
// stem wins, later rules are never consulted.
static RULES: Lazy<Vec<PatternRule>> = Lazy::new(|| {
    vec![
        // [SubGroup] Anime Name - 01 [Quality]
        PatternRule::new("bracket_tag_dash", r"(?i)\[.*?\]\s*(.+?)\s*-\s*(\d+)", 1, &[2]),
        // Anime.Name.S01E01 / Anime.Name.Episode.01
        PatternRule::new(
            "dotted_season_episode",
            r"(?i)(.+?)\.(?:S\d+E(\d+)|Episode\.(\d+))",
            1,
            &[2, 3],
        ),
        // Anime Name Episode 01
        PatternRule::new("spaced_episode_word", r"(?i)(.+?)\s+Episode\s+(\d+)", 1, &[2]),
        // Anime Name - 01
        PatternRule::new("dash_number", r"(?i)(.+?)\s*-\s*(\d+)", 1, &[2]),
        // Anime Name 01
        PatternRule::new("trailing_number", r"(?i)(.+?)\s+(\d+)(?:\s|$)", 1, &[2]),
    ]
});

impl PatternRule {
    fn new(
        name: &'static str,
        pattern: &str,
        name_group: usize,
        episode_groups: &'static [usize],
    ) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).unwrap(),
            name_group,
            episode_groups,
        }
    }

    /// Rule identifier used in logs and status output
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Underlying regular expression source
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Search `stem` for this rule's pattern (not anchored)
    pub fn apply<'a>(&self, stem: &'a str) -> Option<RuleMatch<'a>> {
        let caps = self.regex.captures(stem)?;
        Some(RuleMatch {
            rule: self.name,
            raw_name: group(&caps, self.name_group).unwrap_or(""),
            raw_episode: self
                .episode_groups
                .iter()
                .find_map(|&i| group(&caps, i).filter(|s| !s.is_empty())),
        })
    }
}

fn group<'a>(caps: &Captures<'a>, index: usize) -> Option<&'a str> {
    caps.get(index).map(|m| m.as_str())
}

/// All rules, highest priority first
pub fn rules() -> &'static [PatternRule] {
    &RULES
}

/// Try each rule in order and return the first match
pub fn first_match(stem: &str) -> Option<RuleMatch<'_>> {
    rules().iter().find_map(|rule| rule.apply(stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_rules_compile_in_order() {
        let names: Vec<_> = rules().iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            vec![
                "bracket_tag_dash",
                "dotted_season_episode",
                "spaced_episode_word",
                "dash_number",
                "trailing_number",
            ]
        );
        assert!(rules().iter().all(|r| r.pattern().starts_with("(?i)")));
    }

    #[test]
    fn test_bracket_tag_wins_over_dash_number() {
        let m = first_match("[SubGroup] Great Anime - 05 [720p]").unwrap();
        assert_eq!(m.rule, "bracket_tag_dash");
        assert_eq!(m.raw_name, "Great Anime");
        assert_eq!(m.raw_episode, Some("05"));
    }

    #[test]
    fn test_dotted_alternatives() {
        let m = first_match("Show.Name.S01E03").unwrap();
        assert_eq!(m.rule, "dotted_season_episode");
        assert_eq!(m.raw_name, "Show.Name");
        assert_eq!(m.raw_episode, Some("03"));

        let m = first_match("Show.Name.episode.12").unwrap();
        assert_eq!(m.rule, "dotted_season_episode");
        assert_eq!(m.raw_name, "Show.Name");
        assert_eq!(m.raw_episode, Some("12"));
    }

    #[test]
    fn test_spaced_episode_word_is_case_insensitive() {
        let m = first_match("Anime Name EPISODE 7").unwrap();
        assert_eq!(m.rule, "spaced_episode_word");
        assert_eq!(m.raw_name, "Anime Name");
        assert_eq!(m.raw_episode, Some("7"));
    }

    #[test]
    fn test_trailing_number_needs_boundary() {
        let m = first_match("Anime Name 01").unwrap();
        assert_eq!(m.rule, "trailing_number");
        assert_eq!(m.raw_episode, Some("01"));

        // "91 Days" style titles are taken at face value
        let m = first_match("91 Days 03").unwrap();
        assert_eq!(m.raw_name, "91 Days");
        assert_eq!(m.raw_episode, Some("03"));
    }

    #[test]
    fn test_no_rule_matches() {
        assert!(first_match("randomfile").is_none());
        assert!(first_match("").is_none());
    }
}
