// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Filename inference engine
//!
//! `raw filename -> stem -> pattern match -> normalize -> reconstruct`.
//! Everything here is pure and synchronous; callers own all I/O.

pub mod filename;
pub mod normalize;
pub mod rules;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::preview::RenamePreview;

pub use filename::{build_filename, split_extension, strip_reserved};
pub use normalize::normalize_series_name;
pub use rules::{first_match, rules, PatternRule, RuleMatch};

/// Series name and episode inferred from a filename
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceResult {
    /// Cleaned, human readable title
    pub series_name: String,
    /// Episode digits as they appeared (no padding)
    pub episode: Option<String>,
}

impl InferenceResult {
    fn fallback(stem: &str) -> Self {
        Self {
            series_name: stem.to_string(),
            episode: None,
        }
    }
}

/// Infer `(series name, episode)` from a raw filename.
///
/// Falls back to the extension-less stem with no episode when no rule
/// matches. When the matched name is nothing but quality tags the stem
/// stands in as the series name and the matched episode is kept, so
/// `"1080p - 02.mkv"` still renames to episode 02.
pub fn infer_info(filename: &str) -> InferenceResult {
    let (stem, _) = split_extension(filename);

    let Some(m) = first_match(stem) else {
        trace!(filename, "no rule matched, using stem");
        return InferenceResult::fallback(stem);
    };

    let series_name = normalize_series_name(m.raw_name);
    if series_name.is_empty() {
        trace!(filename, rule = m.rule, "matched name normalized to nothing, using stem");
        return InferenceResult {
            series_name: stem.to_string(),
            episode: m.raw_episode.map(str::to_string),
        };
    }

    trace!(filename, rule = m.rule, %series_name, episode = ?m.raw_episode, "inferred");
    InferenceResult {
        series_name,
        episode: m.raw_episode.map(str::to_string),
    }
}

/// Stateless handle over the engine, passed to whatever needs it
#[derive(Debug, Clone, Copy, Default)]
pub struct InferenceEngine;

impl InferenceEngine {
    pub fn new() -> Self {
        Self
    }

    /// See [`infer_info`]
    pub fn infer_info(&self, filename: &str) -> InferenceResult {
        infer_info(filename)
    }

    /// See [`build_filename`]
    pub fn build_filename(
        &self,
        series_name: &str,
        episode: Option<&str>,
        original_filename: &str,
    ) -> String {
        build_filename(series_name, episode, original_filename)
    }

    /// Infer and rebuild in one go
    pub fn preview(&self, filename: &str) -> RenamePreview {
        let info = self.infer_info(filename);
        let new_filename = self.build_filename(&info.series_name, info.episode.as_deref(), filename);
        RenamePreview::new(filename, info, new_filename)
    }

    /// Rule names in evaluation order
    pub fn rule_names(&self) -> Vec<&'static str> {
        rules().iter().map(|r| r.name()).collect()
    }
}
