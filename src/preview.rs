// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Human and machine readable rename reports

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engine::InferenceResult;

/// What the engine would do with a filename
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamePreview {
    pub original: String,
    pub series_name: String,
    pub episode: Option<String>,
    pub new_filename: String,
}

impl RenamePreview {
    pub fn new(original: &str, info: InferenceResult, new_filename: String) -> Self {
        Self {
            original: original.to_string(),
            series_name: info.series_name,
            episode: info.episode,
            new_filename,
        }
    }

    /// Short caption attached to a delivered file
    pub fn caption(&self) -> String {
        match &self.episode {
            Some(ep) => format!("Renamed: {} - Episode {}", self.series_name, ep),
            None => format!("Renamed: {}", self.series_name),
        }
    }
}

impl fmt::Display for RenamePreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Original: {}", self.original)?;
        writeln!(f, "Detected Anime: {}", self.series_name)?;
        writeln!(f, "Episode: {}", self.episode.as_deref().unwrap_or("Not detected"))?;
        write!(f, "New Filename: {}", self.new_filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::InferenceEngine;

    #[test]
    fn test_display_report() {
        let preview = InferenceEngine::new().preview("Show.S02E07.mkv");
        assert_eq!(
            preview.to_string(),
            "Original: Show.S02E07.mkv\n\
             Detected Anime: Show\n\
             Episode: 07\n\
             New Filename: Show - Episode 07.mkv"
        );
    }

    #[test]
    fn test_display_without_episode() {
        let preview = InferenceEngine::new().preview("randomfile.mkv");
        assert!(preview.to_string().contains("Episode: Not detected"));
        assert_eq!(preview.new_filename, "randomfile.mkv");
        assert_eq!(preview.caption(), "Renamed: randomfile");
    }

    #[test]
    fn test_caption_uses_raw_episode() {
        let preview = InferenceEngine::new().preview("Show - 5.mkv");
        assert_eq!(preview.caption(), "Renamed: Show - Episode 5");

        let preview = InferenceEngine::new().preview("randomfile.mkv");
        assert_eq!(preview.caption(), "Renamed: randomfile");
    }

    #[test]
    fn test_json_shape() {
        let preview = InferenceEngine::new().preview("Show - 5.mkv");
        let json = serde_json::to_value(&preview).unwrap();
        assert_eq!(json["series_name"], "Show");
        assert_eq!(json["episode"], "5");
        assert_eq!(json["new_filename"], "Show - Episode 05.mkv");
    }
}
