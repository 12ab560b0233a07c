// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for anirename

use thiserror::Error;

/// Result type alias for anirename operations
pub type Result<T> = std::result::Result<T, RenameError>;

/// Notice shown to end users for failures that carry no user-facing detail
pub const GENERIC_NOTICE: &str = "Sorry, there was an error processing your file.";

/// anirename error types
///
/// The inference engine itself never fails; these cover the surrounding
/// intake, watcher, config and HTTP layers.
#[derive(Error, Debug)]
pub enum RenameError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("File too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Server error: {0}")]
    Server(String),
}

impl RenameError {
    /// Text that may be shown to the person who submitted the file.
    ///
    /// Validation failures explain themselves; everything else collapses to
    /// [`GENERIC_NOTICE`] so internal paths and OS errors never leak.
    pub fn user_notice(&self) -> String {
        match self {
            RenameError::UnsupportedMediaType(_) => {
                "Please send a video file (.mkv, .mp4, .avi, etc.)".to_string()
            }
            RenameError::FileTooLarge { limit, .. } => format!(
                "File is too large. Please send files smaller than {}MB.",
                limit / (1024 * 1024)
            ),
            _ => GENERIC_NOTICE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_notices_are_specific() {
        let err = RenameError::UnsupportedMediaType("notes.txt".to_string());
        assert!(err.user_notice().starts_with("Please send a video file"));

        let err = RenameError::FileTooLarge { size: 3 << 30, limit: 1000 * 1024 * 1024 };
        assert_eq!(
            err.user_notice(),
            "File is too large. Please send files smaller than 1000MB."
        );
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "/srv/secret/path");
        let err = RenameError::from(io);
        assert_eq!(err.user_notice(), GENERIC_NOTICE);
        assert!(!err.user_notice().contains("/srv"));
    }
}
