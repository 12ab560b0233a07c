// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for anirename

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Directories to watch for incoming episodes
    pub watch_paths: Vec<String>,

    /// What files are accepted and where renamed files go
    #[serde(default)]
    pub intake: IntakeConfig,

    /// Rename behaviour
    #[serde(default)]
    pub rules: RuleConfig,

    /// HTTP surface settings
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IntakeConfig {
    /// Accepted extensions, without the leading dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Largest accepted file in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Move renamed files here instead of renaming in place
    #[serde(default)]
    pub output_dir: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RuleConfig {
    #[serde(default)]
    pub dry_run: bool,
    /// Append a time suffix instead of refusing when the target exists
    #[serde(default = "default_true")]
    pub collision_suffix: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_web_host")]
    pub host: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
}

// Default value functions
fn default_true() -> bool { true }
fn default_max_file_size() -> u64 { 1000 * 1024 * 1024 }
fn default_web_host() -> String { "0.0.0.0".to_string() }
fn default_web_port() -> u16 { 8080 }

fn default_extensions() -> Vec<String> {
    vec!["mkv", "mp4", "avi", "mov", "wmv", "flv", "webm"]
        .into_iter().map(String::from).collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            watch_paths: vec!["./inbox".to_string()],
            intake: IntakeConfig::default(),
            rules: RuleConfig::default(),
            web: WebConfig::default(),
        }
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            max_file_size: default_max_file_size(),
            output_dir: None,
        }
    }
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            collision_suffix: true,
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_web_host(),
            port: default_web_port(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::RenameError::Config(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Load and then apply environment overrides
    pub fn load_with_env(path: &Path) -> crate::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env(std::env::var("PORT").ok().as_deref())?;
        Ok(config)
    }

    /// A `PORT` value turns the web surface on and binds it to that port
    pub fn apply_env(&mut self, port: Option<&str>) -> crate::Result<()> {
        if let Some(raw) = port {
            let port = raw.trim().parse::<u16>()
                .map_err(|_| crate::RenameError::Config(format!("Invalid PORT value: {:?}", raw)))?;
            self.web.enabled = true;
            self.web.port = port;
            tracing::debug!("PORT set, web surface enabled on {}", port);
        }
        Ok(())
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check values that deserialize fine but make no sense
    pub fn validate(&self) -> crate::Result<()> {
        if self.intake.extensions.is_empty() {
            return Err(crate::RenameError::Config("intake.extensions is empty".to_string()));
        }
        if self.intake.max_file_size == 0 {
            return Err(crate::RenameError::Config("intake.max_file_size must be positive".to_string()));
        }
        if self.intake.extensions.iter().any(|e| e.starts_with('.')) {
            return Err(crate::RenameError::Config(
                "intake.extensions entries must not start with '.'".to_string(),
            ));
        }
        Ok(())
    }
}
