// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! anirename: anime filename inference and renaming
//!
//! Infers series name and episode number from messy release filenames and
//! rebuilds a clean `"<Series> - Episode NN.<ext>"` name. The engine is pure;
//! the intake, watcher and web modules wrap it for use on real files.

pub mod config;
pub mod engine;
pub mod error;
pub mod intake;
pub mod preview;
pub mod watcher;
pub mod web;

pub use config::AppConfig;
pub use engine::{build_filename, infer_info, InferenceEngine, InferenceResult};
pub use error::{RenameError, Result};
pub use preview::RenamePreview;
