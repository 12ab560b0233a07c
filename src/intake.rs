// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Accepting media files and renaming them on disk

use chrono::Local;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::{AppConfig, IntakeConfig};
use crate::engine::{split_extension, InferenceEngine};
use crate::preview::RenamePreview;
use crate::{RenameError, Result};

/// Give up once this many candidate names are all taken
const MAX_NAME_ATTEMPTS: usize = 1000;

/// Reject anything that is not an accepted video or is over the size limit
pub fn validate_media(file_name: &str, size: u64, config: &IntakeConfig) -> Result<()> {
    let lower = file_name.to_lowercase();
    let accepted = config
        .extensions
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext.to_lowercase())));

    if !accepted {
        return Err(RenameError::UnsupportedMediaType(file_name.to_string()));
    }

    if size > config.max_file_size {
        return Err(RenameError::FileTooLarge {
            size,
            limit: config.max_file_size,
        });
    }

    Ok(())
}

/// What happened to a processed file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenameStatus {
    Renamed,
    DryRun,
    Unchanged,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenameOutcome {
    pub preview: RenamePreview,
    pub target: PathBuf,
    pub status: RenameStatus,
}

/// Validates, infers and renames files
#[derive(Debug, Clone)]
pub struct Renamer {
    engine: InferenceEngine,
    intake: IntakeConfig,
    collision_suffix: bool,
    dry_run: bool,
}

impl Renamer {
    pub fn new(engine: InferenceEngine, config: &AppConfig) -> Self {
        Self {
            engine,
            intake: config.intake.clone(),
            collision_suffix: config.rules.collision_suffix,
            dry_run: config.rules.dry_run,
        }
    }

    /// Override the configured dry-run setting
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Rename a single file according to its inferred name
    pub fn process(&self, path: &Path) -> Result<RenameOutcome> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| RenameError::UnsupportedMediaType(path.to_string_lossy().to_string()))?;

        let metadata = fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(RenameError::FileSystem(io::Error::new(
                ErrorKind::InvalidInput,
                format!("not a regular file: {:?}", path),
            )));
        }

        validate_media(file_name, metadata.len(), &self.intake)?;

        let preview = self.engine.preview(file_name);
        debug!("Inferred {:?} episode {:?}", preview.series_name, preview.episode);

        let dir = match &self.intake.output_dir {
            Some(out) => PathBuf::from(out),
            None => path.parent().map(Path::to_path_buf).unwrap_or_default(),
        };

        if dir.join(file_name) == path
            && (file_name == preview.new_filename || is_suffixed_variant(file_name, &preview.new_filename))
        {
            debug!("Already clean: {:?}", path);
            return Ok(RenameOutcome {
                preview,
                target: path.to_path_buf(),
                status: RenameStatus::Unchanged,
            });
        }

        let timestamp = Local::now().format("%H%M%S").to_string();
        let attempts = if self.collision_suffix { MAX_NAME_ATTEMPTS } else { 1 };

        if self.dry_run {
            let target = (0..attempts)
                .map(|n| dir.join(suffixed_name(&preview.new_filename, &timestamp, n)))
                .find(|p| !p.exists())
                .ok_or_else(|| no_free_name(&dir, &preview.new_filename))?;
            info!("DRY RUN: Would rename {:?} to {:?}", path, target);
            return Ok(RenameOutcome {
                preview,
                target,
                status: RenameStatus::DryRun,
            });
        }

        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(&dir)?;
        }

        // The existence check and the move must be one step: concurrent
        // watch tasks can land on the same clean name.
        for attempt in 0..attempts {
            let target = dir.join(suffixed_name(&preview.new_filename, &timestamp, attempt));
            match move_no_clobber(path, &target) {
                Ok(()) => {
                    if attempt > 0 {
                        warn!("{:?} was taken, used {:?}", preview.new_filename, target);
                    }
                    info!("Renamed to: {:?} ({})", target, preview.caption());
                    return Ok(RenameOutcome {
                        preview,
                        target,
                        status: RenameStatus::Renamed,
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("{:?} exists, trying next name", target);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(no_free_name(&dir, &preview.new_filename))
    }
}

/// `name`, then `stem_HHMMSS.ext`, then `stem_HHMMSS_2.ext`, ...
fn suffixed_name(file_name: &str, timestamp: &str, attempt: usize) -> String {
    let (stem, ext) = split_extension(file_name);
    match attempt {
        0 => file_name.to_string(),
        1 => format!("{}_{}{}", stem, timestamp, ext),
        n => format!("{}_{}_{}{}", stem, timestamp, n, ext),
    }
}

/// Whether `file_name` is a collision-suffixed copy of `clean_name`
fn is_suffixed_variant(file_name: &str, clean_name: &str) -> bool {
    let (clean_stem, clean_ext) = split_extension(clean_name);
    let (stem, ext) = split_extension(file_name);
    if ext != clean_ext {
        return false;
    }

    let Some(rest) = stem.strip_prefix(clean_stem).and_then(|r| r.strip_prefix('_')) else {
        return false;
    };
    let (time, counter) = match rest.split_once('_') {
        Some((t, n)) => (t, Some(n)),
        None => (rest, None),
    };

    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    time.len() == 6 && digits(time) && counter.map_or(true, digits)
}

fn no_free_name(dir: &Path, file_name: &str) -> RenameError {
    RenameError::FileSystem(io::Error::new(
        ErrorKind::AlreadyExists,
        format!("no free name for {:?} in {:?}", file_name, dir),
    ))
}

/// Move `from` to `to`, failing with `AlreadyExists` rather than replacing `to`.
///
/// A hard link claims the name atomically; across filesystems the target is
/// created with `create_new` and filled by copying.
fn move_no_clobber(from: &Path, to: &Path) -> io::Result<()> {
    match fs::hard_link(from, to) {
        Ok(()) => fs::remove_file(from),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(e),
        Err(e) => {
            debug!("hard link failed ({}), copying instead", e);
            let mut dst = OpenOptions::new().write(true).create_new(true).open(to)?;
            let copied = File::open(from).and_then(|mut src| io::copy(&mut src, &mut dst));
            if let Err(e) = copied {
                let _ = fs::remove_file(to);
                return Err(e);
            }
            fs::remove_file(from)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str, bytes: usize) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, vec![0u8; bytes]).unwrap();
        path
    }

    fn renamer(config: &AppConfig) -> Renamer {
        Renamer::new(InferenceEngine::new(), config)
    }

    #[test]
    fn test_validate_media() {
        let config = IntakeConfig::default();
        assert!(validate_media("Show - 01.MKV", 10, &config).is_ok());
        assert!(matches!(
            validate_media("notes.txt", 10, &config),
            Err(RenameError::UnsupportedMediaType(_))
        ));
        assert!(matches!(
            validate_media("Show - 01.mkv", config.max_file_size + 1, &config),
            Err(RenameError::FileTooLarge { .. })
        ));
        assert!(validate_media("Show - 01.mkv", config.max_file_size, &config).is_ok());
    }

    #[test]
    fn test_rename_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch(&dir, "[SubGroup] Great Anime - 05 [720p].mkv", 16);

        let outcome = renamer(&AppConfig::default()).process(&path).unwrap();

        assert_eq!(outcome.status, RenameStatus::Renamed);
        assert_eq!(outcome.target, dir.path().join("Great Anime - Episode 05.mkv"));
        assert!(outcome.target.exists());
        assert!(!path.exists());
    }

    #[test]
    fn test_dry_run_leaves_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch(&dir, "Show.S01E02.mp4", 4);

        let outcome = renamer(&AppConfig::default()).with_dry_run(true).process(&path).unwrap();

        assert_eq!(outcome.status, RenameStatus::DryRun);
        assert_eq!(outcome.preview.new_filename, "Show - Episode 02.mp4");
        assert!(path.exists());
        assert!(!outcome.target.exists());
    }

    #[test]
    fn test_already_clean_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch(&dir, "Show - Episode 02.mkv", 4);

        let outcome = renamer(&AppConfig::default()).process(&path).unwrap();
        assert_eq!(outcome.status, RenameStatus::Unchanged);
        assert!(path.exists());
    }

    #[test]
    fn test_collision_gets_suffix() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir, "Show - Episode 03.mkv", 1);
        let path = touch(&dir, "Show - 3.mkv", 2);

        let outcome = renamer(&AppConfig::default()).process(&path).unwrap();
        let name = outcome.target.file_name().unwrap().to_str().unwrap().to_string();

        assert!(name.starts_with("Show - Episode 03_"));
        assert!(name.ends_with(".mkv"));
        assert!(dir.path().join("Show - Episode 03.mkv").exists());
    }

    #[test]
    fn test_repeated_collisions_keep_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = [("Show - 01.mkv", "a"), ("Show 01.mkv", "b"), ("Show.S01E01.mkv", "c")];
        let renamer = renamer(&AppConfig::default());

        let mut targets = Vec::new();
        for (name, content) in inputs {
            let path = dir.path().join(name);
            fs::write(&path, content).unwrap();
            let outcome = renamer.process(&path).unwrap();
            assert_eq!(outcome.status, RenameStatus::Renamed);
            targets.push(outcome.target);
        }

        targets.sort();
        targets.dedup();
        assert_eq!(targets.len(), 3);

        let mut contents: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| fs::read_to_string(e.unwrap().path()).unwrap())
            .collect();
        contents.sort();
        assert_eq!(contents, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_suffixed_names() {
        assert_eq!(suffixed_name("Show - Episode 01.mkv", "120000", 0), "Show - Episode 01.mkv");
        assert_eq!(suffixed_name("Show - Episode 01.mkv", "120000", 1), "Show - Episode 01_120000.mkv");
        assert_eq!(suffixed_name("Show - Episode 01.mkv", "120000", 2), "Show - Episode 01_120000_2.mkv");
    }

    #[test]
    fn test_move_never_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let from = touch(&dir, "from.mkv", 3);
        let to = touch(&dir, "to.mkv", 7);

        let err = move_no_clobber(&from, &to).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert!(from.exists());
        assert_eq!(fs::metadata(&to).unwrap().len(), 7);
    }

    #[test]
    fn test_suffixed_copy_is_left_alone() {
        assert!(is_suffixed_variant("Show - Episode 01_201210.mkv", "Show - Episode 01.mkv"));
        assert!(is_suffixed_variant("Show - Episode 01_201210_3.mkv", "Show - Episode 01.mkv"));
        assert!(!is_suffixed_variant("Show - Episode 01_2012.mkv", "Show - Episode 01.mkv"));
        assert!(!is_suffixed_variant("Show - Episode 01_201210.mp4", "Show - Episode 01.mkv"));

        let dir = tempfile::tempdir().unwrap();
        touch(&dir, "Show - Episode 01.mkv", 1);
        let path = touch(&dir, "Show - Episode 01_201210.mkv", 2);

        let outcome = renamer(&AppConfig::default()).process(&path).unwrap();
        assert_eq!(outcome.status, RenameStatus::Unchanged);
        assert!(path.exists());
    }

    #[test]
    fn test_collision_without_suffix_fails() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir, "Show - Episode 03.mkv", 1);
        let path = touch(&dir, "Show - 3.mkv", 2);

        let mut config = AppConfig::default();
        config.rules.collision_suffix = false;

        assert!(renamer(&config).process(&path).is_err());
        assert!(path.exists());
    }

    #[test]
    fn test_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("sorted");
        let path = touch(&dir, "Anime Name Episode 7.avi", 8);

        let mut config = AppConfig::default();
        config.intake.output_dir = Some(out.to_string_lossy().to_string());

        let outcome = renamer(&config).process(&path).unwrap();
        assert_eq!(outcome.target, out.join("Anime Name - Episode 07.avi"));
        assert!(outcome.target.exists());
    }

    #[test]
    fn test_rejects_before_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch(&dir, "Show - 01.mkv", 64);

        let mut config = AppConfig::default();
        config.intake.max_file_size = 10;

        let err = renamer(&config).process(&path).unwrap_err();
        assert!(matches!(err, RenameError::FileTooLarge { size: 64, limit: 10 }));
        assert!(path.exists());
    }
}
