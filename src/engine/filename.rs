// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Extension handling and clean filename reconstruction

/// Characters reserved by common filesystems, deleted from built names
pub const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Minimum digits in the episode part of a built filename
pub const EPISODE_WIDTH: usize = 2;

/// Split a filename into `(stem, extension)`.
///
/// The extension keeps its leading dot and is empty when there is none.
/// Only the last `/`-separated component is considered (a backslash is an
/// ordinary filename character), and the leading dots of a dot-file
/// (`.mkv`, `..hidden`) never start an extension.
pub fn split_extension(filename: &str) -> (&str, &str) {
    let name_start = filename
        .rfind('/')
        .map(|i| i + 1)
        .unwrap_or(0);

    match filename.rfind('.') {
        Some(dot) if dot > name_start && filename[name_start..dot].bytes().any(|b| b != b'.') => {
            filename.split_at(dot)
        }
        _ => (filename, ""),
    }
}

/// Left-pad an episode with zeros to [`EPISODE_WIDTH`]
pub fn pad_episode(episode: &str) -> String {
    format!("{:0>width$}", episode, width = EPISODE_WIDTH)
}

/// Delete every [`RESERVED_CHARS`] character
pub fn strip_reserved(name: &str) -> String {
    name.chars().filter(|c| !RESERVED_CHARS.contains(c)).collect()
}

/// Build `"<series> - Episode <NN><ext>"` (or `"<series><ext>"` without an
/// episode) using the extension of `original_filename`.
pub fn build_filename(series_name: &str, episode: Option<&str>, original_filename: &str) -> String {
    let (_, extension) = split_extension(original_filename);

    let built = match episode.filter(|e| !e.is_empty()) {
        Some(ep) => format!("{} - Episode {}{}", series_name, pad_episode(ep), extension),
        None => format!("{}{}", series_name, extension),
    };

    strip_reserved(&built)
}
