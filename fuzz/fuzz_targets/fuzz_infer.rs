// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

#![no_main]

use anirename::engine::filename::RESERVED_CHARS;
use anirename::{build_filename, infer_info};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|filename: &str| {
    let info = infer_info(filename);

    if let Some(ep) = &info.episode {
        assert!(!ep.is_empty());
        assert!(!info.series_name.is_empty());
    }

    let built = build_filename(&info.series_name, info.episode.as_deref(), filename);
    assert!(!built.contains(RESERVED_CHARS));
});
