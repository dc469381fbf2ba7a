// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

#![no_main]

use libfuzzer_sys::fuzz_target;
use vitrine::manifest::{parse_fallback_script, render_fallback_script};

fuzz_target!(|data: &str| {
    if let Ok(manifest) = parse_fallback_script(data) {
        let script = render_fallback_script(&manifest).expect("manifest serializes");
        let reparsed = parse_fallback_script(&script).expect("rendered script parses");
        assert_eq!(manifest, reparsed);
    }
});
