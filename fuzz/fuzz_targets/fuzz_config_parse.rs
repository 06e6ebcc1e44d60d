// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz GenUiConfig TOML parsing and validation.
//!
//! 1. `parse_toml` never panics on arbitrary input.
//! 2. Parsed configs validate without panics and warnings display.
//! 3. Serializing back to TOML and re-parsing gives the same config.
#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = genui_config::parse_toml(s) else {
        return;
    };

    match genui_config::validate_config(&config) {
        Ok(warnings) => {
            for w in &warnings {
                let _ = format!("{w}");
            }
        }
        Err(e) => {
            let _ = format!("{e}");
        }
    }

    if let Ok(text) = toml::to_string(&config)
        && let Ok(again) = genui_config::parse_toml(&text)
    {
        assert_eq!(again, config);
    }
});
