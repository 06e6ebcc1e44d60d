// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz the dashboard schema gate with arbitrary JSON documents.
#![no_main]
use genui_core::{unwrap_envelope, validate_dashboard};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(doc) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let Ok(inner) = unwrap_envelope(&doc) else {
        return;
    };
    match validate_dashboard(inner) {
        Ok(state) => {
            // An accepted document is exactly the state it produced.
            let back = serde_json::to_value(&state).unwrap();
            assert_eq!(&back, inner);
        }
        Err(violations) => {
            assert!(!violations.is_empty());
            for v in &violations {
                let _ = v.to_string();
            }
        }
    }
});
