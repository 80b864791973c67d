#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Loading and preflight must never panic on any input.
        if let Ok(unit) = assertive_engine::pipeline::load(s) {
            let _ = assertive_engine::pipeline::preflight(&unit);
        }
    }
});
