#![no_main]
use libfuzzer_sys::fuzz_target;

use assertive_engine::pipeline::{run, PipelineOptions};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let options = PipelineOptions {
        generate_proofs: true,
        max_steps: 200,
        ..PipelineOptions::default()
    };
    // Generation and proving must never panic on a unit the loader accepts.
    let _ = run(s, &options);
});
