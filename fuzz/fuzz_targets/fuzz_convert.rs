#![no_main]
use libfuzzer_sys::fuzz_target;

use assertive_term::{goal_to_pexp, to_pexp, Exp};

fuzz_target!(|data: &[u8]| {
    let Ok(exp) = serde_json::from_slice::<Exp>(data) else {
        return;
    };
    // Conversion in either role fails exactly on an untyped node.
    for converted in [to_pexp(&exp), goal_to_pexp(&exp)] {
        match converted {
            Ok(p) => {
                let _ = p.size();
                assert!(exp.first_untyped().is_none());
            }
            Err(_) => assert!(exp.first_untyped().is_some()),
        }
    }
});
