#![no_main]

use libfuzzer_sys::fuzz_target;
use orbit_core::{Options, Step, merge};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    // Malformed options must be an error, never a panic.
    let Ok(options) = Options::from_json_str(s) else {
        return;
    };
    // Whatever parses must merge, both as globals and as a step override.
    let mut step = Step::new("fuzz", "x");
    step.overrides = options.clone();
    let _ = merge(&options, &step);
    let _ = merge(&Options::default(), &step);
    assert!(options.to_json_string().is_ok());
});
