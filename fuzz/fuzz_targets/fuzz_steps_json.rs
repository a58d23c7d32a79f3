#![no_main]

use libfuzzer_sys::fuzz_target;
use orbit_core::Step;
use orbit_runtime::candidate_selectors;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(steps) = Step::list_from_json_str(s) else {
        return;
    };
    // Selector expansion must cope with any data key or class name.
    for step in &steps {
        let _ = candidate_selectors(step);
    }
});
