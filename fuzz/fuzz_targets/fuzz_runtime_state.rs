#![no_main]

use libfuzzer_sys::fuzz_target;
use orbit_runtime::RuntimeState;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(state) = RuntimeState::from_json(s) else {
        return;
    };
    // Decoded visited sets are deduplicated and survive a round trip.
    let mut seen = std::collections::HashSet::new();
    assert!(state.visited.iter().all(|id| seen.insert(id)));
    if let Ok(raw) = state.to_json() {
        assert_eq!(RuntimeState::from_json(&raw).ok(), Some(state));
    }
});
