#![forbid(unsafe_code)]

//! History interception is installed once per process, however many tours
//! mount. Kept in its own test binary because the guard is process-wide.

use orbit_core::options::Options;
use orbit_core::step::Step;
use orbit_runtime::router::is_history_intercepted;
use orbit_web::HeadlessHost;

#[test]
fn interception_installs_once_per_process() {
    assert!(!is_history_intercepted());

    let first = HeadlessHost::new(800.0, 600.0, "/");
    let second = HeadlessHost::new(800.0, 600.0, "/");

    let mut a = first.tour(vec![Step::new("a", "x")], Options::default());
    a.mount();
    let mut b = second.tour(vec![Step::new("b", "y")], Options::default());
    b.mount();

    assert!(is_history_intercepted());
    assert_eq!(first.history.intercept_count(), 1);
    assert_eq!(second.history.intercept_count(), 0);

    a.unmount();
    b.unmount();
    a.mount();
    assert_eq!(first.history.intercept_count(), 1);
}
