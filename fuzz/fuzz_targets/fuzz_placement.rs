#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use orbit_core::{Placement, Rect, Size};
use orbit_widgets::position;

#[derive(Arbitrary, Debug)]
struct Input {
    target: [i16; 4],
    container: [u16; 2],
    viewport: [u16; 2],
    placement: u8,
    offset: u8,
}

fuzz_target!(|input: Input| {
    let [x, y, w, h] = input.target;
    let target = Rect::new(f64::from(x), f64::from(y), f64::from(w.unsigned_abs()), f64::from(h.unsigned_abs()));
    let container = Size::new(f64::from(input.container[0]), f64::from(input.container[1]));
    let viewport = Size::new(f64::from(input.viewport[0]), f64::from(input.viewport[1]));
    let placement = match input.placement % 5 {
        0 => Placement::Auto,
        1 => Placement::Top,
        2 => Placement::Right,
        3 => Placement::Bottom,
        _ => Placement::Left,
    };
    let pos = position(target, container, viewport, placement, f64::from(input.offset));
    assert!(pos.top.is_finite() && pos.left.is_finite());
});
