//! Property-based invariant tests for overlay geometry.
//!
//! 1. A tooltip that fits the viewport never crosses the margin
//! 2. Forced placement always reports the forced side
//! 3. Rounded hole radius never exceeds half the shorter side
//! 4. Circle holes cover the padded target's center and corners' bounding square
//! 5. Modal surfaces that fit stay inside the viewport

use orbit_core::config::SpotlightConfig;
use orbit_core::geometry::{Rect, Size};
use orbit_core::options::ModalStyle;
use orbit_core::{Placement, SpotlightShape};
use orbit_widgets::{Hole, Side, VIEWPORT_MARGIN, compute_mask, modal_position, position};
use proptest::prelude::*;

fn viewport() -> impl Strategy<Value = Size> {
    (320.0f64..2000.0, 240.0f64..1400.0).prop_map(|(w, h)| Size::new(w, h))
}

fn rect_in(viewport: Size) -> impl Strategy<Value = Rect> {
    (
        0.0..viewport.width,
        0.0..viewport.height,
        1.0f64..300.0,
        1.0f64..200.0,
    )
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn placement() -> impl Strategy<Value = Placement> {
    prop_oneof![
        Just(Placement::Auto),
        Just(Placement::Top),
        Just(Placement::Right),
        Just(Placement::Bottom),
        Just(Placement::Left),
    ]
}

fn shape() -> impl Strategy<Value = SpotlightShape> {
    prop_oneof![
        Just(SpotlightShape::Rounded),
        Just(SpotlightShape::Circle),
        Just(SpotlightShape::Pill),
    ]
}

proptest! {
    #[test]
    fn fitting_tooltip_respects_margin(
        (vp, target) in viewport().prop_flat_map(|vp| (Just(vp), rect_in(vp))),
        placement in placement(),
        offset in 0.0f64..30.0,
    ) {
        let tooltip = Size::new(
            (vp.width - 2.0 * VIEWPORT_MARGIN).min(360.0),
            (vp.height - 2.0 * VIEWPORT_MARGIN).min(120.0),
        );
        let pos = position(target, tooltip, vp, placement, offset);
        prop_assert!(pos.top >= VIEWPORT_MARGIN - 1e-9);
        prop_assert!(pos.left >= VIEWPORT_MARGIN - 1e-9);
        prop_assert!(pos.top + tooltip.height <= vp.height - VIEWPORT_MARGIN + 1e-9);
        prop_assert!(pos.left + tooltip.width <= vp.width - VIEWPORT_MARGIN + 1e-9);
    }

    #[test]
    fn forced_side_is_reported(
        (vp, target) in viewport().prop_flat_map(|vp| (Just(vp), rect_in(vp))),
        placement in placement(),
    ) {
        let pos = position(target, Size::new(200.0, 80.0), vp, placement, 10.0);
        if let Some(side) = Side::from_placement(placement) {
            prop_assert_eq!(pos.side, side);
        }
    }

    #[test]
    fn rounded_radius_is_bounded(
        (vp, target) in viewport().prop_flat_map(|vp| (Just(vp), rect_in(vp))),
        padding in 0.0f64..40.0,
        radius in 0.0f64..500.0,
        shape in shape(),
    ) {
        let config = SpotlightConfig { padding, border_radius: radius, shape, blur: 0.0, dim_opacity: 0.5 };
        let mask = compute_mask(Some(target), &[], vp, &config);
        prop_assert_eq!(mask.holes.len(), 1);
        match mask.holes[0] {
            Hole::RoundedRect { rect, radius } => {
                prop_assert!(radius >= 0.0);
                prop_assert!(radius <= rect.width.min(rect.height) / 2.0 + 1e-9);
            }
            Hole::Circle { cx, cy, r } => {
                prop_assert!((cx - target.center_x()).abs() < 1e-6);
                prop_assert!((cy - target.center_y()).abs() < 1e-6);
                prop_assert!(2.0 * r + 1e-9 >= target.width.max(target.height) + 2.0 * padding);
            }
        }
    }

    #[test]
    fn modal_fits_viewport(
        vp in viewport(),
        w in 50.0f64..300.0,
        h in 50.0f64..200.0,
        dx in -500.0f64..500.0,
        dy in -500.0f64..500.0,
    ) {
        let surface = Size::new(w, h);
        for style in [
            ModalStyle::Center,
            ModalStyle::CenterOffset { x: dx, y: dy },
            ModalStyle::TopCenter { margin: dy.abs() },
            ModalStyle::Fixed { top: dy, left: dx },
        ] {
            let p = modal_position(style, surface, vp);
            prop_assert!(p.top >= 0.0 && p.left >= 0.0);
            prop_assert!(p.top + h <= vp.height + 1e-9);
            prop_assert!(p.left + w <= vp.width + 1e-9);
        }
    }
}
