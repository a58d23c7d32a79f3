#![forbid(unsafe_code)]

//! Tooltip and modal placement.
//!
//! A tooltip floats beside its target on one of four sides. With
//! [`Placement::Auto`] the sides are tried in the order right, bottom, top,
//! left; the first side that fits without clamping wins, otherwise the first
//! side is used clamped. Clamping keeps a [`VIEWPORT_MARGIN`] gap to every
//! viewport edge.
//!
//! Modal surfaces ignore the target and are positioned by [`ModalStyle`].

use orbit_core::Placement;
use orbit_core::geometry::{Point, Rect, Size};
use orbit_core::options::ModalStyle;

/// Minimum distance between a clamped tooltip and the viewport edge.
pub const VIEWPORT_MARGIN: f64 = 10.0;

/// A concrete side of the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// Order in which `auto` tries the sides.
    pub const AUTO_ORDER: [Side; 4] = [Side::Right, Side::Bottom, Side::Top, Side::Left];

    /// The forced side for `placement`, or `None` for auto.
    pub fn from_placement(placement: Placement) -> Option<Self> {
        match placement {
            Placement::Auto => None,
            Placement::Top => Some(Self::Top),
            Placement::Right => Some(Self::Right),
            Placement::Bottom => Some(Self::Bottom),
            Placement::Left => Some(Self::Left),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }
}

/// Where the tooltip lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipPosition {
    pub top: f64,
    pub left: f64,
    pub side: Side,
    /// Whether the raw position had to be pulled back into the viewport.
    pub clamped: bool,
}

impl TooltipPosition {
    pub fn point(&self) -> Point {
        Point::new(self.top, self.left)
    }

    /// The tooltip rectangle given its size.
    pub fn rect(&self, container: Size) -> Rect {
        Rect::new(self.left, self.top, container.width, container.height)
    }
}

/// Position a tooltip of size `container` next to `target`.
pub fn position(
    target: Rect,
    container: Size,
    viewport: Size,
    placement: Placement,
    offset: f64,
) -> TooltipPosition {
    if let Some(side) = Side::from_placement(placement) {
        return place(side, target, container, viewport, offset);
    }

    let mut first = None;
    for side in Side::AUTO_ORDER {
        let candidate = place(side, target, container, viewport, offset);
        if !candidate.clamped {
            return candidate;
        }
        first.get_or_insert(candidate);
    }
    // AUTO_ORDER is non-empty, so `first` is always set here.
    first.unwrap_or_else(|| place(Side::Right, target, container, viewport, offset))
}

fn place(side: Side, target: Rect, container: Size, viewport: Size, offset: f64) -> TooltipPosition {
    let (top, left) = match side {
        Side::Bottom => (
            target.bottom() + offset,
            target.center_x() - container.width / 2.0,
        ),
        Side::Top => (
            target.top() - container.height - offset,
            target.center_x() - container.width / 2.0,
        ),
        Side::Right => (
            target.center_y() - container.height / 2.0,
            target.right() + offset,
        ),
        Side::Left => (
            target.center_y() - container.height / 2.0,
            target.left() - container.width - offset,
        ),
    };

    let clamped_top = clamp_axis(top, container.height, viewport.height);
    let clamped_left = clamp_axis(left, container.width, viewport.width);

    TooltipPosition {
        top: clamped_top,
        left: clamped_left,
        side,
        clamped: clamped_top != top || clamped_left != left,
    }
}

/// `max(margin, min(v, limit - extent - margin))`.
fn clamp_axis(v: f64, extent: f64, limit: f64) -> f64 {
    v.min(limit - extent - VIEWPORT_MARGIN).max(VIEWPORT_MARGIN)
}

/// Top-left corner of a modal surface of size `container`.
///
/// The result is clamped so the surface stays inside the viewport whenever
/// it fits.
pub fn modal_position(style: ModalStyle, container: Size, viewport: Size) -> Point {
    let center_left = (viewport.width - container.width) / 2.0;
    let center_top = (viewport.height - container.height) / 2.0;

    let (top, left) = match style {
        ModalStyle::Center => (center_top, center_left),
        ModalStyle::CenterOffset { x, y } => (center_top + y, center_left + x),
        ModalStyle::TopCenter { margin } => (margin, center_left),
        ModalStyle::Fixed { top, left } => (top, left),
    };

    let max_top = (viewport.height - container.height).max(0.0);
    let max_left = (viewport.width - container.width).max(0.0);
    Point::new(top.clamp(0.0, max_top), left.clamp(0.0, max_left))
}
