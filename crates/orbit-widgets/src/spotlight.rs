#![forbid(unsafe_code)]

//! Spotlight mask geometry.
//!
//! The spotlight is a full-viewport rectangle with one or more holes punched
//! through it under the even-odd fill rule. The same mask drives two
//! independent overlay layers: a blur layer and a dim layer. Either layer is
//! omitted when its strength is zero.
//!
//! # Invariants
//!
//! 1. The outer rectangle always covers the whole viewport.
//! 2. No target and no extra holes means no holes (the overlay is uniform).
//! 3. A rounded hole's corner radius never exceeds half of its shorter side.
//! 4. A circle hole fully contains the padded target rectangle's bounding
//!    square, centered on the target.

use std::fmt::Write as _;

use orbit_core::SpotlightShape;
use orbit_core::config::SpotlightConfig;
use orbit_core::geometry::{Rect, Size};

/// A single cut-out in the mask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hole {
    /// Rounded rectangle (a zero radius gives square corners).
    RoundedRect { rect: Rect, radius: f64 },
    /// Circle centered at `(cx, cy)`.
    Circle { cx: f64, cy: f64, r: f64 },
}

impl Hole {
    /// Axis-aligned bounds of the hole.
    pub fn bounds(&self) -> Rect {
        match *self {
            Self::RoundedRect { rect, .. } => rect,
            Self::Circle { cx, cy, r } => Rect::new(cx - r, cy - r, r * 2.0, r * 2.0),
        }
    }

    fn write_path(&self, out: &mut String) {
        match *self {
            Self::RoundedRect { rect, radius } => write_rounded_rect(out, rect, radius),
            Self::Circle { cx, cy, r } => {
                let _ = write!(
                    out,
                    " M{} {} A{r} {r} 0 1 0 {} {} A{r} {r} 0 1 0 {} {} Z",
                    num(cx - r),
                    num(cy),
                    num(cx + r),
                    num(cy),
                    num(cx - r),
                    num(cy),
                    r = num(r),
                );
            }
        }
    }
}

/// An additional hole with its own padding and radius, e.g. the modal
/// surface in modal mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtraHole {
    pub rect: Rect,
    pub padding: f64,
    pub radius: f64,
}

impl ExtraHole {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            padding: 0.0,
            radius: 0.0,
        }
    }

    #[must_use]
    pub fn padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    #[must_use]
    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }
}

/// The computed mask plus the layers that share it.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotlightMask {
    pub viewport: Size,
    pub holes: Vec<Hole>,
    /// Blur radius in pixels, present only when positive.
    pub blur: Option<f64>,
    /// Dim opacity, present only when positive.
    pub dim_opacity: Option<f64>,
}

impl SpotlightMask {
    /// SVG path data: the viewport rectangle followed by every hole.
    pub fn path_data(&self) -> String {
        let mut out = format!(
            "M0 0 H{} V{} H0 Z",
            num(self.viewport.width),
            num(self.viewport.height)
        );
        for hole in &self.holes {
            hole.write_path(&mut out);
        }
        out
    }

    /// Value for the CSS `clip-path` property.
    pub fn clip_path(&self) -> String {
        format!("path(evenodd, \"{}\")", self.path_data())
    }

    pub fn has_holes(&self) -> bool {
        !self.holes.is_empty()
    }

    /// Whether a point falls inside any hole (i.e. is not covered).
    pub fn is_uncovered(&self, x: f64, y: f64) -> bool {
        self.holes.iter().any(|hole| match *hole {
            Hole::RoundedRect { rect, .. } => rect.contains(x, y),
            Hole::Circle { cx, cy, r } => {
                let (dx, dy) = (x - cx, y - cy);
                dx * dx + dy * dy < r * r
            }
        })
    }
}

/// Compute the spotlight mask for `target` and any `extra` holes.
pub fn compute_mask(
    target: Option<Rect>,
    extra: &[ExtraHole],
    viewport: Size,
    config: &SpotlightConfig,
) -> SpotlightMask {
    let mut holes = Vec::with_capacity(extra.len() + 1);

    if let Some(rect) = target {
        let padded = rect.expand(config.padding.max(0.0));
        let hole = match config.shape {
            SpotlightShape::Rounded => Hole::RoundedRect {
                rect: padded,
                radius: clamp_radius(config.border_radius, padded),
            },
            SpotlightShape::Pill => Hole::RoundedRect {
                rect: padded,
                radius: clamp_radius(f64::INFINITY, padded),
            },
            SpotlightShape::Circle => Hole::Circle {
                cx: padded.center_x(),
                cy: padded.center_y(),
                r: padded.width.max(padded.height).max(0.0) / 2.0,
            },
        };
        holes.push(hole);
    }

    for hole in extra {
        let padded = hole.rect.expand(hole.padding.max(0.0));
        holes.push(Hole::RoundedRect {
            rect: padded,
            radius: clamp_radius(hole.radius, padded),
        });
    }

    SpotlightMask {
        viewport,
        holes,
        blur: (config.blur > 0.0).then_some(config.blur),
        dim_opacity: (config.dim_opacity > 0.0).then_some(config.dim_opacity),
    }
}

fn clamp_radius(radius: f64, rect: Rect) -> f64 {
    radius.min(rect.size().min_side() / 2.0).max(0.0)
}

fn write_rounded_rect(out: &mut String, rect: Rect, r: f64) {
    let (x, y, right, bottom) = (rect.x, rect.y, rect.right(), rect.bottom());
    if r <= 0.0 {
        let _ = write!(
            out,
            " M{} {} H{} V{} H{} Z",
            num(x),
            num(y),
            num(right),
            num(bottom),
            num(x)
        );
        return;
    }
    let arc = format!("A{0} {0} 0 0 1", num(r));
    let _ = write!(
        out,
        " M{} {} H{} {arc} {} {} V{} {arc} {} {} H{} {arc} {} {} V{} {arc} {} {} Z",
        num(x + r),
        num(y),
        num(right - r),
        num(right),
        num(y + r),
        num(bottom - r),
        num(right - r),
        num(bottom),
        num(x + r),
        num(x),
        num(bottom - r),
        num(y + r),
        num(x + r),
        num(y),
    );
}

/// Format a coordinate with at most two decimals and no trailing zeros.
fn num(v: f64) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        let s = format!("{rounded:.2}");
        s.trim_end_matches('0').to_owned()
    }
}
