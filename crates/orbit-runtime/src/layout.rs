#![forbid(unsafe_code)]

//! Overlay geometry for one shown step.

use orbit_core::config::{BackdropConfig, EffectiveConfig};
use orbit_core::geometry::{Point, Rect, Size};
use orbit_widgets::{ExtraHole, SpotlightMask, TooltipPosition, compute_mask, modal_position, position};

/// How a step is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewMode {
    /// Anchored to the resolved target.
    Tooltip,
    /// Modal surface; the target, if any, is still spotlighted.
    Modal,
    /// No anchor (untargeted, halted, or target lost): centered, no hole.
    Floating,
}

impl ViewMode {
    /// Pick the mode for a step given its modal flag and resolved target.
    pub fn select(modal: bool, has_target: bool) -> Self {
        match (modal, has_target) {
            (true, _) => Self::Modal,
            (false, true) => Self::Tooltip,
            (false, false) => Self::Floating,
        }
    }
}

/// Everything the presenter needs to place the overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayout {
    pub mode: ViewMode,
    pub viewport: Size,
    /// Target rectangle as measured for this frame.
    pub target: Option<Rect>,
    pub mask: SpotlightMask,
    /// CSS `clip-path` value shared by the blur and dim layers.
    pub clip_path: String,
    pub backdrop: BackdropConfig,
    /// Tooltip placement (tooltip mode only).
    pub tooltip: Option<TooltipPosition>,
    /// Top-left of the modal or floating surface.
    pub surface: Option<Point>,
    /// Measured size of the UI container.
    pub container: Size,
}

/// Compute the overlay layout.
///
/// `container` is the measured UI container size; tooltip mode without a
/// measurable target degrades to floating.
pub fn compute_layout(
    mode: ViewMode,
    target: Option<Rect>,
    container: Size,
    viewport: Size,
    config: &EffectiveConfig,
) -> OverlayLayout {
    let mode = match (mode, target) {
        (ViewMode::Tooltip, None) => ViewMode::Floating,
        (mode, _) => mode,
    };

    let (mask, tooltip, surface) = match mode {
        ViewMode::Tooltip => {
            let tooltip = target.map(|rect| {
                position(
                    rect,
                    container,
                    viewport,
                    config.tooltip.placement,
                    config.tooltip.offset,
                )
            });
            let mask = compute_mask(target, &[], viewport, &config.spotlight);
            (mask, tooltip, None)
        }
        ViewMode::Modal => {
            let at = modal_position(config.modal.style, container, viewport);
            let surface = ExtraHole::new(Rect::new(at.left, at.top, container.width, container.height))
                .radius(config.spotlight.border_radius);
            let mask = compute_mask(target, &[surface], viewport, &config.spotlight);
            (mask, None, Some(at))
        }
        ViewMode::Floating => {
            let at = modal_position(Default::default(), container, viewport);
            let mask = compute_mask(None, &[], viewport, &config.spotlight);
            (mask, None, Some(at))
        }
    };

    OverlayLayout {
        mode,
        viewport,
        target,
        clip_path: mask.clip_path(),
        mask,
        backdrop: config.backdrop,
        tooltip,
        surface,
        container,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbit_widgets::Side;

    const VIEWPORT: Size = Size::new(1000.0, 800.0);

    #[test]
    fn tooltip_mode_spotlights_target() {
        let cfg = EffectiveConfig::default();
        let layout = compute_layout(
            ViewMode::Tooltip,
            Some(Rect::new(100.0, 100.0, 50.0, 20.0)),
            Size::new(360.0, 120.0),
            VIEWPORT,
            &cfg,
        );
        assert_eq!(layout.mode, ViewMode::Tooltip);
        assert_eq!(layout.mask.holes.len(), 1);
        assert_eq!(layout.tooltip.map(|t| t.side), Some(Side::Right));
        assert!(layout.clip_path.starts_with("path(evenodd, \"M0 0 H1000 V800 H0 Z M"));
    }

    #[test]
    fn lost_target_degrades_to_floating() {
        let cfg = EffectiveConfig::default();
        let layout = compute_layout(ViewMode::Tooltip, None, Size::new(360.0, 100.0), VIEWPORT, &cfg);
        assert_eq!(layout.mode, ViewMode::Floating);
        assert!(!layout.mask.has_holes());
        assert_eq!(layout.surface, Some(Point::new(350.0, 320.0)));
    }

    #[test]
    fn modal_cuts_surface_hole() {
        let cfg = EffectiveConfig::default();
        let layout = compute_layout(ViewMode::Modal, None, Size::new(400.0, 200.0), VIEWPORT, &cfg);
        assert_eq!(layout.surface, Some(Point::new(300.0, 300.0)));
        assert_eq!(layout.mask.holes.len(), 1);
        assert_eq!(layout.mask.holes[0].bounds(), Rect::new(300.0, 300.0, 400.0, 200.0));
    }

    #[test]
    fn mode_selection() {
        assert_eq!(ViewMode::select(true, false), ViewMode::Modal);
        assert_eq!(ViewMode::select(true, true), ViewMode::Modal);
        assert_eq!(ViewMode::select(false, true), ViewMode::Tooltip);
        assert_eq!(ViewMode::select(false, false), ViewMode::Floating);
    }
}
