use std::time::{Duration, Instant};

/// Geometry for keeping the focused element clear of the overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollConfig {
    /// Height of the overlay pinned to the bottom of the viewport.
    pub overlay_height: f64,
    /// Gap kept between the focused element and the top of the overlay.
    pub bottom_padding: f64,
    /// Gap kept between the focused element and the top of the viewport.
    pub top_padding: f64,
    /// How long to wait before measuring, so the host's own scroll-into-view settles first.
    pub settle_delay: Duration,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            overlay_height: 316.0,
            bottom_padding: 20.0,
            top_padding: 20.0,
            settle_delay: Duration::from_millis(50),
        }
    }
}

/// Viewport-relative vertical extent of an element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementRect {
    pub top: f64,
    pub bottom: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementId(pub usize);

/// Where focus landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusTarget {
    None,
    /// The document root; nothing to reveal.
    Root,
    /// Somewhere inside the overlay itself.
    Surface,
    Element(ElementId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollBehavior {
    Instant,
    Smooth,
}

/// The page hosting the overlay.
pub trait Viewport {
    fn viewport_height(&self) -> f64;
    fn element_rect(&self, element: ElementId) -> Option<ElementRect>;
    /// Positive scrolls content up (reveals what is below).
    fn scroll_by(&mut self, delta: f64, behavior: ScrollBehavior);
}

/// Signed scroll distance that brings `rect` into the safe area, if any.
///
/// The bottom edge is checked first; if it sits under the overlay the page
/// scrolls down by exactly the overlap. Otherwise an element above the top
/// padding is scrolled back down to it.
pub fn correction(rect: ElementRect, viewport_height: f64, config: &ScrollConfig) -> Option<f64> {
    let safe_bottom = viewport_height - config.overlay_height - config.bottom_padding;
    if rect.bottom > safe_bottom {
        Some(rect.bottom - safe_bottom)
    } else if rect.top < config.top_padding {
        Some(rect.top - config.top_padding)
    } else {
        None
    }
}

/// Measure `element` now and issue at most one smooth scroll.
pub fn ensure_visible(viewport: &mut dyn Viewport, element: ElementId, config: &ScrollConfig) {
    let Some(rect) = viewport.element_rect(element) else {
        return;
    };
    if let Some(delta) = correction(rect, viewport.viewport_height(), config) {
        viewport.scroll_by(delta, ScrollBehavior::Smooth);
    }
}

#[derive(Clone, Copy, Debug)]
struct PendingCheck {
    element: ElementId,
    due: Instant,
}

/// Focus changes waiting out the settle delay.
#[derive(Debug, Default)]
pub struct FocusScheduler {
    pending: Vec<PendingCheck>,
}

impl FocusScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a visibility check for a focus change. Targets outside the page
    /// content are ignored.
    pub fn focus_changed(&mut self, target: FocusTarget, now: Instant, config: &ScrollConfig) {
        if let FocusTarget::Element(element) = target {
            self.pending.push(PendingCheck {
                element,
                due: now + config.settle_delay,
            });
        }
    }

    /// Run every check whose delay has elapsed, oldest first.
    pub fn run_due(&mut self, now: Instant, viewport: &mut dyn Viewport, config: &ScrollConfig) {
        let (due, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|check| check.due <= now);
        self.pending = waiting;
        for check in due {
            ensure_visible(viewport, check.element, config);
        }
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }
}
