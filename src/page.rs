//! The scrollable demo form the overlay sits on top of.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::scroll::{ElementId, ElementRect, FocusTarget, ScrollBehavior, Viewport};

/// Rows above the first field: title, hint, blank.
pub const HEADER_ROWS: u16 = 3;
/// A field is a bordered box three rows tall.
pub const FIELD_HEIGHT: u16 = 3;
pub const FIELD_STRIDE: u16 = FIELD_HEIGHT + 1;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub label: String,
    pub value: String,
}

impl Field {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            value: String::new(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct ScrollAnimation {
    from: f64,
    to: f64,
    start: Instant,
    duration: Duration,
}

impl ScrollAnimation {
    fn position(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.start);
        if self.duration.is_zero() || elapsed >= self.duration {
            return self.to;
        }
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        // ease-out quad
        let eased = 1.0 - (1.0 - t) * (1.0 - t);
        self.from + (self.to - self.from) * eased
    }

    fn finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.start) >= self.duration
    }
}

pub struct DemoPage {
    fields: Vec<Field>,
    focused: Option<usize>,
    offset: f64,
    viewport_height: u16,
    /// Blank rows after the last field so it can be scrolled above the overlay.
    bottom_spacer: u16,
    smooth_duration: Duration,
    animation: Option<ScrollAnimation>,
}

impl DemoPage {
    pub fn new(fields: Vec<Field>, bottom_spacer: u16, smooth_duration: Duration) -> Self {
        Self {
            fields,
            focused: None,
            offset: 0.0,
            viewport_height: 0,
            bottom_spacer,
            smooth_duration,
            animation: None,
        }
    }

    pub fn demo(bottom_spacer: u16, smooth_duration: Duration) -> Self {
        let labels = [
            "First name",
            "Last name",
            "Email",
            "Phone",
            "Street address",
            "City",
            "State / Province",
            "Postal code",
            "Country",
            "Company",
            "Job title",
            "Website",
            "Favourite shortcut",
            "Comments",
        ];
        Self::new(
            labels.iter().map(|l| Field::new(l)).collect(),
            bottom_spacer,
            smooth_duration,
        )
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn set_viewport_height(&mut self, height: u16) {
        self.viewport_height = height;
        self.offset = self.clamp_offset(self.offset);
    }

    pub fn content_height(&self) -> u16 {
        HEADER_ROWS + self.fields.len() as u16 * FIELD_STRIDE + self.bottom_spacer
    }

    fn max_offset(&self) -> f64 {
        f64::from(self.content_height().saturating_sub(self.viewport_height))
    }

    fn clamp_offset(&self, offset: f64) -> f64 {
        offset.clamp(0.0, self.max_offset())
    }

    /// Content row where field `index` starts.
    pub fn field_top(index: usize) -> u16 {
        HEADER_ROWS + index as u16 * FIELD_STRIDE
    }

    pub fn focus(&mut self, index: usize) -> FocusTarget {
        if index >= self.fields.len() {
            return self.blur();
        }
        self.focused = Some(index);
        FocusTarget::Element(ElementId(index))
    }

    pub fn blur(&mut self) -> FocusTarget {
        self.focused = None;
        FocusTarget::None
    }

    /// Tab order over the fields, wrapping at both ends.
    pub fn focus_next(&mut self, backwards: bool) -> FocusTarget {
        let len = self.fields.len();
        if len == 0 {
            return FocusTarget::None;
        }
        let next = match (self.focused, backwards) {
            (None, false) => 0,
            (None, true) => len - 1,
            (Some(i), false) => (i + 1) % len,
            (Some(i), true) => (i + len - 1) % len,
        };
        self.focus(next)
    }

    /// Keys that reach the page. Returns the new focus target when focus moved.
    pub fn handle_key(&mut self, key: &KeyEvent) -> Option<FocusTarget> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        match key.code {
            KeyCode::Tab => Some(self.focus_next(key.modifiers.contains(KeyModifiers::SHIFT))),
            KeyCode::BackTab => Some(self.focus_next(true)),
            KeyCode::Esc => self.focused.map(|_| self.blur()),
            KeyCode::PageDown => {
                let page = f64::from(self.viewport_height / 2);
                self.scroll_by(page, ScrollBehavior::Smooth);
                None
            }
            KeyCode::PageUp => {
                let page = f64::from(self.viewport_height / 2);
                self.scroll_by(-page, ScrollBehavior::Smooth);
                None
            }
            KeyCode::Backspace => {
                if let Some(field) = self.focused_field_mut() {
                    field.value.pop();
                }
                None
            }
            KeyCode::Char(ch) => {
                if key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER)
                {
                    return None;
                }
                if let Some(field) = self.focused_field_mut() {
                    field.value.push(ch);
                }
                None
            }
            _ => None,
        }
    }

    fn focused_field_mut(&mut self) -> Option<&mut Field> {
        self.focused.and_then(|i| self.fields.get_mut(i))
    }

    /// Click at `row` rows below the top of the page area.
    pub fn click(&mut self, row: u16) -> FocusTarget {
        let content_row = f64::from(row) + self.offset.round();
        let hit = (0..self.fields.len()).find(|&i| {
            let top = f64::from(Self::field_top(i));
            content_row >= top && content_row < top + f64::from(FIELD_HEIGHT)
        });
        match hit {
            Some(index) => self.focus(index),
            None => {
                self.focused = None;
                FocusTarget::Root
            }
        }
    }

    /// Advance the smooth scroll animation.
    pub fn tick(&mut self, now: Instant) {
        if let Some(animation) = self.animation {
            self.offset = self.clamp_offset(animation.position(now));
            if animation.finished(now) {
                self.animation = None;
            }
        }
    }
}

impl Viewport for DemoPage {
    fn viewport_height(&self) -> f64 {
        f64::from(self.viewport_height)
    }

    fn element_rect(&self, element: ElementId) -> Option<ElementRect> {
        if element.0 >= self.fields.len() {
            return None;
        }
        let top = f64::from(Self::field_top(element.0)) - self.offset;
        Some(ElementRect {
            top,
            bottom: top + f64::from(FIELD_HEIGHT),
        })
    }

    fn scroll_by(&mut self, delta: f64, behavior: ScrollBehavior) {
        let target = self.clamp_offset(self.offset + delta);
        match behavior {
            ScrollBehavior::Instant => {
                self.animation = None;
                self.offset = target;
            }
            ScrollBehavior::Smooth => {
                // Starts from wherever a running animation currently is
                self.animation = Some(ScrollAnimation {
                    from: self.offset,
                    to: target,
                    start: Instant::now(),
                    duration: self.smooth_duration,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroll::{self, ScrollConfig};

    fn page() -> DemoPage {
        let mut page = DemoPage::demo(12, Duration::ZERO);
        page.set_viewport_height(30);
        page
    }

    fn rows_config() -> ScrollConfig {
        ScrollConfig {
            overlay_height: 10.0,
            bottom_padding: 1.0,
            top_padding: 1.0,
            settle_delay: Duration::from_millis(50),
        }
    }

    #[test]
    fn test_tab_order_wraps() {
        let mut page = page();
        assert_eq!(page.focus_next(false), FocusTarget::Element(ElementId(0)));
        assert_eq!(page.focus_next(true), FocusTarget::Element(ElementId(13)));
        assert_eq!(page.focus_next(false), FocusTarget::Element(ElementId(0)));
    }

    #[test]
    fn test_typing_edits_focused_field_only() {
        let mut page = page();
        page.handle_key(&KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));
        assert!(page.fields().iter().all(|f| f.value.is_empty()));

        page.focus(2);
        for ch in "hi@".chars() {
            page.handle_key(&KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE));
        }
        page.handle_key(&KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE));
        page.handle_key(&KeyEvent::new(KeyCode::Char('t'), KeyModifiers::ALT));
        assert_eq!(page.fields()[2].value, "hi");
    }

    #[test]
    fn test_element_rect_follows_offset() {
        let mut page = page();
        let rect = page.element_rect(ElementId(1)).unwrap();
        assert_eq!(rect.top, 7.0);
        assert_eq!(rect.bottom, 10.0);

        page.scroll_by(4.0, ScrollBehavior::Instant);
        assert_eq!(page.element_rect(ElementId(1)).unwrap().top, 3.0);
        assert!(page.element_rect(ElementId(99)).is_none());
    }

    #[test]
    fn test_scroll_is_clamped_to_content() {
        let mut page = page();
        page.scroll_by(-10.0, ScrollBehavior::Instant);
        assert_eq!(page.offset(), 0.0);
        page.scroll_by(1000.0, ScrollBehavior::Instant);
        // 3 + 14 * 4 + 12 - 30
        assert_eq!(page.offset(), 41.0);
    }

    #[test]
    fn test_focused_field_is_revealed_above_overlay() {
        let mut page = page();
        let config = rows_config();
        // field 5 spans rows 23..26; safe bottom is 30 - 10 - 1 = 19
        page.focus(5);
        scroll::ensure_visible(&mut page, ElementId(5), &config);
        page.tick(Instant::now());
        assert_eq!(page.offset(), 7.0);
        let rect = page.element_rect(ElementId(5)).unwrap();
        assert_eq!(rect.bottom, 19.0);
    }

    #[test]
    fn test_smooth_scroll_animates_toward_target() {
        let mut page = DemoPage::demo(12, Duration::from_millis(100));
        page.set_viewport_height(30);
        page.scroll_by(10.0, ScrollBehavior::Smooth);
        assert!(page.is_animating());
        assert_eq!(page.offset(), 0.0);

        page.tick(Instant::now() + Duration::from_millis(200));
        assert_eq!(page.offset(), 10.0);
        assert!(!page.is_animating());
    }

    #[test]
    fn test_click_focuses_field_or_root() {
        let mut page = page();
        assert_eq!(page.click(8), FocusTarget::Element(ElementId(1)));
        assert_eq!(page.focused(), Some(1));
        // gap row between fields
        assert_eq!(page.click(10), FocusTarget::Root);
        assert_eq!(page.focused(), None);
    }
}
