use std::collections::HashSet;

use crate::keyboard::code::{self, CAPS_LOCK, KeyIdentifier};

/// What the keyboard panel should do in response to a physical key event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HighlightCommand {
    On(KeyIdentifier),
    Off(KeyIdentifier),
    ClearAll,
}

/// Tracks which physical keys are held and turns key events into highlight
/// commands.
///
/// The tracker works on physical codes, the panel on identifiers. Releasing
/// `ShiftLeft` while `ShiftRight` is still held therefore turns `"Shift"` off
/// even though a shift key is down; the panel has no per-side state to consult.
#[derive(Debug, Default)]
pub struct HighlightTracker {
    pressed: HashSet<String>,
}

impl HighlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// `caps_lock_engaged` is the live lock state reported with the event. It
    /// only matters for the CapsLock key, whose press toggles rather than holds.
    pub fn key_down(&mut self, code: &str, caps_lock_engaged: bool) -> Option<HighlightCommand> {
        if code == CAPS_LOCK {
            let id = KeyIdentifier::new(CAPS_LOCK);
            return Some(if caps_lock_engaged {
                HighlightCommand::On(id)
            } else {
                HighlightCommand::Off(id)
            });
        }

        // Auto-repeat arrives as further key downs
        if !self.pressed.insert(code.to_string()) {
            return None;
        }
        code::resolve(code).map(HighlightCommand::On)
    }

    pub fn key_up(&mut self, code: &str) -> Option<HighlightCommand> {
        if code == CAPS_LOCK {
            return None;
        }
        if !self.pressed.remove(code) {
            return None;
        }
        code::resolve(code).map(HighlightCommand::Off)
    }

    /// Focus left the window: forget everything and clear the panel in one go.
    pub fn blur(&mut self) -> HighlightCommand {
        self.pressed.clear();
        HighlightCommand::ClearAll
    }

    pub fn is_pressed(&self, code: &str) -> bool {
        self.pressed.contains(code)
    }

    pub fn pressed_count(&self) -> usize {
        self.pressed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on(id: &str) -> Option<HighlightCommand> {
        Some(HighlightCommand::On(KeyIdentifier::new(id)))
    }

    fn off(id: &str) -> Option<HighlightCommand> {
        Some(HighlightCommand::Off(KeyIdentifier::new(id)))
    }

    #[test]
    fn test_repeat_is_suppressed() {
        let mut tracker = HighlightTracker::new();
        assert_eq!(tracker.key_down("KeyT", false), on("t"));
        assert_eq!(tracker.key_down("KeyT", false), None);
        assert_eq!(tracker.key_down("KeyT", false), None);
        assert_eq!(tracker.pressed_count(), 1);
        assert_eq!(tracker.key_up("KeyT"), off("t"));
        assert_eq!(tracker.key_down("KeyT", false), on("t"));
    }

    #[test]
    fn test_shared_identifier_clears_early() {
        let mut tracker = HighlightTracker::new();
        assert_eq!(tracker.key_down("ShiftLeft", false), on("Shift"));
        assert_eq!(tracker.key_down("ShiftRight", false), on("Shift"));
        // ShiftRight is still held, the panel is told to clear anyway
        assert_eq!(tracker.key_up("ShiftLeft"), off("Shift"));
        assert!(tracker.is_pressed("ShiftRight"));
    }

    #[test]
    fn test_blur_clears_everything_once() {
        let mut tracker = HighlightTracker::new();
        tracker.key_down("AltLeft", false);
        tracker.key_down("KeyT", false);
        assert_eq!(tracker.blur(), HighlightCommand::ClearAll);
        assert_eq!(tracker.pressed_count(), 0);
        assert_eq!(tracker.key_up("AltLeft"), None);
    }

    #[test]
    fn test_caps_lock_follows_lock_state() {
        let mut tracker = HighlightTracker::new();
        assert_eq!(tracker.key_down("CapsLock", true), on("CapsLock"));
        assert_eq!(tracker.key_down("CapsLock", false), off("CapsLock"));
        assert_eq!(tracker.key_up("CapsLock"), None);
        assert!(!tracker.is_pressed("CapsLock"));
    }

    #[test]
    fn test_caps_lock_is_never_repeat_suppressed() {
        let mut tracker = HighlightTracker::new();
        assert_eq!(tracker.key_down("CapsLock", true), on("CapsLock"));
        assert_eq!(tracker.key_down("CapsLock", true), on("CapsLock"));
    }

    #[test]
    fn test_unmapped_codes_are_tracked_but_silent() {
        let mut tracker = HighlightTracker::new();
        assert_eq!(tracker.key_down("Home", false), None);
        assert!(tracker.is_pressed("Home"));
        assert_eq!(tracker.key_up("Home"), None);
        assert!(!tracker.is_pressed("Home"));
    }

    #[test]
    fn test_key_up_without_key_down_is_noop() {
        let mut tracker = HighlightTracker::new();
        assert_eq!(tracker.key_up("KeyA"), None);
    }
}
