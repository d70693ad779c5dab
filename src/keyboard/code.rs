use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical display name of a key, e.g. `"t"`, `"1"`, `"Shift"`, `" "`.
///
/// Identifiers are what the rendering surface indexes its key elements by, and
/// what the highlight protocol carries. Several physical codes may share one
/// identifier (`ShiftLeft` and `ShiftRight` both resolve to `"Shift"`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyIdentifier(String);

impl KeyIdentifier {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KeyIdentifier {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

pub const CAPS_LOCK: &str = "CapsLock";

/// Fixed table for codes not covered by the prefix rules.
const SPECIAL_KEYS: &[(&str, &str)] = &[
    ("Escape", "Escape"),
    ("Tab", "Tab"),
    ("Backspace", "Backspace"),
    ("Enter", "Enter"),
    ("Space", " "),
    ("ShiftLeft", "Shift"),
    ("ShiftRight", "Shift"),
    ("ControlLeft", "Control"),
    ("ControlRight", "Control"),
    ("AltLeft", "Alt"),
    ("AltRight", "Alt"),
    ("MetaLeft", "Meta"),
    ("MetaRight", "Meta"),
    ("CapsLock", "CapsLock"),
    ("Backquote", "`"),
    ("Minus", "-"),
    ("Equal", "="),
    ("BracketLeft", "["),
    ("BracketRight", "]"),
    ("Backslash", "\\"),
    ("Semicolon", ";"),
    ("Quote", "'"),
    ("Comma", ","),
    ("Period", "."),
    ("Slash", "/"),
];

/// Map a physical key code (`"KeyT"`, `"Digit1"`, `"AltLeft"`) to the
/// identifier the keyboard panel displays. Returns `None` for codes the
/// panel has no key for; callers drop those silently.
pub fn resolve(code: &str) -> Option<KeyIdentifier> {
    if let Some(letter) = code.strip_prefix("Key") {
        let mut chars = letter.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            return Some(KeyIdentifier(ch.to_lowercase().collect()));
        }
    }
    if let Some(digits) = code.strip_prefix("Digit") {
        return Some(KeyIdentifier::new(digits));
    }
    if code.starts_with("Arrow") || is_function_key(code) {
        return Some(KeyIdentifier::new(code));
    }

    SPECIAL_KEYS
        .iter()
        .find(|(physical, _)| *physical == code)
        .map(|(_, id)| KeyIdentifier::new(*id))
}

/// `F` followed by one or two ASCII digits.
pub fn is_function_key(code: &str) -> bool {
    match code.strip_prefix('F') {
        Some(rest) => (1..=2).contains(&rest.len()) && rest.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_codes_lowercase() {
        for ch in 'A'..='Z' {
            let code = format!("Key{ch}");
            assert_eq!(
                resolve(&code).unwrap().as_str(),
                ch.to_ascii_lowercase().to_string()
            );
        }
    }

    #[test]
    fn test_digit_codes_unchanged() {
        for d in 0..=9 {
            let code = format!("Digit{d}");
            assert_eq!(resolve(&code).unwrap().as_str(), d.to_string());
        }
    }

    #[test]
    fn test_arrow_and_function_keys_pass_through() {
        assert_eq!(resolve("ArrowLeft").unwrap().as_str(), "ArrowLeft");
        assert_eq!(resolve("ArrowDown").unwrap().as_str(), "ArrowDown");
        assert_eq!(resolve("F1").unwrap().as_str(), "F1");
        assert_eq!(resolve("F12").unwrap().as_str(), "F12");
    }

    #[test]
    fn test_function_key_pattern() {
        assert!(is_function_key("F5"));
        assert!(is_function_key("F24"));
        assert!(!is_function_key("F"));
        assert!(!is_function_key("F123"));
        assert!(!is_function_key("Fx"));
        assert!(resolve("F123").is_none());
    }

    #[test]
    fn test_left_right_variants_share_identifier() {
        assert_eq!(resolve("AltLeft"), resolve("AltRight"));
        assert_eq!(resolve("AltLeft").unwrap().as_str(), "Alt");
        assert_eq!(resolve("ShiftLeft"), resolve("ShiftRight"));
        assert_eq!(resolve("ShiftLeft").unwrap().as_str(), "Shift");
        assert_eq!(resolve("ControlLeft"), resolve("ControlRight"));
        assert_eq!(resolve("ControlRight").unwrap().as_str(), "Control");
        assert_eq!(resolve("MetaLeft").unwrap().as_str(), "Meta");
    }

    #[test]
    fn test_special_table() {
        assert_eq!(resolve("Space").unwrap().as_str(), " ");
        assert_eq!(resolve("Backslash").unwrap().as_str(), "\\");
        assert_eq!(resolve("Quote").unwrap().as_str(), "'");
        assert_eq!(resolve("Backquote").unwrap().as_str(), "`");
        assert_eq!(resolve("CapsLock").unwrap().as_str(), CAPS_LOCK);
        assert_eq!(resolve("Escape").unwrap().as_str(), "Escape");
    }

    #[test]
    fn test_unmapped_codes() {
        assert!(resolve("Home").is_none());
        assert!(resolve("NumpadEnter").is_none());
        assert!(resolve("").is_none());
        // "Key" prefix only counts with a single trailing letter
        assert!(resolve("Keyboard").is_none());
    }
}
