use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyboardLayout {
    #[default]
    Windows,
    Mac,
}

impl KeyboardLayout {
    pub const ALL: [KeyboardLayout; 2] = [KeyboardLayout::Windows, KeyboardLayout::Mac];

    pub fn as_str(self) -> &'static str {
        match self {
            KeyboardLayout::Windows => "windows",
            KeyboardLayout::Mac => "mac",
        }
    }

    pub fn rows(self) -> &'static [&'static [KeyCap]] {
        match self {
            KeyboardLayout::Windows => WINDOWS_ROWS,
            KeyboardLayout::Mac => MAC_ROWS,
        }
    }
}

impl fmt::Display for KeyboardLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyboardLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "windows" => Ok(KeyboardLayout::Windows),
            "mac" => Ok(KeyboardLayout::Mac),
            other => Err(format!("unknown keyboard layout: {other}")),
        }
    }
}

/// One visible key on the panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyCap {
    /// Identifier the key lights up for (see `keyboard::code::resolve`).
    pub identifier: &'static str,
    pub label: &'static str,
    /// Width in terminal cells, brackets included.
    pub width: u16,
}

const fn key(identifier: &'static str, label: &'static str) -> KeyCap {
    KeyCap {
        identifier,
        label,
        width: 5,
    }
}

const fn wide(identifier: &'static str, label: &'static str, width: u16) -> KeyCap {
    KeyCap {
        identifier,
        label,
        width,
    }
}

const FUNCTION_ROW: &[KeyCap] = &[
    wide("Escape", "esc", 6),
    key("F1", "F1"),
    key("F2", "F2"),
    key("F3", "F3"),
    key("F4", "F4"),
    key("F5", "F5"),
    key("F6", "F6"),
    key("F7", "F7"),
    key("F8", "F8"),
    key("F9", "F9"),
    key("F10", "F10"),
    key("F11", "F11"),
    key("F12", "F12"),
];

const NUMBER_ROW_WINDOWS: &[KeyCap] = &[
    key("`", "`"),
    key("1", "1"),
    key("2", "2"),
    key("3", "3"),
    key("4", "4"),
    key("5", "5"),
    key("6", "6"),
    key("7", "7"),
    key("8", "8"),
    key("9", "9"),
    key("0", "0"),
    key("-", "-"),
    key("=", "="),
    wide("Backspace", "backspace", 11),
];

const NUMBER_ROW_MAC: &[KeyCap] = &[
    key("`", "`"),
    key("1", "1"),
    key("2", "2"),
    key("3", "3"),
    key("4", "4"),
    key("5", "5"),
    key("6", "6"),
    key("7", "7"),
    key("8", "8"),
    key("9", "9"),
    key("0", "0"),
    key("-", "-"),
    key("=", "="),
    wide("Backspace", "delete", 11),
];

const QWERTY_ROW: &[KeyCap] = &[
    wide("Tab", "tab", 8),
    key("q", "Q"),
    key("w", "W"),
    key("e", "E"),
    key("r", "R"),
    key("t", "T"),
    key("y", "Y"),
    key("u", "U"),
    key("i", "I"),
    key("o", "O"),
    key("p", "P"),
    key("[", "["),
    key("]", "]"),
    wide("\\", "\\", 8),
];

const HOME_ROW_WINDOWS: &[KeyCap] = &[
    wide("CapsLock", "caps lock", 11),
    key("a", "A"),
    key("s", "S"),
    key("d", "D"),
    key("f", "F"),
    key("g", "G"),
    key("h", "H"),
    key("j", "J"),
    key("k", "K"),
    key("l", "L"),
    key(";", ";"),
    key("'", "'"),
    wide("Enter", "enter", 11),
];

const HOME_ROW_MAC: &[KeyCap] = &[
    wide("CapsLock", "caps lock", 11),
    key("a", "A"),
    key("s", "S"),
    key("d", "D"),
    key("f", "F"),
    key("g", "G"),
    key("h", "H"),
    key("j", "J"),
    key("k", "K"),
    key("l", "L"),
    key(";", ";"),
    key("'", "'"),
    wide("Enter", "return", 11),
];

const SHIFT_ROW: &[KeyCap] = &[
    wide("Shift", "shift", 14),
    key("z", "Z"),
    key("x", "X"),
    key("c", "C"),
    key("v", "V"),
    key("b", "B"),
    key("n", "N"),
    key("m", "M"),
    key(",", ","),
    key(".", "."),
    key("/", "/"),
    wide("Shift", "shift", 14),
];

const BOTTOM_ROW_WINDOWS: &[KeyCap] = &[
    wide("Control", "control", 10),
    wide("Alt", "alt", 7),
    wide(" ", "space", 27),
    wide("Alt", "alt", 7),
    wide("Control", "control", 10),
    key("ArrowLeft", "←"),
    key("ArrowUp", "↑"),
    key("ArrowDown", "↓"),
    key("ArrowRight", "→"),
];

const BOTTOM_ROW_MAC: &[KeyCap] = &[
    wide("Control", "control", 9),
    wide("Alt", "option", 8),
    key("Meta", "⌘"),
    wide(" ", "space", 15),
    key("Meta", "⌘"),
    wide("Alt", "option", 8),
    wide("Control", "control", 9),
    key("ArrowLeft", "←"),
    key("ArrowUp", "↑"),
    key("ArrowDown", "↓"),
    key("ArrowRight", "→"),
];

const WINDOWS_ROWS: &[&[KeyCap]] = &[
    FUNCTION_ROW,
    NUMBER_ROW_WINDOWS,
    QWERTY_ROW,
    HOME_ROW_WINDOWS,
    SHIFT_ROW,
    BOTTOM_ROW_WINDOWS,
];

const MAC_ROWS: &[&[KeyCap]] = &[
    FUNCTION_ROW,
    NUMBER_ROW_MAC,
    QWERTY_ROW,
    HOME_ROW_MAC,
    SHIFT_ROW,
    BOTTOM_ROW_MAC,
];

/// Width of the widest row; the panel centers rows within it.
pub const PANEL_KEY_WIDTH: u16 = 89;

/// Cells taken by a row once keys are laid out with a one-cell gap.
pub fn row_width(row: &[KeyCap]) -> u16 {
    let keys: u16 = row.iter().map(|k| k.width).sum();
    keys + row.len().saturating_sub(1) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::code::resolve;

    #[test]
    fn test_layout_serde_names() {
        assert_eq!(serde_json::to_string(&KeyboardLayout::Mac).unwrap(), "\"mac\"");
        assert_eq!(
            serde_json::from_str::<KeyboardLayout>("\"windows\"").unwrap(),
            KeyboardLayout::Windows
        );
        assert_eq!("mac".parse::<KeyboardLayout>(), Ok(KeyboardLayout::Mac));
        assert!("dvorak".parse::<KeyboardLayout>().is_err());
    }

    #[test]
    fn test_both_layouts_have_six_rows() {
        for layout in KeyboardLayout::ALL {
            assert_eq!(layout.rows().len(), 6, "{layout}");
        }
    }

    #[test]
    fn test_only_mac_has_command_keys() {
        let has_meta = |layout: KeyboardLayout| {
            layout
                .rows()
                .iter()
                .flat_map(|row| row.iter())
                .any(|k| k.identifier == "Meta")
        };
        assert!(has_meta(KeyboardLayout::Mac));
        assert!(!has_meta(KeyboardLayout::Windows));
    }

    #[test]
    fn test_every_cap_is_reachable_from_a_physical_code() {
        let codes: Vec<String> = ('A'..='Z')
            .map(|c| format!("Key{c}"))
            .chain((0..=9).map(|d| format!("Digit{d}")))
            .chain((1..=12).map(|n| format!("F{n}")))
            .chain(
                [
                    "ArrowLeft", "ArrowRight", "ArrowUp", "ArrowDown", "Escape", "Tab",
                    "Backspace", "Enter", "Space", "ShiftLeft", "ControlLeft", "AltLeft",
                    "MetaLeft", "CapsLock", "Backquote", "Minus", "Equal", "BracketLeft",
                    "BracketRight", "Backslash", "Semicolon", "Quote", "Comma", "Period",
                    "Slash",
                ]
                .iter()
                .map(|s| s.to_string()),
            )
            .collect();
        let reachable: Vec<String> = codes
            .iter()
            .filter_map(|c| resolve(c))
            .map(|id| id.as_str().to_string())
            .collect();

        for layout in KeyboardLayout::ALL {
            for cap in layout.rows().iter().flat_map(|row| row.iter()) {
                assert!(
                    reachable.iter().any(|id| id == cap.identifier),
                    "{} on {layout} has no physical code",
                    cap.identifier
                );
            }
        }
    }

    #[test]
    fn test_rows_fit_panel_width() {
        for layout in KeyboardLayout::ALL {
            for row in layout.rows() {
                assert!(row_width(row) <= PANEL_KEY_WIDTH, "{layout} row too wide");
            }
            assert_eq!(row_width(layout.rows()[1]), PANEL_KEY_WIDTH);
        }
    }

    #[test]
    fn test_row_width_counts_gaps() {
        assert_eq!(row_width(&[]), 0);
        assert_eq!(row_width(&[key("a", "A")]), 5);
        assert_eq!(row_width(&[key("a", "A"), key("b", "B")]), 11);
    }
}
