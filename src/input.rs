use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers, ModifierKeyCode};

/// Modifier and lock state captured with a key event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModifierState {
    pub alt: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub caps_lock: bool,
}

impl ModifierState {
    /// Alt (Option on a Mac) held with no other modifier.
    pub fn alt_only(&self) -> bool {
        self.alt && !self.ctrl && !self.meta && !self.shift
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyPhase {
    Down,
    Up,
}

/// A key event described by the physical key that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhysicalKeyEvent {
    /// Physical code in the `KeyboardEvent.code` naming: `KeyT`, `Digit1`, `AltLeft`.
    pub code: String,
    pub phase: KeyPhase,
    pub modifiers: ModifierState,
}

impl PhysicalKeyEvent {
    pub fn down(code: &str, modifiers: ModifierState) -> Self {
        Self {
            code: code.to_string(),
            phase: KeyPhase::Down,
            modifiers,
        }
    }

    pub fn up(code: &str, modifiers: ModifierState) -> Self {
        Self {
            code: code.to_string(),
            phase: KeyPhase::Up,
            modifiers,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortcut {
    Close,
    ToggleTheme,
}

/// Alt+Backslash closes, Alt+T toggles the theme. Matched on the physical
/// key so Option-modified characters on a Mac still count.
pub fn shortcut_for(event: &PhysicalKeyEvent) -> Option<Shortcut> {
    if event.phase != KeyPhase::Down || !event.modifiers.alt_only() {
        return None;
    }
    match event.code.as_str() {
        "Backslash" => Some(Shortcut::Close),
        "KeyT" => Some(Shortcut::ToggleTheme),
        _ => None,
    }
}

/// Translate a terminal key event. Repeats count as key downs; the tracker
/// filters them.
pub fn from_crossterm(key: &KeyEvent) -> PhysicalKeyEvent {
    let phase = match key.kind {
        KeyEventKind::Press | KeyEventKind::Repeat => KeyPhase::Down,
        KeyEventKind::Release => KeyPhase::Up,
    };
    let modifiers = ModifierState {
        alt: key.modifiers.contains(KeyModifiers::ALT),
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        meta: key.modifiers.intersects(KeyModifiers::SUPER | KeyModifiers::META),
        shift: key.modifiers.contains(KeyModifiers::SHIFT),
        caps_lock: key.state.contains(KeyEventState::CAPS_LOCK),
    };
    PhysicalKeyEvent {
        code: physical_code(key.code),
        phase,
        modifiers,
    }
}

pub fn physical_code(code: KeyCode) -> String {
    let name = match code {
        KeyCode::Char(ch) => return char_code(ch).unwrap_or_else(|| "Unidentified".to_string()),
        KeyCode::F(n) => return format!("F{n}"),
        KeyCode::Backspace => "Backspace",
        KeyCode::Enter => "Enter",
        KeyCode::Tab | KeyCode::BackTab => "Tab",
        KeyCode::Esc => "Escape",
        KeyCode::Left => "ArrowLeft",
        KeyCode::Right => "ArrowRight",
        KeyCode::Up => "ArrowUp",
        KeyCode::Down => "ArrowDown",
        KeyCode::Home => "Home",
        KeyCode::End => "End",
        KeyCode::PageUp => "PageUp",
        KeyCode::PageDown => "PageDown",
        KeyCode::Delete => "Delete",
        KeyCode::Insert => "Insert",
        KeyCode::CapsLock => "CapsLock",
        KeyCode::ScrollLock => "ScrollLock",
        KeyCode::NumLock => "NumLock",
        KeyCode::PrintScreen => "PrintScreen",
        KeyCode::Pause => "Pause",
        KeyCode::Menu => "ContextMenu",
        KeyCode::Modifier(modifier) => modifier_code(modifier),
        _ => "Unidentified",
    };
    name.to_string()
}

fn modifier_code(modifier: ModifierKeyCode) -> &'static str {
    match modifier {
        ModifierKeyCode::LeftShift => "ShiftLeft",
        ModifierKeyCode::RightShift => "ShiftRight",
        ModifierKeyCode::LeftControl => "ControlLeft",
        ModifierKeyCode::RightControl => "ControlRight",
        ModifierKeyCode::LeftAlt => "AltLeft",
        ModifierKeyCode::RightAlt | ModifierKeyCode::IsoLevel3Shift => "AltRight",
        ModifierKeyCode::LeftSuper | ModifierKeyCode::LeftMeta => "MetaLeft",
        ModifierKeyCode::RightSuper | ModifierKeyCode::RightMeta => "MetaRight",
        _ => "Unidentified",
    }
}

/// US ANSI physical key for a typed character, shifted symbols included.
fn char_code(ch: char) -> Option<String> {
    if ch.is_ascii_alphabetic() {
        return Some(format!("Key{}", ch.to_ascii_uppercase()));
    }
    if ch.is_ascii_digit() {
        return Some(format!("Digit{ch}"));
    }
    let code = match ch {
        ' ' => "Space",
        '`' | '~' => "Backquote",
        '!' => "Digit1",
        '@' => "Digit2",
        '#' => "Digit3",
        '$' => "Digit4",
        '%' => "Digit5",
        '^' => "Digit6",
        '&' => "Digit7",
        '*' => "Digit8",
        '(' => "Digit9",
        ')' => "Digit0",
        '-' | '_' => "Minus",
        '=' | '+' => "Equal",
        '[' | '{' => "BracketLeft",
        ']' | '}' => "BracketRight",
        '\\' | '|' => "Backslash",
        ';' | ':' => "Semicolon",
        '\'' | '"' => "Quote",
        ',' | '<' => "Comma",
        '.' | '>' => "Period",
        '/' | '?' => "Slash",
        _ => return None,
    };
    Some(code.to_string())
}
