//! The keyboard panel: key elements, theme and layout state, the toolbar and
//! the info dialog.
//!
//! The surface only learns about the outside world through
//! [`SurfaceCommand`]s and only affects it through [`SurfaceRequest`]s.

use std::collections::HashMap;

use ratatui::layout::Rect;

use crate::input::{self, KeyPhase, PhysicalKeyEvent, Shortcut};
use crate::keyboard::code::KeyIdentifier;
use crate::keyboard::layout::{KeyCap, KeyboardLayout, PANEL_KEY_WIDTH, row_width};
use crate::platform::Platform;
use crate::prefs::Theme;
use crate::protocol::{SurfaceCommand, SurfaceEndpoint, SurfaceRequest};

pub const MORE_INFO_URL: &str = "https://lindadesign.net/bookmarklet-keyboard-demo/";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    Info,
    LightTheme,
    DarkTheme,
    Close,
    DialogClose,
    LayoutWindows,
    LayoutMac,
    MoreInfoLink,
}

impl Control {
    pub fn label(self) -> &'static str {
        match self {
            Control::Info => "info",
            Control::LightTheme => "light",
            Control::DarkTheme => "dark",
            Control::Close => "close",
            Control::DialogClose => "x",
            Control::LayoutWindows => "Windows",
            Control::LayoutMac => "Mac",
            Control::MoreInfoLink => MORE_INFO_URL,
        }
    }
}

pub const TOOLBAR: [Control; 4] = [
    Control::Info,
    Control::LightTheme,
    Control::DarkTheme,
    Control::Close,
];

pub const DIALOG_CONTROLS: [Control; 4] = [
    Control::DialogClose,
    Control::LayoutWindows,
    Control::LayoutMac,
    Control::MoreInfoLink,
];

/// First and last focusable controls of the open dialog; Tab wraps between them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FocusTrap {
    pub first: Control,
    pub last: Control,
}

impl FocusTrap {
    pub fn from_focusables(focusables: &[Control]) -> Option<Self> {
        Some(Self {
            first: *focusables.first()?,
            last: *focusables.last()?,
        })
    }
}

/// Opaque handle to one key element.
pub type ElementHandle = usize;

#[derive(Clone, Debug)]
pub struct KeyElement {
    pub layout: KeyboardLayout,
    pub row: usize,
    pub cap: KeyCap,
    pub active: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct SurfaceSeed {
    pub platform: Platform,
    pub theme: Theme,
    pub layout: KeyboardLayout,
}

pub struct RenderingSurface {
    link: SurfaceEndpoint,
    platform: Platform,
    theme: Theme,
    layout: KeyboardLayout,
    elements: Vec<KeyElement>,
    key_map: HashMap<KeyIdentifier, Vec<ElementHandle>>,
    focused: Option<Control>,
    dialog_open: bool,
    trap: Option<FocusTrap>,
    area: Rect,
}

impl RenderingSurface {
    pub fn new(link: SurfaceEndpoint, seed: SurfaceSeed) -> Self {
        let elements: Vec<KeyElement> = KeyboardLayout::ALL
            .iter()
            .flat_map(|&layout| {
                layout.rows().iter().enumerate().flat_map(move |(row, caps)| {
                    caps.iter().map(move |&cap| KeyElement {
                        layout,
                        row,
                        cap,
                        active: false,
                    })
                })
            })
            .collect();

        let mut key_map: HashMap<KeyIdentifier, Vec<ElementHandle>> = HashMap::new();
        for (handle, element) in elements.iter().enumerate() {
            key_map
                .entry(KeyIdentifier::new(element.cap.identifier))
                .or_default()
                .push(handle);
        }

        let surface = Self {
            link,
            platform: seed.platform,
            theme: seed.theme,
            layout: seed.layout,
            elements,
            key_map,
            focused: None,
            dialog_open: false,
            trap: None,
            area: Rect::default(),
        };
        surface.request_initial_theme();
        surface
    }

    /// Ask the controller for the theme in case its initial `setTheme` raced
    /// ahead of us.
    pub fn request_initial_theme(&self) {
        self.link.post(&SurfaceRequest::RequestTheme);
    }

    /// Apply every command received since the last call.
    pub fn process_commands(&mut self) {
        for command in self.link.drain() {
            self.apply(command);
        }
    }

    fn apply(&mut self, command: SurfaceCommand) {
        match command {
            SurfaceCommand::KeyDown { key_identifier } => self.highlight(&key_identifier, true),
            SurfaceCommand::KeyUp { key_identifier } => self.highlight(&key_identifier, false),
            SurfaceCommand::Blur => self.clear_all_highlights(),
            SurfaceCommand::SetTheme { theme } => self.set_theme(theme.is_dark()),
            SurfaceCommand::ToggleTheme => self.set_theme(!self.theme.is_dark()),
        }
    }

    /// Light or clear every element carrying `id`, in both layouts.
    pub fn highlight(&mut self, id: &KeyIdentifier, on: bool) {
        if let Some(handles) = self.key_map.get(id) {
            for &handle in handles {
                self.elements[handle].active = on;
            }
        }
    }

    pub fn clear_all_highlights(&mut self) {
        for element in &mut self.elements {
            element.active = false;
        }
    }

    /// Switch theme and report it so the controller can persist it.
    pub fn set_theme(&mut self, dark: bool) {
        self.theme = Theme::from_dark(dark);
        self.link.post(&SurfaceRequest::SaveTheme { theme: self.theme });
    }

    pub fn set_layout(&mut self, layout: KeyboardLayout) {
        self.layout = layout;
        self.link.post(&SurfaceRequest::SaveKeyboardLayout { layout });
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn layout(&self) -> KeyboardLayout {
        self.layout
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn is_highlighted(&self, id: &str) -> bool {
        self.key_map
            .get(&KeyIdentifier::new(id))
            .is_some_and(|handles| handles.iter().all(|&h| self.elements[h].active))
    }

    pub fn active_count(&self) -> usize {
        self.elements.iter().filter(|e| e.active).count()
    }

    /// Elements of the visible layout, grouped by row.
    pub fn visible_rows(&self) -> Vec<Vec<&KeyElement>> {
        let mut rows: Vec<Vec<&KeyElement>> = vec![Vec::new(); self.layout.rows().len()];
        for element in self.elements.iter().filter(|e| e.layout == self.layout) {
            rows[element.row].push(element);
        }
        rows
    }

    pub fn focused(&self) -> Option<Control> {
        self.focused
    }

    pub fn dialog_open(&self) -> bool {
        self.dialog_open
    }

    pub fn focus_trap(&self) -> Option<FocusTrap> {
        self.trap
    }

    pub fn open_dialog(&mut self) {
        self.dialog_open = true;
        // Recomputed on every open in case the dialog's controls change
        self.trap = FocusTrap::from_focusables(&DIALOG_CONTROLS);
        self.focused = Some(Control::DialogClose);
    }

    pub fn close_dialog(&mut self) {
        self.dialog_open = false;
        self.trap = None;
        self.focused = Some(Control::Info);
    }

    /// Focus moved away from the panel.
    pub fn blur_focus(&mut self) {
        self.focused = None;
    }

    pub fn activate(&mut self, control: Control) {
        self.focused = Some(control);
        match control {
            Control::Info => self.open_dialog(),
            Control::LightTheme => self.set_theme(false),
            Control::DarkTheme => self.set_theme(true),
            Control::Close => self.link.post(&SurfaceRequest::Close),
            Control::DialogClose => self.close_dialog(),
            Control::LayoutWindows => self.set_layout(KeyboardLayout::Windows),
            Control::LayoutMac => self.set_layout(KeyboardLayout::Mac),
            Control::MoreInfoLink => log::info!("more info: {MORE_INFO_URL}"),
        }
    }

    /// Key events delivered while the panel itself has focus. Returns whether
    /// the event was consumed.
    pub fn handle_key(&mut self, event: &PhysicalKeyEvent) -> bool {
        if event.phase != KeyPhase::Down {
            return false;
        }
        match input::shortcut_for(event) {
            Some(Shortcut::Close) => {
                self.link.post(&SurfaceRequest::Close);
                return true;
            }
            Some(Shortcut::ToggleTheme) => {
                self.set_theme(!self.theme.is_dark());
                return true;
            }
            None => {}
        }

        let backwards = event.modifiers.shift;
        match event.code.as_str() {
            "Escape" if self.dialog_open => {
                self.close_dialog();
                true
            }
            "Tab" if self.dialog_open => {
                self.cycle_dialog_focus(backwards);
                true
            }
            "Tab" => {
                self.focused = Some(cycle(&TOOLBAR, self.focused, backwards));
                true
            }
            "Enter" | "Space" => match self.focused {
                Some(control) => {
                    self.activate(control);
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    fn cycle_dialog_focus(&mut self, backwards: bool) {
        let Some(trap) = self.trap else {
            return;
        };
        self.focused = Some(match (backwards, self.focused) {
            (true, Some(current)) if current == trap.first => trap.last,
            (false, Some(current)) if current == trap.last => trap.first,
            (_, current) => cycle(&DIALOG_CONTROLS, current, backwards),
        });
    }

    pub fn set_area(&mut self, area: Rect) {
        self.area = area;
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn geometry(&self) -> SurfaceGeometry {
        SurfaceGeometry::compute(self.area)
    }

    /// Mouse click at terminal cell `(x, y)`. Returns whether it landed on the panel.
    pub fn handle_click(&mut self, x: u16, y: u16) -> bool {
        let geometry = self.geometry();
        if !contains(geometry.panel, x, y) {
            return false;
        }

        if self.dialog_open {
            if let Some(control) = geometry.dialog_control_at(x, y) {
                self.activate(control);
            } else if !contains(geometry.dialog, x, y) {
                // Backdrop
                self.close_dialog();
            }
            return true;
        }

        if let Some(control) = geometry.toolbar_control_at(x, y) {
            self.activate(control);
        }
        true
    }
}

fn cycle(controls: &[Control], current: Option<Control>, backwards: bool) -> Control {
    let len = controls.len();
    let index = current.and_then(|c| controls.iter().position(|&x| x == c));
    let next = match (index, backwards) {
        (None, false) => 0,
        (None, true) => len - 1,
        (Some(i), false) => (i + 1) % len,
        (Some(i), true) => (i + len - 1) % len,
    };
    controls[next]
}

fn contains(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x && x < rect.right() && y >= rect.y && y < rect.bottom()
}

pub const DIALOG_WIDTH: u16 = 64;
pub const DIALOG_HEIGHT: u16 = 10;
pub const LAYOUT_LABEL: &str = "Keyboard layout:  ";
pub const MORE_INFO_LABEL: &str = "More info: ";

/// Where everything sits inside the panel area. Shared by the widgets and
/// by click hit-testing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SurfaceGeometry {
    pub panel: Rect,
    pub inner: Rect,
    pub toolbar: Vec<(Control, Rect)>,
    /// Left edge and top row of the key block.
    pub keys_origin: (u16, u16),
    pub dialog: Rect,
    pub dialog_inner: Rect,
    pub dialog_controls: Vec<(Control, Rect)>,
}

impl SurfaceGeometry {
    pub fn compute(panel: Rect) -> Self {
        let inner = Rect::new(
            panel.x.saturating_add(1),
            panel.y.saturating_add(1),
            panel.width.saturating_sub(2),
            panel.height.saturating_sub(2),
        );

        // Toolbar buttons sit right-aligned on the first inner row
        let widths: Vec<u16> = TOOLBAR.iter().map(|c| button_width(c.label())).collect();
        let total = widths.iter().sum::<u16>() + widths.len().saturating_sub(1) as u16;
        let mut x = inner.right().saturating_sub(total);
        let mut toolbar = Vec::with_capacity(TOOLBAR.len());
        for (control, width) in TOOLBAR.iter().zip(widths) {
            toolbar.push((*control, Rect::new(x, inner.y, width, 1)));
            x = x.saturating_add(width + 1);
        }

        let keys_origin = (
            inner.x + inner.width.saturating_sub(PANEL_KEY_WIDTH) / 2,
            inner.y.saturating_add(2),
        );

        let dialog_width = DIALOG_WIDTH.min(panel.width);
        let dialog_height = DIALOG_HEIGHT.min(panel.height);
        let dialog = Rect::new(
            panel.x + (panel.width - dialog_width) / 2,
            panel.y + (panel.height - dialog_height) / 2,
            dialog_width,
            dialog_height,
        );
        let dialog_inner = Rect::new(
            dialog.x.saturating_add(1),
            dialog.y.saturating_add(1),
            dialog.width.saturating_sub(2),
            dialog.height.saturating_sub(2),
        );

        let close_width = button_width(Control::DialogClose.label());
        let layout_y = dialog_inner.y + 6;
        let windows_x = dialog_inner.x + LAYOUT_LABEL.len() as u16;
        let windows_width = button_width(Control::LayoutWindows.label());
        let dialog_controls = vec![
            (
                Control::DialogClose,
                Rect::new(
                    dialog_inner.right().saturating_sub(close_width),
                    dialog_inner.y,
                    close_width,
                    1,
                ),
            ),
            (
                Control::LayoutWindows,
                Rect::new(windows_x, layout_y, windows_width, 1),
            ),
            (
                Control::LayoutMac,
                Rect::new(
                    windows_x + windows_width + 1,
                    layout_y,
                    button_width(Control::LayoutMac.label()),
                    1,
                ),
            ),
            (
                Control::MoreInfoLink,
                Rect::new(
                    dialog_inner.x + MORE_INFO_LABEL.len() as u16,
                    dialog_inner.y + 7,
                    MORE_INFO_URL.len() as u16,
                    1,
                ),
            ),
        ];

        Self {
            panel,
            inner,
            toolbar,
            keys_origin,
            dialog,
            dialog_inner,
            dialog_controls,
        }
    }

    pub fn toolbar_control_at(&self, x: u16, y: u16) -> Option<Control> {
        hit(&self.toolbar, x, y)
    }

    pub fn dialog_control_at(&self, x: u16, y: u16) -> Option<Control> {
        hit(&self.dialog_controls, x, y)
    }

    /// Horizontal offset that centers a row inside the key block.
    pub fn row_offset(row: &[KeyCap]) -> u16 {
        (PANEL_KEY_WIDTH.saturating_sub(row_width(row))) / 2
    }
}

fn hit(regions: &[(Control, Rect)], x: u16, y: u16) -> Option<Control> {
    regions
        .iter()
        .find(|(_, rect)| contains(*rect, x, y))
        .map(|(control, _)| *control)
}

/// `[ label ]`
pub fn button_width(label: &str) -> u16 {
    label.chars().count() as u16 + 4
}
