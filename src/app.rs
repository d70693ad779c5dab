use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::config::Config;
use crate::controller::{ActivationSlot, Controller, ControllerOptions, KeyDisposition};
use crate::input::{self, KeyPhase, PhysicalKeyEvent};
use crate::keyboard::layout::KeyboardLayout;
use crate::page::DemoPage;
use crate::platform::Platform;
use crate::prefs::{Theme, TomlPreferenceStore};
use crate::scroll::FocusTarget;
use crate::surface::RenderingSurface;
use crate::ui::layout::HostLayout;
use crate::ui::theme::Palettes;

pub const PAGE_HINT: &str = "Tab: next field | Ctrl+O: open keyboard | Ctrl+C: quit";

/// A live controller with the surface it created.
pub struct Overlay {
    pub controller: Controller,
    pub surface: RenderingSurface,
}

pub struct AppOptions {
    pub platform: Platform,
    pub theme_override: Option<Theme>,
    pub layout_override: Option<KeyboardLayout>,
    pub prefs_path: PathBuf,
    /// The terminal reports key releases.
    pub release_events: bool,
}

pub struct App {
    pub config: Config,
    pub options: AppOptions,
    pub page: DemoPage,
    pub overlay: Option<Overlay>,
    pub palettes: Palettes,
    pub layout: HostLayout,
    /// Keyboard focus is inside the panel rather than on the page.
    pub surface_focused: bool,
    pub should_quit: bool,
    slot: ActivationSlot,
    /// Key downs awaiting a synthesized release.
    held: HashMap<String, (PhysicalKeyEvent, Instant)>,
}

impl App {
    pub fn new(config: Config, options: AppOptions, slot: ActivationSlot) -> Self {
        let page = DemoPage::demo(config.overlay_height + config.scroll_padding, config.smooth_scroll());
        let layout = HostLayout::new(Rect::default(), config.overlay_height);
        Self {
            config,
            options,
            page,
            overlay: None,
            palettes: Palettes::load(),
            layout,
            surface_focused: false,
            should_quit: false,
            slot,
            held: HashMap::new(),
        }
    }

    /// Activate the overlay. A refusal from the activation slot is logged by
    /// the controller and otherwise ignored.
    pub fn open_overlay(&mut self) {
        let store = Box::new(TomlPreferenceStore::with_path(self.options.prefs_path.clone()));
        let options = ControllerOptions {
            platform: self.options.platform,
            scroll: self.config.scroll_config(),
            theme_override: self.options.theme_override,
            layout_override: self.options.layout_override,
        };
        let Ok((mut controller, mut surface)) = Controller::activate(&self.slot, store, options) else {
            return;
        };
        surface.set_area(self.layout.panel);
        controller.on_surface_loaded();
        self.overlay = Some(Overlay { controller, surface });
        self.pump();
    }

    pub fn resize(&mut self, area: Rect) {
        self.layout = HostLayout::new(area, self.config.overlay_height);
        self.page.set_viewport_height(area.height);
        if let Some(overlay) = &mut self.overlay {
            overlay.surface.set_area(self.layout.panel);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.kind == KeyEventKind::Press && key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => {
                    self.should_quit = true;
                    return;
                }
                KeyCode::Char('o') => {
                    self.open_overlay();
                    return;
                }
                _ => {}
            }
        }
        if key.kind == KeyEventKind::Release {
            self.options.release_events = true;
        }

        let event = input::from_crossterm(&key);

        if self.surface_focused {
            self.surface_key(&event);
            self.pump();
            return;
        }

        match event.phase {
            KeyPhase::Down => {
                let disposition = match &mut self.overlay {
                    Some(overlay) => overlay.controller.on_key_down(&event),
                    None => KeyDisposition::PassThrough,
                };
                if !self.options.release_events {
                    self.held.insert(event.code.clone(), (event, now));
                }
                if disposition == KeyDisposition::PassThrough {
                    if let Some(target) = self.page.handle_key(&key) {
                        self.focus_in(target, now);
                    }
                }
            }
            KeyPhase::Up => {
                self.held.remove(&event.code);
                if let Some(overlay) = &mut self.overlay {
                    overlay.controller.on_key_up(&event);
                }
            }
        }
        self.pump();
    }

    fn surface_key(&mut self, event: &PhysicalKeyEvent) {
        let Some(overlay) = &mut self.overlay else {
            self.surface_focused = false;
            return;
        };
        let consumed = overlay.surface.handle_key(event);
        if !consumed && event.phase == KeyPhase::Down && event.code == "Escape" {
            overlay.surface.blur_focus();
            self.surface_focused = false;
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let (x, y) = (mouse.column, mouse.row);

        if let Some(overlay) = &mut self.overlay {
            if self.layout.panel_contains(x, y) {
                if !self.surface_focused {
                    // Focus leaving the page for the panel blurs the page's window
                    overlay.controller.on_window_blur();
                    overlay.controller.on_focus_in(FocusTarget::Surface, now);
                    self.held.clear();
                    self.surface_focused = true;
                }
                overlay.surface.handle_click(x, y);
                self.pump();
                return;
            }
            overlay.surface.blur_focus();
        }

        self.surface_focused = false;
        let target = self.page.click(y.saturating_sub(self.layout.page.y));
        self.focus_in(target, now);
        self.pump();
    }

    pub fn handle_focus_lost(&mut self) {
        self.held.clear();
        if let Some(overlay) = &mut self.overlay {
            overlay.controller.on_window_blur();
        }
        self.pump();
    }

    pub fn tick(&mut self, now: Instant) {
        if !self.options.release_events {
            self.release_stale_keys(now);
        }
        if let Some(overlay) = &mut self.overlay {
            overlay.controller.run_focus_checks(now, &mut self.page);
        }
        self.page.tick(now);
        self.pump();
    }

    /// Terminals without release reporting never send key-ups; treat a key
    /// as released once it has been quiet for the fallback delay.
    fn release_stale_keys(&mut self, now: Instant) {
        let fallback = self.config.release_fallback();
        let stale: Vec<String> = self
            .held
            .iter()
            .filter(|(_, (_, at))| now.saturating_duration_since(*at) >= fallback)
            .map(|(code, _)| code.clone())
            .collect();
        for code in stale {
            if let Some((down, _)) = self.held.remove(&code) {
                if let Some(overlay) = &mut self.overlay {
                    overlay
                        .controller
                        .on_key_up(&PhysicalKeyEvent::up(&down.code, down.modifiers));
                }
            }
        }
    }

    fn focus_in(&mut self, target: FocusTarget, now: Instant) {
        if let Some(overlay) = &mut self.overlay {
            overlay.controller.on_focus_in(target, now);
        }
    }

    /// Deliver queued messages in both directions. Replies to replies (a
    /// `requestTheme` answered with `setTheme`, echoed as `saveTheme`) need
    /// a few rounds.
    pub fn pump(&mut self) {
        let Some(overlay) = &mut self.overlay else {
            return;
        };
        for _ in 0..3 {
            overlay.surface.process_commands();
            overlay.controller.process_surface_requests();
        }
        if !overlay.controller.is_active() {
            self.overlay = None;
            self.surface_focused = false;
            self.held.clear();
        }
    }

    pub fn overlay_active(&self) -> bool {
        self.overlay.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use std::time::Duration;
    use tempfile::TempDir;

    fn make_app(dir: &TempDir, release_events: bool) -> App {
        let options = AppOptions {
            platform: Platform::Linux,
            theme_override: None,
            layout_override: None,
            prefs_path: dir.path().join("preferences.toml"),
            release_events,
        };
        let mut app = App::new(Config::default(), options, ActivationSlot::new());
        app.resize(Rect::new(0, 0, 120, 40));
        app.open_overlay();
        app
    }

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn release(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind_and_state(code, KeyModifiers::NONE, KeyEventKind::Release, KeyEventState::NONE)
    }

    fn click(x: u16, y: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: x,
            row: y,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn surface(app: &App) -> &RenderingSurface {
        &app.overlay.as_ref().unwrap().surface
    }

    #[test]
    fn test_key_press_and_release_reach_panel() {
        let dir = TempDir::new().unwrap();
        let mut app = make_app(&dir, true);
        let now = Instant::now();

        app.handle_key(press(KeyCode::Char('a'), KeyModifiers::NONE), now);
        assert!(surface(&app).is_highlighted("a"));
        app.handle_key(release(KeyCode::Char('a')), now);
        assert!(!surface(&app).is_highlighted("a"));
    }

    #[test]
    fn test_release_fallback_without_release_events() {
        let dir = TempDir::new().unwrap();
        let mut app = make_app(&dir, false);
        let now = Instant::now();

        app.handle_key(press(KeyCode::Char('k'), KeyModifiers::NONE), now);
        app.tick(now + Duration::from_millis(50));
        assert!(surface(&app).is_highlighted("k"));

        app.tick(now + Duration::from_millis(200));
        assert!(!surface(&app).is_highlighted("k"));
    }

    #[test]
    fn test_close_shortcut_then_reopen() {
        let dir = TempDir::new().unwrap();
        let mut app = make_app(&dir, true);
        let now = Instant::now();

        app.handle_key(press(KeyCode::Char('\\'), KeyModifiers::ALT), now);
        assert!(!app.overlay_active());

        app.handle_key(press(KeyCode::Char('o'), KeyModifiers::CONTROL), now);
        assert!(app.overlay_active());
    }

    #[test]
    fn test_theme_toggle_is_persisted() {
        let dir = TempDir::new().unwrap();
        let mut app = make_app(&dir, true);
        let path = dir.path().join("preferences.toml");
        assert!(!path.exists());

        app.handle_key(press(KeyCode::Char('t'), KeyModifiers::ALT), Instant::now());
        assert_eq!(surface(&app).theme(), Theme::Dark);
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("keyviz_theme = \"dark\""));
        // the toggle never reaches the page
        assert!(app.page.fields().iter().all(|f| f.value.is_empty()));
    }

    #[test]
    fn test_typing_goes_to_focused_field() {
        let dir = TempDir::new().unwrap();
        let mut app = make_app(&dir, true);
        let now = Instant::now();
        app.handle_key(press(KeyCode::Tab, KeyModifiers::NONE), now);
        app.handle_key(press(KeyCode::Char('h'), KeyModifiers::NONE), now);
        app.handle_key(press(KeyCode::Char('i'), KeyModifiers::NONE), now);
        assert_eq!(app.page.fields()[0].value, "hi");
    }

    #[test]
    fn test_tabbing_behind_panel_scrolls_page() {
        let dir = TempDir::new().unwrap();
        let mut app = make_app(&dir, true);
        let now = Instant::now();
        // field 6 spans rows 27..30, under the panel at row 30 minus padding
        for _ in 0..7 {
            app.handle_key(press(KeyCode::Tab, KeyModifiers::NONE), now);
        }
        assert_eq!(app.page.focused(), Some(6));
        app.tick(now + Duration::from_millis(60));
        app.tick(now + Duration::from_secs(1));
        // safe bottom = 40 - 10 - 1 = 29
        assert_eq!(app.page.offset(), 1.0);
    }

    #[test]
    fn test_panel_click_takes_focus_and_blurs() {
        let dir = TempDir::new().unwrap();
        let mut app = make_app(&dir, true);
        let now = Instant::now();
        app.handle_key(press(KeyCode::Char('a'), KeyModifiers::NONE), now);
        assert!(surface(&app).is_highlighted("a"));

        app.handle_mouse(click(2, 35), now);
        assert!(app.surface_focused);
        assert_eq!(surface(&app).active_count(), 0);

        // keys now drive the panel, not the page
        app.handle_key(press(KeyCode::Char('x'), KeyModifiers::NONE), now);
        assert!(!surface(&app).is_highlighted("x"));

        app.handle_mouse(click(2, 2), now);
        assert!(!app.surface_focused);
    }

    #[test]
    fn test_focus_lost_clears_highlights() {
        let dir = TempDir::new().unwrap();
        let mut app = make_app(&dir, true);
        app.handle_key(press(KeyCode::Char('q'), KeyModifiers::NONE), Instant::now());
        app.handle_focus_lost();
        assert_eq!(surface(&app).active_count(), 0);
    }
}
