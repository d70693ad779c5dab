use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use crate::error::ActivationError;
use crate::input::{self, PhysicalKeyEvent, Shortcut};
use crate::keyboard::highlight::{HighlightCommand, HighlightTracker};
use crate::keyboard::layout::KeyboardLayout;
use crate::platform::Platform;
use crate::prefs::{self, PreferenceStore, Preferences, Theme};
use crate::protocol::{self, ControllerEndpoint, SurfaceCommand, SurfaceRequest};
use crate::scroll::{FocusScheduler, FocusTarget, ScrollConfig, Viewport};
use crate::surface::{RenderingSurface, SurfaceSeed};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// At most one overlay may be live per slot.
#[derive(Clone, Debug, Default)]
pub struct ActivationSlot {
    active: Arc<AtomicBool>,
}

impl ActivationSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// The slot shared by the whole process.
    pub fn global() -> &'static ActivationSlot {
        static GLOBAL: OnceLock<ActivationSlot> = OnceLock::new();
        GLOBAL.get_or_init(ActivationSlot::new)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    fn acquire(&self) -> Result<ActivationGuard, ActivationError> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ActivationError::AlreadyActive)?;
        Ok(ActivationGuard {
            active: Arc::clone(&self.active),
        })
    }
}

struct ActivationGuard {
    active: Arc<AtomicBool>,
}

impl Drop for ActivationGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}

/// Startup inputs for [`Controller::activate`].
pub struct ControllerOptions {
    pub platform: Platform,
    pub scroll: ScrollConfig,
    /// Seed values that win over stored preferences without being written back.
    pub theme_override: Option<Theme>,
    pub layout_override: Option<KeyboardLayout>,
}

impl ControllerOptions {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            scroll: ScrollConfig::default(),
            theme_override: None,
            layout_override: None,
        }
    }
}

/// Whether a key event should still reach the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyDisposition {
    Consumed,
    PassThrough,
}

/// Owns input handling, preferences, and the surface's lifecycle.
pub struct Controller {
    platform: Platform,
    prefs: Preferences,
    /// What the store holds, which can differ from `prefs` under a CLI override.
    stored: Preferences,
    /// Themes sent with `SetTheme` whose `SaveTheme` echo has not come back yet.
    theme_echoes: VecDeque<Theme>,
    store: Box<dyn PreferenceStore>,
    tracker: HighlightTracker,
    focus: FocusScheduler,
    scroll: ScrollConfig,
    link: Option<ControllerEndpoint>,
    listening: bool,
    guard: Option<ActivationGuard>,
}

impl Controller {
    /// Start the overlay: load preferences, build the surface seeded with
    /// them, and start listening. Fails if `slot` already has a live overlay.
    pub fn activate(
        slot: &ActivationSlot,
        store: Box<dyn PreferenceStore>,
        options: ControllerOptions,
    ) -> Result<(Controller, RenderingSurface), ActivationError> {
        let guard = match slot.acquire() {
            Ok(guard) => guard,
            Err(e) => {
                log::info!("keyboard overlay already active");
                return Err(e);
            }
        };

        let platform = options.platform;
        let stored = Preferences::load(&*store, platform);
        let mut prefs = stored;
        if let Some(theme) = options.theme_override {
            prefs.theme = theme;
        }
        if let Some(layout) = options.layout_override {
            prefs.keyboard_layout = layout;
        }

        let (link, surface_link) = protocol::channel();
        let surface = RenderingSurface::new(
            surface_link,
            SurfaceSeed {
                platform,
                theme: prefs.theme,
                layout: prefs.keyboard_layout,
            },
        );

        let controller = Controller {
            platform,
            prefs,
            stored,
            theme_echoes: VecDeque::new(),
            store,
            tracker: HighlightTracker::new(),
            focus: FocusScheduler::new(),
            scroll: options.scroll,
            link: Some(link),
            listening: true,
            guard: Some(guard),
        };

        log::info!("keyviz v{VERSION} loaded on {platform}");
        log::info!(
            "Close: {} | Theme: {}",
            platform.close_shortcut(),
            platform.theme_shortcut()
        );
        Ok((controller, surface))
    }

    pub fn is_active(&self) -> bool {
        self.guard.is_some()
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn preferences(&self) -> Preferences {
        self.prefs
    }

    pub fn tracker(&self) -> &HighlightTracker {
        &self.tracker
    }

    pub fn on_key_down(&mut self, event: &PhysicalKeyEvent) -> KeyDisposition {
        if !self.listening {
            return KeyDisposition::PassThrough;
        }
        match input::shortcut_for(event) {
            Some(Shortcut::Close) => {
                self.close();
                return KeyDisposition::Consumed;
            }
            Some(Shortcut::ToggleTheme) => {
                self.post(&SurfaceCommand::ToggleTheme);
                return KeyDisposition::Consumed;
            }
            None => {}
        }

        if let Some(command) = self.tracker.key_down(&event.code, event.modifiers.caps_lock) {
            self.send_highlight(command);
        }
        KeyDisposition::PassThrough
    }

    pub fn on_key_up(&mut self, event: &PhysicalKeyEvent) {
        if !self.listening {
            return;
        }
        if let Some(command) = self.tracker.key_up(&event.code) {
            self.send_highlight(command);
        }
    }

    pub fn on_window_blur(&mut self) {
        if !self.listening {
            return;
        }
        let command = self.tracker.blur();
        self.send_highlight(command);
    }

    /// Focus moved on the page. The visibility check runs later, from
    /// [`Controller::run_focus_checks`], once the settle delay has passed.
    pub fn on_focus_in(&mut self, target: FocusTarget, now: Instant) {
        if !self.listening {
            return;
        }
        self.focus.focus_changed(target, now, &self.scroll);
    }

    pub fn run_focus_checks(&mut self, now: Instant, viewport: &mut dyn Viewport) {
        if !self.listening {
            return;
        }
        self.focus.run_due(now, viewport, &self.scroll);
    }

    /// The host finished mounting the surface.
    pub fn on_surface_loaded(&mut self) {
        self.send_theme();
    }

    /// Handle everything the surface has sent since the last call.
    pub fn process_surface_requests(&mut self) {
        let requests = match &self.link {
            Some(link) => link.drain(),
            None => return,
        };
        for request in requests {
            if !self.is_active() {
                break;
            }
            self.handle_request(request);
        }
    }

    fn handle_request(&mut self, request: SurfaceRequest) {
        match request {
            SurfaceRequest::Close => self.close(),
            SurfaceRequest::SaveTheme { theme } => {
                self.prefs.theme = theme;
                // The surface echoes every theme it applies, including ours
                if self.theme_echoes.front() == Some(&theme) {
                    self.theme_echoes.pop_front();
                } else if theme != self.stored.theme {
                    self.stored.theme = theme;
                    prefs::save_theme(&mut *self.store, theme);
                }
            }
            SurfaceRequest::SaveKeyboardLayout { layout } => {
                self.prefs.keyboard_layout = layout;
                if layout != self.stored.keyboard_layout {
                    self.stored.keyboard_layout = layout;
                    prefs::save_layout(&mut *self.store, layout);
                }
            }
            SurfaceRequest::RequestTheme => self.send_theme(),
        }
    }

    /// Tear down: stop listening, drop the surface link, release the slot.
    /// Safe to call any number of times.
    pub fn close(&mut self) {
        if self.guard.is_none() {
            return;
        }
        self.listening = false;
        self.focus.cancel_all();
        self.theme_echoes.clear();
        self.link = None;
        self.guard = None;
        log::info!("keyboard overlay closed");
    }

    fn send_theme(&mut self) {
        if self.link.is_some() {
            self.theme_echoes.push_back(self.prefs.theme);
        }
        self.post(&SurfaceCommand::SetTheme {
            theme: self.prefs.theme,
        });
    }

    fn send_highlight(&self, command: HighlightCommand) {
        let message = match command {
            HighlightCommand::On(key_identifier) => SurfaceCommand::KeyDown { key_identifier },
            HighlightCommand::Off(key_identifier) => SurfaceCommand::KeyUp { key_identifier },
            HighlightCommand::ClearAll => SurfaceCommand::Blur,
        };
        self.post(&message);
    }

    fn post(&self, message: &SurfaceCommand) {
        if let Some(link) = &self.link {
            link.post(message);
        }
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.close();
    }
}
