use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    supports_keyboard_enhancement,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;

use keyviz::app::{App, AppOptions, PAGE_HINT};
use keyviz::config::Config;
use keyviz::controller::ActivationSlot;
use keyviz::event::{EventHandler, HostEvent};
use keyviz::keyboard::layout::KeyboardLayout;
use keyviz::platform::{self, Platform};
use keyviz::prefs::{Theme, TomlPreferenceStore};
use keyviz::ui::components::demo_page::DemoPageView;
use keyviz::ui::components::info_dialog::InfoDialog;
use keyviz::ui::components::keyboard_panel::KeyboardPanel;

#[derive(Parser)]
#[command(name = "keyviz", version, about = "On-screen keyboard that lights up the keys you press")]
struct Cli {
    #[arg(short, long, help = "Overlay theme for this run (light, dark)")]
    theme: Option<Theme>,

    #[arg(short, long, help = "Keyboard layout for this run (windows, mac)")]
    layout: Option<KeyboardLayout>,

    #[arg(short, long, help = "Platform used for shortcut labels and the default layout")]
    platform: Option<Platform>,

    #[arg(short, long, help = "Path to config.toml")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load().unwrap_or_default(),
    };
    init_logging(&config)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableFocusChange)?;

    // Release events and lock state need the kitty keyboard protocol
    let keyboard_enhanced = supports_keyboard_enhancement().unwrap_or(false)
        && execute!(
            io::stdout(),
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                    | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
            )
        )
        .is_ok();
    log::debug!("keyboard enhancement: {keyboard_enhanced}");

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let options = AppOptions {
        platform: cli.platform.unwrap_or_else(platform::detect_platform),
        theme_override: cli.theme,
        layout_override: cli.layout,
        prefs_path: TomlPreferenceStore::default_path(),
        release_events: keyboard_enhanced,
    };
    let events = EventHandler::new(config.tick_rate());
    let mut app = App::new(config, options, ActivationSlot::global().clone());

    let result = run_app(&mut terminal, &mut app, &events);

    if keyboard_enhanced {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        log::error!("{err:?}");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn init_logging(config: &Config) -> Result<()> {
    let path = Path::new(&config.log_file);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .init();
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    let size = terminal.size()?;
    app.resize(Rect::new(0, 0, size.width, size.height));
    app.open_overlay();

    loop {
        terminal.draw(|frame| render(frame, app))?;

        let now = Instant::now();
        match events.next()? {
            HostEvent::Key(key) => app.handle_key(key, now),
            HostEvent::Mouse(mouse) => app.handle_mouse(mouse, now),
            HostEvent::FocusLost => app.handle_focus_lost(),
            HostEvent::FocusGained => {}
            HostEvent::Resize(w, h) => app.resize(Rect::new(0, 0, w, h)),
            HostEvent::Tick => app.tick(now),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    frame.render_widget(DemoPageView::new(&app.page, PAGE_HINT), app.layout.page);

    let Some(overlay) = &app.overlay else {
        return;
    };
    let surface = &overlay.surface;
    let palette = app.palettes.get(surface.theme());
    let panel = app.layout.panel;
    frame.render_widget(KeyboardPanel::new(surface, palette, app.surface_focused), panel);
    if surface.dialog_open() {
        frame.render_widget(InfoDialog::new(surface, palette), panel);
    }
}
