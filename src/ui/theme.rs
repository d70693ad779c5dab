use std::fs;

use ratatui::style::Color;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};

use crate::prefs::Theme;

#[derive(Embed)]
#[folder = "assets/themes/"]
struct ThemeAssets;

/// Colors for one overlay theme.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Palette {
    pub name: String,
    pub colors: PaletteColors,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaletteColors {
    pub bg: String,
    pub fg: String,
    pub border: String,
    pub border_focused: String,
    pub key_bg: String,
    pub key_fg: String,
    pub key_active_bg: String,
    pub key_active_fg: String,
    pub button_fg: String,
    pub button_pressed_bg: String,
    pub button_focused_bg: String,
    pub button_focused_fg: String,
    pub dialog_bg: String,
    pub dialog_fg: String,
    pub link: String,
    pub muted: String,
}

impl Palette {
    /// User palettes in `<config_dir>/keyviz/themes/` shadow the bundled ones.
    pub fn load(name: &str) -> Option<Self> {
        if let Some(config_dir) = dirs::config_dir() {
            let user_path = config_dir
                .join("keyviz")
                .join("themes")
                .join(format!("{name}.toml"));
            if let Ok(content) = fs::read_to_string(&user_path) {
                match toml::from_str::<Palette>(&content) {
                    Ok(palette) => return Some(palette),
                    Err(e) => log::warn!("ignoring {}: {e}", user_path.display()),
                }
            }
        }

        let file = ThemeAssets::get(&format!("{name}.toml"))?;
        let content = std::str::from_utf8(file.data.as_ref()).ok()?;
        toml::from_str::<Palette>(content).ok()
    }

    pub fn for_theme(theme: Theme) -> Self {
        Self::load(theme.as_str()).unwrap_or_else(|| Self {
            name: theme.as_str().to_string(),
            colors: if theme.is_dark() {
                PaletteColors::fallback_dark()
            } else {
                PaletteColors::fallback_light()
            },
        })
    }
}

/// Both palettes, so a theme switch is just an index flip.
pub struct Palettes {
    light: Palette,
    dark: Palette,
}

impl Palettes {
    pub fn load() -> Self {
        Self {
            light: Palette::for_theme(Theme::Light),
            dark: Palette::for_theme(Theme::Dark),
        }
    }

    pub fn get(&self, theme: Theme) -> &Palette {
        match theme {
            Theme::Light => &self.light,
            Theme::Dark => &self.dark,
        }
    }
}

impl PaletteColors {
    fn fallback_light() -> Self {
        Self {
            bg: "#f4f4f5".to_string(),
            fg: "#27272a".to_string(),
            border: "#a1a1aa".to_string(),
            border_focused: "#2563eb".to_string(),
            key_bg: "#ffffff".to_string(),
            key_fg: "#3f3f46".to_string(),
            key_active_bg: "#2563eb".to_string(),
            key_active_fg: "#ffffff".to_string(),
            button_fg: "#3f3f46".to_string(),
            button_pressed_bg: "#d4d4d8".to_string(),
            button_focused_bg: "#fde047".to_string(),
            button_focused_fg: "#18181b".to_string(),
            dialog_bg: "#ffffff".to_string(),
            dialog_fg: "#18181b".to_string(),
            link: "#1d4ed8".to_string(),
            muted: "#71717a".to_string(),
        }
    }

    fn fallback_dark() -> Self {
        Self {
            bg: "#1e1e2e".to_string(),
            fg: "#cdd6f4".to_string(),
            border: "#45475a".to_string(),
            border_focused: "#89b4fa".to_string(),
            key_bg: "#313244".to_string(),
            key_fg: "#cdd6f4".to_string(),
            key_active_bg: "#f9e2af".to_string(),
            key_active_fg: "#1e1e2e".to_string(),
            button_fg: "#bac2de".to_string(),
            button_pressed_bg: "#45475a".to_string(),
            button_focused_bg: "#89b4fa".to_string(),
            button_focused_fg: "#1e1e2e".to_string(),
            dialog_bg: "#181825".to_string(),
            dialog_fg: "#cdd6f4".to_string(),
            link: "#89b4fa".to_string(),
            muted: "#7f849c".to_string(),
        }
    }

    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        // Byte slicing below needs single-byte chars
        if hex.len() == 6 && hex.is_ascii() {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Color::Rgb(r, g, b);
            }
        }
        Color::Reset
    }

    pub fn bg(&self) -> Color { Self::parse_color(&self.bg) }
    pub fn fg(&self) -> Color { Self::parse_color(&self.fg) }
    pub fn border(&self) -> Color { Self::parse_color(&self.border) }
    pub fn border_focused(&self) -> Color { Self::parse_color(&self.border_focused) }
    pub fn key_bg(&self) -> Color { Self::parse_color(&self.key_bg) }
    pub fn key_fg(&self) -> Color { Self::parse_color(&self.key_fg) }
    pub fn key_active_bg(&self) -> Color { Self::parse_color(&self.key_active_bg) }
    pub fn key_active_fg(&self) -> Color { Self::parse_color(&self.key_active_fg) }
    pub fn button_fg(&self) -> Color { Self::parse_color(&self.button_fg) }
    pub fn button_pressed_bg(&self) -> Color { Self::parse_color(&self.button_pressed_bg) }
    pub fn button_focused_bg(&self) -> Color { Self::parse_color(&self.button_focused_bg) }
    pub fn button_focused_fg(&self) -> Color { Self::parse_color(&self.button_focused_fg) }
    pub fn dialog_bg(&self) -> Color { Self::parse_color(&self.dialog_bg) }
    pub fn dialog_fg(&self) -> Color { Self::parse_color(&self.dialog_fg) }
    pub fn link(&self) -> Color { Self::parse_color(&self.link) }
    pub fn muted(&self) -> Color { Self::parse_color(&self.muted) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(PaletteColors::parse_color("#1e1e2e"), Color::Rgb(30, 30, 46));
        assert_eq!(PaletteColors::parse_color("ffffff"), Color::Rgb(255, 255, 255));
        assert_eq!(PaletteColors::parse_color("#zzz"), Color::Reset);
    }

    #[test]
    fn test_parse_color_rejects_multibyte_input() {
        assert_eq!(PaletteColors::parse_color("a\u{e9}123"), Color::Reset);
        assert_eq!(PaletteColors::parse_color("#\u{e9}\u{e9}\u{e9}"), Color::Reset);
    }

    #[test]
    fn test_bundled_palettes_parse() {
        let mut names: Vec<String> = ThemeAssets::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(|n| n.to_string()))
            .collect();
        names.sort();
        assert_eq!(names, vec!["dark", "light"]);
        for name in names {
            let file = ThemeAssets::get(&format!("{name}.toml")).unwrap();
            let palette: Palette = toml::from_str(std::str::from_utf8(&file.data).unwrap()).unwrap();
            assert_eq!(palette.name, name);
        }
    }

    #[test]
    fn test_palettes_by_theme() {
        let palettes = Palettes::load();
        assert_ne!(
            palettes.get(Theme::Light).colors.bg(),
            palettes.get(Theme::Dark).colors.bg()
        );
    }
}
