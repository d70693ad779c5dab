use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Clear, Widget};

use crate::surface::{Control, RenderingSurface, SurfaceGeometry};
use crate::ui::theme::{Palette, PaletteColors};

pub struct KeyboardPanel<'a> {
    pub surface: &'a RenderingSurface,
    pub palette: &'a Palette,
    /// The panel holds keyboard focus.
    pub focused: bool,
}

impl<'a> KeyboardPanel<'a> {
    pub fn new(surface: &'a RenderingSurface, palette: &'a Palette, focused: bool) -> Self {
        Self {
            surface,
            palette,
            focused,
        }
    }
}

/// `[ label ]` padded to `width` cells; labels that don't fit are cut.
pub fn cap_text(label: &str, width: u16) -> String {
    let inner = width.saturating_sub(2) as usize;
    let label: String = label.chars().take(inner).collect();
    format!("[{label:^inner$}]")
}

pub fn button_style(colors: &PaletteColors, focused: bool, pressed: bool) -> Style {
    if focused {
        Style::default()
            .fg(colors.button_focused_fg())
            .bg(colors.button_focused_bg())
            .add_modifier(Modifier::BOLD)
    } else if pressed {
        Style::default()
            .fg(colors.fg())
            .bg(colors.button_pressed_bg())
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors.button_fg()).bg(colors.bg())
    }
}

impl Widget for KeyboardPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.palette.colors;
        let platform = self.surface.platform();

        let border = if self.focused {
            colors.border_focused()
        } else {
            colors.border()
        };
        let title = format!(
            " Keyboard  {} close  {} theme ",
            platform.close_shortcut(),
            platform.theme_shortcut()
        );
        Clear.render(area, buf);
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()).fg(colors.fg()));
        block.render(area, buf);

        let geometry = SurfaceGeometry::compute(area);
        let inner = geometry.inner;
        if inner.height < 3 || inner.width < 20 {
            return;
        }

        let theme = self.surface.theme();
        let focused_control = self.surface.focused().filter(|_| !self.surface.dialog_open());
        for (control, rect) in &geometry.toolbar {
            if rect.x < inner.x {
                continue;
            }
            let pressed = match control {
                Control::LightTheme => !theme.is_dark(),
                Control::DarkTheme => theme.is_dark(),
                _ => false,
            };
            let style = button_style(colors, focused_control == Some(*control), pressed);
            buf.set_string(rect.x, rect.y, cap_text(control.label(), rect.width), style);
        }

        let (origin_x, origin_y) = geometry.keys_origin;
        for (row_idx, row) in self.surface.visible_rows().iter().enumerate() {
            let y = origin_y + row_idx as u16;
            if y >= inner.bottom() {
                break;
            }
            let caps: Vec<_> = row.iter().map(|e| e.cap).collect();
            let mut x = origin_x + SurfaceGeometry::row_offset(&caps);
            for element in row {
                let width = element.cap.width;
                if x + width > inner.right() {
                    break;
                }
                let style = if element.active {
                    Style::default()
                        .fg(colors.key_active_fg())
                        .bg(colors.key_active_bg())
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors.key_fg()).bg(colors.key_bg())
                };
                buf.set_string(x, y, cap_text(element.cap.label, width), style);
                x += width + 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_text_centers_and_truncates() {
        assert_eq!(cap_text("a", 5), "[ a ]");
        assert_eq!(cap_text("tab", 7), "[ tab ]");
        assert_eq!(cap_text("backspace", 6), "[back]");
        assert_eq!(cap_text("info", 8), "[ info ]");
    }
}
