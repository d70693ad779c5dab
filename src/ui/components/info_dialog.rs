use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Clear, Widget};

use crate::controller::VERSION;
use crate::keyboard::layout::KeyboardLayout;
use crate::surface::{Control, LAYOUT_LABEL, MORE_INFO_LABEL, RenderingSurface, SurfaceGeometry};
use crate::ui::components::keyboard_panel::{button_style, cap_text};
use crate::ui::theme::Palette;

/// Modal drawn over the keyboard panel. `area` is the panel area; the
/// dialog centers itself inside it.
pub struct InfoDialog<'a> {
    pub surface: &'a RenderingSurface,
    pub palette: &'a Palette,
}

impl<'a> InfoDialog<'a> {
    pub fn new(surface: &'a RenderingSurface, palette: &'a Palette) -> Self {
        Self { surface, palette }
    }
}

impl Widget for InfoDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.palette.colors;
        let geometry = SurfaceGeometry::compute(area);
        let dialog = geometry.dialog;
        let inner = geometry.dialog_inner;

        Clear.render(dialog, buf);
        Block::bordered()
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.dialog_bg()).fg(colors.dialog_fg()))
            .render(dialog, buf);
        if inner.height < 8 || inner.width < 40 {
            return;
        }

        let text = Style::default().fg(colors.dialog_fg()).bg(colors.dialog_bg());
        let muted = Style::default().fg(colors.muted()).bg(colors.dialog_bg());
        let platform = self.surface.platform();

        buf.set_string(
            inner.x,
            inner.y,
            format!("Keyboard demo overlay v{VERSION}"),
            text.add_modifier(Modifier::BOLD),
        );
        buf.set_string(
            inner.x,
            inner.y + 2,
            format!("Shortcuts for {}:", platform.display_name()),
            text,
        );
        buf.set_string(
            inner.x + 2,
            inner.y + 3,
            format!("{:<10} close the keyboard", platform.close_shortcut()),
            muted,
        );
        buf.set_string(
            inner.x + 2,
            inner.y + 4,
            format!("{:<10} switch light / dark", platform.theme_shortcut()),
            muted,
        );
        buf.set_string(inner.x, inner.y + 6, LAYOUT_LABEL, text);
        buf.set_string(inner.x, inner.y + 7, MORE_INFO_LABEL, text);

        let focused = self.surface.focused();
        let layout = self.surface.layout();
        for (control, rect) in &geometry.dialog_controls {
            let is_focused = focused == Some(*control);
            match control {
                Control::MoreInfoLink => {
                    let mut style = Style::default()
                        .fg(colors.link())
                        .bg(colors.dialog_bg())
                        .add_modifier(Modifier::UNDERLINED);
                    if is_focused {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    buf.set_string(rect.x, rect.y, control.label(), style);
                }
                _ => {
                    let pressed = match control {
                        Control::LayoutWindows => layout == KeyboardLayout::Windows,
                        Control::LayoutMac => layout == KeyboardLayout::Mac,
                        _ => false,
                    };
                    let style = button_style(colors, is_focused, pressed);
                    buf.set_string(rect.x, rect.y, cap_text(control.label(), rect.width), style);
                }
            }
        }
    }
}
