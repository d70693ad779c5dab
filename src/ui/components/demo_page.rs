use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Widget;

use crate::page::DemoPage;

/// Draws the page with its own fixed colors; the overlay theme never
/// reaches it.
pub struct DemoPageView<'a> {
    pub page: &'a DemoPage,
    pub hint: &'a str,
}

impl<'a> DemoPageView<'a> {
    pub fn new(page: &'a DemoPage, hint: &'a str) -> Self {
        Self { page, hint }
    }
}

impl Widget for DemoPageView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 8 {
            return;
        }
        let offset = self.page.offset().round() as i32;
        let row_y = |content_row: u16| -> Option<u16> {
            let y = i32::from(content_row) - offset;
            if y >= 0 && y < i32::from(area.height) {
                Some(area.y + y as u16)
            } else {
                None
            }
        };

        if let Some(y) = row_y(0) {
            buf.set_string(
                area.x + 1,
                y,
                "Sign-up form",
                Style::default().add_modifier(Modifier::BOLD),
            );
        }
        if let Some(y) = row_y(1) {
            buf.set_string(area.x + 1, y, self.hint, Style::default().fg(Color::DarkGray));
        }

        let width = area.width.saturating_sub(2).min(60);
        let inner_width = width.saturating_sub(2) as usize;
        for (index, field) in self.page.fields().iter().enumerate() {
            let top = DemoPage::field_top(index);
            let focused = self.page.focused() == Some(index);
            let border = if focused {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };

            let label: String = field.label.chars().take(inner_width.saturating_sub(2)).collect();
            let rule = inner_width.saturating_sub(label.chars().count() + 2);
            // top border with label, value row, bottom border
            let lines = [
                format!("┌ {label} {}┐", "─".repeat(rule)),
                String::new(),
                format!("└{}┘", "─".repeat(inner_width)),
            ];
            for (line_idx, line) in lines.iter().enumerate() {
                let Some(y) = row_y(top + line_idx as u16) else {
                    continue;
                };
                if line_idx == 1 {
                    let shown = visible_tail(&field.value, inner_width.saturating_sub(2));
                    let cursor = if focused { "▏" } else { " " };
                    buf.set_string(area.x + 1, y, "│", border);
                    buf.set_string(area.x + 2, y, format!(" {shown}{cursor}"), Style::default());
                    buf.set_string(area.x + width, y, "│", border);
                } else {
                    buf.set_string(area.x + 1, y, line, border);
                }
            }
        }
    }
}

/// The last `width` characters of `value`, so the cursor end stays visible.
fn visible_tail(value: &str, width: usize) -> String {
    let count = value.chars().count();
    value.chars().skip(count.saturating_sub(width)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_tail() {
        assert_eq!(visible_tail("hello", 10), "hello");
        assert_eq!(visible_tail("hello", 3), "llo");
        assert_eq!(visible_tail("", 3), "");
    }
}
