use ratatui::layout::Rect;

/// The page fills the terminal; the panel is pinned over its bottom rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostLayout {
    pub page: Rect,
    pub panel: Rect,
}

impl HostLayout {
    pub fn new(area: Rect, overlay_height: u16) -> Self {
        let height = overlay_height.min(area.height);
        let panel = Rect::new(area.x, area.bottom() - height, area.width, height);
        Self { page: area, panel }
    }

    pub fn panel_contains(&self, x: u16, y: u16) -> bool {
        x >= self.panel.x && x < self.panel.right() && y >= self.panel.y && y < self.panel.bottom()
    }
}
