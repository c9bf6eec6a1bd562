use ratatui::layout::{Constraint, Direction, Layout as RatLayout, Rect};

pub struct Layout {
    pub inner_area: Rect, // Area inside the outer border
    pub form_area: Rect,
    pub table_area: Rect,
    pub status_area: Rect,
}

impl Layout {
    /// Minimum terminal dimensions (excluding the outer border)
    /// Height: form (3 fields * 3 lines + 1 submit line) + table (header, border, 2 rows) + status
    pub const MIN_WIDTH: u16 = 60;
    pub const MIN_HEIGHT: u16 = 16;

    /// Height of the form pane: three bordered single-line fields plus the submit line
    pub const FORM_HEIGHT: u16 = 10;

    pub fn calculate(size: Rect) -> Self {
        let width = size.width.max(Self::MIN_WIDTH + 2);
        let height = size.height.max(Self::MIN_HEIGHT + 2);
        let size = Rect::new(size.x, size.y, width, height);

        let inner_area = Rect::new(
            size.x + 1,
            size.y + 1,
            size.width.saturating_sub(2),
            size.height.saturating_sub(2),
        );

        let vertical = RatLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(Self::FORM_HEIGHT), // Form
                Constraint::Min(4),                    // Table
                Constraint::Length(1),                 // Status
            ])
            .split(inner_area);

        Self {
            inner_area,
            form_area: vertical[0],
            table_area: vertical[1],
            status_area: vertical[2],
        }
    }
}
