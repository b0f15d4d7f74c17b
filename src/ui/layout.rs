//! Layout helpers: split the terminal area into regions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Width of the expanded sidebar.
pub const SIDEBAR_WIDTH: u16 = 22;
/// Width of the collapsed (icons only) sidebar.
pub const SIDEBAR_COLLAPSED_WIDTH: u16 = 5;

/// Primary screen layout: header bar, sidebar, page body and status bar.
pub struct AppLayout {
    pub header_area: Rect,
    pub sidebar_area: Rect,
    pub main_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Compute the layout from the full terminal area.
    pub fn from_area(area: Rect, sidebar_collapsed: bool) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // header
                Constraint::Min(3),    // sidebar + page
                Constraint::Length(1), // status / hint bar
            ])
            .split(area);

        let sidebar_width = if sidebar_collapsed {
            SIDEBAR_COLLAPSED_WIDTH
        } else {
            SIDEBAR_WIDTH
        };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(sidebar_width), Constraint::Min(20)])
            .split(rows[1]);

        Self {
            header_area: rows[0],
            sidebar_area: cols[0],
            main_area: cols[1],
            status_area: rows[2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapsed_sidebar_gives_page_more_room() {
        let area = Rect::new(0, 0, 100, 30);
        let open = AppLayout::from_area(area, false);
        let closed = AppLayout::from_area(area, true);
        assert_eq!(open.sidebar_area.width, SIDEBAR_WIDTH);
        assert_eq!(closed.sidebar_area.width, SIDEBAR_COLLAPSED_WIDTH);
        assert!(closed.main_area.width > open.main_area.width);
        assert_eq!(open.header_area.height, 1);
        assert_eq!(open.status_area.y, 29);
    }
}
