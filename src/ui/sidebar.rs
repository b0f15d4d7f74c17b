//! Sidebar: grouped page list, or an icon strip when collapsed.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::app::nav::{Page, GROUPS};

use super::theme::Theme;

pub struct Sidebar {
    pub current: Page,
    pub collapsed: bool,
    pub theme: Theme,
}

impl Sidebar {
    fn lines(&self) -> Vec<Line<'static>> {
        let theme = self.theme;
        let mut lines = Vec::new();
        for (title, pages) in GROUPS {
            if self.collapsed {
                lines.push(Line::raw(""));
            } else {
                lines.push(Line::from(Span::styled(format!(" {}", title.to_uppercase()), theme.dim())));
            }
            for &page in *pages {
                let active = page == self.current;
                let style = if active {
                    theme.selected_style()
                } else if page.is_placeholder() {
                    theme.dim()
                } else {
                    theme.text()
                };
                let text = if self.collapsed {
                    format!(" {} ", page.icon())
                } else {
                    let marker = if active { "▸" } else { " " };
                    format!(" {marker} {} {}", page.icon(), page.label())
                };
                lines.push(Line::from(Span::styled(text, style)));
            }
        }
        lines
    }
}

impl Widget for Sidebar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::RIGHT)
            .border_style(self.theme.border_style());
        Paragraph::new(self.lines()).block(block).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThemeMode;

    fn text(collapsed: bool) -> Vec<String> {
        Sidebar {
            current: Page::Logs,
            collapsed,
            theme: Theme::new(ThemeMode::Dark),
        }
        .lines()
        .iter()
        .map(|l| l.to_string())
        .collect()
    }

    #[test]
    fn expanded_lists_groups_and_marks_current() {
        let lines = text(false);
        assert!(lines.contains(&" SERVER".to_string()));
        assert!(lines.iter().any(|l| l.contains("▸") && l.contains("Logs")));
        assert!(lines.iter().any(|l| l.contains("File Manager")));
    }

    #[test]
    fn collapsed_shows_icons_only() {
        let lines = text(true);
        assert!(lines.iter().all(|l| !l.contains("Logs")));
        assert!(lines.iter().any(|l| l.contains(Page::Logs.icon())));
    }
}
