//! Renders any [`Listing`] as a bordered table with sort arrows, search
//! indicator and a paging footer.

use ratatui::{
    layout::{Alignment, Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row as TableRow, Table, TableState},
    Frame,
};

use crate::app::listing::Listing;
use crate::core::format::{status_level, Level};
use crate::core::table::{Align, Row};

use super::theme::Theme;

/// Colour bucket for a cell, keyed on its column field and rendered text.
pub fn cell_level(field: &str, text: &str) -> Option<Level> {
    match field {
        "status" | "state" => Some(status_level(text)),
        "level" => Some(match text {
            "error" => Level::Critical,
            "warning" => Level::Warn,
            "info" => Level::Info,
            _ => Level::Neutral,
        }),
        "action" => Some(if text == "allow" { Level::Ok } else { Level::Critical }),
        "enabled" => Some(if text == "yes" { Level::Ok } else { Level::Neutral }),
        _ => None,
    }
}

pub struct ListingTable<'a, R> {
    listing: &'a Listing<R>,
    theme: Theme,
    title: String,
    focused: bool,
    empty_text: &'a str,
}

impl<'a, R: Row> ListingTable<'a, R> {
    pub fn new(listing: &'a Listing<R>, theme: Theme) -> Self {
        Self {
            listing,
            theme,
            title: String::new(),
            focused: true,
            empty_text: "No entries",
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn empty_text(mut self, text: &'a str) -> Self {
        self.empty_text = text;
        self
    }

    pub fn render(self, frame: &mut Frame, area: Rect) {
        let theme = self.theme;
        let listing = self.listing;
        let view = listing.visible();
        let state = &listing.view;

        let mut top = vec![Span::styled(format!(" {} ", self.title), theme.title_style())];
        if !state.search.is_empty() {
            top.push(Span::styled(format!("/{} ", state.search), theme.input_style()));
        }
        let footer = format!(
            " {}  page {}/{} ",
            view.range_label(state.page_size),
            view.page + 1,
            view.page_count
        );
        let block = Block::default()
            .title(Line::from(top))
            .title_bottom(Line::from(Span::styled(footer, theme.dim())).right_aligned())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme.focused_border_style()
            } else {
                theme.border_style()
            });

        if view.is_empty() {
            let msg = if state.search.is_empty() {
                self.empty_text.to_string()
            } else {
                format!("No matches for \"{}\"", state.search)
            };
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let y = inner.y + inner.height / 2;
            let line_area = Rect::new(inner.x, y.min(inner.bottom().saturating_sub(1)), inner.width, 1);
            frame.render_widget(
                Paragraph::new(msg).style(theme.dim()).alignment(Alignment::Center),
                line_area,
            );
            return;
        }

        let header = TableRow::new(listing.columns.iter().map(|col| {
            let arrow = match &state.sort {
                Some(key) if key.field == col.field => format!(" {}", key.direction.arrow()),
                _ => String::new(),
            };
            align(Line::from(format!("{}{arrow}", col.label)), col.align)
        }))
        .style(theme.header_style());

        let rows = view.rows.iter().map(|row| {
            TableRow::new(listing.columns.iter().map(|col| {
                let text = col.display(row);
                let style = match cell_level(col.field, &text) {
                    Some(level) => theme.level(level),
                    None => theme.text(),
                };
                align(Line::from(Span::styled(text, style)), col.align)
            }))
        });

        let last = listing.columns.len().saturating_sub(1);
        let widths: Vec<Constraint> = listing
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                if i == last {
                    Constraint::Min(col.width)
                } else {
                    Constraint::Length(col.width)
                }
            })
            .collect();

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .column_spacing(1)
            .row_highlight_style(theme.selected_style())
            .highlight_symbol(" ▸ ");

        let mut table_state = TableState::default().with_selected(if self.focused {
            Some(listing.selected)
        } else {
            None
        });
        frame.render_stateful_widget(table, area, &mut table_state);
    }
}

fn align(line: Line<'static>, align: Align) -> Cell<'static> {
    match align {
        Align::Left => Cell::from(line),
        Align::Right => Cell::from(line.alignment(Alignment::Right)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThemeMode;
    use crate::core::mock;
    use crate::core::records::Process;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(listing: &Listing<Process>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 16)).unwrap();
        terminal
            .draw(|f| {
                ListingTable::new(listing, Theme::new(ThemeMode::Dark))
                    .title("Processes")
                    .render(f, f.area());
            })
            .unwrap();
        let buf = terminal.backend().buffer().clone();
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn levels_by_column() {
        assert_eq!(cell_level("status", "running"), Some(Level::Ok));
        assert_eq!(cell_level("level", "warning"), Some(Level::Warn));
        assert_eq!(cell_level("action", "deny"), Some(Level::Critical));
        assert_eq!(cell_level("name", "nginx"), None);
    }

    #[test]
    fn shows_header_footer_and_sort_arrow() {
        let mut listing = Listing::new(mock::processes(), Process::columns(), 10);
        listing.view.request_sort("pid");
        let screen = draw(&listing);
        assert!(screen.contains("Processes"));
        assert!(screen.contains("PID ▲"));
        assert!(screen.contains("1–10 of 15"));
        assert!(screen.contains("page 1/2"));
    }

    #[test]
    fn empty_search_says_so() {
        let mut listing = Listing::new(mock::processes(), Process::columns(), 10);
        listing.view.set_search("zzzz");
        let screen = draw(&listing);
        assert!(screen.contains("No matches for \"zzzz\""));
        assert!(screen.contains("0 of 0"));
    }
}
