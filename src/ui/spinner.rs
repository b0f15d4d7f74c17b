//! Busy indicator: a small spinner and the running operation's label,
//! right-aligned in a given area.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// Braille-dot spinner frames.  Cycles through these on each tick.
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Shows `⠹ Restarting nginx…` while an operation is in flight.
///
/// Invisible when `label` is `None`.
pub struct BusyIndicator<'a> {
    pub label: Option<&'a str>,
    /// Monotonically increasing tick counter (drives the spinner frame).
    pub tick: u64,
}

impl BusyIndicator<'_> {
    fn text(&self) -> Option<String> {
        let label = self.label?;
        let frame = SPINNER_FRAMES[(self.tick as usize) % SPINNER_FRAMES.len()];
        Some(format!(" {frame} {label}… "))
    }
}

impl Widget for BusyIndicator<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(label) = self.text() else {
            return;
        };
        let label_width = label.chars().count() as u16;
        if area.height == 0 || area.width < label_width {
            return;
        }

        let x = area.x + area.width - label_width;
        let line = Line::from(Span::styled(
            label,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
        buf.set_line(x, area.y, &line, label_width);
    }
}
