//! Toast stack drawn in the top-right corner, newest at the bottom.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use crate::core::notify::Toasts;

use super::theme::{variant_icon, Theme};

const TOAST_WIDTH: u16 = 44;
const TOAST_HEIGHT: u16 = 3;

pub struct ToastStack<'a> {
    pub toasts: &'a Toasts,
    pub theme: Theme,
}

impl Widget for ToastStack<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = TOAST_WIDTH.min(area.width);
        let x = area.right().saturating_sub(width + 1).max(area.x);
        let mut y = area.y + 1;
        for toast in self.toasts.iter() {
            if y + TOAST_HEIGHT > area.bottom() {
                break;
            }
            let rect = Rect::new(x, y, width, TOAST_HEIGHT);
            Clear.render(rect, buf);
            let style = self.theme.variant(toast.variant);
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(style);
            Paragraph::new(Line::from(vec![
                Span::styled(format!("{} ", variant_icon(toast.variant)), style),
                Span::styled(toast.message.as_str(), self.theme.text()),
            ]))
            .block(block)
            .render(rect, buf);
            y += TOAST_HEIGHT;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThemeMode;
    use crate::core::notify::Variant;
    use std::time::{Duration, Instant};

    #[test]
    fn stacks_until_space_runs_out() {
        let mut toasts = Toasts::new(Duration::from_secs(5));
        let now = Instant::now();
        toasts.push(Variant::Success, "Service nginx started", now);
        toasts.push(Variant::Error, "Failed to fetch logs", now);
        toasts.push(Variant::Info, "Rule enabled", now);

        let area = Rect::new(0, 0, 80, 8);
        let mut buf = Buffer::empty(area);
        ToastStack { toasts: &toasts, theme: Theme::new(ThemeMode::Dark) }.render(area, &mut buf);
        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Service nginx started"));
        assert!(text.contains("Failed to fetch logs"));
        assert!(!text.contains("Rule enabled"));
    }
}
