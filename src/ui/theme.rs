//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

use crate::config::ThemeMode;
use crate::core::format::Level;
use crate::core::notify::Variant;

/// Central theme: change colours here and they propagate everywhere.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub mode: ThemeMode,
}

impl Theme {
    pub fn new(mode: ThemeMode) -> Self {
        Self { mode }
    }

    fn dark(&self) -> bool {
        self.mode == ThemeMode::Dark
    }

    // ── text ───────────────────────────────────────────────────
    pub fn text(&self) -> Style {
        Style::default().fg(if self.dark() { Color::White } else { Color::Black })
    }

    pub fn dim(&self) -> Style {
        Style::default().fg(if self.dark() { Color::DarkGray } else { Color::Gray })
    }

    pub fn accent(&self) -> Style {
        Style::default()
            .fg(if self.dark() { Color::Cyan } else { Color::Blue })
            .add_modifier(Modifier::BOLD)
    }

    pub fn key_style(&self) -> Style {
        Style::default().fg(if self.dark() { Color::Yellow } else { Color::Magenta })
    }

    pub fn selected_style(&self) -> Style {
        let bg = if self.dark() { Color::DarkGray } else { Color::Gray };
        self.text().bg(bg).add_modifier(Modifier::BOLD)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn border_style(&self) -> Style {
        Style::default().fg(if self.dark() { Color::DarkGray } else { Color::Gray })
    }

    pub fn focused_border_style(&self) -> Style {
        Style::default().fg(if self.dark() { Color::Gray } else { Color::DarkGray })
    }

    pub fn title_style(&self) -> Style {
        self.accent()
    }

    pub fn header_style(&self) -> Style {
        self.text().add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }

    pub fn status_bar_style(&self) -> Style {
        if self.dark() {
            Style::default().bg(Color::DarkGray).fg(Color::White)
        } else {
            Style::default().bg(Color::Gray).fg(Color::Black)
        }
    }

    pub fn input_style(&self) -> Style {
        self.key_style()
    }

    // ── semantic colours ───────────────────────────────────────
    pub fn level_color(&self, level: Level) -> Color {
        match level {
            Level::Ok => Color::Green,
            Level::Info => {
                if self.dark() {
                    Color::Cyan
                } else {
                    Color::Blue
                }
            }
            Level::Warn => Color::Yellow,
            Level::Critical => Color::Red,
            Level::Neutral => {
                if self.dark() {
                    Color::Gray
                } else {
                    Color::DarkGray
                }
            }
        }
    }

    pub fn level(&self, level: Level) -> Style {
        Style::default().fg(self.level_color(level))
    }

    pub fn variant(&self, variant: Variant) -> Style {
        let level = match variant {
            Variant::Info => Level::Info,
            Variant::Success => Level::Ok,
            Variant::Warning => Level::Warn,
            Variant::Error => Level::Critical,
        };
        self.level(level)
    }
}

/// Glyph shown before a toast or notification.
pub fn variant_icon(variant: Variant) -> &'static str {
    match variant {
        Variant::Info => "ℹ",
        Variant::Success => "✔",
        Variant::Warning => "⚠",
        Variant::Error => "✖",
    }
}
