//! Popup overlay widgets: confirmations, forms, record details, the file
//! viewer, notifications, the settings menu and the controls submenu.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::app::forms::{FieldKind, Form};
use crate::app::settings::SETTINGS_ITEMS;
use crate::app::state::{AppState, Confirm, Details, Viewer};
use crate::config::{Action, AppConfig};
use crate::core::format::Level;
use crate::core::notify::Notifications;
use crate::core::table::TIME_FORMAT;

use super::theme::{variant_icon, Theme};

fn popup_block(title: &str, theme: Theme) -> Block<'static> {
    Block::default()
        .title(format!(" {title} "))
        .title_style(theme.accent())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.border_style())
}

fn hint(text: &str, theme: Theme) -> Line<'static> {
    Line::from(Span::styled(format!("  {text}"), theme.dim()))
}

/// Prefix and style for a list row.
fn row_style(selected: bool, theme: Theme) -> (&'static str, ratatui::style::Style) {
    if selected {
        (" ▸ ", theme.selected_style())
    } else {
        ("   ", theme.text())
    }
}

// ───────────────────────────────────────── confirm ───────────

pub struct ConfirmPopup<'a> {
    pub confirm: &'a Confirm,
    pub theme: Theme,
}

impl Widget for ConfirmPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = self.theme;
        let width = 56u16;
        // Rough wrap estimate for the message body.
        let body_lines = (self.confirm.message.chars().count() as u16 / (width - 6)) + 1;
        let popup = centered_fixed(width, body_lines + 6, area);
        Clear.render(popup, buf);

        let mut block = popup_block(&self.confirm.title, theme);
        if self.confirm.danger {
            block = block
                .title_style(theme.level(Level::Critical).add_modifier(Modifier::BOLD))
                .border_style(theme.level(Level::Critical));
        }
        let inner = block.inner(popup);
        block.render(popup, buf);

        let confirm_style = if self.confirm.danger {
            theme.level(Level::Critical).add_modifier(Modifier::BOLD)
        } else {
            theme.accent()
        };
        let lines = vec![
            Line::raw(""),
            Line::from(Span::styled(format!(" {}", self.confirm.message), theme.text())),
            Line::raw(""),
            Line::from(vec![
                Span::styled("  [y] Confirm", confirm_style),
                Span::styled("   [n] Cancel", theme.dim()),
            ]),
        ];
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}

// ───────────────────────────────────────── form ──────────────

pub struct FormPopup<'a> {
    pub form: &'a Form,
    pub theme: Theme,
}

impl Widget for FormPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = self.theme;
        let form = self.form;
        let height = form.fields.len() as u16 * 2 + 7;
        let popup = centered_fixed(60, height, area);
        Clear.render(popup, buf);

        let block = popup_block(&form.title, theme);
        let inner = block.inner(popup);
        block.render(popup, buf);

        let mut lines = vec![Line::raw("")];
        for (i, field) in form.fields.iter().enumerate() {
            let focused = i == form.focus;
            let label_style = if focused { theme.accent() } else { theme.dim() };
            let cursor = if focused && !matches!(field.kind, FieldKind::Choice(_)) {
                "▏"
            } else {
                ""
            };
            lines.push(Line::from(vec![
                Span::styled(format!(" {:<14}", field.label), label_style),
                Span::styled(format!("{}{cursor}", field.display()), theme.input_style()),
            ]));
            lines.push(Line::raw(""));
        }
        match &form.error {
            Some(err) => lines.push(Line::from(Span::styled(
                format!(" ✖ {err}"),
                theme.level(Level::Critical),
            ))),
            None => lines.push(Line::raw("")),
        }
        lines.push(hint("Tab: next  ←/→: choose  Enter: save  Esc: cancel", theme));

        Paragraph::new(lines).render(inner, buf);
    }
}

// ───────────────────────────────────────── details ───────────

pub struct DetailsPopup<'a> {
    pub details: &'a Details,
    pub theme: Theme,
}

impl Widget for DetailsPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = self.theme;
        let height = self.details.lines.len() as u16 + 5;
        let popup = centered_fixed(64, height, area);
        Clear.render(popup, buf);

        let block = popup_block(&self.details.title, theme);
        let inner = block.inner(popup);
        block.render(popup, buf);

        let mut lines = vec![Line::raw("")];
        lines.extend(self.details.lines.iter().map(|(k, v)| {
            Line::from(vec![
                Span::styled(format!(" {k:<14}"), theme.dim()),
                Span::styled(v.clone(), theme.text()),
            ])
        }));
        lines.push(Line::raw(""));
        lines.push(hint("Esc: close", theme));
        Paragraph::new(lines).render(inner, buf);
    }
}

// ───────────────────────────────────────── viewer ────────────

pub struct ViewerPopup<'a> {
    pub viewer: &'a Viewer,
    pub theme: Theme,
}

impl Widget for ViewerPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = self.theme;
        let popup = centered_fixed(area.width.saturating_sub(8).max(40), area.height.saturating_sub(4), area);
        Clear.render(popup, buf);

        let total = self.viewer.text.lines().count();
        let block = popup_block(&self.viewer.title, theme).title_bottom(
            Line::from(Span::styled(
                format!(" line {}/{}  ↑/↓ scroll  Esc: close ", self.viewer.scroll + 1, total.max(1)),
                theme.dim(),
            ))
            .right_aligned(),
        );
        let inner = block.inner(popup);
        block.render(popup, buf);

        Paragraph::new(self.viewer.text.as_str())
            .style(theme.text())
            .scroll((self.viewer.scroll, 0))
            .render(inner, buf);
    }
}

// ───────────────────────────────────────── notifications ─────

pub struct NotificationsPopup<'a> {
    pub notifications: &'a Notifications,
    pub selected: usize,
    pub theme: Theme,
}

impl Widget for NotificationsPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = self.theme;
        let items = self.notifications.items();
        let height = (items.len().max(1) as u16) * 2 + 6;
        let popup = centered_fixed(64, height, area);
        Clear.render(popup, buf);

        let title = format!("Notifications ({} unread)", self.notifications.unread());
        let block = popup_block(&title, theme);
        let inner = block.inner(popup);
        block.render(popup, buf);

        let mut lines = vec![Line::raw("")];
        if items.is_empty() {
            lines.push(Line::from(Span::styled("   No notifications", theme.dim())));
        }
        for (i, n) in items.iter().enumerate() {
            let (prefix, style) = row_style(i == self.selected, theme);
            let style = if n.read { style.add_modifier(Modifier::DIM) } else { style };
            let unread = if n.read { " " } else { "●" };
            lines.push(Line::from(vec![
                Span::styled(prefix, style),
                Span::styled(format!("{} ", variant_icon(n.variant)), theme.variant(n.variant)),
                Span::styled(n.title.clone(), style),
                Span::styled(format!(" {unread}"), theme.accent()),
            ]));
            lines.push(Line::from(vec![
                Span::raw("     "),
                Span::styled(n.message.clone(), theme.dim()),
                Span::styled(format!("  {}", n.timestamp.format(TIME_FORMAT)), theme.dim()),
            ]));
        }
        lines.push(Line::raw(""));
        lines.push(hint("Enter: read  a: all read  d: delete  x: clear  Esc: close", theme));
        Paragraph::new(lines).render(inner, buf);
    }
}

// ───────────────────────────────────────── settings popup ────

/// Settings menu popup overlay.
pub struct SettingsPopup<'a> {
    pub state: &'a AppState,
    pub theme: Theme,
}

impl Widget for SettingsPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = self.theme;
        let height = (SETTINGS_ITEMS.len() as u16) + 6;
        let popup = centered_fixed(44, height, area);
        Clear.render(popup, buf);

        let block = popup_block("Settings", theme);
        let inner = block.inner(popup);
        block.render(popup, buf);

        let mut lines = vec![Line::raw("")];
        for (i, item) in SETTINGS_ITEMS.iter().enumerate() {
            let (prefix, style) = row_style(i == self.state.settings_selected, theme);
            let mut spans = vec![Span::styled(format!("{prefix}{:<20}", item.label()), style)];
            match item.value(self.state) {
                Some(value) => {
                    let value_style = match value.as_str() {
                        "ON" => theme.level(Level::Ok),
                        "OFF" => theme.dim(),
                        _ => theme.key_style(),
                    };
                    spans.push(Span::styled(format!("[{value}]"), value_style));
                }
                None => spans.push(Span::styled("›", theme.dim())),
            }
            lines.push(Line::from(spans));
        }
        lines.push(Line::raw(""));
        lines.push(hint("Enter/Space: change  Esc: close", theme));

        Paragraph::new(lines).render(inner, buf);
    }
}

// ───────────────────────────────────────── controls popup ────

/// Interactive controls / keybinding popup overlay.
pub struct ControlsPopup<'a> {
    pub config: &'a AppConfig,
    pub selected: usize,
    pub awaiting_rebind: bool,
    pub theme: Theme,
}

impl Widget for ControlsPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = self.theme;
        let height = (Action::ALL.len() as u16) + 7;
        let popup = centered_fixed(56, height, area);
        Clear.render(popup, buf);

        let block = popup_block("Controls", theme);
        let inner = block.inner(popup);
        block.render(popup, buf);

        let mut lines = vec![Line::raw("")];

        // ── Action rows ─────────────────────────────────────────
        for (i, &action) in Action::ALL.iter().enumerate() {
            let is_selected = i == self.selected;
            let (prefix, base_style) = row_style(is_selected, theme);

            let keys_display = if is_selected && self.awaiting_rebind {
                "Press a key…".to_string()
            } else {
                self.config.display_bindings(action)
            };
            let key_style = if is_selected {
                base_style.patch(theme.key_style())
            } else {
                theme.key_style()
            };

            // Fixed-width columns: label left-aligned, keys right-aligned.
            let label_col = format!("{prefix}{:<22}", action.label());
            let keys_width = (inner.width as usize)
                .saturating_sub(label_col.chars().count())
                .max(1);
            let keys_col = format!("{keys_display:>keys_width$}");

            lines.push(Line::from(vec![
                Span::styled(label_col, base_style),
                Span::styled(keys_col, key_style),
            ]));
        }

        // ── Reset option ────────────────────────────────────────
        let (reset_prefix, reset_style) = row_style(self.selected == Action::ALL.len(), theme);
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            format!("{reset_prefix}⟳ Reset to defaults"),
            reset_style,
        )));

        lines.push(hint("Enter: add key  Del: clear  ←: back  Esc: close", theme));

        Paragraph::new(lines).render(inner, buf);
    }
}

// ───────────────────────────────────────── helpers ───────────

/// Create a centered rectangle with fixed dimensions, clamped to the available area.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ops::Op;
    use crate::config::ThemeMode;

    fn render(widget: impl Widget, w: u16, h: u16) -> String {
        let area = Rect::new(0, 0, w, h);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    fn theme() -> Theme {
        Theme::new(ThemeMode::Dark)
    }

    #[test]
    fn centered_is_clamped() {
        let area = Rect::new(0, 0, 20, 10);
        assert_eq!(centered_fixed(10, 4, area), Rect::new(5, 3, 10, 4));
        assert_eq!(centered_fixed(50, 40, area), area);
    }

    #[test]
    fn confirm_shows_title_and_choices() {
        let confirm = Confirm {
            title: "Kill Process".into(),
            message: "Terminate nginx?".into(),
            op: Op::RefreshProcesses,
            danger: true,
        };
        let text = render(ConfirmPopup { confirm: &confirm, theme: theme() }, 80, 24);
        assert!(text.contains("Kill Process"));
        assert!(text.contains("Terminate nginx?"));
        assert!(text.contains("[y] Confirm"));
    }

    #[test]
    fn form_masks_secrets_and_shows_error() {
        let user = crate::core::mock::users().remove(0);
        let mut form = Form::password(&user);
        form.fields[0].value = "hunter22".into();
        form.error = Some("Passwords do not match".into());
        let text = render(FormPopup { form: &form, theme: theme() }, 80, 24);
        assert!(text.contains("••••••••"));
        assert!(!text.contains("hunter22"));
        assert!(text.contains("Passwords do not match"));
    }

    #[test]
    fn controls_list_every_action() {
        let config = AppConfig::default();
        let text = render(
            ControlsPopup { config: &config, selected: 0, awaiting_rebind: true, theme: theme() },
            100,
            40,
        );
        assert!(text.contains("Press a key…"));
        assert!(text.contains(Action::Quit.label()));
        assert!(text.contains("Reset to defaults"));
    }
}
