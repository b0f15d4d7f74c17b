//! Page bodies.  Each renderer draws one sidebar page into the main area.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::nav::Page;
use crate::app::settings::SETTINGS_ITEMS;
use crate::app::state::{AppState, NetTab};
use crate::core::format::{
    format_percentage, format_speed, format_uptime, human_size, percentage_level, status_level,
    Level,
};
use crate::core::records::{LogLevel, ServiceStatus};

use super::table_widget::{cell_level, ListingTable};
use super::theme::{variant_icon, Theme};

const MB: f64 = 1024.0 * 1024.0;

pub fn render_page(frame: &mut Frame, area: Rect, state: &AppState, theme: Theme) {
    match state.page {
        Page::Dashboard => dashboard(frame, area, state, theme),
        Page::Overview => overview(frame, area, state, theme),
        Page::Processes => ListingTable::new(&state.processes, theme)
            .title("Processes")
            .empty_text("No processes")
            .render(frame, area),
        Page::Network => network(frame, area, state, theme),
        Page::Logs => logs(frame, area, state, theme),
        Page::Files => files(frame, area, state, theme),
        Page::Security => security(frame, area, state, theme),
        Page::Users => ListingTable::new(&state.users, theme)
            .title(format!("Users ({})", state.users.rows.len()))
            .empty_text("No users")
            .render(frame, area),
        Page::Settings => settings(frame, area, state, theme),
        Page::Databases | Page::Backups => placeholder(frame, area, state.page, theme),
    }
}

fn panel(title: &str, theme: Theme) -> Block<'static> {
    Block::default()
        .title(Span::styled(format!(" {title} "), theme.title_style()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.border_style())
}

fn kv(label: &str, value: String, theme: Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {label:<12}"), theme.dim()),
        Span::styled(value, theme.text()),
    ])
}

fn gauge(frame: &mut Frame, area: Rect, title: &str, pct: f64, detail: String, theme: Theme) {
    let level = percentage_level(pct);
    let g = Gauge::default()
        .block(panel(title, theme))
        .gauge_style(theme.level(level))
        .ratio((pct / 100.0).clamp(0.0, 1.0))
        .label(format!("{} {detail}", format_percentage(pct)));
    frame.render_widget(g, area);
}

// ── dashboard ───────────────────────────────────────────────────

fn dashboard(frame: &mut Frame, area: Rect, state: &AppState, theme: Theme) {
    let s = &state.server;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(6)])
        .split(area);
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(rows[0]);

    gauge(frame, cards[0], "CPU", s.cpu_usage, format!("· {} cores", s.cpu_cores), theme);
    gauge(
        frame,
        cards[1],
        "Memory",
        s.memory_percentage(),
        format!("· {:.1}/{:.0} GB", s.memory_used, s.memory_total),
        theme,
    );
    gauge(
        frame,
        cards[2],
        "Disk",
        s.disk_percentage(),
        format!("· {:.0}/{:.0} GB", s.disk_used, s.disk_total),
        theme,
    );
    let net = Paragraph::new(Line::from(vec![
        Span::styled(" ↓ ", theme.level(Level::Ok)),
        Span::styled(format_speed(s.net_down * MB), theme.text()),
        Span::styled("  ↑ ", theme.level(Level::Info)),
        Span::styled(format_speed(s.net_up * MB), theme.text()),
    ]))
    .block(panel("Network", theme));
    frame.render_widget(net, cards[3]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(state.quick_actions.len() as u16 + 2), Constraint::Min(3)])
        .split(body[0]);

    let actions: Vec<Line> = state
        .quick_actions
        .iter()
        .enumerate()
        .map(|(i, qa)| {
            let selected = i == state.quick_selected;
            let prefix = if selected { " ▸ " } else { "   " };
            let name_style = match (selected, qa.dangerous) {
                (true, _) => theme.selected_style(),
                (false, true) => theme.level(Level::Critical),
                (false, false) => theme.text(),
            };
            Line::from(vec![
                Span::styled(format!("{prefix}{:<16}", qa.name), name_style),
                Span::styled(qa.description, theme.dim()),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(actions).block(panel("Quick Actions", theme)), left[0]);

    let running = state
        .services
        .rows
        .iter()
        .filter(|svc| svc.status == ServiceStatus::Running)
        .count();
    let services: Vec<Line> = state
        .services
        .rows
        .iter()
        .map(|svc| {
            let dot = theme.level(status_level(svc.status.as_str()));
            Line::from(vec![
                Span::styled(" ● ", dot),
                Span::styled(format!("{:<14}", svc.name), theme.text()),
                Span::styled(svc.status.to_string(), theme.dim()),
            ])
        })
        .collect();
    let title = format!("Services {running}/{} running", state.services.rows.len());
    frame.render_widget(Paragraph::new(services).block(panel(&title, theme)), left[1]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(3)])
        .split(body[1]);
    let info = vec![
        kv("Hostname", s.hostname.clone(), theme),
        kv("OS", s.os.clone(), theme),
        kv("Kernel", s.kernel.clone(), theme),
        kv("Uptime", format_uptime(s.uptime_secs), theme),
        kv("CPU", s.cpu_model.clone(), theme),
        kv("Timezone", s.timezone.clone(), theme),
    ];
    frame.render_widget(Paragraph::new(info).block(panel("System", theme)), right[0]);

    let recent: Vec<Line> = state
        .notifications
        .items()
        .iter()
        .map(|n| {
            let style = if n.read { theme.dim() } else { theme.text() };
            Line::from(vec![
                Span::styled(format!(" {} ", variant_icon(n.variant)), theme.variant(n.variant)),
                Span::styled(n.title.clone(), style),
            ])
        })
        .collect();
    let title = format!("Notifications ({} unread)", state.notifications.unread());
    frame.render_widget(Paragraph::new(recent).block(panel(&title, theme)), right[1]);
}

// ── server overview ─────────────────────────────────────────────

fn overview(frame: &mut Frame, area: Rect, state: &AppState, theme: Theme) {
    let s = &state.server;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Length(3), Constraint::Min(5)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    let left = vec![
        kv("Hostname", s.hostname.clone(), theme),
        kv("Timezone", s.timezone.clone(), theme),
        kv("OS", s.os.clone(), theme),
        kv("Kernel", s.kernel.clone(), theme),
        kv("Uptime", format_uptime(s.uptime_secs), theme),
    ];
    frame.render_widget(Paragraph::new(left).block(panel("Server", theme)), top[0]);

    let temp_level = if s.cpu_temp >= 80.0 {
        Level::Critical
    } else if s.cpu_temp >= 65.0 {
        Level::Warn
    } else {
        Level::Ok
    };
    let right = vec![
        kv("CPU", s.cpu_model.clone(), theme),
        kv("Cores", s.cpu_cores.to_string(), theme),
        Line::from(vec![
            Span::styled(format!(" {:<12}", "Temperature"), theme.dim()),
            Span::styled(format!("{:.0}°C", s.cpu_temp), theme.level(temp_level)),
        ]),
        kv("Memory", format!("{:.1} / {:.0} GB", s.memory_used, s.memory_total), theme),
        kv("Disk", format!("{:.0} / {:.0} GB", s.disk_used, s.disk_total), theme),
    ];
    frame.render_widget(Paragraph::new(right).block(panel("Hardware", theme)), top[1]);

    let bars = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(rows[1]);
    gauge(frame, bars[0], "CPU", s.cpu_usage, String::new(), theme);
    gauge(frame, bars[1], "Memory", s.memory_percentage(), String::new(), theme);
    gauge(
        frame,
        bars[2],
        "Swap",
        s.swap_percentage(),
        format!("· {:.1}/{:.0} GB", s.swap_used, s.swap_total),
        theme,
    );

    ListingTable::new(&state.services, theme)
        .title("Services")
        .render(frame, rows[2]);
}

// ── network ─────────────────────────────────────────────────────

fn network(frame: &mut Frame, area: Rect, state: &AppState, theme: Theme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(4)])
        .split(area);

    let rx: u64 = state.interfaces.rows.iter().map(|i| i.rx_bytes).sum();
    let tx: u64 = state.interfaces.rows.iter().map(|i| i.tx_bytes).sum();
    let summary = Line::from(vec![
        Span::styled(" Received ", theme.dim()),
        Span::styled(human_size(rx), theme.text()),
        Span::styled("   Sent ", theme.dim()),
        Span::styled(human_size(tx), theme.text()),
        Span::styled("   Connections ", theme.dim()),
        Span::styled(state.connections.rows.len().to_string(), theme.text()),
        Span::styled("   Listening ", theme.dim()),
        Span::styled(state.ports.rows.len().to_string(), theme.text()),
    ]);
    frame.render_widget(Paragraph::new(summary), rows[0]);

    let selected = NetTab::ALL.iter().position(|t| *t == state.net_tab).unwrap_or(0);
    let tabs = Tabs::new(NetTab::ALL.iter().map(|t| t.label()))
        .select(selected)
        .style(theme.dim())
        .highlight_style(theme.accent())
        .divider("│");
    frame.render_widget(tabs, rows[1]);

    let title = state.net_tab.label();
    match state.net_tab {
        NetTab::Interfaces => ListingTable::new(&state.interfaces, theme).title(title).render(frame, rows[2]),
        NetTab::Connections => ListingTable::new(&state.connections, theme).title(title).render(frame, rows[2]),
        NetTab::Ports => ListingTable::new(&state.ports, theme).title(title).render(frame, rows[2]),
    }
}

// ── logs ────────────────────────────────────────────────────────

fn logs(frame: &mut Frame, area: Rect, state: &AppState, theme: Theme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(4)])
        .split(area);

    let tabs = Tabs::new(state.log_files.iter().map(|f| f.name))
        .select(state.log_file)
        .style(theme.dim())
        .highlight_style(theme.accent())
        .divider("│");
    frame.render_widget(tabs, rows[0]);

    let mut chips = Vec::new();
    for (i, level) in LogLevel::ALL.iter().enumerate() {
        let on = state.log_levels.contains(level);
        let mark = if on { "■" } else { "□" };
        let style = if on {
            theme.level(cell_level("level", level.as_str()).unwrap_or(Level::Neutral))
        } else {
            theme.dim()
        };
        chips.push(Span::styled(format!(" {}:{mark} {level} ", i + 1), style));
    }
    let (auto, auto_style) = if state.auto_refresh {
        ("● live", theme.level(Level::Ok))
    } else {
        ("○ paused", theme.dim())
    };
    chips.push(Span::styled(format!("  {auto}"), auto_style));
    frame.render_widget(Paragraph::new(Line::from(chips)), rows[1]);

    let title = match state.log_files.get(state.log_file) {
        Some(file) => format!("{} ({})", file.path, human_size(file.size)),
        None => "Logs".to_string(),
    };
    ListingTable::new(&state.logs, theme)
        .title(title)
        .empty_text("No log entries")
        .render(frame, rows[2]);
}

// ── files ───────────────────────────────────────────────────────

fn files(frame: &mut Frame, area: Rect, state: &AppState, theme: Theme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(4)])
        .split(area);

    let crumbs = state.vfs.breadcrumb();
    let mut spans = vec![Span::raw(" ")];
    for (i, part) in crumbs.iter().enumerate() {
        if i > 1 {
            spans.push(Span::styled(" / ", theme.dim()));
        } else if i == 1 {
            spans.push(Span::raw(" "));
        }
        let style = if i + 1 == crumbs.len() { theme.accent() } else { theme.text() };
        spans.push(Span::styled(part.to_string(), style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), rows[0]);

    ListingTable::new(&state.files, theme)
        .title(state.vfs.cwd())
        .empty_text("This folder is empty")
        .render(frame, rows[1]);
}

// ── security ────────────────────────────────────────────────────

fn security(frame: &mut Frame, area: Rect, state: &AppState, theme: Theme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(4)])
        .split(area);
    let sec = &state.security;

    let (fw, fw_style) = if sec.firewall_enabled {
        ("enabled", theme.level(Level::Ok))
    } else {
        ("disabled", theme.level(Level::Critical))
    };
    let status = vec![
        Line::from(vec![
            Span::styled(format!(" {:<12}", "Firewall"), theme.dim()),
            Span::styled(fw, fw_style),
            Span::styled(format!("   {:<10}", "Rules"), theme.dim()),
            Span::styled(sec.active_rules.to_string(), theme.text()),
        ]),
        Line::from(vec![
            Span::styled(format!(" {:<12}", "Defaults"), theme.dim()),
            Span::styled(
                format!("in {} / out {}", sec.default_incoming, sec.default_outgoing),
                theme.text(),
            ),
            Span::styled(format!("   {:<10}", "Blocked"), theme.dim()),
            Span::styled(sec.blocked_attempts.to_string(), theme.level(Level::Warn)),
        ]),
    ];
    frame.render_widget(Paragraph::new(status).block(panel("Security", theme)), rows[0]);

    ListingTable::new(&state.rules, theme)
        .title("Firewall Rules")
        .empty_text("No firewall rules")
        .render(frame, rows[1]);
}

// ── settings ────────────────────────────────────────────────────

fn settings(frame: &mut Frame, area: Rect, state: &AppState, theme: Theme) {
    let mut lines = vec![Line::raw("")];
    for (i, item) in SETTINGS_ITEMS.iter().enumerate() {
        let selected = i == state.settings_selected;
        let prefix = if selected { " ▸ " } else { "   " };
        let style = if selected { theme.selected_style() } else { theme.text() };
        let mut spans = vec![Span::styled(format!("{prefix}{:<20}", item.label()), style)];
        match item.value(state) {
            Some(value) => spans.push(Span::styled(value, theme.key_style())),
            None => spans.push(Span::styled("›", theme.dim())),
        }
        lines.push(Line::from(spans));
    }
    lines.push(Line::raw(""));
    let saved = match state.config.path() {
        Some(path) => format!("   Preferences are saved to {}", path.display()),
        None => "   Preferences are kept for this session only".to_string(),
    };
    lines.push(Line::from(Span::styled(saved, theme.dim())));
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(panel("Preferences", theme)),
        area,
    );
}

fn placeholder(frame: &mut Frame, area: Rect, page: Page, theme: Theme) {
    let block = panel(page.label(), theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let y = inner.y + inner.height / 2;
    let text = vec![
        Line::from(Span::styled(page.label().to_string(), theme.accent())),
        Line::from(Span::styled("This page is coming soon.", theme.dim())),
    ];
    let rect = Rect::new(inner.x, y.saturating_sub(1).max(inner.y), inner.width, 2.min(inner.height));
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen(state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 36)).unwrap();
        terminal
            .draw(|f| render_page(f, f.area(), state, Theme::new(state.config.theme)))
            .unwrap();
        terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn every_page_renders() {
        let mut state = AppState::new(AppConfig::default(), Some(9));
        for &page in Page::ALL {
            state.set_page(page);
            let text = screen(&state);
            assert!(!text.trim().is_empty(), "{page:?} drew nothing");
        }
    }

    #[test]
    fn dashboard_shows_host_and_actions() {
        let state = AppState::new(AppConfig::default(), Some(9));
        let text = screen(&state);
        assert!(text.contains("srvdash-host"));
        assert!(text.contains("Restart Server"));
        assert!(text.contains("2 unread"));
    }

    #[test]
    fn placeholders_say_coming_soon() {
        let mut state = AppState::new(AppConfig::default(), Some(9));
        state.set_page(Page::Backups);
        assert!(screen(&state).contains("coming soon"));
    }
}
