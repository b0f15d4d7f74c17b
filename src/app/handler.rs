//! Input handling: maps key events to state mutations.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::{Action, KeyBind};
use crate::core::format::{format_percentage, human_size, format_speed};
use crate::core::notify::Variant;
use crate::core::records::{LogLevel, ServiceStatus};
use crate::core::table::TIME_FORMAT;

use super::forms::{self, FieldKind, Form};
use super::nav::Page;
use super::ops::{Op, ServiceCommand};
use super::settings::SETTINGS_ITEMS;
use super::state::{ActiveView, AppState, NetTab};

/// Total selectable rows in the controls submenu (actions + "Reset").
pub fn controls_item_count() -> usize {
    Action::ALL.len() + 1
}

/// Process a key event, dispatching based on the active view.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    // Ctrl+c always quits, regardless of view.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    match state.active_view {
        ActiveView::Main => handle_main_key(state, key),
        ActiveView::Search => handle_search_key(state, key),
        ActiveView::Confirm => handle_confirm_key(state, key),
        ActiveView::Form => handle_form_key(state, key),
        ActiveView::Details => handle_details_key(state, key),
        ActiveView::Viewer => handle_viewer_key(state, key),
        ActiveView::Notifications => handle_notifications_key(state, key),
        ActiveView::SettingsMenu => handle_settings_key(state, key),
        ActiveView::ControlsSubmenu => {
            if state.awaiting_rebind {
                handle_rebind_key(state, key);
            } else {
                handle_controls_key(state, key);
            }
        }
    }
}

// ── Main view (configurable bindings) ───────────────────────────

fn handle_main_key(state: &mut AppState, key: KeyEvent) {
    // 1-4 toggle log levels in display order.
    if state.page == Page::Logs && key.modifiers == KeyModifiers::NONE {
        if let KeyCode::Char(c @ '1'..='4') = key.code {
            let level = LogLevel::ALL[(c as u8 - b'1') as usize];
            state.toggle_level(level);
            let shown = if state.log_levels.contains(&level) { "shown" } else { "hidden" };
            state.status_message = Some(format!("{level} entries {shown}"));
            return;
        }
    }

    if key.code == KeyCode::Esc && state.toasts.dismiss().is_some() {
        return;
    }

    let Some(action) = state.config.match_key(key) else {
        return;
    };

    if handle_global_action(state, action) || handle_table_action(state, action) {
        return;
    }

    match state.page {
        Page::Dashboard => dashboard_action(state, action),
        Page::Overview => overview_action(state, action),
        Page::Processes => processes_action(state, action),
        Page::Network => network_action(state, action),
        Page::Logs => logs_action(state, action),
        Page::Files => files_action(state, action),
        Page::Security => security_action(state, action),
        Page::Users => users_action(state, action),
        Page::Settings => settings_page_action(state, action),
        Page::Databases | Page::Backups => {}
    }
}

/// Actions that mean the same thing on every page.
fn handle_global_action(state: &mut AppState, action: Action) -> bool {
    match action {
        Action::Quit => state.should_quit = true,
        Action::OpenSettings => {
            state.active_view = ActiveView::SettingsMenu;
            state.settings_selected = 0;
        }
        Action::Notifications => {
            state.active_view = ActiveView::Notifications;
            state.notification_selected = 0;
        }
        Action::ToggleSidebar => {
            state.config.sidebar_collapsed = !state.config.sidebar_collapsed;
            state.config.persist();
        }
        Action::NextNav => state.set_page(state.page.next()),
        Action::PrevNav => state.set_page(state.page.prev()),
        _ => return false,
    }
    true
}

/// Cursor, paging, sorting and search on pages that show a table.
fn handle_table_action(state: &mut AppState, action: Action) -> bool {
    let Some(table) = state.browse_mut() else {
        return false;
    };
    let mut status = None;
    match action {
        Action::MoveUp => table.select_prev(),
        Action::MoveDown => table.select_next(),
        Action::PrevPage => table.prev_page(),
        Action::NextPage => table.next_page(),
        Action::SortColumn => status = Some(table.cycle_sort()),
        Action::SortDirection => status = Some(table.flip_sort()),
        Action::Search => {
            state.active_view = ActiveView::Search;
            return true;
        }
        _ => return false,
    }
    if status.is_some() {
        state.status_message = status;
    }
    true
}

// ── Pages ───────────────────────────────────────────────────────

fn dashboard_action(state: &mut AppState, action: Action) {
    let count = state.quick_actions.len();
    match action {
        Action::MoveUp => state.quick_selected = state.quick_selected.saturating_sub(1),
        Action::MoveDown => {
            if state.quick_selected + 1 < count {
                state.quick_selected += 1;
            }
        }
        Action::Activate => {
            let Some(qa) = state.quick_actions.get(state.quick_selected).cloned() else {
                return;
            };
            if qa.dangerous {
                state.ask(
                    "Restart Server",
                    "Are you sure you want to restart the server? All active connections will be terminated.",
                    Op::Reboot,
                    true,
                );
            } else {
                state.toast(Variant::Success, format!("{} initiated", qa.name));
            }
        }
        _ => {}
    }
}

fn overview_action(state: &mut AppState, action: Action) {
    let selected = state.services.selected_row().map(|s| (s.name.clone(), s.status));
    match action {
        Action::Toggle | Action::Activate => {
            let Some((name, status)) = selected else {
                return;
            };
            let command = match status {
                ServiceStatus::Running => ServiceCommand::Stop,
                ServiceStatus::Stopped => ServiceCommand::Start,
            };
            state.dispatch(Op::Service { name, command });
        }
        Action::Refresh => {
            let Some((name, status)) = selected else {
                return;
            };
            if status == ServiceStatus::Running {
                state.dispatch(Op::Service {
                    name,
                    command: ServiceCommand::Restart,
                });
            } else {
                state.toast(Variant::Warning, format!("Service {name} is not running"));
            }
        }
        Action::Edit => {
            let form = Form::server_settings(&state.server);
            state.open_form(form);
        }
        Action::Secondary => state.ask(
            "Reboot Server",
            "Are you sure you want to reboot the server? All active connections will be terminated and services will be temporarily unavailable.",
            Op::Reboot,
            true,
        ),
        Action::Delete => state.ask(
            "Shutdown Server",
            "Are you sure you want to shutdown the server? You will need physical or remote access to turn it back on.",
            Op::Shutdown,
            true,
        ),
        _ => {}
    }
}

fn processes_action(state: &mut AppState, action: Action) {
    let Some(p) = state.processes.selected_row().cloned() else {
        if action == Action::Refresh {
            state.dispatch(Op::RefreshProcesses);
        }
        return;
    };
    match action {
        Action::Activate => state.show_details(
            format!("Process {}", p.pid),
            vec![
                ("PID".into(), p.pid.to_string()),
                ("Name".into(), p.name.clone()),
                ("User".into(), p.user.clone()),
                ("CPU".into(), format_percentage(p.cpu)),
                ("Memory".into(), format_percentage(p.memory)),
                ("Status".into(), p.status.clone()),
                ("Command".into(), p.command.clone()),
                ("Started".into(), p.start_time.format(TIME_FORMAT).to_string()),
            ],
        ),
        Action::Delete => state.ask(
            "Kill Process",
            format!(
                "Are you sure you want to terminate {} (PID: {})? This action cannot be undone.",
                p.name, p.pid
            ),
            Op::KillProcess {
                pid: p.pid,
                name: p.name,
            },
            true,
        ),
        Action::Refresh => {
            state.dispatch(Op::RefreshProcesses);
        }
        _ => {}
    }
}

fn network_action(state: &mut AppState, action: Action) {
    match action {
        Action::CycleTab => {
            state.net_tab = state.net_tab.next();
            state.status_message = Some(state.net_tab.label().to_string());
        }
        Action::Refresh => {
            state.dispatch(Op::RefreshNetwork);
        }
        Action::Activate if state.net_tab == NetTab::Interfaces => {
            let Some(i) = state.interfaces.selected_row().cloned() else {
                return;
            };
            state.show_details(
                format!("Interface {}", i.name),
                vec![
                    ("IP address".into(), i.ip_address),
                    ("MAC address".into(), i.mac_address),
                    ("Status".into(), if i.up { "up" } else { "down" }.into()),
                    ("Received".into(), human_size(i.rx_bytes)),
                    ("Sent".into(), human_size(i.tx_bytes)),
                    ("RX speed".into(), format_speed(i.rx_speed)),
                    ("TX speed".into(), format_speed(i.tx_speed)),
                ],
            );
        }
        _ => {}
    }
}

fn logs_action(state: &mut AppState, action: Action) {
    match action {
        Action::CycleTab => {
            let next = (state.log_file + 1) % state.log_files.len().max(1);
            state.dispatch(Op::LoadLogs { file: next });
        }
        Action::Refresh => {
            state.dispatch(Op::LoadLogs {
                file: state.log_file,
            });
        }
        Action::Toggle => {
            let on = !state.auto_refresh;
            state.set_auto_refresh(on);
            let word = if on { "started" } else { "paused" };
            state.status_message = Some(format!("Auto-refresh {word}"));
        }
        Action::Delete => {
            state.clear_logs();
            state.toast(Variant::Info, "Log display cleared");
        }
        Action::Secondary => state.toast(Variant::Success, "Downloading log file..."),
        Action::Activate => {
            let Some(e) = state.logs.selected_row().cloned() else {
                return;
            };
            state.show_details(
                format!("Log entry #{}", e.id),
                vec![
                    ("Time".into(), e.timestamp.format(TIME_FORMAT).to_string()),
                    ("Level".into(), e.level.to_string()),
                    ("Source".into(), e.source),
                    ("Message".into(), e.message),
                ],
            );
        }
        _ => {}
    }
}

fn files_action(state: &mut AppState, action: Action) {
    let selected = state.files.selected_row().cloned();
    match action {
        Action::Activate => {
            let Some(entry) = selected else {
                return;
            };
            if entry.is_dir() {
                match state.vfs.enter(&entry.name) {
                    Ok(()) => {
                        tracing::debug!(path = state.vfs.cwd(), "enter directory");
                        state.reset_files();
                    }
                    Err(err) => state.toast(Variant::Error, err.to_string()),
                }
            } else {
                match state.vfs.read(&entry.name) {
                    Ok(text) => state.show_text(entry.path, text),
                    Err(err) => state.toast(Variant::Error, err.to_string()),
                }
            }
        }
        Action::Back => {
            if state.vfs.up() {
                state.reset_files();
            }
        }
        Action::Refresh => state.refresh_files(),
        Action::New => state.open_form(Form::new_entry()),
        Action::Edit => {
            if let Some(entry) = selected {
                state.open_form(Form::rename(&entry));
            }
        }
        Action::Secondary => {
            if let Some(entry) = selected {
                state.open_form(Form::chmod(&entry));
            }
        }
        Action::Delete => {
            if let Some(entry) = selected {
                let dir = state.vfs.cwd().to_string();
                state.ask(
                    "Delete Item",
                    format!(
                        "Are you sure you want to delete \"{}\"? This action cannot be undone.",
                        entry.name
                    ),
                    Op::Remove { dir, name: entry.name },
                    true,
                );
            }
        }
        _ => {}
    }
}

fn security_action(state: &mut AppState, action: Action) {
    let selected = state.rules.selected_row().map(|r| r.id);
    match action {
        Action::Secondary => {
            state.dispatch(Op::ToggleFirewall);
        }
        Action::New => state.open_form(Form::add_rule()),
        Action::Toggle => {
            let Some(id) = selected else {
                return;
            };
            let Some(rule) = state.rules.rows.iter_mut().find(|r| r.id == id) else {
                return;
            };
            rule.enabled = !rule.enabled;
            let word = if rule.enabled { "enabled" } else { "disabled" };
            state.rules.reclamp();
            state.toast(Variant::Info, format!("Rule {word}"));
        }
        Action::Delete => {
            if let Some(id) = selected {
                state.ask(
                    "Delete Firewall Rule",
                    "Are you sure you want to delete this firewall rule? This may affect your server's security.",
                    Op::DeleteRule { id },
                    true,
                );
            }
        }
        Action::Activate => {
            let Some(r) = state.rules.selected_row().cloned() else {
                return;
            };
            state.show_details(
                format!("Rule #{}", r.id),
                vec![
                    ("Action".into(), r.action.to_string()),
                    ("Direction".into(), r.direction.to_string()),
                    ("Protocol".into(), r.protocol.to_string()),
                    ("Port".into(), r.port),
                    ("Source".into(), r.source),
                    ("Destination".into(), r.destination),
                    ("Description".into(), r.description),
                    ("Enabled".into(), if r.enabled { "yes" } else { "no" }.into()),
                ],
            );
        }
        _ => {}
    }
}

fn users_action(state: &mut AppState, action: Action) {
    let selected = state.users.selected_row().cloned();
    match action {
        Action::New => state.open_form(Form::create_user()),
        Action::Edit => {
            if let Some(user) = selected {
                state.open_form(Form::edit_user(&user));
            }
        }
        Action::Secondary => {
            if let Some(user) = selected {
                state.open_form(Form::password(&user));
            }
        }
        Action::Delete => {
            if let Some(user) = selected {
                state.ask(
                    "Delete User",
                    format!(
                        "Are you sure you want to delete user \"{}\"? This action cannot be undone and will remove all associated data.",
                        user.username
                    ),
                    Op::DeleteUser {
                        id: user.id,
                        username: user.username,
                    },
                    true,
                );
            }
        }
        Action::Activate => {
            let Some(u) = selected else {
                return;
            };
            let last_login = u
                .last_login
                .map_or_else(|| "Never".to_string(), |t| t.format(TIME_FORMAT).to_string());
            state.show_details(
                format!("User {}", u.username),
                vec![
                    ("Username".into(), u.username),
                    ("Email".into(), u.email),
                    ("Role".into(), u.role.to_string()),
                    ("Status".into(), u.status.to_string()),
                    ("Last login".into(), last_login),
                    ("Created".into(), u.created.format("%Y-%m-%d").to_string()),
                    ("Shell".into(), u.shell),
                    ("Home".into(), u.home),
                ],
            );
        }
        _ => {}
    }
}

/// The settings page lists the same items as the settings popup.
fn settings_page_action(state: &mut AppState, action: Action) {
    match action {
        Action::MoveUp => state.settings_selected = state.settings_selected.saturating_sub(1),
        Action::MoveDown => {
            if state.settings_selected + 1 < SETTINGS_ITEMS.len() {
                state.settings_selected += 1;
            }
        }
        Action::Activate | Action::Toggle => {
            if let Some(item) = SETTINGS_ITEMS.get(state.settings_selected) {
                item.activate(state);
            }
        }
        _ => {}
    }
}

// ── Search box (hardcoded keys) ─────────────────────────────────

fn handle_search_key(state: &mut AppState, key: KeyEvent) {
    let Some(table) = state.browse_mut() else {
        state.active_view = ActiveView::Main;
        return;
    };
    match key.code {
        KeyCode::Esc => {
            table.clear_search();
            state.active_view = ActiveView::Main;
        }
        KeyCode::Enter | KeyCode::Down => state.active_view = ActiveView::Main,
        KeyCode::Backspace => table.pop_search(),
        KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            table.push_search(c);
        }
        _ => {}
    }
}

// ── Popups (hardcoded keys) ─────────────────────────────────────

fn handle_confirm_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            // The dialog stays up until the running op lands.
            if let Some(msg) = state.busy_message() {
                state.toast(Variant::Warning, msg);
                return;
            }
            let confirm = state.confirm.take();
            state.close_overlay();
            if let Some(confirm) = confirm {
                state.dispatch(confirm.op);
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => state.close_overlay(),
        _ => {}
    }
}

fn handle_form_key(state: &mut AppState, key: KeyEvent) {
    if key.code == KeyCode::Enter {
        submit_form(state);
        return;
    }
    let Some(form) = state.form.as_mut() else {
        state.close_overlay();
        return;
    };
    let on_choice = matches!(
        form.fields.get(form.focus).map(|f| f.kind),
        Some(FieldKind::Choice(_))
    );
    match key.code {
        KeyCode::Esc => state.close_overlay(),
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
        KeyCode::Left => form.cycle(false),
        KeyCode::Right => form.cycle(true),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(' ') if on_choice => form.cycle(true),
        KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            form.input(c);
        }
        _ => {}
    }
}

fn submit_form(state: &mut AppState) {
    if let Some(msg) = state.busy_message() {
        if let Some(form) = state.form.as_mut() {
            form.error = Some(msg);
        }
        return;
    }
    let Some(form) = state.form.as_ref() else {
        return;
    };
    match forms::submit(form, state) {
        Ok(op) => {
            state.close_overlay();
            state.dispatch(op);
        }
        Err(err) => {
            tracing::debug!("form rejected: {err}");
            if let Some(form) = state.form.as_mut() {
                form.error = Some(err.to_string());
            }
        }
    }
}

fn handle_details_key(state: &mut AppState, key: KeyEvent) {
    if matches!(
        key.code,
        KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q')
    ) {
        state.close_overlay();
    }
}

fn handle_viewer_key(state: &mut AppState, key: KeyEvent) {
    let Some(viewer) = state.viewer.as_mut() else {
        state.close_overlay();
        return;
    };
    let max = viewer.text.lines().count().saturating_sub(1) as u16;
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q') => {
            state.close_overlay()
        }
        KeyCode::Up | KeyCode::Char('k') => viewer.scroll = viewer.scroll.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => viewer.scroll = (viewer.scroll + 1).min(max),
        KeyCode::PageUp => viewer.scroll = viewer.scroll.saturating_sub(10),
        KeyCode::PageDown => viewer.scroll = (viewer.scroll + 10).min(max),
        _ => {}
    }
}

fn handle_notifications_key(state: &mut AppState, key: KeyEvent) {
    let ids: Vec<u64> = state.notifications.items().iter().map(|n| n.id).collect();
    let selected = ids.get(state.notification_selected).copied();
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('b') => {
            state.active_view = ActiveView::Main;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.notification_selected = state.notification_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.notification_selected + 1 < ids.len() {
                state.notification_selected += 1;
            }
        }
        KeyCode::Enter => {
            if let Some(id) = selected {
                state.notifications.mark_read(id);
            }
        }
        KeyCode::Char('a') => state.notifications.mark_all_read(),
        KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(id) = selected {
                state.notifications.remove(id);
                let len = state.notifications.items().len();
                state.notification_selected = state.notification_selected.min(len.saturating_sub(1));
            }
        }
        KeyCode::Char('x') => {
            state.notifications.clear();
            state.notification_selected = 0;
        }
        _ => {}
    }
}

// ── Settings menu (hardcoded keys) ──────────────────────────────

fn handle_settings_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            state.active_view = ActiveView::Main;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.settings_selected = state.settings_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.settings_selected < SETTINGS_ITEMS.len() - 1 {
                state.settings_selected += 1;
            }
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
            if let Some(item) = SETTINGS_ITEMS.get(state.settings_selected) {
                item.activate(state);
            }
        }
        _ => {}
    }
}

// ── Controls submenu (hardcoded navigation, interactive rebinding) ──

fn handle_controls_key(state: &mut AppState, key: KeyEvent) {
    let item_count = controls_item_count();

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            state.active_view = ActiveView::Main;
        }
        KeyCode::Left | KeyCode::Char('h') => {
            state.active_view = ActiveView::SettingsMenu;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.controls_selected = state.controls_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.controls_selected < item_count - 1 {
                state.controls_selected += 1;
            }
        }
        KeyCode::Enter => {
            if state.controls_selected < Action::ALL.len() {
                state.awaiting_rebind = true;
            } else {
                state.config.reset_defaults();
                state.config.persist();
                state.status_message = Some("Key bindings reset".into());
            }
        }
        KeyCode::Delete | KeyCode::Backspace => {
            if let Some(&action) = Action::ALL.get(state.controls_selected) {
                state.config.clear_bindings(action);
                state.config.persist();
            }
        }
        _ => {}
    }
}

/// Capture the next key press as a new binding.
fn handle_rebind_key(state: &mut AppState, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        state.awaiting_rebind = false;
        return;
    }

    let Some(&action) = Action::ALL.get(state.controls_selected) else {
        state.awaiting_rebind = false;
        return;
    };
    let bind = KeyBind::from_key_event(key);
    tracing::debug!("rebind {:?} to {}", action, bind.display());
    state.config.add_binding(action, bind);
    state.config.persist();
    state.awaiting_rebind = false;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ops;
    use crate::config::AppConfig;

    fn state() -> AppState {
        AppState::new(AppConfig::default(), Some(3))
    }

    fn press(state: &mut AppState, code: KeyCode) {
        handle_key(state, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(state: &mut AppState, text: &str) {
        text.chars().for_each(|c| press(state, KeyCode::Char(c)));
    }

    /// Run every queued op to completion, as the event loop would.
    fn settle(state: &mut AppState) {
        for op in state.take_outbox() {
            ops::apply(state, op);
        }
    }

    #[test]
    fn ctrl_c_quits_from_any_view() {
        let mut s = state();
        s.active_view = ActiveView::Form;
        handle_key(&mut s, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(s.should_quit);
    }

    #[test]
    fn tab_walks_the_sidebar() {
        let mut s = state();
        press(&mut s, KeyCode::Tab);
        assert_eq!(s.page, Page::Overview);
        press(&mut s, KeyCode::BackTab);
        press(&mut s, KeyCode::BackTab);
        assert_eq!(s.page, Page::Settings);
    }

    #[test]
    fn search_filters_and_escape_clears() {
        let mut s = state();
        s.set_page(Page::Processes);
        press(&mut s, KeyCode::Char('/'));
        assert_eq!(s.active_view, ActiveView::Search);
        type_str(&mut s, "MYSQL");
        let total = s.processes.visible().total;
        assert!(total >= 1 && total < s.processes.rows.len());
        press(&mut s, KeyCode::Enter);
        assert_eq!(s.search_text(), "MYSQL");
        press(&mut s, KeyCode::Char('/'));
        press(&mut s, KeyCode::Esc);
        assert_eq!(s.search_text(), "");
        assert_eq!(s.active_view, ActiveView::Main);
    }

    #[test]
    fn kill_asks_then_runs() {
        let mut s = state();
        s.set_page(Page::Processes);
        let victim = s.processes.selected_row().cloned().unwrap();
        press(&mut s, KeyCode::Char('d'));
        assert_eq!(s.active_view, ActiveView::Confirm);
        press(&mut s, KeyCode::Char('n'));
        assert!(s.outbox.is_empty());

        press(&mut s, KeyCode::Char('d'));
        press(&mut s, KeyCode::Char('y'));
        assert_eq!(s.active_view, ActiveView::Main);
        assert!(s.pending.is_some());
        settle(&mut s);
        assert!(s.processes.rows.iter().all(|p| p.pid != victim.pid));
        assert!(s.pending.is_none());
    }

    #[test]
    fn second_op_is_refused_while_one_runs() {
        let mut s = state();
        s.set_page(Page::Network);
        press(&mut s, KeyCode::Char('r'));
        press(&mut s, KeyCode::Char('r'));
        assert_eq!(s.outbox.len(), 1);
        assert!(s.toasts.iter().any(|t| t.variant == Variant::Warning));
    }

    #[test]
    fn file_manager_enters_and_leaves_directories() {
        let mut s = state();
        s.set_page(Page::Files);
        let idx = s.files.visible().rows.iter().position(|f| f.name == "home").unwrap();
        s.files.selected = idx;
        press(&mut s, KeyCode::Enter);
        assert_eq!(s.vfs.cwd(), "/home");
        assert!(s.files.rows.iter().any(|f| f.name == "deploy"));
        press(&mut s, KeyCode::Backspace);
        assert_eq!(s.vfs.cwd(), "/");
        press(&mut s, KeyCode::Backspace);
        assert_eq!(s.vfs.cwd(), "/");
    }

    #[test]
    fn new_folder_through_the_form() {
        let mut s = state();
        s.set_page(Page::Files);
        press(&mut s, KeyCode::Char('n'));
        assert_eq!(s.active_view, ActiveView::Form);
        press(&mut s, KeyCode::Right);
        press(&mut s, KeyCode::Tab);
        type_str(&mut s, "bad/name");
        press(&mut s, KeyCode::Enter);
        assert_eq!(s.active_view, ActiveView::Form);
        assert!(s.form.as_ref().and_then(|f| f.error.as_ref()).is_some());

        for _ in 0.."bad/name".len() {
            press(&mut s, KeyCode::Backspace);
        }
        type_str(&mut s, "srv");
        press(&mut s, KeyCode::Enter);
        assert_eq!(s.active_view, ActiveView::Main);
        settle(&mut s);
        let srv = s.files.rows.iter().find(|f| f.name == "srv").unwrap();
        assert!(srv.is_dir());
    }

    #[test]
    fn file_op_lands_in_the_directory_it_was_requested_in() {
        let mut s = state();
        s.set_page(Page::Files);
        s.files.selected = s.files.visible().rows.iter().position(|f| f.name == "home").unwrap();
        press(&mut s, KeyCode::Enter);
        press(&mut s, KeyCode::Char('n'));
        press(&mut s, KeyCode::Right);
        press(&mut s, KeyCode::Tab);
        type_str(&mut s, "srv");
        press(&mut s, KeyCode::Enter);
        assert!(s.pending.is_some());

        // Browse away before the op completes.
        press(&mut s, KeyCode::Backspace);
        assert_eq!(s.vfs.cwd(), "/");
        settle(&mut s);
        assert!(s.files.rows.iter().all(|f| f.name != "srv"));
        s.vfs.cd("/home").unwrap();
        let names: Vec<&str> = s.vfs.list().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["deploy", "admin", "srv"]);
    }

    #[test]
    fn busy_submit_keeps_the_form_and_its_input() {
        let mut s = state();
        s.set_page(Page::Network);
        press(&mut s, KeyCode::Char('r'));
        s.set_page(Page::Files);
        press(&mut s, KeyCode::Char('n'));
        press(&mut s, KeyCode::Tab);
        type_str(&mut s, "keepme");
        press(&mut s, KeyCode::Enter);

        assert_eq!(s.active_view, ActiveView::Form);
        let form = s.form.as_ref().unwrap();
        assert_eq!(form.value("Name"), "keepme");
        assert_eq!(form.error.as_deref(), Some("Please wait: Refreshing network data"));
        assert_eq!(s.outbox.len(), 1);

        settle(&mut s);
        press(&mut s, KeyCode::Enter);
        assert_eq!(s.active_view, ActiveView::Main);
        assert!(matches!(s.outbox.as_slice(), [Op::CreateEntry { name, .. }] if name == "keepme"));
    }

    #[test]
    fn busy_confirm_stays_open() {
        let mut s = state();
        s.set_page(Page::Network);
        press(&mut s, KeyCode::Char('r'));
        s.set_page(Page::Processes);
        press(&mut s, KeyCode::Char('d'));
        press(&mut s, KeyCode::Char('y'));
        assert_eq!(s.active_view, ActiveView::Confirm);
        assert!(s.confirm.is_some());
        assert_eq!(s.outbox.len(), 1);
        assert!(s.toasts.iter().any(|t| t.variant == Variant::Warning));

        settle(&mut s);
        press(&mut s, KeyCode::Char('y'));
        assert_eq!(s.active_view, ActiveView::Main);
        assert!(matches!(s.outbox.as_slice(), [Op::KillProcess { .. }]));
    }

    #[test]
    fn number_keys_toggle_log_levels() {
        let mut s = state();
        s.set_page(Page::Logs);
        press(&mut s, KeyCode::Char('1'));
        assert!(!s.log_levels.contains(&LogLevel::Error));
        assert!(s.logs.rows.iter().all(|e| e.level != LogLevel::Error));
        press(&mut s, KeyCode::Char('1'));
        assert!(s.log_levels.contains(&LogLevel::Error));
    }

    #[test]
    fn notifications_popup_keys() {
        let mut s = state();
        press(&mut s, KeyCode::Char('b'));
        assert_eq!(s.active_view, ActiveView::Notifications);
        press(&mut s, KeyCode::Char('a'));
        assert_eq!(s.notifications.unread(), 0);
        press(&mut s, KeyCode::Char('d'));
        assert_eq!(s.notifications.items().len(), 2);
        press(&mut s, KeyCode::Char('x'));
        assert!(s.notifications.items().is_empty());
        press(&mut s, KeyCode::Esc);
        assert_eq!(s.active_view, ActiveView::Main);
    }

    #[test]
    fn rebinding_from_the_controls_menu() {
        let mut s = state();
        press(&mut s, KeyCode::Char('?'));
        assert_eq!(s.active_view, ActiveView::SettingsMenu);
        press(&mut s, KeyCode::Enter);
        assert_eq!(s.active_view, ActiveView::ControlsSubmenu);
        press(&mut s, KeyCode::Enter);
        assert!(s.awaiting_rebind);
        press(&mut s, KeyCode::Char('w'));
        assert!(!s.awaiting_rebind);
        assert_eq!(
            s.config.match_key(KeyEvent::new(KeyCode::Char('w'), KeyModifiers::NONE)),
            Some(Action::MoveUp)
        );
    }

    #[test]
    fn toggling_a_rule_is_immediate() {
        let mut s = state();
        s.set_page(Page::Security);
        let before = s.rules.selected_row().map(|r| r.enabled).unwrap();
        press(&mut s, KeyCode::Char('t'));
        assert_eq!(s.rules.selected_row().map(|r| r.enabled), Some(!before));
        assert!(s.outbox.is_empty());
    }

    #[test]
    fn escape_dismisses_newest_toast() {
        let mut s = state();
        s.toast(Variant::Info, "first");
        s.toast(Variant::Info, "second");
        press(&mut s, KeyCode::Esc);
        let left: Vec<&str> = s.toasts.iter().map(|t| t.message.as_str()).collect();
        assert_eq!(left, ["first"]);
    }

    #[test]
    fn sort_keys_report_in_status_line() {
        let mut s = state();
        s.set_page(Page::Users);
        press(&mut s, KeyCode::Char('s'));
        assert_eq!(s.status_message.as_deref(), Some("Sorted by Username ▲"));
        press(&mut s, KeyCode::Char('o'));
        assert_eq!(s.status_message.as_deref(), Some("Sorted by Username ▼"));
    }
}
