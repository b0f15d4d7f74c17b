//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use std::collections::HashSet;
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::AppConfig;
use crate::core::mock::{self, LogGenerator, LOG_CAPACITY};
use crate::core::notify::{Notifications, Toasts, Variant};
use crate::core::records::{
    Connection, FileEntry, FirewallRule, ListeningPort, LogEntry, LogFile, LogLevel, NetInterface,
    Process, QuickAction, SecurityStatus, ServerInfo, Service, User,
};
use crate::core::vfs::Vfs;

use super::forms::Form;
use super::listing::{Browse, Listing};
use super::nav::Page;
use super::ops::Op;

/// How often the log viewer pulls a live entry while auto-refresh is on.
pub const LOG_REFRESH: Duration = Duration::from_secs(3);

/// Which view / overlay is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Main,
    /// Typing into the current table's search box.
    Search,
    Confirm,
    Form,
    Details,
    Viewer,
    Notifications,
    SettingsMenu,
    ControlsSubmenu,
}

/// A yes/no question guarding an op.
#[derive(Debug, Clone, PartialEq)]
pub struct Confirm {
    pub title: String,
    pub message: String,
    pub op: Op,
    /// Drawn in the error colour.
    pub danger: bool,
}

/// Read-only key/value popup for a single record.
#[derive(Debug, Clone, PartialEq)]
pub struct Details {
    pub title: String,
    pub lines: Vec<(String, String)>,
}

/// Scrollable text popup (file contents).
#[derive(Debug, Clone, PartialEq)]
pub struct Viewer {
    pub title: String,
    pub text: String,
    pub scroll: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetTab {
    #[default]
    Interfaces,
    Connections,
    Ports,
}

impl NetTab {
    pub const ALL: &[NetTab] = &[NetTab::Interfaces, NetTab::Connections, NetTab::Ports];

    pub fn label(self) -> &'static str {
        match self {
            NetTab::Interfaces => "Interfaces",
            NetTab::Connections => "Active Connections",
            NetTab::Ports => "Listening Ports",
        }
    }

    pub fn next(self) -> Self {
        match self {
            NetTab::Interfaces => NetTab::Connections,
            NetTab::Connections => NetTab::Ports,
            NetTab::Ports => NetTab::Interfaces,
        }
    }
}

/// Top-level application state.
pub struct AppState {
    pub page: Page,
    /// Which view / overlay is currently shown.
    pub active_view: ActiveView,
    /// User-configurable keybindings and preferences.
    pub config: AppConfig,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    /// Currently highlighted item in the settings menu.
    pub settings_selected: usize,
    /// Currently highlighted item in the controls submenu.
    pub controls_selected: usize,
    /// When `true`, the controls submenu is waiting for the user to press
    /// a key to rebind the action at `controls_selected`.
    pub awaiting_rebind: bool,

    pub confirm: Option<Confirm>,
    pub form: Option<Form>,
    pub details: Option<Details>,
    pub viewer: Option<Viewer>,
    pub notification_selected: usize,

    // ── server ─────────────────────────────────────────────────
    pub server: ServerInfo,
    pub services: Listing<Service>,
    pub quick_actions: Vec<QuickAction>,
    pub quick_selected: usize,
    pub processes: Listing<Process>,

    // ── network ────────────────────────────────────────────────
    pub net_tab: NetTab,
    pub interfaces: Listing<NetInterface>,
    pub connections: Listing<Connection>,
    pub ports: Listing<ListeningPort>,

    // ── logs ───────────────────────────────────────────────────
    pub log_files: Vec<LogFile>,
    /// Index into `log_files`.
    pub log_file: usize,
    /// Every generated entry, newest first; `logs` shows the level-filtered
    /// subset.
    pub log_buffer: Vec<LogEntry>,
    pub log_levels: HashSet<LogLevel>,
    pub logs: Listing<LogEntry>,
    pub auto_refresh: bool,
    last_log_refresh: Instant,
    pub log_gen: LogGenerator,

    // ── files / security / users ───────────────────────────────
    pub vfs: Vfs,
    pub files: Listing<FileEntry>,
    pub security: SecurityStatus,
    pub rules: Listing<FirewallRule>,
    pub users: Listing<User>,

    pub notifications: Notifications,
    pub toasts: Toasts,
    /// The op currently in flight.  Input keeps working meanwhile, but no
    /// second op is accepted until it completes.
    pub pending: Option<Op>,
    /// Ops queued by handlers, drained and spawned by the event loop.
    pub outbox: Vec<Op>,
    pub rng: StdRng,
    /// Monotonic tick counter (drives the spinner).
    pub tick: u64,
    rule_seq: u64,
    user_seq: u64,
}

impl AppState {
    /// Fresh state over the mock host.  `seed` pins every random choice.
    pub fn new(config: AppConfig, seed: Option<u64>) -> Self {
        let page_size = config.rows_per_page;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut log_gen = LogGenerator::new(seed);
        let now = wall_now();
        let log_buffer = log_gen.history(now);
        let vfs = Vfs::seeded();
        let files = vfs.list().into_iter().cloned().collect();
        let rules = mock::firewall_rules();
        let users = mock::users();
        let rule_seq = rules.iter().map(|r| r.id).max().unwrap_or(0);
        let user_seq = users.iter().map(|u| u.id).max().unwrap_or(0);
        let toasts = Toasts::new(Duration::from_millis(config.toast_ms));

        let mut state = Self {
            page: Page::default(),
            active_view: ActiveView::default(),
            should_quit: false,
            status_message: None,
            settings_selected: 0,
            controls_selected: 0,
            awaiting_rebind: false,
            confirm: None,
            form: None,
            details: None,
            viewer: None,
            notification_selected: 0,
            server: mock::server_info(),
            services: Listing::new(mock::services(), Service::columns(), page_size),
            quick_actions: mock::quick_actions(),
            quick_selected: 0,
            processes: Listing::new(mock::processes(), Process::columns(), page_size),
            net_tab: NetTab::default(),
            interfaces: Listing::new(mock::interfaces(), NetInterface::columns(), page_size),
            connections: Listing::new(mock::connections(), Connection::columns(), page_size),
            ports: Listing::new(mock::listening_ports(), ListeningPort::columns(), page_size),
            log_files: mock::log_files(),
            log_file: 0,
            log_buffer,
            log_levels: LogLevel::ALL.iter().copied().collect(),
            logs: Listing::new(Vec::new(), LogEntry::columns(), page_size),
            auto_refresh: false,
            last_log_refresh: Instant::now(),
            log_gen,
            vfs,
            files: Listing::new(files, FileEntry::columns(), page_size),
            security: mock::security_status(),
            rules: Listing::new(rules, FirewallRule::columns(), page_size),
            users: Listing::new(users, User::columns(), page_size),
            notifications: Notifications::seeded(now),
            toasts,
            pending: None,
            outbox: Vec::new(),
            rng,
            tick: 0,
            rule_seq,
            user_seq,
            config,
        };
        state.sync_logs();
        state
    }

    pub fn wall_now(&self) -> NaiveDateTime {
        wall_now()
    }

    pub fn toast(&mut self, variant: Variant, message: impl Into<String>) {
        self.toasts.push(variant, message, Instant::now());
    }

    // ── navigation ─────────────────────────────────────────────

    pub fn set_page(&mut self, page: Page) {
        if page != self.page {
            tracing::debug!(from = self.page.slug(), to = page.slug(), "page change");
        }
        self.page = page;
        self.status_message = None;
    }

    /// The table the current page browses, if it has one.
    pub fn browse_mut(&mut self) -> Option<&mut dyn Browse> {
        let table: &mut dyn Browse = match self.page {
            Page::Overview => &mut self.services,
            Page::Processes => &mut self.processes,
            Page::Network => match self.net_tab {
                NetTab::Interfaces => &mut self.interfaces,
                NetTab::Connections => &mut self.connections,
                NetTab::Ports => &mut self.ports,
            },
            Page::Logs => &mut self.logs,
            Page::Files => &mut self.files,
            Page::Security => &mut self.rules,
            Page::Users => &mut self.users,
            _ => return None,
        };
        Some(table)
    }

    pub fn browse(&self) -> Option<&dyn Browse> {
        let table: &dyn Browse = match self.page {
            Page::Overview => &self.services,
            Page::Processes => &self.processes,
            Page::Network => match self.net_tab {
                NetTab::Interfaces => &self.interfaces,
                NetTab::Connections => &self.connections,
                NetTab::Ports => &self.ports,
            },
            Page::Logs => &self.logs,
            Page::Files => &self.files,
            Page::Security => &self.rules,
            Page::Users => &self.users,
            _ => return None,
        };
        Some(table)
    }

    /// Current search text of the page's table (empty if none).
    pub fn search_text(&self) -> &str {
        self.browse().map_or("", |b| b.search())
    }

    /// Apply a new page size to every table.
    pub fn set_rows_per_page(&mut self, size: usize) {
        self.config.rows_per_page = size;
        let tables: [&mut dyn Browse; 9] = [
            &mut self.services,
            &mut self.processes,
            &mut self.interfaces,
            &mut self.connections,
            &mut self.ports,
            &mut self.logs,
            &mut self.files,
            &mut self.rules,
            &mut self.users,
        ];
        for table in tables {
            table.set_page_size(size);
        }
    }

    // ── overlays ───────────────────────────────────────────────

    pub fn ask(&mut self, title: impl Into<String>, message: impl Into<String>, op: Op, danger: bool) {
        self.confirm = Some(Confirm {
            title: title.into(),
            message: message.into(),
            op,
            danger,
        });
        self.active_view = ActiveView::Confirm;
    }

    pub fn open_form(&mut self, form: Form) {
        self.form = Some(form);
        self.active_view = ActiveView::Form;
    }

    pub fn show_details(&mut self, title: impl Into<String>, lines: Vec<(String, String)>) {
        self.details = Some(Details {
            title: title.into(),
            lines,
        });
        self.active_view = ActiveView::Details;
    }

    pub fn show_text(&mut self, title: impl Into<String>, text: String) {
        self.viewer = Some(Viewer {
            title: title.into(),
            text,
            scroll: 0,
        });
        self.active_view = ActiveView::Viewer;
    }

    /// Drop any popup and return to the page.
    pub fn close_overlay(&mut self) {
        self.confirm = None;
        self.form = None;
        self.details = None;
        self.viewer = None;
        self.awaiting_rebind = false;
        self.active_view = ActiveView::Main;
    }

    // ── operations ─────────────────────────────────────────────

    /// Queue `op` for the event loop.  Refused while another op is running.
    /// Why a new op would be refused right now, if it would.
    pub fn busy_message(&self) -> Option<String> {
        self.pending
            .as_ref()
            .map(|current| format!("Please wait: {}", current.label()))
    }

    pub fn dispatch(&mut self, op: Op) -> bool {
        if let Some(msg) = self.busy_message() {
            self.toast(Variant::Warning, msg);
            return false;
        }
        tracing::info!(op = %op.label(), "operation started");
        self.pending = Some(op.clone());
        self.outbox.push(op);
        true
    }

    pub fn take_outbox(&mut self) -> Vec<Op> {
        std::mem::take(&mut self.outbox)
    }

    pub fn next_rule_id(&mut self) -> u64 {
        self.rule_seq += 1;
        self.rule_seq
    }

    pub fn next_user_id(&mut self) -> u64 {
        self.user_seq += 1;
        self.user_seq
    }

    // ── files ──────────────────────────────────────────────────

    /// Reload the file table from the current directory.
    pub fn refresh_files(&mut self) {
        let rows = self.vfs.list().into_iter().cloned().collect();
        self.files.set_rows(rows);
    }

    /// Directory changed: new rows, cursor and paging from the top.
    pub fn reset_files(&mut self) {
        self.files.selected = 0;
        self.files.view.page = 0;
        self.files.view.set_search("");
        self.refresh_files();
    }

    // ── logs ───────────────────────────────────────────────────

    /// Re-derive the log table from the buffer and the level filter.
    pub fn sync_logs(&mut self) {
        let rows = self
            .log_buffer
            .iter()
            .filter(|e| self.log_levels.contains(&e.level))
            .cloned()
            .collect();
        self.logs.set_rows(rows);
    }

    pub fn toggle_level(&mut self, level: LogLevel) {
        if !self.log_levels.remove(&level) {
            self.log_levels.insert(level);
        }
        self.sync_logs();
    }

    pub fn set_auto_refresh(&mut self, on: bool) {
        self.auto_refresh = on;
        self.last_log_refresh = Instant::now();
    }

    /// Prepend one live entry, keeping at most [`LOG_CAPACITY`].
    pub fn push_live_log(&mut self) {
        let now = self.wall_now();
        let entry = self.log_gen.live_entry(now);
        self.log_buffer.insert(0, entry);
        self.log_buffer.truncate(LOG_CAPACITY);
        self.sync_logs();
    }

    pub fn clear_logs(&mut self) {
        self.log_buffer.clear();
        self.sync_logs();
    }

    // ── timers ─────────────────────────────────────────────────

    /// Advance clocks: expire toasts and run the log auto-refresh.
    pub fn on_tick(&mut self, now: Instant) {
        self.tick = self.tick.wrapping_add(1);
        self.toasts.prune(now);
        if self.auto_refresh && now.duration_since(self.last_log_refresh) >= LOG_REFRESH {
            self.last_log_refresh = now;
            self.push_live_log();
        }
    }
}

fn wall_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::new(AppConfig::default(), Some(1))
    }

    #[test]
    fn starts_on_dashboard_with_full_log_buffer() {
        let s = state();
        assert_eq!(s.page, Page::Dashboard);
        assert_eq!(s.log_buffer.len(), LOG_CAPACITY);
        assert_eq!(s.logs.rows.len(), LOG_CAPACITY);
        assert_eq!(s.notifications.unread(), 2);
        assert!(s.files.rows.iter().any(|f| f.name == "home"));
    }

    #[test]
    fn level_filter_hides_entries() {
        let mut s = state();
        s.toggle_level(LogLevel::Info);
        assert!(s.logs.rows.iter().all(|e| e.level != LogLevel::Info));
        s.toggle_level(LogLevel::Info);
        assert_eq!(s.logs.rows.len(), LOG_CAPACITY);
    }

    #[test]
    fn auto_refresh_prepends_and_caps() {
        let mut s = state();
        let start = Instant::now();
        s.on_tick(start + LOG_REFRESH);
        assert_eq!(s.log_buffer.len(), LOG_CAPACITY);

        s.set_auto_refresh(true);
        let newest = s.log_buffer[0].id;
        s.on_tick(Instant::now() + LOG_REFRESH);
        assert_eq!(s.log_buffer.len(), LOG_CAPACITY);
        assert!(s.log_buffer[0].id > newest);
    }

    #[test]
    fn only_one_op_in_flight() {
        let mut s = state();
        assert!(s.dispatch(Op::RefreshNetwork));
        assert!(!s.dispatch(Op::RefreshProcesses));
        assert_eq!(s.take_outbox(), vec![Op::RefreshNetwork]);
        assert!(s.outbox.is_empty());
        assert_eq!(s.pending, Some(Op::RefreshNetwork));
    }

    #[test]
    fn browse_follows_page_and_tab() {
        let mut s = state();
        assert!(s.browse_mut().is_none());
        s.set_page(Page::Network);
        s.net_tab = NetTab::Ports;
        s.browse_mut().unwrap().push_search('x');
        assert_eq!(s.ports.view.search, "x");
        assert_eq!(s.search_text(), "x");
    }

    #[test]
    fn page_size_reaches_every_table() {
        let mut s = state();
        s.set_rows_per_page(25);
        assert_eq!(s.users.view.page_size, 25);
        assert_eq!(s.logs.view.page_size, 25);
        assert_eq!(s.config.rows_per_page, 25);
    }

    #[test]
    fn ids_continue_after_seed_data() {
        let mut s = state();
        let max = s.users.rows.iter().map(|u| u.id).max().unwrap();
        assert_eq!(s.next_user_id(), max + 1);
    }
}
