//! Record types shown by the dashboard and their table columns.
//!
//! Each record implements [`Row`] so it can be fed straight into the view
//! engine.  Field names here are the ones columns and sort keys refer to.

use std::cmp::Ordering;

use chrono::NaiveDateTime;
use thiserror::Error;

use super::format::{format_speed, human_size};
use super::table::{Column, Row, Value};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown value \"{0}\"")]
pub struct UnknownWord(pub String);

/// Shared shape of the small string-backed enums below.
macro_rules! word_enum {
    ($name:ident { $($variant:ident => $word:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $word),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownWord;

            /// Case-insensitive; surrounding whitespace is ignored.
            fn from_str(s: &str) -> Result<Self, UnknownWord> {
                match s.trim().to_lowercase().as_str() {
                    $($word => Ok($name::$variant),)+
                    _ => Err(UnknownWord(s.to_string())),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

word_enum!(ServiceStatus { Running => "running", Stopped => "stopped" });
word_enum!(Role { Admin => "admin", User => "user", Viewer => "viewer" });
word_enum!(UserStatus { Active => "active", Inactive => "inactive" });
word_enum!(LogLevel { Error => "error", Warning => "warning", Info => "info", Debug => "debug" });

impl LogLevel {
    /// Display order of the level filter chips.
    pub const ALL: &[LogLevel] = &[LogLevel::Error, LogLevel::Warning, LogLevel::Info, LogLevel::Debug];
}
word_enum!(RuleAction { Allow => "allow", Deny => "deny" });
word_enum!(RuleDirection { In => "in", Out => "out" });
word_enum!(Protocol { Tcp => "tcp", Udp => "udp", Any => "any" });

fn percent<R>(v: &Value, _: &R) -> String {
    match v {
        Value::Float(f) => format!("{f:.1}%"),
        other => other.to_string(),
    }
}

fn bytes<R>(v: &Value, _: &R) -> String {
    match v {
        Value::Int(n) => human_size(u64::try_from(*n).unwrap_or(0)),
        other => other.to_string(),
    }
}

fn yes_no<R>(v: &Value, _: &R) -> String {
    match v {
        Value::Bool(true) => "yes".into(),
        Value::Bool(false) => "no".into(),
        other => other.to_string(),
    }
}

fn megabytes<R>(v: &Value, _: &R) -> String {
    match v {
        Value::Float(mb) => format!("{mb:.0} MB"),
        other => other.to_string(),
    }
}

fn date_only<R>(v: &Value, _: &R) -> String {
    match v {
        Value::Time(t) => t.format("%Y-%m-%d").to_string(),
        other => other.to_string(),
    }
}

// ───────────────────────────────────────── processes ─────────

#[derive(Debug, Clone, PartialEq)]
pub struct Process {
    pub pid: u32,
    pub name: String,
    pub user: String,
    /// CPU usage in percent.
    pub cpu: f64,
    /// Memory usage in percent.
    pub memory: f64,
    pub status: String,
    pub command: String,
    pub start_time: NaiveDateTime,
}

impl Row for Process {
    fn field(&self, name: &str) -> Option<Value> {
        Some(match name {
            "pid" => self.pid.into(),
            "name" => self.name.as_str().into(),
            "user" => self.user.as_str().into(),
            "cpu" => self.cpu.into(),
            "memory" => self.memory.into(),
            "status" => self.status.as_str().into(),
            "command" => self.command.as_str().into(),
            "start_time" => self.start_time.into(),
            _ => return None,
        })
    }
}

impl Process {
    pub fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("pid", "PID").width(7).right(),
            Column::new("name", "Name").width(14),
            Column::new("user", "User").width(10),
            Column::new("cpu", "CPU").width(7).right().format_with(percent),
            Column::new("memory", "Mem").width(7).right().format_with(percent),
            Column::new("status", "Status").width(9),
            Column::new("command", "Command").width(24).unsortable(),
            Column::new("start_time", "Started").width(19),
        ]
    }
}

// ───────────────────────────────────────── services ──────────

#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub name: String,
    pub status: ServiceStatus,
    pub enabled: bool,
    pub port: Option<u16>,
    /// Resident memory in MB.
    pub memory: f64,
    pub cpu: f64,
}

impl Row for Service {
    fn field(&self, name: &str) -> Option<Value> {
        Some(match name {
            "name" => self.name.as_str().into(),
            "status" => self.status.as_str().into(),
            "enabled" => self.enabled.into(),
            "port" => self.port?.into(),
            "memory" => self.memory.into(),
            "cpu" => self.cpu.into(),
            _ => return None,
        })
    }
}

impl Service {
    pub fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("name", "Service").width(12),
            Column::new("status", "Status").width(9),
            Column::new("enabled", "Boot").width(5).format_with(yes_no),
            Column::new("port", "Port").width(6).right(),
            Column::new("memory", "Memory").width(9).right().format_with(megabytes),
            Column::new("cpu", "CPU").width(7).right().format_with(percent),
        ]
    }
}

// ───────────────────────────────────────── files ─────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Directory => "directory",
        }
    }
}

/// Metadata for one entry of the virtual file system.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    pub kind: EntryKind,
    pub size: u64,
    /// `ls -l` style, e.g. `"drwxr-xr-x"`.
    pub permissions: String,
    pub owner: String,
    pub group: String,
    pub modified: NaiveDateTime,
}

impl FileEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("name", "Name")
                .width(20)
                .compare_with(dirs_first_by_name),
            Column::new("size", "Size").width(9).right().format_with(bytes),
            Column::new("permissions", "Perms").width(10),
            Column::new("owner", "Owner").width(9),
            Column::new("group", "Group").width(9),
            Column::new("modified", "Modified").width(19),
        ]
    }
}

/// Directories before files, then case-insensitive name.
fn dirs_first_by_name(a: &FileEntry, b: &FileEntry) -> Ordering {
    b.is_dir()
        .cmp(&a.is_dir())
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}

impl Row for FileEntry {
    fn field(&self, name: &str) -> Option<Value> {
        Some(match name {
            "name" => self.name.as_str().into(),
            "path" => self.path.as_str().into(),
            "type" => self.kind.as_str().into(),
            "size" => self.size.into(),
            "permissions" => self.permissions.as_str().into(),
            "owner" => self.owner.as_str().into(),
            "group" => self.group.as_str().into(),
            "modified" => self.modified.into(),
            _ => return None,
        })
    }
}

// ───────────────────────────────────────── users ─────────────

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    pub last_login: Option<NaiveDateTime>,
    pub created: NaiveDateTime,
    pub shell: String,
    pub home: String,
}

impl Row for User {
    fn field(&self, name: &str) -> Option<Value> {
        Some(match name {
            "id" => self.id.into(),
            "username" => self.username.as_str().into(),
            "email" => self.email.as_str().into(),
            "role" => self.role.as_str().into(),
            "status" => self.status.as_str().into(),
            "last_login" => self.last_login?.into(),
            "created" => self.created.into(),
            "shell" => self.shell.as_str().into(),
            "home" => self.home.as_str().into(),
            _ => return None,
        })
    }
}

impl User {
    pub fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("username", "Username").width(12),
            Column::new("email", "Email").width(24),
            Column::new("role", "Role").width(7),
            Column::new("status", "Status").width(9),
            Column::new("last_login", "Last login")
                .width(19)
                .placeholder("Never"),
            Column::new("created", "Created").width(10).format_with(date_only),
            Column::new("shell", "Shell").width(18),
        ]
    }
}

// ───────────────────────────────────────── logs ──────────────

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: NaiveDateTime,
    pub level: LogLevel,
    pub source: String,
    pub message: String,
}

impl Row for LogEntry {
    fn field(&self, name: &str) -> Option<Value> {
        Some(match name {
            "timestamp" => self.timestamp.into(),
            "level" => self.level.as_str().into(),
            "source" => self.source.as_str().into(),
            "message" => self.message.as_str().into(),
            _ => return None,
        })
    }
}

impl LogEntry {
    pub fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("timestamp", "Time").width(19),
            Column::new("level", "Level").width(7).compare_with(by_severity),
            Column::new("source", "Source").width(9),
            Column::new("message", "Message").width(40).unsortable(),
        ]
    }
}

fn by_severity(a: &LogEntry, b: &LogEntry) -> Ordering {
    severity(a.level).cmp(&severity(b.level))
}

fn severity(level: LogLevel) -> u8 {
    match level {
        LogLevel::Debug => 0,
        LogLevel::Info => 1,
        LogLevel::Warning => 2,
        LogLevel::Error => 3,
    }
}

/// A log file the viewer can switch between.
#[derive(Debug, Clone, PartialEq)]
pub struct LogFile {
    pub name: &'static str,
    pub path: &'static str,
    pub size: u64,
}

// ───────────────────────────────────────── firewall ──────────

#[derive(Debug, Clone, PartialEq)]
pub struct FirewallRule {
    pub id: u64,
    pub action: RuleAction,
    pub direction: RuleDirection,
    pub protocol: Protocol,
    /// `"80"`, `"8080:8090"` or `"any"`.
    pub port: String,
    pub source: String,
    pub destination: String,
    pub description: String,
    pub enabled: bool,
}

impl Row for FirewallRule {
    fn field(&self, name: &str) -> Option<Value> {
        Some(match name {
            "action" => self.action.as_str().into(),
            "direction" => self.direction.as_str().into(),
            "protocol" => self.protocol.as_str().into(),
            "port" => self.port.as_str().into(),
            "source" => self.source.as_str().into(),
            "destination" => self.destination.as_str().into(),
            "description" => self.description.as_str().into(),
            "enabled" => self.enabled.into(),
            _ => return None,
        })
    }
}

impl FirewallRule {
    pub fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("action", "Action").width(6),
            Column::new("direction", "Dir").width(4),
            Column::new("protocol", "Proto").width(5),
            Column::new("port", "Port").width(10).compare_with(by_port),
            Column::new("source", "Source").width(12),
            Column::new("destination", "Destination").width(12),
            Column::new("description", "Description").width(24),
            Column::new("enabled", "On").width(4).format_with(yes_no),
        ]
    }
}

fn by_port(a: &FirewallRule, b: &FirewallRule) -> Ordering {
    port_start(&a.port).cmp(&port_start(&b.port))
}

/// First port number of a port spec; `any` sorts last.
fn port_start(spec: &str) -> u32 {
    spec.split(':')
        .next()
        .and_then(|p| p.parse().ok())
        .unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SecurityStatus {
    pub firewall_enabled: bool,
    pub default_incoming: RuleAction,
    pub default_outgoing: RuleAction,
    pub active_rules: usize,
    pub blocked_attempts: u64,
}

// ───────────────────────────────────────── network ───────────

#[derive(Debug, Clone, PartialEq)]
pub struct NetInterface {
    pub name: String,
    pub ip_address: String,
    pub mac_address: String,
    pub up: bool,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    /// Current receive rate in MB/s.
    pub rx_speed: f64,
    pub tx_speed: f64,
}

impl Row for NetInterface {
    fn field(&self, name: &str) -> Option<Value> {
        Some(match name {
            "name" => self.name.as_str().into(),
            "ip_address" => self.ip_address.as_str().into(),
            "mac_address" => self.mac_address.as_str().into(),
            "status" => (if self.up { "up" } else { "down" }).into(),
            "rx_bytes" => self.rx_bytes.into(),
            "tx_bytes" => self.tx_bytes.into(),
            "rx_speed" => self.rx_speed.into(),
            "tx_speed" => self.tx_speed.into(),
            _ => return None,
        })
    }
}

fn mb_per_sec<R>(v: &Value, _: &R) -> String {
    match v {
        Value::Float(mb) => format_speed(mb * 1_048_576.0),
        other => other.to_string(),
    }
}

impl NetInterface {
    pub fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("name", "Iface").width(8),
            Column::new("ip_address", "IP").width(15),
            Column::new("mac_address", "MAC").width(17),
            Column::new("status", "State").width(5),
            Column::new("rx_bytes", "RX").width(9).right().format_with(bytes),
            Column::new("tx_bytes", "TX").width(9).right().format_with(bytes),
            Column::new("rx_speed", "RX rate").width(10).right().format_with(mb_per_sec),
            Column::new("tx_speed", "TX rate").width(10).right().format_with(mb_per_sec),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub protocol: String,
    pub local_address: String,
    pub local_port: u16,
    pub remote_address: String,
    pub remote_port: u16,
    pub state: String,
    pub process: String,
    pub pid: u32,
}

impl Row for Connection {
    fn field(&self, name: &str) -> Option<Value> {
        Some(match name {
            "protocol" => self.protocol.as_str().into(),
            "local" => format!("{}:{}", self.local_address, self.local_port).into(),
            "local_port" => self.local_port.into(),
            "remote" => format!("{}:{}", self.remote_address, self.remote_port).into(),
            "state" => self.state.as_str().into(),
            "process" => self.process.as_str().into(),
            "pid" => self.pid.into(),
            _ => return None,
        })
    }
}

fn by_local_port(a: &Connection, b: &Connection) -> Ordering {
    a.local_port.cmp(&b.local_port)
}

impl Connection {
    pub fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("protocol", "Proto").width(5),
            Column::new("local", "Local").width(21).compare_with(by_local_port),
            Column::new("remote", "Remote").width(21),
            Column::new("state", "State").width(11),
            Column::new("process", "Process").width(10),
            Column::new("pid", "PID").width(6).right(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListeningPort {
    pub port: u16,
    pub protocol: String,
    pub service: String,
    pub pid: u32,
    pub process: String,
    pub address: String,
}

impl Row for ListeningPort {
    fn field(&self, name: &str) -> Option<Value> {
        Some(match name {
            "port" => self.port.into(),
            "protocol" => self.protocol.as_str().into(),
            "service" => self.service.as_str().into(),
            "pid" => self.pid.into(),
            "process" => self.process.as_str().into(),
            "address" => self.address.as_str().into(),
            _ => return None,
        })
    }
}

impl ListeningPort {
    pub fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("port", "Port").width(6).right(),
            Column::new("protocol", "Proto").width(5),
            Column::new("service", "Service").width(11),
            Column::new("address", "Address").width(15),
            Column::new("process", "Process").width(12),
            Column::new("pid", "PID").width(6).right(),
        ]
    }
}

// ───────────────────────────────────────── server ────────────

/// Static facts and current load of the (mock) host.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerInfo {
    pub hostname: String,
    pub timezone: String,
    pub os: String,
    pub kernel: String,
    pub uptime_secs: u64,
    pub cpu_model: String,
    pub cpu_cores: u32,
    pub cpu_usage: f64,
    pub cpu_temp: f64,
    /// Memory figures in GB.
    pub memory_total: f64,
    pub memory_used: f64,
    pub swap_total: f64,
    pub swap_used: f64,
    /// Disk figures in GB.
    pub disk_total: f64,
    pub disk_used: f64,
    /// Network rates in MB/s.
    pub net_down: f64,
    pub net_up: f64,
}

impl ServerInfo {
    pub fn memory_percentage(&self) -> f64 {
        ratio_pct(self.memory_used, self.memory_total)
    }

    pub fn disk_percentage(&self) -> f64 {
        ratio_pct(self.disk_used, self.disk_total)
    }

    pub fn swap_percentage(&self) -> f64 {
        ratio_pct(self.swap_used, self.swap_total)
    }
}

fn ratio_pct(used: f64, total: f64) -> f64 {
    if total <= 0.0 {
        0.0
    } else {
        (used / total * 100.0).clamp(0.0, 100.0)
    }
}

/// A one-shot button on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct QuickAction {
    pub name: &'static str,
    pub description: &'static str,
    /// Needs a confirmation before it runs.
    pub dangerous: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::table::{compute_view, SortDirection, SortKey, ViewState};

    fn entry(name: &str, kind: EntryKind) -> FileEntry {
        FileEntry {
            name: name.into(),
            path: format!("/{name}"),
            kind,
            size: 0,
            permissions: "-rw-r--r--".into(),
            owner: "root".into(),
            group: "root".into(),
            modified: NaiveDateTime::default(),
        }
    }

    #[test]
    fn word_enums_round_trip_through_text() {
        for role in [Role::Admin, Role::User, Role::Viewer] {
            assert_eq!(role.as_str().parse(), Ok(role));
        }
        assert_eq!(" TCP ".parse(), Ok(Protocol::Tcp));
        assert_eq!(
            "reject".parse::<RuleAction>(),
            Err(UnknownWord("reject".into()))
        );
    }

    #[test]
    fn file_names_sort_directories_first() {
        let rows = vec![
            entry("b.txt", EntryKind::File),
            entry("zeta", EntryKind::Directory),
            entry("A.txt", EntryKind::File),
            entry("alpha", EntryKind::Directory),
        ];
        let mut state = ViewState::default();
        state.sort = Some(SortKey::ascending("name"));
        let view = compute_view(&rows, &FileEntry::columns(), &state);
        let names: Vec<&str> = view.rows.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["alpha", "zeta", "A.txt", "b.txt"]);
    }

    #[test]
    fn missing_port_is_absent() {
        let svc = Service {
            name: "docker".into(),
            status: ServiceStatus::Running,
            enabled: true,
            port: None,
            memory: 890.0,
            cpu: 12.5,
        };
        assert_eq!(svc.field("port"), None);
        assert_eq!(Service::columns()[3].display(&svc), "-");
        assert_eq!(Service::columns()[4].display(&svc), "890 MB");
    }

    #[test]
    fn firewall_ports_sort_numerically_with_any_last() {
        assert!(port_start("22") < port_start("8080:8090"));
        assert!(port_start("8080:8090") < port_start("any"));
    }

    #[test]
    fn log_levels_sort_by_severity() {
        let mk = |id, level| LogEntry {
            id,
            timestamp: NaiveDateTime::default(),
            level,
            source: "kernel".into(),
            message: String::new(),
        };
        let rows = vec![mk(1, LogLevel::Info), mk(2, LogLevel::Error), mk(3, LogLevel::Debug)];
        let mut state = ViewState::default();
        state.sort = Some(SortKey {
            field: "level".into(),
            direction: SortDirection::Descending,
        });
        let view = compute_view(&rows, &LogEntry::columns(), &state);
        let ids: Vec<u64> = view.rows.iter().map(|e| e.id).collect();
        assert_eq!(ids, [2, 1, 3]);
    }

    #[test]
    fn server_percentages() {
        let info = ServerInfo {
            hostname: "h".into(),
            timezone: "UTC".into(),
            os: String::new(),
            kernel: String::new(),
            uptime_secs: 0,
            cpu_model: String::new(),
            cpu_cores: 8,
            cpu_usage: 23.5,
            cpu_temp: 45.0,
            memory_total: 16.0,
            memory_used: 6.2,
            swap_total: 0.0,
            swap_used: 0.0,
            disk_total: 500.0,
            disk_used: 234.0,
            net_down: 0.0,
            net_up: 0.0,
        };
        assert!((info.memory_percentage() - 38.75).abs() < 1e-9);
        assert!((info.disk_percentage() - 46.8).abs() < 1e-9);
        assert_eq!(info.swap_percentage(), 0.0);
    }
}
