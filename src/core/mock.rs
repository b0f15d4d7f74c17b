//! Mock data for every page.
//!
//! Fixed tables mirror a small web/database host.  Logs are generated from a
//! seedable RNG so tests can pin the output.

use chrono::{Duration, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::records::{
    Connection, FirewallRule, ListeningPort, LogEntry, LogFile, LogLevel, NetInterface, Process,
    Protocol, QuickAction, Role, RuleAction, RuleDirection, SecurityStatus, ServerInfo, Service,
    ServiceStatus, User, UserStatus,
};
use super::table::TIME_FORMAT;

/// Maximum number of entries the log viewer keeps.
pub const LOG_CAPACITY: usize = 100;

/// Parse a fixed `YYYY-MM-DD HH:MM:SS` timestamp from the tables below.
pub fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, TIME_FORMAT).unwrap_or_default()
}

// ───────────────────────────────────────── server ────────────

pub fn server_info() -> ServerInfo {
    ServerInfo {
        hostname: "srvdash-host".into(),
        timezone: "America/New_York".into(),
        os: "Ubuntu 24.04 LTS".into(),
        kernel: "6.5.0-35-generic".into(),
        uptime_secs: 1_234_567,
        cpu_model: "Intel Xeon E5-2680 v4".into(),
        cpu_cores: 8,
        cpu_usage: 23.5,
        cpu_temp: 45.0,
        memory_total: 16.0,
        memory_used: 6.2,
        swap_total: 8.0,
        swap_used: 0.5,
        disk_total: 500.0,
        disk_used: 234.0,
        net_down: 45.3,
        net_up: 12.5,
    }
}

/// Timezones offered by the server settings form.
pub const TIMEZONES: &[&str] = &[
    "America/New_York",
    "America/Chicago",
    "America/Denver",
    "America/Los_Angeles",
    "Europe/London",
    "Europe/Paris",
    "Europe/Berlin",
    "Asia/Tokyo",
    "Asia/Shanghai",
    "Asia/Singapore",
    "Australia/Sydney",
    "UTC",
];

/// Fresh `(cpu %, memory MB)` for a service that has just been started.
pub fn service_load(rng: &mut impl Rng) -> (f64, f64) {
    (rng.random_range(0.0..10.0), rng.random_range(50.0..250.0))
}

pub fn services() -> Vec<Service> {
    let svc = |name: &str, status, enabled, port, memory, cpu| Service {
        name: name.into(),
        status,
        enabled,
        port,
        memory,
        cpu,
    };
    use ServiceStatus::*;
    vec![
        svc("nginx", Running, true, Some(80), 45.0, 2.3),
        svc("mysql", Running, true, Some(3306), 512.0, 8.7),
        svc("redis", Running, true, Some(6379), 128.0, 1.2),
        svc("php-fpm", Running, true, Some(9000), 256.0, 3.5),
        svc("postgresql", Stopped, false, Some(5432), 0.0, 0.0),
        svc("docker", Running, true, None, 890.0, 12.5),
    ]
}

pub fn quick_actions() -> Vec<QuickAction> {
    let qa = |name, description, dangerous| QuickAction {
        name,
        description,
        dangerous,
    };
    vec![
        qa("Restart Server", "Restart the server", true),
        qa("Clear Cache", "Clear system cache", false),
        qa("Update System", "Run system updates", false),
        qa("Backup Now", "Create a backup", false),
        qa("View Logs", "View system logs", false),
        qa("Security Scan", "Run security scan", false),
    ]
}

// ───────────────────────────────────────── processes ─────────

pub fn processes() -> Vec<Process> {
    let p = |pid, name: &str, user: &str, cpu, memory, status: &str, command: &str, start: &str| {
        Process {
            pid,
            name: name.into(),
            user: user.into(),
            cpu,
            memory,
            status: status.into(),
            command: command.into(),
            start_time: at(start),
        }
    };
    vec![
        p(1, "systemd", "root", 0.1, 0.5, "running", "/sbin/init", "2024-01-01 00:00:00"),
        p(2, "kthreadd", "root", 0.0, 0.0, "running", "[kthreadd]", "2024-01-01 00:00:00"),
        p(456, "nginx", "www-data", 2.3, 1.2, "running", "nginx: master process /usr/sbin/nginx", "2024-01-15 10:30:00"),
        p(457, "nginx", "www-data", 0.5, 0.8, "running", "nginx: worker process", "2024-01-15 10:30:00"),
        p(789, "mysqld", "mysql", 8.7, 12.5, "running", "/usr/sbin/mysqld", "2024-01-15 10:31:00"),
        p(1234, "node", "deploy", 15.2, 8.3, "running", "node /var/www/app/server.js", "2024-01-20 14:00:00"),
        p(1567, "redis-server", "redis", 1.2, 2.1, "running", "/usr/bin/redis-server 127.0.0.1:6379", "2024-01-15 10:32:00"),
        p(2345, "postgres", "postgres", 0.0, 3.2, "sleeping", "postgres: checkpointer", "2024-01-15 10:33:00"),
        p(3456, "sshd", "root", 0.0, 0.3, "running", "sshd: /usr/sbin/sshd -D", "2024-01-01 00:01:00"),
        p(4567, "cron", "root", 0.0, 0.1, "running", "/usr/sbin/cron -f", "2024-01-01 00:01:00"),
        p(5678, "docker", "root", 5.4, 6.2, "running", "/usr/bin/dockerd -H fd://", "2024-01-15 10:35:00"),
        p(6789, "containerd", "root", 2.1, 1.8, "running", "/usr/bin/containerd", "2024-01-15 10:35:00"),
        p(7890, "php-fpm", "www-data", 3.5, 4.2, "running", "php-fpm: pool www", "2024-01-15 10:36:00"),
        p(8901, "fail2ban", "root", 0.1, 0.4, "running", "/usr/bin/python3 /usr/bin/fail2ban-server", "2024-01-15 10:37:00"),
        p(9012, "rsyslogd", "syslog", 0.0, 0.2, "running", "/usr/sbin/rsyslogd -n", "2024-01-01 00:01:00"),
    ]
}

// ───────────────────────────────────────── users ─────────────

/// Login shells offered in the user form.
pub const SHELLS: &[&str] = &["/bin/bash", "/bin/sh", "/bin/zsh", "/usr/sbin/nologin", "/bin/false"];

pub fn users() -> Vec<User> {
    let u = |id, username: &str, email: &str, role, status, last: Option<&str>, created: &str, shell: &str, home: &str| {
        User {
            id,
            username: username.into(),
            email: email.into(),
            role,
            status,
            last_login: last.map(at),
            created: at(&format!("{created} 00:00:00")),
            shell: shell.into(),
            home: home.into(),
        }
    };
    use UserStatus::*;
    vec![
        u(1, "root", "root@srvdash.local", Role::Admin, Active, Some("2024-01-20 15:30:00"), "2024-01-01", "/bin/bash", "/root"),
        u(2, "admin", "admin@srvdash.local", Role::Admin, Active, Some("2024-01-20 14:00:00"), "2024-01-05", "/bin/bash", "/home/admin"),
        u(3, "deploy", "deploy@srvdash.local", Role::User, Active, Some("2024-01-20 10:00:00"), "2024-01-10", "/bin/bash", "/home/deploy"),
        u(4, "www-data", "www-data@srvdash.local", Role::User, Active, None, "2024-01-01", "/usr/sbin/nologin", "/var/www"),
        u(5, "mysql", "mysql@srvdash.local", Role::User, Active, None, "2024-01-01", "/bin/false", "/var/lib/mysql"),
        u(6, "viewer", "viewer@example.com", Role::Viewer, Inactive, Some("2024-01-15 09:00:00"), "2024-01-12", "/bin/bash", "/home/viewer"),
    ]
}

// ───────────────────────────────────────── firewall ──────────

pub fn firewall_rules() -> Vec<FirewallRule> {
    let r = |id, action, direction, protocol, port: &str, source: &str, description: &str| {
        FirewallRule {
            id,
            action,
            direction,
            protocol,
            port: port.into(),
            source: source.into(),
            destination: "any".into(),
            description: description.into(),
            enabled: true,
        }
    };
    use Protocol::*;
    use RuleAction::*;
    use RuleDirection::*;
    vec![
        r(1, Allow, In, Tcp, "22", "any", "SSH access"),
        r(2, Allow, In, Tcp, "80", "any", "HTTP web server"),
        r(3, Allow, In, Tcp, "443", "any", "HTTPS web server"),
        r(4, Allow, In, Tcp, "3306", "10.0.0.0/8", "MySQL from internal network"),
        r(5, Deny, In, Any, "23", "any", "Block Telnet"),
        r(6, Allow, Out, Any, "any", "any", "Allow all outgoing"),
    ]
}

pub fn security_status() -> SecurityStatus {
    SecurityStatus {
        firewall_enabled: true,
        default_incoming: RuleAction::Deny,
        default_outgoing: RuleAction::Allow,
        active_rules: 6,
        blocked_attempts: 1234,
    }
}

// ───────────────────────────────────────── network ───────────

pub fn interfaces() -> Vec<NetInterface> {
    let i = |name: &str, ip: &str, mac: &str, rx_bytes, tx_bytes, rx_speed, tx_speed| NetInterface {
        name: name.into(),
        ip_address: ip.into(),
        mac_address: mac.into(),
        up: true,
        rx_bytes,
        tx_bytes,
        rx_speed,
        tx_speed,
    };
    vec![
        i("eth0", "192.168.1.100", "00:1A:2B:3C:4D:5E", 15_728_640_000, 2_621_440_000, 45.3, 12.5),
        i("eth1", "10.0.0.1", "00:1A:2B:3C:4D:5F", 1_073_741_824, 536_870_912, 5.2, 2.1),
        i("lo", "127.0.0.1", "00:00:00:00:00:00", 524_288_000, 524_288_000, 0.1, 0.1),
        i("docker0", "172.17.0.1", "02:42:8E:4F:2A:1B", 268_435_456, 134_217_728, 1.5, 0.8),
    ]
}

pub fn connections() -> Vec<Connection> {
    let c = |local: &str, lport, remote: &str, rport, state: &str, process: &str, pid| Connection {
        protocol: "TCP".into(),
        local_address: local.into(),
        local_port: lport,
        remote_address: remote.into(),
        remote_port: rport,
        state: state.into(),
        process: process.into(),
        pid,
    };
    vec![
        c("0.0.0.0", 22, "192.168.1.50", 52431, "ESTABLISHED", "sshd", 1234),
        c("0.0.0.0", 80, "203.0.113.45", 43521, "ESTABLISHED", "nginx", 456),
        c("0.0.0.0", 443, "198.51.100.23", 58321, "ESTABLISHED", "nginx", 456),
        c("127.0.0.1", 3306, "127.0.0.1", 42156, "ESTABLISHED", "node", 1567),
        c("0.0.0.0", 22, "10.0.0.50", 38421, "TIME_WAIT", "sshd", 1234),
    ]
}

pub fn listening_ports() -> Vec<ListeningPort> {
    let l = |port, service: &str, pid, process: &str, address: &str| ListeningPort {
        port,
        protocol: "TCP".into(),
        service: service.into(),
        pid,
        process: process.into(),
        address: address.into(),
    };
    vec![
        l(22, "SSH", 1234, "sshd", "0.0.0.0"),
        l(80, "HTTP", 456, "nginx", "0.0.0.0"),
        l(443, "HTTPS", 456, "nginx", "0.0.0.0"),
        l(3000, "Node.js", 1567, "node", "0.0.0.0"),
        l(3306, "MySQL", 789, "mysqld", "127.0.0.1"),
        l(5432, "PostgreSQL", 890, "postgres", "127.0.0.1"),
        l(6379, "Redis", 901, "redis-server", "127.0.0.1"),
        l(9000, "PHP-FPM", 1012, "php-fpm", "127.0.0.1"),
    ]
}

// ───────────────────────────────────────── logs ──────────────

pub fn log_files() -> Vec<LogFile> {
    vec![
        LogFile { name: "syslog", path: "/var/log/syslog", size: 15_728_640 },
        LogFile { name: "auth.log", path: "/var/log/auth.log", size: 2_097_152 },
        LogFile { name: "nginx/access.log", path: "/var/log/nginx/access.log", size: 52_428_800 },
        LogFile { name: "nginx/error.log", path: "/var/log/nginx/error.log", size: 1_048_576 },
        LogFile { name: "mysql/error.log", path: "/var/log/mysql/error.log", size: 524_288 },
        LogFile { name: "fail2ban.log", path: "/var/log/fail2ban.log", size: 262_144 },
    ]
}

const LOG_SOURCES: &[&str] = &["nginx", "sshd", "systemd", "kernel", "mysql", "cron", "fail2ban"];

/// Weighted pick: info is three times as common as the other levels.
const LEVEL_WEIGHTS: &[LogLevel] = &[
    LogLevel::Error,
    LogLevel::Warning,
    LogLevel::Info,
    LogLevel::Info,
    LogLevel::Info,
    LogLevel::Debug,
];

fn messages(level: LogLevel) -> &'static [&'static str] {
    match level {
        LogLevel::Error => &[
            "Connection refused: unable to connect to upstream server",
            "Failed password for invalid user admin from 192.168.1.100",
            "Out of memory: Kill process 1234 (node) score 500",
            "Permission denied while accessing /var/www/html",
            "MySQL server has gone away",
        ],
        LogLevel::Warning => &[
            "High CPU usage detected (85%)",
            "Disk space running low on /dev/sda1 (90% used)",
            "Connection pool exhausted, queuing requests",
            "SSL certificate expires in 7 days",
            "Rate limit exceeded for IP 203.0.113.45",
        ],
        LogLevel::Info => &[
            "Started nginx web server",
            "Accepted publickey for user deploy from 192.168.1.50",
            "Backup completed successfully",
            "System update available: 12 packages can be upgraded",
            "New connection from 10.0.0.25:45678",
        ],
        LogLevel::Debug => &[
            "Processing request GET /api/status",
            "Cache hit for key user:1234",
            "Executing query: SELECT * FROM users",
            "Memory usage: 4.2GB / 16GB",
            "Request completed in 45ms",
        ],
    }
}

/// Produces log entries, newest first, with monotonically increasing ids.
pub struct LogGenerator {
    rng: StdRng,
    next_id: u64,
}

impl LogGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng, next_id: 0 }
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.rng.random_range(0..items.len())]
    }

    /// One entry stamped `timestamp` with a weighted random level.
    pub fn entry(&mut self, timestamp: NaiveDateTime) -> LogEntry {
        let level = *self.pick(LEVEL_WEIGHTS);
        let source = (*self.pick(LOG_SOURCES)).to_string();
        let message = (*self.pick(messages(level))).to_string();
        let id = self.next_id;
        self.next_id += 1;
        LogEntry {
            id,
            timestamp,
            level,
            source,
            message,
        }
    }

    /// A live entry for auto-refresh: levels are uniform and only the five
    /// busiest sources appear.
    pub fn live_entry(&mut self, now: NaiveDateTime) -> LogEntry {
        let level = *self.pick(LogLevel::ALL);
        let source = (*self.pick(&LOG_SOURCES[..5])).to_string();
        let message = (*self.pick(messages(level))).to_string();
        let id = self.next_id;
        self.next_id += 1;
        LogEntry {
            id,
            timestamp: now,
            level,
            source,
            message,
        }
    }

    /// A full page of history: entry `i` lies roughly `i * 30s` before `now`.
    pub fn history(&mut self, now: NaiveDateTime) -> Vec<LogEntry> {
        (0..LOG_CAPACITY)
            .map(|i| {
                let jitter = self.rng.random_range(0..60_000);
                let offset = Duration::milliseconds(i as i64 * 30_000 + jitter);
                self.entry(now - offset)
            })
            .collect()
    }
}
