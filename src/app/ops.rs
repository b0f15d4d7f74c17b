//! Simulated server operations.
//!
//! Every mutation the dashboard offers is an [`Op`].  The handler queues it,
//! a tokio task sleeps for the op's delay and sends it back, and [`apply`]
//! performs the in-memory change and raises a toast.

use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use tokio::sync::mpsc::UnboundedSender;

use crate::core::mock;
use crate::core::notify::Variant;
use crate::core::records::{
    EntryKind, FirewallRule, Protocol, Role, RuleAction, RuleDirection, ServiceStatus, User,
    UserStatus,
};

use super::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceCommand {
    Start,
    Stop,
    Restart,
}

impl ServiceCommand {
    fn progressive(self) -> &'static str {
        match self {
            ServiceCommand::Start => "Starting",
            ServiceCommand::Stop => "Stopping",
            ServiceCommand::Restart => "Restarting",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            ServiceCommand::Start => "start",
            ServiceCommand::Stop => "stop",
            ServiceCommand::Restart => "restart",
        }
    }

    fn past(self) -> &'static str {
        match self {
            ServiceCommand::Start => "started",
            ServiceCommand::Stop => "stopped",
            ServiceCommand::Restart => "restarted",
        }
    }
}

/// Validated input for a new firewall rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDraft {
    pub action: RuleAction,
    pub direction: RuleDirection,
    pub protocol: Protocol,
    pub port: String,
    pub source: String,
    pub destination: String,
    pub description: String,
}

/// Validated account fields shared by create and edit.
#[derive(Debug, Clone, PartialEq)]
pub struct UserDraft {
    pub username: String,
    pub email: String,
    pub role: Role,
    pub shell: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Service { name: String, command: ServiceCommand },
    Reboot,
    Shutdown,
    SaveServerSettings { hostname: String, timezone: String },
    KillProcess { pid: u32, name: String },
    RefreshProcesses,
    RefreshNetwork,
    /// Switch the log viewer to `log_files[file]`.
    LoadLogs { file: usize },
    /// File edits carry the directory they were requested in, since the
    /// user may browse elsewhere before the op lands.
    CreateEntry { dir: String, name: String, kind: EntryKind },
    Rename { dir: String, from: String, to: String },
    Remove { dir: String, name: String },
    Chmod { dir: String, name: String, mode: String },
    ToggleFirewall,
    AddRule(RuleDraft),
    DeleteRule { id: u64 },
    CreateUser(UserDraft),
    UpdateUser { id: u64, draft: UserDraft },
    DeleteUser { id: u64, username: String },
    ChangePassword { username: String },
}

impl Op {
    pub fn delay(&self) -> Duration {
        let ms = match self {
            Op::Service { .. } => 1500,
            Op::Reboot | Op::Shutdown => 2000,
            Op::RefreshProcesses | Op::CreateEntry { .. } | Op::Rename { .. } => 800,
            Op::Remove { .. } | Op::Chmod { .. } => 800,
            Op::RefreshNetwork => 600,
            Op::LoadLogs { .. } => 500,
            _ => 1000,
        };
        Duration::from_millis(ms)
    }

    /// Shown next to the spinner while the op is in flight.
    pub fn label(&self) -> String {
        match self {
            Op::Service { name, command } => format!("{} {name}", command.progressive()),
            Op::Reboot => "Rebooting server".into(),
            Op::Shutdown => "Shutting down server".into(),
            Op::SaveServerSettings { .. } => "Saving server settings".into(),
            Op::KillProcess { pid, name } => format!("Killing {name} ({pid})"),
            Op::RefreshProcesses => "Refreshing processes".into(),
            Op::RefreshNetwork => "Refreshing network data".into(),
            Op::LoadLogs { .. } => "Loading logs".into(),
            Op::CreateEntry { name, .. } => format!("Creating {name}"),
            Op::Rename { from, .. } => format!("Renaming {from}"),
            Op::Remove { name, .. } => format!("Deleting {name}"),
            Op::Chmod { name, .. } => format!("Changing permissions of {name}"),
            Op::ToggleFirewall => "Updating firewall".into(),
            Op::AddRule(_) => "Adding rule".into(),
            Op::DeleteRule { .. } => "Deleting rule".into(),
            Op::CreateUser(draft) => format!("Creating user {}", draft.username),
            Op::UpdateUser { draft, .. } => format!("Updating user {}", draft.username),
            Op::DeleteUser { username, .. } => format!("Deleting user {username}"),
            Op::ChangePassword { username } => format!("Changing password for {username}"),
        }
    }
}

/// Sleep for the op's delay on the runtime, then hand it back for [`apply`].
pub fn spawn(op: Op, tx: UnboundedSender<Op>) {
    tokio::spawn(async move {
        tokio::time::sleep(op.delay()).await;
        let _ = tx.send(op);
    });
}

/// Finish an op: mutate the mock data, clear the busy marker and toast the
/// outcome.
pub fn apply(state: &mut AppState, op: Op) {
    state.pending = None;
    let label = op.label();
    match run(state, op) {
        Ok(Some((variant, message))) => {
            tracing::info!(op = %label, "{message}");
            state.toast(variant, message);
        }
        Ok(None) => tracing::info!(op = %label, "done"),
        Err(err) => {
            tracing::warn!(op = %label, "failed: {err:#}");
            state.toast(Variant::Error, format!("{err}"));
        }
    }
}

type Outcome = Option<(Variant, String)>;

fn success(message: String) -> Result<Outcome> {
    Ok(Some((Variant::Success, message)))
}

fn run(state: &mut AppState, op: Op) -> Result<Outcome> {
    match op {
        Op::Service { name, command } => {
            let (cpu, memory) = mock::service_load(&mut state.rng);
            let service = state
                .services
                .rows
                .iter_mut()
                .find(|s| s.name == name)
                .ok_or_else(|| anyhow!("Failed to {} {name}", command.verb()))?;
            match command {
                ServiceCommand::Start => {
                    service.status = ServiceStatus::Running;
                    service.cpu = cpu;
                    service.memory = memory;
                }
                ServiceCommand::Stop => {
                    service.status = ServiceStatus::Stopped;
                    service.cpu = 0.0;
                    service.memory = 0.0;
                }
                ServiceCommand::Restart => service.status = ServiceStatus::Running,
            }
            state.services.reclamp();
            success(format!("Service {name} {}", command.past()))
        }
        Op::Reboot => Ok(Some((
            Variant::Warning,
            "Server is rebooting... This may take a few minutes.".into(),
        ))),
        Op::Shutdown => Ok(Some((Variant::Warning, "Server is shutting down...".into()))),
        Op::SaveServerSettings { hostname, timezone } => {
            state.server.hostname = hostname;
            state.server.timezone = timezone;
            success("Server settings saved successfully".into())
        }
        Op::KillProcess { pid, name } => {
            let before = state.processes.rows.len();
            state.processes.retain(|p| p.pid != pid);
            if state.processes.rows.len() == before {
                bail!("Failed to kill process {pid}");
            }
            success(format!("Process {name} (PID: {pid}) terminated"))
        }
        Op::RefreshProcesses => {
            state.processes.set_rows(mock::processes());
            Ok(Some((Variant::Info, "Process list refreshed".into())))
        }
        Op::RefreshNetwork => {
            state.interfaces.set_rows(mock::interfaces());
            state.connections.set_rows(mock::connections());
            state.ports.set_rows(mock::listening_ports());
            Ok(Some((Variant::Info, "Network data refreshed".into())))
        }
        Op::LoadLogs { file } => {
            if file >= state.log_files.len() {
                bail!("Failed to fetch logs");
            }
            state.log_file = file;
            let now = state.wall_now();
            state.log_buffer = state.log_gen.history(now);
            state.sync_logs();
            Ok(None)
        }
        Op::CreateEntry { dir, name, kind } => {
            let now = state.wall_now();
            state.vfs.create(&dir, &name, kind, now)?;
            state.refresh_files();
            let noun = if kind == EntryKind::Directory { "Folder" } else { "File" };
            success(format!("{noun} \"{name}\" created"))
        }
        Op::Rename { dir, from, to } => {
            state.vfs.rename(&dir, &from, &to)?;
            state.refresh_files();
            success(format!("Renamed to \"{to}\""))
        }
        Op::Remove { dir, name } => {
            state.vfs.remove(&dir, &name)?;
            state.refresh_files();
            success(format!("\"{name}\" deleted"))
        }
        Op::Chmod { dir, name, mode } => {
            let mode = state.vfs.chmod(&dir, &name, &mode)?;
            state.refresh_files();
            success(format!("Permissions changed to {mode}"))
        }
        Op::ToggleFirewall => {
            let status = &mut state.security;
            status.firewall_enabled = !status.firewall_enabled;
            let word = if status.firewall_enabled { "enabled" } else { "disabled" };
            success(format!("Firewall {word}"))
        }
        Op::AddRule(draft) => {
            let id = state.next_rule_id();
            state.rules.rows.push(FirewallRule {
                id,
                action: draft.action,
                direction: draft.direction,
                protocol: draft.protocol,
                port: draft.port,
                source: draft.source,
                destination: draft.destination,
                description: draft.description,
                enabled: true,
            });
            state.rules.reclamp();
            state.security.active_rules += 1;
            success("Firewall rule added".into())
        }
        Op::DeleteRule { id } => {
            let before = state.rules.rows.len();
            state.rules.retain(|r| r.id != id);
            if state.rules.rows.len() == before {
                bail!("Failed to delete rule");
            }
            state.security.active_rules = state.security.active_rules.saturating_sub(1);
            success("Firewall rule deleted".into())
        }
        Op::CreateUser(draft) => {
            let id = state.next_user_id();
            let message = format!("User \"{}\" created successfully", draft.username);
            state.users.rows.push(User {
                id,
                home: format!("/home/{}", draft.username),
                username: draft.username,
                email: draft.email,
                role: draft.role,
                status: UserStatus::Active,
                last_login: None,
                created: state.wall_now(),
                shell: draft.shell,
            });
            state.users.reclamp();
            success(message)
        }
        Op::UpdateUser { id, draft } => {
            let user = state
                .users
                .rows
                .iter_mut()
                .find(|u| u.id == id)
                .ok_or_else(|| anyhow!("Failed to update user"))?;
            let message = format!("User \"{}\" updated successfully", draft.username);
            user.username = draft.username;
            user.email = draft.email;
            user.role = draft.role;
            user.shell = draft.shell;
            state.users.reclamp();
            success(message)
        }
        Op::DeleteUser { id, username } => {
            let before = state.users.rows.len();
            state.users.retain(|u| u.id != id);
            if state.users.rows.len() == before {
                bail!("Failed to delete user");
            }
            success(format!("User \"{username}\" deleted"))
        }
        Op::ChangePassword { username } => success(format!("Password changed for \"{username}\"")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::core::notify::Toast;

    fn state() -> AppState {
        AppState::new(AppConfig::default(), Some(11))
    }

    fn last_toast(state: &AppState) -> Option<&Toast> {
        state.toasts.iter().last()
    }

    fn service_status(state: &AppState, name: &str) -> Option<(ServiceStatus, f64)> {
        state
            .services
            .rows
            .iter()
            .find(|s| s.name == name)
            .map(|s| (s.status, s.cpu))
    }

    #[test]
    fn stopping_then_starting_a_service() {
        let mut s = state();
        apply(&mut s, Op::Service { name: "nginx".into(), command: ServiceCommand::Stop });
        assert_eq!(service_status(&s, "nginx"), Some((ServiceStatus::Stopped, 0.0)));
        assert_eq!(last_toast(&s).map(|t| t.message.as_str()), Some("Service nginx stopped"));

        apply(&mut s, Op::Service { name: "nginx".into(), command: ServiceCommand::Start });
        let (status, cpu) = service_status(&s, "nginx").unwrap();
        assert_eq!(status, ServiceStatus::Running);
        assert!((0.0..10.0).contains(&cpu));
    }

    #[test]
    fn unknown_service_raises_error_toast() {
        let mut s = state();
        apply(&mut s, Op::Service { name: "ghost".into(), command: ServiceCommand::Restart });
        assert_eq!(last_toast(&s).map(|t| t.variant), Some(Variant::Error));
    }

    #[test]
    fn kill_removes_the_process() {
        let mut s = state();
        let victim = s.processes.rows[0].clone();
        apply(&mut s, Op::KillProcess { pid: victim.pid, name: victim.name.clone() });
        assert!(s.processes.rows.iter().all(|p| p.pid != victim.pid));
        let expected = format!("Process {} (PID: {}) terminated", victim.name, victim.pid);
        assert_eq!(last_toast(&s).map(|t| t.message.clone()), Some(expected));

        apply(&mut s, Op::RefreshProcesses);
        assert_eq!(s.processes.rows.len(), mock::processes().len());
        assert_eq!(last_toast(&s).map(|t| t.variant), Some(Variant::Info));
    }

    #[test]
    fn rule_counters_follow_add_and_delete() {
        let mut s = state();
        let active = s.security.active_rules;
        apply(
            &mut s,
            Op::AddRule(RuleDraft {
                action: RuleAction::Allow,
                direction: RuleDirection::In,
                protocol: Protocol::Tcp,
                port: "8080".into(),
                source: "any".into(),
                destination: "any".into(),
                description: "Alt HTTP".into(),
            }),
        );
        assert_eq!(s.security.active_rules, active + 1);
        let added = s.rules.rows.last().cloned().unwrap();
        assert!(added.enabled);
        assert!(s.rules.rows[..s.rules.rows.len() - 1].iter().all(|r| r.id != added.id));

        apply(&mut s, Op::DeleteRule { id: added.id });
        assert_eq!(s.security.active_rules, active);
        assert_eq!(last_toast(&s).map(|t| t.message.as_str()), Some("Firewall rule deleted"));
    }

    #[test]
    fn firewall_toggle_flips_status() {
        let mut s = state();
        let was = s.security.firewall_enabled;
        apply(&mut s, Op::ToggleFirewall);
        assert_eq!(s.security.firewall_enabled, !was);
        assert!(s.pending.is_none());
    }

    #[test]
    fn created_user_gets_home_and_fresh_id() {
        let mut s = state();
        let draft = UserDraft {
            username: "ops".into(),
            email: "ops@example.com".into(),
            role: Role::Viewer,
            shell: "/bin/zsh".into(),
        };
        apply(&mut s, Op::CreateUser(draft));
        let user = s.users.rows.iter().find(|u| u.username == "ops").cloned().unwrap();
        assert_eq!(user.home, "/home/ops");
        assert_eq!(user.status, UserStatus::Active);
        assert!(user.last_login.is_none());
        assert_eq!(s.users.rows.iter().filter(|u| u.id == user.id).count(), 1);
        assert_eq!(
            last_toast(&s).map(|t| t.message.as_str()),
            Some("User \"ops\" created successfully")
        );
    }

    #[test]
    fn vfs_errors_surface_as_toasts() {
        let mut s = state();
        apply(&mut s, Op::Remove { dir: "/".into(), name: "does-not-exist".into() });
        let toast = last_toast(&s).unwrap();
        assert_eq!(toast.variant, Variant::Error);
        assert_eq!(toast.message, "\"does-not-exist\" not found");
    }

    #[test]
    fn file_ops_refresh_the_listing() {
        let mut s = state();
        let dir = || "/".to_string();
        apply(&mut s, Op::CreateEntry { dir: dir(), name: "notes.md".into(), kind: EntryKind::File });
        assert!(s.files.rows.iter().any(|f| f.name == "notes.md"));
        apply(&mut s, Op::Chmod { dir: dir(), name: "notes.md".into(), mode: "600".into() });
        assert_eq!(
            last_toast(&s).map(|t| t.message.as_str()),
            Some("Permissions changed to 0600")
        );
        apply(&mut s, Op::Rename { dir: dir(), from: "notes.md".into(), to: "todo.md".into() });
        assert!(s.files.rows.iter().any(|f| f.name == "todo.md"));
        assert!(s.files.rows.iter().all(|f| f.name != "notes.md"));
    }

    #[test]
    fn delays_match_the_operation() {
        assert_eq!(Op::Reboot.delay(), Duration::from_millis(2000));
        assert_eq!(Op::RefreshNetwork.delay(), Duration::from_millis(600));
        let remove = Op::Remove { dir: "/".into(), name: "x".into() };
        assert_eq!(remove.delay(), Duration::from_millis(800));
        assert_eq!(Op::ToggleFirewall.delay(), Duration::from_millis(1000));
    }
}
