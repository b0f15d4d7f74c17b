//! Modal input forms and their validation into [`Op`]s.
//!
//! A form is a list of labelled fields with one focused at a time.  Text
//! fields take typed characters; choice fields cycle through a fixed list.
//! [`submit`] validates the fields in order and stops at the first error.

use crate::core::mock::{SHELLS, TIMEZONES};
use crate::core::records::{EntryKind, FileEntry, Role, ServerInfo, User};
use crate::core::validate::{self, ValidationError};

use super::ops::{Op, RuleDraft, UserDraft};
use super::state::AppState;

const ENTRY_TYPES: &[&str] = &["file", "directory"];
const ROLES: &[&str] = &["admin", "user", "viewer"];
const ACTIONS: &[&str] = &["allow", "deny"];
const DIRECTIONS: &[&str] = &["in", "out"];
const PROTOCOLS: &[&str] = &["tcp", "udp", "any"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Typed like text, rendered masked.
    Secret,
    Choice(&'static [&'static str]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
    pub kind: FieldKind,
}

impl Field {
    fn text(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            kind: FieldKind::Text,
        }
    }

    fn secret(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            kind: FieldKind::Secret,
        }
    }

    fn choice(label: &'static str, options: &'static [&'static str], value: &str) -> Self {
        Self {
            label,
            value: value.to_string(),
            kind: FieldKind::Choice(options),
        }
    }

    /// What the form shows for this field.
    pub fn display(&self) -> String {
        match self.kind {
            FieldKind::Secret => "•".repeat(self.value.chars().count()),
            FieldKind::Choice(_) => format!("◂ {} ▸", self.value),
            FieldKind::Text => self.value.clone(),
        }
    }
}

/// What a form creates or edits, with the context it was opened for.
#[derive(Debug, Clone, PartialEq)]
pub enum FormKind {
    NewEntry,
    Rename { from: String },
    Chmod { name: String },
    AddRule,
    CreateUser,
    EditUser { id: u64 },
    Password { username: String },
    ServerSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    pub kind: FormKind,
    pub title: String,
    pub fields: Vec<Field>,
    pub focus: usize,
    /// Message from the last failed submit.
    pub error: Option<String>,
}

impl Form {
    fn new(kind: FormKind, title: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            kind,
            title: title.into(),
            fields,
            focus: 0,
            error: None,
        }
    }

    pub fn new_entry() -> Self {
        Self::new(
            FormKind::NewEntry,
            "Create New",
            vec![Field::choice("Type", ENTRY_TYPES, "file"), Field::text("Name", "")],
        )
    }

    pub fn rename(entry: &FileEntry) -> Self {
        Self::new(
            FormKind::Rename {
                from: entry.name.clone(),
            },
            format!("Rename {}", entry.name),
            vec![Field::text("New name", entry.name.clone())],
        )
    }

    pub fn chmod(entry: &FileEntry) -> Self {
        Self::new(
            FormKind::Chmod {
                name: entry.name.clone(),
            },
            format!("Permissions of {}", entry.name),
            vec![Field::text("Mode", octal(&entry.permissions))],
        )
    }

    pub fn add_rule() -> Self {
        Self::new(
            FormKind::AddRule,
            "Add Firewall Rule",
            vec![
                Field::choice("Action", ACTIONS, "allow"),
                Field::choice("Direction", DIRECTIONS, "in"),
                Field::choice("Protocol", PROTOCOLS, "tcp"),
                Field::text("Port", ""),
                Field::text("Source", "any"),
                Field::text("Destination", "any"),
                Field::text("Description", ""),
            ],
        )
    }

    pub fn create_user() -> Self {
        Self::new(
            FormKind::CreateUser,
            "Create User",
            vec![
                Field::text("Username", ""),
                Field::text("Email", ""),
                Field::choice("Role", ROLES, "user"),
                Field::secret("Password"),
                Field::choice("Shell", SHELLS, "/bin/bash"),
            ],
        )
    }

    pub fn edit_user(user: &User) -> Self {
        Self::new(
            FormKind::EditUser { id: user.id },
            format!("Edit {}", user.username),
            vec![
                Field::text("Username", user.username.clone()),
                Field::text("Email", user.email.clone()),
                Field::choice("Role", ROLES, user.role.as_str()),
                Field::choice("Shell", SHELLS, &user.shell),
            ],
        )
    }

    pub fn password(user: &User) -> Self {
        Self::new(
            FormKind::Password {
                username: user.username.clone(),
            },
            format!("Change password for {}", user.username),
            vec![Field::secret("New password"), Field::secret("Confirm")],
        )
    }

    pub fn server_settings(info: &ServerInfo) -> Self {
        Self::new(
            FormKind::ServerSettings,
            "Server Settings",
            vec![
                Field::text("Hostname", info.hostname.clone()),
                Field::choice("Timezone", TIMEZONES, &info.timezone),
            ],
        )
    }

    /// Value of the field labelled `label`, or `""`.
    pub fn value(&self, label: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map_or("", |f| f.value.as_str())
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        let n = self.fields.len();
        if n > 0 {
            self.focus = (self.focus + n - 1) % n;
        }
    }

    pub fn input(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            if !matches!(field.kind, FieldKind::Choice(_)) {
                field.value.push(c);
                self.error = None;
            }
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            if !matches!(field.kind, FieldKind::Choice(_)) {
                field.value.pop();
                self.error = None;
            }
        }
    }

    /// Step a choice field through its options.
    pub fn cycle(&mut self, forward: bool) {
        let Some(field) = self.fields.get_mut(self.focus) else {
            return;
        };
        let FieldKind::Choice(options) = field.kind else {
            return;
        };
        let n = options.len();
        let idx = options.iter().position(|o| *o == field.value).unwrap_or(0);
        let next = if forward { (idx + 1) % n } else { (idx + n - 1) % n };
        field.value = options[next].to_string();
    }
}

/// `-rwxr-x---` → `"0750"`.  Unreadable input yields `"0644"`.
fn octal(symbolic: &str) -> String {
    let bits: Vec<char> = symbolic.chars().skip(1).collect();
    if bits.len() != 9 {
        return "0644".into();
    }
    let digits: String = bits
        .chunks(3)
        .map(|rwx| {
            let v = rwx
                .iter()
                .zip([4u8, 2, 1])
                .filter(|(c, _)| **c != '-')
                .map(|(_, v)| v)
                .sum::<u8>();
            char::from(b'0' + v)
        })
        .collect();
    format!("0{digits}")
}

/// Validate `form` against the current state and build the op it asks for.
pub fn submit(form: &Form, state: &AppState) -> Result<Op, ValidationError> {
    let v = |label: &str| form.value(label);
    match &form.kind {
        FormKind::NewEntry => {
            let name = validate::file_name(v("Name").trim())?;
            if state.vfs.list().iter().any(|e| e.name == name) {
                return Err(ValidationError::Duplicate("Name"));
            }
            let kind = if v("Type") == "directory" {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            Ok(Op::CreateEntry {
                dir: state.vfs.cwd().to_string(),
                name: name.to_string(),
                kind,
            })
        }
        FormKind::Rename { from } => {
            let to = validate::file_name(v("New name").trim())?;
            if to != from.as_str() && state.vfs.list().iter().any(|e| e.name == to) {
                return Err(ValidationError::Duplicate("Name"));
            }
            Ok(Op::Rename {
                dir: state.vfs.cwd().to_string(),
                from: from.clone(),
                to: to.to_string(),
            })
        }
        FormKind::Chmod { name } => Ok(Op::Chmod {
            dir: state.vfs.cwd().to_string(),
            name: name.clone(),
            mode: validate::permissions(v("Mode"))?,
        }),
        FormKind::AddRule => {
            let action = validate::action(v("Action"))?;
            let direction = validate::direction(v("Direction"))?;
            let protocol = validate::protocol(v("Protocol"))?;
            let port = validate::port(v("Port"))?.to_string();
            let source = validate::required("Source", v("Source"))?.to_string();
            let destination = match v("Destination").trim() {
                "" => "any".to_string(),
                d => d.to_string(),
            };
            let description = validate::description(v("Description").trim())?.to_string();
            Ok(Op::AddRule(RuleDraft {
                action,
                direction,
                protocol,
                port,
                source,
                destination,
                description,
            }))
        }
        FormKind::CreateUser => {
            let draft = user_draft(form, state, None)?;
            validate::password(v("Password"))?;
            Ok(Op::CreateUser(draft))
        }
        FormKind::EditUser { id } => Ok(Op::UpdateUser {
            id: *id,
            draft: user_draft(form, state, Some(*id))?,
        }),
        FormKind::Password { username } => {
            validate::password_pair(v("New password"), v("Confirm"))?;
            Ok(Op::ChangePassword {
                username: username.clone(),
            })
        }
        FormKind::ServerSettings => {
            let hostname = validate::hostname(v("Hostname").trim())?.to_string();
            let timezone = v("Timezone");
            if !TIMEZONES.contains(&timezone) {
                return Err(ValidationError::Required("Timezone"));
            }
            Ok(Op::SaveServerSettings {
                hostname,
                timezone: timezone.to_string(),
            })
        }
    }
}

/// Shared user checks.  `editing` is the id allowed to keep its own name.
fn user_draft(form: &Form, state: &AppState, editing: Option<u64>) -> Result<UserDraft, ValidationError> {
    let username = validate::username(form.value("Username").trim())?;
    let taken = state
        .users
        .rows
        .iter()
        .any(|u| u.username == username && Some(u.id) != editing);
    if taken {
        return Err(ValidationError::Duplicate("Username"));
    }
    let email = validate::email(form.value("Email").trim())?;
    let role: Role = validate::role(form.value("Role"))?;
    let shell = validate::required("Shell", form.value("Shell"))?;
    Ok(UserDraft {
        username: username.to_string(),
        email: email.to_string(),
        role,
        shell: shell.to_string(),
    })
}
