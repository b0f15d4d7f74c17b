//! User configuration: keybindings, display preferences and persistence.
//!
//! Everything is stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/srvdash/config.toml` (default `~/.config/srvdash/config.toml`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::notify::DEFAULT_TOAST_MS;
use crate::core::table::PAGE_SIZE_OPTIONS;

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveUp,
    MoveDown,
    PrevPage,
    NextPage,
    NextNav,
    PrevNav,
    Search,
    SortColumn,
    SortDirection,
    Activate,
    Back,
    New,
    Edit,
    Delete,
    Refresh,
    Toggle,
    CycleTab,
    Secondary,
    Notifications,
    ToggleSidebar,
    OpenSettings,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used for the controls menu).
    pub const ALL: &[Action] = &[
        Action::MoveUp,
        Action::MoveDown,
        Action::PrevPage,
        Action::NextPage,
        Action::NextNav,
        Action::PrevNav,
        Action::Search,
        Action::SortColumn,
        Action::SortDirection,
        Action::Activate,
        Action::Back,
        Action::New,
        Action::Edit,
        Action::Delete,
        Action::Refresh,
        Action::Toggle,
        Action::CycleTab,
        Action::Secondary,
        Action::Notifications,
        Action::ToggleSidebar,
        Action::OpenSettings,
        Action::Quit,
    ];

    /// Human-readable label for the UI.
    pub fn label(self) -> &'static str {
        match self {
            Action::MoveUp => "Move Up",
            Action::MoveDown => "Move Down",
            Action::PrevPage => "Previous Page",
            Action::NextPage => "Next Page",
            Action::NextNav => "Next Section",
            Action::PrevNav => "Previous Section",
            Action::Search => "Search",
            Action::SortColumn => "Sort Column",
            Action::SortDirection => "Sort Direction",
            Action::Activate => "Open / Activate",
            Action::Back => "Back / Up Dir",
            Action::New => "New",
            Action::Edit => "Edit / Rename",
            Action::Delete => "Delete / Kill",
            Action::Refresh => "Refresh",
            Action::Toggle => "Toggle",
            Action::CycleTab => "Cycle Tab",
            Action::Secondary => "Secondary Action",
            Action::Notifications => "Notifications",
            Action::ToggleSidebar => "Collapse Sidebar",
            Action::OpenSettings => "Open Settings",
            Action::Quit => "Quit",
        }
    }

    /// Key used in the config file.
    fn config_key(self) -> &'static str {
        match self {
            Action::MoveUp => "move_up",
            Action::MoveDown => "move_down",
            Action::PrevPage => "prev_page",
            Action::NextPage => "next_page",
            Action::NextNav => "next_nav",
            Action::PrevNav => "prev_nav",
            Action::Search => "search",
            Action::SortColumn => "sort_column",
            Action::SortDirection => "sort_direction",
            Action::Activate => "activate",
            Action::Back => "back",
            Action::New => "new",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Refresh => "refresh",
            Action::Toggle => "toggle",
            Action::CycleTab => "cycle_tab",
            Action::Secondary => "secondary",
            Action::Notifications => "notifications",
            Action::ToggleSidebar => "toggle_sidebar",
            Action::OpenSettings => "open_settings",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── theme ─────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn label(self) -> &'static str {
        match self {
            ThemeMode::Dark => "dark",
            ThemeMode::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "dark" => Some(ThemeMode::Dark),
            "light" => Some(ThemeMode::Light),
            _ => None,
        }
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding: key code plus modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Does this binding match a key event?  Only CTRL/ALT/SHIFT modifiers
    /// are compared.  SHIFT is ignored for characters and BackTab since the
    /// shifted form is already encoded in the key code.
    pub fn matches(&self, event: KeyEvent) -> bool {
        let mask = Self::mask_for(&event.code);
        self.code == event.code && (self.modifiers & mask) == (event.modifiers & mask)
    }

    fn mask_for(code: &KeyCode) -> KeyModifiers {
        match code {
            KeyCode::Char(_) | KeyCode::BackTab => KeyModifiers::CONTROL | KeyModifiers::ALT,
            _ => KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT,
        }
    }

    /// Create a binding from a raw key event (used during rebinding).
    pub fn from_key_event(event: KeyEvent) -> Self {
        Self {
            modifiers: event.modifiers & Self::mask_for(&event.code),
            code: event.code,
        }
    }

    fn modifier_prefix(&self) -> String {
        let mut s = String::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            s.push_str("Ctrl+");
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            s.push_str("Alt+");
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            s.push_str("Shift+");
        }
        s
    }

    /// User-friendly display string (e.g. `"Alt+↑"`, `"Ctrl+c"`, `"q"`).
    pub fn display(&self) -> String {
        let mut s = self.modifier_prefix();
        s.push_str(&match self.code {
            KeyCode::Char(' ') => "Space".into(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Up => "↑".into(),
            KeyCode::Down => "↓".into(),
            KeyCode::Left => "←".into(),
            KeyCode::Right => "→".into(),
            KeyCode::Enter => "Enter".into(),
            KeyCode::Esc => "Esc".into(),
            KeyCode::Tab => "Tab".into(),
            KeyCode::BackTab => "S-Tab".into(),
            KeyCode::Backspace => "Bksp".into(),
            KeyCode::Delete => "Del".into(),
            KeyCode::Home => "Home".into(),
            KeyCode::End => "End".into(),
            KeyCode::PageUp => "PgUp".into(),
            KeyCode::PageDown => "PgDn".into(),
            KeyCode::F(n) => format!("F{n}"),
            other => format!("{other:?}"),
        });
        s
    }

    /// Serialise to config-file format (e.g. `"Alt+Up"`, `"Ctrl+c"`, `"q"`).
    fn to_config_string(&self) -> String {
        let mut s = self.modifier_prefix();
        s.push_str(&match self.code {
            KeyCode::Char(' ') => "Space".into(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Up => "Up".into(),
            KeyCode::Down => "Down".into(),
            KeyCode::Left => "Left".into(),
            KeyCode::Right => "Right".into(),
            KeyCode::Enter => "Enter".into(),
            KeyCode::Esc => "Esc".into(),
            KeyCode::Tab => "Tab".into(),
            KeyCode::BackTab => "BackTab".into(),
            KeyCode::Backspace => "Backspace".into(),
            KeyCode::Delete => "Delete".into(),
            KeyCode::Home => "Home".into(),
            KeyCode::End => "End".into(),
            KeyCode::PageUp => "PageUp".into(),
            KeyCode::PageDown => "PageDown".into(),
            KeyCode::F(n) => format!("F{n}"),
            other => format!("{other:?}"),
        });
        s
    }

    /// Parse a key string like `"Ctrl+c"`, `"Alt+Up"`, `"q"`, `"Enter"`.
    fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        // A lone "+" is the plus key, not an empty modifier list.
        let (mods, key_part) = match s.rsplit_once('+') {
            Some((mods, "")) => (mods.strip_suffix('+').unwrap_or(""), "+"),
            Some((mods, key)) => (mods, key),
            None => ("", s),
        };

        for part in mods.split('+').filter(|p| !p.is_empty()) {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }

        // Single characters keep their case so `S` and `s` stay distinct.
        if key_part.chars().count() == 1 {
            let c = key_part.chars().next()?;
            return Some(KeyBind::new(KeyCode::Char(c), modifiers));
        }

        let code = match key_part.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "backtab" => KeyCode::BackTab,
            "backspace" | "bksp" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            s if s.starts_with('f') => {
                let n: u8 = s[1..].parse().ok()?;
                KeyCode::F(n)
            }
            _ => return None,
        };

        Some(KeyBind { code, modifiers })
    }
}

// ───────────────────────────────────────── config ────────────

pub const TOAST_MS_OPTIONS: &[u64] = &[2000, 3000, 4000, 6000, 8000];

/// Application configuration: keybindings and display preferences.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    pub theme: ThemeMode,
    pub sidebar_collapsed: bool,
    /// Default page size for every table.
    pub rows_per_page: usize,
    /// How long a toast stays on screen.
    pub toast_ms: u64,
    /// Where [`AppConfig::save`] writes.  `None` keeps the config in memory.
    path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            theme: ThemeMode::default(),
            sidebar_collapsed: false,
            rows_per_page: PAGE_SIZE_OPTIONS[0],
            toast_ms: DEFAULT_TOAST_MS,
            path: None,
        }
    }
}

impl AppConfig {
    /// Hard-coded default bindings.
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        let n = KeyModifiers::NONE;
        let k = |c: char| KeyBind::new(KeyCode::Char(c), n);
        let key = |code: KeyCode| KeyBind::new(code, n);
        let mut m = HashMap::new();

        m.insert(MoveUp, vec![key(KeyCode::Up), k('k')]);
        m.insert(MoveDown, vec![key(KeyCode::Down), k('j')]);
        m.insert(PrevPage, vec![key(KeyCode::Left), k('h')]);
        m.insert(NextPage, vec![key(KeyCode::Right), k('l')]);
        m.insert(NextNav, vec![key(KeyCode::Tab)]);
        m.insert(PrevNav, vec![key(KeyCode::BackTab)]);
        m.insert(Search, vec![k('/')]);
        m.insert(SortColumn, vec![k('s')]);
        m.insert(SortDirection, vec![k('o')]);
        m.insert(Activate, vec![key(KeyCode::Enter)]);
        m.insert(Back, vec![key(KeyCode::Backspace)]);
        m.insert(New, vec![k('n')]);
        m.insert(Edit, vec![k('e')]);
        m.insert(Delete, vec![k('d'), key(KeyCode::Delete)]);
        m.insert(Refresh, vec![k('r')]);
        m.insert(Toggle, vec![k('t'), k(' ')]);
        m.insert(CycleTab, vec![k('c')]);
        m.insert(Secondary, vec![k('p')]);
        m.insert(Notifications, vec![k('b')]);
        m.insert(ToggleSidebar, vec![k('[')]);
        m.insert(OpenSettings, vec![k('?')]);
        m.insert(Quit, vec![k('q')]);

        m
    }

    /// Find the action that matches a key event.  When multiple bindings
    /// match, the one with the most modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        let mut best: Option<Action> = None;
        let mut best_mod_count = 0;

        for (&action, binds) in &self.bindings {
            for bind in binds {
                if bind.matches(event) {
                    let mc = bind.modifiers.bits().count_ones();
                    if best.is_none() || mc > best_mod_count {
                        best = Some(action);
                        best_mod_count = mc;
                    }
                }
            }
        }
        best
    }

    /// Add a binding for `action`.  Removes this key from any other action
    /// to prevent conflicts, then appends it to `action`'s bindings.
    pub fn add_binding(&mut self, action: Action, bind: KeyBind) {
        for binds in self.bindings.values_mut() {
            binds.retain(|b| b != &bind);
        }
        self.bindings.entry(action).or_default().push(bind);
    }

    pub fn clear_bindings(&mut self, action: Action) {
        self.bindings.insert(action, Vec::new());
    }

    /// Restore all bindings to the built-in defaults.
    pub fn reset_defaults(&mut self) {
        self.bindings = Self::default_bindings();
    }

    /// Format the binding list for a given action (e.g. `"↑/k"`).
    pub fn display_bindings(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => {
                binds.iter().map(|b| b.display()).collect::<Vec<_>>().join("/")
            }
            _ => "unbound".into(),
        }
    }

    /// Short display of the first binding only (for the status bar).
    pub fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].display(),
            _ => "-".into(),
        }
    }

    /// `"s: sort | /: search"` from a list of actions and their labels.
    pub fn hint(&self, items: &[(Action, &str)]) -> String {
        items
            .iter()
            .map(|(action, label)| format!("{}: {label}", self.short_binding(*action)))
            .collect::<Vec<_>>()
            .join(" | ")
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from disk, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(config_path())
    }

    /// Load from an explicit file; saves go back to the same file.
    pub fn load_from(path: PathBuf) -> Self {
        let mut config = match std::fs::read_to_string(&path) {
            Ok(contents) => Self::parse_config(&contents),
            Err(_) => Self::default(),
        };
        config.path = Some(path);
        config
    }

    /// Persist current config to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.serialise())?;
        tracing::debug!("config saved to {}", path.display());
        Ok(())
    }

    /// Where preferences are written, if anywhere.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Save, logging rather than propagating failures.
    pub fn persist(&self) {
        if let Err(err) = self.save() {
            tracing::warn!("failed to save config: {err:#}");
        }
    }

    pub fn parse_config(s: &str) -> Self {
        let mut config = Self::default();

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            // Display preferences.
            match key {
                "theme" => {
                    if let Some(mode) = ThemeMode::parse(value) {
                        config.theme = mode;
                    }
                    continue;
                }
                "sidebar_collapsed" => {
                    config.sidebar_collapsed = value == "true";
                    continue;
                }
                "rows_per_page" => {
                    if let Ok(v) = value.parse::<usize>() {
                        if PAGE_SIZE_OPTIONS.contains(&v) {
                            config.rows_per_page = v;
                        }
                    }
                    continue;
                }
                "toast_ms" => {
                    if let Ok(v) = value.parse::<u64>() {
                        config.toast_ms = v.clamp(1000, 10_000);
                    }
                    continue;
                }
                _ => {}
            }

            let Some(action) = Action::from_config_key(key) else {
                continue;
            };

            let parsed: Vec<KeyBind> = value
                .split(", ")
                .map(|part| part.trim().trim_matches('"'))
                .filter_map(KeyBind::parse)
                .collect();
            if !parsed.is_empty() {
                config.bindings.insert(action, parsed);
            }
        }

        config
    }

    pub fn serialise(&self) -> String {
        let mut lines = vec![
            "# srvdash configuration".to_string(),
            String::new(),
            "# Display".to_string(),
            format!("theme = {}", self.theme.label()),
            format!("sidebar_collapsed = {}", self.sidebar_collapsed),
            format!("rows_per_page = {}", self.rows_per_page),
            format!("toast_ms = {}", self.toast_ms),
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+, Shift+ (prefix)".to_string(),
            "# Special keys: Up, Down, Left, Right, Enter, Esc, Tab, BackTab,".to_string(),
            "#   Backspace, Delete, Home, End, PageUp, PageDown, Space, F1-F12".to_string(),
            String::new(),
        ];

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(|b| b.to_config_string()).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/srvdash/config.toml`).
fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("srvdash").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn defaults_resolve_common_keys() {
        let config = AppConfig::default();
        let none = KeyModifiers::NONE;
        assert_eq!(config.match_key(press(KeyCode::Char('j'), none)), Some(Action::MoveDown));
        assert_eq!(config.match_key(press(KeyCode::Tab, none)), Some(Action::NextNav));
        assert_eq!(config.match_key(press(KeyCode::Char('x'), none)), None);
    }

    #[test]
    fn shifted_characters_and_backtab_match() {
        let config = AppConfig::default();
        let shift = KeyModifiers::SHIFT;
        assert_eq!(config.match_key(press(KeyCode::Char('?'), shift)), Some(Action::OpenSettings));
        assert_eq!(config.match_key(press(KeyCode::BackTab, shift)), Some(Action::PrevNav));
        assert_eq!(config.match_key(press(KeyCode::Enter, shift)), None);
    }

    #[test]
    fn rebinding_steals_key_from_other_action() {
        let mut config = AppConfig::default();
        config.add_binding(Action::Refresh, KeyBind::new(KeyCode::Char('q'), KeyModifiers::NONE));
        assert_eq!(
            config.match_key(press(KeyCode::Char('q'), KeyModifiers::NONE)),
            Some(Action::Refresh)
        );
        assert_eq!(config.display_bindings(Action::Quit), "unbound");
        config.reset_defaults();
        assert_eq!(config.display_bindings(Action::Quit), "q");
    }

    #[test]
    fn parse_reads_preferences_and_bindings() {
        let text = "\
# comment
theme = light
sidebar_collapsed = true
rows_per_page = 25
toast_ms = 50
quit = Ctrl+x, F10
refresh = +
bogus = z
";
        let config = AppConfig::parse_config(text);
        assert_eq!(config.theme, ThemeMode::Light);
        assert!(config.sidebar_collapsed);
        assert_eq!(config.rows_per_page, 25);
        assert_eq!(config.toast_ms, 1000);
        assert_eq!(
            config.bindings[&Action::Quit],
            vec![
                KeyBind::new(KeyCode::Char('x'), KeyModifiers::CONTROL),
                KeyBind::new(KeyCode::F(10), KeyModifiers::NONE),
            ]
        );
        assert_eq!(
            config.bindings[&Action::Refresh],
            vec![KeyBind::new(KeyCode::Char('+'), KeyModifiers::NONE)]
        );
        assert_eq!(config.display_bindings(Action::MoveUp), "↑/k");
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let config = AppConfig::parse_config("theme = neon\nrows_per_page = 7\nno equals sign");
        assert_eq!(config.theme, ThemeMode::Dark);
        assert_eq!(config.rows_per_page, PAGE_SIZE_OPTIONS[0]);
    }

    #[test]
    fn serialised_config_reads_back() {
        let mut config = AppConfig::default();
        config.theme = ThemeMode::Light;
        config.rows_per_page = 50;
        config.add_binding(Action::Search, KeyBind::new(KeyCode::Char('f'), KeyModifiers::CONTROL));
        let back = AppConfig::parse_config(&config.serialise());
        assert_eq!(back.theme, ThemeMode::Light);
        assert_eq!(back.rows_per_page, 50);
        assert_eq!(back.bindings, config.bindings);
    }

    #[test]
    fn saving_without_a_path_is_a_no_op() {
        assert!(AppConfig::default().save().is_ok());
    }
}
