//! Settings menu model (data only).
//!
//! Keeping these definitions outside the input handler lets both the handler
//! and UI renderers consume the same source of truth without cross-importing.

use std::time::Duration;

use super::state::{ActiveView, AppState};
use crate::config::TOAST_MS_OPTIONS;
use crate::core::table::PAGE_SIZE_OPTIONS;

/// A single item in the settings menu.
pub enum SettingsItem {
    /// Opens a submenu.
    Submenu {
        label: &'static str,
        view: ActiveView,
    },
    /// Boolean toggle, read and written through `AppState`.
    Toggle {
        label: &'static str,
        get: fn(&AppState) -> bool,
        set: fn(&mut AppState, bool),
    },
    /// Cycles through a finite set of values.
    Cycle {
        label: &'static str,
        value: fn(&AppState) -> String,
        cycle: fn(&mut AppState),
    },
}

impl SettingsItem {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Submenu { label, .. }
            | Self::Toggle { label, .. }
            | Self::Cycle { label, .. } => label,
        }
    }

    /// Current value as shown beside the label.
    pub fn value(&self, state: &AppState) -> Option<String> {
        match self {
            Self::Submenu { .. } => None,
            Self::Toggle { get, .. } => Some(if get(state) { "ON" } else { "OFF" }.to_string()),
            Self::Cycle { value, .. } => Some(value(state)),
        }
    }

    /// Activate the item: open, flip or advance it.
    pub fn activate(&self, state: &mut AppState) {
        match self {
            Self::Submenu { view, .. } => {
                state.active_view = *view;
                state.controls_selected = 0;
            }
            Self::Toggle { get, set, .. } => {
                let current = get(state);
                set(state, !current);
            }
            Self::Cycle { cycle, .. } => cycle(state),
        }
    }
}

/// Next entry of `options` after `current`, wrapping; unknown values restart
/// at the first option.
fn next_option<T: Copy + PartialEq>(options: &[T], current: T) -> T {
    match options.iter().position(|o| *o == current) {
        Some(i) => options[(i + 1) % options.len()],
        None => options[0],
    }
}

/// All items shown in the settings popup, in display order.
pub static SETTINGS_ITEMS: &[SettingsItem] = &[
    SettingsItem::Submenu {
        label: "Controls",
        view: ActiveView::ControlsSubmenu,
    },
    SettingsItem::Cycle {
        label: "Theme",
        value: |s| s.config.theme.label().to_string(),
        cycle: |s| {
            s.config.theme = s.config.theme.toggled();
            s.config.persist();
            s.status_message = Some(format!("Theme: {}", s.config.theme.label()));
        },
    },
    SettingsItem::Toggle {
        label: "Collapse Sidebar",
        get: |s| s.config.sidebar_collapsed,
        set: |s, v| {
            s.config.sidebar_collapsed = v;
            s.config.persist();
        },
    },
    SettingsItem::Cycle {
        label: "Rows Per Page",
        value: |s| s.config.rows_per_page.to_string(),
        cycle: |s| {
            let next = next_option(PAGE_SIZE_OPTIONS, s.config.rows_per_page);
            s.set_rows_per_page(next);
            s.config.persist();
            s.status_message = Some(format!("Rows per page: {next}"));
        },
    },
    SettingsItem::Cycle {
        label: "Toast Duration",
        value: |s| format!("{:.0}s", s.config.toast_ms as f64 / 1000.0),
        cycle: |s| {
            let next = next_option(TOAST_MS_OPTIONS, s.config.toast_ms);
            s.config.toast_ms = next;
            s.toasts.set_ttl(Duration::from_millis(next));
            s.config.persist();
            s.status_message = Some(format!("Toast duration: {}ms", next));
        },
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, ThemeMode};

    fn state() -> AppState {
        AppState::new(AppConfig::default(), Some(2))
    }

    fn item(label: &str) -> &'static SettingsItem {
        SETTINGS_ITEMS.iter().find(|i| i.label() == label).unwrap()
    }

    #[test]
    fn theme_cycles_between_modes() {
        let mut s = state();
        item("Theme").activate(&mut s);
        assert_eq!(s.config.theme, ThemeMode::Light);
        assert_eq!(item("Theme").value(&s).as_deref(), Some("light"));
        item("Theme").activate(&mut s);
        assert_eq!(s.config.theme, ThemeMode::Dark);
    }

    #[test]
    fn rows_per_page_wraps_and_applies() {
        let mut s = state();
        let rows = item("Rows Per Page");
        rows.activate(&mut s);
        assert_eq!(s.processes.view.page_size, 25);
        rows.activate(&mut s);
        rows.activate(&mut s);
        assert_eq!(s.config.rows_per_page, 10);
    }

    #[test]
    fn toggle_and_submenu() {
        let mut s = state();
        item("Collapse Sidebar").activate(&mut s);
        assert!(s.config.sidebar_collapsed);
        assert_eq!(item("Collapse Sidebar").value(&s).as_deref(), Some("ON"));
        item("Controls").activate(&mut s);
        assert_eq!(s.active_view, ActiveView::ControlsSubmenu);
    }

    #[test]
    fn unknown_toast_duration_restarts_cycle() {
        let mut s = state();
        s.config.toast_ms = 1234;
        item("Toast Duration").activate(&mut s);
        assert_eq!(s.config.toast_ms, TOAST_MS_OPTIONS[0]);
        assert_eq!(item("Toast Duration").value(&s).as_deref(), Some("2s"));
    }
}
