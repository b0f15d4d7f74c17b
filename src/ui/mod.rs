//! UI / rendering layer: everything that touches Ratatui widgets.
//!
//! Renderers read `&AppState` and never mutate it.

pub mod layout;
pub mod pages;
pub mod popup;
pub mod sidebar;
pub mod spinner;
pub mod table_widget;
pub mod theme;
pub mod toast;

use ratatui::{
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::nav::Page;
use crate::app::state::{ActiveView, AppState};
use crate::config::Action;

use self::layout::AppLayout;
use self::sidebar::Sidebar;
use self::spinner::BusyIndicator;
use self::theme::Theme;
use self::toast::ToastStack;

/// Draw one full frame.
pub fn draw(frame: &mut Frame, state: &AppState) {
    let theme = Theme::new(state.config.theme);
    let layout = AppLayout::from_area(frame.area(), state.config.sidebar_collapsed);

    frame.render_widget(Paragraph::new(header(state, theme)).style(theme.status_bar_style()), layout.header_area);
    let label = state.pending.as_ref().map(|op| op.label());
    frame.render_widget(
        BusyIndicator {
            label: label.as_deref(),
            tick: state.tick,
        },
        layout.header_area,
    );

    frame.render_widget(
        Sidebar {
            current: state.page,
            collapsed: state.config.sidebar_collapsed,
            theme,
        },
        layout.sidebar_area,
    );
    pages::render_page(frame, layout.main_area, state, theme);

    let status = match state.active_view {
        ActiveView::Search => Line::from(vec![
            Span::styled(format!(" /{}▏", state.search_text()), theme.input_style()),
            Span::raw("   Enter: keep  Esc: clear"),
        ]),
        _ => Line::raw(match &state.status_message {
            Some(msg) => format!(" {msg}"),
            None => format!(" {}", page_hint(state)),
        }),
    };
    frame.render_widget(Paragraph::new(status).style(theme.status_bar_style()), layout.status_area);

    let area = frame.area();
    match state.active_view {
        ActiveView::Main | ActiveView::Search => {}
        ActiveView::Confirm => {
            if let Some(confirm) = &state.confirm {
                frame.render_widget(popup::ConfirmPopup { confirm, theme }, area);
            }
        }
        ActiveView::Form => {
            if let Some(form) = &state.form {
                frame.render_widget(popup::FormPopup { form, theme }, area);
            }
        }
        ActiveView::Details => {
            if let Some(details) = &state.details {
                frame.render_widget(popup::DetailsPopup { details, theme }, area);
            }
        }
        ActiveView::Viewer => {
            if let Some(viewer) = &state.viewer {
                frame.render_widget(popup::ViewerPopup { viewer, theme }, area);
            }
        }
        ActiveView::Notifications => frame.render_widget(
            popup::NotificationsPopup {
                notifications: &state.notifications,
                selected: state.notification_selected,
                theme,
            },
            area,
        ),
        ActiveView::SettingsMenu => frame.render_widget(popup::SettingsPopup { state, theme }, area),
        ActiveView::ControlsSubmenu => frame.render_widget(
            popup::ControlsPopup {
                config: &state.config,
                selected: state.controls_selected,
                awaiting_rebind: state.awaiting_rebind,
                theme,
            },
            area,
        ),
    }

    frame.render_widget(
        ToastStack {
            toasts: &state.toasts,
            theme,
        },
        layout.main_area,
    );
}

fn header(state: &AppState, theme: Theme) -> Line<'static> {
    let unread = state.notifications.unread();
    let bell = if unread > 0 {
        Span::styled(format!("  🔔 {unread}"), theme.key_style())
    } else {
        Span::raw("  🔔")
    };
    Line::from(vec![
        Span::styled(" srvdash ", theme.accent()),
        Span::raw(format!("· {}  ", state.server.hostname)),
        Span::raw(format!("{} › {}", state.page.group(), state.page.label())),
        bell,
    ])
}

/// Key hints for the bottom bar, drawn from the live bindings.
fn page_hint(state: &AppState) -> String {
    let c = &state.config;
    let table: &[(Action, &str)] = &[(Action::Search, "search"), (Action::SortColumn, "sort")];
    let page: &[(Action, &str)] = match state.page {
        Page::Dashboard => &[(Action::Activate, "run action")],
        Page::Overview => &[
            (Action::Toggle, "start/stop"),
            (Action::Refresh, "restart"),
            (Action::Edit, "settings"),
            (Action::Secondary, "reboot"),
            (Action::Delete, "shutdown"),
        ],
        Page::Processes => &[
            (Action::Activate, "details"),
            (Action::Delete, "kill"),
            (Action::Refresh, "refresh"),
        ],
        Page::Network => &[(Action::CycleTab, "tab"), (Action::Refresh, "refresh")],
        Page::Logs => &[
            (Action::CycleTab, "file"),
            (Action::Toggle, "live"),
            (Action::Delete, "clear"),
            (Action::Secondary, "download"),
        ],
        Page::Files => &[
            (Action::Activate, "open"),
            (Action::Back, "up"),
            (Action::New, "new"),
            (Action::Edit, "rename"),
            (Action::Secondary, "chmod"),
            (Action::Delete, "delete"),
        ],
        Page::Security => &[
            (Action::New, "add rule"),
            (Action::Toggle, "enable"),
            (Action::Delete, "delete"),
            (Action::Secondary, "firewall"),
        ],
        Page::Users => &[
            (Action::New, "add"),
            (Action::Edit, "edit"),
            (Action::Secondary, "password"),
            (Action::Delete, "delete"),
        ],
        Page::Settings => &[(Action::Activate, "change")],
        Page::Databases | Page::Backups => &[],
    };
    let mut items: Vec<(Action, &str)> = Vec::new();
    if state.browse().is_some() {
        items.extend_from_slice(table);
    }
    items.extend_from_slice(page);
    items.extend_from_slice(&[
        (Action::NextNav, "next page"),
        (Action::OpenSettings, "settings"),
        (Action::Quit, "quit"),
    ]);
    c.hint(&items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen(state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(160, 40)).unwrap();
        terminal.draw(|f| draw(f, state)).unwrap();
        terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn hint_uses_live_bindings() {
        let mut state = AppState::new(AppConfig::default(), Some(4));
        state.set_page(Page::Processes);
        let hint = page_hint(&state);
        assert!(hint.starts_with("/: search | s: sort"));
        assert!(hint.contains("d: kill"));
        assert!(hint.ends_with("q: quit"));
    }

    #[test]
    fn frame_with_overlay_and_toast() {
        let mut state = AppState::new(AppConfig::default(), Some(4));
        state.set_page(Page::Users);
        state.open_form(crate::app::forms::Form::create_user());
        state.toast(crate::core::notify::Variant::Success, "User bob created");
        let text = screen(&state);
        assert!(text.contains("Create User"));
        assert!(text.contains("User bob created"));
        assert!(text.contains("Users"));
    }

    #[test]
    fn busy_label_in_header() {
        let mut state = AppState::new(AppConfig::default(), Some(4));
        state.dispatch(crate::app::ops::Op::RefreshNetwork);
        assert!(screen(&state).contains("Refreshing network"));
    }
}
