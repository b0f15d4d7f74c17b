//! Sidebar navigation: pages and the groups they are listed under.

/// Every screen reachable from the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Page {
    #[default]
    Dashboard,
    Overview,
    Processes,
    Network,
    Logs,
    Files,
    Databases,
    Backups,
    Security,
    Users,
    Settings,
}

/// Sidebar groups in display order.
pub const GROUPS: &[(&str, &[Page])] = &[
    ("Dashboard", &[Page::Dashboard]),
    ("Server", &[Page::Overview, Page::Processes, Page::Network, Page::Logs]),
    ("Management", &[Page::Files, Page::Databases, Page::Backups]),
    ("Settings", &[Page::Security, Page::Users, Page::Settings]),
];

impl Page {
    pub const ALL: &[Page] = &[
        Page::Dashboard,
        Page::Overview,
        Page::Processes,
        Page::Network,
        Page::Logs,
        Page::Files,
        Page::Databases,
        Page::Backups,
        Page::Security,
        Page::Users,
        Page::Settings,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Overview => "Overview",
            Page::Processes => "Processes",
            Page::Network => "Network",
            Page::Logs => "Logs",
            Page::Files => "File Manager",
            Page::Databases => "Databases",
            Page::Backups => "Backups",
            Page::Security => "Security",
            Page::Users => "Users",
            Page::Settings => "Settings",
        }
    }

    /// Single-cell glyph for the collapsed sidebar.
    pub fn icon(self) -> &'static str {
        match self {
            Page::Dashboard => "◆",
            Page::Overview => "ℹ",
            Page::Processes => "⚙",
            Page::Network => "⇅",
            Page::Logs => "≡",
            Page::Files => "▤",
            Page::Databases => "⛁",
            Page::Backups => "↺",
            Page::Security => "⛨",
            Page::Users => "☺",
            Page::Settings => "✱",
        }
    }

    /// Name accepted by `--page`.
    pub fn slug(self) -> &'static str {
        match self {
            Page::Dashboard => "dashboard",
            Page::Overview => "server",
            Page::Processes => "processes",
            Page::Network => "network",
            Page::Logs => "logs",
            Page::Files => "files",
            Page::Databases => "databases",
            Page::Backups => "backups",
            Page::Security => "security",
            Page::Users => "users",
            Page::Settings => "settings",
        }
    }

    pub fn from_slug(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL.iter().copied().find(|p| p.slug() == s)
    }

    /// Pages with no functionality yet.
    pub fn is_placeholder(self) -> bool {
        matches!(self, Page::Databases | Page::Backups)
    }

    pub fn group(self) -> &'static str {
        GROUPS
            .iter()
            .find(|(_, pages)| pages.contains(&self))
            .map_or("", |(title, _)| *title)
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|&p| p == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let n = Self::ALL.len();
        Self::ALL[(self.index() + n - 1) % n]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_cover_every_page_once() {
        let listed: Vec<Page> = GROUPS.iter().flat_map(|(_, p)| p.iter().copied()).collect();
        assert_eq!(listed, Page::ALL);
    }

    #[test]
    fn cycling_wraps() {
        assert_eq!(Page::Dashboard.prev(), Page::Settings);
        assert_eq!(Page::Settings.next(), Page::Dashboard);
        assert_eq!(Page::Logs.next(), Page::Files);
    }

    #[test]
    fn slugs_round_trip() {
        assert_eq!(Page::from_slug("Files"), Some(Page::Files));
        assert_eq!(Page::from_slug("server"), Some(Page::Overview));
        assert_eq!(Page::from_slug("nope"), None);
        assert_eq!(Page::Processes.group(), "Server");
    }
}
