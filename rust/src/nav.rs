/// Top-level destinations of the app shell.
#[derive(uniffi::Enum, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NavTab {
    Home,
    Scan,
    Send,
    Settings,
    /// Screens outside the tab bar (e.g. onboarding). Nothing is highlighted.
    None,
}

impl NavTab {
    /// Lenient lookup for route/deep-link input. Unknown names highlight nothing.
    pub fn from_name(name: &str) -> NavTab {
        match name.trim().to_ascii_lowercase().as_str() {
            "home" => NavTab::Home,
            "scan" => NavTab::Scan,
            "send" => NavTab::Send,
            "settings" => NavTab::Settings,
            _ => NavTab::None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NavTab::Home => "home",
            NavTab::Scan => "scan",
            NavTab::Send => "send",
            NavTab::Settings => "settings",
            NavTab::None => "none",
        }
    }
}

#[derive(uniffi::Record, Clone, Debug, PartialEq, Eq)]
pub struct NavEntry {
    pub tab: NavTab,
    pub href: String,
    pub label: String,
    pub active: bool,
}

const NAV_ORDER: [(NavTab, &str); 4] = [
    (NavTab::Home, "/"),
    (NavTab::Scan, "/scan"),
    (NavTab::Send, "/send"),
    (NavTab::Settings, "/settings"),
];

#[uniffi::export]
pub fn nav_entries(active: NavTab) -> Vec<NavEntry> {
    NAV_ORDER
        .iter()
        .map(|(tab, href)| NavEntry {
            tab: *tab,
            href: (*href).to_string(),
            label: tab.name().to_string(),
            active: *tab == active,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_tabs(entries: &[NavEntry]) -> Vec<NavTab> {
        entries.iter().filter(|e| e.active).map(|e| e.tab).collect()
    }

    #[test]
    fn each_tab_marks_exactly_itself() {
        for tab in [NavTab::Home, NavTab::Scan, NavTab::Send, NavTab::Settings] {
            let entries = nav_entries(tab);
            assert_eq!(active_tabs(&entries), vec![tab], "tab {tab:?}");
        }
    }

    #[test]
    fn none_marks_nothing() {
        assert!(active_tabs(&nav_entries(NavTab::None)).is_empty());
    }

    #[test]
    fn unknown_names_mark_nothing() {
        assert_eq!(NavTab::from_name("wallet"), NavTab::None);
        assert_eq!(NavTab::from_name(""), NavTab::None);
        assert!(active_tabs(&nav_entries(NavTab::from_name("activity"))).is_empty());
        assert_eq!(NavTab::from_name(" Settings "), NavTab::Settings);
    }

    #[test]
    fn order_and_routes_are_fixed() {
        let entries = nav_entries(NavTab::Send);
        let hrefs: Vec<&str> = entries.iter().map(|e| e.href.as_str()).collect();
        assert_eq!(hrefs, vec!["/", "/scan", "/send", "/settings"]);
        assert_eq!(entries, nav_entries(NavTab::Send));
    }
}
