use crate::nav::NavTab;
use crate::state::{ConnectionsQuery, ExternalClient};

#[derive(uniffi::Enum, Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    // Navigation
    SelectTab {
        tab: NavTab,
    },

    // Connections
    OpenConnections {
        query: ConnectionsQuery,
    },
    RefreshConnections,
    OpenCreateConnection,
    CloseCreateConnection,
    SetConnectionName {
        name: String,
    },
    CreateConnection,
    ToggleConnectionEnabled {
        index: u32,
    },
    OpenConnectionInClient {
        index: u32,
        client: ExternalClient,
    },
    ConfirmCallbackRedirect,
    DismissCallbackRedirect,

    // UI
    ClearToast,

    // Lifecycle
    ReloadConfig,
}

impl AppAction {
    /// Log-safe action tag (never includes connection names or URIs).
    pub fn tag(&self) -> &'static str {
        match self {
            // Navigation
            AppAction::SelectTab { .. } => "SelectTab",

            // Connections
            AppAction::OpenConnections { .. } => "OpenConnections",
            AppAction::RefreshConnections => "RefreshConnections",
            AppAction::OpenCreateConnection => "OpenCreateConnection",
            AppAction::CloseCreateConnection => "CloseCreateConnection",
            AppAction::SetConnectionName { .. } => "SetConnectionName",
            AppAction::CreateConnection => "CreateConnection",
            AppAction::ToggleConnectionEnabled { .. } => "ToggleConnectionEnabled",
            AppAction::OpenConnectionInClient { .. } => "OpenConnectionInClient",
            AppAction::ConfirmCallbackRedirect => "ConfirmCallbackRedirect",
            AppAction::DismissCallbackRedirect => "DismissCallbackRedirect",

            // UI
            AppAction::ClearToast => "ClearToast",

            // Lifecycle
            AppAction::ReloadConfig => "ReloadConfig",
        }
    }
}
