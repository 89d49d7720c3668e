use crate::nav::{nav_entries, NavEntry, NavTab};

/// A Nostr Wallet Connect profile as reported by the wallet.
#[derive(uniffi::Record, Clone, Debug, PartialEq, Eq)]
pub struct ConnectionProfile {
    /// Wallet-assigned id; stable across renames.
    pub index: u32,
    pub name: String,
    pub relay: String,
    /// Canonical `nostr+walletconnect://...` URI.
    pub nwc_uri: String,
    pub enabled: bool,
}

/// Deep-link query for the connections screen (`?name=...&callbackUri=...`).
#[derive(uniffi::Record, Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectionsQuery {
    pub name: Option<String>,
    pub callback_uri: Option<String>,
}

#[derive(uniffi::Record, Clone, Debug, Default, PartialEq, Eq)]
pub struct CreateConnectionForm {
    pub name: String,
    pub error: Option<String>,
    pub loading: bool,
}

/// Pending hand-back to the app that requested the connection.
#[derive(uniffi::Record, Clone, Debug, PartialEq, Eq)]
pub struct CallbackPrompt {
    pub uri: String,
}

#[derive(uniffi::Enum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExternalClient {
    NostrClient,
    Primal,
}

impl From<ExternalClient> for nwc_uri::ClientTargetId {
    fn from(client: ExternalClient) -> Self {
        match client {
            ExternalClient::NostrClient => nwc_uri::ClientTargetId::Generic,
            ExternalClient::Primal => nwc_uri::ClientTargetId::Primal,
        }
    }
}

#[derive(uniffi::Record, Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectionsState {
    /// `None` until the first successful fetch, and again after a failed one.
    pub profiles: Option<Vec<ConnectionProfile>>,
    pub refreshing: bool,
    /// `Some` while the creation dialog is open.
    pub create_form: Option<CreateConnectionForm>,
    pub callback_prompt: Option<CallbackPrompt>,
    pub query: ConnectionsQuery,
    /// Profile indexes with an edit in flight.
    pub toggling: Vec<u32>,
}

#[derive(uniffi::Record, Clone, Debug, PartialEq, Eq)]
pub struct AppState {
    pub rev: u64,
    pub active_tab: NavTab,
    pub nav: Vec<NavEntry>,
    pub connections: ConnectionsState,
    pub toast: Option<String>,
}

impl AppState {
    pub fn empty() -> Self {
        Self {
            rev: 0,
            active_tab: NavTab::Home,
            nav: nav_entries(NavTab::Home),
            connections: ConnectionsState::default(),
            toast: None,
        }
    }
}

pub(crate) fn now_seconds() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
