// Capability boundary to the wallet that owns NWC profiles.

use async_trait::async_trait;

use crate::i18n::{t, Locale, Message};
use crate::state::ConnectionProfile;

#[derive(Debug, Clone, thiserror::Error)]
pub enum WalletError {
    #[error("wallet is not available")]
    Unavailable,
    #[error("{0}")]
    Rejected(String),
    #[error("nwc profile {0} not found")]
    NotFound(u32),
    #[error("wallet storage error: {0}")]
    Storage(String),
    #[error("invalid connection uri: {0}")]
    Uri(#[from] nwc_uri::UriError),
}

impl From<rusqlite::Error> for WalletError {
    fn from(e: rusqlite::Error) -> Self {
        WalletError::Storage(e.to_string())
    }
}

/// Operations the core needs from a wallet that manages NWC profiles.
///
/// Implementations own persistence and connection-secret generation; the core only caches
/// what `get_nwc_profiles` returns.
#[async_trait]
pub trait NwcWallet: Send + Sync + 'static {
    async fn get_nwc_profiles(&self) -> Result<Vec<ConnectionProfile>, WalletError>;

    /// `Ok(None)` means the wallet declined without an error.
    async fn create_nwc_profile(
        &self,
        name: &str,
    ) -> Result<Option<ConnectionProfile>, WalletError>;

    /// Replaces the stored profile with the same `index`.
    async fn edit_nwc_profile(&self, profile: ConnectionProfile) -> Result<(), WalletError>;
}

/// Message suitable for showing inline in the creation dialog.
pub fn user_visible_wallet_error(err: &WalletError, locale: Locale) -> String {
    match err {
        WalletError::Unavailable => t(locale, Message::WalletUnavailable).to_string(),
        WalletError::Rejected(msg) => msg.clone(),
        WalletError::NotFound(_) => t(locale, Message::ConnectionNotFound).to_string(),
        WalletError::Storage(_) => t(locale, Message::WalletStorageFailed).to_string(),
        WalletError::Uri(_) => t(locale, Message::ConnectionCreateFailed).to_string(),
    }
}
