// SQLite-backed NWC profile store used when no host wallet is injected.

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use async_trait::async_trait;
use nostr::Keys;
use nwc_uri::NwcConnectionUri;
use rusqlite::Connection;

use super::wallet_db::{self, StoredProfile};
use crate::state::{now_seconds, ConnectionProfile};
use crate::wallet::{NwcWallet, WalletError};

pub struct LocalNwcWallet {
    conn: Arc<Mutex<Connection>>,
    service_keys: Keys,
    relay: String,
}

impl LocalNwcWallet {
    /// Opens (or creates) the profile DB under `data_dir`. New profiles are issued on `relay`.
    pub fn open(data_dir: &str, relay: impl Into<String>) -> anyhow::Result<Self> {
        let conn = wallet_db::open_wallet_db(data_dir).context("open nwc profile db")?;

        let service_keys = match wallet_db::load_service_secret(&conn)
            .context("load nwc service key")?
        {
            Some(secret_hex) => Keys::parse(&secret_hex).context("parse stored nwc service key")?,
            None => {
                let keys = Keys::generate();
                wallet_db::save_service_secret(&conn, &keys.secret_key().to_secret_hex())
                    .context("persist nwc service key")?;
                tracing::info!(pubkey = %keys.public_key().to_hex(), "generated nwc service key");
                keys
            }
        };

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            service_keys,
            relay: relay.into(),
        })
    }

    pub fn service_pubkey_hex(&self) -> String {
        self.service_keys.public_key().to_hex()
    }

    /// Runs `f` against the profile DB on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, WalletError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, WalletError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || f(&lock(&conn)))
            .await
            .map_err(|e| WalletError::Storage(format!("profile db task failed: {e}")))?
    }

    fn to_profile(&self, stored: StoredProfile) -> Result<ConnectionProfile, WalletError> {
        let nwc_uri = NwcConnectionUri::new(
            self.service_pubkey_hex(),
            stored.relay.clone(),
            stored.client_secret,
        )
        .to_uri_string()?;
        Ok(ConnectionProfile {
            index: stored.index,
            name: stored.name,
            relay: stored.relay,
            nwc_uri,
            enabled: stored.enabled,
        })
    }
}

fn lock(conn: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    match conn.lock() {
        Ok(g) => g,
        Err(poison) => poison.into_inner(),
    }
}

#[async_trait]
impl NwcWallet for LocalNwcWallet {
    async fn get_nwc_profiles(&self) -> Result<Vec<ConnectionProfile>, WalletError> {
        let stored = self
            .with_conn(|conn| Ok(wallet_db::load_profiles(conn)?))
            .await?;
        stored.into_iter().map(|p| self.to_profile(p)).collect()
    }

    async fn create_nwc_profile(
        &self,
        name: &str,
    ) -> Result<Option<ConnectionProfile>, WalletError> {
        let name = name.to_string();
        let relay = self.relay.clone();
        let stored = self
            .with_conn(move |conn| {
                if wallet_db::name_exists(conn, &name)? {
                    return Err(WalletError::Rejected(format!(
                        "a connection named {name} already exists"
                    )));
                }
                let client_secret = Keys::generate().secret_key().to_secret_hex();
                let index =
                    wallet_db::insert_profile(conn, &name, &relay, &client_secret, now_seconds())?;
                Ok(wallet_db::load_profile(conn, index)?)
            })
            .await?;
        let Some(stored) = stored else {
            return Ok(None);
        };
        tracing::info!(index = stored.index, "nwc profile stored");
        self.to_profile(stored).map(Some)
    }

    async fn edit_nwc_profile(&self, profile: ConnectionProfile) -> Result<(), WalletError> {
        let index = profile.index;
        let updated = self
            .with_conn(move |conn| {
                Ok(wallet_db::update_profile(
                    conn,
                    profile.index,
                    &profile.name,
                    profile.enabled,
                )?)
            })
            .await?;
        if !updated {
            return Err(WalletError::NotFound(index));
        }
        Ok(())
    }
}
