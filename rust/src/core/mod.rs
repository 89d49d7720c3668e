mod config;
mod connections;
mod local_wallet;
mod wallet_db;

use std::sync::{Arc, RwLock};
use std::time::Duration;

use flume::Sender;

use crate::actions::AppAction;
use crate::i18n::{t, Locale, Message};
use crate::nav::nav_entries;
use crate::state::AppState;
use crate::updates::{AppUpdate, CoreMsg, InternalEvent};
use crate::wallet::NwcWallet;
use crate::SharedUriOpener;

pub use local_wallet::LocalNwcWallet;

use connections::{InFlight, ProfileCache};

const TOAST_DISMISS_SECS: u64 = 3;

pub(crate) fn default_app_config_json() -> String {
    config::default_app_config_json()
}

/// Opens the built-in SQLite wallet for `data_dir`, using the configured relay.
pub(crate) fn open_local_wallet(data_dir: &str) -> Option<Arc<dyn NwcWallet>> {
    let relay = config::load_app_config(data_dir).nwc_relay_url();
    match LocalNwcWallet::open(data_dir, relay) {
        Ok(wallet) => Some(Arc::new(wallet)),
        Err(e) => {
            tracing::error!(err = format!("{e:#}"), "failed to open local nwc wallet");
            None
        }
    }
}

pub struct AppCore {
    pub state: AppState,
    rev: u64,

    update_sender: Sender<AppUpdate>,
    core_sender: Sender<CoreMsg>,
    shared_state: Arc<RwLock<AppState>>,
    uri_opener: SharedUriOpener,

    data_dir: String,
    config: config::AppConfig,
    runtime: tokio::runtime::Runtime,

    // `None` when the host never provided a wallet; every wallet call then fails as Unavailable.
    wallet: Option<Arc<dyn NwcWallet>>,
    profile_cache: ProfileCache,
    in_flight: InFlight,

    toast_dismiss_token: u64,
}

impl AppCore {
    pub fn new(
        update_sender: Sender<AppUpdate>,
        core_sender: Sender<CoreMsg>,
        data_dir: String,
        shared_state: Arc<RwLock<AppState>>,
        uri_opener: SharedUriOpener,
        wallet: Option<Arc<dyn NwcWallet>>,
    ) -> Self {
        let config = config::load_app_config(&data_dir);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_time()
            .build()
            .expect("tokio runtime");

        if wallet.is_none() {
            tracing::warn!("app core started without a wallet");
        }

        let this = Self {
            state: AppState::empty(),
            rev: 0,
            update_sender,
            core_sender,
            shared_state,
            uri_opener,
            data_dir,
            config,
            runtime,
            wallet,
            profile_cache: ProfileCache::default(),
            in_flight: InFlight::default(),
            toast_dismiss_token: 0,
        };

        // Ensure FfiApp.state() has an immediately-available snapshot.
        let snapshot = this.state.clone();
        this.commit_state_snapshot(&snapshot);
        this
    }

    fn locale(&self) -> Locale {
        self.config.locale()
    }

    fn msg(&self, msg: Message) -> String {
        t(self.locale(), msg).to_string()
    }

    fn next_rev(&mut self) -> u64 {
        self.rev += 1;
        self.state.rev = self.rev;
        self.rev
    }

    fn commit_state_snapshot(&self, snapshot: &AppState) {
        match self.shared_state.write() {
            Ok(mut g) => *g = snapshot.clone(),
            Err(poison) => *poison.into_inner() = snapshot.clone(),
        }
    }

    fn emit_state(&mut self) {
        self.next_rev();
        let snapshot = self.state.clone();
        self.commit_state_snapshot(&snapshot);
        let _ = self.update_sender.send(AppUpdate::FullState(snapshot));
    }

    fn emit_router(&mut self) {
        self.emit_state();
    }

    fn emit_connections(&mut self) {
        self.emit_state();
    }

    fn emit_toast(&mut self) {
        self.emit_state();
    }

    fn toast(&mut self, msg: impl Into<String>) {
        self.state.toast = Some(msg.into());
        self.toast_dismiss_token = self.toast_dismiss_token.saturating_add(1);
        self.schedule_toast_auto_dismiss(self.toast_dismiss_token);
        self.emit_toast();
    }

    fn schedule_toast_auto_dismiss(&self, token: u64) {
        let tx = self.core_sender.clone();
        self.runtime.spawn(async move {
            tokio::time::sleep(Duration::from_secs(TOAST_DISMISS_SECS)).await;
            let _ = tx.send(CoreMsg::Internal(Box::new(
                InternalEvent::ToastAutoDismiss { token },
            )));
        });
    }

    fn handle_toast_auto_dismiss(&mut self, token: u64) {
        // A newer toast replaced this one; its own timer will clear it.
        if token != self.toast_dismiss_token || self.state.toast.is_none() {
            return;
        }
        self.state.toast = None;
        self.emit_toast();
    }

    /// Hands `uri` to the host platform. Whether the platform managed to open it is not observed.
    fn open_uri(&mut self, uri: String) {
        let opener = match self.uri_opener.read() {
            Ok(slot) => slot.clone(),
            Err(poison) => poison.into_inner().clone(),
        };
        match opener {
            Some(opener) => opener.open_uri(uri),
            None => {
                tracing::warn!("no uri opener installed");
                let msg = self.msg(Message::NoUriHandler);
                self.toast(msg);
            }
        }
    }

    pub fn handle_message(&mut self, msg: CoreMsg) {
        match msg {
            CoreMsg::Action(action) => {
                // Never log `?action` directly: it can carry connection names and URIs.
                tracing::info!(action = action.tag(), "dispatch");
                self.handle_action(action);
            }
            CoreMsg::Internal(internal) => self.handle_internal(*internal),
        }
    }

    fn handle_internal(&mut self, internal: InternalEvent) {
        match internal {
            InternalEvent::ProfilesFetched { generation, result } => {
                self.handle_profiles_fetched(generation, result)
            }
            InternalEvent::ConnectionCreated { result } => self.handle_connection_created(result),
            InternalEvent::ConnectionEdited { index, result } => {
                self.handle_connection_edited(index, result)
            }
            InternalEvent::ToastAutoDismiss { token } => self.handle_toast_auto_dismiss(token),
        }
    }

    fn handle_action(&mut self, action: AppAction) {
        match action {
            // Navigation
            AppAction::SelectTab { tab } => {
                self.state.active_tab = tab;
                self.state.nav = nav_entries(tab);
                self.emit_router();
            }

            // Connections
            AppAction::OpenConnections { query } => self.open_connections(query),
            AppAction::RefreshConnections => self.refresh_connections(),
            AppAction::OpenCreateConnection => self.open_create_connection(),
            AppAction::CloseCreateConnection => self.close_create_connection(),
            AppAction::SetConnectionName { name } => self.set_connection_name(name),
            AppAction::CreateConnection => self.create_connection(),
            AppAction::ToggleConnectionEnabled { index } => self.toggle_connection_enabled(index),
            AppAction::OpenConnectionInClient { index, client } => {
                self.open_connection_in_client(index, client)
            }
            AppAction::ConfirmCallbackRedirect => self.confirm_callback_redirect(),
            AppAction::DismissCallbackRedirect => {
                if self.state.connections.callback_prompt.take().is_some() {
                    self.emit_connections();
                }
            }

            // UI
            AppAction::ClearToast => {
                if self.state.toast.is_some() {
                    self.state.toast = None;
                    self.emit_toast();
                }
            }

            // Lifecycle
            AppAction::ReloadConfig => {
                self.config = config::load_app_config(&self.data_dir);
                tracing::info!(locale = ?self.locale(), "config reloaded");
                let msg = self.msg(Message::ConfigReloaded);
                self.toast(msg);
            }
        }
    }
}
