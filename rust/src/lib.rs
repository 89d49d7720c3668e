mod actions;
mod core;
mod i18n;
mod logging;
mod nav;
mod state;
mod updates;
mod wallet;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::thread;

use flume::{Receiver, Sender};

pub use actions::AppAction;
pub use crate::core::LocalNwcWallet;
pub use i18n::Locale;
pub use nav::*;
pub use state::*;
pub use updates::*;
pub use wallet::{user_visible_wallet_error, NwcWallet, WalletError};

uniffi::setup_scaffolding!();

#[uniffi::export(callback_interface)]
pub trait AppReconciler: Send + Sync + 'static {
    fn reconcile(&self, update: AppUpdate);
}

/// Platform hook for handing a URI to another app (NWC clients, callback schemes).
#[uniffi::export(callback_interface)]
pub trait UriOpener: Send + Sync + 'static {
    fn open_uri(&self, uri: String);
}

pub type SharedUriOpener = Arc<RwLock<Option<Arc<dyn UriOpener>>>>;

/// Example `wallet_config.json` with every key filled in.
#[uniffi::export]
pub fn default_config_json() -> String {
    crate::core::default_app_config_json()
}

#[derive(uniffi::Object)]
pub struct FfiApp {
    core_tx: Sender<CoreMsg>,
    update_rx: Receiver<AppUpdate>,
    listening: AtomicBool,
    shared_state: Arc<RwLock<AppState>>,
    uri_opener: SharedUriOpener,
}

#[uniffi::export]
impl FfiApp {
    /// Starts the core backed by the built-in SQLite wallet under `data_dir`.
    #[uniffi::constructor]
    pub fn new(data_dir: String) -> Arc<Self> {
        logging::init_logging(&data_dir);
        tracing::info!(data_dir = %data_dir, "FfiApp::new() starting");
        let wallet = crate::core::open_local_wallet(&data_dir);
        Self::start(data_dir, wallet)
    }

    pub fn state(&self) -> AppState {
        match self.shared_state.read() {
            Ok(g) => g.clone(),
            Err(poison) => poison.into_inner().clone(),
        }
    }

    pub fn dispatch(&self, action: AppAction) {
        // Contract: never block caller.
        let _ = self.core_tx.send(CoreMsg::Action(action));
    }

    pub fn listen_for_updates(&self, reconciler: Box<dyn AppReconciler>) {
        if self
            .listening
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            // Avoid multiple listeners that would split messages.
            return;
        }

        let rx = self.update_rx.clone();
        thread::spawn(move || {
            while let Ok(update) = rx.recv() {
                reconciler.reconcile(update);
            }
        });
    }

    pub fn set_uri_opener(&self, opener: Box<dyn UriOpener>) {
        let opener: Arc<dyn UriOpener> = Arc::from(opener);
        match self.uri_opener.write() {
            Ok(mut slot) => {
                *slot = Some(opener);
            }
            Err(poison) => {
                *poison.into_inner() = Some(opener);
            }
        }
    }
}

impl FfiApp {
    /// Starts the core against a host-provided wallet instead of the built-in one.
    pub fn with_wallet(data_dir: String, wallet: Arc<dyn NwcWallet>) -> Arc<Self> {
        logging::init_logging(&data_dir);
        tracing::info!(data_dir = %data_dir, "FfiApp::with_wallet() starting");
        Self::start(data_dir, Some(wallet))
    }

    fn start(data_dir: String, wallet: Option<Arc<dyn NwcWallet>>) -> Arc<Self> {
        let (update_tx, update_rx) = flume::unbounded();
        let (core_tx, core_rx) = flume::unbounded::<CoreMsg>();
        let shared_state = Arc::new(RwLock::new(AppState::empty()));
        let uri_opener: SharedUriOpener = Arc::new(RwLock::new(None));

        // Actor loop thread (single threaded "app actor").
        let core_tx_for_core = core_tx.clone();
        let shared_for_core = shared_state.clone();
        let opener_for_core = uri_opener.clone();
        thread::spawn(move || {
            let mut core = crate::core::AppCore::new(
                update_tx,
                core_tx_for_core,
                data_dir,
                shared_for_core,
                opener_for_core,
                wallet,
            );
            while let Ok(msg) = core_rx.recv() {
                core.handle_message(msg);
            }
        });

        Arc::new(Self {
            core_tx,
            update_rx,
            listening: AtomicBool::new(false),
            shared_state,
            uri_opener,
        })
    }
}
