//! End-to-end connection flows through `FfiApp`: the built-in SQLite wallet and an injected one.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tempfile::tempdir;
use wallet_core::{
    AppAction, AppReconciler, AppUpdate, ConnectionProfile, ConnectionsQuery, ExternalClient,
    FfiApp, NavTab, NwcWallet, UriOpener, WalletError,
};

fn wait_until(what: &str, timeout: Duration, mut f: impl FnMut() -> bool) {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if f() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("{what}: condition not met within {timeout:?}");
}

#[derive(Clone, Default)]
struct Collector {
    updates: Arc<Mutex<Vec<AppUpdate>>>,
}

impl AppReconciler for Collector {
    fn reconcile(&self, update: AppUpdate) {
        self.updates.lock().unwrap().push(update);
    }
}

#[derive(Clone, Default)]
struct Opened {
    uris: Arc<Mutex<Vec<String>>>,
}

impl UriOpener for Opened {
    fn open_uri(&self, uri: String) {
        self.uris.lock().unwrap().push(uri);
    }
}

fn data_dir(dir: &tempfile::TempDir) -> String {
    dir.path().to_string_lossy().into_owned()
}

#[test]
fn deep_link_create_and_hand_back_to_requesting_app() {
    let dir = tempdir().unwrap();
    let app = FfiApp::new(data_dir(&dir));
    let collector = Collector::default();
    app.listen_for_updates(Box::new(collector.clone()));
    let opened = Opened::default();
    app.set_uri_opener(Box::new(opened.clone()));

    app.dispatch(AppAction::OpenConnections {
        query: ConnectionsQuery {
            name: Some("Damus".into()),
            callback_uri: Some("damus".into()),
        },
    });
    wait_until("connections listed", Duration::from_secs(5), || {
        app.state().connections.profiles.is_some()
    });
    assert_eq!(app.state().active_tab, NavTab::Settings);
    assert_eq!(
        app.state().connections.create_form.map(|f| f.name),
        Some("Damus".to_string())
    );

    app.dispatch(AppAction::CreateConnection);
    wait_until("callback prompt", Duration::from_secs(5), || {
        app.state().connections.callback_prompt.is_some()
    });
    let state = app.state();
    let prompt = state.connections.callback_prompt.clone().unwrap();
    assert!(state.connections.create_form.is_none());
    assert!(prompt.uri.starts_with("damus://"));

    wait_until("profile listed", Duration::from_secs(5), || {
        app.state()
            .connections
            .profiles
            .is_some_and(|p| p.len() == 1)
    });
    let created = app.state().connections.profiles.unwrap().remove(0);
    assert_eq!(created.name, "Damus");
    assert_eq!(
        prompt.uri,
        created.nwc_uri.replacen("nostr+walletconnect", "damus", 1)
    );

    app.dispatch(AppAction::ConfirmCallbackRedirect);
    wait_until("redirect opened", Duration::from_secs(5), || {
        !opened.uris.lock().unwrap().is_empty()
    });
    assert_eq!(*opened.uris.lock().unwrap(), vec![prompt.uri]);

    let updates = collector.updates.lock().unwrap();
    let revs: Vec<u64> = updates.iter().map(AppUpdate::rev).collect();
    assert!(revs.windows(2).all(|w| w[0] < w[1]), "revs not increasing: {revs:?}");
}

#[test]
fn toggle_and_open_in_primal_with_local_wallet() {
    let dir = tempdir().unwrap();
    let app = FfiApp::new(data_dir(&dir));
    let opened = Opened::default();
    app.set_uri_opener(Box::new(opened.clone()));

    app.dispatch(AppAction::OpenCreateConnection);
    app.dispatch(AppAction::SetConnectionName {
        name: "Alice".into(),
    });
    app.dispatch(AppAction::CreateConnection);
    wait_until("profile listed", Duration::from_secs(5), || {
        app.state()
            .connections
            .profiles
            .is_some_and(|p| p.len() == 1)
    });
    let profile = app.state().connections.profiles.unwrap().remove(0);
    assert!(profile.enabled);

    app.dispatch(AppAction::ToggleConnectionEnabled {
        index: profile.index,
    });
    wait_until("profile disabled", Duration::from_secs(5), || {
        let s = app.state();
        s.connections.toggling.is_empty()
            && !s.connections.refreshing
            && s.connections
                .profiles
                .is_some_and(|p| p.iter().all(|x| !x.enabled))
    });

    app.dispatch(AppAction::OpenConnectionInClient {
        index: profile.index,
        client: ExternalClient::Primal,
    });
    wait_until("primal opened", Duration::from_secs(5), || {
        !opened.uris.lock().unwrap().is_empty()
    });
    let uri = opened.uris.lock().unwrap()[0].clone();
    assert_eq!(
        uri,
        profile.nwc_uri.replacen("nostr+walletconnect://", "primal://", 1)
    );
}

#[test]
fn profiles_survive_restart() {
    let dir = tempdir().unwrap();
    {
        let app = FfiApp::new(data_dir(&dir));
        app.dispatch(AppAction::OpenCreateConnection);
        app.dispatch(AppAction::SetConnectionName { name: "Bob".into() });
        app.dispatch(AppAction::CreateConnection);
        wait_until("profile listed", Duration::from_secs(5), || {
            app.state()
                .connections
                .profiles
                .is_some_and(|p| p.len() == 1)
        });
    }

    let app = FfiApp::new(data_dir(&dir));
    app.dispatch(AppAction::RefreshConnections);
    wait_until("profile reloaded", Duration::from_secs(5), || {
        app.state()
            .connections
            .profiles
            .is_some_and(|p| p.len() == 1 && p[0].name == "Bob")
    });
}

struct RejectingWallet;

#[async_trait]
impl NwcWallet for RejectingWallet {
    async fn get_nwc_profiles(&self) -> Result<Vec<ConnectionProfile>, WalletError> {
        Ok(Vec::new())
    }

    async fn create_nwc_profile(
        &self,
        _name: &str,
    ) -> Result<Option<ConnectionProfile>, WalletError> {
        Err(WalletError::Rejected("wallet is locked".into()))
    }

    async fn edit_nwc_profile(&self, profile: ConnectionProfile) -> Result<(), WalletError> {
        Err(WalletError::NotFound(profile.index))
    }
}

#[test]
fn injected_wallet_errors_land_in_the_form() {
    let dir = tempdir().unwrap();
    let app = FfiApp::with_wallet(data_dir(&dir), Arc::new(RejectingWallet));

    app.dispatch(AppAction::OpenConnections {
        query: ConnectionsQuery {
            name: Some("Alice".into()),
            callback_uri: Some("myapp".into()),
        },
    });
    app.dispatch(AppAction::CreateConnection);
    wait_until("create failed", Duration::from_secs(5), || {
        app.state()
            .connections
            .create_form
            .is_some_and(|f| f.error.is_some())
    });

    let state = app.state();
    let form = state.connections.create_form.unwrap();
    assert_eq!(form.error.as_deref(), Some("wallet is locked"));
    assert!(!form.loading);
    assert!(state.connections.callback_prompt.is_none());
}
