use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use nwc_uri::NwcConnectionUri;
use serde_json::json;
use tracing_subscriber::EnvFilter;
use wallet_core::{
    AppAction, AppState, ConnectionProfile, ConnectionsQuery, ExternalClient, FfiApp, NavTab,
    UriOpener, nav_entries,
};

#[derive(Parser)]
#[command(author, version, about = "Manage Nostr Wallet Connect connections")]
struct Cli {
    /// Directory holding the profile DB, config and logs
    #[arg(long, env = "WALLET_DATA_DIR", default_value = ".walletctl")]
    data_dir: PathBuf,

    /// How long to wait for the wallet before giving up
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List connection profiles
    List,
    /// Create a connection profile
    Create {
        name: String,
        /// Scheme of the app that requested the connection; prints the hand-back URI
        #[arg(long)]
        callback_scheme: Option<String>,
        /// Open the hand-back URI instead of only printing it
        #[arg(long, default_value_t = false)]
        open: bool,
    },
    /// Flip a profile between enabled and disabled
    Toggle { index: u32 },
    /// Print a profile's connection URI with a QR code
    Show { index: u32 },
    /// Open a profile's connection URI in a Nostr client
    Open {
        index: u32,
        #[arg(long, value_enum, default_value_t = ClientArg::Generic)]
        client: ClientArg,
        /// Print the URI instead of launching the client
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Print the navigation entries with `tab` highlighted
    Nav { tab: String },
    /// Write a default wallet_config.json into the data dir
    InitConfig {
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ClientArg {
    Generic,
    Primal,
}

impl From<ClientArg> for ExternalClient {
    fn from(arg: ClientArg) -> Self {
        match arg {
            ClientArg::Generic => ExternalClient::NostrClient,
            ClientArg::Primal => ExternalClient::Primal,
        }
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let timeout = Duration::from_secs(cli.timeout_secs);

    let command = match cli.command {
        Commands::Nav { tab } => return cmd_nav(&tab),
        Commands::InitConfig { force } => return cmd_init_config(&cli.data_dir, force),
        command => command,
    };

    std::fs::create_dir_all(&cli.data_dir)
        .with_context(|| format!("create data dir {}", cli.data_dir.display()))?;
    let app = FfiApp::new(cli.data_dir.to_string_lossy().into_owned());
    let session = Session { app, timeout };

    match command {
        Commands::List => cmd_list(&session),
        Commands::Create {
            name,
            callback_scheme,
            open,
        } => cmd_create(&session, name, callback_scheme, open),
        Commands::Toggle { index } => cmd_toggle(&session, index),
        Commands::Show { index } => cmd_show(&session, index),
        Commands::Open {
            index,
            client,
            dry_run,
        } => cmd_open(&session, index, client, dry_run),
        Commands::Nav { .. } | Commands::InitConfig { .. } => Ok(()),
    }
}

struct Session {
    app: Arc<FfiApp>,
    timeout: Duration,
}

impl Session {
    /// Polls published snapshots until `done` holds.
    fn wait_for(&self, what: &str, done: impl Fn(&AppState) -> bool) -> Result<AppState> {
        let start = Instant::now();
        loop {
            let state = self.app.state();
            if done(&state) {
                return Ok(state);
            }
            if start.elapsed() >= self.timeout {
                bail!("timed out waiting for {what}");
            }
            std::thread::sleep(Duration::from_millis(25));
        }
    }

    fn refreshed(&self) -> Result<AppState> {
        let before = self.app.state().rev;
        self.app.dispatch(AppAction::RefreshConnections);
        self.wait_for("connection list", |s| {
            s.rev > before && !s.connections.refreshing
        })
    }

    fn profile(&self, index: u32) -> Result<ConnectionProfile> {
        let state = self.refreshed()?;
        let profiles = state
            .connections
            .profiles
            .ok_or_else(|| anyhow!("wallet did not return any connections"))?;
        profiles
            .into_iter()
            .find(|p| p.index == index)
            .ok_or_else(|| anyhow!("no connection with index {index}"))
    }
}

fn profile_json(p: &ConnectionProfile) -> serde_json::Value {
    json!({
        "index": p.index,
        "name": p.name,
        "relay": p.relay,
        "enabled": p.enabled,
        "nwc_uri": p.nwc_uri,
    })
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_list(session: &Session) -> Result<()> {
    let state = session.refreshed()?;
    let Some(profiles) = state.connections.profiles else {
        bail!("wallet did not return any connections (see wallet.log)");
    };
    let items: Vec<_> = profiles.iter().map(profile_json).collect();
    print_json(&json!(items))
}

fn cmd_create(
    session: &Session,
    name: String,
    callback_scheme: Option<String>,
    open: bool,
) -> Result<()> {
    let opener = RecordingOpener::new(!open);
    session.app.set_uri_opener(Box::new(opener.clone()));

    session.app.dispatch(AppAction::OpenConnections {
        query: ConnectionsQuery {
            name: None,
            callback_uri: callback_scheme,
        },
    });
    session.app.dispatch(AppAction::OpenCreateConnection);
    session.app.dispatch(AppAction::SetConnectionName { name: name.clone() });
    session.app.dispatch(AppAction::CreateConnection);

    let wanted = name.trim().to_string();
    let state = session.wait_for("connection create", |s| match &s.connections.create_form {
        Some(form) => form.error.is_some() && !form.loading,
        None => {
            !s.connections.refreshing
                && s.connections
                    .profiles
                    .as_ref()
                    .is_some_and(|p| p.iter().any(|x| x.name == wanted))
        }
    })?;
    if let Some(err) = state.connections.create_form.and_then(|f| f.error) {
        bail!("{err}");
    }

    let created = state
        .connections
        .profiles
        .unwrap_or_default()
        .into_iter()
        .find(|p| p.name == wanted);
    let redirect = state.connections.callback_prompt.map(|p| p.uri);
    if let Some(toast) = state.toast {
        eprintln!("{toast}");
    }

    if redirect.is_some() && open {
        session.app.dispatch(AppAction::ConfirmCallbackRedirect);
        session.wait_for("callback hand-back", |s| s.connections.callback_prompt.is_none())?;
    }

    print_json(&json!({
        "profile": created.as_ref().map(profile_json),
        "callback_uri": redirect,
        "opened": opener.take(),
    }))
}

fn cmd_toggle(session: &Session, index: u32) -> Result<()> {
    let before = session.profile(index)?;
    let rev = session.app.state().rev;
    session
        .app
        .dispatch(AppAction::ToggleConnectionEnabled { index });
    let state = session.wait_for("toggle", |s| {
        s.rev > rev
            && s.connections.toggling.is_empty()
            && !s.connections.refreshing
            && s.connections.profiles.is_some()
    })?;
    let after = state
        .connections
        .profiles
        .unwrap_or_default()
        .into_iter()
        .find(|p| p.index == index)
        .ok_or_else(|| anyhow!("connection {index} disappeared"))?;
    if after.enabled == before.enabled {
        bail!("wallet did not apply the change (see wallet.log)");
    }
    print_json(&profile_json(&after))
}

fn cmd_show(session: &Session, index: u32) -> Result<()> {
    let profile = session.profile(index)?;
    let parsed = NwcConnectionUri::parse(&profile.nwc_uri).ok();
    println!("{}  ({})", profile.name, if profile.enabled { "enabled" } else { "disabled" });
    if let Some(parsed) = parsed {
        println!("wallet: {}", parsed.wallet_pubkey);
        for relay in &parsed.relays {
            println!("relay:  {relay}");
        }
    }
    println!("{}", profile.nwc_uri);
    qr2term::print_qr(&profile.nwc_uri).context("render qr code")?;
    Ok(())
}

fn cmd_open(session: &Session, index: u32, client: ClientArg, dry_run: bool) -> Result<()> {
    // Look the profile up first so a bad index fails before anything is launched.
    session.profile(index)?;
    let opener = RecordingOpener::new(dry_run);
    session.app.set_uri_opener(Box::new(opener.clone()));

    session.app.dispatch(AppAction::OpenConnectionInClient {
        index,
        client: client.into(),
    });
    let state = session.wait_for("client launch", |s| {
        s.toast.is_some() || !opener.is_empty()
    })?;
    if let Some(toast) = state.toast {
        if opener.is_empty() {
            bail!("{toast}");
        }
    }
    for uri in opener.take() {
        println!("{uri}");
    }
    Ok(())
}

fn cmd_nav(tab: &str) -> Result<()> {
    let entries: Vec<_> = nav_entries(NavTab::from_name(tab))
        .into_iter()
        .map(|e| {
            json!({
                "tab": e.tab.name(),
                "href": e.href,
                "label": e.label,
                "active": e.active,
            })
        })
        .collect();
    print_json(&json!(entries))
}

fn cmd_init_config(data_dir: &Path, force: bool) -> Result<()> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("create data dir {}", data_dir.display()))?;
    let path = data_dir.join("wallet_config.json");
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    std::fs::write(&path, wallet_core::default_config_json())
        .with_context(|| format!("write {}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(())
}

/// Records every URI the core hands over and, unless `dry_run`, launches it with the OS handler.
#[derive(Clone)]
struct RecordingOpener {
    dry_run: bool,
    launch: fn(&str) -> std::io::Result<()>,
    opened: Arc<Mutex<Vec<String>>>,
}

impl RecordingOpener {
    fn new(dry_run: bool) -> Self {
        Self::with_launcher(dry_run, launch_with_os)
    }

    fn with_launcher(dry_run: bool, launch: fn(&str) -> std::io::Result<()>) -> Self {
        Self {
            dry_run,
            launch,
            opened: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        match self.opened.lock() {
            Ok(g) => g,
            Err(poison) => poison.into_inner(),
        }
    }

    fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lock())
    }
}

impl UriOpener for RecordingOpener {
    fn open_uri(&self, uri: String) {
        if !self.dry_run {
            if let Err(e) = (self.launch)(&uri) {
                tracing::warn!(%e, "failed to launch uri handler");
            }
        }
        self.lock().push(uri);
    }
}

fn launch_with_os(uri: &str) -> std::io::Result<()> {
    open::that(uri)
}
