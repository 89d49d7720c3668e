// NWC connection-profile lifecycle: list, create, toggle, and URI hand-off.
//
// Every wallet call runs on the core runtime and reports back as an `InternalEvent`; all state
// changes happen on the actor thread.

use std::collections::HashSet;

use super::AppCore;
use crate::i18n::Message;
use crate::nav::{nav_entries, NavTab};
use crate::state::{
    CallbackPrompt, ConnectionProfile, ConnectionsQuery, CreateConnectionForm, ExternalClient,
};
use crate::updates::{CoreMsg, InternalEvent};
use crate::wallet::{user_visible_wallet_error, WalletError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(super) enum OpKey {
    List,
    Create,
    Toggle(u32),
}

/// At most one request per key is outstanding. A refresh requested while a list is already in
/// flight is coalesced into a single follow-up fetch.
#[derive(Debug, Default)]
pub(super) struct InFlight {
    keys: HashSet<OpKey>,
    list_dirty: bool,
}

impl InFlight {
    pub(super) fn try_begin(&mut self, key: OpKey) -> bool {
        self.keys.insert(key)
    }

    pub(super) fn finish(&mut self, key: OpKey) {
        self.keys.remove(&key);
    }

    pub(super) fn contains(&self, key: OpKey) -> bool {
        self.keys.contains(&key)
    }

    pub(super) fn mark_list_dirty(&mut self) {
        self.list_dirty = true;
    }

    pub(super) fn take_list_dirty(&mut self) -> bool {
        std::mem::take(&mut self.list_dirty)
    }

    pub(super) fn toggling(&self) -> Vec<u32> {
        let mut out: Vec<u32> = self
            .keys
            .iter()
            .filter_map(|k| match k {
                OpKey::Toggle(index) => Some(*index),
                _ => None,
            })
            .collect();
        out.sort_unstable();
        out
    }
}

/// Last profile list the wallet reported, tagged with a generation.
///
/// The generation moves when a mutation starts and again when it resolves. A fetch only lands
/// if it was issued after the last mutation resolved and no mutation is still outstanding.
#[derive(Debug, Default)]
pub(super) struct ProfileCache {
    entries: Option<Vec<ConnectionProfile>>,
    generation: u64,
    mutations_in_flight: usize,
}

impl ProfileCache {
    pub(super) fn generation(&self) -> u64 {
        self.generation
    }

    fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    pub(super) fn begin_mutation(&mut self) {
        self.mutations_in_flight += 1;
        self.invalidate();
    }

    pub(super) fn end_mutation(&mut self) {
        self.mutations_in_flight = self.mutations_in_flight.saturating_sub(1);
        self.invalidate();
    }

    /// Returns false (and keeps the current entries) for a fetch that overlapped a mutation.
    pub(super) fn accept(
        &mut self,
        generation: u64,
        entries: Option<Vec<ConnectionProfile>>,
    ) -> bool {
        if self.mutations_in_flight > 0 || generation != self.generation {
            return false;
        }
        self.entries = entries;
        true
    }

    pub(super) fn entries(&self) -> Option<&[ConnectionProfile]> {
        self.entries.as_deref()
    }

    pub(super) fn find(&self, index: u32) -> Option<&ConnectionProfile> {
        self.entries.as_ref()?.iter().find(|p| p.index == index)
    }
}

impl AppCore {
    fn sync_connections_view(&mut self) {
        self.state.connections.profiles = self.profile_cache.entries().map(<[_]>::to_vec);
        self.state.connections.refreshing = self.in_flight.contains(OpKey::List);
        self.state.connections.toggling = self.in_flight.toggling();
    }

    pub(super) fn open_connections(&mut self, query: ConnectionsQuery) {
        self.state.active_tab = NavTab::Settings;
        self.state.nav = nav_entries(NavTab::Settings);

        let prefill = query
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .map(ToString::to_string);
        if let Some(name) = prefill {
            self.state.connections.create_form = Some(CreateConnectionForm {
                name,
                ..Default::default()
            });
        }
        self.state.connections.query = query;

        self.refresh_connections();
    }

    pub(super) fn refresh_connections(&mut self) {
        if !self.in_flight.try_begin(OpKey::List) {
            self.in_flight.mark_list_dirty();
            self.sync_connections_view();
            self.emit_connections();
            return;
        }

        let generation = self.profile_cache.generation();
        let Some(wallet) = self.wallet.clone() else {
            self.handle_profiles_fetched(generation, Err(WalletError::Unavailable));
            return;
        };

        self.sync_connections_view();
        self.emit_connections();

        let tx = self.core_sender.clone();
        self.runtime.spawn(async move {
            let result = wallet.get_nwc_profiles().await;
            let _ = tx.send(CoreMsg::Internal(Box::new(
                InternalEvent::ProfilesFetched { generation, result },
            )));
        });
    }

    pub(super) fn handle_profiles_fetched(
        &mut self,
        generation: u64,
        result: Result<Vec<ConnectionProfile>, WalletError>,
    ) {
        self.in_flight.finish(OpKey::List);

        let entries = match result {
            Ok(profiles) => {
                tracing::debug!(count = profiles.len(), "nwc profiles fetched");
                Some(profiles)
            }
            Err(e) => {
                // Callers treat "no data" as a valid state; nothing is surfaced.
                tracing::warn!(%e, "failed to load nwc profiles");
                None
            }
        };
        if !self.profile_cache.accept(generation, entries) {
            tracing::debug!(
                generation,
                current = self.profile_cache.generation(),
                "discarding stale nwc profile list"
            );
        }

        if self.in_flight.take_list_dirty() {
            self.refresh_connections();
            return;
        }
        self.sync_connections_view();
        self.emit_connections();
    }

    pub(super) fn open_create_connection(&mut self) {
        if self.state.connections.create_form.is_none() {
            self.state.connections.create_form = Some(CreateConnectionForm::default());
            self.emit_connections();
        }
    }

    pub(super) fn close_create_connection(&mut self) {
        if self.state.connections.create_form.take().is_some() {
            self.emit_connections();
        }
    }

    pub(super) fn set_connection_name(&mut self, name: String) {
        let Some(form) = self.state.connections.create_form.as_mut() else {
            return;
        };
        form.name = name;
        self.emit_connections();
    }

    pub(super) fn create_connection(&mut self) {
        if self.state.connections.create_form.is_none() {
            tracing::debug!("create requested without an open form");
            return;
        }
        if !self.in_flight.try_begin(OpKey::Create) {
            tracing::debug!("create already in flight");
            return;
        }

        let name_required = self.msg(Message::ConnectionNameRequired);
        let mut name = None;
        if let Some(form) = self.state.connections.create_form.as_mut() {
            form.error = None;
            form.loading = true;
            let trimmed = form.name.trim();
            if trimmed.is_empty() {
                form.error = Some(name_required);
                form.loading = false;
            } else {
                name = Some(trimmed.to_string());
            }
        }
        let Some(name) = name else {
            self.in_flight.finish(OpKey::Create);
            self.emit_connections();
            return;
        };

        self.profile_cache.begin_mutation();
        let Some(wallet) = self.wallet.clone() else {
            self.handle_connection_created(Err(WalletError::Unavailable));
            return;
        };
        self.emit_connections();

        let tx = self.core_sender.clone();
        self.runtime.spawn(async move {
            let result = wallet.create_nwc_profile(&name).await;
            let _ = tx.send(CoreMsg::Internal(Box::new(
                InternalEvent::ConnectionCreated { result },
            )));
        });
    }

    pub(super) fn handle_connection_created(
        &mut self,
        result: Result<Option<ConnectionProfile>, WalletError>,
    ) {
        self.in_flight.finish(OpKey::Create);
        self.profile_cache.end_mutation();

        let failure = match result {
            Ok(Some(profile)) => {
                tracing::info!(index = profile.index, "nwc connection created");
                self.state.connections.create_form = None;
                self.state.connections.query.name = None;
                self.prepare_callback_redirect(&profile.nwc_uri);
                self.refresh_connections();
                return;
            }
            Ok(None) => {
                tracing::warn!("wallet returned no profile for create");
                self.msg(Message::ConnectionCreateFailed)
            }
            Err(e) => {
                tracing::error!(%e, "create nwc connection failed");
                user_visible_wallet_error(&e, self.locale())
            }
        };

        // Error and cleared loading flag land in the same snapshot.
        match self.state.connections.create_form.as_mut() {
            Some(form) => {
                form.error = Some(failure);
                form.loading = false;
            }
            None => tracing::debug!("create failed after the form was closed"),
        }
        self.emit_connections();
    }

    fn prepare_callback_redirect(&mut self, uri: &str) {
        let Some(scheme) = self
            .state
            .connections
            .query
            .callback_uri
            .clone()
            .filter(|s| !s.trim().is_empty())
        else {
            return;
        };
        match nwc_uri::callback_redirect(uri, &scheme) {
            Ok(redirect) => {
                self.state.connections.callback_prompt = Some(CallbackPrompt { uri: redirect });
            }
            Err(e) => {
                tracing::warn!(%e, "cannot build callback redirect");
                let msg = self.msg(Message::InvalidCallbackScheme);
                self.toast(msg);
            }
        }
    }

    pub(super) fn confirm_callback_redirect(&mut self) {
        let Some(prompt) = self.state.connections.callback_prompt.take() else {
            return;
        };
        self.state.connections.query.callback_uri = None;
        self.open_uri(prompt.uri);
        self.emit_connections();
    }

    pub(super) fn toggle_connection_enabled(&mut self, index: u32) {
        let Some(profile) = self.profile_cache.find(index).cloned() else {
            tracing::warn!(index, "toggle for unknown nwc profile");
            return;
        };
        let Some(wallet) = self.wallet.clone() else {
            tracing::warn!(index, "toggle without a wallet");
            return;
        };
        if !self.in_flight.try_begin(OpKey::Toggle(index)) {
            tracing::debug!(index, "toggle already in flight");
            return;
        }

        let edited = ConnectionProfile {
            enabled: !profile.enabled,
            ..profile
        };
        self.profile_cache.begin_mutation();
        self.sync_connections_view();
        self.emit_connections();

        let tx = self.core_sender.clone();
        self.runtime.spawn(async move {
            let result = wallet.edit_nwc_profile(edited).await;
            let _ = tx.send(CoreMsg::Internal(Box::new(
                InternalEvent::ConnectionEdited { index, result },
            )));
        });
    }

    pub(super) fn handle_connection_edited(&mut self, index: u32, result: Result<(), WalletError>) {
        self.in_flight.finish(OpKey::Toggle(index));
        self.profile_cache.end_mutation();
        if let Err(e) = result {
            // Not surfaced: a failed toggle looks like a no-op once the list is refetched.
            tracing::warn!(index, %e, "failed to toggle nwc profile");
        }
        self.refresh_connections();
    }

    pub(super) fn open_connection_in_client(&mut self, index: u32, client: ExternalClient) {
        let Some(uri) = self.profile_cache.find(index).map(|p| p.nwc_uri.clone()) else {
            tracing::warn!(index, "open for unknown nwc profile");
            let msg = self.msg(Message::ConnectionNotFound);
            self.toast(msg);
            return;
        };
        let target = nwc_uri::client_target(client.into());
        match target.external_uri(&uri) {
            Ok(external) => {
                tracing::info!(index, client = target.name, "opening connection in client");
                self.open_uri(external);
            }
            Err(e) => {
                tracing::warn!(index, client = target.name, %e, "cannot derive client uri");
                let msg = self.msg(Message::UnsupportedConnectionUri);
                self.toast(msg);
            }
        }
    }
}
