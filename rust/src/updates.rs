use crate::state::{AppState, ConnectionProfile};
use crate::wallet::WalletError;
use crate::AppAction;

#[derive(uniffi::Enum, Clone, Debug)]
pub enum AppUpdate {
    /// Every change publishes a full snapshot; shells reconcile by `rev`.
    FullState(AppState),
}

impl AppUpdate {
    pub fn rev(&self) -> u64 {
        match self {
            AppUpdate::FullState(s) => s.rev,
        }
    }
}

#[derive(Debug)]
pub enum CoreMsg {
    Action(AppAction),
    Internal(Box<InternalEvent>),
}

#[derive(Debug)]
pub enum InternalEvent {
    // Wallet call results
    ProfilesFetched {
        generation: u64,
        result: Result<Vec<ConnectionProfile>, WalletError>,
    },
    ConnectionCreated {
        result: Result<Option<ConnectionProfile>, WalletError>,
    },
    ConnectionEdited {
        index: u32,
        result: Result<(), WalletError>,
    },

    // UI timers
    ToastAutoDismiss {
        token: u64,
    },
}
