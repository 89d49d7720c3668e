use std::sync::{Mutex, Once};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_NAME: &str = "wallet.log";

static INIT: Once = Once::new();

/// Installs the global subscriber once per process: stderr plus `<data_dir>/wallet.log`.
///
/// `RUST_LOG` overrides the default `info` filter. If another subscriber is already installed
/// (tests, embedding binaries) this is a no-op.
pub fn init_logging(data_dir: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let log_path = std::path::Path::new(data_dir).join(LOG_FILE_NAME);
        let file_layer = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .ok()
            .map(|file| {
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(Mutex::new(file))
            });

        let stderr_layer = fmt::layer().with_writer(std::io::stderr);

        let installed = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .with(file_layer)
            .try_init()
            .is_ok();
        if installed {
            tracing::debug!(path = %log_path.display(), "logging initialized");
        }
    });
}
