use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::i18n::Locale;

pub(crate) const CONFIG_FILE_NAME: &str = "wallet_config.json";
pub(crate) const DEFAULT_NWC_RELAY_URL: &str = "wss://relay.mutinywallet.com";

/// On-disk app config. Every field is optional so old files keep loading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub nwc_relay_url: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
}

impl AppConfig {
    /// `WALLET_NWC_RELAY_URL`, then the config file, then the built-in relay.
    pub fn nwc_relay_url(&self) -> String {
        pick(
            std::env::var("WALLET_NWC_RELAY_URL").ok().as_deref(),
            self.nwc_relay_url.as_deref(),
        )
        .unwrap_or_else(|| DEFAULT_NWC_RELAY_URL.to_string())
    }

    /// `WALLET_LOCALE`, then the config file, then English.
    pub fn locale(&self) -> Locale {
        pick(
            std::env::var("WALLET_LOCALE").ok().as_deref(),
            self.locale.as_deref(),
        )
        .map(|tag| Locale::from_tag(&tag))
        .unwrap_or_default()
    }
}

/// Environment value if set and non-blank, else the file value.
fn pick(env: Option<&str>, file: Option<&str>) -> Option<String> {
    non_empty(env).or_else(|| non_empty(file))
}

fn non_empty(v: Option<&str>) -> Option<String> {
    v.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

pub(crate) fn config_path(data_dir: &str) -> PathBuf {
    Path::new(data_dir).join(CONFIG_FILE_NAME)
}

pub(crate) fn load_app_config(data_dir: &str) -> AppConfig {
    let path = config_path(data_dir);
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return AppConfig::default(),
        Err(e) => {
            tracing::warn!(%e, path = %path.display(), "failed to read app config");
            return AppConfig::default();
        }
    };
    match serde_json::from_str::<AppConfig>(&raw) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!(%e, path = %path.display(), "ignoring malformed app config");
            AppConfig::default()
        }
    }
}

pub(crate) fn default_app_config_json() -> String {
    let cfg = AppConfig {
        nwc_relay_url: Some(DEFAULT_NWC_RELAY_URL.to_string()),
        locale: Some("en".to_string()),
    };
    serde_json::to_string_pretty(&cfg).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_app_config(&dir.path().to_string_lossy());
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_string_lossy().into_owned();
        std::fs::write(config_path(&data_dir), b"{ not json").unwrap();
        assert_eq!(load_app_config(&data_dir), AppConfig::default());
    }

    #[test]
    fn environment_overrides_file_values() {
        assert_eq!(
            pick(Some("wss://env.example"), Some("wss://file.example")).as_deref(),
            Some("wss://env.example")
        );
        assert_eq!(
            pick(Some("  "), Some("wss://file.example")).as_deref(),
            Some("wss://file.example")
        );
        assert_eq!(pick(None, Some("es")).as_deref(), Some("es"));
        assert_eq!(pick(None, None), None);
    }

    #[test]
    fn file_values_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_string_lossy().into_owned();
        std::fs::write(
            config_path(&data_dir),
            br#"{"nwc_relay_url":"wss://relay.example","locale":"es-MX","unknown":1}"#,
        )
        .unwrap();
        let cfg = load_app_config(&data_dir);
        assert_eq!(cfg.nwc_relay_url(), "wss://relay.example");
        assert_eq!(cfg.locale(), Locale::Es);
    }

    #[test]
    fn default_json_round_trips_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_string_lossy().into_owned();
        std::fs::write(config_path(&data_dir), default_app_config_json()).unwrap();
        let cfg = load_app_config(&data_dir);
        assert_eq!(cfg.nwc_relay_url.as_deref(), Some(DEFAULT_NWC_RELAY_URL));
    }
}
