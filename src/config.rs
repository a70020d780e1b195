use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::db::DbError;

const DEFAULT_HISTORY_LIMIT: i64 = 30;
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_CALL_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreConfig {
    /// Clips kept per content type.
    pub history_limit: i64,
    pub busy_timeout_ms: u64,
    pub call_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            call_timeout_ms: DEFAULT_CALL_TIMEOUT_MS,
        }
    }
}

impl StoreConfig {
    /// Reads a JSON config file. A missing file gives the defaults; so does a
    /// malformed one, after a warning.
    pub fn load(path: &Path) -> Result<Self, DbError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!("ignoring malformed config {}: {err}", path.display());
            Self::default()
        }))
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use uuid::Uuid;

    use super::*;

    fn temp_config(contents: &str) -> std::path::PathBuf {
        let path = env::temp_dir().join(format!("clipkeep-config-{}.json", Uuid::new_v4()));
        fs::write(&path, contents).expect("write config");
        path
    }

    #[test]
    fn defaults_to_thirty_clips_per_type() {
        assert_eq!(StoreConfig::default().history_limit, 30);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = env::temp_dir().join(format!("clipkeep-missing-{}.json", Uuid::new_v4()));
        assert_eq!(StoreConfig::load(&path).expect("load"), StoreConfig::default());
    }

    #[test]
    fn partial_file_overrides_named_fields() {
        let path = temp_config(r#"{ "historyLimit": 50 }"#);
        let config = StoreConfig::load(&path).expect("load");
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.call_timeout(), Duration::from_millis(DEFAULT_CALL_TIMEOUT_MS));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let path = temp_config("{ historyLimit: ");
        assert_eq!(StoreConfig::load(&path).expect("load"), StoreConfig::default());
        let _ = fs::remove_file(&path);
    }
}
