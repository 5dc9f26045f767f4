use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_SAVE_FILE: &str = "sylladexDeck.sav";
pub const SAVE_EXTENSION: &str = "sav";

fn default_save_file() -> PathBuf {
    PathBuf::from(DEFAULT_SAVE_FILE)
}

fn default_log_filter() -> String {
    "warn".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SylladexConfig {
    #[serde(default = "default_save_file")]
    pub save_file: PathBuf,
    /// Directory or archive listing `<Name>.modus` entries. When unset every
    /// registered modus is discoverable.
    #[serde(default)]
    pub modi_source: Option<PathBuf>,
    #[serde(default)]
    pub default_modus: Option<String>,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for SylladexConfig {
    fn default() -> Self {
        Self {
            save_file: default_save_file(),
            modi_source: None,
            default_modus: None,
            log_filter: default_log_filter(),
        }
    }
}

/// Forces the `.sav` extension onto a user-supplied deck path.
pub fn normalize_save_path(path: impl Into<PathBuf>) -> PathBuf {
    let path = path.into();
    let has_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SAVE_EXTENSION));
    if has_extension {
        return path;
    }
    let mut raw = path.into_os_string();
    raw.push(".");
    raw.push(SAVE_EXTENSION);
    PathBuf::from(raw)
}
