use std::path::PathBuf;

const DATA_DIR_VAR: &str = "SYNTHOS_DATA_DIR";
const DEFAULT_DATA_DIR: &str = "/tmp/synthos/data/";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding persisted application state. Must allow file
    /// read/write/delete.
    pub data_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl AppConfig {
    /// Loads configuration from `SYNTHOS_*` environment variables, falling
    /// back to defaults for anything unset.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars_os().filter_map(|(key, value)| {
            Some((key.into_string().ok()?, value.into_string().ok()?))
        }))
    }

    /// Loads configuration from key/value pairs. Unknown keys are ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut config = Self::default();
        for (key, value) in vars {
            if key.as_ref() == DATA_DIR_VAR {
                let value: String = value.into();
                let value = value.trim();
                if !value.is_empty() {
                    config.data_dir = PathBuf::from(value);
                }
            }
        }
        config
    }
}
