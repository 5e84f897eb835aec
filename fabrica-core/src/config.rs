//! Runtime configuration from the environment

use crate::generation::GeminiConfig;
use crate::state::AppState;
use std::path::PathBuf;

pub const DATA_DIR_VAR: &str = "FABRICA_DATA_DIR";
pub const GEMINI_BASE_URL_VAR: &str = "FABRICA_GEMINI_BASE_URL";
pub const GEMINI_MODEL_VAR: &str = "FABRICA_GEMINI_MODEL";
pub const GEMINI_TIMEOUT_VAR: &str = "FABRICA_GEMINI_TIMEOUT_SECS";
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Fallback when no platform data directory can be determined
const FALLBACK_DATA_DIR: &str = "./fabrica_data";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Where the state documents live
    pub data_dir: PathBuf,
    pub gemini: GeminiConfig,
    /// Key from the environment, used when none is stored
    pub env_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            gemini: GeminiConfig::default(),
            env_api_key: None,
        }
    }
}

/// Platform data directory for the application
pub fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("org", "fabrica", "Fabrica")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR))
}

impl Config {
    /// Read configuration from process environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = GeminiConfig::default();

        let timeout_secs = match get(GEMINI_TIMEOUT_VAR) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "invalid {}, using {}s", GEMINI_TIMEOUT_VAR, defaults.timeout_secs);
                defaults.timeout_secs
            }),
            None => defaults.timeout_secs,
        };

        Self {
            data_dir: get(DATA_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(default_data_dir),
            gemini: GeminiConfig {
                base_url: get(GEMINI_BASE_URL_VAR).unwrap_or(defaults.base_url),
                model: get(GEMINI_MODEL_VAR).unwrap_or(defaults.model),
                timeout_secs,
            },
            env_api_key: get(API_KEY_VAR),
        }
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// The stored key wins over the environment
    pub fn resolve_api_key<'a>(&'a self, state: &'a AppState) -> Option<&'a str> {
        state.api_key().or(self.env_api_key.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config.gemini, GeminiConfig::default());
        assert_eq!(config.gemini.model, "gemini-1.5-flash-latest");
        assert_eq!(config.env_api_key, None);
        assert_eq!(config.data_dir, default_data_dir());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            (DATA_DIR_VAR, "/tmp/fabrica"),
            (GEMINI_MODEL_VAR, "gemini-2.0-flash"),
            (GEMINI_TIMEOUT_VAR, "30"),
            (API_KEY_VAR, "  "),
        ]));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/fabrica"));
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.gemini.timeout_secs, 30);
        assert_eq!(config.env_api_key, None);
    }

    #[test]
    fn test_bad_timeout_falls_back() {
        let config = Config::from_lookup(lookup(&[(GEMINI_TIMEOUT_VAR, "soon")]));
        assert_eq!(config.gemini.timeout_secs, GeminiConfig::default().timeout_secs);
    }

    #[test]
    fn test_stored_key_wins() {
        let config = Config::from_lookup(lookup(&[(API_KEY_VAR, "from-env")]));
        let mut state = AppState::new();
        assert_eq!(config.resolve_api_key(&state), Some("from-env"));
        state.set_api_key(Some("stored"));
        assert_eq!(config.resolve_api_key(&state), Some("stored"));
    }
}
