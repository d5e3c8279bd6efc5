//! User settings for tally-cli
//!
//! Manages the upstream endpoint, the token environment variable, the set of
//! group types the upstream API refuses for split allocations, and display
//! preferences.

use serde::{Deserialize, Serialize};

use super::paths::TallyPaths;
use crate::error::TallyError;
use crate::models::GroupType;
use crate::storage::file_io::write_json_atomic;

/// User settings for tally-cli
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// GraphQL endpoint used by `category refresh`
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Name of the environment variable holding the API token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Group types the upstream API rejects for split allocations.
    ///
    /// Learned empirically; there may be others the API also refuses.
    #[serde(default = "default_restricted_group_types")]
    pub restricted_group_types: Vec<GroupType>,

    /// Default currency symbol
    #[serde(default = "default_currency")]
    pub currency_symbol: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_api_url() -> String {
    "https://api.monarchmoney.com/graphql".to_string()
}

fn default_token_env() -> String {
    "TALLY_API_TOKEN".to_string()
}

fn default_restricted_group_types() -> Vec<GroupType> {
    vec![GroupType::Business]
}

fn default_currency() -> String {
    "$".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            api_url: default_api_url(),
            token_env: default_token_env(),
            restricted_group_types: default_restricted_group_types(),
            currency_symbol: default_currency(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &TallyPaths) -> Result<Self, TallyError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| TallyError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                TallyError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &TallyPaths) -> Result<(), TallyError> {
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }

    /// Read the API token from the configured environment variable
    pub fn api_token(&self) -> Result<String, TallyError> {
        match std::env::var(&self.token_env) {
            Ok(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(TallyError::Config(format!(
                "API token not set; export {} to refresh categories",
                self.token_env
            ))),
        }
    }
}
