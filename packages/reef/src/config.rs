use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// =============================================================================
// Tunable config (figment-deserialized from defaults / config.toml / env vars)
// =============================================================================
//
// Two equivalent ways to configure:
//
//   config.toml:     [services]
//                    forum_url = "http://forum.example:8081/api"
//
//   env var:         REEF_SERVICES__FORUM_URL=...   (double underscore = nesting)

/// Top-level tunable configuration, deserialized by figment.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub services: ServicesFileConfig,
    #[serde(default)]
    pub chat: ChatFileConfig,
}

/// Backend service endpoints (lives under `[services]` in config.toml).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServicesFileConfig {
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_forum_url")]
    pub forum_url: String,
}

impl Default for ServicesFileConfig {
    fn default() -> Self {
        Self {
            auth_url: default_auth_url(),
            forum_url: default_forum_url(),
        }
    }
}

/// Chat tunables (lives under `[chat]` in config.toml).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatFileConfig {
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// How many messages the history replay asks for.
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,
}

impl Default for ChatFileConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_auth_url() -> String {
    "http://localhost:8080/api/v1".to_string()
}

fn default_forum_url() -> String {
    "http://localhost:8081/api".to_string()
}

fn default_ws_url() -> String {
    "ws://localhost:8081/ws".to_string()
}

fn default_history_limit() -> u32 {
    100
}

/// Build a figment that layers: defaults → config.toml → REEF_* env vars.
///
/// Env vars use double-underscore for nesting into sections:
///   `REEF_SERVICES__AUTH_URL=...`  →  `services.auth_url`
///   `REEF_CHAT__HISTORY_LIMIT=50`  →  `chat.history_limit`
pub fn load_file_config(data_dir: &Path) -> Result<FileConfig> {
    use figment::{
        Figment,
        providers::{Env, Format, Serialized, Toml},
    };

    Figment::from(Serialized::defaults(FileConfig::default()))
        .merge(Toml::file(data_dir.join("config.toml")))
        .merge(Env::prefixed("REEF_").split("__"))
        .extract()
        .context("Failed to load configuration")
}

// =============================================================================
// Directory layout (not tunable via figment — derived from --data-dir)
// =============================================================================

#[derive(Clone, Debug)]
pub struct ReefConfig {
    pub data_dir: PathBuf,
    pub file: FileConfig,
}

impl ReefConfig {
    pub fn new(custom_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = custom_dir.unwrap_or_else(|| {
            dirs::home_dir()
                .expect("Could not find home directory")
                .join(".reef")
        });

        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {data_dir:?}"))?;

        let file = load_file_config(&data_dir)?;

        Ok(Self { data_dir, file })
    }
}
