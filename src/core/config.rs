//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.ragchat/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.
//! Everything here is read once at startup.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::dispatch::SubmitPolicy;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RagChatConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BackendConfig {
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ChatConfig {
    pub user_name: Option<String>,
    pub submit_policy: Option<SubmitPolicy>,
    pub example_prompts: Option<Vec<String>>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_USER_NAME: &str = "Jason";

pub const DEFAULT_EXAMPLE_PROMPTS: &[&str] = &[
    "Can you compare how Aditya Birla Capital performed against Bajaj Finance in Q4 2025 ?",
    "Please help me summarise the q4 for bajaj finance .. give me some key takeways !",
    "Can you provide me the PAT details for both ABC and bajaj finance ?",
    "Can you come up with consolidated revenue and PAT details for Aditya Birla Capital ?",
];

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub backend_url: String,
    pub user_name: String,
    pub submit_policy: SubmitPolicy,
    pub example_prompts: Vec<String>,
}

/// Values supplied on the command line (None = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub backend_url: Option<String>,
    pub submit_policy: Option<SubmitPolicy>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.ragchat/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".ragchat").join("config.toml"))
}

/// Load config from `~/.ragchat/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `RagChatConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<RagChatConfig, ConfigError> {
    let Some(path) = config_path() else {
        warn!("Could not determine home directory, using default config");
        return Ok(RagChatConfig::default());
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<RagChatConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(RagChatConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: RagChatConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# ragchat Configuration
# All settings are optional — defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [backend]
# base_url = "http://localhost:8000"   # Or set RAGCHAT_BACKEND_URL

# [chat]
# user_name = "Jason"                  # Shown as "Hello, <name>" on the welcome screen
# submit_policy = "reject"             # "reject" (one request at a time) or "overlap"
# example_prompts = [
#     "Please help me summarise the q4 for bajaj finance .. give me some key takeways !",
# ]
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &RagChatConfig, cli: &CliOverrides) -> ResolvedConfig {
    // Backend URL: CLI → env → config → default
    let backend_url = cli
        .backend_url
        .clone()
        .or_else(|| std::env::var("RAGCHAT_BACKEND_URL").ok())
        .or_else(|| config.backend.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

    // Submit policy: CLI → config → default
    let submit_policy = cli
        .submit_policy
        .or(config.chat.submit_policy)
        .unwrap_or_default();

    let user_name = config
        .chat
        .user_name
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_NAME.to_string());

    // An empty list in the file is honoured (no examples shown)
    let example_prompts = config.chat.example_prompts.clone().unwrap_or_else(|| {
        DEFAULT_EXAMPLE_PROMPTS
            .iter()
            .map(|s| s.to_string())
            .collect()
    });

    ResolvedConfig {
        backend_url,
        user_name,
        submit_policy,
        example_prompts,
    }
}
