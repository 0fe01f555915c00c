//! Configuration primitives for the coach bot.
//!
//! Stored in a machine-readable TOML file located at:
//!   %APPDATA%/StrideCoach/coach.toml on Windows
//!   $XDG_CONFIG_HOME/stridecoach/coach.toml on Linux
//!   ~/Library/Application Support/StrideCoach/coach.toml on macOS
//!
//! Secrets (bot token, storage service key, generator API key) are taken
//! from the environment and override whatever the file carries, so the file
//! can be committed with tunables only.

use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Root configuration persisted per installation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub telegram: TelegramSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub generator: GeneratorSettings,
}

/// Telegram transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramSettings {
    /// Bot token from @BotFather. Overridden by `BOT_TOKEN`.
    #[serde(default)]
    pub bot_token: String,
    /// Long-poll timeout passed to getUpdates, in seconds.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            poll_timeout_secs: default_poll_timeout_secs(),
        }
    }
}

const fn default_poll_timeout_secs() -> u64 {
    30
}

/// Remote relational store (Supabase/PostgREST) settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageSettings {
    /// Project base URL, e.g. `https://xyz.supabase.co`. Overridden by `SUPABASE_URL`.
    #[serde(default)]
    pub url: String,
    /// Service-role key. Overridden by `SUPABASE_SERVICE_KEY`.
    #[serde(default)]
    pub service_key: String,
}

/// Plan-generator (LLM endpoint) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorSettings {
    /// API key for the chat-completions endpoint. Overridden by `DEEPSEEK_API_KEY`.
    #[serde(default)]
    pub api_key: String,
    /// Chat-completions URL.
    #[serde(default = "default_generator_url")]
    pub api_url: String,
    /// Model identifier sent with every request.
    #[serde(default = "default_generator_model")]
    pub model: String,
    /// Wall-clock timeout for a single generation call, in seconds.
    #[serde(default = "default_generator_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: default_generator_url(),
            model: default_generator_model(),
            timeout_secs: default_generator_timeout_secs(),
        }
    }
}

fn default_generator_url() -> String {
    "https://api.deepseek.com/chat/completions".to_string()
}

fn default_generator_model() -> String {
    "deepseek-chat".to_string()
}

const fn default_generator_timeout_secs() -> u64 {
    60
}

/// Standard file name of the config file (resolved per OS at runtime).
pub const CONFIG_FILE_NAME: &str = "coach.toml";

/// Returns the directory where the bot keeps its config file.
///
/// Order of precedence:
/// 1. `STRIDECOACH_HOME` environment variable.
/// 2. OS-specific config directory via `directories::BaseDirs`.
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(path) = env::var("STRIDECOACH_HOME") {
        return Ok(PathBuf::from(path));
    }
    let base_dirs = BaseDirs::new().context("Unable to determine OS config directory")?;
    Ok(base_dirs.config_dir().join("stridecoach"))
}

/// Path to the config file.
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Loads the configuration from disk (or defaults), then applies
/// environment overrides for the secret-bearing fields.
pub fn load_or_default() -> Result<AppConfig> {
    let path = config_file_path()?;
    let mut cfg = if path.exists() {
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        toml::from_str(&data).with_context(|| format!("Failed to parse config file {:?}", path))?
    } else {
        AppConfig::default()
    };
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Persists the configuration to disk.
pub fn save(config: &AppConfig) -> Result<()> {
    let dir = config_dir()?;
    fs::create_dir_all(&dir)?;
    let path = config_file_path()?;
    let data = toml::to_string_pretty(config)?;
    fs::write(&path, data)?;
    Ok(())
}

fn apply_env_overrides(cfg: &mut AppConfig) {
    if let Some(token) = env_non_empty("BOT_TOKEN") {
        cfg.telegram.bot_token = token;
    }
    if let Some(url) = env_non_empty("SUPABASE_URL") {
        cfg.storage.url = url;
    }
    if let Some(key) = env_non_empty("SUPABASE_SERVICE_KEY") {
        cfg.storage.service_key = key;
    }
    if let Some(key) = env_non_empty("DEEPSEEK_API_KEY") {
        cfg.generator.api_key = key;
    }
}

/// Reads an environment variable, treating empty values as unset.
pub fn env_non_empty(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

impl AppConfig {
    /// Fails unless the settings required to reach Telegram and the store
    /// are present. The generator key is checked lazily at generation time.
    pub fn require_transport(&self) -> Result<()> {
        if self.telegram.bot_token.is_empty() {
            anyhow::bail!("BOT_TOKEN is required. Create a bot at https://t.me/BotFather");
        }
        if self.storage.url.is_empty() {
            anyhow::bail!("SUPABASE_URL is required");
        }
        if self.storage.service_key.is_empty() {
            anyhow::bail!("SUPABASE_SERVICE_KEY is required");
        }
        Ok(())
    }
}
