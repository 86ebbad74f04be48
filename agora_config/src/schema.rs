use std::path::{Path, PathBuf};
use std::time::Duration;

use agora_debate::DebateSettings;
use agora_providers::{DEFAULT_BASE_URL, ModelSettings};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

const CONFIG_DIR: &str = "agora";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub debate: DebateConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl ServerConfig {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    const fn default_port() -> u16 {
        5000
    }

    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ModelConfig {
    /// Prefer the environment variable. An empty value means "not set".
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    #[serde(default = "ModelConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "ModelConfig::default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(flatten)]
    pub settings: ModelSettings,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: Self::default_base_url(),
            request_timeout_secs: Self::default_request_timeout_secs(),
            settings: ModelSettings::default(),
        }
    }
}

impl ModelConfig {
    fn default_base_url() -> String {
        DEFAULT_BASE_URL.to_string()
    }

    const fn default_request_timeout_secs() -> u64 {
        120
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DebateConfig {
    /// Rounds used when a request does not say how many it wants.
    #[serde(default = "DebateConfig::default_rounds")]
    pub default_rounds: u32,
    #[serde(flatten)]
    pub settings: DebateSettings,
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            default_rounds: Self::default_rounds(),
            settings: DebateSettings::default(),
        }
    }
}

impl DebateConfig {
    const fn default_rounds() -> u32 {
        3
    }
}

impl Config {
    /// Load `~/agora/config.json` (defaults when absent), then apply the
    /// environment, including a `.env` file if one exists.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;
        let config = Self::load_from(&path)?;

        match dotenvy::dotenv() {
            Ok(env_file) => debug!("Loaded environment from {}", env_file.display()),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(anyhow::anyhow!("Cannot read .env file: {e}")),
        }

        Ok(config.with_api_key_override(std::env::var(API_KEY_ENV).ok()))
    }

    /// Parse a config file without touching the environment.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {e}", path.display()))?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Replace the file's key with `env_key` when that is non-empty.
    #[must_use]
    pub fn with_api_key_override(mut self, env_key: Option<String>) -> Self {
        if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
            self.model.api_key = key;
        }
        self
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(CONFIG_DIR))
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_path = Self::ensure_config_dir()?.join(CONFIG_FILE);
        Self::write_template(&config_path)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Export {API_KEY_ENV} or put it in a .env file");
        println!("   2. Run 'agora models' to check which models your key can use");
        println!("   3. Run 'agora serve' or 'agora debate --topic \"...\"'");
        println!();
        println!("🔧 Configuration options:");
        println!("   - model.candidates: models tried in order at startup");
        println!("   - debate.mode: combined (one call per round) or per_role (three calls)");
        println!("   - debate.inter_call_delay_secs: pause between per_role calls");
        println!();
        Ok(())
    }

    /// Write the default configuration to `path`. Refuses to overwrite.
    pub fn write_template(path: &Path) -> anyhow::Result<()> {
        if path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                path.display()
            );
        }

        let template = serde_json::to_string_pretty(&Self::default())?;
        std::fs::write(path, template)?;
        Ok(())
    }
}
