use chatrs_core::{Credential, DEFAULT_MODEL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Environment variable that injects a default API key into new sessions.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

const CONFIG_DIR_NAME: &str = "chatrs";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: OpenAiConfig,
}

#[derive(Deserialize, Serialize, Clone)]
pub struct OpenAiConfig {
    /// Default key for new sessions. Users can still enter their own.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "OpenAiConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "OpenAiConfig::default_model")]
    pub model: String,
    #[serde(default = "OpenAiConfig::default_max_tokens")]
    pub max_tokens: usize,
    #[serde(default = "OpenAiConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: Self::default_base_url(),
            model: Self::default_model(),
            max_tokens: Self::default_max_tokens(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl OpenAiConfig {
    fn default_base_url() -> String {
        "https://api.openai.com/v1".to_string()
    }

    fn default_model() -> String {
        DEFAULT_MODEL.to_string()
    }

    const fn default_max_tokens() -> usize {
        256
    }

    const fn default_timeout_secs() -> u64 {
        60
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebConfig {
    #[serde(default = "WebConfig::default_host")]
    pub host: String,
    #[serde(default = "WebConfig::default_port")]
    pub port: u16,
    /// Sessions untouched for this long are torn down.
    #[serde(default = "WebConfig::default_session_idle_secs")]
    pub session_idle_secs: u64,
    #[serde(default)]
    pub secure_cookies: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            session_idle_secs: Self::default_session_idle_secs(),
            secure_cookies: false,
        }
    }
}

impl WebConfig {
    fn default_host() -> String {
        "127.0.0.1".to_string()
    }

    const fn default_port() -> u16 {
        8501
    }

    const fn default_session_idle_secs() -> u64 {
        1800
    }

    #[must_use]
    pub const fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }
}

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(CONFIG_DIR_NAME))
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load `~/chatrs/config.json`, failing if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'chatrs init' to create config.",
                config_path.display()
            );
        }

        Ok(Self::from_path(&config_path)?.with_env_api_key(std::env::var(API_KEY_ENV).ok()))
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;

        let config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            info!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            Self::default()
        };

        Ok(config.with_env_api_key(std::env::var(API_KEY_ENV).ok()))
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// A non-blank environment key replaces the one from the file.
    #[must_use]
    pub fn with_env_api_key(mut self, env_key: Option<String>) -> Self {
        if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
            info!("Using API key from {API_KEY_ENV}");
            self.providers.openai.api_key = key;
        }
        self
    }

    /// Credential handed to every new session.
    #[must_use]
    pub fn default_credential(&self) -> Credential {
        Credential::new(self.providers.openai.api_key.clone())
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        Self::write_template(&config_path)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Optionally add a default OpenAI API key (or set {API_KEY_ENV})");
        println!("   2. Run 'chatrs serve' and open the printed address");
        println!();
        println!("🔧 Configuration options:");
        println!("   - model: completion model (gpt-3.5-turbo-instruct by default)");
        println!("   - timeout_secs: upper bound on each completion request");
        println!("   - session_idle_secs: idle time before a browser session is dropped");
        println!();
        Ok(())
    }

    /// Write the JSON template to `config_path`, refusing to overwrite.
    pub fn write_template(config_path: &Path) -> anyhow::Result<()> {
        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let config_template = r#"{
  "providers": {
    "openai": {
      "api_key": "",
      "base_url": "https://api.openai.com/v1",
      "model": "gpt-3.5-turbo-instruct",
      "max_tokens": 256,
      "timeout_secs": 60
    }
  },
  "web": {
    "host": "127.0.0.1",
    "port": 8501,
    "session_idle_secs": 1800,
    "secure_cookies": false
  }
}"#;

        std::fs::write(config_path, config_template)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn template_round_trips_to_defaults() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");

        Config::write_template(&path).expect("Failed to write template");
        let config = Config::from_path(&path).expect("Failed to load template");

        assert_eq!(config.providers.openai.model, DEFAULT_MODEL);
        assert_eq!(config.providers.openai.timeout(), Duration::from_secs(60));
        assert_eq!(config.web.port, 8501);
        assert!(config.default_credential().is_empty());
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn template_refuses_to_overwrite() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");

        Config::write_template(&path).expect("Failed to write template");
        assert!(Config::write_template(&path).is_err());
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "web": { "port": 9000 } }"#).expect("Failed to write");

        let config = Config::from_path(&path).expect("Failed to load config");
        assert_eq!(config.web.port, 9000);
        assert_eq!(config.web.host, "127.0.0.1");
        assert_eq!(config.web.session_idle_timeout(), Duration::from_secs(1800));
        assert_eq!(config.providers.openai.max_tokens, 256);
    }

    #[test]
    fn env_key_overrides_file_key() {
        let mut config = Config::default();
        config.providers.openai.api_key = "sk-file".to_string();

        let config = config.with_env_api_key(Some("sk-env".to_string()));
        assert_eq!(config.default_credential().expose(), "sk-env");

        let config = config.with_env_api_key(Some("  ".to_string()));
        assert_eq!(config.default_credential().expose(), "sk-env");

        let config = config.with_env_api_key(None);
        assert_eq!(config.default_credential().expose(), "sk-env");
    }

    #[test]
    fn debug_redacts_api_key() {
        let mut config = Config::default();
        config.providers.openai.api_key = "sk-top-secret".to_string();
        let printed = format!("{config:?}");
        assert!(!printed.contains("sk-top-secret"));
    }
}
