use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::{auth, env};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub security: SecurityConfig,

    pub bootstrap: BootstrapConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// HMAC secret for signing bearer tokens. Required; loaded once at startup.
    pub secret_key: String,

    /// Lifetime of an issued token in minutes (default: 30)
    pub token_ttl_minutes: u32,

    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations); the main work factor knob
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,

    /// Passwords longer than this many bytes are rejected, never truncated
    pub max_password_bytes: usize,

    /// Minimum password length for newly created users
    pub min_password_length: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            token_ttl_minutes: auth::DEFAULT_TOKEN_TTL_MINUTES,
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
            max_password_bytes: auth::DEFAULT_MAX_PASSWORD_BYTES,
            min_password_length: auth::DEFAULT_MIN_PASSWORD_LENGTH,
        }
    }
}

impl SecurityConfig {
    #[must_use]
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.token_ttl_minutes))
    }
}

/// Admin account created by `init-db` when it does not exist yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub admin_username: String,

    pub admin_email: String,

    pub admin_password: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            admin_username: "admin".to_string(),
            admin_email: "admin@example.com".to_string(),
            admin_password: "admin123".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    /// `"*"` allows any origin.
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// "pretty" or "json"
    pub log_format: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/reportkeep.db".to_string(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            security: SecurityConfig::default(),
            bootstrap: BootstrapConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    /// Loads `.env`, then the first config file found, then applies
    /// environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_with_source().map(|(config, _)| config)
    }

    /// Like [`Config::load`], also returning the file that was read. Runs
    /// before tracing is up, so the caller logs the source.
    pub fn load_with_source() -> Result<(Self, Option<PathBuf>)> {
        dotenvy::dotenv().ok();

        let (mut config, source) = Self::load_first(&Self::config_paths())?;
        config.apply_env_overrides();
        Ok((config, source))
    }

    fn load_first(paths: &[PathBuf]) -> Result<(Self, Option<PathBuf>)> {
        match paths.iter().find(|path| path.exists()) {
            Some(path) => Ok((Self::load_from_path(path)?, Some(path.clone()))),
            None => Ok((Self::default(), None)),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(secret) = lookup(env::SECRET_KEY).filter(|s| !s.is_empty()) {
            self.security.secret_key = secret;
        }
        if let Some(url) = lookup(env::DATABASE_URL).filter(|s| !s.is_empty()) {
            self.general.database_path = url;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("reportkeep").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".reportkeep").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    /// Writes a default config with a freshly generated secret key.
    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let mut config = Self::default();
            config.security.secret_key = generate_secret_key();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.security.secret_key.trim().is_empty() {
            anyhow::bail!(
                "security.secret_key must be set (or provide {})",
                env::SECRET_KEY
            );
        }

        if self.security.token_ttl_minutes == 0 {
            anyhow::bail!("security.token_ttl_minutes must be > 0");
        }

        if self.security.max_password_bytes > auth::MAX_PASSWORD_BYTES_CEILING {
            anyhow::bail!(
                "security.max_password_bytes must be <= {}",
                auth::MAX_PASSWORD_BYTES_CEILING
            );
        }

        if self.security.max_password_bytes < self.security.min_password_length {
            anyhow::bail!("security.max_password_bytes must be >= min_password_length");
        }

        Ok(())
    }
}

/// Random 256-bit key as 64 hex characters
#[must_use]
pub fn generate_secret_key() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.security.secret_key = "s3cret".to_string();
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.security.token_ttl_minutes, 30);
        assert_eq!(config.security.max_password_bytes, 72);
        assert_eq!(config.security.min_password_length, 6);
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.bootstrap.admin_username, "admin");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[security]"));
        assert!(toml_str.contains("[bootstrap]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [security]
            secret_key = "abc"
            token_ttl_minutes = 5
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.security.secret_key, "abc");
        assert_eq!(config.security.token_ttl(), chrono::Duration::minutes(5));

        assert_eq!(config.security.argon2_time_cost, 3);
    }

    #[test]
    fn test_validate_requires_secret() {
        assert!(Config::default().validate().is_err());
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_limits() {
        let mut config = valid_config();
        config.security.token_ttl_minutes = 0;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.security.max_password_bytes = 4;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.security.max_password_bytes = 5000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            env::SECRET_KEY => Some("from-env".to_string()),
            env::DATABASE_URL => Some(String::new()),
            _ => None,
        });

        assert_eq!(config.security.secret_key, "from-env");
        assert_eq!(
            config.general.database_path,
            GeneralConfig::default().database_path
        );
    }

    #[test]
    fn test_load_first_reports_source() {
        let dir = std::env::temp_dir().join(format!("reportkeep-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let missing = dir.join("missing.toml");
        let present = dir.join("config.toml");
        std::fs::write(&present, "[security]\nsecret_key = \"from-file\"\n").unwrap();

        let (config, source) = Config::load_first(&[missing.clone(), present.clone()]).unwrap();
        assert_eq!(source, Some(present));
        assert_eq!(config.security.secret_key, "from-file");

        let (config, source) = Config::load_first(&[missing]).unwrap();
        assert!(source.is_none());
        assert!(config.security.secret_key.is_empty());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_generate_secret_key() {
        let a = generate_secret_key();
        let b = generate_secret_key();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
