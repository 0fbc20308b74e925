//! Application configuration.
//!
//! Sources, later ones winning:
//! - defaults
//! - a TOML file (`TASKBOOK_CONFIG_FILE`, default `taskbook.toml`, optional)
//! - environment variables prefixed `TASKBOOK__`, e.g. `TASKBOOK__API__BASE_URL`

use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://apmob.myfirnanda.my.id/api";

const CONFIG_FILE_VAR: &str = "TASKBOOK_CONFIG_FILE";
const DEFAULT_CONFIG_FILE: &str = "taskbook.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every endpoint path is joined onto.
    pub base_url: String,

    /// Per-request timeout. Unset means no timeout.
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for `session.json`; the platform config dir when unset.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (pretty, compact, json)
    pub format: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl AppConfig {
    /// Load from the configured file (if it exists) and the environment.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_FILE_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let path = Path::new(&path);

        if path.exists() {
            info!("Loading configuration from {}", path.display());
            Self::build(Some(path), env_source())
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Self::build(None, env_source())
        }
    }

    /// Load from an explicit file, which must exist, plus the environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::build(Some(path.as_ref()), env_source())
    }

    fn build(file: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();
        if let Some(file) = file {
            builder = builder.add_source(File::from(file).required(true));
        }
        builder = builder.add_source(env);

        let config = builder.build().context("Failed to build configuration")?;
        let settings: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api.base_url)
            .with_context(|| format!("Invalid API base URL '{}'", self.api.base_url))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            anyhow::bail!("API base URL must use http or https, got '{}'", url.scheme());
        }

        if self.api.timeout_seconds == Some(0) {
            anyhow::bail!("API timeout must be positive");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        let level_lower = self.logging.level.to_lowercase();
        if !valid_levels.contains(&level_lower.as_str()) {
            anyhow::bail!(
                "Invalid log level '{}'. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            );
        }

        let valid_formats = ["pretty", "compact", "json"];
        let format_lower = self.logging.format.to_lowercase();
        if !valid_formats.contains(&format_lower.as_str()) {
            anyhow::bail!(
                "Invalid log format '{}'. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            );
        }

        Ok(())
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("TASKBOOK")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn toml_file(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn empty_env() -> Environment {
        env_source().source(Some(HashMap::new()))
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout(), None);
        assert!(config.storage.dir.is_none());
    }

    #[test]
    fn test_file_values_and_defaults() {
        let file = toml_file(
            r#"
            [api]
            base_url = "http://localhost:8000/api"
            timeout_seconds = 15

            [logging]
            format = "json"
            "#,
        );

        let config = AppConfig::build(Some(file.path()), empty_env()).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert_eq!(config.api.timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = toml_file("[api]\nbase_url = \"http://localhost:8000/api\"\n");
        let env = env_source().source(Some(HashMap::from([
            (
                "TASKBOOK__API__BASE_URL".to_string(),
                "https://staging.example.com/api".to_string(),
            ),
            ("TASKBOOK__LOGGING__LEVEL".to_string(), "debug".to_string()),
        ])));

        let config = AppConfig::build(Some(file.path()), env).unwrap();
        assert_eq!(config.api.base_url, "https://staging.example.com/api");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_invalid_config() {
        let mut config = AppConfig::default();
        config.api.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = DEFAULT_BASE_URL.to_string();
        config.api.timeout_seconds = Some(0);
        assert!(config.validate().is_err());

        config.api.timeout_seconds = None;
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "warn".to_string();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(AppConfig::build(Some(&missing), empty_env()).is_err());
    }
}
