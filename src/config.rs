use crate::model::{InputError, MovingAverageWindow};
use crate::presenter::form::FormDefaults;
use serde::Deserialize;
use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub const CONFIG_PATH_VAR: &str = "TICKERBOARD_CONFIG";
pub const API_KEY_VAR: &str = "ALPHAVANTAGE_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("ALPHAVANTAGE_API_KEY is not set")]
    MissingApiKey,
    #[error("invalid bind address '{0}'")]
    BindAddr(String),
    #[error("invalid default_window: {0}")]
    DefaultWindow(#[from] InputError),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub base_url: String,
    pub request_timeout_secs: Option<u64>,
    pub refresh_seconds: Option<u64>,
    pub default_symbols: String,
    pub default_window: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8501".to_string(),
            base_url: "https://www.alphavantage.co/query".to_string(),
            request_timeout_secs: None,
            refresh_seconds: None,
            default_symbols: "IBM".to_string(),
            default_window: MovingAverageWindow::DEFAULT,
        }
    }
}

impl AppConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr
            .parse()
            .map_err(|_| ConfigError::BindAddr(self.bind_addr.clone()))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn form_defaults(&self) -> Result<FormDefaults, ConfigError> {
        Ok(FormDefaults {
            symbols: self.default_symbols.clone(),
            window: MovingAverageWindow::new(self.default_window)?,
        })
    }
}

/// Loads the JSON config file. A missing file yields the defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("No config at {}, using defaults", path.display());
            return Ok(AppConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(content)?;
    config.form_defaults()?;
    config.socket_addr()?;
    Ok(config)
}

/// API key from the environment; blank counts as missing.
pub fn api_key(value: Option<String>) -> Result<String, ConfigError> {
    value
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or(ConfigError::MissingApiKey)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = parse_config("{}").unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8501");
        assert_eq!(config.base_url, "https://www.alphavantage.co/query");
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.default_window, 20);
        assert_eq!(config.form_defaults().unwrap().symbols, "IBM");
    }

    #[test]
    fn reads_overrides() {
        let config = parse_config(
            r#"{
                "bind_addr": "0.0.0.0:9000",
                "request_timeout_secs": 15,
                "refresh_seconds": 300,
                "default_symbols": "IBM,MSFT",
                "default_window": 50
            }"#,
        )
        .unwrap();
        assert_eq!(config.socket_addr().unwrap().port(), 9000);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.refresh_seconds, Some(300));
        assert_eq!(config.form_defaults().unwrap().window.get(), 50);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            parse_config(r#"{"default_window": 0}"#),
            Err(ConfigError::DefaultWindow(_))
        ));
        assert!(matches!(
            parse_config(r#"{"bind_addr": "localhost"}"#),
            Err(ConfigError::BindAddr(_))
        ));
        assert!(matches!(parse_config("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = load_config("does/not/exist/config.json").unwrap();
        assert_eq!(config.default_symbols, "IBM");
    }

    #[test]
    fn api_key_must_be_present() {
        assert_eq!(api_key(Some(" KEY ".into())).unwrap(), "KEY");
        assert!(matches!(api_key(Some("  ".into())), Err(ConfigError::MissingApiKey)));
        assert!(matches!(api_key(None), Err(ConfigError::MissingApiKey)));
    }
}
