//! Connection settings for the Tower API and the session built from them.
//!
//! Settings come either from explicit values (flags, env vars, params file)
//! or from a tower-cli style config file. When a config file is given it is
//! the only source, matching tower-cli's own behaviour.

mod config_file;
mod session;

pub use config_file::{parse_config, ConfigFileError, ConfigFileValues};
pub use session::Session;

use crate::utils::{expand_home, DEFAULT_HOST};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("directory can not be used as config file: {0}")]
    ConfigFileIsDirectory(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config file error: {0}")]
    ConfigFile(#[from] ConfigFileError),

    #[error("Invalid Tower host {0}: {1}")]
    InvalidHost(String, url::ParseError),

    #[error("Failed to initialise HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Resolved settings used to open a [`Session`]
#[derive(Clone, PartialEq)]
pub struct ConnectionSettings {
    pub host: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub oauth_token: Option<String>,
    pub verify_ssl: bool,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            username: None,
            password: None,
            oauth_token: None,
            verify_ssl: true,
        }
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .field("oauth_token", &self.oauth_token.as_ref().map(|_| "********"))
            .field("verify_ssl", &self.verify_ssl)
            .finish()
    }
}

impl From<ConfigFileValues> for ConnectionSettings {
    fn from(values: ConfigFileValues) -> Self {
        let defaults = ConnectionSettings::default();
        Self {
            host: values.host.unwrap_or(defaults.host),
            username: values.username,
            password: values.password,
            oauth_token: values.oauth_token,
            verify_ssl: values.verify_ssl.unwrap_or(defaults.verify_ssl),
        }
    }
}

/// Connection values as supplied by the caller, before resolution
#[derive(Debug, Clone, Default)]
pub struct ConnectionArgs {
    pub host: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub oauth_token: Option<String>,
    pub verify_ssl: Option<bool>,
    pub config_file: Option<PathBuf>,
}

impl ConnectionArgs {
    /// Resolve into concrete settings, reading the config file if one was given
    pub async fn resolve(&self) -> Result<ConnectionSettings, ConnectionError> {
        if let Some(config_file) = &self.config_file {
            let path = expand_home(config_file);
            debug!(path = %path.display(), "Reading Tower config file");
            return load_config_file(path).await;
        }

        let defaults = ConnectionSettings::default();
        Ok(ConnectionSettings {
            host: self.host.clone().unwrap_or(defaults.host),
            username: self.username.clone(),
            password: self.password.clone(),
            oauth_token: self.oauth_token.clone(),
            verify_ssl: self.verify_ssl.unwrap_or(defaults.verify_ssl),
        })
    }
}

async fn load_config_file(path: PathBuf) -> Result<ConnectionSettings, ConnectionError> {
    if !path.exists() {
        return Err(ConnectionError::ConfigFileNotFound(path));
    }
    if path.is_dir() {
        return Err(ConnectionError::ConfigFileIsDirectory(path));
    }

    let content = fs::read_to_string(&path).await?;
    let values = parse_config(&content)?;
    Ok(values.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let settings = ConnectionSettings {
            password: Some("hunter2".to_string()),
            oauth_token: Some("tok".to_string()),
            ..Default::default()
        };
        let printed = format!("{:?}", settings);
        assert!(!printed.contains("hunter2"));
        assert!(!printed.contains("\"tok\""));
        assert!(printed.contains("********"));
    }

    #[tokio::test]
    async fn test_resolve_without_config_file_uses_defaults() {
        let settings = ConnectionArgs::default().resolve().await.unwrap();
        assert_eq!(settings, ConnectionSettings::default());
    }

    #[tokio::test]
    async fn test_resolve_missing_config_file() {
        let args = ConnectionArgs {
            config_file: Some(PathBuf::from("/nonexistent/tower_cli.cfg")),
            ..Default::default()
        };
        assert!(matches!(
            args.resolve().await,
            Err(ConnectionError::ConfigFileNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_directory_as_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let args = ConnectionArgs {
            config_file: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        assert!(matches!(
            args.resolve().await,
            Err(ConnectionError::ConfigFileIsDirectory(_))
        ));
    }

    #[tokio::test]
    async fn test_config_file_replaces_explicit_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tower_cli.cfg");
        std::fs::write(&path, "[general]\nhost = tower.internal\nusername = admin\n").unwrap();

        let args = ConnectionArgs {
            host: Some("ignored.example.com".to_string()),
            password: Some("ignored".to_string()),
            config_file: Some(path),
            ..Default::default()
        };
        let settings = args.resolve().await.unwrap();
        assert_eq!(settings.host, "tower.internal");
        assert_eq!(settings.username.as_deref(), Some("admin"));
        assert_eq!(settings.password, None);
        assert!(settings.verify_ssl);
    }
}
