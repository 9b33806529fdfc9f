use std::fs;
use std::io;
use std::net::{AddrParseError, IpAddr, Ipv4Addr};
use std::num::ParseIntError;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const ENV_HOST: &str = "HOST";
pub const ENV_PORT: &str = "PORT";
pub const ENV_DATABASE_URL: &str = "MONGODB_URI";
pub const ENV_DATABASE_NAME: &str = "MONGODB_DB";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("error reading {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("error parsing config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid PORT {value:?}: {source}")]
    InvalidPort { value: String, source: ParseIntError },
    #[error("invalid HOST {value:?}: {source}")]
    InvalidHost { value: String, source: AddrParseError },
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub web: WebConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    /// Used when the url does not name a database.
    pub name: String,
}

impl Default for DatabaseConfig {
    fn default() -> DatabaseConfig {
        DatabaseConfig {
            url: "mongodb://localhost:27017".into(),
            name: "albumCatalog".into(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct WebConfig {
    pub address: IpAddr,
    pub port: u16,
    pub allow_origins: Vec<String>,
}

impl Default for WebConfig {
    fn default() -> WebConfig {
        WebConfig {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            allow_origins: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Reads the optional config file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_owned(),
                    source,
                })?;
                AppConfig::from_toml_str(&raw)?
            }
            None => AppConfig::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<AppConfig, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_HOST).filter(|v| !v.is_empty()) {
            self.web.address = value
                .trim()
                .parse()
                .map_err(|source| ConfigError::InvalidHost { value, source })?;
        }
        if let Some(value) = lookup(ENV_PORT).filter(|v| !v.is_empty()) {
            self.web.port = value
                .trim()
                .parse()
                .map_err(|source| ConfigError::InvalidPort { value, source })?;
        }
        if let Some(url) = lookup(ENV_DATABASE_URL).filter(|v| !v.is_empty()) {
            self.database.url = url;
        }
        if let Some(name) = lookup(ENV_DATABASE_NAME).filter(|v| !v.is_empty()) {
            self.database.name = name;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|&(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_file_or_env() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[])).unwrap();
        assert_eq!(config.web.port, 3000);
        assert_eq!(config.web.address, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.database.url, "mongodb://localhost:27017");
        assert_eq!(config.database.name, "albumCatalog");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [web]
            port = 8080
            allow_origins = ["http://localhost:5173"]
            "#,
        )
        .unwrap();
        assert_eq!(config.web.port, 8080);
        assert_eq!(config.web.allow_origins, vec!["http://localhost:5173".to_owned()]);
        assert_eq!(config.database, DatabaseConfig::default());
    }

    #[test]
    fn env_overrides_file() {
        let mut config = AppConfig::from_toml_str("[database]\nurl = \"mock://memory\"\n").unwrap();
        config
            .apply_env(env(&[
                ("PORT", "4000"),
                ("MONGODB_URI", "mongodb://db:27017/records"),
                ("MONGODB_DB", ""),
            ]))
            .unwrap();
        assert_eq!(config.web.port, 4000);
        assert_eq!(config.database.url, "mongodb://db:27017/records");
        assert_eq!(config.database.name, "albumCatalog");
    }

    #[test]
    fn bad_port_is_reported() {
        let mut config = AppConfig::default();
        let err = config.apply_env(env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort { .. }));
    }

    #[test]
    fn host_env_overrides_bind_address() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[("HOST", "127.0.0.1")])).unwrap();
        assert_eq!(config.web.address, IpAddr::V4(Ipv4Addr::LOCALHOST));

        let err = config.apply_env(env(&[("HOST", "localhost:80")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHost { .. }));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        fs::write(&path, "[database]\nname = \"records\"\n").unwrap();
        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.database.name, "records");
        assert!(AppConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
