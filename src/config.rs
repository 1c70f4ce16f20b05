use std::{env, fs, io};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChainConfig {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RefreshConfig {
    /// Seconds between background refreshes; 0 leaves refreshing to the API.
    #[serde(default)]
    pub interval_secs: u64,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 3000 }
fn default_rpc_url() -> String { "https://sepolia.base.org".to_string() }
fn default_db_path() -> String { "./data/staking.db".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Config {
    /// `config.toml` (or `$STAKING_CONFIG`), then `.env` and process
    /// environment on top. A missing file means defaults.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let path = env::var("STAKING_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
        let mut config = match fs::read_to_string(&path) {
            Ok(content) => Self::from_toml(&content).with_context(|| format!("parsing {path}"))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Config::default(),
            Err(e) => return Err(e).with_context(|| format!("reading {path}")),
        };

        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup("RPC_URL") {
            self.chain.rpc_url = url;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port.parse().with_context(|| format!("invalid PORT {port}"))?;
        }
        if let Some(path) = lookup("DATABASE_PATH") {
            self.database.path = path;
        }
        if let Some(secs) = lookup("REFRESH_INTERVAL_SECS") {
            self.refresh.interval_secs = secs
                .parse()
                .with_context(|| format!("invalid REFRESH_INTERVAL_SECS {secs}"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.path, "./data/staking.db");
        assert_eq!(config.refresh.interval_secs, 0);
    }

    #[test]
    fn partial_sections_fill_in_defaults() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 8080

            [chain]
            rpc_url = "http://localhost:8545"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.chain.rpc_url, "http://localhost:8545");
    }

    #[test]
    fn environment_overrides_file() {
        let env: HashMap<&str, &str> = [
            ("RPC_URL", "http://node:8545"),
            ("PORT", "4000"),
            ("REFRESH_INTERVAL_SECS", "300"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.chain.rpc_url, "http://node:8545");
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.refresh.interval_secs, 300);
        assert_eq!(config.database.path, "./data/staking.db");
    }

    #[test]
    fn rejects_non_numeric_port() {
        let mut config = Config::default();
        assert!(config
            .apply_env(|key| (key == "PORT").then(|| "abc".to_string()))
            .is_err());
    }
}
