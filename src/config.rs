use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: Rotation,
    pub server: ServerConfig,
    pub client: ClientConfig,
}

/// Log file rotation policy
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    /// `rolling::hourly`: `<log_file>.YYYY-MM-DD-HH`
    Hourly,
    /// `rolling::daily`: `<log_file>.YYYY-MM-DD`
    Daily,
    /// `rolling::never`: one ever-growing `<log_file>`, left to logrotate
    Never,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Static asset directory served at `/`
    pub public_dir: String,
}

/// Endpoint advertised to browser clients. May differ from the listen
/// address when the relay sits behind a proxy.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ClientConfig {
    pub ws_host: String,
    /// Falls back to `server.port`
    pub ws_port: Option<u16>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: "./logs".to_string(),
            log_file: "tx_relay.log".to_string(),
            use_json: false,
            rotation: Rotation::Daily,
            server: ServerConfig::default(),
            client: ClientConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            public_dir: "public".to_string(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ws_host: "localhost".to_string(),
            ws_port: None,
        }
    }
}

impl AppConfig {
    /// Load `config/<env>.yaml`, then apply process environment overrides.
    ///
    /// A missing file means built-in defaults; a file that fails to parse
    /// is an error.
    pub fn load(env: &str) -> Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let mut config = Self::from_file(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// `PORT`, `WSS_HOST` and `WSS_PORT` win over the file.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = parse_port("PORT", &port)?;
        }
        if let Some(host) = lookup("WSS_HOST") {
            self.client.ws_host = host;
        }
        if let Some(port) = lookup("WSS_PORT") {
            self.client.ws_port = Some(parse_port("WSS_PORT", &port)?);
        }
        Ok(())
    }

    pub fn ws_port(&self) -> u16 {
        self.client.ws_port.unwrap_or(self.server.port)
    }

    /// URL browser clients should connect to
    pub fn ws_url(&self) -> String {
        format!("ws://{}:{}/ws", self.client.ws_host, self.ws_port())
    }
}

fn parse_port(key: &str, value: &str) -> Result<u16> {
    value
        .trim()
        .parse()
        .with_context(|| format!("{} must be a port number, got {:?}", key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.ws_port(), 3000);
        assert_eq!(config.ws_url(), "ws://localhost:3000/ws");
    }

    #[test]
    fn test_wss_port_follows_port() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(lookup(&[("PORT", "8080")])).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.ws_url(), "ws://localhost:8080/ws");
    }

    #[test]
    fn test_advertised_endpoint_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env_overrides(lookup(&[
                ("PORT", "8080"),
                ("WSS_HOST", "relay.example.com"),
                ("WSS_PORT", "443"),
            ]))
            .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.ws_url(), "ws://relay.example.com:443/ws");
    }

    #[test]
    fn test_invalid_port_rejected() {
        let mut config = AppConfig::default();
        assert!(config.apply_env_overrides(lookup(&[("PORT", "http")])).is_err());
        assert!(config.apply_env_overrides(lookup(&[("WSS_PORT", "70000")])).is_err());
    }

    #[test]
    fn test_partial_yaml() {
        let config = AppConfig::from_yaml(
            "log_level: debug\nrotation: hourly\nserver:\n  port: 4000\nclient:\n  ws_host: 10.0.0.5\n",
        )
        .unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.rotation, Rotation::Hourly);
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.public_dir, "public");
        assert_eq!(config.ws_url(), "ws://10.0.0.5:4000/ws");
    }

    #[test]
    fn test_unknown_rotation_rejected() {
        assert!(AppConfig::from_yaml("rotation: weekly\n").is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::from_file("config/does-not-exist.yaml").unwrap();
        assert_eq!(config.server.port, DEFAULT_PORT);
    }
}
