//! Server configuration

use std::net::{IpAddr, Ipv4Addr};

const DEFAULT_PORT: u16 = 3000;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Enable CORS
    pub cors_enabled: bool,
    /// Run `initLedger` before accepting requests
    pub seed_on_start: bool,
}

impl ServerConfig {
    /// Create a new configuration builder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Read `CARLEDGER_HOST`, `CARLEDGER_PORT`, `CARLEDGER_CORS` and
    /// `CARLEDGER_SEED`; unset or unparsable values keep their defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut builder = Self::builder();
        if let Some(host) = lookup("CARLEDGER_HOST").and_then(|h| h.parse().ok()) {
            builder = builder.host(host);
        }
        if let Some(port) = lookup("CARLEDGER_PORT").and_then(|p| p.parse().ok()) {
            builder = builder.port(port);
        }
        if let Some(cors) = lookup("CARLEDGER_CORS").and_then(|c| parse_flag(&c)) {
            builder = builder.cors(cors);
        }
        if let Some(seed) = lookup("CARLEDGER_SEED").and_then(|s| parse_flag(&s)) {
            builder = builder.seed_on_start(seed);
        }
        builder.build()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Builder for ServerConfig
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    host: Option<IpAddr>,
    port: Option<u16>,
    cors_enabled: Option<bool>,
    seed_on_start: Option<bool>,
}

impl ServerConfigBuilder {
    /// Set the bind address
    pub fn host(mut self, host: IpAddr) -> Self {
        self.host = Some(host);
        self
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Enable or disable CORS
    pub fn cors(mut self, enabled: bool) -> Self {
        self.cors_enabled = Some(enabled);
        self
    }

    /// Seed the ledger at startup
    pub fn seed_on_start(mut self, seed: bool) -> Self {
        self.seed_on_start = Some(seed);
        self
    }

    /// Build the configuration
    pub fn build(self) -> ServerConfig {
        ServerConfig {
            host: self.host.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            port: self.port.unwrap_or(DEFAULT_PORT),
            cors_enabled: self.cors_enabled.unwrap_or(true),
            seed_on_start: self.seed_on_start.unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3000);
        assert!(config.cors_enabled);
        assert!(!config.seed_on_start);
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }

    #[test]
    fn test_from_lookup() {
        let env: HashMap<&str, &str> = [
            ("CARLEDGER_HOST", "127.0.0.1"),
            ("CARLEDGER_PORT", "8080"),
            ("CARLEDGER_CORS", "off"),
            ("CARLEDGER_SEED", "true"),
        ]
        .into_iter()
        .collect();

        let config = ServerConfig::from_lookup(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.port, 8080);
        assert!(!config.cors_enabled);
        assert!(config.seed_on_start);
    }

    #[test]
    fn test_bad_values_keep_defaults() {
        let config = ServerConfig::from_lookup(|name| match name {
            "CARLEDGER_PORT" => Some("not-a-port".to_string()),
            "CARLEDGER_CORS" => Some("maybe".to_string()),
            _ => None,
        });
        assert_eq!(config, ServerConfig::default());
    }
}
