//! Server configuration.
//!
//! Defaults work out of the box; every knob can be overridden through
//! `PARLOR_*` environment variables.

use thiserror::Error;

/// Environment variable controlling the bind host.
pub const ENV_HOST: &str = "PARLOR_HOST";
/// Environment variable controlling the bind port.
pub const ENV_PORT: &str = "PARLOR_PORT";
/// Environment variable controlling the per-connection send queue depth.
pub const ENV_SEND_QUEUE: &str = "PARLOR_SEND_QUEUE";
/// Environment variable controlling the maximum inbound frame size.
pub const ENV_MAX_MESSAGE_BYTES: &str = "PARLOR_MAX_MESSAGE_BYTES";

/// Configuration error raised while reading the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable was set but did not parse.
    #[error("invalid value {value:?} for {name}")]
    InvalidVar {
        /// Variable name.
        name: &'static str,
        /// The offending value.
        value: String,
    },
}

/// Runtime configuration for the relay server.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host/interface to bind to.
    pub host: String,
    /// Port to bind to. `0` asks the OS for a free port.
    pub port: u16,
    /// Capacity of each connection's outbound event queue. When a queue is
    /// full, events for that connection are dropped, not the connection.
    pub send_queue_capacity: usize,
    /// Maximum size of an inbound WebSocket frame in bytes.
    pub max_message_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8000,
            send_queue_capacity: 256,
            max_message_bytes: 64 * 1024,
        }
    }
}

impl ServerConfig {
    /// Build a configuration from process environment variables, falling
    /// back to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&'static str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(host) = lookup(ENV_HOST) {
            config.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            config.port = parse(ENV_PORT, &port)?;
        }
        if let Some(depth) = lookup(ENV_SEND_QUEUE) {
            config.send_queue_capacity = parse(ENV_SEND_QUEUE, &depth)?;
        }
        if let Some(bytes) = lookup(ENV_MAX_MESSAGE_BYTES) {
            config.max_message_bytes = parse(ENV_MAX_MESSAGE_BYTES, &bytes)?;
        }
        Ok(config)
    }

    /// The `host:port` address string to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidVar {
        name,
        value: value.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8000);
        assert_eq!(config.send_queue_capacity, 256);
        assert_eq!(config.max_message_bytes, 64 * 1024);
    }

    #[test]
    fn bind_addr_joins_host_and_port() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:8000");
    }

    #[test]
    fn lookup_overrides_defaults() {
        let vars: HashMap<&str, &str> = [
            (ENV_HOST, "0.0.0.0"),
            (ENV_PORT, "9000"),
            (ENV_SEND_QUEUE, "32"),
        ]
        .into_iter()
        .collect();
        let config =
            ServerConfig::from_lookup(|name| vars.get(name).map(|v| (*v).to_owned())).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.send_queue_capacity, 32);
        assert_eq!(config.max_message_bytes, 64 * 1024);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let result = ServerConfig::from_lookup(|name| {
            (name == ENV_PORT).then(|| "not-a-port".to_owned())
        });
        assert!(matches!(
            result,
            Err(ConfigError::InvalidVar {
                name: ENV_PORT,
                ..
            })
        ));
    }
}
