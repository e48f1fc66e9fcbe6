//! Configuration module for environment variable parsing.
//!
//! Reads all configuration from environment variables. The relay has no
//! config file; everything comes from the process environment.

use std::env;
use tracing::warn;

/// Default port, shared with the browser widget's socket URL.
pub const DEFAULT_PORT: u16 = 3001;

/// Default allowed browser origin (Vite dev server).
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the HTTP + WebSocket server to listen on
    pub port: u16,

    /// Shared secret for Chatwoot webhook HMAC verification.
    ///
    /// When `None`, signature verification is skipped entirely.
    pub webhook_secret: Option<String>,

    /// Browser origin allowed to make cross-origin requests
    pub frontend_url: String,

    /// Version string reported by the health endpoint
    pub version: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_PORT,
            webhook_secret: None,
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            port: parse_port("WEBHOOK_PORT")
                .or_else(|| parse_port("PORT"))
                .unwrap_or(defaults.port),

            webhook_secret: non_blank("WEBHOOK_SECRET"),

            frontend_url: non_blank("FRONTEND_URL").unwrap_or(defaults.frontend_url),

            version: non_blank("RELAY_VERSION").unwrap_or(defaults.version),
        }
    }

    /// Check if webhook signature verification is enabled.
    pub fn is_signature_verification_enabled(&self) -> bool {
        self.webhook_secret.is_some()
    }
}

/// Parse a port number, warning when the variable is set but unusable.
fn parse_port(name: &str) -> Option<u16> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse::<u16>() {
        Ok(port) => Some(port),
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid port, ignoring");
            None
        }
    }
}

/// Read a variable, treating empty or whitespace-only values as unset.
fn non_blank(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_port_valid() {
        env::set_var("TEST_RELAY_PORT_VALID", "4100");
        assert_eq!(parse_port("TEST_RELAY_PORT_VALID"), Some(4100));
        env::remove_var("TEST_RELAY_PORT_VALID");
    }

    #[test]
    fn test_parse_port_invalid() {
        env::set_var("TEST_RELAY_PORT_INVALID", "not-a-port");
        assert_eq!(parse_port("TEST_RELAY_PORT_INVALID"), None);
        env::remove_var("TEST_RELAY_PORT_INVALID");
    }

    #[test]
    fn test_parse_port_missing() {
        assert_eq!(parse_port("NONEXISTENT_RELAY_PORT"), None);
    }

    #[test]
    fn test_non_blank() {
        env::set_var("TEST_RELAY_BLANK", "   ");
        assert_eq!(non_blank("TEST_RELAY_BLANK"), None);
        env::set_var("TEST_RELAY_BLANK", " secret ");
        assert_eq!(non_blank("TEST_RELAY_BLANK"), Some("secret".to_string()));
        env::remove_var("TEST_RELAY_BLANK");
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 3001);
        assert_eq!(config.frontend_url, "http://localhost:5173");
        assert!(!config.is_signature_verification_enabled());
    }
}
