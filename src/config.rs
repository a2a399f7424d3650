use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    /// Upstream credential. Checked per request, so the server still boots without it.
    pub api_key: Option<String>,
    pub model: String,
    pub model_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("API_KEY")
            .or_else(|| lookup("GEMINI_API_KEY"))
            .filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!("API_KEY is not set; generation requests will fail until it is configured");
        }

        let model = lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let timeout_secs = match lookup("MODEL_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|e| AppError::ConfigError(format!("Invalid MODEL_TIMEOUT_SECS: {}", e)))?,
            None => 60,
        };

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("PORT").unwrap_or_else(|| "3000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            api_key,
            model,
            model_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_variables() {
        let config = Config::from_lookup(lookup_in(&[])).unwrap();
        assert_eq!(config.server_addr, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.api_key, None);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.model_timeout, Duration::from_secs(60));
    }

    #[test]
    fn gemini_api_key_is_a_fallback() {
        let config = Config::from_lookup(lookup_in(&[("GEMINI_API_KEY", "g-key")])).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("g-key"));

        let config = Config::from_lookup(lookup_in(&[("API_KEY", "a-key"), ("GEMINI_API_KEY", "g-key")])).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("a-key"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let config = Config::from_lookup(lookup_in(&[("API_KEY", "  ")])).unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn invalid_port_is_a_config_error() {
        let err = Config::from_lookup(lookup_in(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn invalid_host_is_a_config_error() {
        let err = Config::from_lookup(lookup_in(&[("HOST", "localhost:80")])).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }
}
