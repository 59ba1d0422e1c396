//! services/relay/src/config.rs
//!
//! Configuration for the email relay, read from environment variables. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    /// Mail account the relay signs in as; also the sender address.
    pub email_user: String,
    /// App-specific password for `email_user`.
    pub email_pass: String,
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &str| {
            var(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingVar(key.to_string()))
        };

        let bind_address_str =
            var("RELAY_BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:5000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("RELAY_BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = var("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let email_user = required("EMAIL_USER")?;
        let email_pass = required("EMAIL_PASS")?;

        let smtp_host = var("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string());
        let smtp_port = match var("SMTP_PORT") {
            Some(port) => port
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidValue("SMTP_PORT".to_string(), e.to_string()))?,
            None => 465,
        };

        Ok(Self {
            bind_address,
            log_level,
            email_user,
            email_pass,
            smtp_host,
            smtp_port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_to_gmail_over_implicit_tls() {
        let config = RelayConfig::from_lookup(lookup(&[
            ("EMAIL_USER", "school@example.com"),
            ("EMAIL_PASS", "app-password"),
        ]))
        .unwrap();
        assert_eq!(config.smtp_host, "smtp.gmail.com");
        assert_eq!(config.smtp_port, 465);
        assert_eq!(config.bind_address.port(), 5000);
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    fn credentials_are_required() {
        let err = RelayConfig::from_lookup(lookup(&[("EMAIL_USER", "school@example.com")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ref v) if v == "EMAIL_PASS"));
    }

    #[test]
    fn rejects_bad_port() {
        let err = RelayConfig::from_lookup(lookup(&[
            ("EMAIL_USER", "school@example.com"),
            ("EMAIL_PASS", "app-password"),
            ("SMTP_PORT", "smtp"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref v, _) if v == "SMTP_PORT"));
    }
}
