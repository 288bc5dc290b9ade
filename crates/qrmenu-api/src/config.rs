//! Environment-driven server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Settings read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `DATABASE_URL`, required.
    pub database_url: String,
    /// `HOST`.
    pub host: String,
    /// `PORT`.
    pub port: u16,
    /// `DATABASE_MAX_CONNECTIONS`.
    pub database_max_connections: u32,
    /// `PUBLIC_BASE_URL`, prefix of every public menu link.
    pub public_base_url: String,
    /// `UPLOAD_DIR`, root of the artifact store.
    pub upload_dir: PathBuf,
    /// `OTEL_EXPORTER_OTLP_ENDPOINT`; span export is off when unset.
    pub otlp_endpoint: Option<String>,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is missing or malformed.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of
    /// a variable if set.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is missing or malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database_url = var("DATABASE_URL").ok_or_else(|| {
            AppError::Config("DATABASE_URL environment variable must be set".into())
        })?;

        let port = match var("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => DEFAULT_PORT,
        };

        let database_max_connections = match var("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(AppError::Config(format!(
                        "DATABASE_MAX_CONNECTIONS must be a positive integer, got {raw:?}"
                    )));
                }
            },
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let public_base_url =
            var("PUBLIC_BASE_URL").unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_owned());
        if !(public_base_url.starts_with("http://") || public_base_url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "PUBLIC_BASE_URL must be an http(s) URL, got {public_base_url:?}"
            )));
        }

        Ok(Self {
            database_url,
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            port,
            database_max_connections,
            public_base_url,
            upload_dir: PathBuf::from(var("UPLOAD_DIR").as_deref().unwrap_or(DEFAULT_UPLOAD_DIR)),
            otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }

    /// The socket address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST` is not an IP address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_apply_when_only_database_url_is_set() {
        // Act
        let config =
            AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/qr")]))
                .unwrap();

        // Assert
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.public_base_url, "http://localhost:3000");
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert!(config.otlp_endpoint.is_none());
        assert_eq!(config.bind_addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_missing_database_url_is_config_error() {
        let result = AppConfig::from_lookup(lookup_from(&[("PORT", "8080")]));

        assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("DATABASE_URL")));
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/qr"),
            ("PORT", "99999"),
        ]));

        assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("PORT")));
    }

    #[test]
    fn test_zero_max_connections_is_config_error() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/qr"),
            ("DATABASE_MAX_CONNECTIONS", "0"),
        ]));

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_overrides_are_read() {
        // Act
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/qr"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("PUBLIC_BASE_URL", "https://menus.example.com"),
            ("UPLOAD_DIR", "/var/lib/qrmenu"),
            ("OTEL_EXPORTER_OTLP_ENDPOINT", "http://collector:4317"),
        ]))
        .unwrap();

        // Assert
        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(config.public_base_url, "https://menus.example.com");
        assert_eq!(config.upload_dir, PathBuf::from("/var/lib/qrmenu"));
        assert_eq!(config.otlp_endpoint.as_deref(), Some("http://collector:4317"));
    }

    #[test]
    fn test_non_http_base_url_is_config_error() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/qr"),
            ("PUBLIC_BASE_URL", "menus.example.com"),
        ]));

        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
