//! Configuration management for the expense server.
//!
//! This module provides a centralized configuration structure populated from
//! environment variables once at startup. The two Supabase variables are
//! required; missing either one is a fatal startup condition.

use super::error::{Error, Result};
use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};

/// Main configuration structure for the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Supabase connection settings.
    pub supabase: SupabaseConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Supabase connection configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub url: String,

    /// Anonymous API key used for both the `apikey` header and bearer auth.
    pub anon_key: String,

    /// Table expense rows are inserted into.
    pub table: String,

    /// Request timeout for insert calls, in seconds.
    pub timeout_secs: u64,
}

/// Custom Debug implementation to redact the key from logs.
impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("anon_key", &"[REDACTED]")
            .field("table", &self.table)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "gestor-de-gastos".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Reads a `.env` file when present. `SUPABASE_URL` and
    /// `SUPABASE_ANON_KEY` are required; everything else has a default.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let url = std::env::var("SUPABASE_URL")
            .map_err(|_| Error::config("SUPABASE_URL must be set"))?;
        let anon_key = std::env::var("SUPABASE_ANON_KEY")
            .map_err(|_| Error::config("SUPABASE_ANON_KEY must be set"))?;

        let table =
            std::env::var("SUPABASE_TABLE").unwrap_or_else(|_| "gastos".to_string());
        let timeout_secs = std::env::var("SUPABASE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let mut server = ServerConfig::default();
        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            server.name = name;
        }

        let mut logging = LoggingConfig::default();
        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            logging.level = level;
        }

        Ok(Self {
            server,
            supabase: SupabaseConfig {
                url,
                anon_key,
                table,
                timeout_secs,
            },
            logging,
            transport: TransportConfig::from_env(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure env var tests run serially
    static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    fn set_required_vars() {
        unsafe {
            std::env::set_var("SUPABASE_URL", "https://example.supabase.co");
            std::env::set_var("SUPABASE_ANON_KEY", "anon-key");
        }
    }

    fn clear_vars() {
        unsafe {
            std::env::remove_var("SUPABASE_URL");
            std::env::remove_var("SUPABASE_ANON_KEY");
            std::env::remove_var("SUPABASE_TABLE");
        }
    }

    #[test]
    fn test_missing_supabase_url_is_fatal() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_vars();
        unsafe {
            std::env::set_var("SUPABASE_ANON_KEY", "anon-key");
        }
        let result = Config::from_env();
        assert!(result.is_err());
        clear_vars();
    }

    #[test]
    fn test_from_env_defaults() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        set_required_vars();
        let config = Config::from_env().unwrap();
        assert_eq!(config.supabase.table, "gastos");
        assert_eq!(config.supabase.timeout_secs, 10);
        assert_eq!(config.server.name, "gestor-de-gastos");
        clear_vars();
    }

    #[test]
    fn test_anon_key_redacted_in_debug() {
        let config = SupabaseConfig {
            url: "https://example.supabase.co".to_string(),
            anon_key: "super_secret_key".to_string(),
            table: "gastos".to_string(),
            timeout_secs: 10,
        };
        let debug_str = format!("{:?}", config);
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("super_secret_key"));
    }
}
