//! Stockroom configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FIRESTORE_PROJECT_ID` - Firebase/GCP project that owns the database
//! - `FIRESTORE_API_KEY` - Web API key (not required with `FIRESTORE_EMULATOR_HOST`)
//!
//! ## Optional
//! - `FIRESTORE_DATABASE` - Database id (default: `(default)`)
//! - `FIRESTORE_ID_TOKEN` - Firebase ID token sent as a bearer token
//! - `FIRESTORE_EMULATOR_HOST` - `host:port` of a local emulator
//! - `STOCKROOM_STOCK_COLLECTION` - Stock collection (default: `estoque`)
//! - `STOCKROOM_SALES_COLLECTION` - Sales collection (default: `vendas`)
//! - `STOCKROOM_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `STOCKROOM_LOG_FORMAT` - `text` or `json` (default: `text`)

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::store::Collections;
use crate::telemetry::LogFormat;

const DEFAULT_DATABASE: &str = "(default)";
const DEFAULT_TIMEOUT_SECS: &str = "30";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Firestore connection settings
    pub firestore: FirestoreConfig,
    /// Collection names
    pub collections: Collections,
    /// Log output format
    pub log_format: LogFormat,
}

/// Firestore connection settings.
///
/// Implements `Debug` manually to redact credentials.
#[derive(Clone)]
pub struct FirestoreConfig {
    /// Project id
    pub project_id: String,
    /// Database id, usually `(default)`
    pub database: String,
    /// Web API key
    pub api_key: Option<SecretString>,
    /// Firebase ID token for authenticated access
    pub id_token: Option<SecretString>,
    /// Emulator `host:port`; switches to plain HTTP
    pub emulator_host: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for FirestoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreConfig")
            .field("project_id", &self.project_id)
            .field("database", &self.database)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("id_token", &self.id_token.as_ref().map(|_| "[REDACTED]"))
            .field("emulator_host", &self.emulator_host)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the environment, reading `.env` first if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value is
    /// malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let firestore = FirestoreConfig::from_env()?;
        let collections = Collections {
            stock: get_env_or_default("STOCKROOM_STOCK_COLLECTION", Collections::DEFAULT_STOCK),
            sales: get_env_or_default("STOCKROOM_SALES_COLLECTION", Collections::DEFAULT_SALES),
        };
        let log_format = get_env_or_default("STOCKROOM_LOG_FORMAT", "text")
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOCKROOM_LOG_FORMAT".to_string(), e))?;

        Ok(Self {
            firestore,
            collections,
            log_format,
        })
    }
}

impl FirestoreConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let emulator_host = get_optional_env("FIRESTORE_EMULATOR_HOST");
        let api_key = match (&emulator_host, get_optional_env("FIRESTORE_API_KEY")) {
            (_, Some(key)) => Some(validate_api_key(key, "FIRESTORE_API_KEY")?),
            (Some(_), None) => None,
            (None, None) => return Err(ConfigError::MissingEnvVar("FIRESTORE_API_KEY".to_string())),
        };
        let timeout_secs = get_env_or_default("STOCKROOM_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOCKROOM_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            project_id: get_required_env("FIRESTORE_PROJECT_ID")?,
            database: get_env_or_default("FIRESTORE_DATABASE", DEFAULT_DATABASE),
            api_key,
            id_token: get_optional_env("FIRESTORE_ID_TOKEN").map(SecretString::from),
            emulator_host,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Reject API keys that are obviously copied from a template.
fn validate_api_key(value: String, var_name: &str) -> Result<SecretString, ConfigError> {
    let secret = SecretString::from(value);
    let lower = secret.expose_secret().to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }
    Ok(secret)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_api_key_placeholder() {
        let result = validate_api_key("your-api-key-here".to_string(), "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_api_key_valid() {
        let result = validate_api_key("AIzaSyD4x9Kq2mT7vLw0".to_string(), "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_firestore_config_debug_redacts() {
        let config = FirestoreConfig {
            project_id: "demo-shop".to_string(),
            database: DEFAULT_DATABASE.to_string(),
            api_key: Some(SecretString::from("AIzaSyD4x9Kq2mT7vLw0")),
            id_token: Some(SecretString::from("eyJhbGciOi")),
            emulator_host: None,
            timeout: Duration::from_secs(30),
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("AIzaSyD4x9Kq2mT7vLw0"));
        assert!(!debug.contains("eyJhbGciOi"));
    }

    #[test]
    fn test_default_collections() {
        let collections = Collections::default();
        assert_eq!(collections.stock, "estoque");
        assert_eq!(collections.sales, "vendas");
    }
}
