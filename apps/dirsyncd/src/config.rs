//! Service configuration loaded from environment variables.
//!
//! Fail-fast loading: required variables must be present and valid or the
//! process exits with a clear message before any I/O happens.

use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use dirsync_connector_database::DatabaseConfig;
use dirsync_connector_ldap::LdapConfig;
use dirsync_core::{FieldMappings, MappingEntry, UserField};

/// Error loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {name}")]
    MissingVar { name: &'static str },

    #[error("invalid value for {name}: {message}")]
    InvalidVar { name: &'static str, message: String },

    #[error("failed to load field mappings from {path}: {message}")]
    MappingFile { path: String, message: String },
}

/// Validated service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Log filter directive (overridable via `RUST_LOG`).
    pub rust_log: String,

    /// Source database settings.
    pub database: DatabaseConfig,

    /// Target directory settings.
    pub ldap: LdapConfig,

    /// Field used as the reconciliation key.
    pub identity_field: UserField,

    /// Wait between reconciliation cycles.
    pub sync_interval: Duration,

    /// Directory attribute mapping table.
    pub mappings: FieldMappings,
}

impl Config {
    /// Load and validate configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let rust_log = optional("RUST_LOG").unwrap_or_else(|| "info".to_string());

        let mut database = DatabaseConfig::new(required("DATABASE_URL")?);
        if let Some(table) = optional("SYNC_USERS_TABLE") {
            database = database.with_users_table(table);
        }
        database
            .validate()
            .map_err(|e| invalid("DATABASE_URL", e.to_string()))?;

        let mut ldap = LdapConfig::new(
            required("LDAP_HOST")?,
            required("LDAP_BASE_DN")?,
            required("LDAP_BIND_DN")?,
        );
        if let Some(password) = optional("LDAP_BIND_PASSWORD") {
            ldap = ldap.with_password(password);
        }
        if parse_bool(optional("LDAP_USE_SSL").as_deref()) {
            ldap = ldap.with_ssl();
        }
        ldap.use_starttls = parse_bool(optional("LDAP_USE_STARTTLS").as_deref());
        if let Some(port) = optional("LDAP_PORT") {
            let port = port
                .parse::<u16>()
                .map_err(|e| invalid("LDAP_PORT", e.to_string()))?;
            ldap = ldap.with_port(port);
        }
        if let Some(attribute) = optional("LDAP_IDENTITY_ATTRIBUTE") {
            ldap.identity_attribute = attribute;
        }

        let identity_field = match optional("SYNC_IDENTITY_FIELD") {
            Some(name) => UserField::from_str(&name)
                .map_err(|e| invalid("SYNC_IDENTITY_FIELD", e.to_string()))?,
            None => UserField::SamAccountName,
        };
        ldap.identity_field = identity_field;

        let sync_interval = match optional("SYNC_INTERVAL_SECS") {
            Some(raw) => parse_interval(&raw).map_err(|m| invalid("SYNC_INTERVAL_SECS", m))?,
            None => Duration::from_secs(300),
        };

        let mappings = match optional("SYNC_FIELD_MAPPINGS") {
            Some(path) => {
                let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::MappingFile {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
                parse_mapping_entries(&raw).map_err(|message| ConfigError::MappingFile {
                    path,
                    message,
                })?
            }
            None => FieldMappings::default_directory(),
        };

        ldap.validate()
            .map_err(|e| invalid("LDAP_HOST", e.to_string()))?;

        Ok(Self {
            rust_log,
            database,
            ldap,
            identity_field,
            sync_interval,
            mappings,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingVar { name })
}

fn optional(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn invalid(name: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidVar {
        name,
        message: message.into(),
    }
}

fn parse_bool(value: Option<&str>) -> bool {
    matches!(
        value.map(str::trim),
        Some("1") | Some("true") | Some("TRUE") | Some("yes")
    )
}

fn parse_interval(raw: &str) -> Result<Duration, String> {
    let secs = raw.trim().parse::<u64>().map_err(|e| e.to_string())?;
    if secs == 0 {
        return Err("interval must be at least one second".to_string());
    }
    Ok(Duration::from_secs(secs))
}

/// Parse a JSON mapping file: an array of `{"attribute", "field"}` entries.
fn parse_mapping_entries(raw: &str) -> Result<FieldMappings, String> {
    let entries: Vec<MappingEntry> = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    if entries.is_empty() {
        return Err("mapping file contains no entries".to_string());
    }
    FieldMappings::from_entries(entries).map_err(|e| e.to_string())
}
