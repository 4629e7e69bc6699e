//! LDAP target configuration.

use serde::{Deserialize, Serialize};

use dirsync_core::{SyncError, SyncResult, UserField};

/// Configuration for the LDAP target repository.
#[derive(Clone, Serialize, Deserialize)]
pub struct LdapConfig {
    /// LDAP server hostname or IP address.
    pub host: String,

    /// LDAP server port (389 for LDAP, 636 for LDAPS).
    #[serde(default = "default_ldap_port")]
    pub port: u16,

    /// Use SSL/TLS (LDAPS).
    #[serde(default)]
    pub use_ssl: bool,

    /// Use STARTTLS upgrade on a plain LDAP connection.
    #[serde(default)]
    pub use_starttls: bool,

    /// Base DN searched for user entries (e.g. "dc=example,dc=com").
    pub base_dn: String,

    /// Bind DN for authentication.
    pub bind_dn: String,

    /// Bind password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_password: Option<String>,

    /// Directory attribute holding the identity value.
    #[serde(default = "default_identity_attribute")]
    pub identity_attribute: String,

    /// User field the identity value is read from on the apply path.
    #[serde(default = "default_identity_field")]
    pub identity_field: UserField,

    /// Connection timeout in seconds.
    #[serde(default = "default_connection_timeout_secs")]
    pub connection_timeout_secs: u64,
}

impl std::fmt::Debug for LdapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("use_ssl", &self.use_ssl)
            .field("use_starttls", &self.use_starttls)
            .field("base_dn", &self.base_dn)
            .field("bind_dn", &self.bind_dn)
            .field(
                "bind_password",
                &self.bind_password.as_ref().map(|_| "***REDACTED***"),
            )
            .field("identity_attribute", &self.identity_attribute)
            .field("identity_field", &self.identity_field)
            .field("connection_timeout_secs", &self.connection_timeout_secs)
            .finish()
    }
}

fn default_ldap_port() -> u16 {
    389
}

fn default_identity_attribute() -> String {
    "sAMAccountName".to_string()
}

fn default_identity_field() -> UserField {
    UserField::SamAccountName
}

fn default_connection_timeout_secs() -> u64 {
    30
}

impl LdapConfig {
    /// Create a new LDAP config with required fields.
    pub fn new(
        host: impl Into<String>,
        base_dn: impl Into<String>,
        bind_dn: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: default_ldap_port(),
            use_ssl: false,
            use_starttls: false,
            base_dn: base_dn.into(),
            bind_dn: bind_dn.into(),
            bind_password: None,
            identity_attribute: default_identity_attribute(),
            identity_field: default_identity_field(),
            connection_timeout_secs: default_connection_timeout_secs(),
        }
    }

    /// Set the bind password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.bind_password = Some(password.into());
        self
    }

    /// Enable SSL (LDAPS) and switch to the LDAPS port.
    #[must_use]
    pub fn with_ssl(mut self) -> Self {
        self.use_ssl = true;
        self.port = 636;
        self
    }

    /// Set the LDAP port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Get the LDAP URL.
    #[must_use]
    pub fn url(&self) -> String {
        let scheme = if self.use_ssl { "ldaps" } else { "ldap" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        if self.host.trim().is_empty() {
            return Err(SyncError::invalid_configuration("LDAP host is required"));
        }
        if self.port == 0 {
            return Err(SyncError::invalid_configuration("LDAP port must be non-zero"));
        }
        if self.base_dn.trim().is_empty() {
            return Err(SyncError::invalid_configuration("LDAP base DN is required"));
        }
        if self.bind_dn.trim().is_empty() {
            return Err(SyncError::invalid_configuration("LDAP bind DN is required"));
        }
        if self.identity_attribute.trim().is_empty() {
            return Err(SyncError::invalid_configuration(
                "identity attribute is required",
            ));
        }
        Ok(())
    }
}
