//! LDAP target repository.
//!
//! Implements [`TargetRepository`] over `ldap3`. Connections are scoped to
//! a single operation: bind on entry, unbind on completion, with drop
//! closing the connection on early-error paths.

use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, LdapError, Mod, Scope, SearchEntry};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use dirsync_core::{
    FieldMappings, SyncError, SyncResult, TargetRepository, UserRecord,
};

use crate::codec;
use crate::config::LdapConfig;

/// LDAP/Active Directory implementation of the target repository.
pub struct LdapDirectory {
    config: LdapConfig,
    mappings: FieldMappings,
}

impl LdapDirectory {
    /// Create a new directory repository with the given configuration.
    pub fn new(config: LdapConfig, mappings: FieldMappings) -> SyncResult<Self> {
        config.validate()?;
        Ok(Self { config, mappings })
    }

    /// Open a fresh connection and bind.
    async fn bind(&self) -> Result<Ldap, LdapError> {
        let settings = LdapConnSettings::new()
            .set_conn_timeout(Duration::from_secs(self.config.connection_timeout_secs))
            .set_starttls(self.config.use_starttls);

        let url = self.config.url();
        debug!(url = %url, "connecting to directory");

        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &url).await?;

        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "LDAP connection driver error");
            }
        });

        let password = self.config.bind_password.as_deref().unwrap_or("");
        ldap.simple_bind(&self.config.bind_dn, password)
            .await?
            .success()?;

        Ok(ldap)
    }

    /// Unbind and drop a connection, logging (not failing) on error.
    async fn release(&self, mut ldap: Ldap) {
        if let Err(e) = ldap.unbind().await {
            warn!(error = %e, "error during LDAP unbind");
        }
    }

    /// Search for the single entry matching the identity attribute.
    async fn search_one(
        &self,
        ldap: &mut Ldap,
        identifier: &str,
    ) -> Result<Option<SearchEntry>, LdapError> {
        let filter = format!(
            "({}={})",
            self.config.identity_attribute,
            escape_ldap_value(identifier)
        );

        let (entries, _res) = ldap
            .search(
                &self.config.base_dn,
                Scope::Subtree,
                &filter,
                self.mappings.attributes(),
            )
            .await?
            .success()?;

        Ok(entries.into_iter().next().map(SearchEntry::construct))
    }

    /// Adapt a directory entry into a user record via the codec's read path.
    fn entry_to_user(&self, entry: &SearchEntry) -> UserRecord {
        let mut user = UserRecord::new();
        for mapping in &self.mappings {
            if let Some(stored) = entry.attrs.get(&mapping.attribute).and_then(|v| v.first()) {
                user.set(
                    mapping.field,
                    codec::parse_attribute_value(&mapping.attribute, stored),
                );
            }
        }
        user
    }

    /// Stage and commit attribute changes against a resolved entry.
    async fn apply_to_entry(
        &self,
        ldap: &mut Ldap,
        identifier: &str,
        user: &UserRecord,
    ) -> SyncResult<()> {
        let entry = self.search_one(ldap, identifier).await.map_err(|e| {
            error!(identifier, error = %e, "directory search failed");
            SyncError::target_lookup_with_source(identifier, "directory search failed", e)
        })?;

        let Some(entry) = entry else {
            warn!(identifier, "user not found in target directory, skipping update");
            return Ok(());
        };

        let current: HashMap<String, String> = entry
            .attrs
            .iter()
            .filter_map(|(name, values)| values.first().map(|v| (name.clone(), v.clone())))
            .collect();

        let staged = plan_attribute_updates(&self.mappings, user, &current);
        if staged.is_empty() {
            debug!(identifier, "all attributes current, nothing to commit");
            return Ok(());
        }

        let change_count = staged.len();
        let mods: Vec<Mod<String>> = staged
            .into_iter()
            .map(|change| Mod::Replace(change.attribute, HashSet::from([change.value])))
            .collect();

        ldap.modify(&entry.dn, mods)
            .await
            .and_then(|r| r.success())
            .map_err(|e| {
                error!(identifier, error = %e, "failed to commit attribute changes");
                SyncError::commit_with_source(identifier, "directory modify failed", e)
            })?;

        info!(identifier, changes = change_count, "user updated");
        Ok(())
    }
}

#[async_trait]
impl TargetRepository for LdapDirectory {
    async fn find_user(&self, identifier: &str) -> SyncResult<Option<UserRecord>> {
        let mut ldap = self.bind().await.map_err(|e| {
            error!(identifier, error = %e, "failed to connect to directory");
            SyncError::target_lookup_with_source(identifier, "failed to connect to directory", e)
        })?;

        let result = self.search_one(&mut ldap, identifier).await;
        self.release(ldap).await;

        let entry = result.map_err(|e| {
            error!(identifier, error = %e, "directory search failed");
            SyncError::target_lookup_with_source(identifier, "directory search failed", e)
        })?;

        Ok(entry.map(|e| self.entry_to_user(&e)))
    }

    async fn apply_update(&self, user: &UserRecord) -> SyncResult<()> {
        let identifier = user.identity(self.config.identity_field).ok_or_else(|| {
            SyncError::invalid_record(format!(
                "record has no value for identity field '{}'",
                self.config.identity_field
            ))
        })?;

        let mut ldap = self.bind().await.map_err(|e| {
            error!(identifier, error = %e, "failed to connect to directory");
            SyncError::commit_with_source(&identifier, "failed to connect to directory", e)
        })?;

        let result = self.apply_to_entry(&mut ldap, &identifier, user).await;
        self.release(ldap).await;
        result
    }
}

/// A single staged attribute write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedChange {
    pub attribute: String,
    pub value: String,
}

/// Decide which attributes need writing, in mapping-table order.
///
/// Skips, in order of checking: protected attributes, absent source fields,
/// values the codec cannot encode (contained to the one attribute), values
/// rejected by validation, and values equal to what is already stored.
pub fn plan_attribute_updates(
    mappings: &FieldMappings,
    user: &UserRecord,
    current: &HashMap<String, String>,
) -> Vec<StagedChange> {
    let mut staged = Vec::new();

    for mapping in mappings {
        if codec::is_protected_attribute(&mapping.attribute) {
            continue;
        }

        let Some(value) = user.get(mapping.field) else {
            continue;
        };

        let formatted = match codec::format_attribute_value(&mapping.attribute, &value.to_string())
        {
            Ok(formatted) => formatted,
            Err(e) => {
                warn!(attribute = %mapping.attribute, error = %e, "skipping attribute");
                continue;
            }
        };

        if !codec::is_valid_attribute_value(&mapping.attribute, &formatted) {
            debug!(attribute = %mapping.attribute, "skipping invalid attribute value");
            continue;
        }

        if current.get(&mapping.attribute).map(String::as_str) == Some(formatted.as_str()) {
            continue;
        }

        staged.push(StagedChange {
            attribute: mapping.attribute.clone(),
            value: formatted,
        });
    }

    staged
}

/// Escape special characters in LDAP filter values (RFC 4515).
fn escape_ldap_value(value: &str) -> String {
    value
        .replace('\\', "\\5c")
        .replace('*', "\\2a")
        .replace('(', "\\28")
        .replace(')', "\\29")
        .replace('\0', "\\00")
}
