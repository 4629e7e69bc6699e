//! Field-mapping table between directory attributes and user fields.
//!
//! Built once from configuration and read-only afterwards. Iteration order
//! is declaration order, which is also the order attribute updates are
//! staged in.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

use crate::error::{SyncError, SyncResult};
use crate::user::UserField;

/// One mapping-table entry: a target attribute fed from one user field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Attribute name on the directory side (e.g. `givenName`).
    pub attribute: String,
    /// The user field the value comes from.
    pub field: UserField,
}

/// The validated attribute mapping table.
#[derive(Debug, Clone)]
pub struct FieldMappings {
    entries: Vec<MappingEntry>,
}

impl FieldMappings {
    /// Build a mapping table from `(attribute, field-name)` pairs.
    ///
    /// Duplicate attribute names and unknown field names are rejected here,
    /// at configuration-validation time.
    pub fn new<I, A, F>(pairs: I) -> SyncResult<Self>
    where
        I: IntoIterator<Item = (A, F)>,
        A: Into<String>,
        F: AsRef<str>,
    {
        let mut entries = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for (attribute, field) in pairs {
            let attribute = attribute.into();
            if attribute.trim().is_empty() {
                return Err(SyncError::invalid_mapping("empty attribute name"));
            }
            if !seen.insert(attribute.clone()) {
                return Err(SyncError::invalid_mapping(format!(
                    "duplicate attribute '{attribute}'"
                )));
            }
            let field = UserField::from_str(field.as_ref())
                .map_err(|e| SyncError::invalid_mapping(e.to_string()))?;
            entries.push(MappingEntry { attribute, field });
        }

        Ok(Self { entries })
    }

    /// Build from already-resolved entries (duplicates still rejected).
    pub fn from_entries(entries: Vec<MappingEntry>) -> SyncResult<Self> {
        let mut seen: HashSet<&str> = HashSet::new();
        for entry in &entries {
            if entry.attribute.trim().is_empty() {
                return Err(SyncError::invalid_mapping("empty attribute name"));
            }
            if !seen.insert(entry.attribute.as_str()) {
                return Err(SyncError::invalid_mapping(format!(
                    "duplicate attribute '{}'",
                    entry.attribute
                )));
            }
        }
        Ok(Self { entries })
    }

    /// The standard Active Directory user mapping.
    #[must_use]
    pub fn default_directory() -> Self {
        let pairs = [
            ("sAMAccountName", UserField::SamAccountName),
            ("employeeID", UserField::EmployeeId),
            ("givenName", UserField::FirstName),
            ("sn", UserField::LastName),
            ("middleName", UserField::MiddleName),
            ("displayName", UserField::FullName),
            ("title", UserField::JobTitle),
            ("department", UserField::Department),
            ("telephoneNumber", UserField::InternalPhone),
            ("mobile", UserField::MobilePhone),
            ("otherTelephone", UserField::AdditionalPhone),
            ("mail", UserField::Email),
            ("info", UserField::HireDate),
        ];
        Self {
            entries: pairs
                .into_iter()
                .map(|(attribute, field)| MappingEntry {
                    attribute: attribute.to_string(),
                    field,
                })
                .collect(),
        }
    }

    /// Iterate entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &MappingEntry> {
        self.entries.iter()
    }

    /// The directory attribute names, in declaration order.
    ///
    /// This is the attribute list loaded by target searches.
    #[must_use]
    pub fn attributes(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.attribute.clone()).collect()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a FieldMappings {
    type Item = &'a MappingEntry;
    type IntoIter = std::slice::Iter<'a, MappingEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
