//! User record and the static field registry.
//!
//! The registry replaces configuration-driven reflection: field names coming
//! from configuration resolve to [`UserField`] variants at startup, and
//! unknown names are rejected there instead of being skipped at runtime.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A user identity record as exchanged between source and target systems.
///
/// All fields are optional; a record only participates in reconciliation
/// when its identity field carries a non-blank value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub sam_account_name: Option<String>,
    pub employee_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
    pub full_name: Option<String>,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub internal_phone: Option<String>,
    pub mobile_phone: Option<String>,
    pub additional_phone: Option<String>,
    pub email: Option<String>,
    pub hire_date: Option<NaiveDate>,
}

/// A field of [`UserRecord`], addressable by its configuration name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserField {
    SamAccountName,
    EmployeeId,
    FirstName,
    LastName,
    MiddleName,
    FullName,
    JobTitle,
    Department,
    InternalPhone,
    MobilePhone,
    AdditionalPhone,
    Email,
    HireDate,
}

impl UserField {
    /// All registered fields.
    #[must_use]
    pub fn all() -> &'static [UserField] {
        &[
            UserField::SamAccountName,
            UserField::EmployeeId,
            UserField::FirstName,
            UserField::LastName,
            UserField::MiddleName,
            UserField::FullName,
            UserField::JobTitle,
            UserField::Department,
            UserField::InternalPhone,
            UserField::MobilePhone,
            UserField::AdditionalPhone,
            UserField::Email,
            UserField::HireDate,
        ]
    }

    /// Get the configuration name of this field.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            UserField::SamAccountName => "sam_account_name",
            UserField::EmployeeId => "employee_id",
            UserField::FirstName => "first_name",
            UserField::LastName => "last_name",
            UserField::MiddleName => "middle_name",
            UserField::FullName => "full_name",
            UserField::JobTitle => "job_title",
            UserField::Department => "department",
            UserField::InternalPhone => "internal_phone",
            UserField::MobilePhone => "mobile_phone",
            UserField::AdditionalPhone => "additional_phone",
            UserField::Email => "email",
            UserField::HireDate => "hire_date",
        }
    }
}

impl fmt::Display for UserField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserField {
    type Err = ParseUserFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserField::all()
            .iter()
            .find(|f| f.as_str() == s)
            .copied()
            .ok_or_else(|| ParseUserFieldError(s.to_string()))
    }
}

/// Error parsing a user field name from configuration.
#[derive(Debug, Clone)]
pub struct ParseUserFieldError(String);

impl fmt::Display for ParseUserFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown user field '{}'", self.0)
    }
}

impl std::error::Error for ParseUserFieldError {}

/// A single field value, either free text or a calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
}

impl FieldValue {
    /// Check whether the value is empty or whitespace-only.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Date(_) => false,
        }
    }

    /// Get the text content if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Date(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        FieldValue::Date(d)
    }
}

impl UserRecord {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a field through the registry.
    #[must_use]
    pub fn get(&self, field: UserField) -> Option<FieldValue> {
        let text = |v: &Option<String>| v.clone().map(FieldValue::Text);
        match field {
            UserField::SamAccountName => text(&self.sam_account_name),
            UserField::EmployeeId => text(&self.employee_id),
            UserField::FirstName => text(&self.first_name),
            UserField::LastName => text(&self.last_name),
            UserField::MiddleName => text(&self.middle_name),
            UserField::FullName => text(&self.full_name),
            UserField::JobTitle => text(&self.job_title),
            UserField::Department => text(&self.department),
            UserField::InternalPhone => text(&self.internal_phone),
            UserField::MobilePhone => text(&self.mobile_phone),
            UserField::AdditionalPhone => text(&self.additional_phone),
            UserField::Email => text(&self.email),
            UserField::HireDate => self.hire_date.map(FieldValue::Date),
        }
    }

    /// Read a field, treating blank text as absent.
    ///
    /// This is the view used for value comparison: a missing field and an
    /// empty or whitespace-only string are the same thing.
    #[must_use]
    pub fn get_normalized(&self, field: UserField) -> Option<FieldValue> {
        self.get(field).filter(|v| !v.is_blank())
    }

    /// Write a field through the registry.
    ///
    /// Assignments are lenient about the value shape: text assigned to the
    /// hire date is parsed as `YYYY-MM-DD` and dropped when unparseable,
    /// and a date assigned to a text field is stored in its rendered form.
    pub fn set(&mut self, field: UserField, value: Option<FieldValue>) {
        if let UserField::HireDate = field {
            self.hire_date = value.and_then(|v| match v {
                FieldValue::Date(d) => Some(d),
                FieldValue::Text(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok(),
            });
            return;
        }

        let text = value.map(|v| v.to_string());
        match field {
            UserField::SamAccountName => self.sam_account_name = text,
            UserField::EmployeeId => self.employee_id = text,
            UserField::FirstName => self.first_name = text,
            UserField::LastName => self.last_name = text,
            UserField::MiddleName => self.middle_name = text,
            UserField::FullName => self.full_name = text,
            UserField::JobTitle => self.job_title = text,
            UserField::Department => self.department = text,
            UserField::InternalPhone => self.internal_phone = text,
            UserField::MobilePhone => self.mobile_phone = text,
            UserField::AdditionalPhone => self.additional_phone = text,
            UserField::Email => self.email = text,
            UserField::HireDate => unreachable!("handled above"),
        }
    }

    /// Read the record's identity value through the given field.
    ///
    /// Returns `None` when the field is absent or blank; such records are
    /// skipped by the engine rather than reconciled.
    #[must_use]
    pub fn identity(&self, field: UserField) -> Option<String> {
        self.get_normalized(field).map(|v| v.to_string())
    }
}
