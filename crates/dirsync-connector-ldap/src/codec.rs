//! Directory attribute codec.
//!
//! Attribute-specific encode/validate/protect rules, independent of the
//! LDAP transport. The write path is strict (encoding failures are errors
//! the caller contains per attribute); the read path is lenient (anything
//! unparseable becomes an absent value with a warning). That asymmetry is
//! intentional and load-bearing: a malformed value already stored in the
//! directory must never stall reconciliation.

use chrono::NaiveDate;
use tracing::warn;

use dirsync_core::{FieldValue, SyncError, SyncResult};

/// The attribute carrying the hire date in its textual envelope.
const DATE_ATTRIBUTE: &str = "info";

/// Envelope prefix for the date attribute.
const DATE_PREFIX: &str = "BirthDate:";

/// Attributes that reconciliation must never overwrite.
const PROTECTED_ATTRIBUTES: [&str; 2] = ["sAMAccountName", "userPrincipalName"];

/// Maximum accepted length for `mail` values.
const MAX_MAIL_LEN: usize = 256;

/// Maximum accepted length for phone attribute values.
const MAX_PHONE_LEN: usize = 32;

/// Maximum accepted length for `employeeID` values.
const MAX_EMPLOYEE_ID_LEN: usize = 64;

/// Encode a raw field value into the attribute's stored representation.
///
/// The date attribute requires a `YYYY-MM-DD` value and produces the
/// `BirthDate:` envelope; an unparseable date is an error naming the
/// offending value. Every other attribute passes through unchanged.
pub fn format_attribute_value(attribute: &str, raw: &str) -> SyncResult<String> {
    if attribute == DATE_ATTRIBUTE {
        let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|_| SyncError::format(attribute, raw))?;
        return Ok(format!("{DATE_PREFIX}{}", date.format("%Y-%m-%d")));
    }
    Ok(raw.to_string())
}

/// Decode a stored attribute value back into a field value.
///
/// Never fails: for the date attribute, a leading `BirthDate:` envelope is
/// stripped and the remainder parsed as `YYYY-MM-DD`; anything unparseable
/// is logged and yields `None`.
pub fn parse_attribute_value(attribute: &str, stored: &str) -> Option<FieldValue> {
    if attribute == DATE_ATTRIBUTE {
        let body = stored.strip_prefix(DATE_PREFIX).unwrap_or(stored);
        return match NaiveDate::parse_from_str(body.trim(), "%Y-%m-%d") {
            Ok(date) => Some(FieldValue::Date(date)),
            Err(_) => {
                warn!(attribute, value = stored, "failed to parse date from stored value");
                None
            }
        };
    }
    Some(FieldValue::Text(stored.to_string()))
}

/// Check whether an attribute is excluded from updates unconditionally.
#[must_use]
pub fn is_protected_attribute(attribute: &str) -> bool {
    PROTECTED_ATTRIBUTES.contains(&attribute)
}

/// Check whether a formatted value is acceptable for the attribute.
///
/// Blank values are never valid. The remaining bounds are directory policy
/// constants, not derived from any schema.
#[must_use]
pub fn is_valid_attribute_value(attribute: &str, value: &str) -> bool {
    if value.trim().is_empty() {
        return false;
    }

    match attribute {
        "mail" => value.contains('@') && value.chars().count() <= MAX_MAIL_LEN,
        "telephoneNumber" | "mobile" => value.chars().count() <= MAX_PHONE_LEN,
        "employeeID" => value.chars().count() <= MAX_EMPLOYEE_ID_LEN,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_format_date_attribute() {
        let formatted = format_attribute_value("info", "2023-01-15").unwrap();
        assert!(formatted.starts_with("BirthDate:"));
        assert!(formatted.contains("2023-01-15"));
    }

    #[test]
    fn test_format_date_attribute_rejects_garbage() {
        let err = format_attribute_value("info", "not-a-date").unwrap_err();
        assert!(matches!(err, SyncError::FormatError { .. }));
        assert!(err.to_string().contains("not-a-date"));
    }

    #[test]
    fn test_format_other_attributes_pass_through() {
        assert_eq!(
            format_attribute_value("mail", "jdoe@example.com").unwrap(),
            "jdoe@example.com"
        );
        assert_eq!(format_attribute_value("title", "").unwrap(), "");
    }

    #[test]
    fn test_parse_date_attribute_strips_prefix() {
        assert_eq!(
            parse_attribute_value("info", "BirthDate:2023-01-15"),
            Some(FieldValue::Date(
                NaiveDate::from_ymd_opt(2023, 1, 15).unwrap()
            ))
        );
    }

    #[test]
    fn test_parse_date_attribute_without_prefix() {
        assert_eq!(
            parse_attribute_value("info", "2023-01-15"),
            Some(FieldValue::Date(
                NaiveDate::from_ymd_opt(2023, 1, 15).unwrap()
            ))
        );
    }

    #[test]
    fn test_parse_date_attribute_is_lenient() {
        assert_eq!(parse_attribute_value("info", "BirthDate:soon"), None);
        assert_eq!(parse_attribute_value("info", "garbage"), None);
    }

    #[test]
    fn test_parse_other_attributes_pass_through() {
        assert_eq!(
            parse_attribute_value("mail", "jdoe@example.com"),
            Some(FieldValue::Text("jdoe@example.com".to_string()))
        );
    }

    #[test]
    fn test_protected_attributes() {
        assert!(is_protected_attribute("sAMAccountName"));
        assert!(is_protected_attribute("userPrincipalName"));
        assert!(!is_protected_attribute("mail"));
        assert!(!is_protected_attribute("samaccountname"));
    }

    #[test]
    fn test_blank_values_are_invalid() {
        assert!(!is_valid_attribute_value("title", ""));
        assert!(!is_valid_attribute_value("title", "   "));
    }

    #[test]
    fn test_mail_validation() {
        assert!(is_valid_attribute_value("mail", "a@b.com"));
        assert!(!is_valid_attribute_value("mail", "bad-email"));
        let long = format!("{}@example.com", "a".repeat(256));
        assert!(!is_valid_attribute_value("mail", &long));
    }

    #[test]
    fn test_phone_validation() {
        let long_phone = "1".repeat(37);
        assert!(!is_valid_attribute_value("telephoneNumber", &long_phone));
        assert!(!is_valid_attribute_value("mobile", &long_phone));
        assert!(is_valid_attribute_value("telephoneNumber", "555-12345"));
        assert!(is_valid_attribute_value("mobile", "555-12345"));
    }

    #[test]
    fn test_employee_id_validation() {
        assert!(is_valid_attribute_value("employeeID", "E-1042"));
        assert!(!is_valid_attribute_value("employeeID", &"9".repeat(65)));
    }

    #[test]
    fn test_other_attributes_accept_any_non_blank_value() {
        assert!(is_valid_attribute_value("department", &"x".repeat(500)));
    }
}
