//! # dirsync core
//!
//! Domain model and contracts for reconciling user identities from an
//! authoritative relational source into a directory target.
//!
//! This crate carries no I/O. It provides:
//!
//! - [`UserRecord`] and the static [`UserField`] registry that replaces
//!   name-string reflection with typed accessor/mutator pairs
//! - [`FieldMappings`], the validated directory-attribute mapping table
//! - [`SourceRepository`] and [`TargetRepository`], the two capability
//!   traits implemented by the connector crates
//! - [`SyncError`] with transient/permanent classification
//!
//! ## Example
//!
//! ```
//! use dirsync_core::prelude::*;
//!
//! let mappings = FieldMappings::new([("mail", "email"), ("sn", "last_name")])?;
//! let mut user = UserRecord::new();
//! user.set(UserField::Email, Some("jdoe@example.com".into()));
//!
//! assert_eq!(mappings.attributes(), vec!["mail", "sn"]);
//! assert_eq!(user.identity(UserField::Email).as_deref(), Some("jdoe@example.com"));
//! # Ok::<(), dirsync_core::SyncError>(())
//! ```

pub mod error;
pub mod mapping;
pub mod traits;
pub mod user;

pub use error::{SyncError, SyncResult};
pub use mapping::{FieldMappings, MappingEntry};
pub use traits::{SourceRepository, TargetRepository};
pub use user::{FieldValue, ParseUserFieldError, UserField, UserRecord};

/// Prelude module for convenient imports.
///
/// ```
/// use dirsync_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{SyncError, SyncResult};
    pub use crate::mapping::{FieldMappings, MappingEntry};
    pub use crate::traits::{SourceRepository, TargetRepository};
    pub use crate::user::{FieldValue, UserField, UserRecord};
}

// Re-export async_trait for repository implementors
pub use async_trait::async_trait;
