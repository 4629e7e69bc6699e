//! # dirsync database connector
//!
//! Authoritative-source side of dirsync: a [`SourceRepository`] backed by
//! PostgreSQL. One statement, one complete snapshot; a failed query fails
//! the whole fetch rather than yielding a partial set.
//!
//! [`SourceRepository`]: dirsync_core::SourceRepository

pub mod config;
pub mod connector;

pub use config::DatabaseConfig;
pub use connector::DatabaseSource;
