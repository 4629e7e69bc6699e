//! PostgreSQL source repository.
//!
//! Reads the authoritative user snapshot in a single statement. The pool is
//! created lazily on first use and reused for the life of the process.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use dirsync_core::{SourceRepository, SyncError, SyncResult, UserRecord};

use crate::config::DatabaseConfig;

/// PostgreSQL implementation of the source repository.
pub struct DatabaseSource {
    config: DatabaseConfig,

    /// Connection pool (lazily initialized).
    pool: Arc<RwLock<Option<PgPool>>>,
}

impl DatabaseSource {
    /// Create a new source repository with the given configuration.
    pub fn new(config: DatabaseConfig) -> SyncResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            pool: Arc::new(RwLock::new(None)),
        })
    }

    /// Get the connection pool, creating it if necessary.
    async fn get_pool(&self) -> SyncResult<PgPool> {
        {
            let pool_guard = self.pool.read().await;
            if let Some(ref pool) = *pool_guard {
                return Ok(pool.clone());
            }
        }

        let pool = self.create_pool().await?;

        {
            let mut pool_guard = self.pool.write().await;
            *pool_guard = Some(pool.clone());
        }

        Ok(pool)
    }

    async fn create_pool(&self) -> SyncResult<PgPool> {
        debug!(table = %self.config.users_table, "creating database connection pool");

        let pool = PgPoolOptions::new()
            .max_connections(self.config.pool_size)
            .acquire_timeout(Duration::from_secs(self.config.acquire_timeout_secs))
            .connect(&self.config.url)
            .await
            .map_err(|e| {
                SyncError::source_fetch_with_source("failed to connect to source database", e)
            })?;

        info!("source database connection pool established");
        Ok(pool)
    }

    /// The snapshot statement for the configured users table.
    fn snapshot_query(&self) -> String {
        format!(
            r#"SELECT sam_account_name, employee_id, first_name, last_name, middle_name,
                      full_name, job_title, department, internal_phone, mobile_phone,
                      additional_phone, email, hire_date
               FROM "{}""#,
            self.config.users_table
        )
    }
}

#[async_trait]
impl SourceRepository for DatabaseSource {
    async fn fetch_all_users(&self) -> SyncResult<Vec<UserRecord>> {
        let pool = self.get_pool().await?;

        let rows: Vec<UserRow> = sqlx::query_as(&self.snapshot_query())
            .fetch_all(&pool)
            .await
            .map_err(|e| {
                error!(error = %e, "error retrieving users from source database");
                SyncError::source_fetch_with_source("source snapshot query failed", e)
            })?;

        debug!(count = rows.len(), "fetched source snapshot");
        Ok(rows.into_iter().map(UserRow::into_record).collect())
    }
}

/// Row shape of the source users table.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    sam_account_name: Option<String>,
    employee_id: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    middle_name: Option<String>,
    full_name: Option<String>,
    job_title: Option<String>,
    department: Option<String>,
    internal_phone: Option<String>,
    mobile_phone: Option<String>,
    additional_phone: Option<String>,
    email: Option<String>,
    hire_date: Option<NaiveDate>,
}

impl UserRow {
    fn into_record(self) -> UserRecord {
        UserRecord {
            sam_account_name: self.sam_account_name,
            employee_id: self.employee_id,
            first_name: self.first_name,
            last_name: self.last_name,
            middle_name: self.middle_name,
            full_name: self.full_name,
            job_title: self.job_title,
            department: self.department,
            internal_phone: self.internal_phone,
            mobile_phone: self.mobile_phone,
            additional_phone: self.additional_phone,
            email: self.email,
            hire_date: self.hire_date,
        }
    }
}
