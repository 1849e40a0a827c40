//! Data source entity
//!
//! A connection widgets query against. Connection secrets never travel
//! through this model; `connection_url` is the redacted display form the
//! server exposes.

use crate::error::ValidationError;
use crate::id::{DataSourceId, WorkspaceId};
use crate::sanitize;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Supported backing stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    /// PostgreSQL connection
    Postgres,
    /// MySQL connection
    Mysql,
    /// BigQuery project
    Bigquery,
    /// Uploaded CSV file
    Csv,
}

/// A queryable data connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    /// Data source id
    pub id: DataSourceId,
    /// Display name
    pub name: String,
    /// Backing store kind
    pub kind: DataSourceKind,
    /// Redacted connection locator
    pub connection_url: String,
    /// Workspace the source belongs to
    pub workspace: WorkspaceId,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp
    pub updated_at: DateTime<Utc>,
}

impl DataSource {
    /// Check the data source's invariants
    ///
    /// # Errors
    /// Name empty after sanitization or over [`crate::MAX_NAME_LEN`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        sanitize::sanitize_name_default(&self.name)?;
        Ok(())
    }
}
