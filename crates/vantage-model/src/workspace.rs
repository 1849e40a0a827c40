//! Workspace and organization entities

use crate::id::{OrganizationId, WorkspaceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A workspace scoping dashboards and data sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    /// Workspace id
    pub id: WorkspaceId,
    /// Display name
    pub name: String,
    /// Owning organization
    pub organization: OrganizationId,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// An organization grouping workspaces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Organization id
    pub id: OrganizationId,
    /// Display name
    pub name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}
