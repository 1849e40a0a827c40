//! Request, patch, and page types

use serde::{Deserialize, Serialize};
use vantage_model::{
    DashboardSettings, DataSourceKind, Owner, Visibility, Widget, WorkspaceId,
};

/// One page of a list result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Entities on this page
    pub items: Vec<T>,
    /// Total matching entities across pages
    pub total: usize,
}

impl<T> Page<T> {
    /// Page holding everything (no pagination applied)
    #[must_use]
    pub fn complete(items: Vec<T>) -> Self {
        let total = items.len();
        Self { items, total }
    }
}

/// Payload for creating a dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardDraft {
    /// Display name (sanitized client-side before send)
    pub name: String,
    /// Description (sanitized client-side before send)
    #[serde(default)]
    pub description: String,
    /// Who can open it
    #[serde(default)]
    pub visibility: Visibility,
    /// Owning user and workspace
    pub owner: Owner,
    /// Initial widgets
    #[serde(default)]
    pub widgets: Vec<Widget>,
    /// Display settings
    #[serde(default)]
    pub settings: DashboardSettings,
}

impl DashboardDraft {
    /// Minimal draft: a name and an owner
    #[must_use]
    pub fn new(name: impl Into<String>, owner: Owner) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            visibility: Visibility::default(),
            owner,
            widgets: Vec::new(),
            settings: DashboardSettings::default(),
        }
    }
}

/// Partial dashboard update; absent fields stay untouched
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPatch {
    /// New display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New visibility
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    /// Replacement widget collection (a saved editing session)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widgets: Option<Vec<Widget>>,
    /// New display settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<DashboardSettings>,
}

impl DashboardPatch {
    /// Whether the patch changes nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.visibility.is_none()
            && self.widgets.is_none()
            && self.settings.is_none()
    }
}

/// Dashboard list filters
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardFilters {
    /// Only dashboards in this workspace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<WorkspaceId>,
    /// Only dashboards with this visibility
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    /// Case-insensitive name/description substring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl DashboardFilters {
    /// Whether no filter is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workspace.is_none() && self.visibility.is_none() && self.search.is_none()
    }
}

/// Payload for creating a data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceDraft {
    /// Display name
    pub name: String,
    /// Backing store kind
    pub kind: DataSourceKind,
    /// Connection locator
    pub connection_url: String,
    /// Workspace the source belongs to
    pub workspace: WorkspaceId,
}

/// Partial data-source update
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourcePatch {
    /// New display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New connection locator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_url: Option<String>,
}

/// Data-source list filters
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceFilters {
    /// Only sources in this workspace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<WorkspaceId>,
    /// Only sources of this kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<DataSourceKind>,
}
