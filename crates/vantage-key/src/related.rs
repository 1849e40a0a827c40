//! Invalidation-key derivation
//!
//! When an entity mutates, every cache entry whose key starts with one of
//! its related keys must be invalidated. The sets below are derived from
//! the ownership graph — a dashboard owns its widgets, a workspace scopes
//! its dashboards, analytics results read through data sources — and a
//! missing entry here is a stale-cache bug, so the mapping leans coarse:
//! a prefix that over-invalidates is acceptable, a gap is not.

use crate::domains::{dashboards, data_sources, organizations, workspaces};
use crate::key::QueryKey;
use vantage_model::{DashboardId, DataSourceId, OrganizationId, WorkspaceId};

/// Reference to a mutated entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    /// A dashboard (covers settings and metadata changes)
    Dashboard(DashboardId),
    /// A widget, addressed through its owning dashboard
    Widget {
        /// The dashboard owning the widget
        dashboard: DashboardId,
    },
    /// A data source
    DataSource(DataSourceId),
    /// A workspace
    Workspace(WorkspaceId),
    /// An organization
    Organization(OrganizationId),
}

/// Every key prefix to invalidate when `entity` mutates
#[must_use]
pub fn related_keys(entity: EntityRef) -> Vec<QueryKey> {
    match entity {
        EntityRef::Dashboard(id) => vec![
            dashboards::detail(id),
            dashboards::lists(),
            // widgets key is under the detail prefix, listed for clarity
            dashboards::widgets(id),
            // the owning workspace is unknown from the id alone; invalidate
            // every workspace-scoped list rather than risk a stale one
            dashboards::by_workspace_all(),
        ],
        EntityRef::Widget { dashboard } => vec![
            dashboards::detail(dashboard),
            dashboards::widgets(dashboard),
            // lists show widget counts and previews
            dashboards::lists(),
        ],
        EntityRef::DataSource(id) => vec![
            data_sources::detail(id),
            data_sources::lists(),
            // cached chart result sets read through the source
            crate::domains::analytics::all(),
        ],
        EntityRef::Workspace(id) => vec![
            workspaces::detail(id),
            workspaces::lists(),
            dashboards::by_workspace(id),
        ],
        EntityRef::Organization(id) => vec![
            organizations::detail(id),
            organizations::lists(),
            workspaces::lists(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dashboard_mutation_reaches_detail_lists_and_widgets() {
        let id = DashboardId::new();
        let related = related_keys(EntityRef::Dashboard(id));

        let detail = dashboards::detail(id);
        let filtered_list = dashboards::list(Some(json!({"search": "rev"}).into()));
        let widgets = dashboards::widgets(id);

        assert!(related.iter().any(|k| detail.starts_with(k)));
        assert!(related.iter().any(|k| filtered_list.starts_with(k)));
        assert!(related.iter().any(|k| widgets.starts_with(k)));
    }

    #[test]
    fn dashboard_mutation_does_not_reach_other_dashboards() {
        let related = related_keys(EntityRef::Dashboard(DashboardId::new()));
        let other_detail = dashboards::detail(DashboardId::new());
        assert!(!related.iter().any(|k| other_detail.starts_with(k)));
    }

    #[test]
    fn data_source_mutation_reaches_analytics_results() {
        let source = DataSourceId::new();
        let related = related_keys(EntityRef::DataSource(source));
        let result = crate::domains::analytics::query(source, json!({"range": "7d"}).into());
        assert!(related.iter().any(|k| result.starts_with(k)));
    }

    #[test]
    fn workspace_mutation_reaches_its_scoped_dashboard_list() {
        let ws = WorkspaceId::new();
        let related = related_keys(EntityRef::Workspace(ws));
        assert!(related.contains(&dashboards::by_workspace(ws)));
    }
}
