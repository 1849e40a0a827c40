//! Per-domain key factories
//!
//! One module per entity domain. Factories keep the nesting contract:
//! `detail(id)` extends `all()`, `list(..)` extends `lists()`,
//! `widgets(id)` extends `detail(id)` — so prefix invalidation on a coarser
//! key always reaches the finer ones.

use crate::key::{CanonicalParams, QueryKey};

/// Dashboard keys
pub mod dashboards {
    use super::{CanonicalParams, QueryKey};
    use vantage_model::{DashboardId, WorkspaceId};

    /// Root of the domain
    #[must_use]
    pub fn all() -> QueryKey {
        QueryKey::root("dashboards")
    }

    /// Prefix covering every list variant
    #[must_use]
    pub fn lists() -> QueryKey {
        all().push("list")
    }

    /// A filtered list; `None` is the unfiltered list
    #[must_use]
    pub fn list(filters: Option<CanonicalParams>) -> QueryKey {
        match filters {
            Some(params) => lists().with_params(params),
            None => lists(),
        }
    }

    /// A single dashboard
    #[must_use]
    pub fn detail(id: DashboardId) -> QueryKey {
        all().push("detail").push(id.to_string())
    }

    /// A dashboard's widget collection
    #[must_use]
    pub fn widgets(id: DashboardId) -> QueryKey {
        detail(id).push("widgets")
    }

    /// Prefix covering every workspace-scoped dashboard list
    #[must_use]
    pub fn by_workspace_all() -> QueryKey {
        all().push("workspace")
    }

    /// Dashboards scoped to one workspace
    #[must_use]
    pub fn by_workspace(id: WorkspaceId) -> QueryKey {
        by_workspace_all().push(id.to_string())
    }
}

/// Data source keys
pub mod data_sources {
    use super::{CanonicalParams, QueryKey};
    use vantage_model::DataSourceId;

    /// Root of the domain
    #[must_use]
    pub fn all() -> QueryKey {
        QueryKey::root("dataSources")
    }

    /// Prefix covering every list variant
    #[must_use]
    pub fn lists() -> QueryKey {
        all().push("list")
    }

    /// A filtered list; `None` is the unfiltered list
    #[must_use]
    pub fn list(filters: Option<CanonicalParams>) -> QueryKey {
        match filters {
            Some(params) => lists().with_params(params),
            None => lists(),
        }
    }

    /// A single data source
    #[must_use]
    pub fn detail(id: DataSourceId) -> QueryKey {
        all().push("detail").push(id.to_string())
    }
}

/// Auth keys
pub mod auth {
    use super::QueryKey;

    /// Root of the domain
    #[must_use]
    pub fn all() -> QueryKey {
        QueryKey::root("auth")
    }

    /// The current session principal
    #[must_use]
    pub fn session() -> QueryKey {
        all().push("session")
    }
}

/// Analytics result-set keys
pub mod analytics {
    use super::{CanonicalParams, QueryKey};
    use vantage_model::DataSourceId;

    /// Root of the domain
    #[must_use]
    pub fn all() -> QueryKey {
        QueryKey::root("analytics")
    }

    /// A query result against one data source
    #[must_use]
    pub fn query(source: DataSourceId, params: CanonicalParams) -> QueryKey {
        all().push("query").push(source.to_string()).with_params(params)
    }
}

/// Organization keys
pub mod organizations {
    use super::{CanonicalParams, QueryKey};
    use vantage_model::OrganizationId;

    /// Root of the domain
    #[must_use]
    pub fn all() -> QueryKey {
        QueryKey::root("organizations")
    }

    /// Prefix covering every list variant
    #[must_use]
    pub fn lists() -> QueryKey {
        all().push("list")
    }

    /// A filtered list; `None` is the unfiltered list
    #[must_use]
    pub fn list(filters: Option<CanonicalParams>) -> QueryKey {
        match filters {
            Some(params) => lists().with_params(params),
            None => lists(),
        }
    }

    /// A single organization
    #[must_use]
    pub fn detail(id: OrganizationId) -> QueryKey {
        all().push("detail").push(id.to_string())
    }
}

/// Workspace keys
pub mod workspaces {
    use super::{CanonicalParams, QueryKey};
    use vantage_model::WorkspaceId;

    /// Root of the domain
    #[must_use]
    pub fn all() -> QueryKey {
        QueryKey::root("workspaces")
    }

    /// Prefix covering every list variant
    #[must_use]
    pub fn lists() -> QueryKey {
        all().push("list")
    }

    /// A filtered list; `None` is the unfiltered list
    #[must_use]
    pub fn list(filters: Option<CanonicalParams>) -> QueryKey {
        match filters {
            Some(params) => lists().with_params(params),
            None => lists(),
        }
    }

    /// A single workspace
    #[must_use]
    pub fn detail(id: WorkspaceId) -> QueryKey {
        all().push("detail").push(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vantage_model::DashboardId;

    #[test]
    fn keys_nest_under_their_domain_root() {
        let id = DashboardId::new();
        assert!(dashboards::detail(id).starts_with(&dashboards::all()));
        assert!(dashboards::widgets(id).starts_with(&dashboards::detail(id)));
        assert!(dashboards::list(Some(json!({"search": "x"}).into()))
            .starts_with(&dashboards::lists()));
    }

    #[test]
    fn domains_do_not_collide() {
        assert!(!data_sources::all().starts_with(&dashboards::all()));
        assert!(!dashboards::all().starts_with(&data_sources::all()));
    }

    #[test]
    fn unfiltered_list_is_the_lists_prefix() {
        assert_eq!(dashboards::list(None), dashboards::lists());
    }
}
