//! In-memory transport
//!
//! A process-local fake of the remote API, route-compatible with
//! [`crate::HttpTransport`]'s surface: same envelope, same error codes,
//! same path shapes. Backs tests and offline development. Supports failure
//! injection and counts requests so coalescing behavior is observable.

use crate::envelope::{Envelope, CODE_NOT_FOUND};
use crate::error::ClientError;
use crate::transport::{ApiRequest, Method, Transport};
use crate::types::{
    DashboardDraft, DashboardFilters, DashboardPatch, DataSourceDraft, DataSourceFilters,
    DataSourcePatch, Page,
};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tracing::debug;
use vantage_model::{
    sanitize, Dashboard, DashboardId, DataSource, DataSourceId, ValidationError, WidgetId,
    Workspace, WorkspaceId,
};

/// In-memory fake of the dashboard API server
#[derive(Default)]
pub struct InMemoryTransport {
    dashboards: DashMap<DashboardId, Dashboard>,
    data_sources: DashMap<DataSourceId, DataSource>,
    workspaces: DashMap<WorkspaceId, Workspace>,
    requests: AtomicU64,
    fail_remaining: AtomicUsize,
    fail_status: parking_lot::Mutex<Option<u16>>,
}

impl InMemoryTransport {
    /// Empty server
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a dashboard
    pub fn insert_dashboard(&self, dashboard: Dashboard) {
        self.dashboards.insert(dashboard.id, dashboard);
    }

    /// Seed a data source
    pub fn insert_data_source(&self, source: DataSource) {
        self.data_sources.insert(source.id, source);
    }

    /// Seed a workspace
    pub fn insert_workspace(&self, workspace: Workspace) {
        self.workspaces.insert(workspace.id, workspace);
    }

    /// Total requests executed (failure-injected ones included)
    #[must_use]
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }

    /// Fail the next `count` requests with a transport error
    ///
    /// `status: None` simulates a connection-level failure (transient);
    /// `Some(code)` simulates a non-2xx without an envelope.
    pub fn fail_next(&self, count: usize, status: Option<u16>) {
        *self.fail_status.lock() = status;
        self.fail_remaining.store(count, Ordering::SeqCst);
    }

    fn dispatch(&self, request: &ApiRequest) -> Result<JsonValue, ClientError> {
        let path = request.path.trim_matches('/').to_string();
        let segments: Vec<&str> = path.split('/').collect();

        match (request.method, segments.as_slice()) {
            (Method::Get, ["dashboards"]) => self.list_dashboards(request.query.as_ref()),
            (Method::Post, ["dashboards"]) => self.create_dashboard(request.body.as_ref()),
            (Method::Get, ["dashboards", id]) => self.get_dashboard(id),
            (Method::Put, ["dashboards", id]) => self.update_dashboard(id, request.body.as_ref()),
            (Method::Delete, ["dashboards", id]) => self.delete_dashboard(id),
            (Method::Post, ["dashboards", id, "duplicate"]) => {
                self.duplicate_dashboard(id, request.body.as_ref())
            }
            (Method::Get, ["dashboards", id, "widgets"]) => self.dashboard_widgets(id),
            (Method::Get, ["data-sources"]) => self.list_data_sources(request.query.as_ref()),
            (Method::Post, ["data-sources"]) => self.create_data_source(request.body.as_ref()),
            (Method::Get, ["data-sources", id]) => self.get_data_source(id),
            (Method::Put, ["data-sources", id]) => {
                self.update_data_source(id, request.body.as_ref())
            }
            (Method::Delete, ["data-sources", id]) => self.delete_data_source(id),
            (Method::Post, ["data-sources", id, "duplicate"]) => {
                self.duplicate_data_source(id, request.body.as_ref())
            }
            (Method::Get, ["workspaces"]) => {
                let mut items: Vec<_> =
                    self.workspaces.iter().map(|e| e.value().clone()).collect();
                items.sort_by_key(|w| w.id);
                ok(Page::complete(items))
            }
            (Method::Get, ["workspaces", id]) => match WorkspaceId::from_str(id)
                .ok()
                .and_then(|id| self.workspaces.get(&id).map(|e| e.value().clone()))
            {
                Some(ws) => ok(ws),
                None => not_found(),
            },
            _ => Err(ClientError::transport(
                Some(404),
                format!("no route for {} /{path}", request.method.as_str()),
            )),
        }
    }

    fn list_dashboards(&self, query: Option<&JsonValue>) -> Result<JsonValue, ClientError> {
        let filters: DashboardFilters = decode_or_default(query)?;
        let mut items: Vec<Dashboard> = self
            .dashboards
            .iter()
            .map(|e| e.value().clone())
            .filter(|d| {
                filters.workspace.map_or(true, |ws| d.owner.workspace == ws)
                    && filters.visibility.map_or(true, |v| d.visibility == v)
                    && filters.search.as_deref().map_or(true, |needle| {
                        let needle = needle.to_lowercase();
                        d.name.to_lowercase().contains(&needle)
                            || d.description.to_lowercase().contains(&needle)
                    })
            })
            .collect();
        items.sort_by_key(|d| d.id);
        ok(Page::complete(items))
    }

    fn get_dashboard(&self, id: &str) -> Result<JsonValue, ClientError> {
        match self.find_dashboard(id) {
            Some(dashboard) => ok(dashboard),
            None => not_found(),
        }
    }

    fn dashboard_widgets(&self, id: &str) -> Result<JsonValue, ClientError> {
        match self.find_dashboard(id) {
            Some(dashboard) => ok(dashboard.widgets),
            None => not_found(),
        }
    }

    fn create_dashboard(&self, body: Option<&JsonValue>) -> Result<JsonValue, ClientError> {
        let draft: DashboardDraft = match decode(body) {
            Ok(draft) => draft,
            Err(err) => return validation_failed(&err),
        };
        let now = Utc::now();
        let dashboard = Dashboard {
            id: DashboardId::new(),
            name: draft.name,
            description: draft.description,
            visibility: draft.visibility,
            owner: draft.owner,
            created_at: now,
            updated_at: now,
            widgets: draft.widgets,
            settings: draft.settings,
        };
        if let Err(err) = dashboard.validate() {
            return validation_failed(&err);
        }
        let response = ok(&dashboard);
        self.dashboards.insert(dashboard.id, dashboard);
        response
    }

    fn update_dashboard(
        &self,
        id: &str,
        body: Option<&JsonValue>,
    ) -> Result<JsonValue, ClientError> {
        let patch: DashboardPatch = match decode(body) {
            Ok(patch) => patch,
            Err(err) => return validation_failed(&err),
        };
        let Some(parsed) = DashboardId::from_str(id).ok() else {
            return not_found();
        };
        let Some(mut entry) = self.dashboards.get_mut(&parsed) else {
            return not_found();
        };

        let mut updated = entry.value().clone();
        if let Some(name) = patch.name {
            updated.name = name;
        }
        if let Some(description) = patch.description {
            updated.description = description;
        }
        if let Some(visibility) = patch.visibility {
            updated.visibility = visibility;
        }
        if let Some(widgets) = patch.widgets {
            updated.widgets = widgets;
        }
        if let Some(settings) = patch.settings {
            updated.settings = settings;
        }
        if let Err(err) = updated.validate() {
            return validation_failed(&err);
        }
        updated.updated_at = Utc::now();
        *entry.value_mut() = updated.clone();
        ok(updated)
    }

    fn delete_dashboard(&self, id: &str) -> Result<JsonValue, ClientError> {
        // widgets are owned by the dashboard row; removing it removes them
        match DashboardId::from_str(id).ok().and_then(|id| self.dashboards.remove(&id)) {
            Some(_) => empty_ok(),
            None => not_found(),
        }
    }

    fn duplicate_dashboard(
        &self,
        id: &str,
        body: Option<&JsonValue>,
    ) -> Result<JsonValue, ClientError> {
        let overrides: DashboardPatch = match decode_or_default(body) {
            Ok(patch) => patch,
            Err(_) => DashboardPatch::default(),
        };
        let Some(original) = self.find_dashboard(id) else {
            return not_found();
        };

        let now = Utc::now();
        let mut copy = original;
        copy.id = DashboardId::new();
        copy.name = overrides.name.unwrap_or_else(|| format!("{} (copy)", copy.name));
        if let Some(description) = overrides.description {
            copy.description = description;
        }
        if let Some(visibility) = overrides.visibility {
            copy.visibility = visibility;
        }
        copy.created_at = now;
        copy.updated_at = now;
        for widget in &mut copy.widgets {
            widget.id = WidgetId::new();
        }
        if let Err(err) = copy.validate() {
            return validation_failed(&err);
        }
        let response = ok(&copy);
        self.dashboards.insert(copy.id, copy);
        response
    }

    fn list_data_sources(&self, query: Option<&JsonValue>) -> Result<JsonValue, ClientError> {
        let filters: DataSourceFilters = decode_or_default(query)?;
        let mut items: Vec<DataSource> = self
            .data_sources
            .iter()
            .map(|e| e.value().clone())
            .filter(|s| {
                filters.workspace.map_or(true, |ws| s.workspace == ws)
                    && filters.kind.map_or(true, |k| s.kind == k)
            })
            .collect();
        items.sort_by_key(|s| s.id);
        ok(Page::complete(items))
    }

    fn get_data_source(&self, id: &str) -> Result<JsonValue, ClientError> {
        match DataSourceId::from_str(id)
            .ok()
            .and_then(|id| self.data_sources.get(&id).map(|e| e.value().clone()))
        {
            Some(source) => ok(source),
            None => not_found(),
        }
    }

    fn create_data_source(&self, body: Option<&JsonValue>) -> Result<JsonValue, ClientError> {
        let draft: DataSourceDraft = match decode(body) {
            Ok(draft) => draft,
            Err(err) => return validation_failed(&err),
        };
        if let Err(err) = sanitize::sanitize_name_default(&draft.name) {
            return validation_failed(&err);
        }
        let now = Utc::now();
        let source = DataSource {
            id: DataSourceId::new(),
            name: draft.name,
            kind: draft.kind,
            connection_url: draft.connection_url,
            workspace: draft.workspace,
            created_at: now,
            updated_at: now,
        };
        let response = ok(&source);
        self.data_sources.insert(source.id, source);
        response
    }

    fn update_data_source(
        &self,
        id: &str,
        body: Option<&JsonValue>,
    ) -> Result<JsonValue, ClientError> {
        let patch: DataSourcePatch = match decode(body) {
            Ok(patch) => patch,
            Err(err) => return validation_failed(&err),
        };
        let Some(parsed) = DataSourceId::from_str(id).ok() else {
            return not_found();
        };
        let Some(mut entry) = self.data_sources.get_mut(&parsed) else {
            return not_found();
        };
        if let Some(name) = patch.name {
            if let Err(err) = sanitize::sanitize_name_default(&name) {
                return validation_failed(&err);
            }
            entry.value_mut().name = name;
        }
        if let Some(url) = patch.connection_url {
            entry.value_mut().connection_url = url;
        }
        entry.value_mut().updated_at = Utc::now();
        ok(entry.value().clone())
    }

    fn delete_data_source(&self, id: &str) -> Result<JsonValue, ClientError> {
        match DataSourceId::from_str(id).ok().and_then(|id| self.data_sources.remove(&id)) {
            Some(_) => empty_ok(),
            None => not_found(),
        }
    }

    fn duplicate_data_source(
        &self,
        id: &str,
        body: Option<&JsonValue>,
    ) -> Result<JsonValue, ClientError> {
        let overrides: DataSourcePatch = match decode_or_default(body) {
            Ok(patch) => patch,
            Err(_) => DataSourcePatch::default(),
        };
        let Some(original) = DataSourceId::from_str(id)
            .ok()
            .and_then(|id| self.data_sources.get(&id).map(|e| e.value().clone()))
        else {
            return not_found();
        };

        let now = Utc::now();
        let mut copy = original;
        copy.id = DataSourceId::new();
        copy.name = overrides.name.unwrap_or_else(|| format!("{} (copy)", copy.name));
        if let Some(url) = overrides.connection_url {
            copy.connection_url = url;
        }
        copy.created_at = now;
        copy.updated_at = now;
        let response = ok(&copy);
        self.data_sources.insert(copy.id, copy);
        response
    }

    fn find_dashboard(&self, id: &str) -> Option<Dashboard> {
        DashboardId::from_str(id).ok().and_then(|id| self.dashboards.get(&id).map(|e| e.value().clone()))
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn execute(&self, request: ApiRequest) -> Result<JsonValue, ClientError> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        if self.fail_remaining.load(Ordering::SeqCst) > 0 {
            self.fail_remaining.fetch_sub(1, Ordering::SeqCst);
            let status = *self.fail_status.lock();
            return Err(ClientError::transport(status, "injected failure"));
        }

        debug!(method = request.method.as_str(), path = %request.path, "in-memory request");
        self.dispatch(&request)
    }
}

fn ok<T: Serialize>(data: T) -> Result<JsonValue, ClientError> {
    serde_json::to_value(Envelope::ok(data))
        .map_err(|e| ClientError::Unknown(format!("unserializable response: {e}")))
}

fn empty_ok() -> Result<JsonValue, ClientError> {
    serde_json::to_value(Envelope::<JsonValue> { success: true, data: None, error: None })
        .map_err(|e| ClientError::Unknown(format!("unserializable response: {e}")))
}

fn not_found() -> Result<JsonValue, ClientError> {
    serde_json::to_value(Envelope::<JsonValue>::err(CODE_NOT_FOUND, "no such entity"))
        .map_err(|e| ClientError::Unknown(format!("unserializable response: {e}")))
}

fn validation_failed(err: &ValidationError) -> Result<JsonValue, ClientError> {
    let envelope = Envelope::<JsonValue>::validation(
        err.to_string(),
        err.fields().into_iter().map(str::to_string).collect(),
    );
    serde_json::to_value(envelope)
        .map_err(|e| ClientError::Unknown(format!("unserializable response: {e}")))
}

fn decode<T: DeserializeOwned>(body: Option<&JsonValue>) -> Result<T, ValidationError> {
    let Some(body) = body else {
        return Err(ValidationError::Field {
            field: "request".to_string(),
            reason: "missing body".to_string(),
        });
    };
    serde_json::from_value(body.clone()).map_err(|e| ValidationError::Field {
        field: "request".to_string(),
        reason: e.to_string(),
    })
}

fn decode_or_default<T: DeserializeOwned + Default>(
    value: Option<&JsonValue>,
) -> Result<T, ClientError> {
    match value {
        None => Ok(T::default()),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| ClientError::Unknown(format!("undecodable query: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::DashboardApi;
    use std::sync::Arc;
    use vantage_model::Owner;

    fn owner() -> Owner {
        Owner { user: "user-1".to_string(), workspace: WorkspaceId::new() }
    }

    #[tokio::test]
    async fn create_then_list_finds_exactly_one() {
        let transport = Arc::new(InMemoryTransport::new());
        let api = DashboardApi::new(transport);

        let mut draft = DashboardDraft::new("Test Dashboard", owner());
        draft.description = "demo".to_string();
        let created = api.create(draft).await.unwrap();

        let page = api.list(None).await.unwrap();
        let matching: Vec<_> =
            page.items.iter().filter(|d| d.name == "Test Dashboard").collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].id, created.id);
        assert_eq!(matching[0].description, "demo");
    }

    #[tokio::test]
    async fn delete_removes_from_list_and_detail() {
        let transport = Arc::new(InMemoryTransport::new());
        let api = DashboardApi::new(transport);

        let created = api.create(DashboardDraft::new("Doomed", owner())).await.unwrap();
        api.delete(created.id).await.unwrap();

        let page = api.list(None).await.unwrap();
        assert!(!page.items.iter().any(|d| d.id == created.id));
        assert_eq!(
            api.get(created.id).await,
            Err(ClientError::not_found("dashboard", created.id.to_string()))
        );
    }

    #[tokio::test]
    async fn create_rejects_markup_only_names_before_transport() {
        let transport = Arc::new(InMemoryTransport::new());
        let requests_before = transport.requests();
        let api = DashboardApi::new(transport.clone());

        let result = api.create(DashboardDraft::new("<script></script>", owner())).await;
        assert_eq!(
            result,
            Err(ClientError::Validation(ValidationError::EmptyName))
        );
        assert_eq!(transport.requests(), requests_before, "validation must not cost a round trip");
    }

    #[tokio::test]
    async fn duplicate_mints_fresh_ids() {
        let transport = Arc::new(InMemoryTransport::new());
        let api = DashboardApi::new(transport);

        let mut draft = DashboardDraft::new("Original", owner());
        draft.widgets = vec![vantage_model::Widget::new(
            "Note",
            vantage_model::WidgetConfig::Text(vantage_model::TextConfig::new("hi")),
            vantage_model::GridRect::new(0, 0, 2, 1),
        )];
        let original = api.create(draft).await.unwrap();

        let copy = api.duplicate(original.id, None).await.unwrap();
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.name, "Original (copy)");
        assert_eq!(copy.widgets.len(), 1);
        assert_ne!(copy.widgets[0].id, original.widgets[0].id);
    }

    #[tokio::test]
    async fn search_filter_matches_name_and_description() {
        let transport = Arc::new(InMemoryTransport::new());
        let api = DashboardApi::new(transport);

        api.create(DashboardDraft::new("Revenue 2024", owner())).await.unwrap();
        let mut other = DashboardDraft::new("Ops", owner());
        other.description = "revenue adjacent".to_string();
        api.create(other).await.unwrap();
        api.create(DashboardDraft::new("Churn", owner())).await.unwrap();

        let filters = DashboardFilters { search: Some("revenue".to_string()), ..Default::default() };
        let page = api.list(Some(&filters)).await.unwrap();
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn injected_failures_surface_as_transport_errors() {
        let transport = Arc::new(InMemoryTransport::new());
        transport.fail_next(1, None);
        let api = DashboardApi::new(transport);

        let err = api.list(None).await.unwrap_err();
        assert!(err.is_transient());

        // next request goes through again
        assert!(api.list(None).await.is_ok());
    }
}
