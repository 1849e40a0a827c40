//! The store facade

use std::sync::Arc;
use tracing::{debug, instrument};
use vantage_client::{
    ClientError, DashboardApi, DashboardDraft, DashboardFilters, DashboardPatch, DataSourceApi,
    DataSourceDraft, DataSourceFilters, DataSourcePatch, Page, Transport, WorkspaceApi,
};
use vantage_key::{dashboards, data_sources, related_keys, workspaces, CanonicalParams, EntityRef};
use vantage_model::{
    Dashboard, DashboardId, DataSource, DataSourceId, Widget, Workspace, WorkspaceId,
};
use vantage_session::EditSession;
use vantage_sync::{CacheConfig, MutationOptions, QueryCache, ReadResult, Subscription};

use crate::error::StoreError;

/// Everything a dashboard page needs, wired together
///
/// Construct one per process (or per test) and share it by `Arc`. The
/// cache inside is exclusively owned here; views read through the store
/// and mutate through it, never around it.
pub struct DashboardStore {
    cache: Arc<QueryCache>,
    dashboards: DashboardApi,
    data_sources: DataSourceApi,
    workspaces: WorkspaceApi,
}

impl DashboardStore {
    /// Build a store over a transport
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, config: CacheConfig) -> Self {
        Self {
            cache: Arc::new(QueryCache::new(config)),
            dashboards: DashboardApi::new(Arc::clone(&transport)),
            data_sources: DataSourceApi::new(Arc::clone(&transport)),
            workspaces: WorkspaceApi::new(transport),
        }
    }

    /// The underlying cache (GC driving, diagnostics)
    #[must_use]
    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    // ---- reads -----------------------------------------------------------

    /// One dashboard, read through the cache
    pub async fn dashboard(&self, id: DashboardId) -> ReadResult<Dashboard> {
        let key = dashboards::detail(id);
        let api = self.dashboards.clone();
        self.cache
            .read(&key, move || {
                let api = api.clone();
                async move { api.get(id).await }
            })
            .await
    }

    /// A filtered dashboard list, read through the cache
    pub async fn dashboards(
        &self,
        filters: Option<DashboardFilters>,
    ) -> ReadResult<Page<Dashboard>> {
        let params = filters.as_ref().filter(|f| !f.is_empty()).map(filter_params);
        let key = dashboards::list(params);
        let api = self.dashboards.clone();
        self.cache
            .read(&key, move || {
                let api = api.clone();
                let filters = filters.clone();
                async move { api.list(filters.as_ref()).await }
            })
            .await
    }

    /// A dashboard's widgets, read through the cache
    pub async fn dashboard_widgets(&self, id: DashboardId) -> ReadResult<Vec<Widget>> {
        let key = dashboards::widgets(id);
        let api = self.dashboards.clone();
        self.cache
            .read(&key, move || {
                let api = api.clone();
                async move { api.widgets(id).await }
            })
            .await
    }

    /// One data source, read through the cache
    pub async fn data_source(&self, id: DataSourceId) -> ReadResult<DataSource> {
        let key = data_sources::detail(id);
        let api = self.data_sources.clone();
        self.cache
            .read(&key, move || {
                let api = api.clone();
                async move { api.get(id).await }
            })
            .await
    }

    /// A filtered data-source list, read through the cache
    pub async fn data_sources(
        &self,
        filters: Option<DataSourceFilters>,
    ) -> ReadResult<Page<DataSource>> {
        let params = filters.as_ref().map(filter_params);
        let key = data_sources::list(params);
        let api = self.data_sources.clone();
        self.cache
            .read(&key, move || {
                let api = api.clone();
                let filters = filters.clone();
                async move { api.list(filters.as_ref()).await }
            })
            .await
    }

    /// All visible workspaces, read through the cache
    pub async fn workspaces(&self) -> ReadResult<Page<Workspace>> {
        let key = workspaces::list(None);
        let api = self.workspaces.clone();
        self.cache
            .read(&key, move || {
                let api = api.clone();
                async move { api.list().await }
            })
            .await
    }

    /// One workspace, read through the cache
    pub async fn workspace(&self, id: WorkspaceId) -> ReadResult<Workspace> {
        let key = workspaces::detail(id);
        let api = self.workspaces.clone();
        self.cache
            .read(&key, move || {
                let api = api.clone();
                async move { api.get(id).await }
            })
            .await
    }

    // ---- subscriptions ---------------------------------------------------

    /// Keep a dashboard's entry live and refetched on invalidation
    #[must_use]
    pub fn subscribe_dashboard(&self, id: DashboardId) -> Subscription {
        self.cache.subscribe(&dashboards::detail(id))
    }

    /// Keep a dashboard list entry live and refetched on invalidation
    #[must_use]
    pub fn subscribe_dashboards(&self, filters: Option<&DashboardFilters>) -> Subscription {
        let params = filters.filter(|f| !f.is_empty()).map(filter_params);
        self.cache.subscribe(&dashboards::list(params))
    }

    /// Keep a dashboard's widgets entry live and refetched on invalidation
    #[must_use]
    pub fn subscribe_dashboard_widgets(&self, id: DashboardId) -> Subscription {
        self.cache.subscribe(&dashboards::widgets(id))
    }

    // ---- mutations -------------------------------------------------------

    /// Create a dashboard and invalidate every list it can appear in
    ///
    /// # Errors
    /// Propagates validation and transport failures; cache untouched then.
    pub async fn create_dashboard(&self, draft: DashboardDraft) -> Result<Dashboard, ClientError> {
        let api = self.dashboards.clone();
        // the new id doesn't exist in any cached detail entry yet; the
        // affected keys are the list prefixes
        let options = MutationOptions::invalidating(vec![
            dashboards::lists(),
            dashboards::by_workspace_all(),
        ]);
        self.cache.mutate(async move { api.create(draft).await }, options).await
    }

    /// Patch a dashboard and invalidate its related keys
    ///
    /// # Errors
    /// Propagates validation, not-found, and transport failures.
    pub async fn update_dashboard(
        &self,
        id: DashboardId,
        patch: DashboardPatch,
    ) -> Result<Dashboard, ClientError> {
        let api = self.dashboards.clone();
        let options = MutationOptions::invalidating(related_keys(EntityRef::Dashboard(id)));
        self.cache.mutate(async move { api.update(id, patch).await }, options).await
    }

    /// Delete a dashboard; its cache entries are dropped, not staled
    ///
    /// # Errors
    /// Propagates not-found and transport failures.
    pub async fn delete_dashboard(&self, id: DashboardId) -> Result<(), ClientError> {
        let api = self.dashboards.clone();
        let options = MutationOptions::invalidating(vec![
            dashboards::lists(),
            dashboards::by_workspace_all(),
        ]);
        self.cache.mutate(async move { api.delete(id).await }, options).await?;
        // a deleted entity must read as not-found, never as a stale ghost
        self.cache.remove_prefix(&dashboards::detail(id));
        Ok(())
    }

    /// Duplicate a dashboard into the same workspace
    ///
    /// # Errors
    /// Propagates not-found, validation, and transport failures.
    pub async fn duplicate_dashboard(
        &self,
        id: DashboardId,
        overrides: Option<DashboardPatch>,
    ) -> Result<Dashboard, ClientError> {
        let api = self.dashboards.clone();
        let options = MutationOptions::invalidating(vec![
            dashboards::lists(),
            dashboards::by_workspace_all(),
        ]);
        self.cache.mutate(async move { api.duplicate(id, overrides).await }, options).await
    }

    /// Create a data source
    ///
    /// # Errors
    /// Propagates validation and transport failures.
    pub async fn create_data_source(
        &self,
        draft: DataSourceDraft,
    ) -> Result<DataSource, ClientError> {
        let api = self.data_sources.clone();
        let options = MutationOptions::invalidating(vec![data_sources::lists()]);
        self.cache.mutate(async move { api.create(draft).await }, options).await
    }

    /// Patch a data source and invalidate dependent analytics results
    ///
    /// # Errors
    /// Propagates validation, not-found, and transport failures.
    pub async fn update_data_source(
        &self,
        id: DataSourceId,
        patch: DataSourcePatch,
    ) -> Result<DataSource, ClientError> {
        let api = self.data_sources.clone();
        let options = MutationOptions::invalidating(related_keys(EntityRef::DataSource(id)));
        self.cache.mutate(async move { api.update(id, patch).await }, options).await
    }

    /// Duplicate a data source
    ///
    /// # Errors
    /// Propagates not-found, validation, and transport failures.
    pub async fn duplicate_data_source(
        &self,
        id: DataSourceId,
        overrides: Option<DataSourcePatch>,
    ) -> Result<DataSource, ClientError> {
        let api = self.data_sources.clone();
        let options = MutationOptions::invalidating(vec![data_sources::lists()]);
        self.cache.mutate(async move { api.duplicate(id, overrides).await }, options).await
    }

    /// Delete a data source
    ///
    /// # Errors
    /// Propagates not-found and transport failures.
    pub async fn delete_data_source(&self, id: DataSourceId) -> Result<(), ClientError> {
        let api = self.data_sources.clone();
        let options = MutationOptions::invalidating(vec![
            data_sources::lists(),
            vantage_key::analytics::all(),
        ]);
        self.cache.mutate(async move { api.delete(id).await }, options).await?;
        self.cache.remove_prefix(&data_sources::detail(id));
        Ok(())
    }

    // ---- edit workflow ---------------------------------------------------

    /// Enter edit mode for a dashboard
    ///
    /// Reads the dashboard through the cache (a fresh entry is a hit, a
    /// cold one is fetched) and hydrates the session's working copy from
    /// it — the single server→local flow.
    ///
    /// # Errors
    /// - [`StoreError::Client`] when the dashboard cannot be read
    /// - [`StoreError::Session`] when a session is already live
    pub async fn begin_edit(
        &self,
        session: &mut EditSession,
        id: DashboardId,
    ) -> Result<(), StoreError> {
        let result = self.dashboard(id).await;
        let Some(dashboard) = result.data else {
            let err = result
                .error
                .unwrap_or_else(|| ClientError::not_found("dashboard", id.to_string()));
            return Err(err.into());
        };
        session.begin_editing(&dashboard)?;
        Ok(())
    }

    /// Save the session's working copy back to the server
    ///
    /// The widget list and layout merge into one patch sent through
    /// `mutate` with the dashboard's full related-key set. On success the
    /// session resets to viewing. On failure the session — working copy,
    /// dirty flag, undo/redo stacks — is left exactly as it was, so the
    /// user can retry without losing edits.
    ///
    /// # Errors
    /// - [`StoreError::Session`] when no edit session is live
    /// - [`StoreError::Client`] when the update fails
    #[instrument(skip_all, fields(%id))]
    pub async fn save_edits(
        &self,
        session: &mut EditSession,
        id: DashboardId,
    ) -> Result<Dashboard, StoreError> {
        if !session.is_editing() {
            return Err(vantage_session::SessionError::NotEditing.into());
        }

        let mut widgets = session.widgets().to_vec();
        for widget in &mut widgets {
            if let Some(frame) = session.layout().get(&widget.id) {
                widget.frame = *frame;
            }
        }
        let patch = DashboardPatch { widgets: Some(widgets), ..DashboardPatch::default() };

        let api = self.dashboards.clone();
        let options = MutationOptions::invalidating(related_keys(EntityRef::Dashboard(id)));
        let saved =
            self.cache.mutate(async move { api.update(id, patch).await }, options).await?;

        debug!(dashboard = %id, "edit session saved");
        session.complete_save();
        Ok(saved)
    }
}

fn filter_params<T: serde::Serialize>(filters: &T) -> CanonicalParams {
    CanonicalParams::new(serde_json::to_value(filters).unwrap_or_else(|_| serde_json::json!({})))
}
