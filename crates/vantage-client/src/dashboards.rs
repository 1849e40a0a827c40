//! Dashboard operations
//!
//! Create and update run client-side validation (name sanitization, widget
//! invariants) before anything touches the transport, so obviously bad
//! input never costs a round trip.

use crate::call;
use crate::error::ClientError;
use crate::transport::{ApiRequest, Transport};
use crate::types::{DashboardDraft, DashboardFilters, DashboardPatch, Page};
use std::sync::Arc;
use tracing::instrument;
use vantage_model::{sanitize, validate_widgets, Dashboard, DashboardId, Widget};

const RESOURCE: &str = "dashboard";

/// Dashboard data access
#[derive(Clone)]
pub struct DashboardApi {
    transport: Arc<dyn Transport>,
}

impl DashboardApi {
    /// Create over a transport
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// List dashboards matching `filters`
    ///
    /// # Errors
    /// Propagates transport and envelope failures.
    pub async fn list(
        &self,
        filters: Option<&DashboardFilters>,
    ) -> Result<Page<Dashboard>, ClientError> {
        let mut request = ApiRequest::get("dashboards");
        if let Some(filters) = filters.filter(|f| !f.is_empty()) {
            request = request.with_query(call::to_body(filters)?);
        }
        call::typed(&self.transport, request, RESOURCE, "list").await
    }

    /// Fetch one dashboard
    ///
    /// # Errors
    /// [`ClientError::NotFound`] when `id` matches nothing.
    pub async fn get(&self, id: DashboardId) -> Result<Dashboard, ClientError> {
        let request = ApiRequest::get(format!("dashboards/{id}"));
        call::typed(&self.transport, request, RESOURCE, &id.to_string()).await
    }

    /// Fetch a dashboard's widgets
    ///
    /// # Errors
    /// [`ClientError::NotFound`] when `id` matches nothing.
    pub async fn widgets(&self, id: DashboardId) -> Result<Vec<Widget>, ClientError> {
        let request = ApiRequest::get(format!("dashboards/{id}/widgets"));
        call::typed(&self.transport, request, RESOURCE, &id.to_string()).await
    }

    /// Create a dashboard
    ///
    /// # Errors
    /// [`ClientError::Validation`] for a bad name or widget collection,
    /// before transport; server echoes map the same way.
    #[instrument(skip_all, fields(name = %draft.name))]
    pub async fn create(&self, mut draft: DashboardDraft) -> Result<Dashboard, ClientError> {
        draft.name = sanitize::sanitize_name_default(&draft.name)?;
        draft.description = sanitize::sanitize_plain_text(&draft.description);
        validate_widgets(&draft.widgets)?;

        let request = ApiRequest::post("dashboards", call::to_body(&draft)?);
        call::typed(&self.transport, request, RESOURCE, "new").await
    }

    /// Patch a dashboard
    ///
    /// # Errors
    /// [`ClientError::Validation`] for bad patched fields;
    /// [`ClientError::NotFound`] when `id` matches nothing.
    #[instrument(skip_all, fields(%id))]
    pub async fn update(
        &self,
        id: DashboardId,
        mut patch: DashboardPatch,
    ) -> Result<Dashboard, ClientError> {
        if let Some(name) = &patch.name {
            patch.name = Some(sanitize::sanitize_name_default(name)?);
        }
        if let Some(description) = &patch.description {
            patch.description = Some(sanitize::sanitize_plain_text(description));
        }
        if let Some(widgets) = &patch.widgets {
            validate_widgets(widgets)?;
        }

        let request = ApiRequest::put(format!("dashboards/{id}"), call::to_body(&patch)?);
        call::typed(&self.transport, request, RESOURCE, &id.to_string()).await
    }

    /// Delete a dashboard (and, with it, its widgets)
    ///
    /// # Errors
    /// [`ClientError::NotFound`] when `id` matches nothing.
    #[instrument(skip_all, fields(%id))]
    pub async fn delete(&self, id: DashboardId) -> Result<(), ClientError> {
        let request = ApiRequest::delete(format!("dashboards/{id}"));
        call::empty(&self.transport, request, RESOURCE, &id.to_string()).await
    }

    /// Copy a dashboard, optionally overriding fields on the copy
    ///
    /// # Errors
    /// [`ClientError::NotFound`] when `id` matches nothing;
    /// [`ClientError::Validation`] for bad override fields.
    #[instrument(skip_all, fields(%id))]
    pub async fn duplicate(
        &self,
        id: DashboardId,
        overrides: Option<DashboardPatch>,
    ) -> Result<Dashboard, ClientError> {
        let mut overrides = overrides.unwrap_or_default();
        if let Some(name) = &overrides.name {
            overrides.name = Some(sanitize::sanitize_name_default(name)?);
        }
        let request =
            ApiRequest::post(format!("dashboards/{id}/duplicate"), call::to_body(&overrides)?);
        call::typed(&self.transport, request, RESOURCE, &id.to_string()).await
    }
}
