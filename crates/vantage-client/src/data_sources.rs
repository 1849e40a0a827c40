//! Data-source operations

use crate::call;
use crate::error::ClientError;
use crate::transport::{ApiRequest, Transport};
use crate::types::{DataSourceDraft, DataSourceFilters, DataSourcePatch, Page};
use std::sync::Arc;
use tracing::instrument;
use vantage_model::{sanitize, DataSource, DataSourceId};

const RESOURCE: &str = "data source";

/// Data-source data access
#[derive(Clone)]
pub struct DataSourceApi {
    transport: Arc<dyn Transport>,
}

impl DataSourceApi {
    /// Create over a transport
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// List data sources matching `filters`
    ///
    /// # Errors
    /// Propagates transport and envelope failures.
    pub async fn list(
        &self,
        filters: Option<&DataSourceFilters>,
    ) -> Result<Page<DataSource>, ClientError> {
        let mut request = ApiRequest::get("data-sources");
        if let Some(filters) = filters {
            request = request.with_query(call::to_body(filters)?);
        }
        call::typed(&self.transport, request, RESOURCE, "list").await
    }

    /// Fetch one data source
    ///
    /// # Errors
    /// [`ClientError::NotFound`] when `id` matches nothing.
    pub async fn get(&self, id: DataSourceId) -> Result<DataSource, ClientError> {
        let request = ApiRequest::get(format!("data-sources/{id}"));
        call::typed(&self.transport, request, RESOURCE, &id.to_string()).await
    }

    /// Create a data source
    ///
    /// # Errors
    /// [`ClientError::Validation`] for a bad name, before transport.
    #[instrument(skip_all, fields(name = %draft.name))]
    pub async fn create(&self, mut draft: DataSourceDraft) -> Result<DataSource, ClientError> {
        draft.name = sanitize::sanitize_name_default(&draft.name)?;
        let request = ApiRequest::post("data-sources", call::to_body(&draft)?);
        call::typed(&self.transport, request, RESOURCE, "new").await
    }

    /// Patch a data source
    ///
    /// # Errors
    /// [`ClientError::Validation`] for bad patched fields;
    /// [`ClientError::NotFound`] when `id` matches nothing.
    #[instrument(skip_all, fields(%id))]
    pub async fn update(
        &self,
        id: DataSourceId,
        mut patch: DataSourcePatch,
    ) -> Result<DataSource, ClientError> {
        if let Some(name) = &patch.name {
            patch.name = Some(sanitize::sanitize_name_default(name)?);
        }
        let request = ApiRequest::put(format!("data-sources/{id}"), call::to_body(&patch)?);
        call::typed(&self.transport, request, RESOURCE, &id.to_string()).await
    }

    /// Delete a data source
    ///
    /// # Errors
    /// [`ClientError::NotFound`] when `id` matches nothing.
    #[instrument(skip_all, fields(%id))]
    pub async fn delete(&self, id: DataSourceId) -> Result<(), ClientError> {
        let request = ApiRequest::delete(format!("data-sources/{id}"));
        call::empty(&self.transport, request, RESOURCE, &id.to_string()).await
    }

    /// Copy a data source, optionally overriding fields on the copy
    ///
    /// # Errors
    /// [`ClientError::NotFound`] when `id` matches nothing;
    /// [`ClientError::Validation`] for bad override fields.
    #[instrument(skip_all, fields(%id))]
    pub async fn duplicate(
        &self,
        id: DataSourceId,
        overrides: Option<DataSourcePatch>,
    ) -> Result<DataSource, ClientError> {
        let mut overrides = overrides.unwrap_or_default();
        if let Some(name) = &overrides.name {
            overrides.name = Some(sanitize::sanitize_name_default(name)?);
        }
        let request =
            ApiRequest::post(format!("data-sources/{id}/duplicate"), call::to_body(&overrides)?);
        call::typed(&self.transport, request, RESOURCE, &id.to_string()).await
    }
}
