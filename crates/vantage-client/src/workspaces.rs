//! Workspace operations (read-only from this client)

use crate::call;
use crate::error::ClientError;
use crate::transport::{ApiRequest, Transport};
use crate::types::Page;
use std::sync::Arc;
use vantage_model::{Workspace, WorkspaceId};

const RESOURCE: &str = "workspace";

/// Workspace data access
#[derive(Clone)]
pub struct WorkspaceApi {
    transport: Arc<dyn Transport>,
}

impl WorkspaceApi {
    /// Create over a transport
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// List workspaces visible to the caller
    ///
    /// # Errors
    /// Propagates transport and envelope failures.
    pub async fn list(&self) -> Result<Page<Workspace>, ClientError> {
        call::typed(&self.transport, ApiRequest::get("workspaces"), RESOURCE, "list").await
    }

    /// Fetch one workspace
    ///
    /// # Errors
    /// [`ClientError::NotFound`] when `id` matches nothing.
    pub async fn get(&self, id: WorkspaceId) -> Result<Workspace, ClientError> {
        let request = ApiRequest::get(format!("workspaces/{id}"));
        call::typed(&self.transport, request, RESOURCE, &id.to_string()).await
    }
}
