//! Vantage data-access layer
//!
//! Everything between the entity model and the wire:
//! - [`ClientError`], the error taxonomy every operation speaks
//! - the `{success, data, error}` response envelope
//! - the [`Transport`] seam with HTTP and in-memory implementations
//! - per-entity APIs (dashboards, data sources, workspaces)
//!
//! This layer never retries and never swallows errors; retry policy belongs
//! to the synchronization layer above it.

mod call;
pub mod dashboards;
pub mod data_sources;
pub mod envelope;
pub mod error;
pub mod memory;
pub mod transport;
pub mod types;
pub mod workspaces;

pub use dashboards::DashboardApi;
pub use data_sources::DataSourceApi;
pub use envelope::{Envelope, ErrorBody};
pub use error::ClientError;
pub use memory::InMemoryTransport;
pub use transport::{ApiRequest, AuthTokens, HttpTransport, Method, TokenProvider, Transport};
pub use types::{
    DashboardDraft, DashboardFilters, DashboardPatch, DataSourceDraft, DataSourceFilters,
    DataSourcePatch, Page,
};
pub use workspaces::WorkspaceApi;
