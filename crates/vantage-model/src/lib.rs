//! Vantage data model
//!
//! Defines the entities the rest of the workspace moves around:
//! - Dashboards and their settings
//! - Widgets with per-kind typed configuration
//! - Grid layout geometry
//! - Sanitization for user-entered text
//! - [`ValidationError`], the shared input-rejection error

pub mod dashboard;
pub mod data_source;
pub mod error;
pub mod id;
pub mod layout;
pub mod sanitize;
pub mod widget;
pub mod workspace;

pub use dashboard::{AutoRefresh, Background, Dashboard, DashboardSettings, Owner, Visibility};
pub use data_source::{DataSource, DataSourceKind};
pub use error::ValidationError;
pub use id::{DashboardId, DataSourceId, OrganizationId, WidgetId, WorkspaceId};
pub use layout::{GridRect, Layout};
pub use widget::{
    validate_widgets, AxisBounds, ChartConfig, KpiConfig, PieConfig, SeriesSpec, TextConfig,
    Widget, WidgetConfig, WidgetKind,
};
pub use workspace::{Organization, Workspace};

/// Maximum accepted length for entity display names, after sanitization.
pub const MAX_NAME_LEN: usize = 100;
