//! Testing utilities for the Vantage workspace
//!
//! Shared fixtures: sample entities, a seeded in-memory transport, and a
//! cache configuration with thresholds small enough for paused-clock tests.

#![allow(missing_docs)]

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use vantage_client::InMemoryTransport;
use vantage_model::{
    AxisBounds, ChartConfig, Dashboard, DataSource, DataSourceId, DataSourceKind, GridRect,
    KpiConfig, Owner, SeriesSpec, TextConfig, Widget, WidgetConfig, Workspace, WorkspaceId,
};
use vantage_sync::{CacheConfig, RetryPolicy};

pub fn sample_workspace_id() -> WorkspaceId {
    WorkspaceId::new()
}

pub fn sample_owner(workspace: WorkspaceId) -> Owner {
    Owner { user: "analyst@example.com".to_string(), workspace }
}

pub fn sample_workspace(id: WorkspaceId) -> Workspace {
    Workspace {
        id,
        name: "Acme Analytics".to_string(),
        organization: vantage_model::OrganizationId::new(),
        created_at: Utc::now(),
    }
}

pub fn kpi_widget(title: &str, source: DataSourceId) -> Widget {
    Widget::new(
        title,
        WidgetConfig::Kpi(KpiConfig {
            data_source: source,
            query: "select count(*) from orders".to_string(),
            unit: "orders".to_string(),
            precision: 0,
            trend: true,
        }),
        GridRect::new(0, 0, 2, 2),
    )
}

pub fn line_chart_widget(title: &str, source: DataSourceId) -> Widget {
    Widget::new(
        title,
        WidgetConfig::LineChart(ChartConfig {
            data_source: source,
            query: "select day, total from revenue_daily".to_string(),
            series: vec![SeriesSpec {
                field: "total".to_string(),
                label: "Revenue".to_string(),
                color: Some("#4e79a7".to_string()),
            }],
            y_axis: AxisBounds::default(),
            legend: true,
        }),
        GridRect::new(2, 0, 6, 4),
    )
}

pub fn text_widget(title: &str, body: &str) -> Widget {
    Widget::new(title, WidgetConfig::Text(TextConfig::new(body)), GridRect::new(0, 2, 2, 1))
}

pub fn sample_dashboard(name: &str, workspace: WorkspaceId) -> Dashboard {
    let source = DataSourceId::new();
    let mut board = Dashboard::new(name, sample_owner(workspace));
    board.description = "fixture dashboard".to_string();
    board.widgets =
        vec![kpi_widget("Orders", source), line_chart_widget("Revenue", source)];
    board
}

pub fn sample_data_source(name: &str, workspace: WorkspaceId) -> DataSource {
    let now = Utc::now();
    DataSource {
        id: DataSourceId::new(),
        name: name.to_string(),
        kind: DataSourceKind::Postgres,
        connection_url: "postgres://warehouse.internal/analytics".to_string(),
        workspace,
        created_at: now,
        updated_at: now,
    }
}

/// In-memory transport pre-loaded with the given dashboards
pub fn seeded_transport(dashboards: Vec<Dashboard>) -> Arc<InMemoryTransport> {
    let transport = Arc::new(InMemoryTransport::new());
    for dashboard in dashboards {
        transport.insert_dashboard(dashboard);
    }
    transport
}

/// Cache thresholds small enough for paused-clock tests
pub fn fast_cache_config() -> CacheConfig {
    CacheConfig::new()
        .with_stale_after(Duration::from_millis(50))
        .with_gc_after(Duration::from_millis(200))
        .with_retry(RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(40),
        })
}
