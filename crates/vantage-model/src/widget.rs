//! Widgets and their per-kind configuration
//!
//! Widget configuration is a tagged union keyed by widget kind: each kind
//! carries its own strongly-typed shape instead of a free-form key-value
//! map. The kind is fixed at creation; [`Widget::replace_config`] enforces
//! that.

use crate::error::ValidationError;
use crate::id::{DataSourceId, WidgetId};
use crate::layout::GridRect;
use crate::sanitize;
use serde::{Deserialize, Serialize};

/// Closed enumeration of widget kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetKind {
    /// Time-series line chart
    LineChart,
    /// Categorical bar chart
    BarChart,
    /// Pie / donut chart
    PieChart,
    /// Single-number KPI tile
    Kpi,
    /// Free-form formatted text block
    Text,
}

impl std::fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Self::LineChart => "line-chart",
            Self::BarChart => "bar-chart",
            Self::PieChart => "pie-chart",
            Self::Kpi => "kpi",
            Self::Text => "text",
        };
        f.write_str(tag)
    }
}

/// One plotted series of a chart widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSpec {
    /// Field or measure to plot
    pub field: String,
    /// Legend label
    pub label: String,
    /// Optional fixed series color (hex)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Y-axis bounds; `None` means auto-scale
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisBounds {
    /// Lower bound
    pub min: Option<f64>,
    /// Upper bound
    pub max: Option<f64>,
}

/// Configuration for line and bar charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    /// Data source the query runs against
    pub data_source: DataSourceId,
    /// Source-native query text
    pub query: String,
    /// Series to plot
    pub series: Vec<SeriesSpec>,
    /// Y-axis bounds
    #[serde(default)]
    pub y_axis: AxisBounds,
    /// Whether the legend is shown
    #[serde(default)]
    pub legend: bool,
}

/// Configuration for pie charts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieConfig {
    /// Data source the query runs against
    pub data_source: DataSourceId,
    /// Source-native query text
    pub query: String,
    /// Field providing slice labels
    pub label_field: String,
    /// Field providing slice values
    pub value_field: String,
    /// Render with a hollow center
    #[serde(default)]
    pub donut: bool,
}

/// Configuration for KPI tiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiConfig {
    /// Data source the query runs against
    pub data_source: DataSourceId,
    /// Source-native query text (single value)
    pub query: String,
    /// Display unit suffix
    #[serde(default)]
    pub unit: String,
    /// Fraction digits shown
    #[serde(default)]
    pub precision: u8,
    /// Show the trend indicator against the previous period
    #[serde(default)]
    pub trend: bool,
}

/// Configuration for text blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextConfig {
    /// Formatted body; sanitized on construction
    pub body: String,
}

impl TextConfig {
    /// Create a text config, sanitizing the body down to allowed inline markup
    #[must_use]
    pub fn new(body: &str) -> Self {
        Self { body: sanitize::sanitize_formatted_text(body) }
    }
}

/// Widget configuration, tagged by kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum WidgetConfig {
    /// Time-series line chart
    LineChart(ChartConfig),
    /// Categorical bar chart
    BarChart(ChartConfig),
    /// Pie / donut chart
    PieChart(PieConfig),
    /// Single-number KPI tile
    Kpi(KpiConfig),
    /// Free-form formatted text block
    Text(TextConfig),
}

impl WidgetConfig {
    /// The kind this configuration belongs to
    #[must_use]
    pub fn kind(&self) -> WidgetKind {
        match self {
            Self::LineChart(_) => WidgetKind::LineChart,
            Self::BarChart(_) => WidgetKind::BarChart,
            Self::PieChart(_) => WidgetKind::PieChart,
            Self::Kpi(_) => WidgetKind::Kpi,
            Self::Text(_) => WidgetKind::Text,
        }
    }
}

/// A positioned chart/KPI/text element on a dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    /// Widget id, unique within its dashboard
    pub id: WidgetId,
    /// Display title
    pub title: String,
    #[serde(flatten)]
    config: WidgetConfig,
    /// Position and size on the grid
    pub frame: GridRect,
}

impl Widget {
    /// Create a widget with a fresh id
    #[must_use]
    pub fn new(title: impl Into<String>, config: WidgetConfig, frame: GridRect) -> Self {
        Self { id: WidgetId::new(), title: title.into(), config, frame }
    }

    /// The widget's kind (fixed at creation)
    #[inline]
    #[must_use]
    pub fn kind(&self) -> WidgetKind {
        self.config.kind()
    }

    /// The widget's configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Replace the configuration with another of the same kind
    ///
    /// # Errors
    /// [`ValidationError::KindMismatch`] when the replacement's kind differs
    /// from the kind the widget was created with.
    pub fn replace_config(&mut self, config: WidgetConfig) -> Result<(), ValidationError> {
        if config.kind() != self.config.kind() {
            return Err(ValidationError::KindMismatch {
                expected: self.config.kind(),
                actual: config.kind(),
            });
        }
        self.config = config;
        Ok(())
    }
}

/// Check a widget collection's shared invariants: unique ids, non-empty frames
///
/// # Errors
/// - [`ValidationError::DuplicateWidgetId`] on an id collision
/// - [`ValidationError::EmptyFrame`] on a zero-area frame
pub fn validate_widgets(widgets: &[Widget]) -> Result<(), ValidationError> {
    let mut seen = std::collections::HashSet::with_capacity(widgets.len());
    for widget in widgets {
        if !seen.insert(widget.id) {
            return Err(ValidationError::DuplicateWidgetId(widget.id));
        }
        if widget.frame.is_empty() {
            return Err(ValidationError::EmptyFrame(widget.id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kpi_config() -> WidgetConfig {
        WidgetConfig::Kpi(KpiConfig {
            data_source: DataSourceId::new(),
            query: "select count(*) from orders".to_string(),
            unit: String::new(),
            precision: 0,
            trend: false,
        })
    }

    #[test]
    fn config_replacement_requires_matching_kind() {
        let mut widget = Widget::new("Orders", kpi_config(), GridRect::new(0, 0, 2, 2));
        let err = widget
            .replace_config(WidgetConfig::Text(TextConfig::new("note")))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::KindMismatch { expected: WidgetKind::Kpi, actual: WidgetKind::Text }
        );

        let replacement = kpi_config();
        widget.replace_config(replacement.clone()).unwrap();
        assert_eq!(widget.config(), &replacement);
    }

    #[test]
    fn widget_serializes_with_flattened_kind_tag() {
        let widget = Widget::new("Orders", kpi_config(), GridRect::new(1, 2, 3, 2));
        let json = serde_json::to_value(&widget).unwrap();
        assert_eq!(json["type"], "kpi");
        assert_eq!(json["frame"]["w"], 3);

        let back: Widget = serde_json::from_value(json).unwrap();
        assert_eq!(back, widget);
    }

    #[test]
    fn text_config_sanitizes_its_body() {
        let cfg = TextConfig::new(r#"<b onclick="x()">note</b><script>bad()</script>"#);
        assert_eq!(cfg.body, "<b>note</b>");
    }
}
