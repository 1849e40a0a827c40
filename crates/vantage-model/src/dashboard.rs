//! Dashboard entity
//!
//! A dashboard owns an ordered collection of widgets plus display settings.
//! Deleting a dashboard removes its widgets with it; that ownership is
//! enforced at the data-access layer.

use crate::error::ValidationError;
use crate::id::{DashboardId, WidgetId, WorkspaceId};
use crate::layout::Layout;
use crate::sanitize;
use crate::widget::Widget;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who can open a dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Visible to anyone in the workspace
    Public,
    /// Visible to the owner only
    #[default]
    Private,
}

/// Owning user and workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    /// Owning user reference (opaque to this crate)
    pub user: String,
    /// Workspace the dashboard lives in
    pub workspace: WorkspaceId,
}

/// Canvas background
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Background {
    /// Theme default
    #[default]
    Default,
    /// Solid color (hex)
    Color(String),
    /// Background image url
    Image(String),
}

/// Automatic refresh of widget data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoRefresh {
    /// Whether widgets refetch on an interval
    pub enabled: bool,
    /// Refresh interval in seconds
    pub interval_secs: u32,
}

impl Default for AutoRefresh {
    fn default() -> Self {
        Self { enabled: false, interval_secs: 300 }
    }
}

/// Per-dashboard display settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSettings {
    /// Canvas background
    #[serde(default)]
    pub background: Background,
    /// Grid cell size in pixels
    pub cell_size: u16,
    /// Automatic data refresh
    #[serde(default)]
    pub auto_refresh: AutoRefresh,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self { background: Background::Default, cell_size: 40, auto_refresh: AutoRefresh::default() }
    }
}

impl DashboardSettings {
    /// With a given cell size
    #[inline]
    #[must_use]
    pub fn with_cell_size(mut self, cell_size: u16) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// With auto-refresh enabled at an interval
    #[inline]
    #[must_use]
    pub fn with_auto_refresh(mut self, interval_secs: u32) -> Self {
        self.auto_refresh = AutoRefresh { enabled: true, interval_secs };
        self
    }
}

/// A dashboard and its widgets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Dashboard id
    pub id: DashboardId,
    /// Display name; non-empty after sanitization, bounded length
    pub name: String,
    /// Sanitized description, possibly empty
    #[serde(default)]
    pub description: String,
    /// Who can open it
    #[serde(default)]
    pub visibility: Visibility,
    /// Owning user and workspace
    pub owner: Owner,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp
    pub updated_at: DateTime<Utc>,
    /// Ordered widget collection
    #[serde(default)]
    pub widgets: Vec<Widget>,
    /// Display settings
    #[serde(default)]
    pub settings: DashboardSettings,
}

impl Dashboard {
    /// Create an empty dashboard owned by `owner`
    #[must_use]
    pub fn new(name: impl Into<String>, owner: Owner) -> Self {
        let now = Utc::now();
        Self {
            id: DashboardId::new(),
            name: name.into(),
            description: String::new(),
            visibility: Visibility::default(),
            owner,
            created_at: now,
            updated_at: now,
            widgets: Vec::new(),
            settings: DashboardSettings::default(),
        }
    }

    /// Check the dashboard's invariants
    ///
    /// # Errors
    /// - name empty after sanitization or over [`crate::MAX_NAME_LEN`]
    /// - duplicate widget ids
    /// - widget frames covering zero cells
    pub fn validate(&self) -> Result<(), ValidationError> {
        sanitize::sanitize_name_default(&self.name)?;
        crate::widget::validate_widgets(&self.widgets)
    }

    /// Look up a widget by id
    #[must_use]
    pub fn widget(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id == id)
    }

    /// Look up a widget mutably by id
    pub fn widget_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.widgets.iter_mut().find(|w| w.id == id)
    }

    /// Append a widget, rejecting duplicate ids
    ///
    /// # Errors
    /// [`ValidationError::DuplicateWidgetId`] when a widget with the same id
    /// already exists.
    pub fn push_widget(&mut self, widget: Widget) -> Result<(), ValidationError> {
        if self.widget(widget.id).is_some() {
            return Err(ValidationError::DuplicateWidgetId(widget.id));
        }
        self.widgets.push(widget);
        Ok(())
    }

    /// Remove a widget by id, returning it
    pub fn remove_widget(&mut self, id: WidgetId) -> Option<Widget> {
        let pos = self.widgets.iter().position(|w| w.id == id)?;
        Some(self.widgets.remove(pos))
    }

    /// Derive the layout map from widget frames
    #[must_use]
    pub fn layout(&self) -> Layout {
        self.widgets.iter().map(|w| (w.id, w.frame)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::GridRect;
    use crate::widget::{TextConfig, WidgetConfig};

    fn owner() -> Owner {
        Owner { user: "user-1".to_string(), workspace: WorkspaceId::new() }
    }

    fn text_widget(body: &str) -> Widget {
        Widget::new("Note", WidgetConfig::Text(TextConfig::new(body)), GridRect::new(0, 0, 2, 1))
    }

    #[test]
    fn validate_accepts_a_plain_dashboard() {
        let mut board = Dashboard::new("Revenue", owner());
        board.push_widget(text_widget("hello")).unwrap();
        assert!(board.validate().is_ok());
    }

    #[test]
    fn validate_rejects_markup_only_names() {
        let board = Dashboard::new("<script></script>", owner());
        assert_eq!(board.validate(), Err(ValidationError::EmptyName));
    }

    #[test]
    fn duplicate_widget_ids_are_rejected() {
        let mut board = Dashboard::new("Revenue", owner());
        let widget = text_widget("a");
        let dup_id = widget.id;
        board.push_widget(widget.clone()).unwrap();
        assert_eq!(board.push_widget(widget), Err(ValidationError::DuplicateWidgetId(dup_id)));
    }

    #[test]
    fn empty_frames_fail_validation() {
        let mut board = Dashboard::new("Revenue", owner());
        let mut widget = text_widget("a");
        widget.frame = GridRect::new(0, 0, 0, 1);
        let id = widget.id;
        board.widgets.push(widget);
        assert_eq!(board.validate(), Err(ValidationError::EmptyFrame(id)));
    }

    #[test]
    fn layout_follows_widget_order() {
        let mut board = Dashboard::new("Revenue", owner());
        let first = text_widget("a");
        let second = text_widget("b");
        let ids = (first.id, second.id);
        board.push_widget(first).unwrap();
        board.push_widget(second).unwrap();

        let layout = board.layout();
        let keys: Vec<_> = layout.keys().copied().collect();
        assert_eq!(keys, vec![ids.0, ids.1]);
    }

    #[test]
    fn remove_widget_returns_the_widget() {
        let mut board = Dashboard::new("Revenue", owner());
        let widget = text_widget("a");
        let id = widget.id;
        board.push_widget(widget).unwrap();
        assert_eq!(board.remove_widget(id).map(|w| w.id), Some(id));
        assert!(board.remove_widget(id).is_none());
    }
}
