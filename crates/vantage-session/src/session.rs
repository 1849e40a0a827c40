//! The edit session state machine
//!
//! `viewing → editing` hydrates the working copy from server data;
//! `editing → viewing` (discard or completed save) clears everything.
//! Undo history is linear: any working-copy change or explicit undo push
//! clears the redo stack, so diverging histories are never kept.

use std::collections::VecDeque;
use tracing::debug;
use vantage_model::{Dashboard, Layout, Widget};

/// Maximum retained undo snapshots; the oldest falls off first
pub const UNDO_CAP: usize = 100;

/// Which side of the edit boundary the session is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    /// Read-only; no working copy exists
    #[default]
    Viewing,
    /// A working copy is live and mutable
    Editing,
}

/// Immutable capture of the working copy, the undo/redo unit
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Widget list at capture time
    pub widgets: Vec<Widget>,
    /// Layout map at capture time
    pub layout: Layout,
}

/// Session mis-use errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Working-copy operation outside edit mode
    #[error("not in edit mode")]
    NotEditing,

    /// `begin_editing` while already editing
    #[error("an editing session is already active")]
    AlreadyEditing,
}

/// Edit state for one dashboard instance
///
/// Exactly one session exists per open dashboard; there is no
/// concurrent-editor merging.
#[derive(Debug, Default)]
pub struct EditSession {
    mode: EditMode,
    widgets: Vec<Widget>,
    layout: Layout,
    dirty: bool,
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    filter: Option<String>,
}

impl EditSession {
    /// A fresh session in viewing mode
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode
    #[inline]
    #[must_use]
    pub fn mode(&self) -> EditMode {
        self.mode
    }

    /// Whether a working copy is live
    #[inline]
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.mode == EditMode::Editing
    }

    /// Whether the working copy differs from what was hydrated
    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Working-copy widgets
    #[inline]
    #[must_use]
    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    /// Working-copy layout
    #[inline]
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Undo steps currently available
    #[inline]
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Redo steps currently available
    #[inline]
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// Enter edit mode, hydrating the working copy from server data
    ///
    /// This is the only server→local flow; the session never reads the
    /// cache itself.
    ///
    /// # Errors
    /// [`SessionError::AlreadyEditing`] when a session is already live.
    pub fn begin_editing(&mut self, dashboard: &Dashboard) -> Result<(), SessionError> {
        if self.is_editing() {
            return Err(SessionError::AlreadyEditing);
        }
        debug!(dashboard = %dashboard.id, "entering edit mode");
        self.mode = EditMode::Editing;
        self.widgets = dashboard.widgets.clone();
        self.layout = dashboard.layout();
        self.dirty = false;
        self.undo.clear();
        self.redo.clear();
        Ok(())
    }

    /// Replace the working widget list
    ///
    /// Marks the session dirty and clears the redo stack (the history has
    /// diverged).
    ///
    /// # Errors
    /// [`SessionError::NotEditing`] outside edit mode.
    pub fn set_widgets(&mut self, widgets: Vec<Widget>) -> Result<(), SessionError> {
        if !self.is_editing() {
            return Err(SessionError::NotEditing);
        }
        self.widgets = widgets;
        self.dirty = true;
        self.redo.clear();
        Ok(())
    }

    /// Replace the working layout
    ///
    /// Same dirty/redo semantics as [`EditSession::set_widgets`].
    ///
    /// # Errors
    /// [`SessionError::NotEditing`] outside edit mode.
    pub fn set_layout(&mut self, layout: Layout) -> Result<(), SessionError> {
        if !self.is_editing() {
            return Err(SessionError::NotEditing);
        }
        self.layout = layout;
        self.dirty = true;
        self.redo.clear();
        Ok(())
    }

    /// Capture the current working copy (call before a structural change)
    #[must_use]
    pub fn capture(&self) -> Snapshot {
        Snapshot { widgets: self.widgets.clone(), layout: self.layout.clone() }
    }

    /// Push a pre-change snapshot onto the undo stack
    ///
    /// Clears the redo stack unconditionally; history is linear. The
    /// oldest snapshot is dropped past [`UNDO_CAP`].
    pub fn push_undo(&mut self, snapshot: Snapshot) {
        if self.undo.len() == UNDO_CAP {
            self.undo.pop_front();
        }
        self.undo.push_back(snapshot);
        self.redo.clear();
    }

    /// Step back once; no-op on an empty undo stack
    ///
    /// The pre-undo working copy moves to the redo stack; the popped
    /// snapshot becomes the working copy and is returned.
    pub fn undo(&mut self) -> Option<Snapshot> {
        let snapshot = self.undo.pop_back()?;
        self.redo.push(self.capture());
        self.apply(&snapshot);
        Some(snapshot)
    }

    /// Step forward once; no-op on an empty redo stack
    pub fn redo(&mut self) -> Option<Snapshot> {
        let snapshot = self.redo.pop()?;
        // direct push: going through push_undo would clear the redo stack
        if self.undo.len() == UNDO_CAP {
            self.undo.pop_front();
        }
        self.undo.push_back(self.capture());
        self.apply(&snapshot);
        Some(snapshot)
    }

    /// Set the local widget search filter (pure UI state, not undoable)
    pub fn set_filter(&mut self, filter: Option<String>) {
        self.filter = filter.filter(|f| !f.trim().is_empty());
    }

    /// Current search filter
    #[inline]
    #[must_use]
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Working-copy widgets matching the search filter
    #[must_use]
    pub fn visible_widgets(&self) -> Vec<&Widget> {
        match &self.filter {
            None => self.widgets.iter().collect(),
            Some(needle) => {
                let needle = needle.to_lowercase();
                self.widgets
                    .iter()
                    .filter(|w| w.title.to_lowercase().contains(&needle))
                    .collect()
            }
        }
    }

    /// Abandon the working copy and return to viewing
    pub fn discard(&mut self) {
        debug!("discarding edit session");
        self.reset();
    }

    /// Clear the session after a save the server confirmed
    ///
    /// Only call on success — a failed save must leave the working copy
    /// and both stacks intact so the user can retry without losing edits.
    pub fn complete_save(&mut self) {
        debug!("edit session saved");
        self.reset();
    }

    fn reset(&mut self) {
        self.mode = EditMode::Viewing;
        self.widgets.clear();
        self.layout.clear();
        self.dirty = false;
        self.undo.clear();
        self.redo.clear();
        self.filter = None;
    }

    fn apply(&mut self, snapshot: &Snapshot) {
        self.widgets = snapshot.widgets.clone();
        self.layout = snapshot.layout.clone();
        self.dirty = true;
    }
}
