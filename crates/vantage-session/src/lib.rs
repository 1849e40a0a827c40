//! Vantage edit sessions
//!
//! The local UI-state store for one dashboard being edited: a working copy
//! hydrated from the last-read server data, a dirty flag, and linear
//! undo/redo stacks. Nothing in this crate touches the server cache —
//! hydration in, one saved patch out, both driven by the store facade.

pub mod session;

pub use session::{EditMode, EditSession, SessionError, Snapshot, UNDO_CAP};
