//! Vantage dashboard store
//!
//! The facade the rest of an application talks to. It wires the key
//! registry, the query cache, the entity APIs, and the edit session into
//! the full data flow: page mounts read through the cache; entering edit
//! mode hydrates a session from the last-read server data; saving sends
//! the working copy back through a mutation whose invalidation set comes
//! from the entity relationship graph.

pub mod error;
pub mod store;

pub use error::StoreError;
pub use store::DashboardStore;
