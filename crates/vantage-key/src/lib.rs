//! Vantage cache keys
//!
//! Every unit of cached server data is addressed by a [`QueryKey`]: a
//! hierarchical, order-independent identifier. Keys nest — a dashboard's
//! detail key extends the domain root, its widgets key extends the detail
//! key — so invalidating a prefix reaches every dependent entry.
//!
//! [`related_keys`] derives the full invalidation set for a mutated entity
//! from the ownership graph; the mapping is the single source of truth and
//! deliberately errs on the side of invalidating too much rather than
//! leaving a stale entry behind.

pub mod canonical;
pub mod domains;
pub mod key;
pub mod related;
pub mod validate;

pub use canonical::canonical_json;
pub use domains::{analytics, auth, dashboards, data_sources, organizations, workspaces};
pub use key::{CanonicalParams, QueryKey, Segment};
pub use related::{related_keys, EntityRef};
pub use validate::{validate_key, KeyError, MAX_PARAM_DEPTH, MAX_SEGMENTS};
