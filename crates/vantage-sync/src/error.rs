//! Synchronization-layer errors

use crate::status::QueryStatus;

/// Internal cache failures
///
/// Data-fetch failures are *not* errors of this layer — they land in the
/// entry's `Error` status and surface through read results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// A status transition outside the state machine
    #[error("illegal status transition {from:?} -> {to:?}")]
    IllegalTransition {
        /// Status before the transition
        from: QueryStatus,
        /// Rejected target status
        to: QueryStatus,
    },
}
