//! Per-key status state machine
//!
//! `idle → loading → {success, error}`, with `success` and `error`
//! re-entering `loading` on invalidation, staleness, or explicit refetch.
//! There is no terminal state.

use crate::error::SyncError;

/// Lifecycle status of one cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryStatus {
    /// Created, never fetched
    Idle,
    /// A fetch is in flight
    Loading,
    /// Last fetch delivered a value
    Success,
    /// Last fetch failed
    Error,
}

/// States reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: QueryStatus) -> &'static [QueryStatus] {
    use QueryStatus::{Error, Loading, Success};
    match from {
        QueryStatus::Idle => &[Loading],
        QueryStatus::Loading => &[Success, Error],
        QueryStatus::Success | QueryStatus::Error => &[Loading],
    }
}

/// Validate one transition
///
/// # Errors
/// [`SyncError::IllegalTransition`] when `to` is not reachable from `from`.
pub fn validate_transition(from: QueryStatus, to: QueryStatus) -> Result<(), SyncError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(SyncError::IllegalTransition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn success_and_error_reenter_loading() {
        assert!(validate_transition(QueryStatus::Success, QueryStatus::Loading).is_ok());
        assert!(validate_transition(QueryStatus::Error, QueryStatus::Loading).is_ok());
    }

    #[test]
    fn idle_only_starts_loading() {
        assert!(validate_transition(QueryStatus::Idle, QueryStatus::Loading).is_ok());
        assert!(validate_transition(QueryStatus::Idle, QueryStatus::Success).is_err());
        assert!(validate_transition(QueryStatus::Idle, QueryStatus::Error).is_err());
    }

    proptest! {
        #[test]
        fn validation_agrees_with_allowed_set(
            from in prop_oneof![
                Just(QueryStatus::Idle),
                Just(QueryStatus::Loading),
                Just(QueryStatus::Success),
                Just(QueryStatus::Error),
            ],
            to in prop_oneof![
                Just(QueryStatus::Idle),
                Just(QueryStatus::Loading),
                Just(QueryStatus::Success),
                Just(QueryStatus::Error),
            ]
        ) {
            let allowed = allowed_transitions(from);
            if validate_transition(from, to).is_ok() {
                prop_assert!(allowed.contains(&to));
            } else {
                prop_assert!(!allowed.contains(&to));
            }
        }
    }
}
