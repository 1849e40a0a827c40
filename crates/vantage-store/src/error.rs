//! Store-level errors

use vantage_client::ClientError;
use vantage_session::SessionError;

/// Failures from the store facade
///
/// Data failures keep their [`ClientError`] taxonomy; session-state misuse
/// (saving while viewing, double edit entry) surfaces separately so
/// callers can distinguish "the server said no" from "you called this in
/// the wrong state".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Data-access or cache failure
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Edit-session state machine violation
    #[error(transparent)]
    Session(#[from] SessionError),
}
