//! Input validation errors
//!
//! [`ValidationError`] covers every way user-entered dashboard data can be
//! rejected before it reaches the transport. Server-side validation echoes
//! map into the same type so callers handle one shape.

use crate::id::WidgetId;
use crate::widget::WidgetKind;

/// Rejected input
///
/// Carried inside the client error taxonomy; never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Display name was empty after sanitization
    #[error("name must not be empty")]
    EmptyName,

    /// Display name over the configured maximum
    #[error("name exceeds {max} characters (got {len})")]
    NameTooLong {
        /// Configured maximum
        max: usize,
        /// Actual sanitized length
        len: usize,
    },

    /// Two widgets in one dashboard share an id
    #[error("duplicate widget id {0}")]
    DuplicateWidgetId(WidgetId),

    /// Attempt to change a widget's kind after creation
    #[error("widget kind is immutable: expected {expected}, got {actual}")]
    KindMismatch {
        /// Kind the widget was created with
        expected: WidgetKind,
        /// Kind of the rejected replacement config
        actual: WidgetKind,
    },

    /// Widget frame with zero width or height
    #[error("widget {0} has an empty frame")]
    EmptyFrame(WidgetId),

    /// Generic per-field rejection (server echoes land here)
    #[error("invalid {field}: {reason}")]
    Field {
        /// Field name as exposed on the wire
        field: String,
        /// Human-readable reason
        reason: String,
    },
}

impl ValidationError {
    /// Names of the fields this error affects
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Self::EmptyName | Self::NameTooLong { .. } => vec!["name"],
            Self::DuplicateWidgetId(_) | Self::EmptyFrame(_) => vec!["widgets"],
            Self::KindMismatch { .. } => vec!["widgets", "config"],
            Self::Field { field, .. } => vec![field.as_str()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_variant_reports_its_field() {
        let err = ValidationError::Field {
            field: "description".to_string(),
            reason: "too long".to_string(),
        };
        assert_eq!(err.fields(), vec!["description"]);
    }
}
