//! Response envelope
//!
//! Every operation answers with `{success, data?, error?}`. Mapping into
//! the error taxonomy happens here so transports stay dumb pipes and entity
//! APIs stay typed.

use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use vantage_model::ValidationError;

/// Error code the server uses for missing entities
pub const CODE_NOT_FOUND: &str = "not_found";
/// Error code the server uses for rejected input
pub const CODE_VALIDATION: &str = "validation_failed";

/// Structured error half of the envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable code
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Fields the error applies to (validation only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

/// Standard request/response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    /// Whether the operation succeeded
    pub success: bool,
    /// Payload on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl<T> Envelope<T> {
    /// A success envelope carrying `data`
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    /// A failure envelope
    #[must_use]
    pub fn err(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody { code: code.into(), message: message.into(), fields: Vec::new() }),
        }
    }

    /// A `validation_failed` envelope naming the affected fields
    #[must_use]
    pub fn validation(message: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code: CODE_VALIDATION.to_string(),
                message: message.into(),
                fields,
            }),
        }
    }

    /// Unwrap into the payload or the mapped taxonomy error
    ///
    /// `resource`/`id` only feed the not-found variant's message.
    ///
    /// # Errors
    /// - [`ClientError::NotFound`] for the `not_found` code
    /// - [`ClientError::Validation`] for the `validation_failed` code
    /// - [`ClientError::Unknown`] for other codes or a success without data
    pub fn into_result(self, resource: &'static str, id: &str) -> Result<T, ClientError> {
        match self.into_optional_result(resource, id)? {
            Some(data) => Ok(data),
            None => Err(ClientError::Unknown(format!("{resource} response had no data"))),
        }
    }

    /// Like [`Envelope::into_result`] but tolerates an empty success (deletes)
    ///
    /// # Errors
    /// Same mapping as [`Envelope::into_result`], minus the missing-data case.
    pub fn into_optional_result(
        self,
        resource: &'static str,
        id: &str,
    ) -> Result<Option<T>, ClientError> {
        if self.success {
            return Ok(self.data);
        }
        let Some(body) = self.error else {
            return Err(ClientError::Unknown(format!("{resource} failure had no error body")));
        };
        match body.code.as_str() {
            CODE_NOT_FOUND => Err(ClientError::not_found(resource, id)),
            CODE_VALIDATION => {
                let field =
                    body.fields.first().cloned().unwrap_or_else(|| "request".to_string());
                Err(ClientError::Validation(ValidationError::Field {
                    field,
                    reason: body.message,
                }))
            }
            _ => Err(ClientError::Unknown(format!("{}: {}", body.code, body.message))),
        }
    }
}
