//! Shared execute-and-decode helpers for the entity APIs

use crate::envelope::Envelope;
use crate::error::ClientError;
use crate::transport::{ApiRequest, Transport};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Execute `request` and decode the envelope into `T`
pub(crate) async fn typed<T: DeserializeOwned>(
    transport: &Arc<dyn Transport>,
    request: ApiRequest,
    resource: &'static str,
    id: &str,
) -> Result<T, ClientError> {
    let raw = transport.execute(request).await?;
    let envelope: Envelope<T> = serde_json::from_value(raw)
        .map_err(|e| ClientError::Unknown(format!("undecodable {resource} envelope: {e}")))?;
    envelope.into_result(resource, id)
}

/// Execute `request` expecting no payload (deletes)
pub(crate) async fn empty(
    transport: &Arc<dyn Transport>,
    request: ApiRequest,
    resource: &'static str,
    id: &str,
) -> Result<(), ClientError> {
    let raw = transport.execute(request).await?;
    let envelope: Envelope<serde_json::Value> = serde_json::from_value(raw)
        .map_err(|e| ClientError::Unknown(format!("undecodable {resource} envelope: {e}")))?;
    envelope.into_optional_result(resource, id).map(|_| ())
}

/// Serialize a request payload, flattening the impossible-failure case
pub(crate) fn to_body<T: serde::Serialize>(payload: &T) -> Result<serde_json::Value, ClientError> {
    serde_json::to_value(payload).map_err(|e| ClientError::Unknown(format!("unserializable request: {e}")))
}
