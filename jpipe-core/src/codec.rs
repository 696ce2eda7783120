//! Codec: typed protocol objects to wire JSON (and back, for responses)
//!
//! The decode direction for incoming traffic lives in [`crate::parser`],
//! which owns all structural validation. This module carries the encode
//! helpers and the response-side decode used by clients and round-trip
//! tests.
//!
//! Serialization failures map to [`Error::Serialization`]; they indicate a
//! value that is not JSON-representable, not a protocol violation.

use crate::batch::BatchResponse;
use crate::error::{Error, Result};
use crate::types::Response;
use serde::Serialize;

/// Encode any serializable message to a JSON string.
///
/// Type-specific wrappers below are preferred in application code; this is
/// the generic building block.
pub fn encode<T: Serialize>(msg: &T) -> Result<String> {
    serde_json::to_string(msg).map_err(|e| Error::Serialization(e.to_string()))
}

/// Encode a single response to JSON.
///
/// # Examples
///
/// ```rust
/// use jpipe_core::{codec, Id, Response};
/// use serde_json::json;
///
/// let response = Response::success(json!(10), Id::Number(1));
/// let json = codec::encode_response(&response).unwrap();
/// assert!(json.contains("\"result\":10"));
/// ```
pub fn encode_response(response: &Response) -> Result<String> {
    encode(response)
}

/// Encode a batch response to a JSON array.
pub fn encode_batch_responses(batch: &BatchResponse) -> Result<String> {
    encode(batch)
}

/// Decode a JSON string as a single response.
///
/// Used on the client side and in round-trip tests; servers never decode
/// responses.
pub fn decode_response(data: &str) -> Result<Response> {
    serde_json::from_str(data).map_err(|e| Error::Serialization(e.to_string()))
}
