//! Parser: raw JSON text to typed protocol objects
//!
//! This is the entry point of the pipeline. [`parse`] consumes the wire
//! payload and produces either a single [`Call`] or a [`BatchRequest`], with
//! all structural validation applied along the way:
//!
//! - syntactically invalid JSON → Parse error (-32700) carrying the
//!   decoder's diagnostic string
//! - a top-level array is a batch; an empty array is an Invalid Request
//! - each batch element is parsed **independently** - a malformed element is
//!   captured in place as an Invalid Request error tagged with its index,
//!   and the remaining elements proceed normally
//! - `jsonrpc` must be exactly `"2.0"`, `method` must be a string, `params`
//!   must be an array, object, or absent, and `id` (when the key is present)
//!   must be a string, integer, or null - fractional numbers are rejected
//!
//! # Request or Notification?
//!
//! Presence of the `id` key in the source payload decides: key present
//! (including an explicit `null`) means request, key absent means
//! notification. An id of `null` does *not* make a notification.
//!
//! # Best-Effort Id Echo
//!
//! When a single malformed payload carried a structurally valid id, that id
//! rides along on the returned error so the transport can emit a correlated
//! error response instead of a null-id one.

use crate::batch::{BatchItem, BatchRequest};
use crate::error::ErrorObject;
use crate::types::{Call, Id, Notification, Params, Request};
use serde_json::{Map, Value};

/// Result of parsing one wire payload: a single call or a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedItem {
    /// A single request or notification
    Call(Call),
    /// A top-level array of calls (with per-element errors retained)
    Batch(BatchRequest),
}

impl ParsedItem {
    /// True for the single-call variant.
    pub fn is_call(&self) -> bool {
        matches!(self, ParsedItem::Call(_))
    }

    /// True for the batch variant.
    pub fn is_batch(&self) -> bool {
        matches!(self, ParsedItem::Batch(_))
    }
}

/// Parse a raw JSON-RPC payload.
///
/// # Errors
///
/// Returns the protocol error to send back verbatim: Parse error for
/// syntactically invalid JSON, Invalid Request for an empty batch or a
/// structurally malformed single item. Per-element failures inside a
/// non-empty batch do **not** surface here - they are retained inside the
/// returned [`BatchRequest`].
///
/// # Examples
///
/// ```rust
/// use jpipe_core::parser::{parse, ParsedItem};
///
/// let parsed = parse(r#"{"jsonrpc":"2.0","method":"ping","id":1}"#).unwrap();
/// assert!(parsed.is_call());
///
/// let parsed = parse(r#"[{"jsonrpc":"2.0","method":"a","id":1},{"bad":true}]"#).unwrap();
/// assert!(parsed.is_batch());
///
/// let error = parse("not json").unwrap_err();
/// assert_eq!(error.code, -32700);
/// ```
pub fn parse(text: &str) -> Result<ParsedItem, ErrorObject> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ErrorObject::parse_error(e.to_string()))?;

    match value {
        Value::Array(elements) => parse_batch(elements).map(ParsedItem::Batch),
        other => parse_call(&other).map(ParsedItem::Call),
    }
}

/// Parse the elements of a top-level array into a batch.
///
/// Elements fail independently; a failure is tagged with its index and kept
/// in position.
fn parse_batch(elements: Vec<Value>) -> Result<BatchRequest, ErrorObject> {
    if elements.is_empty() {
        return Err(ErrorObject::invalid_request("Batch cannot be empty"));
    }

    let items = elements
        .iter()
        .enumerate()
        .map(|(index, element)| match parse_call(element) {
            Ok(call) => BatchItem::Call(call),
            Err(error) => {
                tracing::debug!(index, code = error.code, "batch element failed to parse");
                BatchItem::Invalid(tag_batch_index(error, index))
            }
        })
        .collect();

    // Non-emptiness was checked above; the constructor re-checks it.
    BatchRequest::new(items).map_err(|_| ErrorObject::invalid_request("Batch cannot be empty"))
}

/// Rewrap an element-level error so its data reads `{index, details}`.
fn tag_batch_index(error: ErrorObject, index: usize) -> ErrorObject {
    let details = match &error.data {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => error.message.clone(),
    };
    ErrorObject::invalid_request_in_batch(index, details)
        .with_request_id_opt(error.request_id)
}

/// Parse one decoded JSON value as a request or notification.
fn parse_call(value: &Value) -> Result<Call, ErrorObject> {
    let object = match value.as_object() {
        Some(object) => object,
        None => return Err(ErrorObject::invalid_request("Request must be an object")),
    };

    // Extracted up front so every structural error can echo it.
    let echoed_id = extract_id(object);

    match object.get("jsonrpc") {
        None => {
            return Err(ErrorObject::invalid_request("Missing 'jsonrpc' property")
                .with_request_id_opt(echoed_id))
        }
        Some(Value::String(version)) if version == crate::types::JSONRPC_VERSION => {}
        Some(_) => {
            return Err(
                ErrorObject::invalid_request("Invalid JSON-RPC version, must be '2.0'")
                    .with_request_id_opt(echoed_id),
            )
        }
    }

    let method = match object.get("method") {
        Some(Value::String(method)) => method.clone(),
        Some(_) => {
            return Err(ErrorObject::invalid_request("Method must be a string")
                .with_request_id_opt(echoed_id))
        }
        None => {
            return Err(ErrorObject::invalid_request("Missing 'method' property")
                .with_request_id_opt(echoed_id))
        }
    };

    let params = match object.get("params") {
        None => None,
        Some(value) => match Params::from_value(value.clone()) {
            Some(params) => Some(params),
            None => {
                return Err(ErrorObject::invalid_request(
                    "Params must be an object, array, or omitted",
                )
                .with_request_id_opt(echoed_id))
            }
        },
    };

    // Key presence, not value, selects request vs notification.
    if let Some(id_value) = object.get("id") {
        let id = match parse_id(id_value) {
            Some(id) => id,
            None => {
                return Err(ErrorObject::invalid_request(
                    "Id must be a string, integer, or null",
                ))
            }
        };
        Request::new(method, params, id)
            .map(Call::Request)
            .map_err(|e| constructor_failure(e, echoed_id))
    } else {
        Notification::new(method, params)
            .map(Call::Notification)
            .map_err(|e| constructor_failure(e, None))
    }
}

/// Map a constructor failure (reserved method prefix) to an Invalid Request
/// carrying the original message as details.
fn constructor_failure(error: crate::error::Error, echoed_id: Option<Id>) -> ErrorObject {
    let details = match error {
        crate::error::Error::InvalidArgument(message) => message,
        other => other.to_string(),
    };
    ErrorObject::invalid_request(details).with_request_id_opt(echoed_id)
}

/// Parse an id value, rejecting anything that is not a string, an integer
/// exactly representable as `i64`, or null.
///
/// `1.0` decodes as a float and is rejected, as are numbers beyond the
/// `i64` range.
fn parse_id(value: &Value) -> Option<Id> {
    match value {
        Value::String(s) => Some(Id::String(s.clone())),
        Value::Number(n) => n.as_i64().map(Id::Number),
        Value::Null => Some(Id::Null),
        _ => None,
    }
}

/// Best-effort id extraction from a possibly malformed payload.
fn extract_id(object: &Map<String, Value>) -> Option<Id> {
    object.get("id").and_then(parse_id)
}
