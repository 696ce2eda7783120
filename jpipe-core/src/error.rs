//! Error types for jpipe
//!
//! This module provides the fixed JSON-RPC 2.0 error taxonomy plus the
//! library-level error type. Two kinds of errors live here:
//!
//! - **Error**: Application-level errors for internal use (uses thiserror)
//! - **ErrorObject**: Wire-format errors as defined in the JSON-RPC 2.0 spec
//!
//! # Spec-Defined Error Codes
//!
//! JSON-RPC 2.0 reserves these codes:
//! - `-32700`: Parse error (invalid JSON)
//! - `-32600`: Invalid Request (structurally malformed request or batch)
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error
//! - `-32000 to -32099`: Server error (implementation-defined)
//!
//! Applications report their own failures through codes outside the reserved
//! range (or inside the server-error band, by convention).
//!
//! # Carried Request Ids
//!
//! An [`ErrorObject`] optionally carries the id of the request it belongs to.
//! The id is used during response assembly and is **never serialized** inside
//! the wire-format error member - only `code`, `message`, and `data` go on
//! the wire.
//!
//! # Examples
//!
//! ```rust
//! use jpipe_core::ErrorObject;
//!
//! let error = ErrorObject::method_not_found("spoon");
//! assert_eq!(error.code, -32601);
//! assert_eq!(error.data.as_ref().unwrap()["method"], "spoon");
//! ```

use crate::types::Id;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error as ThisError;

/// Invalid JSON was received. (-32700)
pub const PARSE_ERROR: i32 = -32700;
/// The JSON sent is not a valid Request object. (-32600)
pub const INVALID_REQUEST: i32 = -32600;
/// The method does not exist / is not available. (-32601)
pub const METHOD_NOT_FOUND: i32 = -32601;
/// Invalid method parameter(s). (-32602)
pub const INVALID_PARAMS: i32 = -32602;
/// Internal JSON-RPC error. (-32603)
pub const INTERNAL_ERROR: i32 = -32603;

/// Result type for jpipe operations
///
/// Convenience alias used throughout the jpipe crates.
pub type Result<T> = std::result::Result<T, Error>;

/// Application-level error type for jpipe operations
///
/// This is the error a library caller sees from fallible jpipe APIs, as
/// opposed to [`ErrorObject`] which is the payload sent to a JSON-RPC peer.
/// Protocol errors can travel through it via the `Rpc` variant.
#[derive(Debug, Clone, ThisError)]
pub enum Error {
    /// JSON-RPC protocol error (already in wire format)
    #[error("JSON-RPC error: {0}")]
    Rpc(#[from] ErrorObject),

    /// Serialization or deserialization error
    ///
    /// Occurs when converting between Rust types and JSON.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A constructor was handed an argument that violates an invariant
    /// (reserved method prefix, empty batch response, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// JSON-RPC 2.0 error object as defined in the specification
///
/// This is the exact wire shape appearing in the `error` member of a
/// response: `code` and `message` are mandatory, `data` optional. The
/// `request_id` field is bookkeeping for response assembly and is skipped by
/// serde in both directions.
///
/// # Message and Data Conventions
///
/// The factory constructors keep `message` fixed to the canonical spec
/// wording for each kind and put the variable detail into `data`:
///
/// - parse errors carry the decoder's diagnostic string,
/// - invalid requests carry the structural detail (and `{index, details}`
///   when the failure happened inside a batch element),
/// - method-not-found and invalid-params carry `{"method": ...}` so clients
///   can correlate programmatically, with a `"params"` field-error map added
///   when a contract reported per-field failures.
///
/// # Examples
///
/// ```rust
/// use jpipe_core::ErrorObject;
/// use serde_json::json;
///
/// // Standard error
/// let error = ErrorObject::invalid_request("Missing 'jsonrpc' property");
/// assert_eq!(error.code, -32600);
///
/// // Custom application error
/// let custom = ErrorObject::new(-32000, "Insufficient funds")
///     .with_data(json!({"balance": 50, "required": 100}));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ThisError)]
#[error("[{code}] {message}")]
pub struct ErrorObject {
    /// Numeric error code indicating the error kind
    pub code: i32,

    /// Short, canonical description of the error kind
    pub message: String,

    /// Optional structured detail about this particular failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Id of the request this error belongs to, when one could be
    /// determined. Not part of the wire format.
    #[serde(skip)]
    pub request_id: Option<Id>,
}

impl ErrorObject {
    /// Create an error with a custom code and message
    ///
    /// Use the factory methods (like [`ErrorObject::parse_error`]) for
    /// spec-defined errors; this constructor is for application errors.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
            request_id: None,
        }
    }

    /// Attach structured detail data.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Attach the id of the request this error belongs to.
    pub fn with_request_id(mut self, id: Id) -> Self {
        self.request_id = Some(id);
        self
    }

    /// Attach a request id when one is known.
    pub fn with_request_id_opt(mut self, id: Option<Id>) -> Self {
        self.request_id = id;
        self
    }

    /// Create a parse error (-32700)
    ///
    /// `details` is the diagnostic string from the JSON decoder; it travels
    /// in `data` so clients can surface it.
    pub fn parse_error(details: impl Into<String>) -> Self {
        Self::new(PARSE_ERROR, "Parse error").with_data(Value::String(details.into()))
    }

    /// Create an invalid request error (-32600)
    ///
    /// The JSON was syntactically valid but the request object is malformed:
    /// missing or wrong `jsonrpc`, non-string method, scalar params, a
    /// fractional id, an empty batch.
    pub fn invalid_request(details: impl Into<String>) -> Self {
        Self::new(INVALID_REQUEST, "Invalid Request").with_data(Value::String(details.into()))
    }

    /// Create an invalid request error for one element of a batch (-32600)
    ///
    /// `data` carries `{index, details}` so the client can locate the
    /// offending element in the array it sent.
    pub fn invalid_request_in_batch(index: usize, details: impl Into<String>) -> Self {
        Self::new(INVALID_REQUEST, "Invalid Request")
            .with_data(json!({"index": index, "details": details.into()}))
    }

    /// Create a method not found error (-32601)
    ///
    /// `data` carries `{"method": ...}` for programmatic correlation.
    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::new(METHOD_NOT_FOUND, "Method not found")
            .with_data(json!({"method": method.into()}))
    }

    /// Create an invalid params error without field detail (-32602)
    ///
    /// Used when the parameter *shape* is wrong for the procedure (for
    /// example, positional arguments sent to a named-only procedure). There
    /// are no meaningful per-field errors to report in that case, so `data`
    /// carries only the method name.
    pub fn invalid_params(method: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, "Invalid params").with_data(json!({"method": method.into()}))
    }

    /// Create an invalid params error with a field-error map (-32602)
    ///
    /// Used when a contract ran and reported per-field failures; `data`
    /// carries `{"method": ..., "params": {field: errors, ...}}`.
    pub fn invalid_params_with_fields(
        method: impl Into<String>,
        fields: serde_json::Map<String, Value>,
    ) -> Self {
        Self::new(INVALID_PARAMS, "Invalid params")
            .with_data(json!({"method": method.into(), "params": Value::Object(fields)}))
    }

    /// Create an internal error (-32603)
    ///
    /// `details` is only attached when the caller decided disclosure is
    /// acceptable - production configurations pass `None` and keep the
    /// diagnostic in the logs.
    pub fn internal_error(details: Option<String>) -> Self {
        let error = Self::new(INTERNAL_ERROR, "Internal error");
        match details {
            Some(details) => error.with_data(Value::String(details)),
            None => error,
        }
    }

    /// Create a batch size exceeded error (-32600)
    ///
    /// Guards against denial-of-service via oversized batch arrays.
    pub fn batch_size_exceeded(limit: usize, actual: usize) -> Self {
        Self::new(
            INVALID_REQUEST,
            format!("Batch size limit exceeded: limit={}, actual={}", limit, actual),
        )
    }

    /// True when the code is one of the five spec-reserved protocol codes.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self.code,
            PARSE_ERROR | INVALID_REQUEST | METHOD_NOT_FOUND | INVALID_PARAMS | INTERNAL_ERROR
        )
    }
}
