//! JSON-RPC 2.0 protocol objects as defined in the specification
//!
//! This module implements the core value objects from the JSON-RPC 2.0
//! specification (https://www.jsonrpc.org/specification). These types are
//! designed to be:
//!
//! - **Spec-compliant**: Strict adherence to JSON-RPC 2.0 requirements
//! - **Type-safe**: Invalid messages are unrepresentable or rejected at
//!   construction
//! - **Serializable**: Full serde support for JSON encoding
//!
//! # Message Types
//!
//! JSON-RPC 2.0 defines three primary message types:
//!
//! 1. **Request**: A call to a method that expects a response
//! 2. **Notification**: A call to a method with no response expected
//! 3. **Response**: The result of processing a request (success or error)
//!
//! # Requests vs Notifications
//!
//! The two are distinguished by the presence of the `id` key in the source
//! payload, not by its value: `"id": null` is still a request and still
//! expects a (null-correlated) response. A notification has no `id` key at
//! all. The parser in [`crate::parser`] enforces this; within this module the
//! distinction is structural ([`Request`] has an [`Id`], [`Notification`]
//! does not).
//!
//! # Construction Invariants
//!
//! [`Request::new`] and [`Notification::new`] are fallible: method names
//! beginning with the reserved `rpc.` prefix are rejected at construction.
//! There is no separate "validate" step for protocol objects - if you hold
//! one, it is well-formed.

use crate::error::{Error, ErrorObject, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// The only protocol version this crate speaks.
pub const JSONRPC_VERSION: &str = "2.0";

/// Method names beginning with this prefix are reserved for rpc-internal
/// extensions and are rejected at construction.
pub const RESERVED_METHOD_PREFIX: &str = "rpc.";

/// JSON-RPC 2.0 request ID
///
/// The request identifier correlates a request with its response. According
/// to the spec an ID can be a string, integer, or null.
///
/// # Why No Floats?
///
/// The spec advises against fractional ids, and this crate rejects them at
/// parse time: a JSON number id that is not exactly representable as `i64`
/// (including `1.0`) never makes it into an `Id`. The enum therefore has no
/// float variant at all.
///
/// # Implementation Notes
///
/// This enum uses `#[serde(untagged)]` to serialize directly as the inner
/// value without a type discriminator, matching the wire format exactly.
/// `Hash` and `Eq` are implemented so ids can key response-correlation maps.
///
/// # Examples
///
/// ```rust
/// use jpipe_core::Id;
///
/// let id1: Id = "req-123".into();
/// let id2: Id = 42i64.into();
///
/// assert_eq!(id1.to_string(), "\"req-123\"");
/// assert_eq!(id2.to_string(), "42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    /// String identifier - useful for UUIDs or correlation tokens
    String(String),
    /// Integer identifier - efficient for sequential request counters
    Number(i64),
    /// Null identifier - allowed by spec but makes correlation impossible
    Null,
}

impl fmt::Display for Id {
    /// Format the ID in a JSON-like representation: strings quoted, numbers
    /// as-is, null as "null".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::String(s) => write!(f, "\"{}\"", s),
            Id::Number(n) => write!(f, "{}", n),
            Id::Null => write!(f, "null"),
        }
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::String(s)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::String(s.to_string())
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Number(n)
    }
}

/// JSON-RPC 2.0 request parameters
///
/// Per the spec, `params` - when present - must be a structured value: an
/// array (positional arguments) or an object (named arguments). This enum
/// makes any other shape unrepresentable after parsing; the parser rejects
/// scalar params with an invalid-request error before a `Params` ever exists.
///
/// # Examples
///
/// ```rust
/// use jpipe_core::Params;
/// use serde_json::json;
///
/// let positional = Params::Array(vec![json!(1), json!(2)]);
/// let named: Params = serde_json::from_value(json!({"a": 1})).unwrap();
/// assert!(named.is_object());
/// assert_eq!(positional.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Params {
    /// Positional parameters as an array
    Array(Vec<Value>),
    /// Named parameters as an object
    Object(Map<String, Value>),
}

impl Params {
    /// Build params from a decoded JSON value.
    ///
    /// Returns `None` for any value that is not an array or object - the
    /// caller decides how to report the shape violation.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Array(values) => Some(Params::Array(values)),
            Value::Object(map) => Some(Params::Object(map)),
            _ => None,
        }
    }

    /// Number of positional elements or named entries.
    pub fn len(&self) -> usize {
        match self {
            Params::Array(values) => values.len(),
            Params::Object(map) => map.len(),
        }
    }

    /// Check whether there are no parameters at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True for the object (named-arguments) shape.
    pub fn is_object(&self) -> bool {
        matches!(self, Params::Object(_))
    }

    /// True for the array (positional-arguments) shape.
    pub fn is_array(&self) -> bool {
        matches!(self, Params::Array(_))
    }

    /// Convert back to a `serde_json::Value` for serialization or dispatch.
    pub fn to_value(&self) -> Value {
        match self {
            Params::Array(values) => Value::Array(values.clone()),
            Params::Object(map) => Value::Object(map.clone()),
        }
    }
}

impl From<Vec<Value>> for Params {
    fn from(values: Vec<Value>) -> Self {
        Params::Array(values)
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Params::Object(map)
    }
}

/// JSON-RPC 2.0 request message
///
/// A request represents a call to a method that expects a response. The
/// response will carry a matching `id` for correlation.
///
/// # Spec Compliance
///
/// A request MUST contain `jsonrpc` (exactly "2.0"), `method`, and `id`
/// (string, integer, or null), and MAY contain `params` (array or object).
///
/// # Immutability
///
/// Fields are private; a `Request` cannot be mutated after construction, and
/// construction itself enforces the reserved-prefix rule. Use the accessors
/// to read fields.
///
/// # Examples
///
/// ```rust
/// use jpipe_core::{Id, Params, Request};
/// use serde_json::json;
///
/// let req = Request::new(
///     "subtract",
///     Params::from_value(json!({"minuend": 42, "subtrahend": 23})),
///     Id::Number(1),
/// ).unwrap();
/// assert_eq!(req.method(), "subtract");
///
/// // Reserved prefix is a construction failure
/// assert!(Request::new("rpc.ping", None, Id::Number(2)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    /// JSON-RPC version - always "2.0"
    jsonrpc: String,
    method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Params>,
    id: Id,
}

impl Request {
    /// Create a new JSON-RPC 2.0 request
    ///
    /// The `jsonrpc` field is set to "2.0" automatically.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `method` begins with the
    /// reserved `rpc.` prefix.
    pub fn new(method: impl Into<String>, params: Option<Params>, id: Id) -> Result<Self> {
        let method = method.into();
        check_method_name(&method)?;
        Ok(Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method,
            params,
            id,
        })
    }

    /// Name of the method to invoke.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Parameters, if any were supplied.
    pub fn params(&self) -> Option<&Params> {
        self.params.as_ref()
    }

    /// The correlation id. May be `Id::Null` - a null id is still a request.
    pub fn id(&self) -> &Id {
        &self.id
    }
}

/// JSON-RPC 2.0 notification message
///
/// A notification is like a request, but crucially **does not expect a
/// response** - signalled by the absence of an `id` key, not by a null
/// value. The server never emits a response for a notification, even when
/// processing it fails.
///
/// # Examples
///
/// ```rust
/// use jpipe_core::{Notification, Params};
/// use serde_json::json;
///
/// let notif = Notification::new(
///     "status.update",
///     Params::from_value(json!({"status": "online"})),
/// ).unwrap();
/// assert_eq!(notif.method(), "status.update");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    /// JSON-RPC version - always "2.0"
    jsonrpc: String,
    method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Params>,
}

impl Notification {
    /// Create a new JSON-RPC 2.0 notification
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `method` begins with the
    /// reserved `rpc.` prefix.
    pub fn new(method: impl Into<String>, params: Option<Params>) -> Result<Self> {
        let method = method.into();
        check_method_name(&method)?;
        Ok(Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method,
            params,
        })
    }

    /// Name of the method or event being notified.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Parameters, if any were supplied.
    pub fn params(&self) -> Option<&Params> {
        self.params.as_ref()
    }
}

fn check_method_name(method: &str) -> Result<()> {
    if method.starts_with(RESERVED_METHOD_PREFIX) {
        return Err(Error::InvalidArgument(format!(
            "Method names beginning with '{}' are reserved",
            RESERVED_METHOD_PREFIX
        )));
    }
    Ok(())
}

/// A single incoming invocation: a request or a notification
///
/// The validator and dispatcher treat requests and notifications uniformly
/// except for response emission, so they operate on `Call` rather than the
/// concrete types. [`Call::request_id`] is the discriminating accessor:
/// `Some(id)` means a response is expected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Call {
    /// An invocation expecting a correlated response
    Request(Request),
    /// A fire-and-forget invocation
    Notification(Notification),
}

impl Call {
    /// Name of the method to invoke.
    pub fn method(&self) -> &str {
        match self {
            Call::Request(request) => request.method(),
            Call::Notification(notification) => notification.method(),
        }
    }

    /// Parameters, if any were supplied.
    pub fn params(&self) -> Option<&Params> {
        match self {
            Call::Request(request) => request.params(),
            Call::Notification(notification) => notification.params(),
        }
    }

    /// The correlation id - `Some` for requests (possibly `Id::Null`),
    /// `None` for notifications.
    pub fn request_id(&self) -> Option<&Id> {
        match self {
            Call::Request(request) => Some(request.id()),
            Call::Notification(_) => None,
        }
    }

    /// True when no response is expected.
    pub fn is_notification(&self) -> bool {
        matches!(self, Call::Notification(_))
    }
}

impl From<Request> for Call {
    fn from(request: Request) -> Self {
        Call::Request(request)
    }
}

impl From<Notification> for Call {
    fn from(notification: Notification) -> Self {
        Call::Notification(notification)
    }
}

/// The body of a response: a result or an error, never both
///
/// The JSON-RPC 2.0 spec requires exactly one of `result`/`error` on every
/// response. Rather than a pair of nullable fields checked at runtime, the
/// invariant is structural: this enum has no both-or-neither state. The
/// `#[serde(untagged)]` struct variants serialize as the bare `result` /
/// `error` members once flattened into [`Response`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponsePayload {
    /// Successful outcome
    Result {
        /// The value produced by the method
        result: Value,
    },
    /// Failed outcome
    Error {
        /// The protocol or application error
        error: ErrorObject,
    },
}

/// JSON-RPC 2.0 response message
///
/// Sent by the server after processing a request. Contains either a result
/// (success) or an error (failure) - see [`ResponsePayload`] - and the `id`
/// of the originating request. When the request id could not be determined
/// (e.g. a top-level parse failure) the id is `Id::Null`.
///
/// # Examples
///
/// ```rust
/// use jpipe_core::{ErrorObject, Id, Response};
/// use serde_json::json;
///
/// let ok = Response::success(json!({"value": 42}), Id::Number(1));
/// assert!(ok.is_success());
///
/// let failed = Response::error(ErrorObject::method_not_found("spoon"), Id::Number(2));
/// assert!(failed.is_error());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// JSON-RPC version - always "2.0"
    jsonrpc: String,
    #[serde(flatten)]
    payload: ResponsePayload,
    id: Id,
}

impl Response {
    /// Create a successful response.
    pub fn success(result: Value, id: Id) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            payload: ResponsePayload::Result { result },
            id,
        }
    }

    /// Create an error response.
    ///
    /// Use `Id::Null` when the request id could not be determined.
    pub fn error(error: ErrorObject, id: Id) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            payload: ResponsePayload::Error { error },
            id,
        }
    }

    /// Check if the response represents a successful result.
    pub fn is_success(&self) -> bool {
        matches!(self.payload, ResponsePayload::Result { .. })
    }

    /// Check if the response represents an error.
    pub fn is_error(&self) -> bool {
        matches!(self.payload, ResponsePayload::Error { .. })
    }

    /// The result value, when this is a success response.
    pub fn result(&self) -> Option<&Value> {
        match &self.payload {
            ResponsePayload::Result { result } => Some(result),
            ResponsePayload::Error { .. } => None,
        }
    }

    /// The error object, when this is an error response.
    pub fn error_object(&self) -> Option<&ErrorObject> {
        match &self.payload {
            ResponsePayload::Error { error } => Some(error),
            ResponsePayload::Result { .. } => None,
        }
    }

    /// The id of the originating request.
    pub fn id(&self) -> &Id {
        &self.id
    }

    /// The success-or-error body.
    pub fn payload(&self) -> &ResponsePayload {
        &self.payload
    }
}
