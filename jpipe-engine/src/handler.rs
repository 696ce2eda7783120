//! Handler traits for application dispatch
//!
//! This module defines the seam between the protocol engine and the
//! application's method implementations. The engine parses and validates;
//! the [`Handler`] produces results.
//!
//! # Contract
//!
//! A handler receives the method name and the (already shape-validated)
//! parameters, and returns either a result value or a wire-format error
//! object. Application-defined failures use codes outside the spec-reserved
//! range (the `-32000..-32099` server band by convention) - the engine
//! passes them through verbatim.
//!
//! # Batch Dispatch
//!
//! During batch orchestration the engine hands the application its whole
//! validated sub-batch in one [`Handler::call_batch`] invocation. The
//! provided implementation maps [`Handler::call`] over the calls in order;
//! applications with their own batching strategy (shared transactions,
//! internal parallelism) can override it, as long as they return exactly one
//! outcome per call, in order.
//!
//! # Examples
//!
//! ```rust
//! use jpipe_engine::from_fn;
//! use jpipe_core::{ErrorObject, Params};
//! use serde_json::json;
//!
//! let handler = from_fn(|method, _params: Option<&Params>| match method {
//!     "ping" => Ok(json!("pong")),
//!     other => Err(ErrorObject::method_not_found(other)),
//! });
//! ```

use jpipe_core::{Call, ErrorObject, Params};
use serde_json::Value;

/// Trait for application method dispatch.
///
/// Handlers must be `Send + Sync`: the engine itself is synchronous and
/// stateless per call, and embedding applications routinely share one
/// handler across request threads.
pub trait Handler: Send + Sync {
    /// Handle one method invocation.
    ///
    /// # Errors
    ///
    /// Returns the wire-format error to embed in the response. Protocol
    /// errors (method lookup, parameter shape) are the engine's business and
    /// have already been handled by the time this is called.
    fn call(&self, method: &str, params: Option<&Params>) -> Result<Value, ErrorObject>;

    /// Handle a validated sub-batch in one invocation.
    ///
    /// Must return exactly one outcome per element of `calls`, in the same
    /// order. The default maps [`Handler::call`] sequentially.
    fn call_batch(&self, calls: &[&Call]) -> Vec<Result<Value, ErrorObject>> {
        calls
            .iter()
            .map(|call| self.call(call.method(), call.params()))
            .collect()
    }
}

/// Wrapper that adapts a plain function into a [`Handler`].
struct FnHandler<F>
where
    F: Fn(&str, Option<&Params>) -> Result<Value, ErrorObject> + Send + Sync,
{
    func: F,
}

impl<F> Handler for FnHandler<F>
where
    F: Fn(&str, Option<&Params>) -> Result<Value, ErrorObject> + Send + Sync,
{
    fn call(&self, method: &str, params: Option<&Params>) -> Result<Value, ErrorObject> {
        (self.func)(method, params)
    }
}

/// Create a handler from a function.
///
/// The simplest way to wire application logic into the engine: one function
/// dispatching on the method name.
pub fn from_fn<F>(func: F) -> Box<dyn Handler>
where
    F: Fn(&str, Option<&Params>) -> Result<Value, ErrorObject> + Send + Sync + 'static,
{
    Box::new(FnHandler { func })
}
