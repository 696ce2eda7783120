//! Engine: batch orchestration and response assembly
//!
//! The engine ties the pipeline together: parse the payload, validate each
//! call against the registry, dispatch the surviving calls to the
//! application, and assemble one correctly-ordered output. Most of the
//! subtlety is in batches, where parse errors, validation errors,
//! application outcomes, and notifications coexist in one array:
//!
//! - every non-notification element produces exactly one response, at its
//!   original position
//! - one element's failure never affects its siblings
//! - notifications produce no response - on success *or* failure - and a
//!   batch of only notifications produces no output at all, signalled as
//!   [`EngineOutput::NoContent`] rather than an empty array
//!
//! # Slot Bookkeeping
//!
//! Reconciliation runs over an explicit per-position sum type rather than a
//! nullable response array: each slot is `Pending` until it becomes
//! `Errored`, `Succeeded`, or `Suppressed` (notification). Compaction at the
//! end drops suppressed slots and keeps original order for the rest.

use crate::handler::Handler;
use crate::registry::{Procedure, ProcedureRegistry};
use crate::validator::Validator;
use jpipe_core::{
    codec, parser, BatchItem, BatchRequest, BatchResponse, Call, ErrorObject, Id, ParsedItem,
    Response, Result,
};
use serde_json::Value;
use std::sync::Arc;

/// Engine configuration
///
/// Defaults are production-safe: no internal-error disclosure, warn-level
/// logging for notification validation failures, no batch size cap.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of elements accepted in one batch (None = unlimited).
    /// Oversized batches are answered with a single Invalid Request error.
    pub max_batch_size: Option<usize>,
    /// Attach diagnostic detail to Internal error responses. Keep off in
    /// production; the detail always goes to the logs.
    pub expose_internal_errors: bool,
    /// Log validation failures for notifications, which never produce an
    /// error response of their own.
    pub log_validation_failures: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_batch_size: None,
            expose_internal_errors: false,
            log_validation_failures: true,
        }
    }
}

/// The engine's answer for one incoming payload.
///
/// `NoContent` is a real signal, not an absence: the transport must reply
/// with its no-body equivalent (HTTP 204 or similar), never with `[]` or
/// `null`.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOutput {
    /// A single response (single request in, or top-level protocol error)
    Single(Response),
    /// An ordered batch of responses
    Batch(BatchResponse),
    /// Nothing to send: the input was a notification, or a batch whose
    /// members all turned out to be notifications
    NoContent,
}

impl EngineOutput {
    /// True for the no-content signal.
    pub fn is_no_content(&self) -> bool {
        matches!(self, EngineOutput::NoContent)
    }

    /// The single response, if that is what this output is.
    pub fn as_single(&self) -> Option<&Response> {
        match self {
            EngineOutput::Single(response) => Some(response),
            _ => None,
        }
    }

    /// The batch of responses, if that is what this output is.
    pub fn as_batch(&self) -> Option<&BatchResponse> {
        match self {
            EngineOutput::Batch(batch) => Some(batch),
            _ => None,
        }
    }

    /// Serialize for the wire. `Ok(None)` means "send no body".
    pub fn encode(&self) -> Result<Option<String>> {
        match self {
            EngineOutput::Single(response) => codec::encode_response(response).map(Some),
            EngineOutput::Batch(batch) => codec::encode_batch_responses(batch).map(Some),
            EngineOutput::NoContent => Ok(None),
        }
    }
}

/// Per-position outcome during batch reconciliation.
///
/// Explicit states instead of `Option<Response>` sentinels: `Suppressed`
/// (notification, no response ever) and `Pending` (not yet decided) are
/// different things, and conflating them is how off-by-one reconciliation
/// bugs happen.
#[derive(Debug)]
enum Slot {
    /// No outcome assigned yet
    Pending,
    /// A parse or validation error owns this position
    Errored(ErrorObject),
    /// Dispatch completed and produced this response
    Succeeded(Response),
    /// A notification: this position contributes no response
    Suppressed,
}

/// The protocol engine: parse, validate, dispatch, assemble.
///
/// Stateless per call - the only shared state is the read-mostly procedure
/// registry. One engine can serve any number of concurrent invocations.
///
/// # Examples
///
/// ```rust
/// use jpipe_engine::{accept_all, from_fn, Engine, Procedure};
/// use serde_json::json;
///
/// let engine = Engine::builder()
///     .procedure("ping", Procedure::new(accept_all()))
///     .build();
/// let handler = from_fn(|_, _| Ok(json!("pong")));
///
/// let output = engine.handle(r#"{"jsonrpc":"2.0","method":"ping","id":1}"#, handler.as_ref());
/// assert_eq!(output.as_single().unwrap().result(), Some(&json!("pong")));
/// ```
pub struct Engine {
    registry: Arc<ProcedureRegistry>,
    validator: Validator,
    config: EngineConfig,
}

impl Engine {
    /// Create an engine over `registry` with `config`.
    pub fn new(registry: Arc<ProcedureRegistry>, config: EngineConfig) -> Self {
        let validator = Validator::new(Arc::clone(&registry))
            .expose_internal_errors(config.expose_internal_errors);
        Self {
            registry,
            validator,
            config,
        }
    }

    /// Start building an engine.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// The procedure registry this engine validates against.
    pub fn registry(&self) -> &Arc<ProcedureRegistry> {
        &self.registry
    }

    /// Process one raw payload end to end.
    ///
    /// Never fails: every protocol error becomes a response carrying the
    /// best-available id (null when none could be determined).
    #[tracing::instrument(skip(self, raw, handler), fields(payload_len = raw.len()))]
    pub fn handle(&self, raw: &str, handler: &dyn Handler) -> EngineOutput {
        match parser::parse(raw) {
            Ok(parsed) => self.handle_parsed(parsed, handler),
            Err(error) => {
                tracing::debug!(code = error.code, "rejecting unparseable payload");
                EngineOutput::Single(response_for_error(error))
            }
        }
    }

    /// Process an already-parsed item.
    pub fn handle_parsed(&self, parsed: ParsedItem, handler: &dyn Handler) -> EngineOutput {
        match parsed {
            ParsedItem::Call(call) => match self.process_call(&call, handler) {
                Some(response) => EngineOutput::Single(response),
                None => EngineOutput::NoContent,
            },
            ParsedItem::Batch(batch) => match self.process_batch(&batch, handler) {
                Some(responses) => EngineOutput::Batch(responses),
                None => EngineOutput::NoContent,
            },
        }
    }

    /// Validate and dispatch a single call.
    ///
    /// Returns `None` for notifications, which never produce a response.
    pub fn process_call(&self, call: &Call, handler: &dyn Handler) -> Option<Response> {
        if let Some(error) = self.validator.validate_call(call) {
            if call.request_id().is_none() {
                if self.config.log_validation_failures {
                    tracing::warn!(
                        method = call.method(),
                        code = error.code,
                        "validation failed for notification; no response emitted"
                    );
                }
                return None;
            }
            return Some(response_for_error(error));
        }

        let outcome = handler.call(call.method(), call.params());
        if call.is_notification() {
            if let Err(error) = &outcome {
                tracing::debug!(
                    method = call.method(),
                    code = error.code,
                    "discarding error outcome for notification"
                );
            }
        }
        assemble_response(call, outcome)
    }

    /// Reconcile a batch into one ordered response array.
    ///
    /// Returns `None` when no element produced a response (all
    /// notifications) - the caller turns that into the no-content signal.
    #[tracing::instrument(skip(self, batch, handler), fields(batch_size = batch.len()))]
    pub fn process_batch(
        &self,
        batch: &BatchRequest,
        handler: &dyn Handler,
    ) -> Option<BatchResponse> {
        if let Some(limit) = self.config.max_batch_size {
            if batch.len() > limit {
                tracing::warn!(batch_size = batch.len(), limit, "batch size exceeded");
                let error = ErrorObject::batch_size_exceeded(limit, batch.len());
                return BatchResponse::new(vec![Response::error(error, Id::Null)]).ok();
            }
        }

        let mut slots: Vec<Slot> = batch.iter().map(|_| Slot::Pending).collect();
        let mut dispatchable: Vec<(usize, &Call)> = Vec::new();

        // Partition: parse errors and validation errors claim their slots,
        // clean calls queue for dispatch with their original index.
        for (index, item) in batch.iter().enumerate() {
            match item {
                BatchItem::Invalid(error) => {
                    slots[index] = Slot::Errored(error.clone());
                }
                BatchItem::Call(call) => match self.validator.validate_call(call) {
                    Some(error) => {
                        if call.request_id().is_none() {
                            if self.config.log_validation_failures {
                                tracing::warn!(
                                    index,
                                    method = call.method(),
                                    code = error.code,
                                    "validation failed for notification in batch"
                                );
                            }
                            slots[index] = Slot::Suppressed;
                        } else {
                            slots[index] = Slot::Errored(error);
                        }
                    }
                    None => dispatchable.push((index, call)),
                },
            }
        }

        if !dispatchable.is_empty() {
            // Idempotent second pass before handing the sub-batch over. The
            // registry can only have changed off the request path, so this
            // should never fire; if it does, dispatch is aborted rather than
            // run against a signature we no longer trust.
            let revalidation_failed = dispatchable
                .iter()
                .any(|(_, call)| self.validator.validate_call(call).is_some());

            if revalidation_failed {
                tracing::warn!("revalidation before dispatch reported errors; dispatch aborted");
                for (index, _) in &dispatchable {
                    slots[*index] = Slot::Suppressed;
                }
            } else {
                let calls: Vec<&Call> = dispatchable.iter().map(|(_, call)| *call).collect();
                let outcomes = handler.call_batch(&calls);
                if outcomes.len() != calls.len() {
                    tracing::warn!(
                        expected = calls.len(),
                        actual = outcomes.len(),
                        "handler returned wrong outcome count for sub-batch"
                    );
                }

                let mut outcomes = outcomes.into_iter();
                for (index, call) in &dispatchable {
                    let outcome = outcomes
                        .next()
                        .unwrap_or_else(|| Err(ErrorObject::internal_error(None)));
                    slots[*index] = match assemble_response(call, outcome) {
                        Some(response) => Slot::Succeeded(response),
                        None => Slot::Suppressed,
                    };
                }
            }
        }

        // Compact: suppressed slots vanish, everything else keeps original
        // relative order.
        let mut responses = Vec::new();
        for slot in slots {
            match slot {
                Slot::Errored(error) => responses.push(response_for_error(error)),
                Slot::Succeeded(response) => responses.push(response),
                Slot::Suppressed | Slot::Pending => {}
            }
        }

        tracing::debug!(response_count = responses.len(), "batch processing completed");
        if responses.is_empty() {
            None
        } else {
            BatchResponse::new(responses).ok()
        }
    }
}

/// Pair an application outcome with its originating call.
///
/// Requests get a success or error response correlated by id; notifications
/// get nothing, whatever the outcome was.
pub fn assemble_response(
    call: &Call,
    outcome: std::result::Result<Value, ErrorObject>,
) -> Option<Response> {
    let id = call.request_id()?.clone();
    Some(match outcome {
        Ok(result) => Response::success(result, id),
        Err(error) => Response::error(error, id),
    })
}

/// Build the error response for a protocol error, using the carried request
/// id when one was determined and null otherwise.
fn response_for_error(error: ErrorObject) -> Response {
    let id = error.request_id.clone().unwrap_or(Id::Null);
    Response::error(error, id)
}

/// Builder for constructing an [`Engine`]
///
/// # Examples
///
/// ```rust
/// use jpipe_engine::{accept_all, Engine, Procedure};
///
/// let engine = Engine::builder()
///     .procedure("ping", Procedure::new(accept_all()))
///     .max_batch_size(100)
///     .build();
/// assert!(engine.registry().contains("ping"));
/// ```
pub struct EngineBuilder {
    registry: Arc<ProcedureRegistry>,
    config: EngineConfig,
}

impl EngineBuilder {
    /// Create a builder with a fresh registry and default configuration.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(ProcedureRegistry::new()),
            config: EngineConfig::default(),
        }
    }

    /// Use a shared registry (replaces the builder's own, discarding any
    /// procedures registered so far).
    pub fn registry(mut self, registry: Arc<ProcedureRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Register a procedure.
    pub fn procedure(self, method: impl Into<String>, procedure: Procedure) -> Self {
        self.registry.register(method, procedure);
        self
    }

    /// Cap the number of elements accepted in one batch.
    pub fn max_batch_size(mut self, limit: usize) -> Self {
        self.config.max_batch_size = Some(limit);
        self
    }

    /// Attach diagnostic detail to Internal error responses.
    pub fn expose_internal_errors(mut self, expose: bool) -> Self {
        self.config.expose_internal_errors = expose;
        self
    }

    /// Log validation failures for notifications.
    pub fn log_validation_failures(mut self, log: bool) -> Self {
        self.config.log_validation_failures = log;
        self
    }

    /// Build the engine.
    pub fn build(self) -> Engine {
        Engine::new(self.registry, self.config)
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::from_fn;
    use crate::registry::accept_all;
    use serde_json::json;

    fn ping_engine() -> Engine {
        Engine::builder()
            .procedure("ping", Procedure::new(accept_all()))
            .build()
    }

    fn echo_handler() -> Box<dyn Handler> {
        from_fn(|method, _| Ok(json!({"method": method})))
    }

    #[test]
    fn test_single_request_success() {
        let engine = ping_engine();
        let output = engine.handle(
            r#"{"jsonrpc":"2.0","method":"ping","id":1}"#,
            echo_handler().as_ref(),
        );

        let response = output.as_single().unwrap();
        assert!(response.is_success());
        assert_eq!(response.id(), &Id::Number(1));
    }

    #[test]
    fn test_single_notification_is_no_content() {
        let engine = ping_engine();
        let output = engine.handle(
            r#"{"jsonrpc":"2.0","method":"ping"}"#,
            echo_handler().as_ref(),
        );
        assert!(output.is_no_content());
    }

    #[test]
    fn test_parse_error_yields_null_id_response() {
        let engine = ping_engine();
        let output = engine.handle("not json", echo_handler().as_ref());

        let response = output.as_single().unwrap();
        assert!(response.is_error());
        assert_eq!(response.id(), &Id::Null);
        assert_eq!(response.error_object().unwrap().code, -32700);
    }

    #[test]
    fn test_empty_batch_yields_single_error() {
        let engine = ping_engine();
        let output = engine.handle("[]", echo_handler().as_ref());

        let response = output.as_single().unwrap();
        assert_eq!(response.error_object().unwrap().code, -32600);
        assert_eq!(response.id(), &Id::Null);
    }

    #[test]
    fn test_batch_size_limit() {
        let engine = Engine::builder()
            .procedure("ping", Procedure::new(accept_all()))
            .max_batch_size(2)
            .build();

        let payload = r#"[
            {"jsonrpc":"2.0","method":"ping","id":1},
            {"jsonrpc":"2.0","method":"ping","id":2},
            {"jsonrpc":"2.0","method":"ping","id":3}
        ]"#;
        let output = engine.handle(payload, echo_handler().as_ref());

        let batch = output.as_batch().unwrap();
        assert_eq!(batch.len(), 1);
        let error = batch.get(0).unwrap().error_object().unwrap();
        assert_eq!(error.code, -32600);
        assert!(error.message.contains("Batch size limit exceeded"));
        assert_eq!(batch.get(0).unwrap().id(), &Id::Null);
    }

    #[test]
    fn test_batch_within_limit_processes_normally() {
        let engine = Engine::builder()
            .procedure("ping", Procedure::new(accept_all()))
            .max_batch_size(2)
            .build();

        let payload = r#"[
            {"jsonrpc":"2.0","method":"ping","id":1},
            {"jsonrpc":"2.0","method":"ping","id":2}
        ]"#;
        let output = engine.handle(payload, echo_handler().as_ref());
        assert_eq!(output.as_batch().unwrap().len(), 2);
    }

    #[test]
    fn test_assemble_response_suppresses_notifications() {
        use jpipe_core::Notification;

        let call = Call::from(Notification::new("log", None).unwrap());
        assert!(assemble_response(&call, Ok(json!(1))).is_none());
        assert!(assemble_response(&call, Err(ErrorObject::internal_error(None))).is_none());
    }

    #[test]
    fn test_encode_output() {
        let single = EngineOutput::Single(Response::success(json!(1), Id::Number(1)));
        assert!(single.encode().unwrap().unwrap().contains("\"result\":1"));

        assert_eq!(EngineOutput::NoContent.encode().unwrap(), None);
    }

    #[test]
    fn test_handler_outcome_count_mismatch_is_patched() {
        struct ShortHandler;
        impl Handler for ShortHandler {
            fn call(&self, _: &str, _: Option<&jpipe_core::Params>) -> std::result::Result<Value, ErrorObject> {
                Ok(json!(1))
            }
            fn call_batch(&self, _: &[&Call]) -> Vec<std::result::Result<Value, ErrorObject>> {
                vec![Ok(json!(1))] // one outcome, however many calls
            }
        }

        let engine = ping_engine();
        let payload = r#"[
            {"jsonrpc":"2.0","method":"ping","id":1},
            {"jsonrpc":"2.0","method":"ping","id":2}
        ]"#;
        let output = engine.handle(payload, &ShortHandler);

        let batch = output.as_batch().unwrap();
        assert_eq!(batch.len(), 2);
        assert!(batch.get(0).unwrap().is_success());
        let patched = batch.get(1).unwrap();
        assert!(patched.is_error());
        assert_eq!(patched.error_object().unwrap().code, -32603);
    }
}
