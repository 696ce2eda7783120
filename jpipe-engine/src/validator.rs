//! Validator: signature-driven parameter checking
//!
//! The validator reconciles a call's `params` payload with the registered
//! [`Procedure`](crate::Procedure) for its method and runs the procedure's
//! contract. The outcome vocabulary is the protocol error taxonomy:
//!
//! - unregistered method → Method not found (-32601), `data {method}`
//! - wrong parameter *shape* (positional array sent to a named-only
//!   procedure) → Invalid params (-32602) with `data {method}` and no field
//!   detail - there is no positional-to-named mapping, so there is nothing
//!   per-field to say
//! - wrong parameter *values* → the contract runs and its field-error map is
//!   reported under `data {method, params}`
//! - a panicking contract → Internal error (-32603); the panic is contained
//!   so one misbehaving contract cannot take down the pipeline
//!
//! # Positional/Named Reconciliation
//!
//! When a procedure allows positional arguments, an array payload is wrapped
//! into `{parameter_name: array}` before the contract runs (or `{}` when the
//! procedure declares no parameter name). Named payloads are always accepted
//! as-is, and absent params validate as `{}` so the contract can report its
//! own missing-required errors.
//!
//! # Batch Validation
//!
//! [`Validator::validate_batch`] returns a positional outcome array - same
//! length and order as the batch, `None` in clean slots - because callers
//! correlate outcomes back to elements by index. A filtered error list would
//! lose that correlation.

use crate::registry::ProcedureRegistry;
use jpipe_core::{BatchItem, BatchRequest, Call, ErrorObject, Params};
use serde_json::{Map, Value};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Signature validator over a shared procedure registry.
#[derive(Clone)]
pub struct Validator {
    registry: Arc<ProcedureRegistry>,
    expose_internal_errors: bool,
}

impl Validator {
    /// Create a validator reading from `registry`.
    pub fn new(registry: Arc<ProcedureRegistry>) -> Self {
        Self {
            registry,
            expose_internal_errors: false,
        }
    }

    /// Attach panic detail to Internal error responses.
    ///
    /// Off by default; production configurations keep diagnostics in the
    /// logs only.
    pub fn expose_internal_errors(mut self, expose: bool) -> Self {
        self.expose_internal_errors = expose;
        self
    }

    /// The registry this validator reads from.
    pub fn registry(&self) -> &Arc<ProcedureRegistry> {
        &self.registry
    }

    /// Validate a single call.
    ///
    /// Returns `None` when the call is acceptable, otherwise the protocol
    /// error to report. The returned error carries the call's request id
    /// (absent for notifications) for response assembly.
    pub fn validate_call(&self, call: &Call) -> Option<ErrorObject> {
        let method = call.method();
        let request_id = call.request_id().cloned();

        let procedure = match self.registry.lookup(method) {
            Some(procedure) => procedure,
            None => {
                return Some(
                    ErrorObject::method_not_found(method).with_request_id_opt(request_id),
                )
            }
        };

        let prepared = match prepare_params(method, &procedure, call.params()) {
            Ok(prepared) => prepared,
            Err(error) => return Some(error.with_request_id_opt(request_id)),
        };

        let verdict = catch_unwind(AssertUnwindSafe(|| procedure.contract.validate(&prepared)));
        match verdict {
            Ok(Ok(())) => None,
            Ok(Err(fields)) => Some(
                ErrorObject::invalid_params_with_fields(method, fields)
                    .with_request_id_opt(request_id),
            ),
            Err(panic) => {
                let detail = panic_detail(panic);
                tracing::error!(method, detail = %detail, "contract panicked during validation");
                let disclosed = self.expose_internal_errors.then(|| detail);
                Some(ErrorObject::internal_error(disclosed).with_request_id_opt(request_id))
            }
        }
    }

    /// Validate every element of a batch.
    ///
    /// Returns `None` only when every element validated cleanly; otherwise
    /// an outcome array of the batch's length with `None` in clean positions
    /// and the error in failed positions. Elements that already failed
    /// parsing report their retained parse error at their position.
    pub fn validate_batch(&self, batch: &BatchRequest) -> Option<Vec<Option<ErrorObject>>> {
        let outcomes: Vec<Option<ErrorObject>> = batch
            .iter()
            .map(|item| match item {
                BatchItem::Call(call) => self.validate_call(call),
                BatchItem::Invalid(error) => Some(error.clone()),
            })
            .collect();

        if outcomes.iter().all(Option::is_none) {
            None
        } else {
            Some(outcomes)
        }
    }
}

/// Reconcile the params payload with the procedure's argument-style policy.
///
/// Produces the named-parameter map the contract will see, or the
/// shape-level Invalid params error.
fn prepare_params(
    method: &str,
    procedure: &crate::registry::Procedure,
    params: Option<&Params>,
) -> Result<Map<String, Value>, ErrorObject> {
    match params {
        // Absent params validate as an empty map; the contract reports any
        // missing-required errors itself.
        None => Ok(Map::new()),
        // Named arguments are always accepted as-is.
        Some(Params::Object(map)) => Ok(map.clone()),
        Some(Params::Array(values)) => {
            if !procedure.allow_positional_arguments {
                return Err(ErrorObject::invalid_params(method));
            }
            let mut map = Map::new();
            if let Some(name) = &procedure.parameter_name {
                map.insert(name.clone(), Value::Array(values.clone()));
            }
            Ok(map)
        }
    }
}

/// Render a caught panic payload as a loggable string.
fn panic_detail(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "contract panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{accept_all, contract_fn, Procedure};
    use jpipe_core::{Id, Notification, Request};
    use serde_json::json;

    fn addends_contract() -> Arc<dyn crate::registry::Contract> {
        contract_fn(|params| {
            let valid = params
                .get("addends")
                .and_then(Value::as_array)
                .map(|values| values.iter().all(Value::is_number))
                .unwrap_or(false);
            if valid {
                Ok(())
            } else {
                let mut errors = Map::new();
                errors.insert("addends".into(), json!(["must be an array of numbers"]));
                Err(errors)
            }
        })
    }

    fn validator_with_add() -> Validator {
        let registry = Arc::new(ProcedureRegistry::new());
        registry.register(
            "add",
            Procedure::new(addends_contract()).with_positional_arguments("addends"),
        );
        registry.register("named_only", Procedure::new(accept_all()));
        Validator::new(registry)
    }

    fn request(method: &str, params: Option<Params>) -> Call {
        Call::from(Request::new(method, params, Id::Number(1)).unwrap())
    }

    #[test]
    fn test_unregistered_method() {
        let validator = validator_with_add();
        let error = validator.validate_call(&request("spoon", None)).unwrap();

        assert_eq!(error.code, -32601);
        assert_eq!(error.data.as_ref().unwrap()["method"], "spoon");
        assert_eq!(error.request_id, Some(Id::Number(1)));
    }

    #[test]
    fn test_notification_error_has_no_request_id() {
        let validator = validator_with_add();
        let call = Call::from(Notification::new("spoon", None).unwrap());
        let error = validator.validate_call(&call).unwrap();
        assert!(error.request_id.is_none());
    }

    #[test]
    fn test_positional_array_is_wrapped_and_validates() {
        let validator = validator_with_add();
        let call = request("add", Params::from_value(json!([1, 2, 3])));
        assert!(validator.validate_call(&call).is_none());
    }

    #[test]
    fn test_named_params_validate_identically() {
        let validator = validator_with_add();
        let call = request("add", Params::from_value(json!({"addends": [1, 2, 3]})));
        assert!(validator.validate_call(&call).is_none());
    }

    #[test]
    fn test_absent_params_become_empty_map() {
        // The contract then reports its own missing-required error.
        let validator = validator_with_add();
        let error = validator.validate_call(&request("add", None)).unwrap();

        assert_eq!(error.code, -32602);
        let data = error.data.unwrap();
        assert_eq!(data["method"], "add");
        assert_eq!(data["params"]["addends"][0], "must be an array of numbers");
    }

    #[test]
    fn test_positional_rejected_for_named_only_procedure() {
        let validator = validator_with_add();
        let call = request("named_only", Params::from_value(json!([1, 2])));
        let error = validator.validate_call(&call).unwrap();

        // Shape-level failure: no field detail, just the method.
        assert_eq!(error.code, -32602);
        assert_eq!(error.data, Some(json!({"method": "named_only"})));
    }

    #[test]
    fn test_contract_value_failure_reports_fields() {
        let validator = validator_with_add();
        let call = request("add", Params::from_value(json!({"addends": "nope"})));
        let error = validator.validate_call(&call).unwrap();

        assert_eq!(error.code, -32602);
        assert_eq!(
            error.data.unwrap()["params"]["addends"][0],
            "must be an array of numbers"
        );
    }

    #[test]
    fn test_panicking_contract_is_contained() {
        let registry = Arc::new(ProcedureRegistry::new());
        registry.register(
            "explode",
            Procedure::new(contract_fn(|_| panic!("boom"))),
        );
        let validator = Validator::new(registry);

        let error = validator.validate_call(&request("explode", None)).unwrap();
        assert_eq!(error.code, -32603);
        assert!(error.data.is_none());
    }

    #[test]
    fn test_panicking_contract_detail_disclosure() {
        let registry = Arc::new(ProcedureRegistry::new());
        registry.register(
            "explode",
            Procedure::new(contract_fn(|_| panic!("boom"))),
        );
        let validator = Validator::new(registry).expose_internal_errors(true);

        let error = validator.validate_call(&request("explode", None)).unwrap();
        assert_eq!(error.code, -32603);
        assert_eq!(error.data, Some(json!("boom")));
    }

    #[test]
    fn test_validate_batch_positional_outcomes() {
        use jpipe_core::{BatchItem, BatchRequest};

        let validator = validator_with_add();
        let batch = BatchRequest::new(vec![
            BatchItem::Call(request("add", Params::from_value(json!([1])))),
            BatchItem::Call(request("spoon", None)),
            BatchItem::Invalid(ErrorObject::invalid_request_in_batch(2, "bad")),
            BatchItem::Call(request("add", Params::from_value(json!([2])))),
        ])
        .unwrap();

        let outcomes = validator.validate_batch(&batch).unwrap();
        assert_eq!(outcomes.len(), 4);
        assert!(outcomes[0].is_none());
        assert_eq!(outcomes[1].as_ref().unwrap().code, -32601);
        assert_eq!(outcomes[2].as_ref().unwrap().code, -32600);
        assert!(outcomes[3].is_none());
    }

    #[test]
    fn test_validate_batch_all_clean_is_none() {
        let validator = validator_with_add();
        let batch = jpipe_core::BatchRequest::new(vec![jpipe_core::BatchItem::Call(request(
            "add",
            Params::from_value(json!([1, 2])),
        ))])
        .unwrap();

        assert!(validator.validate_batch(&batch).is_none());
    }
}
