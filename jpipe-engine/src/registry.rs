//! Procedure registry: method names mapped to parameter contracts
//!
//! The registry is the configuration surface the validator consumes. Each
//! entry - a [`Procedure`] - pairs a parameter [`Contract`] with the
//! argument-style policy for that method:
//!
//! - `allow_positional_arguments`: whether an array `params` payload is
//!   acceptable
//! - `parameter_name`: the contract's primary parameter name, used to wrap a
//!   positional array into `{parameter_name: array}` before the contract
//!   runs
//!
//! # Contracts
//!
//! A contract is an opaque validation capability: given named parameters,
//! it either accepts them or returns a map of per-field errors. The concrete
//! rule language is the application's business - the engine only needs this
//! one call.
//!
//! # Thread Safety
//!
//! The registry is populated at startup and read-mostly afterwards. It is
//! guarded by an `RwLock` so request-path lookups can proceed concurrently
//! while `reset` (a test-harness operation, never on the request path) takes
//! the exclusive lock.
//!
//! # Examples
//!
//! ```rust
//! use jpipe_engine::{contract_fn, Procedure, ProcedureRegistry};
//!
//! let registry = ProcedureRegistry::new();
//! registry.register(
//!     "add",
//!     Procedure::new(contract_fn(|params| {
//!         if params.contains_key("addends") {
//!             Ok(())
//!         } else {
//!             let mut errors = serde_json::Map::new();
//!             errors.insert("addends".into(), serde_json::json!(["is missing"]));
//!             Err(errors)
//!         }
//!     }))
//!     .with_positional_arguments("addends"),
//! );
//!
//! assert!(registry.contains("add"));
//! ```

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Per-field validation errors reported by a contract.
///
/// Keys are parameter names; values are whatever error detail the contract
/// produces for that field (typically an array of message strings).
pub type FieldErrors = Map<String, Value>;

/// An opaque parameter-validation capability.
///
/// Implementations receive the prepared named parameters (positional arrays
/// are already wrapped by the validator) and either accept them or report a
/// field-error map.
pub trait Contract: Send + Sync {
    /// Validate the prepared parameters.
    ///
    /// # Errors
    ///
    /// Returns the per-field error map when validation fails.
    fn validate(&self, params: &Map<String, Value>) -> Result<(), FieldErrors>;
}

/// Wrapper that adapts a plain function into a [`Contract`].
struct FnContract<F>
where
    F: Fn(&Map<String, Value>) -> Result<(), FieldErrors> + Send + Sync,
{
    func: F,
}

impl<F> Contract for FnContract<F>
where
    F: Fn(&Map<String, Value>) -> Result<(), FieldErrors> + Send + Sync,
{
    fn validate(&self, params: &Map<String, Value>) -> Result<(), FieldErrors> {
        (self.func)(params)
    }
}

/// Create a contract from a closure.
///
/// # Examples
///
/// ```rust
/// use jpipe_engine::contract_fn;
///
/// // A contract that accepts anything
/// let contract = contract_fn(|_params| Ok(()));
/// ```
pub fn contract_fn<F>(func: F) -> Arc<dyn Contract>
where
    F: Fn(&Map<String, Value>) -> Result<(), FieldErrors> + Send + Sync + 'static,
{
    Arc::new(FnContract { func })
}

/// A contract that accepts any parameters.
///
/// Useful for methods whose handler does its own checking, and in tests.
pub fn accept_all() -> Arc<dyn Contract> {
    contract_fn(|_| Ok(()))
}

/// A registered method: its contract plus argument-style policy.
#[derive(Clone)]
pub struct Procedure {
    /// Whether an array `params` payload is acceptable for this method
    pub allow_positional_arguments: bool,
    /// The parameter contract run against prepared named params
    pub contract: Arc<dyn Contract>,
    /// Name of the contract's first declared parameter; a positional array
    /// is wrapped as `{parameter_name: array}` before the contract runs
    pub parameter_name: Option<String>,
}

impl Procedure {
    /// Create a named-arguments-only procedure.
    pub fn new(contract: Arc<dyn Contract>) -> Self {
        Self {
            allow_positional_arguments: false,
            contract,
            parameter_name: None,
        }
    }

    /// Allow positional arguments, wrapped under `parameter_name`.
    pub fn with_positional_arguments(mut self, parameter_name: impl Into<String>) -> Self {
        self.allow_positional_arguments = true;
        self.parameter_name = Some(parameter_name.into());
        self
    }

    /// Allow positional arguments without a wrapping name.
    ///
    /// The array payload then validates as `{}` - the contract sees no
    /// parameters and reports whatever missing-required errors it defines.
    pub fn with_unnamed_positional_arguments(mut self) -> Self {
        self.allow_positional_arguments = true;
        self.parameter_name = None;
        self
    }
}

impl std::fmt::Debug for Procedure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Procedure")
            .field("allow_positional_arguments", &self.allow_positional_arguments)
            .field("parameter_name", &self.parameter_name)
            .finish_non_exhaustive()
    }
}

/// Registry mapping method names to procedures.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
#[derive(Default)]
pub struct ProcedureRegistry {
    procedures: RwLock<HashMap<String, Arc<Procedure>>>,
}

impl ProcedureRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            procedures: RwLock::new(HashMap::new()),
        }
    }

    /// Register a procedure for a method, replacing any existing entry.
    pub fn register(&self, method: impl Into<String>, procedure: Procedure) {
        let mut procedures = self
            .procedures
            .write()
            .expect("procedure registry lock poisoned");
        procedures.insert(method.into(), Arc::new(procedure));
    }

    /// Look up the procedure for a method.
    pub fn lookup(&self, method: &str) -> Option<Arc<Procedure>> {
        let procedures = self
            .procedures
            .read()
            .expect("procedure registry lock poisoned");
        procedures.get(method).cloned()
    }

    /// Check whether a method is registered.
    pub fn contains(&self, method: &str) -> bool {
        let procedures = self
            .procedures
            .read()
            .expect("procedure registry lock poisoned");
        procedures.contains_key(method)
    }

    /// All registered method names.
    pub fn method_names(&self) -> Vec<String> {
        let procedures = self
            .procedures
            .read()
            .expect("procedure registry lock poisoned");
        procedures.keys().cloned().collect()
    }

    /// Remove every registered procedure.
    ///
    /// Test-harness operation for isolation between cases; never called on
    /// the request path.
    pub fn reset(&self) {
        let mut procedures = self
            .procedures
            .write()
            .expect("procedure registry lock poisoned");
        procedures.clear();
    }
}
