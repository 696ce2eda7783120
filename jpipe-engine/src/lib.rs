//! Procedure registry, validator and dispatch engine for jpipe
//!
//! This crate is the processing half of the jpipe pipeline. `jpipe-core`
//! turns bytes into typed protocol objects; this crate decides what to do
//! with them:
//!
//! - **Registry**: method names mapped to parameter contracts and
//!   argument-style policy
//! - **Validator**: signature-driven parameter checking with
//!   positional/named reconciliation
//! - **Handler**: the seam where application logic plugs in
//! - **Engine**: batch orchestration - parse errors, validation errors,
//!   application outcomes and notifications reconciled into one ordered
//!   output
//!
//! # Quick Start
//!
//! ```rust
//! use jpipe_engine::{contract_fn, from_fn, Engine, Procedure};
//! use jpipe_core::{ErrorObject, Params};
//! use serde_json::{json, Value};
//!
//! // A contract for `add`: requires an array of numbers under "addends".
//! let addends = contract_fn(|params| {
//!     let ok = params
//!         .get("addends")
//!         .and_then(Value::as_array)
//!         .map(|v| v.iter().all(Value::is_number))
//!         .unwrap_or(false);
//!     if ok {
//!         Ok(())
//!     } else {
//!         let mut errors = serde_json::Map::new();
//!         errors.insert("addends".into(), json!(["must be an array of numbers"]));
//!         Err(errors)
//!     }
//! });
//!
//! let engine = Engine::builder()
//!     .procedure("add", Procedure::new(addends).with_positional_arguments("addends"))
//!     .build();
//!
//! // The handler sees the params exactly as the client sent them; the
//! // positional-to-named wrapping above is for contract validation only.
//! let handler = from_fn(|method, params: Option<&Params>| match method {
//!     "add" => {
//!         let addends = match params {
//!             Some(Params::Array(values)) => values.clone(),
//!             Some(Params::Object(map)) => map
//!                 .get("addends")
//!                 .and_then(Value::as_array)
//!                 .cloned()
//!                 .unwrap_or_default(),
//!             None => Vec::new(),
//!         };
//!         Ok(json!(addends.iter().filter_map(Value::as_i64).sum::<i64>()))
//!     }
//!     _ => Err(ErrorObject::new(-32000, "unhandled method")),
//! });
//!
//! let output = engine.handle(
//!     r#"{"jsonrpc":"2.0","method":"add","params":[1,2,3,4],"id":1}"#,
//!     handler.as_ref(),
//! );
//! assert_eq!(output.as_single().unwrap().result(), Some(&json!(10)));
//! ```

pub mod engine;
pub mod handler;
pub mod registry;
pub mod validator;

// Re-export the most commonly used types for convenience
pub use engine::{assemble_response, Engine, EngineBuilder, EngineConfig, EngineOutput};
pub use handler::{from_fn, Handler};
pub use registry::{accept_all, contract_fn, Contract, FieldErrors, Procedure, ProcedureRegistry};
pub use validator::Validator;
