//! jpipe - a transport-agnostic JSON-RPC 2.0 request-processing pipeline
//!
//! This is the main convenience crate that re-exports the jpipe sub-crates.
//! Use this crate if you want a single dependency for the whole pipeline.
//!
//! # Architecture
//!
//! jpipe is organized into modular crates:
//!
//! - **jpipe-core**: protocol objects, parser, codec, error taxonomy
//! - **jpipe-engine**: procedure registry, validator, dispatch engine
//!
//! The pipeline is transport-agnostic: raw JSON text goes in, an
//! [`EngineOutput`] comes out - a single response, an ordered batch of
//! responses, or the explicit no-content signal for notification-only
//! input. How payloads arrive and how outputs are delivered (HTTP, stdio,
//! a message queue) is the embedding application's business.
//!
//! # Quick Start
//!
//! ```rust
//! use jpipe::{accept_all, from_fn, Engine, Procedure};
//! use serde_json::json;
//!
//! let engine = Engine::builder()
//!     .procedure("ping", Procedure::new(accept_all()))
//!     .build();
//!
//! let handler = from_fn(|_method, _params| Ok(json!("pong")));
//!
//! let output = engine.handle(
//!     r#"{"jsonrpc":"2.0","method":"ping","id":1}"#,
//!     handler.as_ref(),
//! );
//! assert_eq!(output.encode().unwrap().unwrap(),
//!            r#"{"jsonrpc":"2.0","result":"pong","id":1}"#);
//! ```

// Re-export the sub-crates under short module names
pub use jpipe_core as protocol;
pub use jpipe_engine as engine;

// Convenience re-exports of the most commonly used types
// This avoids needing to write `jpipe::engine::Engine`
pub use jpipe_core::{
    parse, BatchItem, BatchRequest, BatchResponse, Call, Error, ErrorObject, Id, Notification,
    Params, ParsedItem, Request, Response, Result,
};
pub use jpipe_engine::{
    accept_all, assemble_response, contract_fn, from_fn, Contract, Engine, EngineBuilder,
    EngineConfig, EngineOutput, FieldErrors, Handler, Procedure, ProcedureRegistry, Validator,
};
