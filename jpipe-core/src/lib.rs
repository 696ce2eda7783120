//! Core JSON-RPC 2.0 protocol objects, parser and codec for jpipe
//!
//! This crate provides the foundational types for a JSON-RPC 2.0
//! request-processing pipeline:
//!
//! - **Types**: the protocol value objects (requests, notifications,
//!   responses, batch containers)
//! - **Parser**: raw JSON text to typed objects, with per-batch-element
//!   error retention
//! - **Codec**: response-side encoding utilities
//! - **Error handling**: the fixed protocol error taxonomy
//!
//! # Architecture
//!
//! The crate is transport-agnostic - it turns bytes into typed protocol
//! objects and typed objects back into bytes, but doesn't dictate how
//! messages travel. The `jpipe-engine` crate builds on this foundation to
//! provide signature validation and dispatch orchestration.
//!
//! # Example
//!
//! ```rust
//! use jpipe_core::parser::{parse, ParsedItem};
//!
//! let parsed = parse(r#"{"jsonrpc":"2.0","method":"add","params":[1,2],"id":1}"#).unwrap();
//! match parsed {
//!     ParsedItem::Call(call) => assert_eq!(call.method(), "add"),
//!     ParsedItem::Batch(_) => unreachable!(),
//! }
//! ```

pub mod batch;
pub mod codec;
pub mod error;
pub mod parser;
pub mod types;

// Re-export the most commonly used types for convenience
pub use batch::{BatchItem, BatchRequest, BatchResponse};
pub use error::{Error, ErrorObject, Result};
pub use parser::{parse, ParsedItem};
pub use types::{Call, Id, Notification, Params, Request, Response, ResponsePayload};
