//! Batch containers for JSON-RPC requests and responses
//!
//! JSON-RPC 2.0 allows multiple calls to be sent in a single JSON array.
//! This module provides the ordered containers for both directions:
//!
//! - [`BatchRequest`]: what the parser produces from a top-level array. Each
//!   slot holds either a well-formed [`Call`] or the retained parse error for
//!   that element - one malformed element never poisons its siblings.
//! - [`BatchResponse`]: the ordered array of responses sent back.
//!
//! # Non-Emptiness
//!
//! Both containers reject empty input at construction. An empty batch on the
//! wire is a protocol-level Invalid Request, not an empty container, and an
//! empty response array must never be serialized - a batch whose members all
//! turn out to be notifications yields *no* body at all (see the engine's
//! no-content signal).

use crate::error::{Error, ErrorObject, Result};
use crate::types::{Call, Response};
use serde::Serialize;
use serde_json::Value;

/// One positional element of a batch request
///
/// A batch element is parsed independently of its siblings; if it fails, the
/// error is kept in place so the response array can be reconstructed in the
/// original order.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchItem {
    /// A well-formed request or notification
    Call(Call),
    /// The element failed structural parsing; the error carries
    /// `{index, details}` data and any id that could be extracted
    Invalid(ErrorObject),
}

impl BatchItem {
    /// The contained call, when this element parsed cleanly.
    pub fn as_call(&self) -> Option<&Call> {
        match self {
            BatchItem::Call(call) => Some(call),
            BatchItem::Invalid(_) => None,
        }
    }

    /// The retained parse error, when this element was malformed.
    pub fn as_invalid(&self) -> Option<&ErrorObject> {
        match self {
            BatchItem::Invalid(error) => Some(error),
            BatchItem::Call(_) => None,
        }
    }
}

/// An ordered, non-empty batch of requests, notifications, and retained
/// per-element parse errors
///
/// # Examples
///
/// ```rust
/// use jpipe_core::{BatchItem, BatchRequest, Call, Id, Request};
///
/// let items = vec![
///     BatchItem::Call(Call::from(Request::new("ping", None, Id::Number(1)).unwrap())),
/// ];
/// let batch = BatchRequest::new(items).unwrap();
/// assert_eq!(batch.len(), 1);
///
/// assert!(BatchRequest::new(vec![]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRequest {
    items: Vec<BatchItem>,
}

impl BatchRequest {
    /// Create a batch from its elements.
    ///
    /// # Errors
    ///
    /// Returns the protocol-level Invalid Request error when `items` is
    /// empty.
    pub fn new(items: Vec<BatchItem>) -> Result<Self> {
        if items.is_empty() {
            return Err(Error::Rpc(ErrorObject::invalid_request(
                "Batch cannot be empty",
            )));
        }
        Ok(Self { items })
    }

    /// Number of elements in the batch.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false - empty batches cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Element at `index`, in original wire order.
    pub fn get(&self, index: usize) -> Option<&BatchItem> {
        self.items.get(index)
    }

    /// All elements, in original wire order.
    pub fn items(&self) -> &[BatchItem] {
        &self.items
    }

    /// Iterate over all elements.
    pub fn iter(&self) -> std::slice::Iter<'_, BatchItem> {
        self.items.iter()
    }

    /// Iterate over the well-formed calls only, skipping invalid elements.
    pub fn calls(&self) -> impl Iterator<Item = &Call> {
        self.items.iter().filter_map(BatchItem::as_call)
    }

    /// Count of elements that failed parsing.
    pub fn invalid_count(&self) -> usize {
        self.items.iter().filter(|i| i.as_invalid().is_some()).count()
    }

    /// Invoke `callback` once per contained call and collect responses.
    ///
    /// Invalid elements are excluded from iteration. A [`Response`] is
    /// emitted only for requests, paired with the originating request's id;
    /// notifications are still invoked but contribute no response even when
    /// the callback returns a value. Responses follow invocation order -
    /// strict original-order reconstruction across invalid elements is the
    /// engine's job, not this helper's.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jpipe_core::{BatchItem, BatchRequest, Call, Id, Notification, Request};
    /// use serde_json::json;
    ///
    /// let batch = BatchRequest::new(vec![
    ///     BatchItem::Call(Call::from(Request::new("ping", None, Id::Number(1)).unwrap())),
    ///     BatchItem::Call(Call::from(Notification::new("log", None).unwrap())),
    /// ]).unwrap();
    ///
    /// let responses = batch.process_each(|call| Ok(json!({"method": call.method()})));
    /// assert_eq!(responses.len(), 1); // the notification is suppressed
    /// ```
    pub fn process_each<F>(&self, mut callback: F) -> Vec<Response>
    where
        F: FnMut(&Call) -> std::result::Result<Value, ErrorObject>,
    {
        let mut responses = Vec::new();
        for call in self.calls() {
            let outcome = callback(call);
            if let Some(id) = call.request_id() {
                let response = match outcome {
                    Ok(result) => Response::success(result, id.clone()),
                    Err(error) => Response::error(error, id.clone()),
                };
                responses.push(response);
            }
        }
        responses
    }
}

impl<'a> IntoIterator for &'a BatchRequest {
    type Item = &'a BatchItem;
    type IntoIter = std::slice::Iter<'a, BatchItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// An ordered, non-empty array of responses to a batch request
///
/// Order correlates with the originating batch's non-notification elements.
/// Serializes transparently as the bare JSON array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BatchResponse {
    responses: Vec<Response>,
}

impl BatchResponse {
    /// Create a batch response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when `responses` is empty - an
    /// all-notifications batch must yield no content, never `[]`.
    pub fn new(responses: Vec<Response>) -> Result<Self> {
        if responses.is_empty() {
            return Err(Error::InvalidArgument(
                "Batch response cannot be empty".to_string(),
            ));
        }
        Ok(Self { responses })
    }

    /// Number of responses.
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    /// Always false - empty batch responses cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Response at `index`.
    pub fn get(&self, index: usize) -> Option<&Response> {
        self.responses.get(index)
    }

    /// All responses, in order.
    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    /// Iterate over the responses.
    pub fn iter(&self) -> std::slice::Iter<'_, Response> {
        self.responses.iter()
    }
}

impl<'a> IntoIterator for &'a BatchResponse {
    type Item = &'a Response;
    type IntoIter = std::slice::Iter<'a, Response>;

    fn into_iter(self) -> Self::IntoIter {
        self.responses.iter()
    }
}
