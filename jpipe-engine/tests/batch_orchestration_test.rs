//! Batch reconciliation tests
//!
//! Mixed parse errors, validation errors, application outcomes and
//! notifications inside one array: every non-notification element produces
//! exactly one response at its original position, and notification-only
//! batches produce no output at all.

mod common;

use common::{calculator_engine, calculator_handler};
use jpipe_core::{ErrorObject, Id, Params};
use jpipe_engine::from_fn;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_all_notifications_batch_is_no_content() {
    let engine = calculator_engine();
    let handler = calculator_handler();

    let payload = r#"[
        {"jsonrpc":"2.0","method":"log","params":{"message":"a"}},
        {"jsonrpc":"2.0","method":"log","params":{"message":"b"}}
    ]"#;
    let output = engine.handle(payload, handler.as_ref());

    assert!(output.is_no_content());
    assert_eq!(output.encode().unwrap(), None);
}

#[test]
fn test_all_parse_errors_batch_dispatches_nothing() {
    let engine = calculator_engine();
    let dispatched = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&dispatched);
    let handler = from_fn(move |_method, _params: Option<&Params>| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(json!(null))
    });

    let payload = r#"[{"bad":1},{"worse":2}]"#;
    let output = engine.handle(payload, handler.as_ref());

    let batch = output.as_batch().unwrap();
    assert_eq!(batch.len(), 2);
    for response in batch.iter() {
        assert_eq!(response.error_object().unwrap().code, -32600);
        assert_eq!(response.id(), &Id::Null);
    }
    assert_eq!(dispatched.load(Ordering::SeqCst), 0);
}

#[test]
fn test_single_malformed_element_does_not_poison_siblings() {
    let engine = calculator_engine();
    let handler = calculator_handler();

    let payload = r#"[
        {"jsonrpc":"2.0","method":"add","params":[1,1],"id":1},
        {"method":"add","id":2},
        {"jsonrpc":"2.0","method":"add","params":[2,2],"id":3}
    ]"#;
    let output = engine.handle(payload, handler.as_ref());

    let batch = output.as_batch().unwrap();
    assert_eq!(batch.len(), 3);

    assert_eq!(batch.get(0).unwrap().result(), Some(&json!(2)));

    let invalid = batch.get(1).unwrap();
    assert_eq!(invalid.id(), &Id::Number(2)); // best-effort id echo
    let error = invalid.error_object().unwrap();
    assert_eq!(error.code, -32600);
    let data = error.data.as_ref().unwrap();
    assert_eq!(data["index"], 1);
    assert_eq!(data["details"], "Missing 'jsonrpc' property");

    assert_eq!(batch.get(2).unwrap().result(), Some(&json!(4)));
}

#[test]
fn test_parse_and_validation_errors_coexist() {
    let engine = calculator_engine();
    let handler = calculator_handler();

    let payload = r#"[
        {"nonsense":true},
        {"jsonrpc":"2.0","method":"spoon","id":2},
        {"jsonrpc":"2.0","method":"add","params":{"addends":"nope"},"id":3},
        {"jsonrpc":"2.0","method":"add","params":[5,5],"id":4}
    ]"#;
    let output = engine.handle(payload, handler.as_ref());

    let batch = output.as_batch().unwrap();
    assert_eq!(batch.len(), 4);
    assert_eq!(batch.get(0).unwrap().error_object().unwrap().code, -32600);
    assert_eq!(batch.get(1).unwrap().error_object().unwrap().code, -32601);
    assert_eq!(batch.get(2).unwrap().error_object().unwrap().code, -32602);
    assert_eq!(batch.get(3).unwrap().result(), Some(&json!(10)));
}

#[test]
fn test_order_preserved_with_interleaved_notifications() {
    let engine = calculator_engine();
    let handler = calculator_handler();

    // Six elements, two of them notifications: exactly four responses, in
    // original order, each correlated to its originating id.
    let payload = r#"[
        {"jsonrpc":"2.0","method":"add","params":[1],"id":"a"},
        {"jsonrpc":"2.0","method":"log"},
        {"jsonrpc":"2.0","method":"spoon","id":"b"},
        {"jsonrpc":"2.0","method":"add","params":[2],"id":"c"},
        {"jsonrpc":"2.0","method":"log","params":{"message":"x"}},
        {"jsonrpc":"2.0","method":"add","params":[3],"id":"d"}
    ]"#;
    let output = engine.handle(payload, handler.as_ref());

    let batch = output.as_batch().unwrap();
    assert_eq!(batch.len(), 4);

    let ids: Vec<&Id> = batch.iter().map(|response| response.id()).collect();
    assert_eq!(
        ids,
        vec![
            &Id::String("a".into()),
            &Id::String("b".into()),
            &Id::String("c".into()),
            &Id::String("d".into()),
        ]
    );

    assert_eq!(batch.get(0).unwrap().result(), Some(&json!(1)));
    assert!(batch.get(1).unwrap().is_error());
    assert_eq!(batch.get(2).unwrap().result(), Some(&json!(2)));
    assert_eq!(batch.get(3).unwrap().result(), Some(&json!(3)));
}

#[test]
fn test_invalid_notification_in_batch_is_suppressed() {
    let engine = calculator_engine();
    let handler = calculator_handler();

    // The unregistered-method notification fails validation but contributes
    // no response; the sibling request proceeds.
    let payload = r#"[
        {"jsonrpc":"2.0","method":"spoon"},
        {"jsonrpc":"2.0","method":"add","params":[4,4],"id":1}
    ]"#;
    let output = engine.handle(payload, handler.as_ref());

    let batch = output.as_batch().unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch.get(0).unwrap().id(), &Id::Number(1));
    assert_eq!(batch.get(0).unwrap().result(), Some(&json!(8)));
}

#[test]
fn test_invalid_notifications_only_batch_is_no_content() {
    let engine = calculator_engine();
    let handler = calculator_handler();

    let payload = r#"[
        {"jsonrpc":"2.0","method":"spoon"},
        {"jsonrpc":"2.0","method":"fork"}
    ]"#;
    let output = engine.handle(payload, handler.as_ref());
    assert!(output.is_no_content());
}

#[test]
fn test_notifications_are_dispatched_but_suppressed() {
    let engine = calculator_engine();
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    let handler = from_fn(move |method, _params: Option<&Params>| {
        if method == "log" {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        Ok(json!("ok"))
    });

    let payload = r#"[
        {"jsonrpc":"2.0","method":"log"},
        {"jsonrpc":"2.0","method":"add","params":[1,2],"id":1}
    ]"#;
    let output = engine.handle(payload, handler.as_ref());

    // The notification reached the handler even though it produced no
    // response.
    assert_eq!(seen.load(Ordering::SeqCst), 1);
    assert_eq!(output.as_batch().unwrap().len(), 1);
}

#[test]
fn test_handler_error_outcome_for_notification_is_discarded() {
    let engine = calculator_engine();
    let handler = from_fn(|method, _params: Option<&Params>| {
        if method == "log" {
            Err(ErrorObject::new(-32000, "logging backend down"))
        } else {
            Ok(json!("ok"))
        }
    });

    let payload = r#"[
        {"jsonrpc":"2.0","method":"log"},
        {"jsonrpc":"2.0","method":"add","params":[1],"id":1}
    ]"#;
    let output = engine.handle(payload, handler.as_ref());

    // Only the request's response survives; the notification's error is
    // dropped rather than surfaced.
    let batch = output.as_batch().unwrap();
    assert_eq!(batch.len(), 1);
    assert!(batch.get(0).unwrap().is_success());
}

#[test]
fn test_large_batch_round_trips_in_order() {
    let engine = calculator_engine();
    let handler = calculator_handler();

    let elements: Vec<String> = (0..50)
        .map(|i| format!(r#"{{"jsonrpc":"2.0","method":"add","params":[{i}],"id":{i}}}"#))
        .collect();
    let payload = format!("[{}]", elements.join(","));
    let output = engine.handle(&payload, handler.as_ref());

    let batch = output.as_batch().unwrap();
    assert_eq!(batch.len(), 50);
    for (i, response) in batch.iter().enumerate() {
        assert_eq!(response.id(), &Id::Number(i as i64));
        assert_eq!(response.result(), Some(&json!(i)));
    }
}
