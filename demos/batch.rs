//! Batch example: mixed outcomes reconciled into one ordered response array

use jpipe::{accept_all, contract_fn, from_fn, Engine, ErrorObject, Params, Procedure};
use serde_json::{json, Map, Value};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let divide_contract = contract_fn(|params| {
        let mut errors = Map::new();
        for field in ["dividend", "divisor"] {
            if params.get(field).map(Value::is_number) != Some(true) {
                errors.insert(field.into(), json!(["must be a number"]));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    });

    let engine = Engine::builder()
        .procedure("divide", Procedure::new(divide_contract))
        .procedure("log", Procedure::new(accept_all()))
        .max_batch_size(16)
        .build();

    let handler = from_fn(|method, params: Option<&Params>| match method {
        "divide" => {
            let map = match params {
                Some(Params::Object(map)) => map.clone(),
                _ => Map::new(),
            };
            let dividend = map.get("dividend").and_then(Value::as_i64).unwrap_or(0);
            let divisor = map.get("divisor").and_then(Value::as_i64).unwrap_or(0);
            if divisor == 0 {
                // Application-level failure, passed through verbatim
                Err(ErrorObject::new(-32000, "Cannot divide by zero"))
            } else {
                Ok(json!(dividend / divisor))
            }
        }
        "log" => Ok(json!({"logged": true})),
        other => Err(ErrorObject::new(-32000, format!("unhandled method: {other}"))),
    });

    // One array, five fates: success, application error, method not found,
    // a malformed element, and a notification that yields no response slot.
    let payload = r#"[
        {"jsonrpc":"2.0","method":"divide","params":{"dividend":10,"divisor":2},"id":1},
        {"jsonrpc":"2.0","method":"divide","params":{"dividend":1,"divisor":0},"id":2},
        {"jsonrpc":"2.0","method":"spoon","id":3},
        {"method":"divide","id":4},
        {"jsonrpc":"2.0","method":"log","params":{"message":"done"}}
    ]"#;

    println!("--> {payload}\n");
    match engine.handle(payload, handler.as_ref()).encode().unwrap() {
        Some(body) => {
            let pretty: Value = serde_json::from_str(&body).unwrap();
            println!("<-- {}", serde_json::to_string_pretty(&pretty).unwrap());
        }
        None => println!("<-- (no content)"),
    }

    // A batch of nothing but notifications produces no body at all.
    let notifications =
        r#"[{"jsonrpc":"2.0","method":"log"},{"jsonrpc":"2.0","method":"log"}]"#;
    println!("\n--> {notifications}");
    match engine.handle(notifications, handler.as_ref()).encode().unwrap() {
        Some(body) => println!("<-- {body}"),
        None => println!("<-- (no content)"),
    }
}
