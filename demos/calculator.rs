//! Calculator example: registering procedures and processing single requests

use jpipe::{contract_fn, from_fn, Engine, ErrorObject, Params, Procedure};
use serde_json::{json, Map, Value};

fn build_engine() -> Engine {
    // `add` accepts positional arguments: [1,2,3] validates as
    // {"addends": [1,2,3]}.
    let addends_contract = contract_fn(|params| {
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
    });

    // `subtract` is named-only.
    let subtract_contract = contract_fn(|params| {
        let mut errors = Map::new();
        for field in ["minuend", "subtrahend"] {
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

    Engine::builder()
        .procedure(
            "add",
            Procedure::new(addends_contract).with_positional_arguments("addends"),
        )
        .procedure("subtract", Procedure::new(subtract_contract))
        .build()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let engine = build_engine();
    let handler = from_fn(|method, params: Option<&Params>| match method {
        "add" => {
            let addends = match params {
                Some(Params::Array(values)) => values.clone(),
                Some(Params::Object(map)) => map
                    .get("addends")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default(),
                None => Vec::new(),
            };
            Ok(json!(addends.iter().filter_map(Value::as_i64).sum::<i64>()))
        }
        "subtract" => {
            let map = match params {
                Some(Params::Object(map)) => map.clone(),
                _ => Map::new(),
            };
            let minuend = map.get("minuend").and_then(Value::as_i64).unwrap_or(0);
            let subtrahend = map.get("subtrahend").and_then(Value::as_i64).unwrap_or(0);
            Ok(json!(minuend - subtrahend))
        }
        other => Err(ErrorObject::new(-32000, format!("unhandled method: {other}"))),
    });

    let payloads = [
        // Positional arguments, wrapped for the contract
        r#"{"jsonrpc":"2.0","method":"add","params":[1,2,3,4],"id":1}"#,
        // Named arguments, used as-is
        r#"{"jsonrpc":"2.0","method":"subtract","params":{"minuend":42,"subtrahend":23},"id":2}"#,
        // Unregistered method
        r#"{"jsonrpc":"2.0","method":"spoon","id":3}"#,
        // Contract failure with field-level detail
        r#"{"jsonrpc":"2.0","method":"subtract","params":{"minuend":"x"},"id":4}"#,
        // Notification: no output at all
        r#"{"jsonrpc":"2.0","method":"add","params":[1,1]}"#,
        // Malformed JSON
        r#"{"jsonrpc":"2.0",..."#,
    ];

    for payload in payloads {
        println!("--> {payload}");
        match engine.handle(payload, handler.as_ref()).encode().unwrap() {
            Some(body) => println!("<-- {body}"),
            None => println!("<-- (no content)"),
        }
        println!();
    }
}
