//! Shared fixtures for engine integration tests
//!
//! A small calculator application: `add` (positional or named, sums its
//! addends), `divide` (named-only, fails at the application level on zero
//! divisors), and `log` (accepts anything, typically used as a
//! notification).

use jpipe_core::{ErrorObject, Params};
use jpipe_engine::{accept_all, contract_fn, from_fn, Engine, Handler, Procedure};
use serde_json::{json, Map, Value};

/// Engine with the calculator procedures registered.
pub fn calculator_engine() -> Engine {
    let addends_contract = contract_fn(|params| {
        let valid = params
            .get("addends")
            .and_then(Value::as_array)
            .map(|values| !values.is_empty() && values.iter().all(Value::is_number))
            .unwrap_or(false);
        if valid {
            Ok(())
        } else {
            let mut errors = Map::new();
            errors.insert("addends".into(), json!(["must be a non-empty array of numbers"]));
            Err(errors)
        }
    });

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

    Engine::builder()
        .procedure(
            "add",
            Procedure::new(addends_contract).with_positional_arguments("addends"),
        )
        .procedure("divide", Procedure::new(divide_contract))
        .procedure("log", Procedure::new(accept_all()))
        .build()
}

/// Handler implementing the calculator methods.
pub fn calculator_handler() -> Box<dyn Handler> {
    from_fn(|method, params: Option<&Params>| match method {
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
        "divide" => {
            let map = match params {
                Some(Params::Object(map)) => map.clone(),
                _ => Map::new(),
            };
            let dividend = map.get("dividend").and_then(Value::as_i64).unwrap_or(0);
            let divisor = map.get("divisor").and_then(Value::as_i64).unwrap_or(0);
            if divisor == 0 {
                Err(ErrorObject::new(-32000, "Cannot divide by zero"))
            } else {
                Ok(json!(dividend / divisor))
            }
        }
        "log" => Ok(json!({"logged": true})),
        other => Err(ErrorObject::new(-32000, format!("unhandled method: {other}"))),
    })
}
