//! Conversion between runtime values and plain JSON
//!
//! Used at the embedding boundary, where values come from and go to people or
//! other systems that do not know the tagged `Val` encoding.

use super::types::Val;
use serde_json::{json, Map, Number, Value as JsonValue};

pub fn json_to_val(json: &JsonValue) -> Val {
    match json {
        JsonValue::Null => Val::Null,
        JsonValue::Bool(b) => Val::Bool(*b),
        JsonValue::Number(n) => Val::Num(n.as_f64().unwrap_or(f64::NAN)),
        JsonValue::String(s) => Val::Str(s.clone()),
        JsonValue::Array(items) => Val::List(items.iter().map(json_to_val).collect()),
        JsonValue::Object(map) => Val::Obj(
            map.iter()
                .map(|(key, value)| (key.clone(), json_to_val(value)))
                .collect(),
        ),
    }
}

pub fn val_to_json(val: &Val) -> JsonValue {
    match val {
        Val::Null => JsonValue::Null,
        Val::Bool(b) => JsonValue::Bool(*b),
        Val::Num(n) => num_to_json(*n),
        Val::Str(s) => JsonValue::String(s.clone()),
        Val::List(items) => JsonValue::Array(items.iter().map(val_to_json).collect()),
        Val::Obj(map) => JsonValue::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), val_to_json(value)))
                .collect::<Map<_, _>>(),
        ),
        Val::Function(callable) => json!({ "function": callable.params }),
        Val::Builtin(builtin) => json!({ "builtin": builtin.name() }),
        Val::Error(err) => json!({ "error": { "code": err.code, "message": err.message } }),
    }
}

fn num_to_json(n: f64) -> JsonValue {
    // Integral values print without a fraction
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        return JsonValue::Number(Number::from(n as i64));
    }
    Number::from_f64(n)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json_values() {
        let val = json_to_val(&json!({"xs": [1, "a", null, true]}));
        let Val::Obj(map) = &val else {
            unreachable!("expected object, got {:?}", val);
        };
        assert_eq!(
            map["xs"],
            Val::List(vec![
                Val::Num(1.0),
                Val::from("a"),
                Val::Null,
                Val::Bool(true)
            ])
        );
        assert_eq!(val_to_json(&val), json!({"xs": [1, "a", null, true]}));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(val_to_json(&Val::Num(2.0)), json!(2));
        assert_eq!(val_to_json(&Val::Num(2.5)), json!(2.5));
        assert_eq!(val_to_json(&Val::Num(f64::NAN)), JsonValue::Null);
    }
}
