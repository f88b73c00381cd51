//! Conversion between plain JSON and Firestore typed values.
//!
//! Firestore wraps every field in a single-key object naming its type, e.g.
//! `{"integerValue": "10"}`. 64-bit integers travel as decimal strings.

use serde_json::{Map, Number, Value, json};

use super::Fields;

/// Encode a JSON value as a Firestore `Value`.
pub fn encode(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                json!({ "integerValue": u.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            json!({ "arrayValue": { "values": items.iter().map(encode).collect::<Vec<_>>() } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Encode a document field map.
pub fn encode_fields(fields: &Fields) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(key, value)| (key.clone(), encode(value)))
            .collect(),
    )
}

/// Decode a Firestore `Value` into plain JSON.
///
/// Timestamps, references, and bytes come back as strings; geo points as
/// `{"latitude", "longitude"}` objects.
pub fn decode(value: &Value) -> Result<Value, String> {
    let Some((kind, inner)) = value.as_object().and_then(|o| o.iter().next()) else {
        return Err(format!("not a typed value: {value}"));
    };
    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" | "stringValue" | "timestampValue" | "referenceValue" | "bytesValue"
        | "geoPointValue" => Ok(inner.clone()),
        "integerValue" => {
            let text = inner.as_str().map_or_else(|| inner.to_string(), str::to_owned);
            text.parse::<i64>()
                .map(Value::from)
                .map_err(|e| format!("bad integerValue {text:?}: {e}"))
        }
        "doubleValue" => match inner {
            Value::Number(_) => Ok(inner.clone()),
            // NaN and infinities arrive as strings and have no JSON form
            Value::String(s) => Number::from_f64(
                s.parse::<f64>()
                    .map_err(|e| format!("bad doubleValue {s:?}: {e}"))?,
            )
            .map(Value::Number)
            .ok_or_else(|| format!("non-finite doubleValue {s:?}")),
            other => Err(format!("bad doubleValue {other}")),
        },
        "arrayValue" => inner
            .get("values")
            .and_then(Value::as_array)
            .map_or(Ok(Vec::new()), |values| values.iter().map(decode).collect())
            .map(Value::Array),
        "mapValue" => {
            let fields = inner.get("fields").and_then(Value::as_object);
            fields
                .map_or_else(|| Ok(Map::new()), decode_fields)
                .map(Value::Object)
        }
        other => Err(format!("unsupported value type {other}")),
    }
}

/// Decode a document's `fields` object.
pub fn decode_fields(fields: &Map<String, Value>) -> Result<Fields, String> {
    fields
        .iter()
        .map(|(key, value)| {
            decode(value)
                .map(|v| (key.clone(), v))
                .map_err(|e| format!("field {key}: {e}"))
        })
        .collect()
}

/// Quote a field path segment unless it is a simple identifier.
pub fn field_path(name: &str) -> String {
    let simple = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        name.to_string()
    } else {
        format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_stock_fields() {
        let fields = json!({
            "nome": "Rice",
            "quantidade": 10,
            "valorVenda": 3.5,
        });
        let encoded = encode_fields(fields.as_object().unwrap());
        assert_eq!(
            encoded,
            json!({
                "nome": { "stringValue": "Rice" },
                "quantidade": { "integerValue": "10" },
                "valorVenda": { "doubleValue": 3.5 },
            })
        );
    }

    #[test]
    fn test_decode_mixed_document() {
        let raw = json!({
            "nome": { "stringValue": "Rice" },
            "quantidade": { "integerValue": "7" },
            "valorCompra": { "integerValue": "2" },
            "data": { "timestampValue": "2026-01-02T03:04:05Z" },
            "tags": { "arrayValue": { "values": [{ "stringValue": "a" }] } },
            "empty": { "arrayValue": {} },
            "meta": { "mapValue": { "fields": { "ok": { "booleanValue": true } } } },
        });
        let decoded = decode_fields(raw.as_object().unwrap()).unwrap();
        assert_eq!(
            Value::Object(decoded),
            json!({
                "nome": "Rice",
                "quantidade": 7,
                "valorCompra": 2,
                "data": "2026-01-02T03:04:05Z",
                "tags": ["a"],
                "empty": [],
                "meta": { "ok": true },
            })
        );
    }

    #[test]
    fn test_decode_rejects_untyped_values() {
        assert!(decode(&json!("plain")).is_err());
        assert!(decode(&json!({ "integerValue": "ten" })).is_err());
        assert!(decode(&json!({ "doubleValue": "NaN" })).is_err());
    }

    #[test]
    fn test_field_path_quoting() {
        assert_eq!(field_path("quantidade"), "quantidade");
        assert_eq!(field_path("valor venda"), "`valor venda`");
        assert_eq!(field_path("1st"), "`1st`");
    }
}
