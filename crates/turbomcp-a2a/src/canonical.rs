//! Deterministic canonical JSON: object keys sorted recursively, arrays
//! keep their order, no whitespace. This is what gets signed and later
//! re-derived to check a message wasn't modified after signing.

use serde_json::Value;

use crate::message::Message;

/// Render a [`Message`]'s signable fields as canonical JSON.
///
/// Canonicalizes `{type, from, to, id, timestamp, method, params}` with
/// `type` defaulted to `"request"` and absent optional fields omitted.
#[must_use]
pub fn canonicalize_message(message: &Message) -> String {
    let mut obj = serde_json::Map::new();
    obj.insert(
        "type".to_string(),
        Value::String(message.message_type().to_string()),
    );
    obj.insert("from".to_string(), Value::String(message.from.clone()));
    obj.insert("to".to_string(), Value::String(message.to.clone()));
    obj.insert("id".to_string(), message.id.clone().unwrap_or(Value::Null));
    obj.insert(
        "timestamp".to_string(),
        Value::Number(message.timestamp.into()),
    );
    obj.insert(
        "method".to_string(),
        Value::String(message.method.clone()),
    );
    if let Some(params) = &message.params {
        obj.insert("params".to_string(), params.clone());
    }
    canonicalize_value(&Value::Object(obj))
}

/// Canonicalize an arbitrary JSON value: sort object keys recursively,
/// preserve array order, emit with no whitespace.
#[must_use]
pub fn canonicalize_value(value: &Value) -> String {
    let sorted = sort_value(value);
    serde_json::to_string(&sorted).unwrap_or_default()
}

fn sort_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted = serde_json::Map::new();
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                sorted.insert(key.clone(), sort_value(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_value).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sorts_object_keys_recursively() {
        let value = json!({"b": 1, "a": {"d": 2, "c": 3}});
        assert_eq!(canonicalize_value(&value), r#"{"a":{"c":3,"d":2},"b":1}"#);
    }

    #[test]
    fn preserves_array_order() {
        let value = json!({"a": [3, 1, 2]});
        assert_eq!(canonicalize_value(&value), r#"{"a":[3,1,2]}"#);
    }

    #[test]
    fn defaults_missing_type_to_request() {
        let message = Message {
            message_type: None,
            from: "agent-a".to_string(),
            to: "agent-b".to_string(),
            id: None,
            timestamp: 1000,
            method: "ping".to_string(),
            params: None,
        };
        let canonical = canonicalize_message(&message);
        assert!(canonical.contains(r#""type":"request""#));
        assert!(canonical.contains(r#""id":null"#));
        assert!(!canonical.contains("params"));
    }

    #[test]
    fn omits_params_when_absent_but_sorts_when_present() {
        let message = Message {
            message_type: Some("notify".to_string()),
            from: "a".to_string(),
            to: "b".to_string(),
            id: Some(json!(7)),
            timestamp: 5,
            method: "m".to_string(),
            params: Some(json!({"z": 1, "a": 2})),
        };
        let canonical = canonicalize_message(&message);
        assert!(canonical.contains(r#""params":{"a":2,"z":1}"#));
    }
}
