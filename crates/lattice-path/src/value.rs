//! How resolved values are tested and displayed.

use serde_json::Value;

/// Whether a resolution produced something to bind.
pub fn is_present(value: Option<&Value>) -> bool {
    value.is_some_and(|v| !v.is_null())
}

/// Truthiness used by conditional directives.
///
/// Absent, `null`, `false`, zero and the empty string are falsy. Arrays and
/// records are truthy even when empty.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Text form of a resolved value.
pub fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthiness() {
        assert!(!is_truthy(None));
        assert!(!is_truthy(Some(&json!(null))));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(!is_truthy(Some(&json!(0.0))));
        assert!(!is_truthy(Some(&json!(""))));

        assert!(is_truthy(Some(&json!(true))));
        assert!(is_truthy(Some(&json!(-1))));
        assert!(is_truthy(Some(&json!("0"))));
        assert!(is_truthy(Some(&json!([]))));
        assert!(is_truthy(Some(&json!({}))));
    }

    #[test]
    fn displays_scalars() {
        assert_eq!(display_text(&json!("First")), "First");
        assert_eq!(display_text(&json!(42)), "42");
        assert_eq!(display_text(&json!(1.5)), "1.5");
        assert_eq!(display_text(&json!(true)), "true");
        assert_eq!(display_text(&json!(null)), "");
    }

    #[test]
    fn displays_structures_as_json() {
        assert_eq!(display_text(&json!(["a", 1])), r#"["a",1]"#);
        assert_eq!(display_text(&json!({ "k": "v" })), r#"{"k":"v"}"#);
    }
}
