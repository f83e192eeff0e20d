// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Record field lookup used by templates.

use serde_json::Value;
use tracing::warn;

use crate::event::Record;

/// Returns the text form of `key` in `record`.
///
/// A missing key is not an error: it is reported with a warning and resolves to an
/// empty string, so a single malformed record only degrades the field it feeds.
pub fn resolve(record: &Record, key: &str) -> String {
    match record.get(key) {
        Some(value) => value_to_text(value),
        None => {
            warn!(
                key,
                record = %serde_json::to_string(record).unwrap_or_default(),
                "the specified key '{key}' was not found in record"
            );
            String::new()
        }
    }
}

/// Strings are used as-is and `null` becomes empty; everything else is rendered as
/// compact JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use tracing_test::traced_test;

    fn record(value: Value) -> Record {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_resolve_string() {
        let rec = record(json!({"message": "hello"}));
        assert_eq!(resolve(&rec, "message"), "hello");
    }

    #[test]
    fn test_resolve_non_string_values() {
        let rec = record(json!({
            "count": 42,
            "ratio": 0.5,
            "ok": true,
            "nothing": null,
            "nested": {"a": [1, 2]}
        }));
        assert_eq!(resolve(&rec, "count"), "42");
        assert_eq!(resolve(&rec, "ratio"), "0.5");
        assert_eq!(resolve(&rec, "ok"), "true");
        assert_eq!(resolve(&rec, "nothing"), "");
        assert_eq!(resolve(&rec, "nested"), r#"{"a":[1,2]}"#);
    }

    #[test]
    #[traced_test]
    fn test_resolve_missing_key_warns_once() {
        let rec = record(json!({"message": "hello"}));
        assert_eq!(resolve(&rec, "host"), "");

        assert!(logs_contain("'host' was not found in record"));
        logs_assert(|lines: &[&str]| {
            let warnings = lines
                .iter()
                .filter(|line| line.contains("WARN") && line.contains("host"))
                .count();
            match warnings {
                1 => Ok(()),
                n => Err(format!("expected exactly one warning, got {n}")),
            }
        });
    }

    #[test]
    #[traced_test]
    fn test_resolve_present_key_does_not_warn() {
        let rec = record(json!({"message": "hello"}));
        resolve(&rec, "message");
        assert!(!logs_contain("was not found in record"));
    }
}
