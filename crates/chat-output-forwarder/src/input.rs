// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Turns stdin lines into events.
//!
//! A line is either a bare record object, tagged with the configured default tag and
//! stamped with the current time, or a `[tag, time, record]` triple.

use chat_output::event::Event;
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::buffer_service::BufferHandle;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a record object or a [tag, time, record] array, got {0}")]
    Shape(&'static str),
}

pub fn parse_line(line: &str, default_tag: &str, now: i64) -> Result<Event, InputError> {
    match serde_json::from_str::<Value>(line)? {
        Value::Object(record) => Ok(Event::new(default_tag, now, record)),
        triple @ Value::Array(_) => Ok(serde_json::from_value(triple)?),
        Value::Null => Err(InputError::Shape("null")),
        Value::Bool(_) => Err(InputError::Shape("a boolean")),
        Value::Number(_) => Err(InputError::Shape("a number")),
        Value::String(_) => Err(InputError::Shape("a string")),
    }
}

pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}

/// Feeds every line of `reader` into the buffer until EOF. Returns the number of
/// events accepted.
pub async fn read_events<R>(reader: R, handle: BufferHandle, default_tag: String) -> usize
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut accepted = 0;

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read input: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_line(&line, &default_tag, unix_now()) {
            Ok(event) => {
                if let Err(e) = handle.insert_batch(vec![event]) {
                    warn!("Buffer service is gone, stopping input: {e}");
                    break;
                }
                accepted += 1;
            }
            Err(e) => warn!(line = %line, "Skipping input line: {e}"),
        }
    }

    debug!("Input closed after {accepted} event(s)");
    accepted
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::buffer_service::BufferService;
    use serde_json::json;
    use tracing_test::traced_test;

    #[test]
    fn test_record_object_gets_default_tag_and_time() {
        let event = parse_line(r#"{"message": "hi", "level": "warn"}"#, "stdin", 42).unwrap();
        assert_eq!(event.tag, "stdin");
        assert_eq!(event.time, 42);
        assert_eq!(event.record["message"], json!("hi"));
        assert_eq!(event.record["level"], json!("warn"));
    }

    #[test]
    fn test_triple_keeps_its_own_tag_and_time() {
        let event = parse_line(r#"["app.web", 1700000000, {"message": "hi"}]"#, "stdin", 42)
            .unwrap();
        assert_eq!(event.tag, "app.web");
        assert_eq!(event.time, 1700000000);
        assert_eq!(event.record["message"], json!("hi"));
    }

    #[test]
    fn test_rejected_lines() {
        assert!(matches!(
            parse_line("not json", "stdin", 0),
            Err(InputError::Json(_))
        ));
        assert!(matches!(
            parse_line(r#""text""#, "stdin", 0),
            Err(InputError::Shape("a string"))
        ));
        assert!(matches!(
            parse_line(r#"["app", 1]"#, "stdin", 0),
            Err(InputError::Json(_))
        ));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_read_events_skips_bad_lines() {
        let (service, handle) = BufferService::new();
        let service_task = tokio::spawn(service.run());

        let input: &[u8] = b"{\"message\": \"one\"}\n\nnope\n[\"t\", 5, {\"message\": \"two\"}]\n";
        let accepted = read_events(input, handle.clone(), "cli".to_string()).await;
        assert_eq!(accepted, 2);
        assert!(logs_contain("Skipping input line"));

        let events = handle.flush().await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].tag, "cli");
        assert_eq!(events[1].tag, "t");
        assert_eq!(events[1].time, 5);

        handle.shutdown().unwrap();
        service_task.await.unwrap();
    }
}
