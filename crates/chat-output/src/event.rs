// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;
use serde_json::{Map, Value};

/// A structured log record: field name to value.
pub type Record = Map<String, Value>;

/// One buffered log event as delivered by the host runtime.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Event {
    pub tag: String,
    /// Seconds since the Unix epoch.
    pub time: i64,
    pub record: Record,
}

impl Event {
    pub fn new(tag: impl Into<String>, time: i64, record: Record) -> Self {
        Self {
            tag: tag.into(),
            time,
            record,
        }
    }
}
