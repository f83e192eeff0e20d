// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Test doubles shared by the forwarder's unit tests.

use async_trait::async_trait;
use chat_output::config::ChatOutputOptions;
use chat_output::event::Event;
use chat_output::flusher::Flusher;
use chat_output::payload::Payload;
use chat_output::transport::{PostOptions, Transport, TransportError};
use serde_json::{json, Map};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Answers with scripted results, then succeeds once the script runs out.
pub struct ScriptedTransport {
    results: Mutex<VecDeque<Result<(), TransportError>>>,
    calls: Mutex<usize>,
}

impl ScriptedTransport {
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post_message(
        &self,
        _payload: &Payload,
        _options: &PostOptions,
    ) -> Result<(), TransportError> {
        *self.calls.lock().unwrap() += 1;
        self.results.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

pub fn flusher(results: Vec<Result<(), TransportError>>) -> (Flusher, Arc<ScriptedTransport>) {
    let transport = Arc::new(ScriptedTransport {
        results: Mutex::new(results.into()),
        calls: Mutex::new(0),
    });
    let config = ChatOutputOptions {
        webhook_url: Some("http://localhost/hook".to_string()),
        ..Default::default()
    }
    .validate()
    .unwrap();
    (Flusher::new(&config, transport.clone()), transport)
}

pub fn events() -> Vec<Event> {
    let mut record = Map::new();
    record.insert("message".to_string(), json!("hi"));
    vec![Event::new("app", 0, record)]
}

pub fn timeout() -> Result<(), TransportError> {
    Err(TransportError::Timeout("timed out".to_string()))
}
