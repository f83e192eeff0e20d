// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::builder::PayloadBuilder;
use crate::config::Config;
use crate::event::Event;
use crate::payload::Payload;
use crate::transport::{PostOptions, Transport, TransportError};

/// Result of a single delivery attempt.
#[derive(Debug)]
pub enum Outcome {
    Success,
    /// Timeout or connectivity problem; the batch should be delivered again later.
    Retryable(TransportError),
    /// Permanent failure, already logged. The payload is dropped.
    Discarded,
}

/// Builds payloads from a batch and hands them to the transport.
///
/// The flusher never retries on its own: a retryable failure is returned to the
/// caller, which owns backoff and re-delivery of the whole batch.
#[derive(Clone)]
pub struct Flusher {
    builder: PayloadBuilder,
    transport: Arc<dyn Transport>,
    post_options: PostOptions,
}

impl Flusher {
    pub fn new(config: &Config, transport: Arc<dyn Transport>) -> Self {
        Flusher {
            builder: PayloadBuilder::new(config),
            transport,
            post_options: PostOptions {
                auto_channels_create: config.auto_channels_create,
            },
        }
    }

    /// Delivers every payload built from `events`, in first-seen channel order.
    ///
    /// Permanent failures are logged and skipped. The first retryable failure stops the
    /// remaining deliveries and is returned unchanged; payloads already sent for other
    /// channels will be sent again when the batch is re-delivered.
    pub async fn write(&self, events: &[Event]) -> Result<(), TransportError> {
        let payloads = self.builder.build(events);
        let n_payloads = payloads.len();
        let mut discarded = 0;

        for payload in &payloads {
            match self.deliver(payload).await {
                Outcome::Success => {}
                Outcome::Discarded => discarded += 1,
                Outcome::Retryable(e) => return Err(e),
            }
        }

        debug!(
            "Delivered {} of {n_payloads} payload(s) for {} event(s)",
            n_payloads - discarded,
            events.len()
        );
        Ok(())
    }

    pub async fn deliver(&self, payload: &Payload) -> Outcome {
        match self
            .transport
            .post_message(payload, &self.post_options)
            .await
        {
            Ok(()) => Outcome::Success,
            Err(e) if e.is_retryable() => {
                warn!(
                    channel = payload.channel.as_deref().unwrap_or_default(),
                    error = %e,
                    error_class = e.kind(),
                    "Failed to deliver payload, batch will be retried"
                );
                Outcome::Retryable(e)
            }
            Err(e) => {
                error!(
                    channel = payload.channel.as_deref().unwrap_or_default(),
                    error = %e,
                    error_class = e.kind(),
                    details = ?e,
                    "Failed to deliver payload. Data dropped"
                );
                Outcome::Discarded
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ChatOutputOptions;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tracing_test::traced_test;

    /// Records posted payloads and answers with scripted results (success once exhausted).
    #[derive(Default)]
    struct ScriptedTransport {
        results: Mutex<VecDeque<Result<(), TransportError>>>,
        posted: Mutex<Vec<(Payload, PostOptions)>>,
    }

    impl ScriptedTransport {
        fn new(results: Vec<Result<(), TransportError>>) -> Arc<Self> {
            Arc::new(ScriptedTransport {
                results: Mutex::new(results.into()),
                posted: Mutex::new(Vec::new()),
            })
        }

        fn posted_channels(&self) -> Vec<String> {
            self.posted
                .lock()
                .unwrap()
                .iter()
                .map(|(payload, _)| payload.channel.clone().unwrap_or_default())
                .collect()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn post_message(
            &self,
            payload: &Payload,
            options: &PostOptions,
        ) -> Result<(), TransportError> {
            self.posted
                .lock()
                .unwrap()
                .push((payload.clone(), *options));
            self.results.lock().unwrap().pop_front().unwrap_or(Ok(()))
        }
    }

    fn config() -> Config {
        ChatOutputOptions {
            token: Some("xoxb-token".to_string()),
            channel: Some("%s".to_string()),
            channel_keys: Some(vec!["room".to_string()]),
            auto_channels_create: true,
            ..Default::default()
        }
        .validate()
        .unwrap()
    }

    fn events() -> Vec<Event> {
        ["a", "b", "c"]
            .iter()
            .map(|room| {
                Event::new(
                    "app",
                    0,
                    json!({"room": room, "message": format!("to {room}")})
                        .as_object()
                        .unwrap()
                        .clone(),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_write_delivers_every_channel() {
        let transport = ScriptedTransport::new(vec![]);
        let flusher = Flusher::new(&config(), transport.clone());

        flusher.write(&events()).await.unwrap();

        assert_eq!(transport.posted_channels(), vec!["#a", "#b", "#c"]);
        let posted = transport.posted.lock().unwrap();
        assert!(posted.iter().all(|(_, options)| options.auto_channels_create));
        assert_eq!(
            posted[0].0.common.token.as_deref(),
            Some("xoxb-token")
        );
    }

    #[tokio::test]
    async fn test_write_empty_batch_posts_nothing() {
        let transport = ScriptedTransport::new(vec![]);
        let flusher = Flusher::new(&config(), transport.clone());

        flusher.write(&[]).await.unwrap();

        assert!(transport.posted_channels().is_empty());
    }

    #[tokio::test]
    #[traced_test]
    async fn test_timeout_is_returned_unchanged() {
        let transport = ScriptedTransport::new(vec![Err(TransportError::Timeout(
            "operation timed out".to_string(),
        ))]);
        let flusher = Flusher::new(&config(), transport.clone());

        let err = flusher.write(&events()).await.unwrap_err();

        assert!(matches!(&err, TransportError::Timeout(msg) if msg == "operation timed out"));
        // Remaining channels are left for the re-delivered batch.
        assert_eq!(transport.posted_channels(), vec!["#a"]);
        assert!(logs_contain("batch will be retried"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_permanent_error_is_logged_and_swallowed() {
        let transport = ScriptedTransport::new(vec![Err(TransportError::Api(
            "invalid_auth".to_string(),
        ))]);
        let flusher = Flusher::new(&config(), transport.clone());

        flusher.write(&events()).await.unwrap();

        assert_eq!(transport.posted_channels(), vec!["#a", "#b", "#c"]);
        assert!(logs_contain("Data dropped"));
        assert!(logs_contain("invalid_auth"));
        assert!(logs_contain("error_class"));
    }

    #[tokio::test]
    async fn test_retryable_after_discard_still_propagates() {
        let transport = ScriptedTransport::new(vec![
            Err(TransportError::Api("msg_too_long".to_string())),
            Err(TransportError::Connection("connection refused".to_string())),
        ]);
        let flusher = Flusher::new(&config(), transport.clone());

        let err = flusher.write(&events()).await.unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(transport.posted_channels(), vec!["#a", "#b"]);
    }

    #[tokio::test]
    async fn test_deliver_outcomes() {
        let transport = ScriptedTransport::new(vec![
            Ok(()),
            Err(TransportError::Timeout("t".to_string())),
            Err(TransportError::Unsupported("u".to_string())),
        ]);
        let flusher = Flusher::new(&config(), transport);
        let payloads = flusher.builder.build(&events());

        assert!(matches!(flusher.deliver(&payloads[0]).await, Outcome::Success));
        assert!(matches!(
            flusher.deliver(&payloads[1]).await,
            Outcome::Retryable(TransportError::Timeout(_))
        ));
        assert!(matches!(flusher.deliver(&payloads[2]).await, Outcome::Discarded));
    }
}
