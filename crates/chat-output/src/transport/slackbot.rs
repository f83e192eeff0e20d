// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use tracing::debug;

use crate::channel::strip_marker;
use crate::payload::Payload;
use crate::transport::{check_status, PostOptions, Transport, TransportError};

/// Posts plain text through the bot relay.
///
/// The relay only understands text, so attachment payloads are flattened to their
/// message texts, one per line.
#[derive(Debug, Clone)]
pub struct Slackbot {
    client: reqwest::Client,
    url: String,
    debug: bool,
}

impl Slackbot {
    pub fn new(client: reqwest::Client, url: String, debug: bool) -> Self {
        Slackbot { client, url, debug }
    }
}

#[async_trait]
impl Transport for Slackbot {
    async fn post_message(
        &self,
        payload: &Payload,
        _options: &PostOptions,
    ) -> Result<(), TransportError> {
        let Some(channel) = payload.channel.as_deref() else {
            return Err(TransportError::Unsupported(
                "the bot relay needs an explicit channel".to_string(),
            ));
        };
        let text = payload.content.to_text();
        if self.debug {
            debug!("Slackbot | POST {} channel={}: {}", self.url, channel, text);
        }

        let response = self
            .client
            .post(&self.url)
            .query(&[("channel", strip_marker(channel))])
            .body(text)
            .send()
            .await?;
        let response = check_status(response).await?;

        if self.debug {
            debug!(
                "Slackbot | Response {}: {:?}",
                response.status(),
                response.text().await.unwrap_or_default()
            );
        }
        Ok(())
    }
}
