// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use tracing::debug;

use crate::payload::Payload;
use crate::transport::{check_status, PostOptions, Transport, TransportError};

/// Posts payloads as JSON to an incoming webhook.
#[derive(Debug, Clone)]
pub struct Webhook {
    client: reqwest::Client,
    url: String,
    debug: bool,
}

impl Webhook {
    pub fn new(client: reqwest::Client, url: String, debug: bool) -> Self {
        Webhook { client, url, debug }
    }
}

#[async_trait]
impl Transport for Webhook {
    async fn post_message(
        &self,
        payload: &Payload,
        _options: &PostOptions,
    ) -> Result<(), TransportError> {
        let body = serde_json::to_vec(payload)?;
        if self.debug {
            debug!("Webhook | POST {}: {}", self.url, String::from_utf8_lossy(&body));
        }

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;
        let response = check_status(response).await?;

        if self.debug {
            debug!(
                "Webhook | Response {}: {:?}",
                response.status(),
                response.text().await.unwrap_or_default()
            );
        }
        Ok(())
    }
}
