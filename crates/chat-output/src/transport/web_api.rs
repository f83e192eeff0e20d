// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::channel::strip_marker;
use crate::constants::{CHANNEL_NOT_FOUND, NAME_TAKEN};
use crate::payload::{Content, Payload};
use crate::transport::{check_status, PostOptions, Transport, TransportError};

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Token-authenticated Web API client (`chat.postMessage`).
#[derive(Debug, Clone)]
pub struct WebApi {
    client: reqwest::Client,
    api_url: String,
    debug: bool,
}

impl WebApi {
    pub fn new(client: reqwest::Client, api_url: String, debug: bool) -> Self {
        WebApi {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            debug,
        }
    }

    async fn call(&self, method: &str, form: &[(&str, String)]) -> Result<(), TransportError> {
        let url = format!("{}/{}", self.api_url, method);
        if self.debug {
            let fields = form
                .iter()
                .filter(|(name, _)| *name != "token")
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>();
            debug!("WebApi | POST {}: {:?}", url, fields);
        }

        let response = self.client.post(&url).form(form).send().await?;
        let response = check_status(response).await?;
        let body: ApiResponse = response.json().await?;
        if self.debug {
            debug!("WebApi | Response from {}: {:?}", method, body);
        }

        if body.ok {
            Ok(())
        } else {
            Err(TransportError::Api(
                body.error.unwrap_or_else(|| "unknown_error".to_string()),
            ))
        }
    }

    async fn post(&self, payload: &Payload, token: &str) -> Result<(), TransportError> {
        let form = encode_form(payload, token)?;
        self.call("chat.postMessage", &form).await
    }

    async fn create_channel(&self, channel: &str, token: &str) -> Result<(), TransportError> {
        let form = [
            ("token", token.to_string()),
            ("name", strip_marker(channel).to_string()),
        ];
        match self.call("conversations.create", &form).await {
            Err(TransportError::Api(error)) if error == NAME_TAKEN => Ok(()),
            result => result,
        }
    }
}

fn encode_form(
    payload: &Payload,
    token: &str,
) -> Result<Vec<(&'static str, String)>, TransportError> {
    let mut form = vec![("token", token.to_string())];
    if let Some(channel) = &payload.channel {
        form.push(("channel", channel.clone()));
    }
    match &payload.content {
        Content::Text { text } => form.push(("text", text.clone())),
        Content::Attachments { attachments } => {
            form.push(("attachments", serde_json::to_string(attachments)?))
        }
    }

    let common = &payload.common;
    if let Some(username) = &common.username {
        form.push(("username", username.clone()));
    }
    if let Some(icon_emoji) = &common.icon_emoji {
        form.push(("icon_emoji", icon_emoji.clone()));
    }
    if let Some(icon_url) = &common.icon_url {
        form.push(("icon_url", icon_url.clone()));
    }
    form.push(("mrkdwn", common.mrkdwn.to_string()));
    form.push(("link_names", common.link_names.to_string()));
    if let Some(parse) = common.parse {
        form.push(("parse", parse.to_string()));
    }
    Ok(form)
}

#[async_trait]
impl Transport for WebApi {
    async fn post_message(
        &self,
        payload: &Payload,
        options: &PostOptions,
    ) -> Result<(), TransportError> {
        let Some(token) = payload.common.token.as_deref() else {
            return Err(TransportError::Unsupported(
                "the Web API needs a token".to_string(),
            ));
        };

        match self.post(payload, token).await {
            Err(TransportError::Api(error))
                if error == CHANNEL_NOT_FOUND && options.auto_channels_create =>
            {
                let Some(channel) = payload.channel.as_deref() else {
                    return Err(TransportError::Api(error));
                };
                warn!("WebApi | Channel {} not found, creating it", channel);
                self.create_channel(channel, token).await?;
                self.post(payload, token).await
            }
            result => result,
        }
    }
}
