// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Backends a payload can be posted to.
//!
//! Exactly one transport is active per adapter, picked by
//! [`TransportSelector`](crate::config::TransportSelector):
//!
//! - [`webhook::Webhook`]: JSON body to an incoming webhook URL
//! - [`slackbot::Slackbot`]: plain text to a bot relay URL, channel in the query string
//! - [`web_api::WebApi`]: form-encoded `chat.postMessage` call authenticated by token
//!
//! A host may re-deliver a whole batch after a retryable failure, so every transport
//! can receive the same payload more than once.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::error::Error as _;
use std::io;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{Config, TransportSelector};
use crate::http::get_client;
use crate::payload::Payload;

pub mod slackbot;
pub mod web_api;
pub mod webhook;

/// Per-call delivery flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostOptions {
    /// Create the destination channel when the backend reports it missing.
    pub auto_channels_create: bool,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("backend rejected the message: {0}")]
    Api(String),
    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("request failed: {0}")]
    Request(String),
    #[error("unsupported payload: {0}")]
    Unsupported(String),
}

impl TransportError {
    /// Timeouts and connection failures are worth re-delivering; everything else
    /// would fail again the same way.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportError::Timeout(_) | TransportError::Connection(_)
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::Timeout(_) => "timeout",
            TransportError::Connection(_) => "connection",
            TransportError::Status { .. } => "status",
            TransportError::Api(_) => "api",
            TransportError::Encode(_) => "encode",
            TransportError::Request(_) => "request",
            TransportError::Unsupported(_) => "unsupported",
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout(e.to_string())
        } else if e.is_connect() || is_dropped_connection(&e) {
            TransportError::Connection(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

/// A connection that was established and then closed or reset by the peer before
/// the response completed.
fn is_dropped_connection(e: &reqwest::Error) -> bool {
    let mut source = e.source();
    while let Some(err) = source {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            if matches!(
                io_err.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
            ) {
                return true;
            }
        }
        if let Some(hyper_err) = err.downcast_ref::<hyper::Error>() {
            if hyper_err.is_incomplete_message() || hyper_err.is_closed() {
                return true;
            }
        }
        source = err.source();
    }
    false
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Posts one payload. Must be safe to call again with the same payload.
    async fn post_message(
        &self,
        payload: &Payload,
        options: &PostOptions,
    ) -> Result<(), TransportError>;
}

/// Builds the transport selected by the configuration.
pub fn from_config(config: &Config) -> Arc<dyn Transport> {
    let client = get_client(config.https_proxy.as_deref(), config.timeout);
    match &config.transport {
        TransportSelector::Webhook { url } => {
            Arc::new(webhook::Webhook::new(client, url.clone(), config.debug))
        }
        TransportSelector::Slackbot { url } => {
            Arc::new(slackbot::Slackbot::new(client, url.clone(), config.debug))
        }
        TransportSelector::WebApi { .. } => Arc::new(web_api::WebApi::new(
            client,
            config.api_url.clone(),
            config.debug,
        )),
    }
}

/// Turns a non-success response into [`TransportError::Status`].
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(TransportError::Status { status, body })
}
