// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::channel::ChannelRouter;
use crate::constants::{
    DEFAULT_API_URL, DEFAULT_MESSAGE_FORMAT, DEFAULT_MESSAGE_KEY, DEFAULT_TIMEOUT, MRKDWN_IN,
};
use crate::errors::ConfigError;
use crate::payload::{CommonAttachment, CommonPayload, ParseMode};
use crate::template::Template;

const ENV_PREFIX: &str = "CHAT_OUTPUT_";

/// Raw adapter options, as read from the environment or a host's config file.
///
/// Nothing is checked until [`ChatOutputOptions::validate`] turns them into a [`Config`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChatOutputOptions {
    /// Incoming webhook endpoint
    pub webhook_url: Option<String>,
    /// Bot relay endpoint, including its `token` query parameter
    pub slackbot_url: Option<String>,
    /// Web API token
    pub token: Option<String>,
    pub username: Option<String>,
    /// Attachment color; setting it switches payloads to attachments
    pub color: Option<String>,
    pub icon_emoji: Option<String>,
    pub icon_url: Option<String>,
    pub mrkdwn: bool,
    pub link_names: bool,
    pub parse: Option<String>,
    pub auto_channels_create: bool,
    pub https_proxy: Option<String>,
    pub channel: Option<String>,
    pub channel_keys: Option<Vec<String>>,
    pub title: Option<String>,
    pub title_keys: Option<Vec<String>>,
    pub message: Option<String>,
    pub message_keys: Option<Vec<String>>,
    /// Timeout for each request to the backend, in seconds
    pub timeout_secs: Option<u64>,
    /// Web API base URL, overridden in tests
    pub api_url: Option<String>,
    /// Log outgoing bodies and backend responses at debug level
    pub debug: bool,
}

impl Default for ChatOutputOptions {
    fn default() -> Self {
        Self {
            webhook_url: None,
            slackbot_url: None,
            token: None,
            username: None,
            color: None,
            icon_emoji: None,
            icon_url: None,
            mrkdwn: true,
            link_names: true,
            parse: None,
            auto_channels_create: false,
            https_proxy: None,
            channel: None,
            channel_keys: None,
            title: None,
            title_keys: None,
            message: None,
            message_keys: None,
            timeout_secs: None,
            api_url: None,
            debug: false,
        }
    }
}

/// The backend transport, exactly one of which is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportSelector {
    Webhook { url: String },
    Slackbot { url: String },
    WebApi { token: String },
}

impl TransportSelector {
    pub fn name(&self) -> &'static str {
        match self {
            TransportSelector::Webhook { .. } => "webhook",
            TransportSelector::Slackbot { .. } => "slackbot",
            TransportSelector::WebApi { .. } => "web api",
        }
    }
}

/// Validated, immutable adapter configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub transport: TransportSelector,
    pub channel: ChannelRouter,
    pub message: Template,
    pub title: Option<Template>,
    pub common_payload: CommonPayload,
    pub common_attachment: CommonAttachment,
    pub auto_channels_create: bool,
    pub https_proxy: Option<String>,
    pub timeout: Duration,
    pub api_url: String,
    pub debug: bool,
}

impl ChatOutputOptions {
    /// Reads options from `CHAT_OUTPUT_*` environment variables.
    ///
    /// Lists are comma-separated. The proxy falls back to `HTTPS_PROXY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            webhook_url: env_string("WEBHOOK_URL"),
            slackbot_url: env_string("SLACKBOT_URL"),
            token: env_string("TOKEN"),
            username: env_string("USERNAME"),
            color: env_string("COLOR"),
            icon_emoji: env_string("ICON_EMOJI"),
            icon_url: env_string("ICON_URL"),
            mrkdwn: env_bool("MRKDWN")?.unwrap_or(defaults.mrkdwn),
            link_names: env_bool("LINK_NAMES")?.unwrap_or(defaults.link_names),
            parse: env_string("PARSE"),
            auto_channels_create: env_bool("AUTO_CHANNELS_CREATE")?
                .unwrap_or(defaults.auto_channels_create),
            https_proxy: env_string("HTTPS_PROXY").or_else(|| env::var("HTTPS_PROXY").ok()),
            channel: env_string("CHANNEL"),
            channel_keys: env_list("CHANNEL_KEYS"),
            title: env_string("TITLE"),
            title_keys: env_list("TITLE_KEYS"),
            message: env_string("MESSAGE"),
            message_keys: env_list("MESSAGE_KEYS"),
            timeout_secs: env_u64("TIMEOUT_SECS")?,
            api_url: env_string("API_URL"),
            debug: env_bool("DEBUG")?.unwrap_or(defaults.debug),
        })
    }

    /// Checks every option and compiles the templates.
    pub fn validate(self) -> Result<Config, ConfigError> {
        let transport = self.select_transport()?;

        if self.icon_emoji.is_some() && self.icon_url.is_some() {
            return Err(ConfigError::ConflictingIcons);
        }

        let parse = self
            .parse
            .as_deref()
            .map(|parse| parse.parse::<ParseMode>().map_err(ConfigError::InvalidParse))
            .transpose()?;

        if self.auto_channels_create && !matches!(transport, TransportSelector::WebApi { .. }) {
            return Err(ConfigError::AutoCreateRequiresToken);
        }

        if self.channel.is_none() {
            if self.channel_keys.is_some() {
                return Err(ConfigError::MissingChannel("when channel_keys is specified"));
            }
            match transport {
                TransportSelector::Slackbot { .. } => {
                    return Err(ConfigError::MissingChannel("when slackbot_url is used"))
                }
                TransportSelector::WebApi { .. } => {
                    return Err(ConfigError::MissingChannel("when token is used"))
                }
                TransportSelector::Webhook { .. } => {}
            }
        }

        let channel = ChannelRouter::new(self.channel.as_deref(), self.channel_keys)
            .map_err(|source| ConfigError::Template {
                option: "channel",
                source,
            })?;

        let message_keys = self
            .message_keys
            .unwrap_or_else(|| vec![DEFAULT_MESSAGE_KEY.to_string()]);
        let message_format = self
            .message
            .unwrap_or_else(|| placeholders_for(&message_keys, DEFAULT_MESSAGE_FORMAT));
        let message = Template::compile(&message_format, message_keys).map_err(|source| {
            ConfigError::Template {
                option: "message",
                source,
            }
        })?;

        let title = match (self.title, self.title_keys) {
            (None, None) => None,
            (title, keys) => {
                let keys = keys.unwrap_or_default();
                let format = title.unwrap_or_else(|| placeholders_for(&keys, ""));
                Some(
                    Template::compile(&format, keys).map_err(|source| ConfigError::Template {
                        option: "title",
                        source,
                    })?,
                )
            }
        };

        let token = match &transport {
            TransportSelector::WebApi { token } => Some(token.clone()),
            _ => None,
        };
        let common_payload = CommonPayload {
            username: self.username,
            icon_emoji: self.icon_emoji,
            icon_url: self.icon_url,
            mrkdwn: self.mrkdwn,
            link_names: self.link_names,
            parse,
            token,
        };
        let common_attachment = CommonAttachment {
            color: self.color,
            mrkdwn_in: if self.mrkdwn {
                MRKDWN_IN.iter().map(|field| field.to_string()).collect()
            } else {
                Vec::new()
            },
        };

        Ok(Config {
            transport,
            channel,
            message,
            title,
            common_payload,
            common_attachment,
            auto_channels_create: self.auto_channels_create,
            https_proxy: self.https_proxy,
            timeout: self
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
            api_url: self.api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            debug: self.debug,
        })
    }

    fn select_transport(&self) -> Result<TransportSelector, ConfigError> {
        let (name, value, transport) = match (&self.webhook_url, &self.slackbot_url, &self.token) {
            (Some(url), None, None) => (
                "webhook_url",
                url,
                TransportSelector::Webhook { url: url.clone() },
            ),
            (None, Some(url), None) => (
                "slackbot_url",
                url,
                TransportSelector::Slackbot { url: url.clone() },
            ),
            (None, None, Some(token)) => (
                "token",
                token,
                TransportSelector::WebApi {
                    token: token.clone(),
                },
            ),
            (webhook_url, slackbot_url, token) => {
                let selected = [webhook_url, slackbot_url, token]
                    .iter()
                    .filter(|value| value.is_some())
                    .count();
                return Err(ConfigError::TransportSelection(selected));
            }
        };
        if value.trim().is_empty() {
            return Err(ConfigError::Empty(name));
        }
        Ok(transport)
    }
}

/// One `%s` per key, space separated; `fallback` when there are no keys.
fn placeholders_for(keys: &[String], fallback: &str) -> String {
    if keys.is_empty() {
        return fallback.to_string();
    }
    vec!["%s"; keys.len()].join(" ")
}

fn env_string(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}{name}")).ok()
}

fn env_list(name: &str) -> Option<Vec<String>> {
    env_string(name).map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
}

fn env_bool(name: &str) -> Result<Option<bool>, ConfigError> {
    env_string(name)
        .map(|value| match value.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                name: format!("{ENV_PREFIX}{name}"),
                value,
            }),
        })
        .transpose()
}

fn env_u64(name: &str) -> Result<Option<u64>, ConfigError> {
    env_string(name)
        .map(|value| {
            value.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                name: format!("{ENV_PREFIX}{name}"),
                value,
            })
        })
        .transpose()
}
