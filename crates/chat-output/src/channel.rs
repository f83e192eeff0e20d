// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::constants::{CHANNEL_MARKER, DIRECT_MESSAGE_MARKER};
use crate::event::Record;
use crate::template::{Template, TemplateError};

/// Decides which channel a record is posted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRouter {
    /// No channel configured: the webhook's own default channel is used.
    Default,
    Static(String),
    Templated(Template),
}

impl ChannelRouter {
    /// Builds a router from the configured channel and optional channel keys.
    ///
    /// The channel (or channel format) is normalized here, once, so that rendered
    /// names always carry exactly one leading marker.
    pub fn new(channel: Option<&str>, keys: Option<Vec<String>>) -> Result<Self, TemplateError> {
        match (channel, keys) {
            (None, _) => Ok(ChannelRouter::Default),
            (Some(channel), None) => Ok(ChannelRouter::Static(normalize_channel(channel))),
            (Some(channel), Some(keys)) => Ok(ChannelRouter::Templated(Template::compile(
                &normalize_channel(channel),
                keys,
            )?)),
        }
    }

    pub fn route(&self, record: &Record) -> Option<String> {
        match self {
            ChannelRouter::Default => None,
            ChannelRouter::Static(channel) => Some(channel.clone()),
            ChannelRouter::Templated(template) => Some(template.render(record)),
        }
    }
}

/// Strips any run of leading `#` and adds exactly one back. Direct-message targets
/// (`@user`) are returned unchanged.
pub fn normalize_channel(channel: &str) -> String {
    if channel.starts_with(DIRECT_MESSAGE_MARKER) {
        return channel.to_string();
    }
    let name = channel.trim_start_matches(CHANNEL_MARKER);
    format!("{CHANNEL_MARKER}{name}")
}

/// Channel name as the bot relay and channel-creation endpoints expect it.
pub fn strip_marker(channel: &str) -> &str {
    channel.strip_prefix(CHANNEL_MARKER).unwrap_or(channel)
}
