// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

/// Marker every channel name starts with.
pub const CHANNEL_MARKER: char = '#';

/// Marker of direct-message targets, which are never rewritten.
pub const DIRECT_MESSAGE_MARKER: char = '@';

pub const DEFAULT_MESSAGE_FORMAT: &str = "%s";
pub const DEFAULT_MESSAGE_KEY: &str = "message";

/// Attachment sub-fields rendered as markdown when `mrkdwn` is enabled.
pub const MRKDWN_IN: [&str; 2] = ["text", "fields"];

pub const DEFAULT_API_URL: &str = "https://slack.com/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Web API error returned when posting to a channel that does not exist.
pub const CHANNEL_NOT_FOUND: &str = "channel_not_found";
/// Web API error returned when creating a channel that already exists.
pub const NAME_TAKEN: &str = "name_taken";
