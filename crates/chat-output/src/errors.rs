// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::template::TemplateError;

/// Configuration problems detected at startup. None of them are recoverable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("exactly one of webhook_url, slackbot_url or token must be specified, found {0}")]
    TransportSelection(usize),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("invalid {option} template: {source}")]
    Template {
        option: &'static str,
        #[source]
        source: TemplateError,
    },

    #[error("icon_emoji and icon_url cannot be specified together")]
    ConflictingIcons,

    #[error("parse must be either 'none' or 'full', got '{0}'")]
    InvalidParse(String),

    #[error("auto_channels_create requires token to be specified")]
    AutoCreateRequiresToken,

    #[error("channel is required {0}")]
    MissingChannel(&'static str),

    #[error("invalid value '{value}' for {name}")]
    InvalidValue { name: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            ConfigError::TransportSelection(2).to_string(),
            "exactly one of webhook_url, slackbot_url or token must be specified, found 2"
        );
        assert_eq!(
            ConfigError::Empty("token").to_string(),
            "token must not be empty"
        );
        let error = ConfigError::Template {
            option: "message",
            source: TemplateError::Arity {
                format: "%s %s".to_string(),
                placeholders: 2,
                keys: 1,
            },
        };
        assert_eq!(
            error.to_string(),
            "invalid message template: format '%s %s' expects 2 value(s) but 1 key(s) were given"
        );
    }
}
