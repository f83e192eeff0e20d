// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Message payloads posted to the chat backend, one per channel per batch.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Link/markup parsing mode requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    #[display("none")]
    None,
    #[display("full")]
    Full,
}

impl FromStr for ParseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(ParseMode::None),
            "full" => Ok(ParseMode::Full),
            other => Err(other.to_string()),
        }
    }
}

/// Fields merged into every payload, computed once from configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommonPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    pub mrkdwn: bool,
    pub link_names: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse: Option<ParseMode>,
    /// Only the Web API transport sends it, as a form field.
    #[serde(skip)]
    pub token: Option<String>,
}

/// Fields every attachment starts from, computed once from configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommonAttachment {
    pub color: Option<String>,
    pub mrkdwn_in: Vec<String>,
}

/// The record fields copied verbatim onto an attachment when present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentField {
    Fallback,
    Color,
    Pretext,
    AuthorName,
    AuthorLink,
    AuthorIcon,
    TitleLink,
    ImageUrl,
    ThumbUrl,
}

impl AttachmentField {
    pub const ALL: [AttachmentField; 9] = [
        AttachmentField::Fallback,
        AttachmentField::Color,
        AttachmentField::Pretext,
        AttachmentField::AuthorName,
        AttachmentField::AuthorLink,
        AttachmentField::AuthorIcon,
        AttachmentField::TitleLink,
        AttachmentField::ImageUrl,
        AttachmentField::ThumbUrl,
    ];

    /// Record key the field is read from.
    pub fn key(self) -> &'static str {
        match self {
            AttachmentField::Fallback => "fallback",
            AttachmentField::Color => "color",
            AttachmentField::Pretext => "pretext",
            AttachmentField::AuthorName => "author_name",
            AttachmentField::AuthorLink => "author_link",
            AttachmentField::AuthorIcon => "author_icon",
            AttachmentField::TitleLink => "title_link",
            AttachmentField::ImageUrl => "image_url",
            AttachmentField::ThumbUrl => "thumb_url",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Attachment {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub fallback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretext: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mrkdwn_in: Vec<String>,
}

impl Attachment {
    pub fn from_common(common: &CommonAttachment) -> Self {
        Attachment {
            color: common.color.clone(),
            mrkdwn_in: common.mrkdwn_in.clone(),
            ..Default::default()
        }
    }

    pub fn set_field(&mut self, field: AttachmentField, value: String) {
        match field {
            AttachmentField::Fallback => self.fallback = value,
            AttachmentField::Color => self.color = Some(value),
            AttachmentField::Pretext => self.pretext = Some(value),
            AttachmentField::AuthorName => self.author_name = Some(value),
            AttachmentField::AuthorLink => self.author_link = Some(value),
            AttachmentField::AuthorIcon => self.author_icon = Some(value),
            AttachmentField::TitleLink => self.title_link = Some(value),
            AttachmentField::ImageUrl => self.image_url = Some(value),
            AttachmentField::ThumbUrl => self.thumb_url = Some(value),
        }
    }
}

/// Body of a payload: either plain text or a list of attachments.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Content {
    Text { text: String },
    Attachments { attachments: Vec<Attachment> },
}

impl Content {
    /// Plain-text rendition, for transports that cannot carry attachments.
    pub fn to_text(&self) -> String {
        match self {
            Content::Text { text } => text.clone(),
            Content::Attachments { attachments } => attachments
                .iter()
                .map(|attachment| attachment.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(flatten)]
    pub content: Content,
    #[serde(flatten)]
    pub common: CommonPayload,
}
