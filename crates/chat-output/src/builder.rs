// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Groups a batch of events into one payload per destination channel.
//!
//! Channels are emitted in the order they are first seen in the batch, and records
//! keep their arrival order inside each channel.

use fnv::FnvBuildHasher;
use hashbrown::HashMap;
use tracing::debug;

use crate::channel::ChannelRouter;
use crate::config::Config;
use crate::event::{Event, Record};
use crate::payload::{
    Attachment, AttachmentField, CommonAttachment, CommonPayload, Content, Payload,
};
use crate::resolver;
use crate::template::Template;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// One newline-joined text body per channel.
    Text,
    /// One attachment per record.
    Attachments,
}

/// Per-channel accumulators kept in first-seen order.
struct ChannelGroups<T> {
    groups: Vec<(Option<String>, T)>,
    index: HashMap<Option<String>, usize, FnvBuildHasher>,
}

impl<T: Default> ChannelGroups<T> {
    fn new() -> Self {
        ChannelGroups {
            groups: Vec::new(),
            index: HashMap::with_hasher(FnvBuildHasher::default()),
        }
    }

    fn entry(&mut self, channel: Option<String>) -> &mut T {
        let position = match self.index.get(&channel) {
            Some(&position) => position,
            None => {
                let position = self.groups.len();
                self.index.insert(channel.clone(), position);
                self.groups.push((channel, T::default()));
                position
            }
        };
        &mut self.groups[position].1
    }

    fn into_inner(self) -> Vec<(Option<String>, T)> {
        self.groups
    }
}

#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    channel: ChannelRouter,
    message: Template,
    title: Option<Template>,
    common_payload: CommonPayload,
    common_attachment: CommonAttachment,
    shape: PayloadShape,
}

impl PayloadBuilder {
    pub fn new(config: &Config) -> Self {
        let shape = if config.title.is_some() || config.common_attachment.color.is_some() {
            PayloadShape::Attachments
        } else {
            PayloadShape::Text
        };
        PayloadBuilder {
            channel: config.channel.clone(),
            message: config.message.clone(),
            title: config.title.clone(),
            common_payload: config.common_payload.clone(),
            common_attachment: config.common_attachment.clone(),
            shape,
        }
    }

    pub fn shape(&self) -> PayloadShape {
        self.shape
    }

    pub fn build(&self, events: &[Event]) -> Vec<Payload> {
        let payloads = match self.shape {
            PayloadShape::Text => self.build_text_payloads(events),
            PayloadShape::Attachments => self.build_attachment_payloads(events),
        };
        debug!(
            "Built {} payload(s) from {} event(s)",
            payloads.len(),
            events.len()
        );
        payloads
    }

    fn build_text_payloads(&self, events: &[Event]) -> Vec<Payload> {
        let mut groups = ChannelGroups::<String>::new();
        for event in events {
            let body = groups.entry(self.channel.route(&event.record));
            body.push_str(&self.message.render(&event.record));
            body.push('\n');
        }
        groups
            .into_inner()
            .into_iter()
            .map(|(channel, text)| self.payload(channel, Content::Text { text }))
            .collect()
    }

    fn build_attachment_payloads(&self, events: &[Event]) -> Vec<Payload> {
        let mut groups = ChannelGroups::<Vec<Attachment>>::new();
        for event in events {
            let attachment = self.build_attachment(&event.record);
            groups
                .entry(self.channel.route(&event.record))
                .push(attachment);
        }
        groups
            .into_inner()
            .into_iter()
            .map(|(channel, attachments)| {
                self.payload(channel, Content::Attachments { attachments })
            })
            .collect()
    }

    fn build_attachment(&self, record: &Record) -> Attachment {
        let mut attachment = Attachment::from_common(&self.common_attachment);
        let text = self.message.render(record);

        match &self.title {
            Some(title) => {
                let title = title.render(record);
                attachment.fallback = format!("{title} {text}");
                attachment.title = Some(title);
            }
            None => attachment.fallback = text.clone(),
        }
        attachment.text = text;

        for field in AttachmentField::ALL {
            if let Some(value) = record.get(field.key()) {
                attachment.set_field(field, resolver::value_to_text(value));
            }
        }
        attachment
    }

    fn payload(&self, channel: Option<String>, content: Content) -> Payload {
        Payload {
            channel,
            content,
            common: self.common_payload.clone(),
        }
    }
}
