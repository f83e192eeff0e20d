// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Output adapter that turns buffered log records into chat messages.
//!
//! A host runtime hands a batch of [`event::Event`]s to a [`flusher::Flusher`]. The
//! flusher groups them per destination channel with a [`builder::PayloadBuilder`] and
//! posts one [`payload::Payload`] per channel through a [`transport::Transport`].
//! Timeouts and connection failures are returned to the host so it can re-deliver the
//! batch; every other delivery failure is logged and dropped.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod builder;
pub mod channel;
pub mod config;
pub mod constants;
pub mod errors;
pub mod event;
pub mod flusher;
pub mod http;
pub mod payload;
pub mod resolver;
pub mod template;
pub mod transport;
