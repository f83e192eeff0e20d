// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::{env, process::ExitCode};
use tokio::{
    io::BufReader,
    time::{interval, Duration},
};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use chat_output::{config::ChatOutputOptions, flusher::Flusher, transport};

mod buffer_service;
mod input;
#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod mocks;
mod retry;

use buffer_service::{BufferHandle, BufferService};
use retry::{write_with_retries, RetryStrategy};

const DEFAULT_FLUSH_INTERVAL_SECS: u64 = 1;
const DEFAULT_MAX_RETRIES: u64 = 5;
const RETRY_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_TAG: &str = "stdin";

#[tokio::main]
pub async fn main() -> ExitCode {
    let log_level = env::var("CHAT_OUTPUT_LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());
    let default_tag = env::var("CHAT_OUTPUT_TAG").unwrap_or_else(|_| DEFAULT_TAG.to_string());
    let flush_interval_secs = env::var("CHAT_OUTPUT_FLUSH_INTERVAL_SECS")
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_FLUSH_INTERVAL_SECS);
    let max_retries = env::var("CHAT_OUTPUT_MAX_RETRIES")
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(DEFAULT_MAX_RETRIES);

    let env_filter = format!("h2=off,hyper=off,rustls=off,{}", log_level);

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .with_writer(std::io::stderr)
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");

    let config = match ChatOutputOptions::from_env().and_then(ChatOutputOptions::validate) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid chat output configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        "Forwarding to {} transport, flushing every {}s",
        config.transport.name(),
        flush_interval_secs
    );

    let flusher = Flusher::new(&config, transport::from_config(&config));
    let strategy = RetryStrategy::LinearBackoff(max_retries, RETRY_DELAY);

    let (service, handle) = BufferService::new();
    let service_task = tokio::spawn(service.run());

    let mut reader = tokio::spawn(input::read_events(
        BufReader::new(tokio::io::stdin()),
        handle.clone(),
        default_tag,
    ));

    let mut flush_interval = interval(Duration::from_secs(flush_interval_secs));
    flush_interval.tick().await; // discard first tick, which is instantaneous

    let mut dropped = 0;
    loop {
        tokio::select! {
            _ = flush_interval.tick() => {
                dropped += flush(&handle, &flusher, strategy).await;
            }
            result = &mut reader => {
                if let Err(e) = result {
                    error!("Input task failed: {e}");
                }
                break;
            }
        }
    }

    debug!("Input closed, running final flush");
    dropped += flush(&handle, &flusher, strategy).await;

    if let Err(e) = handle.shutdown() {
        error!("Failed to shut down buffer service: {e}");
    }
    if let Err(e) = service_task.await {
        error!("Buffer service task failed: {e}");
    }

    if dropped > 0 {
        error!("{dropped} event(s) were dropped after exhausting retries");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Drains the buffer and writes it. Returns the number of events dropped because
/// the backend stayed unreachable.
async fn flush(handle: &BufferHandle, flusher: &Flusher, strategy: RetryStrategy) -> usize {
    let events = match handle.flush().await {
        Ok(events) => events,
        Err(e) => {
            error!("Failed to drain buffer: {e}");
            return 0;
        }
    };
    if events.is_empty() {
        return 0;
    }

    debug!("Flushing {} buffered event(s)", events.len());
    if write_with_retries(flusher, &events, strategy).await {
        0
    } else {
        events.len()
    }
}
