// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use core::time::Duration;
use std::error::Error;
use tracing::error;

/// Builds a reqwest client with optional proxy configuration and timeout.
pub fn build_client(
    proxy_url: Option<&str>,
    timeout: Duration,
) -> Result<reqwest::Client, Box<dyn Error>> {
    let mut builder = reqwest::Client::builder()
        .use_rustls_tls()
        .timeout(timeout);
    if let Some(proxy) = proxy_url {
        builder = builder.proxy(reqwest::Proxy::all(proxy)?);
    }
    Ok(builder.build()?)
}

/// Like [`build_client`], but falls back to a direct connection when the proxy
/// configuration can not be used.
pub fn get_client(proxy_url: Option<&str>, timeout: Duration) -> reqwest::Client {
    build_client(proxy_url, timeout).unwrap_or_else(|e| {
        error!(
            "Unable to parse proxy configuration: {}, no proxy will be used",
            e
        );
        build_client(None, timeout).unwrap_or_else(|inner| {
            error!(
                "Failed to build HTTP client without proxy: {}, using reqwest defaults",
                inner
            );
            reqwest::Client::new()
        })
    })
}
