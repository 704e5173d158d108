//! HTTP transport seam.
//!
//! The registry client talks to the network through the [`Transport`] trait
//! so tests can substitute a stub with canned responses. The production
//! implementation is [`HttpTransport`], a thin reqwest wrapper that streams
//! response bodies into a single buffer.

use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use reqwest::Client;

use crate::error::RegistryError;

/// Plain unauthenticated GET returning the full response body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<Bytes, RegistryError>;
}

/// reqwest-backed transport with a per-request timeout.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");

        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Bytes, RegistryError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RegistryError::unavailable(url, format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::unavailable(url, format!("HTTP {status}")));
        }

        // Stream the body chunk by chunk rather than buffering it inside
        // reqwest; archives can run to tens of megabytes.
        let mut stream = response.bytes_stream();
        let mut body = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .map_err(|e| RegistryError::unavailable(url, format!("failed to read body: {e}")))?;
            body.extend_from_slice(&chunk);
        }

        Ok(body.freeze())
    }
}
