//! Test doubles and fixture builders shared across unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use flate2::Compression;
use flate2::write::GzEncoder;

use crate::error::RegistryError;
use crate::transport::Transport;

/// Transport stub serving canned responses keyed by exact URL.
///
/// URLs without a registered response fail like a 404, and
/// [`set_failing`](StubTransport::set_failing) makes every request fail,
/// for error-path tests.
#[derive(Default)]
pub(crate) struct StubTransport {
    responses: Mutex<HashMap<String, Bytes>>,
    requested: Mutex<Vec<String>>,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the response body for a URL.
    pub fn insert(&self, url: impl Into<String>, body: impl Into<Bytes>) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.into(), body.into());
    }

    /// Number of requests made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every requested URL, in request order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn get(&self, url: &str) -> Result<Bytes, RegistryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(url.to_string());

        if self.failing.load(Ordering::SeqCst) {
            return Err(RegistryError::unavailable(url, "stubbed failure"));
        }

        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| RegistryError::unavailable(url, "HTTP 404 Not Found"))
    }
}

/// Build an in-memory tar.gz archive. `None` contents produce a directory
/// entry.
pub(crate) fn build_archive(entries: &[(&str, Option<&[u8]>)]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    {
        let mut builder = tar::Builder::new(&mut encoder);

        for (path, contents) in entries {
            let mut header = tar::Header::new_gnu();
            match contents {
                Some(data) => {
                    header.set_entry_type(tar::EntryType::Regular);
                    header.set_size(data.len() as u64);
                    header.set_cksum();
                    builder.append_data(&mut header, path, &data[..]).unwrap();
                }
                None => {
                    header.set_entry_type(tar::EntryType::Directory);
                    header.set_size(0);
                    header.set_cksum();
                    builder
                        .append_data(&mut header, path, std::io::empty())
                        .unwrap();
                }
            }
        }

        builder.finish().unwrap();
    }
    encoder.finish().unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_counts_calls_and_replays_bodies() {
        let stub = StubTransport::new();
        stub.insert("http://reg.local/x", "body");

        assert_eq!(stub.get("http://reg.local/x").await.unwrap(), "body");
        assert!(stub.get("http://reg.local/missing").await.is_err());
        assert_eq!(stub.calls(), 2);
        assert_eq!(stub.requested().len(), 2);
    }

    #[tokio::test]
    async fn failing_stub_errors_every_request() {
        let stub = StubTransport::new();
        stub.insert("http://reg.local/x", "body");
        stub.set_failing(true);

        assert!(stub.get("http://reg.local/x").await.is_err());
    }

    #[test]
    fn build_archive_produces_gzip() {
        let archive = build_archive(&[("pkg-1.0/kibana/dashboard/a.json", Some(b"{}"))]);
        assert_eq!(&archive[..2], &[0x1f, 0x8b]);
    }
}
