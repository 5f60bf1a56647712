//! Disk-backed response cache keyed by the SHA-256 of the exact request URL.
//!
//! An entry file holds one line of JSON metadata followed by the raw body bytes.
//! Entries that recorded a transport failure replay that failure, so a failed
//! request stays failed until its entry is removed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use bytes::Bytes;
use export_logging::{export_debug, export_warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use wp_export_core::CacheMode;

use crate::fetch::Fetcher;
use crate::persist::{AtomicFileWriter, PersistError};
use crate::{FailureKind, FetchError, FetchOutput};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to read cache entry {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("corrupt cache entry {path}: {message}")]
    Corrupt { path: PathBuf, message: String },
    #[error("failed to cache response: {0}")]
    Write(#[from] PersistError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct EntryHeader {
    request: String,
    status_code: u16,
    status: String,
    content_type: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    error: String,
}

/// What a cache lookup produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedResponse {
    Success(FetchOutput),
    Failure(String),
}

#[derive(Debug, Clone)]
pub struct ResponseCache {
    writer: AtomicFileWriter,
    mode: CacheMode,
}

impl ResponseCache {
    pub fn new(dir: PathBuf, mode: CacheMode) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir),
            mode,
        }
    }

    pub fn dir(&self) -> &Path {
        self.writer.dir()
    }

    pub fn key(url: &str) -> String {
        let digest = Sha256::digest(url.as_bytes());
        let mut hex = String::with_capacity(digest.len() * 2);
        for byte in digest.iter() {
            use std::fmt::Write;
            let _ = write!(&mut hex, "{byte:02x}");
        }
        hex
    }

    pub fn entry_path(&self, url: &str) -> PathBuf {
        self.dir().join(Self::key(url))
    }

    /// Look up `url`. Missing and expired entries are `Ok(None)`.
    pub fn load(&self, url: &str) -> Result<Option<CachedResponse>, CacheError> {
        let path = self.entry_path(url);
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(CacheError::Read { path, source }),
        };
        if self.is_expired(&path) {
            export_debug!("cache entry for {} expired", url);
            return Ok(None);
        }

        let split = raw
            .iter()
            .position(|b| *b == b'\n')
            .ok_or_else(|| CacheError::Corrupt {
                path: path.clone(),
                message: "missing header line".into(),
            })?;
        let header: EntryHeader =
            serde_json::from_slice(&raw[..split]).map_err(|err| CacheError::Corrupt {
                path: path.clone(),
                message: err.to_string(),
            })?;

        if !header.error.is_empty() {
            return Ok(Some(CachedResponse::Failure(header.error)));
        }
        Ok(Some(CachedResponse::Success(FetchOutput {
            url: header.request,
            status: header.status_code,
            status_line: header.status,
            content_type: header.content_type,
            body: Bytes::copy_from_slice(&raw[split + 1..]),
        })))
    }

    pub fn store_success(&self, output: &FetchOutput) -> Result<(), CacheError> {
        let header = EntryHeader {
            request: output.url.clone(),
            status_code: output.status,
            status: output.status_line.clone(),
            content_type: output.content_type.clone(),
            error: String::new(),
        };
        self.store(&header, &output.body)
    }

    pub fn store_failure(&self, url: &str, message: &str) -> Result<(), CacheError> {
        let header = EntryHeader {
            request: url.to_string(),
            error: message.to_string(),
            ..EntryHeader::default()
        };
        self.store(&header, &[])
    }

    fn store(&self, header: &EntryHeader, body: &[u8]) -> Result<(), CacheError> {
        let key = Self::key(&header.request);
        let mut content = serde_json::to_vec(header).map_err(|err| CacheError::Corrupt {
            path: self.dir().join(&key),
            message: err.to_string(),
        })?;
        content.push(b'\n');
        content.extend_from_slice(body);
        self.writer.write(&key, &content)?;
        Ok(())
    }

    fn is_expired(&self, path: &Path) -> bool {
        let CacheMode::Revalidate { max_age } = self.mode else {
            return false;
        };
        let modified = match fs::metadata(path).and_then(|meta| meta.modified()) {
            Ok(modified) => modified,
            Err(_) => return true,
        };
        SystemTime::now()
            .duration_since(modified)
            .map(|age| age > max_age)
            .unwrap_or(false)
    }
}

/// A [`Fetcher`] that consults a [`ResponseCache`] before the network.
pub struct CachingFetcher<F> {
    inner: F,
    cache: Option<ResponseCache>,
}

impl<F: Fetcher> CachingFetcher<F> {
    pub fn new(inner: F, cache: Option<ResponseCache>) -> Self {
        Self { inner, cache }
    }

    pub fn uncached(inner: F) -> Self {
        Self::new(inner, None)
    }
}

#[async_trait::async_trait]
impl<F: Fetcher> Fetcher for CachingFetcher<F> {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        let Some(cache) = self.cache.as_ref() else {
            return self.inner.fetch(url).await;
        };

        match cache.load(url) {
            Ok(Some(CachedResponse::Success(output))) => return Ok(output),
            Ok(Some(CachedResponse::Failure(message))) => {
                return Err(FetchError::new(FailureKind::Cached, message));
            }
            Ok(None) => {}
            Err(err) => export_warn!("error decoding cached response for {}: {}", url, err),
        }

        match self.inner.fetch(url).await {
            Ok(output) => {
                cache
                    .store_success(&output)
                    .map_err(|err| FetchError::new(FailureKind::CacheWrite, err.to_string()))?;
                Ok(output)
            }
            Err(err) => {
                cache
                    .store_failure(url, &err.to_string())
                    .map_err(|err| FetchError::new(FailureKind::CacheWrite, err.to_string()))?;
                Err(err)
            }
        }
    }
}
