use std::fmt;

use bytes::Bytes;

/// A completed HTTP exchange. Non-2xx statuses are data here, not errors: the
/// caller decides whether a 404 is fatal (API pages) or recoverable (assets).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub url: String,
    pub status: u16,
    /// Status code plus reason phrase, e.g. `404 Not Found`.
    pub status_line: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchOutput {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Failures that must abort the run rather than be recorded as a warning.
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind, FailureKind::CacheWrite)
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    Timeout,
    RedirectLimitExceeded,
    Network,
    /// A failure recorded by an earlier run and replayed from the response cache.
    Cached,
    CacheWrite,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Cached => write!(f, "cached failure"),
            FailureKind::CacheWrite => write!(f, "cache write failed"),
        }
    }
}
