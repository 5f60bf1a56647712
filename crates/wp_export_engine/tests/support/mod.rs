#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use wp_export_core::Verbosity;
use wp_export_engine::{FailureKind, FetchError, FetchOutput, Fetcher, Reporter};

/// In-memory [`Fetcher`] with canned responses. Clones share state, so a test can
/// hand one clone to a wrapper and inspect the calls through another.
#[derive(Clone, Default)]
pub struct StubFetcher {
    responses: Arc<Mutex<HashMap<String, Result<FetchOutput, FetchError>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(&self, url: &str, content_type: &str, body: impl Into<Bytes>) -> &Self {
        self.respond(
            url,
            Ok(FetchOutput {
                url: url.to_string(),
                status: 200,
                status_line: "200 OK".to_string(),
                content_type: Some(content_type.to_string()),
                body: body.into(),
            }),
        )
    }

    pub fn status(&self, url: &str, status: u16, status_line: &str) -> &Self {
        self.respond(
            url,
            Ok(FetchOutput {
                url: url.to_string(),
                status,
                status_line: status_line.to_string(),
                content_type: Some("text/html".to_string()),
                body: Bytes::new(),
            }),
        )
    }

    pub fn fail(&self, url: &str, kind: FailureKind, message: &str) -> &Self {
        self.respond(url, Err(FetchError::new(kind, message)))
    }

    fn respond(&self, url: &str, response: Result<FetchOutput, FetchError>) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == url).count()
    }
}

#[async_trait::async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| {
                Err(FetchError::new(
                    FailureKind::Network,
                    format!("no stub for {url}"),
                ))
            })
    }
}

/// A reporter whose status line goes nowhere.
pub fn quiet_reporter() -> Reporter {
    Reporter::with_status_writer(Verbosity::Normal, Box::new(io::sink()))
}
