use std::io::{self, Write};

use export_logging::{export_info, export_warn};
use wp_export_core::{ErrorReport, Verbosity};

use crate::persist::{AtomicFileWriter, PersistError};

pub const ERRORS_FILENAME: &str = "errors.json";

/// Progress notifications emitted by the fetch and export stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A collection page is being requested; `offset` is the index of its first record.
    FetchingPage { collection: String, offset: usize },
    /// A collection has been fully fetched.
    CollectionFetched { collection: String, count: usize },
    /// A post has started processing.
    Processing { path: String },
}

pub trait ProgressSink {
    fn emit(&mut self, event: ProgressEvent);
}

/// Per-run reporting context: the ephemeral status line, the page currently being
/// processed and the accumulated recoverable errors.
pub struct Reporter {
    verbosity: Verbosity,
    current_page: String,
    status_len: usize,
    needs_newline: bool,
    errors: ErrorReport,
    status_out: Box<dyn Write>,
}

impl Reporter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self::with_status_writer(verbosity, Box::new(io::stderr()))
    }

    pub fn with_status_writer(verbosity: Verbosity, status_out: Box<dyn Write>) -> Self {
        Self {
            verbosity,
            current_page: String::new(),
            status_len: 0,
            needs_newline: false,
            errors: ErrorReport::new(),
            status_out,
        }
    }

    pub fn set_current_page(&mut self, page: impl Into<String>) {
        self.current_page = page.into();
    }

    pub fn current_page(&self) -> &str {
        &self.current_page
    }

    pub fn errors(&self) -> &ErrorReport {
        &self.errors
    }

    /// Overwrite the status line. Shorter messages pad out the previous one.
    pub fn status(&mut self, message: &str) {
        if !self.verbosity.shows_progress() {
            return;
        }
        self.needs_newline = true;
        let mut line = format!("\r{message}");
        let len = message.chars().count();
        if len < self.status_len {
            line.push_str(&" ".repeat(self.status_len - len));
            line.push('\r');
        }
        self.status_len = len;
        let _ = self.status_out.write_all(line.as_bytes());
        let _ = self.status_out.flush();
    }

    /// Clear the status line and log `message` as a permanent line.
    pub fn end_status(&mut self, message: &str) {
        self.status("");
        self.needs_newline = false;
        self.info(message);
    }

    pub fn info(&mut self, message: &str) {
        self.break_status_line();
        export_info!("{}", message);
    }

    /// Record a recoverable problem against the current page.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.verbosity.shows_warnings() {
            self.break_status_line();
        }
        export_warn!("{}", message);
        self.errors
            .record_warning(self.current_page.clone(), message);
    }

    /// Record an asset that could not be localized.
    pub fn missing(&mut self, url: impl Into<String>, status: impl Into<String>) {
        self.errors
            .record_missing(self.current_page.clone(), url, status);
    }

    /// Summarize the run. Writes `errors.json` when anything was recorded.
    pub fn finish(&mut self, writer: &AtomicFileWriter) -> Result<(), PersistError> {
        if !self.errors.missing.is_empty() {
            let count = self.errors.missing.len();
            self.break_status_line();
            export_warn!("There were {} missing assets", count);
        }
        if !self.errors.warnings.is_empty() {
            let count = self.errors.warnings.len();
            self.break_status_line();
            export_warn!("There were {} warnings", count);
        }
        if !self.errors.is_empty() {
            writer.write_json(ERRORS_FILENAME, &self.errors)?;
        }
        Ok(())
    }

    fn break_status_line(&mut self) {
        if self.needs_newline {
            self.needs_newline = false;
            let _ = self.status_out.write_all(b"\n");
            let _ = self.status_out.flush();
        }
    }
}

impl ProgressSink for Reporter {
    fn emit(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::FetchingPage { collection, offset } => {
                self.status(&format!("fetching {collection} {offset} ..."))
            }
            ProgressEvent::CollectionFetched { collection, count } => {
                self.end_status(&format!("fetched {count} {collection}"))
            }
            ProgressEvent::Processing { path } => self.status(&format!("Processing {path}")),
        }
    }
}
