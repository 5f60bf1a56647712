use serde::{Deserialize, Serialize};

/// An asset that could not be localized because the server did not return 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Missing {
    pub page: String,
    pub url: String,
    pub status: String,
}

/// A recoverable problem, tagged with the page being processed when it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub page: String,
    pub message: String,
}

/// Everything recoverable that went wrong during one run; written to `errors.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub missing: Vec<Missing>,
    pub warnings: Vec<Warning>,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_missing(
        &mut self,
        page: impl Into<String>,
        url: impl Into<String>,
        status: impl Into<String>,
    ) {
        self.missing.push(Missing {
            page: page.into(),
            url: url.into(),
            status: status.into(),
        });
    }

    pub fn record_warning(&mut self, page: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(Warning {
            page: page.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.warnings.is_empty()
    }
}
