use crate::utils::error::{LookupError, Result};
use crate::utils::validation::validate_address;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use url::Url;

/// A street address that passed validation, lowercased and trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AddressQuery(String);

impl AddressQuery {
    pub fn parse(input: &str) -> Result<Self> {
        validate_address(input).map(AddressQuery)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AddressQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticEntry {
    pub label: String,
    pub detail: String,
}

/// Intermediate request/page state captured during one lookup.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<DiagnosticEntry>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, label: impl Into<String>, detail: impl Into<String>) {
        let label = label.into();
        let detail = detail.into();
        tracing::debug!("{}: {}", label, detail);
        self.entries.push(DiagnosticEntry { label, detail });
    }

    pub fn entries(&self) -> &[DiagnosticEntry] {
        &self.entries
    }

    pub fn find(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.detail.as_str())
    }
}

#[derive(Debug)]
pub enum LookupOutcome {
    Found { url: Url },
    NotFound,
    Invalid { reason: String },
    Failed { error: LookupError },
}

impl LookupOutcome {
    pub fn url(&self) -> Option<&Url> {
        match self {
            LookupOutcome::Found { url } => Some(url),
            _ => None,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            LookupOutcome::Found { .. } => "found",
            LookupOutcome::NotFound => "not_found",
            LookupOutcome::Invalid { .. } => "invalid",
            LookupOutcome::Failed { .. } => "failed",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            LookupOutcome::Found { .. } => 0,
            LookupOutcome::NotFound | LookupOutcome::Invalid { .. } => 1,
            LookupOutcome::Failed { error } => error.exit_code(),
        }
    }
}

/// Everything the presenter needs about one lookup.
#[derive(Debug)]
pub struct LookupReport {
    pub input: String,
    pub query: Option<AddressQuery>,
    pub site: String,
    pub outcome: LookupOutcome,
    pub diagnostics: Diagnostics,
    pub checked_at: DateTime<Utc>,
}
