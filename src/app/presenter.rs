use crate::core::{Diagnostics, LookupOutcome, LookupReport, Presenter};
use crate::domain::model::{AddressQuery, DiagnosticEntry};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

pub const FOUND_MESSAGE: &str = "Property found! Click below to view details:";
pub const NOT_FOUND_MESSAGE: &str =
    "Property not found or an error occurred. Please check the address and try again.";
pub const DETAIL_LINK_LABEL: &str = "View Property Details";

/// One line summary shown to the user; not-found and failed read the same.
pub fn outcome_message(outcome: &LookupOutcome) -> String {
    match outcome {
        LookupOutcome::Found { .. } => FOUND_MESSAGE.to_string(),
        LookupOutcome::Invalid { reason } => reason.clone(),
        LookupOutcome::NotFound | LookupOutcome::Failed { .. } => NOT_FOUND_MESSAGE.to_string(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextPresenter {
    show_diagnostics: bool,
}

impl TextPresenter {
    pub fn new(show_diagnostics: bool) -> Self {
        Self { show_diagnostics }
    }

    fn write_diagnostics(&self, diagnostics: &Diagnostics, out: &mut dyn Write) -> Result<()> {
        for entry in diagnostics.entries() {
            if entry.detail.contains('\n') {
                writeln!(out, "Debug: {}:", entry.label)?;
                writeln!(out, "{}", entry.detail.trim_end())?;
            } else {
                writeln!(out, "Debug: {}: {}", entry.label, entry.detail)?;
            }
        }
        Ok(())
    }
}

impl Presenter for TextPresenter {
    fn present(&self, report: &LookupReport, out: &mut dyn Write) -> Result<()> {
        if self.show_diagnostics {
            self.write_diagnostics(&report.diagnostics, out)?;
        }

        writeln!(out, "{}", outcome_message(&report.outcome))?;
        match &report.outcome {
            LookupOutcome::Found { url } => writeln!(out, "{}: {}", DETAIL_LINK_LABEL, url)?,
            LookupOutcome::Failed { error } if self.show_diagnostics => {
                writeln!(out, "{}", error.user_friendly_message())?;
                writeln!(out, "Suggestion: {}", error.recovery_suggestion())?;
            }
            _ => {}
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    input: &'a str,
    address: Option<&'a AddressQuery>,
    site: &'a str,
    status: &'static str,
    url: Option<&'a str>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    diagnostics: &'a [DiagnosticEntry],
    checked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPresenter;

impl Presenter for JsonPresenter {
    fn present(&self, report: &LookupReport, out: &mut dyn Write) -> Result<()> {
        let error = match &report.outcome {
            LookupOutcome::Failed { error } => Some(error.to_string()),
            _ => None,
        };
        let json = JsonReport {
            input: &report.input,
            address: report.query.as_ref(),
            site: &report.site,
            status: report.outcome.status(),
            url: report.outcome.url().map(|u| u.as_str()),
            message: outcome_message(&report.outcome),
            error,
            diagnostics: report.diagnostics.entries(),
            checked_at: report.checked_at,
        };
        serde_json::to_writer_pretty(&mut *out, &json)?;
        writeln!(out)?;
        Ok(())
    }
}
