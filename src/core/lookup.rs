use crate::core::{AddressQuery, Diagnostics, LookupOutcome, LookupReport, RecordFetcher};
use crate::utils::error::LookupError;
use chrono::Utc;

/// Runs validate, fetch and report for a single address.
pub struct LookupEngine<F: RecordFetcher> {
    fetcher: F,
    site: String,
}

impl<F: RecordFetcher> LookupEngine<F> {
    pub fn new(fetcher: F, site: impl Into<String>) -> Self {
        Self {
            fetcher,
            site: site.into(),
        }
    }

    pub async fn run(&self, input: &str) -> LookupReport {
        let mut diagnostics = Diagnostics::new();

        let query = match AddressQuery::parse(input) {
            Ok(query) => query,
            Err(LookupError::ValidationError { message }) => {
                tracing::warn!("Rejected address {:?}: {}", input, message);
                let outcome = LookupOutcome::Invalid { reason: message };
                return self.report(input, None, outcome, diagnostics);
            }
            Err(error) => {
                tracing::error!("Address validation could not run: {}", error);
                return self.report(input, None, LookupOutcome::Failed { error }, diagnostics);
            }
        };

        tracing::info!("Searching {} for \"{}\"", self.site, query);

        let outcome = match self.fetcher.fetch(&query, &mut diagnostics).await {
            Ok(Some(url)) => {
                tracing::info!("Found property record at {}", url);
                LookupOutcome::Found { url }
            }
            Ok(None) => {
                tracing::info!("No detail link matched \"{}\"", query);
                LookupOutcome::NotFound
            }
            Err(error) => {
                tracing::error!(
                    "Lookup failed: {} (Category: {:?}, Severity: {:?})",
                    error,
                    error.category(),
                    error.severity()
                );
                tracing::error!("Recovery suggestion: {}", error.recovery_suggestion());
                diagnostics.record("Error", error.to_string());
                LookupOutcome::Failed { error }
            }
        };

        self.report(input, Some(query), outcome, diagnostics)
    }

    fn report(
        &self,
        input: &str,
        query: Option<AddressQuery>,
        outcome: LookupOutcome,
        diagnostics: Diagnostics,
    ) -> LookupReport {
        LookupReport {
            input: input.to_string(),
            query,
            site: self.site.clone(),
            outcome,
            diagnostics,
            checked_at: Utc::now(),
        }
    }
}
