#[cfg(feature = "browser")]
pub mod browser_fetcher;
pub mod http_fetcher;

use crate::config::site::AccessMode;
use crate::core::{AddressQuery, ConfigProvider, Diagnostics, RecordFetcher};
use crate::utils::error::Result;
use url::Url;

#[cfg(feature = "browser")]
pub use browser_fetcher::BrowserRecordFetcher;
pub use http_fetcher::HttpRecordFetcher;

/// The fetcher matching a site's access mode.
pub enum SiteFetcher<C: ConfigProvider> {
    Http(HttpRecordFetcher<C>),
    #[cfg(feature = "browser")]
    Browser(BrowserRecordFetcher<C>),
}

impl<C: ConfigProvider> SiteFetcher<C> {
    pub fn for_config(config: C) -> Result<Self> {
        let access = config.site().access;
        match access {
            AccessMode::Http => Ok(SiteFetcher::Http(HttpRecordFetcher::new(config)?)),
            #[cfg(feature = "browser")]
            AccessMode::Browser => Ok(SiteFetcher::Browser(BrowserRecordFetcher::new(config))),
            #[cfg(not(feature = "browser"))]
            AccessMode::Browser => Err(crate::utils::error::LookupError::ConfigError {
                message: format!(
                    "site '{}' needs browser access; rebuild with `--features browser`",
                    config.site().name
                ),
            }),
        }
    }
}

#[async_trait::async_trait]
impl<C: ConfigProvider> RecordFetcher for SiteFetcher<C> {
    async fn fetch(
        &self,
        query: &AddressQuery,
        diagnostics: &mut Diagnostics,
    ) -> Result<Option<Url>> {
        match self {
            SiteFetcher::Http(fetcher) => fetcher.fetch(query, diagnostics).await,
            #[cfg(feature = "browser")]
            SiteFetcher::Browser(fetcher) => fetcher.fetch(query, diagnostics).await,
        }
    }
}
