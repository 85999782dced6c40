use crate::config::site::SiteProfile;
use crate::domain::model::{AddressQuery, Diagnostics, LookupReport};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::io::Write;
use std::time::Duration;
use url::Url;

pub trait ConfigProvider: Send + Sync {
    fn site(&self) -> &SiteProfile;
    fn user_agent(&self) -> &str;
    fn timeout(&self) -> Option<Duration>;
    fn chromium_path(&self) -> Option<&str>;
}

#[async_trait]
pub trait RecordFetcher: Send + Sync {
    /// Searches the upstream site for `query`.
    ///
    /// `Ok(None)` means the search ran but no detail link matched.
    async fn fetch(
        &self,
        query: &AddressQuery,
        diagnostics: &mut Diagnostics,
    ) -> Result<Option<Url>>;
}

pub trait Presenter {
    fn present(&self, report: &LookupReport, out: &mut dyn Write) -> Result<()>;
}
