#[cfg(feature = "cli")]
pub mod cli;
pub mod site;
pub mod toml_config;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::{LookupError, Result};
use crate::utils::validation::validate_positive_number;
use site::{SiteProfile, DEFAULT_SITE};
use std::time::Duration;
use toml_config::TomlConfig;

pub const DEFAULT_USER_AGENT: &str = concat!("nj-tax-lookup/", env!("CARGO_PKG_VERSION"));

/// Settings for one lookup after merging flags, file and built-ins.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub site: SiteProfile,
    pub user_agent: String,
    pub timeout: Option<Duration>,
    pub show_diagnostics: bool,
    pub chromium_path: Option<String>,
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub site: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub show_diagnostics: bool,
}

impl LookupConfig {
    pub fn for_site(site: SiteProfile) -> Self {
        Self {
            site,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
            show_diagnostics: false,
            chromium_path: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn resolve(file: &TomlConfig, overrides: &Overrides) -> Result<Self> {
        let site_name = overrides
            .site
            .as_deref()
            .or(file.lookup.default_site.as_deref())
            .unwrap_or(DEFAULT_SITE);

        let site = file
            .find_site(site_name)
            .ok_or_else(|| LookupError::UnknownSiteError {
                name: site_name.to_string(),
            })?;

        let timeout_seconds = overrides.timeout_seconds.or(file.lookup.timeout_seconds);
        if let Some(secs) = timeout_seconds {
            validate_positive_number("timeout_seconds", secs, 1)?;
        }

        tracing::debug!("Resolved site profile: {}", site.name);

        Ok(Self {
            site,
            user_agent: file
                .lookup
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            timeout: timeout_seconds.map(Duration::from_secs),
            show_diagnostics: overrides.show_diagnostics
                || file.lookup.show_diagnostics.unwrap_or(false),
            chromium_path: file.lookup.chromium_path.clone(),
        })
    }
}

impl ConfigProvider for LookupConfig {
    fn site(&self) -> &SiteProfile {
        &self.site
    }

    fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn chromium_path(&self) -> Option<&str> {
        self.chromium_path.as_deref()
    }
}
