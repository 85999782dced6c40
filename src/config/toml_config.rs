use crate::config::site::{builtin_sites, SiteProfile};
use crate::utils::error::{LookupError, Result};
use crate::utils::validation::{validate_positive_number, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub lookup: LookupSection,
    #[serde(default)]
    pub sites: Vec<SiteProfile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LookupSection {
    pub default_site: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
    pub show_diagnostics: Option<bool>,
    pub chromium_path: Option<String>,
}

impl TomlConfig {
    /// Loads and parses a TOML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LookupError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from a TOML string, expanding `${VAR}` first.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LookupError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LookupError::ConfigError {
            message: format!("env substitution pattern failed to compile: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(timeout) = self.lookup.timeout_seconds {
            validate_positive_number("lookup.timeout_seconds", timeout, 1)?;
        }

        let mut seen = HashSet::new();
        for site in &self.sites {
            site.validate()?;
            if !seen.insert(site.name.as_str()) {
                return Err(LookupError::InvalidConfigValueError {
                    field: "sites.name".to_string(),
                    value: site.name.clone(),
                    reason: "Site names must be unique".to_string(),
                });
            }
        }

        if let Some(default_site) = &self.lookup.default_site {
            if self.find_site(default_site).is_none() {
                return Err(LookupError::UnknownSiteError {
                    name: default_site.clone(),
                });
            }
        }

        Ok(())
    }

    /// Built-in profiles, with same-named file entries replacing them,
    /// followed by the file's new profiles.
    pub fn all_sites(&self) -> Vec<SiteProfile> {
        let mut sites = builtin_sites();
        for custom in &self.sites {
            match sites.iter_mut().find(|s| s.name == custom.name) {
                Some(existing) => *existing = custom.clone(),
                None => sites.push(custom.clone()),
            }
        }
        sites
    }

    pub fn find_site(&self, name: &str) -> Option<SiteProfile> {
        self.all_sites().into_iter().find(|s| s.name == name)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::site::{AccessMode, AddressCase, LinkMatcher, RequestMethod};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[lookup]
default_site = "my-town"
timeout_seconds = 20
show_diagnostics = true

[[sites]]
name = "my-town"
title = "My Town Property Lookup"
search_url = "https://records.example.org/search"
method = "get"
address_field = "q"
address_case = "upper"
parameters = [["county", "09"], ["district", "0906"]]

[sites.matcher]
kind = "row_address"
marker = "Details"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        config.validate().unwrap();

        assert_eq!(config.lookup.default_site.as_deref(), Some("my-town"));
        assert_eq!(config.lookup.timeout_seconds, Some(20));
        let site = config.find_site("my-town").unwrap();
        assert_eq!(site.method, RequestMethod::Get);
        assert_eq!(site.access, AccessMode::Http);
        assert_eq!(site.address_case, AddressCase::Upper);
        assert_eq!(site.parameters.len(), 2);
        assert!(!site.follow_detail);
        assert_eq!(
            site.matcher,
            LinkMatcher::RowAddress {
                marker: Some("Details".to_string())
            }
        );
    }

    #[test]
    fn test_file_site_overrides_builtin() {
        let toml_content = r#"
[[sites]]
name = "jersey-city"
search_url = "http://localhost:9999/prc6.cgi"
method = "post"
address_field = "location"

[sites.matcher]
kind = "anchor_address"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        config.validate().unwrap();

        let sites = config.all_sites();
        assert_eq!(sites.iter().filter(|s| s.name == "jersey-city").count(), 1);
        let site = config.find_site("jersey-city").unwrap();
        assert_eq!(site.search_url, "http://localhost:9999/prc6.cgi");
        assert_eq!(site.matcher, LinkMatcher::AnchorAddress);
        assert!(config.find_site("jersey-city-rows").is_some());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("NJ_LOOKUP_TEST_ENDPOINT", "https://test.records.example");

        let toml_content = r#"
[[sites]]
name = "env-site"
search_url = "${NJ_LOOKUP_TEST_ENDPOINT}/search"
address_field = "location"

[sites.matcher]
kind = "marker"
text = "More Info"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.sites[0].search_url,
            "https://test.records.example/search"
        );

        std::env::remove_var("NJ_LOOKUP_TEST_ENDPOINT");
    }

    #[test]
    fn test_config_validation() {
        let bad_url = r#"
[[sites]]
name = "broken"
search_url = "invalid-url"
address_field = "location"

[sites.matcher]
kind = "anchor_address"
"#;
        let config = TomlConfig::from_toml_str(bad_url).unwrap();
        assert!(config.validate().is_err());

        let unknown_default = r#"
[lookup]
default_site = "nowhere"
"#;
        let config = TomlConfig::from_toml_str(unknown_default).unwrap();
        assert!(matches!(
            config.validate(),
            Err(LookupError::UnknownSiteError { .. })
        ));

        let zero_timeout = r#"
[lookup]
timeout_seconds = 0
"#;
        let config = TomlConfig::from_toml_str(zero_timeout).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_site_names_rejected() {
        let toml_content = r#"
[[sites]]
name = "twin"
search_url = "https://a.example/search"
address_field = "q"
[sites.matcher]
kind = "anchor_address"

[[sites]]
name = "twin"
search_url = "https://b.example/search"
address_field = "q"
[sites.matcher]
kind = "anchor_address"
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[lookup]
user_agent = "file-test/1.0"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.lookup.user_agent.as_deref(), Some("file-test/1.0"));
        assert!(config.sites.is_empty());
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[lookup\nbroken").unwrap_err();
        assert!(matches!(err, LookupError::ConfigError { .. }));
    }
}
