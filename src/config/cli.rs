use crate::config::Overrides;
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "nj-tax-lookup")]
#[command(about = "Find the property-tax record page for a New Jersey street address")]
pub struct CliConfig {
    /// Address such as "192 olean ave"; prompted for when omitted
    pub address: Option<String>,

    /// Site profile to search
    #[arg(short, long)]
    pub site: Option<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Request timeout in seconds (library default when omitted)
    #[arg(long)]
    pub timeout: Option<u64>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Print intermediate request and page state
    #[arg(long)]
    pub debug: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    /// List known site profiles and exit
    #[arg(long)]
    pub list_sites: bool,
}

impl CliConfig {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            site: self.site.clone(),
            timeout_seconds: self.timeout,
            show_diagnostics: self.debug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_and_flags() {
        let cli = CliConfig::parse_from([
            "nj-tax-lookup",
            "192 olean ave",
            "--site",
            "jersey-city-rows",
            "--timeout",
            "10",
            "--format",
            "json",
            "--debug",
        ]);
        assert_eq!(cli.address.as_deref(), Some("192 olean ave"));
        assert_eq!(cli.format, OutputFormat::Json);

        let overrides = cli.overrides();
        assert_eq!(overrides.site.as_deref(), Some("jersey-city-rows"));
        assert_eq!(overrides.timeout_seconds, Some(10));
        assert!(overrides.show_diagnostics);
    }

    #[test]
    fn test_address_is_optional() {
        let cli = CliConfig::parse_from(["nj-tax-lookup", "--list-sites"]);
        assert!(cli.address.is_none());
        assert!(cli.list_sites);
        assert_eq!(cli.format, OutputFormat::Text);
    }
}
