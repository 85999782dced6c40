pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{CliConfig, OutputFormat};

pub use app::fetchers::{HttpRecordFetcher, SiteFetcher};
pub use app::presenter::{JsonPresenter, TextPresenter};
pub use config::{toml_config::TomlConfig, LookupConfig, Overrides};
pub use crate::core::lookup::LookupEngine;
pub use utils::error::{LookupError, Result};
