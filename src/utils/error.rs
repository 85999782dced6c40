use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Upstream returned {status} for {url}")]
    UpstreamStatusError { status: u16, url: String },

    #[error("Browser automation failed: {message}")]
    BrowserError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unknown site profile: {name}")]
    UnknownSiteError { name: String },

    #[error("Could not parse page: {message}")]
    ParseError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Upstream,
    Browser,
    Configuration,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LookupError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LookupError::ValidationError { .. } => ErrorCategory::Input,
            LookupError::HttpError(_) => ErrorCategory::Network,
            LookupError::UpstreamStatusError { .. } | LookupError::ParseError { .. } => {
                ErrorCategory::Upstream
            }
            LookupError::BrowserError { .. } => ErrorCategory::Browser,
            LookupError::ConfigError { .. }
            | LookupError::InvalidConfigValueError { .. }
            | LookupError::UnknownSiteError { .. } => ErrorCategory::Configuration,
            LookupError::IoError(_)
            | LookupError::SerializationError(_)
            | LookupError::UrlError(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Network | ErrorCategory::Upstream | ErrorCategory::Browser => {
                ErrorSeverity::Medium
            }
            ErrorCategory::Configuration | ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for a failure of this severity.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LookupError::ValidationError { message } => message.clone(),
            LookupError::HttpError(e) if e.is_timeout() => {
                "The tax-record site did not answer in time".to_string()
            }
            LookupError::HttpError(_) => "Could not reach the tax-record site".to_string(),
            LookupError::UpstreamStatusError { status, .. } => {
                format!("The tax-record site answered with HTTP {}", status)
            }
            LookupError::BrowserError { .. } => "The headless browser session failed".to_string(),
            LookupError::UnknownSiteError { name } => format!("No site profile named '{}'", name),
            LookupError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Use the form: number + street name + abbreviated type, e.g. \"192 olean ave\"",
            ErrorCategory::Network => "Check your network connection and try again",
            ErrorCategory::Upstream => "The site may be down or its markup may have changed; retry later or run with --debug",
            ErrorCategory::Browser => "Make sure Chromium is installed or set lookup.chromium_path",
            ErrorCategory::Configuration => "Run with --list-sites and check the configuration file",
            ErrorCategory::Internal => "Run with --verbose and report the log output",
        }
    }
}

pub type Result<T> = std::result::Result<T, LookupError>;
