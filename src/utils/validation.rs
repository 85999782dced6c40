use crate::utils::error::{LookupError, Result};
use regex::Regex;
use url::Url;

pub const ADDRESS_PATTERN: &str = r"^\d+\s+[a-zA-Z]+\s+(?:ave|st|rd|dr|ln|ct|pl|blvd|cir)$";

pub const EMPTY_ADDRESS_MESSAGE: &str = "Please enter an address";
pub const ADDRESS_FORMAT_MESSAGE: &str = "Please enter address in correct format: number + street name + abbreviated type (ave, st, rd, etc.)";

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Lowercases and trims `input`, then checks it against [`ADDRESS_PATTERN`].
///
/// Returns the normalized address. Internal whitespace is kept as typed.
pub fn validate_address(input: &str) -> Result<String> {
    let normalized = input.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(LookupError::ValidationError {
            message: EMPTY_ADDRESS_MESSAGE.to_string(),
        });
    }

    let re = Regex::new(ADDRESS_PATTERN).map_err(|e| LookupError::ConfigError {
        message: format!("address pattern failed to compile: {}", e),
    })?;

    if !re.is_match(&normalized) {
        return Err(LookupError::ValidationError {
            message: ADDRESS_FORMAT_MESSAGE.to_string(),
        });
    }

    Ok(normalized)
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(LookupError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(LookupError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(LookupError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(LookupError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LookupError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}
