use crate::utils::error::{LookupError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_url, Validate};
use serde::{Deserialize, Serialize};

pub const TAXRECORDS_NJ_SEARCH_URL: &str =
    "https://taxrecords-nj.com/pub/cgi/prc6.cgi?ms_user=ctb09&district=0906&adv=1";
pub const MORE_INFO_MARKER: &str = "More Info";
pub const DEFAULT_SITE: &str = "jersey-city";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestMethod {
    #[default]
    Get,
    Post,
}

impl RequestMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    #[default]
    Http,
    Browser,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressCase {
    Upper,
    Lower,
    #[default]
    AsIs,
}

/// How a detail link is recognized in the search-results document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkMatcher {
    /// Anchor text contains a fixed marker, e.g. "More Info".
    Marker { text: String },
    /// Anchor text contains the address.
    AnchorAddress,
    /// Anchor sits in the table row whose text contains the address.
    RowAddress {
        #[serde(default)]
        marker: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteProfile {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub search_url: String,
    #[serde(default)]
    pub method: RequestMethod,
    #[serde(default)]
    pub access: AccessMode,
    pub address_field: String,
    #[serde(default)]
    pub address_case: AddressCase,
    /// Static jurisdiction fields sent with every search, in order.
    #[serde(default)]
    pub parameters: Vec<(String, String)>,
    pub matcher: LinkMatcher,
    #[serde(default)]
    pub follow_detail: bool,
}

impl SiteProfile {
    pub fn format_address(&self, address: &str) -> String {
        match self.address_case {
            AddressCase::Upper => address.to_uppercase(),
            AddressCase::Lower => address.to_lowercase(),
            AddressCase::AsIs => address.to_string(),
        }
    }

    /// The address field followed by the static parameters.
    pub fn form_fields(&self, address: &str) -> Vec<(String, String)> {
        let mut fields = Vec::with_capacity(self.parameters.len() + 1);
        fields.push((self.address_field.clone(), self.format_address(address)));
        fields.extend(self.parameters.iter().cloned());
        fields
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Property Lookup")
    }
}

impl Validate for SiteProfile {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("sites.name", &self.name)?;
        validate_url(&format!("sites.{}.search_url", self.name), &self.search_url)?;
        validate_non_empty_string(
            &format!("sites.{}.address_field", self.name),
            &self.address_field,
        )?;

        let marker = match &self.matcher {
            LinkMatcher::Marker { text } => Some(text.as_str()),
            LinkMatcher::RowAddress { marker } => marker.as_deref(),
            LinkMatcher::AnchorAddress => None,
        };
        if let Some(marker) = marker {
            if marker.trim().is_empty() {
                return Err(LookupError::InvalidConfigValueError {
                    field: format!("sites.{}.matcher", self.name),
                    value: marker.to_string(),
                    reason: "Marker text cannot be empty".to_string(),
                });
            }
        }

        Ok(())
    }
}

fn taxrecords_nj_parameters() -> Vec<(String, String)> {
    vec![
        // Current Owners/Assmt List
        ("database".to_string(), "0".to_string()),
        // Hudson
        ("county".to_string(), "09".to_string()),
    ]
}

pub fn builtin_sites() -> Vec<SiteProfile> {
    vec![
        SiteProfile {
            name: DEFAULT_SITE.to_string(),
            title: Some("Jersey City Property Lookup".to_string()),
            description: Some(
                "taxrecords-nj.com search, follows the \"More Info\" link".to_string(),
            ),
            search_url: TAXRECORDS_NJ_SEARCH_URL.to_string(),
            method: RequestMethod::Post,
            access: AccessMode::Http,
            address_field: "location".to_string(),
            address_case: AddressCase::Upper,
            parameters: taxrecords_nj_parameters(),
            matcher: LinkMatcher::Marker {
                text: MORE_INFO_MARKER.to_string(),
            },
            follow_detail: true,
        },
        SiteProfile {
            name: "jersey-city-rows".to_string(),
            title: Some("Jersey City Property Lookup".to_string()),
            description: Some(
                "taxrecords-nj.com search, picks the link in the row matching the address"
                    .to_string(),
            ),
            search_url: TAXRECORDS_NJ_SEARCH_URL.to_string(),
            method: RequestMethod::Post,
            access: AccessMode::Http,
            address_field: "location".to_string(),
            address_case: AddressCase::Upper,
            parameters: taxrecords_nj_parameters(),
            matcher: LinkMatcher::RowAddress { marker: None },
            follow_detail: false,
        },
        SiteProfile {
            name: "jersey-city-browser".to_string(),
            title: Some("Jersey City Property Lookup".to_string()),
            description: Some(
                "taxrecords-nj.com search driven through headless Chromium".to_string(),
            ),
            search_url: TAXRECORDS_NJ_SEARCH_URL.to_string(),
            method: RequestMethod::Post,
            access: AccessMode::Browser,
            address_field: "location".to_string(),
            address_case: AddressCase::Upper,
            parameters: taxrecords_nj_parameters(),
            matcher: LinkMatcher::Marker {
                text: MORE_INFO_MARKER.to_string(),
            },
            follow_detail: true,
        },
    ]
}
