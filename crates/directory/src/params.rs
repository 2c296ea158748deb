//! Request parameters for each `client_interface` operation, using BMLT's wire names.

use crate::error::{DirectoryError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single value or a list; lists are sent as repeated `key[]=` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(i64),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchParams {
    /// Specific meeting IDs to include/exclude (negative values exclude)
    pub meeting_ids: Option<OneOrMany<i64>>,

    /// Return the formats used by the found meetings (1) or not (0)
    pub get_used_formats: Option<u8>,
    /// Return only the used formats, without meetings (1)
    pub get_formats_only: Option<u8>,

    /// Days of week (1=Sunday, 2=Monday, ..., 7=Saturday; negative values exclude)
    pub weekdays: Option<OneOrMany<i32>>,
    /// Venue types (1=In-person, 2=Virtual, 3=Hybrid; negative values exclude)
    pub venue_types: Option<OneOrMany<i32>>,

    /// Format IDs to include/exclude
    pub formats: Option<OneOrMany<i64>>,
    /// How multiple formats combine: "AND" or "OR"
    pub formats_comparison_operator: Option<String>,

    /// Service body IDs to include/exclude
    pub services: Option<OneOrMany<i64>>,
    /// Include child service bodies (1) or not (0)
    pub recursive: Option<u8>,

    /// Text to search for in meeting data, or an address for location searches
    #[serde(rename = "SearchString")]
    pub search_string: Option<String>,
    /// Treat search string as address (1) or text (0). Address searches are geocoded first.
    #[serde(rename = "StringSearchIsAnAddress")]
    pub string_search_is_an_address: Option<u8>,
    /// Search radius in miles for address searches (default: 25)
    #[serde(rename = "SearchStringRadius")]
    pub search_string_radius: Option<f64>,

    /// Meetings starting after hour (0-23)
    #[serde(rename = "StartsAfterH")]
    #[schemars(range(min = 0, max = 23))]
    pub starts_after_h: Option<u8>,
    /// Meetings starting after minute (0-59)
    #[serde(rename = "StartsAfterM")]
    #[schemars(range(min = 0, max = 59))]
    pub starts_after_m: Option<u8>,
    /// Meetings starting before hour (0-23)
    #[serde(rename = "StartsBeforeH")]
    #[schemars(range(min = 0, max = 23))]
    pub starts_before_h: Option<u8>,
    /// Meetings starting before minute (0-59)
    #[serde(rename = "StartsBeforeM")]
    #[schemars(range(min = 0, max = 59))]
    pub starts_before_m: Option<u8>,
    /// Meetings ending before hour (0-23)
    #[serde(rename = "EndsBeforeH")]
    #[schemars(range(min = 0, max = 23))]
    pub ends_before_h: Option<u8>,
    /// Meetings ending before minute (0-59)
    #[serde(rename = "EndsBeforeM")]
    #[schemars(range(min = 0, max = 59))]
    pub ends_before_m: Option<u8>,

    /// Minimum duration, hours part
    #[serde(rename = "MinDurationH")]
    pub min_duration_h: Option<u8>,
    /// Minimum duration, minutes part
    #[serde(rename = "MinDurationM")]
    pub min_duration_m: Option<u8>,
    /// Maximum duration, hours part
    #[serde(rename = "MaxDurationH")]
    pub max_duration_h: Option<u8>,
    /// Maximum duration, minutes part
    #[serde(rename = "MaxDurationM")]
    pub max_duration_m: Option<u8>,

    /// Latitude for geographic search
    pub lat_val: Option<f64>,
    /// Longitude for geographic search
    pub long_val: Option<f64>,
    /// Search radius in miles (negative: auto-radius to that many meetings)
    pub geo_width: Option<f64>,
    /// Search radius in kilometers
    pub geo_width_km: Option<f64>,
    /// Sort results by distance from coordinates (1) or not (0)
    pub sort_results_by_distance: Option<u8>,

    /// Field key for field-specific search
    pub meeting_key: Option<String>,
    /// Value to match for `meeting_key`
    pub meeting_key_value: Option<String>,

    /// Comma-separated list of fields to return
    pub data_field_key: Option<String>,
    /// Comma-separated list of fields to sort by
    pub sort_keys: Option<String>,
    /// Preset sort: weekday, time, town, state, weekday_state
    pub sort_key: Option<String>,

    /// Number of results per page
    #[schemars(range(min = 1))]
    pub page_size: Option<u32>,
    /// Page number (starts at 1)
    #[schemars(range(min = 1))]
    pub page_num: Option<u32>,

    /// Published status filtering: omitted = only published meetings, 0 = all, -1 = only unpublished
    pub advanced_published: Option<NumberOrText>,

    /// Language code for format names
    pub lang_enum: Option<String>,

    /// Aggregator mode: restrict to these root server IDs
    pub root_server_ids: Option<OneOrMany<i64>>,

    /// JSONP callback name
    pub callback: Option<String>,
}

impl SearchParams {
    /// True when the request asks for the search string to be treated as an address.
    pub fn is_address_search(&self) -> bool {
        self.string_search_is_an_address == Some(1)
            && self
                .search_string
                .as_deref()
                .is_some_and(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormatsParams {
    /// Language code (e.g., "en", "de", "fr")
    pub lang_enum: Option<String>,
    /// Show all formats (1) or just used ones (0)
    pub show_all: Option<u8>,
    /// Specific format IDs to include/exclude
    pub format_ids: Option<OneOrMany<i64>>,
    /// Format key strings to filter by
    pub key_strings: Option<OneOrMany<String>>,
    /// JSONP callback name
    pub callback: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ServiceBodiesParams {
    /// Service body IDs to include/exclude
    pub services: Option<OneOrMany<i64>>,
    /// Include child service bodies (1) or not (0)
    pub recursive: Option<u8>,
    /// Include parent service bodies (1) or not (0)
    pub parents: Option<u8>,
    /// JSONP callback name
    pub callback: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChangesParams {
    /// Start date in YYYY-MM-DD format
    pub start_date: Option<String>,
    /// End date in YYYY-MM-DD format
    pub end_date: Option<String>,
    /// Specific meeting ID
    pub meeting_id: Option<i64>,
    /// Service body ID
    pub service_body_id: Option<i64>,
    /// JSONP callback name
    pub callback: Option<String>,
}

impl ChangesParams {
    pub fn validate(&self) -> Result<()> {
        for (param, value) in [
            ("start_date", self.start_date.as_deref()),
            ("end_date", self.end_date.as_deref()),
        ] {
            if let Some(value) = value {
                if !is_iso_date(value) {
                    return Err(DirectoryError::InvalidParam {
                        param,
                        message: format!("expected YYYY-MM-DD, got {value:?}"),
                    });
                }
            }
        }
        Ok(())
    }
}

fn is_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldKeysParams {
    /// JSONP callback name
    pub callback: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldValuesParams {
    /// The field key to get values for (required)
    pub meeting_key: String,
    /// Comma-separated list of format IDs to limit field values to
    pub specific_formats: Option<String>,
    /// Include all formats (not just specific ones)
    pub all_formats: Option<bool>,
    /// JSONP callback name
    pub callback: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NawsDumpParams {
    /// Service body ID (required)
    pub sb_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ServerInfoParams {
    /// JSONP callback name
    pub callback: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CoverageAreaParams {
    /// JSONP callback name
    pub callback: Option<String>,
}
