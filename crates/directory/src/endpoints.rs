use crate::error::{DirectoryError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Json,
    Jsonp,
    Csv,
    Tsml,
}

impl ResponseFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Jsonp => "jsonp",
            Self::Csv => "csv",
            Self::Tsml => "tsml",
        }
    }

    /// Only plain `json` bodies are parsed; the other formats come back verbatim.
    pub fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub operation: &'static str,
    pub supported_formats: &'static [ResponseFormat],
    pub required_params: &'static [&'static str],
    pub description: &'static str,
}

impl Endpoint {
    pub fn supports(&self, format: ResponseFormat) -> bool {
        self.supported_formats.contains(&format)
    }
}

const JSON_ONLY: &[ResponseFormat] = &[ResponseFormat::Json, ResponseFormat::Jsonp];

pub const ENDPOINTS: &[Endpoint] = &[
    Endpoint {
        operation: "GetSearchResults",
        supported_formats: &[
            ResponseFormat::Json,
            ResponseFormat::Jsonp,
            ResponseFormat::Tsml,
        ],
        required_params: &[],
        description: "Search for meetings based on various criteria",
    },
    Endpoint {
        operation: "GetFormats",
        supported_formats: JSON_ONLY,
        required_params: &[],
        description: "Retrieve available meeting formats",
    },
    Endpoint {
        operation: "GetServiceBodies",
        supported_formats: JSON_ONLY,
        required_params: &[],
        description: "Get list of service bodies",
    },
    Endpoint {
        operation: "GetChanges",
        supported_formats: JSON_ONLY,
        required_params: &[],
        description: "Retrieve meeting changes within a date range",
    },
    Endpoint {
        operation: "GetFieldKeys",
        supported_formats: JSON_ONLY,
        required_params: &[],
        description: "Get list of available field keys",
    },
    Endpoint {
        operation: "GetFieldValues",
        supported_formats: JSON_ONLY,
        required_params: &["meeting_key"],
        description: "Get specific field values for a given field key",
    },
    Endpoint {
        operation: "GetNAWSDump",
        supported_formats: &[ResponseFormat::Csv],
        required_params: &["sb_id"],
        description: "Export meeting data in NAWS format",
    },
    Endpoint {
        operation: "GetServerInfo",
        supported_formats: JSON_ONLY,
        required_params: &[],
        description: "Get server information",
    },
    Endpoint {
        operation: "GetCoverageArea",
        supported_formats: JSON_ONLY,
        required_params: &[],
        description: "Get geographic coverage area information",
    },
];

pub fn endpoint(operation: &str) -> Option<&'static Endpoint> {
    ENDPOINTS.iter().find(|ep| ep.operation == operation)
}

pub fn validate_endpoint(operation: &str, format: ResponseFormat) -> Result<&'static Endpoint> {
    let ep = endpoint(operation).ok_or_else(|| DirectoryError::UnknownEndpoint(operation.into()))?;
    if !ep.supports(format) {
        return Err(DirectoryError::UnsupportedFormat {
            format,
            operation: operation.to_string(),
            supported: ep
                .supported_formats
                .iter()
                .map(|f| f.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        });
    }
    Ok(ep)
}
