use crate::config::{ClientConfig, ConfigUpdate};
use crate::endpoints::{validate_endpoint, ResponseFormat};
use crate::error::{DirectoryError, Result};
use crate::orchestrator::{AddressResolver, SearchOrchestrator};
use crate::params::{
    ChangesParams, CoverageAreaParams, FieldKeysParams, FieldValuesParams, FormatsParams,
    NawsDumpParams, SearchParams, ServerInfoParams, ServiceBodiesParams,
};
use crate::query::build_url;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Body of a `client_interface` response.
///
/// `json` responses are parsed; `jsonp`, `csv` and `tsml` are returned as the raw text.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryResponse {
    Json(Value),
    Text(String),
}

impl DirectoryResponse {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// Pretty JSON for parsed bodies, the raw text otherwise.
    pub fn to_text(&self) -> Result<String> {
        match self {
            Self::Json(value) => Ok(serde_json::to_string_pretty(value)?),
            Self::Text(text) => Ok(text.clone()),
        }
    }
}

pub struct DirectoryClient {
    http: reqwest::Client,
    config: ClientConfig,
    orchestrator: SearchOrchestrator,
}

impl DirectoryClient {
    pub fn new(config: ClientConfig, resolver: Arc<dyn AddressResolver>) -> Result<Self> {
        Ok(Self {
            http: build_http(&config)?,
            config,
            orchestrator: SearchOrchestrator::new(resolver),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn update_config(&mut self, update: ConfigUpdate) -> Result<()> {
        let mut config = self.config.clone();
        if config.apply(update) {
            self.http = build_http(&config)?;
        }
        self.config = config;
        Ok(())
    }

    pub fn orchestrator(&self) -> &SearchOrchestrator {
        &self.orchestrator
    }

    /// `GetSearchResults` with the parameters sent exactly as given.
    pub async fn get_search_results(
        &self,
        params: &SearchParams,
        format: Option<ResponseFormat>,
    ) -> Result<DirectoryResponse> {
        let format = self.format_or_default(format);
        validate_endpoint("GetSearchResults", format)?;
        self.make_request(format, "GetSearchResults", params).await
    }

    /// `GetSearchResults`, geocoding address searches into coordinate searches first.
    pub async fn smart_search_results(
        &self,
        params: SearchParams,
        format: Option<ResponseFormat>,
    ) -> Result<DirectoryResponse> {
        let format = self.format_or_default(format);
        validate_endpoint("GetSearchResults", format)?;
        let prepared = self.orchestrator.prepare(params).await;
        log::debug!("Search plan: {:?}", prepared.plan);
        self.make_request(format, "GetSearchResults", &prepared.params)
            .await
    }

    pub async fn get_formats(
        &self,
        params: &FormatsParams,
        format: Option<ResponseFormat>,
    ) -> Result<DirectoryResponse> {
        self.call_endpoint("GetFormats", params, format).await
    }

    pub async fn get_service_bodies(
        &self,
        params: &ServiceBodiesParams,
        format: Option<ResponseFormat>,
    ) -> Result<DirectoryResponse> {
        self.call_endpoint("GetServiceBodies", params, format).await
    }

    pub async fn get_changes(
        &self,
        params: &ChangesParams,
        format: Option<ResponseFormat>,
    ) -> Result<DirectoryResponse> {
        params.validate()?;
        self.call_endpoint("GetChanges", params, format).await
    }

    pub async fn get_field_keys(
        &self,
        params: &FieldKeysParams,
        format: Option<ResponseFormat>,
    ) -> Result<DirectoryResponse> {
        self.call_endpoint("GetFieldKeys", params, format).await
    }

    pub async fn get_field_values(
        &self,
        params: &FieldValuesParams,
        format: Option<ResponseFormat>,
    ) -> Result<DirectoryResponse> {
        let format = self.format_or_default(format);
        validate_endpoint("GetFieldValues", format)?;
        if params.meeting_key.trim().is_empty() {
            return Err(DirectoryError::MissingParam {
                param: "meeting_key",
                operation: "GetFieldValues",
            });
        }
        self.make_request(format, "GetFieldValues", params).await
    }

    /// NAWS export; always CSV.
    pub async fn get_naws_dump(&self, params: &NawsDumpParams) -> Result<DirectoryResponse> {
        validate_endpoint("GetNAWSDump", ResponseFormat::Csv)?;
        if params.sb_id == 0 {
            return Err(DirectoryError::MissingParam {
                param: "sb_id",
                operation: "GetNAWSDump",
            });
        }
        self.make_request(ResponseFormat::Csv, "GetNAWSDump", params)
            .await
    }

    pub async fn get_server_info(
        &self,
        params: &ServerInfoParams,
        format: Option<ResponseFormat>,
    ) -> Result<DirectoryResponse> {
        self.call_endpoint("GetServerInfo", params, format).await
    }

    pub async fn get_coverage_area(
        &self,
        params: &CoverageAreaParams,
        format: Option<ResponseFormat>,
    ) -> Result<DirectoryResponse> {
        self.call_endpoint("GetCoverageArea", params, format).await
    }

    /// Any known operation with arbitrary parameters.
    pub async fn call_endpoint<P: Serialize + ?Sized + Sync>(
        &self,
        operation: &str,
        params: &P,
        format: Option<ResponseFormat>,
    ) -> Result<DirectoryResponse> {
        let format = self.format_or_default(format);
        validate_endpoint(operation, format)?;
        self.make_request(format, operation, params).await
    }

    fn format_or_default(&self, format: Option<ResponseFormat>) -> ResponseFormat {
        format.unwrap_or(self.config.default_format)
    }

    async fn make_request<P: Serialize + ?Sized + Sync>(
        &self,
        format: ResponseFormat,
        operation: &str,
        params: &P,
    ) -> Result<DirectoryResponse> {
        let url = build_url(&self.config.root_server_url, format, operation, params)?;
        log::debug!("Making request to: {url}");

        let response = self.http.get(url).send().await.map_err(|err| {
            log::warn!("Error making request to {operation}: {err}");
            DirectoryError::Http(err)
        })?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(&body)
                .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));
            log::warn!("Error making request to {operation}: {message}");
            return Err(DirectoryError::Status {
                status: status.as_u16(),
                message,
            });
        }

        if format.is_json() {
            Ok(DirectoryResponse::Json(serde_json::from_str(&body)?))
        } else {
            Ok(DirectoryResponse::Text(body))
        }
    }
}

impl std::fmt::Debug for DirectoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn build_http(config: &ClientConfig) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(config.timeout)
        .user_agent(config.user_agent.clone())
        .build()?)
}

fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}
