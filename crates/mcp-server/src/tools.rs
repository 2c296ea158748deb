//! MCP tools for a BMLT root server.
//!
//! Each tool maps onto one `client_interface` operation. Meeting searches go through the
//! address-aware orchestrator so address strings are geocoded before they reach the server.

use bmlt_directory::{
    ChangesParams, CoverageAreaParams, DirectoryClient, DirectoryError, DirectoryResponse,
    FieldKeysParams, FieldValuesParams, FormatsParams, NawsDumpParams, ResponseFormat,
    SearchParams, ServerInfoParams, ServiceBodiesParams,
};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo, Tool};
use rmcp::schemars;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;
use std::sync::Arc;

const INSTRUCTIONS: &str = "BMLT tools query a meeting directory root server. Use \
'bmlt_search_meetings' to find meetings (set StringSearchIsAnAddress=1 to search around an \
address, or pass lat_val/long_val directly), 'bmlt_get_formats' and \
'bmlt_get_service_bodies' to decode format and service body IDs, and \
'bmlt_get_server_info' to check what the server supports.";

/// BMLT MCP service
#[derive(Clone)]
pub struct BmltService {
    client: Arc<DirectoryClient>,
    tool_router: ToolRouter<Self>,
}

impl BmltService {
    pub fn new(client: Arc<DirectoryClient>) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }

    /// The tool catalog, as served by `tools/list`.
    pub fn tool_catalog() -> Vec<Tool> {
        Self::tool_router().list_all()
    }
}

#[tool_handler]
impl ServerHandler for BmltService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }
}

// ============================================================================
// Tool Input Schemas
// ============================================================================

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct SearchMeetingsRequest {
    /// Response format (json, jsonp or tsml; default json)
    pub format: Option<ResponseFormat>,
    #[serde(flatten)]
    pub params: SearchParams,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct FormatsRequest {
    /// Response format (json or jsonp; default json)
    pub format: Option<ResponseFormat>,
    #[serde(flatten)]
    pub params: FormatsParams,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ServiceBodiesRequest {
    /// Response format (json or jsonp; default json)
    pub format: Option<ResponseFormat>,
    #[serde(flatten)]
    pub params: ServiceBodiesParams,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ChangesRequest {
    /// Response format (json or jsonp; default json)
    pub format: Option<ResponseFormat>,
    #[serde(flatten)]
    pub params: ChangesParams,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct FieldKeysRequest {
    /// Response format (json or jsonp; default json)
    pub format: Option<ResponseFormat>,
    #[serde(flatten)]
    pub params: FieldKeysParams,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct FieldValuesRequest {
    /// Response format (json or jsonp; default json)
    pub format: Option<ResponseFormat>,
    #[serde(flatten)]
    pub params: FieldValuesParams,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct NawsDumpRequest {
    #[serde(flatten)]
    pub params: NawsDumpParams,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ServerInfoRequest {
    /// Response format (json or jsonp; default json)
    pub format: Option<ResponseFormat>,
    #[serde(flatten)]
    pub params: ServerInfoParams,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct CoverageAreaRequest {
    /// Response format (json or jsonp; default json)
    pub format: Option<ResponseFormat>,
    #[serde(flatten)]
    pub params: CoverageAreaParams,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl BmltService {
    #[tool(
        description = "Search for meetings in the BMLT database with various filtering options including published status filtering. For location-based searches, use either an address string (StringSearchIsAnAddress=1; it is geocoded automatically, falling back to a text search) or specific lat_val/long_val coordinates for more reliable results."
    )]
    pub async fn bmlt_search_meetings(
        &self,
        Parameters(request): Parameters<SearchMeetingsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let response = self
            .client
            .smart_search_results(request.params, request.format)
            .await;
        respond("bmlt_search_meetings", response)
    }

    #[tool(description = "Retrieve available meeting formats from BMLT server")]
    pub async fn bmlt_get_formats(
        &self,
        Parameters(request): Parameters<FormatsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let response = self
            .client
            .get_formats(&request.params, request.format)
            .await;
        respond("bmlt_get_formats", response)
    }

    #[tool(description = "Get list of service bodies from BMLT server")]
    pub async fn bmlt_get_service_bodies(
        &self,
        Parameters(request): Parameters<ServiceBodiesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let response = self
            .client
            .get_service_bodies(&request.params, request.format)
            .await;
        respond("bmlt_get_service_bodies", response)
    }

    #[tool(description = "Retrieve meeting changes within a date range (dates as YYYY-MM-DD)")]
    pub async fn bmlt_get_changes(
        &self,
        Parameters(request): Parameters<ChangesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let response = self
            .client
            .get_changes(&request.params, request.format)
            .await;
        respond("bmlt_get_changes", response)
    }

    #[tool(description = "Get list of available field keys")]
    pub async fn bmlt_get_field_keys(
        &self,
        Parameters(request): Parameters<FieldKeysRequest>,
    ) -> Result<CallToolResult, McpError> {
        let response = self
            .client
            .get_field_keys(&request.params, request.format)
            .await;
        respond("bmlt_get_field_keys", response)
    }

    #[tool(description = "Get specific field values for a given field key")]
    pub async fn bmlt_get_field_values(
        &self,
        Parameters(request): Parameters<FieldValuesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let response = self
            .client
            .get_field_values(&request.params, request.format)
            .await;
        respond("bmlt_get_field_values", response)
    }

    #[tool(description = "Export meeting data in NAWS format (CSV)")]
    pub async fn bmlt_get_naws_dump(
        &self,
        Parameters(request): Parameters<NawsDumpRequest>,
    ) -> Result<CallToolResult, McpError> {
        let response = self.client.get_naws_dump(&request.params).await;
        respond("bmlt_get_naws_dump", response)
    }

    #[tool(description = "Get server information including version and configuration")]
    pub async fn bmlt_get_server_info(
        &self,
        Parameters(request): Parameters<ServerInfoRequest>,
    ) -> Result<CallToolResult, McpError> {
        let response = self
            .client
            .get_server_info(&request.params, request.format)
            .await;
        respond("bmlt_get_server_info", response)
    }

    #[tool(description = "Get geographic coverage area information")]
    pub async fn bmlt_get_coverage_area(
        &self,
        Parameters(request): Parameters<CoverageAreaRequest>,
    ) -> Result<CallToolResult, McpError> {
        let response = self
            .client
            .get_coverage_area(&request.params, request.format)
            .await;
        respond("bmlt_get_coverage_area", response)
    }
}

fn respond(
    tool: &str,
    response: bmlt_directory::Result<DirectoryResponse>,
) -> Result<CallToolResult, McpError> {
    let text = response
        .and_then(|body| body.to_text())
        .map_err(|err| tool_error(tool, err))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

fn tool_error(tool: &str, err: DirectoryError) -> McpError {
    log::error!("Error calling tool {tool}: {err}");
    match err {
        DirectoryError::UnknownEndpoint(_)
        | DirectoryError::UnsupportedFormat { .. }
        | DirectoryError::MissingParam { .. }
        | DirectoryError::InvalidParam { .. } => McpError::invalid_params(err.to_string(), None),
        other => McpError::internal_error(format!("Failed to call tool {tool}: {other}"), None),
    }
}
