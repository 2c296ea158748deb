//! Client for the BMLT root server `client_interface` API.
//!
//! Every request is a GET against `{root}/client_interface/{format}/?switcher={Operation}&...`.
//! Meeting searches go through [`SearchOrchestrator`], which turns address searches into
//! coordinate searches when the address can be geocoded and into plain text searches when it
//! cannot.

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod orchestrator;
pub mod params;
pub mod query;

pub use client::{DirectoryClient, DirectoryResponse};
pub use config::{ClientConfig, ConfigUpdate};
pub use endpoints::{endpoint, validate_endpoint, Endpoint, ResponseFormat, ENDPOINTS};
pub use error::{DirectoryError, Result};
pub use orchestrator::{
    AddressResolver, PreparedSearch, SearchOrchestrator, SearchPlan, DEFAULT_RADIUS,
};
pub use params::{
    ChangesParams, CoverageAreaParams, FieldKeysParams, FieldValuesParams, FormatsParams,
    NawsDumpParams, NumberOrText, OneOrMany, SearchParams, ServerInfoParams,
    ServiceBodiesParams,
};
pub use query::build_url;
