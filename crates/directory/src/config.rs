use crate::endpoints::ResponseFormat;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

pub fn default_user_agent() -> String {
    format!("bmlt-mcp-server/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub root_server_url: String,
    pub default_format: ResponseFormat,
    #[serde(with = "duration_ms")]
    pub timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(root_server_url: impl Into<String>) -> Self {
        Self {
            root_server_url: root_server_url.into(),
            default_format: ResponseFormat::Json,
            timeout: DEFAULT_TIMEOUT,
            user_agent: default_user_agent(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Applies the fields that are set; returns true when the HTTP client must be rebuilt.
    pub fn apply(&mut self, update: ConfigUpdate) -> bool {
        let mut rebuild = false;
        if let Some(url) = update.root_server_url {
            self.root_server_url = url;
        }
        if let Some(format) = update.default_format {
            self.default_format = format;
        }
        if let Some(timeout) = update.timeout {
            rebuild |= timeout != self.timeout;
            self.timeout = timeout;
        }
        if let Some(user_agent) = update.user_agent {
            rebuild |= user_agent != self.user_agent;
            self.user_agent = user_agent;
        }
        rebuild
    }
}

/// Partial update for [`ClientConfig`]; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigUpdate {
    pub root_server_url: Option<String>,
    pub default_format: Option<ResponseFormat>,
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis().try_into().unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
