use crate::outcome::FailureKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeocodeError>;

/// Errors raised by a single geocoding attempt.
///
/// These never cross [`crate::GeocodeClient::geocode`]; the client folds them into a
/// [`crate::GeocodeOutcome::Failure`].
#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("Geocoding service rate limited the request (HTTP 429)")]
    RateLimited,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Could not connect to geocoding service: {0}")]
    Connect(String),

    #[error("Geocoding service returned server error {status}")]
    Server { status: u16 },

    #[error("Geocoding service returned status {status}")]
    Status { status: u16 },

    #[error("Geocoding request timed out")]
    Timeout,

    #[error("Invalid geocoding response: {0}")]
    InvalidResponse(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

/// How the retry loop should treat an attempt error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// HTTP 429: exponential backoff.
    RateLimited,
    /// Connection reset, unresolved host, 5xx: linear backoff.
    Transient,
    /// Everything else: give up immediately.
    Fatal,
}

impl GeocodeError {
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => Self::RateLimited,
            500..=599 => Self::Server { status },
            _ => Self::Status { status },
        }
    }

    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::RateLimited => RetryClass::RateLimited,
            Self::Network(_) | Self::Server { .. } => RetryClass::Transient,
            Self::Connect(_)
            | Self::Status { .. }
            | Self::Timeout
            | Self::InvalidResponse(_)
            | Self::Client(_) => RetryClass::Fatal,
        }
    }

    /// Failure kind reported once this error ends the attempt loop.
    pub fn failure_kind(&self) -> FailureKind {
        match self.retry_class() {
            RetryClass::RateLimited => FailureKind::RateLimited,
            RetryClass::Transient => FailureKind::NetworkError,
            RetryClass::Fatal => FailureKind::UnknownError,
        }
    }
}

impl From<reqwest::Error> for GeocodeError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_status(status.as_u16());
        }
        if err.is_timeout() {
            return Self::Timeout;
        }
        let detail = describe(&err);
        // Retry only dropped connections and unresolved hosts.
        if connection_reset_in_chain(&err) || dns_failure_in_chain(&err) {
            return Self::Network(detail);
        }
        if err.is_connect() {
            return Self::Connect(detail);
        }
        if err.is_decode() {
            return Self::InvalidResponse(detail);
        }
        Self::Client(detail)
    }
}

/// `err` followed by each distinct message in its source chain, joined with `": "`.
pub(crate) fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        let message = inner.to_string();
        if !message.is_empty() && !text.contains(&message) {
            text.push_str(": ");
            text.push_str(&message);
        }
        source = inner.source();
    }
    text
}

fn sources<'a>(
    err: &'a (dyn std::error::Error + 'static),
) -> impl Iterator<Item = &'a (dyn std::error::Error + 'static)> {
    std::iter::successors(err.source(), |&inner| inner.source())
}

fn connection_reset_in_chain(err: &(dyn std::error::Error + 'static)) -> bool {
    sources(err).any(|inner| {
        inner.downcast_ref::<std::io::Error>().is_some_and(|io| {
            matches!(
                io.kind(),
                std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::ConnectionAborted
            )
        })
    })
}

fn dns_failure_in_chain(err: &(dyn std::error::Error + 'static)) -> bool {
    sources(err).any(|inner| {
        let message = inner.to_string();
        message.starts_with("dns error") || message.contains("failed to lookup address")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_retry_classes() {
        assert_eq!(
            GeocodeError::from_status(429).retry_class(),
            RetryClass::RateLimited
        );
        assert_eq!(
            GeocodeError::from_status(503).retry_class(),
            RetryClass::Transient
        );
        assert_eq!(
            GeocodeError::from_status(404).retry_class(),
            RetryClass::Fatal
        );
    }

    #[test]
    fn refused_connections_are_fatal() {
        let err = GeocodeError::Connect("tcp connect error: Connection refused".into());
        assert_eq!(err.retry_class(), RetryClass::Fatal);
        assert_eq!(err.failure_kind(), FailureKind::UnknownError);
    }

    #[derive(Debug)]
    struct Layer(&'static str, Option<std::io::Error>);

    impl std::fmt::Display for Layer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.0)
        }
    }

    impl std::error::Error for Layer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            self.1
                .as_ref()
                .map(|io| io as &(dyn std::error::Error + 'static))
        }
    }

    #[test]
    fn chain_helpers_see_nested_io_errors() {
        let reset = Layer(
            "error sending request",
            Some(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            )),
        );
        assert!(connection_reset_in_chain(&reset));
        assert!(!dns_failure_in_chain(&reset));
        assert_eq!(
            describe(&reset),
            "error sending request: connection reset by peer"
        );

        let dns = Layer(
            "error sending request",
            Some(std::io::Error::other("dns error: failed to lookup address information")),
        );
        assert!(dns_failure_in_chain(&dns));
        assert!(!connection_reset_in_chain(&dns));

        let refused = Layer(
            "error sending request",
            Some(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Connection refused",
            )),
        );
        assert!(!connection_reset_in_chain(&refused));
        assert!(!dns_failure_in_chain(&refused));
    }

    #[test]
    fn exhausted_errors_report_their_failure_kind() {
        assert_eq!(
            GeocodeError::RateLimited.failure_kind(),
            FailureKind::RateLimited
        );
        assert_eq!(
            GeocodeError::Network("reset".into()).failure_kind(),
            FailureKind::NetworkError
        );
        assert_eq!(
            GeocodeError::InvalidResponse("bad lat".into()).failure_kind(),
            FailureKind::UnknownError
        );
    }
}
