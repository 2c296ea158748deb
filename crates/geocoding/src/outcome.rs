use serde::Serialize;

/// A resolved coordinate pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodeHit {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    EmptyInput,
    NoResultsFound,
    RateLimited,
    NetworkError,
    UnknownError,
}

impl FailureKind {
    /// Only a definitive "no results" answer is worth remembering; everything else may
    /// succeed on a later call.
    pub fn is_cacheable(self) -> bool {
        matches!(self, Self::NoResultsFound)
    }
}

/// Result of a geocoding lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GeocodeOutcome {
    Success(GeocodeHit),
    Failure { kind: FailureKind, reason: String },
}

impl GeocodeOutcome {
    pub fn success(latitude: f64, longitude: f64, display_name: impl Into<String>) -> Self {
        Self::Success(GeocodeHit {
            latitude,
            longitude,
            display_name: display_name.into(),
        })
    }

    pub fn failure(kind: FailureKind, reason: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn hit(&self) -> Option<&GeocodeHit> {
        match self {
            Self::Success(hit) => Some(hit),
            Self::Failure { .. } => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success(_) => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure { reason, .. } => Some(reason),
        }
    }

    pub fn is_cacheable(&self) -> bool {
        match self {
            Self::Success(_) => true,
            Self::Failure { kind, .. } => kind.is_cacheable(),
        }
    }
}
