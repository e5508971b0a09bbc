//! Query descriptors, backend requests and the response envelope

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Query evaluation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    /// Evaluated at a single point in time
    Instant,
    /// Evaluated across `[start, end]` every `step`
    Range,
}

impl QueryType {
    /// Backend endpoint serving this mode
    pub fn endpoint(&self) -> Endpoint {
        match self {
            QueryType::Instant => Endpoint::Query,
            QueryType::Range => Endpoint::QueryRange,
        }
    }
}

impl std::fmt::Display for QueryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryType::Instant => write!(f, "instant"),
            QueryType::Range => write!(f, "range"),
        }
    }
}

/// Caller-supplied query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    /// PromQL expression, forwarded unmodified
    pub query: String,

    /// Evaluation mode
    #[serde(rename = "type")]
    pub query_type: QueryType,

    /// Range start (RFC 3339 or unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    /// Range end (RFC 3339 or unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,

    /// Range resolution (duration or float seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
}

impl QueryDescriptor {
    /// Create an instant query
    pub fn instant(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            query_type: QueryType::Instant,
            start: None,
            end: None,
            step: None,
        }
    }

    /// Create a range query
    pub fn range(
        query: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
        step: impl Into<String>,
    ) -> Self {
        Self {
            query: query.into(),
            query_type: QueryType::Range,
            start: Some(start.into()),
            end: Some(end.into()),
            step: Some(step.into()),
        }
    }
}

/// Prometheus HTTP API endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `/api/v1/query`
    Query,
    /// `/api/v1/query_range`
    QueryRange,
}

impl Endpoint {
    /// Path segment under `/api/v1/`
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Query => "query",
            Endpoint::QueryRange => "query_range",
        }
    }
}

/// Range query missing one of its bounds
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Range queries require start, end, and step parameters")]
pub struct QueryValidationError {
    /// Names of the missing or empty parameters
    pub missing: Vec<&'static str>,
}

/// A single backend call derived from a descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendRequest {
    /// Target endpoint
    pub endpoint: Endpoint,

    /// Query string parameters, in send order
    pub params: Vec<(&'static str, String)>,
}

impl BackendRequest {
    /// Build the request for a descriptor.
    ///
    /// Instant queries carry only `query`; any range bounds are ignored.
    /// Range queries require non-empty `start`, `end` and `step`.
    pub fn from_descriptor(descriptor: &QueryDescriptor) -> Result<Self, QueryValidationError> {
        let mut params = vec![("query", descriptor.query.clone())];

        if descriptor.query_type == QueryType::Range {
            let bounds = [
                ("start", &descriptor.start),
                ("end", &descriptor.end),
                ("step", &descriptor.step),
            ];

            let missing: Vec<&'static str> = bounds
                .iter()
                .filter(|(_, value)| value.as_deref().is_none_or(str::is_empty))
                .map(|(name, _)| *name)
                .collect();

            if !missing.is_empty() {
                return Err(QueryValidationError { missing });
            }

            for (name, value) in bounds {
                if let Some(value) = value {
                    params.push((name, value.clone()));
                }
            }
        }

        Ok(Self {
            endpoint: descriptor.query_type.endpoint(),
            params,
        })
    }

    /// Full URL for this request against `base_url`
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/api/v1/{}",
            base_url.trim_end_matches('/'),
            self.endpoint.path()
        )
    }

    /// Look up a parameter value
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Envelope status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Failure classification carried in `errorType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Connection, DNS, TLS, timeout or body-read failure
    NetworkError,
    /// Backend HTTP status >= 400 or an unreadable body
    Unknown,
    /// Descriptor rejected before any I/O
    ValidationError,
}

/// Error half of the envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryFailure {
    /// Always [`ResponseStatus::Error`]
    pub status: ResponseStatus,

    /// Human-readable message
    pub error: String,

    /// Failure classification
    #[serde(rename = "errorType")]
    pub error_type: ErrorType,
}

/// Uniform result of a query
///
/// Successful backend bodies are forwarded verbatim; every failure class
/// collapses into `{status: "error", error, errorType}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryEnvelope {
    /// Backend body, untouched
    Forwarded(Value),
    /// Normalized failure
    Failed(QueryFailure),
}

impl QueryEnvelope {
    /// Create a failure envelope
    pub fn failure(error_type: ErrorType, message: impl Into<String>) -> Self {
        QueryEnvelope::Failed(QueryFailure {
            status: ResponseStatus::Error,
            error: message.into(),
            error_type,
        })
    }

    /// Check whether the backend answered with a usable body
    pub fn is_success(&self) -> bool {
        matches!(self, QueryEnvelope::Forwarded(_))
    }

    /// Envelope status
    pub fn status(&self) -> ResponseStatus {
        match self {
            QueryEnvelope::Forwarded(_) => ResponseStatus::Success,
            QueryEnvelope::Failed(failure) => failure.status,
        }
    }

    /// Failure classification, if this is a failure
    pub fn error_type(&self) -> Option<ErrorType> {
        match self {
            QueryEnvelope::Failed(failure) => Some(failure.error_type),
            QueryEnvelope::Forwarded(_) => None,
        }
    }

    /// Failure message, if this is a failure
    pub fn error_message(&self) -> Option<&str> {
        match self {
            QueryEnvelope::Failed(failure) => Some(&failure.error),
            QueryEnvelope::Forwarded(_) => None,
        }
    }

    /// Forwarded body, if this is a success
    pub fn data(&self) -> Option<&Value> {
        match self {
            QueryEnvelope::Forwarded(body) => Some(body),
            QueryEnvelope::Failed(_) => None,
        }
    }

    /// Convert to a JSON value
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}
