//! Error taxonomy for the decision pipeline
//!
//! Every failure a request can hit maps to exactly one variant. Messages are
//! provided in English and Swahili and always name the offending field or
//! category so a farmer can correct the answer.

use serde::Serialize;
use thiserror::Error;

use crate::types::{DataProvider, Language};

/// Why an upstream provider could not be used. Transport libraries never
/// leak past this enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum TransportCause {
    Timeout,
    Connection,
    HttpStatus(u16),
    MalformedResponse(String),
    Request(String),
}

impl TransportCause {
    /// Short machine-readable cause code
    pub fn code(&self) -> &'static str {
        match self {
            TransportCause::Timeout => "timeout",
            TransportCause::Connection => "connection",
            TransportCause::HttpStatus(_) => "http_status",
            TransportCause::MalformedResponse(_) => "malformed_response",
            TransportCause::Request(_) => "request",
        }
    }

    /// Transient causes may be retried once by the transport layer.
    pub fn is_transient(&self) -> bool {
        matches!(self, TransportCause::Timeout | TransportCause::Connection)
    }
}

impl std::fmt::Display for TransportCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportCause::Timeout => f.write_str("request timed out"),
            TransportCause::Connection => f.write_str("connection failed"),
            TransportCause::HttpStatus(status) => write!(f, "provider returned HTTP {}", status),
            TransportCause::MalformedResponse(detail) => write!(f, "malformed response: {}", detail),
            TransportCause::Request(detail) => write!(f, "request failed: {}", detail),
        }
    }
}

/// Pipeline error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdvisorError {
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("{provider} data source unavailable: {cause}")]
    DataSourceUnavailable {
        provider: DataProvider,
        cause: TransportCause,
    },

    #[error("Soil data is missing required field '{field}'")]
    Validation { field: String },

    #[error("Unknown category '{value}' for field '{field}'")]
    UnknownCategory { field: String, value: String },

    #[error("No fitted parameters for '{field}'")]
    NotFitted { field: String },

    #[error("Incomplete input: '{field}' is missing")]
    IncompleteInput { field: String },

    #[error("Invalid input for '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Recommendation model is not loaded")]
    ModelNotLoaded,

    #[error("Feature vector has {actual} values, model expects {expected}")]
    FeatureWidthMismatch { expected: usize, actual: usize },

    #[error("Insufficient rainfall data: {actual} days available, {required} required")]
    InsufficientRainfallData { required: usize, actual: usize },

    #[error("Invalid rainfall series: {0}")]
    InvalidRainfallSeries(String),
}

impl AdvisorError {
    pub fn validation(field: impl Into<String>) -> Self {
        AdvisorError::Validation {
            field: field.into(),
        }
    }

    pub fn unknown_category(field: impl Into<String>, value: impl Into<String>) -> Self {
        AdvisorError::UnknownCategory {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn unavailable(provider: DataProvider, cause: TransportCause) -> Self {
        AdvisorError::DataSourceUnavailable { provider, cause }
    }

    /// Stable error code, one per taxonomy kind
    pub fn code(&self) -> &'static str {
        match self {
            AdvisorError::LocationNotFound(_) => "LOCATION_NOT_FOUND",
            AdvisorError::DataSourceUnavailable { .. } => "DATA_SOURCE_UNAVAILABLE",
            AdvisorError::Validation { .. } => "VALIDATION_ERROR",
            AdvisorError::UnknownCategory { .. } => "UNKNOWN_CATEGORY",
            AdvisorError::NotFitted { .. } => "NOT_FITTED",
            AdvisorError::IncompleteInput { .. } => "INCOMPLETE_INPUT",
            AdvisorError::InvalidInput { .. } => "INVALID_INPUT",
            AdvisorError::ModelNotLoaded => "MODEL_NOT_LOADED",
            AdvisorError::FeatureWidthMismatch { .. } => "FEATURE_WIDTH_MISMATCH",
            AdvisorError::InsufficientRainfallData { .. } => "INSUFFICIENT_RAINFALL_DATA",
            AdvisorError::InvalidRainfallSeries(_) => "INVALID_RAINFALL_SERIES",
        }
    }

    /// Field or category the error is about, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            AdvisorError::Validation { field }
            | AdvisorError::UnknownCategory { field, .. }
            | AdvisorError::NotFitted { field }
            | AdvisorError::IncompleteInput { field }
            | AdvisorError::InvalidInput { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Farmer-facing message in the requested language
    pub fn message(&self, language: Language) -> String {
        match language {
            Language::English => self.message_en(),
            Language::Swahili => self.message_sw(),
        }
    }

    pub fn message_en(&self) -> String {
        match self {
            AdvisorError::LocationNotFound(query) => format!(
                "Could not find \"{}\". Enter your County and Sub-county, e.g. Nakuru, Bahati",
                query
            ),
            AdvisorError::DataSourceUnavailable { provider, .. } => format!(
                "The {} data service is temporarily unavailable. Please try again later",
                provider
            ),
            AdvisorError::Validation { field } => format!(
                "Soil data for your area is incomplete ({} is missing). A recommendation cannot be made",
                field
            ),
            AdvisorError::UnknownCategory { field, value } => format!(
                "\"{}\" is not a recognised answer for {}. Please pick one of the listed options",
                value, field
            ),
            AdvisorError::NotFitted { field } => {
                format!("Encoding parameters for {} have not been loaded", field)
            }
            AdvisorError::IncompleteInput { field } => {
                format!("Input is incomplete: {} is missing", field)
            }
            AdvisorError::InvalidInput { field, reason } => {
                format!("Invalid answer for {}: {}", field, reason)
            }
            AdvisorError::ModelNotLoaded => {
                "The fertilizer recommendation model is not loaded".to_string()
            }
            AdvisorError::FeatureWidthMismatch { expected, actual } => format!(
                "Model expects {} input values but received {}",
                expected, actual
            ),
            AdvisorError::InsufficientRainfallData { required, actual } => format!(
                "Not enough rainfall data to advise: {} of {} required days available",
                actual, required
            ),
            AdvisorError::InvalidRainfallSeries(reason) => {
                format!("Rainfall data is invalid: {}", reason)
            }
        }
    }

    pub fn message_sw(&self) -> String {
        match self {
            AdvisorError::LocationNotFound(query) => format!(
                "Mahali \"{}\" hapakupatikana. Andika Kaunti na Kaunti ndogo, mfano: Nakuru, Bahati",
                query
            ),
            AdvisorError::DataSourceUnavailable { provider, .. } => format!(
                "Huduma ya data ya {} haipatikani kwa sasa. Tafadhali jaribu tena baadaye",
                provider.label_sw()
            ),
            AdvisorError::Validation { field } => format!(
                "Data ya udongo wa eneo lako haijakamilika ({} haipo). Pendekezo haliwezi kutolewa",
                field
            ),
            AdvisorError::UnknownCategory { field, value } => format!(
                "\"{}\" si jibu linalotambulika kwa {}. Tafadhali chagua moja ya chaguo zilizoorodheshwa",
                value, field
            ),
            AdvisorError::NotFitted { field } => {
                format!("Vigezo vya usimbaji vya {} havijapakiwa", field)
            }
            AdvisorError::IncompleteInput { field } => {
                format!("Taarifa haijakamilika: {} inakosekana", field)
            }
            AdvisorError::InvalidInput { field, reason } => {
                format!("Jibu la {} si sahihi: {}", field, reason)
            }
            AdvisorError::ModelNotLoaded => "Modeli ya mapendekezo ya mbolea haijapakiwa".to_string(),
            AdvisorError::FeatureWidthMismatch { expected, actual } => format!(
                "Modeli inatarajia thamani {} lakini imepokea {}",
                expected, actual
            ),
            AdvisorError::InsufficientRainfallData { required, actual } => format!(
                "Data ya mvua haitoshi: siku {} kati ya {} zinazohitajika zinapatikana",
                actual, required
            ),
            AdvisorError::InvalidRainfallSeries(reason) => {
                format!("Data ya mvua si sahihi: {}", reason)
            }
        }
    }
}

/// Result type alias for pipeline operations
pub type AdvisorResult<T> = Result<T, AdvisorError>;
