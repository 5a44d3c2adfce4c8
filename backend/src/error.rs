//! Error handling for the Maize Advisor CLI
//!
//! Provides consistent error output in English and Swahili

use serde::Serialize;
use shared::{AdvisorError, ArtifactError, Language};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Pipeline errors
    #[error(transparent)]
    Advisor(#[from] AdvisorError),

    // Startup errors
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ConfigError),

    // Interactive input errors
    #[error("Input/output error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input ended before '{0}' was answered")]
    PromptClosed(String),

    #[error("HTTP client could not be built: {0}")]
    HttpClient(String),

    #[error("Output could not be written: {0}")]
    Output(#[from] serde_json::Error),
}

/// Error output structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_sw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorDetail {
    pub fn message(&self, language: Language) -> &str {
        match language {
            Language::English => &self.message_en,
            Language::Swahili => &self.message_sw,
        }
    }
}

impl AppError {
    /// Process exit status: 1 for request failures, 2 for startup failures
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Advisor(_)
            | AppError::Io(_)
            | AppError::PromptClosed(_)
            | AppError::Output(_) => 1,
            AppError::Artifact(_) | AppError::Configuration(_) | AppError::HttpClient(_) => 2,
        }
    }

    pub fn detail(&self) -> ErrorDetail {
        match self {
            AppError::Advisor(err) => ErrorDetail {
                code: err.code().to_string(),
                message_en: err.message_en(),
                message_sw: err.message_sw(),
                field: err.field().map(str::to_string),
            },
            AppError::Artifact(err) => ErrorDetail {
                code: err.code().to_string(),
                message_en: format!("Trained model files could not be loaded: {}", err),
                message_sw: format!("Faili za modeli hazikuweza kupakiwa: {}", err),
                field: None,
            },
            AppError::Configuration(err) => ErrorDetail {
                code: "CONFIGURATION_ERROR".to_string(),
                message_en: format!("Configuration error: {}", err),
                message_sw: format!("Hitilafu ya usanidi: {}", err),
                field: None,
            },
            AppError::Io(err) => ErrorDetail {
                code: "IO_ERROR".to_string(),
                message_en: format!("Could not read your answer: {}", err),
                message_sw: format!("Jibu lako halikuweza kusomwa: {}", err),
                field: None,
            },
            AppError::PromptClosed(field) => ErrorDetail {
                code: "INPUT_CLOSED".to_string(),
                message_en: format!("No answer was given for {}", field),
                message_sw: format!("Hakuna jibu lililotolewa kwa {}", field),
                field: Some(field.clone()),
            },
            AppError::Output(err) => ErrorDetail {
                code: "OUTPUT_ERROR".to_string(),
                message_en: format!("Output could not be written: {}", err),
                message_sw: format!("Matokeo hayakuweza kuandikwa: {}", err),
                field: None,
            },
            AppError::HttpClient(msg) => ErrorDetail {
                code: "CONFIGURATION_ERROR".to_string(),
                message_en: format!("HTTP client could not be built: {}", msg),
                message_sw: format!("Mteja wa HTTP hakuweza kuundwa: {}", msg),
                field: None,
            },
        }
    }

    pub fn response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.detail(),
        }
    }
}

/// Result type alias for CLI operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{DataProvider, TransportCause};

    #[test]
    fn test_exit_codes() {
        let request = AppError::from(AdvisorError::LocationNotFound("Atlantis".into()));
        assert_eq!(request.exit_code(), 1);

        let startup = AppError::from(ArtifactError::Missing("model.json".into()));
        assert_eq!(startup.exit_code(), 2);
    }

    #[test]
    fn test_detail_carries_code_and_field() {
        let err = AppError::from(AdvisorError::unknown_category("previous_crop", "rice"));
        let detail = err.detail();
        assert_eq!(detail.code, "UNKNOWN_CATEGORY");
        assert_eq!(detail.field.as_deref(), Some("previous_crop"));
        assert!(detail.message(Language::Swahili).contains("rice"));
    }

    #[test]
    fn test_unavailable_hides_transport_detail_from_farmer() {
        let err = AppError::from(AdvisorError::unavailable(
            DataProvider::Rainfall,
            TransportCause::HttpStatus(503),
        ));
        let detail = err.detail();
        assert_eq!(detail.code, "DATA_SOURCE_UNAVAILABLE");
        assert!(!detail.message_en.contains("503"));
    }
}
