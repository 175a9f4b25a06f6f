use thiserror::Error;
use validator::ValidationErrors;

/// Configuration could not be loaded or failed validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Validation(String),

    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<ValidationErrors> for ConfigError {
    fn from(errors: ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(_, errors)| {
                errors
                    .iter()
                    .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            })
            .collect();
        if messages.is_empty() {
            ConfigError::Validation(errors.to_string())
        } else {
            ConfigError::Validation(messages.join(", "))
        }
    }
}

/// Sample input at the ingestion boundary was unusable.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Sample parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No samples in input")]
    Empty,
}
