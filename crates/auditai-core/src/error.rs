use crate::config_manager::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    /// The submitted input cannot be analyzed as given.
    #[error("Invalid input: {0}")]
    Input(String),

    /// The block explorer lookup failed or returned no verified source.
    #[error("Source fetch failed: {0}")]
    UpstreamFetch(String),

    /// The generative model call itself failed.
    #[error("Model error{}: {message}", .status.map(|s| format!(" ({})", s)).unwrap_or_default())]
    Model {
        status: Option<u16>,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AuditError {
    pub fn model(message: impl Into<String>) -> Self {
        AuditError::Model {
            status: None,
            message: message.into(),
        }
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AuditError::Input(_) => "InputError",
            AuditError::UpstreamFetch(_) => "UpstreamFetchError",
            AuditError::Model { .. } => "ModelError",
            AuditError::Config(_) => "ConfigError",
        }
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_error_display_includes_status() {
        let err = AuditError::Model {
            status: Some(429),
            message: "quota exceeded".to_string(),
        };
        assert_eq!(err.to_string(), "Model error (429): quota exceeded");

        let err = AuditError::model("connection refused");
        assert_eq!(err.to_string(), "Model error: connection refused");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(AuditError::Input("x".into()).kind(), "InputError");
        assert_eq!(
            AuditError::UpstreamFetch("x".into()).kind(),
            "UpstreamFetchError"
        );
        assert_eq!(AuditError::model("x").kind(), "ModelError");
    }
}
