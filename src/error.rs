use serde::Serialize;
use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Analysis Error: {0}")]
    Analysis(#[from] AnalysisError),
    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),
}

// Errors raised while loading or validating a model or while analyzing one image.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("No classifier and class mapping are loaded")]
    NotConfigured,
    #[error("Invalid image: {0}")]
    InvalidImage(String),
    #[error("Invalid class mapping: {0}")]
    InvalidMapping(String),
    #[error("The class mapping declares {declared} classes but the classifier outputs {model_outputs}")]
    ClassCountMismatch {
        declared: usize,
        model_outputs: usize,
    },
    #[error("Inference failed: {0}")]
    Inference(String),
    #[error("Failed to render chart: {0}")]
    Render(String),
    #[error("Worker task failed: {0}")]
    Task(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotConfigured,
    InvalidImage,
    InvalidMapping,
    ClassCountMismatch,
    Inference,
    Render,
    Task,
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::NotConfigured => ErrorKind::NotConfigured,
            AnalysisError::InvalidImage(_) => ErrorKind::InvalidImage,
            AnalysisError::InvalidMapping(_) => ErrorKind::InvalidMapping,
            AnalysisError::ClassCountMismatch { .. } => ErrorKind::ClassCountMismatch,
            AnalysisError::Inference(_) => ErrorKind::Inference,
            AnalysisError::Render(_) => ErrorKind::Render,
            AnalysisError::Task(_) => ErrorKind::Task,
        }
    }

    /// True when the service itself is not ready, as opposed to the submitted image being bad.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            AnalysisError::NotConfigured | AnalysisError::ClassCountMismatch { .. }
        )
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for AnalysisError {
    fn from(err: tokio::task::JoinError) -> Self {
        AnalysisError::Task(err.to_string())
    }
}

/// Structured failure handed back to callers in place of a result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid setting '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_are_distinguished_from_image_errors() {
        assert!(AnalysisError::NotConfigured.is_configuration_error());
        assert!(AnalysisError::ClassCountMismatch {
            declared: 4,
            model_outputs: 3
        }
        .is_configuration_error());
        assert!(!AnalysisError::InvalidImage("corrupt".into()).is_configuration_error());
        assert!(!AnalysisError::InvalidMapping("bad key".into()).is_configuration_error());
    }

    #[test]
    fn report_serializes_kind_and_message() {
        let report = AnalysisError::ClassCountMismatch {
            declared: 4,
            model_outputs: 3,
        }
        .report();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "class_count_mismatch");
        assert_eq!(
            json["message"],
            "The class mapping declares 4 classes but the classifier outputs 3"
        );
    }
}
