//! Error types for infrastructure generation.

use std::path::PathBuf;

use dataride_templates::TemplateError;
use thiserror::Error;

/// Result type alias for generation operations.
pub type InfraResult<T> = Result<T, InfraError>;

/// Broad error category, used to pick exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Template,
    DestinationConflict,
    Io,
}

/// Errors that can occur while generating infrastructure code.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("Configuration error in {entity}: {message}")]
    Configuration { entity: String, message: String },

    #[error("Template error: {0}")]
    Template(TemplateError),

    #[error("Destination already exists: {0}")]
    DestinationConflict(PathBuf),

    #[error("Asset copy failed: {0}")]
    AssetCopy(#[from] fs_extra::error::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl InfraError {
    pub fn configuration(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            entity: entity.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } | Self::Yaml(_) => ErrorKind::Configuration,
            Self::Template(_) | Self::Json(_) => ErrorKind::Template,
            Self::DestinationConflict(_) => ErrorKind::DestinationConflict,
            Self::AssetCopy(_) | Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Attach the offending entity to a value-type error raised during substitution.
    pub(crate) fn in_entity(self, entity: &str) -> Self {
        match self {
            Self::Configuration {
                entity: inner,
                message,
            } => Self::configuration(entity, format!("{}: {}", inner, message)),
            other => other,
        }
    }
}

impl From<TemplateError> for InfraError {
    fn from(error: TemplateError) -> Self {
        match error {
            TemplateError::UnsupportedValue { field, found } => Self::configuration(
                format!("field `{}`", field),
                format!("unsupported value type {} during substitution", found),
            ),
            other => Self::Template(other),
        }
    }
}
