//! Error types for the card synthesis pipeline.
//!
//! This module defines the error types that can occur while turning raw
//! detections into a card document, along with utility constructors for
//! creating errors with appropriate context.

use thiserror::Error;

/// The fallible stages of the card synthesis pipeline.
///
/// Only stages with a fatal failure path appear here; the geometric
/// stages (overlap resolution, layout synthesis, data binding) cannot
/// fail and per-element extraction failures are isolated, not raised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessingStage {
    /// Normalizing raw detections into elements.
    Normalization,
    /// The custom image region sub-pipeline.
    ImageRegion,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Normalization => write!(f, "normalization"),
            ProcessingStage::ImageRegion => write!(f, "image region detection"),
        }
    }
}

/// Enum representing the errors that can occur in the card synthesis pipeline.
#[derive(Error, Debug)]
pub enum CardGenError {
    /// Error occurred while loading or decoding an image.
    #[error("image load")]
    ImageLoad(#[from] image::ImageError),

    /// Error occurred during a pipeline stage.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error from the external detection model collaborator.
    ///
    /// Detection failures are fatal for the current request and are never
    /// retried by the pipeline.
    #[error("detection")]
    Detection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

/// Convenient result alias for card synthesis operations.
pub type CardResult<T> = Result<T, CardGenError>;

impl CardGenError {
    /// Creates a CardGenError for a failure in a specific pipeline stage.
    ///
    /// # Arguments
    ///
    /// * `kind` - The stage where the error occurred.
    /// * `context` - Additional context about the error.
    /// * `error` - The underlying error that caused this error.
    pub fn processing_error(
        kind: ProcessingStage,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a CardGenError for a failed external detection call.
    pub fn detection_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Detection(Box::new(error))
    }

    /// Creates a CardGenError for invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a CardGenError for configuration errors.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Creates a CardGenError for configuration errors with field context.
    ///
    /// # Arguments
    ///
    /// * `field` - The field where the error occurred.
    /// * `value` - The value of the field.
    /// * `reason` - The reason for the error.
    pub fn config_error_with_context(field: &str, value: &str, reason: &str) -> Self {
        Self::ConfigError {
            message: format!(
                "Configuration error in field '{}' with value '{}': {}",
                field, value, reason
            ),
        }
    }

    /// Creates a CardGenError for resource limit errors.
    ///
    /// # Arguments
    ///
    /// * `resource` - The resource that exceeded its limit.
    /// * `limit` - The maximum allowed limit.
    /// * `requested` - The requested amount.
    pub fn resource_limit_error(resource: &str, limit: usize, requested: usize) -> Self {
        Self::InvalidInput {
            message: format!(
                "Resource limit exceeded for {}: requested {} but limit is {}",
                resource, requested, limit
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_stage_display() {
        assert_eq!(ProcessingStage::Normalization.to_string(), "normalization");
        assert_eq!(
            ProcessingStage::ImageRegion.to_string(),
            "image region detection"
        );
    }

    #[test]
    fn test_config_error_with_context() {
        let err = CardGenError::config_error_with_context("iou_threshold", "1.5", "out of range");
        assert!(err.to_string().contains("iou_threshold"));
    }

    #[test]
    fn test_resource_limit_error() {
        let err = CardGenError::resource_limit_error("upload", 2_000_000, 3_000_000);
        let msg = err.to_string();
        assert!(msg.contains("2000000"));
        assert!(msg.contains("3000000"));
    }
}
