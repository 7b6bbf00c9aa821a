//! Pipeline configuration and configuration file loading.
//!
//! The pipeline carries no module-level constants: every threshold and
//! feature flag lives in [`PipelineConfig`], which is passed in at
//! construction and validated before the first image is processed.
//! [`ConfigLoader`] loads and saves configurations in TOML or JSON format.

use crate::core::CardGenError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the card synthesis pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum confidence for a detection to survive normalization.
    pub score_threshold: f32,
    /// IoU above which two detections are treated as duplicates.
    pub iou_threshold: f32,
    /// Fraction of the smaller vertical span that must overlap for two
    /// elements to share a row.
    pub row_overlap_fraction: f32,
    /// When true, image elements are re-derived by the secondary image
    /// region detector instead of using the model-detected boxes.
    pub use_custom_image_pipeline: bool,
    /// Horizontal padding (pixels) applied to text claim boxes before
    /// duplicate removal and grouping.
    pub text_claim_padding: f32,
    /// Maximum size in bytes accepted for an encoded input image.
    pub max_upload_bytes: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            score_threshold: 0.90,
            iou_threshold: 0.5,
            row_overlap_fraction: 0.5,
            use_custom_image_pipeline: false,
            text_claim_padding: 5.0,
            max_upload_bytes: 2_000_000,
        }
    }
}

impl PipelineConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a `CardGenError::ConfigError` when a threshold is outside
    /// its valid range.
    pub fn validate(&self) -> Result<(), CardGenError> {
        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(CardGenError::config_error_with_context(
                "score_threshold",
                &self.score_threshold.to_string(),
                "must be between 0.0 and 1.0",
            ));
        }

        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(CardGenError::config_error_with_context(
                "iou_threshold",
                &self.iou_threshold.to_string(),
                "must be between 0.0 and 1.0",
            ));
        }

        if !(0.0..=1.0).contains(&self.row_overlap_fraction) {
            return Err(CardGenError::config_error_with_context(
                "row_overlap_fraction",
                &self.row_overlap_fraction.to_string(),
                "must be between 0.0 and 1.0",
            ));
        }

        if self.text_claim_padding < 0.0 || !self.text_claim_padding.is_finite() {
            return Err(CardGenError::config_error_with_context(
                "text_claim_padding",
                &self.text_claim_padding.to_string(),
                "must be a non-negative finite value",
            ));
        }

        if self.max_upload_bytes == 0 {
            return Err(CardGenError::config_error(
                "max_upload_bytes must be greater than 0",
            ));
        }

        Ok(())
    }
}

/// Configuration file format, keyed by file extension.
#[derive(Debug, Clone, Copy)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Loads and saves pipeline configurations in TOML or JSON.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads a configuration file, picking the format by extension.
    pub fn load_from_file(path: &Path) -> Result<PipelineConfig, CardGenError> {
        let format = ConfigFormat::from_extension(path).ok_or_else(|| {
            CardGenError::config_error(format!(
                "unsupported config extension: {:?}",
                path.extension()
            ))
        })?;

        let content = std::fs::read_to_string(path).map_err(|e| {
            CardGenError::config_error(format!("cannot read {}: {e}", path.display()))
        })?;

        Self::load_from_string(&content, format)
    }

    pub fn load_from_string(
        content: &str,
        format: ConfigFormat,
    ) -> Result<PipelineConfig, CardGenError> {
        match format {
            ConfigFormat::Toml => Self::load_from_toml(content),
            ConfigFormat::Json => Self::load_from_json(content),
        }
    }

    pub fn load_from_toml(content: &str) -> Result<PipelineConfig, CardGenError> {
        toml::from_str(content)
            .map_err(|e| CardGenError::config_error(format!("invalid TOML config: {e}")))
    }

    pub fn load_from_json(content: &str) -> Result<PipelineConfig, CardGenError> {
        serde_json::from_str(content)
            .map_err(|e| CardGenError::config_error(format!("invalid JSON config: {e}")))
    }

    /// Saves a configuration file, picking the format by extension.
    pub fn save_to_file(config: &PipelineConfig, path: &Path) -> Result<(), CardGenError> {
        let format = ConfigFormat::from_extension(path).ok_or_else(|| {
            CardGenError::config_error(format!(
                "unsupported config extension: {:?}",
                path.extension()
            ))
        })?;

        let content = Self::save_to_string(config, format)?;

        std::fs::write(path, content).map_err(|e| {
            CardGenError::config_error(format!("cannot write {}: {e}", path.display()))
        })
    }

    pub fn save_to_string(
        config: &PipelineConfig,
        format: ConfigFormat,
    ) -> Result<String, CardGenError> {
        match format {
            ConfigFormat::Toml => toml::to_string_pretty(config)
                .map_err(|e| CardGenError::config_error(format!("cannot serialize TOML: {e}"))),
            ConfigFormat::Json => serde_json::to_string_pretty(config)
                .map_err(|e| CardGenError::config_error(format!("cannot serialize JSON: {e}"))),
        }
    }
}
