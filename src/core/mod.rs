//! Core types for the card synthesis pipeline.
//!
//! # Modules
//!
//! * `config` - Pipeline configuration and file loading
//! * `errors` - Error types and helper constructors
//! * `traits` - External collaborator traits and detection wire types

pub mod config;
pub mod errors;
pub mod traits;

pub use config::{ConfigFormat, ConfigLoader, PipelineConfig};
pub use errors::{CardGenError, CardResult, ProcessingStage};
pub use traits::{
    ImageRegionDetector, ObjectDetector, PropertyExtractor, RawDetections, ServingInstance,
    ServingPrediction, ServingRequest, ServingResponse,
};
