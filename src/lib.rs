//! Detection-to-layout synthesis for UI mockups.
//!
//! `card_synth` turns object-detection output over an image of a UI
//! mockup into an ordered Adaptive-Card-style layout document. The
//! detection model and the pixel-level property extraction (OCR,
//! alignment, font and color probing) are external collaborators behind
//! the [`ObjectDetector`](core::ObjectDetector) and
//! [`PropertyExtractor`](core::PropertyExtractor) traits; this crate owns
//! everything between raw detections and the final card JSON.
//!
//! # Pipeline
//!
//! [`CardPipeline`](pipeline::CardPipeline) runs fixed stages in order:
//!
//! 1. Normalization: score filtering, class mapping, pixel-coordinate
//!    conversion, content and style extraction.
//! 2. Overlap resolution: duplicate detections of the same region are
//!    reduced to the most confident one.
//! 3. Optional image region sub-pipeline: model-detected images replaced
//!    by classical-vision region proposals.
//! 4. Layout synthesis: row grouping, left-to-right ordering, collapsing
//!    of interactive element runs.
//! 5. Assembly: envelope, empty-result error, and the plain or
//!    template-and-data output shape.
//!
//! # Example
//!
//! ```rust,no_run
//! use card_synth::prelude::*;
//! use std::sync::Arc;
//!
//! # fn detector() -> Arc<dyn ObjectDetector> { unimplemented!() }
//! # fn extractor() -> Arc<dyn PropertyExtractor> { unimplemented!() }
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::default();
//! let pipeline = CardPipeline::new(config, detector(), extractor())?;
//!
//! let image = load_image(std::path::Path::new("mockup.png"))?;
//! let response = pipeline.generate(&image, CardFormat::Plain)?;
//! if let Some(card) = &response.card_json {
//!     println!("{}", serde_json::to_string_pretty(card)?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod pipeline;
pub mod processors;
pub mod utils;

/// Commonly used types for working with the pipeline.
pub mod prelude {
    pub use crate::core::{
        CardGenError, CardResult, ConfigLoader, ImageRegionDetector, ObjectDetector,
        PipelineConfig, PropertyExtractor, RawDetections, ServingRequest, ServingResponse,
    };
    pub use crate::domain::card::{AdaptiveCard, CardFormat, CardNode, CardResponse};
    pub use crate::domain::element::{DetectedElement, ElementKind};
    pub use crate::pipeline::CardPipeline;
    pub use crate::processors::BoundingBox;
    pub use crate::utils::load_image;
}
