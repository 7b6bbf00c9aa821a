//! The card synthesis pipeline.
//!
//! [`CardPipeline`] runs the stages strictly in sequence for one image:
//! normalization, overlap resolution, the optional image region
//! sub-pipeline, layout synthesis, and assembly (with template data
//! binding when the caller asks for the template format). Every call
//! operates on freshly constructed state; callers may run independent
//! pipelines for independent images in parallel.
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
//! let pipeline = CardPipeline::new(PipelineConfig::default(), detector(), extractor())?;
//! let image = load_image(std::path::Path::new("mockup.png"))?;
//! let response = pipeline.generate(&image, CardFormat::Plain)?;
//! println!("{}", serde_json::to_string_pretty(&response)?);
//! # Ok(())
//! # }
//! ```

mod assemble;
mod binding;
mod dedup;
mod image_regions;
mod layout;
mod normalize;

use crate::core::{
    CardGenError, CardResult, ImageRegionDetector, ObjectDetector, PipelineConfig,
    PropertyExtractor, RawDetections,
};
use crate::domain::card::{CardFormat, CardResponse};
use crate::utils::decode_base64_image;
use assemble::CardAssembler;
use dedup::OverlapResolver;
use image::RgbImage;
use image_regions::ImageRegionStage;
use layout::{LayoutSynthesizer, sort_body_by_ymin};
use normalize::ResultNormalizer;
use std::sync::Arc;
use tracing::{debug, info};

/// Detection-to-layout synthesis pipeline for one image at a time.
pub struct CardPipeline {
    config: PipelineConfig,
    detector: Arc<dyn ObjectDetector>,
    extractor: Arc<dyn PropertyExtractor>,
    region_detector: Option<Arc<dyn ImageRegionDetector>>,
}

impl CardPipeline {
    /// Creates a pipeline from a validated configuration and the two
    /// mandatory collaborators.
    ///
    /// # Errors
    ///
    /// Returns a `CardGenError::ConfigError` when the configuration is
    /// invalid.
    pub fn new(
        config: PipelineConfig,
        detector: Arc<dyn ObjectDetector>,
        extractor: Arc<dyn PropertyExtractor>,
    ) -> CardResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            detector,
            extractor,
            region_detector: None,
        })
    }

    /// Attaches the secondary image region detector used when the custom
    /// image pipeline is enabled.
    pub fn with_region_detector(mut self, detector: Arc<dyn ImageRegionDetector>) -> Self {
        self.region_detector = Some(detector);
        self
    }

    /// Returns the pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Generates a card document from a source image.
    ///
    /// The external detection call is not retried; its failure fails the
    /// request.
    pub fn generate(&self, image: &RgbImage, format: CardFormat) -> CardResult<CardResponse> {
        let raw = self.detector.detect(image)?;
        self.generate_from_detections(image, &raw, format)
    }

    /// Generates a card document from a base64-encoded source image,
    /// enforcing the configured upload size limit.
    pub fn generate_from_encoded(&self, b64: &str, format: CardFormat) -> CardResult<CardResponse> {
        let image = decode_base64_image(b64, self.config.max_upload_bytes)?;
        self.generate(&image, format)
    }

    /// Generates a card document from detection output obtained out of
    /// band, e.g. from a remote serving endpoint.
    pub fn generate_from_detections(
        &self,
        image: &RgbImage,
        raw: &RawDetections,
        format: CardFormat,
    ) -> CardResult<CardResponse> {
        let normalizer = ResultNormalizer::new(&self.config, self.extractor.as_ref());
        let mut elements = normalizer.collect(image, raw)?;
        let had_elements = !elements.is_empty();
        debug!(
            detections = raw.len(),
            elements = elements.len(),
            "normalized detections"
        );

        elements = OverlapResolver::new(self.config.iou_threshold).resolve(elements);

        if self.config.use_custom_image_pipeline {
            let Some(region_detector) = &self.region_detector else {
                return Err(CardGenError::config_error(
                    "use_custom_image_pipeline is enabled but no image region detector was provided",
                ));
            };
            ImageRegionStage::new(region_detector.as_ref()).apply(image, &mut elements)?;
        }

        let (body, ymins) =
            LayoutSynthesizer::new(self.config.row_overlap_fraction).synthesize(&elements);
        let body = sort_body_by_ymin(body, &ymins);
        info!(nodes = body.len(), "synthesized card body");

        Ok(CardAssembler.assemble(body, had_elements, format))
    }
}
