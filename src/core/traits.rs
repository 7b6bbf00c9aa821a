//! Collaborator traits and detection wire types.
//!
//! The pipeline itself is purely geometric and structural; everything
//! that looks at pixels lives behind the traits defined here. The
//! detection model, the per-element property extractor, and the secondary
//! image region detector are all supplied by the caller.

use crate::core::CardResult;
use crate::domain::element::{
    ActionStyle, FontSize, FontWeight, HorizontalAlignment, TextColor,
};
use crate::processors::BoundingBox;
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Raw output of the detection model for one image.
///
/// The three arrays are index-parallel: entry `i` of each describes the
/// same detection. Boxes are `(ymin, xmin, ymax, xmax)` normalized to
/// `[0, 1]`; class ids use the fixed label table of
/// [`ElementKind::from_class_id`](crate::domain::element::ElementKind::from_class_id).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDetections {
    pub boxes: Vec<[f32; 4]>,
    pub scores: Vec<f32>,
    pub classes: Vec<i64>,
}

impl RawDetections {
    /// Returns the number of detections.
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Returns true when there are no detections.
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Checks that the three arrays are index-aligned.
    pub fn validate(&self) -> CardResult<()> {
        if self.scores.len() != self.boxes.len() || self.classes.len() != self.boxes.len() {
            return Err(crate::core::CardGenError::invalid_input(format!(
                "detection arrays are not parallel: {} boxes, {} scores, {} classes",
                self.boxes.len(),
                self.scores.len(),
                self.classes.len()
            )));
        }
        Ok(())
    }
}

/// The external object-detection model.
///
/// Implementations may run inference locally or delegate to a remote
/// serving endpoint; either way a failure is fatal for the current
/// request and is never retried by the pipeline.
pub trait ObjectDetector: Send + Sync {
    /// Runs detection over the source image.
    fn detect(&self, image: &RgbImage) -> CardResult<RawDetections>;
}

/// The external pixel-level property extractor.
///
/// Each method inspects one element's region of the source image. Any
/// method may fail for an individual element; the normalizer isolates
/// such failures and keeps the element with default fields.
pub trait PropertyExtractor: Send + Sync {
    /// Estimates the horizontal alignment of the region within the image.
    fn alignment(&self, image: &RgbImage, bbox: &BoundingBox) -> CardResult<HorizontalAlignment>;

    /// Recognizes the text inside the region, if any.
    fn text(&self, image: &RgbImage, bbox: &BoundingBox) -> CardResult<Option<String>>;

    /// Estimates font size and weight for a text region.
    fn size_and_weight(
        &self,
        image: &RgbImage,
        bbox: &BoundingBox,
    ) -> CardResult<(FontSize, FontWeight)>;

    /// Samples the dominant text color of a text region.
    fn color(&self, image: &RgbImage, bbox: &BoundingBox) -> CardResult<TextColor>;

    /// Classifies the visual style of an action button.
    fn action_style(&self, image: &RgbImage, bbox: &BoundingBox) -> CardResult<ActionStyle>;
}

/// The secondary, classical-vision image region detector used by the
/// custom image sub-pipeline.
pub trait ImageRegionDetector: Send + Sync {
    /// Finds candidate image regions in the parts of the source image not
    /// already claimed by other elements' boxes.
    fn detect_regions(
        &self,
        image: &RgbImage,
        claimed: &[BoundingBox],
    ) -> CardResult<Vec<BoundingBox>>;
}

/// Request body for a remote detection-serving endpoint.
///
/// One inline-encoded image instance under a named serving signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServingRequest {
    pub signature_name: String,
    pub instances: Vec<ServingInstance>,
}

/// A single inline-encoded image instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServingInstance {
    pub b64: String,
}

impl ServingRequest {
    /// Builds the default single-instance request for an encoded image.
    pub fn new(b64_image: impl Into<String>) -> Self {
        Self {
            signature_name: "serving_default".to_string(),
            instances: vec![ServingInstance {
                b64: b64_image.into(),
            }],
        }
    }
}

/// Response body of a remote detection-serving endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServingResponse {
    pub predictions: Vec<ServingPrediction>,
}

/// One prediction of a serving response, carrying the three parallel
/// detection arrays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServingPrediction {
    pub detection_boxes: Vec<[f32; 4]>,
    pub detection_scores: Vec<f32>,
    pub detection_classes: Vec<i64>,
}

impl From<ServingPrediction> for RawDetections {
    fn from(prediction: ServingPrediction) -> Self {
        Self {
            boxes: prediction.detection_boxes,
            scores: prediction.detection_scores,
            classes: prediction.detection_classes,
        }
    }
}
