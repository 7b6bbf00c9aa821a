//! Result normalization stage.
//!
//! Converts the raw detection arrays into typed [`DetectedElement`]s in
//! pixel coordinates: low-confidence and unmapped detections are dropped,
//! image regions are cropped and inline-encoded, and the property
//! extractor is consulted for content and style. A failure of the
//! extractor for one element never aborts the request; the element is
//! kept with default fields.

use crate::core::{
    CardGenError, CardResult, PipelineConfig, ProcessingStage, PropertyExtractor, RawDetections,
};
use crate::domain::element::{DetectedElement, ElementContent, ElementKind, ImageContent};
use crate::processors::BoundingBox;
use crate::utils::{crop_box, encode_png_data_uri};
use image::RgbImage;
use tracing::{debug, warn};

pub(crate) struct ResultNormalizer<'a> {
    config: &'a PipelineConfig,
    extractor: &'a dyn PropertyExtractor,
}

impl<'a> ResultNormalizer<'a> {
    pub(crate) fn new(config: &'a PipelineConfig, extractor: &'a dyn PropertyExtractor) -> Self {
        Self { config, extractor }
    }

    /// Converts raw detections into the surviving element list.
    ///
    /// An empty result is not an error here; the assembler reports it
    /// downstream.
    pub(crate) fn collect(
        &self,
        image: &RgbImage,
        raw: &RawDetections,
    ) -> CardResult<Vec<DetectedElement>> {
        raw.validate().map_err(|e| {
            CardGenError::processing_error(
                ProcessingStage::Normalization,
                "rejecting malformed detection payload",
                e,
            )
        })?;

        let (img_width, img_height) = image.dimensions();
        let width = img_width as f32;
        let height = img_height as f32;

        let mut elements = Vec::new();
        for i in 0..raw.len() {
            let score = raw.scores[i];
            if score < self.config.score_threshold {
                continue;
            }

            let Some(kind) = ElementKind::from_class_id(raw.classes[i]) else {
                // Unmapped ids indicate detector/label-table drift.
                warn!(
                    class_id = raw.classes[i],
                    score, "dropping detection with unmapped class id"
                );
                continue;
            };

            // Boxes arrive as (ymin, xmin, ymax, xmax) normalized to [0, 1].
            let [ymin, xmin, ymax, xmax] = raw.boxes[i];
            let bbox =
                BoundingBox::from_coords(xmin * width, ymin * height, xmax * width, ymax * height);
            if !bbox.is_valid() {
                debug!(index = i, ?bbox, "dropping detection with degenerate box");
                continue;
            }

            let mut element = DetectedElement::new(kind, bbox, score);
            if kind == ElementKind::Text {
                element =
                    element.with_claim(bbox.expand_horizontal(self.config.text_claim_padding));
            }

            self.attach_content(image, &mut element);
            self.attach_style(image, &mut element);
            elements.push(element);
        }

        Ok(elements)
    }

    /// Populates the element's content payload.
    ///
    /// Image elements get an inline-encoded crop; every other kind gets
    /// recognized text from the property extractor. Failures degrade to
    /// empty content.
    fn attach_content(&self, image: &RgbImage, element: &mut DetectedElement) {
        if element.kind == ElementKind::Image {
            let encoded = crop_box(image, &element.bbox)
                .and_then(|crop| Ok((crop.dimensions(), encode_png_data_uri(&crop)?)));
            match encoded {
                Ok(((width, height), data_uri)) => {
                    element.content = ElementContent::Image(ImageContent {
                        data_uri,
                        width,
                        height,
                    });
                }
                Err(e) => {
                    warn!(kind = ?element.kind, error = %e, "failed to encode image region");
                }
            }
            return;
        }

        match self.extractor.text(image, &element.bbox) {
            Ok(Some(text)) => element.content = ElementContent::Text(text),
            Ok(None) => {}
            Err(e) => {
                warn!(kind = ?element.kind, error = %e, "text extraction failed for element");
            }
        }
    }

    /// Populates the element's style attributes, defaulting each field
    /// whose extraction fails.
    fn attach_style(&self, image: &RgbImage, element: &mut DetectedElement) {
        match self.extractor.alignment(image, &element.bbox) {
            Ok(alignment) => element.style.alignment = alignment,
            Err(e) => {
                warn!(kind = ?element.kind, error = %e, "alignment extraction failed for element");
            }
        }

        if element.kind == ElementKind::Text {
            match self.extractor.size_and_weight(image, &element.bbox) {
                Ok((size, weight)) => {
                    element.style.size = size;
                    element.style.weight = weight;
                }
                Err(e) => {
                    warn!(error = %e, "size/weight extraction failed for text element");
                }
            }

            match self.extractor.color(image, &element.bbox) {
                Ok(color) => element.style.color = color,
                Err(e) => {
                    warn!(error = %e, "color extraction failed for text element");
                }
            }
        }

        if element.kind == ElementKind::ActionSet {
            match self.extractor.action_style(image, &element.bbox) {
                Ok(style) => element.style.action_style = style,
                Err(e) => {
                    warn!(error = %e, "style classification failed for action element");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CardGenError;
    use crate::domain::element::{
        ActionStyle, FontSize, FontWeight, HorizontalAlignment, TextColor,
    };

    /// Extractor that recognizes fixed text, or fails every call when
    /// `failing` is set.
    struct StubExtractor {
        failing: bool,
    }

    impl PropertyExtractor for StubExtractor {
        fn alignment(
            &self,
            _image: &RgbImage,
            _bbox: &BoundingBox,
        ) -> CardResult<HorizontalAlignment> {
            if self.failing {
                return Err(CardGenError::invalid_input("no alignment"));
            }
            Ok(HorizontalAlignment::Center)
        }

        fn text(&self, _image: &RgbImage, _bbox: &BoundingBox) -> CardResult<Option<String>> {
            if self.failing {
                return Err(CardGenError::invalid_input("no text"));
            }
            Ok(Some("label".to_string()))
        }

        fn size_and_weight(
            &self,
            _image: &RgbImage,
            _bbox: &BoundingBox,
        ) -> CardResult<(FontSize, FontWeight)> {
            if self.failing {
                return Err(CardGenError::invalid_input("no font"));
            }
            Ok((FontSize::Large, FontWeight::Bolder))
        }

        fn color(&self, _image: &RgbImage, _bbox: &BoundingBox) -> CardResult<TextColor> {
            if self.failing {
                return Err(CardGenError::invalid_input("no color"));
            }
            Ok(TextColor::Accent)
        }

        fn action_style(&self, _image: &RgbImage, _bbox: &BoundingBox) -> CardResult<ActionStyle> {
            if self.failing {
                return Err(CardGenError::invalid_input("no style"));
            }
            Ok(ActionStyle::Positive)
        }
    }

    fn normalize(raw: &RawDetections, failing: bool) -> Vec<DetectedElement> {
        let config = PipelineConfig::default();
        let extractor = StubExtractor { failing };
        let image = RgbImage::new(200, 100);
        ResultNormalizer::new(&config, &extractor)
            .collect(&image, raw)
            .unwrap()
    }

    #[test]
    fn test_low_confidence_dropped() {
        let raw = RawDetections {
            boxes: vec![[0.1, 0.1, 0.5, 0.5], [0.1, 0.1, 0.5, 0.5]],
            scores: vec![0.89, 0.95],
            classes: vec![1, 1],
        };

        let elements = normalize(&raw, false);
        assert_eq!(elements.len(), 1);
        assert!(elements.iter().all(|e| e.score >= 0.90));
    }

    #[test]
    fn test_unmapped_class_dropped_silently() {
        let raw = RawDetections {
            boxes: vec![[0.1, 0.1, 0.5, 0.5]],
            scores: vec![0.99],
            classes: vec![42],
        };

        assert!(normalize(&raw, false).is_empty());
    }

    #[test]
    fn test_pixel_coordinate_conversion() {
        // (ymin, xmin, ymax, xmax) over a 200x100 image
        let raw = RawDetections {
            boxes: vec![[0.2, 0.1, 0.6, 0.4]],
            scores: vec![0.95],
            classes: vec![3],
        };

        let elements = normalize(&raw, false);
        let bbox = elements[0].bbox;
        assert_eq!(bbox.x_min(), 20.0);
        assert_eq!(bbox.y_min(), 20.0);
        assert_eq!(bbox.x_max(), 80.0);
        assert_eq!(bbox.y_max(), 60.0);
        assert_eq!(elements[0].kind, ElementKind::Checkbox);
    }

    #[test]
    fn test_text_claim_widened() {
        let raw = RawDetections {
            boxes: vec![[0.1, 0.25, 0.5, 0.5]],
            scores: vec![0.95],
            classes: vec![1],
        };

        let elements = normalize(&raw, false);
        let element = &elements[0];
        assert_eq!(element.claim.x_min(), element.bbox.x_min() - 5.0);
        assert_eq!(element.claim.x_max(), element.bbox.x_max() + 5.0);
        assert_eq!(element.claim.y_min(), element.bbox.y_min());
    }

    #[test]
    fn test_image_element_gets_encoded_crop() {
        let raw = RawDetections {
            boxes: vec![[0.0, 0.0, 0.5, 0.25]],
            scores: vec![0.95],
            classes: vec![5],
        };

        let elements = normalize(&raw, false);
        match &elements[0].content {
            ElementContent::Image(content) => {
                assert!(content.data_uri.starts_with("data:image/png;base64,"));
                assert_eq!((content.width, content.height), (50, 50));
            }
            other => panic!("expected image content, got {other:?}"),
        }
    }

    #[test]
    fn test_extractor_failure_degrades_gracefully() {
        let raw = RawDetections {
            boxes: vec![[0.1, 0.1, 0.5, 0.5]],
            scores: vec![0.95],
            classes: vec![1],
        };

        let elements = normalize(&raw, true);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].content, ElementContent::None);
        assert_eq!(elements[0].style.alignment, HorizontalAlignment::Left);
    }

    #[test]
    fn test_misaligned_arrays_rejected() {
        let config = PipelineConfig::default();
        let extractor = StubExtractor { failing: false };
        let image = RgbImage::new(10, 10);
        let raw = RawDetections {
            boxes: vec![[0.1, 0.1, 0.5, 0.5]],
            scores: vec![],
            classes: vec![1],
        };

        let result = ResultNormalizer::new(&config, &extractor).collect(&image, &raw);
        assert!(matches!(
            result,
            Err(CardGenError::Processing {
                kind: ProcessingStage::Normalization,
                ..
            })
        ));
    }
}
