//! Custom image sub-pipeline stage.
//!
//! When enabled by configuration, model-detected image elements are
//! discarded and re-derived by the secondary, classical-vision image
//! region detector. The detector sees the boxes already claimed by the
//! surviving non-image elements and proposes tighter image region boxes
//! in the remaining space.

use crate::core::{CardGenError, CardResult, ImageRegionDetector, ProcessingStage};
use crate::domain::element::{DetectedElement, ElementContent, ElementKind, ImageContent};
use crate::processors::BoundingBox;
use crate::utils::{crop_box, encode_png_data_uri};
use image::RgbImage;
use tracing::{debug, warn};

pub(crate) struct ImageRegionStage<'a> {
    detector: &'a dyn ImageRegionDetector,
}

impl<'a> ImageRegionStage<'a> {
    pub(crate) fn new(detector: &'a dyn ImageRegionDetector) -> Self {
        Self { detector }
    }

    /// Replaces model-detected image elements with detector-derived ones.
    ///
    /// A failure of the external region detector fails the request; a
    /// failure to crop or encode an individual region only skips that
    /// region.
    pub(crate) fn apply(
        &self,
        image: &RgbImage,
        elements: &mut Vec<DetectedElement>,
    ) -> CardResult<()> {
        let before = elements.len();
        elements.retain(|e| e.kind != ElementKind::Image);
        debug!(
            discarded = before - elements.len(),
            "removed model-detected image elements"
        );

        let claimed: Vec<BoundingBox> = elements.iter().map(|e| e.claim).collect();
        let regions = self
            .detector
            .detect_regions(image, &claimed)
            .map_err(|e| {
                CardGenError::processing_error(
                    ProcessingStage::ImageRegion,
                    "image region detector failed",
                    e,
                )
            })?;

        for region in regions {
            if !region.is_valid() {
                warn!(?region, "skipping degenerate image region");
                continue;
            }

            let encoded = crop_box(image, &region)
                .and_then(|crop| Ok((crop.dimensions(), encode_png_data_uri(&crop)?)));
            match encoded {
                Ok(((width, height), data_uri)) => {
                    elements.push(
                        DetectedElement::new(ElementKind::Image, region, 1.0).with_content(
                            ElementContent::Image(ImageContent {
                                data_uri,
                                width,
                                height,
                            }),
                        ),
                    );
                }
                Err(e) => {
                    warn!(?region, error = %e, "failed to encode detected image region");
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRegions {
        regions: Vec<BoundingBox>,
    }

    impl ImageRegionDetector for FixedRegions {
        fn detect_regions(
            &self,
            _image: &RgbImage,
            _claimed: &[BoundingBox],
        ) -> CardResult<Vec<BoundingBox>> {
            Ok(self.regions.clone())
        }
    }

    struct FailingDetector;

    impl ImageRegionDetector for FailingDetector {
        fn detect_regions(
            &self,
            _image: &RgbImage,
            _claimed: &[BoundingBox],
        ) -> CardResult<Vec<BoundingBox>> {
            Err(CardGenError::invalid_input("detector offline"))
        }
    }

    fn model_image_element() -> DetectedElement {
        DetectedElement::new(
            ElementKind::Image,
            BoundingBox::from_coords(0.0, 0.0, 40.0, 40.0),
            0.95,
        )
    }

    #[test]
    fn test_model_images_replaced_by_detector_regions() {
        let image = RgbImage::new(100, 100);
        let mut elements = vec![
            model_image_element(),
            DetectedElement::new(
                ElementKind::Text,
                BoundingBox::from_coords(0.0, 60.0, 80.0, 80.0),
                0.92,
            ),
        ];

        let detector = FixedRegions {
            regions: vec![BoundingBox::from_coords(10.0, 10.0, 30.0, 30.0)],
        };
        ImageRegionStage::new(&detector)
            .apply(&image, &mut elements)
            .unwrap();

        let images: Vec<_> = elements
            .iter()
            .filter(|e| e.kind == ElementKind::Image)
            .collect();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].bbox.x_min(), 10.0);
        match &images[0].content {
            ElementContent::Image(content) => {
                assert_eq!((content.width, content.height), (20, 20));
            }
            other => panic!("expected image content, got {other:?}"),
        }
        // The text element is untouched.
        assert!(elements.iter().any(|e| e.kind == ElementKind::Text));
    }

    #[test]
    fn test_detector_sees_claimed_boxes() {
        struct ClaimAsserting;

        impl ImageRegionDetector for ClaimAsserting {
            fn detect_regions(
                &self,
                _image: &RgbImage,
                claimed: &[BoundingBox],
            ) -> CardResult<Vec<BoundingBox>> {
                // Only the non-image element's claim should be present.
                assert_eq!(claimed.len(), 1);
                assert_eq!(claimed[0].y_min(), 60.0);
                Ok(Vec::new())
            }
        }

        let image = RgbImage::new(100, 100);
        let mut elements = vec![
            model_image_element(),
            DetectedElement::new(
                ElementKind::Checkbox,
                BoundingBox::from_coords(0.0, 60.0, 80.0, 80.0),
                0.92,
            ),
        ];

        ImageRegionStage::new(&ClaimAsserting)
            .apply(&image, &mut elements)
            .unwrap();
        assert_eq!(elements.len(), 1);
    }

    #[test]
    fn test_detector_failure_propagates() {
        let image = RgbImage::new(100, 100);
        let mut elements = vec![model_image_element()];

        let result = ImageRegionStage::new(&FailingDetector).apply(&image, &mut elements);
        assert!(matches!(
            result,
            Err(CardGenError::Processing {
                kind: ProcessingStage::ImageRegion,
                ..
            })
        ));
    }

    #[test]
    fn test_degenerate_region_skipped() {
        let image = RgbImage::new(100, 100);
        let mut elements = Vec::new();

        let detector = FixedRegions {
            regions: vec![BoundingBox::from_coords(10.0, 10.0, 10.0, 30.0)],
        };
        ImageRegionStage::new(&detector)
            .apply(&image, &mut elements)
            .unwrap();
        assert!(elements.is_empty());
    }
}
