//! Overlap resolution stage.
//!
//! Removes duplicate detections so every visual UI control is represented
//! once. Two elements conflict when the IoU of their claim boxes exceeds
//! the configured threshold or one box fully contains the other; the
//! lower-confidence element of a conflicting pair is dropped. Because an
//! element carries its own geometry, removal cannot desynchronize
//! coordinates from metadata.

use crate::domain::element::DetectedElement;
use tracing::debug;

pub(crate) struct OverlapResolver {
    iou_threshold: f32,
}

impl OverlapResolver {
    pub(crate) fn new(iou_threshold: f32) -> Self {
        Self { iou_threshold }
    }

    /// Returns the deduplicated element list.
    ///
    /// Idempotent: running the resolver on its own output is a no-op,
    /// since every surviving pair has been checked for conflict.
    pub(crate) fn resolve(&self, elements: Vec<DetectedElement>) -> Vec<DetectedElement> {
        let n = elements.len();
        let mut removed = vec![false; n];

        for i in 0..n {
            if removed[i] {
                continue;
            }
            for j in (i + 1)..n {
                if removed[j] {
                    continue;
                }
                if !self.conflicts(&elements[i], &elements[j]) {
                    continue;
                }

                if Self::first_wins(&elements[i], &elements[j]) {
                    removed[j] = true;
                } else {
                    removed[i] = true;
                    break;
                }
            }
        }

        let survivors: Vec<DetectedElement> = elements
            .into_iter()
            .zip(removed)
            .filter_map(|(element, gone)| (!gone).then_some(element))
            .collect();

        debug!(
            before = n,
            after = survivors.len(),
            "resolved overlapping detections"
        );
        survivors
    }

    fn conflicts(&self, a: &DetectedElement, b: &DetectedElement) -> bool {
        a.claim.iou(&b.claim) > self.iou_threshold
            || a.claim.contains(&b.claim)
            || b.claim.contains(&a.claim)
    }

    /// Decides the winner of a conflicting pair: higher confidence, then
    /// larger area, then earlier detection order.
    fn first_wins(a: &DetectedElement, b: &DetectedElement) -> bool {
        if a.score != b.score {
            return a.score > b.score;
        }
        if a.claim.area() != b.claim.area() {
            return a.claim.area() > b.claim.area();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::element::ElementKind;
    use crate::processors::BoundingBox;

    fn text_element(coords: [f32; 4], score: f32) -> DetectedElement {
        DetectedElement::new(
            ElementKind::Text,
            BoundingBox::from_coords(coords[0], coords[1], coords[2], coords[3]),
            score,
        )
    }

    #[test]
    fn test_high_iou_keeps_higher_confidence() {
        // Near-identical boxes, IoU about 0.95
        let a = text_element([0.0, 0.0, 100.0, 100.0], 0.96);
        let b = text_element([0.0, 0.0, 100.0, 95.0], 0.91);

        let survivors = OverlapResolver::new(0.5).resolve(vec![a, b]);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].score, 0.96);
    }

    #[test]
    fn test_containment_resolved_without_iou() {
        // Small box inside a large one has low IoU but must still conflict.
        let outer = text_element([0.0, 0.0, 200.0, 200.0], 0.92);
        let inner = text_element([10.0, 10.0, 30.0, 30.0], 0.99);

        let survivors = OverlapResolver::new(0.5).resolve(vec![outer, inner]);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].score, 0.99);
    }

    #[test]
    fn test_score_tie_breaks_by_area_then_order() {
        let large = text_element([0.0, 0.0, 100.0, 100.0], 0.95);
        let small = text_element([0.0, 0.0, 95.0, 100.0], 0.95);

        let survivors = OverlapResolver::new(0.5).resolve(vec![small.clone(), large.clone()]);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].claim, large.claim);

        // Identical elements: earlier detection wins.
        let survivors = OverlapResolver::new(0.5).resolve(vec![small.clone(), small.clone()]);
        assert_eq!(survivors.len(), 1);
    }

    #[test]
    fn test_disjoint_elements_untouched() {
        let a = text_element([0.0, 0.0, 50.0, 50.0], 0.95);
        let b = text_element([100.0, 100.0, 150.0, 150.0], 0.93);

        let survivors = OverlapResolver::new(0.5).resolve(vec![a, b]);
        assert_eq!(survivors.len(), 2);
    }

    #[test]
    fn test_survivors_pairwise_compatible() {
        let resolver = OverlapResolver::new(0.5);
        let elements = vec![
            text_element([0.0, 0.0, 100.0, 100.0], 0.96),
            text_element([5.0, 5.0, 105.0, 105.0], 0.91),
            text_element([300.0, 0.0, 400.0, 100.0], 0.94),
            text_element([310.0, 10.0, 390.0, 90.0], 0.99),
            text_element([0.0, 300.0, 100.0, 400.0], 0.92),
        ];

        let survivors = resolver.resolve(elements);
        for (i, a) in survivors.iter().enumerate() {
            for b in survivors.iter().skip(i + 1) {
                assert!(a.claim.iou(&b.claim) <= 0.5);
                assert!(!a.claim.contains(&b.claim));
                assert!(!b.claim.contains(&a.claim));
            }
        }
    }

    #[test]
    fn test_resolver_is_idempotent() {
        let resolver = OverlapResolver::new(0.5);
        let elements = vec![
            text_element([0.0, 0.0, 100.0, 100.0], 0.96),
            text_element([0.0, 0.0, 100.0, 95.0], 0.91),
            text_element([10.0, 10.0, 20.0, 20.0], 0.99),
            text_element([200.0, 0.0, 300.0, 100.0], 0.93),
        ];

        let once = resolver.resolve(elements);
        let twice = resolver.resolve(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input() {
        assert!(OverlapResolver::new(0.5).resolve(Vec::new()).is_empty());
    }
}
