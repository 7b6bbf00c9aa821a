//! Layout synthesis stage.
//!
//! Groups the surviving elements into rows consistent with human visual
//! reading order and emits the ordered card body. Row membership is a
//! connected-component relation on vertical-span overlap, not merely a
//! pairwise one: if A overlaps B and B overlaps C, all three share a row
//! even when A and C do not overlap directly.
//!
//! The synthesizer also returns each emitted node's row top edge; the
//! final stable sort by that key is authoritative for the body order.

use crate::domain::card::{CardAction, CardNode, Choice, ChoiceSetStyle, Column};
use crate::domain::element::{DetectedElement, ElementContent, ElementKind};
use tracing::debug;

pub(crate) struct LayoutSynthesizer {
    row_overlap_fraction: f32,
}

impl LayoutSynthesizer {
    pub(crate) fn new(row_overlap_fraction: f32) -> Self {
        Self {
            row_overlap_fraction,
        }
    }

    /// Produces the ordered body and the parallel list of row top edges.
    pub(crate) fn synthesize(&self, elements: &[DetectedElement]) -> (Vec<CardNode>, Vec<f32>) {
        let rows = self.group_rows(elements);
        debug!(
            elements = elements.len(),
            rows = rows.len(),
            "grouped elements into rows"
        );

        let mut body = Vec::with_capacity(rows.len());
        let mut ymins = Vec::with_capacity(rows.len());

        for row in rows {
            let members: Vec<&DetectedElement> = row.iter().map(|&i| &elements[i]).collect();
            let row_ymin = members
                .iter()
                .map(|e| e.bbox.y_min())
                .fold(f32::INFINITY, f32::min);

            body.push(Self::row_node(&members));
            ymins.push(row_ymin);
        }

        (body, ymins)
    }

    /// Partitions element indices into rows ordered top-to-bottom, each
    /// row ordered left-to-right.
    ///
    /// Ties on nearly identical positions keep stable encounter order.
    fn group_rows(&self, elements: &[DetectedElement]) -> Vec<Vec<usize>> {
        let n = elements.len();
        let mut visited = vec![false; n];
        let mut rows: Vec<Vec<usize>> = Vec::new();

        for start in 0..n {
            if visited[start] {
                continue;
            }

            let mut stack = vec![start];
            visited[start] = true;
            let mut row = Vec::new();

            while let Some(current) = stack.pop() {
                row.push(current);
                for other in 0..n {
                    if !visited[other]
                        && elements[current]
                            .bbox
                            .vertical_overlap_ratio(&elements[other].bbox)
                            > self.row_overlap_fraction
                    {
                        visited[other] = true;
                        stack.push(other);
                    }
                }
            }

            // Restore encounter order before the positional sort so ties
            // stay stable.
            row.sort_unstable();
            row.sort_by(|&a, &b| {
                elements[a]
                    .bbox
                    .x_min()
                    .partial_cmp(&elements[b].bbox.x_min())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            rows.push(row);
        }

        rows.sort_by(|a, b| {
            let ymin = |row: &[usize]| {
                row.iter()
                    .map(|&i| elements[i].bbox.y_min())
                    .fold(f32::INFINITY, f32::min)
            };
            ymin(a)
                .partial_cmp(&ymin(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        rows
    }

    /// Emits one body node for a row: the member node itself for a
    /// single-node row, a column-set container otherwise.
    fn row_node(members: &[&DetectedElement]) -> CardNode {
        let mut nodes = Self::collapse_members(members);
        if nodes.len() == 1 {
            nodes.remove(0)
        } else {
            CardNode::ColumnSet {
                columns: nodes
                    .into_iter()
                    .map(|node| Column::new(vec![node]))
                    .collect(),
            }
        }
    }

    /// Maps a row's members to nodes, collapsing contiguous runs of
    /// compatible interactive elements into one container node each.
    fn collapse_members(members: &[&DetectedElement]) -> Vec<CardNode> {
        let mut nodes = Vec::new();
        let mut i = 0;

        while i < members.len() {
            let kind = members[i].kind;
            if Self::is_collapsible(kind) {
                let mut j = i;
                while j < members.len() && members[j].kind == kind {
                    j += 1;
                }
                nodes.push(Self::group_node(kind, &members[i..j]));
                i = j;
            } else {
                nodes.push(Self::element_node(members[i]));
                i += 1;
            }
        }

        nodes
    }

    fn is_collapsible(kind: ElementKind) -> bool {
        matches!(
            kind,
            ElementKind::RadioButton | ElementKind::Checkbox | ElementKind::ActionSet
        )
    }

    /// Builds the container node for a run of collapsible elements,
    /// preserving intra-run order.
    fn group_node(kind: ElementKind, run: &[&DetectedElement]) -> CardNode {
        match kind {
            ElementKind::RadioButton => CardNode::ChoiceSet {
                choices: run
                    .iter()
                    .map(|e| {
                        let title = e.content.text().to_string();
                        Choice {
                            value: title.clone(),
                            title,
                        }
                    })
                    .collect(),
                style: ChoiceSetStyle::Expanded,
                is_multi_select: false,
            },
            ElementKind::Checkbox => {
                let mut toggles: Vec<CardNode> = run
                    .iter()
                    .map(|e| CardNode::Toggle {
                        title: e.content.text().to_string(),
                    })
                    .collect();
                if toggles.len() == 1 {
                    toggles.remove(0)
                } else {
                    CardNode::Container { items: toggles }
                }
            }
            _ => CardNode::ActionSet {
                actions: run
                    .iter()
                    .map(|e| CardAction::Submit {
                        title: e.content.text().to_string(),
                        style: e.style.action_style,
                    })
                    .collect(),
            },
        }
    }

    /// Maps a non-collapsible element to its body node.
    fn element_node(element: &DetectedElement) -> CardNode {
        match element.kind {
            ElementKind::Image => CardNode::Image {
                url: match &element.content {
                    ElementContent::Image(content) => content.data_uri.clone(),
                    _ => String::new(),
                },
                horizontal_alignment: element.style.alignment,
            },
            ElementKind::Rating => CardNode::Rating {
                horizontal_alignment: element.style.alignment,
            },
            _ => CardNode::TextBlock {
                text: element.content.text().to_string(),
                horizontal_alignment: element.style.alignment,
                size: element.style.size,
                weight: element.style.weight,
                color: element.style.color,
            },
        }
    }
}

/// Stable sort of the body by the parallel row top-edge keys.
///
/// The synthesizer's own row order and this sort normally agree; when
/// they do not, the sort is authoritative.
pub(crate) fn sort_body_by_ymin(body: Vec<CardNode>, ymins: &[f32]) -> Vec<CardNode> {
    let mut keyed: Vec<(f32, CardNode)> = ymins.iter().copied().zip(body).collect();
    keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    keyed.into_iter().map(|(_, node)| node).collect()
}
