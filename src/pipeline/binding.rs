//! Template data binding stage.
//!
//! Walks the finalized body and factors every literal content value out
//! into a flat data payload, leaving a `${key}` binding expression in its
//! place. Keys derive from walk order and node kind, so re-running on the
//! same body yields the same keys. Substituting the payload back into the
//! template reproduces the original body exactly.

use crate::domain::card::{CardAction, CardNode};
use serde_json::{Map, Value};

pub(crate) struct DataBinder;

impl DataBinder {
    /// Replaces literals in the body with placeholder bindings and
    /// returns the extracted data payload.
    pub(crate) fn extract(&self, body: &mut [CardNode]) -> Map<String, Value> {
        let mut data = Map::new();
        let mut counter = 0usize;

        for node in body.iter_mut() {
            Self::walk(node, &mut |prefix, slot| {
                let key = format!("{prefix}_{counter}");
                counter += 1;
                data.insert(key.clone(), Value::String(std::mem::take(slot)));
                *slot = format!("${{{key}}}");
            });
        }

        data
    }

    /// Substitutes a data payload back into a templated body.
    pub(crate) fn bind(&self, data: &Map<String, Value>, body: &mut [CardNode]) {
        for node in body.iter_mut() {
            Self::walk(node, &mut |_, slot| {
                let Some(key) = slot.strip_prefix("${").and_then(|s| s.strip_suffix('}')) else {
                    return;
                };
                if let Some(Value::String(literal)) = data.get(key) {
                    *slot = literal.clone();
                }
            });
        }
    }

    /// Visits every literal content slot of a node, depth-first, with the
    /// key prefix describing the slot's kind.
    fn walk(node: &mut CardNode, visit: &mut impl FnMut(&'static str, &mut String)) {
        match node {
            CardNode::TextBlock { text, .. } => visit("text", text),
            CardNode::Image { url, .. } => visit("image", url),
            CardNode::ChoiceSet { choices, .. } => {
                for choice in choices {
                    visit("choice", &mut choice.title);
                }
            }
            CardNode::Toggle { title } => visit("toggle", title),
            CardNode::Rating { .. } => {}
            CardNode::ActionSet { actions } => {
                for action in actions {
                    let CardAction::Submit { title, .. } = action;
                    visit("action", title);
                }
            }
            CardNode::Container { items } => {
                for item in items {
                    Self::walk(item, visit);
                }
            }
            CardNode::ColumnSet { columns } => {
                for column in columns {
                    for item in &mut column.items {
                        Self::walk(item, visit);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::{Choice, ChoiceSetStyle, Column};
    use crate::domain::element::{
        FontSize, FontWeight, HorizontalAlignment, TextColor,
    };

    fn sample_body() -> Vec<CardNode> {
        vec![
            CardNode::TextBlock {
                text: "Pick a color".to_string(),
                horizontal_alignment: HorizontalAlignment::Left,
                size: FontSize::Default,
                weight: FontWeight::Default,
                color: TextColor::Default,
            },
            CardNode::ColumnSet {
                columns: vec![
                    Column::new(vec![CardNode::ChoiceSet {
                        choices: vec![
                            Choice {
                                title: "Red".to_string(),
                                value: "Red".to_string(),
                            },
                            Choice {
                                title: "Blue".to_string(),
                                value: "Blue".to_string(),
                            },
                        ],
                        style: ChoiceSetStyle::Expanded,
                        is_multi_select: false,
                    }]),
                    Column::new(vec![CardNode::Image {
                        url: "data:image/png;base64,QUJD".to_string(),
                        horizontal_alignment: HorizontalAlignment::Right,
                    }]),
                ],
            },
        ]
    }

    #[test]
    fn test_literals_replaced_with_bindings() {
        let mut body = sample_body();
        let data = DataBinder.extract(&mut body);

        assert_eq!(data.len(), 4);
        assert_eq!(data["text_0"], "Pick a color");
        assert_eq!(data["choice_1"], "Red");
        assert_eq!(data["choice_2"], "Blue");
        assert_eq!(data["image_3"], "data:image/png;base64,QUJD");

        match &body[0] {
            CardNode::TextBlock { text, .. } => assert_eq!(text, "${text_0}"),
            other => panic!("expected a text block, got {other:?}"),
        }
    }

    #[test]
    fn test_keys_are_stable_across_runs() {
        let mut first = sample_body();
        let mut second = sample_body();

        let data_first = DataBinder.extract(&mut first);
        let data_second = DataBinder.extract(&mut second);

        assert_eq!(data_first, data_second);
        assert_eq!(first, second);
    }

    #[test]
    fn test_round_trip_reproduces_original_body() {
        let original = sample_body();

        let mut templated = original.clone();
        let data = DataBinder.extract(&mut templated);
        assert_ne!(templated, original);

        DataBinder.bind(&data, &mut templated);
        assert_eq!(templated, original);
    }

    #[test]
    fn test_unknown_binding_left_untouched() {
        let mut body = vec![CardNode::Toggle {
            title: "${missing}".to_string(),
        }];

        DataBinder.bind(&Map::new(), &mut body);
        assert!(matches!(&body[0], CardNode::Toggle { title } if title == "${missing}"));
    }

    #[test]
    fn test_empty_body_yields_empty_payload() {
        let mut body: Vec<CardNode> = Vec::new();
        assert!(DataBinder.extract(&mut body).is_empty());
    }
}
