//! Card document types.
//!
//! This module defines the output vocabulary of the pipeline: the body
//! nodes the layout synthesizer emits, the card envelope, and the response
//! document returned to the caller. The node vocabulary maps one-to-one
//! from [`ElementKind`](super::element::ElementKind) to the target
//! schema's primitives, plus the two grouping containers synthesized by
//! the layout stage.

use super::element::{ActionStyle, FontSize, FontWeight, HorizontalAlignment, TextColor};
use serde::{Deserialize, Serialize};

/// Schema identifier stamped on every card envelope.
pub const CARD_SCHEMA: &str = "http://adaptivecards.io/schemas/adaptive-card.json";

/// Schema version stamped on every card envelope.
pub const CARD_VERSION: &str = "1.0";

/// Structured error code for an empty synthesis result.
pub const EMPTY_CARD_CODE: u32 = 1000;

/// A single choice of a choice-set input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub title: String,
    pub value: String,
}

/// Rendering style of a choice-set input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChoiceSetStyle {
    Compact,
    Expanded,
}

/// An action inside an action-set container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CardAction {
    #[serde(rename = "Action.Submit")]
    Submit { title: String, style: ActionStyle },
}

/// One column of a column-set grouping container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    #[serde(rename = "type")]
    pub column_type: String,
    pub width: String,
    pub items: Vec<CardNode>,
}

impl Column {
    /// Creates an auto-width column holding the given items.
    pub fn new(items: Vec<CardNode>) -> Self {
        Self {
            column_type: "Column".to_string(),
            width: "auto".to_string(),
            items,
        }
    }
}

/// A node of the card body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CardNode {
    /// A block of recognized text.
    #[serde(rename = "TextBlock", rename_all = "camelCase")]
    TextBlock {
        text: String,
        horizontal_alignment: HorizontalAlignment,
        size: FontSize,
        weight: FontWeight,
        color: TextColor,
    },

    /// An inline-encoded image.
    #[serde(rename = "Image", rename_all = "camelCase")]
    Image {
        url: String,
        horizontal_alignment: HorizontalAlignment,
    },

    /// A choice-set input synthesized from one or more radio buttons.
    #[serde(rename = "Input.ChoiceSet", rename_all = "camelCase")]
    ChoiceSet {
        choices: Vec<Choice>,
        style: ChoiceSetStyle,
        is_multi_select: bool,
    },

    /// A single checkbox.
    #[serde(rename = "Input.Toggle")]
    Toggle { title: String },

    /// A rating control.
    #[serde(rename = "Input.Rating", rename_all = "camelCase")]
    Rating {
        horizontal_alignment: HorizontalAlignment,
    },

    /// A container of action buttons.
    #[serde(rename = "ActionSet")]
    ActionSet { actions: Vec<CardAction> },

    /// A vertical grouping container.
    #[serde(rename = "Container")]
    Container { items: Vec<CardNode> },

    /// A horizontal grouping container, one column per row member.
    #[serde(rename = "ColumnSet")]
    ColumnSet { columns: Vec<Column> },
}

/// The card envelope: fixed type tag, version, body, and schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveCard {
    #[serde(rename = "type")]
    pub card_type: String,
    pub version: String,
    pub body: Vec<CardNode>,
    #[serde(rename = "$schema")]
    pub schema: String,
}

impl AdaptiveCard {
    /// Wraps a body in the standard envelope.
    pub fn new(body: Vec<CardNode>) -> Self {
        Self {
            card_type: "AdaptiveCard".to_string(),
            version: CARD_VERSION.to_string(),
            body,
            schema: CARD_SCHEMA.to_string(),
        }
    }
}

/// Structured error attached to a response when synthesis produced no
/// usable content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardError {
    pub msg: String,
    pub code: u32,
}

impl CardError {
    /// The error reported when the body is empty or nothing survived
    /// normalization.
    pub fn empty_card() -> Self {
        Self {
            msg: "Failed to generate card components".to_string(),
            code: EMPTY_CARD_CODE,
        }
    }
}

/// Template-and-data output shape: the card with literals replaced by
/// placeholder bindings, plus the flat data payload keyed by placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardV2Payload {
    pub data: serde_json::Map<String, serde_json::Value>,
    pub template: AdaptiveCard,
}

/// Output shape requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardFormat {
    /// Populate `card_json` with the plain card.
    #[default]
    Plain,
    /// Populate `card_v2_json` with a template and data payload.
    Template,
}

/// The response document returned for one input image.
///
/// Exactly one of `card_json` and `card_v2_json` carries the layout:
/// plain format omits `card_v2_json` entirely, template format sets
/// `card_json` to an explicit null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardResponse {
    pub card_json: Option<AdaptiveCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_v2_json: Option<CardV2Payload>,
    pub error: Option<CardError>,
}
