//! Detected element types.
//!
//! A [`DetectedElement`] carries everything the pipeline knows about one
//! detected UI control: its kind, geometry, confidence, extracted content,
//! and extracted style. Geometry and metadata live together in the struct,
//! so there are no index-parallel lists to keep in sync during duplicate
//! removal.

use crate::processors::BoundingBox;
use serde::{Deserialize, Serialize};

/// The fixed set of UI control kinds the detection model can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// A block of text.
    Text,
    /// A single radio button with its label.
    RadioButton,
    /// A single checkbox with its label.
    Checkbox,
    /// A button belonging to an action set.
    ActionSet,
    /// An image region.
    Image,
    /// A rating control.
    Rating,
}

impl ElementKind {
    /// Maps a detection-model class id to an element kind.
    ///
    /// The label table is fixed: `{1: Text, 2: RadioButton, 3: Checkbox,
    /// 4: ActionSet, 5: Image, 6: Rating}`. Unknown ids return `None` and
    /// are dropped by the normalizer.
    pub fn from_class_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(Self::Text),
            2 => Some(Self::RadioButton),
            3 => Some(Self::Checkbox),
            4 => Some(Self::ActionSet),
            5 => Some(Self::Image),
            6 => Some(Self::Rating),
            _ => None,
        }
    }
}

/// Horizontal alignment of an element within the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HorizontalAlignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Font size of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FontSize {
    Small,
    #[default]
    Default,
    Medium,
    Large,
    ExtraLarge,
}

/// Font weight of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FontWeight {
    Lighter,
    #[default]
    Default,
    Bolder,
}

/// Text color of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextColor {
    #[default]
    Default,
    Dark,
    Light,
    Accent,
    Good,
    Warning,
    Attention,
}

/// Visual style of an action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionStyle {
    #[default]
    Default,
    Positive,
    Destructive,
}

/// Style attributes extracted for an element by the property extractor.
///
/// Opaque to the pipeline beyond storage; defaults are used when the
/// extractor fails for an element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementStyle {
    pub alignment: HorizontalAlignment,
    pub size: FontSize,
    pub weight: FontWeight,
    pub color: TextColor,
    pub action_style: ActionStyle,
}

/// An inline-encoded image cropped from the source mockup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageContent {
    /// PNG data URI of the cropped region.
    pub data_uri: String,
    /// Width of the cropped region in pixels.
    pub width: u32,
    /// Height of the cropped region in pixels.
    pub height: u32,
}

/// Kind-dependent content payload of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementContent {
    /// No content was extracted.
    None,
    /// Recognized text.
    Text(String),
    /// A cropped, inline-encoded image.
    Image(ImageContent),
}

impl ElementContent {
    /// Returns the recognized text, or an empty string for non-text content.
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            _ => "",
        }
    }
}

/// A single detected UI control after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedElement {
    /// Kind of UI control.
    pub kind: ElementKind,
    /// Detected bounding box in pixel coordinates.
    pub bbox: BoundingBox,
    /// Box used for duplicate removal and row grouping. Identical to
    /// `bbox` except for text elements, which are widened horizontally.
    pub claim: BoundingBox,
    /// Detection confidence in `[0, 1]`.
    pub score: f32,
    /// Kind-dependent content payload.
    pub content: ElementContent,
    /// Kind-dependent style attributes.
    pub style: ElementStyle,
}

impl DetectedElement {
    /// Creates an element with no content and default style.
    pub fn new(kind: ElementKind, bbox: BoundingBox, score: f32) -> Self {
        Self {
            kind,
            bbox,
            claim: bbox,
            score,
            content: ElementContent::None,
            style: ElementStyle::default(),
        }
    }

    /// Sets the claim box used for overlap resolution and grouping.
    pub fn with_claim(mut self, claim: BoundingBox) -> Self {
        self.claim = claim;
        self
    }

    /// Sets the content payload.
    pub fn with_content(mut self, content: ElementContent) -> Self {
        self.content = content;
        self
    }
}
