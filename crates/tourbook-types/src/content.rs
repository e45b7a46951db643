//! Typed content payloads, one per block type.
//!
//! `BlockContent` is the sum type over all eight payloads. On the wire the
//! payload is a plain JSON object next to a separate `type` tag, so
//! `BlockContent` is not itself `Serialize`; use [`BlockContent::to_json`] and
//! [`BlockContent::from_json`] instead.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::block::BlockType;
use crate::location::{LocationContent, null_as_default};

/// Number of slots in a three-column block.
pub const COLUMN_COUNT: usize = 3;

// ── Enumerations ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleSize {
    Small,
    #[default]
    Medium,
    Large,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextLayout {
    #[default]
    Single,
    TwoColumns,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DividerStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

// ── Payloads ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TitleContent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default)]
    pub size: TitleSize,
    /// Keys this client does not model. Kept so an edit writes them back.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Free text, either a single body or two columns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub layout: TextLayout,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub column1: Option<String>,
    #[serde(default)]
    pub column2: Option<String>,
    /// Whether the text carries rich-text markup.
    #[serde(default)]
    pub formatted: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoTextContent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub photos: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default)]
    pub alignment: Alignment,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideContent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub photos: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One slot of a three-column block.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Column {
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreeColumnsContent {
    /// Always exactly three slots; short payloads are padded, extra slots dropped.
    #[serde(default, deserialize_with = "three_slots")]
    pub columns: [Column; COLUMN_COUNT],
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoContent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub photos: Vec<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DividerContent {
    #[serde(default)]
    pub style: DividerStyle,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn three_slots<'de, D>(deserializer: D) -> Result<[Column; COLUMN_COUNT], D::Error>
where
    D: Deserializer<'de>,
{
    let mut slots: Vec<Column> = null_as_default(deserializer)?;
    slots.resize_with(COLUMN_COUNT, Column::default);
    let mut columns: [Column; COLUMN_COUNT] = Default::default();
    for (slot, column) in columns.iter_mut().zip(slots) {
        *slot = column;
    }
    Ok(columns)
}

// ── Sum type ────────────────────────────────────────────────────────────────

/// Type-specific payload of a block.
#[derive(Clone, Debug, PartialEq)]
pub enum BlockContent {
    Title(TitleContent),
    Text(TextContent),
    PhotoText(PhotoTextContent),
    Slide(SlideContent),
    ThreeColumns(ThreeColumnsContent),
    Photo(PhotoContent),
    Divider(DividerContent),
    Location(LocationContent),
}

impl BlockContent {
    /// The block type this payload belongs to.
    pub fn block_type(&self) -> BlockType {
        match self {
            BlockContent::Title(_) => BlockType::Title,
            BlockContent::Text(_) => BlockType::Text,
            BlockContent::PhotoText(_) => BlockType::PhotoText,
            BlockContent::Slide(_) => BlockType::Slide,
            BlockContent::ThreeColumns(_) => BlockType::ThreeColumns,
            BlockContent::Photo(_) => BlockType::Photo,
            BlockContent::Divider(_) => BlockType::Divider,
            BlockContent::Location(_) => BlockType::Location,
        }
    }

    /// Serialize the payload to its canonical JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        let value = match self {
            BlockContent::Title(c) => serde_json::to_value(c),
            BlockContent::Text(c) => serde_json::to_value(c),
            BlockContent::PhotoText(c) => serde_json::to_value(c),
            BlockContent::Slide(c) => serde_json::to_value(c),
            BlockContent::ThreeColumns(c) => serde_json::to_value(c),
            BlockContent::Photo(c) => serde_json::to_value(c),
            BlockContent::Divider(c) => serde_json::to_value(c),
            BlockContent::Location(c) => serde_json::to_value(c),
        };
        // Plain structs of strings, numbers and enums always serialize.
        value.unwrap_or(serde_json::Value::Null)
    }

    /// Decode a payload for `block_type` as-is, with field defaults only.
    ///
    /// No schema migration happens here; callers that read persisted data
    /// should go through the normalizer instead.
    pub fn from_json(
        block_type: BlockType,
        value: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(match block_type {
            BlockType::Title => BlockContent::Title(serde_json::from_value(value)?),
            BlockType::Text => BlockContent::Text(serde_json::from_value(value)?),
            BlockType::PhotoText => BlockContent::PhotoText(serde_json::from_value(value)?),
            BlockType::Slide => BlockContent::Slide(serde_json::from_value(value)?),
            BlockType::ThreeColumns => BlockContent::ThreeColumns(serde_json::from_value(value)?),
            BlockType::Photo => BlockContent::Photo(serde_json::from_value(value)?),
            BlockType::Divider => BlockContent::Divider(serde_json::from_value(value)?),
            BlockType::Location => BlockContent::Location(serde_json::from_value(value)?),
        })
    }

    pub fn as_location(&self) -> Option<&LocationContent> {
        match self {
            BlockContent::Location(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_location_mut(&mut self) -> Option<&mut LocationContent> {
        match self {
            BlockContent::Location(c) => Some(c),
            _ => None,
        }
    }
}
