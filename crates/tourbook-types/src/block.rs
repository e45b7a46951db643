//! Block types and the block record itself.
//!
//! A block's type is not stored separately: it is derived from its content
//! variant, so a block cannot disagree with its payload and the type cannot
//! change without replacing the content wholesale (which the store refuses).

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::content::BlockContent;
use crate::ids::BlockId;

/// What a block *is*.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum BlockType {
    #[strum(serialize = "title")]
    Title,
    #[strum(serialize = "text")]
    Text,
    /// Photos next to a paragraph.
    #[strum(serialize = "photo_text", serialize = "phototext")]
    PhotoText,
    #[strum(serialize = "slide")]
    Slide,
    #[strum(serialize = "three_columns", serialize = "threecolumns")]
    ThreeColumns,
    #[strum(serialize = "photo")]
    Photo,
    #[strum(serialize = "divider")]
    Divider,
    /// Main place plus promotable alternatives.
    #[strum(serialize = "location")]
    Location,
}

impl BlockType {
    /// Every known block type, in palette order.
    pub const ALL: [BlockType; 8] = [
        BlockType::Title,
        BlockType::Text,
        BlockType::PhotoText,
        BlockType::Slide,
        BlockType::ThreeColumns,
        BlockType::Photo,
        BlockType::Divider,
        BlockType::Location,
    ];

    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Convert to the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Title => "title",
            BlockType::Text => "text",
            BlockType::PhotoText => "photo_text",
            BlockType::Slide => "slide",
            BlockType::ThreeColumns => "three_columns",
            BlockType::Photo => "photo",
            BlockType::Divider => "divider",
            BlockType::Location => "location",
        }
    }

    /// Whether persisted content of this type may be in a legacy shape.
    pub fn needs_normalization(&self) -> bool {
        matches!(self, BlockType::Location)
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One ordered unit of tour content.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub id: BlockId,
    /// Render position; unique within a tour, gaps allowed.
    pub order_index: i64,
    pub content: BlockContent,
}

impl Block {
    pub fn new(id: BlockId, order_index: i64, content: BlockContent) -> Self {
        Self {
            id,
            order_index,
            content,
        }
    }

    pub fn block_type(&self) -> BlockType {
        self.content.block_type()
    }
}
