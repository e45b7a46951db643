//! JSON wire form of a block, as exchanged with the persistence API.
//!
//! ```json
//! { "id": "…", "tour_id": "…", "type": "location", "order_index": 3, "content": { … } }
//! ```
//!
//! Decoding ([`WireBlock::into_block`]) is the read boundary: content is
//! normalized there, so legacy shapes never reach the store. Encoding always
//! produces canonical content.

use serde::{Deserialize, Serialize};

use crate::normalize::normalize_content;
use crate::{Block, BlockContent, BlockId, BlockType, TourId};

/// A block as the backend returns it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireBlock {
    pub id: BlockId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tour_id: Option<TourId>,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub order_index: i64,
    #[serde(default)]
    pub content: serde_json::Value,
}

impl WireBlock {
    pub fn from_block(tour_id: Option<TourId>, block: &Block) -> Self {
        Self {
            id: block.id,
            tour_id,
            block_type: block.block_type(),
            order_index: block.order_index,
            content: block.content.to_json(),
        }
    }

    /// Normalize and convert to a [`Block`].
    pub fn into_block(self) -> Block {
        let content = normalize_content(self.block_type, &self.content);
        Block::new(self.id, self.order_index, content)
    }
}

/// Body of a create request; the backend assigns the id.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewBlockBody {
    pub tour_id: TourId,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub order_index: i64,
    pub content: serde_json::Value,
}

impl NewBlockBody {
    pub fn new(tour_id: TourId, order_index: i64, content: &BlockContent) -> Self {
        Self {
            tour_id,
            block_type: content.block_type(),
            order_index,
            content: content.to_json(),
        }
    }
}

/// Body of an update request: full replace of content and order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UpdateBlockBody {
    pub order_index: i64,
    pub content: serde_json::Value,
}

impl UpdateBlockBody {
    pub fn new(content: &BlockContent, order_index: i64) -> Self {
        Self {
            order_index,
            content: content.to_json(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_normalizes_legacy_location() {
        let id = BlockId::new();
        let wire: WireBlock = serde_json::from_value(json!({
            "id": id.to_string(),
            "type": "location",
            "order_index": 4,
            "content": {"title": "X", "time": "9-10"}
        }))
        .unwrap();

        let block = wire.into_block();
        assert_eq!(block.id, id);
        assert_eq!(block.order_index, 4);
        let location = block.content.as_location().unwrap();
        assert_eq!(location.main_location.title, "X");
        assert!(location.alternative_locations.is_empty());
    }

    #[test]
    fn test_encode_is_canonical() {
        let block = Block::new(
            BlockId::new(),
            0,
            BlockContent::Location(crate::LocationContent::new(crate::Location::titled("Y"))),
        );
        let wire = WireBlock::from_block(None, &block);
        let value = serde_json::to_value(&wire).unwrap();
        assert_eq!(value["type"], "location");
        assert_eq!(value["content"]["mainLocation"]["title"], "Y");
        assert!(value.get("tour_id").is_none());
        assert_eq!(wire.into_block(), block);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let result: std::result::Result<WireBlock, _> = serde_json::from_value(json!({
            "id": BlockId::new().to_string(),
            "type": "carousel",
            "order_index": 0,
            "content": {}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_create_body_carries_type_tag() {
        let tour = TourId::new();
        let body = NewBlockBody::new(tour, 2, &crate::registry::default_content(BlockType::Divider));
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["type"], "divider");
        assert_eq!(value["order_index"], 2);
        assert_eq!(value["content"], json!({"style": "solid"}));
    }
}
