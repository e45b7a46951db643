//! Ordered block model for Tourbook tours.
//!
//! Everything here is synchronous and I/O free: the store, the per-type
//! defaults, read-boundary normalization, validation, location editing and
//! move planning. The sync layer in `tourbook-client` decides *when* these
//! run relative to remote confirmation.
//!
//! # Modules
//!
//! - [`registry`]: default content per block type
//! - [`normalize`]: legacy → canonical content at the read boundary
//! - [`validate`]: required-field checks before persistence
//! - [`location`]: main/alternative location editing and promotion
//! - [`block_store`]: ordered collection with unique `order_index`
//! - [`ordering`]: up/down moves as pairwise swaps
//! - [`wire`]: JSON wire form of blocks

pub mod block_store;
mod error;
pub mod location;
pub mod normalize;
pub mod ordering;
pub mod registry;
pub mod validate;
pub mod wire;

pub use tourbook_types::*;

pub use block_store::{BlockStore, OrderCollision};
pub use error::BlockError;
pub use location::{LocationEditor, LocationPatch, switch_location};
pub use normalize::{normalize_content, normalize_location};
pub use ordering::{MoveDirection, MovePlan, MoveRequest, MoveState, OrderChange};
pub use registry::default_content;
pub use validate::validate_content;
pub use wire::WireBlock;

/// Result type for block operations.
pub type Result<T> = std::result::Result<T, BlockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_divider_to_empty_tour_gets_index_zero() {
        let store = BlockStore::new();
        let block = Block::new(
            BlockId::new(),
            store.next_order_index(),
            default_content(BlockType::Divider),
        );
        assert_eq!(block.order_index, 0);
    }

    #[test]
    fn test_location_block_lifecycle() {
        let mut store = BlockStore::new();
        let id = BlockId::new();
        store
            .add(Block::new(id, store.next_order_index(), default_content(BlockType::Location)))
            .unwrap();

        let content = store.get(&id).unwrap().content.as_location().unwrap().clone();
        let mut editor = LocationEditor::new(content);
        editor.update_current(LocationPatch::title("Belém Tower"));
        editor.add_alternative();
        editor.update_current(LocationPatch::title("Jerónimos"));
        editor.switch_location(0).unwrap();

        let content = BlockContent::Location(editor.into_content());
        validate_content(&content).unwrap();
        store.update(&id, content).unwrap();

        let location = store.get(&id).unwrap().content.as_location().unwrap();
        assert_eq!(location.main_location.title, "Jerónimos");
        assert_eq!(location.alternative_locations[0].title, "Belém Tower");
    }
}
