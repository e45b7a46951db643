//! Block store: the ordered in-memory collection of one tour's blocks.
//!
//! Blocks are indexed by id; render order comes from `order_index`, which is
//! unique within the store. Gaps are fine: only relative order matters, and
//! removal never renumbers the remaining blocks.
//!
//! The store is plain data with no I/O. Persistence policy (when a remote
//! confirmation is required before a mutation lands here) belongs to the
//! sync layer that owns the store.

use std::collections::{BTreeMap, HashMap};

use crate::{Block, BlockContent, BlockError, BlockId, Result};

/// Ordered collection of a tour's blocks.
#[derive(Debug, Default, Clone)]
pub struct BlockStore {
    /// Blocks indexed by ID.
    blocks: HashMap<BlockId, Block>,

    /// order_index → id. Mirrors `blocks`; enforces index uniqueness.
    order: BTreeMap<i64, BlockId>,

    /// Store version (bumped on any mutation).
    version: u64,
}

/// Order indices held by more than one block, found during a bulk load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCollision {
    pub order_index: i64,
    pub ids: Vec<BlockId>,
}

impl BlockStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from blocks as listed by the backend (any order).
    ///
    /// Fails on a repeated id. Duplicate order indices are reported rather
    /// than rejected, since they can only come from the backend; the blocks
    /// involved are left out of the store so the caller can repair them.
    pub fn from_blocks(blocks: Vec<Block>) -> Result<(Self, Vec<OrderCollision>)> {
        let mut by_index: BTreeMap<i64, Vec<Block>> = BTreeMap::new();
        for block in blocks {
            by_index.entry(block.order_index).or_default().push(block);
        }

        let mut store = Self::new();
        let mut collisions = Vec::new();
        for (order_index, group) in by_index {
            if group.len() > 1 {
                let mut ids: Vec<BlockId> = group.iter().map(|b| b.id).collect();
                ids.sort();
                collisions.push(OrderCollision { order_index, ids });
                continue;
            }
            for block in group {
                store.add(block)?;
            }
        }
        Ok((store, collisions))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the current version.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.blocks.contains_key(id)
    }

    pub fn get(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.get(id)
    }

    /// All blocks in render order (ascending `order_index`).
    pub fn list(&self) -> Vec<Block> {
        self.order
            .values()
            .filter_map(|id| self.blocks.get(id))
            .cloned()
            .collect()
    }

    /// Order index for a block appended at the end: `max + 1`, or 0 when empty.
    pub fn next_order_index(&self) -> i64 {
        self.order
            .last_key_value()
            .map(|(index, _)| index + 1)
            .unwrap_or(0)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Insert a new block.
    pub fn add(&mut self, block: Block) -> Result<()> {
        if self.blocks.contains_key(&block.id) {
            return Err(BlockError::DuplicateId(block.id));
        }
        if let Some(holder) = self.order.get(&block.order_index) {
            return Err(BlockError::OrderConflict {
                order_index: block.order_index,
                holder: *holder,
            });
        }
        self.order.insert(block.order_index, block.id);
        self.blocks.insert(block.id, block);
        self.version += 1;
        Ok(())
    }

    /// Replace a block's content. The content must be of the block's type.
    pub fn update(&mut self, id: &BlockId, content: BlockContent) -> Result<()> {
        let block = self.blocks.get_mut(id).ok_or(BlockError::NotFound(*id))?;
        let expected = block.block_type();
        let got = content.block_type();
        if expected != got {
            return Err(BlockError::TypeMismatch {
                id: *id,
                expected,
                got,
            });
        }
        block.content = content;
        self.version += 1;
        Ok(())
    }

    /// Move a block to a free order index.
    pub fn update_order(&mut self, id: &BlockId, order_index: i64) -> Result<()> {
        let current = self.blocks.get(id).ok_or(BlockError::NotFound(*id))?.order_index;
        if current == order_index {
            return Ok(());
        }
        if let Some(holder) = self.order.get(&order_index) {
            return Err(BlockError::OrderConflict {
                order_index,
                holder: *holder,
            });
        }
        self.order.remove(&current);
        self.order.insert(order_index, *id);
        if let Some(block) = self.blocks.get_mut(id) {
            block.order_index = order_index;
        }
        self.version += 1;
        Ok(())
    }

    /// Exchange the order indices of two blocks in one step.
    pub fn swap_order(&mut self, a: &BlockId, b: &BlockId) -> Result<()> {
        let index_a = self.blocks.get(a).ok_or(BlockError::NotFound(*a))?.order_index;
        let index_b = self.blocks.get(b).ok_or(BlockError::NotFound(*b))?.order_index;
        if a == b {
            return Ok(());
        }

        self.order.insert(index_a, *b);
        self.order.insert(index_b, *a);
        if let Some(block) = self.blocks.get_mut(a) {
            block.order_index = index_b;
        }
        if let Some(block) = self.blocks.get_mut(b) {
            block.order_index = index_a;
        }
        self.version += 1;
        Ok(())
    }

    /// Put an existing block back exactly as given (content and order).
    ///
    /// Used to restore a snapshot after a failed optimistic update.
    pub fn replace(&mut self, block: Block) -> Result<()> {
        let current = self.blocks.get(&block.id).ok_or(BlockError::NotFound(block.id))?;
        if current.block_type() != block.block_type() {
            return Err(BlockError::TypeMismatch {
                id: block.id,
                expected: current.block_type(),
                got: block.block_type(),
            });
        }
        let id = block.id;
        self.update_order(&id, block.order_index)?;
        self.blocks.insert(id, block);
        self.version += 1;
        Ok(())
    }

    /// Remove a block. Other blocks keep their order indices.
    pub fn remove(&mut self, id: &BlockId) -> Result<Block> {
        let block = self.blocks.remove(id).ok_or(BlockError::NotFound(*id))?;
        self.order.remove(&block.order_index);
        self.version += 1;
        Ok(block)
    }
}

// ============================================================================
// Tests
// ============================================================================
