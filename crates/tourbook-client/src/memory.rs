//! In-process [`PersistenceGateway`] for offline sessions and tests.
//!
//! Blocks are kept in their wire form and decoded on every read, the same
//! read boundary the HTTP backend goes through. Raw (even legacy-shaped)
//! payloads can be seeded with [`MemoryGateway::seed`].

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use tourbook_blocks::{Block, BlockContent, BlockId, TourId, WireBlock};

use crate::auth::AccessToken;
use crate::gateway::{GatewayError, PersistenceGateway};

#[derive(Debug, Default)]
struct MemoryInner {
    blocks: HashMap<BlockId, WireBlock>,
    /// Tours whose block collection does not exist (list → NotFound).
    missing_tours: Vec<TourId>,
}

/// Gateway backed by a process-local map.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    inner: Mutex<MemoryInner>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw wire block as if it had been persisted earlier.
    pub fn seed(&self, block: WireBlock) {
        self.inner.lock().blocks.insert(block.id, block);
    }

    /// Make `list` for this tour report `NotFound`, as a backend without the
    /// tour's block collection does.
    pub fn forget_tour(&self, tour_id: TourId) {
        self.inner.lock().missing_tours.push(tour_id);
    }

    /// Raw stored form of a block.
    pub fn stored(&self, id: &BlockId) -> Option<WireBlock> {
        self.inner.lock().blocks.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn create(
        &self,
        _token: &AccessToken,
        tour_id: TourId,
        order_index: i64,
        content: &BlockContent,
    ) -> Result<Block, GatewayError> {
        let block = Block::new(BlockId::new(), order_index, content.clone());
        let wire = WireBlock::from_block(Some(tour_id), &block);
        let mut inner = self.inner.lock();
        inner.missing_tours.retain(|t| *t != tour_id);
        inner.blocks.insert(block.id, wire.clone());
        Ok(wire.into_block())
    }

    async fn update(
        &self,
        _token: &AccessToken,
        id: BlockId,
        content: &BlockContent,
        order_index: i64,
    ) -> Result<Block, GatewayError> {
        let mut inner = self.inner.lock();
        let stored = inner.blocks.get_mut(&id).ok_or(GatewayError::NotFound)?;
        if stored.block_type != content.block_type() {
            return Err(GatewayError::Status {
                status: 422,
                body: format!("block {id} is {}, not {}", stored.block_type, content.block_type()),
            });
        }
        stored.content = content.to_json();
        stored.order_index = order_index;
        Ok(stored.clone().into_block())
    }

    async fn delete(&self, _token: &AccessToken, id: BlockId) -> Result<(), GatewayError> {
        self.inner
            .lock()
            .blocks
            .remove(&id)
            .map(|_| ())
            .ok_or(GatewayError::NotFound)
    }

    async fn list(&self, _token: &AccessToken, tour_id: TourId) -> Result<Vec<Block>, GatewayError> {
        let wires: Vec<WireBlock> = {
            let inner = self.inner.lock();
            if inner.missing_tours.contains(&tour_id) {
                return Err(GatewayError::NotFound);
            }
            inner
                .blocks
                .values()
                .filter(|b| b.tour_id.is_none_or(|t| t == tour_id))
                .cloned()
                .collect()
        };
        Ok(wires.into_iter().map(WireBlock::into_block).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourbook_blocks::{BlockType, default_content};

    fn token() -> AccessToken {
        AccessToken::new("t").unwrap()
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_lists() {
        let gateway = MemoryGateway::new();
        let tour = TourId::new();
        let block = gateway
            .create(&token(), tour, 0, &default_content(BlockType::Title))
            .await
            .unwrap();
        let listed = gateway.list(&token(), tour).await.unwrap();
        assert_eq!(listed, vec![block]);
        assert!(gateway.list(&token(), TourId::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_rejects_type_change() {
        let gateway = MemoryGateway::new();
        let block = gateway
            .create(&token(), TourId::new(), 0, &default_content(BlockType::Divider))
            .await
            .unwrap();
        let err = gateway
            .update(&token(), block.id, &default_content(BlockType::Title), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Status { status: 422, .. }));
    }

    #[tokio::test]
    async fn test_missing_tour_and_block() {
        let gateway = MemoryGateway::new();
        let tour = TourId::new();
        gateway.forget_tour(tour);
        assert_eq!(gateway.list(&token(), tour).await, Err(GatewayError::NotFound));
        assert_eq!(gateway.delete(&token(), BlockId::new()).await, Err(GatewayError::NotFound));
    }
}
