//! Sync controller: one open tour session's blocks, kept consistent with the
//! persistence backend.
//!
//! # Policy
//!
//! | Intent           | Local store mutated…                         |
//! |------------------|----------------------------------------------|
//! | add              | after the backend returns the new block      |
//! | edit             | after the backend returns canonical content  |
//! | delete           | after the backend confirms or reports 404    |
//! | move             | after *both* paired updates succeed          |
//! | switch location  | immediately; restored from snapshot on error |
//!
//! Validation and the auth precondition are checked before any remote call,
//! so they never leave partial state behind.
//!
//! # Concurrency
//!
//! Methods take `&self`; the store sits behind a `parking_lot::RwLock` that is
//! never held across an `.await`. At most one remote call is outstanding per
//! block id. A second request for a busy block is rejected with
//! [`SyncError::Busy`] rather than racing it. Creates are serialized the same
//! way because they allocate the next `order_index`.
//!
//! # Reorder partial failure
//!
//! A move is two independent remote updates. When exactly one lands, the
//! controller sends a compensating update restoring that block's previous
//! index. If the compensation fails too, the backend may now hold a duplicate
//! index; the error is [`SyncError::OrderDiverged`] and
//! [`SyncController::repair_ordering`] renumbers the tour remotely.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument, warn};

use tourbook_blocks::ordering::renumber;
use tourbook_blocks::{
    Block, BlockContent, BlockError, BlockId, BlockStore, BlockType, LocationEditor, MoveDirection,
    MoveRequest, OrderChange, TourId, default_content, switch_location, validate_content,
};

use crate::auth::{AccessToken, TokenProvider};
use crate::gateway::{GatewayError, PersistenceGateway};

/// Capacity of the block event channel. Slow subscribers lag, then resync
/// from [`SyncController::blocks`].
const EVENT_CAPACITY: usize = 256;

// ============================================================================
// Errors
// ============================================================================

/// An operation that holds a slot while its remote call is outstanding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pending {
    /// A create (allocates `order_index`).
    Create,
    /// A full load or repair (touches every block).
    Load,
    /// Any call addressing this block.
    Block(BlockId),
}

/// Errors surfaced by the sync controller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    /// Local precondition or store failure.
    #[error(transparent)]
    Block(#[from] BlockError),

    /// Transport or server failure on a persistence call.
    #[error("remote failure: {0}")]
    Remote(#[from] GatewayError),

    /// No credential available; nothing was sent.
    #[error("not signed in")]
    Unauthenticated,

    /// Another call for the same target is still outstanding.
    #[error("operation already in flight: {0:?}")]
    Busy(Pending),

    /// The block exists but is not a location block.
    #[error("block {0:?} is not a location block")]
    NotLocation(BlockId),

    /// A reorder half-applied remotely and could not be reverted.
    #[error("remote order diverged for {block:?}: {reason}")]
    OrderDiverged { block: BlockId, reason: String },
}

/// The coarse error categories callers branch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    DuplicateId,
    ValidationFailure,
    RemoteFailure,
    Unauthenticated,
    /// Busy target or order index clash.
    Conflict,
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::Block(BlockError::NotFound(_)) => ErrorKind::NotFound,
            SyncError::Block(BlockError::DuplicateId(_)) => ErrorKind::DuplicateId,
            SyncError::Block(BlockError::OrderConflict { .. }) => ErrorKind::Conflict,
            SyncError::Block(_) | SyncError::NotLocation(_) => ErrorKind::ValidationFailure,
            SyncError::Remote(GatewayError::Unauthorized) | SyncError::Unauthenticated => {
                ErrorKind::Unauthenticated
            }
            SyncError::Remote(_) | SyncError::OrderDiverged { .. } => ErrorKind::RemoteFailure,
            SyncError::Busy(_) => ErrorKind::Conflict,
        }
    }
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;

// ============================================================================
// Events
// ============================================================================

/// Store changes, broadcast so views can re-render.
#[derive(Clone, Debug, PartialEq)]
pub enum BlockEvent {
    /// The whole store was replaced from the backend.
    Loaded { count: usize },
    Inserted { block: Block },
    /// Content changed (confirmed, or optimistic for a location switch).
    Updated { block: Block },
    Removed { id: BlockId },
    Reordered { changes: [OrderChange; 2] },
    /// An optimistic change was undone; `block` is the restored state.
    RolledBack { block: Block },
}

// ============================================================================
// In-flight tracking
// ============================================================================

/// Releases its claimed slots on drop, whatever way the call ended.
struct InFlightGuard<'a> {
    slots: &'a Mutex<HashSet<Pending>>,
    claimed: Vec<Pending>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut slots = self.slots.lock();
        for pending in &self.claimed {
            slots.remove(pending);
        }
    }
}

// ============================================================================
// SyncController
// ============================================================================

/// Owns one tour's [`BlockStore`] and mediates every change to it.
pub struct SyncController {
    tour_id: TourId,
    gateway: Arc<dyn PersistenceGateway>,
    tokens: Arc<dyn TokenProvider>,
    store: RwLock<BlockStore>,
    in_flight: Mutex<HashSet<Pending>>,
    events: broadcast::Sender<BlockEvent>,
}

impl SyncController {
    /// Controller with an empty store; call [`load`](Self::load) to populate.
    pub fn new(
        tour_id: TourId,
        gateway: Arc<dyn PersistenceGateway>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            tour_id,
            gateway,
            tokens,
            store: RwLock::new(BlockStore::new()),
            in_flight: Mutex::new(HashSet::new()),
            events,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn tour_id(&self) -> TourId {
        self.tour_id
    }

    /// Blocks in render order.
    pub fn blocks(&self) -> Vec<Block> {
        self.store.read().list()
    }

    pub fn block(&self, id: &BlockId) -> Option<Block> {
        self.store.read().get(id).cloned()
    }

    /// Store version, bumped on every local mutation.
    pub fn version(&self) -> u64 {
        self.store.read().version()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BlockEvent> {
        self.events.subscribe()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn emit(&self, event: BlockEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    async fn token(&self) -> Result<AccessToken> {
        self.tokens.access_token().await.ok_or(SyncError::Unauthenticated)
    }

    fn claim(&self, wanted: &[Pending]) -> Result<InFlightGuard<'_>> {
        let mut slots = self.in_flight.lock();
        let loading = slots.contains(&Pending::Load);
        for pending in wanted {
            if slots.contains(pending) || loading {
                return Err(SyncError::Busy(*pending));
            }
            if *pending == Pending::Load && !slots.is_empty() {
                return Err(SyncError::Busy(Pending::Load));
            }
        }
        slots.extend(wanted.iter().copied());
        Ok(InFlightGuard {
            slots: &self.in_flight,
            claimed: wanted.to_vec(),
        })
    }

    fn require_block(&self, id: &BlockId) -> Result<Block> {
        self.block(id).ok_or(SyncError::Block(BlockError::NotFound(*id)))
    }

    // =========================================================================
    // Load / repair
    // =========================================================================

    /// Replace the local store with the backend's blocks for this tour.
    ///
    /// A tour with no stored block collection loads as empty. Duplicate order
    /// indices found in the backend are repaired before the store is built.
    #[instrument(skip(self), fields(tour = %self.tour_id))]
    pub async fn load(&self) -> Result<Vec<Block>> {
        let _guard = self.claim(&[Pending::Load])?;
        let token = self.token().await?;

        let blocks = self.fetch_all(&token).await?;
        let (store, collisions) = BlockStore::from_blocks(blocks.clone())?;
        let store = if collisions.is_empty() {
            store
        } else {
            warn!(collisions = collisions.len(), "duplicate order indices in backend, repairing");
            self.renumber_remote(&token, blocks).await?
        };

        let count = store.len();
        *self.store.write() = store;
        info!(count, "tour loaded");
        self.emit(BlockEvent::Loaded { count });
        Ok(self.blocks())
    }

    /// Renumber the tour's order indices remotely to 0, 1, 2, … (keeping the
    /// current relative order) and reload. Returns how many blocks moved.
    #[instrument(skip(self), fields(tour = %self.tour_id))]
    pub async fn repair_ordering(&self) -> Result<usize> {
        let _guard = self.claim(&[Pending::Load])?;
        let token = self.token().await?;

        let blocks = self.fetch_all(&token).await?;
        let moved = renumber(&blocks).len();
        let store = self.renumber_remote(&token, blocks).await?;

        let count = store.len();
        *self.store.write() = store;
        info!(moved, "order indices repaired");
        self.emit(BlockEvent::Loaded { count });
        Ok(moved)
    }

    async fn fetch_all(&self, token: &AccessToken) -> Result<Vec<Block>> {
        match self.gateway.list(token, self.tour_id).await {
            Ok(blocks) => Ok(blocks),
            Err(GatewayError::NotFound) => {
                debug!("no stored blocks for tour, starting empty");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn renumber_remote(&self, token: &AccessToken, mut blocks: Vec<Block>) -> Result<BlockStore> {
        for change in renumber(&blocks) {
            let Some(slot) = blocks.iter_mut().find(|b| b.id == change.id) else {
                continue;
            };
            let updated = self
                .gateway
                .update(token, change.id, &slot.content, change.to)
                .await?;
            *slot = updated;
        }

        let (store, collisions) = BlockStore::from_blocks(blocks)?;
        if let Some(collision) = collisions.first() {
            return Err(SyncError::OrderDiverged {
                block: collision.ids.first().copied().unwrap_or_default(),
                reason: format!("order index {} still duplicated after repair", collision.order_index),
            });
        }
        Ok(store)
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Append a block of `block_type` with its default content.
    #[instrument(skip(self), fields(tour = %self.tour_id))]
    pub async fn add_block(&self, block_type: BlockType) -> Result<Block> {
        self.create(default_content(block_type)).await
    }

    /// Append a block with author-supplied content.
    #[instrument(skip(self, content), fields(tour = %self.tour_id, block_type = %content.block_type()))]
    pub async fn add_block_with(&self, content: BlockContent) -> Result<Block> {
        validate_content(&content)?;
        self.create(content).await
    }

    async fn create(&self, content: BlockContent) -> Result<Block> {
        let _guard = self.claim(&[Pending::Create])?;
        let token = self.token().await?;

        let order_index = self.store.read().next_order_index();
        let block = self
            .gateway
            .create(&token, self.tour_id, order_index, &content)
            .await?;

        self.store.write().add(block.clone())?;
        info!(block = ?block.id, order_index = block.order_index, "block created");
        self.emit(BlockEvent::Inserted { block: block.clone() });
        Ok(block)
    }

    // =========================================================================
    // Edit
    // =========================================================================

    /// Replace a block's content; the store takes the backend's returned content.
    #[instrument(skip(self, content), fields(tour = %self.tour_id))]
    pub async fn update_block(&self, id: BlockId, content: BlockContent) -> Result<Block> {
        let current = self.require_block(&id)?;
        if current.block_type() != content.block_type() {
            return Err(BlockError::TypeMismatch {
                id,
                expected: current.block_type(),
                got: content.block_type(),
            }
            .into());
        }
        validate_content(&content)?;

        let _guard = self.claim(&[Pending::Block(id)])?;
        let token = self.token().await?;

        let order_index = self.require_block(&id)?.order_index;
        let block = self.gateway.update(&token, id, &content, order_index).await?;

        self.store.write().update(&id, block.content.clone())?;
        let block = self.require_block(&id)?;
        info!(block = ?id, "block updated");
        self.emit(BlockEvent::Updated { block: block.clone() });
        Ok(block)
    }

    /// Edit a location block through a [`LocationEditor`] and persist the result.
    ///
    /// The closure works on a copy; nothing changes unless it returns `Ok`
    /// and the remote update succeeds.
    pub async fn edit_location<F>(&self, id: BlockId, edit: F) -> Result<Block>
    where
        F: FnOnce(&mut LocationEditor) -> std::result::Result<(), BlockError>,
    {
        let current = self.require_block(&id)?;
        let content = current
            .content
            .as_location()
            .cloned()
            .ok_or(SyncError::NotLocation(id))?;

        let mut editor = LocationEditor::new(content);
        edit(&mut editor)?;
        self.update_block(id, BlockContent::Location(editor.into_content()))
            .await
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Delete a block. One the backend no longer has is dropped locally too.
    #[instrument(skip(self), fields(tour = %self.tour_id))]
    pub async fn delete_block(&self, id: BlockId) -> Result<()> {
        self.require_block(&id)?;
        let _guard = self.claim(&[Pending::Block(id)])?;
        let token = self.token().await?;

        match self.gateway.delete(&token, id).await {
            Ok(()) => {}
            Err(GatewayError::NotFound) => {
                warn!(block = ?id, "block already gone remotely, dropping local copy");
            }
            Err(e) => return Err(e.into()),
        }

        self.store.write().remove(&id)?;
        info!(block = ?id, "block deleted");
        self.emit(BlockEvent::Removed { id });
        Ok(())
    }

    // =========================================================================
    // Move
    // =========================================================================

    /// Move a block one step up or down by swapping order indices with its
    /// neighbour. Returns the blocks in their (possibly new) order.
    #[instrument(skip(self), fields(tour = %self.tour_id))]
    pub async fn move_block(&self, id: BlockId, direction: MoveDirection) -> Result<Vec<Block>> {
        let mut request = MoveRequest::new(id, direction);
        let plan = request.compute(&self.store.read())?;
        let Some(plan) = plan else {
            debug!(block = ?id, %direction, "move is a no-op at list edge");
            return Ok(self.blocks());
        };

        let _guard = self.claim(&[Pending::Block(plan.moved.id), Pending::Block(plan.neighbor.id)])?;
        let token = self.token().await?;

        let moved_content = self.require_block(&plan.moved.id)?.content;
        let neighbor_content = self.require_block(&plan.neighbor.id)?.content;

        request.awaiting_confirmation();
        let (moved_result, neighbor_result) = futures::join!(
            self.gateway
                .update(&token, plan.moved.id, &moved_content, plan.moved.to),
            self.gateway
                .update(&token, plan.neighbor.id, &neighbor_content, plan.neighbor.to),
        );

        match (moved_result, neighbor_result) {
            (Ok(_), Ok(_)) => {
                request.apply(&mut self.store.write())?;
                info!(block = ?id, %direction, "block moved");
                self.emit(BlockEvent::Reordered { changes: plan.changes() });
                Ok(self.blocks())
            }
            (Err(cause), Err(_)) => {
                request.roll_back();
                Err(cause.into())
            }
            (Ok(_), Err(cause)) => {
                request.roll_back();
                Err(self.compensate(&token, plan.moved, &moved_content, cause).await)
            }
            (Err(cause), Ok(_)) => {
                request.roll_back();
                Err(self.compensate(&token, plan.neighbor, &neighbor_content, cause).await)
            }
        }
    }

    /// Revert the half of a move that landed remotely. Returns the error to
    /// report for the move.
    async fn compensate(
        &self,
        token: &AccessToken,
        landed: OrderChange,
        content: &BlockContent,
        cause: GatewayError,
    ) -> SyncError {
        let undo = landed.inverse();
        warn!(block = ?undo.id, to = undo.to, %cause, "reorder half-applied remotely, reverting");
        match self.gateway.update(token, undo.id, content, undo.to).await {
            Ok(_) => SyncError::Remote(cause),
            Err(revert) => {
                error!(block = ?undo.id, %cause, %revert, "reorder revert failed, remote order diverged");
                SyncError::OrderDiverged {
                    block: undo.id,
                    reason: format!("{cause}; revert failed: {revert}"),
                }
            }
        }
    }

    // =========================================================================
    // Switch location (optimistic)
    // =========================================================================

    /// Promote alternative `alternative` of a location block to main.
    ///
    /// Applied locally before the remote call; on remote failure the block is
    /// restored verbatim and a [`BlockEvent::RolledBack`] is emitted.
    #[instrument(skip(self), fields(tour = %self.tour_id))]
    pub async fn switch_location(&self, id: BlockId, alternative: usize) -> Result<Block> {
        let _guard = self.claim(&[Pending::Block(id)])?;
        let token = self.token().await?;

        let snapshot = self.require_block(&id)?;
        let mut switched = snapshot.clone();
        let location = switched
            .content
            .as_location_mut()
            .ok_or(SyncError::NotLocation(id))?;
        switch_location(location, alternative)?;

        self.store.write().update(&id, switched.content.clone())?;
        self.emit(BlockEvent::Updated { block: switched.clone() });

        match self
            .gateway
            .update(&token, id, &switched.content, switched.order_index)
            .await
        {
            Ok(confirmed) => {
                self.store.write().update(&id, confirmed.content)?;
                let block = self.require_block(&id)?;
                info!(block = ?id, alternative, "location switched");
                self.emit(BlockEvent::Updated { block: block.clone() });
                Ok(block)
            }
            Err(cause) => {
                warn!(block = ?id, %cause, "location switch failed remotely, rolling back");
                self.store.write().replace(snapshot.clone())?;
                self.emit(BlockEvent::RolledBack { block: snapshot });
                Err(cause.into())
            }
        }
    }
}
