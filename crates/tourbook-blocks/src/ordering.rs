//! Up/down moves as pairwise `order_index` swaps.
//!
//! A move is planned against the store's render order, confirmed remotely by
//! the sync layer, then applied in one step with [`BlockStore::swap_order`].
//!
//! # State Machine
//!
//! ```text
//! Idle ──plan──▶ Computing ──remote calls issued──▶ AwaitingConfirmation
//!                    │                                   │          │
//!                    │ no-op (edge of list)          both ok     any failed
//!                    ▼                                   ▼          ▼
//!                  Idle                               Applied   RolledBack
//! ```

use std::fmt;

use tracing::debug;

use crate::{Block, BlockId, BlockStore, Result};

/// Direction of a move in render order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

impl MoveDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveDirection::Up => "up",
            MoveDirection::Down => "down",
        }
    }
}

impl fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle of one move request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MoveState {
    #[default]
    Idle,
    Computing,
    AwaitingConfirmation,
    Applied,
    RolledBack,
}

impl MoveState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MoveState::Applied | MoveState::RolledBack)
    }

    fn can_advance_to(self, next: MoveState) -> bool {
        use MoveState::*;
        matches!(
            (self, next),
            (Idle, Computing)
                | (Computing, Idle)
                | (Computing, AwaitingConfirmation)
                | (AwaitingConfirmation, Applied)
                | (AwaitingConfirmation, RolledBack)
        )
    }
}

/// One block's part of a move: where it is and where it goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderChange {
    pub id: BlockId,
    pub from: i64,
    pub to: i64,
}

impl OrderChange {
    /// The change that undoes this one.
    pub fn inverse(&self) -> Self {
        Self {
            id: self.id,
            from: self.to,
            to: self.from,
        }
    }
}

/// Swap of two adjacent blocks' order indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MovePlan {
    pub direction: MoveDirection,
    /// The block the author asked to move.
    pub moved: OrderChange,
    /// Its neighbour in `direction`, which takes the moved block's place.
    pub neighbor: OrderChange,
}

impl MovePlan {
    pub fn changes(&self) -> [OrderChange; 2] {
        [self.moved, self.neighbor]
    }
}

/// A move request walking through [`MoveState`].
#[derive(Debug)]
pub struct MoveRequest {
    id: BlockId,
    direction: MoveDirection,
    state: MoveState,
    plan: Option<MovePlan>,
}

impl MoveRequest {
    pub fn new(id: BlockId, direction: MoveDirection) -> Self {
        Self {
            id,
            direction,
            state: MoveState::Idle,
            plan: None,
        }
    }

    pub fn state(&self) -> MoveState {
        self.state
    }

    fn advance(&mut self, next: MoveState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "invalid move transition {:?} -> {next:?}",
            self.state
        );
        debug!(block = ?self.id, from = ?self.state, to = ?next, "move state");
        self.state = next;
    }

    /// Compute the swap. `Ok(None)` means the move is a no-op and the
    /// request is back to `Idle`.
    pub fn compute(&mut self, store: &BlockStore) -> Result<Option<MovePlan>> {
        self.advance(MoveState::Computing);
        match plan_move(store, &self.id, self.direction) {
            Ok(Some(plan)) => {
                self.plan = Some(plan);
                Ok(Some(plan))
            }
            Ok(None) => {
                self.advance(MoveState::Idle);
                Ok(None)
            }
            Err(e) => {
                self.advance(MoveState::Idle);
                Err(e)
            }
        }
    }

    /// Remote updates are in flight.
    pub fn awaiting_confirmation(&mut self) {
        self.advance(MoveState::AwaitingConfirmation);
    }

    /// Both remote updates confirmed: apply the swap locally.
    pub fn apply(&mut self, store: &mut BlockStore) -> Result<()> {
        if let Some(plan) = self.plan {
            apply_plan(store, &plan)?;
        }
        self.advance(MoveState::Applied);
        Ok(())
    }

    /// Remote confirmation failed; the store was never touched.
    pub fn roll_back(&mut self) {
        self.advance(MoveState::RolledBack);
    }
}

/// Plan moving `id` one step in `direction`.
///
/// Returns `Ok(None)` when the block is already first (up) or last (down).
pub fn plan_move(
    store: &BlockStore,
    id: &BlockId,
    direction: MoveDirection,
) -> Result<Option<MovePlan>> {
    let ordered = store.list();
    let position = ordered
        .iter()
        .position(|b| b.id == *id)
        .ok_or(crate::BlockError::NotFound(*id))?;

    let neighbor_position = match direction {
        MoveDirection::Up if position == 0 => return Ok(None),
        MoveDirection::Up => position - 1,
        MoveDirection::Down if position + 1 == ordered.len() => return Ok(None),
        MoveDirection::Down => position + 1,
    };

    let moved = &ordered[position];
    let neighbor = &ordered[neighbor_position];
    Ok(Some(MovePlan {
        direction,
        moved: OrderChange {
            id: moved.id,
            from: moved.order_index,
            to: neighbor.order_index,
        },
        neighbor: OrderChange {
            id: neighbor.id,
            from: neighbor.order_index,
            to: moved.order_index,
        },
    }))
}

/// Apply a confirmed plan to the store atomically.
pub fn apply_plan(store: &mut BlockStore, plan: &MovePlan) -> Result<()> {
    store.swap_order(&plan.moved.id, &plan.neighbor.id)
}

/// Sequential order indices (0, 1, 2, …) for `blocks`, keeping their
/// current relative order with id as tiebreak for duplicated indices.
///
/// Only blocks whose index actually changes are returned.
pub fn renumber(blocks: &[Block]) -> Vec<OrderChange> {
    let mut sorted: Vec<&Block> = blocks.iter().collect();
    sorted.sort_by(|a, b| a.order_index.cmp(&b.order_index).then(a.id.cmp(&b.id)));
    sorted
        .into_iter()
        .zip(0_i64..)
        .filter(|(block, index)| block.order_index != *index)
        .map(|(block, index)| OrderChange {
            id: block.id,
            from: block.order_index,
            to: index,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::default_content;
    use crate::{BlockError, BlockType};

    fn store_with(n: i64) -> (BlockStore, Vec<BlockId>) {
        let mut store = BlockStore::new();
        let mut ids = Vec::new();
        for i in 0..n {
            let block = Block::new(BlockId::new(), i, default_content(BlockType::Text));
            ids.push(block.id);
            store.add(block).unwrap();
        }
        (store, ids)
    }

    #[test]
    fn test_move_up_swaps_with_previous() {
        let (mut store, ids) = store_with(3);
        let plan = plan_move(&store, &ids[1], MoveDirection::Up).unwrap().unwrap();
        assert_eq!(plan.moved, OrderChange { id: ids[1], from: 1, to: 0 });
        assert_eq!(plan.neighbor, OrderChange { id: ids[0], from: 0, to: 1 });

        apply_plan(&mut store, &plan).unwrap();
        let order: Vec<_> = store.list().into_iter().map(|b| b.id).collect();
        assert_eq!(order, vec![ids[1], ids[0], ids[2]]);
    }

    #[test]
    fn test_edges_are_no_ops() {
        let (store, ids) = store_with(3);
        assert_eq!(plan_move(&store, &ids[0], MoveDirection::Up).unwrap(), None);
        assert_eq!(plan_move(&store, &ids[2], MoveDirection::Down).unwrap(), None);
    }

    #[test]
    fn test_move_respects_gaps() {
        let mut store = BlockStore::new();
        let a = Block::new(BlockId::new(), 2, default_content(BlockType::Text));
        let b = Block::new(BlockId::new(), 10, default_content(BlockType::Text));
        store.add(a.clone()).unwrap();
        store.add(b.clone()).unwrap();

        let plan = plan_move(&store, &a.id, MoveDirection::Down).unwrap().unwrap();
        assert_eq!(plan.moved.to, 10);
        assert_eq!(plan.neighbor.to, 2);
    }

    #[test]
    fn test_unknown_block() {
        let (store, _) = store_with(2);
        let id = BlockId::new();
        assert_eq!(plan_move(&store, &id, MoveDirection::Up), Err(BlockError::NotFound(id)));
    }

    #[test]
    fn test_request_state_machine() {
        let (mut store, ids) = store_with(2);
        let mut request = MoveRequest::new(ids[1], MoveDirection::Up);
        assert_eq!(request.state(), MoveState::Idle);

        request.compute(&store).unwrap().unwrap();
        assert_eq!(request.state(), MoveState::Computing);
        request.awaiting_confirmation();
        request.apply(&mut store).unwrap();
        assert_eq!(request.state(), MoveState::Applied);
        assert!(request.state().is_terminal());
        assert_eq!(store.get(&ids[1]).unwrap().order_index, 0);
    }

    #[test]
    fn test_request_no_op_returns_to_idle() {
        let (store, ids) = store_with(2);
        let mut request = MoveRequest::new(ids[0], MoveDirection::Up);
        assert_eq!(request.compute(&store).unwrap(), None);
        assert_eq!(request.state(), MoveState::Idle);
    }

    #[test]
    fn test_request_roll_back_leaves_store() {
        let (store, ids) = store_with(2);
        let before = store.list();
        let mut request = MoveRequest::new(ids[0], MoveDirection::Down);
        request.compute(&store).unwrap();
        request.awaiting_confirmation();
        request.roll_back();
        assert_eq!(request.state(), MoveState::RolledBack);
        assert_eq!(store.list(), before);
    }

    #[test]
    fn test_renumber_breaks_duplicate_indices() {
        let a = Block::new(BlockId::new(), 0, default_content(BlockType::Text));
        let mut b = Block::new(BlockId::new(), 1, default_content(BlockType::Text));
        let mut c = Block::new(BlockId::new(), 1, default_content(BlockType::Text));
        if c.id < b.id {
            std::mem::swap(&mut b.id, &mut c.id);
        }
        let changes = renumber(&[a, c.clone(), b]);
        assert_eq!(changes, vec![OrderChange { id: c.id, from: 1, to: 2 }]);
    }

    #[test]
    fn test_inverse_change() {
        let change = OrderChange { id: BlockId::new(), from: 1, to: 4 };
        assert_eq!(change.inverse().inverse(), change);
        assert_eq!(change.inverse().to, 1);
    }
}
