//! The persistence seam: CRUD over a tour's blocks.
//!
//! Implementations return blocks already normalized (they decode through
//! [`tourbook_blocks::WireBlock::into_block`]), so everything past this trait
//! sees canonical content only.

use async_trait::async_trait;
use thiserror::Error;

use tourbook_blocks::{Block, BlockContent, BlockId, TourId};

use crate::auth::AccessToken;

/// Errors from a persistence backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// The addressed block (or tour's block collection) does not exist.
    #[error("not found")]
    NotFound,

    /// The backend rejected the credential.
    #[error("credential rejected")]
    Unauthorized,

    /// Any other non-success status.
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection, timeout or protocol failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be understood.
    #[error("invalid response: {0}")]
    Decode(String),
}

/// CRUD access to persisted blocks.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Persist a new block; the backend assigns its id.
    async fn create(
        &self,
        token: &AccessToken,
        tour_id: TourId,
        order_index: i64,
        content: &BlockContent,
    ) -> Result<Block, GatewayError>;

    /// Replace a block's content and order index.
    async fn update(
        &self,
        token: &AccessToken,
        id: BlockId,
        content: &BlockContent,
        order_index: i64,
    ) -> Result<Block, GatewayError>;

    async fn delete(&self, token: &AccessToken, id: BlockId) -> Result<(), GatewayError>;

    /// All blocks of a tour, in no particular order.
    async fn list(&self, token: &AccessToken, tour_id: TourId) -> Result<Vec<Block>, GatewayError>;
}
