//! Error types for block store and content operations.

use thiserror::Error;

use crate::{BlockId, BlockType};

/// Errors that can occur while operating on blocks locally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BlockError {
    /// Block not found in the store.
    #[error("block not found: {0:?}")]
    NotFound(BlockId),

    /// Block id already present in the store.
    #[error("block already exists: {0:?}")]
    DuplicateId(BlockId),

    /// Another block already occupies this order index.
    #[error("order index {order_index} already used by {holder:?}")]
    OrderConflict { order_index: i64, holder: BlockId },

    /// Content variant does not match the block's immutable type.
    #[error("block {id:?} is {expected}, content is {got}")]
    TypeMismatch {
        id: BlockId,
        expected: BlockType,
        got: BlockType,
    },

    /// Content is missing a required field or holds an invalid value.
    #[error("invalid {block_type} content: {reason}")]
    Validation {
        block_type: BlockType,
        reason: String,
    },

    /// Alternative location index out of range.
    #[error("alternative location {index} out of range ({len} alternatives)")]
    AlternativeOutOfRange { index: usize, len: usize },
}

impl BlockError {
    pub fn validation(block_type: BlockType, reason: impl Into<String>) -> Self {
        BlockError::Validation {
            block_type,
            reason: reason.into(),
        }
    }

    /// Whether this is a content validation failure (type mismatch included).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BlockError::Validation { .. }
                | BlockError::TypeMismatch { .. }
                | BlockError::AlternativeOutOfRange { .. }
        )
    }
}
