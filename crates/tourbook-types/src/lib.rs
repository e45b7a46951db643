//! Shared identity, block and location types for Tourbook.
//!
//! This crate is the data foundation: typed IDs, the eight block content
//! payloads and the location sub-entities. It has **no internal tourbook
//! dependencies**; the store and client crates build on it.
//!
//! # Entity Overview
//!
//! ```text
//! Tour (TourId)
//!     └── owns Block (BlockId, server-assigned)
//!             ├── order_index  (unique per tour, ascending = render order)
//!             └── BlockContent (one of eight variants, fixed per block)
//!                     └── Location ← only inside LocationContent
//!                             main + alternatives
//! ```
//!
//! # Key Types
//!
//! |--------------------|----------------------------------------------|
//! | Type               | Purpose                                      |
//! |--------------------|----------------------------------------------|
//! | [`TourId`]         | Which tour                                   |
//! | [`BlockId`]        | Which block (assigned by the backend)        |
//! | [`BlockType`]      | Type tag, derived from content               |
//! | [`Block`]          | id + order_index + content                   |
//! | [`BlockContent`]   | Sum type over the eight payloads             |
//! | [`LocationContent`]| Main location + alternatives                 |
//! |--------------------|----------------------------------------------|

pub mod block;
pub mod content;
pub mod ids;
pub mod location;

// Re-export primary types at crate root for convenience.
pub use block::{Block, BlockType};
pub use content::{
    Alignment, BlockContent, COLUMN_COUNT, Column, DividerContent, DividerStyle, PhotoContent,
    PhotoTextContent, SlideContent, TextContent, TextLayout, ThreeColumnsContent, TitleContent,
    TitleSize,
};
pub use ids::{BlockId, TourId};
pub use location::{Location, LocationContent, MAX_PRICE_LEVEL};
