//! Tourbook client library
//!
//! Keeps a tour's blocks in sync with the persistence backend, and hosts the
//! collaborators the editor leans on: credentials, photo compression and
//! place search.
//!
//! [`SyncController`] is the entry point. It owns the local
//! [`BlockStore`](tourbook_blocks::BlockStore) and talks to a
//! [`PersistenceGateway`]: [`HttpGateway`] against the REST API, or
//! [`MemoryGateway`] for offline sessions and tests.

pub mod auth;
pub mod config;
pub mod gateway;
pub mod http;
pub mod media;
pub mod memory;
pub mod places;
pub mod sync;

pub use auth::{AccessToken, EnvToken, StaticToken, TokenProvider};
pub use config::{ClientConfig, ConfigError, ImageConfig};
pub use gateway::{GatewayError, PersistenceGateway};
pub use http::HttpGateway;
pub use media::{ImageCompressor, JpegCompressor, MediaError, compress_photo};
pub use memory::MemoryGateway;
pub use places::{Place, PlaceError, PlaceSearch};
pub use sync::{BlockEvent, ErrorKind, Pending, SyncController, SyncError};
