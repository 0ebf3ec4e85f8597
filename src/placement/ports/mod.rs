//! Port contracts for task placement.
//!
//! Ports define infrastructure-agnostic interfaces used by placement
//! services.

pub mod error_surface;
pub mod sync_client;

pub use error_surface::{ErrorSurface, OperationId, PlacementNotice};
pub use sync_client::{SyncClient, SyncClientError, SyncClientResult};
