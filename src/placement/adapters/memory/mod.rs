//! In-memory adapters for placement ports.

mod error_surface;
mod sync_client;

pub use error_surface::CollectingErrorSurface;
pub use sync_client::{InMemorySyncClient, SyncRequest};
