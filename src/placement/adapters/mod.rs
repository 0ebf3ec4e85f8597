//! Adapter implementations for placement ports.

pub mod http;
pub mod memory;
mod tracing_surface;

pub use http::HttpSyncClient;
pub use memory::{CollectingErrorSurface, InMemorySyncClient, SyncRequest};
pub use tracing_surface::TracingErrorSurface;
