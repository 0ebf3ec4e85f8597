//! HTTP adapter for the sync client port.
//!
//! Endpoints, relative to the configured base URL:
//!
//! - `PATCH /projects/{project}/tasks/{task}/status`
//! - `PATCH /projects/{project}/tasks/{task}/sprint`
//! - `GET /projects/{project}/tasks?templateType=...`
//! - `GET /projects/{project}/sprints/latest?templateType=...`

mod client;
pub mod models;

pub use client::HttpSyncClient;

#[cfg(test)]
pub(crate) use client::{error_for_status, error_message};
