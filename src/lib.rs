//! Board placement: drag-and-drop task placement for project boards.
//!
//! This crate decides where a task belongs on a board, which moves between
//! containers are legal, and how a legal move is written optimistically and
//! then reconciled with the project server.
//!
//! # Architecture
//!
//! The placement engine follows hexagonal architecture principles:
//!
//! - **Domain**: Pure placement rules with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for the server and error display
//! - **Adapters**: HTTP and in-memory implementations of the ports
//!
//! # Modules
//!
//! - [`placement`]: Classification, transition rules and optimistic updates
//! - [`config`]: Layered TOML and environment configuration

pub mod config;
pub mod placement;
