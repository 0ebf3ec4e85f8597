//! Drag-and-drop placement of tasks on a project board.
//!
//! A task's container (backlog, sprint, status column or a synthetic
//! column) is never stored: it is derived from the task's type, status and
//! sprint. Moving a task means writing one of those fields, optimistically
//! and then confirmed or rolled back by the server. The module follows
//! hexagonal architecture:
//!
//! - Domain types and rules in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]
//!
//! The shared board state lives in [`store`] and [`guard`].

pub mod adapters;
pub mod domain;
pub mod guard;
pub mod ports;
pub mod services;
pub mod store;
