//! Application services for board placement.

mod board;
mod optimistic;

pub use board::{BoardService, BoardServiceError, BoardServiceResult};
pub use optimistic::{OptimisticUpdater, PlacementOutcome};
