//! Error surface that writes notices to the log.

use crate::placement::ports::{ErrorSurface, PlacementNotice};
use tracing::warn;

/// Logs every placement notice at `warn` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorSurface;

impl ErrorSurface for TracingErrorSurface {
    fn report(&self, notice: PlacementNotice) {
        warn!(
            operation_id = %notice.operation_id,
            task_id = %notice.task_id,
            category = %notice.category,
            requires_refresh = notice.requires_refresh,
            "{}",
            notice.message
        );
    }
}
