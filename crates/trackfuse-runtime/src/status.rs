//! [`StatusCache`] – last observed device and fusion state.
//!
//! Purely observational: nothing in the fusion path reads it back.  The
//! engine refreshes it at the end of every tick, on every branch, and readers
//! get an owned [`FusionStatus`] copy so a telemetry thread never observes a
//! half-written update.

use trackfuse_types::{ConnectionStatus, FusionStatus, PoseSample};

use crate::engine::TickReport;

/// Owned by [`FusionEngine`][crate::engine::FusionEngine]; exposed read-only.
#[derive(Debug, Default)]
pub struct StatusCache {
    status: FusionStatus,
}

impl StatusCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            status: FusionStatus {
                enabled,
                ..FusionStatus::default()
            },
        }
    }

    /// Copy of the current status.
    pub fn snapshot(&self) -> FusionStatus {
        self.status.clone()
    }

    /// Borrow the current status without copying.  Only usable from the
    /// thread that owns the engine.
    pub fn get(&self) -> &FusionStatus {
        &self.status
    }

    pub(crate) fn record_tracker_pose(&mut self, pose: PoseSample) {
        self.status.last_tracker_pose = Some(pose);
    }

    pub(crate) fn record_robot_pose(&mut self, pose: PoseSample) {
        self.status.last_robot_pose = Some(pose);
    }

    pub(crate) fn record_reset(&mut self) {
        self.status.resets += 1;
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.status.enabled = enabled;
    }

    /// Fold one tick's outcome and the live device readouts into the cache.
    pub(crate) fn refresh(&mut self, connection: ConnectionStatus, enabled: bool, report: &TickReport) {
        let status = &mut self.status;
        status.connection = connection;
        status.enabled = enabled;
        status.ticks = report.tick;
        status.frames_accepted += report.accepted as u64;
        status.frames_rejected += report.rejected as u64;
    }
}
