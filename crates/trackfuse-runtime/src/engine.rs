//! [`FusionEngine`] – the per-tick fusion orchestrator.
//!
//! Called once per control-loop period (typically 20 ms).  Each tick:
//!
//! 1. **Maintain** – [`FrameSource::poll_connection_maintenance`] is called
//!    unconditionally, even when fusion is disabled or the device is gone.
//! 2. **Drain** – when enabled, every unread [`TrackerFrame`] is taken from
//!    the source in delivery order.
//! 3. **Gate** – non-finite frames are dropped, then the
//!    [`ValidityGate`] rejects frames the device flagged as not tracking.
//! 4. **Transform & forward** – accepted frames are moved to the robot frame,
//!    flattened to (x, y, heading), and handed to the [`PoseSink`] with their
//!    capture timestamp and the configured standard deviations.
//! 5. **Refresh** – the [`StatusCache`] is updated from live device readouts,
//!    on every branch.
//!
//! Nothing is retried or buffered across ticks, and nothing blocks.
//!
//! # Example
//!
//! ```rust
//! use trackfuse_hal::sim::{SimEstimator, SimTracker};
//! use trackfuse_runtime::FusionEngine;
//! use trackfuse_types::{Frame, FusionConfig, PoseSample, RigidTransform, UncertaintyVector};
//!
//! let config = FusionConfig::new(
//!     true,
//!     RigidTransform::from_xyz_rpy(0.3, 0.0, 0.0, 0.0, 0.0, 0.0),
//!     UncertaintyVector::default(),
//! );
//! let mut engine = FusionEngine::new(config);
//! let mut tracker = SimTracker::new("headset");
//! let mut estimator = SimEstimator::new();
//!
//! tracker.push_pose(PoseSample::from_planar(1.0, 0.0, 0.0, Frame::Tracker), 100.0, true);
//! let report = engine.tick(&mut tracker, &mut estimator);
//!
//! assert_eq!(report.accepted, 1);
//! assert!((estimator.measurements()[0].pose.x() - 0.7).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use trackfuse_hal::{FrameSource, PoseSink};
use trackfuse_perception::{CoordinateTransformer, GateDecision, ValidityGate};
use trackfuse_types::{Frame, FusionConfig, FusionError, FusionStatus, PoseSample, TrackerFrame};

use crate::reset::{ResetController, ResetRecord};
use crate::status::StatusCache;

// ─────────────────────────────────────────────────────────────────────────────
// TickReport
// ─────────────────────────────────────────────────────────────────────────────

/// What happened during one [`FusionEngine::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TickReport {
    /// 1-based tick counter.
    pub tick: u64,
    /// `true` when fusion was switched off and no frames were drained.
    pub disabled: bool,
    pub drained: usize,
    /// Frames forwarded to the estimator.
    pub accepted: usize,
    /// Frames dropped as not tracking or malformed.
    pub rejected: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// FusionEngine
// ─────────────────────────────────────────────────────────────────────────────

/// Drains a [`FrameSource`], filters and transforms its frames, and feeds a
/// [`PoseSink`].
///
/// The source and sink are borrowed per call; the engine owns only its
/// configuration, the gate/transform path, the [`ResetController`] and the
/// [`StatusCache`].
#[derive(Debug)]
pub struct FusionEngine {
    config: FusionConfig,
    gate: ValidityGate,
    transformer: CoordinateTransformer,
    resets: ResetController,
    status: StatusCache,
    ticks: u64,
    /// Capture time of the newest frame forwarded so far.
    last_forwarded_s: Option<f64>,
}

impl FusionEngine {
    pub fn new(config: FusionConfig) -> Self {
        Self {
            config,
            gate: ValidityGate::new(),
            transformer: CoordinateTransformer::new(config.robot_to_tracker),
            resets: ResetController::new(config.robot_to_tracker),
            status: StatusCache::new(config.enabled),
            ticks: 0,
            last_forwarded_s: None,
        }
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Switch fusion on or off.  Takes effect at the start of the next tick.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.config.enabled != enabled {
            info!(enabled, "tracker fusion toggled");
        }
        self.config.enabled = enabled;
        self.status.set_enabled(enabled);
    }

    /// Run one control-loop tick.
    pub fn tick<S, P>(&mut self, source: &mut S, sink: &mut P) -> TickReport
    where
        S: FrameSource + ?Sized,
        P: PoseSink + ?Sized,
    {
        self.ticks += 1;
        let mut report = TickReport {
            tick: self.ticks,
            ..TickReport::default()
        };

        source.poll_connection_maintenance();

        if self.config.enabled {
            let connected = source.is_connected();
            for frame in source.drain_unread_frames() {
                report.drained += 1;
                if self.process_frame(&frame, connected, sink) {
                    report.accepted += 1;
                } else {
                    report.rejected += 1;
                }
            }
        } else {
            report.disabled = true;
        }

        self.status
            .refresh(source.connection_status(), self.config.enabled, &report);

        if report.drained > 0 {
            debug!(
                tick = report.tick,
                drained = report.drained,
                accepted = report.accepted,
                rejected = report.rejected,
                "tracker frames processed"
            );
        }
        report
    }

    /// Gate, transform and forward one frame.  Returns `true` when it reached
    /// the sink.
    fn process_frame<P>(&mut self, frame: &TrackerFrame, connected: bool, sink: &mut P) -> bool
    where
        P: PoseSink + ?Sized,
    {
        let timestamp_s = frame.capture_timestamp_s;
        if !frame.pose.is_finite() || !timestamp_s.is_finite() {
            warn!(tick = self.ticks, timestamp_s, "malformed tracker frame dropped");
            return false;
        }

        if connected {
            self.status.record_tracker_pose(frame.pose);
        }

        match self.gate.classify(frame, &self.config) {
            GateDecision::Accept => {}
            decision => {
                debug!(tick = self.ticks, timestamp_s, ?decision, "tracker frame rejected");
                return false;
            }
        }

        if let Some(last) = self.last_forwarded_s
            && timestamp_s < last
        {
            // Delivery order wins; an old frame here usually means the device
            // flushed a backlog after reconnecting.
            warn!(
                tick = self.ticks,
                timestamp_s,
                last_forwarded_s = last,
                "tracker frame older than previous measurement"
            );
        }

        // The estimator is planar and the std devs cover x, y and heading only.
        let robot_pose = self.transformer.to_robot_frame(&frame.pose);
        let robot_pose =
            PoseSample::from_planar(robot_pose.x(), robot_pose.y(), robot_pose.yaw(), Frame::Robot);
        sink.add_measurement(robot_pose, timestamp_s, self.config.std_devs);
        self.status.record_robot_pose(robot_pose);
        self.last_forwarded_s = Some(timestamp_s);
        true
    }

    /// Copy of the current status.
    pub fn status(&self) -> FusionStatus {
        self.status.snapshot()
    }

    pub fn status_cache(&self) -> &StatusCache {
        &self.status
    }

    /// Re-align the tracker to the estimator's current pose.
    ///
    /// # Errors
    ///
    /// [`FusionError::DeviceWrite`] when the device is disconnected or
    /// rejects the write.
    pub fn reset_to_current_estimate<S, P>(
        &mut self,
        source: &mut S,
        sink: &P,
    ) -> Result<ResetRecord, FusionError>
    where
        S: FrameSource + ?Sized,
        P: PoseSink + ?Sized,
    {
        let record = self.resets.reset_to_current_estimate(source, sink)?;
        self.status.record_reset();
        Ok(record)
    }

    /// Re-align the tracker to `robot_pose`.
    ///
    /// # Errors
    ///
    /// [`FusionError::DeviceWrite`] when the device is disconnected or
    /// rejects the write.
    pub fn reset_to_explicit_pose<S>(
        &mut self,
        source: &mut S,
        robot_pose: PoseSample,
    ) -> Result<ResetRecord, FusionError>
    where
        S: FrameSource + ?Sized,
    {
        let record = self.resets.reset_to_explicit_pose(source, robot_pose)?;
        self.status.record_reset();
        Ok(record)
    }

    pub fn last_reset(&self) -> Option<ResetRecord> {
        self.resets.last_reset()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
