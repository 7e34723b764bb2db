//! In-process simulation doubles for CI/CD testing without a physical
//! tracker or estimator.
//!
//! [`SimTracker`] models a zero-drift device: frames are queued by the test
//! (or by a host loop) and drained exactly once, and written reference poses
//! are recorded.  [`SimEstimator`] records every measurement it receives.
//!
//! # Example
//!
//! ```rust
//! use trackfuse_hal::sim::{SimEstimator, SimTracker};
//! use trackfuse_hal::{FrameSource, PoseSink};
//! use trackfuse_types::{Frame, PoseSample, UncertaintyVector};
//!
//! let mut tracker = SimTracker::new("headset");
//! tracker.push_pose(PoseSample::from_planar(1.0, 0.0, 0.0, Frame::Tracker), 0.5, true);
//!
//! let frames = tracker.drain_unread_frames();
//! assert_eq!(frames.len(), 1);
//! assert!(tracker.drain_unread_frames().is_empty());
//!
//! let mut estimator = SimEstimator::new();
//! estimator.add_measurement(frames[0].pose.in_frame(Frame::Robot), 0.5, UncertaintyVector::default());
//! assert_eq!(estimator.measurements().len(), 1);
//! ```

use std::collections::VecDeque;

use tracing::debug;
use trackfuse_types::{Frame, FusionError, PoseSample, TrackerFrame, UncertaintyVector};

use crate::estimator::{Measurement, PoseSink};
use crate::tracker::FrameSource;

// ────────────────────────────────────────────────────────────────────────────
// Simulated tracker
// ────────────────────────────────────────────────────────────────────────────

/// A simulated tracking device with controllable connectivity.
///
/// While disconnected, queued frames stay buffered and are delivered after
/// the connection comes back, like a real device draining its network queue.
/// [`SimTracker::set_deliver_while_disconnected`] instead hands them out
/// immediately, as a device flushing its last packets after link loss would.
#[derive(Debug)]
pub struct SimTracker {
    id: String,
    connected: bool,
    tracking: bool,
    latency_s: f64,
    battery_percent: Option<f64>,
    reject_writes: bool,
    deliver_while_disconnected: bool,
    pending: VecDeque<TrackerFrame>,
    reference: Option<PoseSample>,
    written: Vec<PoseSample>,
    maintenance_polls: u64,
}

impl SimTracker {
    /// A connected, tracking device with 20 ms latency and a full battery.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            connected: true,
            tracking: true,
            latency_s: 0.02,
            battery_percent: Some(100.0),
            reject_writes: false,
            deliver_while_disconnected: false,
            pending: VecDeque::new(),
            reference: None,
            written: Vec::new(),
            maintenance_polls: 0,
        }
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub fn set_tracking(&mut self, tracking: bool) {
        self.tracking = tracking;
    }

    pub fn set_latency_s(&mut self, latency_s: f64) {
        self.latency_s = latency_s;
    }

    pub fn set_battery_percent(&mut self, battery_percent: Option<f64>) {
        self.battery_percent = battery_percent;
    }

    /// Make every subsequent [`FrameSource::write_reference_pose`] fail.
    pub fn set_reject_writes(&mut self, reject: bool) {
        self.reject_writes = reject;
    }

    /// Let [`FrameSource::drain_unread_frames`] return frames even while
    /// disconnected.
    pub fn set_deliver_while_disconnected(&mut self, deliver: bool) {
        self.deliver_while_disconnected = deliver;
    }

    /// Queue a frame for the next drain.
    pub fn push_frame(&mut self, frame: TrackerFrame) {
        self.pending.push_back(frame);
    }

    /// Queue a frame built from its parts.
    pub fn push_pose(&mut self, pose: PoseSample, capture_timestamp_s: f64, is_tracking: bool) {
        self.push_frame(TrackerFrame::new(pose, capture_timestamp_s, is_tracking));
    }

    /// Queue a frame reporting the current reference pose, i.e. the device
    /// has not moved since the last reset and has no drift.  Before any reset
    /// the device reports the tracker-frame origin.
    pub fn emit_reference(&mut self, capture_timestamp_s: f64) {
        let pose = self
            .reference
            .unwrap_or_else(|| PoseSample::origin(Frame::Tracker));
        let tracking = self.tracking;
        self.push_pose(pose, capture_timestamp_s, tracking);
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// The reference pose currently held by the device.
    pub fn reference_pose(&self) -> Option<PoseSample> {
        self.reference
    }

    /// Every reference pose successfully written, oldest first.
    pub fn written_poses(&self) -> &[PoseSample] {
        &self.written
    }

    /// Number of [`FrameSource::poll_connection_maintenance`] calls so far.
    pub fn maintenance_polls(&self) -> u64 {
        self.maintenance_polls
    }
}

impl FrameSource for SimTracker {
    fn id(&self) -> &str {
        &self.id
    }

    fn poll_connection_maintenance(&mut self) {
        self.maintenance_polls += 1;
    }

    fn drain_unread_frames(&mut self) -> Vec<TrackerFrame> {
        if !self.connected && !self.deliver_while_disconnected {
            return Vec::new();
        }
        self.pending.drain(..).collect()
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn is_tracking(&self) -> bool {
        self.connected && self.tracking
    }

    fn latency_s(&self) -> f64 {
        self.latency_s
    }

    fn battery_percent(&self) -> Option<f64> {
        self.battery_percent
    }

    fn write_reference_pose(&mut self, pose: PoseSample) -> Result<(), FusionError> {
        if !self.connected || self.reject_writes {
            debug!(device = %self.id, connected = self.connected, "sim tracker rejected reference write");
            return Err(FusionError::DeviceWrite {
                device: self.id.clone(),
                details: if self.connected {
                    "write rejected".to_string()
                } else {
                    "device not connected".to_string()
                },
            });
        }
        self.reference = Some(pose);
        self.written.push(pose);
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Simulated estimator
// ────────────────────────────────────────────────────────────────────────────

/// A simulated pose estimator that records measurements.
///
/// By default the estimate only changes through [`SimEstimator::set_estimate`].
/// With [`SimEstimator::following`] it snaps to every measurement, which is
/// enough to close the loop in a headless demo.
#[derive(Debug)]
pub struct SimEstimator {
    estimate: PoseSample,
    follow: bool,
    measurements: Vec<Measurement>,
}

impl SimEstimator {
    /// An estimator sitting at the robot-frame origin.
    pub fn new() -> Self {
        Self {
            estimate: PoseSample::origin(Frame::Robot),
            follow: false,
            measurements: Vec::new(),
        }
    }

    /// Snap the estimate to each incoming measurement.
    pub fn following(mut self) -> Self {
        self.follow = true;
        self
    }

    pub fn set_estimate(&mut self, estimate: PoseSample) {
        self.estimate = estimate;
    }

    /// Every measurement received, in call order.
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    /// Remove and return the recorded measurements.
    pub fn take_measurements(&mut self) -> Vec<Measurement> {
        std::mem::take(&mut self.measurements)
    }
}

impl Default for SimEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl PoseSink for SimEstimator {
    fn add_measurement(&mut self, pose: PoseSample, timestamp_s: f64, std_devs: UncertaintyVector) {
        if self.follow {
            self.estimate = pose;
        }
        self.measurements.push(Measurement {
            pose,
            timestamp_s,
            std_devs,
        });
    }

    fn current_estimate(&self) -> PoseSample {
        self.estimate
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
