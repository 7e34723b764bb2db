//! [`FrameSource`] – boundary to the external 6-DOF tracking device.
//!
//! Drivers implement this trait over whatever transport the device uses.  The
//! fusion engine only ever talks to the trait, so the device can be replaced
//! by [`SimTracker`][crate::sim::SimTracker] in tests without touching the
//! engine.
//!
//! Every method must be non-blocking: the engine calls them from a fixed-rate
//! control loop and never waits for data.

use trackfuse_types::{ConnectionStatus, FusionError, PoseSample, TrackerFrame};

/// A tracking device that delivers timestamped pose frames.
pub trait FrameSource: Send {
    /// Stable identifier used in logs and errors, e.g. `"headset"`.
    fn id(&self) -> &str;

    /// Service the device session.  Must be called once per control tick,
    /// whether or not fusion is enabled, or the session degrades.
    fn poll_connection_maintenance(&mut self);

    /// Return every frame received since the previous call, oldest first.
    ///
    /// Frames are never re-delivered; an empty vector means nothing new
    /// arrived.
    fn drain_unread_frames(&mut self) -> Vec<TrackerFrame>;

    fn is_connected(&self) -> bool;

    /// `true` when the device currently reports reliable tracking.
    fn is_tracking(&self) -> bool;

    /// Transport latency in seconds.
    fn latency_s(&self) -> f64;

    /// Battery charge in percent, when the device reports it.
    fn battery_percent(&self) -> Option<f64>;

    /// Overwrite the device's reference pose so that it reports `pose` (in
    /// the tracker frame) at its current physical location.
    ///
    /// # Errors
    ///
    /// Returns [`FusionError::DeviceWrite`] when the device rejects the
    /// write.  On error the device keeps its previous reference.
    fn write_reference_pose(&mut self, pose: PoseSample) -> Result<(), FusionError>;

    /// Collect the live connectivity readouts into one snapshot.
    fn connection_status(&self) -> ConnectionStatus {
        ConnectionStatus {
            connected: self.is_connected(),
            tracking: self.is_tracking(),
            latency_s: self.latency_s(),
            battery_percent: self.battery_percent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackfuse_types::Frame;

    /// Minimal in-process device used only for tests.
    struct FixedDevice {
        battery: Option<f64>,
    }

    impl FrameSource for FixedDevice {
        fn id(&self) -> &str {
            "fixed"
        }
        fn poll_connection_maintenance(&mut self) {}
        fn drain_unread_frames(&mut self) -> Vec<TrackerFrame> {
            vec![TrackerFrame::new(PoseSample::origin(Frame::Tracker), 1.0, true)]
        }
        fn is_connected(&self) -> bool {
            true
        }
        fn is_tracking(&self) -> bool {
            false
        }
        fn latency_s(&self) -> f64 {
            0.015
        }
        fn battery_percent(&self) -> Option<f64> {
            self.battery
        }
        fn write_reference_pose(&mut self, _pose: PoseSample) -> Result<(), FusionError> {
            Ok(())
        }
    }

    #[test]
    fn connection_status_collects_readouts() {
        let dev = FixedDevice { battery: Some(64.0) };
        let status = dev.connection_status();
        assert!(status.connected);
        assert!(!status.tracking);
        assert!((status.latency_s - 0.015).abs() < f64::EPSILON);
        assert_eq!(status.battery_percent, Some(64.0));
    }

    #[test]
    fn missing_battery_stays_none() {
        let dev = FixedDevice { battery: None };
        assert!(dev.connection_status().battery_percent.is_none());
    }
}
