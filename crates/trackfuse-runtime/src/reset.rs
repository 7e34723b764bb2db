//! [`ResetController`] – re-aligns the tracker's free-running frame with the
//! robot's world frame.
//!
//! The tracker has no idea where the robot is on the field; it only reports
//! motion relative to whatever reference it was last given.  A reset takes a
//! known robot pose, moves it to the tracker mount through the configured
//! offset, and writes the result into the device.  From then on every
//! accepted frame, transformed back to the robot frame, lands on that pose
//! plus the motion since the reset.
//!
//! A failed write leaves the stored [`ResetRecord`] untouched.
//!
//! # Example
//!
//! ```rust
//! use trackfuse_hal::sim::SimTracker;
//! use trackfuse_runtime::reset::ResetController;
//! use trackfuse_types::{Frame, PoseSample, RigidTransform};
//!
//! let offset = RigidTransform::from_xyz_rpy(0.3, 0.0, 0.0, 0.0, 0.0, 0.0);
//! let mut resets = ResetController::new(offset);
//! let mut tracker = SimTracker::new("headset");
//!
//! let record = resets
//!     .reset_to_explicit_pose(&mut tracker, PoseSample::from_planar(2.0, 1.0, 0.0, Frame::Robot))
//!     .expect("sim write succeeds");
//! assert!((record.tracker_pose.x() - 2.3).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use trackfuse_hal::{FrameSource, PoseSink};
use trackfuse_perception::CoordinateTransformer;
use trackfuse_types::{Frame, FusionError, PoseSample, RigidTransform};

/// The poses involved in the last successful reset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResetRecord {
    /// Robot pose the device was anchored to.
    pub robot_pose: PoseSample,
    /// Pose actually written into the device.
    pub tracker_pose: PoseSample,
}

/// Executes the realignment protocol against a [`FrameSource`].
#[derive(Debug, Clone)]
pub struct ResetController {
    transformer: CoordinateTransformer,
    last_reset: Option<ResetRecord>,
}

impl ResetController {
    pub fn new(robot_to_tracker: RigidTransform) -> Self {
        Self {
            transformer: CoordinateTransformer::new(robot_to_tracker),
            last_reset: None,
        }
    }

    /// Anchor the tracker to the estimator's current fused pose.
    ///
    /// # Errors
    ///
    /// See [`ResetController::reset_to_explicit_pose`].
    pub fn reset_to_current_estimate<S, P>(
        &mut self,
        source: &mut S,
        sink: &P,
    ) -> Result<ResetRecord, FusionError>
    where
        S: FrameSource + ?Sized,
        P: PoseSink + ?Sized,
    {
        let estimate = sink.current_estimate();
        self.reset_to_explicit_pose(source, estimate)
    }

    /// Anchor the tracker to `robot_pose`.
    ///
    /// # Errors
    ///
    /// Returns [`FusionError::DeviceWrite`] when the device is disconnected
    /// (no write is attempted mid-reconnect) or rejects the write.
    pub fn reset_to_explicit_pose<S>(
        &mut self,
        source: &mut S,
        robot_pose: PoseSample,
    ) -> Result<ResetRecord, FusionError>
    where
        S: FrameSource + ?Sized,
    {
        if !source.is_connected() {
            warn!(device = source.id(), "reset requested while tracker is disconnected");
            return Err(FusionError::DeviceWrite {
                device: source.id().to_string(),
                details: "device not connected".to_string(),
            });
        }

        if robot_pose.frame() != Frame::Robot {
            warn!(
                device = source.id(),
                frame = ?robot_pose.frame(),
                "reset pose is not tagged as a robot pose; treating it as one"
            );
        }
        let robot_pose = robot_pose.in_frame(Frame::Robot);
        let tracker_pose = self.transformer.to_tracker_frame(&robot_pose);

        if let Err(e) = source.write_reference_pose(tracker_pose) {
            warn!(device = source.id(), error = %e, "tracker reset failed");
            return Err(e);
        }

        info!(
            device = source.id(),
            x = robot_pose.x(),
            y = robot_pose.y(),
            yaw_deg = robot_pose.yaw().to_degrees(),
            "tracker re-aligned to robot pose"
        );
        let record = ResetRecord {
            robot_pose,
            tracker_pose,
        };
        self.last_reset = Some(record);
        Ok(record)
    }

    /// The last successful reset, if any.
    pub fn last_reset(&self) -> Option<ResetRecord> {
        self.last_reset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;
    use trackfuse_hal::sim::{SimEstimator, SimTracker};

    fn offset() -> RigidTransform {
        RigidTransform::from_xyz_rpy(0.3, 0.1, 0.5, 0.0, 0.0, FRAC_PI_2)
    }

    #[test]
    fn explicit_reset_writes_transformed_pose() {
        let mut resets = ResetController::new(offset());
        let mut tracker = SimTracker::new("sim");
        let target = PoseSample::from_planar(3.0, -2.0, 0.4, Frame::Robot);

        let record = resets.reset_to_explicit_pose(&mut tracker, target).unwrap();

        let expected = CoordinateTransformer::new(offset()).to_tracker_frame(&target);
        assert_eq!(tracker.reference_pose(), Some(expected));
        assert_eq!(record.tracker_pose, expected);
        assert_eq!(record.robot_pose, target);
        assert_eq!(resets.last_reset(), Some(record));
    }

    #[test]
    fn reset_to_estimate_uses_sink_pose() {
        let mut resets = ResetController::new(offset());
        let mut tracker = SimTracker::new("sim");
        let mut estimator = SimEstimator::new();
        let estimate = PoseSample::from_planar(1.5, 0.5, -1.0, Frame::Robot);
        estimator.set_estimate(estimate);

        let record = resets
            .reset_to_current_estimate(&mut tracker, &estimator)
            .unwrap();
        assert_eq!(record.robot_pose, estimate);
    }

    #[test]
    fn failed_write_keeps_previous_record() {
        let mut resets = ResetController::new(offset());
        let mut tracker = SimTracker::new("sim");
        let first = resets
            .reset_to_explicit_pose(&mut tracker, PoseSample::origin(Frame::Robot))
            .unwrap();

        tracker.set_reject_writes(true);
        let err = resets
            .reset_to_explicit_pose(&mut tracker, PoseSample::from_planar(9.0, 9.0, 0.0, Frame::Robot))
            .unwrap_err();
        assert!(matches!(err, FusionError::DeviceWrite { .. }));
        assert_eq!(resets.last_reset(), Some(first));
        assert_eq!(tracker.reference_pose(), Some(first.tracker_pose));
    }

    #[test]
    fn disconnected_device_is_not_written() {
        let mut resets = ResetController::new(offset());
        let mut tracker = SimTracker::new("sim");
        tracker.set_connected(false);

        let err = resets
            .reset_to_explicit_pose(&mut tracker, PoseSample::origin(Frame::Robot))
            .unwrap_err();
        assert!(err.to_string().contains("not connected"));
        assert!(tracker.written_poses().is_empty());
        assert!(resets.last_reset().is_none());
    }

    #[test]
    fn tracker_tagged_input_is_relabelled_not_transformed_twice() {
        let mut resets = ResetController::new(offset());
        let mut tracker = SimTracker::new("sim");
        let mislabelled = PoseSample::from_planar(1.0, 2.0, 0.3, Frame::Tracker);
        let record = resets.reset_to_explicit_pose(&mut tracker, mislabelled).unwrap();

        let as_robot = mislabelled.in_frame(Frame::Robot);
        assert_eq!(record.robot_pose, as_robot);
        assert_eq!(record.tracker_pose.frame(), Frame::Tracker);
        assert_eq!(
            record.tracker_pose,
            CoordinateTransformer::new(offset()).to_tracker_frame(&as_robot)
        );
    }
}
