//! Coordinate transformer between the tracker mount and the robot reference
//! point.
//!
//! The tracker is rigidly mounted at a fixed offset `T` (robot → tracker).
//! A pose reported by the device is the pose of the *mount*, so the robot's
//! pose is recovered by undoing the offset in the mount's local axes:
//!
//! ```text
//! robot   = tracker ∘ T⁻¹
//! tracker = robot   ∘ T
//! ```
//!
//! Both directions are pure and total; one is the exact inverse of the other.
//!
//! # Example
//!
//! ```rust
//! use trackfuse_perception::transform::CoordinateTransformer;
//! use trackfuse_types::{Frame, PoseSample, RigidTransform};
//!
//! // Tracker sits 0.3 m ahead of the robot reference point.
//! let tf = CoordinateTransformer::new(RigidTransform::from_xyz_rpy(0.3, 0.0, 0.0, 0.0, 0.0, 0.0));
//!
//! let seen = PoseSample::from_planar(1.0, 0.0, 0.0, Frame::Tracker);
//! let robot = tf.to_robot_frame(&seen);
//! assert_eq!(robot.frame(), Frame::Robot);
//! assert!((robot.x() - 0.7).abs() < 1e-9);
//! ```

use trackfuse_types::{Frame, PoseSample, RigidTransform};

/// Maps poses between [`Frame::Tracker`] and [`Frame::Robot`] for one fixed
/// mounting offset.
///
/// The inverse offset is computed once at construction so the per-frame path
/// is a single composition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransformer {
    robot_to_tracker: RigidTransform,
    tracker_to_robot: RigidTransform,
}

impl CoordinateTransformer {
    pub fn new(robot_to_tracker: RigidTransform) -> Self {
        Self {
            robot_to_tracker,
            tracker_to_robot: robot_to_tracker.inverse(),
        }
    }

    /// The configured mounting offset.
    pub fn offset(&self) -> RigidTransform {
        self.robot_to_tracker
    }

    /// Re-express a device pose as the robot reference pose.
    ///
    /// The input frame tag is not checked; the result is always tagged
    /// [`Frame::Robot`].
    pub fn to_robot_frame(&self, tracker_pose: &PoseSample) -> PoseSample {
        tracker_pose
            .transform_by(self.tracker_to_robot)
            .in_frame(Frame::Robot)
    }

    /// Re-express a robot pose as the pose the device should report.
    ///
    /// The result is always tagged [`Frame::Tracker`].
    pub fn to_tracker_frame(&self, robot_pose: &PoseSample) -> PoseSample {
        robot_pose
            .transform_by(self.robot_to_tracker)
            .in_frame(Frame::Tracker)
    }
}

/// Free-function form of [`CoordinateTransformer::to_robot_frame`].
pub fn to_robot_frame(tracker_pose: &PoseSample, robot_to_tracker: RigidTransform) -> PoseSample {
    CoordinateTransformer::new(robot_to_tracker).to_robot_frame(tracker_pose)
}

/// Free-function form of [`CoordinateTransformer::to_tracker_frame`].
pub fn to_tracker_frame(robot_pose: &PoseSample, robot_to_tracker: RigidTransform) -> PoseSample {
    CoordinateTransformer::new(robot_to_tracker).to_tracker_frame(robot_pose)
}
