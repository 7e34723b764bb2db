//! `trackfuse-types` – shared data model for the tracker fusion stack.
//!
//! Geometry primitives live in [`geometry`]; everything that crosses a crate
//! boundary (tracker frames, configuration, status snapshots, errors) is
//! defined here.

pub mod geometry;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use geometry::{Frame, PoseSample, Quaternion, RigidTransform, Vec3};

/// One timestamped sample drained from the tracking device.
///
/// Consumed exactly once by the fusion engine and then dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackerFrame {
    /// Device pose, expressed in [`Frame::Tracker`].
    pub pose: PoseSample,
    /// Monotonic capture time in seconds, on the robot's clock.
    pub capture_timestamp_s: f64,
    /// `false` when the device reports its tracking as unreliable.
    pub is_tracking: bool,
}

impl TrackerFrame {
    pub fn new(pose: PoseSample, capture_timestamp_s: f64, is_tracking: bool) -> Self {
        Self {
            pose,
            capture_timestamp_s,
            is_tracking,
        }
    }
}

/// Standard deviations attached to every measurement handed to the pose
/// estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyVector {
    /// Metres.
    pub x_m: f64,
    /// Metres.
    pub y_m: f64,
    /// Radians.
    pub heading_rad: f64,
}

impl UncertaintyVector {
    pub fn new(x_m: f64, y_m: f64, heading_rad: f64) -> Self {
        Self {
            x_m,
            y_m,
            heading_rad,
        }
    }

    /// `[x, y, heading]`, the layout estimators usually expect.
    pub fn as_array(&self) -> [f64; 3] {
        [self.x_m, self.y_m, self.heading_rad]
    }

    /// Every component must be finite and strictly positive.
    pub fn validate(&self) -> Result<(), FusionError> {
        for (name, v) in [("x_m", self.x_m), ("y_m", self.y_m), ("heading_rad", self.heading_rad)] {
            if !v.is_finite() || v <= 0.0 {
                return Err(FusionError::Config(format!(
                    "std dev `{name}` must be finite and > 0, got {v}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for UncertaintyVector {
    fn default() -> Self {
        Self::new(0.02, 0.02, 0.035)
    }
}

/// Live connectivity readouts of the tracking device.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub tracking: bool,
    pub latency_s: f64,
    pub battery_percent: Option<f64>,
}

/// Process-wide fusion configuration, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionConfig {
    /// Master switch for forwarding measurements to the estimator.
    pub enabled: bool,
    /// Pose of the tracker mount relative to the robot reference point.
    pub robot_to_tracker: RigidTransform,
    pub std_devs: UncertaintyVector,
}

impl FusionConfig {
    pub fn new(enabled: bool, robot_to_tracker: RigidTransform, std_devs: UncertaintyVector) -> Self {
        Self {
            enabled,
            robot_to_tracker,
            std_devs,
        }
    }
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self::new(true, RigidTransform::identity(), UncertaintyVector::default())
    }
}

/// Observational snapshot of the fusion layer, refreshed every tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FusionStatus {
    #[serde(flatten)]
    pub connection: ConnectionStatus,
    pub enabled: bool,
    /// Raw device pose of the most recent frame seen while connected.
    pub last_tracker_pose: Option<PoseSample>,
    /// Most recent pose forwarded to the estimator.
    pub last_robot_pose: Option<PoseSample>,
    pub ticks: u64,
    pub frames_accepted: u64,
    pub frames_rejected: u64,
    pub resets: u64,
}

impl FusionStatus {
    /// Flatten into the dashboard scalars.  The pose fields report the last
    /// tracker pose, zero when none has been seen yet.
    pub fn telemetry(&self) -> TelemetryData {
        let pose = self
            .last_tracker_pose
            .unwrap_or_else(|| PoseSample::origin(Frame::Tracker));
        TelemetryData {
            connected: self.connection.connected,
            tracking: self.connection.tracking,
            enabled: self.enabled,
            latency_s: self.connection.latency_s,
            battery_percent: self.connection.battery_percent,
            x: pose.x(),
            y: pose.y(),
            z: pose.z(),
            yaw_deg: pose.yaw().to_degrees(),
        }
    }
}

/// Flat telemetry record for an external dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetryData {
    pub connected: bool,
    pub tracking: bool,
    pub enabled: bool,
    pub latency_s: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_percent: Option<f64>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw_deg: f64,
}

/// Error type for the fusion stack.
///
/// Disconnection, loss of tracking and a disabled engine are states, not
/// errors; they surface through [`FusionStatus`].
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FusionError {
    #[error("Device write rejected by {device}: {details}")]
    DeviceWrite { device: String, details: String },

    #[error("Configuration error: {0}")]
    Config(String),
}
