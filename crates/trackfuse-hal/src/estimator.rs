//! [`PoseSink`] – boundary to the robot's onboard pose estimator.
//!
//! The estimator owns the blend between odometry and external measurements;
//! from the fusion engine's side every call is fire-and-forget.

use serde::{Deserialize, Serialize};
use trackfuse_types::{PoseSample, UncertaintyVector};

/// The onboard pose estimator.
pub trait PoseSink: Send {
    /// Hand over one external measurement in [`Frame::Robot`][trackfuse_types::Frame::Robot].
    ///
    /// `timestamp_s` is the frame's original capture time; the estimator uses
    /// it to replay the measurement against its odometry history.
    fn add_measurement(&mut self, pose: PoseSample, timestamp_s: f64, std_devs: UncertaintyVector);

    /// The estimator's current fused robot pose.
    fn current_estimate(&self) -> PoseSample;
}

/// One recorded [`PoseSink::add_measurement`] call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub pose: PoseSample,
    pub timestamp_s: f64,
    pub std_devs: UncertaintyVector,
}
