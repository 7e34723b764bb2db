//! `trackfuse-hal` – boundaries to the hardware around the fusion engine.
//!
//! # Modules
//!
//! - [`tracker`] – [`FrameSource`][tracker::FrameSource]: the external 6-DOF
//!   tracking device (frame draining, connectivity readouts, reference-pose
//!   writes).
//! - [`estimator`] – [`PoseSink`][estimator::PoseSink]: the onboard pose
//!   estimator that blends external measurements with odometry.
//! - [`sim`] – [`SimTracker`][sim::SimTracker] and
//!   [`SimEstimator`][sim::SimEstimator]: in-process doubles for headless
//!   tests and demos.

pub mod estimator;
pub mod sim;
pub mod tracker;

pub use estimator::{Measurement, PoseSink};
pub use tracker::FrameSource;
