//! Simulated drive used by the `trackfuse run` command.
//!
//! The robot follows a constant-curvature arc.  Each tick its true pose is
//! moved to the tracker mount and queued on a [`SimTracker`], then the
//! [`FusionEngine`] runs one tick against a following [`SimEstimator`].  A
//! short tracking loss and a short disconnect are scripted into the run so
//! the gate and the reconnect path are exercised.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{info, warn};
use trackfuse_hal::sim::{SimEstimator, SimTracker};
use trackfuse_perception::CoordinateTransformer;
use trackfuse_runtime::FusionEngine;
use trackfuse_types::{Frame, FusionConfig, FusionError, FusionStatus, PoseSample};

/// Ticks during which the headset reports lost tracking.
const TRACKING_LOSS: Range<u64> = 150..160;
/// Ticks during which the headset link is down.
const DROPOUT: Range<u64> = 300..310;
/// Tick at which the tracker is re-anchored to the fused estimate.
const REALIGN_TICK: u64 = 320;

/// Constant speed, constant yaw-rate motion starting at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcDrive {
    pub speed_mps: f64,
    pub yaw_rate_rps: f64,
}

impl Default for ArcDrive {
    fn default() -> Self {
        Self {
            speed_mps: 0.5,
            yaw_rate_rps: 0.2,
        }
    }
}

impl ArcDrive {
    /// Robot-frame pose after `t_s` seconds.
    pub fn pose_at(&self, t_s: f64) -> PoseSample {
        let heading = self.yaw_rate_rps * t_s;
        if self.yaw_rate_rps.abs() < 1e-12 {
            return PoseSample::from_planar(self.speed_mps * t_s, 0.0, 0.0, Frame::Robot);
        }
        let radius = self.speed_mps / self.yaw_rate_rps;
        PoseSample::from_planar(
            radius * heading.sin(),
            radius * (1.0 - heading.cos()),
            heading,
            Frame::Robot,
        )
    }
}

/// Drive the simulated robot for `ticks` ticks of `period` each.
///
/// Stops early once `shutdown` is set.  Returns the engine's final status.
///
/// # Errors
///
/// Fails only if the initial reset to the origin is rejected.
pub fn run(
    config: FusionConfig,
    ticks: u64,
    period: Duration,
    shutdown: &AtomicBool,
) -> Result<FusionStatus, FusionError> {
    let mut engine = FusionEngine::new(config);
    let transformer = CoordinateTransformer::new(config.robot_to_tracker);
    let mut tracker = SimTracker::new("sim-headset");
    let mut estimator = SimEstimator::new().following();
    let drive = ArcDrive::default();
    let dt = period.as_secs_f64();

    engine.reset_to_explicit_pose(&mut tracker, PoseSample::origin(Frame::Robot))?;

    for tick in 0..ticks {
        if shutdown.load(Ordering::SeqCst) {
            info!(tick, "shutdown requested; stopping drive");
            break;
        }
        let started = Instant::now();
        let t = tick as f64 * dt;

        let tracking = !TRACKING_LOSS.contains(&tick);
        tracker.set_connected(!DROPOUT.contains(&tick));
        tracker.set_tracking(tracking);
        tracker.set_battery_percent(Some((100.0 - tick as f64 * 0.01).max(0.0)));
        tracker.push_pose(transformer.to_tracker_frame(&drive.pose_at(t)), t, tracking);

        let report = engine.tick(&mut tracker, &mut estimator);

        if tick == REALIGN_TICK
            && let Err(e) = engine.reset_to_current_estimate(&mut tracker, &estimator)
        {
            warn!(error = %e, "realignment failed");
        }

        if report.tick % 50 == 0 {
            let status = engine.status_cache().get();
            info!(
                tick = report.tick,
                accepted = status.frames_accepted,
                rejected = status.frames_rejected,
                connected = status.connection.connected,
                "fusion progress"
            );
        }

        if let Some(remaining) = period.checked_sub(started.elapsed()) {
            std::thread::sleep(remaining);
        }
    }

    Ok(engine.status())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackfuse_types::{RigidTransform, UncertaintyVector};

    fn config() -> FusionConfig {
        FusionConfig::new(
            true,
            RigidTransform::from_xyz_rpy(0.3, 0.0, 0.4, 0.0, 0.0, 0.0),
            UncertaintyVector::default(),
        )
    }

    #[test]
    fn arc_starts_at_origin_and_turns_left() {
        let drive = ArcDrive::default();
        let start = drive.pose_at(0.0);
        assert!(start.x().abs() < 1e-12 && start.y().abs() < 1e-12);

        let later = drive.pose_at(2.0);
        assert!(later.x() > 0.0);
        assert!(later.y() > 0.0);
        assert!((later.yaw() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn straight_drive_without_yaw_rate() {
        let drive = ArcDrive {
            speed_mps: 1.0,
            yaw_rate_rps: 0.0,
        };
        let p = drive.pose_at(3.0);
        assert!((p.x() - 3.0).abs() < 1e-12);
        assert_eq!(p.y(), 0.0);
    }

    #[test]
    fn short_run_rejects_tracking_loss_frames() {
        let shutdown = AtomicBool::new(false);
        let status = run(config(), 200, Duration::ZERO, &shutdown).unwrap();

        assert_eq!(status.ticks, 200);
        assert_eq!(status.frames_accepted, 190);
        assert_eq!(status.frames_rejected, 10);
        assert_eq!(status.resets, 1);
    }

    #[test]
    fn dropout_frames_are_delivered_after_reconnect() {
        let shutdown = AtomicBool::new(false);
        let status = run(config(), 400, Duration::ZERO, &shutdown).unwrap();

        assert_eq!(status.frames_accepted + status.frames_rejected, 400);
        assert_eq!(status.frames_rejected, 10);
        assert_eq!(status.resets, 2);
        assert!(status.connection.connected);
    }

    #[test]
    fn fused_pose_tracks_truth() {
        let shutdown = AtomicBool::new(false);
        let period = Duration::from_millis(1);
        let status = run(config(), 100, period, &shutdown).unwrap();

        let truth = ArcDrive::default().pose_at(99.0 * period.as_secs_f64());
        let robot = status.last_robot_pose.unwrap();
        assert_eq!(robot.frame(), Frame::Robot);
        assert!(robot.translation_error(&truth) < 1e-9);
        assert!(robot.rotation_error(&truth) < 1e-6);
    }

    #[test]
    fn preset_shutdown_stops_before_first_tick() {
        let shutdown = AtomicBool::new(true);
        let status = run(config(), 100, Duration::ZERO, &shutdown).unwrap();
        assert_eq!(status.ticks, 0);
        assert_eq!(status.resets, 1);
    }
}
