//! [`ValidityGate`] – decides whether a tracker frame may reach the estimator.
//!
//! The policy is deliberately small:
//!
//! | Condition | Decision |
//! |---|---|
//! | `config.enabled == false` | [`GateDecision::Disabled`] |
//! | `frame.is_tracking == false` | [`GateDecision::NotTracking`] |
//! | otherwise | [`GateDecision::Accept`] |
//!
//! Frame age is never inspected.  The frame source only delivers samples that
//! have not been seen before, and comparing device and robot clocks would
//! introduce skew errors.

use trackfuse_types::{FusionConfig, TrackerFrame};

/// Outcome of running a frame through the [`ValidityGate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Accept,
    /// Fusion is switched off in the configuration.
    Disabled,
    /// The device flagged the sample as unreliable.
    NotTracking,
}

impl GateDecision {
    pub fn is_accept(self) -> bool {
        self == GateDecision::Accept
    }
}

/// Stateless classifier for incoming [`TrackerFrame`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidityGate;

impl ValidityGate {
    pub fn new() -> Self {
        Self
    }

    /// Classify `frame` under `config`, reporting why it was rejected.
    pub fn classify(&self, frame: &TrackerFrame, config: &FusionConfig) -> GateDecision {
        if !config.enabled {
            GateDecision::Disabled
        } else if !frame.is_tracking {
            GateDecision::NotTracking
        } else {
            GateDecision::Accept
        }
    }

    /// `true` when `frame` may be forwarded to the estimator.
    pub fn accept(&self, frame: &TrackerFrame, config: &FusionConfig) -> bool {
        self.classify(frame, config).is_accept()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackfuse_types::{Frame, PoseSample};

    fn frame(tracking: bool, t: f64) -> TrackerFrame {
        TrackerFrame::new(PoseSample::from_planar(1.0, 0.0, 0.0, Frame::Tracker), t, tracking)
    }

    fn config(enabled: bool) -> FusionConfig {
        FusionConfig {
            enabled,
            ..FusionConfig::default()
        }
    }

    #[test]
    fn tracking_frame_accepted_when_enabled() {
        let gate = ValidityGate::new();
        assert_eq!(gate.classify(&frame(true, 1.0), &config(true)), GateDecision::Accept);
        assert!(gate.accept(&frame(true, 1.0), &config(true)));
    }

    #[test]
    fn not_tracking_frame_rejected() {
        let gate = ValidityGate::new();
        assert_eq!(
            gate.classify(&frame(false, 1.0), &config(true)),
            GateDecision::NotTracking
        );
        assert!(!gate.accept(&frame(false, 1.0), &config(true)));
    }

    #[test]
    fn disabled_rejects_everything() {
        let gate = ValidityGate::new();
        for tracking in [true, false] {
            assert_eq!(
                gate.classify(&frame(tracking, 1.0), &config(false)),
                GateDecision::Disabled
            );
        }
    }

    #[test]
    fn old_timestamps_are_not_rejected() {
        let gate = ValidityGate::new();
        assert!(gate.accept(&frame(true, 0.0), &config(true)));
        assert!(gate.accept(&frame(true, -1.0e6), &config(true)));
    }
}
