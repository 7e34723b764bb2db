//! `trackfuse-runtime` – the fusion engine and its control-loop plumbing.
//!
//! # Modules
//!
//! - [`engine`] – [`FusionEngine`][engine::FusionEngine]: the per-tick
//!   orchestrator that drains the tracker, gates and transforms each frame,
//!   and forwards accepted measurements to the pose estimator.
//! - [`reset`] – [`ResetController`][reset::ResetController]: writes a known
//!   robot pose back into the tracker so its frame stays anchored to the
//!   robot's world frame.
//! - [`status`] – [`StatusCache`][status::StatusCache]: last observed
//!   connectivity, tracking state and poses, for telemetry consumers.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: initialises
//!   the global `tracing` subscriber with an optional OTLP span exporter.

pub mod engine;
pub mod reset;
pub mod status;
pub mod telemetry;

pub use engine::{FusionEngine, TickReport};
pub use reset::{ResetController, ResetRecord};
pub use status::StatusCache;
pub use telemetry::{TracerProviderGuard, init_tracing};
