//! `trackfuse-perception` – pure geometry and filtering stages of the fusion
//! pipeline.
//!
//! # Modules
//!
//! - [`transform`] – [`CoordinateTransformer`][transform::CoordinateTransformer]:
//!   maps poses between the tracker mount frame and the robot reference frame
//!   for a fixed rigid offset.
//! - [`gate`] – [`ValidityGate`][gate::ValidityGate]: classifies incoming
//!   tracker frames as usable or discarded.

pub mod gate;
pub mod transform;

pub use gate::{GateDecision, ValidityGate};
pub use transform::CoordinateTransformer;
