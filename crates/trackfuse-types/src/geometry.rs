//! Rigid-body geometry primitives shared by every `trackfuse` crate.
//!
//! All quantities are SI: metres for translations, radians for angles.  Poses
//! and transforms use the same convention: a [`RigidTransform`] rotates a
//! point by `rotation` and then adds `translation`.
//!
//! # Example
//!
//! ```rust
//! use trackfuse_types::geometry::{Frame, PoseSample, RigidTransform, Vec3, Quaternion};
//!
//! // Tracker is mounted 0.3 m forward of the robot reference point.
//! let mount = RigidTransform::new(Vec3::new(0.3, 0.0, 0.0), Quaternion::identity());
//!
//! let robot = PoseSample::from_planar(1.0, 2.0, 0.0, Frame::Robot);
//! let tracker = robot.transform_by(mount);
//! assert!((tracker.x() - 1.3).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Vec3
// ────────────────────────────────────────────────────────────────────────────

/// A 3-D vector (translation or point).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Create a new vector.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }

    pub fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }

    pub fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }

    /// Euclidean length.
    pub fn norm(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Quaternion
// ────────────────────────────────────────────────────────────────────────────

/// A unit quaternion representing a 3-D rotation (w, x, y, z convention).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    /// Create a quaternion.  The caller is responsible for providing a unit
    /// quaternion (|q| = 1); use [`Quaternion::normalize`] otherwise.
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// The identity rotation (no rotation).
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Rotation of `yaw` radians about +Z.
    pub fn from_yaw(yaw: f64) -> Self {
        let half = yaw * 0.5;
        Self::new(half.cos(), 0.0, 0.0, half.sin())
    }

    /// Build a rotation from roll (X), pitch (Y) and yaw (Z), applied in that
    /// order about the fixed axes.
    pub fn from_rpy(roll: f64, pitch: f64, yaw: f64) -> Self {
        let (sr, cr) = (roll * 0.5).sin_cos();
        let (sp, cp) = (pitch * 0.5).sin_cos();
        let (sy, cy) = (yaw * 0.5).sin_cos();
        Self::new(
            cr * cp * cy + sr * sp * sy,
            sr * cp * cy - cr * sp * sy,
            cr * sp * cy + sr * cp * sy,
            cr * cp * sy - sr * sp * cy,
        )
    }

    /// Hamilton product: compose two rotations.
    pub fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        )
    }

    /// Conjugate (== inverse for a unit quaternion).
    pub fn conjugate(self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    pub fn norm(self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Scale to unit length, or `None` when the quaternion is zero or
    /// non-finite and encodes no rotation.
    pub fn try_normalize(self) -> Option<Self> {
        let n = self.norm();
        if !n.is_finite() || n < f64::EPSILON {
            return None;
        }
        Some(Self::new(self.w / n, self.x / n, self.y / n, self.z / n))
    }

    /// Scale to unit length.  A degenerate (zero or non-finite) quaternion
    /// collapses to the identity.
    pub fn normalize(self) -> Self {
        self.try_normalize().unwrap_or_else(Self::identity)
    }

    /// Rotate a vector by this quaternion: p' = q * p * q*.
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let p = Self::new(0.0, v.x, v.y, v.z);
        let rotated = self.mul(p).mul(self.conjugate());
        Vec3::new(rotated.x, rotated.y, rotated.z)
    }

    /// Decompose into `(roll, pitch, yaw)`, the inverse of
    /// [`Quaternion::from_rpy`].
    pub fn to_rpy(self) -> (f64, f64, f64) {
        let roll = (2.0 * (self.w * self.x + self.y * self.z))
            .atan2(1.0 - 2.0 * (self.x * self.x + self.y * self.y));
        let pitch = (2.0 * (self.w * self.y - self.z * self.x)).clamp(-1.0, 1.0).asin();
        (roll, pitch, self.yaw())
    }

    /// Heading about +Z (radians, in `(-π, π]`).
    pub fn yaw(self) -> f64 {
        (2.0 * (self.w * self.z + self.x * self.y))
            .atan2(1.0 - 2.0 * (self.y * self.y + self.z * self.z))
    }

    /// Smallest rotation angle (radians) taking `self` to `other`.  `q` and
    /// `-q` are the same rotation, so the result is always in `[0, π]`.
    pub fn angle_to(self, other: Self) -> f64 {
        // atan2 form stays accurate near zero where acos(dot) does not.
        let d = self.conjugate().mul(other);
        let v = (d.x * d.x + d.y * d.y + d.z * d.z).sqrt();
        2.0 * v.atan2(d.w.abs())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RigidTransform
// ────────────────────────────────────────────────────────────────────────────

/// A rigid-body 3-D transform: rotation followed by translation.
///
/// Represents the pose of frame B relative to frame A: to convert a point
/// expressed in frame B into frame A, rotate it by `rotation` then add
/// `translation`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    pub translation: Vec3,
    pub rotation: Quaternion,
}

impl RigidTransform {
    /// Create a transform from a translation and rotation.
    pub fn new(translation: Vec3, rotation: Quaternion) -> Self {
        Self {
            translation,
            rotation: rotation.normalize(),
        }
    }

    /// The identity transform (no translation, no rotation).
    pub fn identity() -> Self {
        Self::new(Vec3::zero(), Quaternion::identity())
    }

    /// Build a transform from six scalars: metres and radians.
    pub fn from_xyz_rpy(x: f64, y: f64, z: f64, roll: f64, pitch: f64, yaw: f64) -> Self {
        Self::new(Vec3::new(x, y, z), Quaternion::from_rpy(roll, pitch, yaw))
    }

    /// Compose two transforms: `self` applied first, then `other`.
    ///
    /// If `self` = T_A_B and `other` = T_B_C, the result is T_A_C.
    pub fn compose(self, other: Self) -> Self {
        let translated = self.translation.add(self.rotation.rotate(other.translation));
        let rotated = self.rotation.mul(other.rotation).normalize();
        Self {
            translation: translated,
            rotation: rotated,
        }
    }

    /// The algebraic inverse: T_A_B → T_B_A.
    pub fn inverse(self) -> Self {
        let inv_rot = self.rotation.conjugate();
        Self {
            translation: inv_rot.rotate(self.translation).neg(),
            rotation: inv_rot,
        }
    }

    /// Map a point expressed in frame B into frame A.
    pub fn apply(self, point: Vec3) -> Vec3 {
        self.translation.add(self.rotation.rotate(point))
    }

    /// `true` when both translation and rotation agree within `tol`
    /// (metres / radians).
    pub fn approx_eq(self, other: Self, tol: f64) -> bool {
        self.translation.sub(other.translation).norm() <= tol
            && self.rotation.angle_to(other.rotation) <= tol
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// PoseSample
// ────────────────────────────────────────────────────────────────────────────

/// The coordinate system a [`PoseSample`] is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frame {
    /// The frame defined by the external tracking device.
    Tracker,
    /// The frame anchored to the robot's reference point.
    Robot,
}

/// An immutable 6-DOF pose tagged with the frame it is expressed in.
///
/// The rotation is normalised on construction.  A degenerate rotation (zero
/// or non-finite) is stored untouched so that [`PoseSample::is_finite`]
/// reports it instead of it passing as the identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseSample {
    translation: Vec3,
    rotation: Quaternion,
    frame: Frame,
}

impl PoseSample {
    pub fn new(translation: Vec3, rotation: Quaternion, frame: Frame) -> Self {
        Self {
            translation,
            rotation: rotation.try_normalize().unwrap_or(rotation),
            frame,
        }
    }

    /// The origin of `frame` with no rotation.
    pub fn origin(frame: Frame) -> Self {
        Self::new(Vec3::zero(), Quaternion::identity(), frame)
    }

    /// Lift a planar pose (x, y, heading) into 3-D with z, roll and pitch at
    /// zero.
    pub fn from_planar(x: f64, y: f64, yaw: f64, frame: Frame) -> Self {
        Self::new(Vec3::new(x, y, 0.0), Quaternion::from_yaw(yaw), frame)
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn rotation(&self) -> Quaternion {
        self.rotation
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn x(&self) -> f64 {
        self.translation.x
    }

    pub fn y(&self) -> f64 {
        self.translation.y
    }

    pub fn z(&self) -> f64 {
        self.translation.z
    }

    /// Heading about +Z in radians.
    pub fn yaw(&self) -> f64 {
        self.rotation.yaw()
    }

    /// The pose viewed as the transform from its frame's origin to the pose.
    pub fn as_transform(&self) -> RigidTransform {
        RigidTransform {
            translation: self.translation,
            rotation: self.rotation,
        }
    }

    /// Rigid-body composition `self ∘ transform`: move by `transform`
    /// expressed in this pose's own local axes.  The frame tag is kept.
    pub fn transform_by(&self, transform: RigidTransform) -> Self {
        let composed = self.as_transform().compose(transform);
        Self::new(composed.translation, composed.rotation, self.frame)
    }

    /// The same pose relabelled as belonging to `frame`.
    pub fn in_frame(&self, frame: Frame) -> Self {
        Self { frame, ..*self }
    }

    /// Straight-line distance between the two positions (metres).
    pub fn translation_error(&self, other: &Self) -> f64 {
        self.translation.sub(other.translation).norm()
    }

    /// Rotation angle between the two orientations (radians).
    pub fn rotation_error(&self, other: &Self) -> f64 {
        self.rotation.angle_to(other.rotation)
    }

    /// `false` when the position is non-finite or the rotation is degenerate.
    pub fn is_finite(&self) -> bool {
        self.translation.is_finite() && self.rotation.try_normalize().is_some()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, FRAC_PI_4};

    const EPS: f64 = 1e-9;

    // ── Quaternion ──────────────────────────────────────────────────────────

    #[test]
    fn quaternion_identity_rotate_is_noop() {
        let r = Quaternion::identity().rotate(Vec3::new(1.0, 2.0, 3.0));
        assert!((r.x - 1.0).abs() < EPS);
        assert!((r.y - 2.0).abs() < EPS);
        assert!((r.z - 3.0).abs() < EPS);
    }

    #[test]
    fn quaternion_90deg_yaw_rotates_x_to_y() {
        let q = Quaternion::new(FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);
        let r = q.rotate(Vec3::new(1.0, 0.0, 0.0));
        assert!(r.x.abs() < EPS, "x should be ~0, got {}", r.x);
        assert!((r.y - 1.0).abs() < EPS, "y should be ~1, got {}", r.y);
        assert!(r.z.abs() < EPS);
    }

    #[test]
    fn from_yaw_matches_from_rpy() {
        let a = Quaternion::from_yaw(0.7);
        let b = Quaternion::from_rpy(0.0, 0.0, 0.7);
        assert!(a.angle_to(b) < EPS);
    }

    #[test]
    fn rpy_roundtrip() {
        let q = Quaternion::from_rpy(0.1, -0.2, 2.5);
        let (r, p, y) = q.to_rpy();
        assert!((r - 0.1).abs() < 1e-9);
        assert!((p + 0.2).abs() < 1e-9);
        assert!((y - 2.5).abs() < 1e-9);
    }

    #[test]
    fn normalize_degenerate_is_identity() {
        assert_eq!(Quaternion::new(0.0, 0.0, 0.0, 0.0).normalize(), Quaternion::identity());
        assert_eq!(
            Quaternion::new(f64::NAN, 0.0, 0.0, 0.0).normalize(),
            Quaternion::identity()
        );
    }

    #[test]
    fn angle_to_treats_negated_quaternion_as_equal() {
        let q = Quaternion::from_yaw(1.0);
        let neg = Quaternion::new(-q.w, -q.x, -q.y, -q.z);
        assert!(q.angle_to(neg) < 1e-6);
        assert!((Quaternion::identity().angle_to(Quaternion::from_yaw(FRAC_PI_2)) - FRAC_PI_2).abs() < 1e-9);
    }

    // ── RigidTransform ──────────────────────────────────────────────────────

    #[test]
    fn double_inverse_is_identity_operation() {
        let t = RigidTransform::from_xyz_rpy(0.3, -0.1, 0.5, 0.05, 0.1, FRAC_PI_4);
        assert!(t.inverse().inverse().approx_eq(t, 1e-9));
    }

    #[test]
    fn compose_with_inverse_is_identity() {
        let t = RigidTransform::from_xyz_rpy(1.0, 2.0, 0.2, 0.3, 0.0, -1.2);
        assert!(t.compose(t.inverse()).approx_eq(RigidTransform::identity(), 1e-9));
        assert!(t.inverse().compose(t).approx_eq(RigidTransform::identity(), 1e-9));
    }

    #[test]
    fn apply_inverse_apply_returns_point() {
        let t = RigidTransform::from_xyz_rpy(0.3, 0.2, 0.1, 0.4, -0.3, 2.0);
        let p = Vec3::new(-4.0, 1.5, 0.25);
        let back = t.inverse().apply(t.apply(p));
        assert!(back.sub(p).norm() < 1e-9);
    }

    #[test]
    fn compose_respects_rotation() {
        // 90° yaw then 1 m forward lands on +Y.
        let yaw = RigidTransform::new(Vec3::zero(), Quaternion::from_yaw(FRAC_PI_2));
        let fwd = RigidTransform::new(Vec3::new(1.0, 0.0, 0.0), Quaternion::identity());
        let t = yaw.compose(fwd);
        assert!(t.translation.x.abs() < EPS, "x={}", t.translation.x);
        assert!((t.translation.y - 1.0).abs() < EPS, "y={}", t.translation.y);
    }

    // ── PoseSample ──────────────────────────────────────────────────────────

    #[test]
    fn pose_normalises_rotation() {
        let p = PoseSample::new(Vec3::zero(), Quaternion::new(2.0, 0.0, 0.0, 0.0), Frame::Robot);
        assert!((p.rotation().norm() - 1.0).abs() < EPS);
        assert!(p.is_finite());
    }

    #[test]
    fn degenerate_rotation_is_not_finite() {
        let zero = PoseSample::new(Vec3::zero(), Quaternion::new(0.0, 0.0, 0.0, 0.0), Frame::Tracker);
        assert!(!zero.is_finite());

        let nan = PoseSample::new(
            Vec3::new(1.0, 2.0, 0.0),
            Quaternion::new(f64::NAN, 0.0, 0.0, f64::NAN),
            Frame::Tracker,
        );
        assert!(!nan.is_finite());
        assert!(Quaternion::new(0.0, 0.0, 0.0, 0.0).try_normalize().is_none());
    }

    #[test]
    fn transform_by_uses_local_axes() {
        // Robot facing +Y; a 0.3 m forward offset moves along +Y.
        let robot = PoseSample::from_planar(1.0, 1.0, FRAC_PI_2, Frame::Robot);
        let mount = RigidTransform::new(Vec3::new(0.3, 0.0, 0.0), Quaternion::identity());
        let moved = robot.transform_by(mount);
        assert!((moved.x() - 1.0).abs() < EPS);
        assert!((moved.y() - 1.3).abs() < EPS);
        assert_eq!(moved.frame(), Frame::Robot);
    }

    #[test]
    fn in_frame_only_changes_tag() {
        let p = PoseSample::from_planar(1.0, 2.0, 0.5, Frame::Tracker);
        let q = p.in_frame(Frame::Robot);
        assert_eq!(q.frame(), Frame::Robot);
        assert_eq!(q.translation(), p.translation());
        assert_eq!(q.rotation(), p.rotation());
    }

    #[test]
    fn planar_yaw_roundtrip() {
        let p = PoseSample::from_planar(0.0, 0.0, -2.0, Frame::Robot);
        assert!((p.yaw() + 2.0).abs() < EPS);
        assert_eq!(p.z(), 0.0);
    }
}
