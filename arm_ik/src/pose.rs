//! Pose and joint-space value types.
//!
//! A [`Pose`] is the solver input: a position plus extrinsic roll-pitch-yaw
//! angles composed as `Rx(roll) · Ry(pitch) · Rz(yaw)`. A [`JointVector`] is
//! one solver output. Conversions to nalgebra types are provided for callers
//! that already work with `Isometry3`.
//!
//! # Examples
//!
//! ```
//! use arm_ik::{JointVector, Pose};
//! use nalgebra::Isometry3;
//!
//! let pose = Pose::new(0.117, 0.334, 0.499, -2.019, -0.058, -2.190);
//! let iso: Isometry3<f64> = pose.into();
//! assert!((iso.translation.z - 0.499).abs() < 1e-12);
//!
//! let q = JointVector::from_degrees([30.0, 0.0, 30.0, 0.0, 60.0, 0.0]);
//! assert_eq!(format!("{q}"), "[30.00, 0.00, 30.00, 0.00, 60.00, 0.00]");
//! ```

use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::ops::Index;

use nalgebra::{Isometry3, Matrix3, Matrix4, Rotation3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::errors::{KinematicsError, Result};
use crate::robot_config::JOINT_COUNT;

/// `|r13|` above this is treated as gimbal lock when extracting angles
const GIMBAL_LOCK_THRESHOLD: f64 = 1.0 - 1e-12;

/// Target end-effector pose
///
/// Position units follow the robot geometry (meters for the reference arm);
/// angles are radians. Serialized as `[x, y, z, roll, pitch, yaw]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 6]", into = "[f64; 6]")]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl Pose {
    pub const fn new(x: f64, y: f64, z: f64, roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { x, y, z, roll, pitch, yaw }
    }

    /// Reject NaN and infinite components.
    pub fn validate(&self) -> Result<()> {
        let components = [
            ("x", self.x),
            ("y", self.y),
            ("z", self.z),
            ("roll", self.roll),
            ("pitch", self.pitch),
            ("yaw", self.yaw),
        ];
        for (component, value) in components {
            if !value.is_finite() {
                return Err(KinematicsError::NonFinitePose { component, value });
            }
        }
        Ok(())
    }

    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Rotation matrix `Rx(roll) · Ry(pitch) · Rz(yaw)`
    pub fn rotation(&self) -> Matrix3<f64> {
        let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), self.roll);
        let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), self.pitch);
        let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), self.yaw);
        (rx * ry * rz).into_inner()
    }

    /// Homogeneous 4x4 transform of the pose
    pub fn to_homogeneous(&self) -> Matrix4<f64> {
        let mut t = Matrix4::identity();
        t.fixed_view_mut::<3, 3>(0, 0).copy_from(&self.rotation());
        t.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.position());
        t
    }

    /// Extract a pose from a homogeneous transform.
    ///
    /// At gimbal lock (`|r13| = 1`) only `roll ± yaw` is determined; roll is
    /// set to zero and yaw carries the whole angle.
    pub fn from_homogeneous(t: &Matrix4<f64>) -> Self {
        let r13 = t[(0, 2)];
        let (roll, pitch, yaw) = if r13.abs() < GIMBAL_LOCK_THRESHOLD {
            (
                (-t[(1, 2)]).atan2(t[(2, 2)]),
                r13.asin(),
                (-t[(0, 1)]).atan2(t[(0, 0)]),
            )
        } else {
            (0.0, FRAC_PI_2.copysign(r13), t[(1, 0)].atan2(t[(1, 1)]))
        };

        Self {
            x: t[(0, 3)],
            y: t[(1, 3)],
            z: t[(2, 3)],
            roll,
            pitch,
            yaw,
        }
    }
}

impl From<[f64; 6]> for Pose {
    fn from([x, y, z, roll, pitch, yaw]: [f64; 6]) -> Self {
        Self::new(x, y, z, roll, pitch, yaw)
    }
}

impl From<Pose> for [f64; 6] {
    fn from(p: Pose) -> Self {
        [p.x, p.y, p.z, p.roll, p.pitch, p.yaw]
    }
}

/// Convert Pose to nalgebra Isometry3.
impl From<Pose> for Isometry3<f64> {
    fn from(pose: Pose) -> Self {
        let rotation = Rotation3::from_matrix_unchecked(pose.rotation());
        Isometry3::from_parts(
            Translation3::new(pose.x, pose.y, pose.z),
            UnitQuaternion::from_rotation_matrix(&rotation),
        )
    }
}

/// Convert nalgebra Isometry3 to Pose.
impl From<Isometry3<f64>> for Pose {
    fn from(iso: Isometry3<f64>) -> Self {
        Pose::from_homogeneous(&iso.to_homogeneous())
    }
}

/// Six joint angles in radians, one per revolute joint
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JointVector(pub [f64; JOINT_COUNT]);

impl JointVector {
    pub const fn new(angles: [f64; JOINT_COUNT]) -> Self {
        Self(angles)
    }

    pub const fn zeros() -> Self {
        Self([0.0; JOINT_COUNT])
    }

    pub fn from_degrees(degrees: [f64; JOINT_COUNT]) -> Self {
        Self(degrees.map(f64::to_radians))
    }

    pub fn to_degrees(&self) -> [f64; JOINT_COUNT] {
        self.0.map(f64::to_degrees)
    }

    pub fn as_array(&self) -> &[f64; JOINT_COUNT] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.0.iter()
    }

    pub fn has_nan(&self) -> bool {
        self.0.iter().any(|q| q.is_nan())
    }

    /// Bring every angle into `[-π, π]` with a single ±2π shift.
    ///
    /// Inputs are assumed to lie within `[-3π, 3π]`.
    pub fn normalized(&self) -> Self {
        Self(self.0.map(|q| {
            if q < -PI {
                q + 2.0 * PI
            } else if q > PI {
                q - 2.0 * PI
            } else {
                q
            }
        }))
    }

    /// Sum of squared per-joint differences
    pub fn distance_squared(&self, other: &JointVector) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum()
    }

    /// Element-wise closeness with the same value used as absolute and
    /// relative tolerance: `|a - b| <= tol + tol * |b|` on every joint.
    pub fn approx_eq(&self, other: &JointVector, tol: f64) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| (a - b).abs() <= tol + tol * b.abs())
    }
}

impl Index<usize> for JointVector {
    type Output = f64;

    fn index(&self, joint: usize) -> &f64 {
        &self.0[joint]
    }
}

impl From<[f64; JOINT_COUNT]> for JointVector {
    fn from(angles: [f64; JOINT_COUNT]) -> Self {
        Self(angles)
    }
}

/// Degrees with two decimals, the format operators read
impl fmt::Display for JointVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let degrees = self.to_degrees();
        write!(f, "[")?;
        for (i, q) in degrees.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            // avoid printing "-0.00"
            let q = if q.abs() < 0.005 { 0.0 } else { *q };
            write!(f, "{q:.2}")?;
        }
        write!(f, "]")
    }
}

/// Valid joint solutions for one pose, in enumeration order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SolutionSet(Vec<JointVector>);

impl SolutionSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JointVector> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[JointVector] {
        &self.0
    }

    /// True if some member is within `tol` of `candidate` on every joint
    pub fn contains_approx(&self, candidate: &JointVector, tol: f64) -> bool {
        self.0.iter().any(|sol| candidate.approx_eq(sol, tol))
    }

    /// Append unless an equivalent solution is already present.
    ///
    /// Returns whether the candidate was kept.
    pub fn insert_unique(&mut self, candidate: JointVector, tol: f64) -> bool {
        if self.contains_approx(&candidate, tol) {
            return false;
        }
        self.0.push(candidate);
        true
    }
}

impl IntoIterator for SolutionSet {
    type Item = JointVector;
    type IntoIter = std::vec::IntoIter<JointVector>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a SolutionSet {
    type Item = &'a JointVector;
    type IntoIter = std::slice::Iter<'a, JointVector>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<JointVector> for SolutionSet {
    fn from_iter<I: IntoIterator<Item = JointVector>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rotation_composes_roll_pitch_yaw_in_order() {
        let pose = Pose::new(0.0, 0.0, 0.0, 0.3, -0.2, 1.1);
        let expected = Rotation3::from_axis_angle(&Vector3::x_axis(), 0.3)
            * Rotation3::from_axis_angle(&Vector3::y_axis(), -0.2)
            * Rotation3::from_axis_angle(&Vector3::z_axis(), 1.1);
        assert_relative_eq!(pose.rotation(), expected.into_inner(), epsilon = 1e-12);
    }

    #[test]
    fn test_homogeneous_round_trip() {
        let pose = Pose::new(0.117, 0.334, 0.499, -2.019, -0.058, -2.190);
        let back = Pose::from_homogeneous(&pose.to_homogeneous());
        assert_relative_eq!(back.x, pose.x, epsilon = 1e-12);
        assert_relative_eq!(back.roll, pose.roll, epsilon = 1e-12);
        assert_relative_eq!(back.pitch, pose.pitch, epsilon = 1e-12);
        assert_relative_eq!(back.yaw, pose.yaw, epsilon = 1e-12);
    }

    #[test]
    fn test_gimbal_lock_extraction_preserves_rotation() {
        let pose = Pose::new(0.0, 0.0, 0.0, 0.4, FRAC_PI_2, 0.3);
        let back = Pose::from_homogeneous(&pose.to_homogeneous());
        assert_eq!(back.roll, 0.0);
        assert_relative_eq!(back.rotation(), pose.rotation(), epsilon = 1e-9);
    }

    #[test]
    fn test_pose_rejects_non_finite_components() {
        let err = Pose::new(0.1, f64::NAN, 0.2, 0.0, 0.0, 0.0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, KinematicsError::NonFinitePose { component: "y", .. }));

        assert!(Pose::new(0.1, 0.0, 0.2, f64::INFINITY, 0.0, 0.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_pose_json_is_six_numbers() {
        let pose: Pose = serde_json::from_str("[0.42, 0, 0.36, 3.14, 1, -1.57]").unwrap();
        assert_eq!(pose, Pose::new(0.42, 0.0, 0.36, 3.14, 1.0, -1.57));
        assert!(serde_json::from_str::<Pose>("[0.42, 0, 0.36]").is_err());
    }

    #[test]
    fn test_isometry_conversion_keeps_rotation() {
        let pose = Pose::new(0.3, 0.25, 0.26, -2.64, 0.59, -2.35);
        let iso: Isometry3<f64> = pose.into();
        let back: Pose = iso.into();
        assert_relative_eq!(back.rotation(), pose.rotation(), epsilon = 1e-9);
        assert_relative_eq!(back.position(), pose.position(), epsilon = 1e-12);
    }

    #[test]
    fn test_normalize_shifts_once() {
        let q = JointVector::new([3.5, -3.5, 0.2, PI, -PI, 2.0 * PI + 0.1]);
        let n = q.normalized();
        assert_relative_eq!(n[0], 3.5 - 2.0 * PI);
        assert_relative_eq!(n[1], -3.5 + 2.0 * PI);
        assert_relative_eq!(n[2], 0.2);
        assert_relative_eq!(n[3], PI);
        assert_relative_eq!(n[4], -PI);
        assert_relative_eq!(n[5], 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_approx_eq_uses_abs_and_rel_tolerance() {
        let a = JointVector::new([1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let b = JointVector::new([1.0015, 0.0, 0.0, 0.0, 0.0, 0.0]);
        // 0.0015 <= 1e-3 + 1e-3 * 1.0015
        assert!(b.approx_eq(&a, 1e-3) && a.approx_eq(&b, 1e-3));

        let c = JointVector::new([0.0, 0.0025, 0.0, 0.0, 0.0, 0.0]);
        assert!(!c.approx_eq(&JointVector::zeros(), 1e-3));
    }

    #[test]
    fn test_solution_set_drops_duplicates_and_keeps_order() {
        let mut set = SolutionSet::new();
        let first = JointVector::new([0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
        let near = JointVector::new([0.1004, 0.2, 0.3, 0.4, 0.5, 0.6]);
        let other = JointVector::new([-0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);

        assert!(set.insert_unique(first, 1e-3));
        assert!(!set.insert_unique(near, 1e-3));
        assert!(set.insert_unique(other, 1e-3));
        assert_eq!(set.as_slice(), &[first, other]);
    }

    #[test]
    fn test_display_in_degrees() {
        let q = JointVector::from_degrees([59.98, 60.26, -30.45, 0.17, 30.02, -0.001]);
        assert_eq!(q.to_string(), "[59.98, 60.26, -30.45, 0.17, 30.02, 0.00]");
    }
}
