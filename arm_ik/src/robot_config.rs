//! Robot configuration module for the ZJU-I arm
//!
//! Holds the Modified Denavit-Hartenberg (DHm) link lengths and offsets, the
//! joint limits and the numeric tolerances used by the closed-form solver.
//! Everything here is immutable once built and is handed to the solver at
//! construction time.

use serde::{Deserialize, Serialize};

use crate::errors::{KinematicsError, Result};
use crate::pose::JointVector;

/// Number of revolute joints on the arm.
pub const JOINT_COUNT: usize = 6;

/// DHm link lengths and offsets
///
/// `a[i]` is the link length a_{i-1} entering joint i+1 and `d[i]` the offset
/// along that joint's axis. For the ZJU-I arm (meters):
///
/// Link | a_{i-1} | d_i
/// -----|---------|--------
/// L1   | 0       | 0.230
/// L2   | 0       | 0
/// L3   | 0.185   | 0
/// L4   | 0.170   | 0.023
/// L5   | 0       | 0.077
/// L6   | 0       | 0.0855
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RobotGeometry {
    pub a: [f64; JOINT_COUNT],
    pub d: [f64; JOINT_COUNT],
}

impl RobotGeometry {
    /// Create geometry for the ZJU-I reference arm, in meters
    pub fn zju_i() -> Self {
        Self {
            a: [0.0, 0.0, 0.185, 0.170, 0.0, 0.0],
            d: [0.230, 0.0, 0.0, 0.023, 0.077, 0.0855],
        }
    }

    /// Upper arm length (shoulder to elbow)
    pub fn upper_arm(&self) -> f64 {
        self.a[2]
    }

    /// Forearm length (elbow to wrist)
    pub fn forearm(&self) -> f64 {
        self.a[3]
    }

    /// Upper bound on the distance from the base origin to the flange.
    ///
    /// Each link translates by at most `|a| + |d|`, so targets further away
    /// than the sum are unreachable on every branch.
    pub fn max_reach(&self) -> f64 {
        self.a.iter().chain(self.d.iter()).map(|v| v.abs()).sum()
    }

    pub fn validate(&self) -> Result<()> {
        if self.a.iter().chain(self.d.iter()).any(|v| !v.is_finite()) {
            return Err(KinematicsError::InvalidGeometry(
                "link lengths and offsets must be finite".to_string(),
            ));
        }
        if self.upper_arm() == 0.0 || self.forearm() == 0.0 {
            return Err(KinematicsError::InvalidGeometry(format!(
                "elbow links must be non-zero (a2 = {}, a3 = {})",
                self.upper_arm(),
                self.forearm()
            )));
        }
        Ok(())
    }
}

impl Default for RobotGeometry {
    fn default() -> Self {
        Self::zju_i()
    }
}

/// Per-joint angle limits, stored in radians.
///
/// Serialized as six `[min_deg, max_deg]` pairs so that job files stay
/// human-editable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<[f64; 2]>", into = "Vec<[f64; 2]>")]
pub struct JointLimits {
    min: [f64; JOINT_COUNT],
    max: [f64; JOINT_COUNT],
}

impl JointLimits {
    /// Factory limits for joints 1 to 6, in degrees
    pub const DEFAULT_DEGREES: [(f64, f64); JOINT_COUNT] = [
        (-180.0, 180.0),
        (-90.0, 90.0),
        (-150.0, 150.0),
        (-180.0, 180.0),
        (-120.0, 120.0),
        (-360.0, 360.0),
    ];

    /// Build limits from `(min_deg, max_deg)` pairs, one per joint.
    pub fn from_degrees(pairs: &[(f64, f64)]) -> Result<Self> {
        let radians: Vec<(f64, f64)> = pairs
            .iter()
            .map(|&(lo, hi)| (lo.to_radians(), hi.to_radians()))
            .collect();
        Self::from_radians(&radians)
    }

    pub fn from_radians(pairs: &[(f64, f64)]) -> Result<Self> {
        if pairs.len() != JOINT_COUNT {
            return Err(KinematicsError::JointLimitCount {
                expected: JOINT_COUNT,
                found: pairs.len(),
            });
        }

        let mut min = [0.0; JOINT_COUNT];
        let mut max = [0.0; JOINT_COUNT];
        for (joint, &(lo, hi)) in pairs.iter().enumerate() {
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(KinematicsError::InvalidJointLimit {
                    joint: joint + 1,
                    min: lo,
                    max: hi,
                });
            }
            min[joint] = lo;
            max[joint] = hi;
        }
        Ok(Self { min, max })
    }

    /// `(min, max)` for a zero-based joint index, in radians
    pub fn range(&self, joint: usize) -> (f64, f64) {
        (self.min[joint], self.max[joint])
    }

    /// Inclusive check of every joint against its range.
    pub fn contains(&self, joints: &JointVector) -> bool {
        joints
            .iter()
            .enumerate()
            .all(|(i, &q)| self.min[i] <= q && q <= self.max[i])
    }

    /// Index of the first joint outside its range, if any
    pub fn first_violation(&self, joints: &JointVector) -> Option<usize> {
        joints
            .iter()
            .enumerate()
            .position(|(i, &q)| !(self.min[i] <= q && q <= self.max[i]))
    }
}

impl Default for JointLimits {
    fn default() -> Self {
        let mut min = [0.0; JOINT_COUNT];
        let mut max = [0.0; JOINT_COUNT];
        for (i, (lo, hi)) in Self::DEFAULT_DEGREES.iter().enumerate() {
            min[i] = lo.to_radians();
            max[i] = hi.to_radians();
        }
        Self { min, max }
    }
}

impl TryFrom<Vec<[f64; 2]>> for JointLimits {
    type Error = KinematicsError;

    fn try_from(pairs: Vec<[f64; 2]>) -> Result<Self> {
        let pairs: Vec<(f64, f64)> = pairs.into_iter().map(|[lo, hi]| (lo, hi)).collect();
        Self::from_degrees(&pairs)
    }
}

impl From<JointLimits> for Vec<[f64; 2]> {
    fn from(limits: JointLimits) -> Self {
        (0..JOINT_COUNT)
            .map(|i| [limits.min[i].to_degrees(), limits.max[i].to_degrees()])
            .collect()
    }
}

/// Numeric tolerances of the closed-form solver.
///
/// The straight-elbow reach tolerance acts on a squared distance and the
/// elbow cosine slack on a cosine; each is tuned on its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    /// `|cos θ5|` below this is treated as the wrist-flip singularity
    pub wrist_singularity: f64,
    /// Allowed overshoot of `|sin θ5|` or `|cos θ3|` beyond 1 before a branch is dropped
    pub elbow_cosine_slack: f64,
    /// Allowed gap between the required planar distance squared and `(a2+a3)²`
    pub straight_elbow_reach: f64,
    /// Absolute and relative tolerance for treating two solutions as one
    pub duplicate: f64,
    /// Max position error when replaying a solution through forward kinematics
    pub pose_position: f64,
    /// Max rotation-matrix entry error when replaying a solution
    pub pose_orientation: f64,
}

impl Tolerances {
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("wrist_singularity", self.wrist_singularity),
            ("elbow_cosine_slack", self.elbow_cosine_slack),
            ("straight_elbow_reach", self.straight_elbow_reach),
            ("duplicate", self.duplicate),
            ("pose_position", self.pose_position),
            ("pose_orientation", self.pose_orientation),
        ];
        for (name, value) in named {
            if !value.is_finite() || value <= 0.0 {
                return Err(KinematicsError::InvalidTolerance { name, value });
            }
        }
        Ok(())
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            wrist_singularity: 1e-6,
            elbow_cosine_slack: 1e-6,
            straight_elbow_reach: 1e-3,
            duplicate: 1e-3,
            pose_position: 1e-3,
            pose_orientation: 1e-3,
        }
    }
}

/// Complete solver configuration: geometry, limits and tolerances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    /// Human-readable arm name, used in reports
    pub name: String,
    pub geometry: RobotGeometry,
    pub limits: JointLimits,
    pub tolerances: Tolerances,
}

impl RobotConfig {
    /// Create configuration for the ZJU-I reference arm with factory limits
    pub fn zju_i() -> Self {
        Self {
            name: "ZJU-I".to_string(),
            geometry: RobotGeometry::zju_i(),
            limits: JointLimits::default(),
            tolerances: Tolerances::default(),
        }
    }

    /// Same arm with caller-supplied limits in degrees
    pub fn with_limits_degrees(pairs: &[(f64, f64)]) -> Result<Self> {
        Ok(Self {
            limits: JointLimits::from_degrees(pairs)?,
            ..Self::zju_i()
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.geometry.validate()?;
        self.tolerances.validate()
    }
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self::zju_i()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_default_limits_match_factory_table() {
        let limits = JointLimits::default();
        assert_relative_eq!(limits.range(0).0, -PI);
        assert_relative_eq!(limits.range(1).1, PI / 2.0);
        assert_relative_eq!(limits.range(4).0, -120.0_f64.to_radians());
        assert_relative_eq!(limits.range(5).1, 2.0 * PI);
    }

    #[test]
    fn test_limits_reject_wrong_length() {
        let err = JointLimits::from_degrees(&[(-90.0, 90.0); 5]).unwrap_err();
        assert!(matches!(
            err,
            KinematicsError::JointLimitCount { expected: 6, found: 5 }
        ));
    }

    #[test]
    fn test_limits_reject_inverted_pair() {
        let mut pairs = JointLimits::DEFAULT_DEGREES;
        pairs[2] = (10.0, -10.0);
        let err = JointLimits::from_degrees(&pairs).unwrap_err();
        assert!(matches!(err, KinematicsError::InvalidJointLimit { joint: 3, .. }));
    }

    #[test]
    fn test_limits_contains_is_inclusive() {
        let limits = JointLimits::from_degrees(&[(-90.0, 90.0); 6]).unwrap();
        let edge = JointVector::from_degrees([90.0, -90.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(limits.contains(&edge));

        let outside = JointVector::from_degrees([0.0, 0.0, 0.0, 0.0, 90.5, 0.0]);
        assert!(!limits.contains(&outside));
        assert_eq!(limits.first_violation(&outside), Some(4));
    }

    #[test]
    fn test_limits_json_uses_degree_pairs() {
        let json = serde_json::to_string(&JointLimits::default()).unwrap();
        let pairs: Vec<[f64; 2]> = serde_json::from_str(&json).unwrap();
        assert_eq!(pairs.len(), 6);
        assert_relative_eq!(pairs[1][0], -90.0, epsilon = 1e-9);
        assert_relative_eq!(pairs[5][1], 360.0, epsilon = 1e-9);

        let short = "[[-180, 180], [-90, 90]]";
        assert!(serde_json::from_str::<JointLimits>(short).is_err());
    }

    #[test]
    fn test_geometry_reach_and_validation() {
        let geometry = RobotGeometry::zju_i();
        assert_relative_eq!(geometry.max_reach(), 0.7705, epsilon = 1e-12);
        assert!(geometry.validate().is_ok());

        let broken = RobotGeometry {
            a: [0.0, 0.0, 0.0, 0.170, 0.0, 0.0],
            ..geometry
        };
        assert!(matches!(
            broken.validate(),
            Err(KinematicsError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_config_fills_missing_fields_with_defaults() {
        let config: RobotConfig =
            serde_json::from_str(r#"{ "tolerances": { "duplicate": 0.01 } }"#).unwrap();
        assert_eq!(config.geometry, RobotGeometry::zju_i());
        assert_eq!(config.limits, JointLimits::default());
        assert_relative_eq!(config.tolerances.duplicate, 0.01);
        assert_relative_eq!(config.tolerances.wrist_singularity, 1e-6);
    }

    #[test]
    fn test_zero_tolerance_is_rejected() {
        let mut config = RobotConfig::zju_i();
        config.tolerances.pose_position = 0.0;
        assert!(matches!(
            config.validate(),
            Err(KinematicsError::InvalidTolerance { name: "pose_position", .. })
        ));
    }
}
