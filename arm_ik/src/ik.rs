// Closed-form inverse kinematics for the ZJU-I arm
//
// Every pose is solved by enumerating a fixed table of sign branches:
//   - 8 general branches (shoulder, wrist, elbow), elbow from the law of cosines
//   - 4 straight-elbow branches (shoulder, wrist) with θ3 = 0
// Each candidate is normalized, checked against the joint limits, replayed
// through forward kinematics and deduplicated before it is kept.

use std::f64::consts::PI;

use nalgebra::Matrix4;
use tracing::{debug, trace, warn};

use crate::errors::{KinematicsError, Result};
use crate::kinematics::ArmKinematics;
use crate::pose::{JointVector, Pose, SolutionSet};
use crate::robot_config::RobotConfig;
use crate::selection::{select, PoseOutcome, SelectionPolicy, SolverState};

/// `(shoulder, wrist, elbow)` signs in enumeration order
const GENERAL_BRANCHES: [[f64; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, 1.0, 1.0],
    [1.0, -1.0, -1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, -1.0],
    [1.0, 1.0, 1.0],
];

/// `(shoulder, wrist)` signs for the straight-elbow pass
pub(crate) const STRAIGHT_ELBOW_BRANCHES: [[f64; 2]; 4] =
    [[-1.0, -1.0], [-1.0, 1.0], [1.0, -1.0], [1.0, 1.0]];

/// Joints 1, 5 and 6 plus the planar target left for the elbow
#[derive(Debug, Clone, Copy)]
struct WristStage {
    theta1: f64,
    theta5: f64,
    theta6: f64,
    /// θ2 + θ3 + θ4; `None` at the wrist-flip singularity
    theta234: Option<f64>,
    m: f64,
    n: f64,
}

/// Closed-form solver bound to one arm configuration
#[derive(Debug, Clone)]
pub struct IkSolver {
    config: RobotConfig,
    kinematics: ArmKinematics,
}

impl IkSolver {
    pub fn new(config: RobotConfig) -> Result<Self> {
        config.validate()?;
        let kinematics = ArmKinematics::new(config.geometry);
        Ok(Self { config, kinematics })
    }

    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    pub fn kinematics(&self) -> &ArmKinematics {
        &self.kinematics
    }

    /// Every valid joint configuration reaching `pose`, in branch order.
    ///
    /// An empty set is a normal outcome for unreachable poses; only a
    /// malformed pose is an error.
    pub fn solve_one_pose(&self, pose: &Pose) -> Result<SolutionSet> {
        pose.validate()?;

        let mut solutions = SolutionSet::new();
        let reach = self.config.geometry.max_reach();
        if pose.position().norm() > reach {
            debug!(
                "Pose ({:.3}, {:.3}, {:.3}) is beyond the {:.4} reach bound",
                pose.x, pose.y, pose.z, reach
            );
            return Ok(solutions);
        }

        let target = pose.to_homogeneous();

        for signs in GENERAL_BRANCHES {
            if let Some(candidate) = self.general_branch(&target, signs) {
                self.accept(candidate, &target, &mut solutions);
            }
        }

        for signs in STRAIGHT_ELBOW_BRANCHES {
            if let Some(candidate) = self.straight_elbow_branch(&target, signs) {
                self.accept(candidate, &target, &mut solutions);
            }
        }

        debug!(
            "Pose ({:.3}, {:.3}, {:.3}, {:.3}, {:.3}, {:.3}): {} solution(s)",
            pose.x,
            pose.y,
            pose.z,
            pose.roll,
            pose.pitch,
            pose.yaw,
            solutions.len()
        );
        Ok(solutions)
    }

    /// Solve a pose sequence, applying `policy` pose by pose.
    ///
    /// All poses are validated before any is solved, so a malformed pose
    /// anywhere in the sequence fails the whole call.
    pub fn solve(&self, poses: &[Pose], policy: SelectionPolicy) -> Result<Vec<PoseOutcome>> {
        for (i, pose) in poses.iter().enumerate() {
            pose.validate().map_err(|e| KinematicsError::InvalidPose {
                pose: i + 1,
                source: Box::new(e),
            })?;
        }

        let solved = poses
            .iter()
            .map(|pose| self.solve_one_pose(pose))
            .collect::<Result<Vec<_>>>()?;

        let outcomes = solved
            .into_iter()
            .enumerate()
            .scan(SolverState::default(), |state, (i, solutions)| {
                if solutions.is_empty() {
                    warn!("No valid solution for pose {} within joint limits", i + 1);
                }
                let (outcome, next) = select(policy, *state, solutions);
                *state = next;
                Some(outcome)
            })
            .collect();

        Ok(outcomes)
    }

    /// Stage A: θ1 from the wrist offset, then θ5 and θ6 from the orientation.
    fn wrist_stage(&self, t: &Matrix4<f64>, shoulder: f64, wrist: f64) -> Option<WristStage> {
        let geometry = &self.config.geometry;
        let tolerances = &self.config.tolerances;
        let [d1, _, _, d4, d5, d6] = geometry.d;

        let (r11, r12, r13) = (t[(0, 0)], t[(0, 1)], t[(0, 2)]);
        let (r21, r22, r23) = (t[(1, 0)], t[(1, 1)], t[(1, 2)]);
        let (r31, r32, r33) = (t[(2, 0)], t[(2, 1)], t[(2, 2)]);
        let (px, py, pz) = (t[(0, 3)], t[(1, 3)], t[(2, 3)]);

        let a = d6 * r13 - px;
        let b = d6 * r23 - py;
        let discriminant = a * a + b * b - d4 * d4;
        if discriminant < 0.0 {
            trace!("Branch ({shoulder}, {wrist}): wrist offset unreachable");
            return None;
        }

        let theta1 = b.atan2(a) + d4.atan2(shoulder * discriminant.sqrt());
        let (s1, c1) = theta1.sin_cos();

        let s5 = r23 * c1 - r13 * s1;
        if s5.abs() > 1.0 + tolerances.elbow_cosine_slack {
            trace!("Branch ({shoulder}, {wrist}): sin θ5 = {s5} out of range");
            return None;
        }
        let base = s5.clamp(-1.0, 1.0).asin();
        let theta5 = if wrist > 0.0 { base } else { PI - base };
        let c5 = theta5.cos();

        // Wrist flip: θ4 and θ6 share one axis, so θ6 is pinned to zero
        let (theta6, theta234) = if c5.abs() < tolerances.wrist_singularity {
            (0.0, None)
        } else {
            let theta6 = ((s1 * r12 - c1 * r22) / c5).atan2((c1 * r21 - s1 * r11) / c5);
            let theta234 = (-r33 / c5).atan2((c1 * r13 + s1 * r23) / c5);
            (theta6, Some(theta234))
        };
        let (s6, c6) = theta6.sin_cos();

        let m = px * c1 + py * s1
            - d6 * (r13 * c1 + r23 * s1)
            - d5 * (r21 * s1 * s6 + r12 * c1 * c6 + r11 * c1 * s6 + r22 * c6 * s1);
        let n = pz - d1 - d6 * r33 - d5 * (r32 * c6 + r31 * s6);

        Some(WristStage {
            theta1,
            theta5,
            theta6,
            theta234,
            m,
            n,
        })
    }

    /// Stages B and C for one `(shoulder, wrist, elbow)` branch.
    fn general_branch(&self, t: &Matrix4<f64>, [shoulder, wrist, elbow]: [f64; 3]) -> Option<JointVector> {
        let stage = self.wrist_stage(t, shoulder, wrist)?;
        let a2 = self.config.geometry.upper_arm();
        let a3 = self.config.geometry.forearm();

        let cos3 = (stage.m * stage.m + stage.n * stage.n - a2 * a2 - a3 * a3) / (2.0 * a2 * a3);
        if cos3.abs() > 1.0 + self.config.tolerances.elbow_cosine_slack {
            trace!("Branch ({shoulder}, {wrist}, {elbow}): cos θ3 = {cos3} beyond elbow reach");
            return None;
        }

        let theta3 = elbow * cos3.clamp(-1.0, 1.0).acos();
        let (s3, c3) = theta3.sin_cos();
        let theta2 = stage.m.atan2(stage.n) - (a3 * s3).atan2(a2 + a3 * c3);
        let theta4 = stage.theta234.map_or(0.0, |t234| t234 - theta2 - theta3);

        Some(JointVector::new([
            stage.theta1,
            theta2,
            theta3,
            theta4,
            stage.theta5,
            stage.theta6,
        ]))
    }

    /// Fully extended elbow (θ3 = 0) for one `(shoulder, wrist)` branch.
    ///
    /// Catches targets sitting on the boundary of the elbow's reach, where
    /// the law of cosines lands exactly on ±1.
    pub(crate) fn straight_elbow_branch(
        &self,
        t: &Matrix4<f64>,
        [shoulder, wrist]: [f64; 2],
    ) -> Option<JointVector> {
        let stage = self.wrist_stage(t, shoulder, wrist)?;
        let extended = self.config.geometry.upper_arm() + self.config.geometry.forearm();

        let gap = stage.m * stage.m + stage.n * stage.n - extended * extended;
        if gap.abs() > self.config.tolerances.straight_elbow_reach {
            trace!("Straight elbow ({shoulder}, {wrist}): planar gap {gap:.3e}");
            return None;
        }

        let theta2 = stage.m.atan2(stage.n);
        let theta4 = stage.theta234.map_or(0.0, |t234| t234 - theta2);

        Some(JointVector::new([
            stage.theta1,
            theta2,
            0.0,
            theta4,
            stage.theta5,
            stage.theta6,
        ]))
    }

    /// Run a raw candidate through the filters and keep it if it survives.
    fn accept(&self, candidate: JointVector, target: &Matrix4<f64>, solutions: &mut SolutionSet) {
        let q = candidate.normalized();
        let tolerances = &self.config.tolerances;

        if q.has_nan() {
            trace!("Rejected {:?}: NaN joint", q);
            return;
        }

        if let Some(joint) = self.config.limits.first_violation(&q) {
            trace!("Rejected {}: joint {} outside limits", q, joint + 1);
            return;
        }

        let error = self.kinematics.pose_error(&q, target);
        if error.position > tolerances.pose_position || error.orientation > tolerances.pose_orientation {
            trace!(
                "Rejected {}: misses pose by {:.3e} (position), {:.3e} (rotation)",
                q,
                error.position,
                error.orientation
            );
            return;
        }

        if !solutions.insert_unique(q, tolerances.duplicate) {
            trace!("Rejected {}: duplicate", q);
        }
    }
}
