// Forward kinematics and Jacobians for the ZJU-I arm
//
// Frames follow the Modified Denavit-Hartenberg (DHm) convention:
//   T_{i-1}^i = Rx(α_{i-1}) · Tx(a_{i-1}) · Rz(θ_i + offset_i) · Tz(d_i)
// The closed-form solver in `ik` assumes this exact chain.

use std::f64::consts::FRAC_PI_2;

use nalgebra::{Matrix4, Matrix6, Vector3};
use tracing::debug;

use crate::pose::{JointVector, Pose};
use crate::robot_config::{RobotGeometry, JOINT_COUNT};

/// Link twist α_{i-1} entering each joint, radians
///
/// Link | a_{i-1} | α_{i-1} | θ_i       | d_i
/// -----|---------|---------|-----------|------
/// L1   | 0       | 0       | θ1        | d1
/// L2   | 0       | -90     | θ2 - 90   | 0
/// L3   | a2      | 0       | θ3        | 0
/// L4   | a3      | 0       | θ4 + 90   | d4
/// L5   | 0       | +90     | θ5 + 90   | d5
/// L6   | 0       | +90     | θ6        | d6
pub const LINK_TWIST: [f64; JOINT_COUNT] = [0.0, -FRAC_PI_2, 0.0, 0.0, FRAC_PI_2, FRAC_PI_2];

/// Constant added to each joint variable before it enters the chain
pub const JOINT_OFFSET: [f64; JOINT_COUNT] = [0.0, -FRAC_PI_2, 0.0, FRAC_PI_2, FRAC_PI_2, 0.0];

/// Max entry-wise gap accepted between the two Jacobians
pub const JACOBIAN_TOLERANCE: f64 = 1e-10;

/// Distance between a reached and a requested pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseError {
    /// Euclidean norm of the translation difference
    pub position: f64,
    /// Largest absolute difference between rotation-matrix entries
    pub orientation: f64,
}

/// Outcome of comparing the analytic Jacobian with the chain-derived one
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JacobianCheck {
    pub max_deviation: f64,
    /// Deviation restricted to the three linear-velocity rows
    pub position_deviation: f64,
    pub passed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ArmKinematics {
    geometry: RobotGeometry,
}

impl ArmKinematics {
    pub fn new(geometry: RobotGeometry) -> Self {
        Self { geometry }
    }

    pub fn geometry(&self) -> &RobotGeometry {
        &self.geometry
    }

    /// Homogeneous transform for one DHm row
    ///
    /// # Arguments
    /// * `a` - Link length a_{i-1}
    /// * `alpha` - Link twist α_{i-1}
    /// * `theta` - Joint angle θ_i, offset already applied
    /// * `d` - Link offset d_i
    fn dh_transform(a: f64, alpha: f64, theta: f64, d: f64) -> Matrix4<f64> {
        let (st, ct) = theta.sin_cos();
        let (sa, ca) = alpha.sin_cos();

        Matrix4::new(
            ct, -st, 0.0, a,
            st * ca, ct * ca, -sa, -d * sa,
            st * sa, ct * sa, ca, d * ca,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Transform from frame `joint` to frame `joint + 1` (zero-based joint)
    pub fn link_transform(&self, joint: usize, angle: f64) -> Matrix4<f64> {
        Self::dh_transform(
            self.geometry.a[joint],
            LINK_TWIST[joint],
            angle + JOINT_OFFSET[joint],
            self.geometry.d[joint],
        )
    }

    /// Cumulative frames T_0^1 .. T_0^6
    pub fn joint_frames(&self, joints: &JointVector) -> [Matrix4<f64>; JOINT_COUNT] {
        let mut frames = [Matrix4::identity(); JOINT_COUNT];
        let mut t = Matrix4::identity();
        for (i, &q) in joints.iter().enumerate() {
            t *= self.link_transform(i, q);
            frames[i] = t;
        }
        frames
    }

    /// Flange transform T_0^6
    pub fn forward(&self, joints: &JointVector) -> Matrix4<f64> {
        joints
            .iter()
            .enumerate()
            .fold(Matrix4::identity(), |t, (i, &q)| t * self.link_transform(i, q))
    }

    pub fn forward_pose(&self, joints: &JointVector) -> Pose {
        Pose::from_homogeneous(&self.forward(joints))
    }

    /// How far the flange at `joints` lands from `target`
    pub fn pose_error(&self, joints: &JointVector, target: &Matrix4<f64>) -> PoseError {
        let reached = self.forward(joints);
        let position = (reached.fixed_view::<3, 1>(0, 3) - target.fixed_view::<3, 1>(0, 3)).norm();
        let orientation = (reached.fixed_view::<3, 3>(0, 0) - target.fixed_view::<3, 3>(0, 0)).amax();
        PoseError {
            position,
            orientation,
        }
    }

    /// Closed-form 6x6 Jacobian, rows `[v; ω]` in the base frame
    pub fn analytic_jacobian(&self, joints: &JointVector) -> Matrix6<f64> {
        let [q1, q2, q3, q4, q5, _] = *joints.as_array();
        let [_, _, a2, a3, _, _] = self.geometry.a;
        let [_, _, _, d4, d5, d6] = self.geometry.d;

        let (s1, c1) = q1.sin_cos();
        let (s2, c2) = q2.sin_cos();
        let (s5, c5) = q5.sin_cos();
        let (s23, c23) = (q2 + q3).sin_cos();
        let (s234, c234) = (q2 + q3 + q4).sin_cos();

        // Radial reach of the arm plane and the vertical drop, per joint onward
        let wrist_r = d5 * c234 - d6 * s234 * c5;
        let wrist_z = -d5 * s234 - d6 * c5 * c234;
        let forearm_r = a3 * c23 + wrist_r;
        let forearm_z = -a3 * s23 + wrist_z;
        let arm_r = a2 * c2 + forearm_r;
        let arm_z = -a2 * s2 + forearm_z;
        let reach = a2 * s2 + a3 * s23 + d5 * s234 + d6 * c5 * c234;

        let mut j = Matrix6::zeros();

        j[(0, 0)] = -s1 * reach - d6 * s5 * c1 - d4 * c1;
        j[(1, 0)] = c1 * reach - d6 * s1 * s5 - d4 * s1;
        j[(5, 0)] = 1.0;

        for (col, (radial, vertical)) in [(arm_r, arm_z), (forearm_r, forearm_z), (wrist_r, wrist_z)]
            .into_iter()
            .enumerate()
        {
            let col = col + 1;
            j[(0, col)] = c1 * radial;
            j[(1, col)] = s1 * radial;
            j[(2, col)] = vertical;
            j[(3, col)] = -s1;
            j[(4, col)] = c1;
        }

        j[(0, 4)] = -d6 * (s1 * c5 + s5 * c1 * c234);
        j[(1, 4)] = d6 * (c1 * c5 - s1 * s5 * c234);
        j[(2, 4)] = d6 * s5 * s234;
        j[(3, 4)] = s234 * c1;
        j[(4, 4)] = s234 * s1;
        j[(5, 4)] = c234;

        j[(3, 5)] = c1 * c5 * c234 - s1 * s5;
        j[(4, 5)] = s1 * c5 * c234 + c1 * s5;
        j[(5, 5)] = -s234 * c5;

        j
    }

    /// Jacobian built from the frame chain: column i is `[z_i × (p_6 - o_i); z_i]`
    pub fn geometric_jacobian(&self, joints: &JointVector) -> Matrix6<f64> {
        let frames = self.joint_frames(joints);
        let flange: Vector3<f64> = frames[JOINT_COUNT - 1].fixed_view::<3, 1>(0, 3).into_owned();

        let mut j = Matrix6::zeros();
        for (i, frame) in frames.iter().enumerate() {
            let z: Vector3<f64> = frame.fixed_view::<3, 1>(0, 2).into_owned();
            let origin: Vector3<f64> = frame.fixed_view::<3, 1>(0, 3).into_owned();
            let linear = z.cross(&(flange - origin));

            j.fixed_view_mut::<3, 1>(0, i).copy_from(&linear);
            j.fixed_view_mut::<3, 1>(3, i).copy_from(&z);
        }
        j
    }

    /// Cross-check the closed-form Jacobian against the chain-derived one
    pub fn validate_jacobian(&self, joints: &JointVector) -> JacobianCheck {
        let diff = self.analytic_jacobian(joints) - self.geometric_jacobian(joints);
        let max_deviation = diff.amax();
        let position_deviation = diff.fixed_view::<3, 6>(0, 0).amax();
        let passed = max_deviation <= JACOBIAN_TOLERANCE;

        debug!(
            "Jacobian check at {}: max deviation {:.3e}, passed={}",
            joints, max_deviation, passed
        );

        JacobianCheck {
            max_deviation,
            position_deviation,
            passed,
        }
    }
}
