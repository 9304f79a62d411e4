// Library exports for the ZJU-I inverse kinematics solver

pub mod errors;
pub mod robot_config;
pub mod pose;
pub mod kinematics;
pub mod selection;
pub mod ik;
pub mod job;
pub mod report;

pub use errors::{KinematicsError, Result};
pub use ik::IkSolver;
pub use job::IkJob;
pub use kinematics::{ArmKinematics, JacobianCheck, PoseError};
pub use pose::{JointVector, Pose, SolutionSet};
pub use robot_config::{JointLimits, RobotConfig, RobotGeometry, Tolerances, JOINT_COUNT};
pub use selection::{select, PoseOutcome, SelectionPolicy, SelectionRule, SolverState};
