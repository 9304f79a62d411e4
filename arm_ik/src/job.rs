//! JSON job files: which arm, which poses, which selection policy.
//!
//! Every field has a default, so the smallest job is just a pose list:
//!
//! ```json
//! { "poses": [[0.117, 0.334, 0.499, -2.019, -0.058, -2.190]] }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{KinematicsError, Result};
use crate::pose::Pose;
use crate::robot_config::RobotConfig;
use crate::selection::SelectionPolicy;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IkJob {
    pub robot: RobotConfig,
    pub policy: SelectionPolicy,
    pub poses: Vec<Pose>,
}

impl IkJob {
    /// Parse a job and check its robot configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let job: IkJob = serde_json::from_str(json)?;
        job.robot.validate()?;
        Ok(job)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| KinematicsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let job = Self::from_json_str(&contents)?;
        info!(
            "Loaded job {} ({} poses, policy {:?})",
            path.display(),
            job.poses.len(),
            job.policy
        );
        Ok(job)
    }

    /// The five validation poses of the ZJU-I arm, default limits
    pub fn reference() -> Self {
        Self {
            robot: RobotConfig::zju_i(),
            policy: SelectionPolicy::Continuity,
            poses: vec![
                Pose::new(0.117, 0.334, 0.499, -2.019, -0.058, -2.190),
                Pose::new(-0.066, 0.339, 0.444, -2.618, -0.524, -3.141),
                Pose::new(0.3, 0.25, 0.26, -2.64, 0.59, -2.35),
                Pose::new(0.42, 0.0, 0.36, 3.14, 1.0, -1.57),
                Pose::new(0.32, -0.25, 0.16, 3.0, 0.265, -0.84),
            ],
        }
    }
}
