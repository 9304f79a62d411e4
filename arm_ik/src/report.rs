//! Human-readable and JSON reports of a solver run, joints in degrees.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::robot_config::JOINT_COUNT;
use crate::selection::{PoseOutcome, SelectionRule};

pub const NO_SOLUTION_LINE: &str = "No valid solution found within joint limits.";

/// JSON form of one pose's outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseReport {
    /// 1-based position in the input sequence
    pub pose: usize,
    /// Every valid configuration, only filled by the `all` policy
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub solutions: Vec<[f64; JOINT_COUNT]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<[f64; JOINT_COUNT]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<SelectionRule>,
    pub solved: bool,
}

impl PoseReport {
    pub fn new(index: usize, outcome: &PoseOutcome) -> Self {
        let mut report = Self {
            pose: index + 1,
            solutions: Vec::new(),
            selected: None,
            rule: None,
            solved: outcome.is_solved(),
        };
        match outcome {
            PoseOutcome::Solutions(set) => {
                report.solutions = set.iter().map(|q| q.to_degrees()).collect();
            }
            PoseOutcome::Selected { joints, rule } => {
                report.selected = Some(joints.to_degrees());
                report.rule = Some(*rule);
            }
            PoseOutcome::NoSolution => {}
        }
        report
    }
}

pub fn pose_reports(outcomes: &[PoseOutcome]) -> Vec<PoseReport> {
    outcomes
        .iter()
        .enumerate()
        .map(|(i, outcome)| PoseReport::new(i, outcome))
        .collect()
}

/// Plain-text report, one block per pose
pub fn render_text(outcomes: &[PoseOutcome]) -> String {
    let mut out = String::new();
    for (i, outcome) in outcomes.iter().enumerate() {
        // writing into a String cannot fail
        let _ = writeln!(out, "IK solutions of end {}:", i + 1);
        match outcome {
            PoseOutcome::NoSolution => {
                let _ = writeln!(out, "  {NO_SOLUTION_LINE}");
            }
            PoseOutcome::Solutions(set) => {
                for q in set {
                    let _ = writeln!(out, "   {q}");
                }
            }
            PoseOutcome::Selected { joints, rule } => {
                let label = match rule {
                    SelectionRule::PositiveWrist => "first point: positive theta_5",
                    SelectionRule::ClosestToCurrent => "closest to current",
                };
                let _ = writeln!(out, "  Selected solution ({label}):");
                let _ = writeln!(out, "   {joints}");
            }
        }
        out.push('\n');
    }
    out
}
