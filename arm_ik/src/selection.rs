//! Picking one joint configuration per pose.
//!
//! [`select`] is a pure step: it takes the state left by the previous pose and
//! returns the outcome for the current pose together with the next state. The
//! solver threads it through a pose sequence with `Iterator::scan`.

use serde::{Deserialize, Serialize};

use crate::pose::{JointVector, SolutionSet};

/// How a run turns each pose's solution set into a result
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Report every valid configuration (diagnostic mode)
    All,
    /// Anchor on the largest positive θ5, then stay closest to the previous pick
    #[default]
    Continuity,
}

/// Which continuity rule produced a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionRule {
    /// First solved pose: largest θ5, preferring θ5 > 0
    PositiveWrist,
    /// Later poses: smallest squared joint distance to the previous pick
    ClosestToCurrent,
}

/// Per-pose result of a solver run
#[derive(Debug, Clone, PartialEq)]
pub enum PoseOutcome {
    Solutions(SolutionSet),
    Selected {
        joints: JointVector,
        rule: SelectionRule,
    },
    NoSolution,
}

impl PoseOutcome {
    /// Selected configuration, if this outcome carries exactly one
    pub fn selected(&self) -> Option<&JointVector> {
        match self {
            PoseOutcome::Selected { joints, .. } => Some(joints),
            _ => None,
        }
    }

    pub fn is_solved(&self) -> bool {
        !matches!(self, PoseOutcome::NoSolution)
    }
}

/// State carried between consecutive poses of a run
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SolverState {
    /// Last selected configuration; the zero vector before any selection
    pub current: JointVector,
    /// Set once some pose has produced a selection
    pub anchored: bool,
}

/// Apply `policy` to one pose's solutions.
///
/// The state only changes when a configuration is selected, so poses without
/// solutions and the `All` policy leave it untouched.
pub fn select(
    policy: SelectionPolicy,
    state: SolverState,
    solutions: SolutionSet,
) -> (PoseOutcome, SolverState) {
    if solutions.is_empty() {
        return (PoseOutcome::NoSolution, state);
    }

    let picked = match policy {
        SelectionPolicy::All => return (PoseOutcome::Solutions(solutions), state),
        SelectionPolicy::Continuity if !state.anchored => {
            pick_positive_wrist(&solutions).map(|q| (q, SelectionRule::PositiveWrist))
        }
        SelectionPolicy::Continuity => {
            pick_closest(&solutions, &state.current).map(|q| (q, SelectionRule::ClosestToCurrent))
        }
    };

    match picked {
        Some((joints, rule)) => (
            PoseOutcome::Selected { joints, rule },
            SolverState {
                current: joints,
                anchored: true,
            },
        ),
        None => (PoseOutcome::NoSolution, state),
    }
}

/// Largest θ5 among θ5 > 0, else largest θ5 overall
fn pick_positive_wrist(solutions: &SolutionSet) -> Option<JointVector> {
    let wrist = |q: &JointVector| q[4];
    first_max_by_key(solutions.iter().filter(|q| q[4] > 0.0), wrist)
        .or_else(|| first_max_by_key(solutions.iter(), wrist))
}

fn pick_closest(solutions: &SolutionSet, current: &JointVector) -> Option<JointVector> {
    // min_by keeps the first of equal elements
    solutions
        .iter()
        .min_by(|a, b| {
            a.distance_squared(current)
                .total_cmp(&b.distance_squared(current))
        })
        .copied()
}

/// Like `Iterator::max_by_key` but the first of equal maxima wins
fn first_max_by_key<'a, I, F>(iter: I, key: F) -> Option<JointVector>
where
    I: Iterator<Item = &'a JointVector>,
    F: Fn(&JointVector) -> f64,
{
    iter.fold(None::<&JointVector>, |best, q| match best {
        Some(b) if key(q) <= key(b) => Some(b),
        _ => Some(q),
    })
    .copied()
}
