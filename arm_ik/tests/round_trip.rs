//! Property tests: forward kinematics followed by inverse kinematics.
//!
//! Run with: cargo test -p arm_ik -- round_trip

use arm_ik::{IkSolver, JointVector, RobotConfig};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// Joint vectors inside the default limits, away from the wrist flip
/// (|cos θ5| stays well above zero) and from the ±π wrap of the revolute joints.
fn arb_joints() -> impl Strategy<Value = JointVector> {
    (
        -3.1..3.1f64,
        -1.55..1.55f64,
        -2.6..2.6f64,
        -3.1..3.1f64,
        -1.5..1.5f64,
        -3.1..3.1f64,
    )
        .prop_map(|(q1, q2, q3, q4, q5, q6)| JointVector::new([q1, q2, q3, q4, q5, q6]))
}

fn solver() -> IkSolver {
    IkSolver::new(RobotConfig::default()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn round_trip_recovers_joints(q in arb_joints()) {
        let solver = solver();
        let pose = solver.kinematics().forward_pose(&q);
        let solutions = solver.solve_one_pose(&pose).unwrap();

        prop_assert!(
            solutions.iter().any(|s| s.approx_eq(&q, 1e-3)),
            "{} not among {} solutions", q, solutions.len()
        );
    }

    #[test]
    fn round_trip_solutions_reproduce_pose(q in arb_joints()) {
        let solver = solver();
        let pose = solver.kinematics().forward_pose(&q);
        let target = pose.to_homogeneous();

        for s in &solver.solve_one_pose(&pose).unwrap() {
            let err = solver.kinematics().pose_error(s, &target);
            prop_assert!(err.position <= 1e-3);
            prop_assert!(err.orientation <= 1e-3);
            prop_assert!(solver.config().limits.contains(s));
        }
    }

    #[test]
    fn solutions_are_distinct_and_deterministic(q in arb_joints()) {
        let solver = solver();
        let pose = solver.kinematics().forward_pose(&q);
        let first = solver.solve_one_pose(&pose).unwrap();
        let second = solver.solve_one_pose(&pose).unwrap();
        prop_assert_eq!(&first, &second);

        let all: Vec<&JointVector> = first.iter().collect();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                prop_assert!(!b.approx_eq(a, 1e-3));
            }
        }
    }
}
