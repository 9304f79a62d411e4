//! Selection across a smooth trajectory of poses.

use arm_ik::{IkSolver, JointVector, Pose, PoseOutcome, RobotConfig, SelectionPolicy};

/// Poses along a short joint-space path, both elbow branches reachable
fn trajectory(solver: &IkSolver) -> Vec<(JointVector, Pose)> {
    (0..6)
        .map(|k| {
            let k = k as f64;
            let q = JointVector::new([
                0.2 + 0.05 * k,
                0.3 + 0.02 * k,
                0.6 - 0.03 * k,
                -0.3 + 0.04 * k,
                0.8 - 0.05 * k,
                0.1 * k,
            ]);
            (q, solver.kinematics().forward_pose(&q))
        })
        .collect()
}

#[test]
fn test_all_policy_lists_both_elbows() {
    let solver = IkSolver::new(RobotConfig::default()).unwrap();
    let path = trajectory(&solver);
    let poses: Vec<Pose> = path.iter().map(|(_, pose)| *pose).collect();

    let outcomes = solver.solve(&poses, SelectionPolicy::All).unwrap();
    for ((q, _), outcome) in path.iter().zip(&outcomes) {
        match outcome {
            PoseOutcome::Solutions(set) => {
                assert_eq!(set.len(), 2);
                assert!(set.iter().any(|s| s.approx_eq(q, 1e-3)));
            }
            other => panic!("expected a solution list, got {other:?}"),
        }
    }
}

#[test]
fn test_continuity_stays_on_one_branch() {
    let solver = IkSolver::new(RobotConfig::default()).unwrap();
    let poses: Vec<Pose> = trajectory(&solver).into_iter().map(|(_, pose)| pose).collect();
    let outcomes = solver.solve(&poses, SelectionPolicy::Continuity).unwrap();

    let picks: Vec<JointVector> = outcomes
        .iter()
        .map(|o| *o.selected().expect("every pose is reachable"))
        .collect();

    // equal θ5 on the first pose: the first enumerated (elbow down) wins
    let first = JointVector::new([0.2, 0.8739, -0.6, 0.3261, 0.8, 0.0]);
    assert!(picks[0].approx_eq(&first, 1e-3), "first pick {}", picks[0]);

    for pair in picks.windows(2) {
        assert!(pair[1][2] < 0.0, "branch switched at {}", pair[1]);
        assert!(pair[0].distance_squared(&pair[1]) < 0.02);
    }

    let last = JointVector::new([0.45, 0.8307, -0.45, 0.3693, 0.55, 0.5]);
    assert!(picks[5].approx_eq(&last, 1e-3), "last pick {}", picks[5]);
}

#[test]
fn test_unreachable_pose_keeps_previous_reference() {
    let solver = IkSolver::new(RobotConfig::default()).unwrap();
    let mut poses: Vec<Pose> = trajectory(&solver).into_iter().map(|(_, pose)| pose).collect();
    poses.insert(2, Pose::new(1.0, 0.0, 0.23, 0.0, 0.0, 0.0));

    let outcomes = solver.solve(&poses, SelectionPolicy::Continuity).unwrap();
    assert_eq!(outcomes.len(), 7);
    assert_eq!(outcomes[2], PoseOutcome::NoSolution);

    // the pick after the gap is still the elbow-down neighbour of the pick before it
    let before = outcomes[1].selected().unwrap();
    let after = outcomes[3].selected().unwrap();
    assert!(after[2] < 0.0);
    assert!(before.distance_squared(after) < 0.02);
}

#[test]
fn test_first_rule_waits_for_first_solved_pose() {
    let solver = IkSolver::new(RobotConfig::default()).unwrap();
    let mut poses: Vec<Pose> = trajectory(&solver).into_iter().map(|(_, pose)| pose).collect();
    poses.insert(0, Pose::new(0.0, 0.0, 2.0, 0.0, 0.0, 0.0));

    let outcomes = solver.solve(&poses, SelectionPolicy::Continuity).unwrap();
    assert_eq!(outcomes[0], PoseOutcome::NoSolution);

    let first = JointVector::new([0.2, 0.8739, -0.6, 0.3261, 0.8, 0.0]);
    assert!(outcomes[1].selected().unwrap().approx_eq(&first, 1e-3));
}
