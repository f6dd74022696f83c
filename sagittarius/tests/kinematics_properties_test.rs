use std::f64::consts::FRAC_PI_2;

use sagittarius::kinematics::*;

fn representative_joints() -> Vec<JointVector> {
    vec![
        JointVector::new([0.3, 0.2, 0.4, 0.5, 0.6, -0.4]),
        JointVector::new([-1.0, -0.5, 0.8, -1.2, 1.0, 2.0]),
        JointVector::new([1.5, 0.9, -0.3, 2.0, -1.2, -2.5]),
        JointVector::new([0.0, 0.7, 0.7, 0.0, -0.9, 0.0]),
        JointVector::new([-0.2, -1.2, 1.5, 0.3, 0.4, 1.1]),
    ]
}

#[test]
fn test_home_scenario() {
    let model = KinematicsModel::sagittarius();
    let pose = model.compute_pose(&JointVector::zeros());
    let rows = pose.to_rows();
    let expected = [
        [1.0, 0.0, 0.0, 0.3065],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.304],
        [0.0, 0.0, 0.0, 1.0],
    ];
    for (row, want) in rows.iter().zip(expected.iter()) {
        for (a, b) in row.iter().zip(want.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    let outcome = model.solve(&pose, 1e-3, 1e-3, &JointVector::zeros());
    assert!(outcome.is_success());
    assert!(outcome.joints().max_abs_diff(&JointVector::zeros()) < 1e-3);
}

#[test]
fn test_fk_encodings_agree() {
    let model = KinematicsModel::sagittarius();
    for joints in representative_joints() {
        let matrix = model.fk_matrix(&joints);
        let euler = Pose::try_from(model.fk_euler(&joints)).unwrap();
        let quat = Pose::try_from(model.fk_quaternion(&joints)).unwrap();
        let reference = Pose::from_matrix(matrix).unwrap();

        for other in [euler, quat] {
            let (translation, angle) = reference.distance_to(&other);
            assert!(translation < 1e-12);
            assert!(angle < 1e-9);
        }
    }
}

#[test]
fn test_pitched_down_quaternion_target_is_reachable() {
    let model = KinematicsModel::sagittarius();
    let target = Pose::from_quaternion([0.3, 0.0, 0.1], [0.0, 0.7068252, 0.0, 0.7073883]).unwrap();
    let seed = JointVector::new([0.0, 0.5, 0.3, 0.0, FRAC_PI_2 * 0.8, 0.0]);
    let outcome = model.solve(&target, DEFAULT_EOMG, DEFAULT_EV, &seed);
    assert!(outcome.is_success(), "{:?}", outcome);
    let (translation, _) = model.compute_pose(outcome.joints()).distance_to(&target);
    assert!(translation <= DEFAULT_EV * 2.0);
}
