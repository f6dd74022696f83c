//! Newton–Raphson inverse kinematics on the space twist.
//!
//! Each iteration computes the space-frame twist `V_s` that carries the
//! current end-effector pose onto the target and steps the joints by
//! `J_s⁺ V_s`, where `J_s⁺` is the SVD pseudo-inverse of the space Jacobian.
//! The loop stops once `‖ω‖ ≤ eomg` and `‖v‖ ≤ ev`, or when the iteration
//! cap is reached.

use nalgebra::{Matrix4, Vector6};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::joints::JointVector;
use super::model::KinematicsModel;
use super::pose::{EulerPose, Pose, QuaternionPose};
use super::screw;
use crate::ArmError;

/// Default orientation tolerance (radians).
pub const DEFAULT_EOMG: f64 = 0.001;
/// Default position tolerance (meters).
pub const DEFAULT_EV: f64 = 0.001;
pub const DEFAULT_MAX_ITERATIONS: u32 = 50;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct IkConfig {
    /// Orientation tolerance on the rotational part of the error twist.
    pub eomg: f64,
    /// Position tolerance on the translational part of the error twist.
    pub ev: f64,
    pub max_iterations: u32,
    /// Singular values below this are treated as zero by the pseudo-inverse.
    pub singular_epsilon: f64,
}

impl IkConfig {
    pub fn with_tolerances(eomg: f64, ev: f64) -> Self {
        Self {
            eomg,
            ev,
            ..Self::default()
        }
    }
}

impl Default for IkConfig {
    fn default() -> Self {
        Self {
            eomg: DEFAULT_EOMG,
            ev: DEFAULT_EV,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            singular_epsilon: 1e-8,
        }
    }
}

/// Result of an IK solve. Non-convergence is a normal outcome, not an error.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum IkOutcome {
    /// Joints wrapped into `(-π, π]`. They are not checked against joint limits.
    Converged {
        joints: JointVector,
        iterations: u32,
    },
    /// The last iterate, returned as-is.
    NotConverged {
        last: JointVector,
        iterations: u32,
        orientation_error: f64,
        position_error: f64,
    },
}

impl IkOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, IkOutcome::Converged { .. })
    }

    /// Joint values of either variant.
    pub fn joints(&self) -> &JointVector {
        match self {
            IkOutcome::Converged { joints, .. } => joints,
            IkOutcome::NotConverged { last, .. } => last,
        }
    }

    pub fn iterations(&self) -> u32 {
        match self {
            IkOutcome::Converged { iterations, .. } | IkOutcome::NotConverged { iterations, .. } => {
                *iterations
            }
        }
    }

    /// Converged joints, or `None`.
    pub fn converged(self) -> Option<JointVector> {
        match self {
            IkOutcome::Converged { joints, .. } => Some(joints),
            IkOutcome::NotConverged { .. } => None,
        }
    }
}

impl KinematicsModel {
    /// Space twist `(ω, v)` that moves the pose at `joints` onto `target`.
    fn error_twist(&self, joints: &JointVector, target: &Matrix4<f64>) -> Vector6<f64> {
        let current = self.fk_matrix(joints);
        screw::adjoint(&current) * screw::log6(&(screw::inverse(&current) * target))
    }

    /// Solves for joints reaching `target` from `initial_guess` with the
    /// default iteration cap.
    pub fn solve(&self, target: &Pose, eomg: f64, ev: f64, initial_guess: &JointVector) -> IkOutcome {
        self.solve_with(target, &IkConfig::with_tolerances(eomg, ev), initial_guess)
    }

    pub fn solve_with(&self, target: &Pose, config: &IkConfig, initial_guess: &JointVector) -> IkOutcome {
        let target = target.matrix();
        let mut joints = *initial_guess;
        let mut iterations = 0;

        loop {
            let twist = self.error_twist(&joints, target);
            let orientation_error = twist.fixed_rows::<3>(0).norm();
            let position_error = twist.fixed_rows::<3>(3).norm();
            trace!(iterations, orientation_error, position_error, "ik step");

            if orientation_error <= config.eomg && position_error <= config.ev {
                return IkOutcome::Converged {
                    joints: JointVector(joints.0.map(screw::wrap_angle)),
                    iterations,
                };
            }

            let not_converged = IkOutcome::NotConverged {
                last: joints,
                iterations,
                orientation_error,
                position_error,
            };
            if iterations >= config.max_iterations {
                return not_converged;
            }

            let Ok(pinv) = self
                .space_jacobian(&joints)
                .pseudo_inverse(config.singular_epsilon)
            else {
                return not_converged;
            };
            let step = pinv * twist;
            let mut next = joints;
            for (angle, delta) in next.0.iter_mut().zip(step.iter()) {
                *angle += delta;
            }
            if next.iter().any(|v| !v.is_finite()) {
                return not_converged;
            }
            joints = next;
            iterations += 1;
        }
    }

    /// IK for a homogeneous-matrix target. Fails only if the matrix is not a rigid transform.
    pub fn solve_matrix(
        &self,
        target: Matrix4<f64>,
        eomg: f64,
        ev: f64,
        initial_guess: &JointVector,
    ) -> Result<IkOutcome, ArmError> {
        Ok(self.solve(&Pose::from_matrix(target)?, eomg, ev, initial_guess))
    }

    /// IK for a position + roll/pitch/yaw (radians) target.
    pub fn solve_euler(
        &self,
        target: EulerPose,
        eomg: f64,
        ev: f64,
        initial_guess: &JointVector,
    ) -> Result<IkOutcome, ArmError> {
        Ok(self.solve(&Pose::try_from(target)?, eomg, ev, initial_guess))
    }

    /// IK for a position + `[x, y, z, w]` quaternion target.
    pub fn solve_quaternion(
        &self,
        target: QuaternionPose,
        eomg: f64,
        ev: f64,
        initial_guess: &JointVector,
    ) -> Result<IkOutcome, ArmError> {
        Ok(self.solve(&Pose::try_from(target)?, eomg, ev, initial_guess))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn representative_joints() -> Vec<JointVector> {
        vec![
            JointVector([0.3, -0.4, 0.5, 0.2, 0.6, -0.3]),
            JointVector([-1.2, 0.8, -0.9, 1.5, -1.1, 2.0]),
            JointVector([1.9, -1.5, 1.7, -2.8, 1.5, -3.0]),
            JointVector([0.0, 0.5, 0.5, 0.0, -0.7, 0.0]),
        ]
    }

    #[test]
    fn test_home_pose_roundtrip() {
        let model = KinematicsModel::sagittarius();
        let home = model.compute_pose(&JointVector::zeros());
        let outcome = model.solve(&home, 1e-3, 1e-3, &JointVector::zeros());
        assert!(outcome.is_success());
        assert!(outcome.joints().max_abs_diff(&JointVector::zeros()) < 1e-3);
        assert_eq!(outcome.iterations(), 0);
    }

    #[test]
    fn test_seeded_roundtrip_converges_immediately() {
        let model = KinematicsModel::sagittarius();
        for joints in representative_joints() {
            assert!(model.limits().contains(&joints));
            let pose = model.compute_pose(&joints);
            let outcome = model.solve(&pose, DEFAULT_EOMG, DEFAULT_EV, &joints);
            assert!(outcome.is_success(), "no convergence for {:?}", joints);
            assert!(outcome.joints().max_abs_diff(&joints) < 1e-3);
        }
    }

    #[test]
    fn test_converges_from_perturbed_seed() {
        let model = KinematicsModel::sagittarius();
        let config = IkConfig::with_tolerances(1e-9, 1e-9);
        for joints in representative_joints() {
            let pose = model.compute_pose(&joints);
            let seed = JointVector(joints.0.map(|v| v + 0.05));
            let outcome = model.solve_with(&pose, &config, &seed);
            assert!(outcome.is_success(), "no convergence for {:?}: {:?}", joints, outcome);
            assert!(outcome.iterations() > 0);
            assert!(
                outcome.joints().max_abs_diff(&joints) < 1e-6,
                "{:?} vs {:?}",
                outcome.joints(),
                joints
            );
        }
    }

    #[test]
    fn test_unreachable_target_reports_failure_with_last_iterate() {
        let model = KinematicsModel::sagittarius();
        let far = Pose::from_euler([2.0, 0.0, 0.3], [0.0; 3]).unwrap();
        let outcome = model.solve(&far, DEFAULT_EOMG, DEFAULT_EV, &JointVector::zeros());
        match outcome {
            IkOutcome::NotConverged { position_error, iterations, .. } => {
                assert!(position_error > DEFAULT_EV);
                assert!(iterations <= DEFAULT_MAX_ITERATIONS);
            }
            IkOutcome::Converged { .. } => panic!("reached a point 2 m away"),
        }
        assert!(outcome.converged().is_none());
    }

    #[test]
    fn test_encodings_give_same_solution() {
        let model = KinematicsModel::sagittarius();
        let joints = JointVector([0.3, -0.4, 0.5, 0.2, 0.6, -0.3]);
        let pose = model.compute_pose(&joints);
        let seed = JointVector([0.25, -0.35, 0.45, 0.25, 0.55, -0.25]);

        let by_matrix = model.solve_matrix(*pose.matrix(), 1e-9, 1e-9, &seed).unwrap();
        let by_euler = model.solve_euler(pose.to_euler(), 1e-9, 1e-9, &seed).unwrap();
        let by_quat = model.solve_quaternion(pose.to_quaternion(), 1e-9, 1e-9, &seed).unwrap();

        assert!(by_matrix.is_success() && by_euler.is_success() && by_quat.is_success());
        assert!(by_matrix.joints().max_abs_diff(by_euler.joints()) < 1e-6);
        assert!(by_matrix.joints().max_abs_diff(by_quat.joints()) < 1e-6);
    }

    #[test]
    fn test_invalid_matrix_is_reported() {
        let model = KinematicsModel::sagittarius();
        let mut m = Matrix4::identity();
        m[(1, 1)] = 3.0;
        assert!(model.solve_matrix(m, 1e-3, 1e-3, &JointVector::zeros()).is_err());
    }
}
