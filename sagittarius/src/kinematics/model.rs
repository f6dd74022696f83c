//! Geometric description of the arm.
//!
//! The arm is described in the product-of-exponentials form: one space-frame
//! screw axis per joint plus the end-effector pose at the zero configuration.
//! The stock geometry reproduces the Sagittarius K1 arm (lengths in meters):
//!
//! Joint | axis | point on axis
//! ------|------|----------------------
//! J1    | +Z   | (0, 0, 0)
//! J2    | +Y   | (0, 0, 0.125)
//! J3    | +Y   | (0.033, 0, 0.304)
//! J4    | +X   | (0, 0, 0.304)
//! J5    | +Y   | (0.2165, 0, 0.304)
//! J6    | +X   | (0, 0, 0.304)
//!
//! With all joints at zero the gripper frame sits at (0.3065, 0, 0.304)
//! with the base orientation.

use nalgebra::{Matrix3, Matrix4, Matrix6, Vector3, Vector6};
use serde::{Deserialize, Serialize};

use super::joints::{JointLimits, JointVector, JOINT_COUNT};
use super::pose::{EulerPose, Pose, QuaternionPose};
use super::screw;
use crate::ArmError;

/// A revolute joint axis: direction plus any point on the axis, both in the base frame.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct JointAxis {
    pub direction: [f64; 3],
    pub point: [f64; 3],
}

impl JointAxis {
    pub const fn new(direction: [f64; 3], point: [f64; 3]) -> Self {
        Self { direction, point }
    }
}

/// Serializable arm description, loadable from JSON.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ArmGeometry {
    pub axes: [JointAxis; JOINT_COUNT],
    /// End-effector position at the zero configuration (orientation is the base frame).
    pub home_position: [f64; 3],
    pub limits: JointLimits,
}

impl ArmGeometry {
    pub fn sagittarius() -> Self {
        const Z: [f64; 3] = [0.0, 0.0, 1.0];
        const Y: [f64; 3] = [0.0, 1.0, 0.0];
        const X: [f64; 3] = [1.0, 0.0, 0.0];
        Self {
            axes: [
                JointAxis::new(Z, [0.0, 0.0, 0.0]),
                JointAxis::new(Y, [0.0, 0.0, 0.125]),
                JointAxis::new(Y, [0.033, 0.0, 0.304]),
                JointAxis::new(X, [0.0, 0.0, 0.304]),
                JointAxis::new(Y, [0.2165, 0.0, 0.304]),
                JointAxis::new(X, [0.0, 0.0, 0.304]),
            ],
            home_position: [0.3065, 0.0, 0.304],
            limits: JointLimits::sagittarius(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ArmError> {
        serde_json::from_str(json).map_err(|e| ArmError::Config(format!("invalid arm geometry: {}", e)))
    }
}

impl Default for ArmGeometry {
    fn default() -> Self {
        Self::sagittarius()
    }
}

/// Immutable kinematic model: screw axes, home pose and joint limits.
///
/// All methods are pure, so a model can be shared across threads freely.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicsModel {
    screws: [Vector6<f64>; JOINT_COUNT],
    home: Matrix4<f64>,
    limits: JointLimits,
}

impl KinematicsModel {
    /// Builds a model whose base is mounted at `origin` (a pure translation).
    pub fn from_geometry(geometry: &ArmGeometry, origin: [f64; 3]) -> Result<Self, ArmError> {
        for (joint, axis) in geometry.axes.iter().enumerate() {
            if !(Vector3::from(axis.direction).norm() > 1e-9) {
                return Err(ArmError::Config(format!(
                    "joint {} axis direction has zero length",
                    joint + 1
                )));
            }
        }
        JointLimits::new(*geometry.limits.lower(), *geometry.limits.upper())?;
        Ok(Self::build(geometry, Vector3::from(origin)))
    }

    fn build(geometry: &ArmGeometry, offset: Vector3<f64>) -> Self {
        let screws = geometry.axes.map(|axis| {
            screw::revolute_screw(Vector3::from(axis.direction), Vector3::from(axis.point) + offset)
        });
        let home = screw::from_parts(
            &Matrix3::identity(),
            &(Vector3::from(geometry.home_position) + offset),
        );
        Self {
            screws,
            home,
            limits: geometry.limits.clone(),
        }
    }

    /// Stock Sagittarius arm with its base at the world origin.
    pub fn sagittarius() -> Self {
        Self::sagittarius_at(0.0, 0.0, 0.0)
    }

    /// Stock Sagittarius arm with its base mounted at `(x, y, z)`.
    pub fn sagittarius_at(x: f64, y: f64, z: f64) -> Self {
        Self::build(&ArmGeometry::sagittarius(), Vector3::new(x, y, z))
    }

    pub fn limits(&self) -> &JointLimits {
        &self.limits
    }

    pub fn lower_joint_limits(&self) -> &JointVector {
        self.limits.lower()
    }

    pub fn upper_joint_limits(&self) -> &JointVector {
        self.limits.upper()
    }

    pub fn screw_axes(&self) -> &[Vector6<f64>; JOINT_COUNT] {
        &self.screws
    }

    /// End-effector pose at the zero configuration.
    pub fn home_pose(&self) -> Pose {
        Pose::from_matrix_unchecked(self.home)
    }

    /// Forward kinematics: `e^[S1]θ1 ⋯ e^[S6]θ6 · M`.
    ///
    /// Total over all finite inputs; no reachability or limit checks are made.
    pub fn compute_pose(&self, joints: &JointVector) -> Pose {
        let mut t = Matrix4::<f64>::identity();
        for (screw_axis, &theta) in self.screws.iter().zip(joints.iter()) {
            t *= screw::exp6(screw_axis, theta);
        }
        Pose::from_matrix_unchecked(t * self.home)
    }

    pub fn fk_matrix(&self, joints: &JointVector) -> Matrix4<f64> {
        *self.compute_pose(joints).matrix()
    }

    pub fn fk_euler(&self, joints: &JointVector) -> EulerPose {
        self.compute_pose(joints).to_euler()
    }

    pub fn fk_quaternion(&self, joints: &JointVector) -> QuaternionPose {
        self.compute_pose(joints).to_quaternion()
    }

    /// Space Jacobian: column `i` is `Ad(e^[S1]θ1 ⋯ e^[S(i-1)]θ(i-1)) S_i`.
    pub fn space_jacobian(&self, joints: &JointVector) -> Matrix6<f64> {
        let mut jacobian = Matrix6::zeros();
        let mut t = Matrix4::<f64>::identity();
        for (i, (screw_axis, &theta)) in self.screws.iter().zip(joints.iter()).enumerate() {
            jacobian.set_column(i, &(screw::adjoint(&t) * screw_axis));
            t *= screw::exp6(screw_axis, theta);
        }
        jacobian
    }
}

impl Default for KinematicsModel {
    fn default() -> Self {
        Self::sagittarius()
    }
}
