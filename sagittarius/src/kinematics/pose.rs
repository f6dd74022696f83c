use nalgebra::{Matrix3, Matrix4, Quaternion, Rotation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use super::screw;
use crate::ArmError;

/// Tolerance used when validating caller-supplied rotation matrices.
const ROTATION_TOLERANCE: f64 = 1e-6;

/// End-effector position plus roll/pitch/yaw in radians.
///
/// The rotation is `Rz(yaw) * Ry(pitch) * Rx(roll)`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct EulerPose {
    pub xyz: [f64; 3],
    pub rpy: [f64; 3],
}

/// End-effector position plus unit quaternion stored as `[x, y, z, w]`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct QuaternionPose {
    pub xyz: [f64; 3],
    pub xyzw: [f64; 4],
}

/// Cartesian end-effector pose held as a homogeneous transform.
///
/// Every encoding (matrix, Euler, quaternion) is derived from the same
/// matrix, and every constructor validates its input so the rotation block
/// is always a proper rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    matrix: Matrix4<f64>,
}

impl Pose {
    pub fn identity() -> Self {
        Self { matrix: Matrix4::identity() }
    }

    /// Internal constructor for matrices produced by the kinematics itself.
    pub(crate) fn from_matrix_unchecked(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }

    /// Accepts a 4×4 homogeneous transform.
    ///
    /// The rotation block must be orthonormal with determinant +1 and the
    /// bottom row must be `[0, 0, 0, 1]`.
    pub fn from_matrix(matrix: Matrix4<f64>) -> Result<Self, ArmError> {
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(ArmError::InvalidPose("matrix contains non-finite values".to_string()));
        }
        let bottom = matrix.fixed_view::<1, 4>(3, 0);
        let expected_bottom = nalgebra::RowVector4::new(0.0, 0.0, 0.0, 1.0);
        if (bottom - expected_bottom).abs().max() > ROTATION_TOLERANCE {
            return Err(ArmError::InvalidPose(format!(
                "bottom row must be [0, 0, 0, 1], got {}",
                bottom
            )));
        }
        let rotation = screw::rotation_of(&matrix);
        let orthogonality = (rotation.transpose() * rotation - Matrix3::identity()).abs().max();
        if orthogonality > ROTATION_TOLERANCE {
            return Err(ArmError::InvalidPose(format!(
                "rotation block is not orthonormal (deviation {:e})",
                orthogonality
            )));
        }
        if (rotation.determinant() - 1.0).abs() > ROTATION_TOLERANCE {
            return Err(ArmError::InvalidPose(
                "rotation block is a reflection (determinant is not +1)".to_string(),
            ));
        }
        Ok(Self { matrix })
    }

    /// Builds a pose from a row-major 4×4 array.
    pub fn from_rows(rows: [[f64; 4]; 4]) -> Result<Self, ArmError> {
        Self::from_matrix(Matrix4::from_fn(|r, c| rows[r][c]))
    }

    /// Position plus roll/pitch/yaw in radians.
    pub fn from_euler(xyz: [f64; 3], rpy: [f64; 3]) -> Result<Self, ArmError> {
        if xyz.iter().chain(rpy.iter()).any(|v| !v.is_finite()) {
            return Err(ArmError::InvalidPose("Euler pose contains non-finite values".to_string()));
        }
        let rotation = Rotation3::from_euler_angles(rpy[0], rpy[1], rpy[2]);
        Ok(Self {
            matrix: screw::from_parts(rotation.matrix(), &Vector3::from(xyz)),
        })
    }

    /// Same as [`Pose::from_euler`] with roll/pitch/yaw in degrees.
    pub fn from_euler_degrees(xyz: [f64; 3], rpy_deg: [f64; 3]) -> Result<Self, ArmError> {
        Self::from_euler(xyz, rpy_deg.map(f64::to_radians))
    }

    /// Position plus quaternion `[x, y, z, w]`. The quaternion is normalised;
    /// a zero quaternion is rejected.
    pub fn from_quaternion(xyz: [f64; 3], xyzw: [f64; 4]) -> Result<Self, ArmError> {
        if xyz.iter().chain(xyzw.iter()).any(|v| !v.is_finite()) {
            return Err(ArmError::InvalidPose(
                "quaternion pose contains non-finite values".to_string(),
            ));
        }
        let raw = Quaternion::new(xyzw[3], xyzw[0], xyzw[1], xyzw[2]);
        let unit = UnitQuaternion::try_new(raw, 1e-9).ok_or_else(|| {
            ArmError::InvalidPose("quaternion has zero norm".to_string())
        })?;
        let rotation = unit.to_rotation_matrix();
        Ok(Self {
            matrix: screw::from_parts(rotation.matrix(), &Vector3::from(xyz)),
        })
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// Row-major copy of the homogeneous transform.
    pub fn to_rows(&self) -> [[f64; 4]; 4] {
        let mut rows = [[0.0; 4]; 4];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = self.matrix[(r, c)];
            }
        }
        rows
    }

    pub fn position(&self) -> [f64; 3] {
        screw::translation_of(&self.matrix).into()
    }

    pub fn rotation(&self) -> Rotation3<f64> {
        Rotation3::from_matrix_unchecked(screw::rotation_of(&self.matrix))
    }

    pub fn to_euler(&self) -> EulerPose {
        let (roll, pitch, yaw) = self.rotation().euler_angles();
        EulerPose {
            xyz: self.position(),
            rpy: [roll, pitch, yaw],
        }
    }

    pub fn to_quaternion(&self) -> QuaternionPose {
        let q = UnitQuaternion::from_rotation_matrix(&self.rotation());
        QuaternionPose {
            xyz: self.position(),
            xyzw: [q.i, q.j, q.k, q.w],
        }
    }

    /// Translation distance and rotation angle between two poses.
    pub fn distance_to(&self, other: &Pose) -> (f64, f64) {
        let translation = (screw::translation_of(&self.matrix)
            - screw::translation_of(&other.matrix))
        .norm();
        let r = self.rotation().rotation_to(&other.rotation()).into_inner();
        // atan2(2 sin θ, 2 cos θ)
        let sin2 = Vector3::new(r[(2, 1)] - r[(1, 2)], r[(0, 2)] - r[(2, 0)], r[(1, 0)] - r[(0, 1)]).norm();
        let cos2 = r.trace() - 1.0;
        (translation, sin2.atan2(cos2))
    }
}

impl TryFrom<EulerPose> for Pose {
    type Error = ArmError;

    fn try_from(pose: EulerPose) -> Result<Self, ArmError> {
        Pose::from_euler(pose.xyz, pose.rpy)
    }
}

impl TryFrom<QuaternionPose> for Pose {
    type Error = ArmError;

    fn try_from(pose: QuaternionPose) -> Result<Self, ArmError> {
        Pose::from_quaternion(pose.xyz, pose.xyzw)
    }
}

impl TryFrom<Matrix4<f64>> for Pose {
    type Error = ArmError;

    fn try_from(matrix: Matrix4<f64>) -> Result<Self, ArmError> {
        Pose::from_matrix(matrix)
    }
}
