use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::ArmError;

/// Number of actuated joints on the arm (the gripper is addressed separately).
pub const JOINT_COUNT: usize = 6;

/// Six joint angles in radians, ordered base to wrist.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct JointVector(pub [f64; JOINT_COUNT]);

impl JointVector {
    pub const fn new(angles: [f64; JOINT_COUNT]) -> Self {
        Self(angles)
    }

    pub const fn zeros() -> Self {
        Self([0.0; JOINT_COUNT])
    }

    pub fn as_array(&self) -> &[f64; JOINT_COUNT] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.0.iter()
    }

    /// Largest absolute per-joint difference between two vectors.
    pub fn max_abs_diff(&self, other: &JointVector) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }

    /// Builds a vector from the first six entries of a slice.
    ///
    /// Extra trailing entries are ignored, so a 7-element status readback
    /// (six joints plus gripper) can be fed straight back in.
    pub fn from_slice(values: &[f64]) -> Result<Self, ArmError> {
        let head = values.get(..JOINT_COUNT).ok_or(ArmError::InvalidArity {
            expected: JOINT_COUNT,
            got: values.len(),
        })?;
        let mut angles = [0.0; JOINT_COUNT];
        angles.copy_from_slice(head);
        Ok(Self(angles))
    }
}

impl From<[f64; JOINT_COUNT]> for JointVector {
    fn from(angles: [f64; JOINT_COUNT]) -> Self {
        Self(angles)
    }
}

impl Index<usize> for JointVector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

/// Which bound a joint value violated.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitSide {
    Lower,
    Upper,
}

/// Per-joint lower/upper bounds in radians. Fixed when the arm model is built.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JointLimits {
    lower: JointVector,
    upper: JointVector,
}

impl JointLimits {
    /// Fails if any lower bound exceeds its upper bound.
    pub fn new(lower: JointVector, upper: JointVector) -> Result<Self, ArmError> {
        for (joint, (lo, hi)) in lower.iter().zip(upper.iter()).enumerate() {
            if !(lo <= hi) {
                return Err(ArmError::Config(format!(
                    "joint {} has lower limit {} above upper limit {}",
                    joint + 1,
                    lo,
                    hi
                )));
            }
        }
        Ok(Self { lower, upper })
    }

    /// Limits of the stock Sagittarius arm.
    pub fn sagittarius() -> Self {
        Self {
            lower: JointVector([-2.0, -1.57, -1.48, -2.9, -1.8, -3.1]),
            upper: JointVector([2.0, 1.4, 1.8, 2.9, 1.6, 3.1]),
        }
    }

    pub fn lower(&self) -> &JointVector {
        &self.lower
    }

    pub fn upper(&self) -> &JointVector {
        &self.upper
    }

    /// Checks a single joint (0-based index). NaN is never within limits.
    pub fn check_joint(&self, joint: usize, value: f64) -> Result<(), LimitSide> {
        if !(value >= self.lower[joint]) {
            Err(LimitSide::Lower)
        } else if !(value <= self.upper[joint]) {
            Err(LimitSide::Upper)
        } else {
            Ok(())
        }
    }

    pub fn contains(&self, joints: &JointVector) -> bool {
        self.first_violation(joints).is_none()
    }

    /// Returns the first out-of-range joint as `ArmError::JointLimit`.
    pub fn first_violation(&self, joints: &JointVector) -> Option<ArmError> {
        joints.iter().enumerate().find_map(|(joint, &value)| {
            self.check_joint(joint, value).err().map(|side| ArmError::JointLimit {
                joint: joint as u8 + 1,
                value,
                lower: self.lower[joint],
                upper: self.upper[joint],
                side,
            })
        })
    }
}

impl Default for JointLimits {
    fn default() -> Self {
        Self::sagittarius()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_accepts_status_arity() {
        let status = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, -0.03];
        let joints = JointVector::from_slice(&status).unwrap();
        assert_eq!(joints, JointVector([0.1, 0.2, 0.3, 0.4, 0.5, 0.6]));
    }

    #[test]
    fn test_from_slice_rejects_short_input() {
        match JointVector::from_slice(&[0.0; 5]) {
            Err(ArmError::InvalidArity { expected, got }) => {
                assert_eq!(expected, 6);
                assert_eq!(got, 5);
            }
            other => panic!("expected arity error, got {:?}", other),
        }
    }

    #[test]
    fn test_limits_report_first_violation() {
        let limits = JointLimits::sagittarius();
        assert!(limits.contains(&JointVector::zeros()));

        let joints = JointVector([0.0, 0.0, 1.9, 0.0, -2.0, 0.0]);
        match limits.first_violation(&joints) {
            Some(ArmError::JointLimit { joint, side, .. }) => {
                assert_eq!(joint, 3);
                assert_eq!(side, LimitSide::Upper);
            }
            other => panic!("expected joint limit error, got {:?}", other),
        }
    }

    #[test]
    fn test_nan_is_out_of_range() {
        let limits = JointLimits::sagittarius();
        let joints = JointVector([f64::NAN, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(!limits.contains(&joints));
    }

    #[test]
    fn test_inverted_limits_rejected() {
        let lower = JointVector([0.0; 6]);
        let mut upper = JointVector([1.0; 6]);
        upper.0[4] = -1.0;
        assert!(JointLimits::new(lower, upper).is_err());
    }
}
