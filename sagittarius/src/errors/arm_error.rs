use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::kinematics::LimitSide;

/// Hard errors: contract violations by the caller, or a link that is gone.
///
/// Transient bus conditions (a servo that does not answer in time) and IK
/// non-convergence are not errors; they come back as tagged outcomes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ArmError {
    InvalidArity { expected: usize, got: usize },
    TooManyServos { max: usize, got: usize },
    InvalidServoId(u8),
    OutOfRange { parameter: String, value: f64, min: f64, max: f64 },
    JointLimit { joint: u8, value: f64, lower: f64, upper: f64, side: LimitSide },
    InvalidPose(String),
    InvalidLogLevel(u8),
    Config(String),
    SerialOpen(String),
    FailedToSend(String),
    MalformedFrame(String),
    Disconnected,
}

impl ArmError {
    pub(crate) fn out_of_range<T: Into<f64>>(parameter: &str, value: T, min: T, max: T) -> Self {
        ArmError::OutOfRange {
            parameter: parameter.to_string(),
            value: value.into(),
            min: min.into(),
            max: max.into(),
        }
    }
}

impl Error for ArmError {}

impl fmt::Display for ArmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArmError::InvalidArity { expected, got } => {
                write!(f, "expected at least {} values, got {}", expected, got)
            }
            ArmError::TooManyServos { max, got } => {
                write!(f, "number of servos cannot exceed {} (got {})", max, got)
            }
            ArmError::InvalidServoId(id) => write!(f, "servo id {} does not exist on this arm", id),
            ArmError::OutOfRange { parameter, value, min, max } => {
                write!(f, "{} = {} is outside [{}, {}]", parameter, value, min, max)
            }
            ArmError::JointLimit { joint, value, lower, upper, side } => write!(
                f,
                "joint {} = {:.4} rad exceeds its {:?} limit (allowed [{:.4}, {:.4}])",
                joint, value, side, lower, upper
            ),
            ArmError::InvalidPose(msg) => write!(f, "invalid pose: {}", msg),
            ArmError::InvalidLogLevel(level) => write!(f, "log level {} is not in 0..=5", level),
            ArmError::Config(msg) => write!(f, "configuration error: {}", msg),
            ArmError::SerialOpen(msg) => write!(f, "could not open servo link: {}", msg),
            ArmError::FailedToSend(msg) => write!(f, "SendError: {}", msg),
            ArmError::MalformedFrame(msg) => write!(f, "malformed frame: {}", msg),
            ArmError::Disconnected => write!(f, "servo board appears to be disconnected"),
        }
    }
}
