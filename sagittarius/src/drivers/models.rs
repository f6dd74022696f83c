use serde::{Deserialize, Serialize};

use crate::kinematics::JointVector;
use crate::SERVO_COUNT;

/// Outcome of waiting for one servo to answer.
///
/// Silence on a shared bus is expected now and then, so it is a value here
/// rather than an error.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum BusReply<T> {
    Received(T),
    TimedOut,
}

impl<T> BusReply<T> {
    pub fn is_received(&self) -> bool {
        matches!(self, BusReply::Received(_))
    }

    pub fn received(self) -> Option<T> {
        match self {
            BusReply::Received(value) => Some(value),
            BusReply::TimedOut => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> BusReply<U> {
        match self {
            BusReply::Received(value) => BusReply::Received(f(value)),
            BusReply::TimedOut => BusReply::TimedOut,
        }
    }
}

/// Positions of the six joints (radians) followed by the gripper (meters).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum JointStatus {
    Complete([f64; SERVO_COUNT]),
    /// Some servos did not answer; their slots hold the last known value.
    Incomplete {
        best_effort: [f64; SERVO_COUNT],
        missing: Vec<u8>,
    },
}

impl JointStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, JointStatus::Complete(_))
    }

    pub fn values(&self) -> &[f64; SERVO_COUNT] {
        match self {
            JointStatus::Complete(values) => values,
            JointStatus::Incomplete { best_effort, .. } => best_effort,
        }
    }

    pub fn joints(&self) -> JointVector {
        let v = self.values();
        JointVector([v[0], v[1], v[2], v[3], v[4], v[5]])
    }

    pub fn gripper(&self) -> f64 {
        self.values()[SERVO_COUNT - 1]
    }

    pub fn missing(&self) -> &[u8] {
        match self {
            JointStatus::Complete(_) => &[],
            JointStatus::Incomplete { missing, .. } => missing,
        }
    }
}
