use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// Extract module must be declared first so the macro is available to other modules
#[macro_use]
mod extract;
pub use extract::ExtractInner;

pub mod drivers;

pub mod commands;
pub mod kinematics;
pub mod packets;
pub mod errors;
pub use errors::*;
pub mod logging;
pub mod units;

/// Servo id of the gripper. Joint servos are `1..=6`.
pub const GRIPPER_SERVO_ID: u8 = 7;
/// Servos on one arm, gripper included.
pub const SERVO_COUNT: usize = 7;
/// Most servos a single by-id write may address.
pub const MAX_INDEXED_SERVOS: usize = 6;

/// One addressed write: servo id and target angle in radians.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ServoCommand {
    pub id: u8,
    pub value: f64,
}

impl ServoCommand {
    pub fn new(id: u8, value: f64) -> Self {
        Self { id, value }
    }
}

/// Telemetry block a servo reports, in the board's native units.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServoTelemetry {
    pub speed: i16,
    /// Percent of rated load.
    pub load: i16,
    pub voltage: i16,
    pub current: i16,
}

impl ServoTelemetry {
    pub fn to_array(&self) -> [i16; 4] {
        [self.speed, self.load, self.voltage, self.current]
    }
}

/// Whether the servos actively hold position.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TorqueMode {
    Free,
    Locked,
}

impl TorqueMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TorqueMode::Free => "free",
            TorqueMode::Locked => "lock",
        }
    }
}

impl Default for TorqueMode {
    fn default() -> Self {
        Self::Locked
    }
}

impl fmt::Display for TorqueMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TorqueMode {
    type Err = ArmError;

    /// Accepts the two mode strings the board understands: `"free"` and `"lock"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(TorqueMode::Free),
            "lock" => Ok(TorqueMode::Locked),
            other => Err(ArmError::Config(format!(
                "torque mode must be \"free\" or \"lock\", got {:?}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_torque_mode_strings() {
        assert_eq!("free".parse::<TorqueMode>().unwrap(), TorqueMode::Free);
        assert_eq!("lock".parse::<TorqueMode>().unwrap(), TorqueMode::Locked);
        assert!("locked".parse::<TorqueMode>().is_err());
        assert_eq!(TorqueMode::Locked.to_string(), "lock");
    }
}
