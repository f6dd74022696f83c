use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::commands::{MAX_ACCELERATION, MAX_VELOCITY};
use crate::kinematics::JointLimits;
use crate::{ArmError, TorqueMode};

/// Session parameters for one arm.
///
/// ```rust,ignore
/// let config = ArmConfig::from_json_file("arm.json")?;
/// // or start from the defaults and override a few fields
/// let config = ArmConfig {
///     serial_path: "/dev/ttyACM0".to_string(),
///     free_on_release: false,
///     ..ArmConfig::default()
/// };
/// config.validate()?;
/// let arm = SagittariusArm::connect(config).await?;
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ArmConfig {
    pub serial_path: String,
    pub baud_rate: u32,
    /// Default profile velocity, `0..=4096`.
    pub velocity: u16,
    /// Default profile acceleration, `0..=254`.
    pub acceleration: u8,
    pub read_timeout_ms: u64,
    /// Release torque when the session ends.
    pub free_on_release: bool,
    pub initial_torque: TorqueMode,
    pub joint_limits: JointLimits,
}

impl ArmConfig {
    pub fn new(serial_path: String, baud_rate: u32, velocity: u16, acceleration: u8) -> Self {
        Self {
            serial_path,
            baud_rate,
            velocity,
            acceleration,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ArmError> {
        if self.serial_path.is_empty() {
            return Err(ArmError::Config("Serial path cannot be empty.".to_string()));
        }
        if self.baud_rate == 0 {
            return Err(ArmError::Config("Baud rate must be greater than 0.".to_string()));
        }
        if self.read_timeout_ms == 0 {
            return Err(ArmError::Config("Read timeout must be greater than 0.".to_string()));
        }
        if self.velocity > MAX_VELOCITY {
            return Err(ArmError::out_of_range("velocity", self.velocity, 0, MAX_VELOCITY));
        }
        if self.acceleration > MAX_ACCELERATION {
            return Err(ArmError::out_of_range(
                "acceleration",
                self.acceleration,
                0,
                MAX_ACCELERATION,
            ));
        }
        // Limits may come from a hand-edited file.
        JointLimits::new(*self.joint_limits.lower(), *self.joint_limits.upper())?;
        Ok(())
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn from_json(json: &str) -> Result<Self, ArmError> {
        serde_json::from_str(json).map_err(|e| ArmError::Config(format!("Could not parse config: {}", e)))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ArmError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ArmError::Config(format!("Could not read {}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            serial_path: "/dev/sagittarius".to_string(),
            baud_rate: 1_000_000,
            velocity: 500,
            acceleration: 5,
            read_timeout_ms: 500,
            free_on_release: true,
            initial_torque: TorqueMode::Locked,
            joint_limits: JointLimits::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = ArmConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.read_timeout(), Duration::from_millis(500));
        assert!(config.free_on_release);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = ArmConfig::from_json(r#"{ "serial_path": "/dev/ttyACM0", "velocity": 1200 }"#).unwrap();
        assert_eq!(config.serial_path, "/dev/ttyACM0");
        assert_eq!(config.velocity, 1200);
        assert_eq!(config.baud_rate, 1_000_000);
        assert_eq!(config.initial_torque, TorqueMode::Locked);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            ArmConfig { serial_path: String::new(), ..ArmConfig::default() },
            ArmConfig { baud_rate: 0, ..ArmConfig::default() },
            ArmConfig { read_timeout_ms: 0, ..ArmConfig::default() },
            ArmConfig { velocity: 5000, ..ArmConfig::default() },
            ArmConfig { acceleration: 255, ..ArmConfig::default() },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{:?} should be rejected", config);
        }
    }

    #[test]
    fn test_inverted_limits_in_file_rejected() {
        let json = r#"{ "joint_limits": { "lower": [1, 0, 0, 0, 0, 0], "upper": [0, 1, 1, 1, 1, 1] } }"#;
        let config = ArmConfig::from_json(json).unwrap();
        assert!(matches!(config.validate(), Err(ArmError::Config(_))));
    }
}
