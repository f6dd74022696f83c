use serde::{Deserialize, Serialize};

use crate::packets::{CommandCode, Payload, PayloadReader};
use crate::{ArmError, SERVO_COUNT};

/// Per-mille of rated torque.
pub const MAX_TORQUE_LIMIT: i16 = 1000;

/// Caps the output torque of each of the seven servos.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetTorqueLimits {
    pub limits: [i16; SERVO_COUNT],
}

impl SetTorqueLimits {
    pub fn new(limits: [i16; SERVO_COUNT]) -> Result<Self, ArmError> {
        if let Some(bad) = limits.iter().find(|v| !(0..=MAX_TORQUE_LIMIT).contains(*v)) {
            return Err(ArmError::out_of_range("torque limit", *bad, 0, MAX_TORQUE_LIMIT));
        }
        Ok(Self { limits })
    }

    /// Accepts a caller slice; anything but exactly seven values is rejected.
    pub fn from_slice(values: &[i16]) -> Result<Self, ArmError> {
        let limits: [i16; SERVO_COUNT] = values.try_into().map_err(|_| ArmError::InvalidArity {
            expected: SERVO_COUNT,
            got: values.len(),
        })?;
        Self::new(limits)
    }
}

impl Payload for SetTorqueLimits {
    const CODE: CommandCode = CommandCode::SetTorqueLimits;

    fn write_payload(&self, out: &mut Vec<u8>) {
        for value in self.limits {
            out.extend_from_slice(&value.to_le_bytes());
        }
    }

    fn read_payload(bytes: &[u8]) -> Result<Self, ArmError> {
        let mut reader = PayloadReader::new(bytes, Self::CODE);
        let mut limits = [0i16; SERVO_COUNT];
        for value in limits.iter_mut() {
            *value = reader.i16()?;
        }
        reader.finish()?;
        Self::new(limits).map_err(|e| ArmError::MalformedFrame(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_and_range() {
        assert!(matches!(
            SetTorqueLimits::from_slice(&[500; 6]),
            Err(ArmError::InvalidArity { expected: 7, got: 6 })
        ));
        assert!(matches!(
            SetTorqueLimits::from_slice(&[500, 500, 500, 1001, 500, 500, 500]),
            Err(ArmError::OutOfRange { .. })
        ));
        assert!(matches!(
            SetTorqueLimits::from_slice(&[-1, 0, 0, 0, 0, 0, 0]),
            Err(ArmError::OutOfRange { .. })
        ));
        assert_eq!(SetTorqueLimits::from_slice(&[1000; 7]).unwrap().limits, [1000; 7]);
    }
}
