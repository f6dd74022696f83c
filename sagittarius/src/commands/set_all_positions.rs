use serde::{Deserialize, Serialize};

use crate::kinematics::{JointVector, JOINT_COUNT};
use crate::packets::{CommandCode, Payload, PayloadReader};
use crate::units::radians_to_wire;
use crate::ArmError;

/// Moves all six joint servos in one frame.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetAllPositions {
    pub tenth_degrees: [i16; JOINT_COUNT],
}

impl SetAllPositions {
    pub fn new(tenth_degrees: [i16; JOINT_COUNT]) -> Self {
        Self { tenth_degrees }
    }

    pub fn from_joints(joints: &JointVector) -> Self {
        Self {
            tenth_degrees: joints.0.map(radians_to_wire),
        }
    }
}

impl Payload for SetAllPositions {
    const CODE: CommandCode = CommandCode::SetAllPositions;

    fn write_payload(&self, out: &mut Vec<u8>) {
        for value in self.tenth_degrees {
            out.extend_from_slice(&value.to_le_bytes());
        }
    }

    fn read_payload(bytes: &[u8]) -> Result<Self, ArmError> {
        let mut reader = PayloadReader::new(bytes, Self::CODE);
        let mut tenth_degrees = [0i16; JOINT_COUNT];
        for value in tenth_degrees.iter_mut() {
            *value = reader.i16()?;
        }
        reader.finish()?;
        Ok(Self { tenth_degrees })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_joints_converts_to_tenth_degrees() {
        let joints = JointVector::new([0.0, std::f64::consts::FRAC_PI_2, -0.5, 0.0, 0.0, 1.0]);
        let cmd = SetAllPositions::from_joints(&joints);
        assert_eq!(cmd.tenth_degrees, [0, 900, -286, 0, 0, 573]);
    }

    #[test]
    fn test_payload_is_little_endian() {
        let mut out = Vec::new();
        SetAllPositions::new([1, -1, 256, 0, 0, 0]).write_payload(&mut out);
        assert_eq!(&out[..6], &[0x01, 0x00, 0xFF, 0xFF, 0x00, 0x01]);
        assert_eq!(out.len(), 12);
    }

    #[test]
    fn test_short_payload_is_malformed() {
        assert!(matches!(
            SetAllPositions::read_payload(&[0; 10]),
            Err(ArmError::MalformedFrame(_))
        ));
    }
}
