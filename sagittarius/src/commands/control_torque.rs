use serde::{Deserialize, Serialize};

use crate::packets::{CommandCode, Payload, PayloadReader};
use crate::{ArmError, TorqueMode};

/// Frees or locks every servo on the arm.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlTorque {
    pub mode: TorqueMode,
}

impl ControlTorque {
    pub fn new(mode: TorqueMode) -> Self {
        Self { mode }
    }
}

impl Payload for ControlTorque {
    const CODE: CommandCode = CommandCode::ControlTorque;

    fn write_payload(&self, out: &mut Vec<u8>) {
        out.push(match self.mode {
            TorqueMode::Free => 0,
            TorqueMode::Locked => 1,
        });
    }

    fn read_payload(bytes: &[u8]) -> Result<Self, ArmError> {
        let mut reader = PayloadReader::new(bytes, Self::CODE);
        let mode = match reader.u8()? {
            0 => TorqueMode::Free,
            1 => TorqueMode::Locked,
            other => {
                return Err(ArmError::MalformedFrame(format!(
                    "torque mode byte {} is neither 0 nor 1",
                    other
                )))
            }
        };
        reader.finish()?;
        Ok(Self { mode })
    }
}
