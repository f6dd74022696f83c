use serde::{Deserialize, Serialize};

use crate::packets::{CommandCode, Payload, PayloadReader};
use crate::ArmError;

pub const MAX_VELOCITY: u16 = 4096;

/// Default profile velocity for subsequent moves.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetVelocity {
    pub velocity: u16,
}

impl SetVelocity {
    pub fn new(velocity: u16) -> Result<Self, ArmError> {
        if velocity > MAX_VELOCITY {
            return Err(ArmError::out_of_range("velocity", velocity, 0, MAX_VELOCITY));
        }
        Ok(Self { velocity })
    }
}

impl Payload for SetVelocity {
    const CODE: CommandCode = CommandCode::SetVelocity;

    fn write_payload(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.velocity.to_le_bytes());
    }

    fn read_payload(bytes: &[u8]) -> Result<Self, ArmError> {
        let mut reader = PayloadReader::new(bytes, Self::CODE);
        let velocity = reader.u16()?;
        reader.finish()?;
        Self::new(velocity).map_err(|e| ArmError::MalformedFrame(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_bounds() {
        assert!(SetVelocity::new(0).is_ok());
        assert!(SetVelocity::new(4096).is_ok());
        assert!(matches!(SetVelocity::new(4097), Err(ArmError::OutOfRange { .. })));
    }
}
