use serde::{Deserialize, Serialize};

use crate::packets::{CommandCode, Payload, PayloadReader};
use crate::ArmError;

pub const MAX_ACCELERATION: u8 = 254;

/// Default profile acceleration for subsequent moves.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetAcceleration {
    pub acceleration: u8,
}

impl SetAcceleration {
    pub fn new(acceleration: u8) -> Result<Self, ArmError> {
        if acceleration > MAX_ACCELERATION {
            return Err(ArmError::out_of_range(
                "acceleration",
                acceleration,
                0,
                MAX_ACCELERATION,
            ));
        }
        Ok(Self { acceleration })
    }
}

impl Payload for SetAcceleration {
    const CODE: CommandCode = CommandCode::SetAcceleration;

    fn write_payload(&self, out: &mut Vec<u8>) {
        out.push(self.acceleration);
    }

    fn read_payload(bytes: &[u8]) -> Result<Self, ArmError> {
        let mut reader = PayloadReader::new(bytes, Self::CODE);
        let acceleration = reader.u8()?;
        reader.finish()?;
        Self::new(acceleration).map_err(|e| ArmError::MalformedFrame(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_255_is_rejected() {
        assert!(SetAcceleration::new(254).is_ok());
        assert!(SetAcceleration::new(255).is_err());
    }
}
