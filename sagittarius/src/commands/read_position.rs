use serde::{Deserialize, Serialize};

use crate::packets::{CommandCode, Payload, PayloadReader};
use crate::units::wire_to_radians;
use crate::ArmError;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadPosition {
    pub id: u8,
}

impl ReadPosition {
    pub fn new(id: u8) -> Self {
        Self { id }
    }
}

impl Payload for ReadPosition {
    const CODE: CommandCode = CommandCode::ReadPosition;

    fn write_payload(&self, out: &mut Vec<u8>) {
        out.push(self.id);
    }

    fn read_payload(bytes: &[u8]) -> Result<Self, ArmError> {
        let mut reader = PayloadReader::new(bytes, Self::CODE);
        let id = reader.u8()?;
        reader.finish()?;
        Ok(Self { id })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadPositionResponse {
    pub id: u8,
    pub tenth_degrees: i16,
}

impl ReadPositionResponse {
    pub fn radians(&self) -> f64 {
        wire_to_radians(self.tenth_degrees)
    }
}

impl Payload for ReadPositionResponse {
    const CODE: CommandCode = CommandCode::ReadPosition;

    fn write_payload(&self, out: &mut Vec<u8>) {
        out.push(self.id);
        out.extend_from_slice(&self.tenth_degrees.to_le_bytes());
    }

    fn read_payload(bytes: &[u8]) -> Result<Self, ArmError> {
        let mut reader = PayloadReader::new(bytes, Self::CODE);
        let id = reader.u8()?;
        let tenth_degrees = reader.i16()?;
        reader.finish()?;
        Ok(Self { id, tenth_degrees })
    }
}
