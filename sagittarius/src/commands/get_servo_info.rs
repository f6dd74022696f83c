use serde::{Deserialize, Serialize};

use crate::packets::{CommandCode, Payload, PayloadReader};
use crate::{ArmError, ServoTelemetry};

/// Asks one servo for its telemetry block.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetServoInfo {
    pub id: u8,
}

impl GetServoInfo {
    pub fn new(id: u8) -> Self {
        Self { id }
    }
}

impl Payload for GetServoInfo {
    const CODE: CommandCode = CommandCode::GetServoInfo;

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
pub struct GetServoInfoResponse {
    pub id: u8,
    pub telemetry: ServoTelemetry,
}

impl Payload for GetServoInfoResponse {
    const CODE: CommandCode = CommandCode::GetServoInfo;

    fn write_payload(&self, out: &mut Vec<u8>) {
        out.push(self.id);
        for field in self.telemetry.to_array() {
            out.extend_from_slice(&field.to_le_bytes());
        }
    }

    fn read_payload(bytes: &[u8]) -> Result<Self, ArmError> {
        let mut reader = PayloadReader::new(bytes, Self::CODE);
        let id = reader.u8()?;
        let telemetry = ServoTelemetry {
            speed: reader.i16()?,
            load: reader.i16()?,
            voltage: reader.i16()?,
            current: reader.i16()?,
        };
        reader.finish()?;
        Ok(Self { id, telemetry })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_field_order() {
        let bytes = [4, 10, 0, 0xF6, 0xFF, 120, 0, 3, 1];
        let resp = GetServoInfoResponse::read_payload(&bytes).unwrap();
        assert_eq!(resp.id, 4);
        assert_eq!(resp.telemetry.to_array(), [10, -10, 120, 259]);

        let mut out = Vec::new();
        resp.write_payload(&mut out);
        assert_eq!(out, bytes);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        assert!(GetServoInfo::read_payload(&[1, 2]).is_err());
    }
}
