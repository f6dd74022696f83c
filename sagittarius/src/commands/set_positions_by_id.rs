use serde::{Deserialize, Serialize};

use crate::packets::{CommandCode, Payload, PayloadReader};
use crate::ArmError;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoPosition {
    pub id: u8,
    pub tenth_degrees: i16,
}

/// Moves an explicit subset of servos, gripper included.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SetPositionsById {
    pub positions: Vec<ServoPosition>,
}

impl SetPositionsById {
    pub fn new(positions: Vec<ServoPosition>) -> Self {
        Self { positions }
    }
}

impl Payload for SetPositionsById {
    const CODE: CommandCode = CommandCode::SetPositionsById;

    fn write_payload(&self, out: &mut Vec<u8>) {
        out.push(self.positions.len() as u8);
        for p in &self.positions {
            out.push(p.id);
            out.extend_from_slice(&p.tenth_degrees.to_le_bytes());
        }
    }

    fn read_payload(bytes: &[u8]) -> Result<Self, ArmError> {
        let mut reader = PayloadReader::new(bytes, Self::CODE);
        let count = reader.u8()?;
        let mut positions = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let id = reader.u8()?;
            let tenth_degrees = reader.i16()?;
            positions.push(ServoPosition { id, tenth_degrees });
        }
        reader.finish()?;
        Ok(Self { positions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_layout() {
        let cmd = SetPositionsById::new(vec![
            ServoPosition { id: 2, tenth_degrees: 300 },
            ServoPosition { id: 7, tenth_degrees: -5 },
        ]);
        let mut out = Vec::new();
        cmd.write_payload(&mut out);
        assert_eq!(out, vec![2, 2, 0x2C, 0x01, 7, 0xFB, 0xFF]);
        assert_eq!(SetPositionsById::read_payload(&out).unwrap(), cmd);
    }

    #[test]
    fn test_count_larger_than_body_is_malformed() {
        assert!(SetPositionsById::read_payload(&[3, 1, 0, 0]).is_err());
    }
}
