mod frame;
mod request;
mod response;

pub use frame::*;
pub use request::*;
pub use response::*;

use int_enum::IntEnum;
use serde::{Deserialize, Serialize};

use crate::ArmError;

/// Direction of a frame on the bus.
#[repr(u8)]
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, IntEnum)]
pub enum FrameType {
    /// Host to servo board.
    Request = 0x01,
    /// Servo board to host.
    Response = 0x02,
}

/// Command byte carried in every frame.
#[repr(u8)]
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, IntEnum)]
pub enum CommandCode {
    SetAllPositions = 0x10,
    SetPositionsById = 0x11,
    ControlTorque = 0x12,
    GetServoInfo = 0x13,
    ReadPosition = 0x14,
    SetVelocity = 0x15,
    SetAcceleration = 0x16,
    SetTorqueLimits = 0x17,
}

/// A command body that knows its command byte and little-endian layout.
pub trait Payload: Sized {
    const CODE: CommandCode;

    fn write_payload(&self, out: &mut Vec<u8>);

    fn read_payload(bytes: &[u8]) -> Result<Self, ArmError>;
}

/// Cursor over a payload that reports short reads as malformed frames.
pub(crate) struct PayloadReader<'a> {
    bytes: &'a [u8],
    command: CommandCode,
}

impl<'a> PayloadReader<'a> {
    pub(crate) fn new(bytes: &'a [u8], command: CommandCode) -> Self {
        Self { bytes, command }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], ArmError> {
        if self.bytes.len() < N {
            return Err(ArmError::MalformedFrame(format!(
                "{:?} payload is truncated",
                self.command
            )));
        }
        let (head, rest) = self.bytes.split_at(N);
        self.bytes = rest;
        let mut out = [0u8; N];
        out.copy_from_slice(head);
        Ok(out)
    }

    pub(crate) fn u8(&mut self) -> Result<u8, ArmError> {
        Ok(self.take::<1>()?[0])
    }

    pub(crate) fn u16(&mut self) -> Result<u16, ArmError> {
        Ok(u16::from_le_bytes(self.take::<2>()?))
    }

    pub(crate) fn i16(&mut self) -> Result<i16, ArmError> {
        Ok(i16::from_le_bytes(self.take::<2>()?))
    }

    /// Fails if unread bytes remain.
    pub(crate) fn finish(self) -> Result<(), ArmError> {
        if self.bytes.is_empty() {
            Ok(())
        } else {
            Err(ArmError::MalformedFrame(format!(
                "{:?} payload has {} trailing bytes",
                self.command,
                self.bytes.len()
            )))
        }
    }
}
