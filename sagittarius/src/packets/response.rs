use serde::{Deserialize, Serialize};

use super::{CommandCode, Frame, FrameType, Payload};
use crate::commands::*;
use crate::ArmError;

/// Replies the servo board sends back. Only queries are answered.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "Response")]
pub enum ServoResponse {
    ServoInfo(GetServoInfoResponse),
    Position(ReadPositionResponse),
}

impl ServoResponse {
    pub fn command(&self) -> CommandCode {
        match self {
            ServoResponse::ServoInfo(_) => CommandCode::GetServoInfo,
            ServoResponse::Position(_) => CommandCode::ReadPosition,
        }
    }

    /// Id of the servo that answered.
    pub fn id(&self) -> u8 {
        match self {
            ServoResponse::ServoInfo(r) => r.id,
            ServoResponse::Position(r) => r.id,
        }
    }

    pub fn to_frame(&self) -> Frame {
        let mut bytes = Vec::new();
        match self {
            ServoResponse::ServoInfo(r) => r.write_payload(&mut bytes),
            ServoResponse::Position(r) => r.write_payload(&mut bytes),
        }
        Frame::new(FrameType::Response, self.command(), bytes)
    }

    pub fn encode(&self) -> Result<Vec<u8>, ArmError> {
        self.to_frame().encode()
    }

    pub fn from_frame(frame: &Frame) -> Result<Self, ArmError> {
        if frame.frame_type != FrameType::Response {
            return Err(ArmError::MalformedFrame(format!(
                "expected a response frame, got {:?}",
                frame.frame_type
            )));
        }
        let p = frame.payload.as_slice();
        match frame.command {
            CommandCode::GetServoInfo => Ok(ServoResponse::ServoInfo(GetServoInfoResponse::read_payload(p)?)),
            CommandCode::ReadPosition => Ok(ServoResponse::Position(ReadPositionResponse::read_payload(p)?)),
            other => Err(ArmError::MalformedFrame(format!("{:?} has no response form", other))),
        }
    }
}

impl_extract_inner!(ServoResponse, ServoInfo, GetServoInfoResponse);
impl_extract_inner!(ServoResponse, Position, ReadPositionResponse);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExtractInner;

    #[test]
    fn test_extract_inner_picks_matching_variant() {
        let response = ServoResponse::Position(ReadPositionResponse { id: 3, tenth_degrees: -450 });
        let info: Option<&GetServoInfoResponse> = response.as_inner();
        assert!(info.is_none());
        let position: Option<ReadPositionResponse> = response.into_inner();
        assert_eq!(position.map(|p| p.tenth_degrees), Some(-450));
    }

    #[test]
    fn test_write_command_has_no_response() {
        let frame = Frame::new(FrameType::Response, CommandCode::SetVelocity, vec![]);
        assert!(matches!(ServoResponse::from_frame(&frame), Err(ArmError::MalformedFrame(_))));
    }
}
