use serde::{Deserialize, Serialize};

use super::{CommandCode, Frame, FrameType, Payload};
use crate::commands::*;
use crate::ArmError;

/// Everything the host can put on the bus.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "Command")]
pub enum ServoRequest {
    SetAllPositions(SetAllPositions),
    SetPositionsById(SetPositionsById),
    ControlTorque(ControlTorque),
    GetServoInfo(GetServoInfo),
    ReadPosition(ReadPosition),
    SetVelocity(SetVelocity),
    SetAcceleration(SetAcceleration),
    SetTorqueLimits(SetTorqueLimits),
}

fn frame_of<P: Payload>(payload: &P) -> Frame {
    let mut bytes = Vec::new();
    payload.write_payload(&mut bytes);
    Frame::new(FrameType::Request, P::CODE, bytes)
}

impl ServoRequest {
    pub fn command(&self) -> CommandCode {
        match self {
            ServoRequest::SetAllPositions(_) => CommandCode::SetAllPositions,
            ServoRequest::SetPositionsById(_) => CommandCode::SetPositionsById,
            ServoRequest::ControlTorque(_) => CommandCode::ControlTorque,
            ServoRequest::GetServoInfo(_) => CommandCode::GetServoInfo,
            ServoRequest::ReadPosition(_) => CommandCode::ReadPosition,
            ServoRequest::SetVelocity(_) => CommandCode::SetVelocity,
            ServoRequest::SetAcceleration(_) => CommandCode::SetAcceleration,
            ServoRequest::SetTorqueLimits(_) => CommandCode::SetTorqueLimits,
        }
    }

    pub fn to_frame(&self) -> Frame {
        match self {
            ServoRequest::SetAllPositions(p) => frame_of(p),
            ServoRequest::SetPositionsById(p) => frame_of(p),
            ServoRequest::ControlTorque(p) => frame_of(p),
            ServoRequest::GetServoInfo(p) => frame_of(p),
            ServoRequest::ReadPosition(p) => frame_of(p),
            ServoRequest::SetVelocity(p) => frame_of(p),
            ServoRequest::SetAcceleration(p) => frame_of(p),
            ServoRequest::SetTorqueLimits(p) => frame_of(p),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, ArmError> {
        self.to_frame().encode()
    }

    pub fn from_frame(frame: &Frame) -> Result<Self, ArmError> {
        if frame.frame_type != FrameType::Request {
            return Err(ArmError::MalformedFrame(format!(
                "expected a request frame, got {:?}",
                frame.frame_type
            )));
        }
        let p = frame.payload.as_slice();
        Ok(match frame.command {
            CommandCode::SetAllPositions => ServoRequest::SetAllPositions(SetAllPositions::read_payload(p)?),
            CommandCode::SetPositionsById => ServoRequest::SetPositionsById(SetPositionsById::read_payload(p)?),
            CommandCode::ControlTorque => ServoRequest::ControlTorque(ControlTorque::read_payload(p)?),
            CommandCode::GetServoInfo => ServoRequest::GetServoInfo(GetServoInfo::read_payload(p)?),
            CommandCode::ReadPosition => ServoRequest::ReadPosition(ReadPosition::read_payload(p)?),
            CommandCode::SetVelocity => ServoRequest::SetVelocity(SetVelocity::read_payload(p)?),
            CommandCode::SetAcceleration => ServoRequest::SetAcceleration(SetAcceleration::read_payload(p)?),
            CommandCode::SetTorqueLimits => ServoRequest::SetTorqueLimits(SetTorqueLimits::read_payload(p)?),
        })
    }

    /// Servo the request is addressed to, for single-servo queries.
    pub fn target_id(&self) -> Option<u8> {
        match self {
            ServoRequest::GetServoInfo(q) => Some(q.id),
            ServoRequest::ReadPosition(q) => Some(q.id),
            _ => None,
        }
    }
}

impl_extract_inner!(ServoRequest, SetAllPositions, SetAllPositions);
impl_extract_inner!(ServoRequest, SetPositionsById, SetPositionsById);
impl_extract_inner!(ServoRequest, ControlTorque, ControlTorque);
impl_extract_inner!(ServoRequest, GetServoInfo, GetServoInfo);
impl_extract_inner!(ServoRequest, ReadPosition, ReadPosition);
impl_extract_inner!(ServoRequest, SetVelocity, SetVelocity);
impl_extract_inner!(ServoRequest, SetAcceleration, SetAcceleration);
impl_extract_inner!(ServoRequest, SetTorqueLimits, SetTorqueLimits);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packets::FrameDecoder;
    use crate::{ExtractInner, TorqueMode};

    #[test]
    fn test_request_survives_the_wire() {
        let request = ServoRequest::ControlTorque(ControlTorque::new(TorqueMode::Free));
        let mut decoder = FrameDecoder::new();
        decoder.push(&request.encode().unwrap());
        let frame = decoder.next_frame().unwrap().unwrap();
        let decoded = ServoRequest::from_frame(&frame).unwrap();
        let inner: Option<&ControlTorque> = decoded.as_inner();
        assert_eq!(inner.map(|c| c.mode), Some(TorqueMode::Free));
    }

    #[test]
    fn test_response_frame_is_not_a_request() {
        let frame = Frame::new(FrameType::Response, CommandCode::ReadPosition, vec![1]);
        assert!(ServoRequest::from_frame(&frame).is_err());
    }
}
