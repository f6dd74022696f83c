//! Byte framing for the servo board link.
//!
//! ```text
//! 0x55 0xAA | len | type | cmd | payload ... | checksum | 0x7D
//! ```
//!
//! `len` counts `type`, `cmd` and the payload. The checksum is the low byte
//! of the sum of those same bytes.

use serde::{Deserialize, Serialize};

use super::{CommandCode, FrameType};
use crate::{ArmError, MAX_INDEXED_SERVOS};

pub const FRAME_HEADER: [u8; 2] = [0x55, 0xAA];
pub const FRAME_TAIL: u8 = 0x7D;
/// Header, length byte, checksum and tail.
const FRAME_OVERHEAD: usize = 5;
/// Largest payload any command carries: a by-id write of six servos
/// (count byte plus id and i16 angle each).
pub const MAX_PAYLOAD: usize = 1 + MAX_INDEXED_SERVOS * 3;
/// Largest legal `len` byte.
const MAX_BODY: usize = MAX_PAYLOAD + 2;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub frame_type: FrameType,
    pub command: CommandCode,
    pub payload: Vec<u8>,
}

fn checksum(body: &[u8]) -> u8 {
    body.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

impl Frame {
    pub fn new(frame_type: FrameType, command: CommandCode, payload: Vec<u8>) -> Self {
        Self {
            frame_type,
            command,
            payload,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, ArmError> {
        if self.payload.len() > MAX_PAYLOAD {
            return Err(ArmError::MalformedFrame(format!(
                "payload of {} bytes does not fit in a frame",
                self.payload.len()
            )));
        }
        let mut body = Vec::with_capacity(self.payload.len() + 2);
        body.push(self.frame_type as u8);
        body.push(self.command as u8);
        body.extend_from_slice(&self.payload);

        let mut out = Vec::with_capacity(body.len() + FRAME_OVERHEAD);
        out.extend_from_slice(&FRAME_HEADER);
        out.push(body.len() as u8);
        out.extend_from_slice(&body);
        out.push(checksum(&body));
        out.push(FRAME_TAIL);
        Ok(out)
    }
}

/// Incremental decoder for a byte stream that may split, merge or corrupt frames.
///
/// Bytes before a header are skipped. A frame with an impossible length,
/// bad checksum, bad tail or unknown type/command is reported once and the
/// decoder resynchronises on the next header.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// `None` means more bytes are needed.
    pub fn next_frame(&mut self) -> Option<Result<Frame, ArmError>> {
        let start = self.buffer.windows(2).position(|w| w == FRAME_HEADER);
        match start {
            Some(start) => {
                self.buffer.drain(..start);
            }
            None => {
                // Keep a trailing 0x55 that may begin the next header.
                let keep = usize::from(self.buffer.last() == Some(&FRAME_HEADER[0]));
                let drop = self.buffer.len() - keep;
                self.buffer.drain(..drop);
                return None;
            }
        }

        let len = usize::from(*self.buffer.get(2)?);
        if !(2..=MAX_BODY).contains(&len) {
            self.buffer.drain(..1);
            return Some(Err(ArmError::MalformedFrame(format!(
                "length byte {} is outside 2..={}",
                len, MAX_BODY
            ))));
        }
        let total = len + FRAME_OVERHEAD;
        if self.buffer.len() < total {
            return None;
        }

        let body = &self.buffer[3..3 + len];
        let expected = checksum(body);
        let got = self.buffer[3 + len];
        let tail = self.buffer[total - 1];
        if tail != FRAME_TAIL || got != expected {
            let err = ArmError::MalformedFrame(format!(
                "checksum {:#04x} (expected {:#04x}), tail {:#04x}",
                got, expected, tail
            ));
            self.buffer.drain(..1);
            return Some(Err(err));
        }

        let parsed = match (FrameType::try_from(body[0]), CommandCode::try_from(body[1])) {
            (Ok(frame_type), Ok(command)) => Ok(Frame::new(frame_type, command, body[2..].to_vec())),
            (Err(_), _) => Err(ArmError::MalformedFrame(format!("unknown frame type {:#04x}", body[0]))),
            (_, Err(_)) => Err(ArmError::MalformedFrame(format!("unknown command {:#04x}", body[1]))),
        };
        self.buffer.drain(..total);
        Some(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Frame {
        Frame::new(FrameType::Response, CommandCode::ReadPosition, vec![3, 0x10, 0xFF])
    }

    #[test]
    fn test_encode_layout() {
        let bytes = sample().encode().unwrap();
        assert_eq!(
            bytes,
            vec![0x55, 0xAA, 5, 0x02, 0x14, 3, 0x10, 0xFF, (0x02u8 + 0x14 + 3 + 0x10).wrapping_add(0xFF), 0x7D]
        );
    }

    #[test]
    fn test_decoder_handles_split_and_merged_frames() {
        let bytes = sample().encode().unwrap();
        let mut stream = vec![0x00, 0x13];
        stream.extend_from_slice(&bytes);
        stream.extend_from_slice(&bytes);

        let mut decoder = FrameDecoder::new();
        let (first, rest) = stream.split_at(6);
        decoder.push(first);
        assert!(decoder.next_frame().is_none());
        decoder.push(rest);
        assert_eq!(decoder.next_frame().unwrap().unwrap(), sample());
        assert_eq!(decoder.next_frame().unwrap().unwrap(), sample());
        assert!(decoder.next_frame().is_none());
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn test_decoder_resyncs_after_corruption() {
        let mut corrupt = sample().encode().unwrap();
        let checksum_at = corrupt.len() - 2;
        corrupt[checksum_at] ^= 0xFF;
        corrupt.extend_from_slice(&sample().encode().unwrap());

        let mut decoder = FrameDecoder::new();
        decoder.push(&corrupt);
        assert!(matches!(decoder.next_frame(), Some(Err(ArmError::MalformedFrame(_)))));
        assert_eq!(decoder.next_frame().unwrap().unwrap(), sample());
    }

    #[test]
    fn test_unknown_command_is_reported_and_skipped() {
        let body = [0x02u8, 0x7F];
        let mut bytes = vec![0x55, 0xAA, 2];
        bytes.extend_from_slice(&body);
        bytes.push(0x02 + 0x7F);
        bytes.push(0x7D);
        bytes.extend_from_slice(&sample().encode().unwrap());

        let mut decoder = FrameDecoder::new();
        decoder.push(&bytes);
        assert!(matches!(decoder.next_frame(), Some(Err(_))));
        assert_eq!(decoder.next_frame().unwrap().unwrap(), sample());
    }

    #[test]
    fn test_garbage_without_header_is_dropped() {
        let mut decoder = FrameDecoder::new();
        decoder.push(&[1, 2, 3, 0x55]);
        assert!(decoder.next_frame().is_none());
        assert_eq!(decoder.buffered(), 1);
        decoder.push(&sample().encode().unwrap()[1..]);
        assert_eq!(decoder.next_frame().unwrap().unwrap(), sample());
    }

    #[test]
    fn test_noise_header_with_huge_length_does_not_hold_back_replies() {
        let mut bytes = vec![0x55, 0xAA, 0xF0];
        bytes.extend_from_slice(&sample().encode().unwrap());

        let mut decoder = FrameDecoder::new();
        decoder.push(&bytes);
        assert!(matches!(decoder.next_frame(), Some(Err(ArmError::MalformedFrame(_)))));
        assert_eq!(decoder.next_frame().unwrap().unwrap(), sample());
        assert!(decoder.next_frame().is_none());
    }

    #[test]
    fn test_largest_by_id_write_fits() {
        let frame = Frame::new(FrameType::Request, CommandCode::SetPositionsById, vec![0; MAX_PAYLOAD]);
        let mut decoder = FrameDecoder::new();
        decoder.push(&frame.encode().unwrap());
        assert_eq!(decoder.next_frame().unwrap().unwrap(), frame);
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let frame = Frame::new(FrameType::Request, CommandCode::SetPositionsById, vec![0; 300]);
        assert!(frame.encode().is_err());
    }
}
