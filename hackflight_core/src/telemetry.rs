//! Telemetry messages carried in MSP reply frames.

use crate::msp::{serialize_frame, Direction, MspError, MspFrame, MSP_ATTITUDE, MSP_SONARS};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Distances reported by the four ultrasonic sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SonarReading {
    pub forward: i16,
    pub back: i16,
    pub left: i16,
    pub right: i16,
}

impl SonarReading {
    /// Payload length on the wire.
    pub const PAYLOAD_LEN: usize = 8;
    
    pub fn new(forward: i16, back: i16, left: i16, right: i16) -> Self {
        Self { forward, back, left, right }
    }
    
    /// Decodes the little-endian sonars payload.
    pub fn decode(payload: &[u8]) -> Result<Self, MspError> {
        let [forward, back, left, right] = read_i16s::<4>(MSP_SONARS, payload)?;
        Ok(Self { forward, back, left, right })
    }
    
    /// Encodes the little-endian sonars payload.
    pub fn encode(&self) -> [u8; 8] {
        write_i16s([self.forward, self.back, self.left, self.right])
    }
}

impl fmt::Display for SonarReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sonars: forward: {}   back: {}  left: {}  right: {}",
            self.forward, self.back, self.left, self.right
        )
    }
}

/// Vehicle attitude as reported by the flight controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attitude {
    /// Roll in tenths of a degree
    pub angx: i16,
    /// Pitch in tenths of a degree
    pub angy: i16,
    /// Heading in degrees
    pub heading: i16,
}

impl Attitude {
    pub const PAYLOAD_LEN: usize = 6;
    
    pub fn decode(payload: &[u8]) -> Result<Self, MspError> {
        let [angx, angy, heading] = read_i16s::<3>(MSP_ATTITUDE, payload)?;
        Ok(Self { angx, angy, heading })
    }
    
    pub fn encode(&self) -> [u8; 6] {
        write_i16s([self.angx, self.angy, self.heading])
    }
}

impl fmt::Display for Attitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Attitude: angx: {}  angy: {}  heading: {}",
            self.angx, self.angy, self.heading
        )
    }
}

/// A decoded reply frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Sonars(SonarReading),
    Attitude(Attitude),
    /// Any command this crate does not interpret
    Other { command: u8, payload: Vec<u8> },
}

impl Message {
    /// Interprets a frame's payload by command id.
    pub fn decode(frame: &MspFrame) -> Result<Self, MspError> {
        match frame.command {
            MSP_SONARS => SonarReading::decode(&frame.payload).map(Message::Sonars),
            MSP_ATTITUDE => Attitude::decode(&frame.payload).map(Message::Attitude),
            command => Ok(Message::Other {
                command,
                payload: frame.payload.clone(),
            }),
        }
    }
    
    /// MSP command id of this message.
    pub fn command(&self) -> u8 {
        match self {
            Message::Sonars(_) => MSP_SONARS,
            Message::Attitude(_) => MSP_ATTITUDE,
            Message::Other { command, .. } => *command,
        }
    }
}

/// Builds the reply frame a flight controller sends for a sonars request.
pub fn serialize_sonars_reply(reading: &SonarReading) -> Vec<u8> {
    reply(MSP_SONARS, &reading.encode())
}

/// Builds the reply frame a flight controller sends for an attitude request.
pub fn serialize_attitude_reply(attitude: &Attitude) -> Vec<u8> {
    reply(MSP_ATTITUDE, &attitude.encode())
}

fn reply(command: u8, payload: &[u8]) -> Vec<u8> {
    // Fixed-size payloads always fit in a v1 frame
    serialize_frame(Direction::Reply, command, payload).unwrap_or_default()
}

fn read_i16s<const N: usize>(command: u8, payload: &[u8]) -> Result<[i16; N], MspError> {
    if payload.len() < N * 2 {
        return Err(MspError::ShortPayload {
            command,
            expected: N * 2,
            actual: payload.len(),
        });
    }
    let mut out = [0i16; N];
    for (value, bytes) in out.iter_mut().zip(payload.chunks_exact(2)) {
        *value = i16::from_le_bytes([bytes[0], bytes[1]]);
    }
    Ok(out)
}

fn write_i16s<const N: usize, const M: usize>(values: [i16; N]) -> [u8; M] {
    let mut out = [0u8; M];
    for (bytes, value) in out.chunks_exact_mut(2).zip(values) {
        bytes.copy_from_slice(&value.to_le_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msp::MspParser;
    
    fn parse_all(bytes: &[u8]) -> Vec<MspFrame> {
        let mut parser = MspParser::new();
        bytes.iter().filter_map(|&b| parser.parse(b)).collect()
    }
    
    #[test]
    fn test_sonars_reply_decodes() {
        let reading = SonarReading::new(120, -1, 300, 45);
        let frames = parse_all(&serialize_sonars_reply(&reading));
        
        assert_eq!(Message::decode(&frames[0]).unwrap(), Message::Sonars(reading));
    }
    
    #[test]
    fn test_sonars_payload_is_little_endian() {
        let payload = SonarReading::new(0x0102, 0, 0, -2).encode();
        assert_eq!(payload, [0x02, 0x01, 0, 0, 0, 0, 0xfe, 0xff]);
    }
    
    #[test]
    fn test_attitude_reply_decodes() {
        let attitude = Attitude { angx: -45, angy: 12, heading: 270 };
        let frames = parse_all(&serialize_attitude_reply(&attitude));
        
        let message = Message::decode(&frames[0]).unwrap();
        assert_eq!(message, Message::Attitude(attitude));
        assert_eq!(message.command(), MSP_ATTITUDE);
    }
    
    #[test]
    fn test_short_payload_rejected() {
        let frame = MspFrame {
            direction: Direction::Reply,
            command: MSP_SONARS,
            payload: vec![1, 0, 2],
        };
        assert_eq!(
            Message::decode(&frame),
            Err(MspError::ShortPayload { command: MSP_SONARS, expected: 8, actual: 3 })
        );
    }
    
    #[test]
    fn test_unknown_command_passes_through() {
        let frame = MspFrame {
            direction: Direction::Reply,
            command: 101,
            payload: vec![9, 9],
        };
        assert_eq!(
            Message::decode(&frame).unwrap(),
            Message::Other { command: 101, payload: vec![9, 9] }
        );
    }
    
    #[test]
    fn test_display_formats() {
        let reading = SonarReading::new(1, 2, 3, 4);
        assert_eq!(reading.to_string(), "Sonars: forward: 1   back: 2  left: 3  right: 4");
        
        let attitude = Attitude { angx: 5, angy: 6, heading: 7 };
        assert_eq!(attitude.to_string(), "Attitude: angx: 5  angy: 6  heading: 7");
    }
}
