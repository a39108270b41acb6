//! MultiWii Serial Protocol (MSP v1) framing.
//!
//! Every packet on the link has the same shape:
//!
//! ```text
//! '$' 'M' dir  size  command  payload[size]  checksum
//! ```
//!
//! `dir` is `<` for host requests, `>` for flight-controller replies and `!`
//! for error replies. The checksum is the XOR of `size`, `command` and every
//! payload byte. Multi-byte payload fields are little-endian.

use thiserror::Error;

/// Attitude reply: roll/pitch in tenths of a degree, heading in degrees.
pub const MSP_ATTITUDE: u8 = 108;

/// Sonars reply: forward, back, left and right distances.
pub const MSP_SONARS: u8 = 127;

/// Largest payload a v1 frame can carry (the size field is one byte).
pub const MAX_PAYLOAD: usize = u8::MAX as usize;

/// Errors raised while framing or decoding MSP packets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MspError {
    /// Payload does not fit in a v1 frame
    #[error("Payload of {0} bytes exceeds the MSP v1 limit of 255")]
    PayloadTooLarge(usize),
    
    /// Payload too short for the message it claims to be
    #[error("Command {command}: expected {expected} payload bytes, got {actual}")]
    ShortPayload {
        command: u8,
        expected: usize,
        actual: usize,
    },
}

/// Direction marker of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Host to flight controller (`<`)
    Request,
    /// Flight controller to host (`>`)
    Reply,
    /// Flight controller rejected the command (`!`)
    Error,
}

impl Direction {
    /// The byte that marks this direction on the wire.
    pub fn marker(self) -> u8 {
        match self {
            Direction::Request => b'<',
            Direction::Reply => b'>',
            Direction::Error => b'!',
        }
    }
    
    /// Parses a direction marker.
    pub fn from_marker(byte: u8) -> Option<Self> {
        match byte {
            b'<' => Some(Direction::Request),
            b'>' => Some(Direction::Reply),
            b'!' => Some(Direction::Error),
            _ => None,
        }
    }
}

/// A complete, checksum-verified packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MspFrame {
    pub direction: Direction,
    pub command: u8,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    Idle,
    HeaderM,
    Direction,
    Size,
    Command,
    Payload,
    Checksum,
}

/// Streaming byte-at-a-time MSP parser.
///
/// Garbage between frames is skipped; a frame with a bad checksum is dropped
/// and the parser waits for the next `$`.
#[derive(Debug)]
pub struct MspParser {
    state: ParserState,
    direction: Direction,
    size: usize,
    command: u8,
    payload: Vec<u8>,
    checksum: u8,
    
    /// Frames discarded because of checksum mismatches
    dropped: u64,
}

impl MspParser {
    /// Creates a parser waiting for a frame header.
    pub fn new() -> Self {
        Self {
            state: ParserState::Idle,
            direction: Direction::Reply,
            size: 0,
            command: 0,
            payload: Vec::with_capacity(MAX_PAYLOAD),
            checksum: 0,
            dropped: 0,
        }
    }
    
    /// Feeds one byte; returns a frame when this byte completes one.
    pub fn parse(&mut self, byte: u8) -> Option<MspFrame> {
        match self.state {
            ParserState::Idle => {
                if byte == b'$' {
                    self.state = ParserState::HeaderM;
                }
            }
            ParserState::HeaderM => {
                if byte == b'M' {
                    self.state = ParserState::Direction;
                } else {
                    self.resync(byte);
                }
            }
            ParserState::Direction => match Direction::from_marker(byte) {
                Some(direction) => {
                    self.direction = direction;
                    self.state = ParserState::Size;
                }
                None => self.resync(byte),
            },
            ParserState::Size => {
                self.size = byte as usize;
                self.checksum = byte;
                self.payload.clear();
                self.state = ParserState::Command;
            }
            ParserState::Command => {
                self.command = byte;
                self.checksum ^= byte;
                self.state = if self.size == 0 {
                    ParserState::Checksum
                } else {
                    ParserState::Payload
                };
            }
            ParserState::Payload => {
                self.payload.push(byte);
                self.checksum ^= byte;
                if self.payload.len() == self.size {
                    self.state = ParserState::Checksum;
                }
            }
            ParserState::Checksum => {
                self.state = ParserState::Idle;
                if byte == self.checksum {
                    return Some(MspFrame {
                        direction: self.direction,
                        command: self.command,
                        payload: std::mem::take(&mut self.payload),
                    });
                }
                self.dropped += 1;
                tracing::debug!(
                    "Dropping MSP frame {}: checksum {:#04x} != {:#04x}",
                    self.command,
                    byte,
                    self.checksum
                );
            }
        }
        None
    }
    
    /// Number of frames dropped for checksum mismatches.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
    
    /// Returns whether the parser is between frames.
    pub fn is_idle(&self) -> bool {
        self.state == ParserState::Idle
    }
    
    // A broken header may itself be the start of the next frame.
    fn resync(&mut self, byte: u8) {
        tracing::trace!("MSP header broken by {:#04x}", byte);
        self.state = if byte == b'$' {
            ParserState::HeaderM
        } else {
            ParserState::Idle
        };
    }
}

impl Default for MspParser {
    fn default() -> Self {
        Self::new()
    }
}

/// XOR checksum over size, command and payload.
pub fn checksum(command: u8, payload: &[u8]) -> u8 {
    payload
        .iter()
        .fold(payload.len() as u8 ^ command, |acc, byte| acc ^ byte)
}

/// Builds a complete frame.
pub fn serialize_frame(
    direction: Direction,
    command: u8,
    payload: &[u8],
) -> Result<Vec<u8>, MspError> {
    if payload.len() > MAX_PAYLOAD {
        return Err(MspError::PayloadTooLarge(payload.len()));
    }
    
    let mut frame = Vec::with_capacity(payload.len() + 6);
    frame.extend_from_slice(b"$M");
    frame.push(direction.marker());
    frame.push(payload.len() as u8);
    frame.push(command);
    frame.extend_from_slice(payload);
    frame.push(checksum(command, payload));
    Ok(frame)
}

/// Builds a zero-payload request for `command`.
pub fn serialize_request(command: u8) -> Vec<u8> {
    vec![b'$', b'M', b'<', 0, command, command]
}

/// Request for one sonars reply.
pub fn serialize_sonars_request() -> Vec<u8> {
    serialize_request(MSP_SONARS)
}

/// Request for one attitude reply.
pub fn serialize_attitude_request() -> Vec<u8> {
    serialize_request(MSP_ATTITUDE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    
    fn feed(parser: &mut MspParser, bytes: &[u8]) -> Vec<MspFrame> {
        bytes.iter().filter_map(|&b| parser.parse(b)).collect()
    }
    
    #[test]
    fn test_request_bytes() {
        assert_eq!(serialize_sonars_request(), vec![0x24, 0x4d, 0x3c, 0x00, 0x7f, 0x7f]);
        assert_eq!(serialize_attitude_request(), vec![0x24, 0x4d, 0x3c, 0x00, 0x6c, 0x6c]);
        assert_eq!(
            serialize_request(MSP_SONARS),
            serialize_frame(Direction::Request, MSP_SONARS, &[]).unwrap()
        );
    }
    
    #[test]
    fn test_checksum_covers_size_command_payload() {
        assert_eq!(checksum(0x10, &[]), 0x10);
        assert_eq!(checksum(0x10, &[0x01, 0x02]), 0x02 ^ 0x10 ^ 0x01 ^ 0x02);
    }
    
    #[test]
    fn test_parse_reply() {
        let bytes = serialize_frame(Direction::Reply, MSP_SONARS, &[1, 0, 2, 0, 3, 0, 4, 0]).unwrap();
        let mut parser = MspParser::new();
        
        let frames = feed(&mut parser, &bytes);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].direction, Direction::Reply);
        assert_eq!(frames[0].command, MSP_SONARS);
        assert_eq!(frames[0].payload, vec![1, 0, 2, 0, 3, 0, 4, 0]);
        assert!(parser.is_idle());
    }
    
    #[test]
    fn test_partial_frame_yields_nothing() {
        let bytes = serialize_frame(Direction::Reply, MSP_SONARS, &[1, 0, 2, 0, 3, 0, 4, 0]).unwrap();
        let mut parser = MspParser::new();
        
        assert!(feed(&mut parser, &bytes[..bytes.len() - 1]).is_empty());
        assert!(!parser.is_idle());
        
        // The final byte completes it
        assert!(parser.parse(bytes[bytes.len() - 1]).is_some());
    }
    
    #[test]
    fn test_bad_checksum_dropped() {
        let mut bytes = serialize_frame(Direction::Reply, MSP_ATTITUDE, &[0; 6]).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        
        let mut parser = MspParser::new();
        assert!(feed(&mut parser, &bytes).is_empty());
        assert_eq!(parser.dropped(), 1);
        
        // Next good frame still parses
        let good = serialize_frame(Direction::Reply, MSP_ATTITUDE, &[0; 6]).unwrap();
        assert_eq!(feed(&mut parser, &good).len(), 1);
    }
    
    #[test]
    fn test_error_direction_is_framed() {
        let bytes = serialize_frame(Direction::Error, 200, &[]).unwrap();
        let frames = feed(&mut MspParser::new(), &bytes);
        assert_eq!(frames[0].direction, Direction::Error);
        assert_eq!(frames[0].command, 200);
    }
    
    #[test]
    fn test_dollar_inside_broken_header_restarts_frame() {
        let mut bytes = b"$$".to_vec();
        bytes.extend(&serialize_frame(Direction::Reply, MSP_SONARS, &[0; 8]).unwrap()[1..]);
        assert_eq!(feed(&mut MspParser::new(), &bytes).len(), 1);
    }
    
    #[test]
    fn test_payload_too_large() {
        let payload = vec![0u8; 256];
        assert_eq!(
            serialize_frame(Direction::Reply, 1, &payload),
            Err(MspError::PayloadTooLarge(256))
        );
    }
    
    proptest! {
        #[test]
        fn prop_resyncs_after_garbage(
            garbage in proptest::collection::vec(any::<u8>().prop_filter("no header", |b| *b != b'$'), 0..64),
            payload in proptest::collection::vec(any::<u8>(), 0..32),
            command in any::<u8>(),
        ) {
            let mut stream = garbage;
            stream.extend(serialize_frame(Direction::Reply, command, &payload).unwrap());
            
            let frames = feed(&mut MspParser::new(), &stream);
            prop_assert_eq!(frames.len(), 1);
            prop_assert_eq!(frames[0].command, command);
            prop_assert_eq!(&frames[0].payload, &payload);
        }
    }
}
