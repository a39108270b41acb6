//! Telemetry echo loop: request sonars, print each reply, request again.
//!
//! The request/response cadence is driven entirely by the flight
//! controller's reply timing. `EchoLoop` owns the link, the parser and the
//! pre-built request packets, so the reply handler needs no global state.

use crate::msp::{
    serialize_attitude_request, serialize_sonars_request, Direction, MspError, MspParser, MSP_ATTITUDE,
    MSP_SONARS,
};
use crate::telemetry::Message;
use hackflight_env::{ByteTransport, EnvError, Interrupt};
use std::io::Write;
use thiserror::Error;
use tracing::{debug, info, trace};

/// Failures that end the echo loop.
#[derive(Debug, Error)]
pub enum EchoError {
    /// The serial link failed
    #[error("Link error: {0}")]
    Link(#[from] EnvError),
    
    /// A reply frame could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] MspError),
    
    /// Writing the printed reading failed
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

/// Counters for one echo session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EchoStats {
    pub bytes_read: u64,
    pub frames: u64,
    pub sonars_replies: u64,
    pub attitude_replies: u64,
    pub requests_sent: u64,
}

/// Echo loop context.
pub struct EchoLoop<T: ByteTransport, W: Write> {
    transport: T,
    output: W,
    parser: MspParser,
    sonars_request: Vec<u8>,
    attitude_request: Vec<u8>,
    
    /// Also poll and print attitude
    attitude: bool,
    
    stats: EchoStats,
}

impl<T: ByteTransport, W: Write> EchoLoop<T, W> {
    /// Creates a loop over `transport` printing readings to `output`.
    pub fn new(transport: T, output: W) -> Self {
        Self {
            transport,
            output,
            parser: MspParser::new(),
            sonars_request: serialize_sonars_request(),
            attitude_request: serialize_attitude_request(),
            attitude: false,
            stats: EchoStats::default(),
        }
    }
    
    /// Enables the attitude request/print cycle next to sonars.
    pub fn with_attitude(mut self, enabled: bool) -> Self {
        self.attitude = enabled;
        self
    }
    
    /// Sends the initial request(s).
    pub fn start(&mut self) -> Result<(), EchoError> {
        debug!("Requesting sonars on {}", self.transport.name());
        self.send_sonars_request()?;
        if self.attitude {
            self.send_attitude_request()?;
        }
        Ok(())
    }
    
    /// Feeds one byte to the parser and handles a completed reply.
    ///
    /// A sonars reply is printed and answered with exactly one new sonars
    /// request. Replies without a handler are passed back undecoded as
    /// `Message::Other`. Returns the message, if this byte completed one.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Message>, EchoError> {
        let Some(frame) = self.parser.parse(byte) else {
            return Ok(None);
        };
        self.stats.frames += 1;
        
        if frame.direction != Direction::Reply {
            debug!("Ignoring {:?} frame for command {}", frame.direction, frame.command);
            return Ok(None);
        }
        
        // Only payloads with a handler are decoded
        let handled = frame.command == MSP_SONARS || (self.attitude && frame.command == MSP_ATTITUDE);
        if !handled {
            trace!("No handler for command {}", frame.command);
            return Ok(Some(Message::Other {
                command: frame.command,
                payload: frame.payload,
            }));
        }
        
        let message = Message::decode(&frame)?;
        match &message {
            Message::Sonars(reading) => {
                self.stats.sonars_replies += 1;
                writeln!(self.output, "{reading}")?;
                self.send_sonars_request()?;
            }
            Message::Attitude(attitude) => {
                self.stats.attitude_replies += 1;
                writeln!(self.output, "{attitude}")?;
                self.send_attitude_request()?;
            }
            Message::Other { .. } => {}
        }
        Ok(Some(message))
    }
    
    /// Reads one byte (if any arrived) and feeds it.
    pub fn poll(&mut self) -> Result<Option<Message>, EchoError> {
        match self.transport.read_byte()? {
            Some(byte) => {
                self.stats.bytes_read += 1;
                self.feed(byte)
            }
            None => Ok(None),
        }
    }
    
    /// Starts the cadence and runs until `interrupt` is raised.
    pub fn run(&mut self, interrupt: &Interrupt) -> Result<EchoStats, EchoError> {
        self.start()?;
        while !interrupt.is_raised() {
            self.poll()?;
        }
        
        info!(
            "Echo loop stopped: {} bytes, {} frames, {} sonars replies, {} requests ({} dropped)",
            self.stats.bytes_read,
            self.stats.frames,
            self.stats.sonars_replies,
            self.stats.requests_sent,
            self.parser.dropped()
        );
        Ok(self.stats)
    }
    
    pub fn stats(&self) -> EchoStats {
        self.stats
    }
    
    pub fn transport(&self) -> &T {
        &self.transport
    }
    
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
    
    /// Releases the link and the output writer.
    pub fn into_parts(self) -> (T, W) {
        (self.transport, self.output)
    }
    
    fn send_sonars_request(&mut self) -> Result<(), EchoError> {
        self.transport.write_all(&self.sonars_request)?;
        self.stats.requests_sent += 1;
        Ok(())
    }
    
    fn send_attitude_request(&mut self) -> Result<(), EchoError> {
        self.transport.write_all(&self.attitude_request)?;
        self.stats.requests_sent += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msp::{serialize_frame, serialize_request, MSP_ATTITUDE, MSP_SONARS};
    use crate::telemetry::{serialize_attitude_reply, serialize_sonars_reply, Attitude, SonarReading};
    use hackflight_env::MemoryTransport;
    
    fn echo_with(input: &[u8]) -> EchoLoop<MemoryTransport, Vec<u8>> {
        EchoLoop::new(MemoryTransport::with_input(input), Vec::new())
    }
    
    fn drain(echo: &mut EchoLoop<MemoryTransport, Vec<u8>>) -> Vec<Message> {
        let mut messages = Vec::new();
        while echo.transport().pending_input() > 0 {
            if let Some(message) = echo.poll().unwrap() {
                messages.push(message);
            }
        }
        messages
    }
    
    #[test]
    fn test_start_sends_one_sonars_request() {
        let mut echo = echo_with(&[]);
        echo.start().unwrap();
        
        assert_eq!(echo.transport().writes(), &[serialize_request(MSP_SONARS)]);
    }
    
    #[test]
    fn test_one_reply_fires_once_and_requests_once() {
        let reading = SonarReading::new(150, 20, 33, 400);
        let mut echo = echo_with(&serialize_sonars_reply(&reading));
        
        let messages = drain(&mut echo);
        assert_eq!(messages, vec![Message::Sonars(reading)]);
        assert_eq!(echo.transport().writes(), &[serialize_request(MSP_SONARS)]);
        
        let (_, output) = echo.into_parts();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Sonars: forward: 150   back: 20  left: 33  right: 400\n"
        );
    }
    
    #[test]
    fn test_partial_reply_does_nothing() {
        let bytes = serialize_sonars_reply(&SonarReading::new(1, 2, 3, 4));
        let mut echo = echo_with(&bytes[..bytes.len() - 1]);
        
        assert!(drain(&mut echo).is_empty());
        assert_eq!(echo.transport().write_count(), 0);
        assert_eq!(echo.stats().sonars_replies, 0);
        
        let (_, output) = echo.into_parts();
        assert!(output.is_empty());
    }
    
    #[test]
    fn test_attitude_ignored_unless_enabled() {
        let attitude = Attitude { angx: 1, angy: 2, heading: 3 };
        let mut echo = echo_with(&serialize_attitude_reply(&attitude));
        
        assert_eq!(
            drain(&mut echo),
            vec![Message::Other {
                command: MSP_ATTITUDE,
                payload: attitude.encode().to_vec(),
            }]
        );
        assert_eq!(echo.transport().write_count(), 0);
        assert!(echo.into_parts().1.is_empty());
    }
    
    #[test]
    fn test_malformed_unhandled_reply_is_skipped() {
        let mut input = serialize_frame(Direction::Reply, MSP_ATTITUDE, &[1, 2]).unwrap();
        input.extend(serialize_sonars_reply(&SonarReading { forward: 5, back: 6, left: 7, right: 8 }));
        let mut echo = echo_with(&input);
        
        let messages = drain(&mut echo);
        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages[0],
            Message::Other {
                command: MSP_ATTITUDE,
                payload: vec![1, 2],
            }
        );
        assert_eq!(echo.stats().sonars_replies, 1);
        assert_eq!(echo.stats().attitude_replies, 0);
    }
    
    #[test]
    fn test_attitude_cycle_when_enabled() {
        let attitude = Attitude { angx: 1, angy: 2, heading: 3 };
        let mut echo = echo_with(&serialize_attitude_reply(&attitude)).with_attitude(true);
        echo.start().unwrap();
        drain(&mut echo);
        
        let writes = echo.transport().writes().to_vec();
        assert_eq!(
            writes,
            vec![
                serialize_request(MSP_SONARS),
                serialize_request(MSP_ATTITUDE),
                serialize_request(MSP_ATTITUDE),
            ]
        );
        assert_eq!(echo.stats().attitude_replies, 1);
    }
    
    #[test]
    fn test_requests_from_peer_are_ignored() {
        let mut echo = echo_with(&serialize_request(MSP_SONARS));
        assert!(drain(&mut echo).is_empty());
        assert_eq!(echo.stats().frames, 1);
        assert_eq!(echo.transport().write_count(), 0);
    }
    
    #[test]
    fn test_short_sonars_payload_propagates() {
        let bytes = serialize_frame(Direction::Reply, MSP_SONARS, &[1, 2]).unwrap();
        let mut echo = echo_with(&bytes);
        
        let result = (0..bytes.len()).try_for_each(|_| echo.poll().map(|_| ()));
        assert!(matches!(result, Err(EchoError::Decode(_))));
    }
    
    #[test]
    fn test_run_stops_on_interrupt() {
        let interrupt = Interrupt::new();
        interrupt.raise();
        
        let mut echo = echo_with(&serialize_sonars_reply(&SonarReading::default()));
        let stats = echo.run(&interrupt).unwrap();
        
        // Only the initial request went out; nothing was read
        assert_eq!(stats.requests_sent, 1);
        assert_eq!(stats.bytes_read, 0);
    }
    
    #[test]
    fn test_closed_link_propagates() {
        let link = MemoryTransport::new().close_when_drained();
        let mut echo = EchoLoop::new(link, Vec::new());
        
        let err = echo.run(&Interrupt::new()).unwrap_err();
        assert!(matches!(err, EchoError::Link(EnvError::Closed(_))));
    }
}
