//! Simulated flight controller for offline runs and tests.
//!
//! Implements `ByteTransport`: requests written to it are parsed and
//! answered with reply frames that subsequent reads return. Sonar ranges
//! are drawn around fixed base ranges with Gaussian noise from a seeded RNG,
//! so a run is reproducible from its seed.

use crate::error::SimError;
use hackflight_core::msp::{serialize_frame, Direction, MspParser, MSP_ATTITUDE, MSP_SONARS};
use hackflight_core::telemetry::{serialize_attitude_reply, serialize_sonars_reply, Attitude, SonarReading};
use hackflight_env::{ByteTransport, EnvError};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Behaviour of the simulated flight controller.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedFcConfig {
    /// Mean forward, back, left, right ranges (cm)
    pub base_ranges_cm: [f64; 4],
    
    /// Range noise standard deviation (cm)
    pub noise_std_cm: f64,
    
    /// Delay between a request and its reply becoming readable
    pub reply_latency: Duration,
    
    /// Heading advance per attitude reply (degrees)
    pub heading_step_deg: i16,
}

impl Default for SimulatedFcConfig {
    fn default() -> Self {
        Self {
            base_ranges_cm: [150.0, 80.0, 60.0, 60.0],
            noise_std_cm: 5.0,
            reply_latency: Duration::from_millis(100),
            heading_step_deg: 10,
        }
    }
}

/// A flight controller living entirely in memory.
pub struct SimulatedFlightController {
    config: SimulatedFcConfig,
    parser: MspParser,
    
    /// Reply bytes and the instant they become readable
    outbox: VecDeque<(Instant, u8)>,
    
    rng: ChaCha8Rng,
    noise: Normal<f64>,
    heading: i16,
    requests_seen: u64,
}

impl SimulatedFlightController {
    /// Creates a controller; `seed` fixes the sonar noise sequence.
    pub fn new(config: SimulatedFcConfig, seed: Option<u64>) -> Result<Self, SimError> {
        let noise = Normal::new(0.0, config.noise_std_cm)
            .map_err(|_| SimError::InvalidNoise(config.noise_std_cm))?;
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        
        Ok(Self {
            config,
            parser: MspParser::new(),
            outbox: VecDeque::new(),
            rng,
            noise,
            heading: 0,
            requests_seen: 0,
        })
    }
    
    /// Requests parsed so far.
    pub fn requests_seen(&self) -> u64 {
        self.requests_seen
    }
    
    /// Reply bytes not yet read.
    pub fn pending_reply_bytes(&self) -> usize {
        self.outbox.len()
    }
    
    fn respond(&mut self, command: u8) {
        let reply = match command {
            MSP_SONARS => serialize_sonars_reply(&self.sample_sonars()),
            MSP_ATTITUDE => {
                self.heading = (self.heading + self.config.heading_step_deg).rem_euclid(360);
                serialize_attitude_reply(&Attitude {
                    angx: 0,
                    angy: 0,
                    heading: self.heading,
                })
            }
            other => {
                tracing::debug!("Simulated FC rejecting command {}", other);
                serialize_frame(Direction::Error, other, &[]).unwrap_or_default()
            }
        };
        
        let ready = Instant::now() + self.config.reply_latency;
        self.outbox.extend(reply.into_iter().map(|byte| (ready, byte)));
    }
    
    fn sample_sonars(&mut self) -> SonarReading {
        let mut ranges = [0i16; 4];
        for (range, base) in ranges.iter_mut().zip(self.config.base_ranges_cm) {
            let sample = base + self.noise.sample(&mut self.rng);
            *range = sample.round().clamp(0.0, i16::MAX as f64) as i16;
        }
        let [forward, back, left, right] = ranges;
        SonarReading::new(forward, back, left, right)
    }
}

impl ByteTransport for SimulatedFlightController {
    fn read_byte(&mut self) -> Result<Option<u8>, EnvError> {
        let Some(&(ready, byte)) = self.outbox.front() else {
            return Ok(None);
        };
        
        let now = Instant::now();
        if ready > now {
            // Wait a little, like a serial read timeout would
            std::thread::sleep((ready - now).min(Duration::from_millis(10)));
            return Ok(None);
        }
        
        self.outbox.pop_front();
        Ok(Some(byte))
    }
    
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), EnvError> {
        for &byte in bytes {
            if let Some(frame) = self.parser.parse(byte) {
                if frame.direction == Direction::Request {
                    self.requests_seen += 1;
                    self.respond(frame.command);
                }
            }
        }
        Ok(())
    }
    
    fn name(&self) -> &str {
        "simulated-fc"
    }
}
