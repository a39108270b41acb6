//! In-memory ByteTransport for tests and offline runs.

use crate::error::EnvError;
use crate::ByteTransport;
use std::collections::VecDeque;

/// A scripted link: reads drain a queue of input bytes, writes are recorded
/// one packet per `write_all` call.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    input: VecDeque<u8>,
    writes: Vec<Vec<u8>>,
    
    /// Report the link as closed once the input is drained
    close_when_drained: bool,
}

impl MemoryTransport {
    /// Creates an empty link that reports timeouts when drained.
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Creates a link preloaded with input bytes.
    pub fn with_input(bytes: &[u8]) -> Self {
        Self {
            input: bytes.iter().copied().collect(),
            ..Default::default()
        }
    }
    
    /// Makes reads fail with `EnvError::Closed` after the input runs out.
    pub fn close_when_drained(mut self) -> Self {
        self.close_when_drained = true;
        self
    }
    
    /// Appends bytes to the pending input.
    pub fn push_input(&mut self, bytes: &[u8]) {
        self.input.extend(bytes.iter().copied());
    }
    
    /// Number of input bytes not yet read.
    pub fn pending_input(&self) -> usize {
        self.input.len()
    }
    
    /// Packets written so far.
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }
    
    /// Number of `write_all` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.len()
    }
    
    /// Removes and returns the recorded writes.
    pub fn take_writes(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.writes)
    }
}

impl ByteTransport for MemoryTransport {
    fn read_byte(&mut self) -> Result<Option<u8>, EnvError> {
        match self.input.pop_front() {
            Some(byte) => Ok(Some(byte)),
            None if self.close_when_drained => Err(EnvError::closed("memory")),
            None => Ok(None),
        }
    }
    
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), EnvError> {
        self.writes.push(bytes.to_vec());
        Ok(())
    }
    
    fn name(&self) -> &str {
        "memory"
    }
}
