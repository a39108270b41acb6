//! Byte transport abstraction for the telemetry link.

use crate::error::EnvError;

/// Abstraction for the byte stream between the host and the flight controller.
///
/// # Implementations
///
/// - **Production**: `SerialTransport` - wraps a `serialport` device
/// - **Testing**: `MemoryTransport` - scripted input, recorded writes
///
/// # Byte Flow
///
/// ```text
/// Host                       Link                  Flight controller
///   |-- write_all(request) --->|                          |
///   |                          |------------------------->|
///   |                          |<------- reply bytes -----|
///   |<-- read_byte() ----------|                          |
/// ```
pub trait ByteTransport {
    /// Reads the next byte from the link.
    ///
    /// # Returns
    /// * `Ok(Some(byte))` - A byte arrived
    /// * `Ok(None)` - Nothing arrived before the read timeout
    /// * `Err(_)` - The link failed or closed
    fn read_byte(&mut self) -> Result<Option<u8>, EnvError>;
    
    /// Writes a complete packet to the link.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), EnvError>;
    
    /// Human-readable name of the link (device path, "memory", ...).
    fn name(&self) -> &str;
}

impl<T: ByteTransport + ?Sized> ByteTransport for Box<T> {
    fn read_byte(&mut self) -> Result<Option<u8>, EnvError> {
        (**self).read_byte()
    }
    
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), EnvError> {
        (**self).write_all(bytes)
    }
    
    fn name(&self) -> &str {
        (**self).name()
    }
}
