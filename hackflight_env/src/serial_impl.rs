//! Production implementation of ByteTransport using a serial device.

use crate::error::EnvError;
use crate::ByteTransport;
use serialport::SerialPort;
use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

/// Settings for opening a serial link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialSettings {
    /// Device path, e.g. `/dev/ttyUSB0` or `COM3`
    pub path: String,
    
    /// Baud rate
    pub baud_rate: u32,
    
    /// How long a single read may block before reporting "no byte yet".
    ///
    /// Keeps the read loop responsive to Ctrl-C.
    pub read_timeout: Duration,
}

impl SerialSettings {
    /// Creates settings for a device with the default read timeout.
    pub fn new(path: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            path: path.into(),
            baud_rate,
            ..Default::default()
        }
    }
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            path: String::new(),
            baud_rate: 115_200,
            read_timeout: Duration::from_millis(100),
        }
    }
}

/// Serial link backed by the `serialport` crate.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    path: String,
}

impl SerialTransport {
    /// Opens the device described by `settings`.
    pub fn open(settings: &SerialSettings) -> Result<Self, EnvError> {
        let port = serialport::new(settings.path.as_str(), settings.baud_rate)
            .timeout(settings.read_timeout)
            .open()
            .map_err(|source| EnvError::Open {
                path: settings.path.clone(),
                source,
            })?;
        
        tracing::info!("Opened {} at {} baud", settings.path, settings.baud_rate);
        
        Ok(Self {
            port,
            path: settings.path.clone(),
        })
    }
}

impl ByteTransport for SerialTransport {
    fn read_byte(&mut self) -> Result<Option<u8>, EnvError> {
        let mut buf = [0u8; 1];
        match self.port.read(&mut buf) {
            Ok(0) => Err(EnvError::closed(&self.path)),
            Ok(_) => Ok(Some(buf[0])),
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::Interrupted) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
    
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), EnvError> {
        self.port.write_all(bytes)?;
        self.port.flush()?;
        Ok(())
    }
    
    fn name(&self) -> &str {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_settings_defaults() {
        let settings = SerialSettings::new("/dev/ttyUSB0", 57600);
        assert_eq!(settings.path, "/dev/ttyUSB0");
        assert_eq!(settings.baud_rate, 57600);
        assert_eq!(settings.read_timeout, Duration::from_millis(100));
    }
    
    #[test]
    fn test_open_missing_device_fails() {
        let settings = SerialSettings::new("/dev/hackflight-does-not-exist", 57600);
        let err = SerialTransport::open(&settings).err().unwrap();
        assert!(matches!(err, EnvError::Open { .. }));
        assert!(err.to_string().contains("/dev/hackflight-does-not-exist"));
    }
}
