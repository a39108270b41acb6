//! Hackflight Environment Abstraction Layer
//!
//! This crate isolates the two pieces of the outside world the SLAM tools
//! touch, so the telemetry and visualization logic can run against real
//! hardware or scripted input alike:
//! - **Link**: a byte stream to the flight controller (`ByteTransport`)
//! - **Interrupt**: the Ctrl-C flag that ends the read and redraw loops
//!
//! # Example
//!
//! ```ignore
//! use hackflight_env::{ByteTransport, Interrupt, SerialSettings, SerialTransport};
//!
//! let interrupt = Interrupt::install()?;
//! let mut link = SerialTransport::open(&SerialSettings::new("/dev/ttyUSB0", 57600))?;
//!
//! while !interrupt.is_raised() {
//!     if let Some(byte) = link.read_byte()? {
//!         handle(byte);
//!     }
//! }
//! ```

mod error;
mod interrupt;
mod memory;
mod serial_impl;
mod transport;

pub use error::EnvError;
pub use interrupt::Interrupt;
pub use memory::MemoryTransport;
pub use serial_impl::{SerialSettings, SerialTransport};
pub use transport::ByteTransport;
