//! Hackflight SLAM tools: drivers and simulation harness
//!
//! This crate wires the core library to the outside world:
//! - **Echo CLI** (`slammin`): serial link → MSP parser → printed sonar readings
//! - **Visualizer CLI** (`slamvis`): canned animation over the obstacle field
//! - **Simulated flight controller**: answers MSP requests from a seeded RNG,
//!   so the echo loop can run and be tested without hardware
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  requests  ┌──────────────────────────────┐
//! │   EchoLoop   │───────────►│ SerialTransport              │
//! │ (parser,     │            │   or SimulatedFlightController│
//! │  requests)   │◄───────────│                              │
//! └──────────────┘  replies   └──────────────────────────────┘
//!
//! ┌──────────────────┐ pose, obstacle ┌────────────────┐ refresh ┌─────────────┐
//! │ ObstacleAnimator │───────────────►│ SlamVisualizer │────────►│ Display     │
//! └──────────────────┘◄───────────────└────────────────┘         │ (Rerun/none)│
//!                       RedrawStatus                             └─────────────┘
//! ```

pub mod animation;
pub mod cli;
mod error;
pub mod exporter;
pub mod peer;

pub use animation::{AnimationConfig, ObstacleAnimator};
pub use error::SimError;
pub use exporter::{ObstaclePosition, SceneExport};
pub use peer::{SimulatedFcConfig, SimulatedFlightController};
