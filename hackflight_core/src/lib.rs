//! Hackflight Core - SLAM telemetry tools
//!
//! This library holds everything the two demonstration programs need:
//! 1. **MSP codec**: streaming parser and serializers for MultiWii Serial Protocol frames
//! 2. **Echo loop**: request sonars, print each reply, request again
//! 3. **Obstacle field**: a vehicle pyramid plus accumulated obstacle cubes, redrawn on demand

pub mod echo;
pub mod msp;
pub mod scene;
pub mod telemetry;
pub mod visualizer;

#[cfg(feature = "visualization")]
pub mod visualization;

// Re-export key types for convenience
pub use echo::{EchoError, EchoLoop, EchoStats};
pub use msp::{MspError, MspFrame, MspParser};
pub use scene::{Mesh, Pose, Scene};
pub use telemetry::{Attitude, Message, SonarReading};
pub use visualizer::{
    AxesStyle, DisplayError, HeadlessDisplay, RedrawStatus, SceneDisplay, SlamVisualizer,
    VisualizerConfig,
};

#[cfg(feature = "visualization")]
pub use visualization::RerunDisplay;
