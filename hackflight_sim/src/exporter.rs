//! JSON exporter for obstacle field runs.
//!
//! Writes the final state of a visualizer session so a run can be inspected
//! or replotted without the viewer.

use crate::error::SimError;
use hackflight_core::scene::Pose;
use hackflight_core::{SceneDisplay, SlamVisualizer};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// Minimum corner of an obstacle cube.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstaclePosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Complete scene export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneExport {
    pub map_size_cm: f64,
    pub obstacle_size_cm: f64,
    pub vehicle_size_cm: f64,
    
    /// Seed used for obstacle placement, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    
    /// Frames successfully redrawn
    pub frames: u64,
    
    /// Last recorded pose
    pub pose: Pose,
    
    pub obstacles: Vec<ObstaclePosition>,
}

impl SceneExport {
    /// Captures the visualizer's current scene.
    pub fn from_visualizer<D: SceneDisplay>(vis: &SlamVisualizer<D>, seed: Option<u64>) -> Self {
        let config = vis.config();
        let scene = vis.scene();
        
        Self {
            map_size_cm: config.map_size_cm,
            obstacle_size_cm: config.obstacle_size_cm,
            vehicle_size_cm: config.vehicle_size_cm,
            seed,
            frames: vis.frames(),
            pose: scene.pose(),
            obstacles: scene
                .obstacles()
                .iter()
                .map(|mesh| ObstaclePosition {
                    x: mesh.origin.x,
                    y: mesh.origin.y,
                    z: mesh.origin.z,
                })
                .collect(),
        }
    }
    
    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> Result<(), SimError> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
