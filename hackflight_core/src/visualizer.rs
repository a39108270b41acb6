//! Obstacle field visualizer.
//!
//! Owns the scene and a display backend. Window closure (or any other
//! refresh failure) and process interrupts surface as
//! `RedrawStatus::Closed` so the driving loop knows when to stop.

use crate::scene::{Mesh, Pose, Scene};
use hackflight_env::Interrupt;
use thiserror::Error;

/// Visualizer parameters, all in centimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualizerConfig {
    /// Axis limits are ±map size on every axis
    pub map_size_cm: f64,
    pub obstacle_size_cm: f64,
    pub vehicle_size_cm: f64,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            map_size_cm: 1000.0,
            obstacle_size_cm: 10.0,
            vehicle_size_cm: 25.0,
        }
    }
}

/// How the plot axes are presented.
#[derive(Debug, Clone, PartialEq)]
pub struct AxesStyle {
    /// (min, max) for X, Y, Z
    pub limits: [(f64, f64); 3],
    pub labels: [&'static str; 3],
    pub background: [u8; 4],
    /// Axis, tick and label color
    pub foreground: [u8; 4],
    pub grid: bool,
}

impl AxesStyle {
    /// White labelled axes spanning ±`map_size` on a black background, no grid.
    pub fn for_map(map_size: f64) -> Self {
        Self {
            limits: [(-map_size, map_size); 3],
            labels: ["X (cm)", "Y (cm)", "Z (cm)"],
            background: [0, 0, 0, 255],
            foreground: [255, 255, 255, 255],
            grid: false,
        }
    }
}

/// Why a display stopped accepting refreshes.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// The window was closed by the user
    #[error("Display window closed")]
    Closed,
    
    /// The backend reported a failure
    #[error("Display backend error: {0}")]
    Backend(String),
}

impl DisplayError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Outcome of a redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedrawStatus {
    /// The display is still open
    Open,
    /// The display closed or the process was interrupted
    Closed,
}

impl RedrawStatus {
    pub fn is_open(self) -> bool {
        self == RedrawStatus::Open
    }
}

/// A rendering backend for the scene.
pub trait SceneDisplay {
    /// Configures axes, limits and colors.
    fn setup(&mut self, axes: &AxesStyle) -> Result<(), DisplayError>;
    
    /// Renders the fixed vehicle mesh once.
    fn draw_vehicle(&mut self, vehicle: &Mesh) -> Result<(), DisplayError>;
    
    /// Non-blocking refresh of the current scene.
    fn refresh(&mut self, scene: &Scene) -> Result<(), DisplayError>;
}

impl<D: SceneDisplay + ?Sized> SceneDisplay for Box<D> {
    fn setup(&mut self, axes: &AxesStyle) -> Result<(), DisplayError> {
        (**self).setup(axes)
    }
    
    fn draw_vehicle(&mut self, vehicle: &Mesh) -> Result<(), DisplayError> {
        (**self).draw_vehicle(vehicle)
    }
    
    fn refresh(&mut self, scene: &Scene) -> Result<(), DisplayError> {
        (**self).refresh(scene)
    }
}

/// Display that renders nothing and never closes.
///
/// Used when the crate is built without the `visualization` feature.
#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    refreshes: u64,
    vehicle_faces: usize,
}

impl HeadlessDisplay {
    pub fn new() -> Self {
        Self::default()
    }
    
    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }
}

impl SceneDisplay for HeadlessDisplay {
    fn setup(&mut self, axes: &AxesStyle) -> Result<(), DisplayError> {
        tracing::debug!("Headless display, limits {:?}", axes.limits);
        Ok(())
    }
    
    fn draw_vehicle(&mut self, vehicle: &Mesh) -> Result<(), DisplayError> {
        self.vehicle_faces = vehicle.faces.len();
        Ok(())
    }
    
    fn refresh(&mut self, scene: &Scene) -> Result<(), DisplayError> {
        self.refreshes += 1;
        tracing::trace!(
            "Frame {}: {} meshes ({} vehicle faces), pose {:?}",
            self.refreshes,
            scene.mesh_count(),
            self.vehicle_faces,
            scene.pose()
        );
        Ok(())
    }
}

/// 3D obstacle field visualizer.
pub struct SlamVisualizer<D: SceneDisplay> {
    config: VisualizerConfig,
    scene: Scene,
    display: D,
    interrupt: Option<Interrupt>,
    status: RedrawStatus,
    frames: u64,
}

impl<D: SceneDisplay> SlamVisualizer<D> {
    /// Sets up the display and renders the vehicle.
    pub fn new(config: VisualizerConfig, mut display: D) -> Result<Self, DisplayError> {
        let scene = Scene::new(config.vehicle_size_cm, config.obstacle_size_cm);
        
        display.setup(&AxesStyle::for_map(config.map_size_cm))?;
        display.draw_vehicle(scene.vehicle())?;
        
        Ok(Self {
            config,
            scene,
            display,
            interrupt: None,
            status: RedrawStatus::Open,
            frames: 0,
        })
    }
    
    /// Makes `redraw` report `Closed` once `interrupt` is raised.
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = Some(interrupt);
        self
    }
    
    /// Adds an obstacle cube of the configured size at (x, y, z).
    pub fn add_obstacle(&mut self, x: f64, y: f64, z: f64) {
        self.scene.add_obstacle(x, y, z);
    }
    
    /// Records the vehicle pose.
    ///
    /// The pose is not applied to the rendered vehicle.
    pub fn set_pose(&mut self, x: f64, y: f64, z: f64, theta: f64) {
        self.scene.set_pose(Pose::new(x, y, z, theta));
    }
    
    /// Refreshes the display and reports whether it is still open.
    ///
    /// Once `Closed` has been reported, every later call reports it too
    /// without touching the display.
    pub fn redraw(&mut self) -> RedrawStatus {
        if self.status == RedrawStatus::Closed {
            return RedrawStatus::Closed;
        }
        
        if self.interrupt.as_ref().is_some_and(Interrupt::is_raised) {
            tracing::debug!("Redraw interrupted after {} frames", self.frames);
            self.status = RedrawStatus::Closed;
            return self.status;
        }
        
        match self.display.refresh(&self.scene) {
            Ok(()) => self.frames += 1,
            Err(e) => {
                tracing::debug!("Display stopped after {} frames: {}", self.frames, e);
                self.status = RedrawStatus::Closed;
            }
        }
        self.status
    }
    
    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }
    
    pub fn scene(&self) -> &Scene {
        &self.scene
    }
    
    pub fn display(&self) -> &D {
        &self.display
    }
    
    /// Number of successful refreshes.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
