//! Canned animation driving the obstacle field visualizer.
//!
//! Each frame records a pose, drops one obstacle at a random (x, y) at the
//! current height, redraws, then turns the heading and bobs the height
//! between two bounds.

use hackflight_core::{RedrawStatus, SceneDisplay, SlamVisualizer};
use hackflight_core::scene::Pose;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

/// Animation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationConfig {
    /// Obstacles land in (-map, +map) on X and Y (cm)
    pub map_size_cm: f64,
    
    /// Heading increment per frame (degrees)
    pub theta_step_deg: f64,
    
    /// Height change per frame (cm)
    pub z_step_cm: f64,
    
    /// Climb until above this height (cm)
    pub z_max_cm: f64,
    
    /// Descend until below this height (cm)
    pub z_min_cm: f64,
    
    /// Pause between frames
    pub frame_interval: Duration,
    
    /// Stop after this many frames (None = until the display closes)
    pub max_frames: Option<u64>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            map_size_cm: 300.0,
            theta_step_deg: 10.0,
            z_step_cm: 2.0,
            z_max_cm: 500.0,
            z_min_cm: 10.0,
            frame_interval: Duration::from_millis(50),
            max_frames: None,
        }
    }
}

/// Drives a `SlamVisualizer` one frame at a time.
pub struct ObstacleAnimator {
    config: AnimationConfig,
    rng: ChaCha8Rng,
    pose: Pose,
    
    /// +1 climbing, -1 descending
    z_dir: f64,
    
    frames: u64,
}

impl ObstacleAnimator {
    /// Creates an animator starting at the origin, climbing.
    ///
    /// `seed` makes the obstacle placement reproducible.
    pub fn new(config: AnimationConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            config,
            rng,
            pose: Pose::default(),
            z_dir: 1.0,
            frames: 0,
        }
    }
    
    /// Runs one frame. Returns the redraw status.
    pub fn step<D: SceneDisplay>(&mut self, vis: &mut SlamVisualizer<D>) -> RedrawStatus {
        let Pose { x, y, z, theta } = self.pose;
        vis.set_pose(x, y, z, theta);
        
        let (ox, oy) = self.random_xy();
        vis.add_obstacle(ox, oy, z);
        
        let status = vis.redraw();
        if status.is_open() {
            self.frames += 1;
            self.advance();
        }
        status
    }
    
    /// Runs frames until the display closes or `max_frames` is reached.
    ///
    /// Returns the number of frames shown.
    pub fn run<D: SceneDisplay>(&mut self, vis: &mut SlamVisualizer<D>) -> u64 {
        loop {
            if self.config.max_frames.is_some_and(|max| self.frames >= max) {
                tracing::debug!("Frame limit reached");
                break;
            }
            if !self.step(vis).is_open() {
                break;
            }
            if !self.config.frame_interval.is_zero() {
                std::thread::sleep(self.config.frame_interval);
            }
        }
        self.frames
    }
    
    pub fn pose(&self) -> Pose {
        self.pose
    }
    
    pub fn frames(&self) -> u64 {
        self.frames
    }
    
    // Uniform in (-map, +map), truncated toward zero.
    fn random_xy(&mut self) -> (f64, f64) {
        let m = self.config.map_size_cm;
        if m <= 0.0 {
            return (0.0, 0.0);
        }
        let x = self.rng.gen_range(-m..m).trunc();
        let y = self.rng.gen_range(-m..m).trunc();
        (x, y)
    }
    
    fn advance(&mut self) {
        self.pose.theta = (self.pose.theta + self.config.theta_step_deg) % 360.0;
        self.pose.z += self.config.z_step_cm * self.z_dir;
        
        if self.pose.z > self.config.z_max_cm {
            self.z_dir = -1.0;
        }
        if self.pose.z < self.config.z_min_cm {
            self.z_dir = 1.0;
        }
    }
}
