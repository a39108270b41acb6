//! Rerun display backend for the obstacle field visualizer.
//!
//! Enable with the `visualization` feature flag. The vehicle and axes are
//! logged once as static data; each refresh logs only the obstacles added
//! since the previous refresh, plus the recorded pose as time series.

use crate::scene::{Mesh, Scene};
use crate::visualizer::{AxesStyle, DisplayError, SceneDisplay};
use rerun::{RecordingStream, RecordingStreamBuilder};

/// Rerun-based scene display
pub struct RerunDisplay {
    rec: RecordingStream,
    
    /// Obstacles already sent to the viewer
    logged_obstacles: usize,
    
    frame: i64,
}

impl RerunDisplay {
    /// Create a display that spawns the Rerun viewer
    pub fn new(app_id: &str) -> Result<Self, DisplayError> {
        let rec = RecordingStreamBuilder::new(app_id)
            .spawn()
            .map_err(DisplayError::backend)?;
        Ok(Self::from_stream(rec))
    }
    
    /// Create a display that records to an `.rrd` file instead of a window
    pub fn new_to_file(app_id: &str, path: &str) -> Result<Self, DisplayError> {
        let rec = RecordingStreamBuilder::new(app_id)
            .save(path)
            .map_err(DisplayError::backend)?;
        Ok(Self::from_stream(rec))
    }
    
    fn from_stream(rec: RecordingStream) -> Self {
        Self {
            rec,
            logged_obstacles: 0,
            frame: 0,
        }
    }
    
    fn log_mesh(&self, path: String, mesh: &Mesh, is_static: bool) -> Result<(), DisplayError> {
        let (positions, indices) = mesh.triangles();
        let [r, g, b, a] = mesh.color;
        let colors = vec![rerun::Color::from_unmultiplied_rgba(r, g, b, a); positions.len()];
        
        let archetype = rerun::Mesh3D::new(positions)
            .with_triangle_indices(indices)
            .with_vertex_colors(colors);
        
        let result = if is_static {
            self.rec.log_static(path, &archetype)
        } else {
            self.rec.log(path, &archetype)
        };
        result.map_err(DisplayError::backend)
    }
}

impl SceneDisplay for RerunDisplay {
    fn setup(&mut self, axes: &AxesStyle) -> Result<(), DisplayError> {
        self.rec
            .log_static("world", &rerun::ViewCoordinates::RIGHT_HAND_Z_UP())
            .map_err(DisplayError::backend)?;
        
        let [fr, fg, fb, fa] = axes.foreground;
        let foreground = rerun::Color::from_unmultiplied_rgba(fr, fg, fb, fa);
        
        // One arrow per axis spanning its full limit range
        let origins: Vec<[f32; 3]> = (0..3)
            .map(|axis| {
                let mut origin = [0.0f32; 3];
                origin[axis] = axes.limits[axis].0 as f32;
                origin
            })
            .collect();
        let vectors: Vec<[f32; 3]> = (0..3)
            .map(|axis| {
                let mut vector = [0.0f32; 3];
                vector[axis] = (axes.limits[axis].1 - axes.limits[axis].0) as f32;
                vector
            })
            .collect();
        
        self.rec
            .log_static(
                "world/axes",
                &rerun::Arrows3D::from_vectors(vectors)
                    .with_origins(origins)
                    .with_colors([foreground; 3])
                    .with_labels(axes.labels),
            )
            .map_err(DisplayError::backend)?;
        
        // Map bounds as a faint wireframe box
        let half_sizes = [
            ((axes.limits[0].1 - axes.limits[0].0) / 2.0) as f32,
            ((axes.limits[1].1 - axes.limits[1].0) / 2.0) as f32,
            ((axes.limits[2].1 - axes.limits[2].0) / 2.0) as f32,
        ];
        self.rec
            .log_static(
                "world/bounds",
                &rerun::Boxes3D::from_half_sizes([half_sizes])
                    .with_colors([rerun::Color::from_unmultiplied_rgba(fr, fg, fb, 40)]),
            )
            .map_err(DisplayError::backend)?;
        
        if axes.grid {
            tracing::debug!("Grid requested; the Rerun viewer draws its own");
        }
        
        Ok(())
    }
    
    fn draw_vehicle(&mut self, vehicle: &Mesh) -> Result<(), DisplayError> {
        self.log_mesh("world/vehicle".to_string(), vehicle, true)
    }
    
    fn refresh(&mut self, scene: &Scene) -> Result<(), DisplayError> {
        if !self.rec.is_enabled() {
            return Err(DisplayError::Closed);
        }
        
        self.rec.set_time_sequence("frame", self.frame);
        self.frame += 1;
        
        // Obstacles are static once placed
        for (index, obstacle) in scene.obstacles().iter().enumerate().skip(self.logged_obstacles) {
            self.log_mesh(format!("world/obstacles/{}", index), obstacle, true)?;
        }
        self.logged_obstacles = scene.obstacle_count();
        
        let pose = scene.pose();
        for (name, value) in [("x", pose.x), ("y", pose.y), ("z", pose.z), ("theta", pose.theta)] {
            self.rec
                .log(format!("pose/{}", name), &rerun::Scalars::new([value]))
                .map_err(DisplayError::backend)?;
        }
        
        Ok(())
    }
}
