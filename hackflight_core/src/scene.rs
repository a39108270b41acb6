//! In-memory 3D scene: one fixed vehicle pyramid plus accumulated obstacle cubes.
//!
//! All distances are in centimeters. Faces are planar polygons listed
//! vertex by vertex, the way a polygon collection is handed to a plotter.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Face color of the vehicle pyramid.
pub const VEHICLE_COLOR: [u8; 4] = [255, 0, 0, 255];

/// Face color of obstacle cubes.
pub const OBSTACLE_COLOR: [u8; 4] = [255, 255, 255, 255];

/// Vehicle pose: position in centimeters, heading in degrees.
///
/// - X: left/right
/// - Y: forward/back
/// - Z: up/down
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub theta: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, z: f64, theta: f64) -> Self {
        Self { x, y, z, theta }
    }
}

/// A planar polygon.
pub type Face = Vec<Point3<f64>>;

/// A colored collection of faces.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Anchor vertex the mesh was built from
    pub origin: Point3<f64>,
    pub faces: Vec<Face>,
    pub color: [u8; 4],
}

impl Mesh {
    /// Builds the five-faced vehicle pyramid from its size `s`.
    ///
    /// The quad base stands in the XZ plane; the apex points along +Y.
    pub fn vehicle_pyramid(size: f64) -> Self {
        let s = size;
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(s / 2.0, 0.0, 0.0);
        let c = Point3::new(s / 2.0, 0.0, s / 3.0);
        let d = Point3::new(0.0, 0.0, s / 3.0);
        let e = Point3::new(s / 4.0, s, s / 6.0);
        
        Self {
            origin: a,
            faces: vec![
                vec![a, b, c, d],
                vec![b, c, e],
                vec![c, d, e],
                vec![a, d, e],
                vec![a, b, e],
            ],
            color: VEHICLE_COLOR,
        }
    }
    
    /// Builds an axis-aligned cube with its minimum corner at (x, y, z).
    pub fn obstacle_cube(x: f64, y: f64, z: f64, size: f64) -> Self {
        let s = size;
        let a = Point3::new(x, y, z);
        let b = Point3::new(x + s, y, z);
        let c = Point3::new(x + s, y + s, z);
        let d = Point3::new(x, y + s, z);
        let e = Point3::new(x, y, z + s);
        let f = Point3::new(x + s, y, z + s);
        let g = Point3::new(x + s, y + s, z + s);
        let h = Point3::new(x, y + s, z + s);
        
        Self {
            origin: a,
            faces: vec![
                vec![a, b, c, d],
                vec![e, f, g, h],
                vec![f, g, c, b],
                vec![e, h, d, a],
                vec![e, f, b, a],
                vec![h, g, c, d],
            ],
            color: OBSTACLE_COLOR,
        }
    }
    
    /// Fan-triangulates every face for triangle-based renderers.
    ///
    /// Returns one position per face vertex and index triples into them.
    pub fn triangles(&self) -> (Vec<[f32; 3]>, Vec<[u32; 3]>) {
        let mut positions = Vec::new();
        let mut indices = Vec::new();
        
        for face in &self.faces {
            let base = positions.len() as u32;
            positions.extend(face.iter().map(|p| [p.x as f32, p.y as f32, p.z as f32]));
            for i in 1..face.len().saturating_sub(1) as u32 {
                indices.push([base, base + i, base + i + 1]);
            }
        }
        
        (positions, indices)
    }
}

/// The scene drawn by the visualizer.
///
/// Obstacles are never removed or culled.
#[derive(Debug, Clone)]
pub struct Scene {
    vehicle: Mesh,
    obstacles: Vec<Mesh>,
    pose: Pose,
    obstacle_size: f64,
}

impl Scene {
    /// Creates a scene holding only the vehicle.
    pub fn new(vehicle_size: f64, obstacle_size: f64) -> Self {
        Self {
            vehicle: Mesh::vehicle_pyramid(vehicle_size),
            obstacles: Vec::new(),
            pose: Pose::default(),
            obstacle_size,
        }
    }
    
    /// Appends an obstacle cube at (x, y, z).
    pub fn add_obstacle(&mut self, x: f64, y: f64, z: f64) -> &Mesh {
        self.obstacles.push(Mesh::obstacle_cube(x, y, z, self.obstacle_size));
        &self.obstacles[self.obstacles.len() - 1]
    }
    
    /// Records the vehicle pose. The vehicle mesh is not moved.
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }
    
    pub fn pose(&self) -> Pose {
        self.pose
    }
    
    pub fn vehicle(&self) -> &Mesh {
        &self.vehicle
    }
    
    pub fn obstacles(&self) -> &[Mesh] {
        &self.obstacles
    }
    
    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }
    
    /// Obstacles plus the vehicle.
    pub fn mesh_count(&self) -> usize {
        self.obstacles.len() + 1
    }
    
    /// Vehicle first, then obstacles in insertion order.
    pub fn meshes(&self) -> impl Iterator<Item = &Mesh> {
        std::iter::once(&self.vehicle).chain(self.obstacles.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    
    #[test]
    fn test_vehicle_pyramid_shape() {
        let vehicle = Mesh::vehicle_pyramid(24.0);
        assert_eq!(vehicle.faces.len(), 5);
        assert_eq!(vehicle.faces[0].len(), 4);
        assert!(vehicle.faces[1..].iter().all(|f| f.len() == 3));
        assert_eq!(vehicle.color, VEHICLE_COLOR);
        
        // Apex E = (s/4, s, s/6)
        let apex = vehicle.faces[1][2];
        assert_relative_eq!(apex.x, 6.0);
        assert_relative_eq!(apex.y, 24.0);
        assert_relative_eq!(apex.z, 4.0);
    }
    
    #[test]
    fn test_obstacle_cube_shape() {
        let cube = Mesh::obstacle_cube(-5.0, 10.0, 2.0, 10.0);
        assert_eq!(cube.faces.len(), 6);
        assert!(cube.faces.iter().all(|f| f.len() == 4));
        assert_eq!(cube.origin, Point3::new(-5.0, 10.0, 2.0));
        assert_eq!(cube.color, OBSTACLE_COLOR);
        
        // Opposite corner G
        assert_eq!(cube.faces[1][2], Point3::new(5.0, 20.0, 12.0));
    }
    
    #[test]
    fn test_triangulation_counts() {
        let (positions, indices) = Mesh::obstacle_cube(0.0, 0.0, 0.0, 1.0).triangles();
        assert_eq!(positions.len(), 24);
        assert_eq!(indices.len(), 12);
        
        // One quad + four triangles
        let (positions, indices) = Mesh::vehicle_pyramid(1.0).triangles();
        assert_eq!(positions.len(), 16);
        assert_eq!(indices.len(), 6);
        assert!(indices.iter().flatten().all(|&i| (i as usize) < positions.len()));
    }
    
    #[test]
    fn test_add_obstacle_counts() {
        let mut scene = Scene::new(25.0, 10.0);
        assert_eq!(scene.mesh_count(), 1);
        
        for i in 0..7 {
            // Duplicates and out-of-map coordinates are accepted as-is
            scene.add_obstacle(1e6, -1e6, i as f64 % 2.0);
        }
        assert_eq!(scene.obstacle_count(), 7);
        assert_eq!(scene.mesh_count(), 8);
        assert_eq!(scene.meshes().count(), 8);
    }
    
    #[test]
    fn test_set_pose_keeps_vehicle_geometry() {
        let mut scene = Scene::new(25.0, 10.0);
        let before = scene.vehicle().clone();
        
        scene.set_pose(Pose::new(100.0, -40.0, 250.0, 90.0));
        assert_eq!(scene.pose(), Pose::new(100.0, -40.0, 250.0, 90.0));
        assert_eq!(scene.vehicle(), &before);
    }
}
