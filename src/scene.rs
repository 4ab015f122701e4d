//! Scene graph: an explicit container of geometry records.
//!
//! The scene owns every geometry object added to it. Each record gets a
//! stable id so re-visualization can remove exactly the nodes it created
//! earlier instead of leaking them. A generation counter lets the renderer
//! notice membership changes and refresh its GPU residency.

use crate::config::ViewerConfig;
use crate::data::geometry::{self, LineGeometry, PointCloudGeometry, SphereMarker};

/// Handle to a geometry record owned by the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

#[derive(Debug, Clone)]
pub enum NodeKind {
    Points(PointCloudGeometry),
    Sphere(SphereMarker),
    Lines(LineGeometry),
}

#[derive(Debug)]
pub struct SceneNode {
    pub id: NodeId,
    pub kind: NodeKind,
}

/// Fixed light rig: one ambient, one directional, one point light. The
/// values are deterministic and never derived from the dataset.
#[derive(Debug, Clone, Copy)]
pub struct LightRig {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub directional_color: [f32; 3],
    pub directional_intensity: f32,
    /// Position the directional light shines from, toward the origin.
    pub directional_position: [f32; 3],
    pub point_color: [f32; 3],
    pub point_intensity: f32,
    pub point_position: [f32; 3],
    pub point_range: f32,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            ambient_color: [0.251, 0.251, 0.251],
            ambient_intensity: 1.5,
            directional_color: [1.0, 1.0, 1.0],
            directional_intensity: 1.0,
            directional_position: [5.0, 5.0, 5.0],
            point_color: [0.266, 0.533, 1.0],
            point_intensity: 0.5,
            point_position: [-5.0, -5.0, -5.0],
            point_range: 50.0,
        }
    }
}

pub struct Scene {
    pub background: [f32; 3],
    pub lights: Option<LightRig>,
    nodes: Vec<SceneNode>,
    next_id: u64,
    generation: u64,
}

impl Scene {
    /// Empty scene with a solid background color.
    pub fn new(background: [f32; 3]) -> Self {
        Self {
            background,
            lights: None,
            nodes: Vec::new(),
            next_id: 0,
            generation: 0,
        }
    }

    /// Installs the fixed light rig.
    pub fn add_lights(&mut self) {
        self.lights = Some(LightRig::default());
    }

    /// Adds the ground grid and axis indicator per the configuration flags.
    pub fn add_helpers(&mut self, config: &ViewerConfig) {
        if !config.enable_helpers {
            return;
        }
        if config.enable_grid {
            self.add(NodeKind::Lines(geometry::grid(
                20.0,
                20,
                [0.267, 0.267, 0.267],
                [0.133, 0.133, 0.133],
            )));
        }
        self.add(NodeKind::Lines(geometry::axes(5.0)));
    }

    /// Adds a geometry record and returns its handle.
    pub fn add(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.generation += 1;
        self.nodes.push(SceneNode { id, kind });
        id
    }

    /// Removes a record. Returns false if the id was already gone, which
    /// makes repeated removal harmless.
    pub fn remove(&mut self, id: NodeId) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        let removed = self.nodes.len() != before;
        if removed {
            self.generation += 1;
        }
        removed
    }

    /// Removes every record produced by one visualization pass.
    pub fn remove_batch(&mut self, batch: &GeometryBatch) {
        if let Some(id) = batch.point_cloud {
            self.remove(id);
        }
        for id in &batch.spheres {
            self.remove(*id);
        }
        if let Some(id) = batch.line {
            self.remove(id);
        }
    }

    /// Drops all geometry records. Idempotent.
    pub fn clear(&mut self) {
        if !self.nodes.is_empty() {
            self.nodes.clear();
            self.generation += 1;
        }
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Bumped on every membership change; the renderer compares it against
    /// the generation it last uploaded.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Handles produced by one `Visualizer::visualize` call. Members absent from
/// the pass (disabled, or builder yielded nothing) stay unset.
#[derive(Debug, Default, Clone)]
pub struct GeometryBatch {
    pub point_cloud: Option<NodeId>,
    pub spheres: Vec<NodeId>,
    pub line: Option<NodeId>,
}

impl GeometryBatch {
    pub fn is_empty(&self) -> bool {
        self.point_cloud.is_none() && self.spheres.is_empty() && self.line.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::geometry::polyline;
    use crate::data::types::Point3;

    fn line_node() -> NodeKind {
        NodeKind::Lines(polyline(&[Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)]).unwrap())
    }

    #[test]
    fn add_and_remove_round_trip() {
        let mut scene = Scene::new([0.0; 3]);
        let id = scene.add(line_node());
        assert!(scene.contains(id));
        assert!(scene.remove(id));
        assert!(!scene.contains(id));
        // Second removal is a no-op.
        assert!(!scene.remove(id));
    }

    #[test]
    fn generation_tracks_membership_changes() {
        let mut scene = Scene::new([0.0; 3]);
        let g0 = scene.generation();
        let id = scene.add(line_node());
        assert_ne!(scene.generation(), g0);
        let g1 = scene.generation();
        scene.remove(id);
        assert_ne!(scene.generation(), g1);
        let g2 = scene.generation();
        scene.remove(id);
        assert_eq!(scene.generation(), g2);
    }

    #[test]
    fn helpers_respect_config_flags() {
        let mut scene = Scene::new([0.0; 3]);
        scene.add_helpers(&ViewerConfig::default());
        assert_eq!(scene.len(), 2); // grid + axes

        let mut no_grid = Scene::new([0.0; 3]);
        no_grid.add_helpers(&ViewerConfig {
            enable_grid: false,
            ..ViewerConfig::default()
        });
        assert_eq!(no_grid.len(), 1); // axes only

        let mut bare = Scene::new([0.0; 3]);
        bare.add_helpers(&ViewerConfig {
            enable_helpers: false,
            ..ViewerConfig::default()
        });
        assert!(bare.is_empty());
    }

    #[test]
    fn clear_is_idempotent() {
        let mut scene = Scene::new([0.0; 3]);
        scene.add(line_node());
        scene.clear();
        assert!(scene.is_empty());
        let g = scene.generation();
        scene.clear();
        assert_eq!(scene.generation(), g);
    }

    #[test]
    fn lights_are_deterministic() {
        let mut scene = Scene::new([0.0; 3]);
        assert!(scene.lights.is_none());
        scene.add_lights();
        let rig = scene.lights.unwrap();
        assert_eq!(rig.directional_position, [5.0, 5.0, 5.0]);
        assert_eq!(rig.point_range, 50.0);
    }
}
