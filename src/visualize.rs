//! Turns a dataset into scene geometry.
//!
//! Builder failures here are recoverable by design: an empty dataset or a
//! too-short polyline logs a diagnostic and yields nothing, so one missing
//! layer never aborts the others.

use crate::config::VisualizeOptions;
use crate::data::geometry;
use crate::data::types::Point3;
use crate::scene::{GeometryBatch, NodeId, NodeKind, Scene};

/// Builds visualization geometry into a specific scene. The scene is
/// injected at construction; there is no way to hold a `Visualizer` without
/// one.
pub struct Visualizer<'s> {
    scene: &'s mut Scene,
}

impl<'s> Visualizer<'s> {
    pub fn new(scene: &'s mut Scene) -> Self {
        Self { scene }
    }

    /// One vertex buffer with a position and a hue-by-index color per point,
    /// added as a single scene child. `None` for an empty dataset.
    pub fn create_point_cloud(&mut self, data: &[Point3]) -> Option<NodeId> {
        let Some(cloud) = geometry::point_cloud(data) else {
            log::warn!("Invalid or empty data for point cloud");
            return None;
        };
        let count = cloud.len();
        let id = self.scene.add(NodeKind::Points(cloud));
        log::info!("Created point cloud with {count} points");
        Some(id)
    }

    /// One marker sphere per stride hit, each added individually and
    /// returned in iteration order.
    pub fn create_spheres(&mut self, data: &[Point3], spacing: usize) -> Vec<NodeId> {
        let markers = geometry::sphere_markers(data, spacing);
        if markers.is_empty() {
            log::warn!("Invalid or empty data for spheres");
            return Vec::new();
        }
        let ids: Vec<NodeId> = markers
            .into_iter()
            .map(|m| self.scene.add(NodeKind::Sphere(m)))
            .collect();
        log::info!("Created {} spheres (every {}th point)", ids.len(), spacing.max(1));
        ids
    }

    /// A single connected polyline through all points in input order.
    /// `None` below 2 points.
    pub fn create_lines(&mut self, data: &[Point3]) -> Option<NodeId> {
        let Some(line) = geometry::polyline(data) else {
            log::warn!("Insufficient data for line (need at least 2 points)");
            return None;
        };
        let count = line.len();
        let id = self.scene.add(NodeKind::Lines(line));
        log::info!("Created line with {count} points");
        Some(id)
    }

    /// Configuration-driven entry point: runs the enabled builders and
    /// returns their handles, omitting members that produced nothing.
    pub fn visualize(&mut self, data: &[Point3], options: &VisualizeOptions) -> GeometryBatch {
        let mut batch = GeometryBatch::default();

        if options.show_points {
            batch.point_cloud = self.create_point_cloud(data);
        }
        if options.show_spheres {
            batch.spheres = self.create_spheres(data, options.sphere_spacing);
        }
        if options.show_lines {
            batch.line = self.create_lines(data);
        }

        let layers = usize::from(batch.point_cloud.is_some())
            + usize::from(!batch.spheres.is_empty())
            + usize::from(batch.line.is_some());
        log::info!("Visualization complete: {layers} object type(s) created");
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(n: usize) -> Vec<Point3> {
        (0..n).map(|i| Point3::new(i as f32, 0.0, 0.0)).collect()
    }

    #[test]
    fn default_options_build_points_and_spheres() {
        let mut scene = Scene::new([0.0; 3]);
        let batch = Visualizer::new(&mut scene).visualize(&dataset(10), &VisualizeOptions::default());

        assert!(batch.point_cloud.is_some());
        assert_eq!(batch.spheres.len(), 2); // ceil(10 / 5)
        assert!(batch.line.is_none());
        assert_eq!(scene.len(), 3);
    }

    #[test]
    fn three_point_scenario() {
        // dataset [{0,0,0}, {1,1,1}, {2,4,2.8}], spacing 1.
        let data = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(2.0, 4.0, 2.8),
        ];
        let opts = VisualizeOptions {
            sphere_spacing: 1,
            ..VisualizeOptions::default()
        };

        let mut scene = Scene::new([0.0; 3]);
        let batch = Visualizer::new(&mut scene).visualize(&data, &opts);

        let cloud_id = batch.point_cloud.expect("point cloud");
        let node = scene.nodes().iter().find(|n| n.id == cloud_id).unwrap();
        match &node.kind {
            NodeKind::Points(cloud) => assert_eq!(cloud.len(), 3),
            other => panic!("expected points, got {other:?}"),
        }
        assert_eq!(batch.spheres.len(), 3);
        assert!(batch.line.is_none());
    }

    #[test]
    fn empty_dataset_yields_empty_batch() {
        let mut scene = Scene::new([0.0; 3]);
        let mut viz = Visualizer::new(&mut scene);

        assert!(viz.create_point_cloud(&[]).is_none());
        assert!(viz.create_spheres(&[], 5).is_empty());
        assert!(viz.create_lines(&[]).is_none());

        let batch = viz.visualize(&[], &VisualizeOptions::default());
        assert!(batch.is_empty());
        assert!(scene.is_empty());
    }

    #[test]
    fn all_flags_off_yields_empty_batch() {
        let opts = VisualizeOptions {
            show_points: false,
            show_spheres: false,
            show_lines: false,
            ..VisualizeOptions::default()
        };
        let mut scene = Scene::new([0.0; 3]);
        let batch = Visualizer::new(&mut scene).visualize(&dataset(10), &opts);
        assert!(batch.is_empty());
        assert!(scene.is_empty());
    }

    #[test]
    fn lines_flag_builds_the_polyline() {
        let opts = VisualizeOptions {
            show_lines: true,
            ..VisualizeOptions::default()
        };
        let mut scene = Scene::new([0.0; 3]);
        let batch = Visualizer::new(&mut scene).visualize(&dataset(4), &opts);
        assert!(batch.line.is_some());
    }

    #[test]
    fn revisualization_does_not_leak() {
        let mut scene = Scene::new([0.0; 3]);
        let first = Visualizer::new(&mut scene).visualize(&dataset(10), &VisualizeOptions::default());
        let count_after_first = scene.len();

        scene.remove_batch(&first);
        let _second = Visualizer::new(&mut scene).visualize(&dataset(10), &VisualizeOptions::default());
        assert_eq!(scene.len(), count_after_first);
        assert!(!scene.contains(first.point_cloud.unwrap()));
    }
}
