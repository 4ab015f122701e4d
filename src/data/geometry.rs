//! CPU-side geometry synthesis.
//!
//! Everything here is pure: raw coordinates in, vertex/index data out. GPU
//! upload happens in the renderer, which keeps these builders testable
//! without a device.

use crate::data::types::Point3;
use rayon::prelude::*;

/// World-space size of a point sprite.
pub const POINT_SIZE: f32 = 0.2;
/// Point sprite opacity.
pub const POINT_OPACITY: f32 = 0.8;
/// Marker sphere radius.
pub const SPHERE_RADIUS: f32 = 0.1;
/// Polyline color (solid green).
pub const LINE_COLOR: [f32; 3] = [0.0, 1.0, 0.0];

/// Dense point cloud: one position and one color per input point.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloudGeometry {
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 3]>,
}

impl PointCloudGeometry {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// One subsampled marker sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereMarker {
    pub center: [f32; 3],
    pub color: [f32; 3],
    pub emissive: [f32; 3],
}

/// Line geometry with per-vertex color. `strip` selects a connected polyline
/// over independent segment pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct LineGeometry {
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 3]>,
    pub strip: bool,
}

impl LineGeometry {
    pub fn len(&self) -> usize {
        self.positions.len()
    }
}

/// Hue for the point at ordinal index `i` out of `n`: a rainbow gradient
/// ordered by input sequence, not spatial position.
#[inline]
pub fn hue_for_index(i: usize, n: usize) -> f32 {
    debug_assert!(n > 0);
    i as f32 / n as f32
}

fn hue_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

/// HSL to linear RGB. Hue wraps at 1.0.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    if s == 0.0 {
        return [l, l, l];
    }
    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    [
        hue_channel(p, q, h + 1.0 / 3.0),
        hue_channel(p, q, h),
        hue_channel(p, q, h - 1.0 / 3.0),
    ]
}

/// Builds the dense point cloud, or `None` for an empty dataset.
pub fn point_cloud(data: &[Point3]) -> Option<PointCloudGeometry> {
    if data.is_empty() {
        return None;
    }
    let n = data.len();
    let (positions, colors) = data
        .par_iter()
        .enumerate()
        .map(|(i, p)| (p.to_array(), hsl_to_rgb(hue_for_index(i, n), 1.0, 0.5)))
        .unzip();

    Some(PointCloudGeometry { positions, colors })
}

/// Builds marker spheres at every index that is an exact multiple of
/// `spacing` (indices 0, spacing, 2·spacing, …). The stride is by ordinal
/// index, not spatial distance; spacing is clamped to at least 1.
pub fn sphere_markers(data: &[Point3], spacing: usize) -> Vec<SphereMarker> {
    if data.is_empty() {
        return Vec::new();
    }
    let spacing = spacing.max(1);
    let n = data.len();
    data.iter()
        .enumerate()
        .filter(|(i, _)| i % spacing == 0)
        .map(|(i, p)| {
            let hue = hue_for_index(i, n);
            SphereMarker {
                center: p.to_array(),
                color: hsl_to_rgb(hue, 1.0, 0.5),
                emissive: hsl_to_rgb(hue, 1.0, 0.2),
            }
        })
        .collect()
}

/// Builds a single connected polyline through all points in input order.
/// Needs at least 2 points.
pub fn polyline(data: &[Point3]) -> Option<LineGeometry> {
    if data.len() < 2 {
        return None;
    }
    Some(LineGeometry {
        positions: data.iter().map(|p| p.to_array()).collect(),
        colors: vec![LINE_COLOR; data.len()],
        strip: true,
    })
}

/// Ground grid on the XZ plane: `divisions + 1` lines in each direction over
/// a `size × size` extent, the two center lines tinted differently.
pub fn grid(size: f32, divisions: u32, center_color: [f32; 3], grid_color: [f32; 3]) -> LineGeometry {
    let half = size / 2.0;
    let step = size / divisions as f32;
    let mut positions = Vec::with_capacity((divisions as usize + 1) * 4);
    let mut colors = Vec::with_capacity(positions.capacity());

    for i in 0..=divisions {
        let k = -half + i as f32 * step;
        let color = if i * 2 == divisions { center_color } else { grid_color };

        positions.push([-half, 0.0, k]);
        positions.push([half, 0.0, k]);
        positions.push([k, 0.0, -half]);
        positions.push([k, 0.0, half]);
        for _ in 0..4 {
            colors.push(color);
        }
    }

    LineGeometry {
        positions,
        colors,
        strip: false,
    }
}

/// Axis indicator: three segments from the origin, XYZ mapped to RGB.
pub fn axes(length: f32) -> LineGeometry {
    let o = [0.0, 0.0, 0.0];
    LineGeometry {
        positions: vec![
            o,
            [length, 0.0, 0.0],
            o,
            [0.0, length, 0.0],
            o,
            [0.0, 0.0, length],
        ],
        colors: vec![
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, 1.0],
        ],
        strip: false,
    }
}

/// Indexed triangle mesh for the shared marker sphere.
#[derive(Debug, Clone)]
pub struct SphereMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

/// UV sphere of the given radius. `segments` around the equator, `rings`
/// from pole to pole.
pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> SphereMesh {
    use std::f32::consts::PI;

    let mut positions = Vec::with_capacity(((rings + 1) * (segments + 1)) as usize);
    let mut normals = Vec::with_capacity(positions.capacity());

    for ring in 0..=rings {
        let theta = ring as f32 / rings as f32 * PI;
        let (sin_t, cos_t) = theta.sin_cos();
        for seg in 0..=segments {
            let phi = seg as f32 / segments as f32 * 2.0 * PI;
            let (sin_p, cos_p) = phi.sin_cos();
            let n = [sin_t * cos_p, cos_t, sin_t * sin_p];
            normals.push(n);
            positions.push([n[0] * radius, n[1] * radius, n[2] * radius]);
        }
    }

    let mut indices = Vec::with_capacity((rings * segments * 6) as usize);
    for ring in 0..rings {
        for seg in 0..segments {
            let a = ring * (segments + 1) + seg;
            let b = a + segments + 1;
            indices.extend_from_slice(&[a, b, a + 1, b, b + 1, a + 1]);
        }
    }

    SphereMesh {
        positions,
        normals,
        indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn points(n: usize) -> Vec<Point3> {
        (0..n)
            .map(|i| Point3::new(i as f32, i as f32 * 2.0, -(i as f32)))
            .collect()
    }

    #[test]
    fn point_cloud_has_one_vertex_and_color_per_point() {
        let data = points(17);
        let cloud = point_cloud(&data).unwrap();
        assert_eq!(cloud.len(), 17);
        assert_eq!(cloud.colors.len(), 17);
        assert_eq!(cloud.positions[3], [3.0, 6.0, -3.0]);
    }

    #[test]
    fn point_cloud_hue_strictly_increases_with_index() {
        let n = 32;
        for i in 1..n {
            assert!(hue_for_index(i, n) > hue_for_index(i - 1, n));
        }
        // Hue stays below the 1.0 wraparound for every valid index.
        assert!(hue_for_index(n - 1, n) < 1.0);
    }

    #[test]
    fn point_cloud_empty_is_none() {
        assert!(point_cloud(&[]).is_none());
    }

    #[test]
    fn hsl_primaries() {
        let red = hsl_to_rgb(0.0, 1.0, 0.5);
        assert_relative_eq!(red[0], 1.0);
        assert_relative_eq!(red[1], 0.0);
        assert_relative_eq!(red[2], 0.0);

        let green = hsl_to_rgb(1.0 / 3.0, 1.0, 0.5);
        assert_relative_eq!(green[0], 0.0);
        assert_relative_eq!(green[1], 1.0);
        assert_relative_eq!(green[2], 0.0, epsilon = 1e-6);

        let cyan = hsl_to_rgb(0.5, 1.0, 0.5);
        assert_relative_eq!(cyan[1], 1.0);
        assert_relative_eq!(cyan[2], 1.0);
    }

    #[test]
    fn hsl_hue_wraps_at_one() {
        let a = hsl_to_rgb(0.25, 1.0, 0.5);
        let b = hsl_to_rgb(1.25, 1.0, 0.5);
        for c in 0..3 {
            assert_relative_eq!(a[c], b[c], epsilon = 1e-6);
        }
    }

    #[test]
    fn spheres_follow_the_stride() {
        // ceil(N / s) spheres at indices 0, s, 2s, ...
        for (n, s) in [(10, 3), (12, 5), (1, 5), (20, 1)] {
            let markers = sphere_markers(&points(n), s);
            assert_eq!(markers.len(), (n + s - 1) / s, "n={n} s={s}");
        }

        let markers = sphere_markers(&points(12), 5);
        assert_eq!(markers[0].center, [0.0, 0.0, 0.0]);
        assert_eq!(markers[1].center, [5.0, 10.0, -5.0]);
        assert_eq!(markers[2].center, [10.0, 20.0, -10.0]);
    }

    #[test]
    fn sphere_colors_match_the_point_cloud_gradient() {
        let data = points(10);
        let cloud = point_cloud(&data).unwrap();
        let markers = sphere_markers(&data, 5);
        assert_eq!(markers[1].color, cloud.colors[5]);
        assert_eq!(markers[1].emissive, hsl_to_rgb(hue_for_index(5, 10), 1.0, 0.2));
    }

    #[test]
    fn spheres_empty_and_degenerate_spacing() {
        assert!(sphere_markers(&[], 5).is_empty());
        // Spacing 0 is clamped to 1, giving one marker per point.
        assert_eq!(sphere_markers(&points(4), 0).len(), 4);
    }

    #[test]
    fn polyline_needs_two_points() {
        assert!(polyline(&[]).is_none());
        assert!(polyline(&points(1)).is_none());

        let line = polyline(&points(5)).unwrap();
        assert_eq!(line.len(), 5);
        assert!(line.strip);
        assert!(line.colors.iter().all(|c| *c == LINE_COLOR));
    }

    #[test]
    fn grid_line_counts_and_center_tint() {
        let g = grid(20.0, 20, [0.27, 0.27, 0.27], [0.13, 0.13, 0.13]);
        assert_eq!(g.len(), 21 * 4);
        assert!(!g.strip);
        // Row 10 holds the center lines.
        assert_eq!(g.colors[10 * 4], [0.27, 0.27, 0.27]);
        assert_eq!(g.colors[9 * 4], [0.13, 0.13, 0.13]);
    }

    #[test]
    fn axes_are_rgb() {
        let a = axes(5.0);
        assert_eq!(a.len(), 6);
        assert_eq!(a.positions[1], [5.0, 0.0, 0.0]);
        assert_eq!(a.positions[3], [0.0, 5.0, 0.0]);
        assert_eq!(a.positions[5], [0.0, 0.0, 5.0]);
        assert_eq!(a.colors[0], [1.0, 0.0, 0.0]);
        assert_eq!(a.colors[2], [0.0, 1.0, 0.0]);
        assert_eq!(a.colors[4], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn uv_sphere_topology() {
        let mesh = uv_sphere(SPHERE_RADIUS, 16, 16);
        assert_eq!(mesh.positions.len(), 17 * 17);
        assert_eq!(mesh.normals.len(), mesh.positions.len());
        assert_eq!(mesh.indices.len(), 16 * 16 * 6);

        // Every vertex sits on the sphere and its normal is unit length.
        for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
            let r = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
            assert_relative_eq!(r, SPHERE_RADIUS, epsilon = 1e-5);
            let nl = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert_relative_eq!(nl, 1.0, epsilon = 1e-5);
        }
        // Indices stay in range.
        let max = *mesh.indices.iter().max().unwrap();
        assert!((max as usize) < mesh.positions.len());
    }
}
