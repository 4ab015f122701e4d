//! Viewer configuration surface.
//!
//! Every option has a default and is independently overridable from the
//! command line.

use clap::Parser;

/// Scene/renderer options recognized by the setup path.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Scene background, linear RGB.
    pub background_color: [f32; 3],
    /// Master switch for helper geometry (axes, and the grid below).
    pub enable_helpers: bool,
    /// Ground grid, only honored when helpers are enabled.
    pub enable_grid: bool,
    /// Cap on the effective device pixel ratio; bounds GPU cost on hidpi
    /// displays.
    pub max_pixel_ratio: f32,
}

/// Near-black default background (0x0a0a0a).
pub const DEFAULT_BACKGROUND: [f32; 3] = [0.039, 0.039, 0.039];

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            background_color: DEFAULT_BACKGROUND,
            enable_helpers: true,
            enable_grid: true,
            max_pixel_ratio: 2.0,
        }
    }
}

/// Options recognized by `Visualizer::visualize`.
#[derive(Debug, Clone)]
pub struct VisualizeOptions {
    pub show_points: bool,
    pub show_spheres: bool,
    pub show_lines: bool,
    /// Stride for marker spheres: one sphere at every index that is an exact
    /// multiple of this value.
    pub sphere_spacing: usize,
}

impl Default for VisualizeOptions {
    fn default() -> Self {
        Self {
            show_points: true,
            show_spheres: true,
            show_lines: false,
            sphere_spacing: 5,
        }
    }
}

/// Parses `RRGGBB` hex (leading `#` optional) into RGB.
fn parse_hex_color(s: &str) -> Result<[f32; 3], String> {
    let hex = s.trim_start_matches('#');
    if hex.len() != 6 {
        return Err(format!("expected RRGGBB hex, got '{s}'"));
    }
    let value = u32::from_str_radix(hex, 16).map_err(|e| format!("invalid hex '{s}': {e}"))?;
    Ok([
        ((value >> 16) & 0xff) as f32 / 255.0,
        ((value >> 8) & 0xff) as f32 / 255.0,
        (value & 0xff) as f32 / 255.0,
    ])
}

/// Command-line surface for the viewer binary.
#[derive(Debug, Parser)]
#[command(name = "cloudview", about = "Interactive 3D point-cloud viewer")]
pub struct Args {
    /// Endpoint returning the `{success, data, count}` envelope.
    #[arg(long, default_value = "http://127.0.0.1:8000/api/data")]
    pub url: String,

    /// Scene background as RRGGBB hex.
    #[arg(long, default_value = "0a0a0a", value_parser = parse_hex_color)]
    pub background_color: [f32; 3],

    /// Disable all helper geometry.
    #[arg(long)]
    pub no_helpers: bool,

    /// Disable the ground grid (helpers stay on).
    #[arg(long)]
    pub no_grid: bool,

    /// Device pixel ratio cap.
    #[arg(long, default_value_t = 2.0)]
    pub max_pixel_ratio: f32,

    /// Skip the dense point cloud layer.
    #[arg(long)]
    pub no_points: bool,

    /// Skip the marker sphere layer.
    #[arg(long)]
    pub no_spheres: bool,

    /// Draw a polyline through the points in input order.
    #[arg(long)]
    pub show_lines: bool,

    /// Marker sphere stride.
    #[arg(long, default_value_t = 5)]
    pub sphere_spacing: usize,
}

impl Args {
    pub fn viewer_config(&self) -> ViewerConfig {
        ViewerConfig {
            background_color: self.background_color,
            enable_helpers: !self.no_helpers,
            enable_grid: !self.no_grid,
            max_pixel_ratio: self.max_pixel_ratio,
        }
    }

    pub fn visualize_options(&self) -> VisualizeOptions {
        VisualizeOptions {
            show_points: !self.no_points,
            show_spheres: !self.no_spheres,
            show_lines: self.show_lines,
            sphere_spacing: self.sphere_spacing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn viewer_defaults() {
        let cfg = ViewerConfig::default();
        assert_eq!(cfg.background_color, DEFAULT_BACKGROUND);
        assert!(cfg.enable_helpers);
        assert!(cfg.enable_grid);
        assert_eq!(cfg.max_pixel_ratio, 2.0);
    }

    #[test]
    fn visualize_defaults() {
        let opts = VisualizeOptions::default();
        assert!(opts.show_points);
        assert!(opts.show_spheres);
        assert!(!opts.show_lines);
        assert_eq!(opts.sphere_spacing, 5);
    }

    #[test]
    fn args_map_onto_configs() {
        let args = Args::parse_from([
            "cloudview",
            "--no-grid",
            "--show-lines",
            "--sphere-spacing",
            "3",
        ]);
        let cfg = args.viewer_config();
        assert!(cfg.enable_helpers);
        assert!(!cfg.enable_grid);

        let opts = args.visualize_options();
        assert!(opts.show_points);
        assert!(opts.show_lines);
        assert_eq!(opts.sphere_spacing, 3);
    }

    #[test]
    fn background_color_flag_parses_hex() {
        let args = Args::parse_from(["cloudview", "--background-color", "#ff8000"]);
        let cfg = args.viewer_config();
        assert_relative_eq!(cfg.background_color[0], 1.0);
        assert_relative_eq!(cfg.background_color[1], 128.0 / 255.0);
        assert_relative_eq!(cfg.background_color[2], 0.0);
    }

    #[test]
    fn background_color_defaults_to_near_black() {
        let args = Args::parse_from(["cloudview"]);
        let bg = args.viewer_config().background_color;
        for channel in bg {
            assert_relative_eq!(channel, 10.0 / 255.0);
        }
    }

    #[test]
    fn background_color_rejects_malformed_hex() {
        assert!(Args::try_parse_from(["cloudview", "--background-color", "zzz"]).is_err());
        assert!(Args::try_parse_from(["cloudview", "--background-color", "12345"]).is_err());
        assert!(Args::try_parse_from(["cloudview", "--background-color", "12345g"]).is_err());
    }
}
