//! Interactive 3D point cloud viewer library.
//!
//! Fetches a point dataset over HTTP and renders it with GPU-accelerated
//! point sprites, marker spheres and an optional connecting polyline, with
//! orbit controls and an egui overlay for stats and errors.

pub mod animation;
pub mod app;
pub mod camera;
pub mod capability;
pub mod config;
pub mod data;
pub mod error;
pub mod net;
pub mod renderer;
pub mod resize;
pub mod scene;
pub mod ui;
pub mod visualize;
