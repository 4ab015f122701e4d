pub mod geometry;
pub mod types;
