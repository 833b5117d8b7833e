//! Core rendering primitives

pub mod camera;
pub mod mesh;

pub use camera::Camera;
pub use mesh::{Mesh, Vertex};
