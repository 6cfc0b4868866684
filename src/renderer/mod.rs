//! Rendering seam
//!
//! Mesh generation and drawing live outside the core. The simulation only
//! asks a renderer to (re)build an entity's visual from its [`Shape`] and to
//! toggle visibility.

use serde::{Deserialize, Serialize};

use crate::sim::Target;

/// Mesh families the renderer knows how to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MeshType {
    Triangle,
    #[default]
    Circle,
}

/// Size/shape parameters handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub mesh: MeshType,
    pub radius: f32,
    pub vertices: u32,
    /// Radial noise applied to the outline (0 = perfect polygon)
    pub jitter: f32,
}

impl Default for Shape {
    fn default() -> Self {
        Self {
            mesh: MeshType::Circle,
            radius: 1.0,
            vertices: 10,
            jitter: 0.0,
        }
    }
}

impl Shape {
    pub fn circle(radius: f32, vertices: u32, jitter: f32) -> Self {
        Self {
            mesh: MeshType::Circle,
            radius,
            vertices,
            jitter,
        }
    }
}

/// Visual representation collaborator
pub trait Renderer {
    /// Build (or rebuild) the visible shape and collision outline for a target
    fn rebuild_visual(&mut self, target: Target, shape: &Shape);
    /// Show or hide a target
    fn set_visible(&mut self, target: Target, visible: bool);
}

/// Renderer that ignores every call (headless runs, tests)
#[derive(Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn rebuild_visual(&mut self, _target: Target, _shape: &Shape) {}
    fn set_visible(&mut self, _target: Target, _visible: bool) {}
}
