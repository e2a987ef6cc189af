//! Vertex layout and draw sink for debug line rendering

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Linear RGBA.
pub type Color = [f32; 4];

/// Position + color, laid out for direct upload to a vertex buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct DebugVertex {
    pub position: [f32; 3],
    pub color: Color,
}

impl DebugVertex {
    pub fn new(position: Vec3, color: Color) -> Self {
        Self {
            position: position.to_array(),
            color,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

/// One line-list submission. `vertices` is the whole frame buffer; the draw
/// covers `primitive_count` lines starting at `vertex_offset`.
#[derive(Debug, Clone, Copy)]
pub struct LineListDraw<'a> {
    pub view: Mat4,
    pub projection: Mat4,
    pub vertices: &'a [DebugVertex],
    pub vertex_offset: usize,
    pub primitive_count: usize,
}

impl<'a> LineListDraw<'a> {
    /// The vertices this draw actually consumes.
    pub fn vertices_in_draw(&self) -> &'a [DebugVertex] {
        let end = self.vertex_offset + self.primitive_count * 2;
        &self.vertices[self.vertex_offset..end]
    }
}

/// Receives batched line lists; a GPU backend turns each call into one draw.
pub trait LineListSink {
    fn draw_line_list(&mut self, draw: LineListDraw<'_>);
}

pub mod colors {
    use super::Color;

    pub const WHITE: Color = [1.0, 1.0, 1.0, 1.0];
    pub const RED: Color = [1.0, 0.2, 0.2, 1.0];
    pub const GREEN: Color = [0.2, 0.9, 0.3, 1.0];
    pub const BLUE: Color = [0.3, 0.5, 1.0, 1.0];
    pub const YELLOW: Color = [1.0, 0.85, 0.2, 1.0];
    pub const CYAN: Color = [0.3, 0.9, 1.0, 1.0];
    pub const MAGENTA: Color = [0.9, 0.3, 0.9, 1.0];
}
