//! Immediate-mode wireframe shapes for debugging, batched into line lists.

mod batch;
mod shape;
mod vertex;

pub use batch::{
    DebugDrawConfig, DebugShapeBatch, FlushStats, ShapeHandle, DEFAULT_MAX_LINES_PER_DRAW,
    DEFAULT_SPHERE_RESOLUTION,
};
pub use shape::{box_corners, frustum_corners, ShapeDescriptor, UnitSphere};
pub use vertex::{colors, Color, DebugVertex, LineListDraw, LineListSink};
