use bytemuck::Zeroable;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{
    box_corners, Color, DebugVertex, LineListDraw, LineListSink, ShapeDescriptor, UnitSphere,
};

pub const DEFAULT_MAX_LINES_PER_DRAW: usize = 65_535;
pub const DEFAULT_SPHERE_RESOLUTION: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugDrawConfig {
    /// Ceiling on lines per submitted draw; larger frames are split.
    pub max_lines_per_draw: usize,
    /// Segments per great circle of the sphere wireframe.
    pub sphere_resolution: u32,
}

impl Default for DebugDrawConfig {
    fn default() -> Self {
        Self {
            max_lines_per_draw: DEFAULT_MAX_LINES_PER_DRAW,
            sphere_resolution: DEFAULT_SPHERE_RESOLUTION,
        }
    }
}

/// Stable identity of a pooled shape slot. A handle returned for a new shape
/// may equal one returned earlier once that shape has expired and its slot is
/// reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeHandle(usize);

impl ShapeHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    pub vertex_count: usize,
    pub draw_calls: usize,
}

#[derive(Debug)]
struct ShapeSlot {
    vertices: Vec<DebugVertex>,
    line_count: usize,
    remaining_lifetime: f32,
}

impl ShapeSlot {
    fn capacity_lines(&self) -> usize {
        self.vertices.len() / 2
    }

    fn live_vertices(&self) -> &[DebugVertex] {
        &self.vertices[..self.line_count * 2]
    }
}

/// Pooled, lifetime-aware collection of debug line shapes.
///
/// Slots live in an arena and never shrink. Expired slots move to a cache kept
/// sorted by line capacity; a new shape takes the smallest cached slot that
/// fits before anything is allocated. Every active shape is drawn on each
/// flush, then aged by the elapsed time; a shape added with a lifetime of zero
/// is drawn exactly once.
#[derive(Debug)]
pub struct DebugShapeBatch {
    slots: Vec<ShapeSlot>,
    cached: Vec<ShapeHandle>,
    active: Vec<ShapeHandle>,
    unit_sphere: UnitSphere,
    max_lines_per_draw: usize,
    frame_vertices: Vec<DebugVertex>,
}

impl Default for DebugShapeBatch {
    fn default() -> Self {
        Self::new(DebugDrawConfig::default())
    }
}

impl DebugShapeBatch {
    pub fn new(config: DebugDrawConfig) -> Self {
        Self {
            slots: Vec::new(),
            cached: Vec::new(),
            active: Vec::new(),
            unit_sphere: UnitSphere::new(config.sphere_resolution),
            max_lines_per_draw: config.max_lines_per_draw.max(1),
            frame_vertices: Vec::new(),
        }
    }

    /// Queues `shape` for `lifetime` seconds of flushes. A non-finite
    /// lifetime is treated as zero so the shape draws once.
    pub fn add(&mut self, shape: ShapeDescriptor, color: Color, lifetime: f32) -> ShapeHandle {
        let line_count = shape.line_count(&self.unit_sphere);
        let handle = self.acquire(line_count);
        let slot = &mut self.slots[handle.0];
        slot.line_count = line_count;
        slot.remaining_lifetime = if lifetime.is_finite() { lifetime } else { 0.0 };
        shape.write_vertices(
            &self.unit_sphere,
            color,
            &mut slot.vertices[..line_count * 2],
        );
        handle
    }

    pub fn add_line(&mut self, a: Vec3, b: Vec3, color: Color, lifetime: f32) -> ShapeHandle {
        self.add(ShapeDescriptor::Line { a, b }, color, lifetime)
    }

    pub fn add_triangle(
        &mut self,
        a: Vec3,
        b: Vec3,
        c: Vec3,
        color: Color,
        lifetime: f32,
    ) -> ShapeHandle {
        self.add(ShapeDescriptor::Triangle { a, b, c }, color, lifetime)
    }

    pub fn add_box(&mut self, corners: [Vec3; 8], color: Color, lifetime: f32) -> ShapeHandle {
        self.add(ShapeDescriptor::Box { corners }, color, lifetime)
    }

    pub fn add_aabb(&mut self, min: Vec3, max: Vec3, color: Color, lifetime: f32) -> ShapeHandle {
        self.add_box(box_corners(min, max), color, lifetime)
    }

    pub fn add_frustum(&mut self, corners: [Vec3; 8], color: Color, lifetime: f32) -> ShapeHandle {
        self.add(ShapeDescriptor::Frustum { corners }, color, lifetime)
    }

    pub fn add_sphere(
        &mut self,
        center: Vec3,
        radius: f32,
        color: Color,
        lifetime: f32,
    ) -> ShapeHandle {
        self.add(ShapeDescriptor::Sphere { center, radius }, color, lifetime)
    }

    /// Draws every active shape through `sink` in chunks of at most
    /// `max_lines_per_draw` lines, then ages lifetimes by `elapsed_seconds`.
    pub fn flush<S: LineListSink + ?Sized>(
        &mut self,
        view: Mat4,
        projection: Mat4,
        elapsed_seconds: f32,
        sink: &mut S,
    ) -> FlushStats {
        if self.active.is_empty() {
            return FlushStats::default();
        }

        self.frame_vertices.clear();
        for handle in &self.active {
            self.frame_vertices
                .extend_from_slice(self.slots[handle.0].live_vertices());
        }

        let total_lines = self.frame_vertices.len() / 2;
        let mut drawn_lines = 0usize;
        let mut draw_calls = 0usize;
        while drawn_lines < total_lines {
            let primitive_count = (total_lines - drawn_lines).min(self.max_lines_per_draw);
            sink.draw_line_list(LineListDraw {
                view,
                projection,
                vertices: &self.frame_vertices,
                vertex_offset: drawn_lines * 2,
                primitive_count,
            });
            drawn_lines += primitive_count;
            draw_calls += 1;
        }
        trace!(
            shapes = self.active.len(),
            lines = total_lines,
            draw_calls,
            "debug_shapes_flushed"
        );

        self.retire_expired(elapsed_seconds);

        FlushStats {
            vertex_count: self.frame_vertices.len(),
            draw_calls,
        }
    }

    /// Moves every active shape to the cache without drawing it.
    pub fn clear(&mut self) {
        self.cached.append(&mut self.active);
        self.sort_cached();
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn cached_count(&self) -> usize {
        self.cached.len()
    }

    /// Number of slots ever allocated; unchanged when a cached slot is reused.
    pub fn allocation_count(&self) -> usize {
        self.slots.len()
    }

    pub fn active_line_count(&self) -> usize {
        self.active
            .iter()
            .map(|handle| self.slots[handle.0].line_count)
            .sum()
    }

    pub fn is_active(&self, handle: ShapeHandle) -> bool {
        self.active.contains(&handle)
    }

    /// Live vertices of an active shape.
    pub fn shape_vertices(&self, handle: ShapeHandle) -> Option<&[DebugVertex]> {
        if !self.is_active(handle) {
            return None;
        }
        self.slots.get(handle.0).map(ShapeSlot::live_vertices)
    }

    fn acquire(&mut self, line_count: usize) -> ShapeHandle {
        let reusable = self
            .cached
            .iter()
            .position(|handle| self.slots[handle.0].capacity_lines() >= line_count);

        let handle = match reusable {
            Some(position) => self.cached.remove(position),
            None => {
                self.slots.push(ShapeSlot {
                    vertices: vec![DebugVertex::zeroed(); line_count * 2],
                    line_count,
                    remaining_lifetime: 0.0,
                });
                ShapeHandle(self.slots.len() - 1)
            }
        };
        self.active.push(handle);
        handle
    }

    fn retire_expired(&mut self, elapsed_seconds: f32) {
        let slots = &mut self.slots;
        let cached = &mut self.cached;
        let before = cached.len();
        self.active.retain(|handle| {
            let slot = &mut slots[handle.0];
            slot.remaining_lifetime -= elapsed_seconds;
            if slot.remaining_lifetime <= 0.0 {
                cached.push(*handle);
                false
            } else {
                true
            }
        });
        if self.cached.len() != before {
            self.sort_cached();
        }
    }

    fn sort_cached(&mut self) {
        let slots = &self.slots;
        self.cached
            .sort_by_key(|handle| slots[handle.0].capacity_lines());
    }
}
