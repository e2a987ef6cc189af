use glam::{Mat4, Vec3};

use super::{Color, DebugVertex};

/// Corner pairs joined by the twelve edges of a box or frustum. Corners 0-3
/// are one face and 4-7 the opposite face, in matching winding.
const CUBOID_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// A debug primitive before it is expanded into line segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeDescriptor {
    Line { a: Vec3, b: Vec3 },
    Triangle { a: Vec3, b: Vec3, c: Vec3 },
    Box { corners: [Vec3; 8] },
    Frustum { corners: [Vec3; 8] },
    Sphere { center: Vec3, radius: f32 },
}

impl ShapeDescriptor {
    pub fn line_count(&self, sphere: &UnitSphere) -> usize {
        match self {
            ShapeDescriptor::Line { .. } => 1,
            ShapeDescriptor::Triangle { .. } => 3,
            ShapeDescriptor::Box { .. } | ShapeDescriptor::Frustum { .. } => CUBOID_EDGES.len(),
            ShapeDescriptor::Sphere { .. } => sphere.line_count(),
        }
    }

    /// Writes the shape's line endpoints into `out`, which must hold exactly
    /// `line_count * 2` vertices.
    pub(crate) fn write_vertices(&self, sphere: &UnitSphere, color: Color, out: &mut [DebugVertex]) {
        debug_assert_eq!(out.len(), self.line_count(sphere) * 2);
        match self {
            ShapeDescriptor::Line { a, b } => {
                out[0] = DebugVertex::new(*a, color);
                out[1] = DebugVertex::new(*b, color);
            }
            ShapeDescriptor::Triangle { a, b, c } => {
                let points = [*a, *b, *b, *c, *c, *a];
                for (slot, point) in out.iter_mut().zip(points) {
                    *slot = DebugVertex::new(point, color);
                }
            }
            ShapeDescriptor::Box { corners } | ShapeDescriptor::Frustum { corners } => {
                for (pair, (start, end)) in out.chunks_exact_mut(2).zip(CUBOID_EDGES) {
                    pair[0] = DebugVertex::new(corners[start], color);
                    pair[1] = DebugVertex::new(corners[end], color);
                }
            }
            ShapeDescriptor::Sphere { center, radius } => {
                for (slot, unit) in out.iter_mut().zip(sphere.endpoints()) {
                    *slot = DebugVertex::new(*unit * *radius + *center, color);
                }
            }
        }
    }
}

/// Corners of an axis-aligned box: the `max.z` face first, then the `min.z`
/// face, each starting top-left and going clockwise.
pub fn box_corners(min: Vec3, max: Vec3) -> [Vec3; 8] {
    [
        Vec3::new(min.x, max.y, max.z),
        Vec3::new(max.x, max.y, max.z),
        Vec3::new(max.x, min.y, max.z),
        Vec3::new(min.x, min.y, max.z),
        Vec3::new(min.x, max.y, min.z),
        Vec3::new(max.x, max.y, min.z),
        Vec3::new(max.x, min.y, min.z),
        Vec3::new(min.x, min.y, min.z),
    ]
}

/// World-space corners of the frustum of `view_projection` (near face first),
/// for clip-space depth in 0..1.
pub fn frustum_corners(view_projection: Mat4) -> [Vec3; 8] {
    let inverse = view_projection.inverse();
    let ndc = [
        Vec3::new(-1.0, 1.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(1.0, -1.0, 0.0),
        Vec3::new(-1.0, -1.0, 0.0),
        Vec3::new(-1.0, 1.0, 1.0),
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(1.0, -1.0, 1.0),
        Vec3::new(-1.0, -1.0, 1.0),
    ];
    ndc.map(|corner| inverse.project_point3(corner))
}

/// Shared unit-sphere wireframe: three great circles in the XY, XZ and YZ
/// planes. Each circle carries one segment more than its resolution, the last
/// retracing the first, so the loop closes regardless of rounding.
#[derive(Debug, Clone)]
pub struct UnitSphere {
    endpoints: Vec<Vec3>,
}

impl UnitSphere {
    pub fn new(resolution: u32) -> Self {
        let resolution = resolution.max(3);
        let step = std::f32::consts::TAU / resolution as f32;
        let segments_per_circle = resolution as usize + 1;
        let mut endpoints = Vec::with_capacity(segments_per_circle * 3 * 2);

        let planes: [fn(f32, f32) -> Vec3; 3] = [
            |c, s| Vec3::new(c, s, 0.0),
            |c, s| Vec3::new(c, 0.0, s),
            |c, s| Vec3::new(0.0, c, s),
        ];
        for plane in planes {
            for segment in 0..segments_per_circle {
                let start = segment as f32 * step;
                let end = start + step;
                endpoints.push(plane(start.cos(), start.sin()));
                endpoints.push(plane(end.cos(), end.sin()));
            }
        }

        Self { endpoints }
    }

    pub fn line_count(&self) -> usize {
        self.endpoints.len() / 2
    }

    pub fn endpoints(&self) -> &[Vec3] {
        &self.endpoints
    }
}
