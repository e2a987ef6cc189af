use glam::Vec2;

use super::transform::{position_to_screen, ScreenRect};
use super::TilePosition;

/// Snap-follow camera over a tile map.
///
/// `map_origin` is the screen position of the map's top-left corner. Each
/// update recenters the tracked point, then pushes the map back so no empty
/// band opens inside the viewport. A map narrower than the viewport on an
/// axis is centered on that axis instead.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraFollower {
    map_origin: Vec2,
}

impl CameraFollower {
    pub fn new(map_origin: Vec2) -> Self {
        Self { map_origin }
    }

    pub fn map_origin(&self) -> Vec2 {
        self.map_origin
    }

    pub fn set_map_origin(&mut self, map_origin: Vec2) {
        self.map_origin = map_origin;
    }

    /// Screen point of `position` under the current origin.
    pub fn screen_position_of(&self, position: &TilePosition, tile_size: Vec2) -> Vec2 {
        position_to_screen(position, self.map_origin, tile_size)
    }

    pub fn update(
        &mut self,
        tracked_screen_position: Vec2,
        viewport: ScreenRect,
        map_dimensions: (u32, u32),
        tile_size: Vec2,
    ) {
        self.map_origin += viewport.center() - tracked_screen_position;

        let map_extent = Vec2::new(map_dimensions.0 as f32, map_dimensions.1 as f32) * tile_size;
        self.map_origin.x = contain_axis(self.map_origin.x, map_extent.x, viewport.x, viewport.width);
        self.map_origin.y =
            contain_axis(self.map_origin.y, map_extent.y, viewport.y, viewport.height);
    }

    /// Recenters on `position` in one step, e.g. after a map transition.
    pub fn snap_to(
        &mut self,
        position: &TilePosition,
        viewport: ScreenRect,
        map_dimensions: (u32, u32),
        tile_size: Vec2,
    ) {
        let tracked = self.screen_position_of(position, tile_size);
        self.update(tracked, viewport, map_dimensions, tile_size);
    }
}

fn contain_axis(origin: f32, map_extent: f32, viewport_start: f32, viewport_extent: f32) -> f32 {
    if map_extent < viewport_extent {
        return viewport_start + (viewport_extent - map_extent) * 0.5;
    }
    let origin = origin.min(viewport_start);
    let gap = (viewport_start + viewport_extent) - (origin + map_extent);
    origin + gap.max(0.0)
}
