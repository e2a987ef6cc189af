use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{TileCoord, TilePosition};

/// Axis-aligned screen rectangle; `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top_left(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn bottom_right(&self) -> Vec2 {
        self.top_left() + self.size()
    }

    pub fn center(&self) -> Vec2 {
        self.top_left() + self.size() * 0.5
    }

    /// Grows the rectangle by `margin` on every side.
    pub fn inflate(&self, margin: Vec2) -> Self {
        Self {
            x: self.x - margin.x,
            y: self.y - margin.y,
            width: self.width + margin.x * 2.0,
            height: self.height + margin.y * 2.0,
        }
    }
}

/// Top-left corner of `coord` in map pixel space.
pub fn tile_to_map_px(coord: TileCoord, tile_size: Vec2) -> Vec2 {
    Vec2::new(coord.x as f32, coord.y as f32) * tile_size
}

pub fn tile_screen_rect(coord: TileCoord, map_origin: Vec2, tile_size: Vec2) -> ScreenRect {
    let top_left = map_origin + tile_to_map_px(coord, tile_size);
    ScreenRect::new(top_left.x, top_left.y, tile_size.x, tile_size.y)
}

/// Screen point of an entity: its tile's center plus the sub-tile offset.
pub fn position_to_screen(position: &TilePosition, map_origin: Vec2, tile_size: Vec2) -> Vec2 {
    map_origin + tile_to_map_px(position.tile, tile_size) + tile_size * 0.5 + position.offset
}

pub fn screen_to_tile(screen: Vec2, map_origin: Vec2, tile_size: Vec2) -> TileCoord {
    let local = (screen - map_origin) / tile_size;
    TileCoord::new(local.x.floor() as i32, local.y.floor() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::FacingDirection;

    const TILE: Vec2 = Vec2::new(32.0, 32.0);

    #[test]
    fn tile_center_maps_through_origin() {
        let position = TilePosition::new(TileCoord::new(2, 1), FacingDirection::South);
        let screen = position_to_screen(&position, Vec2::new(-10.0, 5.0), TILE);
        assert_eq!(screen, Vec2::new(-10.0 + 64.0 + 16.0, 5.0 + 32.0 + 16.0));
    }

    #[test]
    fn offset_shifts_screen_position() {
        let position = TilePosition::new(TileCoord::new(0, 0), FacingDirection::South)
            .with_offset(Vec2::new(3.0, -4.0));
        let screen = position_to_screen(&position, Vec2::ZERO, TILE);
        assert_eq!(screen, Vec2::new(19.0, 12.0));
    }

    #[test]
    fn screen_to_tile_floors_negative_coordinates() {
        assert_eq!(
            screen_to_tile(Vec2::new(-1.0, 31.9), Vec2::ZERO, TILE),
            TileCoord::new(-1, 0)
        );
        assert_eq!(
            screen_to_tile(Vec2::new(100.0, 100.0), Vec2::new(36.0, 36.0), TILE),
            TileCoord::new(2, 2)
        );
    }

    #[test]
    fn screen_to_tile_inverts_position_to_screen() {
        let origin = Vec2::new(-250.0, 40.0);
        let position = TilePosition::new(TileCoord::new(7, 3), FacingDirection::East)
            .with_offset(Vec2::new(-15.0, 15.0));
        let screen = position_to_screen(&position, origin, TILE);
        assert_eq!(screen_to_tile(screen, origin, TILE), position.tile);
    }

    #[test]
    fn inflate_grows_each_side() {
        let rect = ScreenRect::new(10.0, 20.0, 100.0, 50.0).inflate(Vec2::new(5.0, 2.0));
        assert_eq!(rect, ScreenRect::new(5.0, 18.0, 110.0, 54.0));
        assert_eq!(rect.bottom_right(), Vec2::new(115.0, 72.0));
    }
}
