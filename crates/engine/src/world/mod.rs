//! Tile-based world navigation: positions, collision, movement resolution,
//! camera follow and tile visibility.

mod camera;
mod context;
mod movement;
mod tile_position;
mod tile_render;
mod tilemap;
mod transform;
mod visibility;

pub use camera::CameraFollower;
pub use context::WorldNavigationContext;
pub use movement::{
    MovementConfig, MovementResolver, MovementStep, NavigationIntent, NavigationState,
    DEFAULT_COLLISION_TOLERANCE, DEFAULT_FOLLOW_ARRIVAL_THRESHOLD, DEFAULT_FOLLOW_STEP,
    DEFAULT_INPUT_DEADZONE, DEFAULT_SPEED_PER_TICK,
};
pub use tile_position::{FacingDirection, TileCoord, TilePosition};
pub use tile_render::{render_visible_tiles, TileDrawRequest, TileRenderSink};
pub use tilemap::{CollisionMap, TileLayer, TileMap, TileMapError};
pub use transform::{
    position_to_screen, screen_to_tile, tile_screen_rect, tile_to_map_px, ScreenRect,
};
pub use visibility::{intersects_viewport, is_tile_visible, VisibleTile, VisibleTiles};
