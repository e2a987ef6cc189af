pub mod config;
pub mod debug_draw;
pub mod world;

pub use config::{from_json_with_path, ConfigError, EngineConfig, JsonPathError, DEFAULT_TILE_SIZE};
pub use debug_draw::{
    colors, Color, DebugDrawConfig, DebugShapeBatch, DebugVertex, FlushStats, LineListDraw,
    LineListSink, ShapeDescriptor, ShapeHandle,
};
pub use world::{
    CameraFollower, CollisionMap, FacingDirection, MovementConfig, MovementResolver, MovementStep,
    NavigationIntent, NavigationState, ScreenRect, TileCoord, TileDrawRequest, TileLayer,
    TileMap, TileMapError, TilePosition, TileRenderSink, VisibleTile, VisibleTiles,
    WorldNavigationContext,
};
