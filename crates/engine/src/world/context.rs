use glam::Vec2;
use tracing::debug;

use crate::config::EngineConfig;

use super::{
    render_visible_tiles, CameraFollower, MovementResolver, MovementStep, NavigationState,
    ScreenRect, TileMap, TilePosition, TileRenderSink, VisibleTiles,
};

/// Everything one tracked entity needs to walk a tile map: the map, where the
/// entity stands, what it is trying to do, and the camera following it.
///
/// Owned by the host and driven from a single thread: `tick` during the
/// simulation phase, then `visible_tiles`/`render_tiles` during rendering.
#[derive(Debug, Clone)]
pub struct WorldNavigationContext {
    resolver: MovementResolver,
    tile_size: Vec2,
    viewport: ScreenRect,
    map: TileMap,
    position: TilePosition,
    navigation: NavigationState,
    camera: CameraFollower,
}

impl WorldNavigationContext {
    pub fn new(
        config: &EngineConfig,
        viewport: ScreenRect,
        map: TileMap,
        position: TilePosition,
    ) -> Self {
        let mut context = Self {
            resolver: MovementResolver::new(config.movement),
            tile_size: config.tile_size,
            viewport,
            map,
            position,
            navigation: NavigationState::default(),
            camera: CameraFollower::default(),
        };
        context.snap_camera();
        context
    }

    /// Simulation step: resolve movement, apply it, then follow with the
    /// camera.
    pub fn tick(&mut self) -> MovementStep {
        let screen_position = self.screen_position();
        let step = self.resolver.resolve(
            &mut self.navigation,
            &self.map,
            &self.position,
            screen_position,
            self.tile_size,
        );
        self.position.move_by(step.movement, self.tile_size);
        let tracked = self.screen_position();
        self.camera
            .update(tracked, self.viewport, self.map.dimensions(), self.tile_size);
        step
    }

    pub fn tap(&mut self, screen_point: Vec2) {
        let current = self.screen_position();
        self.navigation.follow_target(screen_point, current);
    }

    pub fn set_free_direction(&mut self, direction: Vec2) {
        self.navigation.set_free_direction(direction);
    }

    pub fn clear_intent(&mut self) {
        self.navigation.clear_intent();
    }

    /// Moves to another map. The old position is dropped, pending intent is
    /// cleared, and `glide` (if non-zero) plays as scripted movement from the
    /// spawn point.
    pub fn enter_map(&mut self, map: TileMap, spawn: TilePosition, glide: Vec2) {
        debug!(
            from = ?self.position.tile,
            to = ?spawn.tile,
            width = map.width(),
            height = map.height(),
            "map_transition"
        );
        self.map = map;
        self.position = spawn;
        self.navigation = NavigationState::default();
        self.navigation.start_auto_movement(glide);
        self.snap_camera();
    }

    pub fn set_viewport(&mut self, viewport: ScreenRect) {
        self.viewport = viewport;
        self.snap_camera();
    }

    pub fn visible_tiles(&self) -> VisibleTiles {
        VisibleTiles::new(
            self.camera.map_origin(),
            self.viewport,
            self.map.dimensions(),
            self.tile_size,
        )
    }

    pub fn render_tiles<S: TileRenderSink + ?Sized>(&self, sink: &mut S) -> usize {
        render_visible_tiles(&self.visible_tiles(), &self.map, sink)
    }

    pub fn screen_position(&self) -> Vec2 {
        self.camera.screen_position_of(&self.position, self.tile_size)
    }

    pub fn position(&self) -> &TilePosition {
        &self.position
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn camera(&self) -> &CameraFollower {
        &self.camera
    }

    pub fn map(&self) -> &TileMap {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut TileMap {
        &mut self.map
    }

    pub fn viewport(&self) -> ScreenRect {
        self.viewport
    }

    pub fn tile_size(&self) -> Vec2 {
        self.tile_size
    }

    fn snap_camera(&mut self) {
        self.camera
            .snap_to(&self.position, self.viewport, self.map.dimensions(), self.tile_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{FacingDirection, NavigationIntent, TileCoord, TileDrawRequest};

    fn context_on(map: TileMap, x: i32, y: i32) -> WorldNavigationContext {
        WorldNavigationContext::new(
            &EngineConfig::default(),
            ScreenRect::new(0.0, 0.0, 320.0, 240.0),
            map,
            TilePosition::new(TileCoord::new(x, y), FacingDirection::South),
        )
    }

    #[test]
    fn walking_north_changes_tile_after_six_ticks() {
        let mut context = context_on(TileMap::filled(20, 20, 0).expect("map"), 10, 10);
        context.set_free_direction(Vec2::new(0.0, -80.0));
        let mut entered = Vec::new();
        for _ in 0..6 {
            let step = context.tick();
            entered.extend(step.entered_tile);
        }
        assert_eq!(entered, vec![TileCoord::new(10, 9)]);
        assert_eq!(context.position().tile, TileCoord::new(10, 9));
        assert_eq!(context.position().offset, Vec2::new(0.0, 14.0));
    }

    #[test]
    fn camera_keeps_tracked_entity_centered_mid_map() {
        let mut context = context_on(TileMap::filled(40, 40, 0).expect("map"), 20, 20);
        context.set_free_direction(Vec2::new(90.0, 0.0));
        for _ in 0..10 {
            context.tick();
        }
        assert_eq!(context.screen_position(), context.viewport().center());
    }

    #[test]
    fn blocked_tap_clears_intent() {
        let mut map = TileMap::filled(10, 10, 0).expect("map");
        map.set_blocked(TileCoord::new(5, 4), true);
        let mut context = context_on(map, 5, 5);
        let above = context.screen_position() - Vec2::new(0.0, 100.0);
        context.tap(above);

        let mut blocked = false;
        for _ in 0..10 {
            blocked |= context.tick().blocked;
        }
        assert!(blocked);
        assert_eq!(context.position().tile, TileCoord::new(5, 5));
        assert_eq!(context.navigation().intent(), NavigationIntent::None);
    }

    #[test]
    fn enter_map_replaces_position_and_glides() {
        let mut context = context_on(TileMap::filled(10, 10, 0).expect("map"), 1, 1);
        context.set_free_direction(Vec2::new(100.0, 0.0));
        let spawn = TilePosition::new(TileCoord::new(3, 0), FacingDirection::South);
        context.enter_map(TileMap::filled(6, 6, 2).expect("map"), spawn, Vec2::new(0.0, 32.0));

        assert_eq!(context.position(), &spawn);
        assert_eq!(context.navigation().intent(), NavigationIntent::None);
        for _ in 0..11 {
            context.tick();
        }
        assert_eq!(context.position().tile, TileCoord::new(3, 1));
        assert!(!context.navigation().is_auto_moving());
        assert_eq!(context.map().dimensions(), (6, 6));
    }

    #[test]
    fn render_tiles_covers_viewport() {
        let context = context_on(TileMap::filled(40, 40, 3).expect("map"), 20, 20);
        let mut requests = Vec::new();
        let drawn = context.render_tiles(&mut |request: TileDrawRequest| requests.push(request));
        assert_eq!(drawn, requests.len());
        assert!(drawn >= 10 * 8);
        assert!(requests.iter().all(|request| request.tile_index == 3));
    }
}
