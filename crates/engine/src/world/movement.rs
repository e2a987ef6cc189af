use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CollisionMap, TileCoord, TilePosition};

pub const DEFAULT_SPEED_PER_TICK: f32 = 3.0;
pub const DEFAULT_INPUT_DEADZONE: f32 = 25.0;
pub const DEFAULT_COLLISION_TOLERANCE: f32 = 12.0;
pub const DEFAULT_FOLLOW_ARRIVAL_THRESHOLD: f32 = 3.0;
pub const DEFAULT_FOLLOW_STEP: f32 = 3.0;

/// Tuning for [`MovementResolver`]. Distances are in map pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub speed_per_tick: f32,
    /// Input components at or below this magnitude are treated as zero.
    pub input_deadzone: f32,
    /// Perpendicular overlap past which the diagonal neighbor is also checked.
    pub collision_tolerance: f32,
    pub follow_arrival_threshold: f32,
    /// Distance budget consumed by each follow-target tick.
    pub follow_step: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            speed_per_tick: DEFAULT_SPEED_PER_TICK,
            input_deadzone: DEFAULT_INPUT_DEADZONE,
            collision_tolerance: DEFAULT_COLLISION_TOLERANCE,
            follow_arrival_threshold: DEFAULT_FOLLOW_ARRIVAL_THRESHOLD,
            follow_step: DEFAULT_FOLLOW_STEP,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum NavigationIntent {
    #[default]
    None,
    /// Raw directional input on a roughly -100..100 scale.
    FreeDirection(Vec2),
    /// Walk towards a screen point until the distance budget runs out.
    FollowTarget { point: Vec2, remaining_distance: f32 },
}

/// Per-entity navigation input: the live intent plus any scripted glide.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NavigationState {
    intent: NavigationIntent,
    auto_movement: Vec2,
}

impl NavigationState {
    pub fn intent(&self) -> NavigationIntent {
        self.intent
    }

    pub fn set_intent(&mut self, intent: NavigationIntent) {
        self.intent = intent;
    }

    pub fn clear_intent(&mut self) {
        self.intent = NavigationIntent::None;
    }

    pub fn set_free_direction(&mut self, direction: Vec2) {
        self.intent = NavigationIntent::FreeDirection(direction);
    }

    /// Starts following `point`. Tapping the point already being followed
    /// keeps the current distance budget.
    pub fn follow_target(&mut self, point: Vec2, current_screen_position: Vec2) {
        if let NavigationIntent::FollowTarget { point: current, .. } = self.intent {
            if current == point {
                return;
            }
        }
        self.intent = NavigationIntent::FollowTarget {
            point,
            remaining_distance: (point - current_screen_position).length(),
        };
    }

    /// Remaining scripted movement, consumed ahead of any live intent.
    pub fn auto_movement(&self) -> Vec2 {
        self.auto_movement
    }

    pub fn start_auto_movement(&mut self, total: Vec2) {
        self.auto_movement = total;
    }

    pub fn is_auto_moving(&self) -> bool {
        self.auto_movement != Vec2::ZERO
    }
}

/// Outcome of one resolver tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementStep {
    /// Movement to apply this tick; zero when idle or blocked.
    pub movement: Vec2,
    pub blocked: bool,
    /// Set when the step carries the entity into a different tile, so the
    /// host can evaluate encounters keyed on it.
    pub entered_tile: Option<TileCoord>,
}

impl MovementStep {
    pub const IDLE: MovementStep = MovementStep {
        movement: Vec2::ZERO,
        blocked: false,
        entered_tile: None,
    };

    const BLOCKED: MovementStep = MovementStep {
        movement: Vec2::ZERO,
        blocked: true,
        entered_tile: None,
    };

    pub fn is_idle(&self) -> bool {
        self.movement == Vec2::ZERO
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MovementResolver {
    config: MovementConfig,
}

impl MovementResolver {
    pub fn new(config: MovementConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    /// Computes this tick's movement for an entity at `position`, whose
    /// on-screen point is `screen_position`.
    ///
    /// Scripted auto-movement wins over the live intent and is not collision
    /// checked. A blocked move, or a follow target whose distance budget ran
    /// out, clears the intent.
    pub fn resolve<M: CollisionMap + ?Sized>(
        &self,
        navigation: &mut NavigationState,
        collision_map: &M,
        position: &TilePosition,
        screen_position: Vec2,
        tile_size: Vec2,
    ) -> MovementStep {
        if navigation.is_auto_moving() {
            let movement = self.auto_step(navigation.auto_movement);
            navigation.auto_movement -= movement;
            let next = position.moved(movement, tile_size);
            return MovementStep {
                movement,
                blocked: false,
                entered_tile: (next.tile != position.tile).then_some(next.tile),
            };
        }

        let desired = self.desired_movement(navigation, screen_position);
        if desired == Vec2::ZERO {
            return MovementStep::IDLE;
        }
        let movement = desired.normalize() * self.config.speed_per_tick;

        let next = position.moved(movement, tile_size);
        if next.tile == position.tile {
            return MovementStep {
                movement,
                blocked: false,
                entered_tile: None,
            };
        }

        if let Some(blocking) = self.first_blocked_crossing(collision_map, position, movement, &next)
        {
            debug!(
                tile = ?position.tile,
                attempted = ?next.tile,
                blocking = ?blocking,
                "movement_blocked"
            );
            navigation.clear_intent();
            return MovementStep::BLOCKED;
        }

        MovementStep {
            movement,
            blocked: false,
            entered_tile: Some(next.tile),
        }
    }

    /// Normalized glide step, trimmed per axis so it never passes the end.
    fn auto_step(&self, remaining: Vec2) -> Vec2 {
        let step = remaining.normalize_or_zero() * self.config.speed_per_tick;
        Vec2::new(
            clamp_to_remaining(step.x, remaining.x),
            clamp_to_remaining(step.y, remaining.y),
        )
    }

    fn desired_movement(&self, navigation: &mut NavigationState, screen_position: Vec2) -> Vec2 {
        match navigation.intent {
            NavigationIntent::None => Vec2::ZERO,
            NavigationIntent::FreeDirection(direction) => self.apply_deadzone(direction),
            NavigationIntent::FollowTarget {
                point,
                remaining_distance,
            } => {
                if remaining_distance < self.config.follow_arrival_threshold {
                    debug!(target = ?point, "follow_target_complete");
                    navigation.clear_intent();
                    return Vec2::ZERO;
                }
                navigation.intent = NavigationIntent::FollowTarget {
                    point,
                    remaining_distance: (remaining_distance - self.config.follow_step).max(0.0),
                };
                self.apply_deadzone(point - screen_position)
            }
        }
    }

    fn apply_deadzone(&self, input: Vec2) -> Vec2 {
        let deadzone = self.config.input_deadzone;
        let axis = |value: f32| if value.abs() <= deadzone { 0.0 } else { value };
        Vec2::new(axis(input.x), axis(input.y))
    }

    /// Tiles that must be open for a move from `from` to `to`: the
    /// straight-ahead neighbor across each crossed edge, the diagonal
    /// neighbor along that edge when the entity hugs the perpendicular side
    /// past the tolerance, and the corner tile when both edges are crossed.
    /// A step crosses at most one edge per axis; `EngineConfig::validate`
    /// caps the speed at half a tile.
    fn first_blocked_crossing<M: CollisionMap + ?Sized>(
        &self,
        collision_map: &M,
        from: &TilePosition,
        movement: Vec2,
        to: &TilePosition,
    ) -> Option<TileCoord> {
        let current = from.tile;
        let reach = from.offset + movement;
        let tolerance = self.config.collision_tolerance;
        let crosses_x = to.tile.x != current.x;
        let crosses_y = to.tile.y != current.y;

        let mut checks = Vec::with_capacity(5);
        if crosses_x {
            let column = to.tile.x;
            checks.push(TileCoord::new(column, current.y));
            if reach.y > tolerance {
                checks.push(TileCoord::new(column, current.y.saturating_add(1)));
            } else if reach.y < -tolerance {
                checks.push(TileCoord::new(column, current.y.saturating_sub(1)));
            }
        }
        if crosses_y {
            let row = to.tile.y;
            checks.push(TileCoord::new(current.x, row));
            if reach.x > tolerance {
                checks.push(TileCoord::new(current.x.saturating_add(1), row));
            } else if reach.x < -tolerance {
                checks.push(TileCoord::new(current.x.saturating_sub(1), row));
            }
        }
        if crosses_x && crosses_y {
            checks.push(to.tile);
        }

        checks
            .into_iter()
            .find(|coord| collision_map.is_blocked(*coord))
    }
}

fn clamp_to_remaining(step: f32, remaining: f32) -> f32 {
    if step.abs() > remaining.abs() {
        remaining
    } else {
        step
    }
}
