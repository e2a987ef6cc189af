use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Column/row of a map cell. Signed so neighbor queries past the map edge stay
/// expressible; the collision map decides what lies out there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    pub fn step(self, direction: FacingDirection) -> Self {
        let (dx, dy) = direction.tile_delta();
        self.offset(dx, dy)
    }
}

/// Screen-space facing. North is towards smaller row indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FacingDirection {
    North,
    #[default]
    South,
    East,
    West,
}

impl FacingDirection {
    pub const fn tile_delta(self) -> (i32, i32) {
        match self {
            FacingDirection::North => (0, -1),
            FacingDirection::South => (0, 1),
            FacingDirection::East => (1, 0),
            FacingDirection::West => (-1, 0),
        }
    }

    /// Facing implied by the dominant axis of `movement`. Ties go to the
    /// vertical axis.
    pub fn from_movement(movement: Vec2) -> Option<Self> {
        if movement.x == 0.0 && movement.y == 0.0 {
            return None;
        }
        if movement.x.abs() > movement.y.abs() {
            if movement.x > 0.0 {
                Some(FacingDirection::East)
            } else {
                Some(FacingDirection::West)
            }
        } else if movement.y > 0.0 {
            Some(FacingDirection::South)
        } else {
            Some(FacingDirection::North)
        }
    }
}

/// Where an entity stands: a tile plus a pixel offset from that tile's center.
///
/// The offset is kept within half a tile on each axis; moving past that edge
/// advances `tile` and re-expresses the offset in the new tile's frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TilePosition {
    pub tile: TileCoord,
    pub offset: Vec2,
    pub facing: FacingDirection,
}

impl TilePosition {
    pub fn new(tile: TileCoord, facing: FacingDirection) -> Self {
        Self {
            tile,
            offset: Vec2::ZERO,
            facing,
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Position after applying `movement`, without touching `self`.
    pub fn moved(&self, movement: Vec2, tile_size: Vec2) -> Self {
        let mut next = *self;
        next.move_by(movement, tile_size);
        next
    }

    pub fn move_by(&mut self, movement: Vec2, tile_size: Vec2) {
        if let Some(facing) = FacingDirection::from_movement(movement) {
            self.facing = facing;
        }
        self.offset += movement;
        wrap_axis(&mut self.tile.x, &mut self.offset.x, tile_size.x);
        wrap_axis(&mut self.tile.y, &mut self.offset.y, tile_size.y);
    }
}

fn wrap_axis(tile: &mut i32, offset: &mut f32, tile_extent: f32) {
    if tile_extent.is_nan() || tile_extent <= 0.0 || !offset.is_finite() {
        return;
    }
    let half = tile_extent * 0.5;
    if *offset >= -half && *offset <= half {
        return;
    }
    let shift = ((*offset + half) / tile_extent).floor();
    *tile = tile.saturating_add(shift as i32);
    *offset -= shift * tile_extent;
}
