use glam::Vec2;
use thiserror::Error;

use super::TileCoord;

/// Answers whether a map cell can be entered. The engine only ever asks; the
/// implementor owns the bounds policy for coordinates outside its map.
pub trait CollisionMap {
    fn is_blocked(&self, coord: TileCoord) -> bool;
}

impl<T: CollisionMap + ?Sized> CollisionMap for &T {
    fn is_blocked(&self, coord: TileCoord) -> bool {
        (**self).is_blocked(coord)
    }
}

/// Draw layers, in the order they are painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileLayer {
    Base,
    Fringe,
    Object,
}

impl TileLayer {
    pub const PAINT_ORDER: [TileLayer; 3] = [TileLayer::Base, TileLayer::Fringe, TileLayer::Object];

    pub const fn name(self) -> &'static str {
        match self {
            TileLayer::Base => "base",
            TileLayer::Fringe => "fringe",
            TileLayer::Object => "object",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TileMapError {
    #[error("tile map dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },
    #[error("{layer} layer tile count mismatch: expected {expected}, got {actual}")]
    LayerSizeMismatch {
        layer: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Layered tile map, stored row-major with row 0 at the top of the screen.
///
/// Cells outside the map are reported as blocked.
#[derive(Debug, Clone, PartialEq)]
pub struct TileMap {
    width: u32,
    height: u32,
    base: Vec<Option<u16>>,
    fringe: Vec<Option<u16>>,
    object: Vec<Option<u16>>,
    collision: Vec<bool>,
}

impl TileMap {
    pub fn new(
        width: u32,
        height: u32,
        base: Vec<Option<u16>>,
        collision: Vec<bool>,
    ) -> Result<Self, TileMapError> {
        if width == 0 || height == 0 {
            return Err(TileMapError::ZeroDimensions { width, height });
        }
        let expected = width as usize * height as usize;
        check_layer_len("base", expected, base.len())?;
        check_layer_len("collision", expected, collision.len())?;
        Ok(Self {
            width,
            height,
            base,
            fringe: vec![None; expected],
            object: vec![None; expected],
            collision,
        })
    }

    /// Open map with every base cell set to `base_index`.
    pub fn filled(width: u32, height: u32, base_index: u16) -> Result<Self, TileMapError> {
        let count = width as usize * height as usize;
        Self::new(width, height, vec![Some(base_index); count], vec![false; count])
    }

    pub fn with_layer(
        mut self,
        layer: TileLayer,
        tiles: Vec<Option<u16>>,
    ) -> Result<Self, TileMapError> {
        check_layer_len(layer.name(), self.cell_count(), tiles.len())?;
        *self.layer_mut(layer) = tiles;
        Ok(self)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Size of the whole map in pixels.
    pub fn pixel_size(&self, tile_size: Vec2) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32) * tile_size
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        self.index_of(coord).is_some()
    }

    pub fn index_of(&self, coord: TileCoord) -> Option<usize> {
        if coord.x < 0 || coord.y < 0 {
            return None;
        }
        let (x, y) = (coord.x as u32, coord.y as u32);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn tile_at(&self, layer: TileLayer, coord: TileCoord) -> Option<u16> {
        self.index_of(coord)
            .and_then(|index| self.layer(layer).get(index).copied().flatten())
    }

    /// Returns false when `coord` is outside the map.
    pub fn set_blocked(&mut self, coord: TileCoord, blocked: bool) -> bool {
        let Some(index) = self.index_of(coord) else {
            return false;
        };
        self.collision[index] = blocked;
        true
    }

    fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    fn layer(&self, layer: TileLayer) -> &[Option<u16>] {
        match layer {
            TileLayer::Base => &self.base,
            TileLayer::Fringe => &self.fringe,
            TileLayer::Object => &self.object,
        }
    }

    fn layer_mut(&mut self, layer: TileLayer) -> &mut Vec<Option<u16>> {
        match layer {
            TileLayer::Base => &mut self.base,
            TileLayer::Fringe => &mut self.fringe,
            TileLayer::Object => &mut self.object,
        }
    }
}

impl CollisionMap for TileMap {
    fn is_blocked(&self, coord: TileCoord) -> bool {
        self.index_of(coord)
            .and_then(|index| self.collision.get(index))
            .copied()
            .unwrap_or(true)
    }
}

fn check_layer_len(layer: &'static str, expected: usize, actual: usize) -> Result<(), TileMapError> {
    if expected != actual {
        return Err(TileMapError::LayerSizeMismatch {
            layer,
            expected,
            actual,
        });
    }
    Ok(())
}
