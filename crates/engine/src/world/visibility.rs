use std::iter::FusedIterator;

use glam::Vec2;

use super::transform::{tile_screen_rect, ScreenRect};
use super::TileCoord;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleTile {
    pub coord: TileCoord,
    pub screen_rect: ScreenRect,
}

impl VisibleTile {
    pub fn screen_position(&self) -> Vec2 {
        self.screen_rect.top_left()
    }
}

/// Open-interval overlap of `screen_rect` with `viewport`.
pub fn intersects_viewport(screen_rect: ScreenRect, viewport: ScreenRect) -> bool {
    screen_rect.x > viewport.x - screen_rect.width
        && screen_rect.y > viewport.y - screen_rect.height
        && screen_rect.x < viewport.x + viewport.width
        && screen_rect.y < viewport.y + viewport.height
}

/// Visibility with a one-tile margin on every side, so the ring of tiles just
/// outside the viewport is drawn and scrolling never reveals a missing edge.
pub fn is_tile_visible(screen_rect: ScreenRect, viewport: ScreenRect) -> bool {
    intersects_viewport(screen_rect, viewport.inflate(screen_rect.size()))
}

/// Row-major walk over every map cell, yielding the visible ones.
///
/// Each tile is tested on its own; there is no row skipping. Cloning the
/// iterator, or calling [`VisibleTiles::restart`], replays the sequence.
#[derive(Debug, Clone)]
pub struct VisibleTiles {
    map_origin: Vec2,
    viewport: ScreenRect,
    tile_size: Vec2,
    width: u32,
    cell_count: usize,
    next_index: usize,
}

impl VisibleTiles {
    pub fn new(
        map_origin: Vec2,
        viewport: ScreenRect,
        map_dimensions: (u32, u32),
        tile_size: Vec2,
    ) -> Self {
        let (width, height) = map_dimensions;
        Self {
            map_origin,
            viewport,
            tile_size,
            width,
            cell_count: width as usize * height as usize,
            next_index: 0,
        }
    }

    pub fn restart(&mut self) {
        self.next_index = 0;
    }

    fn coord_at(&self, index: usize) -> TileCoord {
        let width = self.width as usize;
        TileCoord::new((index % width) as i32, (index / width) as i32)
    }
}

impl Iterator for VisibleTiles {
    type Item = VisibleTile;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next_index < self.cell_count {
            let coord = self.coord_at(self.next_index);
            self.next_index += 1;
            let screen_rect = tile_screen_rect(coord, self.map_origin, self.tile_size);
            if is_tile_visible(screen_rect, self.viewport) {
                return Some(VisibleTile { coord, screen_rect });
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.cell_count.saturating_sub(self.next_index)))
    }
}

impl FusedIterator for VisibleTiles {}

#[cfg(test)]
mod tests {
    use super::*;

    const TILE: Vec2 = Vec2::new(32.0, 32.0);
    const VIEWPORT: ScreenRect = ScreenRect::new(0.0, 0.0, 320.0, 240.0);

    fn rect_at(x: f32, y: f32) -> ScreenRect {
        ScreenRect::new(x, y, TILE.x, TILE.y)
    }

    #[test]
    fn one_tile_outside_is_visible_two_is_not() {
        assert!(is_tile_visible(rect_at(-32.0, 100.0), VIEWPORT));
        assert!(!is_tile_visible(rect_at(-64.0, 100.0), VIEWPORT));

        assert!(is_tile_visible(rect_at(320.0, 100.0), VIEWPORT));
        assert!(!is_tile_visible(rect_at(352.0, 100.0), VIEWPORT));

        assert!(is_tile_visible(rect_at(100.0, -32.0), VIEWPORT));
        assert!(!is_tile_visible(rect_at(100.0, -64.0), VIEWPORT));

        assert!(is_tile_visible(rect_at(100.0, 240.0), VIEWPORT));
        assert!(!is_tile_visible(rect_at(100.0, 272.0), VIEWPORT));
    }

    #[test]
    fn raw_intersection_excludes_touching_rect() {
        assert!(!intersects_viewport(rect_at(-32.0, 0.0), VIEWPORT));
        assert!(intersects_viewport(rect_at(-31.0, 0.0), VIEWPORT));
    }

    #[test]
    fn enumerates_row_major_with_margin() {
        let tiles: Vec<TileCoord> = VisibleTiles::new(Vec2::ZERO, VIEWPORT, (40, 40), TILE)
            .map(|tile| tile.coord)
            .collect();
        // Columns 0..=10 (320 / 32 plus the margin column); rows 0..=8, the
        // last one only partly inside the margin band.
        assert_eq!(tiles.len(), 11 * 9);
        assert_eq!(tiles.first(), Some(&TileCoord::new(0, 0)));
        assert_eq!(tiles[1], TileCoord::new(1, 0));
        assert_eq!(tiles[11], TileCoord::new(0, 1));
        assert_eq!(tiles.last(), Some(&TileCoord::new(10, 8)));
    }

    #[test]
    fn scrolled_map_skips_rows_above_viewport() {
        let origin = Vec2::new(-320.0, -320.0);
        let tiles: Vec<TileCoord> = VisibleTiles::new(origin, VIEWPORT, (40, 40), TILE)
            .map(|tile| tile.coord)
            .collect();
        assert_eq!(tiles.first(), Some(&TileCoord::new(9, 9)));
        assert_eq!(tiles.last(), Some(&TileCoord::new(20, 18)));
        assert_eq!(tiles.len(), 12 * 10);
        let brute: Vec<TileCoord> = (0..40)
            .flat_map(|y| (0..40).map(move |x| TileCoord::new(x, y)))
            .filter(|coord| is_tile_visible(tile_screen_rect(*coord, origin, TILE), VIEWPORT))
            .collect();
        assert_eq!(tiles, brute);
    }

    #[test]
    fn restart_replays_sequence() {
        let mut visible = VisibleTiles::new(Vec2::new(-10.0, -10.0), VIEWPORT, (20, 20), TILE);
        let first: Vec<VisibleTile> = visible.by_ref().collect();
        assert!(visible.next().is_none());
        visible.restart();
        let second: Vec<VisibleTile> = visible.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn screen_position_is_tile_top_left() {
        let tile = VisibleTiles::new(Vec2::new(5.0, 7.0), VIEWPORT, (3, 3), TILE)
            .nth(4)
            .expect("tile");
        assert_eq!(tile.coord, TileCoord::new(1, 1));
        assert_eq!(tile.screen_position(), Vec2::new(37.0, 39.0));
    }

    #[test]
    fn empty_map_yields_nothing() {
        assert_eq!(VisibleTiles::new(Vec2::ZERO, VIEWPORT, (0, 5), TILE).count(), 0);
    }
}
