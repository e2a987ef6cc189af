use glam::Vec2;

use super::{TileCoord, TileLayer, TileMap, VisibleTiles};

/// One tile sprite to draw at `screen_position` (the tile's top-left corner).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileDrawRequest {
    pub layer: TileLayer,
    pub coord: TileCoord,
    pub screen_position: Vec2,
    pub tile_index: u16,
}

pub trait TileRenderSink {
    fn draw_tile(&mut self, request: TileDrawRequest);
}

impl<F: FnMut(TileDrawRequest)> TileRenderSink for F {
    fn draw_tile(&mut self, request: TileDrawRequest) {
        self(request)
    }
}

/// Paints every visible tile layer by layer: the whole base pass first, then
/// fringe, then object. Empty cells are skipped. Returns the number of
/// requests emitted.
pub fn render_visible_tiles<S: TileRenderSink + ?Sized>(
    visible: &VisibleTiles,
    map: &TileMap,
    sink: &mut S,
) -> usize {
    let mut drawn = 0usize;
    for layer in TileLayer::PAINT_ORDER {
        let mut pass = visible.clone();
        pass.restart();
        for tile in pass {
            let Some(tile_index) = map.tile_at(layer, tile.coord) else {
                continue;
            };
            sink.draw_tile(TileDrawRequest {
                layer,
                coord: tile.coord,
                screen_position: tile.screen_position(),
                tile_index,
            });
            drawn += 1;
        }
    }
    drawn
}
