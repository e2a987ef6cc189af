//! Headless render sinks. They record what a GPU backend would have been
//! asked to draw.

use tile_engine::{LineListDraw, LineListSink, TileDrawRequest, TileLayer, TileRenderSink};

#[derive(Debug, Default)]
pub(crate) struct CountingTileSink {
    per_layer: [usize; 3],
}

impl CountingTileSink {
    pub(crate) fn total(&self) -> usize {
        self.per_layer.iter().sum()
    }

    pub(crate) fn layer(&self, layer: TileLayer) -> usize {
        self.per_layer[layer_slot(layer)]
    }
}

impl TileRenderSink for CountingTileSink {
    fn draw_tile(&mut self, request: TileDrawRequest) {
        self.per_layer[layer_slot(request.layer)] += 1;
    }
}

fn layer_slot(layer: TileLayer) -> usize {
    match layer {
        TileLayer::Base => 0,
        TileLayer::Fringe => 1,
        TileLayer::Object => 2,
    }
}

#[derive(Debug, Default)]
pub(crate) struct CountingLineSink {
    pub(crate) draw_calls: usize,
    pub(crate) lines: usize,
    pub(crate) uploaded_bytes: usize,
}

impl LineListSink for CountingLineSink {
    fn draw_line_list(&mut self, draw: LineListDraw<'_>) {
        self.draw_calls += 1;
        self.lines += draw.primitive_count;
        let bytes: &[u8] = bytemuck::cast_slice(draw.vertices_in_draw());
        self.uploaded_bytes += bytes.len();
    }
}
