use tile_engine::{FlushStats, MovementStep};

/// Counters for one reporting interval, or for a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FrameStats {
    pub(crate) frames: u32,
    pub(crate) ticks: u32,
    pub(crate) blocked_moves: u32,
    pub(crate) tiles_entered: u32,
    pub(crate) tiles_drawn: usize,
    pub(crate) line_draw_calls: usize,
    pub(crate) line_vertices: usize,
}

impl FrameStats {
    fn record_tick(&mut self, step: &MovementStep) {
        self.ticks = self.ticks.saturating_add(1);
        if step.blocked {
            self.blocked_moves = self.blocked_moves.saturating_add(1);
        }
        if step.entered_tile.is_some() {
            self.tiles_entered = self.tiles_entered.saturating_add(1);
        }
    }

    fn record_frame(&mut self, tiles_drawn: usize, flush: FlushStats) {
        self.frames = self.frames.saturating_add(1);
        self.tiles_drawn = self.tiles_drawn.saturating_add(tiles_drawn);
        self.line_draw_calls = self.line_draw_calls.saturating_add(flush.draw_calls);
        self.line_vertices = self.line_vertices.saturating_add(flush.vertex_count);
    }
}

/// Collects per-tick and per-frame counters and hands out a snapshot every
/// `interval_ticks` simulation ticks. Run totals are kept separately and are
/// never reset.
#[derive(Debug)]
pub(crate) struct FrameStatsAccumulator {
    interval_ticks: u32,
    interval: FrameStats,
    totals: FrameStats,
}

impl FrameStatsAccumulator {
    pub(crate) fn new(interval_ticks: u32) -> Self {
        Self {
            interval_ticks: interval_ticks.max(1),
            interval: FrameStats::default(),
            totals: FrameStats::default(),
        }
    }

    pub(crate) fn record_tick(&mut self, step: &MovementStep) {
        self.interval.record_tick(step);
        self.totals.record_tick(step);
    }

    pub(crate) fn record_frame(&mut self, tiles_drawn: usize, flush: FlushStats) {
        self.interval.record_frame(tiles_drawn, flush);
        self.totals.record_frame(tiles_drawn, flush);
    }

    pub(crate) fn maybe_snapshot(&mut self) -> Option<FrameStats> {
        if self.interval.ticks < self.interval_ticks {
            return None;
        }
        Some(std::mem::take(&mut self.interval))
    }

    pub(crate) fn totals(&self) -> FrameStats {
        self.totals
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use tile_engine::TileCoord;

    use super::*;

    fn moving() -> MovementStep {
        MovementStep {
            movement: Vec2::new(3.0, 0.0),
            blocked: false,
            entered_tile: None,
        }
    }

    fn blocked() -> MovementStep {
        MovementStep {
            movement: Vec2::ZERO,
            blocked: true,
            entered_tile: None,
        }
    }

    #[test]
    fn snapshot_emitted_after_interval_and_reset() {
        let mut accumulator = FrameStatsAccumulator::new(3);
        accumulator.record_tick(&moving());
        accumulator.record_tick(&blocked());
        accumulator.record_frame(
            12,
            FlushStats {
                vertex_count: 24,
                draw_calls: 1,
            },
        );
        assert!(accumulator.maybe_snapshot().is_none());

        accumulator.record_tick(&MovementStep {
            entered_tile: Some(TileCoord::new(2, 1)),
            ..moving()
        });
        let snapshot = accumulator.maybe_snapshot().expect("snapshot should be emitted");
        assert_eq!(
            snapshot,
            FrameStats {
                frames: 1,
                ticks: 3,
                blocked_moves: 1,
                tiles_entered: 1,
                tiles_drawn: 12,
                line_draw_calls: 1,
                line_vertices: 24,
            }
        );
        assert!(accumulator.maybe_snapshot().is_none());
    }

    #[test]
    fn totals_survive_snapshots() {
        let mut accumulator = FrameStatsAccumulator::new(1);
        for _ in 0..4 {
            accumulator.record_tick(&blocked());
            accumulator.record_frame(5, FlushStats::default());
            accumulator.maybe_snapshot();
        }
        let totals = accumulator.totals();
        assert_eq!(totals.ticks, 4);
        assert_eq!(totals.blocked_moves, 4);
        assert_eq!(totals.frames, 4);
        assert_eq!(totals.tiles_drawn, 20);
    }

    #[test]
    fn zero_interval_is_treated_as_every_tick() {
        let mut accumulator = FrameStatsAccumulator::new(0);
        assert!(accumulator.maybe_snapshot().is_none());
        accumulator.record_tick(&moving());
        assert!(accumulator.maybe_snapshot().is_some());
    }
}
