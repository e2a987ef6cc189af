use std::collections::BTreeMap;
use std::process::ExitCode;
use std::time::Duration;

use glam::Mat4;
use tile_engine::{
    colors, DebugShapeBatch, EngineConfig, FacingDirection, TileCoord, TileLayer, TileMap,
    TilePosition, WorldNavigationContext,
};
use tracing::{info, trace, warn};

use super::bootstrap::AppWiring;
use super::metrics::{FrameStats, FrameStatsAccumulator};
use super::scenario::{Scenario, ScenarioAction, ScenarioEvent};
use super::sinks::{CountingLineSink, CountingTileSink};

#[derive(Debug, Clone)]
pub(crate) struct LoopConfig {
    pub(crate) target_tps: u32,
    /// Simulated wall-clock time per rendered frame.
    pub(crate) frame_time: Duration,
    pub(crate) max_ticks_per_frame: u32,
    pub(crate) stats_interval_ticks: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            frame_time: Duration::from_secs_f64(1.0 / 60.0),
            max_ticks_per_frame: 5,
            stats_interval_ticks: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RunSummary {
    pub(crate) totals: FrameStats,
    pub(crate) final_map: String,
    pub(crate) final_tile: TileCoord,
    pub(crate) final_facing: FacingDirection,
}

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let summary = run_scenario(&app.engine, &app.loop_config, app.scenario);
    info!(
        frames = summary.totals.frames,
        ticks = summary.totals.ticks,
        blocked_moves = summary.totals.blocked_moves,
        final_map = %summary.final_map,
        final_x = summary.final_tile.x,
        final_y = summary.final_tile.y,
        "shutdown"
    );
    ExitCode::SUCCESS
}

/// Replays `scenario` on a fixed timestep: each frame advances the clock by
/// `frame_time`, runs the ticks that fit, then renders tiles and debug
/// shapes into counting sinks.
pub(crate) fn run_scenario(
    engine: &EngineConfig,
    config: &LoopConfig,
    scenario: Scenario,
) -> RunSummary {
    let target_tps = config.target_tps.max(1);
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let frame_time = config.frame_time.max(Duration::from_millis(1));
    let frame_seconds = frame_time.as_secs_f32();

    let first_map = scenario.map(&scenario.start_map).cloned();
    let Scenario {
        name,
        viewport,
        start_map,
        start,
        ticks: total_ticks,
        maps,
        events,
    } = scenario;
    let Some(first_map) = first_map else {
        warn!(scenario = %name, map = %start_map, "start_map_missing");
        return RunSummary {
            totals: FrameStats::default(),
            final_map: start_map,
            final_tile: start.tile,
            final_facing: start.facing,
        };
    };

    info!(
        scenario = %name,
        map = %start_map,
        ticks = total_ticks,
        events = events.len(),
        target_tps,
        max_ticks_per_frame,
        "scenario_started"
    );

    let mut context = WorldNavigationContext::new(engine, viewport, first_map, start);
    let mut current_map = start_map;
    let mut debug_shapes = DebugShapeBatch::new(engine.debug_draw);
    let projection = Mat4::orthographic_rh(
        viewport.x,
        viewport.x + viewport.width,
        viewport.y + viewport.height,
        viewport.y,
        -1.0,
        1.0,
    );
    let mut stats = FrameStatsAccumulator::new(config.stats_interval_ticks);

    let mut tick = 0u32;
    let mut next_event = 0usize;
    let mut accumulator = Duration::ZERO;
    while tick < total_ticks {
        accumulator = accumulator.saturating_add(frame_time);
        let plan = plan_ticks(accumulator, fixed_dt, max_ticks_per_frame);
        accumulator = plan.remaining_accumulator;
        if plan.dropped_backlog > Duration::ZERO {
            warn!(
                dropped_backlog_ms = plan.dropped_backlog.as_secs_f32() * 1000.0,
                max_ticks_per_frame, "sim_clamp_triggered"
            );
        }

        let ticks_this_frame = plan.ticks_to_run.min(total_ticks - tick);
        for _ in 0..ticks_this_frame {
            while let Some(event) = events.get(next_event).filter(|event| event.tick <= tick) {
                apply_event(
                    event,
                    &mut context,
                    &mut debug_shapes,
                    &maps,
                    &mut current_map,
                );
                next_event += 1;
            }

            let step = context.tick();
            if let Some(entered) = step.entered_tile {
                trace!(tick, x = entered.x, y = entered.y, "tile_entered");
            }
            stats.record_tick(&step);
            tick += 1;

            if let Some(snapshot) = stats.maybe_snapshot() {
                info!(
                    tick,
                    frames = snapshot.frames,
                    blocked_moves = snapshot.blocked_moves,
                    tiles_entered = snapshot.tiles_entered,
                    tiles_drawn = snapshot.tiles_drawn,
                    line_draw_calls = snapshot.line_draw_calls,
                    line_vertices = snapshot.line_vertices,
                    "frame_stats"
                );
            }
        }

        let mut tiles = CountingTileSink::default();
        context.render_tiles(&mut tiles);
        let mut lines = CountingLineSink::default();
        let flush = debug_shapes.flush(Mat4::IDENTITY, projection, frame_seconds, &mut lines);
        trace!(
            tick,
            base_tiles = tiles.layer(TileLayer::Base),
            fringe_tiles = tiles.layer(TileLayer::Fringe),
            object_tiles = tiles.layer(TileLayer::Object),
            line_draw_calls = lines.draw_calls,
            lines = lines.lines,
            line_bytes = lines.uploaded_bytes,
            "frame_rendered"
        );
        stats.record_frame(tiles.total(), flush);
    }

    RunSummary {
        totals: stats.totals(),
        final_map: current_map,
        final_tile: context.position().tile,
        final_facing: context.position().facing,
    }
}

fn apply_event(
    event: &ScenarioEvent,
    context: &mut WorldNavigationContext,
    debug_shapes: &mut DebugShapeBatch,
    maps: &BTreeMap<String, TileMap>,
    current_map: &mut String,
) {
    match &event.action {
        ScenarioAction::FreeDirection { direction } => context.set_free_direction(*direction),
        ScenarioAction::Tap { point } => context.tap(*point),
        ScenarioAction::ClearIntent => context.clear_intent(),
        ScenarioAction::Portal { map, spawn, glide } => {
            let Some(target) = maps.get(map) else {
                warn!(tick = event.tick, map = %map, "portal_target_missing");
                return;
            };
            let facing = FacingDirection::from_movement(*glide).unwrap_or(context.position().facing);
            context.enter_map(target.clone(), TilePosition::new(*spawn, facing), *glide);
            info!(tick = event.tick, map = %map, x = spawn.x, y = spawn.y, "portal_entered");
            *current_map = map.clone();
        }
        ScenarioAction::DebugLine { from, to, lifetime } => {
            debug_shapes.add_line(*from, *to, colors::YELLOW, *lifetime);
        }
        ScenarioAction::DebugBox { min, max, lifetime } => {
            debug_shapes.add_aabb(*min, *max, colors::GREEN, *lifetime);
        }
        ScenarioAction::DebugSphere {
            center,
            radius,
            lifetime,
        } => {
            debug_shapes.add_sphere(*center, *radius, colors::CYAN, *lifetime);
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TickPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

/// Whole ticks that fit in `accumulator`, capped per frame. Backlog beyond the
/// cap is dropped rather than carried, so a stall never snowballs.
fn plan_ticks(mut accumulator: Duration, fixed_dt: Duration, max_ticks_per_frame: u32) -> TickPlan {
    let mut ticks_to_run = 0u32;
    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator -= fixed_dt;
        ticks_to_run += 1;
    }

    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::take(&mut accumulator)
    } else {
        Duration::ZERO
    };
    TickPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORRIDOR: &str = r########"{
        "name": "corridor",
        "viewport": { "x": 0.0, "y": 0.0, "width": 160.0, "height": 96.0 },
        "start_map": "hall",
        "start": { "x": 1, "y": 1 },
        "ticks": 60,
        "maps": {
            "hall": ["######", "#....#", "######"],
            "cellar": ["....", "....", "....", "...."]
        },
        "events": [
            { "tick": 0, "kind": "free_direction", "direction": [90.0, 0.0] },
            { "tick": 2, "kind": "debug_sphere", "center": [0.0, 0.0, 0.0], "radius": 4.0 },
            { "tick": 2, "kind": "debug_line", "from": [0.0, 0.0, 0.0], "to": [8.0, 0.0, 0.0], "lifetime": 0.04 }
        ]
    }"########;

    fn scenario(raw: &str) -> Scenario {
        Scenario::from_json_str(raw).expect("scenario")
    }

    #[test]
    fn plan_runs_whole_ticks_and_keeps_remainder() {
        let fixed_dt = Duration::from_millis(16);
        let plan = plan_ticks(Duration::from_millis(40), fixed_dt, 5);
        assert_eq!(plan.ticks_to_run, 2);
        assert_eq!(plan.remaining_accumulator, Duration::from_millis(8));
        assert_eq!(plan.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_drops_backlog_past_cap() {
        let fixed_dt = Duration::from_millis(16);
        let plan = plan_ticks(Duration::from_millis(200), fixed_dt, 5);
        assert_eq!(plan.ticks_to_run, 5);
        assert_eq!(plan.remaining_accumulator, Duration::ZERO);
        assert_eq!(plan.dropped_backlog, Duration::from_millis(120));
    }

    #[test]
    fn corridor_walk_stops_at_east_wall() {
        let summary = run_scenario(
            &EngineConfig::default(),
            &LoopConfig::default(),
            scenario(CORRIDOR),
        );
        assert_eq!(summary.totals.ticks, 60);
        assert_eq!(summary.totals.frames, 60);
        assert_eq!(summary.final_tile, TileCoord::new(4, 1));
        assert_eq!(summary.final_facing, FacingDirection::East);
        assert_eq!(summary.totals.tiles_entered, 3);
        assert_eq!(summary.totals.blocked_moves, 1);
        assert_eq!(summary.final_map, "hall");
    }

    #[test]
    fn debug_shapes_drawn_for_their_lifetime() {
        let summary = run_scenario(
            &EngineConfig::default(),
            &LoopConfig::default(),
            scenario(CORRIDOR),
        );
        // The sphere (93 lines) shows for one frame; the line lives 0.04s,
        // which spans three frames at 60 fps.
        assert_eq!(summary.totals.line_vertices, 93 * 2 + 3 * 2);
        assert_eq!(summary.totals.line_draw_calls, 3);
    }

    #[test]
    fn portal_switches_map_and_glides() {
        let raw = CORRIDOR.replace(
            r#"{ "tick": 0, "kind": "free_direction", "direction": [90.0, 0.0] },"#,
            r#"{ "tick": 5, "kind": "portal", "map": "cellar", "spawn": { "x": 1, "y": 0 }, "glide": [0.0, 64.0] },"#,
        );
        let summary = run_scenario(&EngineConfig::default(), &LoopConfig::default(), scenario(&raw));
        assert_eq!(summary.final_map, "cellar");
        assert_eq!(summary.final_tile, TileCoord::new(1, 2));
        assert_eq!(summary.final_facing, FacingDirection::South);
        assert_eq!(summary.totals.blocked_moves, 0);
    }

    #[test]
    fn slow_frames_run_several_ticks_each() {
        let config = LoopConfig {
            frame_time: Duration::from_secs_f64(3.0 / 60.0) + Duration::from_micros(100),
            ..LoopConfig::default()
        };
        let summary = run_scenario(&EngineConfig::default(), &config, scenario(CORRIDOR));
        assert_eq!(summary.totals.ticks, 60);
        assert_eq!(summary.totals.frames, 20);
    }
}
