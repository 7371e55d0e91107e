//! Headless fog of war runner
//!
//! Spawns actors for several players on a sandbox map, random-walks them and
//! drives the visibility engine one tick per frame. Prints a JSON summary.

use clap::Parser;
use fow_engine::core::config::FowConfig;
use fow_engine::core::error::{FowError, Result};
use fow_engine::core::types::{MapSize, PlayerId, Tier, TileCoord, TileRect};
use fow_engine::fow::{EdgeKind, SandboxObjects, SandboxScenario, Scenario, VisibilityOrchestrator};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::path::PathBuf;

/// Headless fog of war runner
#[derive(Parser, Debug)]
#[command(name = "fow_sim")]
#[command(about = "Drive the fog of war engine over a random-walk scenario")]
struct Args {
    /// Map width in tiles
    #[arg(long, default_value_t = 64)]
    width: u32,

    /// Map height in tiles
    #[arg(long, default_value_t = 64)]
    height: u32,

    /// Number of subscribed players
    #[arg(long, default_value_t = 4)]
    players: u8,

    /// Actors spawned per player
    #[arg(long, default_value_t = 30)]
    actors: u32,

    /// Sight radius of every actor
    #[arg(long, default_value_t = 3)]
    sight: u32,

    /// Frames to simulate
    #[arg(long, default_value_t = 400)]
    ticks: u64,

    /// Random seed for deterministic runs
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Optional TOML file overriding engine tunables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the per-tick actor scan budget
    #[arg(long)]
    budget: Option<usize>,

    /// Size of the square view window queried each frame
    #[arg(long, default_value_t = 24)]
    window: u32,
}

#[derive(Serialize)]
struct PlayerSummary {
    player: u8,
    explored_tiles: usize,
}

#[derive(Serialize)]
struct RunSummary {
    ticks: u64,
    max_actors_per_tick: usize,
    total_actor_scans: usize,
    cycle_restarts: u32,
    players: Vec<PlayerSummary>,
    visible_tiles: usize,
    remembered_tiles: usize,
    unexplored_tiles: usize,
    fog_edge_tiles: usize,
    last_delta_objects: usize,
    last_delta_cells: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => FowConfig::load(path)?,
        None => FowConfig::default(),
    };
    if let Some(budget) = args.budget {
        config.tick_entity_budget = budget;
    }

    tracing::info!(
        "Starting fog of war run: {}x{} map, {} players x {} actors",
        args.width,
        args.height,
        args.players,
        args.actors
    );

    if args.width < 2 || args.height < 2 {
        return Err(FowError::InvalidConfig(format!(
            "map must be at least 2x2, got {}x{}",
            args.width, args.height
        )));
    }

    let size = MapSize::new(args.width, args.height);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut scenario = SandboxScenario::new(size);
    for p in 0..args.players {
        for _ in 0..args.actors {
            let pos = TileCoord::new(
                rng.gen_range(0..args.width as i32),
                rng.gen_range(0..args.height as i32),
            );
            scenario.spawn_actor(PlayerId(p), pos, args.sight);
        }
    }

    let mut objects = SandboxObjects::new(size);
    for _ in 0..(args.width * args.height / 32) {
        let x = rng.gen_range(0..args.width as i32 - 1);
        let y = rng.gen_range(0..args.height as i32);
        objects.add_terrain_object(vec![TileCoord::new(x, y), TileCoord::new(x + 1, y)]);
    }

    let mut engine = VisibilityOrchestrator::with_config(scenario, objects, config)?;
    for p in 0..args.players {
        engine.subscribe(PlayerId(p))?;
    }

    let mut max_actors_per_tick = 0;
    let mut total_actor_scans = 0;
    let mut cycle_restarts = 0;
    let mut last_delta = (0, 0);
    let window_size = args.window.max(1);

    for _ in 0..args.ticks {
        random_walk(engine.scenario_mut(), &mut rng);
        let report = engine.execute_update_tick();
        max_actors_per_tick = max_actors_per_tick.max(report.actors_processed);
        total_actor_scans += report.actors_processed;
        if report.cycle_restarted {
            cycle_restarts += 1;
        }

        let view = TileRect::new(
            rng.gen_range(0..args.width as i32),
            rng.gen_range(0..args.height as i32),
            window_size,
            window_size,
        );
        let delta = engine.query_window(view)?;
        last_delta = (delta.objects.len(), delta.cells.len());

        engine.scenario_mut().advance_frame();
    }

    let mut visible_tiles = 0;
    let mut remembered_tiles = 0;
    let mut unexplored_tiles = 0;
    let mut fog_edge_tiles = 0;
    for tile in size.bounds().tiles() {
        match engine.tier_at(tile) {
            Tier::None => visible_tiles += 1,
            Tier::Partial => remembered_tiles += 1,
            Tier::Full => unexplored_tiles += 1,
        }
        if !engine.edge_flags(tile, EdgeKind::Full)?.is_empty() {
            fog_edge_tiles += 1;
        }
    }

    let players = engine
        .active_players()
        .into_iter()
        .filter_map(|p| engine.player_map(p))
        .map(|m| PlayerSummary {
            player: m.owner().0,
            explored_tiles: m.explored_count(),
        })
        .collect();

    let summary = RunSummary {
        ticks: args.ticks,
        max_actors_per_tick,
        total_actor_scans,
        cycle_restarts,
        players,
        visible_tiles,
        remembered_tiles,
        unexplored_tiles,
        fog_edge_tiles,
        last_delta_objects: last_delta.0,
        last_delta_cells: last_delta.1,
    };

    tracing::info!(
        "Finished at frame {} after {} actor scans",
        engine.scenario().current_frame(),
        total_actor_scans
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Nudge every actor one step in a random direction, staying on the map
fn random_walk(scenario: &mut SandboxScenario, rng: &mut ChaCha8Rng) {
    let size = scenario.map_size();
    let moves: Vec<_> = scenario
        .actors()
        .map(|a| {
            let next = a
                .position
                .offset(rng.gen_range(-1..=1), rng.gen_range(-1..=1));
            (a.id, next)
        })
        .collect();
    for (id, next) in moves {
        if size.contains(next) {
            scenario.move_actor(id, next);
        }
    }
}
