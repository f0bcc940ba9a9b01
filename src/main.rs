//! Skirmish - headless arena runner
//!
//! Spawns two opposing factions (chasers, an outpost and a base each), runs
//! the simulation for a fixed number of ticks and prints a summary.

use clap::Parser;
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use skirmish::ai::{AgentState, Brain};
use skirmish::combat::Health;
use skirmish::core::config::ArenaConfig;
use skirmish::core::error::Result;
use skirmish::entity::catalog::EntityCatalog;
use skirmish::entity::components::tag;
use skirmish::entity::faction::{Faction, FactionMember};
use skirmish::entity::recipes::SpawnOptions;
use skirmish::render::{collect_render_entities, DelayedView, NullView, ViewBridge};
use skirmish::simulation::{Simulation, SimulationBuilder};

/// Headless Skirmish Runner - two factions fight until time runs out
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(about = "Run a headless two-faction arena and print a summary")]
struct Args {
    /// Arena config (TOML); defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Entity type catalog (JSON)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Seconds per tick
    #[arg(long, default_value_t = 0.1)]
    dt: f32,

    /// Chasers per faction
    #[arg(long, default_value_t = 10)]
    chasers: usize,

    /// Outposts per faction
    #[arg(long, default_value_t = 1)]
    outposts: usize,

    /// Random seed for the spawn layout
    #[arg(long)]
    seed: Option<u64>,

    /// Gate attacks on an animation that finishes this many ticks later
    #[arg(long)]
    animation_delay: Option<u32>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Include every surviving agent in the output
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Debug, Default, Serialize)]
struct FactionSummary {
    survivors: usize,
    health: f32,
}

/// JSON output structure
#[derive(Debug, Serialize)]
struct RunSummary {
    seed: u64,
    ticks: u64,
    elapsed_ms: u64,
    destroyed: usize,
    grid_rebuilds: u64,
    factions: BTreeMap<String, FactionSummary>,
    states: BTreeMap<String, usize>,
    winner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    agents: Option<Vec<skirmish::render::RenderEntity>>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skirmish=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let config = match &args.config {
        Some(path) => ArenaConfig::load(path)?,
        None => ArenaConfig::default(),
    };
    let catalog = match &args.catalog {
        Some(path) => EntityCatalog::load(path)?,
        None => EntityCatalog::new(),
    };

    let builder = SimulationBuilder::new(config)
        .catalog(catalog)
        .on_ready(|world| tracing::debug!(agents = world.len(), "world ready for spawning"));

    let summary = match args.animation_delay {
        Some(delay) => run(builder.view(DelayedView::new(delay)).build()?, &args, seed)?,
        None => run(builder.view(NullView).build()?, &args, seed)?,
    };

    match args.format.as_str() {
        "text" => print_text(&summary),
        _ => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}

fn run<V: ViewBridge>(mut sim: Simulation<V>, args: &Args, seed: u64) -> Result<RunSummary> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    populate(&mut sim, args, &mut rng)?;

    let mut destroyed = 0;
    for _ in 0..args.ticks {
        let report = sim.tick(args.dt);
        destroyed += report.destroyed.len();
        sim.pump_view_effects();

        if standing_factions(&sim).len() < 2 {
            tracing::info!(tick = report.tick, "one faction left standing");
            break;
        }
    }

    Ok(summarize(&sim, seed, destroyed, args.verbose))
}

/// Chasers walk towards each other from x = -500 / 500; outposts and bases
/// sit behind them
fn populate<V: ViewBridge>(sim: &mut Simulation<V>, args: &Args, rng: &mut ChaCha8Rng) -> Result<()> {
    let sides = [
        (Faction::Player1, tag::PLAYER_1, -1.0_f32),
        (Faction::Player2, tag::PLAYER_2, 1.0_f32),
    ];

    for (faction, label, side) in sides {
        let speed = sim.config().movement.max_speed;
        for _ in 0..args.chasers {
            let options = SpawnOptions::at(500.0 * side, rng.gen_range(-200.0..200.0))
                .faction(faction)
                .tag(label)
                .patrol(Vec3::new(-side * speed, 0.0, 0.0));
            sim.spawn("chaser", &options)?;
        }

        for i in 0..args.outposts {
            let y = (i as f32 - (args.outposts as f32 - 1.0) / 2.0) * 150.0;
            let options = SpawnOptions::at(650.0 * side, y).faction(faction).tag(label);
            sim.spawn("outpost", &options)?;
        }

        let options = SpawnOptions::at(800.0 * side, 400.0).faction(faction).tag(label);
        sim.spawn("base", &options)?;
    }

    tracing::info!(agents = sim.world().len(), "arena populated");
    Ok(())
}

fn standing_factions<V: ViewBridge>(sim: &Simulation<V>) -> Vec<Faction> {
    let world = sim.world();
    Faction::ALL
        .into_iter()
        .filter(|faction| {
            world.entities_with::<FactionMember>().into_iter().any(|id| {
                world.get::<FactionMember>(id).and_then(|m| m.faction) == Some(*faction)
                    && world.get::<Health>(id).is_some_and(|h| h.is_alive())
            })
        })
        .collect()
}

fn summarize<V: ViewBridge>(sim: &Simulation<V>, seed: u64, destroyed: usize, verbose: bool) -> RunSummary {
    let world = sim.world();

    let mut factions: BTreeMap<String, FactionSummary> = BTreeMap::new();
    for id in world.entities_with::<Health>() {
        let Some(faction) = world.get::<FactionMember>(id).and_then(|m| m.faction) else {
            continue;
        };
        let Some(health) = world.get::<Health>(id).filter(|h| h.is_alive()) else {
            continue;
        };
        let entry = factions.entry(faction.to_string()).or_default();
        entry.survivors += 1;
        entry.health += health.current;
    }

    let mut states: BTreeMap<String, usize> = BTreeMap::new();
    for id in world.entities_with::<Brain>() {
        let state = world
            .get::<Brain>(id)
            .and_then(|brain| brain.blackboard.state())
            .unwrap_or(AgentState::Idle);
        *states.entry(state.to_string()).or_default() += 1;
    }

    let standing = standing_factions(sim);
    let winner = match standing.as_slice() {
        [only] => Some(only.to_string()),
        _ => None,
    };

    let agents = verbose.then(|| {
        let mut buffer = Vec::new();
        collect_render_entities(world, &mut buffer);
        buffer
    });

    RunSummary {
        seed,
        ticks: sim.tick_count(),
        elapsed_ms: sim.now_ms(),
        destroyed,
        grid_rebuilds: sim.grid().rebuild_count(),
        factions,
        states,
        winner,
        agents,
    }
}

fn print_text(summary: &RunSummary) {
    println!("=== Skirmish ===");
    println!("seed {}  ticks {}  elapsed {} ms", summary.seed, summary.ticks, summary.elapsed_ms);
    println!("destroyed {}  grid rebuilds {}", summary.destroyed, summary.grid_rebuilds);
    for (name, faction) in &summary.factions {
        println!("  {:<10} survivors {:>4}  health {:>8.1}", name, faction.survivors, faction.health);
    }
    for (state, count) in &summary.states {
        println!("  {:<10} {:>4}", state, count);
    }
    match &summary.winner {
        Some(winner) => println!("winner: {}", winner),
        None => println!("no winner"),
    }
}
