//! Colony CLI - drive the coordination core against the reference world.
//!
//! - `colony simulate` - run the per-tick loop and persist state
//! - `colony state` - summarize a persisted state file
//! - `colony config` - print the effective configuration

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

use colony::core::{ColonyConfig, ColonyMemory, TickContext, WallClockCpu, WorldView};
use colony::sim::{demo_world, GridWorld};
use colony::tasks::TaskManager;
use colony::Colony;

#[derive(Parser)]
#[command(name = "colony")]
#[command(about = "Tick-based multi-agent colony coordination", version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the coordination loop on a generated world
    Simulate {
        /// Number of ticks to run
        #[arg(long, default_value_t = 200)]
        ticks: u64,

        /// Agents placed in the world
        #[arg(long, default_value_t = 8)]
        agents: usize,

        /// YAML configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// State file, restored before and written after the run
        #[arg(long)]
        state: Option<PathBuf>,

        /// World layout to generate
        #[arg(long, value_enum, default_value_t = SeedLayout::Default)]
        seed_layout: SeedLayout,

        /// Per-tick CPU allowance in milliseconds
        #[arg(long, default_value_t = 20.0)]
        cpu_limit: f64,
    },

    /// Summarize a persisted state file
    State {
        file: PathBuf,
    },

    /// Print the effective configuration as YAML
    Config {
        /// Merge this file over the defaults
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SeedLayout {
    /// One owned region with a spawn, two sources and a controller
    Default,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Simulate {
            ticks,
            agents,
            config,
            state,
            seed_layout,
            cpu_limit,
        } => simulate(
            ticks,
            agents,
            config.as_deref(),
            state.as_deref(),
            seed_layout,
            cpu_limit,
        ),
        Commands::State { file } => show_state(&file),
        Commands::Config { config } => show_config(config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<ColonyConfig> {
    match path {
        Some(path) => ColonyConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(ColonyConfig::default()),
    }
}

fn read_state(path: &Path) -> Result<Option<ColonyMemory>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading state {}", path.display()))?;
    Ok(Some(ColonyMemory::from_json(Some(&raw))))
}

fn seed_world(layout: SeedLayout, agents: usize) -> GridWorld {
    match layout {
        SeedLayout::Default => demo_world(agents),
    }
}

fn simulate(
    ticks: u64,
    agents: usize,
    config: Option<&Path>,
    state: Option<&Path>,
    layout: SeedLayout,
    cpu_limit: f64,
) -> Result<()> {
    let config = load_config(config)?;
    let mut world = seed_world(layout, agents);
    let mut colony = Colony::new(&config);

    let mut memory = match state {
        Some(path) => read_state(path)?.unwrap_or_default(),
        None => ColonyMemory::default(),
    };
    if memory.tick > 0 {
        world.resume_at(memory.tick);
        colony.load(&memory);
        tracing::info!(tick = memory.tick, "Restored state");
    }

    let start = world.tick();
    let mut cpu = WallClockCpu::start(cpu_limit);
    let mut placed = 0;
    let mut completed = 0;
    let mut skipped = 0;

    tracing::info!(ticks, agents, start, "Starting simulation");
    for _ in 0..ticks {
        cpu.restart();
        let ctx = TickContext::new(world.tick());
        let report = colony.tick(&ctx, &mut world, &cpu);
        placed += report.plans.iter().map(|p| p.placed.len()).sum::<usize>();
        completed += report.execution.completed;
        skipped += report.execution.skipped;
        if ctx.every(50) {
            tracing::info!(summary = %report.summary(), "Tick");
        }
        world.end_tick();
    }

    let heatmap = colony.arbiter().heatmap().stats();
    println!("Simulation");
    println!("==========");
    println!();
    println!("Ticks: {} -> {}", start, world.tick());
    println!("Agents: {}", world.owned_agents().len());
    println!(
        "Tasks: {} live, {} pending, {} completed",
        colony.tasks().len(),
        colony.tasks().pending_count(),
        completed
    );
    println!("Deferred agent slots: {}", skipped);
    println!(
        "Movement requests: {}",
        colony.arbiter().requests().count()
    );
    println!(
        "Traffic: {} cells ({:.0}% of cap)",
        heatmap.cells,
        heatmap.utilization * 100.0
    );
    if let Some((pos, count)) = heatmap.hottest {
        println!("Hottest cell: {} ({:.1})", pos, count);
    }
    println!("Road sites placed: {}", placed);

    if let Some(path) = state {
        colony.save(&mut memory).context("encoding task state")?;
        memory.tick = world.tick();
        let json = memory.to_json_pretty().context("encoding state")?;
        std::fs::write(path, json)
            .with_context(|| format!("writing state {}", path.display()))?;
        tracing::info!(path = %path.display(), "State saved");
    }

    Ok(())
}

fn show_state(path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading state {}", path.display()))?;
    let memory = ColonyMemory::parse_strict(&raw)
        .with_context(|| format!("parsing state {}", path.display()))?;

    let mut tasks = TaskManager::default();
    tasks.load(&memory);

    println!("Colony State");
    println!("============");
    println!();
    println!("tick: {}", memory.tick);
    println!("tasks: {} ({} pending)", tasks.len(), tasks.pending_count());
    for task in tasks.tasks().take(5) {
        println!(
            "  - {} {} ({:?}, expires {})",
            task.id,
            task.action.name(),
            task.status,
            task.expires_at
        );
    }
    if tasks.len() > 5 {
        println!("  ... and {} more", tasks.len() - 5);
    }
    println!("movement requests: {}", memory.movement.len());
    println!("traffic cells: {}", memory.traffic.len());
    if let Some(hottest) = memory
        .traffic
        .iter()
        .max_by(|a, b| a.count.total_cmp(&b.count))
    {
        println!("  hottest: {} ({:.1})", hottest.position(), hottest.count);
    }
    println!(
        "sibling records: {} production, {} boosts, {} resource requests",
        memory.production.len(),
        memory.boosts.len(),
        memory.resource_requests.len()
    );

    Ok(())
}

fn show_config(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;
    print!("{}", config.to_yaml().context("encoding config")?);
    Ok(())
}
