use anyhow::{ensure, Result};
use clap::Parser;
use four_way_stop::simulation::{Approach, SimWorld};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Parser)]
#[command(name = "four_way_stop")]
#[command(about = "Four-way stop intersection simulation with optional UI")]
struct Cli {
    /// Run with the Bevy game engine UI
    #[arg(long)]
    ui: bool,

    /// Number of simulation ticks to run in headless mode
    #[arg(long, default_value = "900")]
    ticks: u64,

    /// Seed for turn choices and spawn events
    #[arg(long)]
    seed: Option<u64>,

    /// Probability of a spawn request on each approach per tick
    #[arg(long, default_value = "0.01")]
    spawn_rate: f64,

    /// Print a summary every N ticks (0 disables)
    #[arg(long, default_value = "150")]
    summary_every: u64,

    /// Draw the junction map with every summary
    #[arg(long)]
    map: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.ui {
        #[cfg(feature = "ui")]
        {
            run_with_ui();
            return Ok(());
        }
        #[cfg(not(feature = "ui"))]
        {
            anyhow::bail!("UI feature is not enabled. Rebuild with --features ui");
        }
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    run_headless(&cli)
}

/// Run the simulation in headless mode (no graphics)
///
/// Random spawn requests stand in for the arrow keys of the UI.
fn run_headless(cli: &Cli) -> Result<()> {
    ensure!(
        (0.0..=1.0).contains(&cli.spawn_rate),
        "spawn rate must be a probability, got {}",
        cli.spawn_rate
    );

    let (mut world, mut spawner) = match cli.seed {
        Some(seed) => (
            SimWorld::new_with_seed(seed),
            StdRng::seed_from_u64(seed.wrapping_add(1)),
        ),
        None => (SimWorld::new(), StdRng::from_os_rng()),
    };

    info!("Running four-way stop simulation in headless mode...");
    info!(
        "Ticks: {}, spawn rate: {} per approach per tick",
        cli.ticks, cli.spawn_rate
    );

    for tick in 1..=cli.ticks {
        for approach in Approach::ALL {
            if spawner.random_bool(cli.spawn_rate) {
                world.spawn(approach);
            }
        }
        world.tick();

        if cli.summary_every > 0 && tick % cli.summary_every == 0 {
            println!("--- After tick {} ---", tick);
            world.print_summary();
            if cli.map {
                world.draw_map();
            }
            println!();
        }
    }

    world.stats().log_report(
        world.arbiter().len(),
        world.queued_count(),
        world.config().ticks_per_second,
    );
    Ok(())
}

#[cfg(feature = "ui")]
fn run_with_ui() {
    use bevy::log::LogPlugin;
    use bevy::prelude::*;

    println!("Starting Four-Way Stop UI...");
    println!();
    println!("Controls:");
    println!("  Up/Down/Left/Right - Spawn a vehicle on that approach");
    println!("  ESC                - Exit");
    println!();

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(LogPlugin {
                    filter: "warn,four_way_stop=debug".to_string(),
                    level: bevy::log::Level::DEBUG,
                    ..default()
                })
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "4-Way Intersection Demo".into(),
                        resolution: (800, 600).into(),
                        ..default()
                    }),
                    ..default()
                }),
        )
        .add_plugins(four_way_stop::ui::FourWayStopUIPlugin)
        .run();
}
