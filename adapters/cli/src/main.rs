#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs headless Horde Defence sessions.

mod autopilot;
mod layout_transfer;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use horde_defence_core::{
    Command, EnemySnapshot, Event, GameConfig, Presenter, ProjectileSnapshot, SpeedMode,
    TowerSnapshot,
};
use horde_defence_world::{self as world, query, Level};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    autopilot::Autopilot,
    layout_transfer::{LayoutTower, TowerLayout},
};

const DEFAULT_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

/// Command-line arguments accepted by the `horde-defence` binary.
#[derive(Debug, Parser)]
#[command(name = "horde-defence", about = "Runs a headless Horde Defence session")]
struct CliArgs {
    /// TOML file overriding the built-in game configuration.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Simulated frames per second.
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=1000))]
    fps: u32,
    /// Simulated session length in seconds.
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,
    /// Let a seeded autopilot buy and upgrade towers once per second.
    #[arg(long)]
    autopilot: bool,
    /// Seed driving the autopilot's decisions.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Tower layout string placed before the first frame.
    #[arg(long, value_name = "LAYOUT")]
    layout: Option<String>,
    /// Run every enemy at doubled speed.
    #[arg(long)]
    double_speed: bool,
    /// Print the summary as JSON instead of text.
    #[arg(long)]
    json: bool,
}

/// Outcome of a session, accumulated from the level's events.
#[derive(Debug, Default, Serialize)]
struct Summary {
    frames: u64,
    simulated_seconds: f64,
    wave: u32,
    score: u32,
    money: u32,
    lives: i32,
    enemies_spawned: u32,
    enemies_killed: u32,
    enemies_escaped: u32,
    towers_placed: u32,
    towers_upgraded: u32,
    placements_rejected: u32,
    projectiles_fired: u32,
    projectile_hits: u32,
    peak_enemies_drawn: usize,
    game_over: bool,
    layout: String,
}

impl Summary {
    fn record(&mut self, event: &Event) {
        match event {
            Event::EnemySpawned { .. } => self.enemies_spawned += 1,
            Event::EnemyKilled { .. } => self.enemies_killed += 1,
            Event::EnemyEscaped { .. } => self.enemies_escaped += 1,
            Event::TowerPlaced { .. } => self.towers_placed += 1,
            Event::TowerUpgraded { .. } => self.towers_upgraded += 1,
            Event::TowerPlacementRejected { reason, .. } => {
                warn!(?reason, "tower placement rejected");
                self.placements_rejected += 1;
            }
            Event::ProjectileFired { .. } => self.projectiles_fired += 1,
            Event::ProjectileHit { .. } => self.projectile_hits += 1,
            Event::GameOver { .. } => self.game_over = true,
            _ => {}
        }
    }

    fn print(&self) {
        println!("frames            {}", self.frames);
        println!("simulated         {:.2}s", self.simulated_seconds);
        println!("wave              {}", self.wave);
        println!("score             {}", self.score);
        println!("money             {}", self.money);
        println!("lives             {}", self.lives);
        println!(
            "enemies           {} spawned, {} killed, {} escaped",
            self.enemies_spawned, self.enemies_killed, self.enemies_escaped
        );
        println!(
            "towers            {} placed, {} upgrades, {} rejected",
            self.towers_placed, self.towers_upgraded, self.placements_rejected
        );
        println!(
            "projectiles       {} fired, {} hits",
            self.projectiles_fired, self.projectile_hits
        );
        println!("peak enemies      {}", self.peak_enemies_drawn);
        println!("game over         {}", self.game_over);
        println!("layout            {}", self.layout);
    }
}

/// Presenter that counts what a renderer would draw.
#[derive(Debug, Default)]
struct FrameTally {
    enemies: usize,
    peak_enemies: usize,
}

impl FrameTally {
    fn end_frame(&mut self) {
        self.peak_enemies = self.peak_enemies.max(self.enemies);
        self.enemies = 0;
    }
}

impl Presenter for FrameTally {
    fn draw_enemy(&mut self, _enemy: &EnemySnapshot) {
        self.enemies += 1;
    }

    fn draw_tower(&mut self, _tower: &TowerSnapshot) {}

    fn draw_projectile(&mut self, _projectile: &ProjectileSnapshot) {}
}

fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();
    let summary = run(&args)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        summary.print();
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("could not read configuration {}", path.display()))?;
    GameConfig::from_toml_str(&text)
        .with_context(|| format!("invalid configuration {}", path.display()))
}

fn run(args: &CliArgs) -> Result<Summary> {
    ensure!(
        args.seconds.is_finite() && args.seconds > 0.0,
        "--seconds must be positive, got {}",
        args.seconds
    );

    let config = load_config(args.config.as_deref())?;
    let mut level = Level::new(config).context("configuration failed validation")?;
    let mut summary = Summary::default();
    let mut events = Vec::new();

    if let Some(encoded) = &args.layout {
        let layout = TowerLayout::decode(encoded).context("could not read --layout")?;
        layout.ensure_fits(query::playfield(&level))?;
        for tower in &layout.towers {
            let position = query::playfield(&level).cell_center(tower.cell);
            world::apply(
                &mut level,
                Command::PlaceTower {
                    kind: tower.kind,
                    position,
                },
                &mut events,
            );
        }
    }
    if args.double_speed {
        world::apply(
            &mut level,
            Command::SetSpeedMode {
                mode: SpeedMode::Double,
            },
            &mut events,
        );
    }

    let mut autopilot = args.autopilot.then(|| Autopilot::new(args.seed, &level));
    let dt = Duration::from_secs(1) / args.fps;
    let frames = (f64::from(args.seconds) * f64::from(args.fps)).ceil() as u64;
    let mut tally = FrameTally::default();
    let mut commands = Vec::new();

    info!(frames, fps = args.fps, autopilot = args.autopilot, "session started");
    for frame in 0..frames {
        if let Some(autopilot) = autopilot.as_mut() {
            if frame % u64::from(args.fps) == 0 {
                autopilot.plan(&level, &mut commands);
            }
        }
        for command in commands.drain(..) {
            world::apply(&mut level, command, &mut events);
        }
        world::apply(&mut level, Command::Tick { dt }, &mut events);

        for event in events.drain(..) {
            summary.record(&event);
        }
        level.render(&mut tally);
        tally.end_frame();
        summary.frames += 1;

        if level.is_game_over() {
            info!(frame, "stopping after game over");
            break;
        }
    }

    let playfield = query::playfield(&level);
    let layout = TowerLayout {
        columns: playfield.columns(),
        rows: playfield.rows(),
        towers: query::tower_view(&level)
            .iter()
            .map(|tower| LayoutTower {
                kind: tower.kind,
                cell: tower.cell,
            })
            .collect(),
    };

    summary.simulated_seconds = query::elapsed(&level).as_secs_f64();
    summary.wave = level.current_wave();
    summary.score = level.score();
    summary.money = level.money();
    summary.lives = level.user_health();
    summary.peak_enemies_drawn = tally.peak_enemies;
    summary.layout = layout.encode()?;
    Ok(summary)
}
