#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Horde Defence.
//!
//! The [`Level`] owns every registry of a session. Adapters mutate it only
//! through [`apply`] and observe it only through the [`query`] module.

pub mod economy;
pub mod enemies;
pub mod enemy;
pub mod factory;
pub mod level;
pub mod projectiles;
pub mod towers;

pub use economy::Economy;
pub use enemies::{EnemyLifecycle, EnemyRegistry};
pub use enemy::{Enemy, EnemyBlueprint};
pub use factory::WaveEnemyFactory;
pub use level::Level;
pub use projectiles::ProjectileRegistry;
pub use towers::{PlacedTower, PlacementRules, Shot, Tower, TowerRegistry, TowerSelection};

use horde_defence_core::{Command, Event, UpgradeError};
use tracing::warn;

/// Applies the provided command to the level, mutating state deterministically.
pub fn apply(level: &mut Level, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => level.update(dt, out_events),
        command @ (Command::StartWave { .. }
        | Command::SpawnEnemy { .. }
        | Command::EndWave { .. }) => level.execute_wave_command(command, out_events),
        Command::SelectTower { kind } => level.select_tower(kind),
        Command::SelectTowerForUpgrade { tower } => {
            if !level.select_tower_for_upgrade(tower) {
                warn!(tower = tower.get(), "selected missing tower for upgrade");
                out_events.push(Event::TowerUpgradeRejected {
                    tower,
                    reason: UpgradeError::MissingTower,
                });
            }
        }
        Command::ClearSelection => level.clear_selection(),
        Command::PlaceSelectedTower { position } => {
            let _ = level.place_selected_tower(position, out_events);
        }
        Command::PlaceTower { kind, position } => {
            let _ = level.place_tower(kind, position, out_events);
        }
        Command::UpgradeTower { tower } => {
            let _ = level.upgrade_tower(tower, out_events);
        }
        Command::RemoveTower { tower } => {
            let _ = level.remove_tower(tower, out_events);
        }
        Command::FireProjectile { tower, target } => {
            level.fire_projectile(tower, target, out_events);
        }
        Command::SetSpeedMode { mode } => level.set_speed_mode(mode, out_events),
        Command::Restart => {
            level.restart();
            out_events.push(Event::Restarted);
        }
    }
}

/// Query functions that expose read-only views of the level.
pub mod query {
    use std::{collections::BTreeSet, time::Duration};

    use horde_defence_core::{
        EnemyView, GameConfig, GridCell, Playfield, ProjectileSnapshot, SpeedMode, TowerView,
    };

    use super::{Level, TowerSelection};

    /// Captures a read-only view of the enemies in spawn order.
    #[must_use]
    pub fn enemy_view(level: &Level) -> EnemyView {
        level.enemies().view()
    }

    /// Captures a read-only view of the towers ordered by identifier.
    #[must_use]
    pub fn tower_view(level: &Level) -> TowerView {
        level.towers().view()
    }

    /// Snapshots of the projectiles in flight.
    #[must_use]
    pub fn projectiles(level: &Level) -> Vec<ProjectileSnapshot> {
        level.projectiles().snapshots()
    }

    /// Playfield geometry of the level.
    #[must_use]
    pub fn playfield(level: &Level) -> &Playfield {
        level.playfield()
    }

    /// Cells covered by the enemy path, including the spawn cell.
    #[must_use]
    pub fn path_cells(level: &Level) -> &BTreeSet<GridCell> {
        level.path_cells()
    }

    /// Validated configuration the level was built from.
    #[must_use]
    pub fn config(level: &Level) -> &GameConfig {
        level.config()
    }

    /// Current tower selection, if any.
    #[must_use]
    pub fn selection(level: &Level) -> Option<TowerSelection> {
        level.towers().selection()
    }

    /// Active enemy speed mode.
    #[must_use]
    pub fn speed_mode(level: &Level) -> SpeedMode {
        level.speed_mode()
    }

    /// Time left before the next wave starts, or `None` while a wave spawns.
    #[must_use]
    pub fn next_wave_in(level: &Level) -> Option<Duration> {
        level.next_wave_in()
    }

    /// Simulated time since the session started.
    #[must_use]
    pub fn elapsed(level: &Level) -> Duration {
        level.elapsed()
    }
}
