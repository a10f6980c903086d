//! Round-robin enemy factory driven by a wave roster.

use std::time::Duration;

use horde_defence_core::{ConfigError, EnemyId, EnemyKind, GameConfig, Roster, WavePlan};

use crate::enemy::{Enemy, EnemyBlueprint};

/// Produces the enemies of a single wave.
///
/// The cursor persists for the lifetime of the wave's spawn run, so the
/// `i`-th and `(i + N)`-th enemies of an `N`-kind roster share a kind.
#[derive(Clone, Debug)]
pub struct WaveEnemyFactory {
    wave: u32,
    roster: Roster,
    cursor: usize,
    speed_multiplier: f32,
    health_multiplier: f32,
}

impl WaveEnemyFactory {
    /// Creates a factory for a resolved wave plan.
    #[must_use]
    pub fn new(plan: &WavePlan) -> Self {
        Self {
            wave: plan.number,
            roster: plan.roster.clone(),
            cursor: 0,
            speed_multiplier: plan.speed_multiplier,
            health_multiplier: plan.health_multiplier,
        }
    }

    /// Creates a factory from a raw tag string such as `"RRTQ"`.
    pub fn from_tags(
        wave: u32,
        tags: &str,
        speed_multiplier: f32,
        health_multiplier: f32,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            wave,
            roster: Roster::parse(tags)?,
            cursor: 0,
            speed_multiplier,
            health_multiplier,
        })
    }

    /// Wave the factory produces enemies for.
    #[must_use]
    pub fn wave(&self) -> u32 {
        self.wave
    }

    /// Returns the next kind in roster order, wrapping after the last one.
    pub fn next_kind(&mut self) -> EnemyKind {
        let kinds = self.roster.kinds();
        let kind = kinds[self.cursor % kinds.len()];
        self.cursor = (self.cursor + 1) % kinds.len();
        kind
    }

    /// Builds the next enemy of the wave at the configured spawn point.
    pub fn next(&mut self, id: EnemyId, spawn_delay: Duration, config: &GameConfig) -> Enemy {
        let kind = self.next_kind();
        let stats = config.enemies.stats(kind);
        let blueprint = EnemyBlueprint {
            kind,
            position: config.path.start,
            size: config.path.enemy_size,
            health: stats.health * self.health_multiplier,
            speed: stats.speed * self.speed_multiplier,
            reward: stats.bounty,
            spawn_delay,
        };

        Enemy::new(id, blueprint, &config.path.route, config.playfield.tile_size)
    }
}
