//! Static configuration consumed by the enemy factory, the tower registry and
//! escape detection.
//!
//! Every section carries defaults, so a TOML document only needs to name the
//! values it overrides. Rosters and routes are written in their compact tag
//! form and are resolved while deserializing, which makes unknown tags fail
//! before a level is ever constructed.

use std::time::Duration;

use glam::Vec2;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    Direction, EnemyKind, Path, Playfield, TowerKind, REMAINING_HEALTH, START_MONEY,
};

/// Errors raised while loading or validating configuration.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A roster referenced an enemy tag outside the closed set.
    #[error("unknown enemy type tag {tag:?}")]
    UnknownEnemyTag {
        /// Offending tag.
        tag: char,
    },
    /// A tower tag outside the closed set was requested.
    #[error("unknown tower type tag {tag:?}")]
    UnknownTowerTag {
        /// Offending tag.
        tag: char,
    },
    /// The enemy path contains no directions.
    #[error("enemy path must contain at least one direction")]
    EmptyPath,
    /// A route segment could not be parsed.
    #[error("invalid route segment {segment:?}")]
    InvalidRoute {
        /// Offending segment.
        segment: String,
    },
    /// A wave roster contains no enemy tags.
    #[error("wave roster must contain at least one enemy tag")]
    EmptyRoster,
    /// The schedule contains no authored waves.
    #[error("wave schedule must contain at least one wave")]
    EmptySchedule,
    /// An authored wave spawns no enemies.
    #[error("wave {wave} spawns no enemies")]
    EmptyWave {
        /// One-based wave number.
        wave: usize,
    },
    /// A numeric value is outside its permitted range.
    #[error("{field} must be {requirement}, got {value}")]
    InvalidValue {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Human readable requirement.
        requirement: &'static str,
        /// Rendered offending value.
        value: String,
    },
    /// The TOML document could not be parsed.
    #[error("failed to parse configuration: {message}")]
    Parse {
        /// Message reported by the parser.
        message: String,
    },
}

/// Complete static configuration of a session.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Starting economy values.
    pub economy: EconomyConfig,
    /// Tile grid dimensions.
    pub playfield: PlayfieldConfig,
    /// Enemy spawn point, size and route.
    pub path: PathConfig,
    /// Per-type enemy stats.
    pub enemies: EnemyTable,
    /// Per-type tower stats.
    pub towers: TowerTable,
    /// Stat multipliers applied by each tower upgrade.
    pub upgrade: UpgradeScaling,
    /// Wave timeline.
    pub schedule: WaveSchedule,
}

impl GameConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|error| ConfigError::Parse {
            message: error.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every numeric constraint the simulation relies upon.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("playfield.columns", self.playfield.columns as f32)?;
        positive("playfield.rows", self.playfield.rows as f32)?;
        positive("playfield.tile_size.x", self.playfield.tile_size.x)?;
        positive("playfield.tile_size.y", self.playfield.tile_size.y)?;
        finite("path.start.x", self.path.start.x)?;
        finite("path.start.y", self.path.start.y)?;
        positive("path.enemy_size.x", self.path.enemy_size.x)?;
        positive("path.enemy_size.y", self.path.enemy_size.y)?;
        if self.path.route.is_empty() {
            return Err(ConfigError::EmptyPath);
        }
        if self.economy.sell_refund_percent > 100 {
            return Err(ConfigError::InvalidValue {
                field: "economy.sell_refund_percent",
                requirement: "at most 100",
                value: self.economy.sell_refund_percent.to_string(),
            });
        }

        for kind in EnemyKind::ALL {
            let stats = self.enemies.stats(kind);
            positive("enemies.health", stats.health)?;
            positive("enemies.speed", stats.speed)?;
        }

        for kind in TowerKind::ALL {
            let stats = self.towers.stats(kind);
            positive("towers.range", stats.range)?;
            non_negative("towers.damage", stats.damage)?;
            positive("towers.fire_interval_secs", stats.fire_interval_secs)?;
            positive("towers.projectile_speed", stats.projectile_speed)?;
            positive("towers.max_tier", stats.max_tier as f32)?;
        }

        positive("upgrade.damage", self.upgrade.damage)?;
        positive("upgrade.range", self.upgrade.range)?;
        positive("upgrade.fire_interval", self.upgrade.fire_interval)?;

        self.schedule.validate()
    }

    /// Playfield described by the configured grid.
    #[must_use]
    pub fn playfield(&self) -> Playfield {
        Playfield::new(
            self.playfield.columns,
            self.playfield.rows,
            self.playfield.tile_size,
        )
    }
}

/// Starting economy values.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EconomyConfig {
    /// Money available at the start of a session.
    pub start_money: u32,
    /// Lives available at the start of a session.
    pub starting_lives: i32,
    /// Share of the invested money returned when a tower is sold.
    pub sell_refund_percent: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            start_money: START_MONEY,
            starting_lives: REMAINING_HEALTH,
            sell_refund_percent: 50,
        }
    }
}

/// Tile grid dimensions.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayfieldConfig {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Width and height of one tile in world units.
    pub tile_size: Vec2,
}

impl Default for PlayfieldConfig {
    fn default() -> Self {
        Self {
            columns: 15,
            rows: 10,
            tile_size: Vec2::splat(64.0),
        }
    }
}

/// Enemy spawn point, size and route.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathConfig {
    /// Top-left corner of every freshly spawned enemy.
    pub start: Vec2,
    /// Bounding box size shared by every enemy.
    pub enemy_size: Vec2,
    /// Route from the spawn point past the far edge.
    pub route: Path,
}

impl PathConfig {
    /// Grid cell containing the center of a freshly spawned enemy.
    #[must_use]
    pub fn start_cell(&self, playfield: &Playfield) -> crate::GridCell {
        playfield.cell_at(self.start + self.enemy_size * 0.5)
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        let segments = [
            (Direction::Right, 5),
            (Direction::Down, 4),
            (Direction::Right, 5),
            (Direction::Up, 3),
            (Direction::Right, 6),
        ];
        let directions = segments
            .iter()
            .flat_map(|(direction, count)| std::iter::repeat(*direction).take(*count))
            .collect();
        Self {
            start: Vec2::new(-56.0, 136.0),
            enemy_size: Vec2::splat(48.0),
            route: Path { directions },
        }
    }
}

/// Base stats of one enemy type.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnemyStats {
    /// Health before wave multipliers.
    pub health: f32,
    /// Speed in world units per second before wave multipliers.
    pub speed: f32,
    /// Money granted when the enemy is killed.
    pub bounty: u32,
}

/// Per-type enemy stats.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnemyTable {
    /// Stats of [`EnemyKind::Regular`].
    pub regular: EnemyStats,
    /// Stats of [`EnemyKind::Tank`].
    pub tank: EnemyStats,
    /// Stats of [`EnemyKind::Quick`].
    pub quick: EnemyStats,
}

impl EnemyTable {
    /// Stats for the provided kind.
    #[must_use]
    pub const fn stats(&self, kind: EnemyKind) -> &EnemyStats {
        match kind {
            EnemyKind::Regular => &self.regular,
            EnemyKind::Tank => &self.tank,
            EnemyKind::Quick => &self.quick,
        }
    }
}

impl Default for EnemyTable {
    fn default() -> Self {
        Self {
            regular: EnemyStats {
                health: 60.0,
                speed: 64.0,
                bounty: 8,
            },
            tank: EnemyStats {
                health: 220.0,
                speed: 36.0,
                bounty: 20,
            },
            quick: EnemyStats {
                health: 35.0,
                speed: 112.0,
                bounty: 10,
            },
        }
    }
}

/// Base stats of one tower type.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TowerStats {
    /// Placement cost.
    pub cost: u32,
    /// Upgrade cost per current tier.
    pub upgrade_cost: u32,
    /// Highest reachable tier.
    pub max_tier: u32,
    /// Targeting radius in world units.
    pub range: f32,
    /// Damage per projectile.
    pub damage: f32,
    /// Seconds between shots.
    pub fire_interval_secs: f32,
    /// Projectile travel speed in world units per second.
    pub projectile_speed: f32,
}

impl TowerStats {
    /// Time between shots at tier one.
    #[must_use]
    pub fn fire_interval(&self) -> Duration {
        seconds(self.fire_interval_secs)
    }

    /// Cost of upgrading a tower that currently sits at `tier`.
    #[must_use]
    pub fn upgrade_cost_at(&self, tier: u32) -> u32 {
        self.upgrade_cost.saturating_mul(tier)
    }
}

/// Per-type tower stats.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TowerTable {
    /// Stats of [`TowerKind::Gunner`].
    pub gunner: TowerStats,
    /// Stats of [`TowerKind::Bomber`].
    pub bomber: TowerStats,
    /// Stats of [`TowerKind::Sniper`].
    pub sniper: TowerStats,
}

impl TowerTable {
    /// Stats for the provided kind.
    #[must_use]
    pub const fn stats(&self, kind: TowerKind) -> &TowerStats {
        match kind {
            TowerKind::Gunner => &self.gunner,
            TowerKind::Bomber => &self.bomber,
            TowerKind::Sniper => &self.sniper,
        }
    }
}

impl Default for TowerTable {
    fn default() -> Self {
        Self {
            gunner: TowerStats {
                cost: 50,
                upgrade_cost: 40,
                max_tier: 3,
                range: 160.0,
                damage: 12.0,
                fire_interval_secs: 0.4,
                projectile_speed: 640.0,
            },
            bomber: TowerStats {
                cost: 80,
                upgrade_cost: 60,
                max_tier: 3,
                range: 128.0,
                damage: 45.0,
                fire_interval_secs: 1.4,
                projectile_speed: 360.0,
            },
            sniper: TowerStats {
                cost: 120,
                upgrade_cost: 90,
                max_tier: 3,
                range: 352.0,
                damage: 70.0,
                fire_interval_secs: 2.0,
                projectile_speed: 1400.0,
            },
        }
    }
}

/// Multipliers applied to tower stats by each upgrade.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpgradeScaling {
    /// Damage multiplier.
    pub damage: f32,
    /// Range multiplier.
    pub range: f32,
    /// Fire interval multiplier; values below one fire faster.
    pub fire_interval: f32,
}

impl Default for UpgradeScaling {
    fn default() -> Self {
        Self {
            damage: 1.5,
            range: 1.1,
            fire_interval: 0.85,
        }
    }
}

/// Ordered enemy types a wave factory cycles through.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Roster(Vec<EnemyKind>);

impl Roster {
    /// Creates a roster from explicit kinds.
    pub fn new(kinds: Vec<EnemyKind>) -> Result<Self, ConfigError> {
        if kinds.is_empty() {
            return Err(ConfigError::EmptyRoster);
        }
        Ok(Self(kinds))
    }

    /// Parses a tag string such as `"RRTQ"`; whitespace is ignored.
    pub fn parse(tags: &str) -> Result<Self, ConfigError> {
        let kinds = tags
            .chars()
            .filter(|tag| !tag.is_whitespace())
            .map(EnemyKind::from_tag)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(kinds)
    }

    /// Kinds in cycle order.
    #[must_use]
    pub fn kinds(&self) -> &[EnemyKind] {
        &self.0
    }

    /// Number of kinds in one cycle.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; rosters are validated to be non-empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<String> for Roster {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// One authored wave.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaveConfig {
    /// Enemy types cycled by the wave factory.
    pub roster: Roster,
    /// Number of enemies spawned by the wave.
    pub count: u32,
    /// Seconds between consecutive spawn offsets.
    pub interval_secs: f32,
    /// Multiplier applied to every enemy's base speed.
    #[serde(default = "unit_multiplier")]
    pub speed_multiplier: f32,
    /// Multiplier applied to every enemy's base health.
    #[serde(default = "unit_multiplier")]
    pub health_multiplier: f32,
}

fn unit_multiplier() -> f32 {
    1.0
}

/// Wave timeline shared by the spawning system and the level.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaveSchedule {
    /// Seconds before the first wave starts.
    pub first_wave_delay_secs: f32,
    /// Seconds between the last spawn of a wave and the start of the next.
    pub inter_wave_pause_secs: f32,
    /// Seconds every enemy waits at the spawn point before moving.
    pub spawn_gate_secs: f32,
    /// Speed growth per wave past the authored list.
    pub endless_speed_growth: f32,
    /// Health growth per wave past the authored list.
    pub endless_health_growth: f32,
    /// Authored waves in order.
    pub waves: Vec<WaveConfig>,
}

impl WaveSchedule {
    /// Time before the first wave starts.
    #[must_use]
    pub fn first_wave_delay(&self) -> Duration {
        seconds(self.first_wave_delay_secs)
    }

    /// Pause between consecutive waves; never zero.
    #[must_use]
    pub fn inter_wave_pause(&self) -> Duration {
        seconds(self.inter_wave_pause_secs).max(Duration::from_millis(1))
    }

    /// Waiting time every enemy spends before moving.
    #[must_use]
    pub fn spawn_gate(&self) -> Duration {
        seconds(self.spawn_gate_secs)
    }

    /// Resolves the plan of a one-based wave number.
    ///
    /// Waves past the authored list repeat the last authored wave with its
    /// multipliers compounded by the endless growth factors.
    #[must_use]
    pub fn plan(&self, number: u32) -> Option<WavePlan> {
        let index = usize::try_from(number.checked_sub(1)?).ok()?;
        let last_index = self.waves.len().checked_sub(1)?;
        let authored = &self.waves[index.min(last_index)];
        let extra = index.saturating_sub(last_index);
        let exponent = i32::try_from(extra).unwrap_or(i32::MAX);

        Some(WavePlan {
            number,
            roster: authored.roster.clone(),
            count: authored.count,
            interval: seconds(authored.interval_secs),
            speed_multiplier: authored.speed_multiplier
                * self.endless_speed_growth.powi(exponent),
            health_multiplier: authored.health_multiplier
                * self.endless_health_growth.powi(exponent),
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        non_negative("schedule.first_wave_delay_secs", self.first_wave_delay_secs)?;
        positive("schedule.inter_wave_pause_secs", self.inter_wave_pause_secs)?;
        positive("schedule.spawn_gate_secs", self.spawn_gate_secs)?;
        positive("schedule.endless_speed_growth", self.endless_speed_growth)?;
        positive("schedule.endless_health_growth", self.endless_health_growth)?;

        if self.waves.is_empty() {
            return Err(ConfigError::EmptySchedule);
        }

        for (index, wave) in self.waves.iter().enumerate() {
            if wave.count == 0 {
                return Err(ConfigError::EmptyWave { wave: index + 1 });
            }
            if wave.roster.is_empty() {
                return Err(ConfigError::EmptyRoster);
            }
            non_negative("schedule.waves.interval_secs", wave.interval_secs)?;
            positive("schedule.waves.speed_multiplier", wave.speed_multiplier)?;
            positive("schedule.waves.health_multiplier", wave.health_multiplier)?;
        }

        Ok(())
    }
}

impl Default for WaveSchedule {
    fn default() -> Self {
        use EnemyKind::{Quick, Regular, Tank};

        let wave = |kinds: Vec<EnemyKind>, count, interval_secs, speed, health| WaveConfig {
            roster: Roster(kinds),
            count,
            interval_secs,
            speed_multiplier: speed,
            health_multiplier: health,
        };

        Self {
            first_wave_delay_secs: 2.0,
            inter_wave_pause_secs: 5.0,
            spawn_gate_secs: 0.5,
            endless_speed_growth: 1.05,
            endless_health_growth: 1.15,
            waves: vec![
                wave(vec![Regular], 8, 1.2, 1.0, 1.0),
                wave(vec![Regular, Regular, Quick], 12, 1.0, 1.05, 1.1),
                wave(vec![Regular, Tank, Regular, Quick], 16, 0.9, 1.1, 1.25),
                wave(vec![Tank, Quick], 18, 0.8, 1.15, 1.5),
                wave(vec![Regular, Tank, Quick, Quick], 24, 0.7, 1.2, 1.8),
            ],
        }
    }
}

/// Resolved plan of a single wave.
#[derive(Clone, Debug, PartialEq)]
pub struct WavePlan {
    /// One-based wave number.
    pub number: u32,
    /// Enemy types cycled by the wave factory.
    pub roster: Roster,
    /// Number of enemies spawned.
    pub count: u32,
    /// Time between consecutive spawn offsets.
    pub interval: Duration,
    /// Multiplier applied to every enemy's base speed.
    pub speed_multiplier: f32,
    /// Multiplier applied to every enemy's base health.
    pub health_multiplier: f32,
}

impl WavePlan {
    /// Offset of the `index`-th entry from the start of the wave.
    #[must_use]
    pub fn offset(&self, index: u32) -> Duration {
        self.interval.saturating_mul(index)
    }
}

fn seconds(value: f32) -> Duration {
    Duration::try_from_secs_f32(value).unwrap_or(Duration::ZERO)
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            requirement: "a positive finite number",
            value: value.to_string(),
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            requirement: "a non-negative finite number",
            value: value.to_string(),
        })
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            requirement: "a finite number",
            value: value.to_string(),
        })
    }
}
