#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Horde Defence simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative level state, and pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then reports [`Event`] values describing what
//! happened. Systems consume immutable views such as [`EnemyView`] and
//! [`TowerView`] and respond exclusively with new command batches.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub mod config;

pub use config::{
    ConfigError, EconomyConfig, EnemyStats, EnemyTable, GameConfig, PathConfig, PlayfieldConfig,
    Roster, TowerStats, TowerTable, UpgradeScaling, WaveConfig, WavePlan, WaveSchedule,
};

/// Money available to the player when a session starts.
pub const START_MONEY: u32 = 200;

/// Lives available to the player when a session starts.
pub const REMAINING_HEALTH: i32 = 10;

/// Score granted for every enemy killed.
pub const SCORE_PER_KILL: u32 = 10;

/// Commands that express all permissible level mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous frame.
        dt: Duration,
    },
    /// Opens the spawn run of the provided wave.
    StartWave {
        /// One-based number of the wave that begins spawning.
        wave: u32,
    },
    /// Requests that the active wave factory produce its next enemy.
    SpawnEnemy {
        /// Wave the enemy belongs to.
        wave: u32,
        /// Waiting time the enemy spends before it starts moving.
        spawn_delay: Duration,
    },
    /// Closes the spawn run of the provided wave once its roster is exhausted.
    EndWave {
        /// One-based number of the wave whose entries have all spawned.
        wave: u32,
    },
    /// Selects the tower type the player intends to place.
    SelectTower {
        /// Kind of tower to place on the next placement attempt.
        kind: TowerKind,
    },
    /// Selects an existing tower as the target of the next upgrade.
    SelectTowerForUpgrade {
        /// Tower the player intends to upgrade.
        tower: TowerId,
    },
    /// Clears any active selection.
    ClearSelection,
    /// Attempts to place a tower of the selected kind at a world position.
    PlaceSelectedTower {
        /// World position the player clicked.
        position: Vec2,
    },
    /// Attempts to place a tower of the provided kind at a world position.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// World position that is snapped to the containing grid cell.
        position: Vec2,
    },
    /// Attempts to upgrade an existing tower in place.
    UpgradeTower {
        /// Identifier of the tower to upgrade.
        tower: TowerId,
    },
    /// Requests removal (sale) of an existing tower.
    RemoveTower {
        /// Identifier of the tower targeted for removal.
        tower: TowerId,
    },
    /// Launches a projectile from a tower toward its committed target.
    FireProjectile {
        /// Tower that fires.
        tower: TowerId,
        /// Enemy the projectile is aimed at.
        target: EnemyId,
    },
    /// Switches every enemy between normal and doubled speed.
    SetSpeedMode {
        /// Speed mode that should become active.
        mode: SpeedMode,
    },
    /// Reinitialises the session to its start-of-game state.
    Restart,
}

/// Events reported by the level after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the frame.
        dt: Duration,
    },
    /// Announces that a wave began spawning.
    WaveStarted {
        /// One-based wave number.
        wave: u32,
    },
    /// Announces that every entry of a wave has spawned.
    WaveSpawned {
        /// One-based wave number.
        wave: u32,
    },
    /// Confirms that an enemy entered the registry.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Kind chosen by the wave factory.
        kind: EnemyKind,
        /// Wave the enemy belongs to.
        wave: u32,
    },
    /// Reports that an enemy died and was removed.
    EnemyKilled {
        /// Identifier of the removed enemy.
        enemy: EnemyId,
        /// Money granted for the kill.
        reward: u32,
    },
    /// Reports that an enemy reached the far edge and was removed.
    EnemyEscaped {
        /// Identifier of the removed enemy.
        enemy: EnemyId,
    },
    /// Confirms that a tower was placed.
    TowerPlaced {
        /// Identifier allocated to the tower.
        tower: TowerId,
        /// Type of tower that was placed.
        kind: TowerKind,
        /// Grid cell occupied by the tower.
        cell: GridCell,
        /// Money deducted for the placement.
        cost: u32,
    },
    /// Reports that a placement request was rejected.
    TowerPlacementRejected {
        /// Requested tower kind, absent when nothing was selected.
        kind: Option<TowerKind>,
        /// World position provided in the request.
        position: Vec2,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower was upgraded in place.
    TowerUpgraded {
        /// Identifier of the upgraded tower.
        tower: TowerId,
        /// Tier reached by the upgrade.
        tier: u32,
        /// Money deducted for the upgrade.
        cost: u32,
    },
    /// Reports that an upgrade request was rejected.
    TowerUpgradeRejected {
        /// Identifier of the tower targeted for upgrade.
        tower: TowerId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Confirms that a tower was removed.
    TowerRemoved {
        /// Identifier of the removed tower.
        tower: TowerId,
        /// Money returned to the player.
        refund: u32,
    },
    /// Reports that a removal request was rejected.
    TowerRemovalRejected {
        /// Identifier of the tower targeted for removal.
        tower: TowerId,
        /// Specific reason the removal failed.
        reason: RemovalError,
    },
    /// Reports that a tower committed to a new target.
    TargetAcquired {
        /// Tower that acquired the target.
        tower: TowerId,
        /// Enemy the tower is now engaged with.
        enemy: EnemyId,
    },
    /// Reports that a tower lost its target and went idle.
    TargetLost {
        /// Tower that became idle.
        tower: TowerId,
    },
    /// Confirms that a projectile was launched.
    ProjectileFired {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Tower that fired it.
        tower: TowerId,
        /// Enemy it is aimed at.
        target: EnemyId,
    },
    /// Reports that a projectile reached a live target and applied damage.
    ProjectileHit {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Enemy that received the damage.
        target: EnemyId,
        /// Damage applied.
        damage: f32,
        /// Whether the hit killed the enemy.
        killed: bool,
    },
    /// Reports that a projectile vanished without effect.
    ProjectileExpired {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Enemy the projectile had been aimed at.
        target: EnemyId,
    },
    /// Announces a change of the enemy speed mode.
    SpeedModeChanged {
        /// Mode that became active.
        mode: SpeedMode,
    },
    /// Announces that the player ran out of lives.
    GameOver {
        /// Final score.
        score: u32,
        /// Wave during which the game ended.
        wave: u32,
    },
    /// Confirms that the session was reset to its start-of-game state.
    Restarted,
}

/// Cardinal movement directions along the enemy path.
///
/// World coordinates grow rightward along x and downward along y.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Movement toward decreasing y.
    Up,
    /// Movement toward increasing y.
    Down,
    /// Movement toward decreasing x.
    Left,
    /// Movement toward increasing x.
    Right,
}

impl Direction {
    /// Resolves a route letter (`U`, `D`, `L`, `R`, case-insensitive).
    #[must_use]
    pub fn from_tag(tag: char) -> Option<Self> {
        match tag.to_ascii_uppercase() {
            'U' => Some(Self::Up),
            'D' => Some(Self::Down),
            'L' => Some(Self::Left),
            'R' => Some(Self::Right),
            _ => None,
        }
    }

    /// Unit vector pointing along the direction.
    #[must_use]
    pub const fn unit(self) -> Vec2 {
        match self {
            Self::Up => Vec2::new(0.0, -1.0),
            Self::Down => Vec2::new(0.0, 1.0),
            Self::Left => Vec2::new(-1.0, 0.0),
            Self::Right => Vec2::new(1.0, 0.0),
        }
    }

    /// Reports whether the direction moves along the x axis.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Column and row offsets of a single tile step.
    #[must_use]
    pub const fn cell_offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// Ordered route from the spawn point to the base.
///
/// A path is never empty and is never mutated once loaded; every enemy walks
/// its own copy of the directions.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Path {
    directions: Vec<Direction>,
}

impl Path {
    /// Creates a path from explicit directions.
    pub fn new(directions: Vec<Direction>) -> Result<Self, ConfigError> {
        if directions.is_empty() {
            return Err(ConfigError::EmptyPath);
        }
        Ok(Self { directions })
    }

    /// Parses a compact route such as `"R5 D4 R2"`.
    ///
    /// Each whitespace separated segment is a direction letter optionally
    /// followed by a tile count; a missing count means a single tile.
    pub fn parse(route: &str) -> Result<Self, ConfigError> {
        let mut directions = Vec::new();
        for segment in route.split_whitespace() {
            let invalid = || ConfigError::InvalidRoute {
                segment: segment.to_owned(),
            };
            let mut chars = segment.chars();
            let direction = chars
                .next()
                .and_then(Direction::from_tag)
                .ok_or_else(invalid)?;
            let count_text = chars.as_str();
            let count = if count_text.is_empty() {
                1
            } else {
                count_text.parse::<usize>().map_err(|_| invalid())?
            };
            if count == 0 {
                return Err(invalid());
            }
            directions.extend(std::iter::repeat(direction).take(count));
        }
        Self::new(directions)
    }

    /// Directions in travel order.
    #[must_use]
    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    /// Number of tile steps along the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.directions.len()
    }

    /// Always `false`; paths are validated to be non-empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }

    /// Grid cells visited when walking the path from `start`, including it.
    #[must_use]
    pub fn cells_from(&self, start: GridCell) -> Vec<GridCell> {
        let mut cells = Vec::with_capacity(self.directions.len() + 1);
        let mut current = start;
        cells.push(current);
        for direction in &self.directions {
            current = current.step(*direction);
            cells.push(current);
        }
        cells
    }
}

impl TryFrom<String> for Path {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Unique identifier assigned to an enemy.
///
/// Identifiers are allocated in spawn order, so comparing two identifiers
/// compares spawn order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the projectile identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Closed set of enemy types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    /// Baseline enemy.
    Regular,
    /// Slow enemy with a large health pool.
    Tank,
    /// Fast enemy with little health.
    Quick,
}

impl EnemyKind {
    /// Every enemy kind in declaration order.
    pub const ALL: [Self; 3] = [Self::Regular, Self::Tank, Self::Quick];

    /// Resolves a roster tag (`R`, `T`, `Q`).
    pub fn from_tag(tag: char) -> Result<Self, ConfigError> {
        match tag {
            'R' => Ok(Self::Regular),
            'T' => Ok(Self::Tank),
            'Q' => Ok(Self::Quick),
            other => Err(ConfigError::UnknownEnemyTag { tag: other }),
        }
    }

    /// Roster tag of the kind.
    #[must_use]
    pub const fn tag(self) -> char {
        match self {
            Self::Regular => 'R',
            Self::Tank => 'T',
            Self::Quick => 'Q',
        }
    }
}

/// Closed set of tower types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TowerKind {
    /// Cheap, fast firing tower with short range.
    Gunner,
    /// Slow firing tower with heavy hits.
    Bomber,
    /// Long range tower with a long reload.
    Sniper,
}

impl TowerKind {
    /// Every tower kind in declaration order.
    pub const ALL: [Self; 3] = [Self::Gunner, Self::Bomber, Self::Sniper];

    /// Resolves a tower tag (`G`, `B`, `S`).
    pub fn from_tag(tag: char) -> Result<Self, ConfigError> {
        match tag {
            'G' => Ok(Self::Gunner),
            'B' => Ok(Self::Bomber),
            'S' => Ok(Self::Sniper),
            other => Err(ConfigError::UnknownTowerTag { tag: other }),
        }
    }

    /// Tag of the kind.
    #[must_use]
    pub const fn tag(self) -> char {
        match self {
            Self::Gunner => 'G',
            Self::Bomber => 'B',
            Self::Sniper => 'S',
        }
    }
}

/// Lifecycle phase of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyPhase {
    /// Spawned but still counting down its spawn delay.
    Waiting,
    /// Walking its direction queue.
    Moving,
    /// Health dropped to zero.
    Dead,
    /// Reached the far edge of the playfield alive.
    Escaped,
}

impl EnemyPhase {
    /// Reports whether the phase ends the enemy's lifetime.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Dead | Self::Escaped)
    }
}

/// Enemy speed modifier toggled by the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedMode {
    /// Base speed.
    #[default]
    Normal,
    /// Twice the base speed.
    Double,
}

/// Location of a grid cell; may lie outside the playfield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    column: i32,
    row: i32,
}

impl GridCell {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Neighbouring cell one step along `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (columns, rows) = direction.cell_offset();
        Self {
            column: self.column + columns,
            row: self.row + rows,
        }
    }
}

/// Rectangular play area subdivided into equally sized tiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Playfield {
    columns: u32,
    rows: u32,
    tile_size: Vec2,
}

impl Playfield {
    /// Creates a playfield description.
    #[must_use]
    pub const fn new(columns: u32, rows: u32, tile_size: Vec2) -> Self {
        Self {
            columns,
            rows,
            tile_size,
        }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Width and height of a single tile in world units.
    #[must_use]
    pub const fn tile_size(&self) -> Vec2 {
        self.tile_size
    }

    /// Total width in world units.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile_size.x
    }

    /// Total height in world units.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_size.y
    }

    /// Grid cell containing the provided world point.
    #[must_use]
    pub fn cell_at(&self, point: Vec2) -> GridCell {
        let scaled = (point / self.tile_size).floor();
        GridCell::new(scaled.x as i32, scaled.y as i32)
    }

    /// World position of a cell's center.
    #[must_use]
    pub fn cell_center(&self, cell: GridCell) -> Vec2 {
        Vec2::new(
            (cell.column() as f32 + 0.5) * self.tile_size.x,
            (cell.row() as f32 + 0.5) * self.tile_size.y,
        )
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub fn contains_cell(&self, cell: GridCell) -> bool {
        u32::try_from(cell.column()).map_or(false, |column| column < self.columns)
            && u32::try_from(cell.row()).map_or(false, |row| row < self.rows)
    }

    /// Reports whether a box shares any area with the playfield.
    #[must_use]
    pub fn overlaps_box(&self, position: Vec2, size: Vec2) -> bool {
        position.x < self.width()
            && position.y < self.height()
            && position.x + size.x > 0.0
            && position.y + size.y > 0.0
    }

    /// Reports whether a box extends past the right or bottom edge.
    #[must_use]
    pub fn beyond_far_edge(&self, position: Vec2, size: Vec2) -> bool {
        position.x + size.x > self.width() || position.y + size.y > self.height()
    }
}

/// Reasons a tower placement request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// No tower type was selected before the placement attempt.
    NothingSelected,
    /// The requested cell lies outside the grid.
    OutOfBounds,
    /// The requested cell is part of the enemy path.
    OnPath,
    /// Another tower already occupies the requested cell.
    Occupied,
    /// The player cannot afford the tower.
    InsufficientFunds,
}

/// Reasons a tower upgrade request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeError {
    /// No tower with the provided identifier exists.
    MissingTower,
    /// The tower already reached its highest tier.
    MaxTier,
    /// The player cannot afford the upgrade.
    InsufficientFunds,
}

/// Reasons a tower removal request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalError {
    /// No tower with the provided identifier exists.
    MissingTower,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier, ordered by spawn.
    pub id: EnemyId,
    /// Enemy type.
    pub kind: EnemyKind,
    /// Lifecycle phase at capture time.
    pub phase: EnemyPhase,
    /// Top-left corner in world units.
    pub position: Vec2,
    /// Bounding box size in world units.
    pub size: Vec2,
    /// Remaining health.
    pub health: f32,
    /// Health at spawn time.
    pub max_health: f32,
    /// Current speed in world units per second.
    pub speed: f32,
}

impl EnemySnapshot {
    /// Center of the enemy's bounding box.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    /// Reports whether towers may engage the enemy.
    #[must_use]
    pub fn is_targetable(&self) -> bool {
        self.phase == EnemyPhase::Moving && self.health > 0.0
    }
}

/// Read-only snapshot describing all enemies in the registry.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a specific enemy.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of captured snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Grid cell occupied by the tower.
    pub cell: GridCell,
    /// Center of the tower in world units.
    pub center: Vec2,
    /// Targeting radius in world units.
    pub range: f32,
    /// Damage carried by each projectile.
    pub damage: f32,
    /// Current upgrade tier, starting at one.
    pub tier: u32,
    /// Enemy the tower is engaged with, if any.
    pub target: Option<EnemyId>,
}

/// Read-only snapshot describing all towers.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Cooldown state of a single tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerCooldownSnapshot {
    /// Tower the cooldown belongs to.
    pub tower: TowerId,
    /// Kind of the tower.
    pub kind: TowerKind,
    /// Time left until the tower may fire again.
    pub ready_in: Duration,
}

/// Read-only snapshot of every tower cooldown, sorted by tower.
#[derive(Clone, Debug, Default)]
pub struct TowerCooldownView {
    snapshots: Vec<TowerCooldownSnapshot>,
}

impl TowerCooldownView {
    /// Creates a new cooldown view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerCooldownSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.tower);
        Self { snapshots }
    }

    /// Iterator over the captured cooldowns in tower order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerCooldownSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerCooldownSnapshot> {
        self.snapshots
    }
}

/// Target assignment produced by the tower targeting system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that engages the enemy.
    pub tower: TowerId,
    /// Enemy selected as the target.
    pub enemy: EnemyId,
    /// Center of the tower in world units.
    pub tower_center: Vec2,
    /// Center of the enemy in world units at selection time.
    pub enemy_center: Vec2,
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier of the projectile.
    pub id: ProjectileId,
    /// Tower that fired the projectile.
    pub tower: TowerId,
    /// Enemy the projectile is aimed at.
    pub target: EnemyId,
    /// Current position in world units.
    pub position: Vec2,
    /// Point the projectile travels toward.
    pub destination: Vec2,
}

/// Rendering collaborator invoked once per frame with read-only state.
pub trait Presenter {
    /// Draws a visible enemy.
    fn draw_enemy(&mut self, enemy: &EnemySnapshot);

    /// Draws a tower.
    fn draw_tower(&mut self, tower: &TowerSnapshot);

    /// Draws a projectile in flight.
    fn draw_projectile(&mut self, projectile: &ProjectileSnapshot);

    /// Draws debug shapes over the playfield.
    fn draw_overlay(&mut self, _playfield: &Playfield) {}
}
