//! Authoritative tower state and the registry that enforces placement rules.

use std::{
    collections::{BTreeMap, BTreeSet},
    time::Duration,
};

use glam::Vec2;
use horde_defence_core::{
    EnemyId, Event, GridCell, PlacementError, Playfield, Presenter, RemovalError,
    TowerCooldownSnapshot, TowerCooldownView, TowerId, TowerKind, TowerSnapshot, TowerStats,
    TowerTarget, TowerView, UpgradeError, UpgradeScaling,
};

use crate::economy::Economy;

/// Stationary tower occupying a single grid cell.
#[derive(Clone, Debug)]
pub struct Tower {
    id: TowerId,
    kind: TowerKind,
    cell: GridCell,
    center: Vec2,
    range: f32,
    damage: f32,
    fire_interval: Duration,
    projectile_speed: f32,
    cooldown: Duration,
    overdue: Duration,
    tier: u32,
    max_tier: u32,
    upgrade_cost: u32,
    invested: u32,
    target: Option<EnemyId>,
}

impl Tower {
    fn new(id: TowerId, kind: TowerKind, cell: GridCell, center: Vec2, stats: &TowerStats) -> Self {
        Self {
            id,
            kind,
            cell,
            center,
            range: stats.range,
            damage: stats.damage,
            fire_interval: stats.fire_interval(),
            projectile_speed: stats.projectile_speed,
            cooldown: Duration::ZERO,
            overdue: Duration::ZERO,
            tier: 1,
            max_tier: stats.max_tier,
            upgrade_cost: stats.upgrade_cost,
            invested: stats.cost,
            target: None,
        }
    }

    /// Identifier allocated on placement.
    #[must_use]
    pub fn id(&self) -> TowerId {
        self.id
    }

    /// Tower type.
    #[must_use]
    pub fn kind(&self) -> TowerKind {
        self.kind
    }

    /// Occupied grid cell.
    #[must_use]
    pub fn cell(&self) -> GridCell {
        self.cell
    }

    /// Center of the occupied cell.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Targeting radius.
    #[must_use]
    pub fn range(&self) -> f32 {
        self.range
    }

    /// Damage carried by each projectile.
    #[must_use]
    pub fn damage(&self) -> f32 {
        self.damage
    }

    /// Time between shots.
    #[must_use]
    pub fn fire_interval(&self) -> Duration {
        self.fire_interval
    }

    /// Current upgrade tier, starting at one.
    #[must_use]
    pub fn tier(&self) -> u32 {
        self.tier
    }

    /// Money spent on placement and upgrades.
    #[must_use]
    pub fn invested(&self) -> u32 {
        self.invested
    }

    /// Enemy the tower is engaged with.
    #[must_use]
    pub fn target(&self) -> Option<EnemyId> {
        self.target
    }

    /// Time left until the tower may fire again.
    #[must_use]
    pub fn ready_in(&self) -> Duration {
        self.cooldown
    }

    /// Cost of the next upgrade, absent at the highest tier.
    #[must_use]
    pub fn next_upgrade_cost(&self) -> Option<u32> {
        (self.tier < self.max_tier).then(|| self.upgrade_cost.saturating_mul(self.tier))
    }

    fn upgrade(&mut self, scaling: &UpgradeScaling) {
        self.tier += 1;
        self.damage *= scaling.damage;
        self.range *= scaling.range;
        self.fire_interval = self.fire_interval.mul_f32(scaling.fire_interval);
    }

    /// Captures the tower's observable state.
    #[must_use]
    pub fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            center: self.center,
            range: self.range,
            damage: self.damage,
            tier: self.tier,
            target: self.target,
        }
    }
}

/// Projectile parameters of a tower that just fired.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shot {
    /// Tower that fired.
    pub tower: TowerId,
    /// Launch position.
    pub origin: Vec2,
    /// Damage carried by the projectile.
    pub damage: f32,
    /// Travel speed in world units per second.
    pub speed: f32,
}

/// Pending player intent for the next tower interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TowerSelection {
    /// A tower kind waiting to be placed.
    Placement(TowerKind),
    /// An existing tower waiting to be upgraded.
    Upgrade(TowerId),
}

/// Result of a successful placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacedTower {
    /// Identifier allocated to the tower.
    pub tower: TowerId,
    /// Grid cell the position snapped to.
    pub cell: GridCell,
    /// Money deducted.
    pub cost: u32,
}

/// Rules a placement is validated against.
#[derive(Clone, Copy, Debug)]
pub struct PlacementRules<'a> {
    /// Grid the tower must fit in.
    pub playfield: &'a Playfield,
    /// Cells walked by enemies.
    pub path_cells: &'a BTreeSet<GridCell>,
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug, Default)]
pub struct TowerRegistry {
    towers: BTreeMap<TowerId, Tower>,
    occupancy: BTreeMap<GridCell, TowerId>,
    next_tower_id: u32,
    selection: Option<TowerSelection>,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current player selection.
    #[must_use]
    pub fn selection(&self) -> Option<TowerSelection> {
        self.selection
    }

    /// Selects the tower kind placed by the next placement attempt.
    pub fn select_tower(&mut self, kind: TowerKind) {
        self.selection = Some(TowerSelection::Placement(kind));
    }

    /// Selects an existing tower for upgrade; returns whether it exists.
    pub fn select_tower_for_upgrade(&mut self, tower: TowerId) -> bool {
        if self.towers.contains_key(&tower) {
            self.selection = Some(TowerSelection::Upgrade(tower));
            true
        } else {
            false
        }
    }

    /// Reports whether the current selection refers to an upgrade.
    #[must_use]
    pub fn is_upgrade_selected(&self) -> bool {
        matches!(self.selection, Some(TowerSelection::Upgrade(_)))
    }

    /// Clears any selection.
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Places a tower at the cell containing `position`.
    ///
    /// The cell must lie inside the grid, off the enemy path and unoccupied,
    /// and the economy must afford the tower; the cost is deducted up front.
    pub fn place(
        &mut self,
        kind: TowerKind,
        position: Vec2,
        rules: PlacementRules<'_>,
        stats: &TowerStats,
        economy: &mut Economy,
    ) -> Result<PlacedTower, PlacementError> {
        let cell = rules.playfield.cell_at(position);
        if !rules.playfield.contains_cell(cell) {
            return Err(PlacementError::OutOfBounds);
        }
        if rules.path_cells.contains(&cell) {
            return Err(PlacementError::OnPath);
        }
        if self.occupancy.contains_key(&cell) {
            return Err(PlacementError::Occupied);
        }
        if economy.try_spend(stats.cost) != stats.cost {
            return Err(PlacementError::InsufficientFunds);
        }

        let tower = TowerId::new(self.next_tower_id);
        self.next_tower_id = self.next_tower_id.wrapping_add(1);
        let center = rules.playfield.cell_center(cell);
        let _ = self
            .towers
            .insert(tower, Tower::new(tower, kind, cell, center, stats));
        let _ = self.occupancy.insert(cell, tower);

        Ok(PlacedTower {
            tower,
            cell,
            cost: stats.cost,
        })
    }

    /// Upgrades a tower in place; returns the reached tier and the cost paid.
    pub fn upgrade(
        &mut self,
        tower: TowerId,
        scaling: &UpgradeScaling,
        economy: &mut Economy,
    ) -> Result<(u32, u32), UpgradeError> {
        let state = self
            .towers
            .get_mut(&tower)
            .ok_or(UpgradeError::MissingTower)?;
        let cost = state.next_upgrade_cost().ok_or(UpgradeError::MaxTier)?;
        if economy.try_spend(cost) != cost {
            return Err(UpgradeError::InsufficientFunds);
        }

        state.upgrade(scaling);
        state.invested = state.invested.saturating_add(cost);
        Ok((state.tier, cost))
    }

    /// Removes a tower and refunds `refund_percent` of the money invested in it.
    pub fn remove(
        &mut self,
        tower: TowerId,
        refund_percent: u32,
        economy: &mut Economy,
    ) -> Result<u32, RemovalError> {
        let state = self
            .towers
            .remove(&tower)
            .ok_or(RemovalError::MissingTower)?;
        let _ = self.occupancy.remove(&state.cell);
        if self.selection == Some(TowerSelection::Upgrade(tower)) {
            self.selection = None;
        }

        let refund = u64::from(state.invested) * u64::from(refund_percent) / 100;
        let refund = u32::try_from(refund).unwrap_or(u32::MAX);
        economy.add_money(refund);
        Ok(refund)
    }

    /// Counts every cooldown down by `dt`.
    ///
    /// The part of `dt` left after a cooldown reaches zero is remembered for
    /// the next shot. It never accumulates across ticks, so idle towers do not
    /// bank shots.
    pub fn tick_cooldowns(&mut self, dt: Duration) {
        for tower in self.towers.values_mut() {
            tower.overdue = dt.saturating_sub(tower.cooldown);
            tower.cooldown = tower.cooldown.saturating_sub(dt);
        }
    }

    /// Commits the targeting output and reports engagement changes.
    ///
    /// `targets` must be ordered by tower, as the targeting system emits them.
    pub fn assign_targets(&mut self, targets: &[TowerTarget], out_events: &mut Vec<Event>) {
        for tower in self.towers.values_mut() {
            let next = targets
                .binary_search_by_key(&tower.id, |target| target.tower)
                .ok()
                .map(|index| targets[index].enemy);

            match (tower.target, next) {
                (previous, Some(enemy)) if previous != Some(enemy) => {
                    out_events.push(Event::TargetAcquired {
                        tower: tower.id,
                        enemy,
                    });
                }
                (Some(_), None) => out_events.push(Event::TargetLost { tower: tower.id }),
                _ => {}
            }
            tower.target = next;
        }
    }

    /// Resets the cooldown of a ready tower and describes its projectile.
    ///
    /// The new cooldown is shortened by the time the tower was already overdue
    /// this tick, which keeps the fire rate independent of the frame rate.
    pub fn fire(&mut self, tower: TowerId) -> Option<Shot> {
        let state = self.towers.get_mut(&tower)?;
        if !state.cooldown.is_zero() {
            return None;
        }
        state.cooldown = state.fire_interval.saturating_sub(state.overdue);
        state.overdue = Duration::ZERO;
        Some(Shot {
            tower,
            origin: state.center,
            damage: state.damage,
            speed: state.projectile_speed,
        })
    }

    /// Looks up a tower.
    #[must_use]
    pub fn get(&self, tower: TowerId) -> Option<&Tower> {
        self.towers.get(&tower)
    }

    /// Iterator over towers in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Tower> {
        self.towers.values()
    }

    /// Number of placed towers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.towers.len()
    }

    /// Reports whether no tower is placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.towers.is_empty()
    }

    /// Captures a snapshot of every tower.
    #[must_use]
    pub fn view(&self) -> TowerView {
        TowerView::from_snapshots(self.towers.values().map(Tower::snapshot).collect())
    }

    /// Captures the cooldown of every tower.
    #[must_use]
    pub fn cooldown_view(&self) -> TowerCooldownView {
        TowerCooldownView::from_snapshots(
            self.towers
                .values()
                .map(|tower| TowerCooldownSnapshot {
                    tower: tower.id,
                    kind: tower.kind,
                    ready_in: tower.cooldown,
                })
                .collect(),
        )
    }

    /// Draws every tower.
    pub fn render(&self, presenter: &mut impl Presenter) {
        for tower in self.towers.values() {
            presenter.draw_tower(&tower.snapshot());
        }
    }

    /// Drops every tower, the selection and the identifier counter.
    pub fn clear(&mut self) {
        self.towers.clear();
        self.occupancy.clear();
        self.next_tower_id = 0;
        self.selection = None;
    }
}
