//! Per-session registry of live enemies.

use std::time::Duration;

use horde_defence_core::{EnemyId, EnemyPhase, EnemyView, Event, Playfield, Presenter};
use tracing::debug;

use crate::enemy::Enemy;

/// Receiver of the terminal enemy notifications issued by the removal sweep.
pub trait EnemyLifecycle {
    /// An enemy died; grants its reward.
    fn enemy_killed(&mut self, reward: u32);

    /// An enemy escaped past the far edge; costs a life.
    fn enemy_completed_path(&mut self);
}

/// Owns the active enemy set, ordered by identifier.
#[derive(Debug, Default)]
pub struct EnemyRegistry {
    enemies: Vec<Enemy>,
    next_enemy_id: u32,
}

impl EnemyRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the identifier of the next spawned enemy.
    pub fn allocate_id(&mut self) -> EnemyId {
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
        id
    }

    /// Inserts a newly spawned enemy.
    pub fn add(&mut self, enemy: Enemy) {
        match self.enemies.last() {
            Some(last) if last.id() > enemy.id() => {
                let index = self
                    .enemies
                    .partition_point(|existing| existing.id() < enemy.id());
                self.enemies.insert(index, enemy);
            }
            _ => self.enemies.push(enemy),
        }
    }

    /// Advances every enemy, then sweeps escaped and dead enemies exactly once.
    ///
    /// Each enemy is evaluated by at most one branch of the sweep: escape is
    /// checked first and only applies to living enemies. Removal happens after
    /// the scan completes.
    pub fn update(
        &mut self,
        dt: Duration,
        playfield: &Playfield,
        lifecycle: &mut impl EnemyLifecycle,
        out_events: &mut Vec<Event>,
    ) {
        for enemy in &mut self.enemies {
            enemy.update(dt);
        }

        for enemy in &mut self.enemies {
            if enemy.track_bounds(playfield) {
                lifecycle.enemy_completed_path();
                debug!(enemy = enemy.id().get(), "enemy escaped");
                out_events.push(Event::EnemyEscaped { enemy: enemy.id() });
            } else if !enemy.is_alive() {
                lifecycle.enemy_killed(enemy.reward());
                debug!(enemy = enemy.id().get(), reward = enemy.reward(), "enemy killed");
                out_events.push(Event::EnemyKilled {
                    enemy: enemy.id(),
                    reward: enemy.reward(),
                });
            }
        }

        self.enemies.retain(|enemy| !enemy.phase().is_terminal());
    }

    /// Draws every enemy that has left its spawn gate and is still alive.
    pub fn render(&self, presenter: &mut impl Presenter) {
        let visible = |enemy: &&Enemy| enemy.phase() == EnemyPhase::Moving;
        for enemy in self.enemies.iter().filter(visible) {
            presenter.draw_enemy(&enemy.snapshot());
        }
    }

    /// Looks up a live enemy.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.index_of(id).map(|index| &self.enemies[index])
    }

    /// Looks up a live enemy for mutation.
    pub fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.index_of(id).map(|index| &mut self.enemies[index])
    }

    fn index_of(&self, id: EnemyId) -> Option<usize> {
        self.enemies
            .binary_search_by_key(&id, |enemy| enemy.id())
            .ok()
    }

    /// Iterator over live enemies in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter()
    }

    /// Number of enemies in the registry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    /// Reports whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    /// Captures a consistent snapshot of every enemy.
    #[must_use]
    pub fn view(&self) -> EnemyView {
        EnemyView::from_snapshots(self.enemies.iter().map(Enemy::snapshot).collect())
    }

    /// Doubles the speed of every enemy.
    pub fn double_speed_clicked(&mut self) {
        for enemy in &mut self.enemies {
            enemy.double_speed_clicked();
        }
    }

    /// Restores the base speed of every enemy.
    pub fn normal_speed_clicked(&mut self) {
        for enemy in &mut self.enemies {
            enemy.normal_speed_clicked();
        }
    }

    /// Drops every enemy and restarts identifier allocation.
    pub fn clear(&mut self) {
        self.enemies.clear();
        self.next_enemy_id = 0;
    }
}
