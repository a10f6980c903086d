#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from level snapshots.
//!
//! Every tower is resolved against the same [`EnemyView`], so ties between
//! equidistant enemies break identically no matter how many towers look at
//! them within a tick.

use glam::Vec2;
use horde_defence_core::{EnemyId, EnemyView, TowerId, TowerTarget, TowerView};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    tower_workspace: Vec<TowerWorkspace>,
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided level snapshot.
    ///
    /// A tower keeps its committed target while that enemy is still present,
    /// targetable and in range. Otherwise it engages the nearest targetable
    /// enemy in range, preferring the earliest spawned one on ties. Towers
    /// without a candidate are absent from the output, which is cleared first.
    pub fn handle(&mut self, towers: &TowerView, enemies: &EnemyView, out: &mut Vec<TowerTarget>) {
        out.clear();

        if towers.iter().next().is_none() || enemies.is_empty() {
            return;
        }

        self.prepare_tower_workspace(towers);
        if self.tower_workspace.is_empty() {
            return;
        }

        self.prepare_enemy_workspace(enemies);
        if self.enemy_workspace.is_empty() {
            return;
        }

        for tower in &self.tower_workspace {
            let max_distance = tower.range * tower.range;

            let committed = tower.target.and_then(|id| {
                self.enemy_workspace
                    .binary_search_by_key(&id, |candidate| candidate.id)
                    .ok()
                    .map(|index| self.enemy_workspace[index])
                    .filter(|candidate| candidate.center.distance_squared(tower.center) <= max_distance)
            });

            if let Some(candidate) = committed {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy: candidate.id,
                    tower_center: tower.center,
                    enemy_center: candidate.center,
                });
                continue;
            }

            let mut best: Option<BestCandidate> = None;

            for candidate in &self.enemy_workspace {
                let distance_sq = candidate.center.distance_squared(tower.center);
                if distance_sq > max_distance {
                    continue;
                }

                let current = BestCandidate {
                    distance_sq,
                    enemy: candidate.id,
                    enemy_center: candidate.center,
                };

                match &mut best {
                    Some(existing) => {
                        if current.precedes(existing) {
                            *existing = current;
                        }
                    }
                    None => best = Some(current),
                }
            }

            if let Some(best_candidate) = best {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy: best_candidate.enemy,
                    tower_center: tower.center,
                    enemy_center: best_candidate.enemy_center,
                });
            }
        }
    }

    fn prepare_tower_workspace(&mut self, towers: &TowerView) {
        self.tower_workspace.clear();
        let (lower, _) = towers.iter().size_hint();
        self.tower_workspace.reserve(lower);

        for snapshot in towers.iter() {
            if !(snapshot.range.is_finite() && snapshot.range > 0.0) {
                continue;
            }

            self.tower_workspace.push(TowerWorkspace {
                id: snapshot.id,
                center: snapshot.center,
                range: snapshot.range,
                target: snapshot.target,
            });
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        self.enemy_workspace.reserve(enemies.len());

        // The view is sorted by id, which keeps the workspace searchable.
        for snapshot in enemies.iter().filter(|snapshot| snapshot.is_targetable()) {
            self.enemy_workspace.push(EnemyCandidate {
                id: snapshot.id,
                center: snapshot.center(),
            });
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TowerWorkspace {
    id: TowerId,
    center: Vec2,
    range: f32,
    target: Option<EnemyId>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    center: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance_sq: f32,
    enemy: EnemyId,
    enemy_center: Vec2,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance_sq != other.distance_sq {
            return self.distance_sq < other.distance_sq;
        }

        self.enemy < other.enemy
    }
}
