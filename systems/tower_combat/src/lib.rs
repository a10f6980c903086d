#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns committed targets into projectile launches.

use horde_defence_core::{Command, EnemyView, TowerCooldownView, TowerId, TowerTarget};

/// Decides which engaged towers fire during the current tick.
///
/// A tower fires when its cooldown has fully elapsed and its target is still
/// targetable in the enemy snapshot. Otherwise it holds its cooldown.
#[derive(Debug, Default)]
pub struct TowerCombat {
    ready: Vec<TowerId>,
}

impl TowerCombat {
    /// Creates a combat system with an empty readiness buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits one `Command::FireProjectile` per ready tower, in tower order.
    ///
    /// `tower_targets` must be ordered by tower, as the targeting system
    /// produces it.
    pub fn handle(
        &mut self,
        tower_cooldowns: &TowerCooldownView,
        tower_targets: &[TowerTarget],
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        self.ready.clear();
        self.ready.extend(
            tower_cooldowns
                .iter()
                .filter(|cooldown| cooldown.ready_in.is_zero())
                .map(|cooldown| cooldown.tower),
        );
        if self.ready.is_empty() {
            return;
        }

        let mut ready = self.ready.iter().peekable();
        for target in tower_targets {
            while ready.next_if(|tower| **tower < target.tower).is_some() {}
            if ready.next_if_eq(&&target.tower).is_none() {
                continue;
            }

            let engaged = enemies
                .get(target.enemy)
                .is_some_and(|enemy| enemy.is_targetable());
            if engaged {
                out.push(Command::FireProjectile {
                    tower: target.tower,
                    target: target.enemy,
                });
            }
        }
    }
}
