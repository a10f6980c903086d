//! Projectiles in flight between towers and their committed targets.

use std::time::Duration;

use glam::Vec2;
use horde_defence_core::{EnemyId, Event, Presenter, ProjectileId, ProjectileSnapshot, TowerId};

use crate::{enemies::EnemyRegistry, towers::Shot};

/// Slack added to the per-tick step when testing for arrival.
const ARRIVAL_EPSILON: f32 = 0.5;

#[derive(Clone, Debug)]
struct Projectile {
    id: ProjectileId,
    tower: TowerId,
    target: EnemyId,
    position: Vec2,
    destination: Vec2,
    damage: f32,
    speed: f32,
    finished: bool,
}

impl Projectile {
    fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            tower: self.tower,
            target: self.target,
            position: self.position,
            destination: self.destination,
        }
    }
}

/// Owns every projectile in flight.
#[derive(Debug, Default)]
pub struct ProjectileRegistry {
    projectiles: Vec<Projectile>,
    next_projectile_id: u32,
}

impl ProjectileRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Launches a projectile toward the target's position at fire time.
    pub fn launch(&mut self, shot: Shot, target: EnemyId, destination: Vec2) -> ProjectileId {
        let id = ProjectileId::new(self.next_projectile_id);
        self.next_projectile_id = self.next_projectile_id.wrapping_add(1);
        self.projectiles.push(Projectile {
            id,
            tower: shot.tower,
            target,
            position: shot.origin,
            destination,
            damage: shot.damage,
            speed: shot.speed,
            finished: false,
        });
        id
    }

    /// Moves every projectile and resolves arrivals against the enemy registry.
    ///
    /// A projectile whose target left the registry disappears without effect.
    /// On arrival the damage only lands if the target is still alive.
    pub fn update(&mut self, dt: Duration, enemies: &mut EnemyRegistry, out_events: &mut Vec<Event>) {
        let seconds = dt.as_secs_f32();

        for projectile in &mut self.projectiles {
            let Some(enemy) = enemies.get_mut(projectile.target) else {
                projectile.finished = true;
                out_events.push(Event::ProjectileExpired {
                    projectile: projectile.id,
                    target: projectile.target,
                });
                continue;
            };

            let step = projectile.speed * seconds;
            let offset = projectile.destination - projectile.position;
            if offset.length() > step + ARRIVAL_EPSILON {
                projectile.position += offset.normalize_or_zero() * step;
                continue;
            }

            projectile.position = projectile.destination;
            projectile.finished = true;
            if !enemy.phase().is_terminal() {
                let killed = enemy.shot(projectile.damage);
                out_events.push(Event::ProjectileHit {
                    projectile: projectile.id,
                    target: projectile.target,
                    damage: projectile.damage,
                    killed,
                });
            } else {
                out_events.push(Event::ProjectileExpired {
                    projectile: projectile.id,
                    target: projectile.target,
                });
            }
        }

        self.projectiles.retain(|projectile| !projectile.finished);
    }

    /// Number of projectiles in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    /// Reports whether no projectile is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    /// Snapshots of every projectile in launch order.
    #[must_use]
    pub fn snapshots(&self) -> Vec<ProjectileSnapshot> {
        self.projectiles.iter().map(Projectile::snapshot).collect()
    }

    /// Draws every projectile.
    pub fn render(&self, presenter: &mut impl Presenter) {
        for projectile in &self.projectiles {
            presenter.draw_projectile(&projectile.snapshot());
        }
    }

    /// Drops every projectile and restarts identifier allocation.
    pub fn clear(&mut self) {
        self.projectiles.clear();
        self.next_projectile_id = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemy::{Enemy, EnemyBlueprint};
    use horde_defence_core::{EnemyKind, EnemyPhase, Path};

    fn registry_with_enemy(health: f32) -> (EnemyRegistry, EnemyId) {
        let mut enemies = EnemyRegistry::new();
        let id = enemies.allocate_id();
        let path = Path::parse("R").expect("valid route");
        enemies.add(Enemy::new(
            id,
            EnemyBlueprint {
                kind: EnemyKind::Regular,
                position: Vec2::new(100.0, 0.0),
                size: Vec2::splat(10.0),
                health,
                speed: 10.0,
                reward: 1,
                spawn_delay: Duration::from_secs(60),
            },
            &path,
            Vec2::splat(10.0),
        ));
        (enemies, id)
    }

    fn shot(damage: f32) -> Shot {
        Shot {
            tower: TowerId::new(0),
            origin: Vec2::ZERO,
            damage,
            speed: 50.0,
        }
    }

    #[test]
    fn projectile_travels_then_hits() {
        let (mut enemies, target) = registry_with_enemy(30.0);
        let mut projectiles = ProjectileRegistry::new();
        let mut events = Vec::new();
        let id = projectiles.launch(shot(12.0), target, Vec2::new(100.0, 0.0));

        projectiles.update(Duration::from_secs(1), &mut enemies, &mut events);
        assert!(events.is_empty());
        assert_eq!(projectiles.snapshots()[0].position, Vec2::new(50.0, 0.0));

        projectiles.update(Duration::from_secs(1), &mut enemies, &mut events);
        assert_eq!(
            events,
            vec![Event::ProjectileHit {
                projectile: id,
                target,
                damage: 12.0,
                killed: false,
            }]
        );
        assert!(projectiles.is_empty());
        assert_eq!(enemies.get(target).map(Enemy::health), Some(18.0));
    }

    #[test]
    fn removed_target_expires_the_projectile() {
        let (mut enemies, target) = registry_with_enemy(30.0);
        let mut projectiles = ProjectileRegistry::new();
        let mut events = Vec::new();
        let id = projectiles.launch(shot(12.0), target, Vec2::new(100.0, 0.0));
        enemies.clear();

        projectiles.update(Duration::from_millis(16), &mut enemies, &mut events);

        assert_eq!(
            events,
            vec![Event::ProjectileExpired {
                projectile: id,
                target
            }]
        );
        assert!(projectiles.is_empty());
    }

    #[test]
    fn dead_target_takes_no_further_damage() {
        let (mut enemies, target) = registry_with_enemy(10.0);
        let mut projectiles = ProjectileRegistry::new();
        let mut events = Vec::new();
        let first = projectiles.launch(shot(10.0), target, Vec2::new(20.0, 0.0));
        let second = projectiles.launch(shot(10.0), target, Vec2::new(20.0, 0.0));

        projectiles.update(Duration::from_secs(1), &mut enemies, &mut events);

        assert_eq!(
            events,
            vec![
                Event::ProjectileHit {
                    projectile: first,
                    target,
                    damage: 10.0,
                    killed: true,
                },
                Event::ProjectileExpired {
                    projectile: second,
                    target
                },
            ]
        );
        assert_eq!(
            enemies.get(target).map(Enemy::phase),
            Some(EnemyPhase::Dead)
        );
    }
}
