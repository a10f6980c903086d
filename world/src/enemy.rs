//! Path-following enemy with a spawn gate and drift-free waypoint motion.

use std::{collections::VecDeque, time::Duration};

use glam::Vec2;
use horde_defence_core::{
    Direction, EnemyId, EnemyKind, EnemyPhase, EnemySnapshot, Path, Playfield,
};

/// Parameters an enemy is constructed from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyBlueprint {
    /// Enemy type.
    pub kind: EnemyKind,
    /// Top-left corner at spawn time.
    pub position: Vec2,
    /// Bounding box size.
    pub size: Vec2,
    /// Starting health.
    pub health: f32,
    /// Base speed in world units per second.
    pub speed: f32,
    /// Money granted when the enemy is killed.
    pub reward: u32,
    /// Waiting time before the enemy starts moving.
    pub spawn_delay: Duration,
}

/// Moving entity that walks a private copy of the level path.
#[derive(Clone, Debug)]
pub struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    position: Vec2,
    size: Vec2,
    health: f32,
    max_health: f32,
    speed: f32,
    doubled: bool,
    directions: VecDeque<Direction>,
    direction: Option<Direction>,
    distance_to_waypoint: f32,
    tile_size: Vec2,
    spawn_delay: Duration,
    elapsed: Duration,
    reward: u32,
    phase: EnemyPhase,
    entered_playfield: bool,
}

impl Enemy {
    /// Creates a waiting enemy at the start of `path`.
    #[must_use]
    pub fn new(id: EnemyId, blueprint: EnemyBlueprint, path: &Path, tile_size: Vec2) -> Self {
        Self {
            id,
            kind: blueprint.kind,
            position: blueprint.position,
            size: blueprint.size,
            health: blueprint.health,
            max_health: blueprint.health,
            speed: blueprint.speed,
            doubled: false,
            directions: path.directions().iter().copied().collect(),
            direction: None,
            distance_to_waypoint: 0.0,
            tile_size,
            spawn_delay: blueprint.spawn_delay,
            elapsed: Duration::ZERO,
            reward: blueprint.reward,
            phase: EnemyPhase::Waiting,
            entered_playfield: false,
        }
    }

    /// Identifier allocated at spawn time.
    #[must_use]
    pub fn id(&self) -> EnemyId {
        self.id
    }

    /// Enemy type.
    #[must_use]
    pub fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Top-left corner in world units.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Bounding box size.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Center of the bounding box.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    /// Remaining health; never negative.
    #[must_use]
    pub fn health(&self) -> f32 {
        self.health
    }

    /// Current speed including the speed modifier.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Money granted when the enemy is killed.
    #[must_use]
    pub fn reward(&self) -> u32 {
        self.reward
    }

    /// Lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> EnemyPhase {
        self.phase
    }

    /// Reports whether the enemy still has health left.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.phase != EnemyPhase::Dead
    }

    /// Reports whether the bounding box has touched the playfield.
    #[must_use]
    pub fn has_entered_playfield(&self) -> bool {
        self.entered_playfield
    }

    /// Direction currently being walked, if any.
    #[must_use]
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Number of directions not yet popped from the queue.
    #[must_use]
    pub fn remaining_directions(&self) -> usize {
        self.directions.len()
    }

    /// Distance left until the current waypoint.
    #[must_use]
    pub fn distance_to_waypoint(&self) -> f32 {
        self.distance_to_waypoint
    }

    /// Advances the spawn gate and, once active, the motion along the path.
    pub fn update(&mut self, dt: Duration) {
        let active = match self.phase {
            EnemyPhase::Dead | EnemyPhase::Escaped => return,
            EnemyPhase::Waiting => {
                self.elapsed = self.elapsed.saturating_add(dt);
                if self.elapsed < self.spawn_delay {
                    return;
                }
                self.phase = EnemyPhase::Moving;
                // Only the part of the frame past the gate is spent walking.
                self.elapsed - self.spawn_delay
            }
            EnemyPhase::Moving => {
                self.elapsed = self.elapsed.saturating_add(dt);
                dt
            }
        };

        self.advance(active.as_secs_f32());
    }

    fn advance(&mut self, seconds: f32) {
        if self.distance_to_waypoint <= 0.0 {
            self.direction = self.directions.pop_front();
            self.distance_to_waypoint = match self.direction {
                Some(direction) if direction.is_horizontal() => self.tile_size.x,
                Some(_) => self.tile_size.y,
                None => 0.0,
            };
        }

        let Some(direction) = self.direction else {
            return;
        };

        let moved = self.speed * seconds;
        self.position += direction.unit() * moved;
        self.distance_to_waypoint -= moved;
        if self.distance_to_waypoint < 0.0 {
            // The negative remainder points back along the direction of travel.
            self.position += direction.unit() * self.distance_to_waypoint;
            self.distance_to_waypoint = 0.0;
        }
    }

    /// Applies damage and reports whether this hit killed the enemy.
    ///
    /// Dead or escaped enemies ignore further damage.
    pub fn shot(&mut self, damage: f32) -> bool {
        if self.phase.is_terminal() {
            return false;
        }

        self.health = (self.health - damage).max(0.0);
        if self.health <= 0.0 {
            self.phase = EnemyPhase::Dead;
            return true;
        }
        false
    }

    /// Doubles the speed unless it is already doubled.
    pub fn double_speed_clicked(&mut self) {
        if !self.doubled {
            self.speed *= 2.0;
            self.doubled = true;
        }
    }

    /// Restores the base speed if it is currently doubled.
    pub fn normal_speed_clicked(&mut self) {
        if self.doubled {
            self.speed /= 2.0;
            self.doubled = false;
        }
    }

    /// Updates the entered flag and marks the enemy escaped when it crossed
    /// the far edge; returns whether it escaped during this call.
    ///
    /// Only moving enemies whose box has overlapped the playfield can escape,
    /// so enemies waiting off-screen are never flagged. Routes hugging an edge
    /// still count as entered.
    pub fn track_bounds(&mut self, playfield: &Playfield) -> bool {
        if self.phase != EnemyPhase::Moving {
            return false;
        }

        if !self.entered_playfield {
            self.entered_playfield = playfield.overlaps_box(self.position, self.size);
            if !self.entered_playfield {
                return false;
            }
        }

        if playfield.beyond_far_edge(self.position, self.size) {
            self.phase = EnemyPhase::Escaped;
            return true;
        }
        false
    }

    /// Captures the enemy's observable state.
    #[must_use]
    pub fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            phase: self.phase,
            position: self.position,
            size: self.size,
            health: self.health,
            max_health: self.max_health,
            speed: self.speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TILE: Vec2 = Vec2::new(64.0, 48.0);

    fn enemy(route: &str, speed: f32, spawn_delay: Duration) -> Enemy {
        let path = Path::parse(route).expect("valid route");
        Enemy::new(
            EnemyId::new(0),
            EnemyBlueprint {
                kind: EnemyKind::Regular,
                position: Vec2::ZERO,
                size: Vec2::splat(32.0),
                health: 100.0,
                speed,
                reward: 5,
                spawn_delay,
            },
            &path,
            TILE,
        )
    }

    #[test]
    fn waits_until_spawn_delay_elapsed() {
        let mut enemy = enemy("R2", 64.0, Duration::from_millis(500));
        enemy.update(Duration::from_millis(300));
        assert_eq!(enemy.phase(), EnemyPhase::Waiting);
        assert_eq!(enemy.position(), Vec2::ZERO);
        assert_eq!(enemy.remaining_directions(), 2);

        enemy.update(Duration::from_millis(450));
        assert_eq!(enemy.phase(), EnemyPhase::Moving);
        assert_eq!(enemy.position(), Vec2::new(16.0, 0.0));
    }

    #[test]
    fn one_tile_of_motion_lands_exactly_on_the_waypoint() {
        let mut enemy = enemy("R2", 64.0, Duration::ZERO);
        enemy.update(Duration::from_secs(1));

        assert_eq!(enemy.remaining_directions(), 1);
        assert_eq!(enemy.position(), Vec2::new(64.0, 0.0));
        assert_eq!(enemy.distance_to_waypoint(), 0.0);
    }

    #[test]
    fn overshoot_is_cancelled_for_decreasing_coordinates() {
        let mut enemy = enemy("L U", 100.0, Duration::ZERO);
        enemy.update(Duration::from_secs(1));
        assert_eq!(enemy.position(), Vec2::new(-64.0, 0.0));
        assert_eq!(enemy.distance_to_waypoint(), 0.0);

        enemy.update(Duration::from_secs(1));
        assert_eq!(enemy.direction(), Some(Direction::Up));
        assert_eq!(enemy.position(), Vec2::new(-64.0, -48.0));
    }

    #[test]
    fn vertical_waypoints_use_tile_height() {
        let mut enemy = enemy("D", 24.0, Duration::ZERO);
        enemy.update(Duration::from_secs(1));
        assert_eq!(enemy.distance_to_waypoint(), 24.0);
        enemy.update(Duration::from_secs(1));
        assert_eq!(enemy.position(), Vec2::new(0.0, 48.0));
    }

    #[test]
    fn exhausted_queue_holds_position() {
        let mut enemy = enemy("R", 64.0, Duration::ZERO);
        enemy.update(Duration::from_secs(1));
        enemy.update(Duration::from_secs(1));
        assert_eq!(enemy.direction(), None);
        assert_eq!(enemy.position(), Vec2::new(64.0, 0.0));
        assert_eq!(enemy.phase(), EnemyPhase::Moving);
    }

    #[test]
    fn second_hit_kills_and_freezes_motion() {
        let mut enemy = enemy("R4", 64.0, Duration::ZERO);
        assert!(!enemy.shot(40.0));
        assert_eq!(enemy.phase(), EnemyPhase::Waiting);
        assert!(enemy.shot(60.0));
        assert_eq!(enemy.phase(), EnemyPhase::Dead);
        assert!(!enemy.shot(10.0), "dead enemies ignore damage");

        enemy.update(Duration::from_secs(1));
        assert_eq!(enemy.position(), Vec2::ZERO);
    }

    #[test]
    fn speed_toggles_are_idempotent() {
        let mut enemy = enemy("R", 37.3, Duration::ZERO);
        enemy.double_speed_clicked();
        enemy.double_speed_clicked();
        assert_eq!(enemy.speed(), 74.6);
        enemy.normal_speed_clicked();
        enemy.normal_speed_clicked();
        assert_eq!(enemy.speed(), 37.3);
    }

    #[test]
    fn escape_requires_entering_the_playfield_first() {
        let playfield = Playfield::new(2, 1, TILE);
        let path = Path::parse("R4").expect("valid route");
        let mut enemy = Enemy::new(
            EnemyId::new(3),
            EnemyBlueprint {
                kind: EnemyKind::Quick,
                position: Vec2::new(200.0, 8.0),
                size: Vec2::splat(32.0),
                health: 10.0,
                speed: 64.0,
                reward: 1,
                spawn_delay: Duration::ZERO,
            },
            &path,
            TILE,
        );

        assert!(!enemy.track_bounds(&playfield), "waiting enemies never escape");
        enemy.update(Duration::from_millis(10));
        assert!(!enemy.track_bounds(&playfield), "never entered the playfield");
        assert!(!enemy.has_entered_playfield());

        let mut walker = Enemy::new(
            EnemyId::new(4),
            EnemyBlueprint {
                kind: EnemyKind::Quick,
                position: Vec2::new(-40.0, 8.0),
                size: Vec2::splat(32.0),
                health: 10.0,
                speed: 64.0,
                reward: 1,
                spawn_delay: Duration::ZERO,
            },
            &path,
            TILE,
        );

        let mut escaped_after = None;
        for tick in 0..8 {
            walker.update(Duration::from_millis(500));
            if walker.track_bounds(&playfield) {
                escaped_after = Some(tick);
                break;
            }
        }

        assert!(walker.has_entered_playfield());
        assert_eq!(walker.phase(), EnemyPhase::Escaped);
        assert!(escaped_after.is_some());
        assert!(!walker.shot(100.0), "escaped enemies cannot be killed");
    }

    #[test]
    fn edge_hugging_route_still_escapes() {
        let playfield = Playfield::new(4, 2, TILE);
        let path = Path::parse("R8").expect("valid route");
        let mut enemy = Enemy::new(
            EnemyId::new(5),
            EnemyBlueprint {
                kind: EnemyKind::Regular,
                position: Vec2::new(-56.0, -24.0),
                size: Vec2::splat(48.0),
                health: 10.0,
                speed: 64.0,
                reward: 1,
                spawn_delay: Duration::ZERO,
            },
            &path,
            TILE,
        );

        let mut escaped = false;
        for _ in 0..16 {
            enemy.update(Duration::from_millis(500));
            if enemy.track_bounds(&playfield) {
                escaped = true;
                break;
            }
        }

        assert!(escaped, "box straddling the top edge must escape on the right");
        assert!(enemy.has_entered_playfield());
        assert!(enemy.position().x + enemy.size().x > playfield.width());
    }
}
