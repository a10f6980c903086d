use std::{collections::BTreeSet, time::Duration};

use glam::Vec2;
use horde_defence_core::{
    Command, EconomyConfig, EnemyKind, EnemyPhase, Event, GameConfig, Path, PlacementError,
    TowerId, TowerKind, UpgradeError, START_MONEY,
};
use horde_defence_world::{self as world, query, Enemy, EnemyBlueprint, Level};

/// Cell (2, 4) of the default layout, two rows below the first path leg.
const BESIDE_PATH: Vec2 = Vec2::new(160.0, 288.0);

fn default_level() -> Level {
    Level::new(GameConfig::default()).expect("default configuration is valid")
}

fn blueprint(health: f32, speed: f32) -> EnemyBlueprint {
    EnemyBlueprint {
        kind: EnemyKind::Regular,
        position: Vec2::new(128.0, 64.0),
        size: Vec2::splat(48.0),
        health,
        speed,
        reward: 5,
        spawn_delay: Duration::ZERO,
    }
}

fn run(level: &mut Level, frames: u32, dt: Duration) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..frames {
        world::apply(level, Command::Tick { dt }, &mut events);
    }
    events
}

#[test]
fn enemy_dies_on_the_second_hit_only() {
    let path = Path::parse("R4").expect("valid route");
    let mut enemy = Enemy::new(
        horde_defence_core::EnemyId::new(0),
        blueprint(100.0, 10.0),
        &path,
        Vec2::splat(64.0),
    );

    assert!(!enemy.shot(40.0));
    assert!(enemy.is_alive());
    assert_eq!(enemy.health(), 60.0);

    assert!(enemy.shot(60.0));
    assert!(!enemy.is_alive());
    assert_eq!(enemy.phase(), EnemyPhase::Dead);
}

#[test]
fn one_tile_of_motion_consumes_one_direction_exactly() {
    let path = Path::parse("R2").expect("valid route");
    let mut enemy = Enemy::new(
        horde_defence_core::EnemyId::new(0),
        blueprint(10.0, 64.0),
        &path,
        Vec2::splat(64.0),
    );
    let start = enemy.position();

    enemy.update(Duration::from_secs(1));

    assert_eq!(enemy.remaining_directions(), 1);
    assert_eq!(enemy.position(), start + Vec2::new(64.0, 0.0));
    assert_eq!(enemy.distance_to_waypoint(), 0.0);
}

#[test]
fn overshoot_is_cancelled_in_both_signs() {
    for (route, sign) in [("R2", 1.0), ("L2", -1.0), ("D2", 1.0), ("U2", -1.0)] {
        let path = Path::parse(route).expect("valid route");
        let mut enemy = Enemy::new(
            horde_defence_core::EnemyId::new(0),
            blueprint(10.0, 64.0),
            &path,
            Vec2::splat(64.0),
        );
        let start = enemy.position();

        for millis in [300, 300, 500] {
            enemy.update(Duration::from_millis(millis));
        }

        let travelled = (enemy.position() - start) * sign;
        let along = travelled.x + travelled.y;
        assert!((along - 64.0).abs() < 1e-3, "{route}: travelled {along}");
        assert_eq!(enemy.remaining_directions(), 1, "{route}");
    }
}

#[test]
fn removing_more_money_than_available_clamps_to_zero() {
    let mut level = default_level();
    assert_eq!(level.money(), START_MONEY);

    level.remove_money(START_MONEY + 1);

    assert_eq!(level.money(), 0);
}

#[test]
fn completed_paths_cost_exactly_one_life_each() {
    let mut level = default_level();
    for _ in 0..6 {
        level.enemy_completed_path();
    }
    assert_eq!(level.user_health(), 4);
    assert!(!level.is_game_over());

    let mut config = GameConfig::default();
    config.economy = EconomyConfig {
        starting_lives: 6,
        ..EconomyConfig::default()
    };
    let mut level = Level::new(config).expect("valid configuration");
    for _ in 0..5 {
        level.enemy_completed_path();
    }
    assert!(!level.is_game_over());
    level.enemy_completed_path();
    assert_eq!(level.user_health(), 0);
    assert!(level.is_game_over());
}

#[test]
fn placement_upgrade_and_sale_flow_through_the_economy() {
    let mut level = default_level();
    let mut events = Vec::new();

    world::apply(
        &mut level,
        Command::SelectTower {
            kind: TowerKind::Gunner,
        },
        &mut events,
    );
    assert_eq!(level.place_selected_tower(BESIDE_PATH, &mut events), 50);
    assert_eq!(level.money(), START_MONEY - 50);

    let tower = TowerId::new(0);
    assert_eq!(level.place_selected_tower(BESIDE_PATH, &mut events), 0);
    assert_eq!(
        level.place_selected_tower(Vec2::new(32.0, 160.0), &mut events),
        0
    );
    assert_eq!(
        level.place_selected_tower(Vec2::new(-10.0, 10.0), &mut events),
        0
    );

    assert!(level.select_tower_for_upgrade(tower));
    assert_eq!(level.upgrade_selected_tower(&mut events), 40);
    assert_eq!(level.upgrade_tower(tower, &mut events), 80);
    assert_eq!(level.upgrade_tower(tower, &mut events), 0);
    assert_eq!(level.money(), START_MONEY - 50 - 40 - 80);

    assert_eq!(level.remove_tower(tower, &mut events), 85);
    assert_eq!(level.money(), START_MONEY - 50 - 40 - 80 + 85);
    assert_eq!(level.remove_tower(tower, &mut events), 0);

    let rejections: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::TowerPlacementRejected { reason, .. } => Some(*reason),
            _ => None,
        })
        .collect();
    assert_eq!(
        rejections,
        vec![
            PlacementError::Occupied,
            PlacementError::OnPath,
            PlacementError::OutOfBounds,
        ]
    );
    assert!(events.contains(&Event::TowerUpgradeRejected {
        tower,
        reason: UpgradeError::MaxTier,
    }));
}

#[test]
fn unaffordable_placement_leaves_money_unchanged() {
    let mut level = default_level();
    let mut events = Vec::new();
    level.remove_money(START_MONEY - 10);

    assert_eq!(level.place_tower(TowerKind::Gunner, BESIDE_PATH, &mut events), 0);

    assert_eq!(level.money(), 10);
    assert_eq!(
        events,
        vec![Event::TowerPlacementRejected {
            kind: Some(TowerKind::Gunner),
            position: BESIDE_PATH,
            reason: PlacementError::InsufficientFunds,
        }]
    );
}

#[test]
fn defended_run_settles_kills_into_the_economy() {
    let mut level = default_level();
    let mut events = Vec::new();
    assert_eq!(level.place_tower(TowerKind::Gunner, BESIDE_PATH, &mut events), 50);
    assert_eq!(
        level.place_tower(TowerKind::Gunner, Vec2::new(224.0, 288.0), &mut events),
        50
    );

    events.extend(run(&mut level, 60 * 30, Duration::from_secs(1) / 60));

    let rewards: u32 = events
        .iter()
        .filter_map(|event| match event {
            Event::EnemyKilled { reward, .. } => Some(*reward),
            _ => None,
        })
        .sum();
    let escapes = events
        .iter()
        .filter(|event| matches!(event, Event::EnemyEscaped { .. }))
        .count() as i32;

    assert!(level.enemies_killed() > 0);
    assert!(level.current_wave() >= 1);
    assert_eq!(level.money(), START_MONEY - 100 + rewards);
    assert_eq!(level.score(), level.enemies_killed() * 10);
    assert_eq!(level.user_health(), 10 - escapes);

    let mut removed = BTreeSet::new();
    for event in &events {
        if let Event::EnemyKilled { enemy, .. } | Event::EnemyEscaped { enemy } = event {
            assert!(removed.insert(*enemy), "{enemy:?} removed twice");
        }
    }
}

#[test]
fn identical_sessions_replay_identically() {
    let replay = || {
        let mut level = default_level();
        let mut events = Vec::new();
        let _ = level.place_tower(TowerKind::Bomber, BESIDE_PATH, &mut events);
        let _ = level.place_tower(TowerKind::Sniper, Vec2::new(416.0, 288.0), &mut events);
        events.extend(run(&mut level, 1_200, Duration::from_millis(25)));
        (events, level.score(), level.money(), level.user_health())
    };

    assert_eq!(replay(), replay());
}

#[test]
fn spawn_sequence_is_independent_of_frame_rate() {
    let spawned = |fps: u32| {
        let mut level = default_level();
        run(&mut level, fps * 20, Duration::from_secs(1) / fps)
            .into_iter()
            .filter_map(|event| match event {
                Event::EnemySpawned { enemy, kind, wave } => Some((enemy, kind, wave)),
                _ => None,
            })
            .collect::<Vec<_>>()
    };

    let slow = spawned(30);
    assert_eq!(slow.len(), 13);
    assert_eq!(slow, spawned(144));
}

#[test]
fn restart_returns_to_start_of_game_values() {
    let mut level = default_level();
    let mut events = Vec::new();
    let _ = level.place_tower(TowerKind::Gunner, BESIDE_PATH, &mut events);
    level.double_speed_clicked();
    let _ = run(&mut level, 400, Duration::from_millis(25));
    assert!(!query::enemy_view(&level).is_empty());

    world::apply(&mut level, Command::Restart, &mut events);

    assert_eq!(level.money(), START_MONEY);
    assert_eq!(level.score(), 0);
    assert_eq!(level.current_wave(), 0);
    assert_eq!(level.enemies_killed(), 0);
    assert_eq!(level.user_health(), 10);
    assert!(query::enemy_view(&level).is_empty());
    assert!(query::tower_view(&level).into_vec().is_empty());
    assert!(query::projectiles(&level).is_empty());
    assert_eq!(query::next_wave_in(&level), Some(Duration::from_secs(2)));
    assert_eq!(
        query::speed_mode(&level),
        horde_defence_core::SpeedMode::Normal
    );
}

#[test]
fn game_over_is_reported_once_and_stops_spawning() {
    let mut config = GameConfig::default();
    config.economy.starting_lives = 1;
    let mut level = Level::new(config).expect("valid configuration");

    let events = run(&mut level, 60 * 60, Duration::from_secs(1) / 60);

    let game_overs: Vec<_> = events
        .iter()
        .enumerate()
        .filter(|(_, event)| matches!(event, Event::GameOver { .. }))
        .map(|(index, _)| index)
        .collect();
    assert_eq!(game_overs.len(), 1);
    assert!(level.is_game_over());
    assert!(!events[game_overs[0]..]
        .iter()
        .any(|event| matches!(event, Event::EnemySpawned { .. })));
}

#[test]
fn enemies_on_an_edge_hugging_route_escape_and_leave_the_registry() {
    let mut config = GameConfig::default();
    config.path.start = Vec2::new(-56.0, -24.0);
    config.path.route = Path::parse("R20").expect("valid route");
    let mut level = Level::new(config).expect("valid configuration");

    let events = run(&mut level, 60 * 60, Duration::from_secs(1) / 60);

    let escapes = events
        .iter()
        .filter(|event| matches!(event, Event::EnemyEscaped { .. }))
        .count() as i32;
    assert!(escapes > 0);
    assert_eq!(level.user_health(), 10 - escapes);

    let width = query::playfield(&level).width();
    for enemy in query::enemy_view(&level).iter() {
        assert!(
            enemy.position.x + enemy.size.x <= width,
            "{:?} lingers past the right edge",
            enemy.id
        );
    }
}
