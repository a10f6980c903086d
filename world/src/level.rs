//! Session root that owns the economy, the registries and the wave timeline.

use std::{collections::BTreeSet, time::Duration};

use glam::Vec2;
use horde_defence_core::{
    Command, ConfigError, EnemyId, Event, GameConfig, GridCell, PlacementError, Playfield,
    Presenter, RemovalError, SpeedMode, TowerId, TowerKind, TowerTarget, UpgradeError,
};
use horde_defence_system_spawning::WaveSpawning;
use horde_defence_system_tower_combat::TowerCombat;
use horde_defence_system_tower_targeting::TowerTargeting;
use tracing::{debug, info, warn};

use crate::{
    economy::Economy,
    enemies::{EnemyLifecycle, EnemyRegistry},
    factory::WaveEnemyFactory,
    projectiles::ProjectileRegistry,
    towers::{PlacementRules, TowerRegistry, TowerSelection},
};

/// Authoritative state of a single play session.
///
/// Every registry is owned by the level, so two levels never share state and
/// [`Level::restart`] cannot leak entities across sessions.
#[derive(Debug)]
pub struct Level {
    config: GameConfig,
    playfield: Playfield,
    path_cells: BTreeSet<GridCell>,
    economy: Economy,
    enemies: EnemyRegistry,
    towers: TowerRegistry,
    projectiles: ProjectileRegistry,
    spawning: WaveSpawning,
    targeting: TowerTargeting,
    combat: TowerCombat,
    factory: Option<WaveEnemyFactory>,
    targets: Vec<TowerTarget>,
    current_wave: u32,
    speed_mode: SpeedMode,
    game_over_reported: bool,
    elapsed: Duration,
}

impl Level {
    /// Validates the configuration and creates a level at its start-of-game state.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let playfield = config.playfield();
        let path_cells = config
            .path
            .route
            .cells_from(config.path.start_cell(&playfield))
            .into_iter()
            .collect();

        Ok(Self {
            economy: Economy::new(&config.economy),
            spawning: WaveSpawning::new(config.schedule.clone()),
            config,
            playfield,
            path_cells,
            enemies: EnemyRegistry::new(),
            towers: TowerRegistry::new(),
            projectiles: ProjectileRegistry::new(),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            factory: None,
            targets: Vec::new(),
            current_wave: 0,
            speed_mode: SpeedMode::Normal,
            game_over_reported: false,
            elapsed: Duration::ZERO,
        })
    }

    /// Advances the whole simulation by one frame.
    ///
    /// Waves spawn first, then enemies move and the removal sweep settles
    /// kills and escapes. Towers then acquire targets from one enemy snapshot
    /// and fire, and projectiles resolve last.
    pub fn update(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.elapsed = self.elapsed.saturating_add(dt);
        let advanced = Event::TimeAdvanced { dt };
        out_events.push(advanced.clone());

        if !self.is_game_over() {
            let mut wave_commands = Vec::new();
            self.spawning.handle(&[advanced], &mut wave_commands);
            for command in wave_commands {
                self.execute_wave_command(command, out_events);
            }
        }

        self.enemies
            .update(dt, &self.playfield, &mut self.economy, out_events);

        self.towers.tick_cooldowns(dt);
        let enemy_view = self.enemies.view();
        self.targeting
            .handle(&self.towers.view(), &enemy_view, &mut self.targets);
        self.towers.assign_targets(&self.targets, out_events);

        let mut fire_commands = Vec::new();
        self.combat.handle(
            &self.towers.cooldown_view(),
            &self.targets,
            &enemy_view,
            &mut fire_commands,
        );
        for command in fire_commands {
            if let Command::FireProjectile { tower, target } = command {
                self.fire_projectile(tower, target, out_events);
            }
        }

        self.projectiles.update(dt, &mut self.enemies, out_events);

        if self.is_game_over() && !self.game_over_reported {
            self.game_over_reported = true;
            info!(
                score = self.economy.score(),
                wave = self.current_wave,
                "game over"
            );
            out_events.push(Event::GameOver {
                score: self.economy.score(),
                wave: self.current_wave,
            });
        }
    }

    /// Executes a wave timeline command produced by the spawning system.
    pub(crate) fn execute_wave_command(&mut self, command: Command, out_events: &mut Vec<Event>) {
        match command {
            Command::StartWave { wave } => {
                let Some(plan) = self.config.schedule.plan(wave) else {
                    warn!(wave, "no plan for wave");
                    return;
                };
                self.factory = Some(WaveEnemyFactory::new(&plan));
                self.current_wave = wave;
                info!(wave, count = plan.count, "wave started");
                out_events.push(Event::WaveStarted { wave });
            }
            Command::SpawnEnemy { wave, spawn_delay } => {
                let Some(factory) = self
                    .factory
                    .as_mut()
                    .filter(|factory| factory.wave() == wave)
                else {
                    warn!(wave, "spawn requested outside an active wave");
                    return;
                };
                let id = self.enemies.allocate_id();
                let mut enemy = factory.next(id, spawn_delay, &self.config);
                if self.speed_mode == SpeedMode::Double {
                    enemy.double_speed_clicked();
                }
                let kind = enemy.kind();
                self.enemies.add(enemy);
                debug!(enemy = id.get(), ?kind, wave, "enemy spawned");
                out_events.push(Event::EnemySpawned {
                    enemy: id,
                    kind,
                    wave,
                });
            }
            Command::EndWave { wave } => {
                self.factory = None;
                debug!(wave, "wave fully spawned");
                out_events.push(Event::WaveSpawned { wave });
            }
            other => warn!(?other, "not a wave command"),
        }
    }

    /// Launches a projectile from a ready tower at a targetable enemy.
    pub(crate) fn fire_projectile(
        &mut self,
        tower: TowerId,
        target: EnemyId,
        out_events: &mut Vec<Event>,
    ) {
        let Some(destination) = self
            .enemies
            .get(target)
            .map(|enemy| enemy.snapshot())
            .filter(|snapshot| snapshot.is_targetable())
            .map(|snapshot| snapshot.center())
        else {
            warn!(tower = tower.get(), enemy = target.get(), "fire at missing target");
            return;
        };

        let Some(shot) = self.towers.fire(tower) else {
            return;
        };
        let projectile = self.projectiles.launch(shot, target, destination);
        out_events.push(Event::ProjectileFired {
            projectile,
            tower,
            target,
        });
    }

    /// Adds money to the balance.
    pub fn add_money(&mut self, amount: u32) {
        self.economy.add_money(amount);
    }

    /// Removes money, clamping the balance at zero.
    ///
    /// The clamp applies identically while an upgrade is selected.
    pub fn remove_money(&mut self, amount: u32) {
        let removed = self.economy.remove_money(amount);
        if removed < amount {
            debug!(
                requested = amount,
                removed,
                upgrade = self.towers.is_upgrade_selected(),
                "money removal clamped"
            );
        }
    }

    /// Grants a kill reward: money, a fixed score increment and one kill.
    pub fn enemy_killed(&mut self, reward: u32) {
        self.economy.enemy_killed(reward);
    }

    /// Costs the player one life.
    pub fn enemy_completed_path(&mut self) {
        self.economy.enemy_completed_path();
    }

    /// Reinitialises every field to its start-of-game value.
    pub fn restart(&mut self) {
        self.economy.restart();
        self.enemies.clear();
        self.towers.clear();
        self.projectiles.clear();
        self.spawning.reset();
        self.factory = None;
        self.targets.clear();
        self.current_wave = 0;
        self.speed_mode = SpeedMode::Normal;
        self.game_over_reported = false;
        self.elapsed = Duration::ZERO;
        info!("level restarted");
    }

    /// Selects the tower kind placed by [`Level::place_selected_tower`].
    pub fn select_tower(&mut self, kind: TowerKind) {
        self.towers.select_tower(kind);
    }

    /// Selects an existing tower for [`Level::upgrade_selected_tower`].
    pub fn select_tower_for_upgrade(&mut self, tower: TowerId) -> bool {
        self.towers.select_tower_for_upgrade(tower)
    }

    /// Clears any selection.
    pub fn clear_selection(&mut self) {
        self.towers.clear_selection();
    }

    /// Places the selected tower kind; returns the cost paid, or `0` on failure.
    pub fn place_selected_tower(&mut self, position: Vec2, out_events: &mut Vec<Event>) -> u32 {
        match self.towers.selection() {
            Some(TowerSelection::Placement(kind)) => self.place_tower(kind, position, out_events),
            Some(TowerSelection::Upgrade(_)) | None => {
                out_events.push(Event::TowerPlacementRejected {
                    kind: None,
                    position,
                    reason: PlacementError::NothingSelected,
                });
                0
            }
        }
    }

    /// Places a tower at the cell containing `position`; returns the cost paid,
    /// or `0` when the placement was rejected.
    pub fn place_tower(
        &mut self,
        kind: TowerKind,
        position: Vec2,
        out_events: &mut Vec<Event>,
    ) -> u32 {
        let rules = PlacementRules {
            playfield: &self.playfield,
            path_cells: &self.path_cells,
        };
        let stats = self.config.towers.stats(kind);

        match self
            .towers
            .place(kind, position, rules, stats, &mut self.economy)
        {
            Ok(placed) => {
                debug!(
                    tower = placed.tower.get(),
                    ?kind,
                    column = placed.cell.column(),
                    row = placed.cell.row(),
                    "tower placed"
                );
                out_events.push(Event::TowerPlaced {
                    tower: placed.tower,
                    kind,
                    cell: placed.cell,
                    cost: placed.cost,
                });
                placed.cost
            }
            Err(reason) => {
                debug!(?kind, ?reason, "tower placement rejected");
                out_events.push(Event::TowerPlacementRejected {
                    kind: Some(kind),
                    position,
                    reason,
                });
                0
            }
        }
    }

    /// Upgrades the tower selected for upgrade; returns the cost paid, or `0`.
    pub fn upgrade_selected_tower(&mut self, out_events: &mut Vec<Event>) -> u32 {
        match self.towers.selection() {
            Some(TowerSelection::Upgrade(tower)) => self.upgrade_tower(tower, out_events),
            Some(TowerSelection::Placement(_)) | None => 0,
        }
    }

    /// Upgrades a tower in place; returns the cost paid, or `0` when rejected.
    pub fn upgrade_tower(&mut self, tower: TowerId, out_events: &mut Vec<Event>) -> u32 {
        match self
            .towers
            .upgrade(tower, &self.config.upgrade, &mut self.economy)
        {
            Ok((tier, cost)) => {
                debug!(tower = tower.get(), tier, cost, "tower upgraded");
                out_events.push(Event::TowerUpgraded { tower, tier, cost });
                cost
            }
            Err(reason) => {
                if reason == UpgradeError::MissingTower {
                    warn!(tower = tower.get(), "upgrade of missing tower");
                }
                out_events.push(Event::TowerUpgradeRejected { tower, reason });
                0
            }
        }
    }

    /// Sells a tower; returns the refund, or `0` when the tower does not exist.
    pub fn remove_tower(&mut self, tower: TowerId, out_events: &mut Vec<Event>) -> u32 {
        match self.towers.remove(
            tower,
            self.config.economy.sell_refund_percent,
            &mut self.economy,
        ) {
            Ok(refund) => {
                debug!(tower = tower.get(), refund, "tower removed");
                out_events.push(Event::TowerRemoved { tower, refund });
                refund
            }
            Err(reason @ RemovalError::MissingTower) => {
                warn!(tower = tower.get(), "removal of missing tower");
                out_events.push(Event::TowerRemovalRejected { tower, reason });
                0
            }
        }
    }

    /// Doubles the speed of every current and future enemy.
    pub fn double_speed_clicked(&mut self) {
        self.speed_mode = SpeedMode::Double;
        self.enemies.double_speed_clicked();
    }

    /// Restores the base speed of every current and future enemy.
    pub fn normal_speed_clicked(&mut self) {
        self.speed_mode = SpeedMode::Normal;
        self.enemies.normal_speed_clicked();
    }

    /// Switches the speed mode, reporting actual changes.
    pub fn set_speed_mode(&mut self, mode: SpeedMode, out_events: &mut Vec<Event>) {
        if mode == self.speed_mode {
            return;
        }
        match mode {
            SpeedMode::Normal => self.normal_speed_clicked(),
            SpeedMode::Double => self.double_speed_clicked(),
        }
        out_events.push(Event::SpeedModeChanged { mode });
    }

    /// Hands every live entity to the presenter without mutating state.
    pub fn render(&self, presenter: &mut impl Presenter) {
        presenter.draw_overlay(&self.playfield);
        self.towers.render(presenter);
        self.enemies.render(presenter);
        self.projectiles.render(presenter);
    }

    /// Accumulated score.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.economy.score()
    }

    /// Money available to spend.
    #[must_use]
    pub fn money(&self) -> u32 {
        self.economy.money()
    }

    /// Most recently started wave; zero before the first wave.
    #[must_use]
    pub fn current_wave(&self) -> u32 {
        self.current_wave
    }

    /// Number of enemies killed this session.
    #[must_use]
    pub fn enemies_killed(&self) -> u32 {
        self.economy.enemies_killed()
    }

    /// Remaining lives.
    #[must_use]
    pub fn user_health(&self) -> i32 {
        self.economy.lives()
    }

    /// Reports whether the player ran out of lives.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.economy.lives() <= 0
    }

    pub(crate) fn config(&self) -> &GameConfig {
        &self.config
    }

    pub(crate) fn playfield(&self) -> &Playfield {
        &self.playfield
    }

    pub(crate) fn path_cells(&self) -> &BTreeSet<GridCell> {
        &self.path_cells
    }

    pub(crate) fn enemies(&self) -> &EnemyRegistry {
        &self.enemies
    }

    pub(crate) fn towers(&self) -> &TowerRegistry {
        &self.towers
    }

    pub(crate) fn projectiles(&self) -> &ProjectileRegistry {
        &self.projectiles
    }

    pub(crate) fn speed_mode(&self) -> SpeedMode {
        self.speed_mode
    }

    pub(crate) fn next_wave_in(&self) -> Option<Duration> {
        self.spawning.next_wave_in()
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horde_defence_core::{EnemyKind, START_MONEY, SCORE_PER_KILL};

    fn level() -> Level {
        Level::new(GameConfig::default()).expect("default configuration is valid")
    }

    #[test]
    fn starts_at_wave_zero_with_configured_economy() {
        let level = level();
        assert_eq!(level.current_wave(), 0);
        assert_eq!(level.money(), START_MONEY);
        assert_eq!(level.score(), 0);
        assert_eq!(level.enemies_killed(), 0);
        assert!(!level.is_game_over());
    }

    #[test]
    fn invalid_configuration_fails_fast() {
        let mut config = GameConfig::default();
        config.schedule.waves.clear();
        assert_eq!(
            Level::new(config).err(),
            Some(ConfigError::EmptySchedule)
        );
    }

    #[test]
    fn path_cells_start_at_the_spawn_cell() {
        let level = level();
        let start = level.config().path.start_cell(level.playfield());
        assert!(level.path_cells().contains(&start));
        assert_eq!(level.path_cells().len(), level.config().path.route.len() + 1);
    }

    #[test]
    fn enemy_killed_is_exact() {
        let mut level = level();
        level.enemy_killed(13);
        assert_eq!(level.money(), START_MONEY + 13);
        assert_eq!(level.score(), SCORE_PER_KILL);
        assert_eq!(level.enemies_killed(), 1);
    }

    #[test]
    fn wave_commands_outside_a_wave_are_ignored() {
        let mut level = level();
        let mut events = Vec::new();
        level.execute_wave_command(
            Command::SpawnEnemy {
                wave: 3,
                spawn_delay: Duration::from_secs(1),
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert!(level.enemies().is_empty());

        level.execute_wave_command(Command::StartWave { wave: 1 }, &mut events);
        level.execute_wave_command(
            Command::SpawnEnemy {
                wave: 1,
                spawn_delay: Duration::from_secs(1),
            },
            &mut events,
        );
        assert_eq!(level.current_wave(), 1);
        assert_eq!(
            events,
            vec![
                Event::WaveStarted { wave: 1 },
                Event::EnemySpawned {
                    enemy: EnemyId::new(0),
                    kind: EnemyKind::Regular,
                    wave: 1,
                },
            ]
        );
    }

    #[test]
    fn speed_mode_applies_to_future_spawns() {
        let mut level = level();
        let mut events = Vec::new();
        level.set_speed_mode(SpeedMode::Double, &mut events);
        level.set_speed_mode(SpeedMode::Double, &mut events);
        assert_eq!(
            events,
            vec![Event::SpeedModeChanged {
                mode: SpeedMode::Double
            }]
        );

        level.execute_wave_command(Command::StartWave { wave: 1 }, &mut events);
        level.execute_wave_command(
            Command::SpawnEnemy {
                wave: 1,
                spawn_delay: Duration::from_secs(1),
            },
            &mut events,
        );

        let base = level.config().enemies.regular.speed;
        let enemy = level.enemies().iter().next().expect("spawned enemy");
        assert_eq!(enemy.speed(), base * 2.0);

        level.normal_speed_clicked();
        let enemy = level.enemies().iter().next().expect("spawned enemy");
        assert_eq!(enemy.speed(), base);
        assert_eq!(level.speed_mode(), SpeedMode::Normal);
    }
}
