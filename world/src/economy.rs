//! Money, score, lives and kill counter of a session.

use horde_defence_core::{EconomyConfig, SCORE_PER_KILL};

use crate::enemies::EnemyLifecycle;

/// Economy and progress counters owned by the level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Economy {
    money: u32,
    score: u32,
    lives: i32,
    enemies_killed: u32,
    start_money: u32,
    starting_lives: i32,
}

impl Economy {
    /// Creates an economy holding the configured starting values.
    #[must_use]
    pub fn new(config: &EconomyConfig) -> Self {
        Self {
            money: config.start_money,
            score: 0,
            lives: config.starting_lives,
            enemies_killed: 0,
            start_money: config.start_money,
            starting_lives: config.starting_lives,
        }
    }

    /// Money available to spend.
    #[must_use]
    pub fn money(&self) -> u32 {
        self.money
    }

    /// Accumulated score.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Remaining lives; zero or below signals game over.
    #[must_use]
    pub fn lives(&self) -> i32 {
        self.lives
    }

    /// Number of enemies killed this session.
    #[must_use]
    pub fn enemies_killed(&self) -> u32 {
        self.enemies_killed
    }

    /// Adds money to the balance.
    pub fn add_money(&mut self, amount: u32) {
        self.money = self.money.saturating_add(amount);
    }

    /// Removes money, clamping the balance at zero; returns the amount removed.
    pub fn remove_money(&mut self, amount: u32) -> u32 {
        let removed = amount.min(self.money);
        self.money -= removed;
        removed
    }

    /// Deducts `cost` when affordable and returns it; returns `0` otherwise
    /// and leaves the balance untouched.
    pub fn try_spend(&mut self, cost: u32) -> u32 {
        if cost > self.money {
            return 0;
        }
        self.money -= cost;
        cost
    }

    /// Reinitialises every counter to its start-of-game value.
    pub fn restart(&mut self) {
        self.money = self.start_money;
        self.score = 0;
        self.lives = self.starting_lives;
        self.enemies_killed = 0;
    }
}

impl EnemyLifecycle for Economy {
    fn enemy_killed(&mut self, reward: u32) {
        self.add_money(reward);
        self.score = self.score.saturating_add(SCORE_PER_KILL);
        self.enemies_killed = self.enemies_killed.saturating_add(1);
    }

    fn enemy_completed_path(&mut self) {
        self.lives = self.lives.saturating_sub(1);
    }
}
