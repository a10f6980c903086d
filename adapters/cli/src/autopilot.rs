use std::collections::BTreeSet;

use horde_defence_core::{Command, GridCell, TowerKind};
use horde_defence_world::{query, Level};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Cells at most this many columns or rows away from the path are build sites.
const BUILD_REACH: i32 = 2;
/// Probability of spending on an upgrade instead of a new tower.
const UPGRADE_BIAS: f64 = 0.35;

/// Seeded player stand-in that spends money on towers and upgrades.
#[derive(Debug)]
pub(crate) struct Autopilot {
    rng: ChaCha8Rng,
    sites: Vec<GridCell>,
}

impl Autopilot {
    /// Creates an autopilot whose decisions are fully determined by `seed`.
    pub(crate) fn new(seed: u64, level: &Level) -> Self {
        let playfield = query::playfield(level);
        let path = query::path_cells(level);
        let mut sites = BTreeSet::new();
        for cell in path {
            for column in -BUILD_REACH..=BUILD_REACH {
                for row in -BUILD_REACH..=BUILD_REACH {
                    let site = GridCell::new(cell.column() + column, cell.row() + row);
                    if playfield.contains_cell(site) && !path.contains(&site) {
                        let _ = sites.insert(site);
                    }
                }
            }
        }

        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            sites: sites.into_iter().collect(),
        }
    }

    /// Emits the commands of at most one purchase the level can afford.
    pub(crate) fn plan(&mut self, level: &Level, out: &mut Vec<Command>) {
        let money = level.money();
        let config = query::config(level);
        let towers = query::tower_view(level).into_vec();

        if !towers.is_empty() && self.rng.gen_bool(UPGRADE_BIAS) {
            let tower = towers[self.rng.gen_range(0..towers.len())];
            let stats = config.towers.stats(tower.kind);
            if tower.tier < stats.max_tier && stats.upgrade_cost_at(tower.tier) <= money {
                out.push(Command::SelectTowerForUpgrade { tower: tower.id });
                out.push(Command::UpgradeTower { tower: tower.id });
                return;
            }
        }

        let kind = TowerKind::ALL[self.rng.gen_range(0..TowerKind::ALL.len())];
        if config.towers.stats(kind).cost > money {
            return;
        }

        let occupied: BTreeSet<_> = towers.iter().map(|tower| tower.cell).collect();
        let free: Vec<_> = self
            .sites
            .iter()
            .filter(|site| !occupied.contains(site))
            .collect();
        if free.is_empty() {
            return;
        }

        let site = *free[self.rng.gen_range(0..free.len())];
        out.push(Command::SelectTower { kind });
        out.push(Command::PlaceSelectedTower {
            position: query::playfield(level).cell_center(site),
        });
    }
}
