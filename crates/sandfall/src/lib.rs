//! Weighted falling sand simulation engine.

pub mod cell;
pub mod chance;
pub mod config;
pub mod error;
pub mod grid;
pub mod universe;

use cell::{Cell, CellId, Color, Outcome, Position};
use chance::{Chance, RandomChance};
use config::SimConfig;
use error::ConfigError;
use grid::Grid;

pub use universe::Universe;

/// Per-tick probabilities derived from a [`SimConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rules {
    pub chance_move_to_side_per_sec: f64,
    pub chance_replace_per_sec: f64,
    pub chance_replace_per_weight: f64,
    pub tick_scale: f64,
}

impl Rules {
    #[must_use]
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            chance_move_to_side_per_sec: config.chance_move_to_side_per_sec,
            chance_replace_per_sec: config.chance_replace_per_sec,
            chance_replace_per_weight: config.chance_replace_per_weight,
            tick_scale: config.tick_scale(),
        }
    }

    #[must_use]
    pub fn side_chance(&self) -> f64 {
        self.chance_move_to_side_per_sec * self.tick_scale
    }

    #[must_use]
    pub fn replace_chance(&self) -> f64 {
        self.chance_replace_per_sec * self.tick_scale
    }

    /// Chance for a displacement attempt to succeed given the weight advantage.
    #[must_use]
    pub fn replace_chance_for(&self, weight_advantage: u32) -> f64 {
        self.chance_replace_per_weight * f64::from(weight_advantage) * self.tick_scale
    }
}

/// Outcome counts for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub stayed: usize,
    pub fell: usize,
    pub displaced: usize,
    pub slipped: usize,
}

impl TickStats {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Stayed => self.stayed += 1,
            Outcome::Fell => self.fell += 1,
            Outcome::Displaced => self.displaced += 1,
            Outcome::Slipped => self.slipped += 1,
        }
    }

    /// Cells that changed position on their own update.
    #[must_use]
    pub fn moved(&self) -> usize {
        self.fell + self.displaced + self.slipped
    }
}

/// Grid, rules and randomness for one running simulation.
#[derive(Debug)]
pub struct Simulation<C = RandomChance> {
    grid: Grid,
    rules: Rules,
    chance: C,
    ticks: u64,
}

impl Simulation {
    /// Build a simulation with a seeded random source.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] from [`SimConfig::validate`].
    pub fn new(config: &SimConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_chance(config, RandomChance::seeded(seed))
    }
}

impl<C: Chance> Simulation<C> {
    /// # Errors
    ///
    /// Returns the [`ConfigError`] from [`SimConfig::validate`].
    pub fn with_chance(config: &SimConfig, chance: C) -> Result<Self, ConfigError> {
        config.validate()?;
        let rules = Rules::from_config(config);
        tracing::info!(
            width = config.width,
            height = config.height,
            tick_scale = rules.tick_scale,
            "simulation created"
        );
        Ok(Self {
            grid: Grid::new(config.width, config.height),
            rules,
            chance,
            ticks: 0,
        })
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Ticks run so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Read-only view of every live cell, for rendering.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.grid.cells()
    }

    /// Insert a new cell at `pos` if it is inside the grid and free.
    pub fn place(&mut self, pos: Position, weight: u32, color: Color) -> Option<CellId> {
        if weight == 0 || !self.grid.in_bounds(pos) || self.grid.is_occupied(pos) {
            return None;
        }
        Some(self.grid.insert(Cell::new(weight, color), pos))
    }

    /// Fill the square of side `2 * radius + 1` around `center`, clipped to
    /// the grid, skipping taken slots. Returns how many cells landed.
    pub fn place_rect(&mut self, center: Position, radius: usize, weight: u32, color: Color) -> usize {
        let clip = |mid: usize, len: usize| {
            let last = len - 1;
            mid.saturating_sub(radius).min(last)..=mid.saturating_add(radius).min(last)
        };
        let cols = clip(center.col, self.grid.width());
        let rows = clip(center.row, self.grid.height());
        let mut placed = 0;
        for col in cols {
            for row in rows.clone() {
                if self.place(Position::new(col, row), weight, color).is_some() {
                    placed += 1;
                }
            }
        }
        tracing::debug!(%center, radius, placed, "placed rect");
        placed
    }

    /// Advance the simulation by one tick.
    ///
    /// Cells update in insertion order, each seeing the moves already made
    /// earlier in the same tick.
    pub fn tick(&mut self) -> TickStats {
        self.ticks += 1;
        let mut stats = TickStats::default();
        for id in self.grid.ids() {
            stats.record(Cell::update(id, &mut self.grid, &mut self.chance, &self.rules));
        }
        tracing::debug!(
            tick = self.ticks,
            cells = self.grid.len(),
            fell = stats.fell,
            displaced = stats.displaced,
            slipped = stats.slipped,
            "tick"
        );
        stats
    }
}
