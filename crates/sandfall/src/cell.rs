//! Cell entity and its per-tick update.

use std::fmt;

use crate::chance::Chance;
use crate::grid::Grid;
use crate::Rules;

/// Grid coordinates. Row grows downward.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Position {
    pub col: usize,
    pub row: usize,
}

impl Position {
    #[must_use]
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Packed `0xRRGGBBAA` render color. The simulation never reads it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Color(pub u32);

/// Stable handle of a cell inside a [`Grid`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct CellId(pub(crate) usize);

impl CellId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a single update did.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Outcome {
    Stayed,
    Fell,
    /// Traded places with the lighter cell below.
    Displaced,
    /// Moved diagonally down to a free side.
    Slipped,
}

impl Outcome {
    #[must_use]
    pub fn moved(self) -> bool {
        self != Self::Stayed
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Cell {
    position: Position,
    weight: u32,
    color: Color,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}@{}", self.weight, self.position)
    }
}

impl Cell {
    /// An unplaced cell. Its position is assigned by [`Grid::insert`].
    #[must_use]
    pub fn new(weight: u32, color: Color) -> Self {
        Self {
            position: Position::default(),
            weight,
            color,
        }
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub fn weight(&self) -> u32 {
        self.weight
    }

    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Run one tick for cell `id`: fall, displace a lighter cell below, or
    /// slip to a free side.
    ///
    /// Commits at most one position change (a displacement moves both cells).
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to `grid`.
    pub fn update(id: CellId, grid: &mut Grid, chance: &mut impl Chance, rules: &Rules) -> Outcome {
        let me = *grid.cell(id);
        let position = me.position;

        // Every rule below assumes a fall of exactly one row.
        let candidate = Position::new(
            position.col.min(grid.width() - 1),
            (position.row + 1).min(grid.height() - 1),
        );
        if candidate == position {
            return Outcome::Stayed;
        }

        let Some(other_id) = grid.id_at(candidate) else {
            grid.apply_move(id, position, candidate, false);
            return Outcome::Fell;
        };
        let other = *grid.cell(other_id);

        if chance.coin_flip(rules.replace_chance()) && other.weight < me.weight {
            // The first roll granted an attempt; the outcome is final either way.
            if chance.coin_flip(rules.replace_chance_for(me.weight - other.weight)) {
                grid.swap(id, other_id);
                tracing::trace!(%id, from = %position, below = %other_id, "displaced lighter cell");
                return Outcome::Displaced;
            }
            return Outcome::Stayed;
        }

        if !chance.coin_flip(rules.side_chance()) {
            return Outcome::Stayed;
        }

        let free = |col: Option<usize>| {
            col.map(|col| Position::new(col, candidate.row))
                .filter(|&side| grid.in_bounds(side) && !grid.is_occupied(side))
        };
        let left = free(candidate.col.checked_sub(1));
        let right = free(candidate.col.checked_add(1));

        let target = match (left, right) {
            (None, None) => return Outcome::Stayed,
            (Some(left), Some(right)) => {
                if chance.coin_flip(0.5) {
                    left
                } else {
                    right
                }
            }
            (Some(side), None) | (None, Some(side)) => side,
        };

        grid.apply_move(id, position, target, false);
        tracing::trace!(%id, from = %position, to = %target, "slipped");
        Outcome::Slipped
    }
}
