//! Occupancy index and cell arena.

use crate::cell::{Cell, CellId, Position};
use crate::error::{GridError, Result};

/// 2D grid of cells.
///
/// Cells live in an arena addressed by [`CellId`]; `index` maps each
/// position to the handle of its occupant. Both are only ever changed
/// together, so every arena cell is indexed at its own position and every
/// index entry points at a cell standing there.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    index: Vec<Option<CellId>>,
}

impl Grid {
    /// # Panics
    ///
    /// Panics if `width * height` overflows. [`SimConfig::validate`]
    /// rejects such sizes up front.
    ///
    /// [`SimConfig::validate`]: crate::config::SimConfig::validate
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        let Some(area) = width.checked_mul(height) else {
            panic!("a {width}x{height} grid overflows usize");
        };
        Self {
            width,
            height,
            cells: Vec::new(),
            index: vec![None; area],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of live cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[must_use]
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.col < self.width && pos.row < self.height
    }

    fn slot(&self, pos: Position) -> Result<usize> {
        if self.in_bounds(pos) {
            Ok(pos.row * self.width + pos.col)
        } else {
            Err(GridError::OutOfBounds {
                pos,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if `pos` is outside the grid.
    pub fn try_is_occupied(&self, pos: Position) -> Result<bool> {
        let slot = self.slot(pos)?;
        Ok(self.index[slot].is_some())
    }

    /// # Panics
    ///
    /// Panics if `pos` is outside the grid.
    #[must_use]
    #[track_caller]
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.try_is_occupied(pos).unwrap_or_else(|err| violated(err))
    }

    /// Handle of the cell at `pos`, if any.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is outside the grid.
    #[must_use]
    #[track_caller]
    pub fn id_at(&self, pos: Position) -> Option<CellId> {
        match self.slot(pos) {
            Ok(slot) => self.index[slot],
            Err(err) => violated(err),
        }
    }

    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] or [`GridError::NotFound`].
    pub fn try_get(&self, pos: Position) -> Result<&Cell> {
        let slot = self.slot(pos)?;
        self.index[slot]
            .map(|id| &self.cells[id.0])
            .ok_or(GridError::NotFound(pos))
    }

    /// # Panics
    ///
    /// Panics if `pos` is outside the grid or empty.
    #[must_use]
    #[track_caller]
    pub fn get(&self, pos: Position) -> &Cell {
        self.try_get(pos).unwrap_or_else(|err| violated(err))
    }

    /// Cell behind a handle handed out by this grid.
    #[must_use]
    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id.0]
    }

    /// # Errors
    ///
    /// Returns [`GridError::ZeroWeight`], [`GridError::OutOfBounds`] or
    /// [`GridError::Occupied`]; the grid is left untouched.
    pub fn try_insert(&mut self, mut cell: Cell, pos: Position) -> Result<CellId> {
        if cell.weight() == 0 {
            return Err(GridError::ZeroWeight);
        }
        let slot = self.slot(pos)?;
        if self.index[slot].is_some() {
            return Err(GridError::Occupied(pos));
        }
        let id = CellId(self.cells.len());
        cell.set_position(pos);
        self.cells.push(cell);
        self.index[slot] = Some(id);
        Ok(id)
    }

    /// Add `cell` at `pos`. The cell's stored position is overwritten.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is outside the grid or occupied, or the weight is zero.
    #[track_caller]
    pub fn insert(&mut self, cell: Cell, pos: Position) -> CellId {
        self.try_insert(cell, pos).unwrap_or_else(|err| violated(err))
    }

    /// Move cell `id` from `from` to `to`.
    ///
    /// With `allow_overwrite` the occupant of `to` loses its index entry and
    /// must be re-placed by the caller before anything else reads the grid;
    /// only [`Grid::swap`] does that.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`], [`GridError::Misplaced`] if `id`
    /// is not indexed at `from`, or [`GridError::Occupied`].
    pub fn try_apply_move(
        &mut self,
        id: CellId,
        from: Position,
        to: Position,
        allow_overwrite: bool,
    ) -> Result<()> {
        let from_slot = self.slot(from)?;
        let to_slot = self.slot(to)?;
        if self.index[from_slot] != Some(id) {
            return Err(GridError::Misplaced { id: id.0, pos: from });
        }
        if !allow_overwrite && self.index[to_slot].is_some() {
            return Err(GridError::Occupied(to));
        }
        self.index[from_slot] = None;
        self.index[to_slot] = Some(id);
        self.cells[id.0].set_position(to);
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if either position is outside the grid, `id` is not at `from`,
    /// or `to` is occupied while `allow_overwrite` is false.
    #[track_caller]
    pub fn apply_move(&mut self, id: CellId, from: Position, to: Position, allow_overwrite: bool) {
        self.try_apply_move(id, from, to, allow_overwrite)
            .unwrap_or_else(|err| violated(err));
    }

    /// Exchange the positions of two cells.
    ///
    /// # Panics
    ///
    /// Panics if either handle is not indexed at its stored position.
    #[track_caller]
    pub fn swap(&mut self, a: CellId, b: CellId) {
        let pos_a = self.cells[a.0].position();
        let pos_b = self.cells[b.0].position();
        if self.id_at(pos_b) != Some(b) {
            violated(GridError::Misplaced { id: b.0, pos: pos_b });
        }
        self.apply_move(a, pos_a, pos_b, true);
        // `a`'s old slot is empty now and `b` is unindexed until this line.
        let slot_a = self.slot(pos_a).unwrap_or_else(|err| violated(err));
        self.index[slot_a] = Some(b);
        self.cells[b.0].set_position(pos_a);
    }

    /// Live cells in processing order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.iter()
    }

    /// Handles of live cells in processing order.
    pub fn ids(&self) -> impl Iterator<Item = CellId> {
        (0..self.cells.len()).map(CellId)
    }
}

#[cold]
#[track_caller]
fn violated(err: GridError) -> ! {
    tracing::error!(%err, "grid precondition violated");
    panic!("{err}")
}

#[cfg(test)]
pub(crate) fn assert_consistent(grid: &Grid) {
    for id in grid.ids() {
        let cell = grid.cell(id);
        assert!(grid.in_bounds(cell.position()), "{id:?} out of bounds");
        assert_eq!(grid.id_at(cell.position()), Some(id), "{id:?} not indexed");
    }
    let indexed = grid.index.iter().filter(|slot| slot.is_some()).count();
    assert_eq!(indexed, grid.len(), "index holds stale entries");
}
