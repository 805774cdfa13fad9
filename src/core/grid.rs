//! Fixed-size cell grid.
//!
//! Row-major storage; dimensions never change for the lifetime of a session.

use super::types::{Cell, Position};
use crate::error::{Error, Result};

/// 2D cell store
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid with every cell `Unvisited`
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Unvisited; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Is the position inside the grid?
    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        pos.col < self.width && pos.row < self.height
    }

    #[inline]
    fn index(&self, pos: Position) -> Option<usize> {
        self.contains(pos).then(|| pos.row * self.width + pos.col)
    }

    /// Cell at position, `None` outside the grid
    #[inline]
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Overwrite a cell
    pub fn set(&mut self, pos: Position, cell: Cell) -> Result<()> {
        let i = self.index(pos).ok_or(Error::OutOfBounds {
            col: pos.col,
            row: pos.row,
        })?;
        self.cells[i] = cell;
        Ok(())
    }

    /// Reset every cell to `Unvisited`
    pub fn clear(&mut self) {
        self.cells.fill(Cell::Unvisited);
    }

    /// Iterate rows top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1))
    }

    /// Number of cells in the given state
    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == cell).count()
    }
}
