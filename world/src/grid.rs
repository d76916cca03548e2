//! Sparse cell storage backing the cave.

use std::collections::BTreeMap;

use wumpus_core::{Bounds, CellFlags, Coord};

/// Sparse map from coordinate to cell flags plus an ever-growing bounding box.
///
/// A coordinate that was never written reads back as [`CellFlags::CLEAR`].
/// Writing `CLEAR` keeps the coordinate stored, so the stored set only grows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GridStore {
    cells: BTreeMap<Coord, CellFlags>,
    bounds: Option<Bounds>,
}

impl GridStore {
    /// Creates an empty grid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flags stored for the cell, or `CLEAR` when absent.
    #[must_use]
    pub fn get(&self, cell: Coord) -> CellFlags {
        self.cells.get(&cell).copied().unwrap_or(CellFlags::CLEAR)
    }

    /// Overwrites the full mask of the cell and grows the bounds to cover it.
    pub fn set(&mut self, cell: Coord, flags: CellFlags) {
        match self.bounds.as_mut() {
            Some(bounds) => bounds.include(cell),
            None => self.bounds = Some(Bounds::around(cell)),
        }
        let _ = self.cells.insert(cell, flags);
    }

    /// Merges flags into the cell. An absent cell is grounded first.
    pub fn add_flags(&mut self, cell: Coord, flags: CellFlags) {
        let base = self.cells.get(&cell).copied().unwrap_or(CellFlags::GROUND);
        self.set(cell, base | flags);
    }

    /// Clears flags from a stored cell.
    ///
    /// Removing `GROUND` or `CLEAR` wipes the cell entirely instead of clearing
    /// single bits. Absent cells are left untouched.
    pub fn remove_flags(&mut self, cell: Coord, flags: CellFlags) {
        let Some(current) = self.cells.get(&cell).copied() else {
            return;
        };
        if flags == CellFlags::GROUND || flags == CellFlags::CLEAR {
            self.set(cell, CellFlags::CLEAR);
        } else {
            self.set(cell, current.difference(flags));
        }
    }

    /// Reports whether every bit of `flags` is set in the cell.
    ///
    /// Querying `CLEAR`, or any query against a clear cell, is always false.
    #[must_use]
    pub fn contains(&self, cell: Coord, flags: CellFlags) -> bool {
        if flags == CellFlags::CLEAR {
            return false;
        }
        let current = self.get(cell);
        current != CellFlags::CLEAR && current.contains(flags)
    }

    /// Reports whether the coordinate was ever written.
    #[must_use]
    pub fn is_stored(&self, cell: Coord) -> bool {
        self.cells.contains_key(&cell)
    }

    /// Smallest rectangle covering every coordinate ever written.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Stored cells in ascending coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, CellFlags)> + '_ {
        self.cells.iter().map(|(cell, flags)| (*cell, *flags))
    }

    /// Number of stored coordinates, clear ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether nothing was ever written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub(crate) fn cells_with(&self, flags: CellFlags) -> Vec<Coord> {
        self.iter()
            .filter(|(cell, _)| self.contains(*cell, flags))
            .map(|(cell, _)| cell)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_cells_read_as_clear() {
        let grid = GridStore::new();
        assert_eq!(grid.get(Coord::new(4, -2)), CellFlags::CLEAR);
        assert!(grid.bounds().is_none());
        assert!(grid.is_empty());
    }

    #[test]
    fn set_overwrites_and_grows_bounds_even_when_clear() {
        let mut grid = GridStore::new();
        grid.set(Coord::new(1, 1), CellFlags::GROUND | CellFlags::PIT);
        grid.set(Coord::new(1, 1), CellFlags::WALL);
        grid.set(Coord::new(-2, 5), CellFlags::CLEAR);

        assert_eq!(grid.get(Coord::new(1, 1)), CellFlags::WALL);
        assert!(grid.is_stored(Coord::new(-2, 5)));
        let bounds = grid.bounds().expect("bounds after writes");
        assert_eq!(
            (bounds.x(), bounds.y(), bounds.width(), bounds.height()),
            (-2, 1, 4, 5)
        );
    }

    #[test]
    fn bounds_never_shrink() {
        let mut grid = GridStore::new();
        grid.set(Coord::new(0, 0), CellFlags::GROUND);
        grid.set(Coord::new(5, 5), CellFlags::GROUND);
        grid.remove_flags(Coord::new(5, 5), CellFlags::GROUND);
        let bounds = grid.bounds().expect("bounds after writes");
        assert!(bounds.contains(Coord::new(5, 5)));
    }

    #[test]
    fn add_flags_grounds_absent_cells() {
        let mut grid = GridStore::new();
        grid.add_flags(Coord::new(0, 0), CellFlags::PIT);
        assert_eq!(grid.get(Coord::new(0, 0)), CellFlags::GROUND | CellFlags::PIT);

        grid.set(Coord::new(1, 0), CellFlags::WALL);
        grid.add_flags(Coord::new(1, 0), CellFlags::BREEZE);
        assert_eq!(grid.get(Coord::new(1, 0)), CellFlags::WALL | CellFlags::BREEZE);
    }

    #[test]
    fn removing_ground_wipes_the_cell() {
        let mut grid = GridStore::new();
        let cell = Coord::new(2, 3);
        grid.set(cell, CellFlags::GROUND | CellFlags::GOLD | CellFlags::START);

        grid.remove_flags(cell, CellFlags::GOLD);
        assert_eq!(grid.get(cell), CellFlags::GROUND | CellFlags::START);

        grid.remove_flags(cell, CellFlags::GROUND);
        assert_eq!(grid.get(cell), CellFlags::CLEAR);
        assert!(grid.is_stored(cell));
    }

    #[test]
    fn removing_clear_wipes_the_cell_but_mixed_masks_clear_bits() {
        let mut grid = GridStore::new();
        let cell = Coord::new(1, 4);

        grid.set(cell, CellFlags::GROUND | CellFlags::PIT | CellFlags::BREEZE);
        grid.remove_flags(cell, CellFlags::GROUND | CellFlags::PIT);
        assert_eq!(grid.get(cell), CellFlags::BREEZE);

        grid.set(cell, CellFlags::GROUND | CellFlags::WALL);
        grid.remove_flags(cell, CellFlags::CLEAR);
        assert_eq!(grid.get(cell), CellFlags::CLEAR);
        assert!(grid.is_stored(cell));
    }

    #[test]
    fn writes_at_the_coordinate_extremes_grow_bounds() {
        let mut grid = GridStore::new();
        grid.set(Coord::new(i32::MIN, 5), CellFlags::GROUND | CellFlags::PIT);
        grid.set(Coord::new(i32::MAX, -3), CellFlags::GROUND);

        let bounds = grid.bounds().expect("bounds after writes");
        assert_eq!((bounds.x(), bounds.y()), (i32::MIN, -3));
        assert_eq!((bounds.width(), bounds.height()), (1_i64 << 32, 9));
        assert!(bounds.contains(Coord::new(0, 0)));
    }

    #[test]
    fn removing_from_absent_cell_is_a_no_op() {
        let mut grid = GridStore::new();
        grid.remove_flags(Coord::new(9, 9), CellFlags::PIT);
        assert!(!grid.is_stored(Coord::new(9, 9)));
        assert!(grid.bounds().is_none());
    }

    #[test]
    fn contains_requires_every_bit() {
        let mut grid = GridStore::new();
        let cell = Coord::new(0, 0);
        grid.set(cell, CellFlags::GROUND | CellFlags::PIT);

        assert!(grid.contains(cell, CellFlags::PIT));
        assert!(grid.contains(cell, CellFlags::GROUND | CellFlags::PIT));
        assert!(!grid.contains(cell, CellFlags::PIT | CellFlags::WALL));
        assert!(!grid.contains(cell, CellFlags::CLEAR));
        assert!(!grid.contains(Coord::new(1, 1), CellFlags::PIT));
    }

    #[test]
    fn ungrounded_flags_are_still_tracked() {
        let mut grid = GridStore::new();
        let cell = Coord::new(3, 3);
        grid.set(cell, CellFlags::PIT);
        assert!(grid.contains(cell, CellFlags::PIT));
        assert!(!grid.contains(cell, CellFlags::GROUND));
        assert_eq!(grid.cells_with(CellFlags::PIT), vec![cell]);
    }
}
