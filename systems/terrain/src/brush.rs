use canopy_core::{CellCoord, TileGrid, SOLID};

/// Places and queries single tiles, optionally mirrored onto the right side of the level.
///
/// Mirroring maps column `c` to `grid_width - c - 2`, not `grid_width - c - 1`.
/// The right wall is one column thicker than the left one, so a subunit built
/// against the left wall lands against the right wall with the same gap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Brush {
    grid_width: u32,
}

impl Brush {
    /// Creates a brush for grids of the provided width.
    #[must_use]
    pub const fn new(grid_width: u32) -> Self {
        Self { grid_width }
    }

    /// Column actually touched for `column` under the flip setting.
    #[must_use]
    pub const fn column(&self, column: u32, flip: bool) -> u32 {
        if flip {
            self.grid_width - column - 2
        } else {
            column
        }
    }

    /// Writes [`SOLID`] at `(column, row)`, mirrored when `flip` is set.
    pub fn place(&self, grid: &mut TileGrid, row: u32, column: u32, flip: bool) {
        grid.set(CellCoord::new(self.column(column, flip), row), SOLID);
    }

    /// Returns `true` when `(column, row)`, mirrored when `flip` is set, holds [`SOLID`].
    #[must_use]
    pub fn query(&self, grid: &TileGrid, row: u32, column: u32, flip: bool) -> bool {
        grid.is_solid(CellCoord::new(self.column(column, flip), row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::EMPTY;

    #[test]
    fn flip_mirrors_with_two_column_offset() {
        let brush = Brush::new(19);
        for column in 0..=17 {
            assert_eq!(brush.column(column, false), column);
            assert_eq!(brush.column(column, true), 17 - column);
        }
    }

    #[test]
    fn place_and_query_share_the_mapping() {
        let brush = Brush::new(19);
        let mut grid = TileGrid::new(19, 4, EMPTY);

        brush.place(&mut grid, 2, 3, false);
        brush.place(&mut grid, 2, 3, true);

        assert!(grid.is_solid(CellCoord::new(3, 2)));
        assert!(grid.is_solid(CellCoord::new(14, 2)));
        assert!(brush.query(&grid, 2, 3, true));
        assert!(!brush.query(&grid, 2, 4, true));
        assert_eq!(grid.iter().filter(|(_, v)| *v == SOLID).count(), 2);
    }
}
