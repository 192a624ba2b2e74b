use crate::CellCoord;

/// Grid value for an empty solid or one-way cell.
pub const EMPTY: i32 = 0;
/// Grid value for an occupied solid or one-way cell.
pub const SOLID: i32 = 1;
/// Enemy grid value for cells without a recorded spawn.
pub const NO_ENEMY: i32 = -1;

/// Identifies one of the three grids produced by a generation pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GridKind {
    /// Walls and terrain.
    Solid,
    /// Jump-through platforms.
    Oneway,
    /// Enemy spawn records keyed by prototype index.
    Enemy,
}

impl GridKind {
    /// Every grid kind.
    pub const ALL: [GridKind; 3] = [GridKind::Solid, GridKind::Oneway, GridKind::Enemy];

    /// Value every cell holds right after a reset.
    #[must_use]
    pub const fn default_value(self) -> i32 {
        match self {
            Self::Solid | Self::Oneway => EMPTY,
            Self::Enemy => NO_ENEMY,
        }
    }
}

/// Fixed-size two dimensional array of integers indexed by column and row.
///
/// Indexing outside of the grid is a bug in the caller's cursor arithmetic:
/// debug builds assert, release builds panic on the slice access.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    cells: Vec<i32>,
}

impl TileGrid {
    /// Allocates a grid with every cell set to `fill`.
    #[must_use]
    pub fn new(width: u32, height: u32, fill: i32) -> Self {
        let capacity = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        Self {
            width,
            height,
            cells: vec![fill; capacity],
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` when the grid has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns `true` when the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.height
    }

    /// Reads the value stored at the cell.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> i32 {
        self.cells[self.index(cell)]
    }

    /// Stores `value` at the cell.
    pub fn set(&mut self, cell: CellCoord, value: i32) {
        let index = self.index(cell);
        self.cells[index] = value;
    }

    /// Returns `true` when the cell holds [`SOLID`].
    #[must_use]
    pub fn is_solid(&self, cell: CellCoord) -> bool {
        self.get(cell) == SOLID
    }

    /// Overwrites every cell with `fill`.
    pub fn reset(&mut self, fill: i32) {
        self.cells.fill(fill);
    }

    /// Cell addressed by a linear index, column fastest-varying.
    #[must_use]
    pub fn cell_at(&self, index: usize) -> CellCoord {
        debug_assert!(index < self.cells.len(), "linear index {index} out of range");
        let width = self.width as usize;
        CellCoord::new((index % width) as u32, (index / width) as u32)
    }

    /// Iterates all cells and their values, column fastest-varying.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, i32)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(index, value)| (self.cell_at(index), *value))
    }

    fn index(&self, cell: CellCoord) -> usize {
        debug_assert!(
            self.contains(cell),
            "cell {cell:?} outside {}x{} grid",
            self.width,
            self.height
        );
        cell.row() as usize * self.width as usize + cell.column() as usize
    }
}

/// The three grids written by a single generation pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelGrids {
    solid: TileGrid,
    oneway: TileGrid,
    enemy: TileGrid,
}

impl LevelGrids {
    /// Allocates fresh grids of the provided dimensions, each at its default value.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            solid: TileGrid::new(width, height, GridKind::Solid.default_value()),
            oneway: TileGrid::new(width, height, GridKind::Oneway.default_value()),
            enemy: TileGrid::new(width, height, GridKind::Enemy.default_value()),
        }
    }

    /// Number of columns shared by all grids.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.solid.width()
    }

    /// Number of rows shared by all grids.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.solid.height()
    }

    /// Read access to a grid.
    #[must_use]
    pub fn grid(&self, kind: GridKind) -> &TileGrid {
        match kind {
            GridKind::Solid => &self.solid,
            GridKind::Oneway => &self.oneway,
            GridKind::Enemy => &self.enemy,
        }
    }

    /// Write access to a grid.
    pub fn grid_mut(&mut self, kind: GridKind) -> &mut TileGrid {
        match kind {
            GridKind::Solid => &mut self.solid,
            GridKind::Oneway => &mut self.oneway,
            GridKind::Enemy => &mut self.enemy,
        }
    }

    /// Returns every grid to its default value.
    pub fn reset(&mut self) {
        for kind in GridKind::ALL {
            self.grid_mut(kind).reset(kind.default_value());
        }
    }

    /// Splits the grids into the solid and one-way grids for subunits that write both.
    pub fn terrain_mut(&mut self) -> (&mut TileGrid, &mut TileGrid) {
        (&mut self.solid, &mut self.oneway)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grids_start_at_their_defaults() {
        let grids = LevelGrids::new(5, 4);
        assert!(grids.grid(GridKind::Solid).iter().all(|(_, v)| v == EMPTY));
        assert!(grids.grid(GridKind::Oneway).iter().all(|(_, v)| v == EMPTY));
        assert!(grids
            .grid(GridKind::Enemy)
            .iter()
            .all(|(_, v)| v == NO_ENEMY));
    }

    #[test]
    fn reset_restores_per_grid_defaults() {
        let mut grids = LevelGrids::new(3, 3);
        grids.grid_mut(GridKind::Solid).set(CellCoord::new(1, 1), SOLID);
        grids.grid_mut(GridKind::Enemy).set(CellCoord::new(2, 0), 4);
        grids.reset();
        assert_eq!(grids, LevelGrids::new(3, 3));
    }

    #[test]
    fn set_then_get_addresses_the_same_cell() {
        let mut grid = TileGrid::new(19, 10, EMPTY);
        grid.set(CellCoord::new(18, 9), SOLID);
        assert!(grid.is_solid(CellCoord::new(18, 9)));
        assert!(!grid.is_solid(CellCoord::new(9, 8)));
        assert_eq!(grid.iter().filter(|(_, v)| *v == SOLID).count(), 1);
    }

    #[test]
    fn iteration_is_column_fastest() {
        let grid = TileGrid::new(3, 2, EMPTY);
        let cells: Vec<_> = grid.iter().map(|(cell, _)| cell).collect();
        assert_eq!(cells[0], CellCoord::new(0, 0));
        assert_eq!(cells[1], CellCoord::new(1, 0));
        assert_eq!(cells[3], CellCoord::new(0, 1));
        assert_eq!(grid.cell_at(5), CellCoord::new(2, 1));
    }

    #[test]
    fn reset_fills_every_cell() {
        let mut grid = TileGrid::new(4, 4, EMPTY);
        grid.set(CellCoord::new(1, 1), SOLID);
        grid.reset(NO_ENEMY);
        assert!(grid.iter().all(|(_, v)| v == NO_ENEMY));
    }

    #[test]
    #[should_panic]
    fn out_of_range_access_panics() {
        let grid = TileGrid::new(4, 4, EMPTY);
        let _ = grid.get(CellCoord::new(0, 4));
    }
}
