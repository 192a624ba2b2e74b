use canopy_core::{random, BranchTuning, CellCoord, GridKind, LevelGrids, TileGrid, SOLID};
use rand::Rng;

use crate::Brush;

/// Side length of a hanging block.
pub const HANGING_BLOCK_SIZE: u32 = 3;

const PLATFORM_MIN_WIDTH: u32 = 3;
const PLATFORM_MAX_WIDTH: u32 = 5;
const PLATFORM_MAX_INSET: u32 = 4;
const PLATFORM_MIN_SPACING: u32 = 3;
const PLATFORM_MAX_SPACING: u32 = 4;
// floor(uniform(1.0, 2.3)) yields a second platform about a quarter of the time.
const PLATFORM_COUNT_RANGE: (f32, f32) = (1.0, 2.3);
const REACHING_MIN_WIDTH: u32 = 2;
const REACHING_MAX_WIDTH: u32 = 5;

/// Strategies that fill one side of a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubunitKind {
    /// One or two stacked one-way platforms.
    RowMultiple,
    /// Energy-budgeted protrusion growing out of the wall.
    SmallBranch,
    /// Hanging solid block paired with a one-way ledge.
    ReachingBlock,
}

impl SubunitKind {
    /// Every subunit, in candidate order.
    pub const ALL: [SubunitKind; 3] = [
        SubunitKind::RowMultiple,
        SubunitKind::SmallBranch,
        SubunitKind::ReachingBlock,
    ];
}

/// Builds subunits against the left wall, or mirrored against the right wall.
#[derive(Clone, Debug)]
pub struct SubunitBuilder {
    brush: Brush,
    wall_width: u32,
    branch: BranchTuning,
}

impl SubunitBuilder {
    /// Creates a builder for a grid of `grid_width` columns with walls `wall_width` thick.
    #[must_use]
    pub fn new(grid_width: u32, wall_width: u32, branch: BranchTuning) -> Self {
        Self {
            brush: Brush::new(grid_width),
            wall_width,
            branch,
        }
    }

    /// Brush used for every placement.
    #[must_use]
    pub const fn brush(&self) -> Brush {
        self.brush
    }

    /// Applies `kind` with its base at `row`.
    pub fn apply<R: Rng + ?Sized>(
        &self,
        kind: SubunitKind,
        grids: &mut LevelGrids,
        row: u32,
        flip: bool,
        rng: &mut R,
    ) {
        match kind {
            SubunitKind::RowMultiple => {
                self.row_multiple(grids.grid_mut(GridKind::Oneway), row, flip, rng)
            }
            SubunitKind::SmallBranch => {
                let _ = self.small_branch(grids.grid_mut(GridKind::Solid), row, flip, rng);
            }
            SubunitKind::ReachingBlock => {
                let (solid, oneway) = grids.terrain_mut();
                self.reaching_block(solid, oneway, row, flip, rng);
            }
        }
    }

    /// Places a contiguous run of `width` tiles starting at `column`.
    pub fn row(&self, grid: &mut TileGrid, row: u32, column: u32, flip: bool, width: u32) {
        for offset in 0..width {
            self.brush.place(grid, row, column + offset, flip);
        }
    }

    /// Stacks one or two short platforms starting at `row`.
    pub fn row_multiple<R: Rng + ?Sized>(
        &self,
        grid: &mut TileGrid,
        row: u32,
        flip: bool,
        rng: &mut R,
    ) {
        let (low, high) = PLATFORM_COUNT_RANGE;
        let count = random::uniform_f32(rng, low, high).floor() as u32;
        let mut row = row;
        for _ in 0..count {
            let column = self.wall_width + random::uniform_inclusive(rng, 0, PLATFORM_MAX_INSET);
            let width = random::uniform_inclusive(rng, PLATFORM_MIN_WIDTH, PLATFORM_MAX_WIDTH);
            self.row(grid, row, column, flip, width);
            row += random::uniform_inclusive(rng, PLATFORM_MIN_SPACING, PLATFORM_MAX_SPACING);
        }
    }

    /// Fills a 3x3 block spanning rows `row..row + 3`.
    ///
    /// The two rows after `row` are filled completely; each cell of `row`
    /// itself is placed on a coin flip, which gives the block its ragged edge.
    pub fn hanging_block<R: Rng + ?Sized>(
        &self,
        grid: &mut TileGrid,
        row: u32,
        column: u32,
        flip: bool,
        rng: &mut R,
    ) {
        for block_row in row..row + HANGING_BLOCK_SIZE {
            for block_column in column..column + HANGING_BLOCK_SIZE {
                if block_row != row || random::chance(rng, 0.5) {
                    self.brush.place(grid, block_row, block_column, flip);
                }
            }
        }
    }

    /// Grows a branch out of the wall at `row` until its energy runs out.
    ///
    /// Thick branches are back-filled towards the wall after every tile. The
    /// wall must already be present in `grid`, it is what stops the back-fill.
    /// Returns the number of tiles the branch head placed.
    pub fn small_branch<R: Rng + ?Sized>(
        &self,
        grid: &mut TileGrid,
        row: u32,
        flip: bool,
        rng: &mut R,
    ) -> u32 {
        let mut energy = self.branch.energy;
        let mut row = row;
        let mut column = self.wall_width;
        let thick = random::chance(rng, self.branch.thick_probability);
        let mut placements = 0;

        while energy > 0.0 {
            self.brush.place(grid, row, column, flip);
            placements += 1;

            if thick {
                let mut back = column - 1;
                while !self.brush.query(grid, row, back, flip) {
                    self.brush.place(grid, row, back, flip);
                    back -= 1;
                }
            }

            if random::chance(rng, self.branch.build_direction_weight) {
                column += 1;
            } else {
                row += 1;
            }
            energy -= random::uniform_f32(
                rng,
                self.branch.min_energy_step,
                self.branch.max_energy_step,
            );
        }

        placements
    }

    /// Hangs a block off the wall with a one-way ledge at the block's top row.
    ///
    /// A coin flip decides whether the ledge sits against the wall with the
    /// block beyond it, or the block sits against the wall with the ledge beyond it.
    pub fn reaching_block<R: Rng + ?Sized>(
        &self,
        solid: &mut TileGrid,
        oneway: &mut TileGrid,
        row: u32,
        flip: bool,
        rng: &mut R,
    ) {
        let ledge_first = random::chance(rng, 0.5);
        let width = random::uniform_inclusive(rng, REACHING_MIN_WIDTH, REACHING_MAX_WIDTH);
        let mut block_column = self.wall_width;
        let mut ledge_column = self.wall_width;
        if ledge_first {
            block_column += width;
        } else {
            ledge_column += HANGING_BLOCK_SIZE;
        }

        self.hanging_block(solid, row - (HANGING_BLOCK_SIZE - 1), block_column, flip, rng);
        self.row(oneway, row, ledge_column, flip, width);
    }
}

/// Fills the left wall columns `[0, wall_width)` and the right wall columns
/// `[width - wall_width - 1, width)` for every row.
pub fn write_walls(grid: &mut TileGrid, wall_width: u32) {
    let width = grid.width();
    let right_start = width - wall_width - 1;
    for row in 0..grid.height() {
        for column in (0..wall_width).chain(right_start..width) {
            grid.set(CellCoord::new(column, row), SOLID);
        }
    }
}

/// Fills row `row` from `wall_width - 1` up to the right wall.
pub fn write_platform_line(grid: &mut TileGrid, row: u32, wall_width: u32) {
    let end = grid.width() - wall_width;
    for column in wall_width.saturating_sub(1)..end {
        grid.set(CellCoord::new(column, row), SOLID);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::EMPTY;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn walled_grid(height: u32) -> TileGrid {
        let mut grid = TileGrid::new(19, height, EMPTY);
        write_walls(&mut grid, 3);
        grid
    }

    #[test]
    fn hanging_block_fills_all_but_the_ragged_row() {
        let builder = SubunitBuilder::new(19, 3, BranchTuning::default());
        for seed in 0..16 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut grid = TileGrid::new(19, 10, EMPTY);
            builder.hanging_block(&mut grid, 4, 5, false, &mut rng);

            for row in 5..7 {
                for column in 5..8 {
                    assert!(grid.is_solid(CellCoord::new(column, row)));
                }
            }
            let outside = grid
                .iter()
                .filter(|(cell, value)| {
                    *value == SOLID
                        && !((4..7).contains(&cell.row()) && (5..8).contains(&cell.column()))
                })
                .count();
            assert_eq!(outside, 0);
        }
    }

    #[test]
    fn thick_branch_is_flush_with_the_wall() {
        let branch = BranchTuning {
            thick_probability: 1.0,
            ..BranchTuning::default()
        };
        let builder = SubunitBuilder::new(19, 3, branch);
        for seed in 0..32 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut grid = walled_grid(20);
            let _ = builder.small_branch(&mut grid, 5, false, &mut rng);

            for row in 0..20 {
                let rightmost = (3..15)
                    .filter(|column| grid.is_solid(CellCoord::new(*column, row)))
                    .max();
                if let Some(rightmost) = rightmost {
                    for column in 3..=rightmost {
                        assert!(
                            grid.is_solid(CellCoord::new(column, row)),
                            "gap at column {column} row {row} (seed {seed})"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn mirrored_thick_branch_backfills_into_the_right_wall() {
        let branch = BranchTuning {
            thick_probability: 1.0,
            build_direction_weight: 1.0,
            ..BranchTuning::default()
        };
        let builder = SubunitBuilder::new(19, 3, branch);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut grid = walled_grid(10);

        let placements = builder.small_branch(&mut grid, 2, true, &mut rng);

        // Every step grows outwards, so row 2 holds the whole branch.
        let last = 14 - (placements - 1);
        for column in last..15 {
            assert!(grid.is_solid(CellCoord::new(column, 2)));
        }
        assert!(!grid.is_solid(CellCoord::new(last - 1, 2)));
    }

    #[test]
    fn reaching_block_writes_both_grids() {
        let builder = SubunitBuilder::new(19, 3, BranchTuning::default());
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut solid = walled_grid(20);
        let mut oneway = TileGrid::new(19, 20, EMPTY);

        builder.reaching_block(&mut solid, &mut oneway, 10, false, &mut rng);

        let ledge: Vec<_> = oneway.iter().filter(|(_, v)| *v == SOLID).collect();
        assert!((2..=5).contains(&ledge.len()));
        assert!(ledge.iter().all(|(cell, _)| cell.row() == 10));
        for row in 9..11 {
            let block = (3..15)
                .filter(|column| solid.is_solid(CellCoord::new(*column, row)))
                .count();
            assert_eq!(block, 3);
        }
    }

    #[test]
    fn row_multiple_stacks_short_platforms_near_the_wall() {
        let builder = SubunitBuilder::new(19, 3, BranchTuning::default());
        let mut stacked = 0;
        for seed in 0..32 {
            for flip in [false, true] {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let mut grid = TileGrid::new(19, 12, EMPTY);
                builder.row_multiple(&mut grid, 2, flip, &mut rng);

                let occupied = |row: u32| (0..19).any(|c| grid.is_solid(CellCoord::new(c, row)));
                let rows: Vec<u32> = (0..12).filter(|row| occupied(*row)).collect();
                assert!(
                    rows == [2] || rows == [2, 5] || rows == [2, 6],
                    "rows {rows:?} (seed {seed}, flip {flip})"
                );
                if rows.len() == 2 {
                    stacked += 1;
                }

                let (near, far) = if flip { (6, 14) } else { (3, 11) };
                for row in rows {
                    let columns: Vec<u32> = (0..19)
                        .filter(|column| grid.is_solid(CellCoord::new(*column, row)))
                        .collect();
                    let first = columns[0];
                    let last = columns[columns.len() - 1];
                    assert!((3..=5).contains(&columns.len()));
                    assert_eq!(last - first + 1, columns.len() as u32, "gap in row {row}");
                    assert!(first >= near && last <= far, "row {row} spans {first}..={last}");
                }
            }
        }
        assert!(stacked > 0);
        assert_eq!(builder.brush().column(3, true), 14);
    }

    #[test]
    fn platform_line_spans_between_walls() {
        let mut grid = TileGrid::new(19, 4, EMPTY);
        write_platform_line(&mut grid, 1, 3);
        let columns: Vec<_> = grid
            .iter()
            .filter(|(_, v)| *v == SOLID)
            .map(|(cell, _)| cell.column())
            .collect();
        assert_eq!(columns, (2..16).collect::<Vec<_>>());
    }
}
