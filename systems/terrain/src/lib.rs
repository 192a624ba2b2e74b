#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Terrain generation: walls, subunits, and the unit-by-unit obstacle loop.
//!
//! All functions here mutate [`canopy_core::LevelGrids`] synchronously. The
//! vertical [`HeightCursor`] tracks the next unclaimed row and only moves
//! upwards, apart from the one-row jitter between the two halves of a unit.

mod brush;
mod subunits;
mod units;

pub use brush::Brush;
pub use subunits::{
    write_platform_line, write_walls, SubunitBuilder, SubunitKind, HANGING_BLOCK_SIZE,
};
pub use units::{
    CandidatePool, SubunitPicker, UniformPicker, UnitGenerator, UnitKind, UnitReport,
};

/// Next unclaimed row of the level being generated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct HeightCursor(u32);

impl HeightCursor {
    /// Creates a cursor at `row`.
    #[must_use]
    pub const fn new(row: u32) -> Self {
        Self(row)
    }

    /// Current row.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Moves the cursor up by `rows`, stopping at the last representable row.
    pub fn advance(&mut self, rows: u32) {
        self.0 = self.0.saturating_add(rows);
    }

    /// Shifts the cursor by a small signed offset, never below row zero.
    pub fn nudge(&mut self, offset: i32) {
        self.0 = self.0.saturating_add_signed(offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nudge_moves_both_ways_and_saturates() {
        let mut cursor = HeightCursor::new(10);
        cursor.nudge(-1);
        assert_eq!(cursor.get(), 9);
        cursor.nudge(1);
        cursor.advance(4);
        assert_eq!(cursor.get(), 14);

        let mut floor = HeightCursor::new(0);
        floor.nudge(-1);
        assert_eq!(floor.get(), 0);
    }

    #[test]
    fn advance_stops_at_the_last_row() {
        let mut cursor = HeightCursor::new(u32::MAX - 2);
        cursor.advance(7);
        assert_eq!(cursor.get(), u32::MAX);
    }
}
