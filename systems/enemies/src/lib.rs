#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy spawn recording and materialization.
//!
//! Placement only records prototype ids into the enemy grid while terrain is
//! being generated. Instances are created by [`EnemyTracker::materialize`]
//! once the terrain has been committed, so enemies never exist before the
//! tiles they stand on.

use canopy_core::{
    random, CellCoord, EnemySpawner, EnemyTuning, EnemyTypeId, GridKind, LevelGrids, TileGrid,
    Vec2, EMPTY,
};
use rand::Rng;

/// Outcome of a single [`EnemyPlacer::place_near`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// A spawn was recorded.
    Placed {
        /// Cell that received the record.
        cell: CellCoord,
        /// Prototype recorded at the cell.
        enemy: EnemyTypeId,
    },
    /// Every sample was blocked; nothing was recorded.
    Skipped,
}

/// Running totals of placement outcomes since the last reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlacementStats {
    /// Spawns recorded.
    pub placed: u32,
    /// Placements abandoned after exhausting their attempts.
    pub skipped: u32,
}

/// Finds free cells near a location and records enemy spawns there.
#[derive(Clone, Debug)]
pub struct EnemyPlacer {
    attempts: u32,
    jitter_radius: f32,
    no_spawn: Vec<GridKind>,
    stats: PlacementStats,
}

impl EnemyPlacer {
    /// Creates a placer that keeps enemies out of solid terrain.
    #[must_use]
    pub fn new(tuning: &EnemyTuning) -> Self {
        Self {
            attempts: tuning.attempts,
            jitter_radius: tuning.jitter_radius,
            no_spawn: vec![GridKind::Solid],
            stats: PlacementStats::default(),
        }
    }

    /// Replaces the set of grids a spawn cell must be clear in.
    #[must_use]
    pub fn with_no_spawn_grids(mut self, grids: &[GridKind]) -> Self {
        self.no_spawn = grids.to_vec();
        self
    }

    /// Totals since construction or the last [`EnemyPlacer::reset_stats`].
    #[must_use]
    pub const fn stats(&self) -> PlacementStats {
        self.stats
    }

    /// Zeroes the running totals.
    pub fn reset_stats(&mut self) {
        self.stats = PlacementStats::default();
    }

    /// Tries to record a random prototype in a free cell within the jitter radius of `location`.
    ///
    /// Exhausting every attempt is not an error: the placement is skipped and
    /// reported once.
    pub fn place_near<R: Rng + ?Sized>(
        &mut self,
        grids: &mut LevelGrids,
        location: Vec2,
        prototype_count: usize,
        rng: &mut R,
    ) -> Placement {
        if prototype_count == 0 {
            self.stats.skipped += 1;
            tracing::debug!(?location, "enemy spawn skipped: prototype table is empty");
            return Placement::Skipped;
        }

        let radius = self.jitter_radius;
        for _ in 0..self.attempts {
            let sample = Vec2::new(
                random::uniform_f32(rng, location.x - radius, location.x + radius),
                random::uniform_f32(rng, location.y - radius, location.y + radius),
            );
            let Some(cell) = cell_containing(grids, sample) else {
                continue;
            };
            if !self.is_clear(grids, cell) {
                continue;
            }

            let enemy = EnemyTypeId::new(random::index(rng, prototype_count) as u32);
            grids
                .grid_mut(GridKind::Enemy)
                .set(cell, enemy.grid_value());
            self.stats.placed += 1;
            return Placement::Placed { cell, enemy };
        }

        self.stats.skipped += 1;
        tracing::debug!(
            ?location,
            attempts = self.attempts,
            "enemy spawn skipped: nearby cells unavailable"
        );
        Placement::Skipped
    }

    /// Returns `true` when the cell is empty in every no-spawn grid.
    #[must_use]
    pub fn is_clear(&self, grids: &LevelGrids, cell: CellCoord) -> bool {
        self.no_spawn
            .iter()
            .all(|kind| grids.grid(*kind).get(cell) == EMPTY)
    }
}

fn cell_containing(grids: &LevelGrids, position: Vec2) -> Option<CellCoord> {
    if position.x < 0.0 || position.y < 0.0 {
        return None;
    }
    let cell = CellCoord::new(position.x as u32, position.y as u32);
    grids.grid(GridKind::Enemy).contains(cell).then_some(cell)
}

/// Enemies spawned from an enemy grid, kept for bulk teardown.
#[derive(Debug)]
pub struct EnemyTracker<H> {
    handles: Vec<H>,
}

impl<H> Default for EnemyTracker<H> {
    fn default() -> Self {
        Self {
            handles: Vec::new(),
        }
    }
}

impl<H> EnemyTracker<H> {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns `true` when no enemies are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Spawns every recorded enemy at the centre of its cell and tracks it.
    ///
    /// Returns the number of enemies spawned.
    pub fn materialize<S>(&mut self, enemy_grid: &TileGrid, spawner: &mut S) -> usize
    where
        S: EnemySpawner<Handle = H> + ?Sized,
    {
        let prototype_count = spawner.enemy_prototype_count();
        let mut spawned = 0;
        for (cell, value) in enemy_grid.iter() {
            let Some(prototype) = EnemyTypeId::from_grid_value(value) else {
                continue;
            };
            if prototype.get() as usize >= prototype_count {
                tracing::warn!(?cell, prototype = prototype.get(), "unknown enemy prototype");
                continue;
            }
            let handle = spawner.instantiate_enemy(prototype, cell.center());
            self.handles.push(handle);
            spawned += 1;
        }
        spawned
    }

    /// Destroys every tracked enemy. Returns the number destroyed.
    pub fn destroy_all<S>(&mut self, spawner: &mut S) -> usize
    where
        S: EnemySpawner<Handle = H> + ?Sized,
    {
        let count = self.handles.len();
        for handle in self.handles.drain(..) {
            spawner.destroy_enemy(handle);
        }
        count
    }
}
