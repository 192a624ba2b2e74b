use canopy_core::{random, GridKind, LevelConfig, LevelGrids, ObstacleTuning, Vec2};
use canopy_system_enemies::{EnemyPlacer, Placement, PlacementStats};
use rand::Rng;

use crate::{
    subunits::{write_platform_line, SubunitBuilder, SubunitKind},
    HeightCursor,
};

/// Subunits still available for the current unit.
///
/// Picking returns the chosen kind together with a new pool that no longer
/// contains it, so a kind can never be drawn twice for the same unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidatePool {
    remaining: Vec<SubunitKind>,
}

impl CandidatePool {
    /// Pool holding every subunit kind.
    #[must_use]
    pub fn full() -> Self {
        Self {
            remaining: SubunitKind::ALL.to_vec(),
        }
    }

    /// Number of kinds left.
    #[must_use]
    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    /// Returns `true` when every kind has been taken.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Kinds left, in candidate order.
    #[must_use]
    pub fn as_slice(&self) -> &[SubunitKind] {
        &self.remaining
    }

    /// Takes the kind at `index`, returning it and the pool without it.
    #[must_use]
    pub fn take(&self, index: usize) -> (SubunitKind, CandidatePool) {
        let mut remaining = self.remaining.clone();
        let kind = remaining.remove(index);
        (kind, CandidatePool { remaining })
    }
}

/// Chooses which subunit fills each side of a unit.
pub trait SubunitPicker {
    /// Returns an index into `pool`, which is never empty.
    fn pick<R: Rng + ?Sized>(&mut self, pool: &CandidatePool, rng: &mut R) -> usize;
}

/// Picks uniformly among the remaining candidates.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformPicker;

impl SubunitPicker for UniformPicker {
    fn pick<R: Rng + ?Sized>(&mut self, pool: &CandidatePool, rng: &mut R) -> usize {
        random::index(rng, pool.len())
    }
}

/// Large terrain features the obstacle loop chooses between.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitKind {
    /// Two different subunits, one against each wall.
    FromSubunits,
}

impl UnitKind {
    /// Every unit kind.
    pub const ALL: [UnitKind; 1] = [UnitKind::FromSubunits];
}

/// What a single unit built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitReport {
    /// Subunit built against the left wall.
    pub left: SubunitKind,
    /// Subunit built mirrored against the right wall.
    pub right: SubunitKind,
    /// Enemy placements attempted under the unit.
    pub enemies: [Option<Placement>; 2],
}

/// Composes units out of subunits and runs the obstacle loop.
#[derive(Debug)]
pub struct UnitGenerator<P = UniformPicker> {
    subunits: SubunitBuilder,
    obstacles: ObstacleTuning,
    grid_width: u32,
    grid_height: u32,
    wall_width: u32,
    placer: EnemyPlacer,
    prototype_count: usize,
    picker: P,
}

impl UnitGenerator<UniformPicker> {
    /// Creates a generator that picks subunits uniformly at random.
    #[must_use]
    pub fn new(config: &LevelConfig, prototype_count: usize) -> Self {
        Self::with_picker(config, prototype_count, UniformPicker)
    }
}

impl<P: SubunitPicker> UnitGenerator<P> {
    /// Creates a generator that delegates subunit choice to `picker`.
    #[must_use]
    pub fn with_picker(config: &LevelConfig, prototype_count: usize, picker: P) -> Self {
        Self {
            subunits: SubunitBuilder::new(
                config.grid.width,
                config.grid.wall_width,
                config.branch.clone(),
            ),
            obstacles: config.obstacles.clone(),
            grid_width: config.grid.width,
            grid_height: config.grid.height,
            wall_width: config.grid.wall_width,
            placer: EnemyPlacer::new(&config.enemies),
            prototype_count,
            picker,
        }
    }

    /// Subunit builder shared by every unit.
    #[must_use]
    pub fn subunits(&self) -> &SubunitBuilder {
        &self.subunits
    }

    /// Picker deciding each side of a unit.
    #[must_use]
    pub fn picker(&self) -> &P {
        &self.picker
    }

    /// Enemy placement totals for this generator.
    #[must_use]
    pub fn placement_stats(&self) -> PlacementStats {
        self.placer.stats()
    }

    /// Places units from the cursor upwards until it reaches the leeway below the top.
    ///
    /// Returns the number of units placed.
    pub fn generate_obstacles<R: Rng + ?Sized>(
        &mut self,
        grids: &mut LevelGrids,
        cursor: &mut HeightCursor,
        rng: &mut R,
    ) -> u32 {
        let limit = self.grid_height - self.obstacles.leeway;
        let mut units = 0;
        while cursor.get() < limit {
            let kind = UnitKind::ALL[random::index(rng, UnitKind::ALL.len())];
            match kind {
                UnitKind::FromSubunits => {
                    let _ = self.unit_from_subunits(grids, cursor, rng);
                }
            }
            units += 1;
            cursor.advance(random::uniform_inclusive(
                rng,
                self.obstacles.min_gap,
                self.obstacles.max_gap,
            ));
        }
        tracing::debug!(units, cursor = cursor.get(), "obstacle loop finished");
        units
    }

    /// Builds one subunit against each wall, drops enemies under them, and advances the cursor.
    pub fn unit_from_subunits<R: Rng + ?Sized>(
        &mut self,
        grids: &mut LevelGrids,
        cursor: &mut HeightCursor,
        rng: &mut R,
    ) -> UnitReport {
        let pool = CandidatePool::full();
        let first = self.picker.pick(&pool, rng);
        let (left, pool) = pool.take(first);
        self.subunits.apply(left, grids, cursor.get(), false, rng);

        // Validated configs keep the jitter within `i32`.
        let jitter = i32::try_from(self.obstacles.jitter).unwrap_or(0);
        cursor.nudge(rng.gen_range(-jitter..=jitter));

        let second = self.picker.pick(&pool, rng);
        let (right, _) = pool.take(second);
        self.subunits.apply(right, grids, cursor.get(), true, rng);

        let base_row = cursor.get() as f32 - 3.0;
        let bases = [
            Vec2::new((self.wall_width + 1) as f32, base_row),
            Vec2::new((self.grid_width - self.wall_width - 2) as f32, base_row),
        ];
        let mut enemies = [None, None];
        for (slot, base) in enemies.iter_mut().zip(bases) {
            if random::chance(rng, self.obstacles.enemy_probability) {
                *slot = Some(self.placer.place_near(grids, base, self.prototype_count, rng));
            }
        }

        cursor.advance(self.obstacles.unit_height_cost);
        UnitReport {
            left,
            right,
            enemies,
        }
    }

    /// Writes a one-way line across the level at `row`, optionally with an enemy above its centre.
    pub fn platform_line<R: Rng + ?Sized>(
        &mut self,
        grids: &mut LevelGrids,
        row: u32,
        spawn_enemy: bool,
        rng: &mut R,
    ) -> Option<Placement> {
        write_platform_line(grids.grid_mut(GridKind::Oneway), row, self.wall_width);
        if !spawn_enemy {
            return None;
        }
        let centre = Vec2::new((self.grid_width / 2) as f32, (row + 2) as f32);
        Some(self.placer.place_near(grids, centre, self.prototype_count, rng))
    }
}
