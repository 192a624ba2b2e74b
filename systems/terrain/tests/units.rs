use canopy_core::{BranchTuning, CellCoord, GridKind, LevelConfig, LevelGrids, TileGrid, EMPTY};
use canopy_system_terrain::{
    write_walls, CandidatePool, HeightCursor, SubunitBuilder, SubunitKind, SubunitPicker,
    UnitGenerator,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Replays a fixed sequence of pool indices.
#[derive(Debug)]
struct ScriptedPicker {
    picks: Vec<usize>,
    seen: Vec<Vec<SubunitKind>>,
}

impl ScriptedPicker {
    fn new(picks: &[usize]) -> Self {
        Self {
            picks: picks.iter().rev().copied().collect(),
            seen: Vec::new(),
        }
    }
}

impl SubunitPicker for ScriptedPicker {
    fn pick<R: Rng + ?Sized>(&mut self, pool: &CandidatePool, _rng: &mut R) -> usize {
        self.seen.push(pool.as_slice().to_vec());
        self.picks.pop().expect("script exhausted")
    }
}

fn walled_grids(config: &LevelConfig) -> LevelGrids {
    let mut grids = LevelGrids::new(config.grid.width, config.grid.height);
    write_walls(grids.grid_mut(GridKind::Solid), config.grid.wall_width);
    grids
}

#[test]
fn walls_cover_expected_columns() {
    let mut grid = TileGrid::new(19, 250, EMPTY);
    write_walls(&mut grid, 3);

    for row in 0..250 {
        for column in 0..19 {
            let expected = matches!(column, 0..=2 | 15..=18);
            assert_eq!(
                grid.is_solid(CellCoord::new(column, row)),
                expected,
                "column {column} row {row}"
            );
        }
    }
}

#[test]
fn unit_advances_cursor_by_at_least_three() {
    let config = LevelConfig::default();
    for seed in 0..64 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut grids = walled_grids(&config);
        let mut generator = UnitGenerator::new(&config, 2);
        let mut cursor = HeightCursor::new(50);

        let _ = generator.unit_from_subunits(&mut grids, &mut cursor, &mut rng);

        assert!(cursor.get() > 50);
        assert!(cursor.get() >= 53, "cursor {} (seed {seed})", cursor.get());
        assert!(cursor.get() <= 55);
    }
}

#[test]
fn unit_never_repeats_a_subunit() {
    let config = LevelConfig::default();
    for seed in 0..128 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut grids = walled_grids(&config);
        let mut generator = UnitGenerator::new(&config, 2);
        let mut cursor = HeightCursor::new(40);

        let report = generator.unit_from_subunits(&mut grids, &mut cursor, &mut rng);

        assert_ne!(report.left, report.right);
    }
}

#[test]
fn second_pick_draws_from_the_remaining_pool() {
    let config = LevelConfig::default();
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let mut grids = walled_grids(&config);
    let mut generator = UnitGenerator::with_picker(&config, 2, ScriptedPicker::new(&[1, 1]));
    let mut cursor = HeightCursor::new(60);

    let report = generator.unit_from_subunits(&mut grids, &mut cursor, &mut rng);

    assert_eq!(report.left, SubunitKind::SmallBranch);
    assert_eq!(report.right, SubunitKind::ReachingBlock);
    let picker = generator.picker();
    assert_eq!(picker.seen.len(), 2);
    assert_eq!(picker.seen[0], SubunitKind::ALL.to_vec());
    assert_eq!(
        picker.seen[1],
        vec![SubunitKind::RowMultiple, SubunitKind::ReachingBlock]
    );

    // The right half was built with the generator's mirrored brush.
    let brush = generator.subunits().brush();
    assert_eq!(brush.column(config.grid.wall_width, true), 13);
}

#[test]
fn picker_sees_shrinking_pool() {
    let full = CandidatePool::full();
    let (first, rest) = full.take(0);
    assert_eq!(first, SubunitKind::RowMultiple);
    assert_eq!(full.len(), 3);
    assert_eq!(
        rest.as_slice(),
        &[SubunitKind::SmallBranch, SubunitKind::ReachingBlock]
    );
    let (second, last) = rest.take(1);
    assert_eq!(second, SubunitKind::ReachingBlock);
    assert_eq!(last.as_slice(), &[SubunitKind::SmallBranch]);
}

#[test]
fn branch_with_degenerate_step_stops_after_three_tiles() {
    let branch = BranchTuning {
        energy: 100.0,
        min_energy_step: 38.0,
        max_energy_step: 38.0,
        ..BranchTuning::default()
    };
    let builder = SubunitBuilder::new(19, 3, branch);
    for seed in 0..16 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut grid = TileGrid::new(19, 20, EMPTY);
        write_walls(&mut grid, 3);

        let placements = builder.small_branch(&mut grid, 4, false, &mut rng);

        assert_eq!(placements, 3);
    }
}

#[test]
fn branch_placements_respect_energy_bound() {
    let branch = BranchTuning::default();
    let bound = branch.iteration_bound();
    let builder = SubunitBuilder::new(19, 3, branch);
    for seed in 0..64 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut grid = TileGrid::new(19, 20, EMPTY);
        write_walls(&mut grid, 3);

        let placements = builder.small_branch(&mut grid, 4, seed % 2 == 0, &mut rng);

        assert!((3..=bound).contains(&placements), "placed {placements}");
    }
}

#[test]
fn obstacle_loop_fills_level_and_keeps_walls() {
    let config = LevelConfig::default();
    let wall = config.grid.wall_width;
    let width = config.grid.width;
    for seed in 0..16 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut grids = walled_grids(&config);
        let mut generator = UnitGenerator::new(&config, 3);
        let mut cursor = HeightCursor::new(19);

        let units = generator.generate_obstacles(&mut grids, &mut cursor, &mut rng);

        assert!(units >= 18, "only {units} units");
        assert!(cursor.get() >= config.grid.height - config.obstacles.leeway);

        let solid = grids.grid(GridKind::Solid);
        for row in 0..config.grid.height {
            for column in (0..wall).chain(width - wall - 1..width) {
                assert!(solid.is_solid(CellCoord::new(column, row)));
            }
        }

        let stats = generator.placement_stats();
        let recorded = grids
            .grid(GridKind::Enemy)
            .iter()
            .filter(|(_, value)| *value >= 0)
            .count();
        assert!(stats.placed > 0);
        assert!(recorded as u32 <= stats.placed);
        for (cell, value) in grids.grid(GridKind::Enemy).iter() {
            if value >= 0 {
                assert!(value < 3);
                assert!(!solid.is_solid(cell), "enemy inside terrain at {cell:?}");
            }
        }
    }
}

#[test]
fn platform_line_can_carry_an_enemy() {
    let config = LevelConfig::default();
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let mut grids = walled_grids(&config);
    let mut generator = UnitGenerator::new(&config, 1);

    assert_eq!(generator.platform_line(&mut grids, 8, false, &mut rng), None);
    let placement = generator.platform_line(&mut grids, 30, true, &mut rng);

    assert!(placement.is_some());
    let oneway = grids.grid(GridKind::Oneway);
    assert!(oneway.is_solid(CellCoord::new(9, 8)));
    assert!(oneway.is_solid(CellCoord::new(2, 30)));
    assert!(!oneway.is_solid(CellCoord::new(16, 30)));
}
