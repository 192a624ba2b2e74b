//! Tuning surface for level generation.

use std::time::Duration;

use glam::Vec2;
use serde::Deserialize;
use thiserror::Error;

/// Furthest column offset from the wall that the fixed-shape subunits touch.
const FIXED_SUBUNIT_REACH: u32 = 8;
/// Rows a platform stack may climb above the cursor.
const PLATFORM_STACK_RISE: u32 = 4;

/// Aggregated knobs controlling every adjustable aspect of level generation.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Dimensions of the tile grids and the trunk walls.
    pub grid: GridConfig,
    /// Layout of the start and end of the level and where the host objects go.
    pub staging: StagingConfig,
    /// Spacing and composition of the obstacle loop.
    pub obstacles: ObstacleTuning,
    /// Energy-budgeted branch growth.
    pub branch: BranchTuning,
    /// Enemy placement retries.
    pub enemies: EnemyTuning,
    /// Incremental commit pacing.
    pub commit: CommitTuning,
}

impl LevelConfig {
    /// Checks that the configuration keeps every generated tile inside the grid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let grid = &self.grid;
        if grid.wall_width == 0 {
            return Err(ConfigError::NonPositive {
                field: "grid.wall_width",
            });
        }

        let reach = FIXED_SUBUNIT_REACH.max(self.branch.iteration_bound().saturating_sub(1));
        let required_width = grid
            .wall_width
            .checked_mul(2)
            .and_then(|walls| checked_sum(&[walls, 1]))
            .zip(checked_sum(&[grid.wall_width, reach, 2]))
            .map(|(walls, reach)| walls.max(reach));
        if !fits(grid.width, required_width) {
            return Err(ConfigError::WallTooWide {
                width: grid.width,
                wall_width: grid.wall_width,
                required: required_width.unwrap_or(u32::MAX),
            });
        }

        let staging = &self.staging;
        let obstacles = &self.obstacles;
        let start_rows = checked_sum(&[
            staging.floor_buffer_height,
            staging.start_line_cost,
            staging.start_breathing_room,
        ]);
        let required_height =
            start_rows.and_then(|rows| checked_sum(&[rows, obstacles.leeway, 2]));
        if !fits(grid.height, required_height) {
            return Err(ConfigError::LevelTooShort {
                height: grid.height,
                required: required_height.unwrap_or(u32::MAX),
            });
        }

        if obstacles.min_gap == 0 {
            return Err(ConfigError::NonPositive {
                field: "obstacles.min_gap",
            });
        }
        if obstacles.max_gap < obstacles.min_gap {
            return Err(ConfigError::InvertedRange {
                field: "obstacles.min_gap..=obstacles.max_gap",
                min: obstacles.min_gap as f32,
                max: obstacles.max_gap as f32,
            });
        }

        if i32::try_from(obstacles.jitter).is_err() {
            return Err(ConfigError::JitterTooLarge {
                jitter: obstacles.jitter,
                max: i32::MAX.unsigned_abs(),
            });
        }
        let rise = (self.branch.iteration_bound().saturating_sub(1)).max(PLATFORM_STACK_RISE);
        let required_leeway = checked_sum(&[obstacles.jitter, rise]);
        if !fits(obstacles.leeway, required_leeway) {
            return Err(ConfigError::LeewayTooSmall {
                leeway: obstacles.leeway,
                required: required_leeway.unwrap_or(u32::MAX),
            });
        }
        // Enemies are sampled three rows below the jittered cursor.
        let enemy_floor = checked_sum(&[obstacles.jitter, 4]);
        if !start_rows.is_some_and(|rows| fits(rows, enemy_floor)) {
            return Err(ConfigError::LevelTooShort {
                height: grid.height,
                required: required_height
                    .zip(enemy_floor)
                    .and_then(|(height, floor)| checked_sum(&[height, floor]))
                    .unwrap_or(u32::MAX),
            });
        }

        let branch = &self.branch;
        if !(branch.energy > 0.0) {
            return Err(ConfigError::NonPositive {
                field: "branch.energy",
            });
        }
        if !(branch.min_energy_step > 0.0) {
            return Err(ConfigError::NonPositive {
                field: "branch.min_energy_step",
            });
        }
        if branch.max_energy_step < branch.min_energy_step {
            return Err(ConfigError::InvertedRange {
                field: "branch.min_energy_step..branch.max_energy_step",
                min: branch.min_energy_step,
                max: branch.max_energy_step,
            });
        }

        check_probability("branch.build_direction_weight", branch.build_direction_weight)?;
        check_probability("branch.thick_probability", branch.thick_probability)?;
        check_probability("obstacles.enemy_probability", obstacles.enemy_probability)?;

        if self.enemies.attempts == 0 {
            return Err(ConfigError::NonPositive {
                field: "enemies.attempts",
            });
        }
        if !(self.enemies.jitter_radius >= 0.0 && self.enemies.jitter_radius.is_finite()) {
            return Err(ConfigError::NonPositive {
                field: "enemies.jitter_radius",
            });
        }

        if self.commit.batch_size == 0 {
            return Err(ConfigError::NonPositive {
                field: "commit.batch_size",
            });
        }

        Ok(())
    }
}

/// Sum of `parts`, or `None` when it does not fit in a `u32`.
fn checked_sum(parts: &[u32]) -> Option<u32> {
    parts.iter().try_fold(0u32, |total, part| total.checked_add(*part))
}

/// Whether `value` reaches `required`. An overflowed requirement is never met.
fn fits(value: u32, required: Option<u32>) -> bool {
    required.is_some_and(|required| value >= required)
}

fn check_probability(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { field, value })
    }
}

/// Grid dimensions.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of columns, walls included.
    pub width: u32,
    /// Number of rows; roughly 220 to 240 makes a full-length level.
    pub height: u32,
    /// Thickness of the left wall. The right wall is one column thicker.
    pub wall_width: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 19,
            height: 250,
            wall_width: 3,
        }
    }
}

/// Start and end of level layout plus placement of host objects.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct StagingConfig {
    /// Empty rows below the first platform so the player can rise in from under the level.
    pub floor_buffer_height: u32,
    /// Cursor cost of a full-width platform line.
    pub start_line_cost: u32,
    /// Extra rows left free above the start line.
    pub start_breathing_room: u32,
    /// Whether the start line gets an enemy above its centre.
    pub spawn_start_line_enemy: bool,
    /// Row the player is launched from, below the bottom of the level.
    pub player_start_height: f32,
    /// Upward speed given to the player at launch.
    pub player_launch_speed: f32,
    /// Height of the safety volume under the spawn point.
    pub safety_volume_height: f32,
    /// Centre of the testbed area the player returns to between levels.
    pub testbed_center: Vec2,
    /// Seconds the camera is locked onto the player after placement.
    pub camera_settle_secs: f32,
    /// Seconds between leaving a level and playing the "in" transition.
    pub transition_in_delay_secs: f32,
}

impl StagingConfig {
    /// Camera settle delay as a [`Duration`].
    #[must_use]
    pub fn camera_settle_delay(&self) -> Duration {
        Duration::from_secs_f32(self.camera_settle_secs.max(0.0))
    }

    /// Transition-in delay as a [`Duration`].
    #[must_use]
    pub fn transition_in_delay(&self) -> Duration {
        Duration::from_secs_f32(self.transition_in_delay_secs.max(0.0))
    }
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            floor_buffer_height: 8,
            start_line_cost: 4,
            start_breathing_room: 7,
            spawn_start_line_enemy: false,
            player_start_height: -1.0,
            player_launch_speed: 15.0,
            safety_volume_height: -5.0,
            testbed_center: Vec2::new(9.0, -60.0),
            camera_settle_secs: 0.1,
            transition_in_delay_secs: 0.5,
        }
    }
}

/// Spacing of the obstacle loop.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ObstacleTuning {
    /// Smallest number of rows added between two units.
    pub min_gap: u32,
    /// Largest number of rows added between two units, inclusive.
    pub max_gap: u32,
    /// Rows below the top of the level where no new unit may start.
    pub leeway: u32,
    /// Rows a unit costs on top of its gap.
    pub unit_height_cost: u32,
    /// Largest vertical offset between the two halves of a unit.
    pub jitter: u32,
    /// Chance of an enemy under each half of a unit.
    pub enemy_probability: f32,
}

impl Default for ObstacleTuning {
    fn default() -> Self {
        Self {
            min_gap: 6,
            max_gap: 7,
            leeway: 6,
            unit_height_cost: 4,
            jitter: 1,
            enemy_probability: 0.7,
        }
    }
}

/// Energy budget for branch growth.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BranchTuning {
    /// Energy a branch starts with.
    pub energy: f32,
    /// Smallest energy spent per placed tile.
    pub min_energy_step: f32,
    /// Largest energy spent per placed tile.
    pub max_energy_step: f32,
    /// Chance a step grows outwards instead of upwards.
    pub build_direction_weight: f32,
    /// Chance a branch is back-filled against the wall.
    pub thick_probability: f32,
}

impl BranchTuning {
    /// Largest number of tiles a branch can place before running out of energy.
    #[must_use]
    pub fn iteration_bound(&self) -> u32 {
        if !(self.min_energy_step > 0.0) || !(self.energy > 0.0) {
            return 0;
        }
        (self.energy / self.min_energy_step).ceil() as u32
    }
}

impl Default for BranchTuning {
    fn default() -> Self {
        Self {
            energy: 100.0,
            min_energy_step: 18.0,
            max_energy_step: 38.0,
            build_direction_weight: 0.3,
            thick_probability: 0.8,
        }
    }
}

/// Enemy placement retries.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    /// Samples drawn around a location before giving up.
    pub attempts: u32,
    /// Half-size of the square the samples are drawn from.
    pub jitter_radius: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            attempts: 5,
            jitter_radius: 1.0,
        }
    }
}

/// Incremental commit pacing.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CommitTuning {
    /// Tile changes a commit task makes before yielding.
    pub batch_size: u32,
}

impl Default for CommitTuning {
    fn default() -> Self {
        Self { batch_size: 20 }
    }
}

/// Reasons a [`LevelConfig`] is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The walls and subunit reach do not fit the grid width.
    #[error("grid width {width} cannot hold walls {wall_width} wide (need at least {required})")]
    WallTooWide {
        /// Configured grid width.
        width: u32,
        /// Configured wall width.
        wall_width: u32,
        /// Smallest width that fits.
        required: u32,
    },
    /// The level cannot fit the start section, end line and leeway.
    #[error("grid height {height} is too short (need at least {required})")]
    LevelTooShort {
        /// Configured grid height.
        height: u32,
        /// Smallest height that fits.
        required: u32,
    },
    /// Units near the top could grow past the last row.
    #[error("leeway {leeway} is too small (need at least {required})")]
    LeewayTooSmall {
        /// Configured leeway.
        leeway: u32,
        /// Smallest safe leeway.
        required: u32,
    },
    /// The unit jitter does not fit a signed row offset.
    #[error("obstacle jitter {jitter} exceeds {max}")]
    JitterTooLarge {
        /// Configured jitter.
        jitter: u32,
        /// Largest supported jitter.
        max: u32,
    },
    /// A range has its bounds swapped.
    #[error("{field}: minimum {min} exceeds maximum {max}")]
    InvertedRange {
        /// Name of the offending range.
        field: &'static str,
        /// Configured minimum.
        min: f32,
        /// Configured maximum.
        max: f32,
    },
    /// A value that must be positive is not.
    #[error("{field} must be positive")]
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
    },
    /// A probability lies outside `[0, 1]`.
    #[error("{field} must lie in [0, 1] (received {value})")]
    ProbabilityOutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// Configured value.
        value: f32,
    },
}
