#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level lifecycle: generation, staged commit, player hand-off and teardown.
//!
//! [`LevelOrchestrator::generate_level`] builds every grid synchronously and
//! then hands them to the commit scheduler. [`LevelOrchestrator::update`] is
//! the frame driver. Enemies, camera bounds and the player are only touched
//! after every commit task has finished.

mod timers;

use std::{fmt, time::Duration};

use canopy_core::{
    CameraFraming, ConfigError, GridKind, LevelConfig, LevelGrids, LevelHost, TriggerKind, Vec2,
    NO_ENEMY,
};
use canopy_system_commit::{CommitProgress, CommitScheduler};
use canopy_system_enemies::EnemyTracker;
use canopy_system_terrain::{write_walls, HeightCursor, UnitGenerator};
use rand::Rng;
use thiserror::Error;

pub use timers::{DeferredAction, Timers};

/// Reasons a lifecycle request is refused.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GenerationError {
    /// A previous level is still being committed to the tilemap.
    #[error("a level commit is still in progress")]
    CommitInFlight,
    /// The end-of-level transition has not finished yet.
    #[error("the end-of-level transition is still playing")]
    TransitionInFlight,
    /// The configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Summary of a single [`LevelOrchestrator::generate_level`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationReport {
    /// Row the height cursor ended on after the obstacle loop.
    pub final_cursor: u32,
    /// Units placed by the obstacle loop.
    pub units: u32,
    /// Enemy spawns recorded in the enemy grid.
    pub enemies_recorded: usize,
    /// Enemy placements abandoned because no clear cell was found.
    pub placements_skipped: u32,
}

/// Observable lifecycle stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LevelPhase {
    /// Nothing generated, or the previous level has been torn down.
    Idle,
    /// Grids are generated and being copied into the tilemap.
    Committing,
    /// Terrain and enemies are live; the player has been placed.
    Ready,
    /// The "out" transition is playing.
    EndingLevel,
}

/// Notifications emitted by [`LevelOrchestrator::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelEvent {
    /// All commit tasks finished and the completion hook ran.
    LevelReady {
        /// Tiles set or cleared by the commit.
        tiles_changed: usize,
        /// Enemies instantiated from the enemy grid.
        enemies_spawned: usize,
    },
    /// The camera framing returned to its regular widths.
    CameraReleased,
    /// The "out" transition ended and the level was torn down.
    LevelCleared {
        /// Enemies destroyed during teardown.
        enemies_destroyed: usize,
    },
    /// The "in" transition started.
    TransitionInStarted,
}

#[derive(Debug)]
enum Phase {
    Idle,
    Committing(CommitScheduler),
    Ready,
    EndingLevel,
}

/// Owns the generated grids and drives a level through its lifecycle.
pub struct LevelOrchestrator<H: LevelHost, R> {
    config: LevelConfig,
    host: H,
    rng: R,
    grids: LevelGrids,
    cursor: HeightCursor,
    phase: Phase,
    enemies: EnemyTracker<H::Handle>,
    timers: Timers,
}

impl<H: LevelHost, R> fmt::Debug for LevelOrchestrator<H, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LevelOrchestrator")
            .field("phase", &self.phase)
            .field("cursor", &self.cursor)
            .field("live_enemies", &self.enemies.len())
            .field("timers", &self.timers)
            .finish_non_exhaustive()
    }
}

impl<H: LevelHost, R: Rng> LevelOrchestrator<H, R> {
    /// Validates `config` and creates an orchestrator with empty grids.
    pub fn new(config: LevelConfig, host: H, rng: R) -> Result<Self, GenerationError> {
        config.validate()?;
        Ok(Self {
            grids: LevelGrids::new(config.grid.width, config.grid.height),
            config,
            host,
            rng,
            cursor: HeightCursor::default(),
            phase: Phase::Idle,
            enemies: EnemyTracker::new(),
            timers: Timers::new(),
        })
    }

    /// Configuration the orchestrator was created with.
    #[must_use]
    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    /// Host collaborators.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host collaborators.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Grids of the most recent generation pass.
    #[must_use]
    pub fn grids(&self) -> &LevelGrids {
        &self.grids
    }

    /// Current lifecycle stage.
    #[must_use]
    pub fn phase(&self) -> LevelPhase {
        match self.phase {
            Phase::Idle => LevelPhase::Idle,
            Phase::Committing(_) => LevelPhase::Committing,
            Phase::Ready => LevelPhase::Ready,
            Phase::EndingLevel => LevelPhase::EndingLevel,
        }
    }

    /// Returns `true` once the level has been committed and populated.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self.phase, Phase::Ready)
    }

    /// Commit scheduler of the level being committed, if any.
    #[must_use]
    pub fn commit(&self) -> Option<&CommitScheduler> {
        match &self.phase {
            Phase::Committing(scheduler) => Some(scheduler),
            _ => None,
        }
    }

    /// Enemies currently alive in the host.
    #[must_use]
    pub fn live_enemies(&self) -> usize {
        self.enemies.len()
    }

    /// Deferred actions that have not fired yet.
    pub fn pending_actions(&self) -> impl Iterator<Item = DeferredAction> + '_ {
        self.timers.pending()
    }

    /// Generates a new level and starts committing it.
    ///
    /// Grid generation completes before this returns; the tilemap is only
    /// touched by later [`LevelOrchestrator::update`] calls. Refused while a
    /// commit or the end-of-level transition is in progress.
    pub fn generate_level(&mut self) -> Result<GenerationReport, GenerationError> {
        match self.phase {
            Phase::Committing(_) => return Err(GenerationError::CommitInFlight),
            Phase::EndingLevel => return Err(GenerationError::TransitionInFlight),
            Phase::Idle | Phase::Ready => {}
        }

        let stale = self.enemies.destroy_all(&mut self.host);
        if stale > 0 {
            tracing::debug!(stale, "destroyed enemies of the previous level");
        }

        let width = self.config.grid.width;
        let height = self.config.grid.height;
        let staging = self.config.staging.clone();

        self.grids.reset();
        self.cursor = HeightCursor::default();
        write_walls(self.grids.grid_mut(GridKind::Solid), self.config.grid.wall_width);
        self.cursor.advance(staging.floor_buffer_height);
        tracing::debug!(cursor = self.cursor.get(), "walls written");

        self.place_trigger(TriggerKind::GivePlayerControl, self.cursor.get() + 1);
        self.place_trigger(TriggerKind::EndLevel, height - 1);

        let mut generator = UnitGenerator::new(&self.config, self.host.enemy_prototype_count());
        let _ = generator.platform_line(
            &mut self.grids,
            self.cursor.get(),
            staging.spawn_start_line_enemy,
            &mut self.rng,
        );
        self.cursor.advance(staging.start_line_cost + staging.start_breathing_room);

        let units = generator.generate_obstacles(&mut self.grids, &mut self.cursor, &mut self.rng);
        let _ = generator.platform_line(&mut self.grids, height - 2, false, &mut self.rng);

        self.host.activate_safety_volume(Vec2::new(
            (width / 2) as f32,
            staging.safety_volume_height,
        ));

        let report = GenerationReport {
            final_cursor: self.cursor.get(),
            units,
            enemies_recorded: self
                .grids
                .grid(GridKind::Enemy)
                .iter()
                .filter(|(_, value)| *value != NO_ENEMY)
                .count(),
            placements_skipped: generator.placement_stats().skipped,
        };
        tracing::info!(
            units = report.units,
            enemies = report.enemies_recorded,
            skipped = report.placements_skipped,
            cursor = report.final_cursor,
            "level generated"
        );

        self.phase = Phase::Committing(CommitScheduler::new(
            self.config.commit.batch_size as usize,
        ));
        Ok(report)
    }

    /// Starts the end-of-level transition.
    ///
    /// Teardown happens in [`LevelOrchestrator::update`] once the host reports
    /// that the "out" transition has finished.
    pub fn trigger_end_level(&mut self) -> Result<(), GenerationError> {
        match self.phase {
            Phase::Committing(_) => return Err(GenerationError::CommitInFlight),
            Phase::EndingLevel => return Err(GenerationError::TransitionInFlight),
            Phase::Idle | Phase::Ready => {}
        }
        tracing::info!("end of level reached");
        self.host.play_transition_out();
        self.phase = Phase::EndingLevel;
        Ok(())
    }

    /// Advances the level by one frame of length `dt`.
    ///
    /// Runs one commit batch per task, polls the end-of-level transition and
    /// fires deferred actions whose delay has elapsed. Actions scheduled
    /// during this call only start counting down from the next one.
    pub fn update(&mut self, dt: Duration, out: &mut Vec<LevelEvent>) {
        let due = self.timers.advance(dt);
        self.advance_commit(out);
        self.poll_transition(out);
        for action in due {
            self.run_deferred(action, out);
        }
    }

    fn advance_commit(&mut self, out: &mut Vec<LevelEvent>) {
        let Phase::Committing(scheduler) = &mut self.phase else {
            return;
        };
        if scheduler.tick(&self.grids, &mut self.host) != CommitProgress::Complete {
            return;
        }
        let tiles_changed = scheduler.tiles_changed();
        self.phase = Phase::Ready;

        let enemies_spawned = self
            .enemies
            .materialize(self.grids.grid(GridKind::Enemy), &mut self.host);
        self.host.set_camera_bounds(self.level_center(), self.level_size());
        self.place_player();

        tracing::info!(tiles_changed, enemies_spawned, "level ready");
        out.push(LevelEvent::LevelReady {
            tiles_changed,
            enemies_spawned,
        });
    }

    fn poll_transition(&mut self, out: &mut Vec<LevelEvent>) {
        if !matches!(self.phase, Phase::EndingLevel) || self.host.is_transition_out_playing() {
            return;
        }

        let enemies_destroyed = self.enemies.destroy_all(&mut self.host);
        let testbed = self.config.staging.testbed_center;
        self.host.set_player_position(testbed);
        self.host.set_camera_bounds(testbed, self.level_size());
        self.timers.schedule(
            self.config.staging.transition_in_delay(),
            DeferredAction::TransitionIn,
        );
        self.phase = Phase::Idle;

        tracing::info!(enemies_destroyed, "level cleared");
        out.push(LevelEvent::LevelCleared { enemies_destroyed });
    }

    fn run_deferred(&mut self, action: DeferredAction, out: &mut Vec<LevelEvent>) {
        match action {
            DeferredAction::ReleaseCameraFraming => {
                self.host.set_camera_framing(CameraFraming::RELAXED);
                out.push(LevelEvent::CameraReleased);
            }
            DeferredAction::TransitionIn => {
                self.host.play_transition_in_immediate();
                out.push(LevelEvent::TransitionInStarted);
            }
        }
    }

    fn place_player(&mut self) {
        let staging = &self.config.staging;
        let position = Vec2::new(
            (self.config.grid.width / 2) as f32,
            staging.player_start_height,
        );
        let velocity = Vec2::new(0.0, staging.player_launch_speed);
        let settle = staging.camera_settle_delay();

        self.host.set_player_control(true);
        self.host.set_player_position(position);
        self.host.set_player_velocity(velocity);
        self.host.set_camera_framing(CameraFraming::LOCKED);
        self.timers.schedule(settle, DeferredAction::ReleaseCameraFraming);
    }

    fn place_trigger(&mut self, trigger: TriggerKind, row: u32) {
        let width = self.config.grid.width;
        let centre = Vec2::new((width / 2) as f32, row as f32 + 0.5);
        self.host.set_trigger_position(trigger, centre);
        self.host.set_trigger_scale(trigger, Vec2::new(width as f32, 1.0));
    }

    fn level_center(&self) -> Vec2 {
        let grid = &self.config.grid;
        Vec2::new((grid.width / 2) as f32, (grid.height / 2) as f32)
    }

    fn level_size(&self) -> Vec2 {
        let grid = &self.config.grid;
        Vec2::new(grid.width as f32, grid.height as f32)
    }
}
