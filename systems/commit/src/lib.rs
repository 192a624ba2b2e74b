#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Incremental transfer of generated grids into a host tilemap.
//!
//! Every [`CommitTask`] is a resumable cursor over one grid. A task yields
//! after changing a bounded number of tiles, so the host can spread the
//! commit over several frames. [`CommitScheduler`] owns the four tasks of a
//! level and reports completion exactly once, after the last of them has
//! reached the end of its grid.

mod memory;

use canopy_core::{LevelGrids, TileGrid, TileLayer, Tilemap, EMPTY, SOLID};

pub use memory::MemoryTilemap;

/// Number of tasks a level commit is split into.
pub const COMMIT_TASK_COUNT: usize = 4;

/// What a task does with the cells of its grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommitMode {
    /// Sets the layer's tile on every occupied cell that does not already carry it.
    Write,
    /// Clears every empty cell that still carries a tile.
    Chisel,
}

/// Result of advancing a task by one batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    /// The batch quota was reached; more cells remain.
    Yielded,
    /// The whole grid has been visited.
    Done,
}

/// Resumable commit of one grid into one tilemap layer.
#[derive(Clone, Debug)]
pub struct CommitTask {
    layer: TileLayer,
    mode: CommitMode,
    batch_size: usize,
    next_index: usize,
    changes: usize,
    finished: bool,
}

impl CommitTask {
    /// Creates a task that yields after every `batch_size` changed tiles.
    #[must_use]
    pub fn new(layer: TileLayer, mode: CommitMode, batch_size: usize) -> Self {
        debug_assert!(batch_size > 0, "commit batch size must be positive");
        Self {
            layer,
            mode,
            batch_size,
            next_index: 0,
            changes: 0,
            finished: false,
        }
    }

    /// Layer this task writes to.
    #[must_use]
    pub const fn layer(&self) -> TileLayer {
        self.layer
    }

    /// Whether the task writes or chisels.
    #[must_use]
    pub const fn mode(&self) -> CommitMode {
        self.mode
    }

    /// Tiles changed so far.
    #[must_use]
    pub const fn changes(&self) -> usize {
        self.changes
    }

    /// Returns `true` once the task has visited every cell.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Processes cells until `batch_size` tiles changed or the grid is exhausted.
    ///
    /// Cells are visited column fastest-varying. Cells that need no change do
    /// not count towards the batch. A finished task returns [`TaskStatus::Done`]
    /// without touching the tilemap.
    pub fn tick<T>(&mut self, grid: &TileGrid, tilemap: &mut T) -> TaskStatus
    where
        T: Tilemap + ?Sized,
    {
        let mut changed = 0;
        while self.next_index < grid.len() {
            let cell = grid.cell_at(self.next_index);
            self.next_index += 1;

            let current = tilemap.tile_at(self.layer, cell);
            let value = grid.get(cell);
            let applied = match self.mode {
                CommitMode::Write => {
                    let kind = self.layer.tile_kind();
                    if value == SOLID && current != Some(kind) {
                        tilemap.set_tile(self.layer, cell, kind);
                        true
                    } else {
                        false
                    }
                }
                CommitMode::Chisel => {
                    if value == EMPTY && current.is_some() {
                        tilemap.clear_tile(self.layer, cell);
                        true
                    } else {
                        false
                    }
                }
            };

            if applied {
                changed += 1;
                self.changes += 1;
                if changed == self.batch_size {
                    return TaskStatus::Yielded;
                }
            }
        }

        if !self.finished {
            self.finished = true;
            tracing::debug!(
                layer = ?self.layer,
                mode = ?self.mode,
                changes = self.changes,
                "commit task finished"
            );
        }
        TaskStatus::Done
    }
}

/// Join point that fires once after a fixed number of arrivals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompletionBarrier {
    expected: usize,
    arrived: usize,
    fired: bool,
}

impl CompletionBarrier {
    /// Creates a barrier waiting for `expected` arrivals.
    #[must_use]
    pub const fn new(expected: usize) -> Self {
        Self {
            expected,
            arrived: 0,
            fired: false,
        }
    }

    /// Records an arrival. Returns `true` for exactly one call: the one that
    /// completes the expected count.
    pub fn arrive(&mut self) -> bool {
        self.arrived += 1;
        if self.fired || self.arrived < self.expected {
            return false;
        }
        self.fired = true;
        true
    }

    /// Arrivals recorded so far.
    #[must_use]
    pub const fn arrived(&self) -> usize {
        self.arrived
    }

    /// Returns `true` once the barrier has fired.
    #[must_use]
    pub const fn has_fired(&self) -> bool {
        self.fired
    }
}

/// Progress reported by [`CommitScheduler::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitProgress {
    /// At least one task still has cells left.
    Pending,
    /// The last task finished during this tick. Reported once.
    Complete,
    /// Completion was already reported; nothing left to do.
    Idle,
}

/// Round-robin driver for the write and chisel tasks of both layers.
#[derive(Clone, Debug)]
pub struct CommitScheduler {
    tasks: Vec<CommitTask>,
    barrier: CompletionBarrier,
    ticks: u32,
}

impl CommitScheduler {
    /// Creates the four level commit tasks with a shared batch size.
    #[must_use]
    pub fn new(batch_size: usize) -> Self {
        let mut tasks = Vec::with_capacity(COMMIT_TASK_COUNT);
        for mode in [CommitMode::Write, CommitMode::Chisel] {
            for layer in TileLayer::ALL {
                tasks.push(CommitTask::new(layer, mode, batch_size));
            }
        }
        Self {
            barrier: CompletionBarrier::new(tasks.len()),
            tasks,
            ticks: 0,
        }
    }

    /// Tasks in scheduling order.
    #[must_use]
    pub fn tasks(&self) -> &[CommitTask] {
        &self.tasks
    }

    /// Scheduler ticks that did work.
    #[must_use]
    pub const fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Tiles changed by all tasks together.
    #[must_use]
    pub fn tiles_changed(&self) -> usize {
        self.tasks.iter().map(CommitTask::changes).sum()
    }

    /// Returns `true` once every task has finished.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.barrier.has_fired()
    }

    /// Gives every unfinished task one batch.
    pub fn tick<T>(&mut self, grids: &LevelGrids, tilemap: &mut T) -> CommitProgress
    where
        T: Tilemap + ?Sized,
    {
        if self.barrier.has_fired() {
            return CommitProgress::Idle;
        }
        self.ticks += 1;

        let mut completed = false;
        for task in self.tasks.iter_mut().filter(|task| !task.is_finished()) {
            let grid = grids.grid(task.layer().grid_kind());
            if task.tick(grid, tilemap) == TaskStatus::Done && self.barrier.arrive() {
                completed = true;
            }
        }

        if completed {
            tracing::debug!(
                ticks = self.ticks,
                tiles = self.tiles_changed(),
                "level commit complete"
            );
            CommitProgress::Complete
        } else {
            CommitProgress::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn barrier_fires_on_the_expected_arrival_only() {
        let mut barrier = CompletionBarrier::new(4);
        let fired: Vec<bool> = (0..6).map(|_| barrier.arrive()).collect();
        assert_eq!(fired, vec![false, false, false, true, false, false]);
        assert!(barrier.has_fired());
        assert_eq!(barrier.arrived(), 6);
    }

    #[test]
    fn scheduler_covers_both_modes_on_both_layers() {
        let scheduler = CommitScheduler::new(20);
        let mut pairs: Vec<_> = scheduler
            .tasks()
            .iter()
            .map(|task| (task.layer(), task.mode()))
            .collect();
        pairs.dedup();
        assert_eq!(pairs.len(), COMMIT_TASK_COUNT);
        assert_eq!(
            pairs,
            vec![
                (TileLayer::Solid, CommitMode::Write),
                (TileLayer::Oneway, CommitMode::Write),
                (TileLayer::Solid, CommitMode::Chisel),
                (TileLayer::Oneway, CommitMode::Chisel),
            ]
        );
    }
}
