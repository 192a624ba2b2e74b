#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Canopy level generator.
//!
//! This crate defines the tile grids that generation systems write into, the
//! configuration surface every stage reads from, and the collaborator traits
//! through which the orchestrator reaches the outside world. Systems mutate
//! [`LevelGrids`] synchronously, the commit system copies the result into a
//! [`Tilemap`] in bounded batches, and only then are enemies and the player
//! handed to the host.

mod config;
mod grid;
mod host;
pub mod random;

pub use config::{
    BranchTuning, CommitTuning, ConfigError, EnemyTuning, GridConfig, LevelConfig, ObstacleTuning,
    StagingConfig,
};
pub use grid::{GridKind, LevelGrids, TileGrid, EMPTY, NO_ENEMY, SOLID};
pub use host::{
    CameraRig, EnemySpawner, LevelHost, PlayerSink, SafetyVolumeSink, Tilemap, TransitionEffect,
    TriggerSink,
};

pub use glam::Vec2;

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Rows grow upwards: row zero is the bottom of the level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// World-space position of the centre of the cell.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.column as f32 + 0.5, self.row as f32 + 0.5)
    }
}

/// Identifier of an enemy prototype inside the host's prototype table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyTypeId(u32);

impl EnemyTypeId {
    /// Creates a new enemy type identifier with the provided table index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the table index of the prototype.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Decodes an enemy grid value, returning `None` for the empty sentinel.
    #[must_use]
    pub fn from_grid_value(value: i32) -> Option<Self> {
        u32::try_from(value).ok().map(Self)
    }

    /// Encodes the identifier as an enemy grid value.
    #[must_use]
    pub fn grid_value(&self) -> i32 {
        i32::try_from(self.0).unwrap_or(i32::MAX)
    }
}

/// Renderable tilemap layers fed by the commit system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileLayer {
    /// Layer holding walls and terrain that block movement.
    Solid,
    /// Layer holding platforms that can be jumped through from below.
    Oneway,
}

impl TileLayer {
    /// Both layers in commit order.
    pub const ALL: [TileLayer; 2] = [TileLayer::Solid, TileLayer::Oneway];

    /// Grid that backs the layer.
    #[must_use]
    pub const fn grid_kind(self) -> GridKind {
        match self {
            Self::Solid => GridKind::Solid,
            Self::Oneway => GridKind::Oneway,
        }
    }

    /// Tile written into the layer for every occupied cell.
    #[must_use]
    pub const fn tile_kind(self) -> TileKind {
        match self {
            Self::Solid => TileKind::Tree,
            Self::Oneway => TileKind::Oneway,
        }
    }
}

/// Tiles the generator knows how to write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileKind {
    /// Rule tile used for the trunk walls and every solid obstacle.
    Tree,
    /// Thin platform tile.
    Oneway,
}

/// Trigger volumes positioned by the orchestrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    /// Hands control to the player once they rise past the floor buffer.
    GivePlayerControl,
    /// Fires the end-of-level transition at the top of the level.
    EndLevel,
}

/// Framing parameters of the follow camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraFraming {
    /// Width of the region in which the target may move without the camera reacting.
    pub dead_zone_width: f32,
    /// Width of the region in which the camera eases towards the target.
    pub soft_zone_width: f32,
}

impl CameraFraming {
    /// Framing that snaps the camera onto its target.
    pub const LOCKED: Self = Self {
        dead_zone_width: 0.0,
        soft_zone_width: 0.0,
    };

    /// Regular gameplay framing.
    pub const RELAXED: Self = Self {
        dead_zone_width: 1.0,
        soft_zone_width: 1.0,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_center_is_offset_by_half_a_tile() {
        let center = CellCoord::new(4, 10).center();
        assert_eq!(center, Vec2::new(4.5, 10.5));
    }

    #[test]
    fn enemy_type_decodes_sentinel_as_none() {
        assert_eq!(EnemyTypeId::from_grid_value(NO_ENEMY), None);
        assert_eq!(
            EnemyTypeId::from_grid_value(2),
            Some(EnemyTypeId::new(2))
        );
        assert_eq!(EnemyTypeId::new(3).grid_value(), 3);
    }

    #[test]
    fn layers_map_to_their_grids() {
        assert_eq!(TileLayer::Solid.grid_kind(), GridKind::Solid);
        assert_eq!(TileLayer::Oneway.grid_kind(), GridKind::Oneway);
        assert_eq!(TileLayer::Solid.tile_kind(), TileKind::Tree);
    }
}
