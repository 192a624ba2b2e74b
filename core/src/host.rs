//! Collaborator traits implemented by the engine hosting the generator.

use glam::Vec2;

use crate::{CameraFraming, CellCoord, EnemyTypeId, TileKind, TileLayer, TriggerKind};

/// Renderable tile grid the commit system writes into.
pub trait Tilemap {
    /// Places `kind` at the cell of `layer`, replacing whatever was there.
    fn set_tile(&mut self, layer: TileLayer, cell: CellCoord, kind: TileKind);

    /// Removes the tile at the cell of `layer`.
    fn clear_tile(&mut self, layer: TileLayer, cell: CellCoord);

    /// Tile currently present at the cell of `layer`.
    fn tile_at(&self, layer: TileLayer, cell: CellCoord) -> Option<TileKind>;
}

/// Receives the player's placement once a level is ready.
pub trait PlayerSink {
    /// Teleports the player.
    fn set_player_position(&mut self, position: Vec2);

    /// Overwrites the player's velocity.
    fn set_player_velocity(&mut self, velocity: Vec2);

    /// Grants or revokes world-driven player control.
    fn set_player_control(&mut self, enabled: bool);
}

/// Receives placements for the axis-aligned trigger volumes.
pub trait TriggerSink {
    /// Moves the trigger's centre.
    fn set_trigger_position(&mut self, trigger: TriggerKind, position: Vec2);

    /// Resizes the trigger.
    fn set_trigger_scale(&mut self, trigger: TriggerKind, scale: Vec2);
}

/// Follow camera whose confinement and framing the orchestrator adjusts.
pub trait CameraRig {
    /// Confines the camera to the rectangle centred at `center` with the provided size.
    fn set_camera_bounds(&mut self, center: Vec2, size: Vec2);

    /// Overrides the dead-zone and soft-zone widths.
    fn set_camera_framing(&mut self, framing: CameraFraming);
}

/// Fixed, non-scrolling volume that catches the player below the spawn point.
pub trait SafetyVolumeSink {
    /// Moves the volume to `position` and enables it.
    fn activate_safety_volume(&mut self, position: Vec2);
}

/// Enemy prototype table and instantiation.
pub trait EnemySpawner {
    /// Handle retained for later teardown of a spawned enemy.
    type Handle;

    /// Number of prototypes in the table; valid ids are `0..count`.
    fn enemy_prototype_count(&self) -> usize;

    /// Instantiates the prototype at `position`.
    fn instantiate_enemy(&mut self, prototype: EnemyTypeId, position: Vec2) -> Self::Handle;

    /// Destroys a previously spawned enemy.
    fn destroy_enemy(&mut self, handle: Self::Handle);
}

/// Full-screen transition played around level changes.
pub trait TransitionEffect {
    /// Starts the "out" transition.
    fn play_transition_out(&mut self);

    /// Returns `true` while the "out" transition is still animating.
    fn is_transition_out_playing(&self) -> bool;

    /// Plays the "in" transition without waiting for it to finish.
    fn play_transition_in_immediate(&mut self);
}

/// Every collaborator the level orchestrator needs, bundled for injection.
pub trait LevelHost:
    Tilemap
    + PlayerSink
    + TriggerSink
    + CameraRig
    + SafetyVolumeSink
    + EnemySpawner
    + TransitionEffect
{
}

impl<T> LevelHost for T where
    T: Tilemap
        + PlayerSink
        + TriggerSink
        + CameraRig
        + SafetyVolumeSink
        + EnemySpawner
        + TransitionEffect
{
}
