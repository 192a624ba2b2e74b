//! In-memory stand-ins for the engine collaborators.

use std::collections::{BTreeMap, HashMap};

use canopy_core::{
    CameraFraming, CameraRig, CellCoord, EnemySpawner, EnemyTypeId, PlayerSink,
    SafetyVolumeSink, TileKind, TileLayer, Tilemap, TransitionEffect, TriggerKind, TriggerSink,
    Vec2,
};
use canopy_system_commit::MemoryTilemap;

/// Frames the "out" transition takes to play.
const TRANSITION_OUT_FRAMES: u32 = 30;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct PlayerState {
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) control: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SpawnedEnemy {
    pub(crate) prototype: EnemyTypeId,
    pub(crate) position: Vec2,
}

/// Host that keeps every collaborator's state in memory.
#[derive(Debug)]
pub(crate) struct HeadlessHost {
    tiles: MemoryTilemap,
    prototypes: usize,
    enemies: BTreeMap<u32, SpawnedEnemy>,
    next_handle: u32,
    player: PlayerState,
    triggers: HashMap<TriggerKind, (Vec2, Vec2)>,
    camera_bounds: Option<(Vec2, Vec2)>,
    framing: CameraFraming,
    safety_volume: Option<Vec2>,
    transition_out_frames: u32,
    transitions_in: u32,
}

impl HeadlessHost {
    pub(crate) fn new(width: u32, height: u32, prototypes: usize) -> Self {
        Self {
            tiles: MemoryTilemap::new(width, height),
            prototypes,
            enemies: BTreeMap::new(),
            next_handle: 0,
            player: PlayerState::default(),
            triggers: HashMap::new(),
            camera_bounds: None,
            framing: CameraFraming::RELAXED,
            safety_volume: None,
            transition_out_frames: 0,
            transitions_in: 0,
        }
    }

    /// Lets frame-based effects progress by one frame.
    pub(crate) fn advance_frame(&mut self) {
        self.transition_out_frames = self.transition_out_frames.saturating_sub(1);
    }

    pub(crate) fn tiles(&self) -> &MemoryTilemap {
        &self.tiles
    }

    pub(crate) fn enemies(&self) -> impl Iterator<Item = &SpawnedEnemy> + '_ {
        self.enemies.values()
    }

    pub(crate) fn live_enemies(&self) -> usize {
        self.enemies.len()
    }

    pub(crate) fn player(&self) -> PlayerState {
        self.player
    }

    pub(crate) fn trigger(&self, trigger: TriggerKind) -> Option<(Vec2, Vec2)> {
        self.triggers.get(&trigger).copied()
    }

    pub(crate) fn camera_bounds(&self) -> Option<(Vec2, Vec2)> {
        self.camera_bounds
    }

    pub(crate) fn framing(&self) -> CameraFraming {
        self.framing
    }

    pub(crate) fn safety_volume(&self) -> Option<Vec2> {
        self.safety_volume
    }

    pub(crate) fn transitions_in(&self) -> u32 {
        self.transitions_in
    }
}

impl Tilemap for HeadlessHost {
    fn set_tile(&mut self, layer: TileLayer, cell: CellCoord, kind: TileKind) {
        self.tiles.set_tile(layer, cell, kind);
    }

    fn clear_tile(&mut self, layer: TileLayer, cell: CellCoord) {
        self.tiles.clear_tile(layer, cell);
    }

    fn tile_at(&self, layer: TileLayer, cell: CellCoord) -> Option<TileKind> {
        self.tiles.tile_at(layer, cell)
    }
}

impl PlayerSink for HeadlessHost {
    fn set_player_position(&mut self, position: Vec2) {
        self.player.position = position;
    }

    fn set_player_velocity(&mut self, velocity: Vec2) {
        self.player.velocity = velocity;
    }

    fn set_player_control(&mut self, enabled: bool) {
        self.player.control = enabled;
    }
}

impl TriggerSink for HeadlessHost {
    fn set_trigger_position(&mut self, trigger: TriggerKind, position: Vec2) {
        self.triggers.entry(trigger).or_insert((Vec2::ZERO, Vec2::ONE)).0 = position;
    }

    fn set_trigger_scale(&mut self, trigger: TriggerKind, scale: Vec2) {
        self.triggers.entry(trigger).or_insert((Vec2::ZERO, Vec2::ONE)).1 = scale;
    }
}

impl CameraRig for HeadlessHost {
    fn set_camera_bounds(&mut self, center: Vec2, size: Vec2) {
        self.camera_bounds = Some((center, size));
    }

    fn set_camera_framing(&mut self, framing: CameraFraming) {
        self.framing = framing;
    }
}

impl SafetyVolumeSink for HeadlessHost {
    fn activate_safety_volume(&mut self, position: Vec2) {
        self.safety_volume = Some(position);
    }
}

impl EnemySpawner for HeadlessHost {
    type Handle = u32;

    fn enemy_prototype_count(&self) -> usize {
        self.prototypes
    }

    fn instantiate_enemy(&mut self, prototype: EnemyTypeId, position: Vec2) -> u32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        let _ = self.enemies.insert(
            handle,
            SpawnedEnemy {
                prototype,
                position,
            },
        );
        handle
    }

    fn destroy_enemy(&mut self, handle: u32) {
        if self.enemies.remove(&handle).is_none() {
            tracing::warn!(handle, "destroying unknown enemy");
        }
    }
}

impl TransitionEffect for HeadlessHost {
    fn play_transition_out(&mut self) {
        self.transition_out_frames = TRANSITION_OUT_FRAMES;
    }

    fn is_transition_out_playing(&self) -> bool {
        self.transition_out_frames > 0
    }

    fn play_transition_in_immediate(&mut self) {
        self.transitions_in += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_out_finishes_after_its_frames() {
        let mut host = HeadlessHost::new(4, 4, 1);
        host.play_transition_out();
        for _ in 0..TRANSITION_OUT_FRAMES {
            assert!(host.is_transition_out_playing());
            host.advance_frame();
        }
        assert!(!host.is_transition_out_playing());
    }

    #[test]
    fn destroyed_enemies_are_forgotten() {
        let mut host = HeadlessHost::new(4, 4, 2);
        let first = host.instantiate_enemy(EnemyTypeId::new(1), Vec2::new(1.5, 2.5));
        let _ = host.instantiate_enemy(EnemyTypeId::new(0), Vec2::new(0.5, 0.5));
        host.destroy_enemy(first);
        assert_eq!(host.live_enemies(), 1);
        assert_eq!(
            host.enemies().next().map(|enemy| enemy.prototype),
            Some(EnemyTypeId::new(0))
        );
    }
}
