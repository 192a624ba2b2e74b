use canopy_core::{CellCoord, TileKind, TileLayer, Tilemap};

/// Tilemap kept in plain vectors, used by headless hosts and tests.
///
/// Besides the tiles it counts every set and clear call so callers can
/// observe how much work a commit performed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryTilemap {
    width: u32,
    height: u32,
    solid: Vec<Option<TileKind>>,
    oneway: Vec<Option<TileKind>>,
    sets: usize,
    clears: usize,
}

impl MemoryTilemap {
    /// Creates an empty tilemap of `width` by `height` cells.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            solid: vec![None; len],
            oneway: vec![None; len],
            sets: 0,
            clears: 0,
        }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// `set_tile` calls received so far.
    #[must_use]
    pub const fn sets(&self) -> usize {
        self.sets
    }

    /// `clear_tile` calls received so far.
    #[must_use]
    pub const fn clears(&self) -> usize {
        self.clears
    }

    /// Number of cells of `layer` currently holding a tile.
    #[must_use]
    pub fn tile_count(&self, layer: TileLayer) -> usize {
        self.layer(layer).iter().filter(|tile| tile.is_some()).count()
    }

    fn layer(&self, layer: TileLayer) -> &[Option<TileKind>] {
        match layer {
            TileLayer::Solid => &self.solid,
            TileLayer::Oneway => &self.oneway,
        }
    }

    fn slot(&mut self, layer: TileLayer, cell: CellCoord) -> &mut Option<TileKind> {
        debug_assert!(
            cell.column() < self.width && cell.row() < self.height,
            "cell {cell:?} outside {}x{} tilemap",
            self.width,
            self.height
        );
        let index = cell.row() as usize * self.width as usize + cell.column() as usize;
        match layer {
            TileLayer::Solid => &mut self.solid[index],
            TileLayer::Oneway => &mut self.oneway[index],
        }
    }
}

impl Tilemap for MemoryTilemap {
    fn set_tile(&mut self, layer: TileLayer, cell: CellCoord, kind: TileKind) {
        self.sets += 1;
        *self.slot(layer, cell) = Some(kind);
    }

    fn clear_tile(&mut self, layer: TileLayer, cell: CellCoord) {
        self.clears += 1;
        *self.slot(layer, cell) = None;
    }

    fn tile_at(&self, layer: TileLayer, cell: CellCoord) -> Option<TileKind> {
        if cell.column() >= self.width || cell.row() >= self.height {
            return None;
        }
        let index = cell.row() as usize * self.width as usize + cell.column() as usize;
        self.layer(layer)[index]
    }
}
