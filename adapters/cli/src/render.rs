//! ASCII dump of a committed level.

use std::{collections::HashSet, io};

use canopy_core::{CellCoord, TileLayer, Tilemap};

use crate::host::HeadlessHost;

/// Writes the level top row first: `#` solid, `=` one-way, `e` enemy, `.` empty.
pub(crate) fn render<W: io::Write>(host: &HeadlessHost, out: &mut W) -> io::Result<()> {
    let tiles = host.tiles();
    let enemies: HashSet<CellCoord> = host
        .enemies()
        .filter(|enemy| enemy.position.x >= 0.0 && enemy.position.y >= 0.0)
        .map(|enemy| CellCoord::new(enemy.position.x as u32, enemy.position.y as u32))
        .collect();

    let mut line = String::with_capacity(tiles.width() as usize);
    for row in (0..tiles.height()).rev() {
        line.clear();
        for column in 0..tiles.width() {
            let cell = CellCoord::new(column, row);
            let glyph = if tiles.tile_at(TileLayer::Solid, cell).is_some() {
                '#'
            } else if tiles.tile_at(TileLayer::Oneway, cell).is_some() {
                '='
            } else if enemies.contains(&cell) {
                'e'
            } else {
                '.'
            };
            line.push(glyph);
        }
        writeln!(out, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::{EnemySpawner, EnemyTypeId, TileKind, Vec2};

    #[test]
    fn rows_are_printed_top_first() {
        let mut host = HeadlessHost::new(3, 2, 1);
        host.set_tile(TileLayer::Solid, CellCoord::new(0, 0), TileKind::Tree);
        host.set_tile(TileLayer::Oneway, CellCoord::new(1, 1), TileKind::Oneway);
        let _ = host.instantiate_enemy(EnemyTypeId::new(0), Vec2::new(2.5, 0.5));

        let mut out = Vec::new();
        render(&host, &mut out).expect("writing to a vector cannot fail");

        assert_eq!(String::from_utf8(out).expect("ascii output"), ".=.\n#.e\n");
    }
}
