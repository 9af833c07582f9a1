use std::collections::BTreeMap;

use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::{BLACK, RGB};

use crate::data::{GRID_HEIGHT, GRID_WIDTH, LevelId};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TileKind {
    Wall,
    Floor,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    pub kind: TileKind,
    pub glyph: u16,
    pub fg: RGB,
    pub bg: RGB,
}

impl Default for Tile {
    fn default() -> Self {
        Tile::floor()
    }
}

impl Tile {
    pub fn wall() -> Self {
        Self {
            kind: TileKind::Wall,
            glyph: b'#' as u16,
            fg: RGB::from_u8(90, 90, 90),
            bg: RGB::named(BLACK),
        }
    }

    pub fn floor() -> Self {
        Self {
            kind: TileKind::Floor,
            glyph: b'.' as u16,
            fg: RGB::from_u8(60, 60, 70),
            bg: RGB::named(BLACK),
        }
    }

    pub fn blocks_move(&self) -> bool {
        self.kind == TileKind::Wall
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            TileKind::Wall => "Wall",
            TileKind::Floor => "Floor",
        }
    }
}

/// Static walls and floors of one level. Immutable once loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct MapLayer {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<Tile>,
}

impl Default for MapLayer {
    fn default() -> Self {
        Self::empty(GRID_WIDTH, GRID_HEIGHT)
    }
}

impl MapLayer {
    pub fn empty(width: i32, height: i32) -> Self {
        let size = (width * height) as usize;
        Self {
            width,
            height,
            tiles: vec![Tile::default(); size],
        }
    }

    fn idx(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(Point::new(x, y)) {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }

    pub fn set_tile(&mut self, point: Point, tile: Tile) {
        if let Some(idx) = self.idx(point.x, point.y) {
            self.tiles[idx] = tile;
        }
    }

    pub fn tile_at(&self, point: Point) -> Option<&Tile> {
        self.idx(point.x, point.y).map(|idx| &self.tiles[idx])
    }

    pub fn is_wall(&self, point: Point) -> bool {
        self.tile_at(point).is_some_and(Tile::blocks_move)
    }

    pub fn each_tile<F>(&self, mut f: F)
    where
        F: FnMut(Point, &Tile),
    {
        for y in 0..self.height {
            for x in 0..self.width {
                let point = Point::new(x, y);
                if let Some(tile) = self.tile_at(point) {
                    f(point, tile);
                }
            }
        }
    }
}

/// Static layouts of every loaded level, keyed by level id.
#[derive(Clone, Debug, Default)]
pub struct Dungeon {
    pub levels: BTreeMap<LevelId, MapLayer>,
}

impl Dungeon {
    pub fn insert(&mut self, id: LevelId, layer: MapLayer) {
        self.levels.insert(id, layer);
    }

    pub fn contains(&self, id: &LevelId) -> bool {
        self.levels.contains_key(id)
    }

    pub fn layer(&self, id: &LevelId) -> Option<&MapLayer> {
        self.levels.get(id)
    }

    pub fn is_wall(&self, id: &LevelId, point: Point) -> bool {
        self.layer(id).is_some_and(|layer| layer.is_wall(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walls_block_and_off_grid_is_no_tile() {
        let mut layer = MapLayer::default();
        layer.set_tile(Point::new(2, 3), Tile::wall());
        assert!(layer.is_wall(Point::new(2, 3)));
        assert!(!layer.is_wall(Point::new(3, 3)));
        assert!(layer.tile_at(Point::new(-1, 0)).is_none());
        assert!(!layer.is_wall(Point::new(10, 0)));

        let mut walls = 0;
        layer.each_tile(|_, tile| walls += usize::from(tile.blocks_move()));
        assert_eq!(walls, 1);
    }

    #[test]
    fn unknown_levels_have_no_walls() {
        let dungeon = Dungeon::default();
        assert!(!dungeon.is_wall(&LevelId::new("room9"), Point::new(0, 0)));
    }
}
